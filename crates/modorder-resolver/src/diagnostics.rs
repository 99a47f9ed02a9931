//! Per-module issues discovered while processing relations.

use std::collections::HashMap;
use std::fmt;

use modorder_core::module::Module;

/// Whether an issue lands in a module's `errors` or `warnings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// A non-optional requirement is absent from both pools.
    MissingRequiredModule,
    /// A requirement could not be activated because a conflict bans it.
    BannedByConflict,
    /// A declared conflict target is active.
    ConflictDetected,
    /// An identifier is claimed by more than one module or overridden.
    OverrideShadowed,
    /// A relation's condition does not parse.
    ConditionSyntax,
}

/// A single diagnostic attached to the module that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub module_id: String,
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.module_id, self.message)
    }
}

/// Issues collected during one resolution attempt, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticsReport {
    pub issues: Vec<Issue>,
}

impl DiagnosticsReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        module_id: &str,
        kind: IssueKind,
        severity: Severity,
        message: impl Into<String>,
    ) {
        let issue = Issue {
            module_id: module_id.to_string(),
            kind,
            severity,
            message: message.into(),
        };
        tracing::debug!("{issue}");
        self.issues.push(issue);
    }

    pub fn error(&mut self, module_id: &str, kind: IssueKind, message: impl Into<String>) {
        self.push(module_id, kind, Severity::Error, message);
    }

    pub fn warning(&mut self, module_id: &str, kind: IssueKind, message: impl Into<String>) {
        self.push(module_id, kind, Severity::Warning, message);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn for_module<'a>(&'a self, module_id: &'a str) -> impl Iterator<Item = &'a Issue> {
        self.issues.iter().filter(move |i| i.module_id == module_id)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Replace the diagnostics record of every module in `modules` with the
    /// issues this report holds for it.
    pub fn apply(&self, modules: &mut [Module]) {
        let mut by_module: HashMap<&str, Vec<&Issue>> = HashMap::new();
        for issue in &self.issues {
            by_module.entry(issue.module_id.as_str()).or_default().push(issue);
        }
        for module in modules.iter_mut() {
            module.diagnostics.clear();
            let Some(issues) = by_module.get(module.id.as_str()) else {
                continue;
            };
            for issue in issues {
                match issue.severity {
                    Severity::Error => module.diagnostics.errors.push(issue.message.clone()),
                    Severity::Warning => module.diagnostics.warnings.push(issue.message.clone()),
                }
            }
        }
    }
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "No issues.");
        }
        writeln!(f, "Issues ({}):", self.issues.len())?;
        for issue in &self.issues {
            writeln!(f, "  {issue}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report() {
        let report = DiagnosticsReport::new();
        assert!(report.is_empty());
        assert!(!report.has_errors());
        assert_eq!(report.to_string(), "No issues.");
    }

    #[test]
    fn report_with_issues() {
        let mut report = DiagnosticsReport::new();
        report.error("a", IssueKind::MissingRequiredModule, "requires 'b' which is not installed");
        report.warning("c", IssueKind::OverrideShadowed, "overrides 'slot' added by 'D'");
        assert_eq!(report.len(), 2);
        assert!(report.has_errors());
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.for_module("c").count(), 1);
        let s = report.to_string();
        assert!(s.contains("error [a]: requires 'b'"));
        assert!(s.contains("warning [c]"));
    }

    #[test]
    fn apply_replaces_stale_diagnostics() {
        let mut modules = vec![Module::new("a", "A"), Module::new("b", "B")];
        modules[1].diagnostics.errors.push("stale".into());

        let mut report = DiagnosticsReport::new();
        report.error("a", IssueKind::ConflictDetected, "first");
        report.warning("a", IssueKind::ConflictDetected, "second");
        report.apply(&mut modules);

        assert_eq!(modules[0].diagnostics.errors, vec!["first".to_string()]);
        assert_eq!(modules[0].diagnostics.warnings, vec!["second".to_string()]);
        assert!(modules[1].diagnostics.is_empty());
    }
}

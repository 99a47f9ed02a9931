//! The module record handed to the engine by a loader.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::relation::Relation;

/// Setting that disables ordering of this module after the owners of the
/// identifiers it overrides.
pub const IGNORE_OVERRIDE_CHECK: &str = "IgnoreOverrideCheck";

/// Module-local boolean settings from the descriptor's `<settings>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleSettings(pub BTreeMap<String, bool>);

impl ModuleSettings {
    /// Value of a setting; absent settings are `false`.
    pub fn get(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.0.insert(name.into(), value);
    }

    pub fn ignore_override_check(&self) -> bool {
        self.get(IGNORE_OVERRIDE_CHECK)
    }
}

/// Errors and warnings attached to a module by the last resolution attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDiagnostics {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ModuleDiagnostics {
    pub fn clear(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// An installable content unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Module {
    /// Unique identifier within the pools (workshop id or package name).
    pub id: String,
    /// Display name, used for deterministic tie-breaking.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// 1-based position assigned by the last successful resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_order: Option<usize>,
    /// Identifiers this module defines.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub adds: BTreeSet<String>,
    /// Identifiers this module supersedes.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub overrides: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "is_default_settings")]
    pub settings: ModuleSettings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,
    #[serde(skip)]
    pub diagnostics: ModuleDiagnostics,
}

fn is_default_settings(settings: &ModuleSettings) -> bool {
    settings.0.is_empty()
}

impl Module {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: None,
            relations: Vec::new(),
            adds: BTreeSet::new(),
            overrides: BTreeSet::new(),
            settings: ModuleSettings::default(),
            load_order: None,
            diagnostics: ModuleDiagnostics::default(),
        }
    }

    /// Name used for display and ordering; falls back to the identifier.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn with_adds<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adds.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_overrides<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_setting(mut self, name: impl Into<String>, value: bool) -> Self {
        self.settings.set(name, value);
        self
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() || self.name == self.id {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

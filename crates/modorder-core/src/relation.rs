//! Declared relations between modules.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Attribute key holding a conflict's severity level.
pub const LEVEL_ATTRIBUTE: &str = "level";
/// Attribute key holding a conflict's human-readable message.
pub const MESSAGE_ATTRIBUTE: &str = "message";
/// Message used when a conflict relation carries no `message` attribute.
pub const DEFAULT_CONFLICT_MESSAGE: &str = "Incompatible modifications";

/// The kind of constraint a relation places on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    /// Target must be active and load before the declaring module.
    Requirement,
    /// Declaring module loads before the target it patches.
    Patch,
    /// Target must not be active alongside the declaring module.
    Conflict,
    /// Like `Requirement`, but a missing target is not an error.
    OptionalRequirement,
    /// Like `Patch`, only meaningful when the target is present.
    OptionalPatch,
    /// Target must be active; relative order is unconstrained.
    RequiredAnyOrder,
}

impl RelationKind {
    /// Kinds that require the target to be present and therefore trigger
    /// activation of an inactive target.
    pub fn is_requirement_like(self) -> bool {
        matches!(
            self,
            Self::Requirement | Self::OptionalRequirement | Self::RequiredAnyOrder
        )
    }

    pub fn is_optional(self) -> bool {
        matches!(self, Self::OptionalRequirement | Self::OptionalPatch)
    }

    /// The name used in mod descriptors and pool files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requirement => "requirement",
            Self::Patch => "patch",
            Self::Conflict => "conflict",
            Self::OptionalRequirement => "optionalRequirement",
            Self::OptionalPatch => "optionalPatch",
            Self::RequiredAnyOrder => "requiredAnyOrder",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a declared conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictLevel {
    Warning,
    Error,
}

/// A directed, typed constraint one module declares about another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Identifier of the module this relation points at.
    pub target: String,
    pub kind: RelationKind,
    /// Gate for the relation; `None` means it always applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Free-form attributes such as `level` and `message`.
    #[serde(default, flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl Relation {
    pub fn new(kind: RelationKind, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            kind,
            condition: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn requirement(target: impl Into<String>) -> Self {
        Self::new(RelationKind::Requirement, target)
    }

    pub fn patch(target: impl Into<String>) -> Self {
        Self::new(RelationKind::Patch, target)
    }

    pub fn conflict(target: impl Into<String>) -> Self {
        Self::new(RelationKind::Conflict, target)
    }

    /// Gate this relation behind `condition`.
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set a free-form attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Severity declared through the `level` attribute.
    ///
    /// Only the exact value `"warning"` downgrades a conflict; anything else,
    /// including a missing attribute, is an error.
    pub fn conflict_level(&self) -> ConflictLevel {
        match self.attributes.get(LEVEL_ATTRIBUTE).map(String::as_str) {
            Some("warning") => ConflictLevel::Warning,
            Some("error") | None => ConflictLevel::Error,
            Some(other) => {
                tracing::warn!(
                    "Unknown conflict level '{other}' on relation to '{}', treating as error",
                    self.target
                );
                ConflictLevel::Error
            }
        }
    }

    /// Message declared through the `message` attribute, or the default text.
    pub fn message(&self) -> &str {
        self.attributes
            .get(MESSAGE_ATTRIBUTE)
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONFLICT_MESSAGE)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.target)?;
        if let Some(ref condition) = self.condition {
            write!(f, " if {condition}")?;
        }
        Ok(())
    }
}

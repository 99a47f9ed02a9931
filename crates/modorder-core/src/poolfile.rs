use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::module::Module;

/// Default pool file name looked up in the working directory.
pub const POOL_FILE_NAME: &str = "modorder.toml";

/// Persisted snapshot of the active and inactive pools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolFile {
    #[serde(default)]
    pub active: Vec<Module>,
    #[serde(default)]
    pub inactive: Vec<Module>,
}

impl PoolFile {
    /// Load and parse a pool file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            modorder_util::errors::ModorderError::PoolFile {
                message: format!("Failed to read {}: {e}", path.display()),
            }
        })?;
        Self::parse(&content).map_err(|message| {
            modorder_util::errors::ModorderError::PoolFile {
                message: format!("{}: {message}", path.display()),
            }
            .into()
        })
    }

    /// Parse pool file text.
    ///
    /// The order of the `[[active]]` and `[[inactive]]` entries is the pool
    /// order; `load-order` values only record the last resolution.
    /// Duplicate identifiers are left for the engine to drop.
    pub fn parse(content: &str) -> Result<Self, String> {
        let file: PoolFile = toml::from_str(content).map_err(|e| e.to_string())?;
        file.check_ids()?;
        Ok(file)
    }

    fn check_ids(&self) -> Result<(), String> {
        match self
            .active
            .iter()
            .chain(&self.inactive)
            .find(|m| m.id.trim().is_empty())
        {
            Some(module) => Err(format!("module '{}' has an empty id", module.name)),
            None => Ok(()),
        }
    }

    /// Serialize the pool file to a pretty-printed TOML string.
    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Write the pool file atomically.
    pub fn write_to(&self, path: &Path) -> miette::Result<()> {
        let content = self.to_string_pretty().map_err(|e| {
            modorder_util::errors::ModorderError::PoolFile {
                message: format!("Failed to serialize pool file: {e}"),
            }
        })?;
        modorder_util::fs::write_atomic(path, content.as_bytes())
            .map_err(modorder_util::errors::ModorderError::Io)?;
        Ok(())
    }
}

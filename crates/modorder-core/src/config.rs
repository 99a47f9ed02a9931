use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the modorder data directory.
pub const HOME_ENV: &str = "MODORDER_HOME";

/// Global user configuration loaded from `~/.modorder/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Resolution settings from `[resolver]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Upper bound on graph-building sweeps before a resolution is abandoned.
    #[serde(default = "default_max_passes", rename = "max-passes")]
    pub max_passes: usize,
    /// Whether optional requirements may pull modules out of the inactive pool.
    #[serde(default = "default_expand_optional", rename = "expand-optional")]
    pub expand_optional: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
            expand_optional: default_expand_optional(),
        }
    }
}

fn default_max_passes() -> usize {
    256
}

fn default_expand_optional() -> bool {
    true
}

/// Terminal output settings from `[output]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_show_warnings", rename = "show-warnings")]
    pub show_warnings: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            show_warnings: default_show_warnings(),
        }
    }
}

fn default_show_warnings() -> bool {
    true
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path, or return defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            modorder_util::errors::ModorderError::Config {
                message: format!("Failed to read {}: {e}", path.display()),
            }
        })?;
        toml::from_str(&content).map_err(|e| {
            modorder_util::errors::ModorderError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the modorder data directory (`~/.modorder/`).
pub fn dirs_path() -> PathBuf {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".modorder")
}

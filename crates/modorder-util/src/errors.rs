use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all modorder operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ModorderError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed pool file (e.g. modorder.toml).
    #[error("Pool file error: {message}")]
    #[diagnostic(help("Check your modorder.toml for syntax errors"))]
    PoolFile { message: String },

    /// Invalid global configuration.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check ~/.modorder/config.toml"))]
    Config { message: String },

    /// A resolution finished but left error diagnostics behind.
    #[error("Load order resolution failed: {message}")]
    #[diagnostic(help("Fix or deactivate the modules reported above"))]
    Resolution { message: String },

    /// A pool edit was rejected (unknown module, wrong pool).
    #[error("Pool edit rejected: {message}")]
    Pool { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type ModorderResult<T> = miette::Result<T>;

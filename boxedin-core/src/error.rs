//! Error kinds surfaced at the CLI/server boundary — spec.md §7.
//!
//! `AgentLoop` itself never returns `Err` (spec.md §7, Propagation
//! policy); these types exist for the boundary adapters (`boxedin-cli`,
//! `boxedin-server`) and for components below the loop (`ToolStore`,
//! `Memory`) that do surface I/O failures to their direct callers.

use thiserror::Error;

/// Missing API key or invalid resource limits — the loop is never
/// entered (spec.md §7, kind 1).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable or flag was missing.
    #[error("missing configuration: {0}")]
    Missing(String),
    /// A provided value failed validation.
    #[error("invalid configuration for {field}: {reason}")]
    Invalid {
        /// The field name.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised while saving or loading durable state.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// An I/O error occurred reading or writing the state file.
    #[error("persistence I/O error: {0}")]
    Io(String),
    /// The stored JSON didn't parse.
    #[error("persistence serialization error: {0}")]
    Serialization(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        PersistenceError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Serialization(e.to_string())
    }
}

/// Top-level error aggregating every kind the CLI/server boundary can
/// observe. Never produced by `AgentLoop` itself.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BoxedinError {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// See [`PersistenceError`].
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// See [`crate::tool::ManifestError`].
    #[error(transparent)]
    Manifest(#[from] crate::tool::ManifestError),
    /// See [`crate::sandbox::SandboxSetupError`].
    #[error(transparent)]
    Sandbox(#[from] crate::sandbox::SandboxSetupError),
    /// Catch-all for I/O not otherwise classified.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

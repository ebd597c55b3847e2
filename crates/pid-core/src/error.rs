//! Error types for pid-core

use thiserror::Error;

/// Result type alias for identifier lifecycle operations
pub type Result<T> = std::result::Result<T, PidError>;

/// Failure of an identifier lifecycle operation.
///
/// Unparseable input is never an error: parsing returns `None`. These
/// variants cover operations that were attempted and could not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PidError {
    /// The object carries no usable global identifier
    #[error("Object has no global identifier")]
    MissingGlobalId,

    /// A protocol/authority/identifier triple failed validation
    #[error("Invalid global identifier: {0}")]
    InvalidGlobalId(String),

    /// The external registry failed or rejected the call
    #[error("{provider} registry error: {message}")]
    Registry { provider: String, message: String },

    /// No free identifier could be claimed in the provider's scope
    #[error("No unique identifier found in scope '{scope}' after {attempts} attempts")]
    GenerationExhausted { scope: String, attempts: usize },

    /// Provider configuration cannot produce valid identifiers
    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),
}

impl PidError {
    /// Returns true if the failure came from an external registry.
    ///
    /// Callers may retry these; every other variant is a local failure.
    pub fn is_registry_failure(&self) -> bool {
        matches!(self, PidError::Registry { .. })
    }
}

/// Errors that can occur while loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    Parse(String),
}

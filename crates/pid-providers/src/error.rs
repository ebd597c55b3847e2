//! Error types for registry access

use pid_core::PidError;
use thiserror::Error;

/// Failure reported by a [`RegistryClient`](crate::registry::RegistryClient)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Identifier not found: {0}")]
    NotFound(String),
}

impl RegistryClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryClientError::NotFound(_))
    }

    /// Attribute the failure to `provider`
    pub fn into_pid_error(self, provider: &str) -> PidError {
        PidError::Registry {
            provider: provider.to_string(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_pid_error() {
        let err = RegistryClientError::Transport("connection reset".to_string())
            .into_pid_error("DataCite");
        assert!(err.is_registry_failure());
        assert_eq!(
            err.to_string(),
            "DataCite registry error: Transport error: connection reset"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(RegistryClientError::NotFound("doi:10.5072/X".to_string()).is_not_found());
        assert!(!RegistryClientError::Rejected("bad xml".to_string()).is_not_found());
    }
}

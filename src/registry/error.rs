//! Registry error types
//!
//! Error types for push/pull operations on sessions and clients.

use std::time::Duration;

use thiserror::Error;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Client ID is not registered on the session
    #[error("no such client: {0}")]
    NoSuchClient(String),

    /// Client mailbox was closed and holds no more messages
    #[error("client closed: {0}")]
    ClientClosed(String),

    /// No message arrived within the pull timeout
    #[error("pull timed out after {0:?}")]
    Timeout(Duration),
}

impl RegistryError {
    /// Whether this error marks the end of a client's message stream
    pub fn is_closed(&self) -> bool {
        matches!(self, RegistryError::ClientClosed(_))
    }
}

/// Result alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            RegistryError::NoSuchClient("dev-1".into()).to_string(),
            "no such client: dev-1"
        );
        assert_eq!(
            RegistryError::ClientClosed("dev-1".into()).to_string(),
            "client closed: dev-1"
        );
        assert_eq!(
            RegistryError::Timeout(Duration::from_millis(50)).to_string(),
            "pull timed out after 50ms"
        );
    }

    #[test]
    fn test_is_closed() {
        assert!(RegistryError::ClientClosed("a".into()).is_closed());
        assert!(!RegistryError::NoSuchClient("a".into()).is_closed());
    }
}

use matcherfix_canonical::ValidationError;
use thiserror::Error;

/// Errors that can occur while reading, writing or storing descriptors.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Bytes are not a valid `AlertConfigDesc` message.
    #[error("failed to unmarshal proto: {0}")]
    Decode(#[from] prost::DecodeError),
    /// No descriptor is stored for the tenant.
    #[error("no configuration stored for user {0:?}")]
    NotFound(String),
    /// Tenant identifier cannot be used as a storage key.
    #[error("invalid user identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),
}

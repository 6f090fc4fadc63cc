//! Error types for the location hub.

use thiserror::Error;

/// Errors returned by hub configuration calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// Every subscriber slot is taken.
    #[error("subscriber registry full: all {capacity} slots in use")]
    RegistryFull {
        /// Number of slots in the registry.
        capacity: usize,
    },
}

/// Result type alias for hub operations.
pub type HubResult<T> = Result<T, HubError>;

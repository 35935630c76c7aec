//! Error types for the Trolley engine.

use thiserror::Error;

/// All possible errors from the Trolley engine.
///
/// Malformed *items* are not errors: a line without a usable id is kept and
/// simply never matched during a merge. The error surface is limited to the
/// two places where input can be rejected outright.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown reconcile strategy: {0}")]
    InvalidStrategy(String),

    #[error("malformed cart snapshot: {0}")]
    MalformedSnapshot(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the cubelog engine.

use crate::CubeId;
use thiserror::Error;

/// All possible errors from the cubelog engine.
///
/// Reconciliation itself is infallible; these only come out of decoding
/// external input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid backup snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("duplicate cube id in snapshot: {0}")]
    DuplicateCubeId(CubeId),

    #[error("unknown identity policy: {0}")]
    UnknownPolicy(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for gait-trials

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the dataset helpers and table construction.
///
/// The widget handlers themselves never fail; see [`crate::range_clamp`].
#[derive(Debug, Error)]
pub enum GaitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid subject max table: {0}")]
    InvalidTable(String),

    #[error("Invalid trial code: {0}")]
    InvalidTrialCode(String),

    #[error("The following code does not exist: {code}")]
    UnknownTrial { code: String },

    #[error("Subject {0} has no recorded trials")]
    MissingSubject(u32),

    #[error("No trials found in {}", .0.display())]
    EmptyCatalog(PathBuf),

    #[error("Invalid trial metadata for {code}: {reason}")]
    InvalidMetadata { code: String, reason: String },
}

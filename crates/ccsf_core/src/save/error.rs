use super::integrity::IntegrityIssue;
use crate::error::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    Document(#[from] CoreError),

    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("Integrity check failed with {} issue(s): {}", .0.len(), summarize(.0))]
    Integrity(Vec<IntegrityIssue>),

    #[error("Checksum mismatch: manifest has {expected}, modules hash to {found}")]
    ChecksumMismatch { expected: String, found: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

impl SaveError {
    /// Recoverable errors let boot fall through to the next source.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SaveError::Io(_) => true,
            SaveError::FileNotFound { .. } => true,
            SaveError::Json(_) => true,
            SaveError::InvalidBundle(_) => true,
            SaveError::Document(_) => true,
            SaveError::Integrity(_) => false,
            SaveError::ChecksumMismatch { .. } => false,
        }
    }
}

fn summarize(issues: &[IntegrityIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

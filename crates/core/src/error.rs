//! Error types for Encrypto Core

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Duplicate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session cache is corrupt: {0}")]
    CacheCorruption(String),

    #[error("Transform refused: {0}")]
    TransformPrecondition(Precondition),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Storage faults leave Store and cache possibly out of step; the session
    /// must stop rather than keep writing.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Database(_))
    }
}

/// Why the transform pipeline refused to touch a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Source already carries the output marker extension
    AlreadyTransformed(PathBuf),
    /// Source lacks the output marker extension
    NotTransformed(PathBuf),
    /// Target artifact exists and overwriting is disabled
    ArtifactExists(PathBuf),
    /// Target artifact resolves to the source itself
    WouldOverwriteSource(PathBuf),
    /// Source has no usable file name or parent directory
    InvalidSource(PathBuf),
    /// Extension would place the artifact outside the target directory
    InvalidExtension(String),
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::AlreadyTransformed(p) => {
                write!(f, "{} is already encrypted", p.display())
            }
            Precondition::NotTransformed(p) => write!(f, "{} is not encrypted", p.display()),
            Precondition::ArtifactExists(p) => write!(f, "{} already exists", p.display()),
            Precondition::WouldOverwriteSource(p) => {
                write!(f, "output would overwrite source {}", p.display())
            }
            Precondition::InvalidSource(p) => write!(f, "{} is not a usable file path", p.display()),
            Precondition::InvalidExtension(ext) => {
                write!(f, "\"{ext}\" is not a usable file extension")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// src/error.rs

//! Crate-wide error type
//!
//! Every failure here is fatal to a run except `MissingControlMember`,
//! which the auditor absorbs per architecture.

use thiserror::Error;

/// Errors raised while auditing a repository
#[derive(Debug, Error)]
pub enum Error {
    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Download error: {0}")]
    DownloadError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// The package archive has no `md5sums` control member
    #[error("{0}")]
    MissingControlMember(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for audit operations
pub type Result<T> = std::result::Result<T, Error>;

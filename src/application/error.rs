//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("corpora file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid corpora data in {path}: {message}")]
    InvalidCorpora { path: PathBuf, message: String },

    #[error("no corpora file given and none configured")]
    NoCorporaFile,

    #[error("search query is empty")]
    EmptyQuery,

    #[error("no corpus selected")]
    NothingSelected,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

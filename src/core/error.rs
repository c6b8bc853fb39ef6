//! Application-wide error types.

use thiserror::Error;

use crate::profile::InspectError;
use crate::sparql::QueryError;
use crate::subjects::CatalogError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Inspect(#[from] InspectError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("interrupted before the profile was assembled")]
    Interrupted,
}

impl AppError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Interrupted => 130,
            _ => 1,
        }
    }
}

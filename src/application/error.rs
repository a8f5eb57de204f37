//! Errors of the model services, layered over [`DomainError`]

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Settings could not be merged or deserialized.
    #[error("config error: {message}")]
    Config { message: String },

    /// Interchange document is not valid TOML for a [`crate::domain::Model`].
    #[error("interchange file {}: {message}", path.display())]
    Interchange { path: PathBuf, message: String },

    #[error("nothing to import below {0}: document has no root element")]
    EmptyModel(String),

    #[error("cannot {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

//! Errors raised while touching the store file or the filesystem

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Store document parsed but its objects do not form a valid store.
    #[error("cannot load store {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: DomainError,
    },

    #[error("failed to {action}")]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    pub fn io(action: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            action: action.into(),
            source,
        }
    }

    pub fn store(path: impl Into<PathBuf>, source: DomainError) -> Self {
        Self::Store {
            path: path.into(),
            source,
        }
    }
}

pub type InfraResult<T> = Result<T, InfraError>;

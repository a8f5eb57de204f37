//! Attach the file being read or written to a failed I/O call

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

pub trait IoResultExt<T> {
    /// Turn an I/O failure into [`ApplicationError::OperationFailed`] naming `path`.
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::OperationFailed {
            context: format!("{action} {}", path.display()),
            source: source.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_missing_file_when_reading_then_message_names_action_and_path() {
        let result: io::Result<String> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));

        let err = result
            .with_path_context("read interchange file", Path::new("/tmp/model.toml"))
            .unwrap_err();

        assert_eq!(err.to_string(), "cannot read interchange file /tmp/model.toml");
        assert!(std::error::Error::source(&err).is_some());
    }
}

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while reading history tables and profile indexes.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file does not follow the expected layout.
    #[error("{path}:{line}: {message}")]
    Format {
        path: PathBuf,
        /// 1-based line number the problem was found on.
        line: usize,
        message: String,
    },

    /// A column was requested that is not present.
    #[error("unknown column '{0}'")]
    Key(String),
}

impl LoadError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn format(path: &Path, line: usize, message: impl Into<String>) -> Self {
        LoadError::Format {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;

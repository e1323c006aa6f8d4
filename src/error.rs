//! Error types for reconciling capture dates
//!
//! Every failure is fatal for the file being processed. Whether the run
//! stops or moves on to the next file is decided in `main`.

use std::path::{Path, PathBuf};

use crate::metadata::CodecError;

/// Result type for reconcile operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file has a JPEG extension but can't be decoded as one
    #[error("{path} is not a readable JPEG: {source}")]
    UnsupportedFormat {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// Re-serializing the Exif block failed
    #[error("could not re-encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// A capture date that doesn't follow `YYYY:MM:DD HH:MM:SS`
    #[error("invalid Exif date {value:?}: {reason}")]
    DateParse { value: String, reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

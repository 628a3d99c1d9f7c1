use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Boxed source for failures that can come from more than one library
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Custom error types for the image-dedupe library
#[derive(Error, Debug)]
pub enum Error {
    /// File missing, unreadable or permission denied
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not a decodable image, or hashing it failed
    #[error("Cannot decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: BoxedSource,
    },

    /// Invalid caller-supplied configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config or trash log (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File not found error
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, source: impl Into<BoxedSource>) -> Self {
        Self::Decode {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether this error only concerns a single file and the run may continue
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Decode { .. })
    }
}

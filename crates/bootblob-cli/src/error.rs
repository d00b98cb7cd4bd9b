//! Error types for the command-line layer.

use bootblob_format::BlobError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning arguments and manifests into an image.
#[derive(Debug, Error)]
pub enum CliError {
    /// A hexadecimal argument could not be parsed
    #[error("invalid hex value '{value}'")]
    InvalidHex {
        /// The rejected text
        value: String,
    },

    /// Manifest file could not be read
    #[error("failed to read manifest {}", path.display())]
    ManifestRead {
        /// Manifest path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Manifest file is not valid JSON for the expected shape
    #[error("invalid manifest {}", path.display())]
    ManifestParse {
        /// Manifest path
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Image given to `--inspect` could not be read
    #[error("failed to read image {}", path.display())]
    ImageRead {
        /// Image path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Error from planning, encoding or writing the image
    #[error(transparent)]
    Blob(#[from] BlobError),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

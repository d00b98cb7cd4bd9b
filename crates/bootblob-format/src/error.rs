//! Error types for boot blob planning, encoding and writing

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while assembling or decoding a boot blob
#[derive(Debug, Error)]
pub enum BlobError {
    /// No components were registered
    #[error("no components given")]
    EmptyInput,

    /// A source file could not be stat'ed during planning
    #[error("cannot get size of {}", path.display())]
    SourceNotFound {
        /// Offending source path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be opened while writing
    #[error("cannot open {}", path.display())]
    SourceOpen {
        /// Offending source path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// More components than fit in the single header sector
    #[error("too many components: {count} given, the header sector holds at most {max}")]
    HeaderOverflow {
        /// Number of components registered
        count: usize,
        /// Maximum number of header records
        max: usize,
    },

    /// The output target could not be created
    #[error("could not open {} for writing", path.display())]
    OutputOpen {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A write to the output failed or came up short
    #[error("write failed")]
    Write {
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A component was registered without a usable type
    #[error("component {} has no type (expected kernel, bootlogo, binload or arc)", path.display())]
    InvalidComponentType {
        /// Source path of the untyped component
        path: PathBuf,
    },

    /// Archive slot too large for the 32-bit type field
    #[error("archive index {index:#x} of {} is out of range (max {max:#x})", path.display())]
    ArchiveIndexOutOfRange {
        /// Source path
        path: PathBuf,
        /// Requested slot
        index: u32,
        /// Highest usable slot
        max: u32,
    },

    /// A component directive arrived before any component was started
    #[error("'{directive}' given before any file")]
    NoActiveComponent {
        /// Name of the directive
        directive: &'static str,
    },

    /// Padded component size does not fit the 32-bit header field
    #[error("{} is too large for the header ({size} bytes)", path.display())]
    ComponentTooLarge {
        /// Source path
        path: PathBuf,
        /// Raw file size in bytes
        size: u64,
    },

    /// The sector cursor overflowed the 32-bit LBA space
    #[error("image exceeds the 32-bit LBA range")]
    ImageTooLarge,

    /// Bytes written disagree with the planned image size
    #[error("wrote {actual} bytes, layout expects {expected}")]
    SizeMismatch {
        /// Planned image size
        expected: u64,
        /// Bytes actually written
        actual: u64,
    },

    /// Fewer than one sector of header data
    #[error("truncated header: expected {expected} bytes, got {actual}")]
    TruncatedHeader {
        /// Required header size
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Encoded type value outside every known range
    #[error("unknown component type value {0}")]
    UnknownComponentType(u32),

    /// Binary read/write error
    #[error("binary format error: {0}")]
    Binary(String),
}

impl From<binrw::Error> for BlobError {
    fn from(e: binrw::Error) -> Self {
        Self::Binary(e.to_string())
    }
}

/// Result type alias for boot blob operations
pub type Result<T> = std::result::Result<T, BlobError>;

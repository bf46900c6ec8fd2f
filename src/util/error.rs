//! Error types for the xray-formats library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for decode and encode operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Buffer ended before a requested primitive or string terminator
    #[error("Truncated data at offset {offset}")]
    TruncatedData { offset: usize },

    /// Chunk header declares more payload bytes than remain in the buffer
    #[error("Malformed chunk {tag:#x}: payload size {size} exceeds remaining {remaining} bytes")]
    MalformedChunk { tag: u32, size: u32, remaining: usize },

    /// Variable-length integer runs past the 64-bit range
    #[error("Malformed varint at offset {offset}")]
    MalformedVarint { offset: usize },

    /// A mandatory chunk was not the next chunk in the stream
    #[error("Expected chunk {expected:#x}, found {found:#x}")]
    MissingChunk { expected: u32, found: u32 },

    /// Recognized record with an unexpected version word
    #[error("Unsupported {what} version: {found:#x}")]
    UnsupportedVersion { what: &'static str, found: u16 },

    /// Vertex map type discriminator outside the known set
    #[error("Unknown vmap type: {0}")]
    UnknownVmapType(u8),

    /// Motion container holds two clips with the same name
    #[error("Duplicate clip name: {0}")]
    DuplicateClipName(String),

    /// Clip name not present in the container index
    #[error("Clip not found: {0}")]
    ClipNotFound(String),

    /// Exported vertex has no bone influences
    #[error("Vertex {vertex} has no bone weights")]
    EmptyWeights { vertex: u32 },

    /// Bone parent chain loops back on itself
    #[error("Bone parent cycle through: {0}")]
    BoneCycle(String),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Create a truncation error at the given cursor offset.
    pub fn truncated(offset: usize) -> Self {
        Self::TruncatedData { offset }
    }
}

/// Result type alias for xray-formats operations.
pub type Result<T> = std::result::Result<T, Error>;

//! # Import Error Types
//!
//! All errors that can occur while reading a `.vox` file or building its mesh.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use voxkit_core::CoreError;

/// Errors that can occur during import.
#[derive(Error, Debug)]
pub enum VoxError {
    /// The file does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Any other I/O failure while reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The data is not a VOX file or is structurally invalid.
    #[error("invalid VOX format: {0}")]
    InvalidFormat(String),

    /// The file declares a version older than the minimum supported one.
    #[error("VOX version {version} is too old (minimum {minimum})")]
    VersionTooOld {
        /// Version declared by the file.
        version: u32,
        /// Minimum accepted version.
        minimum: u32,
    },

    /// A read would run past the end of the input.
    #[error("truncated input: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        /// Offset of the failed read.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes left at that offset.
        available: usize,
    },

    /// A chunk that must precede another one is missing.
    #[error("missing required chunk: {0}")]
    MissingChunk(&'static str),

    /// A voxel record lies outside the size declared by `SIZE`.
    #[error("voxel ({x}, {y}, {z}) lies outside the declared model size")]
    VoxelOutOfBounds {
        /// File-space X.
        x: u8,
        /// File-space Y.
        y: u8,
        /// File-space Z.
        z: u8,
    },

    /// Storage failure in the grid or mesh buffers.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid import configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of a `VoxError`, for callers that only need a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoxErrorKind {
    /// The file does not exist.
    FileNotFound,
    /// Bad signature, bad structure, or unreadable file.
    InvalidFormat,
    /// Version below the supported minimum.
    VersionTooOld,
    /// Input ended early.
    Truncated,
    /// Out of memory.
    Allocation,
    /// Bad configuration.
    Config,
}

impl VoxError {
    /// Returns the coarse error classification.
    #[must_use]
    pub fn kind(&self) -> VoxErrorKind {
        match self {
            Self::FileNotFound(_) => VoxErrorKind::FileNotFound,
            Self::Io(_)
            | Self::InvalidFormat(_)
            | Self::MissingChunk(_)
            | Self::VoxelOutOfBounds { .. }
            | Self::Core(CoreError::OutOfBounds { .. }) => VoxErrorKind::InvalidFormat,
            Self::VersionTooOld { .. } => VoxErrorKind::VersionTooOld,
            Self::Truncated { .. } => VoxErrorKind::Truncated,
            Self::Core(CoreError::Allocation { .. }) => VoxErrorKind::Allocation,
            Self::Config(_) => VoxErrorKind::Config,
        }
    }
}

/// Result type for import operations.
pub type VoxResult<T> = Result<T, VoxError>;

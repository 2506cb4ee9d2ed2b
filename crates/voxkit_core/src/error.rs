//! # Core Error Types
//!
//! Errors raised by buffers and the voxel grid.

use thiserror::Error;

/// Errors that can occur in core storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A write targeted a coordinate outside the grid.
    #[error("voxel ({x}, {y}, {z}) is outside grid of size {size:?}")]
    OutOfBounds {
        /// X coordinate of the rejected write.
        x: i64,
        /// Y coordinate of the rejected write.
        y: i64,
        /// Z coordinate of the rejected write.
        z: i64,
        /// Logical grid size at the time of the write.
        size: [u32; 3],
    },

    /// The allocator could not provide the requested storage.
    #[error("allocation of {requested} elements failed")]
    Allocation {
        /// Number of elements requested.
        requested: usize,
    },
}

/// Result type for core storage operations.
pub type CoreResult<T> = Result<T, CoreError>;

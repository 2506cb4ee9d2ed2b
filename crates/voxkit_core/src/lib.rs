//! # VOXKIT Core
//!
//! Storage primitives for voxel model import:
//! - `GrowableBuffer<T>`: typed, amortized-doubling buffer for mesh output
//! - `VoxelGrid`: sparse 3D grid of palette indices, split into 16³ chunks
//!
//! ## Architecture Rules
//!
//! 1. **Sparse by default** - a chunk costs memory only after its first solid write
//! 2. **O(1) addressing** - chunk and slot lookups are shifts and masks
//! 3. **Fallible allocation** - out-of-memory surfaces as `CoreError::Allocation`
//!
//! ## Example
//!
//! ```rust
//! use voxkit_core::VoxelGrid;
//!
//! let mut grid = VoxelGrid::allocate(40, 8, 3).unwrap();
//! grid.set(39, 7, 2, 12).unwrap();
//! assert_eq!(grid.get(39, 7, 2), 12);
//! assert_eq!(grid.get(-1, 0, 0), 0);
//! assert_eq!(grid.chunks_allocated(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod grid;
pub mod memory;

pub use error::{CoreError, CoreResult};
pub use grid::{VoxelChunk, VoxelGrid, CHUNK_SHIFT, CHUNK_SIZE, CHUNK_VOLUME};
pub use memory::GrowableBuffer;

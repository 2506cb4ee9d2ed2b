//! Sparse voxel storage.
//!
//! The grid is cut into 16³ chunks. A chunk is allocated the first time a
//! solid voxel is written into it; untouched regions cost one `None` handle.

mod chunk;
mod voxel_grid;

pub use chunk::{VoxelChunk, CHUNK_SHIFT, CHUNK_SIZE, CHUNK_VOLUME};
pub use voxel_grid::VoxelGrid;

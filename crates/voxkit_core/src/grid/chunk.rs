//! Voxel chunk data structures.
//!
//! Chunks are 16x16x16 palette indices - one byte per voxel, 4 KiB per chunk.

use crate::error::{CoreError, CoreResult};

/// Chunk dimension - 16 voxels per axis.
pub const CHUNK_SIZE: usize = 16;

/// `log2(CHUNK_SIZE)`, used to turn divisions into shifts.
pub const CHUNK_SHIFT: u32 = 4;

/// Total voxels per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

const _: () = assert!(1usize << CHUNK_SHIFT == CHUNK_SIZE);

/// A chunk of voxels - 16x16x16 = 4,096 palette indices.
///
/// Layout: `voxels[(x << 8) + (z << 4) + y]`, so a column along Y is
/// contiguous, matching the X, Z, Y walk order of the mesher.
#[derive(Clone, PartialEq, Eq)]
pub struct VoxelChunk {
    /// Palette indices, 0 = empty.
    voxels: Box<[u8]>,

    /// Number of non-empty voxels.
    solid_count: u32,
}

impl VoxelChunk {
    /// Allocates a zero-filled chunk.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Allocation` if the 4 KiB block cannot be reserved.
    pub fn new() -> CoreResult<Self> {
        let mut voxels = Vec::new();
        voxels
            .try_reserve_exact(CHUNK_VOLUME)
            .map_err(|_| CoreError::Allocation { requested: CHUNK_VOLUME })?;
        voxels.resize(CHUNK_VOLUME, 0u8);
        Ok(Self {
            voxels: voxels.into_boxed_slice(),
            solid_count: 0,
        })
    }

    /// Calculates the linear index for a local position.
    #[inline]
    #[must_use]
    pub const fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < CHUNK_SIZE);
        debug_assert!(y < CHUNK_SIZE);
        debug_assert!(z < CHUNK_SIZE);
        (x << (2 * CHUNK_SHIFT)) + (z << CHUNK_SHIFT) + y
    }

    /// Gets the palette index at the given local position.
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds (debug builds only).
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.voxels[Self::index(x, y, z)]
    }

    /// Sets the palette index at the given local position.
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds (debug builds only).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: u8) {
        let slot = &mut self.voxels[Self::index(x, y, z)];
        match (*slot == 0, value == 0) {
            (true, false) => self.solid_count += 1,
            (false, true) => self.solid_count -= 1,
            _ => {}
        }
        *slot = value;
    }

    /// Returns the number of non-empty voxels.
    #[inline]
    #[must_use]
    pub const fn solid_count(&self) -> u32 {
        self.solid_count
    }

    /// Returns true if every voxel is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.solid_count == 0
    }

    /// Returns the raw voxel bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.voxels
    }
}

impl std::fmt::Debug for VoxelChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelChunk")
            .field("solid_count", &self.solid_count)
            .finish_non_exhaustive()
    }
}

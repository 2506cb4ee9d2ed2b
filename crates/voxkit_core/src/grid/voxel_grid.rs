//! Chunked voxel grid.
//!
//! Fixed-extent grid of palette indices backed by lazily allocated chunks.

use super::chunk::{VoxelChunk, CHUNK_SHIFT, CHUNK_SIZE};
use crate::error::{CoreError, CoreResult};

/// Mask selecting the chunk-local part of a coordinate.
const LOCAL_MASK: usize = CHUNK_SIZE - 1;

/// Sparse 3D grid mapping integer coordinates to 8-bit palette indices.
///
/// The extent is fixed at allocation time. Reads outside it return 0,
/// writes outside it are rejected with `CoreError::OutOfBounds`.
///
/// Chunk handles are flattened as `cx * (chunks_y * chunks_z) + cz * chunks_y + cy`.
#[derive(Clone, Default)]
pub struct VoxelGrid {
    /// Logical size in voxels (not padded).
    size: [u32; 3],

    /// Chunks per axis.
    chunk_counts: [usize; 3],

    /// Stride of one X step in the chunk array (`chunks_y * chunks_z`).
    x_stride: usize,

    /// Chunk handles, `None` until first solid write.
    chunks: Vec<Option<VoxelChunk>>,

    /// Number of `Some` handles.
    chunks_allocated: usize,
}

impl VoxelGrid {
    /// Allocates an empty grid of `size_x * size_y * size_z` voxels.
    ///
    /// Each axis is padded up to a multiple of `CHUNK_SIZE`; only the chunk
    /// handle array is allocated, every handle starts absent.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Allocation` if the handle array cannot be reserved
    /// or its length overflows.
    pub fn allocate(size_x: u32, size_y: u32, size_z: u32) -> CoreResult<Self> {
        let chunk_counts = [
            chunks_along(size_x),
            chunks_along(size_y),
            chunks_along(size_z),
        ];

        let overflow = CoreError::Allocation { requested: usize::MAX };
        let x_stride = chunk_counts[1]
            .checked_mul(chunk_counts[2])
            .ok_or(overflow.clone())?;
        let total = chunk_counts[0].checked_mul(x_stride).ok_or(overflow)?;

        let mut chunks = Vec::new();
        chunks
            .try_reserve_exact(total)
            .map_err(|_| CoreError::Allocation { requested: total })?;
        chunks.resize_with(total, || None);

        Ok(Self {
            size: [size_x, size_y, size_z],
            chunk_counts,
            x_stride,
            chunks,
            chunks_allocated: 0,
        })
    }

    /// Returns the logical size in voxels.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> [u32; 3] {
        self.size
    }

    /// Returns the size padded up to whole chunks.
    #[inline]
    #[must_use]
    pub fn padded_size(&self) -> [usize; 3] {
        self.chunk_counts.map(|count| count * CHUNK_SIZE)
    }

    /// Returns the number of chunks along each axis.
    #[inline]
    #[must_use]
    pub const fn chunk_counts(&self) -> [usize; 3] {
        self.chunk_counts
    }

    /// Returns the number of chunk handles.
    #[inline]
    #[must_use]
    pub fn chunks_total(&self) -> usize {
        self.chunks.len()
    }

    /// Returns the number of chunks that have been allocated.
    #[inline]
    #[must_use]
    pub const fn chunks_allocated(&self) -> usize {
        self.chunks_allocated
    }

    /// Returns the number of non-empty voxels.
    #[must_use]
    pub fn solid_count(&self) -> u64 {
        self.chunks
            .iter()
            .flatten()
            .map(|chunk| u64::from(chunk.solid_count()))
            .sum()
    }

    /// Returns true if no voxel is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.iter().flatten().all(VoxelChunk::is_empty)
    }

    /// Returns true if `(x, y, z)` lies inside the logical size.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        [x, y, z]
            .iter()
            .zip(self.size)
            .all(|(&c, size)| u32::try_from(c).is_ok_and(|c| c < size))
    }

    /// Splits an in-bounds coordinate into (chunk handle index, chunk-local xyz).
    #[inline]
    fn locate(&self, x: i32, y: i32, z: i32) -> Option<(usize, [usize; 3])> {
        if !self.contains(x, y, z) {
            return None;
        }
        // Non-negative after the bounds check
        let [x, y, z] = [x, y, z].map(|c| c.unsigned_abs() as usize);

        let chunk = (x >> CHUNK_SHIFT) * self.x_stride
            + (z >> CHUNK_SHIFT) * self.chunk_counts[1]
            + (y >> CHUNK_SHIFT);
        Some((chunk, [x & LOCAL_MASK, y & LOCAL_MASK, z & LOCAL_MASK]))
    }

    /// Gets the palette index at `(x, y, z)`.
    ///
    /// Out-of-bounds coordinates (including negative ones) and voxels in
    /// unallocated chunks read as 0. Never allocates.
    #[inline]
    #[must_use]
    pub fn get(&self, x: i32, y: i32, z: i32) -> u8 {
        let Some((chunk, [lx, ly, lz])) = self.locate(x, y, z) else {
            return 0;
        };
        self.chunks[chunk]
            .as_ref()
            .map_or(0, |chunk| chunk.get(lx, ly, lz))
    }

    /// Returns true if the voxel at `(x, y, z)` is non-empty.
    #[inline]
    #[must_use]
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.get(x, y, z) != 0
    }

    /// Sets the palette index at `(x, y, z)`.
    ///
    /// The containing chunk is allocated and zero-filled on the first
    /// non-empty write. Writing 0 into an unallocated chunk does nothing.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::OutOfBounds` for coordinates outside the grid and
    /// `CoreError::Allocation` if a new chunk cannot be allocated.
    pub fn set(&mut self, x: i32, y: i32, z: i32, value: u8) -> CoreResult<()> {
        let (chunk, [lx, ly, lz]) = self.locate(x, y, z).ok_or(CoreError::OutOfBounds {
            x: i64::from(x),
            y: i64::from(y),
            z: i64::from(z),
            size: self.size,
        })?;

        let handle = &mut self.chunks[chunk];
        if handle.is_none() {
            if value == 0 {
                return Ok(());
            }
            *handle = Some(VoxelChunk::new()?);
            self.chunks_allocated += 1;
        }
        if let Some(chunk) = handle {
            chunk.set(lx, ly, lz, value);
        }
        Ok(())
    }

    /// Releases every chunk and the handle array, zeroing all bookkeeping.
    ///
    /// Safe to call more than once.
    pub fn free(&mut self) {
        self.chunks = Vec::new();
        self.size = [0; 3];
        self.chunk_counts = [0; 3];
        self.x_stride = 0;
        self.chunks_allocated = 0;
    }
}

impl std::fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("size", &self.size)
            .field("chunk_counts", &self.chunk_counts)
            .field("chunks_allocated", &self.chunks_allocated)
            .finish_non_exhaustive()
    }
}

/// Number of chunks needed to cover `size` voxels.
#[inline]
fn chunks_along(size: u32) -> usize {
    (size as usize).div_ceil(CHUNK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_pads_to_chunks() {
        let grid = VoxelGrid::allocate(17, 16, 1).unwrap();
        assert_eq!(grid.size(), [17, 16, 1]);
        assert_eq!(grid.chunk_counts(), [2, 1, 1]);
        assert_eq!(grid.padded_size(), [32, 16, 16]);
        assert_eq!(grid.chunks_total(), 2);
        assert_eq!(grid.chunks_allocated(), 0);
    }

    #[test]
    fn test_set_get_roundtrip() {
        let mut grid = VoxelGrid::allocate(40, 20, 33).unwrap();
        let samples = [
            (0, 0, 0, 1u8),
            (15, 15, 15, 2),
            (16, 0, 0, 3),
            (39, 19, 32, 4),
            (20, 5, 31, 255),
        ];
        for &(x, y, z, v) in &samples {
            grid.set(x, y, z, v).unwrap();
        }
        for &(x, y, z, v) in &samples {
            assert_eq!(grid.get(x, y, z), v, "mismatch at ({x}, {y}, {z})");
        }
        assert_eq!(grid.solid_count(), samples.len() as u64);
    }

    #[test]
    fn test_fresh_grid_is_empty() {
        let grid = VoxelGrid::allocate(18, 3, 20).unwrap();
        for x in 0..18 {
            for y in 0..3 {
                for z in 0..20 {
                    assert_eq!(grid.get(x, y, z), 0);
                }
            }
        }
        assert!(grid.is_empty());
    }

    #[test]
    fn test_out_of_bounds_reads_never_allocate() {
        let mut grid = VoxelGrid::allocate(4, 4, 4).unwrap();
        assert_eq!(grid.get(-1, 0, 0), 0);
        assert_eq!(grid.get(0, -1, 0), 0);
        assert_eq!(grid.get(0, 0, -1), 0);
        assert_eq!(grid.get(4, 0, 0), 0);
        // Inside the padded chunk but outside the logical size
        assert_eq!(grid.get(0, 15, 0), 0);
        assert_eq!(grid.get(i32::MAX, i32::MIN, 0), 0);
        assert_eq!(grid.chunks_allocated(), 0);

        grid.set(3, 3, 3, 1).unwrap();
        assert_eq!(grid.get(3, 3, 4), 0);
        assert_eq!(grid.chunks_allocated(), 1);
    }

    #[test]
    fn test_out_of_bounds_write_rejected() {
        let mut grid = VoxelGrid::allocate(4, 4, 4).unwrap();
        let err = grid.set(4, 0, 0, 1).unwrap_err();
        assert_eq!(
            err,
            CoreError::OutOfBounds { x: 4, y: 0, z: 0, size: [4, 4, 4] }
        );
        assert!(grid.set(0, -1, 0, 1).is_err());
        assert_eq!(grid.chunks_allocated(), 0);
    }

    #[test]
    fn test_lazy_chunk_allocation() {
        let mut grid = VoxelGrid::allocate(64, 64, 64).unwrap();
        assert_eq!(grid.chunks_total(), 64);

        grid.set(0, 0, 0, 1).unwrap();
        grid.set(15, 15, 15, 1).unwrap();
        assert_eq!(grid.chunks_allocated(), 1);

        grid.set(16, 0, 0, 1).unwrap();
        grid.set(0, 16, 0, 1).unwrap();
        grid.set(0, 0, 16, 1).unwrap();
        assert_eq!(grid.chunks_allocated(), 4);

        // Empty writes into absent chunks are free
        grid.set(63, 63, 63, 0).unwrap();
        assert_eq!(grid.chunks_allocated(), 4);
    }

    #[test]
    fn test_no_slot_collisions_across_chunks() {
        let mut grid = VoxelGrid::allocate(48, 48, 48).unwrap();
        let mut value = 1u8;
        for x in (0..48).step_by(7) {
            for y in (0..48).step_by(11) {
                for z in (0..48).step_by(5) {
                    grid.set(x, y, z, value).unwrap();
                    value = value.wrapping_add(1).max(1);
                }
            }
        }

        let mut value = 1u8;
        for x in (0..48).step_by(7) {
            for y in (0..48).step_by(11) {
                for z in (0..48).step_by(5) {
                    assert_eq!(grid.get(x, y, z), value);
                    value = value.wrapping_add(1).max(1);
                }
            }
        }
    }

    #[test]
    fn test_free_is_idempotent() {
        let mut grid = VoxelGrid::allocate(20, 20, 20).unwrap();
        grid.set(1, 2, 3, 4).unwrap();

        grid.free();
        assert_eq!(grid.size(), [0, 0, 0]);
        assert_eq!(grid.chunks_total(), 0);
        assert_eq!(grid.chunks_allocated(), 0);
        assert_eq!(grid.get(1, 2, 3), 0);

        grid.free();
        assert_eq!(grid.chunks_total(), 0);
    }
}

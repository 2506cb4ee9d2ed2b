//! Face-Culled Mesher
//!
//! Emits one quad for every voxel face whose neighbour is empty or outside
//! the grid. No greedy merging: each exposed face is its own quad, which
//! keeps per-voxel colours exact.
//!
//! OUTPUT LAYOUT:
//! - 4 vertices per face (positions + replicated palette colour)
//! - 6 indices per face, `[b, b+2, b+1, b, b+3, b+2]`, counter-clockwise
//!   seen from outside
//! - 16-bit indices; output is split into batches of at most
//!   `max_batch_vertices` vertices, never splitting a face

use tracing::debug;
use voxkit_core::{GrowableBuffer, VoxelGrid};

use crate::config::{ImportConfig, MAX_BATCH_VERTICES};
use crate::error::VoxResult;
use crate::palette::{VoxColor, VoxPalette};

// =============================================================================
// FACE TABLES
// =============================================================================

/// Unit cube corners, indexed by bits `x | y << 1 | z << 2`.
const CORNER_OFFSETS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// Corner indices of each face, in `Face` order.
const FACE_CORNERS: [[usize; 4]; 6] = [
    [0, 2, 6, 4], // -X
    [5, 7, 3, 1], // +X
    [0, 4, 5, 1], // -Y
    [6, 2, 3, 7], // +Y
    [1, 3, 2, 0], // -Z
    [4, 6, 7, 5], // +Z
];

/// Index pattern of one quad, relative to its first vertex.
const QUAD_INDICES: [u16; 6] = [0, 2, 1, 0, 3, 2];

/// Vertices emitted per face.
pub const VERTICES_PER_FACE: usize = 4;

/// Indices emitted per face.
pub const INDICES_PER_FACE: usize = 6;

/// One of the six axis-aligned faces of a voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    /// Facing -X.
    NegX = 0,
    /// Facing +X.
    PosX = 1,
    /// Facing -Y.
    NegY = 2,
    /// Facing +Y.
    PosY = 3,
    /// Facing -Z.
    NegZ = 4,
    /// Facing +Z.
    PosZ = 5,
}

impl Face {
    /// All faces, in emission order.
    pub const ALL: [Self; 6] = [
        Self::NegX,
        Self::PosX,
        Self::NegY,
        Self::PosY,
        Self::NegZ,
        Self::PosZ,
    ];

    /// Offset to the neighbour this face looks at.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> [i32; 3] {
        match self {
            Self::NegX => [-1, 0, 0],
            Self::PosX => [1, 0, 0],
            Self::NegY => [0, -1, 0],
            Self::PosY => [0, 1, 0],
            Self::NegZ => [0, 0, -1],
            Self::PosZ => [0, 0, 1],
        }
    }

    /// Unit cube corners of this face, in winding order.
    #[inline]
    #[must_use]
    pub const fn corners(self) -> [usize; 4] {
        FACE_CORNERS[self as usize]
    }

    /// Bit of this face in a `FaceMask`.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of exposed faces of one voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FaceMask(u8);

impl FaceMask {
    /// No exposed faces.
    pub const NONE: Self = Self(0);

    /// All six faces exposed.
    pub const ALL: Self = Self(0b11_1111);

    /// Computes the exposed faces of the voxel at `(x, y, z)`.
    ///
    /// A face is exposed when its neighbour is empty; neighbours outside the
    /// grid count as empty. Empty voxels have no faces.
    #[must_use]
    pub fn compute(grid: &VoxelGrid, x: i32, y: i32, z: i32) -> Self {
        if !grid.is_solid(x, y, z) {
            return Self::NONE;
        }
        let mut mask = Self::NONE;
        for face in Face::ALL {
            let [dx, dy, dz] = face.offset();
            if !grid.is_solid(x + dx, y + dy, z + dz) {
                mask.insert(face);
            }
        }
        mask
    }

    /// Raw bits (bit `i` is `Face::ALL[i]`).
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if `face` is exposed.
    #[inline]
    #[must_use]
    pub const fn contains(self, face: Face) -> bool {
        self.0 & face.bit() != 0
    }

    /// Marks `face` as exposed.
    #[inline]
    pub fn insert(&mut self, face: Face) {
        self.0 |= face.bit();
    }

    /// Returns true if no face is exposed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of exposed faces.
    #[inline]
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Exposed faces, in emission order.
    pub fn iter(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |&face| self.contains(face))
    }
}

// =============================================================================
// MESH OUTPUT
// =============================================================================

/// One draw batch: vertices, colours and 16-bit indices.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBatch {
    vertices: GrowableBuffer<[f32; 3]>,
    colors: GrowableBuffer<VoxColor>,
    indices: GrowableBuffer<u16>,
}

impl MeshBatch {
    fn with_capacity(vertex_capacity: usize) -> VoxResult<Self> {
        Ok(Self {
            vertices: GrowableBuffer::with_capacity(vertex_capacity)?,
            colors: GrowableBuffer::with_capacity(vertex_capacity)?,
            indices: GrowableBuffer::with_capacity(vertex_capacity / VERTICES_PER_FACE * INDICES_PER_FACE)?,
        })
    }

    /// Vertex positions.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &GrowableBuffer<[f32; 3]> {
        &self.vertices
    }

    /// Per-vertex colours, parallel to `vertices`.
    #[inline]
    #[must_use]
    pub const fn colors(&self) -> &GrowableBuffer<VoxColor> {
        &self.colors
    }

    /// Triangle indices into `vertices`.
    #[inline]
    #[must_use]
    pub const fn indices(&self) -> &GrowableBuffer<u16> {
        &self.indices
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices.
    #[inline]
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of quads.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_FACE
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns true if the batch holds no geometry.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Splits the batch into its buffers.
    #[must_use]
    pub fn into_buffers(
        self,
    ) -> (
        GrowableBuffer<[f32; 3]>,
        GrowableBuffer<VoxColor>,
        GrowableBuffer<u16>,
    ) {
        (self.vertices, self.colors, self.indices)
    }

    /// Expands the indexed batch into a plain triangle list, one vertex per
    /// index (36 vertices for an isolated voxel).
    #[must_use]
    pub fn to_triangle_list(&self) -> (Vec<[f32; 3]>, Vec<VoxColor>) {
        let vertices = self.vertices.as_slice();
        let colors = self.colors.as_slice();
        self.indices
            .iter()
            .map(|&i| (vertices[usize::from(i)], colors[usize::from(i)]))
            .unzip()
    }

    fn push_face(&mut self, corners: [[f32; 3]; 4], color: VoxColor) -> VoxResult<()> {
        debug_assert!(self.vertices.len() + VERTICES_PER_FACE <= MAX_BATCH_VERTICES);
        #[allow(clippy::cast_possible_truncation)]
        let base = self.vertices.len() as u16;

        self.vertices.extend_from_slice(&corners)?;
        self.colors.extend_from_slice(&[color; VERTICES_PER_FACE])?;
        for offset in QUAD_INDICES {
            self.indices.push(base + offset)?;
        }
        Ok(())
    }
}

/// Mesh of a whole model, as one or more batches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoxMesh {
    batches: Vec<MeshBatch>,
}

impl VoxMesh {
    /// Draw batches, in emission order. Empty for a model with no faces.
    #[inline]
    #[must_use]
    pub fn batches(&self) -> &[MeshBatch] {
        &self.batches
    }

    /// Consumes the mesh, returning its batches.
    #[must_use]
    pub fn into_batches(self) -> Vec<MeshBatch> {
        self.batches
    }

    /// Total vertices across batches.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(MeshBatch::vertex_count).sum()
    }

    /// Total indices across batches.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.batches.iter().map(MeshBatch::index_count).sum()
    }

    /// Total quads across batches.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.batches.iter().map(MeshBatch::face_count).sum()
    }

    /// Total triangles across batches.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.batches.iter().map(MeshBatch::triangle_count).sum()
    }

    /// Returns true if the mesh holds no geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builds a `VoxMesh` from a grid and palette.
#[derive(Debug, Clone, Copy)]
pub struct MeshBuilder {
    scale: f32,
    initial_capacity: usize,
    max_batch_vertices: usize,
}

impl MeshBuilder {
    /// Creates a builder from the meshing settings of `config`.
    ///
    /// The batch limit is clamped to `4..=65536` and rounded down to a
    /// multiple of 4.
    #[must_use]
    pub fn new(config: &ImportConfig) -> Self {
        let max_batch_vertices = config
            .max_batch_vertices
            .clamp(VERTICES_PER_FACE, MAX_BATCH_VERTICES)
            / VERTICES_PER_FACE
            * VERTICES_PER_FACE;
        Self {
            scale: config.voxel_scale,
            initial_capacity: config.initial_mesh_capacity.min(max_batch_vertices),
            max_batch_vertices,
        }
    }

    /// Returns the world position of `corner` of the voxel at `(x, y, z)`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn corner_position(&self, x: i32, y: i32, z: i32, corner: usize) -> [f32; 3] {
        let [ox, oy, oz] = CORNER_OFFSETS[corner];
        [
            (x as f32 + ox) * self.scale,
            (y as f32 + oy) * self.scale,
            (z as f32 + oz) * self.scale,
        ]
    }

    /// Walks the grid (X outer, then Z, then Y) and emits every exposed face.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Core` if a mesh buffer cannot grow.
    pub fn build(&self, grid: &VoxelGrid, palette: &VoxPalette) -> VoxResult<VoxMesh> {
        let [size_x, size_y, size_z] = grid.size().map(|s| i32::try_from(s).unwrap_or(i32::MAX));

        let mut batches = Vec::new();
        let mut current = MeshBatch::with_capacity(self.initial_capacity)?;

        for x in 0..size_x {
            for z in 0..size_z {
                for y in 0..size_y {
                    let mask = FaceMask::compute(grid, x, y, z);
                    if mask.is_empty() {
                        continue;
                    }

                    let color = palette.get(grid.get(x, y, z));
                    let mut corners = VoxelCorners::new(self, [x, y, z]);

                    for face in mask.iter() {
                        if current.vertex_count() + VERTICES_PER_FACE > self.max_batch_vertices {
                            let full = std::mem::replace(
                                &mut current,
                                MeshBatch::with_capacity(self.initial_capacity)?,
                            );
                            batches.push(full);
                        }
                        current.push_face(corners.face(face), color)?;
                    }
                }
            }
        }

        if !current.is_empty() {
            batches.push(current);
        }

        let mesh = VoxMesh { batches };
        debug!(
            "Meshed {} faces ({} vertices, {} indices) in {} batches",
            mesh.face_count(),
            mesh.vertex_count(),
            mesh.index_count(),
            mesh.batches.len()
        );
        Ok(mesh)
    }
}

/// Corner positions of one voxel, each computed on first use.
struct VoxelCorners<'a> {
    builder: &'a MeshBuilder,
    origin: [i32; 3],
    cache: [Option<[f32; 3]>; 8],
}

impl<'a> VoxelCorners<'a> {
    fn new(builder: &'a MeshBuilder, origin: [i32; 3]) -> Self {
        Self {
            builder,
            origin,
            cache: [None; 8],
        }
    }

    fn corner(&mut self, corner: usize) -> [f32; 3] {
        let [x, y, z] = self.origin;
        let builder = self.builder;
        *self.cache[corner].get_or_insert_with(|| builder.corner_position(x, y, z, corner))
    }

    /// Positions of `face`'s four corners, in winding order.
    fn face(&mut self, face: Face) -> [[f32; 3]; 4] {
        face.corners().map(|corner| self.corner(corner))
    }

    #[cfg(test)]
    fn computed(&self) -> usize {
        self.cache.iter().flatten().count()
    }
}

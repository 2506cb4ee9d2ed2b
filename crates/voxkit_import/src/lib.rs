//! # VOXKIT Import
//!
//! MagicaVoxel `.vox` import and face-culled mesh generation.
//!
//! ## Pipeline
//!
//! ```text
//! bytes ──► VoxLoader ──► VoxModel { VoxelGrid, VoxPalette } ──► MeshBuilder ──► VoxMesh
//! ```
//!
//! The grid only lives for the duration of an import; `import_from_memory`
//! and `import_file` drop it and hand back the mesh, palette and model size.
//!
//! ## Example
//!
//! ```rust,ignore
//! use voxkit_import::{import_file, ImportConfig};
//!
//! let import = import_file("assets/models/sword.vox", &ImportConfig::default())?;
//! for batch in import.mesh.batches() {
//!     upload(batch.vertices().as_bytes(), batch.colors().as_bytes(), batch.indices().as_bytes());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod mesher;
pub mod palette;
pub mod reader;
pub mod vox_loader;

use std::path::Path;

pub use config::ImportConfig;
pub use error::{VoxError, VoxErrorKind, VoxResult};
pub use mesher::{Face, FaceMask, MeshBatch, MeshBuilder, VoxMesh};
pub use palette::{VoxColor, VoxPalette};
pub use vox_loader::{ChunkHeader, VoxLoader, VoxModel};

/// Result of a complete import.
#[derive(Debug, Clone)]
pub struct VoxImport {
    /// Face-culled mesh.
    pub mesh: VoxMesh,
    /// Palette used for the vertex colours.
    pub palette: VoxPalette,
    /// Grid size after axis conversion (x, y-up, z).
    pub size: [u32; 3],
    /// File version.
    pub version: u32,
}

/// Parses a `.vox` file held in memory and builds its mesh.
///
/// # Errors
///
/// Returns the first `VoxError` raised while parsing or meshing.
pub fn import_from_memory(data: &[u8], config: &ImportConfig) -> VoxResult<VoxImport> {
    let model = VoxLoader::load_from_memory(data, config)?;
    finish(model, config)
}

/// Reads a `.vox` file from disk and builds its mesh.
///
/// # Errors
///
/// Returns `VoxError::FileNotFound` for a missing path, otherwise the first
/// `VoxError` raised while parsing or meshing.
pub fn import_file<P: AsRef<Path>>(path: P, config: &ImportConfig) -> VoxResult<VoxImport> {
    let model = VoxLoader::load(path, config)?;
    finish(model, config)
}

fn finish(model: VoxModel, config: &ImportConfig) -> VoxResult<VoxImport> {
    let mesh = model.build_mesh(config)?;
    let size = model.size();
    let version = model.version();
    tracing::info!(
        "Imported VOX v{} model {}x{}x{}: {} faces",
        version,
        size[0],
        size[1],
        size[2],
        mesh.face_count()
    );
    Ok(VoxImport {
        mesh,
        palette: model.into_palette(),
        size,
        version,
    })
}

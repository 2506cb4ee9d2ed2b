//! # Import Configuration
//!
//! Tuning knobs for reading and meshing. Loaded once, usually from TOML:
//!
//! ```toml
//! voxel_scale = 1.0
//! minimum_version = 150
//! max_batch_vertices = 32768
//! ```

use serde::Deserialize;

use crate::error::{VoxError, VoxResult};

/// Minimum VOX version accepted by default.
pub const MIN_SUPPORTED_VERSION: u32 = 150;

/// Newest VOX version this reader knows about. Newer files load with a warning.
pub const NEWEST_KNOWN_VERSION: u32 = 200;

/// Largest vertex count addressable by 16-bit indices.
pub const MAX_BATCH_VERTICES: usize = 1 << 16;

/// Configuration for the importer and mesh builder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// World-space edge length of one voxel.
    pub voxel_scale: f32,
    /// Files older than this fail with `VoxError::VersionTooOld`.
    pub minimum_version: u32,
    /// Initial element capacity of each mesh buffer.
    pub initial_mesh_capacity: usize,
    /// Vertex limit per mesh batch (at most 65536, a multiple of 4).
    pub max_batch_vertices: usize,
    /// Use the stock MagicaVoxel palette when the file has no `RGBA` chunk.
    pub default_palette: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            voxel_scale: 0.25,
            minimum_version: MIN_SUPPORTED_VERSION,
            initial_mesh_capacity: 3 * 1024,
            max_batch_vertices: MAX_BATCH_VERTICES,
            default_palette: true,
        }
    }
}

impl ImportConfig {
    /// One world unit per voxel.
    #[must_use]
    pub fn unit_scale() -> Self {
        Self {
            voxel_scale: 1.0,
            ..Self::default()
        }
    }

    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Config` if the document does not parse or the
    /// resulting values fail `validate`.
    pub fn from_toml_str(source: &str) -> VoxResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| VoxError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Config` describing the first invalid value.
    pub fn validate(&self) -> VoxResult<()> {
        if !(self.voxel_scale.is_finite() && self.voxel_scale > 0.0) {
            return Err(VoxError::Config(format!(
                "voxel_scale must be a positive number, got {}",
                self.voxel_scale
            )));
        }
        if !(4..=MAX_BATCH_VERTICES).contains(&self.max_batch_vertices)
            || self.max_batch_vertices % 4 != 0
        {
            return Err(VoxError::Config(format!(
                "max_batch_vertices must be a multiple of 4 in 4..={MAX_BATCH_VERTICES}, got {}",
                self.max_batch_vertices
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ImportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.voxel_scale, 0.25);
        assert_eq!(config.minimum_version, 150);
        assert!(ImportConfig::unit_scale().validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ImportConfig::from_toml_str("voxel_scale = 1.0\nmax_batch_vertices = 1024\n").unwrap();
        assert_eq!(config.voxel_scale, 1.0);
        assert_eq!(config.max_batch_vertices, 1024);
        assert_eq!(config.minimum_version, MIN_SUPPORTED_VERSION);
        assert!(config.default_palette);
    }

    #[test]
    fn test_from_toml_rejects_bad_values() {
        assert!(matches!(
            ImportConfig::from_toml_str("voxel_scale = -1.0"),
            Err(VoxError::Config(_))
        ));
        assert!(matches!(
            ImportConfig::from_toml_str("max_batch_vertices = 70000"),
            Err(VoxError::Config(_))
        ));
        assert!(matches!(
            ImportConfig::from_toml_str("max_batch_vertices = 6"),
            Err(VoxError::Config(_))
        ));
        assert!(matches!(
            ImportConfig::from_toml_str("voxel_scale = \"big\""),
            Err(VoxError::Config(_))
        ));
    }
}

//! MagicaVoxel VOX File Loader
//!
//! Parser for the MagicaVoxel .vox file format (RIFF-style chunks).
//!
//! ## VOX Format Reference
//!
//! ```text
//! VOX File Structure:
//! ├── "VOX " (4 bytes) - Magic number
//! ├── Version (4 bytes) - File version (>= 150)
//! └── Chunks, repeated until end of input:
//!     ├── Tag (4 bytes ASCII)
//!     ├── Content size N (4 bytes)
//!     ├── Children size M (4 bytes)
//!     └── N bytes of content
//! ```
//!
//! Children are not walked recursively: `MAIN` has no content of its own,
//! so its children (`SIZE`, `XYZI`, `RGBA`, ...) are simply the next records.
//!
//! ## Axis Conversion
//!
//! VOX files are Z-up. The grid is Y-up and right-handed, so a file voxel
//! `(x, y, z)` is stored at `(x, z, size_z - y - 1)`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voxkit_import::{ImportConfig, VoxLoader};
//!
//! let model = VoxLoader::load("assets/models/sword.vox", &ImportConfig::default())?;
//! let mesh = model.build_mesh(&ImportConfig::default())?;
//! ```

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, trace, warn};
use voxkit_core::{CoreError, VoxelGrid};

use crate::config::{ImportConfig, NEWEST_KNOWN_VERSION};
use crate::error::{VoxError, VoxResult};
use crate::mesher::{MeshBuilder, VoxMesh};
use crate::palette::{VoxColor, VoxPalette, PALETTE_SIZE};
use crate::reader::ByteReader;

/// VOX file magic number.
pub const VOX_MAGIC: [u8; 4] = *b"VOX ";

/// Model dimensions chunk.
pub const TAG_SIZE: [u8; 4] = *b"SIZE";

/// Voxel records chunk.
pub const TAG_XYZI: [u8; 4] = *b"XYZI";

/// Palette chunk.
pub const TAG_RGBA: [u8; 4] = *b"RGBA";

/// Largest model extent per axis. `XYZI` coordinates are single bytes.
pub const MAX_MODEL_EXTENT: u32 = 256;

/// Header preceding every chunk's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Four-character chunk tag.
    pub tag: [u8; 4],
    /// Size of the chunk's own content in bytes.
    pub content_size: usize,
    /// Declared size of the chunk's children in bytes.
    pub children_size: usize,
    /// Offset of the tag in the input.
    pub offset: usize,
}

impl ChunkHeader {
    /// Size of a chunk header in bytes.
    pub const SIZE: usize = 12;

    /// Returns the tag as text (non-ASCII bytes are replaced).
    #[must_use]
    pub fn tag_name(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }
}

/// A parsed VOX model: the populated grid and its palette.
#[derive(Debug, Clone)]
pub struct VoxModel {
    version: u32,
    grid: VoxelGrid,
    palette: VoxPalette,
    skipped_models: usize,
}

impl VoxModel {
    /// Returns the file version.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the grid size after axis conversion.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> [u32; 3] {
        self.grid.size()
    }

    /// Returns the voxel grid.
    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Returns the palette.
    #[inline]
    #[must_use]
    pub const fn palette(&self) -> &VoxPalette {
        &self.palette
    }

    /// Returns how many additional models in the file were not imported.
    #[inline]
    #[must_use]
    pub const fn skipped_models(&self) -> usize {
        self.skipped_models
    }

    /// Builds the face-culled mesh of this model.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Core` if mesh buffers cannot grow.
    pub fn build_mesh(&self, config: &ImportConfig) -> VoxResult<VoxMesh> {
        MeshBuilder::new(config).build(&self.grid, &self.palette)
    }

    /// Consumes the model, releasing the grid and keeping the palette.
    #[must_use]
    pub fn into_palette(self) -> VoxPalette {
        self.palette
    }
}

/// VOX file loader.
pub struct VoxLoader;

impl VoxLoader {
    /// Loads a VOX file from disk.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::FileNotFound` if the path does not exist, or any
    /// error of `load_from_memory`.
    pub fn load<P: AsRef<Path>>(path: P, config: &ImportConfig) -> VoxResult<VoxModel> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => VoxError::FileNotFound(path.to_path_buf()),
            _ => VoxError::Io(e),
        })?;
        debug!("Loading VOX file {} ({} bytes)", path.display(), data.len());
        Self::load_from_memory(&data, config)
    }

    /// Parses a VOX file held in memory.
    ///
    /// # Errors
    ///
    /// - `VoxError::InvalidFormat` on a bad signature
    /// - `VoxError::VersionTooOld` below `config.minimum_version`
    /// - `VoxError::Truncated` if any record runs past the end of `data`
    /// - `VoxError::MissingChunk("SIZE")` if voxels arrive before dimensions
    ///   or the file has no dimensions at all
    /// - `VoxError::VoxelOutOfBounds` for voxels outside the declared size
    /// - `VoxError::Core` on allocation failure
    pub fn load_from_memory(data: &[u8], config: &ImportConfig) -> VoxResult<VoxModel> {
        config.validate()?;

        let mut reader = ByteReader::new(data);
        let version = Self::read_file_header(&mut reader, config)?;

        let mut grid: Option<VoxelGrid> = None;
        let mut voxels_loaded = false;
        let mut skipped_models = 0usize;
        let mut palette: Option<VoxPalette> = None;

        while !reader.is_empty() {
            let header = Self::read_chunk_header(&mut reader)?;
            let mut content = reader.sub_reader(header.content_size)?;

            match header.tag {
                TAG_SIZE if grid.is_some() => {
                    skipped_models += 1;
                    warn!(
                        "VOX file holds more than one model; skipping model at offset {}",
                        header.offset
                    );
                }
                TAG_SIZE => {
                    grid = Some(Self::read_size(&mut content)?);
                }
                TAG_XYZI => match grid.as_mut() {
                    None => return Err(VoxError::MissingChunk("SIZE")),
                    // Once a second SIZE is seen, later voxels belong to a skipped model
                    Some(_) if voxels_loaded || skipped_models > 0 => {
                        trace!("Skipping voxels of extra model at offset {}", header.offset);
                    }
                    Some(grid) => {
                        let count = Self::read_voxels(&mut content, grid)?;
                        voxels_loaded = true;
                        debug!("Read {} voxels", count);
                    }
                },
                TAG_RGBA => {
                    palette = Some(Self::read_palette(&mut content)?);
                }
                _ => {
                    trace!(
                        "Skipping chunk '{}' ({} bytes) at offset {}",
                        header.tag_name(),
                        header.content_size,
                        header.offset
                    );
                }
            }
        }

        let grid = grid.ok_or(VoxError::MissingChunk("SIZE"))?;
        let palette = palette.unwrap_or_else(|| {
            if config.default_palette {
                VoxPalette::default()
            } else {
                VoxPalette::empty()
            }
        });

        debug!(
            "Vox chunks allocated: {}/{}",
            grid.chunks_allocated(),
            grid.chunks_total()
        );

        Ok(VoxModel {
            version,
            grid,
            palette,
            skipped_models,
        })
    }

    /// Lists every chunk header without interpreting any content.
    ///
    /// # Errors
    ///
    /// Same header errors as `load_from_memory`, plus `VoxError::Truncated`
    /// if a chunk runs past the end of `data`.
    pub fn scan_chunks(data: &[u8], config: &ImportConfig) -> VoxResult<(u32, Vec<ChunkHeader>)> {
        let mut reader = ByteReader::new(data);
        let version = Self::read_file_header(&mut reader, config)?;

        let mut headers = Vec::new();
        while !reader.is_empty() {
            let header = Self::read_chunk_header(&mut reader)?;
            reader.skip(header.content_size)?;
            headers.push(header);
        }
        Ok((version, headers))
    }

    /// Checks the magic number and returns the version.
    fn read_file_header(reader: &mut ByteReader<'_>, config: &ImportConfig) -> VoxResult<u32> {
        let magic = reader
            .read_array::<4>()
            .map_err(|_| VoxError::InvalidFormat("file is shorter than the VOX signature".to_string()))?;
        if magic != VOX_MAGIC {
            return Err(VoxError::InvalidFormat(format!(
                "Expected 'VOX ', got '{}'",
                String::from_utf8_lossy(&magic)
            )));
        }

        let version = reader.read_u32()?;
        if version < config.minimum_version {
            return Err(VoxError::VersionTooOld {
                version,
                minimum: config.minimum_version,
            });
        }
        if version > NEWEST_KNOWN_VERSION {
            warn!("VOX version {} is newer than {}; unknown chunks will be skipped", version, NEWEST_KNOWN_VERSION);
        }
        Ok(version)
    }

    /// Reads tag, content size and children size.
    fn read_chunk_header(reader: &mut ByteReader<'_>) -> VoxResult<ChunkHeader> {
        let offset = reader.offset();
        let tag = reader.read_array::<4>()?;
        let content_size = reader.read_len()?;
        let children_size = reader.read_len()?;
        Ok(ChunkHeader {
            tag,
            content_size,
            children_size,
            offset,
        })
    }

    /// `SIZE`: x, y, z. Allocates the grid with Y and Z swapped.
    fn read_size(content: &mut ByteReader<'_>) -> VoxResult<VoxelGrid> {
        let size_x = content.read_u32()?;
        let size_y = content.read_u32()?;
        let size_z = content.read_u32()?;

        if [size_x, size_y, size_z].iter().any(|&s| s > MAX_MODEL_EXTENT) {
            return Err(VoxError::InvalidFormat(format!(
                "model size {size_x}x{size_y}x{size_z} exceeds {MAX_MODEL_EXTENT} per axis"
            )));
        }

        debug!("Vox size: {}x{}x{}", size_x, size_y, size_z);

        // Reverse Y<>Z: file is Z-up, grid is Y-up
        Ok(VoxelGrid::allocate(size_x, size_z, size_y)?)
    }

    /// `XYZI`: voxel count, then (x, y, z, index) per voxel.
    fn read_voxels(content: &mut ByteReader<'_>, grid: &mut VoxelGrid) -> VoxResult<usize> {
        let count = content.read_len()?;
        let depth = grid.size()[2];

        for _ in 0..count {
            let [x, y, z, index] = content.read_array::<4>()?;
            let out_of_bounds = || VoxError::VoxelOutOfBounds { x, y, z };

            // Mirror file Y into grid Z
            let flipped = depth
                .checked_sub(u32::from(y) + 1)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(out_of_bounds)?;

            grid.set(i32::from(x), i32::from(z), flipped, index)
                .map_err(|e| match e {
                    CoreError::OutOfBounds { .. } => out_of_bounds(),
                    other => VoxError::Core(other),
                })?;
        }
        Ok(count)
    }

    /// `RGBA`: 256 colors; file entry `i` fills palette slot `i + 1`.
    fn read_palette(content: &mut ByteReader<'_>) -> VoxResult<VoxPalette> {
        let mut entries = [VoxColor::EMPTY; PALETTE_SIZE];
        for entry in &mut entries {
            let [r, g, b, a] = content.read_array::<4>()?;
            *entry = VoxColor::new(r, g, b, a);
        }
        Ok(VoxPalette::from_file_entries(&entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Appends one chunk record.
    fn chunk(out: &mut Vec<u8>, tag: &[u8; 4], content: &[u8]) {
        out.extend_from_slice(tag);
        out.extend_from_slice(&(content.len() as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(content);
    }

    fn header(version: u32) -> Vec<u8> {
        let mut out = VOX_MAGIC.to_vec();
        out.extend_from_slice(&version.to_le_bytes());
        out
    }

    fn size_content(x: u32, y: u32, z: u32) -> Vec<u8> {
        [x, y, z].iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn xyzi_content(voxels: &[[u8; 4]]) -> Vec<u8> {
        let mut out = (voxels.len() as u32).to_le_bytes().to_vec();
        for v in voxels {
            out.extend_from_slice(v);
        }
        out
    }

    #[test]
    fn test_load_from_bytes_invalid() {
        let result = VoxLoader::load_from_memory(b"invalid data", &ImportConfig::default());
        assert!(matches!(result, Err(VoxError::InvalidFormat(_))));
    }

    #[test]
    fn test_short_signature_is_invalid_format() {
        let result = VoxLoader::load_from_memory(b"VO", &ImportConfig::default());
        assert!(matches!(result, Err(VoxError::InvalidFormat(_))));
    }

    #[test]
    fn test_version_too_old() {
        let data = header(149);
        match VoxLoader::load_from_memory(&data, &ImportConfig::default()) {
            Err(VoxError::VersionTooOld { version, minimum }) => {
                assert_eq!(version, 149);
                assert_eq!(minimum, 150);
            }
            other => panic!("Expected VersionTooOld, got {other:?}"),
        }
    }

    #[test]
    fn test_axis_conversion() {
        let mut data = header(150);
        chunk(&mut data, b"MAIN", &[]);
        chunk(&mut data, &TAG_SIZE, &size_content(3, 4, 5));
        chunk(&mut data, &TAG_XYZI, &xyzi_content(&[[1, 0, 2, 7], [2, 3, 4, 8]]));

        let model = VoxLoader::load_from_memory(&data, &ImportConfig::default()).unwrap();
        assert_eq!(model.size(), [3, 5, 4]);
        // (x, y, z) -> (x, z, size_z - y - 1) with grid size_z = file size_y = 4
        assert_eq!(model.grid().get(1, 2, 3), 7);
        assert_eq!(model.grid().get(2, 4, 0), 8);
        assert_eq!(model.grid().solid_count(), 2);
    }

    #[test]
    fn test_xyzi_before_size() {
        let mut data = header(150);
        chunk(&mut data, &TAG_XYZI, &xyzi_content(&[[0, 0, 0, 1]]));
        chunk(&mut data, &TAG_SIZE, &size_content(1, 1, 1));

        let result = VoxLoader::load_from_memory(&data, &ImportConfig::default());
        assert!(matches!(result, Err(VoxError::MissingChunk("SIZE"))));
    }

    #[test]
    fn test_missing_size() {
        let mut data = header(150);
        chunk(&mut data, b"MAIN", &[]);
        let result = VoxLoader::load_from_memory(&data, &ImportConfig::default());
        assert!(matches!(result, Err(VoxError::MissingChunk("SIZE"))));
    }

    #[test]
    fn test_voxel_outside_declared_size() {
        let mut data = header(150);
        chunk(&mut data, &TAG_SIZE, &size_content(2, 2, 2));
        chunk(&mut data, &TAG_XYZI, &xyzi_content(&[[0, 2, 0, 1]]));

        match VoxLoader::load_from_memory(&data, &ImportConfig::default()) {
            Err(VoxError::VoxelOutOfBounds { x, y, z }) => assert_eq!((x, y, z), (0, 2, 0)),
            other => panic!("Expected VoxelOutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_voxel_records() {
        let mut data = header(150);
        chunk(&mut data, &TAG_SIZE, &size_content(2, 2, 2));
        // Declares 3 voxels but carries only one
        let mut content = 3u32.to_le_bytes().to_vec();
        content.extend_from_slice(&[0, 0, 0, 1]);
        chunk(&mut data, &TAG_XYZI, &content);

        let result = VoxLoader::load_from_memory(&data, &ImportConfig::default());
        assert!(matches!(result, Err(VoxError::Truncated { .. })));
    }

    #[test]
    fn test_chunk_content_past_end() {
        let mut data = header(150);
        data.extend_from_slice(b"SIZE");
        data.extend_from_slice(&12u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[1, 0, 0, 0]);

        let result = VoxLoader::load_from_memory(&data, &ImportConfig::default());
        assert!(matches!(result, Err(VoxError::Truncated { offset: 20, needed: 12, available: 4 })));
    }

    #[test]
    fn test_unknown_chunks_are_skipped() {
        let mut data = header(150);
        chunk(&mut data, b"MAIN", &[]);
        chunk(&mut data, b"PACK", &1u32.to_le_bytes());
        chunk(&mut data, &TAG_SIZE, &size_content(1, 1, 1));
        chunk(&mut data, b"nTRN", &[0xAA; 27]);
        chunk(&mut data, &TAG_XYZI, &xyzi_content(&[[0, 0, 0, 5]]));
        chunk(&mut data, b"MATL", &[0x55; 9]);

        let model = VoxLoader::load_from_memory(&data, &ImportConfig::default()).unwrap();
        assert_eq!(model.grid().get(0, 0, 0), 5);
    }

    #[test]
    fn test_palette_chunk() {
        let mut rgba = Vec::with_capacity(1024);
        for i in 0..=255u8 {
            rgba.extend_from_slice(&[i, 255 - i, 0, 255]);
        }
        let mut data = header(150);
        chunk(&mut data, &TAG_SIZE, &size_content(1, 1, 1));
        chunk(&mut data, &TAG_RGBA, &rgba);

        let model = VoxLoader::load_from_memory(&data, &ImportConfig::default()).unwrap();
        assert_eq!(model.palette().get(0), VoxColor::EMPTY);
        assert_eq!(model.palette().get(1), VoxColor::new(0, 255, 0, 255));
        assert_eq!(model.palette().get(255), VoxColor::new(254, 1, 0, 255));
    }

    #[test]
    fn test_palette_fallback() {
        let mut data = header(150);
        chunk(&mut data, &TAG_SIZE, &size_content(1, 1, 1));

        let model = VoxLoader::load_from_memory(&data, &ImportConfig::default()).unwrap();
        assert_eq!(model.palette(), &VoxPalette::default());

        let config = ImportConfig {
            default_palette: false,
            ..ImportConfig::default()
        };
        let model = VoxLoader::load_from_memory(&data, &config).unwrap();
        assert_eq!(model.palette(), &VoxPalette::empty());
    }

    #[test]
    fn test_extra_models_are_skipped() {
        let mut data = header(150);
        chunk(&mut data, &TAG_SIZE, &size_content(2, 2, 2));
        chunk(&mut data, &TAG_XYZI, &xyzi_content(&[[0, 0, 0, 1]]));
        chunk(&mut data, &TAG_SIZE, &size_content(9, 9, 9));
        chunk(&mut data, &TAG_XYZI, &xyzi_content(&[[8, 8, 8, 2]]));

        let model = VoxLoader::load_from_memory(&data, &ImportConfig::default()).unwrap();
        assert_eq!(model.size(), [2, 2, 2]);
        assert_eq!(model.skipped_models(), 1);
        assert_eq!(model.grid().solid_count(), 1);
    }

    #[test]
    fn test_size_larger_than_byte_coordinates_is_rejected() {
        for (x, y, z) in [(65536, 1, 1), (1, 65536, 1), (1, 1, 257)] {
            let mut data = header(150);
            chunk(&mut data, &TAG_SIZE, &size_content(x, y, z));
            chunk(&mut data, &TAG_XYZI, &xyzi_content(&[[0, 0, 0, 1]]));

            let result = VoxLoader::load_from_memory(&data, &ImportConfig::default());
            assert!(matches!(result, Err(VoxError::InvalidFormat(_))), "{x}x{y}x{z}");
        }

        let mut data = header(150);
        chunk(&mut data, &TAG_SIZE, &size_content(256, 256, 256));
        chunk(&mut data, &TAG_XYZI, &xyzi_content(&[[255, 255, 255, 1]]));
        let model = VoxLoader::load_from_memory(&data, &ImportConfig::default()).unwrap();
        assert_eq!(model.grid().get(255, 255, 0), 1);
        assert_eq!(model.grid().chunks_allocated(), 1);
    }

    #[test]
    fn test_voxels_after_second_size_are_not_merged() {
        let mut data = header(150);
        chunk(&mut data, &TAG_SIZE, &size_content(2, 2, 2));
        chunk(&mut data, &TAG_SIZE, &size_content(4, 4, 4));
        chunk(&mut data, &TAG_XYZI, &xyzi_content(&[[1, 1, 1, 3]]));

        let model = VoxLoader::load_from_memory(&data, &ImportConfig::default()).unwrap();
        assert_eq!(model.size(), [2, 2, 2]);
        assert_eq!(model.skipped_models(), 1);
        assert!(model.grid().is_empty());
    }

    #[test]
    fn test_scan_chunks() {
        let mut data = header(200);
        chunk(&mut data, b"MAIN", &[]);
        chunk(&mut data, &TAG_SIZE, &size_content(1, 1, 1));

        let (version, headers) = VoxLoader::scan_chunks(&data, &ImportConfig::default()).unwrap();
        assert_eq!(version, 200);
        let names: Vec<String> = headers.iter().map(ChunkHeader::tag_name).collect();
        assert_eq!(names, ["MAIN", "SIZE"]);
        assert_eq!(headers[1].offset, 8 + ChunkHeader::SIZE);
        assert_eq!(headers[1].content_size, 12);
    }

    #[test]
    fn test_load_missing_file() {
        let result = VoxLoader::load("definitely/not/here.vox", &ImportConfig::default());
        assert!(matches!(result, Err(VoxError::FileNotFound(_))));
    }
}

//! Asset management system
//!
//! Parsers for OBJ and MTL text, the mesh builder, the texture table and
//! the [`ModelLoader`] that ties them together. All file access goes through
//! [`AssetSource`], so models can be served from disk or from memory.

pub mod text_format;
pub mod obj_parser;
pub mod mesh;
pub mod materials;
pub mod image_loader;
pub mod textures;
pub mod model_loader;

pub use text_format::ParseWarning;
pub use obj_parser::{ObjParser, ObjData, ObjError, Geometry, GeometryData, FaceVertex, IndexSlot};
pub use mesh::{Mesh, MeshError, Vertex, VertexAttributes};
pub use materials::{
    MtlParser, MtlData, MtlError,
    Material, merge_material,
    TextureMapKind,
};
pub use image_loader::ImageData;
pub use textures::{Texture, TextureKey, TextureSource, TextureStatus, TextureTable};
pub use model_loader::{ColorAttribute, Model, ModelLoader, ModelPart};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Where asset bytes come from
///
/// The loader never touches the filesystem or network directly; it asks a
/// source for the bytes behind a path.
pub trait AssetSource {
    /// Read the raw bytes behind `path`
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, AssetError>;

    /// Read `path` as UTF-8 text
    fn read_text(&self, path: &Path) -> Result<String, AssetError> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes)
            .map_err(|e| AssetError::InvalidData(format!("{}: {}", path.display(), e)))
    }
}

/// Reads assets from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl AssetSource for FileSource {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        log::debug!("Reading asset: {:?}", path);
        std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(path.display().to_string()),
            _ => AssetError::IoError(e),
        })
    }
}

/// In-memory assets keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the contents behind `path`
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl AssetSource for MemorySource {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.display().to_string()))
    }
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// OBJ parsing failed (strict mode)
    #[error("OBJ error: {0}")]
    Obj(#[from] ObjError),

    /// MTL parsing failed (strict mode)
    #[error("MTL error: {0}")]
    Mtl(#[from] MtlError),

    /// Geometry could not be indexed (strict mode)
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_reads_text() {
        let source = MemorySource::new().with("models/cube.obj", "v 0 0 0\n");

        assert_eq!(source.read_text(Path::new("models/cube.obj")).unwrap(), "v 0 0 0\n");
        assert!(matches!(
            source.read_text(Path::new("models/missing.obj")),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_invalid_data() {
        let source = MemorySource::new().with("bad.mtl", vec![0xff, 0xfe]);
        assert!(matches!(source.read_text(Path::new("bad.mtl")), Err(AssetError::InvalidData(_))));
    }

    #[test]
    fn test_file_source_missing_file() {
        let result = FileSource.read_bytes(Path::new("nonexistent_file.obj"));
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }
}

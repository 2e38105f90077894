//! Texture table shared by the parts of a model
//!
//! Textures are deduplicated by resolved path: two materials naming the
//! same file share one entry. Slot 0 is always a 1x1 white texture that
//! stands in for missing diffuse and specular maps.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use slotmap::{new_key_type, SlotMap};

use super::image_loader::ImageData;

new_key_type! {
    /// Handle to a texture in a [`TextureTable`]
    pub struct TextureKey;
}

/// Color of the default texture
pub const DEFAULT_WHITE: [u8; 4] = [255, 255, 255, 255];

/// Where a texture's pixels come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// Generated single color
    SolidColor([u8; 4]),
    /// Image file, resolved relative to the model
    File(PathBuf),
}

/// Decode state of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureStatus {
    /// Path recorded, pixels not decoded
    NotLoaded,
    /// Pixels decoded from the source
    Loaded,
    /// Decoding failed; the default white image is used instead
    Fallback,
}

/// A texture entry
#[derive(Debug, Clone)]
pub struct Texture {
    /// Pixel origin
    pub source: TextureSource,
    /// Decoded pixels, if any
    pub image: Option<ImageData>,
    /// Decode state
    pub status: TextureStatus,
}

/// Deduplicating texture storage
#[derive(Debug)]
pub struct TextureTable {
    textures: SlotMap<TextureKey, Texture>,
    by_path: HashMap<PathBuf, TextureKey>,
    default_white: TextureKey,
}

impl Default for TextureTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureTable {
    /// Create a table holding only the default white texture
    pub fn new() -> Self {
        let mut textures = SlotMap::with_key();
        let default_white = textures.insert(Texture {
            source: TextureSource::SolidColor(DEFAULT_WHITE),
            image: Some(ImageData::solid_color(1, 1, DEFAULT_WHITE)),
            status: TextureStatus::Loaded,
        });

        Self {
            textures,
            by_path: HashMap::new(),
            default_white,
        }
    }

    /// Key of the 1x1 white texture
    pub const fn default_white(&self) -> TextureKey {
        self.default_white
    }

    /// Key for `path`, inserting it on first use
    ///
    /// `decode` runs once per distinct path. `None` means decoding is
    /// disabled; `Some(Err(_))` falls back to white pixels.
    pub fn get_or_insert_with<F, E>(&mut self, path: &Path, decode: F) -> TextureKey
    where
        F: FnOnce(&Path) -> Option<Result<ImageData, E>>,
        E: std::fmt::Display,
    {
        if let Some(&key) = self.by_path.get(path) {
            return key;
        }

        let (image, status) = match decode(path) {
            None => (None, TextureStatus::NotLoaded),
            Some(Ok(image)) => (Some(image), TextureStatus::Loaded),
            Some(Err(e)) => {
                log::warn!("Texture {:?} failed to load ({}), using white", path, e);
                (Some(ImageData::solid_color(1, 1, DEFAULT_WHITE)), TextureStatus::Fallback)
            }
        };

        let key = self.textures.insert(Texture {
            source: TextureSource::File(path.to_path_buf()),
            image,
            status,
        });
        self.by_path.insert(path.to_path_buf(), key);
        key
    }

    /// Look up a texture
    pub fn get(&self, key: TextureKey) -> Option<&Texture> {
        self.textures.get(key)
    }

    /// Number of textures, including the default
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Always false: the default texture is present
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Iterate over all textures
    pub fn iter(&self) -> impl Iterator<Item = (TextureKey, &Texture)> {
        self.textures.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_white_present() {
        let table = TextureTable::new();
        let white = table.get(table.default_white()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(white.source, TextureSource::SolidColor(DEFAULT_WHITE));
        assert_eq!(white.image.as_ref().unwrap().data, DEFAULT_WHITE.to_vec());
    }

    #[test]
    fn test_paths_deduplicated() {
        let mut table = TextureTable::new();
        let mut decodes = 0;

        let a = table.get_or_insert_with(Path::new("tex/wood.png"), |_| {
            decodes += 1;
            None::<Result<ImageData, String>>
        });
        let b = table.get_or_insert_with(Path::new("tex/wood.png"), |_| {
            decodes += 1;
            None::<Result<ImageData, String>>
        });

        assert_eq!(a, b);
        assert_eq!(decodes, 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(a).unwrap().status, TextureStatus::NotLoaded);
    }

    #[test]
    fn test_failed_decode_falls_back_to_white() {
        let mut table = TextureTable::new();
        let key = table.get_or_insert_with(Path::new("missing.png"), |_| Some(Err("not found")));
        let texture = table.get(key).unwrap();

        assert_eq!(texture.status, TextureStatus::Fallback);
        assert_eq!(texture.image.as_ref().unwrap().width, 1);
    }

    #[test]
    fn test_iter_visits_default_then_files() {
        let mut table = TextureTable::new();
        table.get_or_insert_with(Path::new("a.png"), |_| None::<Result<ImageData, String>>);
        table.get_or_insert_with(Path::new("b.png"), |_| Some(Err("corrupt")));

        let sources: Vec<TextureSource> = table.iter().map(|(_, t)| t.source.clone()).collect();
        assert_eq!(
            sources,
            vec![
                TextureSource::SolidColor(DEFAULT_WHITE),
                TextureSource::File("a.png".into()),
                TextureSource::File("b.png".into()),
            ]
        );
        assert_eq!(table.iter().filter(|(_, t)| t.status == TextureStatus::Fallback).count(), 1);
    }
}

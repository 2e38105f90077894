//! Image loading utilities for texture data
//!
//! Provides PNG and JPEG decoding for use with the texture table.

use crate::assets::AssetError;

/// Decoded image data ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (always 4 for RGBA)
    pub channels: u8,
}

impl ImageData {
    /// Decode an encoded image (PNG, JPEG) into RGBA8
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to decode image: {e}")))?;

        // Convert to RGBA8 format (standard for GPU upload)
        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::debug!("Decoded image {}x{}", width, height);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    /// Create a solid color image (used for default textures)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        let data = color.repeat(pixel_count);

        Self {
            data,
            width,
            height,
            channels: 4,
        }
    }
}

//! Resolved material records
//!
//! [`MtlData`] only holds what a file declared. Renderers need every field,
//! so parsed records are merged over a default record field by field.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::mtl_parser::MtlData;
use super::texture_map::TextureMapKind;
use crate::foundation::math::Vec3;

/// Fully populated Phong material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Diffuse color
    pub diffuse: Vec3,
    /// Ambient color
    pub ambient: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Emissive color
    pub emissive: Vec3,
    /// Specular exponent
    pub shininess: f32,
    /// Opacity, 1.0 = opaque
    pub opacity: f32,
    /// Index of refraction
    pub optical_density: f32,
    /// MTL illumination model
    pub illumination_model: u32,
    /// Texture map filenames by map type
    pub maps: BTreeMap<TextureMapKind, String>,
}

impl Default for Material {
    /// White diffuse, black ambient, white specular, shininess 400, opaque, no maps
    fn default() -> Self {
        Self {
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            ambient: Vec3::new(0.0, 0.0, 0.0),
            specular: Vec3::new(1.0, 1.0, 1.0),
            emissive: Vec3::new(0.0, 0.0, 0.0),
            shininess: 400.0,
            opacity: 1.0,
            optical_density: 1.0,
            illumination_model: 2,
            maps: BTreeMap::new(),
        }
    }
}

impl Material {
    /// Resolve a material name against parsed records
    ///
    /// Missing names resolve to `default` unchanged.
    pub fn resolve(materials: &HashMap<String, MtlData>, name: &str, default: &Self) -> Self {
        materials.get(name).map_or_else(
            || {
                log::debug!("Material '{}' not found, using default", name);
                default.clone()
            },
            |parsed| merge_material(default, parsed),
        )
    }

    /// Whether the material needs blending
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Apply every declared field of `parsed` over `default`
///
/// Texture maps are merged per map type, so a default diffuse map survives
/// a parsed record that only declares a bump map.
pub fn merge_material(default: &Material, parsed: &MtlData) -> Material {
    let mut maps = default.maps.clone();
    maps.extend(parsed.maps.iter().map(|(kind, path)| (kind.clone(), path.clone())));

    Material {
        diffuse: parsed.diffuse.unwrap_or(default.diffuse),
        ambient: parsed.ambient.unwrap_or(default.ambient),
        specular: parsed.specular.unwrap_or(default.specular),
        emissive: parsed.emissive.unwrap_or(default.emissive),
        shininess: parsed.shininess.unwrap_or(default.shininess),
        opacity: parsed.opacity.unwrap_or(default.opacity),
        optical_density: parsed.optical_density.unwrap_or(default.optical_density),
        illumination_model: parsed.illumination_model.unwrap_or(default.illumination_model),
        maps,
    }
}

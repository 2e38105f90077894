//! Model loader: OBJ + MTL + textures into renderer-ready parts
//!
//! Material libraries and texture maps are resolved relative to the OBJ's
//! own location. Every chunk is paired with its material (or the default
//! record when the name is unknown) and its texture bindings.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::image_loader::ImageData;
use super::materials::{Material, MtlData, MtlParser, TextureMapKind};
use super::mesh::Mesh;
use super::obj_parser::{Geometry, GeometryData, ObjParser};
use super::text_format::ParseWarning;
use super::textures::{TextureKey, TextureTable};
use super::{AssetError, AssetSource};
use crate::config::LoaderConfig;
use crate::foundation::math::Extents;

/// Constant color bound when a part has no usable vertex colors
pub const DEFAULT_VERTEX_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// How a part's color attribute is supplied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorAttribute {
    /// `GeometryData::color`, 3 components per vertex
    PerVertex,
    /// One value for every vertex
    Constant([f32; 4]),
}

/// A chunk with its resolved material and texture bindings
#[derive(Debug, Clone)]
pub struct ModelPart {
    /// Display name (object, group or material)
    pub name: String,
    /// Material name as written in the OBJ
    pub material_name: String,
    /// Resolved material
    pub material: Material,
    /// Texture per map type; diffuse and specular always bound
    pub textures: BTreeMap<TextureMapKind, TextureKey>,
    /// Flat attribute arrays
    pub data: GeometryData,
    /// Color attribute binding
    pub colors: ColorAttribute,
    /// Deduplicated mesh, `None` when the flat arrays are ragged
    pub mesh: Option<Mesh>,
}

/// A loaded model
#[derive(Debug)]
pub struct Model {
    /// Renderable parts in source order
    pub parts: Vec<ModelPart>,
    /// Textures referenced by the parts
    pub textures: TextureTable,
    /// Material library paths that were requested, resolved
    pub material_libs: Vec<PathBuf>,
    /// Bounds over every part's positions
    pub extents: Option<Extents>,
    /// Non-fatal problems from the OBJ and MTL sources
    pub warnings: Vec<ParseWarning>,
}

impl Model {
    /// Total number of triangles
    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.data.triangle_count()).sum()
    }
}

/// Loads OBJ models together with their materials and textures
#[derive(Debug, Clone, Default)]
pub struct ModelLoader {
    config: LoaderConfig,
}

impl ModelLoader {
    /// Create a loader
    pub const fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Loader configuration
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load the OBJ at `obj_path` and everything it references
    ///
    /// # Errors
    /// Fails when the OBJ cannot be read. In strict mode also fails on
    /// malformed OBJ/MTL data, ragged geometry, or (with
    /// `require_material_libs`) an unreadable material library.
    pub fn load<S>(&self, source: &S, obj_path: impl AsRef<Path>) -> Result<Model, AssetError>
    where
        S: AssetSource + ?Sized,
    {
        let obj_path = obj_path.as_ref();
        let base = obj_path.parent().unwrap_or_else(|| Path::new(""));
        log::info!("Loading model {:?}", obj_path);

        let text = source.read_text(obj_path)?;
        let obj = if self.config.strict {
            ObjParser::parse_strict(&text)?
        } else {
            ObjParser::parse(&text)
        };
        let mut warnings = obj.warnings;

        let material_libs: Vec<PathBuf> = obj.material_libs.iter().map(|lib| base.join(lib)).collect();
        let materials = self.load_materials(source, &material_libs, &mut warnings)?;

        let mut textures = TextureTable::new();
        let mut parts = Vec::with_capacity(obj.geometries.len());
        for geometry in obj.geometries {
            parts.push(self.build_part(source, base, geometry, &materials, &mut textures)?);
        }

        let extents = Extents::from_position_sets(parts.iter().map(|p| p.data.position.as_slice()));

        log::info!(
            "Loaded {:?}: {} parts, {} materials, {} textures",
            obj_path,
            parts.len(),
            materials.len(),
            textures.len()
        );

        Ok(Model {
            parts,
            textures,
            material_libs,
            extents,
            warnings,
        })
    }

    /// Read every library and parse them as one MTL document
    fn load_materials<S>(
        &self,
        source: &S,
        libs: &[PathBuf],
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<HashMap<String, MtlData>, AssetError>
    where
        S: AssetSource + ?Sized,
    {
        let mut texts = Vec::with_capacity(libs.len());
        for path in libs {
            match source.read_text(path) {
                Ok(text) => texts.push(text),
                Err(e) if !self.config.require_material_libs => {
                    log::warn!("Material library {:?} unavailable ({}), using defaults", path, e);
                }
                Err(e) => return Err(e),
            }
        }

        let joined = texts.join("\n");
        if self.config.strict {
            Ok(MtlParser::parse_strict(&joined)?)
        } else {
            let (materials, mtl_warnings) = MtlParser::parse_with_warnings(&joined);
            warnings.extend(mtl_warnings);
            Ok(materials)
        }
    }

    fn build_part<S>(
        &self,
        source: &S,
        base: &Path,
        geometry: Geometry,
        materials: &HashMap<String, MtlData>,
        textures: &mut TextureTable,
    ) -> Result<ModelPart, AssetError>
    where
        S: AssetSource + ?Sized,
    {
        let name = geometry.name();
        let material = Material::resolve(materials, &geometry.material, &self.config.default_material);

        let mut bindings = BTreeMap::new();
        for (kind, filename) in &material.maps {
            let key = textures.get_or_insert_with(&base.join(filename), |path| self.decode(source, path));
            bindings.insert(kind.clone(), key);
        }
        for kind in [TextureMapKind::Diffuse, TextureMapKind::Specular] {
            bindings.entry(kind).or_insert_with(|| textures.default_white());
        }

        let data = geometry.data;
        let colors = if !data.color.is_empty() && data.color.len() == data.position.len() {
            ColorAttribute::PerVertex
        } else {
            ColorAttribute::Constant(DEFAULT_VERTEX_COLOR)
        };

        let mesh = match Mesh::from_geometry(&data) {
            Ok(mesh) => Some(mesh),
            Err(e) if !self.config.strict => {
                log::warn!("Part '{}' kept flat only: {}", name, e);
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ModelPart {
            name,
            material_name: geometry.material,
            material,
            textures: bindings,
            data,
            colors,
            mesh,
        })
    }

    fn decode<S>(&self, source: &S, path: &Path) -> Option<Result<ImageData, AssetError>>
    where
        S: AssetSource + ?Sized,
    {
        if !self.config.decode_textures {
            return None;
        }
        Some(source.read_bytes(path).and_then(|bytes| ImageData::from_bytes(&bytes)))
    }
}

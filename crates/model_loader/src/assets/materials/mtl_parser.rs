//! MTL (Material Template Library) file parser
//!
//! Parses Wavefront .mtl files into structured data for material creation.
//! Only properties that are actually declared are recorded; defaults are
//! applied later by [`merge_material`](super::merge_material).

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::texture_map::TextureMapKind;
use crate::assets::text_format::{self, Line, ParseWarning};
use crate::foundation::math::Vec3;

/// MTL parsing errors (strict mode only)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MtlError {
    /// Malformed numeric value or missing argument
    #[error("Parse error: {0}")]
    ParseError(ParseWarning),
}

/// Parsed MTL material data (Wavefront Phong model)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MtlData {
    /// Material name
    pub name: String,
    /// Ambient color (Ka)
    pub ambient: Option<Vec3>,
    /// Diffuse color (Kd)
    pub diffuse: Option<Vec3>,
    /// Specular color (Ks)
    pub specular: Option<Vec3>,
    /// Emissive color (Ke)
    pub emissive: Option<Vec3>,
    /// Specular exponent (Ns)
    pub shininess: Option<f32>,
    /// Opacity, from dissolve (d) or inverted transparency (Tr)
    pub opacity: Option<f32>,
    /// Index of refraction (Ni)
    pub optical_density: Option<f32>,
    /// Illumination model (illum)
    pub illumination_model: Option<u32>,
    /// Texture map filenames by map type
    pub maps: BTreeMap<TextureMapKind, String>,
}

impl MtlData {
    /// Create an empty record for `name`
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Keywords understood by the material parser
#[derive(Debug, Clone, PartialEq, Eq)]
enum MtlKeyword {
    NewMaterial,
    Ambient,
    Diffuse,
    Specular,
    Emissive,
    Shininess,
    Dissolve,
    Transparency,
    OpticalDensity,
    Illumination,
    Map(TextureMapKind),
    Unknown,
}

impl MtlKeyword {
    fn from_token(token: &str) -> Self {
        match token {
            "newmtl" => Self::NewMaterial,
            "Ka" => Self::Ambient,
            "Kd" => Self::Diffuse,
            "Ks" => Self::Specular,
            "Ke" => Self::Emissive,
            "Ns" => Self::Shininess,
            "d" => Self::Dissolve,
            "Tr" => Self::Transparency,
            "Ni" => Self::OpticalDensity,
            "illum" => Self::Illumination,
            _ => TextureMapKind::from_keyword(token).map_or(Self::Unknown, Self::Map),
        }
    }
}

/// Mutable context threaded through every line
#[derive(Default)]
struct MtlState {
    materials: HashMap<String, MtlData>,
    current: Option<MtlData>,
    warnings: Vec<ParseWarning>,
}

impl MtlState {
    fn process_line(&mut self, line: &Line<'_>) {
        let keyword = MtlKeyword::from_token(line.keyword);

        match keyword {
            MtlKeyword::NewMaterial => {
                // Save previous material if exists
                self.commit();
                if line.rest.is_empty() {
                    self.warnings.push(ParseWarning::MissingArgument {
                        line: line.number,
                        keyword: line.keyword.to_string(),
                        expected: 1,
                    });
                }
                self.current = Some(MtlData::named(line.rest));
            }
            MtlKeyword::Unknown => {
                log::debug!("Ignoring MTL keyword '{}' on line {}", line.keyword, line.number);
            }
            property => {
                let Some(mut material) = self.current.take() else {
                    log::warn!("MTL '{}' on line {} precedes any newmtl", line.keyword, line.number);
                    self.warnings.push(ParseWarning::OutsideMaterial {
                        line: line.number,
                        keyword: line.keyword.to_string(),
                    });
                    return;
                };
                self.apply(&mut material, property, line);
                self.current = Some(material);
            }
        }
    }

    fn apply(&mut self, material: &mut MtlData, property: MtlKeyword, line: &Line<'_>) {
        let warnings = &mut self.warnings;

        match property {
            MtlKeyword::Ambient => material.ambient = Some(read_color(line, warnings)),
            MtlKeyword::Diffuse => material.diffuse = Some(read_color(line, warnings)),
            MtlKeyword::Specular => material.specular = Some(read_color(line, warnings)),
            MtlKeyword::Emissive => material.emissive = Some(read_color(line, warnings)),
            MtlKeyword::Shininess => material.shininess = Some(read_scalar(line, warnings)),
            MtlKeyword::Dissolve => material.opacity = Some(read_scalar(line, warnings)),
            MtlKeyword::Transparency => {
                // Transparency (inverted dissolve): Tr = 1.0 - d
                material.opacity = Some(1.0 - read_scalar(line, warnings));
            }
            MtlKeyword::OpticalDensity => material.optical_density = Some(read_scalar(line, warnings)),
            MtlKeyword::Illumination => match line.args.first().map(|t| t.parse::<u32>()) {
                Some(Ok(model)) => material.illumination_model = Some(model),
                Some(Err(_)) => warnings.push(ParseWarning::InvalidNumber {
                    line: line.number,
                    token: line.args[0].to_string(),
                }),
                None => warnings.push(ParseWarning::MissingArgument {
                    line: line.number,
                    keyword: line.keyword.to_string(),
                    expected: 1,
                }),
            },
            MtlKeyword::Map(kind) => match texture_path(line) {
                Some(path) => {
                    material.maps.insert(kind, path.to_string());
                }
                None => warnings.push(ParseWarning::MissingArgument {
                    line: line.number,
                    keyword: line.keyword.to_string(),
                    expected: 1,
                }),
            },
            MtlKeyword::NewMaterial | MtlKeyword::Unknown => {}
        }
    }

    fn commit(&mut self) {
        if let Some(material) = self.current.take() {
            if self.materials.contains_key(&material.name) {
                log::warn!("MTL material '{}' declared twice, keeping the later one", material.name);
            }
            self.materials.insert(material.name.clone(), material);
        }
    }
}

fn read_color(line: &Line<'_>, warnings: &mut Vec<ParseWarning>) -> Vec3 {
    let [r, g, b] = text_format::read_floats::<3>(line, warnings);
    Vec3::new(r, g, b)
}

fn read_scalar(line: &Line<'_>, warnings: &mut Vec<ParseWarning>) -> f32 {
    let [value] = text_format::read_floats::<1>(line, warnings);
    value
}

/// Texture filename of a map line
///
/// Filenames may contain spaces, so the rest of the line is used. When the
/// line starts with option flags (`-bm 0.5 bump.png`), the last token is
/// taken as the filename.
fn texture_path<'a>(line: &Line<'a>) -> Option<&'a str> {
    if line.rest.starts_with('-') {
        line.args.last().copied()
    } else if line.rest.is_empty() {
        None
    } else {
        Some(line.rest)
    }
}

/// MTL file parser
pub struct MtlParser;

impl MtlParser {
    /// Parse MTL file contents into a map of material name -> `MtlData`
    ///
    /// Never fails; malformed values become NaN. Use
    /// [`parse_with_warnings`](Self::parse_with_warnings) to inspect problems.
    pub fn parse(contents: &str) -> HashMap<String, MtlData> {
        Self::parse_with_warnings(contents).0
    }

    /// Parse MTL contents and report skipped or degraded lines
    pub fn parse_with_warnings(contents: &str) -> (HashMap<String, MtlData>, Vec<ParseWarning>) {
        let mut state = MtlState::default();
        for line in text_format::lines(contents) {
            state.process_line(&line);
        }

        // Save final material
        state.commit();
        log::debug!("Parsed MTL: {} materials", state.materials.len());
        (state.materials, state.warnings)
    }

    /// Parse MTL contents, failing on the first malformed value
    pub fn parse_strict(contents: &str) -> Result<HashMap<String, MtlData>, MtlError> {
        let (materials, warnings) = Self::parse_with_warnings(contents);
        match warnings.into_iter().find(ParseWarning::is_malformed) {
            Some(warning) => Err(MtlError::ParseError(warning)),
            None => Ok(materials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_material() {
        let mtl_content = r"
# Simple material
newmtl TestMaterial
Ka 1.0 1.0 1.0
Kd 0.8 0.2 0.2
Ks 0.5 0.5 0.5
Ns 250.0
d 1.0
illum 2
";

        let materials = MtlParser::parse(mtl_content);
        assert_eq!(materials.len(), 1);

        let mat = materials.get("TestMaterial").unwrap();
        assert_eq!(mat.name, "TestMaterial");
        assert_eq!(mat.diffuse, Some(Vec3::new(0.8, 0.2, 0.2)));
        assert_eq!(mat.shininess, Some(250.0));
        assert_eq!(mat.opacity, Some(1.0));
        assert_eq!(mat.illumination_model, Some(2));
        assert_eq!(mat.emissive, None);
    }

    #[test]
    fn test_parse_material_with_textures() {
        let mtl_content = r"
newmtl TexturedMaterial
Kd 1.0 1.0 1.0
map_Kd textures/diffuse.png
map_Ns textures/shiny.png
map_Bump -bm 0.5 textures/normal.png
map_Ke textures/emission map.png
map_Foo custom.png
";

        let materials = MtlParser::parse(mtl_content);
        let mat = materials.get("TexturedMaterial").unwrap();

        assert_eq!(mat.maps.get(&TextureMapKind::Diffuse).map(String::as_str), Some("textures/diffuse.png"));
        assert_eq!(mat.maps.get(&TextureMapKind::SpecularExponent).map(String::as_str), Some("textures/shiny.png"));
        assert_eq!(mat.maps.get(&TextureMapKind::Bump).map(String::as_str), Some("textures/normal.png"));
        assert_eq!(mat.maps.get(&TextureMapKind::Emissive).map(String::as_str), Some("textures/emission map.png"));
        assert_eq!(
            mat.maps.get(&TextureMapKind::Other("map_Foo".to_string())).map(String::as_str),
            Some("custom.png")
        );
    }

    #[test]
    fn test_parse_multiple_materials() {
        let mtl_content = r"
newmtl Material1
Kd 1.0 0.0 0.0

newmtl Material2
Kd 0.0 1.0 0.0
";

        let materials = MtlParser::parse(mtl_content);
        assert_eq!(materials.len(), 2);

        assert_eq!(materials["Material1"].diffuse, Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(materials["Material2"].diffuse, Some(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_parse_transparency() {
        let materials = MtlParser::parse("newmtl TransparentMat\nTr 0.3\n");
        let mat = materials.get("TransparentMat").unwrap();

        // Tr = 1.0 - d, so Tr 0.3 means d = 0.7
        assert!((mat.opacity.unwrap() - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_dissolve_after_transparency_wins() {
        let materials = MtlParser::parse("newmtl Glass\nTr 0.3\nd 0.25\n");
        assert_eq!(materials["Glass"].opacity, Some(0.25));
    }

    #[test]
    fn test_last_write_wins() {
        let materials = MtlParser::parse("newmtl Paint\nKd 1 0 0\nKd 0 0 1\nmap_Kd a.png\nmap_Kd b.png\n");
        let mat = &materials["Paint"];

        assert_eq!(mat.diffuse, Some(Vec3::new(0.0, 0.0, 1.0)));
        assert_eq!(mat.maps[&TextureMapKind::Diffuse], "b.png");
    }

    #[test]
    fn test_unrecognized_properties_keep_material() {
        let (materials, warnings) = MtlParser::parse_with_warnings("newmtl Bare\nPr 0.5\nvendor_ext on\n");

        assert_eq!(materials["Bare"], MtlData::named("Bare"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_names_with_spaces() {
        let materials = MtlParser::parse("newmtl Red Velvet\nKd 0.5 0 0\n");
        assert!(materials.contains_key("Red Velvet"));
    }

    #[test]
    fn test_property_before_newmtl_is_skipped() {
        let (materials, warnings) = MtlParser::parse_with_warnings("Kd 1 1 1\nnewmtl A\n");

        assert_eq!(materials.len(), 1);
        assert_eq!(
            warnings,
            vec![ParseWarning::OutsideMaterial { line: 1, keyword: "Kd".to_string() }]
        );
    }

    #[test]
    fn test_malformed_value_is_nan_or_strict_error() {
        let materials = MtlParser::parse("newmtl A\nNs shiny\n");
        assert!(materials["A"].shininess.unwrap().is_nan());

        let err = MtlParser::parse_strict("newmtl A\nNs shiny\n").unwrap_err();
        assert_eq!(
            err,
            MtlError::ParseError(ParseWarning::InvalidNumber { line: 2, token: "shiny".to_string() })
        );
        assert!(MtlParser::parse_strict("newmtl A\nKd 1 1 1\n").is_ok());
    }

    #[test]
    fn test_empty_input() {
        assert!(MtlParser::parse("").is_empty());
        assert!(MtlParser::parse("# only comments\n").is_empty());
    }
}

//! OBJ file parser for 3D models
//!
//! Converts Wavefront OBJ text into flat, per-material vertex arrays. Faces
//! are fan triangulated and every referenced vertex is expanded in place, so
//! each chunk's arrays can be uploaded directly as vertex attributes (or
//! deduplicated through [`Mesh::from_geometry`](crate::assets::Mesh::from_geometry)).

use thiserror::Error;

use super::mesh::VertexAttributes;
use super::text_format::{self, Line, ParseWarning};

/// Material name used for faces that precede any `usemtl`
pub const DEFAULT_MATERIAL_NAME: &str = "default";

/// Group name recorded for a bare `g` line
pub const DEFAULT_GROUP_NAME: &str = "default";

/// OBJ parsing errors (strict mode only)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjError {
    /// Malformed numeric data or vertex reference
    #[error("Parse error: {0}")]
    ParseError(ParseWarning),
}

/// Flat vertex attribute arrays for one chunk
///
/// Every emitted vertex appends 3 floats to `position` (and 3 to `color`
/// when the source carries vertex colors). `texcoord` (2 floats) and
/// `normal` (3 floats) only grow for references that name them, so they may
/// be shorter than `position` when the source omits those components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    /// Positions, 3 floats per vertex
    pub position: Vec<f32>,
    /// Texture coordinates, 2 floats per vertex
    pub texcoord: Vec<f32>,
    /// Normals, 3 floats per vertex
    pub normal: Vec<f32>,
    /// Vertex colors, 3 floats per vertex, empty if the source has none
    pub color: Vec<f32>,
}

impl GeometryData {
    /// Number of emitted vertices
    pub fn vertex_count(&self) -> usize {
        self.position.len() / 3
    }

    /// Number of emitted triangles
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Attributes present for every vertex
    pub fn attributes(&self) -> VertexAttributes {
        let count = self.vertex_count();
        let mut attributes = VertexAttributes::empty();

        if count == 0 {
            return attributes;
        }
        attributes.set(VertexAttributes::POSITION, true);
        attributes.set(VertexAttributes::TEXCOORD, self.texcoord.len() == count * 2);
        attributes.set(VertexAttributes::NORMAL, self.normal.len() == count * 3);
        attributes.set(VertexAttributes::COLOR, self.color.len() == count * 3);
        attributes
    }
}

/// A run of triangles sharing one material
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Object name (`o`) active when the chunk was opened
    pub object: String,
    /// Group names (`g`) active when the chunk was opened
    pub groups: Vec<String>,
    /// Smoothing group (`s`) active when the chunk was opened
    pub smoothing_group: Option<u32>,
    /// Material name (`usemtl`), resolved later against the MTL mapping
    pub material: String,
    /// Triangulated vertex data
    pub data: GeometryData,
}

impl Geometry {
    /// Display name: the object name, else the group names, else the material
    pub fn name(&self) -> String {
        if !self.object.is_empty() {
            self.object.clone()
        } else if !self.groups.is_empty() {
            self.groups.join(" ")
        } else {
            self.material.clone()
        }
    }
}

/// Result of parsing an OBJ document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    /// Chunks with at least one vertex, in order of first use
    pub geometries: Vec<Geometry>,
    /// Material libraries named by `mtllib`, in order, duplicates kept
    pub material_libs: Vec<String>,
    /// Lines that were skipped or degraded
    pub warnings: Vec<ParseWarning>,
}

/// One component of a face vertex reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSlot {
    /// Component not written (`1//3` has no texcoord)
    Absent,
    /// 1-based index, or negative index relative to the end of the pool
    Index(i64),
    /// Component written but not an integer
    Invalid,
}

impl IndexSlot {
    fn parse(component: Option<&str>) -> Self {
        match component {
            None | Some("") => Self::Absent,
            Some(text) => text.parse().map_or(Self::Invalid, Self::Index),
        }
    }
}

/// A face corner as written: `p`, `p/t`, `p//n` or `p/t/n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    /// Position reference
    pub position: IndexSlot,
    /// Texture coordinate reference
    pub texcoord: IndexSlot,
    /// Normal reference
    pub normal: IndexSlot,
}

impl FaceVertex {
    /// Split a reference token into its slash separated components
    pub fn parse(token: &str) -> Self {
        let mut components = token.split('/');
        Self {
            position: IndexSlot::parse(components.next()),
            texcoord: IndexSlot::parse(components.next()),
            normal: IndexSlot::parse(components.next()),
        }
    }
}

/// Resolve an OBJ index against a pool whose slot 0 is a placeholder
///
/// Positive indices address the pool directly; negative ones count back
/// from the current end, so `-1` is the most recent entry.
pub fn resolve_index(index: i64, pool_len: usize) -> Option<usize> {
    let len = i64::try_from(pool_len).ok()?;
    let resolved = if index >= 0 { index } else { len + index };
    usize::try_from(resolved).ok().filter(|&i| i < pool_len)
}

/// Keywords understood by the geometry parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjKeyword {
    Position,
    Texcoord,
    Normal,
    Face,
    UseMaterial,
    MaterialLib,
    Object,
    Group,
    Smoothing,
    Unknown,
}

impl ObjKeyword {
    fn from_token(token: &str) -> Self {
        match token {
            "v" => Self::Position,
            "vt" => Self::Texcoord,
            "vn" => Self::Normal,
            "f" => Self::Face,
            "usemtl" => Self::UseMaterial,
            "mtllib" => Self::MaterialLib,
            "o" => Self::Object,
            "g" => Self::Group,
            "s" => Self::Smoothing,
            _ => Self::Unknown,
        }
    }
}

/// Raw attribute pools, each seeded with a placeholder at index 0
struct AttributePools {
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    // Parallel to `positions`; white where a `v` line carries no color.
    colors: Vec<[f32; 3]>,
    has_colors: bool,
}

impl AttributePools {
    fn new() -> Self {
        Self {
            positions: vec![[0.0; 3]],
            texcoords: vec![[0.0; 2]],
            normals: vec![[0.0; 3]],
            colors: vec![[1.0; 3]],
            has_colors: false,
        }
    }
}

/// Mutable context threaded through every line
struct ParserState {
    pools: AttributePools,
    geometries: Vec<Geometry>,
    material_libs: Vec<String>,
    material: String,
    object: String,
    groups: Vec<String>,
    smoothing_group: Option<u32>,
    warnings: Vec<ParseWarning>,
}

impl ParserState {
    fn new() -> Self {
        Self {
            pools: AttributePools::new(),
            geometries: Vec::new(),
            material_libs: Vec::new(),
            material: DEFAULT_MATERIAL_NAME.to_string(),
            object: String::new(),
            groups: Vec::new(),
            smoothing_group: None,
            warnings: Vec::new(),
        }
    }

    fn process_line(&mut self, line: &Line<'_>) {
        match ObjKeyword::from_token(line.keyword) {
            ObjKeyword::Position => {
                let position = text_format::read_floats::<3>(line, &mut self.warnings);
                self.pools.positions.push(position);

                // `v x y z r g b`; a lone 4th value is the ignored `w`
                let color = if line.args.len() >= 6 {
                    self.pools.has_colors = true;
                    let mut color = [0.0; 3];
                    for (value, token) in color.iter_mut().zip(&line.args[3..6]) {
                        *value = text_format::read_float(token, line.number, &mut self.warnings);
                    }
                    color
                } else {
                    [1.0; 3]
                };
                self.pools.colors.push(color);
            }
            ObjKeyword::Texcoord => {
                let texcoord = text_format::read_floats::<2>(line, &mut self.warnings);
                self.pools.texcoords.push(texcoord);
            }
            ObjKeyword::Normal => {
                let normal = text_format::read_floats::<3>(line, &mut self.warnings);
                self.pools.normals.push(normal);
            }
            ObjKeyword::Face => self.add_face(line),
            ObjKeyword::UseMaterial => {
                self.material = line.rest.to_string();
            }
            ObjKeyword::MaterialLib => {
                if line.args.is_empty() {
                    self.missing_argument(line, 1);
                } else {
                    self.material_libs.extend(line.args.iter().map(|lib| (*lib).to_string()));
                }
            }
            ObjKeyword::Object => {
                self.object = line.rest.to_string();
            }
            ObjKeyword::Group => {
                self.groups = if line.args.is_empty() {
                    vec![DEFAULT_GROUP_NAME.to_string()]
                } else {
                    line.args.iter().map(|g| (*g).to_string()).collect()
                };
            }
            ObjKeyword::Smoothing => self.set_smoothing_group(line),
            ObjKeyword::Unknown => {
                log::warn!("Unhandled OBJ keyword '{}' on line {}", line.keyword, line.number);
                self.warnings.push(ParseWarning::UnknownKeyword {
                    line: line.number,
                    keyword: line.keyword.to_string(),
                });
            }
        }
    }

    fn set_smoothing_group(&mut self, line: &Line<'_>) {
        self.smoothing_group = match line.args.first() {
            None => {
                self.missing_argument(line, 1);
                None
            }
            Some(&"off") => None,
            Some(token) => match token.parse::<u32>() {
                Ok(0) => None,
                Ok(group) => Some(group),
                Err(_) => {
                    self.warnings.push(ParseWarning::InvalidNumber {
                        line: line.number,
                        token: (*token).to_string(),
                    });
                    None
                }
            },
        };
    }

    fn missing_argument(&mut self, line: &Line<'_>, expected: usize) {
        self.warnings.push(ParseWarning::MissingArgument {
            line: line.number,
            keyword: line.keyword.to_string(),
            expected,
        });
    }

    fn add_face(&mut self, line: &Line<'_>) {
        let vertices: Vec<FaceVertex> = line.args.iter().map(|t| FaceVertex::parse(t)).collect();
        let triangles = vertices.len().saturating_sub(2);

        for tri in 0..triangles {
            for corner in [0, tri + 1, tri + 2] {
                self.add_vertex(&vertices[corner], line.args[corner], line.number);
            }
        }
    }

    /// Index of the chunk receiving faces for the active material
    fn active_geometry(&mut self) -> usize {
        let reusable = self
            .geometries
            .last()
            .is_some_and(|g| g.material == self.material);

        if !reusable {
            self.geometries.push(Geometry {
                object: self.object.clone(),
                groups: self.groups.clone(),
                smoothing_group: self.smoothing_group,
                material: self.material.clone(),
                data: GeometryData::default(),
            });
        }
        self.geometries.len() - 1
    }

    fn add_vertex(&mut self, vertex: &FaceVertex, reference: &str, line: usize) {
        let index = self.active_geometry();
        let data = &mut self.geometries[index].data;
        let pools = &self.pools;
        let warnings = &mut self.warnings;

        let mut invalid = || {
            warnings.push(ParseWarning::InvalidIndex {
                line,
                reference: reference.to_string(),
            });
        };

        if let Some(slot) = lookup(vertex.position, pools.positions.len()) {
            match slot {
                Some(i) => {
                    data.position.extend_from_slice(&pools.positions[i]);
                    data.color.extend_from_slice(&pools.colors[i]);
                }
                None => {
                    invalid();
                    data.position.extend_from_slice(&[f32::NAN; 3]);
                    data.color.extend_from_slice(&[f32::NAN; 3]);
                }
            }
        }

        if let Some(slot) = lookup(vertex.texcoord, pools.texcoords.len()) {
            match slot {
                Some(i) => data.texcoord.extend_from_slice(&pools.texcoords[i]),
                None => {
                    invalid();
                    data.texcoord.extend_from_slice(&[f32::NAN; 2]);
                }
            }
        }

        if let Some(slot) = lookup(vertex.normal, pools.normals.len()) {
            match slot {
                Some(i) => data.normal.extend_from_slice(&pools.normals[i]),
                None => {
                    invalid();
                    data.normal.extend_from_slice(&[f32::NAN; 3]);
                }
            }
        }
    }

    fn finish(mut self) -> ObjData {
        let has_colors = self.pools.has_colors;
        self.geometries.retain(|g| !g.data.position.is_empty());
        if !has_colors {
            for geometry in &mut self.geometries {
                geometry.data.color.clear();
            }
        }

        ObjData {
            geometries: self.geometries,
            material_libs: self.material_libs,
            warnings: self.warnings,
        }
    }
}

/// `None` when the component is absent, `Some(None)` when it cannot be resolved
fn lookup(slot: IndexSlot, pool_len: usize) -> Option<Option<usize>> {
    match slot {
        IndexSlot::Absent => None,
        IndexSlot::Index(index) => Some(resolve_index(index, pool_len)),
        IndexSlot::Invalid => Some(None),
    }
}

/// OBJ text parser
pub struct ObjParser;

impl ObjParser {
    /// Parse OBJ text, degrading malformed lines instead of failing
    ///
    /// Bad numbers and unresolvable references become NaN values and are
    /// listed in [`ObjData::warnings`].
    pub fn parse(text: &str) -> ObjData {
        let mut state = ParserState::new();
        for line in text_format::lines(text) {
            state.process_line(&line);
        }

        let data = state.finish();
        log::debug!(
            "Parsed OBJ: {} geometries, {} material libraries, {} warnings",
            data.geometries.len(),
            data.material_libs.len(),
            data.warnings.len()
        );
        data
    }

    /// Parse OBJ text, failing on the first malformed number or reference
    ///
    /// Unknown keywords are still skipped.
    pub fn parse_strict(text: &str) -> Result<ObjData, ObjError> {
        let data = Self::parse(text);
        match data.warnings.iter().find(|w| w.is_malformed()) {
            Some(warning) => Err(ObjError::ParseError(warning.clone())),
            None => Ok(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = r"
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let obj = ObjParser::parse(QUAD);
        assert_eq!(obj.geometries.len(), 1);

        let data = &obj.geometries[0].data;
        assert_eq!(data.triangle_count(), 2);
        assert_eq!(
            data.position,
            vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, // (1, 2, 3)
                0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, // (1, 3, 4)
            ]
        );
        assert_eq!(data.texcoord.len(), 12);
        assert_eq!(data.normal.len(), 18);
        assert!(data.color.is_empty());
        assert_eq!(
            data.attributes(),
            VertexAttributes::POSITION | VertexAttributes::TEXCOORD | VertexAttributes::NORMAL
        );
    }

    #[test]
    fn test_negative_indices_match_positive() {
        let positions = "v 1 0 0\nv 2 0 0\nv 3 0 0\nv 4 0 0\nv 5 0 0\n";
        let relative = ObjParser::parse(&format!("{positions}f -1 -2 -3\n"));
        let absolute = ObjParser::parse(&format!("{positions}f 5 4 3\n"));

        assert_eq!(relative.geometries[0].data, absolute.geometries[0].data);
        assert_eq!(relative.geometries[0].data.position[0], 5.0);
    }

    #[test]
    fn test_negative_index_is_relative_to_reference_time() {
        let text = "v 1 0 0\nv 2 0 0\nv 3 0 0\nf -3 -2 -1\nv 4 0 0\nf -3 -2 -1\n";
        let obj = ObjParser::parse(text);
        let xs: Vec<f32> = obj.geometries[0].data.position.iter().step_by(3).copied().collect();

        assert_eq!(xs, vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_missing_texcoord_slot() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 1 0\nvn 1 0 0\nf 1//1 2//2 3//3\n";
        let data = &ObjParser::parse(text).geometries[0].data;

        assert!(data.texcoord.is_empty());
        assert_eq!(data.position.len(), 9);
        assert_eq!(data.normal, vec![0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
        assert!(!data.attributes().contains(VertexAttributes::TEXCOORD));
    }

    #[test]
    fn test_short_faces_produce_no_triangles() {
        let obj = ObjParser::parse("v 0 0 0\nv 1 0 0\nf 1 2\nf 1\nf\n");
        assert!(obj.geometries.is_empty());
        assert!(obj.warnings.is_empty());
    }

    #[test]
    fn test_w_component_is_ignored() {
        let obj = ObjParser::parse("v 1 2 3 0.5\nv 4 5 6 1\nv 7 8 9 1\nf 1 2 3\n");
        let data = &obj.geometries[0].data;

        assert_eq!(&data.position[..3], &[1.0, 2.0, 3.0]);
        assert!(data.color.is_empty());
    }

    #[test]
    fn test_vertex_colors_follow_positions() {
        let text = "v 0 0 0 1 0 0\nv 1 0 0 0 1 0\nv 0 1 0\nf 1 2 3\n";
        let data = &ObjParser::parse(text).geometries[0].data;

        assert_eq!(data.color.len(), data.position.len());
        assert_eq!(data.color, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0]);
        assert!(data.attributes().contains(VertexAttributes::COLOR));
    }

    #[test]
    fn test_material_switch_opens_new_chunk() {
        let text = r"
mtllib scene.mtl
v 0 0 0
v 1 0 0
v 0 1 0
usemtl red
f 1 2 3
usemtl blue
f 1 2 3
f 1 2 3
usemtl red
f 1 2 3
";
        let obj = ObjParser::parse(text);
        let materials: Vec<&str> = obj.geometries.iter().map(|g| g.material.as_str()).collect();
        let triangles: Vec<usize> = obj.geometries.iter().map(|g| g.data.triangle_count()).collect();

        assert_eq!(materials, vec!["red", "blue", "red"]);
        assert_eq!(triangles, vec![1, 2, 1]);
        assert_eq!(obj.material_libs, vec!["scene.mtl"]);
    }

    #[test]
    fn test_object_and_group_do_not_split() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\no chair\ng legs seat\ns 1\nf 1 2 3\no table\ng top\nf 1 2 3\n";
        let obj = ObjParser::parse(text);

        assert_eq!(obj.geometries.len(), 1);
        let geometry = &obj.geometries[0];
        assert_eq!(geometry.object, "chair");
        assert_eq!(geometry.groups, vec!["legs", "seat"]);
        assert_eq!(geometry.smoothing_group, Some(1));
        assert_eq!(geometry.material, DEFAULT_MATERIAL_NAME);
        assert_eq!(geometry.name(), "chair");
        assert_eq!(geometry.data.triangle_count(), 2);
    }

    #[test]
    fn test_material_libs_keep_order_and_duplicates() {
        let obj = ObjParser::parse("mtllib a.mtl\nmtllib b.mtl\nmtllib a.mtl\n");
        assert_eq!(obj.material_libs, vec!["a.mtl", "b.mtl", "a.mtl"]);
    }

    #[test]
    fn test_mtllib_line_names_several_libraries() {
        let obj = ObjParser::parse("mtllib wood.mtl  metal.mtl\nmtllib wood.mtl\n");
        assert_eq!(obj.material_libs, vec!["wood.mtl", "metal.mtl", "wood.mtl"]);
        assert!(obj.warnings.is_empty());
    }

    #[test]
    fn test_mtllib_without_argument_is_malformed() {
        let obj = ObjParser::parse("mtllib\n");
        assert!(obj.material_libs.is_empty());
        assert!(matches!(
            obj.warnings.as_slice(),
            [ParseWarning::MissingArgument { line: 1, expected: 1, .. }]
        ));
        assert!(ObjParser::parse_strict("mtllib\n").is_err());
    }

    #[test]
    fn test_unknown_keyword_is_warning_only() {
        let obj = ObjParser::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nl 1 2\nf 1 2 3\n");

        assert_eq!(obj.geometries.len(), 1);
        assert_eq!(
            obj.warnings,
            vec![ParseWarning::UnknownKeyword { line: 4, keyword: "l".to_string() }]
        );
        assert!(ObjParser::parse_strict("l 1 2\n").is_ok());
    }

    #[test]
    fn test_malformed_number_propagates_nan() {
        let obj = ObjParser::parse("v 0 zero 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let data = &obj.geometries[0].data;

        assert!(data.position[1].is_nan());
        assert_eq!(data.position[3], 1.0);

        let err = ObjParser::parse_strict("v 0 zero 0\n").unwrap_err();
        assert_eq!(
            err,
            ObjError::ParseError(ParseWarning::InvalidNumber { line: 1, token: "zero".to_string() })
        );
    }

    #[test]
    fn test_out_of_range_reference_keeps_lockstep() {
        let obj = ObjParser::parse("v 0 0 0\nv 1 0 0\nvn 0 0 1\nf 1//1 2//1 9//1\n");
        let data = &obj.geometries[0].data;

        assert_eq!(data.position.len(), 9);
        assert_eq!(data.normal.len(), 9);
        assert!(data.position[6..].iter().all(|v| v.is_nan()));
        assert!(matches!(obj.warnings[0], ParseWarning::InvalidIndex { line: 4, .. }));
        assert!(ObjParser::parse_strict("v 0 0 0\nf 1 2 3\n").is_err());
    }

    #[test]
    fn test_index_zero_resolves_to_placeholder() {
        assert_eq!(resolve_index(0, 4), Some(0));
        assert_eq!(resolve_index(3, 4), Some(3));
        assert_eq!(resolve_index(4, 4), None);
        assert_eq!(resolve_index(-1, 4), Some(3));
        assert_eq!(resolve_index(-4, 4), Some(0));
        assert_eq!(resolve_index(-5, 4), None);
    }

    #[test]
    fn test_face_vertex_forms() {
        assert_eq!(
            FaceVertex::parse("7"),
            FaceVertex { position: IndexSlot::Index(7), texcoord: IndexSlot::Absent, normal: IndexSlot::Absent }
        );
        assert_eq!(
            FaceVertex::parse("7/-2"),
            FaceVertex { position: IndexSlot::Index(7), texcoord: IndexSlot::Index(-2), normal: IndexSlot::Absent }
        );
        assert_eq!(
            FaceVertex::parse("7//x"),
            FaceVertex { position: IndexSlot::Index(7), texcoord: IndexSlot::Absent, normal: IndexSlot::Invalid }
        );
    }

    #[test]
    fn test_empty_and_comment_only_input() {
        assert_eq!(ObjParser::parse(""), ObjData::default());
        let obj = ObjParser::parse("# exported\n\n# nothing here\n");
        assert!(obj.geometries.is_empty());
        assert!(obj.material_libs.is_empty());
    }
}

//! What a renderer would receive for a scene, summarized

use std::fmt;

use model_loader::assets::{Model, ParseWarning, TextureStatus, VertexAttributes};
use model_loader::foundation::math::Extents;

use crate::config::ShadingModel;

/// Per-model summary
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    /// Number of parts
    pub parts: usize,
    /// Total triangles
    pub triangles: usize,
    /// Total unique vertices across indexed parts
    pub unique_vertices: usize,
    /// Textures including the default white one
    pub textures: usize,
    /// Textures that failed to decode and show white instead
    pub fallback_textures: usize,
    /// Bounds, if the model has positions
    pub extents: Option<Extents>,
    /// Parts missing an attribute the shading model reads
    pub incompatible_parts: Vec<(String, VertexAttributes)>,
    /// Parse warnings
    pub warnings: usize,
    /// Source line of the first warning
    pub first_warning_line: Option<usize>,
}

impl ModelSummary {
    /// Summarize a loaded model for a shading variant
    pub fn new(model: &Model, shading: ShadingModel) -> Self {
        let required = shading.required_attributes();
        let incompatible_parts = model
            .parts
            .iter()
            .filter_map(|part| {
                let missing = required.difference(part.data.attributes());
                (!missing.is_empty()).then(|| (part.name.clone(), missing))
            })
            .collect();

        Self {
            parts: model.parts.len(),
            triangles: model.triangle_count(),
            unique_vertices: model
                .parts
                .iter()
                .filter_map(|p| p.mesh.as_ref())
                .map(|m| m.vertices.len())
                .sum(),
            textures: model.textures.len(),
            fallback_textures: model
                .textures
                .iter()
                .filter(|(_, texture)| texture.status == TextureStatus::Fallback)
                .count(),
            extents: model.extents,
            incompatible_parts,
            warnings: model.warnings.len(),
            first_warning_line: model.warnings.first().map(ParseWarning::line),
        }
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} parts, {} triangles, {} unique vertices, {} textures",
            self.parts, self.triangles, self.unique_vertices, self.textures
        )?;
        if let Some(extents) = &self.extents {
            let offset = extents.center_offset();
            write!(
                f,
                ", size [{:.3} {:.3} {:.3}], center offset [{:.3} {:.3} {:.3}]",
                extents.range().x,
                extents.range().y,
                extents.range().z,
                offset.x,
                offset.y,
                offset.z
            )?;
        }
        Ok(())
    }
}

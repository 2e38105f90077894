//! Viewer configuration: scenes and loader options

use std::path::PathBuf;

use model_loader::assets::VertexAttributes;
use model_loader::config::{Config, LoaderConfig};
use serde::{Deserialize, Serialize};

/// Shading variant a scene is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingModel {
    /// Diffuse color only
    Flat,
    /// Phong lighting, needs normals
    #[default]
    Phong,
    /// Phong lighting with texture maps, needs normals and texcoords
    Textured,
}

impl ShadingModel {
    /// Attributes the shader reads per vertex
    pub fn required_attributes(self) -> VertexAttributes {
        match self {
            Self::Flat => VertexAttributes::POSITION,
            Self::Phong => VertexAttributes::POSITION | VertexAttributes::NORMAL,
            Self::Textured => {
                VertexAttributes::POSITION | VertexAttributes::NORMAL | VertexAttributes::TEXCOORD
            }
        }
    }
}

/// One viewer page: a set of models drawn together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Scene name, selected with `--scene`
    pub name: String,
    /// OBJ files to load
    pub models: Vec<PathBuf>,
    /// Shading variant
    #[serde(default)]
    pub shading: ShadingModel,
}

/// Top-level viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Default log level (`RUST_LOG` overrides)
    pub log_level: String,
    /// Model loading options
    pub loader: LoaderConfig,
    /// Available scenes
    pub scenes: Vec<SceneConfig>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            loader: LoaderConfig::default(),
            scenes: Vec::new(),
        }
    }
}

impl Config for ViewerConfig {}

impl ViewerConfig {
    /// Find a scene by name
    pub fn scene(&self, name: &str) -> Option<&SceneConfig> {
        self.scenes.iter().find(|s| s.name == name)
    }
}

//! # Model Loader
//!
//! Wavefront OBJ/MTL loading for a browser-style model viewer.
//!
//! ## Features
//!
//! - **OBJ parsing**: positions, texcoords, normals and vertex colors, with
//!   relative (negative) indices and fan triangulation of n-gon faces
//! - **MTL parsing**: Phong material properties and texture map references
//! - **Material resolution**: explicit merge over a documented default record
//! - **Indexed meshes**: deduplicated interleaved vertices ready for upload
//! - **Model loading**: material libraries and textures resolved relative to the OBJ
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use model_loader::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     model_loader::foundation::logging::init();
//!
//!     let loader = ModelLoader::new(LoaderConfig::default());
//!     let model = loader.load(&FileSource, "resources/models/chair.obj")?;
//!
//!     for part in &model.parts {
//!         let vertices = part.mesh.as_ref().map_or(0, |mesh| mesh.vertices.len());
//!         println!("{}: {} vertices", part.name, vertices);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_precision_loss)]

pub mod foundation;
pub mod config;
pub mod assets;

/// Common imports for loader users
pub mod prelude {
    pub use crate::{
        assets::{
            AssetError, AssetSource, FileSource, MemorySource,
            Model, ModelLoader, ModelPart,
            ObjData, ObjParser, Geometry, GeometryData,
            Mesh, Vertex, VertexAttributes,
            Material, MtlData, MtlParser, TextureMapKind,
        },
        config::{Config, ConfigError, LoaderConfig},
        foundation::math::{Extents, Vec3},
    };
}

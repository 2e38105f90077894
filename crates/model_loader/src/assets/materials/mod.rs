//! Material parsing and resolution subsystem
//!
//! MTL text is parsed into sparse records, which are then merged over a
//! default record to give renderers a fully populated material.

pub mod mtl_parser;
pub mod material;
pub mod texture_map;

pub use mtl_parser::{MtlParser, MtlData, MtlError};
pub use material::{Material, merge_material};
pub use texture_map::TextureMapKind;

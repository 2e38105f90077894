//! Texture map slots declared by MTL files

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of texture map, keyed by its MTL keyword
///
/// Serializes as the keyword itself (`"map_Kd"`), so configs read like MTL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TextureMapKind {
    /// Ambient color map (`map_Ka`)
    Ambient,
    /// Diffuse color map (`map_Kd`)
    Diffuse,
    /// Specular color map (`map_Ks`)
    Specular,
    /// Emissive color map (`map_Ke`)
    Emissive,
    /// Specular exponent map (`map_Ns`)
    SpecularExponent,
    /// Dissolve/alpha map (`map_d`)
    Dissolve,
    /// Bump map (`map_Bump`, `map_bump`, `bump`)
    Bump,
    /// Normal map (`norm`)
    Normal,
    /// Displacement map (`disp`)
    Displacement,
    /// Any other `map_*` keyword
    Other(String),
}

impl TextureMapKind {
    /// Map an MTL keyword to its map kind, `None` if it is not a map keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "map_Ka" => Self::Ambient,
            "map_Kd" => Self::Diffuse,
            "map_Ks" => Self::Specular,
            "map_Ke" => Self::Emissive,
            "map_Ns" => Self::SpecularExponent,
            "map_d" => Self::Dissolve,
            "map_Bump" | "map_bump" | "bump" => Self::Bump,
            "norm" => Self::Normal,
            "disp" => Self::Displacement,
            other if other.starts_with("map_") => Self::Other(other.to_string()),
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical MTL keyword for this kind
    pub fn keyword(&self) -> &str {
        match self {
            Self::Ambient => "map_Ka",
            Self::Diffuse => "map_Kd",
            Self::Specular => "map_Ks",
            Self::Emissive => "map_Ke",
            Self::SpecularExponent => "map_Ns",
            Self::Dissolve => "map_d",
            Self::Bump => "map_Bump",
            Self::Normal => "norm",
            Self::Displacement => "disp",
            Self::Other(keyword) => keyword,
        }
    }
}

impl fmt::Display for TextureMapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl From<String> for TextureMapKind {
    fn from(keyword: String) -> Self {
        Self::from_keyword(&keyword).unwrap_or(Self::Other(keyword))
    }
}

impl From<TextureMapKind> for String {
    fn from(kind: TextureMapKind) -> Self {
        kind.keyword().to_string()
    }
}

mod flat;
mod standard;

pub use flat::*;
pub use standard::*;

use crate::Color;

/// A material as seen by the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Lit material with an opacity.
    Standard(StandardMaterial),
    /// Unlit material rendered as a constant color.
    Flat(FlatMaterial),
}

impl Material {
    pub fn standard(color: Color, opacity: f32) -> Self {
        Self::Standard(StandardMaterial::new(color, opacity))
    }

    pub fn flat(color: Color) -> Self {
        Self::Flat(FlatMaterial::new(color))
    }

    /// Returns the opacity of the material. Flat materials are always fully opaque.
    pub fn opacity(&self) -> f32 {
        match self {
            Self::Standard(standard) => standard.opacity,
            Self::Flat(_) => 1.0,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Standard(standard) => standard.color,
            Self::Flat(flat) => flat.color,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Self::Flat(_))
    }
}

impl From<StandardMaterial> for Material {
    fn from(material: StandardMaterial) -> Self {
        Self::Standard(material)
    }
}

impl From<FlatMaterial> for Material {
    fn from(material: FlatMaterial) -> Self {
        Self::Flat(material)
    }
}

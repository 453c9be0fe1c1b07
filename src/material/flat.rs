use crate::Color;

/// An unlit material which renders as a constant color irrespective of scene lighting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FlatMaterial {
    pub color: Color,
}

impl FlatMaterial {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

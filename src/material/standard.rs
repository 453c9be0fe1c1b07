use crate::Color;

/// A lit material.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    /// Expected to be within [0.0, 1.0], but is not clamped.
    pub opacity: f32,
}

impl StandardMaterial {
    pub fn new(color: Color, opacity: f32) -> Self {
        Self { color, opacity }
    }

    /// Returns true if the material is not fully opaque.
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self::new(Color::white(), 1.0)
    }
}

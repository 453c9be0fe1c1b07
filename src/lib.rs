//! Selective bloom masking for scene graphs.
//!
//! Meshes outside of the bloom layer are temporarily given flat materials so that a bloom
//! pass only picks up the intended objects, and are restored afterwards.

pub mod bloom;
pub mod color;
mod error;
pub mod layers;
pub mod logger;
pub mod material;
pub mod resources;
pub mod scene;

pub use bloom::{darken, darken_with, restore, BloomConfig, BloomPass, Palette, SaveTable};
pub use color::Color;
pub use error::Error;
pub use layers::Layers;
pub use material::Material;
pub use resources::Handle;
pub use scene::{Mesh, Node, NodeKind, Scene};

use thiserror::Error;

use crate::layers::LAYER_COUNT;
use crate::resources::{self, Handle};
use crate::scene::Node;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    ResourceError(#[from] resources::Error),
    #[error("Node {0:?} does not exist in the scene")]
    NodeNotFound(Handle<Node>),
    #[error("Bloom pass already in progress with {0} darkened meshes")]
    PassInProgress(usize),
    #[error("Bloom layer {0} out of range, expected less than {}", LAYER_COUNT)]
    InvalidLayer(u8),
}

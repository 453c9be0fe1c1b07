mod cache;
mod errors;
mod handle;

pub use cache::*;
pub use errors::*;
pub use handle::*;

//! Layer sources on disk: naming conventions, resolution, probing and rendering.

pub mod media;
pub mod paths;
pub mod render;
pub mod resolve;

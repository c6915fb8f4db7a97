//! Resource management
//!
//! Meshes, mesh generators, textures and materials.

mod generators;
mod material;
mod mesh;
mod texture;

pub use generators::*;
pub use material::*;
pub use mesh::*;
pub use texture::*;

//! Text Scene - builds the extruded text and torus field demo scene
//!
//! The crate produces scene data for an external renderer:
//! - **Geometry**: parametric torus generator and bevelled text extrusion
//! - **Assets**: typeface JSON fonts and matcap textures, loaded from disk
//!   (native) or with `fetch` (web)
//! - **Scene**: a Bevy ECS world of nodes sharing mesh and material buffers
//!
//! # Example
//!
//! ```ignore
//! let loader = FsAssetLoader::new("static");
//! let mut rng = scene_rng(Some(7));
//! let assembled = pollster::block_on(
//!     SceneAssembler::new(SceneConfig::default()).assemble(&loader, &mut rng),
//! )?;
//! assert_eq!(assembled.tori.len(), 300);
//! ```

pub mod assets;
pub mod resources;
pub mod scene;
pub mod text;

// Re-export Bevy ECS prelude for users
pub use bevy_ecs::prelude::*;

// Web-specific modules
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use assets::{AssetError, AssetEvent, AssetLoader, MemoryAssetLoader};
#[cfg(not(target_arch = "wasm32"))]
pub use assets::FsAssetLoader;
pub use resources::{generate_torus, GeometryError, MatcapMaterial, Mesh, TorusParams};
pub use scene::{scene_rng, AssembledScene, Scene, SceneAssembler, SceneConfig, SceneError};
pub use text::{text_geometry, Font, TextError, TextGeometryParams};

// Web initialization helper
#[cfg(target_arch = "wasm32")]
pub fn init_web_logging() {
    // Set up panic hook for better error messages in console
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to initialize logger: {e}").into());
    }
}

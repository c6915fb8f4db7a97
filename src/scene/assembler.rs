//! Scene assembly: two text meshes next to each other and a field of tori
//! sharing one mesh buffer.

use std::f32::consts::PI;
use std::sync::Arc;

use bevy_ecs::entity::Entity;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::{Scene, SceneNode, Transform};
use crate::assets::{AssetError, AssetLoader};
use crate::resources::{GeometryError, MatcapMaterial, Mesh, TextureSlot, TorusParams};
use crate::text::{text_geometry, Font, TextError, TextGeometryParams};

/// X position of the first text mesh
pub const FIRST_TEXT_X: f32 = -1.0;
/// Space between the first text's bounding box and the second text's origin
pub const TEXT_GAP: f32 = 0.01;

pub const FONT_PATH: &str = "font/myfont.json";
pub const MATCAP_PATHS: [&str; 3] = [
    "textures/matcaps/2.png",
    "textures/matcaps/3.png",
    "textures/matcaps/8.png",
];

/// Scene assembly error type
#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("failed to build text {text:?}: {source}")]
    Text {
        text: String,
        #[source]
        source: TextError,
    },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// One text mesh of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    pub text: String,
    pub params: TextGeometryParams,
    /// Matcap texture path
    pub matcap: String,
}

impl TextEntry {
    pub fn new(text: &str, params: TextGeometryParams, matcap: &str) -> Self {
        Self {
            text: text.to_string(),
            params,
            matcap: matcap.to_string(),
        }
    }
}

/// Random placement of the torus field.
///
/// Each axis of a position is `(rand - offset) * extent`, the X and Y
/// rotations are `rand * max_rotation` and the uniform scale is `rand`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConfig {
    pub count: usize,
    pub offset: f32,
    pub extent: f32,
    pub max_rotation: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 300,
            offset: 0.6,
            extent: 10.0,
            max_rotation: PI,
        }
    }
}

/// Everything the assembler places
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub font_path: String,
    /// Placed left to right
    pub texts: [TextEntry; 2],
    pub torus: TorusParams,
    pub torus_matcap: String,
    pub field: FieldConfig,
    pub first_text_x: f32,
    pub text_gap: f32,
    /// Fixed seed for the torus field, random when unset
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            font_path: FONT_PATH.to_string(),
            texts: [
                TextEntry::new("White", TextGeometryParams::default(), MATCAP_PATHS[0]),
                TextEntry::new(
                    "Devil",
                    TextGeometryParams::default().with_bevel_size(0.01),
                    MATCAP_PATHS[1],
                ),
            ],
            torus: TorusParams::new(0.3, 0.2, 20, 45),
            torus_matcap: MATCAP_PATHS[2].to_string(),
            field: FieldConfig::default(),
            first_text_x: FIRST_TEXT_X,
            text_gap: TEXT_GAP,
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_torus_count(mut self, count: usize) -> Self {
        self.field.count = count;
        self
    }

    pub fn with_texts(mut self, first: TextEntry, second: TextEntry) -> Self {
        self.texts = [first, second];
        self
    }

    pub fn with_font_path(mut self, path: &str) -> Self {
        self.font_path = path.to_string();
        self
    }
}

/// Result of a successful assembly
pub struct AssembledScene {
    pub scene: Scene,
    pub texts: [Entity; 2],
    pub tori: Vec<Entity>,
    pub text_meshes: [Arc<Mesh>; 2],
    /// The one buffer every torus node draws
    pub torus_mesh: Arc<Mesh>,
    pub torus_material: Arc<MatcapMaterial>,
    /// Every texture requested, in request order
    pub textures: Vec<Arc<TextureSlot>>,
}

/// Builds the scene from loaded assets
pub struct SceneAssembler {
    config: SceneConfig,
}

impl SceneAssembler {
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Load the assets and place every node.
    ///
    /// Texture loads are started first and not waited for. Nothing is placed
    /// before the font has loaded; a font failure returns an error and no
    /// scene.
    pub async fn assemble<L, R>(&self, loader: &L, rng: &mut R) -> Result<AssembledScene, SceneError>
    where
        L: AssetLoader,
        R: Rng + ?Sized,
    {
        let config = &self.config;

        let mut textures: Vec<Arc<TextureSlot>> = Vec::new();
        let [first_matcap, second_matcap, torus_matcap] = [
            config.texts[0].matcap.as_str(),
            config.texts[1].matcap.as_str(),
            config.torus_matcap.as_str(),
        ]
        .map(|path| request_texture(loader, &mut textures, path));

        let font = loader.load_font(&config.font_path).await?;

        let mut scene = Scene::new();

        let (first, first_mesh) = place_text(
            &mut scene,
            &font,
            &config.texts[0],
            first_matcap,
            config.first_text_x,
        )?;
        // the second text starts right of the first one's local box
        let second_x = first_mesh
            .bounding_box()
            .map_or(config.first_text_x, |bounds| bounds.max.x)
            + config.text_gap;
        let (second, second_mesh) = place_text(
            &mut scene,
            &font,
            &config.texts[1],
            second_matcap,
            second_x,
        )?;

        let torus_mesh = Arc::new(config.torus.generate()?);
        let torus_material = Arc::new(MatcapMaterial::new("torus", torus_matcap));
        let tori: Vec<Entity> = (0..config.field.count)
            .map(|i| {
                scene.add_node(
                    SceneNode::new(
                        &format!("torus:{i}"),
                        Arc::clone(&torus_mesh),
                        Arc::clone(&torus_material),
                    )
                    .with_transform(random_transform(rng, &config.field)),
                )
            })
            .collect();
        log::info!(
            "Placed {} tori sharing one mesh of {} vertices",
            tori.len(),
            torus_mesh.vertex_count()
        );

        Ok(AssembledScene {
            scene,
            texts: [first, second],
            tori,
            text_meshes: [first_mesh, second_mesh],
            torus_mesh,
            torus_material,
            textures,
        })
    }
}

/// Return the slot already requested for `path`, or start loading it
fn request_texture<L: AssetLoader>(
    loader: &L,
    requested: &mut Vec<Arc<TextureSlot>>,
    path: &str,
) -> Arc<TextureSlot> {
    if let Some(slot) = requested.iter().find(|slot| slot.path() == path) {
        return Arc::clone(slot);
    }
    let slot = loader.load_texture(path);
    requested.push(Arc::clone(&slot));
    slot
}

/// Build a centred text mesh and place it at `x`
fn place_text(
    scene: &mut Scene,
    font: &Font,
    entry: &TextEntry,
    matcap: Arc<TextureSlot>,
    x: f32,
) -> Result<(Entity, Arc<Mesh>), SceneError> {
    let mut mesh = text_geometry(font, &entry.text, &entry.params).map_err(|source| SceneError::Text {
        text: entry.text.clone(),
        source,
    })?;
    mesh.center();
    debug_assert!(mesh.validate().is_ok());
    let mesh = Arc::new(mesh);

    let material = Arc::new(MatcapMaterial::new(&format!("text:{}", entry.text), matcap));
    let entity = scene.add_node(
        SceneNode::new(&entry.text, Arc::clone(&mesh), material)
            .with_transform(Transform::from_position(Vec3::new(x, 0.0, 0.0))),
    );
    log::info!(
        "Placed text {:?} at x = {} ({} triangles)",
        entry.text,
        x,
        mesh.triangle_count()
    );
    Ok((entity, mesh))
}

/// Draw one random torus placement.
///
/// Draw order is position x, y, z, rotation x, y, then scale, so a seeded
/// generator always reproduces the same field.
pub fn random_transform<R: Rng + ?Sized>(rng: &mut R, field: &FieldConfig) -> Transform {
    let mut axis = || (rng.random::<f32>() - field.offset) * field.extent;
    let position = Vec3::new(axis(), axis(), axis());
    let rotation = Vec3::new(
        rng.random::<f32>() * field.max_rotation,
        rng.random::<f32>() * field.max_rotation,
        0.0,
    );
    let scale = rng.random::<f32>();
    Transform::from_components(position, rotation, Vec3::splat(scale))
}

/// Generator for the torus field; entropy-seeded when `seed` is `None`
pub fn scene_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => entropy_rng(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn entropy_rng() -> StdRng {
    StdRng::from_rng(&mut rand::rng())
}

#[cfg(target_arch = "wasm32")]
fn entropy_rng() -> StdRng {
    StdRng::seed_from_u64((js_sys::Math::random() * u64::MAX as f64) as u64)
}

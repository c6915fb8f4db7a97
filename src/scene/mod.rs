//! Scene management
//!
//! The scene graph is a Bevy ECS [`World`]. Every placed object is one entity
//! carrying a [`SceneNode`] bundle; meshes and materials are shared between
//! nodes through `Arc` handles.

mod assembler;
mod transform;

pub use assembler::*;
pub use transform::*;

use std::sync::Arc;

use bevy_ecs::prelude::*;

use crate::resources::{Aabb, MatcapMaterial, Mesh};

/// Debug name of a scene node
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct NodeName(pub String);

/// Geometry drawn by a node
#[derive(Component, Debug, Clone)]
pub struct MeshHandle(pub Arc<Mesh>);

/// Material a node is drawn with
#[derive(Component, Debug, Clone)]
pub struct MaterialHandle(pub Arc<MatcapMaterial>);

/// Components of one placed object
#[derive(Bundle, Debug, Clone)]
pub struct SceneNode {
    pub name: NodeName,
    pub transform: Transform,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
}

impl SceneNode {
    pub fn new(name: &str, mesh: Arc<Mesh>, material: Arc<MatcapMaterial>) -> Self {
        Self {
            name: NodeName(name.to_string()),
            transform: Transform::default(),
            mesh: MeshHandle(mesh),
            material: MaterialHandle(material),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Read-only copy of a node, for inspection and hand-off to a renderer
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    pub entity: Entity,
    pub name: String,
    pub transform: Transform,
    pub mesh: Arc<Mesh>,
    pub material: Arc<MatcapMaterial>,
}

/// The scene containing all placed content
pub struct Scene {
    world: World,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: World::new(),
        }
    }

    /// Add a node to the scene
    pub fn add_node(&mut self, node: SceneNode) -> Entity {
        self.world.spawn(node).id()
    }

    pub fn node_count(&self) -> usize {
        self.world.iter_entities().count()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    pub fn transform(&self, entity: Entity) -> Option<&Transform> {
        self.world.get::<Transform>(entity)
    }

    pub fn node_name(&self, entity: Entity) -> Option<&str> {
        self.world.get::<NodeName>(entity).map(|name| name.0.as_str())
    }

    /// All nodes in spawn order
    pub fn nodes(&mut self) -> Vec<NodeSnapshot> {
        let mut query = self
            .world
            .query::<(Entity, &NodeName, &Transform, &MeshHandle, &MaterialHandle)>();
        let mut nodes: Vec<NodeSnapshot> = query
            .iter(&self.world)
            .map(|(entity, name, transform, mesh, material)| NodeSnapshot {
                entity,
                name: name.0.clone(),
                transform: *transform,
                mesh: Arc::clone(&mesh.0),
                material: Arc::clone(&material.0),
            })
            .collect();
        nodes.sort_by_key(|node| node.entity.index());
        nodes
    }

    /// Bounds of every node's mesh box corners in scene space
    pub fn bounds(&mut self) -> Option<Aabb> {
        let mut query = self.world.query::<(&Transform, &MeshHandle)>();
        let corners: Vec<_> = query
            .iter(&self.world)
            .filter_map(|(transform, mesh)| Some((transform, mesh.0.bounding_box()?)))
            .flat_map(|(transform, bounds)| {
                (0..8).map(move |corner: u32| {
                    let pick = |bit: u32, min: f32, max: f32| if corner & bit == 0 { min } else { max };
                    transform.transform_point(glam::Vec3::new(
                        pick(1, bounds.min.x, bounds.max.x),
                        pick(2, bounds.min.y, bounds.max.y),
                        pick(4, bounds.min.z, bounds.max.z),
                    ))
                })
            })
            .collect();
        Aabb::from_points(corners)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

//! Mesh data structures

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Standard vertex with position, normal and UV
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing every point, `None` when there are no points
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// A broken mesh invariant, reported by [`Mesh::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshInvariantError {
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
    #[error("triangle {triangle} references vertex {index}, mesh has {vertex_count}")]
    IndexOutOfBounds {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// A triangle mesh with vertex and index data.
///
/// Every vertex carries exactly one position, normal and UV, so the
/// per-attribute sequences always have equal length. Triangles are stored as a
/// flat index list, three indices per triangle, wound counter-clockwise when
/// viewed from outside the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub name: String,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            name: name.to_string(),
        }
    }

    pub fn with_capacity(name: &str, vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
            name: name.to_string(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    pub fn normals(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| v.normal)
    }

    pub fn uvs(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.vertices.iter().map(|v| v.uv)
    }

    /// Iterate triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Append a vertex and return its index
    pub fn push_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append a triangle with its own three vertices, all using the face normal
    pub fn push_flat_triangle(&mut self, positions: [Vec3; 3], uvs: [Vec2; 3]) {
        let [a, b, c] = positions;
        let normal = (b - a).cross(c - a).normalize_or_zero();
        let base = self.vertices.len() as u32;
        for (position, uv) in positions.into_iter().zip(uvs) {
            self.vertices.push(Vertex::new(position, normal, uv));
        }
        self.push_triangle(base, base + 1, base + 2);
    }

    /// Bounding box of all vertex positions
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions())
    }

    /// Translate all vertices so the bounding box is centered on the origin.
    ///
    /// Returns the translation that was applied.
    pub fn center(&mut self) -> Vec3 {
        let Some(bounds) = self.bounding_box() else {
            return Vec3::ZERO;
        };
        let offset = -bounds.center();
        self.translate(offset);
        offset
    }

    pub fn translate(&mut self, offset: Vec3) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Check the index invariants of this mesh
    pub fn validate(&self) -> Result<(), MeshInvariantError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshInvariantError::PartialTriangle(self.indices.len()));
        }
        let vertex_count = self.vertices.len();
        for (triangle, indices) in self.triangles().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshInvariantError::IndexOutOfBounds {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Get vertex data as bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Get index data as bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let mut mesh = Mesh::new("quad");
        for (x, y) in [(0.0, 0.0), (2.0, 0.0), (2.0, 4.0), (0.0, 4.0)] {
            mesh.push_vertex(Vertex::new(
                Vec3::new(x, y, 1.0),
                Vec3::Z,
                Vec2::new(x / 2.0, y / 4.0),
            ));
        }
        mesh.push_triangle(0, 1, 2);
        mesh.push_triangle(0, 2, 3);
        mesh
    }

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        let mesh = quad();
        assert_eq!(mesh.vertex_bytes().len(), 4 * 32);
        assert_eq!(mesh.index_bytes().len(), 6 * 4);
    }

    #[test]
    fn test_bounding_box_and_center() {
        let mut mesh = quad();
        let bounds = mesh.bounding_box().unwrap();
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 4.0, 1.0));

        let offset = mesh.center();
        assert_eq!(offset, Vec3::new(-1.0, -2.0, -1.0));
        let centered = mesh.bounding_box().unwrap();
        assert_eq!(centered.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(centered.max, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        let mut mesh = Mesh::new("empty");
        assert!(mesh.bounding_box().is_none());
        assert_eq!(mesh.center(), Vec3::ZERO);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_flat_triangle_normal() {
        let mut mesh = Mesh::new("tri");
        mesh.push_flat_triangle([Vec3::ZERO, Vec3::X, Vec3::Y], [Vec2::ZERO; 3]);
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.normals().all(|n| n == Vec3::Z));
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_validate_reports_bad_indices() {
        let mut mesh = quad();
        assert_eq!(mesh.validate(), Ok(()));

        mesh.indices.push(0);
        assert_eq!(mesh.validate(), Err(MeshInvariantError::PartialTriangle(7)));

        mesh.indices.extend_from_slice(&[1, 9]);
        assert_eq!(
            mesh.validate(),
            Err(MeshInvariantError::IndexOutOfBounds {
                triangle: 2,
                index: 9,
                vertex_count: 4,
            })
        );
    }
}

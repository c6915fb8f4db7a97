//! Bevelled extrusion of 2D shapes into a flat-shaded 3D mesh

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use super::shape::{is_clockwise, Shape};
use super::triangulate::triangulate_shape;
use crate::resources::Mesh;

/// Options controlling [`extrude_shapes`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeOptions {
    /// Distance between the two lids, before bevel
    pub depth: f32,
    /// Layers along the depth between the bevels
    pub steps: u32,
    pub bevel_enabled: bool,
    /// How far the bevel reaches along Z beyond each lid
    pub bevel_thickness: f32,
    /// How far the bevel reaches outward from the outline
    pub bevel_size: f32,
    /// Outline offset at which the bevel starts
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for ExtrudeOptions {
    fn default() -> Self {
        Self {
            depth: 1.0,
            steps: 1,
            bevel_enabled: true,
            bevel_thickness: 0.2,
            bevel_size: 0.1,
            bevel_offset: 0.0,
            bevel_segments: 3,
        }
    }
}

/// Extrude every shape along +Z and append the result to a new mesh.
///
/// Lids lie at the first and last layer, side walls join consecutive layers.
/// Outer contours are wound clockwise and holes counter-clockwise before
/// extrusion so every face ends up facing outward. Each triangle gets its
/// own vertices and face normal; degenerate triangles are skipped.
pub fn extrude_shapes(name: &str, shapes: &[Shape], options: &ExtrudeOptions) -> Mesh {
    let mut mesh = Mesh::new(name);
    for shape in shapes {
        extrude_shape(&mut mesh, shape, options);
    }
    mesh
}

fn extrude_shape(mesh: &mut Mesh, shape: &Shape, options: &ExtrudeOptions) {
    if shape.contour.len() < 3 {
        return;
    }

    let (bevel_segments, thickness, size, offset) = if options.bevel_enabled {
        (
            options.bevel_segments,
            options.bevel_thickness,
            options.bevel_size,
            options.bevel_offset,
        )
    } else {
        (0, 0.0, 0.0, 0.0)
    };
    let steps = options.steps.max(1);

    let mut contour = shape.contour.clone();
    if !is_clockwise(&contour) {
        contour.reverse();
    }
    let holes: Vec<Vec<Vec2>> = shape
        .holes
        .iter()
        .filter(|hole| hole.len() >= 3)
        .map(|hole| {
            let mut hole = hole.clone();
            if is_clockwise(&hole) {
                hole.reverse();
            }
            hole
        })
        .collect();

    let faces = triangulate_shape(&contour, &holes);

    let mut outline = contour.clone();
    let mut movements = bevel_movements(&contour);
    for hole in &holes {
        outline.extend_from_slice(hole);
        movements.extend(bevel_movements(hole));
    }
    let vlen = outline.len() as u32;

    let layer = |bevel: f32, z: f32| -> Vec<Vec3> {
        outline
            .iter()
            .zip(&movements)
            .map(|(&p, &m)| (p + m * bevel).extend(z))
            .collect::<Vec<_>>()
    };

    let mut vertices: Vec<Vec3> = Vec::new();
    let bevel_at = |b: u32| {
        let t = b as f32 / bevel_segments as f32;
        let z = thickness * (t * FRAC_PI_2).cos();
        let bevel = size * (t * FRAC_PI_2).sin() + offset;
        (z, bevel)
    };

    for b in 0..bevel_segments {
        let (z, bevel) = bevel_at(b);
        vertices.extend(layer(bevel, -z));
    }
    for s in 0..=steps {
        vertices.extend(layer(size + offset, options.depth / steps as f32 * s as f32));
    }
    for b in (0..bevel_segments).rev() {
        let (z, bevel) = bevel_at(b);
        vertices.extend(layer(bevel, options.depth + z));
    }

    let slices = steps + bevel_segments * 2;

    // lids
    let top = vlen * slices;
    for face in &faces {
        let [a, b, c] = *face;
        push_lid(mesh, &vertices, [c, b, a]);
        push_lid(mesh, &vertices, [a + top, b + top, c + top]);
    }

    // side walls
    let mut layer_offset = 0;
    let ring_lengths = std::iter::once(contour.len()).chain(holes.iter().map(Vec::len));
    for len in ring_lengths {
        let len = len as u32;
        for i in 0..len {
            let j = layer_offset + i;
            let k = layer_offset + if i == 0 { len - 1 } else { i - 1 };
            for s in 0..slices {
                let lower = vlen * s;
                let upper = vlen * (s + 1);
                push_wall(mesh, &vertices, [j + lower, k + lower, k + upper, j + upper]);
            }
        }
        layer_offset += len;
    }
}

fn push_lid(mesh: &mut Mesh, vertices: &[Vec3], [a, b, c]: [u32; 3]) {
    let positions = [vertices[a as usize], vertices[b as usize], vertices[c as usize]];
    let uvs = positions.map(|p| p.truncate());
    push_face(mesh, positions, uvs);
}

/// Quad `abcd` as triangles `abd` and `bcd`, UVs projected on the wall
fn push_wall(mesh: &mut Mesh, vertices: &[Vec3], quad: [u32; 4]) {
    let [a, b, c, d] = quad.map(|i| vertices[i as usize]);
    let uv = |p: Vec3| {
        if (a.y - b.y).abs() < (a.x - b.x).abs() {
            Vec2::new(p.x, 1.0 - p.z)
        } else {
            Vec2::new(p.y, 1.0 - p.z)
        }
    };
    push_face(mesh, [a, b, d], [uv(a), uv(b), uv(d)]);
    push_face(mesh, [b, c, d], [uv(b), uv(c), uv(d)]);
}

fn push_face(mesh: &mut Mesh, positions: [Vec3; 3], uvs: [Vec2; 3]) {
    let [a, b, c] = positions;
    if (b - a).cross(c - a).length_squared() <= f32::EPSILON * f32::EPSILON {
        return;
    }
    mesh.push_flat_triangle(positions, uvs);
}

fn bevel_movements(ring: &[Vec2]) -> Vec<Vec2> {
    let n = ring.len();
    (0..n)
        .map(|i| bevel_vector(ring[i], ring[(i + n - 1) % n], ring[(i + 1) % n]))
        .collect()
}

/// Direction (scaled so the bevel stays a constant distance from both
/// adjacent edges) in which an outline point moves as the bevel grows
fn bevel_vector(point: Vec2, prev: Vec2, next: Vec2) -> Vec2 {
    let v_prev = point - prev;
    let v_next = next - point;
    let prev_len_sq = v_prev.length_squared();
    let collinear = v_prev.x * v_next.y - v_prev.y * v_next.x;

    let (trans, shrink_by) = if collinear.abs() > f32::EPSILON {
        let v_prev_len = prev_len_sq.sqrt();
        let v_next_len = v_next.length();

        // neighbours shifted left along their edge normals
        let prev_shift = Vec2::new(prev.x - v_prev.y / v_prev_len, prev.y + v_prev.x / v_prev_len);
        let next_shift = Vec2::new(next.x - v_next.y / v_next_len, next.y + v_next.x / v_next_len);

        // intersection of the two shifted edges
        let sf = ((next_shift.x - prev_shift.x) * v_next.y - (next_shift.y - prev_shift.y) * v_next.x)
            / collinear;
        let trans = prev_shift + v_prev * sf - point;
        let trans_len_sq = trans.length_squared();
        if trans_len_sq <= 2.0 {
            return trans;
        }
        (trans, (trans_len_sq / 2.0).sqrt())
    } else {
        let same_direction = if v_prev.x > f32::EPSILON {
            v_next.x > f32::EPSILON
        } else if v_prev.x < -f32::EPSILON {
            v_next.x < -f32::EPSILON
        } else {
            v_prev.y.signum() == v_next.y.signum()
        };

        if same_direction {
            (Vec2::new(-v_prev.y, v_prev.x), prev_len_sq.sqrt())
        } else {
            (v_prev, (prev_len_sq / 2.0).sqrt())
        }
    };

    trans / shrink_by
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f32, max: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
        ]
    }

    #[test]
    fn test_box_without_bevel() {
        let options = ExtrudeOptions {
            depth: 2.0,
            bevel_enabled: false,
            ..Default::default()
        };
        let mesh = extrude_shapes("box", &[Shape::new(square(0.0, 1.0))], &options);
        // 2 triangles per lid, 2 per side wall
        assert_eq!(mesh.triangle_count(), 2 * 2 + 4 * 2);
        assert_eq!(mesh.vertex_count(), mesh.triangle_count() * 3);

        let bounds = mesh.bounding_box().unwrap();
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn test_box_faces_point_outward() {
        let options = ExtrudeOptions {
            depth: 1.0,
            bevel_enabled: false,
            ..Default::default()
        };
        let mesh = extrude_shapes("box", &[Shape::new(square(0.0, 1.0))], &options);
        let center = Vec3::new(0.5, 0.5, 0.5);
        for tri in mesh.triangles() {
            let v = &mesh.vertices[tri[0] as usize];
            let face_center = (0..3)
                .map(|k| mesh.vertices[tri[k] as usize].position)
                .sum::<Vec3>()
                / 3.0;
            assert!(v.normal.dot(face_center - center) > 0.0, "inward face {:?}", tri);
        }
    }

    #[test]
    fn test_winding_of_input_does_not_matter() {
        let options = ExtrudeOptions::default();
        let mut reversed = square(0.0, 1.0);
        reversed.reverse();
        let a = extrude_shapes("a", &[Shape::new(square(0.0, 1.0))], &options);
        let b = extrude_shapes("b", &[Shape::new(reversed)], &options);
        assert_eq!(a.triangle_count(), b.triangle_count());
        assert_eq!(a.bounding_box(), b.bounding_box());
    }

    #[test]
    fn test_bevel_grows_outline() {
        let options = ExtrudeOptions {
            depth: 1.0,
            steps: 1,
            bevel_enabled: true,
            bevel_thickness: 0.25,
            bevel_size: 0.1,
            bevel_offset: 0.0,
            bevel_segments: 3,
        };
        let mesh = extrude_shapes("bevel", &[Shape::new(square(0.0, 1.0))], &options);
        let bounds = mesh.bounding_box().unwrap();
        assert!((bounds.min.z + 0.25).abs() < 1e-5);
        assert!((bounds.max.z - 1.25).abs() < 1e-5);
        assert!((bounds.min.x + 0.1).abs() < 1e-5);
        assert!((bounds.max.x - 1.1).abs() < 1e-5);
        // 4 wall quads per slice, 1 + 2 * 3 slices, plus 2 lids
        assert_eq!(mesh.triangle_count(), 4 * 2 * 7 + 2 * 2);
        assert!(mesh.normals().all(|n| (n.length() - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_hole_gets_inner_walls() {
        let options = ExtrudeOptions {
            bevel_enabled: false,
            ..Default::default()
        };
        let shape = Shape::new(square(0.0, 4.0)).with_hole(square(1.0, 3.0));
        let mesh = extrude_shapes("ring", &[shape], &options);
        // 8 lid triangles per side, 8 walls of 2 triangles
        assert_eq!(mesh.triangle_count(), 8 * 2 + 8 * 2);

        // inner walls face the hole center
        let hole_center = Vec3::new(2.0, 2.0, 0.5);
        let inner_facing = mesh
            .triangles()
            .filter(|tri| {
                let v = &mesh.vertices[tri[0] as usize];
                v.normal.z == 0.0 && (v.position.x - 2.0).abs() <= 1.0 && (v.position.y - 2.0).abs() <= 1.0
            })
            .all(|tri| {
                let v = &mesh.vertices[tri[0] as usize];
                v.normal.dot(hole_center - v.position) > 0.0
            });
        assert!(inner_facing);
    }

    #[test]
    fn test_bevel_vector_on_square_corner() {
        // clockwise square corner at the origin, edges along +y and +x
        let v = bevel_vector(Vec2::ZERO, Vec2::new(0.0, -1.0), Vec2::new(1.0, 0.0));
        assert!((v - Vec2::new(-1.0, 1.0)).length() < 1e-5);
    }
}

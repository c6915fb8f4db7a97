//! Property tests for the torus generator.
//!
//! Every case is run for a spread of shapes, from the demo torus to the
//! minimal three by three grid and a self-intersecting one.

mod common;

use glam::Vec3;
use rstest::rstest;

use text_scene::{generate_torus, GeometryError, TorusParams};

#[rstest]
#[case::demo(0.3, 0.2, 20, 45)]
#[case::minimal(1.0, 0.25, 3, 3)]
#[case::fine(2.0, 0.5, 8, 64)]
#[case::self_intersecting(0.5, 0.7, 12, 12)]
fn test_counts_and_indices(
    #[case] radius: f32,
    #[case] tube: f32,
    #[case] radial: u32,
    #[case] tubular: u32,
) {
    common::init_logging();
    let mesh = generate_torus(radius, tube, radial, tubular).unwrap();

    assert_eq!(mesh.vertex_count(), ((radial + 1) * (tubular + 1)) as usize);
    assert_eq!(mesh.triangle_count(), (2 * radial * tubular) as usize);
    assert_eq!(mesh.validate(), Ok(()));
    assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
}

#[rstest]
#[case::demo(0.3, 0.2, 20, 45)]
#[case::minimal(1.0, 0.25, 3, 3)]
#[case::fine(2.0, 0.5, 8, 64)]
fn test_normals_are_unit_and_radial(
    #[case] radius: f32,
    #[case] tube: f32,
    #[case] radial: u32,
    #[case] tubular: u32,
) {
    let mesh = generate_torus(radius, tube, radial, tubular).unwrap();
    for vertex in &mesh.vertices {
        assert!((vertex.normal.length() - 1.0).abs() < 1e-5);

        // the vertex sits one tube radius along its normal from the centerline
        let p = vertex.position;
        let center = Vec3::new(p.x, p.y, 0.0).normalize() * radius;
        let expected = center + vertex.normal * tube;
        assert!((expected - p).length() < 1e-4, "{:?} vs {:?}", expected, p);
    }
}

#[rstest]
#[case::demo(0.3, 0.2, 20, 45)]
#[case::minimal(1.0, 0.25, 3, 3)]
fn test_seams_coincide(
    #[case] radius: f32,
    #[case] tube: f32,
    #[case] radial: u32,
    #[case] tubular: u32,
) {
    let mesh = generate_torus(radius, tube, radial, tubular).unwrap();
    let row = (tubular + 1) as usize;
    let vertex = |j: usize, i: usize| mesh.vertices[j * row + i];

    for j in 0..=radial as usize {
        let (first, last) = (vertex(j, 0), vertex(j, tubular as usize));
        assert_eq!(first.position, last.position);
        assert_eq!(first.normal, last.normal);
        assert_eq!(first.uv.x, 0.0);
        assert_eq!(last.uv.x, 1.0);
    }
    for i in 0..=tubular as usize {
        assert_eq!(vertex(0, i).position, vertex(radial as usize, i).position);
    }
}

#[rstest]
#[case::demo(0.3, 0.2, 20, 45)]
#[case::minimal(1.0, 0.25, 3, 3)]
#[case::fine(2.0, 0.5, 8, 64)]
fn test_faces_wind_outward(
    #[case] radius: f32,
    #[case] tube: f32,
    #[case] radial: u32,
    #[case] tubular: u32,
) {
    let mesh = generate_torus(radius, tube, radial, tubular).unwrap();
    for [a, b, c] in mesh.triangles() {
        let [a, b, c] = [a, b, c].map(|i| mesh.vertices[i as usize]);
        let face = (b.position - a.position).cross(c.position - a.position);
        let outward = a.normal + b.normal + c.normal;
        assert!(face.dot(outward) > 0.0);
    }
}

#[test]
fn test_uvs_cover_unit_square() {
    let mesh = generate_torus(0.3, 0.2, 20, 45).unwrap();
    assert!(mesh.uvs().all(|uv| (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)));
    assert_eq!(mesh.uvs().next(), Some(glam::Vec2::ZERO));
    assert_eq!(mesh.uvs().last(), Some(glam::Vec2::ONE));
}

#[test]
fn test_generation_is_deterministic() {
    let params = TorusParams::new(0.3, 0.2, 20, 45);
    let a = params.generate().unwrap();
    let b = params.generate().unwrap();
    assert_eq!(a.vertex_bytes(), b.vertex_bytes());
    assert_eq!(a.index_bytes(), b.index_bytes());
}

#[rstest]
#[case::zero_radius(0.0, 0.2, 20, 45, "radius")]
#[case::negative_radius(-1.0, 0.2, 20, 45, "radius")]
#[case::nan_radius(f32::NAN, 0.2, 20, 45, "radius")]
#[case::zero_tube(0.3, 0.0, 20, 45, "tube_radius")]
#[case::infinite_tube(0.3, f32::INFINITY, 20, 45, "tube_radius")]
#[case::two_radial(0.3, 0.2, 2, 45, "radial_segments")]
#[case::two_tubular(0.3, 0.2, 20, 2, "tubular_segments")]
#[case::index_overflow(0.3, 0.2, u32::MAX, 3, "segments")]
fn test_invalid_parameters(
    #[case] radius: f32,
    #[case] tube: f32,
    #[case] radial: u32,
    #[case] tubular: u32,
    #[case] field: &str,
) {
    match generate_torus(radius, tube, radial, tubular) {
        Err(GeometryError::InvalidParameter { name, .. }) => assert_eq!(name, field),
        Ok(_) => panic!("expected {field} to be rejected"),
    }
}

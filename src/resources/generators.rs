//! Mesh generators for parametric surfaces.
//!
//! These generators produce [`Mesh`] values that an external renderer can
//! upload as-is via [`Mesh::vertex_bytes`] and [`Mesh::index_bytes`].

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use super::mesh::{Mesh, Vertex};

/// Smallest segment count that still encloses a volume
pub const MIN_SEGMENTS: u32 = 3;

/// Errors raised by the mesh generators
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl GeometryError {
    fn invalid(name: &'static str, value: impl Into<f64>, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
            reason,
        }
    }
}

/// Shape parameters of a torus
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusParams {
    /// Distance from the torus center to the tube center
    pub radius: f32,
    /// Radius of the tube
    pub tube_radius: f32,
    /// Segments around the tube cross-section
    pub radial_segments: u32,
    /// Segments around the major circle
    pub tubular_segments: u32,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube_radius: 0.4,
            radial_segments: 12,
            tubular_segments: 48,
        }
    }
}

impl TorusParams {
    pub fn new(radius: f32, tube_radius: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Self {
            radius,
            tube_radius,
            radial_segments,
            tubular_segments,
        }
    }

    pub fn vertex_count(&self) -> usize {
        (self.radial_segments as usize + 1) * (self.tubular_segments as usize + 1)
    }

    pub fn triangle_count(&self) -> usize {
        self.radial_segments as usize * self.tubular_segments as usize * 2
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(GeometryError::invalid(
                "radius",
                self.radius,
                "must be a finite number greater than zero",
            ));
        }
        if !(self.tube_radius.is_finite() && self.tube_radius > 0.0) {
            return Err(GeometryError::invalid(
                "tube_radius",
                self.tube_radius,
                "must be a finite number greater than zero",
            ));
        }
        if self.radial_segments < MIN_SEGMENTS {
            return Err(GeometryError::invalid(
                "radial_segments",
                self.radial_segments,
                "must be at least 3",
            ));
        }
        if self.tubular_segments < MIN_SEGMENTS {
            return Err(GeometryError::invalid(
                "tubular_segments",
                self.tubular_segments,
                "must be at least 3",
            ));
        }
        let vertices = (self.radial_segments as u64 + 1) * (self.tubular_segments as u64 + 1);
        if vertices > u32::MAX as u64 {
            return Err(GeometryError::invalid(
                "segments",
                vertices as f64,
                "grid has more vertices than a u32 index can address",
            ));
        }
        Ok(())
    }

    pub fn generate(&self) -> Result<Mesh, GeometryError> {
        generate_torus(
            self.radius,
            self.tube_radius,
            self.radial_segments,
            self.tubular_segments,
        )
    }
}

/// Generate a torus mesh.
///
/// The torus lies in the XY plane around the Z axis. Vertices form a grid of
/// `(radial_segments + 1) * (tubular_segments + 1)` points; the last row and
/// column repeat the first ones at angle zero so the UV seam closes without a
/// positional gap. Normals point from the tube centerline to the vertex.
///
/// # Arguments
///
/// * `radius` - Distance from the torus center to the tube center
/// * `tube_radius` - Radius of the tube
/// * `radial_segments` - Segments around the tube cross-section (min 3)
/// * `tubular_segments` - Segments around the major circle (min 3)
pub fn generate_torus(
    radius: f32,
    tube_radius: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> Result<Mesh, GeometryError> {
    let params = TorusParams::new(radius, tube_radius, radial_segments, tubular_segments);
    params.validate()?;

    if tube_radius >= radius {
        log::warn!(
            "generate_torus: tube_radius {} >= radius {}, surface self-intersects",
            tube_radius,
            radius
        );
    }

    let mut mesh = Mesh::with_capacity("torus", params.vertex_count(), params.triangle_count() * 3);

    for j in 0..=radial_segments {
        let v = (j % radial_segments) as f32 / radial_segments as f32 * TAU;
        let (sin_v, cos_v) = v.sin_cos();

        for i in 0..=tubular_segments {
            let u = (i % tubular_segments) as f32 / tubular_segments as f32 * TAU;
            let (sin_u, cos_u) = u.sin_cos();

            let ring = radius + tube_radius * cos_v;
            let position = Vec3::new(ring * cos_u, ring * sin_u, tube_radius * sin_v);
            let center = Vec3::new(radius * cos_u, radius * sin_u, 0.0);

            mesh.push_vertex(Vertex::new(
                position,
                (position - center).normalize(),
                Vec2::new(
                    i as f32 / tubular_segments as f32,
                    j as f32 / radial_segments as f32,
                ),
            ));
        }
    }

    let row = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;

            mesh.push_triangle(a, b, d);
            mesh.push_triangle(b, c, d);
        }
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_torus_counts() {
        let mesh = generate_torus(0.3, 0.2, 20, 45).unwrap();
        assert_eq!(mesh.vertex_count(), 966);
        assert_eq!(mesh.triangle_count(), 1800);
        assert_eq!(mesh.index_count(), 5400);
    }

    #[test]
    fn test_minimal_torus_is_valid() {
        let mesh = generate_torus(1.0, 0.5, 3, 3).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(), 18);
        assert_eq!(mesh.validate(), Ok(()));
        let bounds = mesh.bounding_box().unwrap();
        assert!(bounds.size().x > 1.0);
    }

    #[test]
    fn test_invalid_radius() {
        let err = generate_torus(0.0, 0.2, 20, 45).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::InvalidParameter { name: "radius", .. }
        ));
    }

    #[test]
    fn test_invalid_segments() {
        let err = generate_torus(0.3, 0.2, 2, 45).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::InvalidParameter {
                name: "radial_segments",
                ..
            }
        ));
        let err = generate_torus(0.3, 0.2, 20, 1).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::InvalidParameter {
                name: "tubular_segments",
                ..
            }
        ));
    }

    #[test]
    fn test_index_overflow_is_rejected() {
        // 65536 * 65537 vertices no longer fit a u32 index
        let params = TorusParams::new(0.3, 0.2, 65535, 65536);
        match params.validate() {
            Err(GeometryError::InvalidParameter { name, value, .. }) => {
                assert_eq!(name, "segments");
                assert_eq!(value, 65536.0 * 65537.0);
            }
            Ok(()) => panic!("expected the grid to be rejected"),
        }
        // the largest grid that still fits is accepted
        assert!(TorusParams::new(0.3, 0.2, 65535, 65534).validate().is_ok());
    }

    #[test]
    fn test_non_finite_radius_is_rejected() {
        assert!(generate_torus(f32::NAN, 0.2, 20, 45).is_err());
        assert!(generate_torus(0.3, f32::INFINITY, 20, 45).is_err());
        assert!(generate_torus(0.3, -0.2, 20, 45).is_err());
    }

    #[test]
    fn test_uv_spans_unit_square() {
        let mesh = generate_torus(0.3, 0.2, 4, 8).unwrap();
        let first = mesh.vertices.first().unwrap().uv;
        let last = mesh.vertices.last().unwrap().uv;
        assert_eq!(first, Vec2::ZERO);
        assert_eq!(last, Vec2::ONE);
    }

    #[test]
    fn test_params_generate_matches_free_function() {
        let params = TorusParams::new(0.3, 0.2, 20, 45);
        assert_eq!(params.vertex_count(), 966);
        assert_eq!(params.triangle_count(), 1800);
        assert_eq!(params.generate().unwrap(), generate_torus(0.3, 0.2, 20, 45).unwrap());
    }
}

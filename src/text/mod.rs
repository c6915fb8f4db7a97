//! Extruded text geometry
//!
//! Turns a string into a bevelled 3D mesh:
//! - [`Font`] lays the string out and yields glyph outlines
//! - [`ShapePath::to_shapes`] splits outlines into solids and holes
//! - [`triangulate_shape`] fills the lids
//! - [`extrude_shapes`] builds bevel layers and side walls

mod extrude;
mod font;
mod shape;
mod triangulate;

pub use extrude::*;
pub use font::*;
pub use shape::*;
pub use triangulate::*;

use thiserror::Error;

use crate::resources::Mesh;

/// Text geometry error type
#[derive(Error, Debug)]
pub enum TextError {
    #[error("failed to parse typeface JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid font: {0}")]
    InvalidFont(String),
    #[error("malformed outline for glyph {glyph:?}: {reason}")]
    MalformedOutline { glyph: char, reason: String },
    #[error("text {0:?} produced no geometry")]
    Empty(String),
}

/// Parameters of an extruded text mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextGeometryParams {
    /// Glyph height in scene units
    pub size: f32,
    /// Extrusion depth along Z
    pub depth: f32,
    /// Samples per glyph curve
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextGeometryParams {
    fn default() -> Self {
        Self {
            size: 0.5,
            depth: 0.2,
            curve_segments: 12,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 5,
        }
    }
}

impl TextGeometryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_curve_segments(mut self, segments: u32) -> Self {
        self.curve_segments = segments;
        self
    }

    pub fn with_bevel(mut self, thickness: f32, size: f32, offset: f32, segments: u32) -> Self {
        self.bevel_enabled = true;
        self.bevel_thickness = thickness;
        self.bevel_size = size;
        self.bevel_offset = offset;
        self.bevel_segments = segments;
        self
    }

    pub fn with_bevel_size(mut self, size: f32) -> Self {
        self.bevel_size = size;
        self
    }

    pub fn without_bevel(mut self) -> Self {
        self.bevel_enabled = false;
        self
    }

    pub fn extrude_options(&self) -> ExtrudeOptions {
        ExtrudeOptions {
            depth: self.depth,
            steps: 1,
            bevel_enabled: self.bevel_enabled,
            bevel_thickness: self.bevel_thickness,
            bevel_size: self.bevel_size,
            bevel_offset: self.bevel_offset,
            bevel_segments: self.bevel_segments,
        }
    }
}

/// Build the extruded mesh for `text`
pub fn text_geometry(font: &Font, text: &str, params: &TextGeometryParams) -> Result<Mesh, TextError> {
    let shapes = font.generate_shapes(text, params.size, params.curve_segments)?;
    let mesh = extrude_shapes(&format!("text:{text}"), &shapes, &params.extrude_options());
    if mesh.is_empty() {
        return Err(TextError::Empty(text.to_string()));
    }
    log::debug!(
        "Built text mesh {:?}: {} shapes, {} triangles",
        text,
        shapes.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

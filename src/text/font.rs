//! Typeface JSON fonts
//!
//! Glyph outlines are stored as whitespace-separated drawing commands in font
//! units: `m x y` (move), `l x y` (line), `q x y cx cy` (quadratic curve to
//! `x y`) and `b x y c1x c1y c2x c2y` (cubic curve to `x y`).

use std::collections::HashMap;

use glam::Vec2;
use serde::Deserialize;

use super::shape::{Segment, Shape, ShapePath};
use super::TextError;

/// Font-wide bounding box in font units
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontBounds {
    #[serde(default)]
    pub x_min: f32,
    #[serde(default)]
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    /// Horizontal advance
    pub ha: f32,
    #[serde(default)]
    pub x_min: f32,
    #[serde(default)]
    pub x_max: f32,
    #[serde(default, rename = "o")]
    pub outline: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    #[serde(default)]
    pub family_name: String,
    pub resolution: f32,
    pub bounding_box: FontBounds,
    #[serde(default)]
    pub underline_thickness: f32,
    pub glyphs: HashMap<String, Glyph>,
}

impl Font {
    pub fn from_json(bytes: &[u8]) -> Result<Self, TextError> {
        let font: Font = serde_json::from_slice(bytes)?;
        if !(font.resolution.is_finite() && font.resolution > 0.0) {
            return Err(TextError::InvalidFont(format!(
                "resolution must be positive, got {}",
                font.resolution
            )));
        }
        log::debug!(
            "Parsed font '{}' with {} glyphs",
            font.family_name,
            font.glyphs.len()
        );
        Ok(font)
    }

    /// Glyph for `ch`, falling back to `?`
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs
            .get(&*ch.encode_utf8(&mut buf))
            .or_else(|| self.glyphs.get("?"))
    }

    /// Distance between consecutive baselines for text of the given size
    pub fn line_height(&self, size: f32) -> f32 {
        let bounds = &self.bounding_box;
        (bounds.y_max - bounds.y_min + self.underline_thickness) * size / self.resolution
    }

    /// Lay out `text` and return one outline per glyph.
    ///
    /// A newline starts a new line below the previous one. Characters
    /// without a glyph (and no `?` fallback) are skipped without advancing.
    pub fn generate_paths(&self, text: &str, size: f32) -> Result<Vec<ShapePath>, TextError> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let mut offset = Vec2::ZERO;
        let mut paths = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }
            let Some(glyph) = self.glyph(ch) else {
                log::warn!(
                    "character {:?} does not exist in font family '{}'",
                    ch,
                    self.family_name
                );
                continue;
            };
            paths.push(glyph_path(glyph, ch, scale, offset)?);
            offset.x += glyph.ha * scale;
        }

        Ok(paths)
    }

    /// Lay out `text` and split the outlines into fillable shapes
    pub fn generate_shapes(
        &self,
        text: &str,
        size: f32,
        curve_segments: u32,
    ) -> Result<Vec<Shape>, TextError> {
        Ok(self
            .generate_paths(text, size)?
            .iter()
            .flat_map(|path| path.to_shapes(curve_segments))
            .collect())
    }
}

fn glyph_path(glyph: &Glyph, ch: char, scale: f32, offset: Vec2) -> Result<ShapePath, TextError> {
    let mut path = ShapePath::new();
    let Some(outline) = glyph.outline.as_deref() else {
        return Ok(path);
    };

    let malformed = |reason: String| TextError::MalformedOutline { glyph: ch, reason };
    let mut tokens = outline.split_whitespace();
    let next_point = |tokens: &mut std::str::SplitWhitespace<'_>| -> Result<Vec2, TextError> {
        let mut coord = || -> Result<f32, TextError> {
            let token = tokens
                .next()
                .ok_or_else(|| malformed("outline ends inside a command".to_string()))?;
            token
                .parse::<f32>()
                .map_err(|e| malformed(format!("bad coordinate {token:?}: {e}")))
        };
        let x = coord()?;
        let y = coord()?;
        Ok(Vec2::new(x, y) * scale + offset)
    };

    while let Some(action) = tokens.next() {
        let segment = match action {
            "m" => {
                path.move_to(next_point(&mut tokens)?);
                continue;
            }
            "l" => Segment::Line(next_point(&mut tokens)?),
            "q" => {
                let to = next_point(&mut tokens)?;
                let control = next_point(&mut tokens)?;
                Segment::Quadratic { control, to }
            }
            "b" => {
                let to = next_point(&mut tokens)?;
                let control1 = next_point(&mut tokens)?;
                let control2 = next_point(&mut tokens)?;
                Segment::Cubic {
                    control1,
                    control2,
                    to,
                }
            }
            other => return Err(malformed(format!("unknown command {other:?}"))),
        };
        path.current_mut()
            .ok_or_else(|| malformed(format!("command {action:?} before the first move")))?
            .segments
            .push(segment);
    }

    Ok(path)
}

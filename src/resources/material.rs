//! Matcap material definitions

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use super::texture::TextureSlot;

/// Material that shades by looking up the view-space normal in a matcap
/// texture, so no scene lights are needed.
#[derive(Debug, Clone)]
pub struct MatcapMaterial {
    pub name: String,
    /// Tint multiplied with the matcap sample
    pub color: Vec3,
    pub matcap: Arc<TextureSlot>,
}

impl MatcapMaterial {
    pub fn new(name: &str, matcap: Arc<TextureSlot>) -> Self {
        Self {
            name: name.to_string(),
            color: Vec3::ONE,
            matcap,
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    /// Matcap texture coordinate for a view-space normal
    pub fn matcap_uv(view_normal: Vec3) -> Vec2 {
        let n = view_normal.normalize_or_zero();
        Vec2::new(n.x * 0.5 + 0.5, 0.5 - n.y * 0.5)
    }

    /// Shade a view-space normal. Falls back to the plain tint while the
    /// matcap is still loading or failed to load.
    pub fn shade(&self, view_normal: Vec3) -> Vec3 {
        let Some(texture) = self.matcap.data() else {
            return self.color;
        };
        let uv = Self::matcap_uv(view_normal);
        let x = (uv.x * texture.width as f32) as u32;
        let y = (uv.y * texture.height as f32) as u32;
        let [r, g, b, _] = texture.texel(x, y);
        self.color * Vec3::new(r as f32, g as f32, b as f32) / 255.0
    }

    /// Uniform data for GPU. `color.w` is 1 once the matcap can be sampled
    /// and 0 while the shader has to fall back to the tint.
    pub fn uniform_data(&self) -> MaterialUniformData {
        let sampled = if self.matcap.is_ready() { 1.0 } else { 0.0 };
        MaterialUniformData {
            color: self.color.extend(sampled),
        }
    }
}

/// Material uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniformData {
    pub color: Vec4,
}

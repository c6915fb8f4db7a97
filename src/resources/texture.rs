//! Texture loading and shared texture slots

use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView};
use parking_lot::RwLock;

/// Decoded RGBA8 texture data
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Load texture from file. The format is picked from the extension.
    pub fn from_file<P: AsRef<Path>>(path: P, name: &str) -> Result<Self, image::ImageError> {
        let img = image::open(path)?;
        Ok(Self::from_image(img, name))
    }

    /// Load texture from encoded bytes (png, jpeg, ...)
    pub fn from_bytes(bytes: &[u8], name: &str) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(img, name))
    }

    fn from_image(img: DynamicImage, name: &str) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.to_rgba8().into_raw(),
            name: name.to_string(),
        }
    }

    /// Create a solid color texture
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            data: color.to_vec(),
            name: name.to_string(),
        }
    }

    /// RGBA texel at `(x, y)`, clamped to the texture edges
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let offset = ((y * self.width + x) * 4) as usize;
        let mut texel = [0; 4];
        if let Some(bytes) = self.data.get(offset..offset + 4) {
            texel.copy_from_slice(bytes);
        }
        texel
    }
}

/// Load state of a texture slot
#[derive(Debug, Clone)]
pub enum TextureState {
    Pending,
    Ready(Arc<TextureData>),
    Failed(String),
}

/// A texture that may still be loading.
///
/// Materials hold slots by reference, so a load that completes after the
/// scene has been assembled is picked up the next time the slot is read.
#[derive(Debug)]
pub struct TextureSlot {
    path: String,
    state: RwLock<TextureState>,
}

impl TextureSlot {
    pub fn pending(path: &str) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            state: RwLock::new(TextureState::Pending),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> TextureState {
        self.state.read().clone()
    }

    /// The decoded texture, once loaded
    pub fn data(&self) -> Option<Arc<TextureData>> {
        match &*self.state.read() {
            TextureState::Ready(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.read(), TextureState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), TextureState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(*self.state.read(), TextureState::Failed(_))
    }

    pub fn fulfill(&self, data: TextureData) {
        *self.state.write() = TextureState::Ready(Arc::new(data));
    }

    pub fn fail(&self, reason: impl Into<String>) {
        *self.state.write() = TextureState::Failed(reason.into());
    }
}

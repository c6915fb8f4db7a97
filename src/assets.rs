//! Asset loading
//!
//! Fonts are awaited by the caller, textures are fire-and-forget: a loader
//! hands out a pending [`TextureSlot`] right away and fills it when the image
//! has been decoded. Every completed load is recorded as an [`AssetEvent`] so
//! failures can be reported after the fact.
//!
//! # Loaders
//!
//! - [`FsAssetLoader`]: files under a root directory, textures decoded on
//!   worker threads (native only)
//! - [`MemoryAssetLoader`]: in-memory assets for tests and embedded data
//! - `web::FetchAssetLoader`: browser `fetch` (wasm only)

use std::collections::HashMap;
use std::future::Future;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use image::ImageError;
use parking_lot::Mutex;
use thiserror::Error;

use crate::resources::{TextureData, TextureSlot};
use crate::text::{Font, TextError};

/// Asset loading error type
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to load font {path}: {source}")]
    Font {
        path: String,
        #[source]
        source: TextError,
    },
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
}

impl AssetError {
    /// Path of the asset that failed
    pub fn path(&self) -> &str {
        match self {
            AssetError::Io { path, .. }
            | AssetError::Image { path, .. }
            | AssetError::Font { path, .. }
            | AssetError::Fetch { path, .. } => path,
        }
    }
}

/// Outcome of a finished asset load
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEvent {
    Loaded { path: String },
    Failed { path: String, error: String },
}

impl AssetEvent {
    pub fn path(&self) -> &str {
        match self {
            AssetEvent::Loaded { path } | AssetEvent::Failed { path, .. } => path,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, AssetEvent::Failed { .. })
    }
}

/// Shared log of asset events, cloned into loader worker threads
#[derive(Debug, Clone, Default)]
pub struct AssetEvents(Arc<Mutex<Vec<AssetEvent>>>);

impl AssetEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded(&self, path: &str) {
        log::debug!("Loaded asset {}", path);
        self.0.lock().push(AssetEvent::Loaded {
            path: path.to_string(),
        });
    }

    pub fn failed(&self, error: &AssetError) {
        log::error!("{}", error);
        self.0.lock().push(AssetEvent::Failed {
            path: error.path().to_string(),
            error: error.to_string(),
        });
    }

    /// Take all events recorded so far
    pub fn drain(&self) -> Vec<AssetEvent> {
        std::mem::take(&mut *self.0.lock())
    }

    /// Record the outcome of a texture load and settle its slot
    pub fn settle_texture(&self, slot: &TextureSlot, result: Result<TextureData, AssetError>) {
        match result {
            Ok(data) => {
                slot.fulfill(data);
                self.loaded(slot.path());
            }
            Err(error) => {
                slot.fail(error.to_string());
                self.failed(&error);
            }
        }
    }

    /// Record the outcome of a font load and pass it through
    pub fn settle_font(&self, path: &str, result: Result<Font, AssetError>) -> Result<Font, AssetError> {
        match &result {
            Ok(_) => self.loaded(path),
            Err(error) => self.failed(error),
        }
        result
    }
}

/// Source of fonts and textures for scene assembly
pub trait AssetLoader {
    /// Load and parse a typeface font
    fn load_font(&self, path: &str) -> impl Future<Output = Result<Font, AssetError>>;

    /// Start loading a texture; the returned slot is filled when it completes
    fn load_texture(&self, path: &str) -> Arc<TextureSlot>;

    /// Take the load events recorded so far
    fn drain_events(&self) -> Vec<AssetEvent>;
}

/// Parse font bytes read from `path`
pub fn parse_font(path: &str, bytes: &[u8]) -> Result<Font, AssetError> {
    Font::from_json(bytes).map_err(|source| AssetError::Font {
        path: path.to_string(),
        source,
    })
}

/// Decode texture bytes read from `path`
pub fn decode_texture(path: &str, bytes: &[u8]) -> Result<TextureData, AssetError> {
    TextureData::from_bytes(bytes, path).map_err(|source| AssetError::Image {
        path: path.to_string(),
        source,
    })
}

/// Loader reading assets from a directory on disk.
///
/// Fonts are read on the calling thread when the future is polled. Each
/// texture is decoded on its own worker thread; call [`FsAssetLoader::wait`]
/// to block until all of them have settled.
#[cfg(not(target_arch = "wasm32"))]
pub struct FsAssetLoader {
    root: PathBuf,
    pending: Mutex<Vec<std::thread::JoinHandle<()>>>,
    events: AssetEvents,
}

#[cfg(not(target_arch = "wasm32"))]
impl FsAssetLoader {
    /// Create a loader rooted at the given directory.
    ///
    /// The directory does not need to exist yet; missing files surface as
    /// failed loads.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pending: Mutex::new(Vec::new()),
            events: AssetEvents::new(),
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        std::fs::read(self.resolve(path)).map_err(|source| AssetError::Io {
            path: path.to_string(),
            source,
        })
    }

    /// Block until every texture load started so far has settled
    pub fn wait(&self) {
        let handles = std::mem::take(&mut *self.pending.lock());
        for handle in handles {
            if handle.join().is_err() {
                log::error!("Texture loader thread panicked");
            }
        }
    }

    /// Number of texture loads not yet joined
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetLoader for FsAssetLoader {
    fn load_font(&self, path: &str) -> impl Future<Output = Result<Font, AssetError>> {
        let path = path.to_string();
        async move {
            let result = self.read(&path).and_then(|bytes| parse_font(&path, &bytes));
            if let Ok(font) = &result {
                log::info!("Loaded font '{}' from {}", font.family_name, path);
            }
            self.events.settle_font(&path, result)
        }
    }

    fn load_texture(&self, path: &str) -> Arc<TextureSlot> {
        let slot = TextureSlot::pending(path);
        let full_path = self.resolve(path);
        let events = self.events.clone();
        let worker_slot = Arc::clone(&slot);

        let spawned = std::thread::Builder::new()
            .name(format!("texture-loader:{path}"))
            .spawn(move || {
                let path = worker_slot.path().to_string();
                let result = TextureData::from_file(&full_path, &path).map_err(|error| match error {
                    ImageError::IoError(source) => AssetError::Io {
                        path: path.clone(),
                        source,
                    },
                    source => AssetError::Image {
                        path: path.clone(),
                        source,
                    },
                });
                events.settle_texture(&worker_slot, result);
            });

        match spawned {
            Ok(handle) => self.pending.lock().push(handle),
            Err(source) => self.events.settle_texture(
                &slot,
                Err(AssetError::Io {
                    path: path.to_string(),
                    source,
                }),
            ),
        }
        slot
    }

    fn drain_events(&self) -> Vec<AssetEvent> {
        self.events.drain()
    }
}

/// Loader serving assets from memory. Textures settle immediately.
#[derive(Default)]
pub struct MemoryAssetLoader {
    files: HashMap<String, Vec<u8>>,
    events: AssetEvents,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.to_string(), bytes.into());
    }

    fn read(&self, path: &str) -> Result<&[u8], AssetError> {
        self.files
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| AssetError::Io {
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such asset"),
            })
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load_font(&self, path: &str) -> impl Future<Output = Result<Font, AssetError>> {
        let result = self.read(path).and_then(|bytes| parse_font(path, bytes));
        std::future::ready(self.events.settle_font(path, result))
    }

    fn load_texture(&self, path: &str) -> Arc<TextureSlot> {
        let slot = TextureSlot::pending(path);
        let result = self.read(path).and_then(|bytes| decode_texture(path, bytes));
        self.events.settle_texture(&slot, result);
        slot
    }

    fn drain_events(&self) -> Vec<AssetEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::TextureState;
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    const FONT: &str = r#"{
        "familyName": "Mono",
        "resolution": 10,
        "boundingBox": { "yMin": 0, "yMax": 10 },
        "glyphs": { "?": { "ha": 10, "o": "m 0 0 l 0 10 l 10 10 l 10 0 l 0 0" } }
    }"#;

    fn png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("text-scene-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(dir.join("textures")).unwrap();
        dir
    }

    #[test]
    fn test_memory_loader_settles_immediately() {
        let loader = MemoryAssetLoader::new()
            .with_file("font.json", FONT)
            .with_file("a.png", png());

        let font = pollster::block_on(loader.load_font("font.json")).unwrap();
        assert_eq!(font.family_name, "Mono");

        let slot = loader.load_texture("a.png");
        assert!(slot.is_ready());
        assert_eq!(slot.data().unwrap().texel(1, 1), [200, 100, 50, 255]);

        let missing = loader.load_texture("missing.png");
        assert!(missing.is_failed());

        let events = loader.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events.iter().filter(|e| e.is_failure()).count(), 1);
        assert_eq!(events[2].path(), "missing.png");
        assert!(loader.drain_events().is_empty());
    }

    #[test]
    fn test_memory_loader_font_errors_carry_path() {
        let loader = MemoryAssetLoader::new().with_file("bad.json", "{}");
        let err = pollster::block_on(loader.load_font("bad.json")).unwrap_err();
        assert!(matches!(err, AssetError::Font { .. }));
        assert_eq!(err.path(), "bad.json");

        let err = pollster::block_on(loader.load_font("none.json")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn test_fs_loader_textures_settle_after_wait() {
        let dir = scratch_dir("fs-textures");
        std::fs::write(dir.join("textures/ok.png"), png()).unwrap();
        std::fs::write(dir.join("textures/broken.png"), b"not a png").unwrap();

        let loader = FsAssetLoader::new(&dir);
        let ok = loader.load_texture("textures/ok.png");
        let broken = loader.load_texture("/textures/broken.png");
        let missing = loader.load_texture("textures/missing.png");
        loader.wait();
        assert_eq!(loader.pending_count(), 0);

        assert!(ok.is_ready());
        assert_eq!(ok.data().unwrap().name, "textures/ok.png");
        // unreadable files and undecodable images fail differently
        let reason = |slot: &TextureSlot| match slot.state() {
            TextureState::Failed(reason) => reason,
            state => panic!("expected a failed slot, got {state:?}"),
        };
        assert!(reason(&broken).starts_with("failed to decode image"));
        assert!(reason(&missing).starts_with("failed to read textures/missing.png"));

        let failures: Vec<_> = loader
            .drain_events()
            .into_iter()
            .filter(AssetEvent::is_failure)
            .collect();
        assert_eq!(failures.len(), 2);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_fs_loader_reads_font() {
        let dir = scratch_dir("fs-font");
        std::fs::write(dir.join("font.json"), FONT).unwrap();

        let loader = FsAssetLoader::new(&dir);
        let font = pollster::block_on(loader.load_font("font.json")).unwrap();
        assert_eq!(font.glyphs.len(), 1);
        assert_eq!(
            loader.drain_events(),
            vec![AssetEvent::Loaded {
                path: "font.json".to_string()
            }]
        );

        std::fs::remove_dir_all(dir).ok();
    }
}

//! Web-specific functionality for building the scene in a browser.
//!
//! Assets are fetched relative to the page, texture decoding runs in
//! futures spawned on the browser's event loop.

use std::future::Future;
use std::sync::Arc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::assets::{decode_texture, parse_font, AssetError, AssetEvent, AssetEvents, AssetLoader};
use crate::resources::TextureSlot;
use crate::scene::{scene_rng, SceneAssembler, SceneConfig};
use crate::text::Font;
use crate::init_web_logging;

/// Spawn a future on the browser's event loop
pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Log a message to the browser console
#[wasm_bindgen]
pub fn console_log(msg: &str) {
    web_sys::console::log_1(&msg.into());
}

/// Log an error to the browser console
#[wasm_bindgen]
pub fn console_error(msg: &str) {
    web_sys::console::error_1(&msg.into());
}

/// Fetch the bytes at `url`
async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AssetError> {
    let fetch_err = |reason: String| AssetError::Fetch {
        path: url.to_string(),
        reason,
    };
    let js_err = |value: JsValue| fetch_err(format!("{value:?}"));

    let window = web_sys::window().ok_or_else(|| fetch_err("no global window".to_string()))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    if !response.ok() {
        return Err(fetch_err(format!("HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Loader fetching assets over HTTP relative to a base URL
pub struct FetchAssetLoader {
    base: String,
    events: AssetEvents,
}

impl FetchAssetLoader {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            events: AssetEvents::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

impl AssetLoader for FetchAssetLoader {
    fn load_font(&self, path: &str) -> impl Future<Output = Result<Font, AssetError>> {
        let path = path.to_string();
        let url = self.url(&path);
        async move {
            let result = match fetch_bytes(&url).await {
                Ok(bytes) => parse_font(&path, &bytes),
                Err(e) => Err(e),
            };
            self.events.settle_font(&path, result)
        }
    }

    fn load_texture(&self, path: &str) -> Arc<TextureSlot> {
        let slot = TextureSlot::pending(path);
        let url = self.url(path);
        let events = self.events.clone();
        let worker_slot = Arc::clone(&slot);
        spawn_local(async move {
            let path = worker_slot.path().to_string();
            let result = match fetch_bytes(&url).await {
                Ok(bytes) => decode_texture(&path, &bytes),
                Err(e) => Err(e),
            };
            events.settle_texture(&worker_slot, result);
        });
        slot
    }

    fn drain_events(&self) -> Vec<AssetEvent> {
        self.events.drain()
    }
}

/// Entry point for web - called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn start() {
    init_web_logging();
    log::info!("=== Text Scene ===");
    spawn_local(async_main());
}

async fn async_main() {
    let loader = FetchAssetLoader::new(".");
    let config = SceneConfig::default();
    let mut rng = scene_rng(config.seed);

    match SceneAssembler::new(config).assemble(&loader, &mut rng).await {
        Ok(mut assembled) => {
            log::info!(
                "Scene ready: {} nodes ({} tori)",
                assembled.scene.node_count(),
                assembled.tori.len()
            );
            if let Some(bounds) = assembled.scene.bounds() {
                log::info!("Scene bounds: {:?} .. {:?}", bounds.min, bounds.max);
            }
        }
        Err(e) => console_error(&format!("Failed to build scene: {e}")),
    }
}

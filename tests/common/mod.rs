//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use text_scene::scene::{FONT_PATH, MATCAP_PATHS};
use text_scene::MemoryAssetLoader;

/// A font whose only glyph is `?`: a square ring that every other character
/// falls back to.
pub const RING_FONT: &str = r#"{
    "familyName": "Ring",
    "resolution": 1000,
    "underlineThickness": 50,
    "boundingBox": { "xMin": 0, "xMax": 800, "yMin": -200, "yMax": 800 },
    "glyphs": {
        "?": {
            "ha": 800,
            "x_min": 0,
            "x_max": 700,
            "o": "m 0 0 l 0 700 l 700 700 l 700 0 l 0 0 m 200 200 l 500 200 l 500 500 l 200 500 l 200 200"
        },
        " ": { "ha": 300 }
    }
}"#;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Encoded 4x4 PNG of a single color
pub fn png(color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(4, 4, Rgba(color));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .expect("png encoding");
    bytes
}

/// Loader with the font and all three matcaps at their default paths
pub fn demo_loader() -> MemoryAssetLoader {
    MATCAP_PATHS
        .iter()
        .enumerate()
        .fold(
            MemoryAssetLoader::new().with_file(FONT_PATH, RING_FONT),
            |loader, (i, path)| loader.with_file(path, png([40 * i as u8, 80, 160, 255])),
        )
}

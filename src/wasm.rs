//! JavaScript-facing exports.
//!
//! The browser front-end hands over the raw bytes of the dropped file and
//! gets back plain JS values it can render, copy and download.

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::codec;
use crate::gradient::Direction;
use crate::pipeline::{self, PipelineConfig};
use crate::quantize::Palette;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn palette_array(palette: &Palette) -> Array {
    let palette_js = Array::new();
    for hex in palette.hex_codes() {
        palette_js.push(&JsValue::from_str(&hex));
    }
    palette_js
}

/// Extract a palette and render the gradient wallpaper.
///
/// Returns `{ image: Uint8Array /* PNG */, palette: string[], css: string }`.
/// `direction` takes the CSS keyword (`"to right"`) or the kebab-case name.
#[wasm_bindgen(js_name = generateGradient)]
pub fn generate_gradient(
    input: Vec<u8>,
    n_colors: usize,
    direction: &str,
    width: u32,
    height: u32,
) -> Result<Object, JsValue> {
    let direction: Direction = direction.parse().map_err(to_js)?;
    let config = PipelineConfig {
        palette_size: n_colors,
        width,
        height,
        ..PipelineConfig::default()
    };

    let image = codec::decode(&input).map_err(to_js)?;
    let rendered = pipeline::generate(&image, direction, &config).map_err(to_js)?;
    let png = codec::encode_png(&rendered.buffer).map_err(to_js)?;

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("image"), &Uint8Array::from(png.as_slice()))?;
    Reflect::set(&result, &JsValue::from_str("palette"), &palette_array(&rendered.palette))?;
    Reflect::set(&result, &JsValue::from_str("css"), &JsValue::from_str(&rendered.css()))?;
    Ok(result)
}

/// Extract only the palette, as `#rrggbb` strings in prominence order.
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette(input: Vec<u8>, n_colors: usize) -> Result<Array, JsValue> {
    let config = PipelineConfig {
        palette_size: n_colors,
        ..PipelineConfig::default()
    };
    let image = codec::decode(&input).map_err(to_js)?;
    let palette = pipeline::extract_palette(&image, &config).map_err(to_js)?;
    Ok(palette_array(&palette))
}

//! End-to-end checks across sampling, quantization and rendering.

use gradient_wallpaper::{
    codec, extract_palette, generate, quantize, sample, Direction, GradientError, ImageBuffer,
    Pixel, PipelineConfig, Quantizer,
};
use pretty_assertions::assert_eq;

const SKY: Pixel = Pixel::new(70, 130, 220);
const SAND: Pixel = Pixel::new(230, 200, 140);
const SUN: Pixel = Pixel::new(250, 220, 40);

/// Sky over sand with a small sun, plus a little deterministic grain.
fn landscape(width: u32, height: u32) -> ImageBuffer {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let base = if y < height * 3 / 5 {
                let (cx, cy, r) = (width * 4 / 5, height / 5, height / 10);
                let inside = (x as i64 - cx as i64).pow(2) + (y as i64 - cy as i64).pow(2)
                    <= (r as i64).pow(2);
                if inside { SUN } else { SKY }
            } else {
                SAND
            };
            let grain = ((x * 7 + y * 13) % 5) as u8;
            pixels.push(Pixel::new(
                base.r.saturating_sub(grain),
                base.g.saturating_sub(grain),
                base.b.saturating_sub(grain),
            ));
        }
    }
    ImageBuffer::new(width, height, pixels).unwrap()
}

fn close(a: Pixel, b: Pixel, tolerance: u8) -> bool {
    a.r.abs_diff(b.r) <= tolerance && a.g.abs_diff(b.g) <= tolerance && a.b.abs_diff(b.b) <= tolerance
}

#[test]
fn full_pipeline_is_deterministic() {
    let image = landscape(160, 90);
    let config = PipelineConfig {
        width: 96,
        height: 54,
        max_samples: 2_000,
        ..PipelineConfig::default()
    };
    for direction in Direction::ALL {
        let a = generate(&image, direction, &config).unwrap();
        let b = generate(&image, direction, &config).unwrap();
        assert_eq!(a, b, "{direction}");
    }
}

#[test]
fn dominant_colors_come_first() {
    let image = landscape(200, 100);
    let config = PipelineConfig {
        palette_size: 3,
        ..PipelineConfig::default()
    };
    let palette = extract_palette(&image, &config).unwrap();
    assert_eq!(palette.len(), 3);
    assert!(close(palette.get(0).unwrap(), SKY, 4), "{:?}", palette);
    assert!(close(palette.get(1).unwrap(), SAND, 4), "{:?}", palette);
}

#[test]
fn sampling_keeps_dominance_of_large_regions() {
    let image = landscape(400, 300);
    let full = quantize(image.pixels(), 3).unwrap();
    let sampled = quantize(&sample(&image, 1_500).unwrap(), 3).unwrap();
    for i in 0..2 {
        let (a, b) = (full.get(i).unwrap(), sampled.get(i).unwrap());
        assert!(close(a, b, 6), "entry {i}: {a} vs {b}");
    }
}

#[test]
fn palette_length_tracks_distinct_colors() {
    let colors = [Pixel::new(0, 0, 0), Pixel::new(90, 0, 0), Pixel::new(0, 90, 0)];
    let pixels: Vec<Pixel> = (0..30).map(|i| colors[i % 3]).collect();
    let image = ImageBuffer::new(6, 5, pixels).unwrap();
    for k in 1..=5 {
        let config = PipelineConfig {
            palette_size: k,
            ..PipelineConfig::default()
        };
        assert_eq!(extract_palette(&image, &config).unwrap().len(), k.min(3));
    }
}

#[test]
fn left_to_right_edges_match_palette() {
    let image = landscape(64, 64);
    let config = PipelineConfig {
        width: 33,
        height: 7,
        ..PipelineConfig::default()
    };
    let out = generate(&image, Direction::LeftToRight, &config).unwrap();
    let (start, end) = (out.palette.get(0).unwrap(), out.palette.get(1).unwrap());
    for y in 0..7 {
        assert!(close(out.buffer.get(0, y).unwrap(), start, 1));
        assert!(close(out.buffer.get(32, y).unwrap(), end, 1));
    }
}

#[test]
fn solid_image_reports_insufficient_palette() {
    let image = ImageBuffer::new(8, 8, vec![SKY; 64]).unwrap();
    let err = generate(&image, Direction::DiagonalUpRight, &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, GradientError::InsufficientPalette { found: 1 }));
}

#[test]
fn kmeans_pipeline_renders() {
    let image = landscape(120, 80);
    let config = PipelineConfig {
        width: 40,
        height: 20,
        quantizer: Quantizer::kmeans(),
        ..PipelineConfig::default()
    };
    let out = generate(&image, Direction::TopToBottom, &config).unwrap();
    assert!(out.palette.len() >= 2);
    assert_eq!(out.buffer.pixels().len(), 800);
}

#[test]
fn png_export_round_trips_through_decoder() {
    let image = landscape(50, 30);
    let config = PipelineConfig {
        width: 20,
        height: 10,
        ..PipelineConfig::default()
    };
    let out = generate(&image, Direction::DiagonalDownRight, &config).unwrap();
    let png = codec::encode_png(&out.buffer).unwrap();
    let back = codec::decode(&png).unwrap();
    assert_eq!(back.pixels(), out.buffer.pixels());
}

#[test]
fn config_deserializes_with_defaults() {
    let json = r#"{ "palette_size": 3, "quantizer": { "method": "k-means", "seed": 7 } }"#;
    let config: PipelineConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.palette_size, 3);
    assert_eq!(config.width, 1920);
    assert_eq!(
        config.quantizer,
        Quantizer::KMeans { max_iter: 20, seed: 7 }
    );
}

#[test]
fn minority_strip_survives_capped_sampling() {
    let (red, blue) = (Pixel::new(255, 0, 0), Pixel::new(0, 0, 255));
    let pixels = (0..300 * 400)
        .map(|i| if i % 400 < 100 { red } else { blue })
        .collect();
    let image = ImageBuffer::new(400, 300, pixels).unwrap();
    let config = PipelineConfig {
        max_samples: 300,
        width: 8,
        height: 8,
        ..PipelineConfig::default()
    };

    let palette = extract_palette(&image, &config).unwrap();
    assert_eq!(palette.hex_codes(), vec!["#0000ff", "#ff0000"]);
    assert_eq!(palette.swatches()[0].population, 225);
    assert!(generate(&image, Direction::LeftToRight, &config).is_ok());
}

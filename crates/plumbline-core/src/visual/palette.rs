// ─────────────────────────────────────────────────────────────────────
// Plumbline: Palette Similarity
// ─────────────────────────────────────────────────────────────────────

use image::DynamicImage;
use plumbline_types::{MaterialPalette, PlumblineError, PlumblineResult};

pub type Rgb = [u8; 3];

/// Fallback exterior wall colour (stone).
pub const DEFAULT_WALL: &str = "#B8B0A2";
/// Fallback roof colour (terracotta).
pub const DEFAULT_ROOF: &str = "#E2725B";
/// Fallback ground-floor finish colour (silver).
pub const DEFAULT_GROUND_FLOOR: &str = "#C0C0C0";

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex(hex: &str) -> PlumblineResult<Rgb> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(PlumblineError::Decode(format!("invalid hex colour '{hex}'")));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| PlumblineError::Decode(format!("invalid hex colour '{hex}'")))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// The three colours a render is expected to contain, with fallbacks
/// for absent or unparsable entries.
pub fn expected_colors(palette: &MaterialPalette) -> [Rgb; 3] {
    let resolve = |value: Option<&str>, fallback: &str| {
        let candidate = value.unwrap_or(fallback);
        parse_hex(candidate).or_else(|e| {
            log::warn!("palette: {e}; using {fallback}");
            parse_hex(fallback)
        })
    };
    let slots = [
        (palette.exterior_wall.as_deref(), DEFAULT_WALL),
        (palette.roof.as_deref(), DEFAULT_ROOF),
        (palette.ground_floor_finish.as_deref(), DEFAULT_GROUND_FLOOR),
    ];
    slots.map(|(value, fallback)| resolve(value, fallback).unwrap_or([0, 0, 0]))
}

/// Every `stride`-th pixel in row-major order.
pub fn sample_pixels(img: &DynamicImage, stride: usize) -> Vec<Rgb> {
    img.to_rgb8()
        .pixels()
        .step_by(stride.max(1))
        .map(|p| p.0)
        .collect()
}

fn distance(a: Rgb, b: Rgb) -> f64 {
    let d: f64 = a
        .iter()
        .zip(&b)
        .map(|(&x, &y)| {
            let diff = x as f64 - y as f64;
            diff * diff
        })
        .sum();
    d.sqrt()
}

/// `max(0, 1 − mean_min_distance / scale)`, where the mean is over
/// expected colours of the distance to the nearest sampled pixel.
///
/// Returns `None` when nothing was sampled.
pub fn palette_similarity(samples: &[Rgb], expected: &[Rgb], scale: f64) -> Option<f64> {
    if samples.is_empty() || expected.is_empty() {
        return None;
    }
    let total: f64 = expected
        .iter()
        .map(|&color| {
            samples
                .iter()
                .map(|&s| distance(color, s))
                .fold(f64::INFINITY, f64::min)
        })
        .sum();
    let mean = total / expected.len() as f64;
    Some((1.0 - mean / scale).max(0.0))
}

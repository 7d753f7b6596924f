//! Deterministic per-label display colors.
//!
//! Box outlines and fills are keyed by the label text, so the same sign class
//! renders with the same color across images and sessions without any shared
//! palette state. Records loaded from disk carry no color of their own and
//! fall back to this derivation.

/// RGBA color with 8-bit channels.
pub type Rgba = [u8; 4];

/// Alpha for generated colors. Semi-transparent so filled boxes keep the
/// underlying image visible.
const LABEL_ALPHA: u8 = 100;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Derive the display color for a label.
///
/// The label text is hashed to a hue, which is then converted through HSV
/// with fixed saturation and value. Equal labels always map to equal colors.
pub fn label_color(label: &str) -> Rgba {
    let hue = (fnv1a(label.as_bytes()) % 360) as f32;
    let [r, g, b] = hsv_to_rgb(hue, 0.7, 0.9);
    [
        (r * 255.0) as u8,
        (g * 255.0) as u8,
        (b * 255.0) as u8,
        LABEL_ALPHA,
    ]
}

/// FNV-1a, 64-bit. Stable across platforms and releases, which keeps
/// label colors reproducible in saved screenshots and reviews.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Convert HSV (hue in degrees, s/v in 0..=1) to RGB in 0..=1.
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}

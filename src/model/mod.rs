//! Core data model: points, rectangles, metadata and annotated records.

pub mod attributes;
pub mod geometry;
pub mod record;

pub use attributes::{DETAIL_KEYS, GEO_KEYS, SignAttributes};
pub use geometry::{BndBox, Point, RectGeometry};
pub use record::{BoxRecord, RecordError, RecordId};

use serde::{Deserialize, Serialize};

/// Pixel dimensions of the annotated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    /// Channel count, 1 for grayscale and 3 for RGB.
    pub depth: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Decode dimensions and channel count from raw image bytes. Returns
    /// `None` when the bytes are not a decodable image.
    pub fn probe(bytes: &[u8]) -> Option<Self> {
        let img = image::load_from_memory(bytes).ok()?;
        Some(Self {
            width: img.width(),
            height: img.height(),
            depth: u32::from(img.color().channel_count()),
        })
    }
}

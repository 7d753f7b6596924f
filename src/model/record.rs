//! A single annotated box and its invariants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{Rgba, label_color};
use crate::model::ImageSize;
use crate::model::attributes::SignAttributes;
use crate::model::geometry::{Point, RectGeometry};

/// Stable handle for a record within its store. Handles are never reused
/// within a store's lifetime, so a stale handle misses instead of aliasing
/// a newer record.
pub type RecordId = u32;

/// Why a record could not be created or edited.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Box creation needs exactly four corner points spanning a rectangle
    /// with positive integer width and height.
    #[error("geometry does not describe a valid rectangle")]
    InvalidGeometry,
    /// Labels identify the sign class and must carry text.
    #[error("label must not be blank")]
    EmptyLabel,
}

/// One annotated sign: a labeled rectangle plus inventory metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxRecord {
    /// Assigned by the owning store; 0 until added.
    pub id: RecordId,
    label: String,
    geometry: RectGeometry,
    /// Explicit outline color. `None` means derive from the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<Rgba>,
    /// Explicit fill color. `None` means derive from the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Rgba>,
    #[serde(default)]
    pub difficult: bool,
    #[serde(default, skip_serializing_if = "SignAttributes::is_empty")]
    pub attributes: SignAttributes,
}

impl BoxRecord {
    /// Create a record from a label and four corner points.
    pub fn new(label: impl Into<String>, points: &[Point]) -> Result<Self, RecordError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(RecordError::EmptyLabel);
        }
        let geometry = RectGeometry::from_points(points).ok_or(RecordError::InvalidGeometry)?;

        Ok(Self {
            id: 0,
            label,
            geometry,
            line_color: None,
            fill_color: None,
            difficult: false,
            attributes: SignAttributes::new(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Rename the record. Derived colors follow the new label automatically;
    /// explicitly set colors are left alone.
    pub fn set_label(&mut self, label: impl Into<String>) -> Result<(), RecordError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(RecordError::EmptyLabel);
        }
        self.label = label;
        Ok(())
    }

    pub fn geometry(&self) -> RectGeometry {
        self.geometry
    }

    /// Replace the box outline. Validity is carried by [`RectGeometry`]
    /// itself, so no further checking happens here.
    pub fn set_geometry(&mut self, geometry: RectGeometry) {
        self.geometry = geometry;
    }

    /// Outline color, deriving from the label when none was set.
    pub fn line_color(&self) -> Rgba {
        self.line_color.unwrap_or_else(|| label_color(&self.label))
    }

    /// Fill color, deriving from the label when none was set.
    pub fn fill_color(&self) -> Rgba {
        self.fill_color.unwrap_or_else(|| label_color(&self.label))
    }

    /// Metadata value for `key`, if present.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    /// Attach metadata. Any key is accepted; keys outside the schema are
    /// preserved for round-tripping.
    pub fn set_metadata(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.set(key, value);
    }

    /// Whether the box touches the image boundary.
    ///
    /// Pixel coordinates are 1-based here, matching the serialized format,
    /// and the test runs on the clamped box so a box dragged past the top
    /// or left edge counts as touching.
    pub fn is_truncated(&self, image_size: ImageSize) -> bool {
        let bnd = self.geometry.bnd_box().clamp_min();
        bnd.xmin == 1
            || bnd.ymin == 1
            || bnd.xmax == image_size.width as i32
            || bnd.ymax == image_size.height as i32
    }
}

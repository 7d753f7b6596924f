//! SVAT - Sign Survey Annotation Toolkit
//!
//! Data model and Pascal VOC codec for roadway sign survey annotations,
//! with EXIF geotag extraction for survey imagery.

pub mod color;
pub mod geo;
pub mod model;
pub mod store;
pub mod voc;

pub use color::{Rgba, label_color};
pub use geo::{ImageGeo, apply_default_geo, image_geo};
pub use model::{
    BndBox, BoxRecord, ImageSize, Point, RecordError, RecordId, RectGeometry, SignAttributes,
};
pub use store::{AnnotationStore, StoreError};
pub use voc::{
    ParsedAnnotation, VocError, open_annotation, parse_document, save_annotation, write_document,
};

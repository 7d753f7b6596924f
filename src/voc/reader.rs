//! Parser for per-image annotation files.
//!
//! Parsing is resilient per field: a missing or malformed value never
//! aborts the document, it only narrows what the affected object carries.
//! Objects that cannot yield a box at all (no name, unusable coordinates)
//! are skipped with a warning. Only structural failure of the document
//! itself is an error.

use std::path::PathBuf;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::model::{BndBox, BoxRecord, GEO_KEYS, ImageSize, RectGeometry, SignAttributes};
use crate::store::AnnotationStore;
use crate::voc::error::VocError;

/// Result of parsing one annotation document.
#[derive(Debug, Default)]
pub struct ParsedAnnotation {
    /// Reconstructed records in document order.
    pub records: Vec<BoxRecord>,
    /// Root `verified="yes"` attribute.
    pub verified: bool,
}

impl ParsedAnnotation {
    /// Build a store around the parse result. The store comes back clean,
    /// since it matches what is on disk.
    pub fn into_store(
        self,
        image_path: impl Into<PathBuf>,
        image_size: ImageSize,
    ) -> AnnotationStore {
        let mut store = AnnotationStore::new(image_path, image_size);
        for record in self.records {
            store.add(record);
        }
        store.set_verified(self.verified);
        store.mark_saved();
        store
    }
}

/// Parse an annotation document.
pub fn parse_document(document: &str) -> Result<ParsedAnnotation, VocError> {
    let mut reader = Reader::from_str(document);
    reader.trim_text(true);

    let mut verified = false;
    let mut saw_root = false;
    let mut records = Vec::new();
    // Open element names from the root downwards.
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<RawObject> = None;
    let mut object_index = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if stack.is_empty() {
                    if name != "annotation" {
                        return Err(VocError::malformed(format!(
                            "unexpected root element <{name}>"
                        )));
                    }
                    saw_root = true;
                    verified = verified_attribute(e);
                } else if name == "object" && stack.len() == 1 {
                    current = Some(RawObject::default());
                    object_index += 1;
                }
                stack.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                // Self-closing elements carry no text, so apart from an
                // empty root there is nothing to record.
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if stack.is_empty() {
                    if name != "annotation" {
                        return Err(VocError::malformed(format!(
                            "unexpected root element <{name}>"
                        )));
                    }
                    saw_root = true;
                    verified = verified_attribute(e);
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if let Some(raw) = current.as_mut() {
                    route_text(&stack, raw, text);
                }
            }
            Ok(Event::End(_)) => {
                let name = stack.pop();
                if name.as_deref() == Some("object") && stack.len() == 1 {
                    if let Some(raw) = current.take() {
                        match raw.finish() {
                            Ok(record) => records.push(record),
                            Err(reason) => {
                                log::warn!("Skipped object {object_index}: {reason}");
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(VocError::malformed(format!(
                    "XML error at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(VocError::malformed("missing <annotation> root element"));
    }
    if !stack.is_empty() {
        return Err(VocError::malformed("unexpected end of document"));
    }

    Ok(ParsedAnnotation { records, verified })
}

fn verified_attribute(e: &quick_xml::events::BytesStart<'_>) -> bool {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"verified")
        .is_some_and(|attr| attr.unescape_value().is_ok_and(|value| value == "yes"))
}

/// Field values of one `<object>` block, collected as raw text.
#[derive(Default)]
struct RawObject {
    name: Option<String>,
    difficult: Option<String>,
    xmin: Option<String>,
    ymin: Option<String>,
    xmax: Option<String>,
    ymax: Option<String>,
    attributes: SignAttributes,
}

impl RawObject {
    /// Assemble the record, or explain why no box can be built from it.
    fn finish(self) -> Result<BoxRecord, String> {
        let name = self.name.ok_or("missing <name>")?;
        let xmin = parse_coord(self.xmin.as_deref()).ok_or("missing or non-numeric <xmin>")?;
        let ymin = parse_coord(self.ymin.as_deref()).ok_or("missing or non-numeric <ymin>")?;
        let xmax = parse_coord(self.xmax.as_deref()).ok_or("missing or non-numeric <xmax>")?;
        let ymax = parse_coord(self.ymax.as_deref()).ok_or("missing or non-numeric <ymax>")?;

        let bnd = BndBox::new(xmin, ymin, xmax, ymax);
        let rect = RectGeometry::from_bnd_box(bnd)
            .ok_or_else(|| format!("degenerate box {xmin},{ymin},{xmax},{ymax}"))?;

        let mut record =
            BoxRecord::new(name, rect.corners()).map_err(|e| e.to_string())?;
        record.difficult = parse_flag(self.difficult.as_deref());
        record.attributes = self.attributes;
        Ok(record)
    }
}

/// Assign leaf text to the right field of the open object, based on where
/// in the tree it sits.
fn route_text(stack: &[String], raw: &mut RawObject, text: String) {
    match stack {
        [_, object, field] if object.as_str() == "object" => match field.as_str() {
            "name" => raw.name = Some(text),
            "difficult" => raw.difficult = Some(text),
            // pose and truncated are recomputed on write; stray text inside
            // the block elements is not a value.
            "pose" | "truncated" | "location" | "bndbox" => {}
            key => {
                if let Some(value) = meaningful(text) {
                    raw.attributes.set(key, value);
                }
            }
        },
        [_, object, block, field]
            if object.as_str() == "object" && block.as_str() == "location" =>
        {
            if GEO_KEYS.contains(&field.as_str()) {
                if let Some(value) = meaningful(text) {
                    raw.attributes.set(field, value);
                }
            }
        }
        [_, object, block, field]
            if object.as_str() == "object" && block.as_str() == "bndbox" =>
        {
            match field.as_str() {
                "xmin" => raw.xmin = Some(text),
                "ymin" => raw.ymin = Some(text),
                "xmax" => raw.xmax = Some(text),
                "ymax" => raw.ymax = Some(text),
                _ => {}
            }
        }
        _ => {}
    }
}

/// Coordinate text arrives as an integer or with a decimal point; both
/// truncate to the integer pixel grid.
fn parse_coord(text: Option<&str>) -> Option<i32> {
    let value = text?.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value as i32)
}

/// Any nonzero integer sets the flag; missing or unparseable text clears it.
fn parse_flag(text: Option<&str>) -> bool {
    text.and_then(|t| t.trim().parse::<i32>().ok())
        .is_some_and(|v| v != 0)
}

/// Placeholder-aware filter: empty text and the legacy `"None"` spelling
/// both mean the value is absent.
fn meaningful(text: String) -> Option<String> {
    if text.is_empty() || text == "None" {
        None
    } else {
        Some(text)
    }
}

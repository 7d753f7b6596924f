//! Annotation file I/O: one XML document per image.
//!
//! The dialect is Pascal VOC extended with sign survey fields, kept
//! byte-compatible with the existing corpus of files. [`write_document`]
//! and [`parse_document`] work on in-memory strings; [`open_annotation`]
//! and [`save_annotation`] wrap them with file handling.

mod error;
mod reader;
mod writer;

#[cfg(test)]
mod tests;

pub use error::VocError;
pub use reader::{ParsedAnnotation, parse_document};
pub use writer::write_document;

use std::path::Path;

use crate::store::AnnotationStore;

/// Recognized annotation file extension.
pub const XML_EXT: &str = "xml";

/// Read and parse the annotation file at `path`.
pub fn open_annotation(path: &Path) -> Result<ParsedAnnotation, VocError> {
    if path.extension().and_then(|e| e.to_str()) != Some(XML_EXT) {
        return Err(VocError::UnsupportedExtension {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let parsed = parse_document(&content).map_err(|e| e.at_path(path))?;
    log::info!("Loaded {} annotation(s) from {:?}", parsed.records.len(), path);
    Ok(parsed)
}

/// Write the store's annotations to `path`.
///
/// An empty store removes the file instead: an image without boxes keeps
/// no annotation file. The caller clears the store's dirty flag after a
/// successful save.
///
/// The document is written with a single `fs::write`. Callers that need an
/// atomic replace should write to a temporary path and rename.
pub fn save_annotation(path: &Path, store: &AnnotationStore) -> Result<(), VocError> {
    if store.is_empty() {
        if path.exists() {
            std::fs::remove_file(path)?;
            log::info!("Removed annotation file {:?} for empty store", path);
        }
        return Ok(());
    }

    let document = write_document(store)?;
    std::fs::write(path, document)?;
    log::info!("Saved {} annotation(s) to {:?}", store.len(), path);
    Ok(())
}

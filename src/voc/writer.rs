//! Serializer for per-image annotation files.
//!
//! Output is the Pascal VOC dialect used by the sign survey tooling: the
//! stock VOC skeleton plus an image-level `Location` block and per-object
//! sign inventory fields. Legacy placeholder conventions are kept so old
//! consumers keep parsing: absent image coordinates serialize as the
//! literal string `"None"`, absent object metadata as empty elements.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::model::{DETAIL_KEYS, GEO_KEYS};
use crate::store::AnnotationStore;
use crate::voc::error::VocError;

/// Serialize a store into an annotation document.
///
/// Records are written in insertion order. The output always parses back
/// through this module's own reader.
pub fn write_document(store: &AnnotationStore) -> Result<String, VocError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|e| VocError::Xml(e.into()))?;

    let mut root = BytesStart::new("annotation");
    if store.verified() {
        root.push_attribute(("verified", "yes"));
    }
    writer
        .write_event(Event::Start(root))
        .map_err(|e| VocError::Xml(e.into()))?;

    let image_path = store.image_path();
    let filename = image_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let folder = image_path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("");

    write_text_element(&mut writer, "folder", folder)?;
    write_text_element(&mut writer, "filename", filename)?;
    // The path element is optional in the schema; a store can be built for
    // an image that has no local path yet.
    let path = image_path.to_string_lossy();
    if !path.is_empty() {
        write_text_element(&mut writer, "path", &path)?;
    }

    start_element(&mut writer, "source")?;
    write_text_element(&mut writer, "database", store.database())?;
    end_element(&mut writer, "source")?;

    let size = store.image_size();
    start_element(&mut writer, "size")?;
    write_text_element(&mut writer, "width", &size.width.to_string())?;
    write_text_element(&mut writer, "height", &size.height.to_string())?;
    write_text_element(&mut writer, "depth", &size.depth.to_string())?;
    end_element(&mut writer, "size")?;

    // Image-level position. "None" is the legacy spelling for absent.
    let geo = store.image_geo();
    let latitude = geo
        .map(|g| g.latitude.to_string())
        .unwrap_or_else(|| "None".to_string());
    let longitude = geo
        .map(|g| g.longitude.to_string())
        .unwrap_or_else(|| "None".to_string());
    let altitude = geo
        .and_then(|g| g.altitude)
        .map(|a| a.to_string())
        .unwrap_or_else(|| "None".to_string());

    start_element(&mut writer, "Location")?;
    write_text_element(&mut writer, "Latitude", &latitude)?;
    write_text_element(&mut writer, "Longitude", &longitude)?;
    write_text_element(&mut writer, "Altitude", &altitude)?;
    end_element(&mut writer, "Location")?;

    write_text_element(&mut writer, "segmented", "0")?;

    for record in store.iter() {
        start_element(&mut writer, "object")?;

        write_text_element(&mut writer, "name", record.label())?;
        write_text_element(&mut writer, "pose", "Unspecified")?;
        let truncated = if record.is_truncated(size) { "1" } else { "0" };
        write_text_element(&mut writer, "truncated", truncated)?;
        let difficult = if record.difficult { "1" } else { "0" };
        write_text_element(&mut writer, "difficult", difficult)?;

        start_element(&mut writer, "location")?;
        for key in GEO_KEYS {
            write_text_element(&mut writer, key, record.attributes.get(key).unwrap_or(""))?;
        }
        end_element(&mut writer, "location")?;

        for key in DETAIL_KEYS {
            write_text_element(&mut writer, key, record.attributes.get(key).unwrap_or(""))?;
        }

        // Keys outside the schema, so files written by other tools keep
        // their fields through an edit session.
        for (key, value) in &record.attributes.extra {
            write_text_element(&mut writer, key, value)?;
        }

        let bnd = record.geometry().bnd_box().clamp_min();
        start_element(&mut writer, "bndbox")?;
        write_text_element(&mut writer, "xmin", &bnd.xmin.to_string())?;
        write_text_element(&mut writer, "ymin", &bnd.ymin.to_string())?;
        write_text_element(&mut writer, "xmax", &bnd.xmax.to_string())?;
        write_text_element(&mut writer, "ymax", &bnd.ymax.to_string())?;
        end_element(&mut writer, "bndbox")?;

        end_element(&mut writer, "object")?;
    }

    end_element(&mut writer, "annotation")?;

    let result = writer.into_inner();
    String::from_utf8(result).map_err(|_| VocError::malformed("document is not valid UTF-8"))
}

fn start_element<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), VocError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| VocError::Xml(e.into()))
}

fn end_element<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), VocError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| VocError::Xml(e.into()))
}

/// Write a simple text element.
fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), VocError> {
    start_element(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| VocError::Xml(e.into()))?;
    end_element(writer, name)
}

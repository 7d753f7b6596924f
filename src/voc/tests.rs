//! Tests for the annotation file codec.

use std::path::Path;

use crate::geo::{ImageGeo, apply_default_geo};
use crate::model::{BndBox, BoxRecord, ImageSize, Point};
use crate::store::AnnotationStore;
use crate::voc::{VocError, open_annotation, parse_document, save_annotation, write_document};

fn corners(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> [Point; 4] {
    [
        Point::new(xmin, ymin),
        Point::new(xmax, ymin),
        Point::new(xmax, ymax),
        Point::new(xmin, ymax),
    ]
}

/// Store for a 100x100 RGB image in a survey folder.
fn sample_store() -> AnnotationStore {
    AnnotationStore::new("/data/site_04/img_0001.jpg", ImageSize::new(100, 100, 3))
}

#[test]
fn test_write_document_structure() {
    let mut store = sample_store();
    let record = BoxRecord::new("SIGN", &corners(10.0, 10.0, 50.0, 40.0)).unwrap();
    store.add(record);

    let document = write_document(&store).unwrap();

    assert!(document.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(document.contains("\n\t<folder>site_04</folder>"));
    assert!(document.contains("<filename>img_0001.jpg</filename>"));
    assert!(document.contains("<path>/data/site_04/img_0001.jpg</path>"));
    assert!(document.contains("<database>Unknown</database>"));
    assert!(document.contains("<width>100</width>"));
    assert!(document.contains("<height>100</height>"));
    assert!(document.contains("<depth>3</depth>"));
    assert!(document.contains("<segmented>0</segmented>"));

    assert!(document.contains("<name>SIGN</name>"));
    assert!(document.contains("<pose>Unspecified</pose>"));
    assert!(document.contains("<truncated>0</truncated>"));
    assert!(document.contains("<difficult>0</difficult>"));
    assert!(document.contains("<xmin>10</xmin>"));
    assert!(document.contains("<ymin>10</ymin>"));
    assert!(document.contains("<xmax>50</xmax>"));
    assert!(document.contains("<ymax>40</ymax>"));

    // No attribute on the root while the image is unreviewed.
    assert!(!document.contains("verified"));
}

#[test]
fn test_write_document_placeholders() {
    // No image geolocation and no object metadata: image-level fields say
    // "None", object-level fields become empty elements.
    let mut store = sample_store();
    store.add(BoxRecord::new("SIGN", &corners(10.0, 10.0, 50.0, 40.0)).unwrap());

    let document = write_document(&store).unwrap();

    assert!(document.contains("<Latitude>None</Latitude>"));
    assert!(document.contains("<Longitude>None</Longitude>"));
    assert!(document.contains("<Altitude>None</Altitude>"));
    assert!(document.contains("<subclass>"), "placeholder element missing");
    assert!(document.contains("<MUTCDCode>"));
    assert!(document.contains("<PublishDate>"));
}

#[test]
fn test_write_document_image_location() {
    let mut store = sample_store();
    store.set_image_geo(Some(ImageGeo::new(44.2968861, -72.5820278, Some(125.7))));
    store.add(BoxRecord::new("SIGN", &corners(10.0, 10.0, 50.0, 40.0)).unwrap());

    let document = write_document(&store).unwrap();

    assert!(document.contains("<Latitude>44.2968861</Latitude>"));
    assert!(document.contains("<Longitude>-72.5820278</Longitude>"));
    assert!(document.contains("<Altitude>125.7</Altitude>"));
}

#[test]
fn test_write_document_verified_attribute() {
    let mut store = sample_store();
    store.add(BoxRecord::new("SIGN", &corners(10.0, 10.0, 50.0, 40.0)).unwrap());
    store.set_verified(true);

    let document = write_document(&store).unwrap();
    assert!(document.contains("<annotation verified=\"yes\">"));
}

#[test]
fn test_write_document_truncated_and_clamping() {
    let mut store = sample_store();
    // Dragged past the left edge: clamped to column 1, hence truncated.
    store.add(BoxRecord::new("a", &corners(-5.5, 10.0, 50.0, 40.0)).unwrap());
    // Touches the right edge.
    store.add(BoxRecord::new("b", &corners(20.0, 20.0, 100.0, 80.0)).unwrap());
    // Interior.
    store.add(BoxRecord::new("c", &corners(30.0, 30.0, 60.0, 60.0)).unwrap());

    let document = write_document(&store).unwrap();

    assert_eq!(document.matches("<truncated>1</truncated>").count(), 2);
    assert_eq!(document.matches("<truncated>0</truncated>").count(), 1);
    assert!(document.contains("<xmin>1</xmin>"), "clamped min not written");
    assert!(!document.contains("<xmin>-5</xmin>"));
}

#[test]
fn test_round_trip_preserves_records() {
    let mut store = sample_store();
    store.set_image_geo(Some(ImageGeo::new(44.2968861, -72.5820278, Some(125.7))));
    store.set_verified(true);

    let mut first = BoxRecord::new("stop", &corners(10.0, 10.0, 50.0, 40.0)).unwrap();
    first.difficult = true;
    first.set_metadata("subclass", "R1-1");
    first.set_metadata("MUTCDCode", "R1-1");
    first.set_metadata("latitude", "44.2968861");
    // A key no schema revision knows about.
    first.set_metadata("PlowRoute", "7A");
    let second = BoxRecord::new("speed limit 30", &corners(60.0, 12.0, 90.0, 44.0)).unwrap();

    store.add(first.clone());
    store.add(second);

    let document = write_document(&store).unwrap();
    let parsed = parse_document(&document).unwrap();

    assert!(parsed.verified);
    assert_eq!(parsed.records.len(), 2);

    let a = &parsed.records[0];
    assert_eq!(a.label(), "stop");
    assert!(a.difficult);
    assert_eq!(a.geometry().bnd_box(), BndBox::new(10, 10, 50, 40));
    assert_eq!(a.attributes, first.attributes);

    let b = &parsed.records[1];
    assert_eq!(b.label(), "speed limit 30");
    assert!(!b.difficult);
    assert_eq!(b.geometry().bnd_box(), BndBox::new(60, 12, 90, 44));
    // Empty write-time placeholders do not come back as values.
    assert!(b.attributes.is_empty());
}

#[test]
fn test_round_trip_escapes_markup() {
    let mut store = sample_store();
    let mut record = BoxRecord::new("R&B <Main>", &corners(10.0, 10.0, 50.0, 40.0)).unwrap();
    record.set_metadata("STREETNAME", "Čaka iela 5 & co");
    store.add(record);

    let document = write_document(&store).unwrap();
    assert!(document.contains("&amp;"));
    assert!(document.contains("&lt;Main&gt;"));

    let parsed = parse_document(&document).unwrap();
    assert_eq!(parsed.records[0].label(), "R&B <Main>");
    assert_eq!(
        parsed.records[0].metadata("STREETNAME"),
        Some("Čaka iela 5 & co")
    );
}

#[test]
fn test_default_geo_flows_into_document() {
    let geo = ImageGeo::new(44.2968861, -72.5820278, None);
    let mut store = sample_store();
    store.set_image_geo(Some(geo));

    let mut located = BoxRecord::new("stop", &corners(10.0, 10.0, 50.0, 40.0)).unwrap();
    apply_default_geo(&mut located, &geo);
    store.add(located);
    // Second box never went through the enricher.
    store.add(BoxRecord::new("yield", &corners(60.0, 12.0, 90.0, 44.0)).unwrap());

    let document = write_document(&store).unwrap();
    assert!(document.contains("<latitude>44.2968861</latitude>"));
    assert!(document.contains("<longitude>-72.5820278</longitude>"));

    let parsed = parse_document(&document).unwrap();
    assert_eq!(parsed.records[0].metadata("latitude"), Some("44.2968861"));
    assert_eq!(parsed.records[1].metadata("latitude"), None);
}

#[test]
fn test_parse_document_review_scenario() {
    let document = r#"<?xml version="1.0" encoding="utf-8"?>
<annotation verified="yes">
	<folder>site_04</folder>
	<filename>img_0001.jpg</filename>
	<path>/data/site_04/img_0001.jpg</path>
	<source>
		<database>Unknown</database>
	</source>
	<size>
		<width>100</width>
		<height>100</height>
		<depth>3</depth>
	</size>
	<Location>
		<Latitude>44.2968861</Latitude>
		<Longitude>-72.5820278</Longitude>
		<Altitude>None</Altitude>
	</Location>
	<segmented>0</segmented>
	<object>
		<name>stop</name>
		<pose>Unspecified</pose>
		<truncated>0</truncated>
		<difficult>0</difficult>
		<location>
			<latitude>44.2968861</latitude>
			<longitude>-72.5820278</longitude>
			<altitude></altitude>
		</location>
		<superclass>regulatory</superclass>
		<subclass></subclass>
		<bndbox>
			<xmin>10</xmin>
			<ymin>10</ymin>
			<xmax>50</xmax>
			<ymax>40</ymax>
		</bndbox>
	</object>
	<object>
		<name>stop</name>
		<subclass>R1-1</subclass>
		<bndbox>
			<xmin>60</xmin>
			<ymin>12</ymin>
			<xmax>90</xmax>
			<ymax>44</ymax>
		</bndbox>
	</object>
</annotation>
"#;

    let parsed = parse_document(document).unwrap();

    assert!(parsed.verified);
    assert_eq!(parsed.records.len(), 2);

    let first = &parsed.records[0];
    assert_eq!(first.label(), "stop");
    assert_eq!(first.metadata("subclass"), None, "placeholder kept as value");
    assert_eq!(first.metadata("superclass"), Some("regulatory"));
    assert_eq!(first.metadata("latitude"), Some("44.2968861"));
    assert_eq!(first.metadata("altitude"), None);
    assert_eq!(first.geometry().bnd_box(), BndBox::new(10, 10, 50, 40));

    let second = &parsed.records[1];
    assert_eq!(second.metadata("subclass"), Some("R1-1"));
    assert!(!second.difficult);
    assert_eq!(second.geometry().bnd_box(), BndBox::new(60, 12, 90, 44));
}

#[test]
fn test_parse_skips_unusable_objects() {
    // Missing name, fine, non-numeric coordinate, degenerate box.
    let document = r#"<annotation>
	<object>
		<pose>Unspecified</pose>
		<bndbox><xmin>1</xmin><ymin>2</ymin><xmax>30</xmax><ymax>40</ymax></bndbox>
	</object>
	<object>
		<name>yield</name>
		<bndbox><xmin>5</xmin><ymin>6</ymin><xmax>30</xmax><ymax>40</ymax></bndbox>
	</object>
	<object>
		<name>merge</name>
		<bndbox><xmin>abc</xmin><ymin>6</ymin><xmax>30</xmax><ymax>40</ymax></bndbox>
	</object>
	<object>
		<name>slow</name>
		<bndbox><xmin>10</xmin><ymin>10</ymin><xmax>10</xmax><ymax>40</ymax></bndbox>
	</object>
</annotation>"#;

    let parsed = parse_document(document).unwrap();
    assert_eq!(parsed.records.len(), 1);
    assert_eq!(parsed.records[0].label(), "yield");
    assert_eq!(parsed.records[0].geometry().bnd_box(), BndBox::new(5, 6, 30, 40));
}

#[test]
fn test_parse_truncates_decimal_coordinates() {
    let document = r#"<annotation>
	<object>
		<name>stop</name>
		<bndbox>
			<xmin>10.7</xmin>
			<ymin>10.2</ymin>
			<xmax>50.9</xmax>
			<ymax>40.5</ymax>
		</bndbox>
	</object>
</annotation>"#;

    let parsed = parse_document(document).unwrap();
    assert_eq!(parsed.records[0].geometry().bnd_box(), BndBox::new(10, 10, 50, 40));
}

#[test]
fn test_parse_difficult_variants() {
    let document = r#"<annotation>
	<object>
		<name>a</name>
		<difficult>1</difficult>
		<bndbox><xmin>1</xmin><ymin>1</ymin><xmax>9</xmax><ymax>9</ymax></bndbox>
	</object>
	<object>
		<name>b</name>
		<difficult>0</difficult>
		<bndbox><xmin>1</xmin><ymin>1</ymin><xmax>9</xmax><ymax>9</ymax></bndbox>
	</object>
	<object>
		<name>c</name>
		<difficult>2</difficult>
		<bndbox><xmin>1</xmin><ymin>1</ymin><xmax>9</xmax><ymax>9</ymax></bndbox>
	</object>
	<object>
		<name>d</name>
		<difficult>maybe</difficult>
		<bndbox><xmin>1</xmin><ymin>1</ymin><xmax>9</xmax><ymax>9</ymax></bndbox>
	</object>
	<object>
		<name>e</name>
		<bndbox><xmin>1</xmin><ymin>1</ymin><xmax>9</xmax><ymax>9</ymax></bndbox>
	</object>
</annotation>"#;

    let parsed = parse_document(document).unwrap();
    let flags: Vec<bool> = parsed.records.iter().map(|r| r.difficult).collect();
    assert_eq!(flags, vec![true, false, true, false, false]);
}

#[test]
fn test_parse_drops_none_placeholders() {
    // Legacy writers stringified missing values as "None" in object fields.
    let document = r#"<annotation>
	<object>
		<name>stop</name>
		<City>None</City>
		<County>Lamoille</County>
		<bndbox><xmin>1</xmin><ymin>1</ymin><xmax>9</xmax><ymax>9</ymax></bndbox>
	</object>
</annotation>"#;

    let parsed = parse_document(document).unwrap();
    assert_eq!(parsed.records[0].metadata("City"), None);
    assert_eq!(parsed.records[0].metadata("County"), Some("Lamoille"));
}

#[test]
fn test_parse_verified_attribute_variants() {
    let yes = parse_document(r#"<annotation verified="yes"></annotation>"#).unwrap();
    assert!(yes.verified);
    assert!(yes.records.is_empty());

    let no = parse_document(r#"<annotation verified="no"></annotation>"#).unwrap();
    assert!(!no.verified);

    let absent = parse_document("<annotation></annotation>").unwrap();
    assert!(!absent.verified);

    let empty_root = parse_document(r#"<annotation verified="yes"/>"#).unwrap();
    assert!(empty_root.verified);
}

#[test]
fn test_parse_rejects_malformed_documents() {
    assert!(matches!(
        parse_document(""),
        Err(VocError::Malformed { .. })
    ));
    assert!(matches!(
        parse_document("no markup here"),
        Err(VocError::Malformed { .. })
    ));
    assert!(matches!(
        parse_document("<road></road>"),
        Err(VocError::Malformed { .. })
    ));
    assert!(matches!(
        parse_document("<annotation><object>"),
        Err(VocError::Malformed { .. })
    ));
    assert!(matches!(
        parse_document("<annotation><name></annotation>"),
        Err(VocError::Malformed { .. })
    ));
}

#[test]
fn test_into_store_is_clean_and_ordered() {
    let document = r#"<annotation verified="yes">
	<object>
		<name>one</name>
		<bndbox><xmin>1</xmin><ymin>1</ymin><xmax>9</xmax><ymax>9</ymax></bndbox>
	</object>
	<object>
		<name>two</name>
		<bndbox><xmin>2</xmin><ymin>2</ymin><xmax>8</xmax><ymax>8</ymax></bndbox>
	</object>
</annotation>"#;

    let parsed = parse_document(document).unwrap();
    let store = parsed.into_store("/data/site_04/img_0001.jpg", ImageSize::new(100, 100, 3));

    assert!(!store.is_dirty(), "freshly loaded store must match disk");
    assert!(store.verified());
    assert_eq!(store.len(), 2);

    let labels: Vec<&str> = store.iter().map(|r| r.label()).collect();
    assert_eq!(labels, vec!["one", "two"]);

    // Handles resolve back to their records.
    let first_id = store.iter().next().unwrap().id;
    assert_eq!(store.get(first_id).unwrap().label(), "one");
}

#[test]
fn test_open_annotation_rejects_unrelated_paths() {
    let err = open_annotation(Path::new("/data/notes.txt")).unwrap_err();
    assert!(matches!(err, VocError::UnsupportedExtension { .. }));

    let missing = open_annotation(Path::new("/no/such/dir/img_0001.xml")).unwrap_err();
    assert!(matches!(missing, VocError::Io(_)));
}

#[test]
fn test_save_and_open_annotation_file() {
    let dir = std::env::temp_dir().join(format!("svat_voc_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("img_0001.xml");

    let mut store = sample_store();
    store.add(BoxRecord::new("stop", &corners(10.0, 10.0, 50.0, 40.0)).unwrap());
    store.add(BoxRecord::new("yield", &corners(60.0, 12.0, 90.0, 44.0)).unwrap());

    save_annotation(&path, &store).unwrap();
    let parsed = open_annotation(&path).unwrap();
    assert_eq!(parsed.records.len(), 2);

    // Removing every record erases the file on the next save.
    let ids: Vec<_> = store.iter().map(|r| r.id).collect();
    for id in ids {
        store.remove(id);
    }
    save_annotation(&path, &store).unwrap();
    assert!(!path.exists(), "empty store should remove the file");

    // Saving an empty store with no file present stays a no-op.
    save_annotation(&path, &store).unwrap();
    assert!(!path.exists());

    std::fs::remove_dir_all(&dir).ok();
}

//! GPS extraction from embedded image metadata.

use std::io::Cursor;

use exif::{In, Tag, Value};

use super::ImageGeo;

/// Read the embedded GPS position from raw image bytes.
///
/// Survey cameras store latitude and longitude as degree/minute/second
/// rationals plus a hemisphere reference; some also record altitude.
/// Returns `None` when the bytes carry no usable GPS tags, which is the
/// normal case for images from other sources and never an error.
pub fn image_geo(bytes: &[u8]) -> Option<ImageGeo> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;

    let latitude = signed_degrees(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S')?;
    let longitude = signed_degrees(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W')?;
    let altitude = altitude(&exif);

    Some(ImageGeo::new(latitude, longitude, altitude))
}

/// One coordinate: degree/minute/second rationals plus hemisphere reference,
/// converted to signed decimal degrees.
fn signed_degrees(exif: &exif::Exif, tag: Tag, ref_tag: Tag, negative_ref: u8) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let degrees = dms_to_degrees(&field.value)?;
    let reference = hemisphere(exif, ref_tag)?;
    Some(if reference == negative_ref {
        -degrees
    } else {
        degrees
    })
}

fn dms_to_degrees(value: &Value) -> Option<f64> {
    let Value::Rational(ref parts) = *value else {
        return None;
    };
    let &[d, m, s] = parts.as_slice() else {
        return None;
    };
    let degrees = d.to_f64() + m.to_f64() / 60.0 + s.to_f64() / 3600.0;
    // A zero denominator turns the sum non-finite; treat it as missing.
    degrees.is_finite().then_some(degrees)
}

fn hemisphere(exif: &exif::Exif, ref_tag: Tag) -> Option<u8> {
    let field = exif.get_field(ref_tag, In::PRIMARY)?;
    let Value::Ascii(ref strings) = field.value else {
        return None;
    };
    strings.first()?.first().copied()
}

/// Altitude in meters. GPSAltitudeRef 1 marks values below sea level.
fn altitude(exif: &exif::Exif) -> Option<f64> {
    let field = exif.get_field(Tag::GPSAltitude, In::PRIMARY)?;
    let Value::Rational(ref parts) = field.value else {
        return None;
    };
    let meters = parts.first()?.to_f64();
    if !meters.is_finite() {
        return None;
    }

    let below_sea = exif
        .get_field(Tag::GPSAltitudeRef, In::PRIMARY)
        .and_then(|field| match field.value {
            Value::Byte(ref bytes) => bytes.first().copied(),
            _ => None,
        })
        == Some(1);

    Some(if below_sea { -meters } else { meters })
}

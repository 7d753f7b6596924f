//! Image geolocation: embedded GPS extraction and record defaulting.

mod extract;

pub use extract::image_geo;

use serde::{Deserialize, Serialize};

use crate::model::BoxRecord;

/// Position the image was taken from, in signed decimal degrees. South and
/// west are negative. Altitude is meters relative to sea level when the
/// camera recorded one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageGeo {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl ImageGeo {
    pub fn new(latitude: f64, longitude: f64, altitude: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// Stamp a record with the image position when it has no position of its own.
///
/// Boxes are assumed co-located with the photograph until an external data
/// source says otherwise. A record carrying only one of the coordinate pair
/// is treated as unlocated and both values are replaced. Returns whether the
/// record was updated.
pub fn apply_default_geo(record: &mut BoxRecord, geo: &ImageGeo) -> bool {
    if record.attributes.latitude.is_some() && record.attributes.longitude.is_some() {
        return false;
    }
    record.attributes.latitude = Some(format!("{:.7}", geo.latitude));
    record.attributes.longitude = Some(format!("{:.7}", geo.longitude));
    true
}

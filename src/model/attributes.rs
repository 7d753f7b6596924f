//! Open-ended sign metadata carried by each annotation box.
//!
//! The survey schema enumerates 25 keys: a geolocation trio serialized in a
//! nested `location` element, and 22 sign inventory fields serialized as
//! direct children of `object`. Keys outside the enumeration ride in
//! `extra`, so fields added by other tools survive a load/save cycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Keys serialized inside the per-object `location` element.
pub const GEO_KEYS: [&str; 3] = ["latitude", "longitude", "altitude"];

/// Sign inventory keys serialized as direct children of `object`, in
/// schema order.
pub const DETAIL_KEYS: [&str; 22] = [
    "superclass",
    "subclass",
    "SignMainGeneralOID",
    "ID",
    "LaneDirection",
    "Marker",
    "City",
    "County",
    "District",
    "STREETNAME",
    "MUTCDCode",
    "Retired",
    "Replaced",
    "SignAge",
    "TWN_TID",
    "TWN_MI",
    "QCFLAG",
    "MIN_TWN_FMI",
    "MAX_TWN_TMI",
    "SR_SID",
    "OFFSET",
    "PublishDate",
];

/// All schema keys, geolocation trio first.
pub fn known_keys() -> impl Iterator<Item = &'static str> {
    GEO_KEYS.iter().chain(DETAIL_KEYS.iter()).copied()
}

/// Metadata attached to a single annotated sign.
///
/// Every field is optional. An absent field is not an error; the codec
/// writes placeholders for absent values and drops placeholders on read.
/// Keys are matched case-sensitively against the schema spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subclass: Option<String>,
    #[serde(rename = "SignMainGeneralOID", default, skip_serializing_if = "Option::is_none")]
    pub sign_main_general_oid: Option<String>,
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "LaneDirection", default, skip_serializing_if = "Option::is_none")]
    pub lane_direction: Option<String>,
    #[serde(rename = "Marker", default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    #[serde(rename = "City", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "County", default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(rename = "District", default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(rename = "STREETNAME", default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    #[serde(rename = "MUTCDCode", default, skip_serializing_if = "Option::is_none")]
    pub mutcd_code: Option<String>,
    #[serde(rename = "Retired", default, skip_serializing_if = "Option::is_none")]
    pub retired: Option<String>,
    #[serde(rename = "Replaced", default, skip_serializing_if = "Option::is_none")]
    pub replaced: Option<String>,
    #[serde(rename = "SignAge", default, skip_serializing_if = "Option::is_none")]
    pub sign_age: Option<String>,
    #[serde(rename = "TWN_TID", default, skip_serializing_if = "Option::is_none")]
    pub twn_tid: Option<String>,
    #[serde(rename = "TWN_MI", default, skip_serializing_if = "Option::is_none")]
    pub twn_mi: Option<String>,
    #[serde(rename = "QCFLAG", default, skip_serializing_if = "Option::is_none")]
    pub qc_flag: Option<String>,
    #[serde(rename = "MIN_TWN_FMI", default, skip_serializing_if = "Option::is_none")]
    pub min_twn_fmi: Option<String>,
    #[serde(rename = "MAX_TWN_TMI", default, skip_serializing_if = "Option::is_none")]
    pub max_twn_tmi: Option<String>,
    #[serde(rename = "SR_SID", default, skip_serializing_if = "Option::is_none")]
    pub sr_sid: Option<String>,
    #[serde(rename = "OFFSET", default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(rename = "PublishDate", default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    /// Keys outside the schema enumeration, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl SignAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is part of the schema enumeration.
    pub fn is_known_key(key: &str) -> bool {
        known_keys().any(|k| k == key)
    }

    /// Look up a value by schema key, falling back to `extra`.
    pub fn get(&self, key: &str) -> Option<&str> {
        let slot = match key {
            "latitude" => &self.latitude,
            "longitude" => &self.longitude,
            "altitude" => &self.altitude,
            "superclass" => &self.superclass,
            "subclass" => &self.subclass,
            "SignMainGeneralOID" => &self.sign_main_general_oid,
            "ID" => &self.id,
            "LaneDirection" => &self.lane_direction,
            "Marker" => &self.marker,
            "City" => &self.city,
            "County" => &self.county,
            "District" => &self.district,
            "STREETNAME" => &self.street_name,
            "MUTCDCode" => &self.mutcd_code,
            "Retired" => &self.retired,
            "Replaced" => &self.replaced,
            "SignAge" => &self.sign_age,
            "TWN_TID" => &self.twn_tid,
            "TWN_MI" => &self.twn_mi,
            "QCFLAG" => &self.qc_flag,
            "MIN_TWN_FMI" => &self.min_twn_fmi,
            "MAX_TWN_TMI" => &self.max_twn_tmi,
            "SR_SID" => &self.sr_sid,
            "OFFSET" => &self.offset,
            "PublishDate" => &self.publish_date,
            _ => return self.extra.get(key).map(String::as_str),
        };
        slot.as_deref()
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        let slot = match key {
            "latitude" => &mut self.latitude,
            "longitude" => &mut self.longitude,
            "altitude" => &mut self.altitude,
            "superclass" => &mut self.superclass,
            "subclass" => &mut self.subclass,
            "SignMainGeneralOID" => &mut self.sign_main_general_oid,
            "ID" => &mut self.id,
            "LaneDirection" => &mut self.lane_direction,
            "Marker" => &mut self.marker,
            "City" => &mut self.city,
            "County" => &mut self.county,
            "District" => &mut self.district,
            "STREETNAME" => &mut self.street_name,
            "MUTCDCode" => &mut self.mutcd_code,
            "Retired" => &mut self.retired,
            "Replaced" => &mut self.replaced,
            "SignAge" => &mut self.sign_age,
            "TWN_TID" => &mut self.twn_tid,
            "TWN_MI" => &mut self.twn_mi,
            "QCFLAG" => &mut self.qc_flag,
            "MIN_TWN_FMI" => &mut self.min_twn_fmi,
            "MAX_TWN_TMI" => &mut self.max_twn_tmi,
            "SR_SID" => &mut self.sr_sid,
            "OFFSET" => &mut self.offset,
            "PublishDate" => &mut self.publish_date,
            _ => return None,
        };
        Some(slot)
    }

    /// Store a value. Schema keys land in their typed field, anything else
    /// in `extra`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.slot_mut(key) {
            Some(slot) => *slot = Some(value),
            None => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    /// Remove a value, returning it when present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        match self.slot_mut(key) {
            Some(slot) => slot.take(),
            None => self.extra.remove(key),
        }
    }

    /// Number of keys with a value.
    pub fn len(&self) -> usize {
        known_keys().filter(|k| self.get(k).is_some()).count() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate present values: schema keys in schema order, then `extra`
    /// keys in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        known_keys()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

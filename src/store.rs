//! Id-keyed store for the boxes of one open image.
//!
//! Records are addressed by stable ids handed out at insertion. Hosts keep
//! the id as their selection handle; after a record is removed the id simply
//! misses instead of aliasing whatever got created in its place. Iteration
//! follows insertion order, which is also serialization order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::ImageGeo;
use crate::model::{BoxRecord, ImageSize, RecordId};

const DEFAULT_DATABASE: &str = "Unknown";

/// Store operations that resolve a handle can miss.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The handle points at a record that is no longer present.
    #[error("no record with id {0}")]
    NotFound(RecordId),
}

/// All annotation state for one open image.
///
/// The dirty flag is monotonic: every mutating operation sets it and only
/// [`mark_saved`](Self::mark_saved) clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationStore {
    records: HashMap<RecordId, BoxRecord>,
    /// Live record ids in insertion order.
    order: Vec<RecordId>,
    next_id: RecordId,
    image_path: PathBuf,
    image_size: ImageSize,
    image_geo: Option<ImageGeo>,
    verified: bool,
    database: String,
    #[serde(skip)]
    selected_id: Option<RecordId>,
    #[serde(skip)]
    dirty: bool,
}

impl AnnotationStore {
    /// Empty store for a freshly opened image.
    pub fn new(image_path: impl Into<PathBuf>, image_size: ImageSize) -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            // 0 is the "not yet added" id on BoxRecord, so handles start at 1.
            next_id: 1,
            image_path: image_path.into(),
            image_size,
            image_geo: None,
            verified: false,
            database: DEFAULT_DATABASE.to_string(),
            selected_id: None,
            dirty: false,
        }
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    pub fn image_geo(&self) -> Option<ImageGeo> {
        self.image_geo
    }

    /// Attach the image's embedded geolocation. This happens at image load
    /// time and is not an annotation edit, so the dirty flag is untouched.
    pub fn set_image_geo(&mut self, geo: Option<ImageGeo>) {
        self.image_geo = geo;
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn set_verified(&mut self, verified: bool) {
        if self.verified != verified {
            self.verified = verified;
            self.dirty = true;
        }
    }

    /// Provenance string written to the file's `source` block.
    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn set_database(&mut self, database: impl Into<String>) {
        self.database = database.into();
        self.dirty = true;
    }

    /// Add a record, assigning it the next free id. Returns the handle.
    pub fn add(&mut self, mut record: BoxRecord) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        record.id = id;
        self.records.insert(id, record);
        self.order.push(id);
        self.dirty = true;
        id
    }

    /// Remove a record by handle. No-op returning `None` when absent.
    pub fn remove(&mut self, id: RecordId) -> Option<BoxRecord> {
        let record = self.records.remove(&id)?;
        self.order.retain(|&entry| entry != id);
        if self.selected_id == Some(id) {
            self.selected_id = None;
        }
        self.dirty = true;
        Some(record)
    }

    pub fn get(&self, id: RecordId) -> Option<&BoxRecord> {
        self.records.get(&id)
    }

    /// Mutable access to a record. Handing out the reference counts as an
    /// edit, so the store is marked dirty even if the caller changes nothing.
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut BoxRecord> {
        let record = self.records.get_mut(&id)?;
        self.dirty = true;
        Some(record)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BoxRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Mark a record as the current selection.
    pub fn select(&mut self, id: RecordId) -> Result<(), StoreError> {
        if !self.records.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        self.selected_id = Some(id);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected_id = None;
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.selected_id
    }

    pub fn selected(&self) -> Option<&BoxRecord> {
        self.selected_id.and_then(|id| self.records.get(&id))
    }

    /// Fill missing per-record coordinates from the image position, for every
    /// record in the store. Runs ahead of a save so boxes drawn on a geotagged
    /// image inherit its location. No-op when the store has no image position.
    pub fn apply_default_geo(&mut self) {
        let Some(geo) = self.image_geo else {
            return;
        };
        let mut changed = false;
        for record in self.records.values_mut() {
            changed |= crate::geo::apply_default_geo(record, &geo);
        }
        if changed {
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag unsaved changes made outside the store's own methods.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}

//! # Reference Store
//!
//! The `ReferenceStore` is the root container for all reference data.
//! It serializes to a single human-readable JSON file.
//!
//! ## Structure
//!
//! ```text
//! ReferenceStore
//! ├── meta: StoreMetadata (schema version, timestamps)
//! ├── locations: Vec<LocationRecord> (ordered by state, district)
//! └── materials: Vec<MaterialRecord> (ordered by category, grade)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use deck_core::reference::{ClimateData, MaterialCategory};
//! use deck_core::store::ReferenceStore;
//!
//! let mut store = ReferenceStore::new();
//! store.upsert_location("Kerala", "Idukki", ClimateData::default());
//! store.upsert_material(MaterialCategory::DeckConcrete, "M30");
//!
//! assert!(store.find_location("KERALA", " idukki ").is_some());
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reference::{ClimateData, LocationRecord, MaterialCategory, MaterialRecord};

/// Current schema version for reference store files
pub const STORE_SCHEMA_VERSION: &str = "0.1.0";

/// Whether an upsert inserted a new row or refreshed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Root reference-data container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStore {
    pub meta: StoreMetadata,
    #[serde(default)]
    pub locations: Vec<LocationRecord>,
    #[serde(default)]
    pub materials: Vec<MaterialRecord>,
}

/// Store metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Schema version for migration support
    pub version: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for ReferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceStore {
    pub fn new() -> Self {
        let now = Utc::now();
        ReferenceStore {
            meta: StoreMetadata {
                version: STORE_SCHEMA_VERSION.to_string(),
                created: now,
                modified: now,
            },
            locations: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Insert or update the location with this exact `(state, district)`.
    pub fn upsert_location(&mut self, state: &str, district: &str, climate: ClimateData) -> Upsert {
        self.touch();
        let key = (state, district);
        match self
            .locations
            .binary_search_by(|r| (r.state.as_str(), r.district.as_str()).cmp(&key))
        {
            Ok(index) => {
                let record = &mut self.locations[index];
                record.climate = climate;
                record.updated_at = self.meta.modified;
                Upsert::Updated
            }
            Err(index) => {
                self.locations
                    .insert(index, LocationRecord::new(state, district, climate));
                Upsert::Created
            }
        }
    }

    /// Insert the grade if it is not already listed for the category.
    pub fn upsert_material(&mut self, category: MaterialCategory, grade: &str) -> Upsert {
        self.touch();
        match self
            .materials
            .binary_search_by(|r| (r.category, r.grade.as_str()).cmp(&(category, grade)))
        {
            Ok(index) => {
                self.materials[index].updated_at = self.meta.modified;
                Upsert::Updated
            }
            Err(index) => {
                self.materials.insert(index, MaterialRecord::new(category, grade));
                Upsert::Created
            }
        }
    }

    /// Remove all locations. Returns how many were deleted.
    pub fn truncate_locations(&mut self) -> usize {
        self.touch();
        std::mem::take(&mut self.locations).len()
    }

    /// Remove all materials. Returns how many were deleted.
    pub fn truncate_materials(&mut self) -> usize {
        self.touch();
        std::mem::take(&mut self.materials).len()
    }

    /// Trimmed, case-insensitive location lookup
    pub fn find_location(&self, state: &str, district: &str) -> Option<&LocationRecord> {
        self.locations.iter().find(|r| r.matches(state, district))
    }

    /// Grades for one category, in grade order
    pub fn grades(&self, category: MaterialCategory) -> Vec<String> {
        self.materials
            .iter()
            .filter(|r| r.category == category)
            .map(|r| r.grade.clone())
            .collect()
    }

    /// Restore ordering after loading a hand-edited file
    pub(crate) fn normalize(&mut self) {
        self.locations
            .sort_by(|a, b| (&a.state, &a.district).cmp(&(&b.state, &b.district)));
        self.locations
            .dedup_by(|a, b| a.state == b.state && a.district == b.district);
        self.materials
            .sort_by(|a, b| (a.category, &a.grade).cmp(&(b.category, &b.grade)));
        self.materials
            .dedup_by(|a, b| a.category == b.category && a.grade == b.grade);
    }
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub created: usize,
    pub updated: usize,
    /// Rows dropped during parsing
    pub skipped: usize,
    /// Rows removed by a truncate before loading
    pub deleted: usize,
    pub source: String,
}

impl IngestReport {
    pub fn new(source: impl Into<String>) -> Self {
        IngestReport {
            source: source.into(),
            ..IngestReport::default()
        }
    }

    pub fn record(&mut self, outcome: Upsert) {
        match outcome {
            Upsert::Created => self.created += 1,
            Upsert::Updated => self.updated += 1,
        }
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ingested {} new rows and updated {} existing rows from {}.",
            self.created, self.updated, self.source
        )
    }
}

//! # Reference Data
//!
//! Location climate data and material grades, read from CSV exports and
//! served to the API.
//!
//! ## Example
//!
//! ```rust
//! use deck_core::reference::{ClimateData, ReferenceData, ReferenceService};
//! use deck_core::store::ReferenceStore;
//!
//! let mut store = ReferenceStore::new();
//! store.upsert_location("Kerala", "Idukki", ClimateData::default());
//!
//! let service = ReferenceService::new(store);
//! let record = service.get_location(" kerala ", "IDUKKI").unwrap();
//! assert_eq!(record.district, "Idukki");
//! assert_eq!(service.list_locations().unwrap().states, vec!["Kerala"]);
//! ```

pub mod location;
pub mod materials;
pub mod table;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use location::{
    parse_environment_table, read_environment_table, ClimateData, LocationEntry, LocationPayload,
    LocationRecord, LocationRows,
};
pub use materials::{
    parse_materials_table, read_materials_csv, MaterialCategory, MaterialListing, MaterialRecord,
    MaterialRows,
};

use crate::cache::Memo;
use crate::errors::{DeckError, DeckResult};
use crate::store::{IngestReport, ReferenceStore};

/// Read access to reference data
pub trait ReferenceData {
    /// Look up one location; matching is trimmed and case-insensitive.
    fn get_location(&self, state: &str, district: &str) -> DeckResult<LocationRecord>;

    /// Every location grouped by state. `CatalogNotLoaded` when there are none.
    fn list_locations(&self) -> DeckResult<Arc<LocationPayload>>;

    /// Grade names for a category, in grade order
    fn list_material_grades(&self, category: MaterialCategory) -> Vec<String>;

    /// Grades for every category. `CatalogNotLoaded` when all are empty.
    fn materials_by_category(&self) -> DeckResult<MaterialListing> {
        let listing = MaterialListing {
            girder_steel: self.list_material_grades(MaterialCategory::GirderSteel),
            cross_bracing_steel: self.list_material_grades(MaterialCategory::CrossBracingSteel),
            deck_concrete: self.list_material_grades(MaterialCategory::DeckConcrete),
        };
        if listing.is_empty() {
            return Err(DeckError::catalog_not_loaded(
                "Material catalog",
                "Run ingest-materials to load material grades.",
            ));
        }
        Ok(listing)
    }
}

/// Reference data backed by an in-memory `ReferenceStore`.
///
/// The grouped location payload is built once and reused until the next
/// location write.
#[derive(Debug, Default)]
pub struct ReferenceService {
    store: RwLock<ReferenceStore>,
    payload: Memo<LocationPayload>,
}

impl ReferenceService {
    pub fn new(store: ReferenceStore) -> Self {
        ReferenceService {
            store: RwLock::new(store),
            payload: Memo::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ReferenceStore> {
        self.store.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ReferenceStore> {
        self.store.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Upsert parsed environment rows, optionally clearing existing
    /// locations first.
    pub fn ingest_locations(&self, rows: &LocationRows, truncate: bool, source: &str) -> IngestReport {
        let mut report = IngestReport::new(source);
        {
            let mut store = self.write();
            if truncate {
                report.deleted = store.truncate_locations();
                log::info!("deleted {} existing location row(s)", report.deleted);
            }
            for ((state, district), climate) in rows {
                report.record(store.upsert_location(state, district, climate.clone()));
            }
        }
        self.payload.invalidate();
        log::info!("{}", report);
        report
    }

    /// Upsert parsed material rows, optionally clearing existing materials
    /// first.
    pub fn ingest_materials(&self, rows: &MaterialRows, truncate: bool, source: &str) -> IngestReport {
        let mut report = IngestReport::new(source);
        report.skipped = rows.skipped;
        let mut store = self.write();
        if truncate {
            report.deleted = store.truncate_materials();
            log::info!("deleted {} existing material row(s)", report.deleted);
        }
        for (category, grade) in &rows.rows {
            report.record(store.upsert_material(*category, grade));
        }
        log::info!("{}", report);
        report
    }

    /// Copy of the current store, for saving
    pub fn snapshot(&self) -> ReferenceStore {
        self.read().clone()
    }

    pub fn location_count(&self) -> usize {
        self.read().locations.len()
    }

    pub fn material_count(&self) -> usize {
        self.read().materials.len()
    }
}

impl ReferenceData for ReferenceService {
    fn get_location(&self, state: &str, district: &str) -> DeckResult<LocationRecord> {
        self.read()
            .find_location(state, district)
            .cloned()
            .ok_or_else(|| DeckError::location_not_found(state.trim(), district.trim()))
    }

    fn list_locations(&self) -> DeckResult<Arc<LocationPayload>> {
        self.payload.get_or_try_build(|| {
            let store = self.read();
            if store.locations.is_empty() {
                return Err(DeckError::catalog_not_loaded(
                    "Location data",
                    "Populate location records via ingest-locations before serving catalog data.",
                ));
            }
            log::debug!("building location payload from {} record(s)", store.locations.len());
            Ok(LocationPayload::from_records(&store.locations))
        })
    }

    fn list_material_grades(&self, category: MaterialCategory) -> Vec<String> {
        self.read().grades(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(entries: &[(&str, &str, f64)]) -> LocationRows {
        entries
            .iter()
            .map(|(state, district, wind)| {
                (
                    (state.to_string(), district.to_string()),
                    ClimateData {
                        basic_wind_speed: Some(*wind),
                        ..ClimateData::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_service_reports_not_loaded() {
        let service = ReferenceService::default();
        assert_eq!(service.list_locations().unwrap_err().error_code(), "CATALOG_NOT_LOADED");
        assert_eq!(service.materials_by_category().unwrap_err().error_code(), "CATALOG_NOT_LOADED");
        assert_eq!(
            service.get_location("Kerala", "Idukki").unwrap_err(),
            DeckError::location_not_found("Kerala", "Idukki")
        );
    }

    #[test]
    fn test_ingest_counts_and_lookup() {
        let service = ReferenceService::default();
        let report = service.ingest_locations(&rows(&[("Kerala", "Idukki", 39.0), ("Goa", "North Goa", 44.0)]), false, "a.csv");
        assert_eq!((report.created, report.updated), (2, 0));

        let report = service.ingest_locations(&rows(&[("Kerala", "Idukki", 41.0)]), false, "b.csv");
        assert_eq!((report.created, report.updated), (0, 1));

        let record = service.get_location("kerala", " idukki").unwrap();
        assert_eq!(record.climate.basic_wind_speed, Some(41.0));
        assert_eq!(service.location_count(), 2);
    }

    #[test]
    fn test_payload_memo_invalidated_on_write() {
        let service = ReferenceService::default();
        service.ingest_locations(&rows(&[("Kerala", "Idukki", 39.0)]), false, "a.csv");

        let first = service.list_locations().unwrap();
        let again = service.list_locations().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        service.ingest_locations(&rows(&[("Goa", "North Goa", 44.0)]), false, "b.csv");
        let refreshed = service.list_locations().unwrap();
        assert_eq!(refreshed.states, vec!["Goa", "Kerala"]);
    }

    #[test]
    fn test_truncate_replaces_locations() {
        let service = ReferenceService::default();
        service.ingest_locations(&rows(&[("Kerala", "Idukki", 39.0)]), false, "a.csv");
        let report = service.ingest_locations(&rows(&[("Goa", "North Goa", 44.0)]), true, "b.csv");
        assert_eq!(report.deleted, 1);
        assert_eq!(report.created, 1);
        assert!(service.get_location("Kerala", "Idukki").is_err());
    }

    #[test]
    fn test_materials_by_category() {
        let service = ReferenceService::default();
        let parsed = MaterialRows {
            rows: vec![
                (MaterialCategory::GirderSteel, "E350".to_string()),
                (MaterialCategory::GirderSteel, "E250".to_string()),
                (MaterialCategory::DeckConcrete, "M30".to_string()),
            ],
            skipped: 1,
        };
        let report = service.ingest_materials(&parsed, false, "materials.csv");
        assert_eq!((report.created, report.skipped), (3, 1));

        let listing = service.materials_by_category().unwrap();
        assert_eq!(listing.girder_steel, vec!["E250", "E350"]);
        assert!(listing.cross_bracing_steel.is_empty());
        assert_eq!(listing.deck_concrete, vec!["M30"]);
    }
}

//! End-to-end ingestion: CSV exports into a saved store, reloaded into a
//! service.

use std::fs;

use deck_core::file_io::{load_or_default, save_store, FileLock};
use deck_core::reference::{read_environment_table, read_materials_csv, MaterialCategory, ReferenceData};
use deck_core::{load_store, ReferenceService, ServiceConfig};
use pretty_assertions::assert_eq;

const ENVIRONMENT: &str = "\
State,District,Wind_Speed_ms,Seismic_Zone,Seismic_Factor,Max_Temp_C,Min_Temp_C
Kerala,Idukki,39,III,0.16,38,14
Kerala,Ernakulam,39,III,0.16,40,20
Goa,North Goa,44,III,0.16,40,18
,Orphan,1,II,0.1,30,10
";

const MATERIALS: &str = "\
category,grade
girder_steel,E250
girder_steel,E350
cross_bracing_steel,E250
deck_concrete,M25
deck_concrete,M30
formwork,Plywood
";

fn config_in(dir: &std::path::Path) -> ServiceConfig {
    ServiceConfig {
        data_dir: dir.to_path_buf(),
        ..ServiceConfig::default()
    }
}

#[test]
fn ingest_save_and_serve() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    fs::write(config.environment_csv(), ENVIRONMENT).unwrap();
    fs::write(config.materials_csv(), MATERIALS).unwrap();

    let store_path = config.store_path();
    {
        let _lock = FileLock::acquire(&store_path, "integration test").unwrap();
        let service = ReferenceService::new(load_or_default(&store_path).unwrap());

        let rows = read_environment_table(&config.environment_csv()).unwrap();
        let report = service.ingest_locations(&rows, false, "environment_table.csv");
        assert_eq!((report.created, report.updated), (3, 0));

        let materials = read_materials_csv(&config.materials_csv()).unwrap();
        let report = service.ingest_materials(&materials, false, "materials.csv");
        assert_eq!((report.created, report.skipped), (5, 1));

        save_store(&service.snapshot(), &store_path).unwrap();
    }

    let service = ReferenceService::new(load_store(&store_path).unwrap());
    let payload = service.list_locations().unwrap();
    assert_eq!(payload.states, vec!["Goa", "Kerala"]);
    let kerala: Vec<&str> = payload.districts["Kerala"].iter().map(|e| e.district.as_str()).collect();
    assert_eq!(kerala, vec!["Ernakulam", "Idukki"]);

    let idukki = service.get_location("KERALA", "idukki").unwrap();
    assert_eq!(idukki.climate.min_temp, Some(14.0));

    assert_eq!(service.list_material_grades(MaterialCategory::DeckConcrete), vec!["M25", "M30"]);
    assert_eq!(service.materials_by_category().unwrap().cross_bracing_steel, vec!["E250"]);
}

#[test]
fn reingest_updates_instead_of_duplicating() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    fs::write(config.environment_csv(), ENVIRONMENT).unwrap();

    let rows = read_environment_table(&config.environment_csv()).unwrap();
    let service = ReferenceService::default();
    service.ingest_locations(&rows, false, "first");
    let report = service.ingest_locations(&rows, false, "second");

    assert_eq!((report.created, report.updated), (0, 3));
    assert_eq!(service.location_count(), 3);
}

#[test]
fn missing_or_headerless_csv_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let missing = read_environment_table(&config.environment_csv()).unwrap_err();
    assert_eq!(missing.error_code(), "FILE_ERROR");

    fs::write(config.environment_csv(), "Region,Town\nKerala,Idukki\n").unwrap();
    let unusable = read_environment_table(&config.environment_csv()).unwrap_err();
    assert!(unusable.to_string().contains("No rows were read from the CSV"));
}

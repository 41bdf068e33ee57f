//! Environmental reference data by state and district.
//!
//! Each location carries the climate inputs a bridge design needs: basic
//! wind speed, seismic zone and factor, and the shade air temperature
//! extremes.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::table::{parse_optional_f64, CsvRecord, CsvTable};
use crate::errors::{DeckError, DeckResult};

/// Environment CSV column for each climate value
pub const CLIMATE_COLUMNS: [(&str, &str); 5] = [
    ("basic_wind_speed", "Wind_Speed_ms"),
    ("seismic_zone", "Seismic_Zone"),
    ("seismic_factor", "Seismic_Factor"),
    ("max_temp", "Max_Temp_C"),
    ("min_temp", "Min_Temp_C"),
];

const STATE_COLUMNS: [&str; 2] = ["state", "State"];
const DISTRICT_COLUMNS: [&str; 4] = ["district", "District", "city", "City"];

/// Climate values for one location. Missing readings stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateData {
    /// Basic wind speed (m/s)
    pub basic_wind_speed: Option<f64>,
    /// Seismic zone designation; empty when unknown
    #[serde(default)]
    pub seismic_zone: String,
    /// Seismic zone factor
    pub seismic_factor: Option<f64>,
    /// Maximum shade air temperature (°C)
    pub max_temp: Option<f64>,
    /// Minimum shade air temperature (°C)
    pub min_temp: Option<f64>,
}

/// Stored location row, unique on `(state, district)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub state: String,
    pub district: String,
    #[serde(flatten)]
    pub climate: ClimateData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocationRecord {
    pub fn new(state: impl Into<String>, district: impl Into<String>, climate: ClimateData) -> Self {
        let now = Utc::now();
        LocationRecord {
            state: state.into(),
            district: district.into(),
            climate,
            created_at: now,
            updated_at: now,
        }
    }

    /// Trimmed, case-insensitive match on state and district
    pub fn matches(&self, state: &str, district: &str) -> bool {
        self.state.eq_ignore_ascii_case(state.trim()) && self.district.eq_ignore_ascii_case(district.trim())
    }

    /// Listing entry for the grouped payload
    pub fn entry(&self) -> LocationEntry {
        LocationEntry {
            district: self.district.clone(),
            climate: self.climate.clone(),
        }
    }
}

impl std::fmt::Display for LocationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.state, self.district)
    }
}

/// A district and its climate, as listed under its state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub district: String,
    #[serde(flatten)]
    pub climate: ClimateData,
}

/// All locations grouped by state.
///
/// ## JSON Example
///
/// ```json
/// {
///   "states": ["Goa", "Kerala"],
///   "districts": {
///     "Kerala": [
///       { "district": "Idukki", "basic_wind_speed": 39.0, "seismic_zone": "III",
///         "seismic_factor": 0.16, "max_temp": 38.0, "min_temp": 14.0 }
///     ]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    /// State names, sorted
    pub states: Vec<String>,
    /// Districts per state, each list sorted by district
    pub districts: BTreeMap<String, Vec<LocationEntry>>,
}

impl LocationPayload {
    /// Group records by state
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a LocationRecord>) -> Self {
        let mut districts: BTreeMap<String, Vec<LocationEntry>> = BTreeMap::new();
        for record in records {
            districts.entry(record.state.clone()).or_default().push(record.entry());
        }
        for entries in districts.values_mut() {
            entries.sort_by(|a, b| a.district.cmp(&b.district));
        }

        LocationPayload {
            states: districts.keys().cloned().collect(),
            districts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn district_count(&self) -> usize {
        self.districts.values().map(Vec::len).sum()
    }
}

/// Parsed environment table, keyed by trimmed `(state, district)`
pub type LocationRows = BTreeMap<(String, String), ClimateData>;

/// Read an environment table CSV.
///
/// Fails when the file is missing or yields no usable rows.
pub fn read_environment_table(path: &Path) -> DeckResult<LocationRows> {
    let table = CsvTable::read(path)?;
    let rows = parse_environment_table(&table);
    if rows.is_empty() {
        return Err(DeckError::file_error(
            "parse",
            path.display().to_string(),
            "No rows were read from the CSV. Check the file path and headers.",
        ));
    }
    log::debug!("read {} location row(s) from {}", rows.len(), path.display());
    Ok(rows)
}

/// Extract location rows from an environment table.
///
/// Rows without a state or district are skipped; a later row for the same
/// location replaces an earlier one.
pub fn parse_environment_table(table: &CsvTable) -> LocationRows {
    let mut rows = LocationRows::new();
    for record in table.records() {
        let state = record.first_present(&STATE_COLUMNS, false);
        let district = record.first_present(&DISTRICT_COLUMNS, false);
        let (Some(state), Some(district)) = (state, district) else {
            continue;
        };
        let key = (state.trim().to_string(), district.trim().to_string());
        if key.0.is_empty() || key.1.is_empty() {
            continue;
        }
        rows.insert(key, climate_from_record(&record));
    }
    rows
}

fn climate_from_record(record: &CsvRecord<'_>) -> ClimateData {
    let value = |target: &str| -> Option<String> {
        let source = CLIMATE_COLUMNS
            .iter()
            .find(|(name, _)| *name == target)
            .map(|(_, column)| *column)?;
        let lower = source.to_lowercase();
        let upper = source.to_uppercase();
        let raw = record.first_present(&[source, lower.as_str(), upper.as_str()], true)?;
        if raw.trim().eq_ignore_ascii_case("NULL") {
            Some(String::new())
        } else {
            Some(raw.to_string())
        }
    };
    let number = |target: &str| value(target).as_deref().and_then(parse_optional_f64);

    ClimateData {
        basic_wind_speed: number("basic_wind_speed"),
        seismic_zone: value("seismic_zone").map(|zone| zone.trim().to_string()).unwrap_or_default(),
        seismic_factor: number("seismic_factor"),
        max_temp: number("max_temp"),
        min_temp: number("min_temp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
State,District,Wind_Speed_ms,Seismic_Zone,Seismic_Factor,Max_Temp_C,Min_Temp_C
Kerala,Idukki,39,III,0.16,38,14
 Kerala , Ernakulam ,39,NULL,NULL,,
Goa,,44,III,0.16,40,18
Kerala,Idukki,40,III,0.16,37,15
";

    #[test]
    fn test_parse_environment_table() {
        let rows = parse_environment_table(&CsvTable::parse(SAMPLE));
        assert_eq!(rows.len(), 2);

        let idukki = &rows[&("Kerala".to_string(), "Idukki".to_string())];
        // later duplicate wins
        assert_eq!(idukki.basic_wind_speed, Some(40.0));
        assert_eq!(idukki.seismic_zone, "III");

        let ernakulam = &rows[&("Kerala".to_string(), "Ernakulam".to_string())];
        assert_eq!(ernakulam.seismic_zone, "");
        assert_eq!(ernakulam.seismic_factor, None);
        assert_eq!(ernakulam.max_temp, None);
    }

    #[test]
    fn test_lowercase_and_city_headers() {
        let table = CsvTable::parse("state,city,wind_speed_ms,SEISMIC_ZONE\nMaharashtra,Pune,39,III\n");
        let rows = parse_environment_table(&table);
        let pune = &rows[&("Maharashtra".to_string(), "Pune".to_string())];
        assert_eq!(pune.basic_wind_speed, Some(39.0));
        assert_eq!(pune.seismic_zone, "III");
    }

    #[test]
    fn test_payload_groups_and_sorts() {
        let records = vec![
            LocationRecord::new("Kerala", "Kollam", ClimateData::default()),
            LocationRecord::new("Goa", "North Goa", ClimateData::default()),
            LocationRecord::new("Kerala", "Idukki", ClimateData::default()),
        ];
        let payload = LocationPayload::from_records(&records);
        assert_eq!(payload.states, vec!["Goa", "Kerala"]);
        let kerala: Vec<&str> = payload.districts["Kerala"].iter().map(|e| e.district.as_str()).collect();
        assert_eq!(kerala, vec!["Idukki", "Kollam"]);
        assert_eq!(payload.district_count(), 3);
    }

    #[test]
    fn test_record_matching_ignores_case_and_padding() {
        let record = LocationRecord::new("Kerala", "Idukki", ClimateData::default());
        assert!(record.matches(" kerala ", "IDUKKI"));
        assert!(!record.matches("Kerala", "Kollam"));
    }

    #[test]
    fn test_entry_serializes_flat() {
        let record = LocationRecord::new(
            "Kerala",
            "Idukki",
            ClimateData {
                basic_wind_speed: Some(39.0),
                seismic_zone: "III".to_string(),
                ..ClimateData::default()
            },
        );
        let json = serde_json::to_value(record.entry()).unwrap();
        assert_eq!(json["district"], "Idukki");
        assert_eq!(json["basic_wind_speed"], 39.0);
        assert!(json["min_temp"].is_null());
    }
}

//! Material grades offered for each structural component of the deck.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::table::CsvTable;
use crate::errors::{DeckError, DeckResult};

/// Component a material grade applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    GirderSteel,
    CrossBracingSteel,
    DeckConcrete,
}

impl MaterialCategory {
    pub const ALL: [MaterialCategory; 3] = [
        MaterialCategory::GirderSteel,
        MaterialCategory::CrossBracingSteel,
        MaterialCategory::DeckConcrete,
    ];

    /// Stored/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialCategory::GirderSteel => "girder_steel",
            MaterialCategory::CrossBracingSteel => "cross_bracing_steel",
            MaterialCategory::DeckConcrete => "deck_concrete",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialCategory::GirderSteel => "Girder Steel",
            MaterialCategory::CrossBracingSteel => "Cross Bracing Steel",
            MaterialCategory::DeckConcrete => "Deck Concrete",
        }
    }
}

impl fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialCategory {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        MaterialCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == trimmed)
            .ok_or_else(|| {
                DeckError::invalid_input(
                    "category",
                    trimmed,
                    "Expected one of girder_steel, cross_bracing_steel, deck_concrete.",
                )
            })
    }
}

/// Stored material row, unique on `(category, grade)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub category: MaterialCategory,
    pub grade: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaterialRecord {
    pub fn new(category: MaterialCategory, grade: impl Into<String>) -> Self {
        let now = Utc::now();
        MaterialRecord {
            category,
            grade: grade.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Display for MaterialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category.display_name(), self.grade)
    }
}

/// Grade names for every category, as served to clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialListing {
    pub girder_steel: Vec<String>,
    pub cross_bracing_steel: Vec<String>,
    pub deck_concrete: Vec<String>,
}

impl MaterialListing {
    pub fn grades(&self, category: MaterialCategory) -> &[String] {
        match category {
            MaterialCategory::GirderSteel => &self.girder_steel,
            MaterialCategory::CrossBracingSteel => &self.cross_bracing_steel,
            MaterialCategory::DeckConcrete => &self.deck_concrete,
        }
    }

    pub fn is_empty(&self) -> bool {
        MaterialCategory::ALL.iter().all(|c| self.grades(*c).is_empty())
    }
}

/// Rows read from a materials CSV
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialRows {
    /// Valid `(category, grade)` pairs in file order
    pub rows: Vec<(MaterialCategory, String)>,
    /// Rows dropped for an unknown category or a blank grade
    pub skipped: usize,
}

/// Read a materials CSV with `category` and `grade` columns.
pub fn read_materials_csv(path: &Path) -> DeckResult<MaterialRows> {
    let table = CsvTable::read(path)?;
    for column in ["category", "grade"] {
        if !table.headers().iter().any(|h| h == column) {
            return Err(DeckError::file_error(
                "parse",
                path.display().to_string(),
                format!("Missing required column '{}'", column),
            ));
        }
    }
    let parsed = parse_materials_table(&table);
    log::debug!(
        "read {} material row(s) from {} ({} skipped)",
        parsed.rows.len(),
        path.display(),
        parsed.skipped
    );
    Ok(parsed)
}

pub fn parse_materials_table(table: &CsvTable) -> MaterialRows {
    let mut parsed = MaterialRows::default();
    for record in table.records() {
        let category = record.get("category").unwrap_or_default().trim();
        let grade = record.get("grade").unwrap_or_default().trim();
        match category.parse::<MaterialCategory>() {
            Ok(category) if !grade.is_empty() => parsed.rows.push((category, grade.to_string())),
            _ => {
                log::warn!("skipping material row with category '{}' and grade '{}'", category, grade);
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

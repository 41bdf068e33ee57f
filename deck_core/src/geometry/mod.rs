//! # Girder-Deck Geometry
//!
//! Validation and auto-balancing of the transverse deck layout. Every
//! stage here is a pure function over plain numbers:
//!
//! - [`range`] - span, carriageway and skew limits
//! - [`consistency`] - conflicts between spacing, count and overhang
//! - [`balance`] - derives a layout satisfying the width equation
//!
//! The width equation every balanced layout satisfies (to rounding):
//!
//! ```text
//! overall_width = girder_count × girder_spacing + 2 × deck_overhang
//! overall_width = max(carriageway_width + 5.0, 2 × MIN_SPACING + 2 × MIN_OVERHANG)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use deck_core::geometry::{validate_geometry, ChangedField, GeometryInput};
//!
//! let input = GeometryInput {
//!     span: 30.0,
//!     carriageway_width: 8.5,
//!     skew_angle: 0.0,
//!     girder_spacing: 2.2,
//!     girder_count: 4,
//!     deck_overhang: 1.75,
//!     changed_field: Some(ChangedField::GirderSpacing),
//! };
//!
//! let report = validate_geometry(&input);
//! assert!(report.is_valid);
//! assert_eq!(report.geometry.girder_count, 5);
//! ```

pub mod balance;
pub mod consistency;
pub mod range;
pub mod request;

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DeckError;

pub use balance::auto_adjust_geometry;
pub use consistency::detect_geometry_issues;
pub use range::validate_basic_range;
pub use request::GeometryRequest;

/// Minimum span covered by the design software (m)
pub const MIN_SPAN: f64 = 20.0;
/// Maximum span covered by the design software (m)
pub const MAX_SPAN: f64 = 45.0;
/// Minimum carriageway width (m)
pub const MIN_CARRIAGEWAY: f64 = 4.25;
/// Carriageway width upper bound (m), exclusive
pub const MAX_CARRIAGEWAY: f64 = 24.0;
/// Skew beyond which IRC 24 asks for detailed analysis (degrees)
pub const SKEW_LIMIT: f64 = 15.0;
/// Smallest deck overhang the balancer will produce (m)
pub const MIN_OVERHANG: f64 = 0.5;
/// Smallest girder spacing the balancer will produce (m)
pub const MIN_SPACING: f64 = 0.5;
/// Edge clearance allowance added to the carriageway (m)
pub const EDGE_ALLOWANCE: f64 = 5.0;

/// Input field a message refers to.
///
/// Serializes to the snake_case field name so message maps render as
/// `{"girder_spacing": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryField {
    Span,
    CarriagewayWidth,
    SkewAngle,
    GirderSpacing,
    GirderCount,
    DeckOverhang,
}

impl GeometryField {
    /// Field name as it appears in requests and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryField::Span => "span",
            GeometryField::CarriagewayWidth => "carriageway_width",
            GeometryField::SkewAngle => "skew_angle",
            GeometryField::GirderSpacing => "girder_spacing",
            GeometryField::GirderCount => "girder_count",
            GeometryField::DeckOverhang => "deck_overhang",
        }
    }
}

impl std::fmt::Display for GeometryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The geometry input the user edited most recently.
///
/// The balancer treats this field as authoritative and derives the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    GirderSpacing,
    GirderCount,
    DeckOverhang,
}

impl ChangedField {
    pub const ALL: [ChangedField; 3] = [
        ChangedField::GirderSpacing,
        ChangedField::GirderCount,
        ChangedField::DeckOverhang,
    ];
}

impl From<ChangedField> for GeometryField {
    fn from(field: ChangedField) -> Self {
        match field {
            ChangedField::GirderSpacing => GeometryField::GirderSpacing,
            ChangedField::GirderCount => GeometryField::GirderCount,
            ChangedField::DeckOverhang => GeometryField::DeckOverhang,
        }
    }
}

impl FromStr for ChangedField {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "girder_spacing" => Ok(ChangedField::GirderSpacing),
            "girder_count" => Ok(ChangedField::GirderCount),
            "deck_overhang" => Ok(ChangedField::DeckOverhang),
            other => Err(DeckError::invalid_input(
                "changed_field",
                other,
                format!("\"{}\" is not a valid choice.", other),
            )),
        }
    }
}

impl std::fmt::Display for ChangedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(GeometryField::from(*self).as_str())
    }
}

/// Field-keyed messages, ordered by field
pub type Messages = BTreeMap<GeometryField, String>;

/// Blocking errors and advisory warnings produced by a check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    pub errors: Messages,
    pub warnings: Messages,
}

impl Findings {
    /// True when no blocking error was recorded
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fold another check's findings into this one.
    ///
    /// Errors from `other` replace errors on the same field; warnings
    /// already present are kept.
    pub fn merge(&mut self, other: Findings) {
        self.errors.extend(other.errors);
        for (field, message) in other.warnings {
            self.warnings.entry(field).or_insert(message);
        }
    }
}

/// One geometry check request, already type-checked.
///
/// ## JSON Example
///
/// ```json
/// {
///   "span": 30.0,
///   "carriageway_width": 8.5,
///   "skew_angle": 0.0,
///   "girder_spacing": 2.2,
///   "girder_count": 4,
///   "deck_overhang": 1.75,
///   "changed_field": "girder_spacing"
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryInput {
    /// Bridge span (m)
    pub span: f64,
    /// Clear carriageway width (m)
    pub carriageway_width: f64,
    /// Skew angle, signed (degrees)
    pub skew_angle: f64,
    /// Centre-to-centre girder spacing (m)
    pub girder_spacing: f64,
    /// Number of girders
    pub girder_count: i64,
    /// Deck overhang beyond the outer girders, each side (m)
    pub deck_overhang: f64,
    /// Field the user edited last, if any
    #[serde(default)]
    pub changed_field: Option<ChangedField>,
}

/// Auto-balanced deck layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedGeometry {
    /// Overall deck width (m), rounded to 2 decimals
    pub overall_width: f64,
    /// Girder spacing (m), rounded to 1 decimal
    pub girder_spacing: f64,
    /// Number of girders, always at least 2
    pub girder_count: i64,
    /// Deck overhang (m), rounded to 1 decimal
    pub deck_overhang: f64,
}

impl AdjustedGeometry {
    /// Width left unexplained by the layout:
    /// `count × spacing + 2 × overhang - overall_width`
    pub fn width_residual(&self) -> f64 {
        self.girder_count as f64 * self.girder_spacing + 2.0 * self.deck_overhang - self.overall_width
    }

    /// Width between the outer girders' overhang edges
    pub fn effective_width(&self) -> f64 {
        self.overall_width - 2.0 * self.deck_overhang
    }
}

/// Result of a full geometry check.
///
/// ## JSON Example
///
/// ```json
/// {
///   "errors": {},
///   "warnings": { "girder_spacing": "Inputs were auto-balanced ..." },
///   "geometry": {
///     "overall_width": 13.5,
///     "girder_spacing": 2.0,
///     "girder_count": 5,
///     "deck_overhang": 1.8
///   },
///   "is_valid": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryReport {
    pub errors: Messages,
    pub warnings: Messages,
    pub geometry: AdjustedGeometry,
    pub is_valid: bool,
}

/// Overall deck width for a carriageway.
///
/// Never smaller than two minimum bays' worth of girders plus two minimum
/// overhangs.
pub fn overall_width(carriageway_width: f64) -> f64 {
    let minimum_width = MIN_SPACING * 2.0 + MIN_OVERHANG * 2.0;
    (carriageway_width + EDGE_ALLOWANCE).max(minimum_width)
}

/// Run the range check, the consistency check and the balancer.
///
/// The balanced geometry is always returned; `is_valid` tells the caller
/// whether the raw input can be accepted.
pub fn validate_geometry(input: &GeometryInput) -> GeometryReport {
    let mut findings = validate_basic_range(input.span, input.carriageway_width, input.skew_angle);
    findings.merge(detect_geometry_issues(
        input.carriageway_width,
        input.girder_spacing,
        input.girder_count,
        input.deck_overhang,
    ));

    let geometry = auto_adjust_geometry(
        input.carriageway_width,
        input.girder_spacing,
        input.girder_count,
        input.deck_overhang,
        input.changed_field,
    );

    log::debug!(
        "geometry check: {} error(s), {} warning(s), balanced to {} x {:.1} m + 2 x {:.1} m",
        findings.errors.len(),
        findings.warnings.len(),
        geometry.girder_count,
        geometry.girder_spacing,
        geometry.deck_overhang
    );

    let is_valid = findings.is_valid();
    GeometryReport {
        errors: findings.errors,
        warnings: findings.warnings,
        geometry,
        is_valid,
    }
}

/// `value` limited to `[min, max]`.
///
/// Unlike `f64::clamp` this never panics: `min` wins when the bounds
/// cross, and a NaN `value` lands on `max`.
pub(crate) fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Round to `decimals` places, ties to even.
///
/// Rounds the exact decimal value of `value`, so `2.675` (stored just below
/// the tie) goes to `2.67` and an exact tie such as `2.25` goes to `2.2`.
/// Non-finite values pass through.
pub(crate) fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

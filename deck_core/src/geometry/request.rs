//! Request-shape validation for geometry checks.
//!
//! The engine accepts any number; this layer rejects requests that are not
//! even well-formed (missing fields, negative widths, non-finite values,
//! unknown `changed_field` names) before the engine sees them.

use serde::{Deserialize, Serialize};

use super::{ChangedField, GeometryInput};
use crate::errors::{DeckError, DeckResult};
use crate::lenient::{optional_f64, optional_i64};

/// Raw geometry request as received over the wire.
///
/// Every field is optional so that a missing one is reported as
/// `MissingField` rather than a generic parse failure. Numbers may arrive
/// as strings, and `girder_count` as an integral float (`4.0`, `"4"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryRequest {
    #[serde(default, deserialize_with = "optional_f64")]
    pub span: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    pub carriageway_width: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    pub skew_angle: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    pub girder_spacing: Option<f64>,
    #[serde(default, deserialize_with = "optional_i64")]
    pub girder_count: Option<i64>,
    #[serde(default, deserialize_with = "optional_f64")]
    pub deck_overhang: Option<f64>,
    /// `null`, absent or `""` all mean "no field edited"
    #[serde(default)]
    pub changed_field: Option<String>,
}

impl GeometryRequest {
    /// Validate the request and convert it into engine input.
    ///
    /// Returns the first violation found, in field order.
    pub fn validate(&self) -> DeckResult<GeometryInput> {
        let span = at_least("span", self.span, 0.0)?;
        let carriageway_width = at_least("carriageway_width", self.carriageway_width, 0.0)?;
        let skew_angle = finite("skew_angle", self.skew_angle)?;
        let girder_spacing = at_least("girder_spacing", self.girder_spacing, 0.0)?;

        let girder_count = self
            .girder_count
            .ok_or_else(|| DeckError::missing_field("girder_count"))?;
        if girder_count < 1 {
            return Err(DeckError::invalid_input(
                "girder_count",
                girder_count.to_string(),
                "Ensure this value is greater than or equal to 1.",
            ));
        }

        let deck_overhang = at_least("deck_overhang", self.deck_overhang, 0.0)?;

        let changed_field = match self.changed_field.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(name.parse::<ChangedField>()?),
        };

        Ok(GeometryInput {
            span,
            carriageway_width,
            skew_angle,
            girder_spacing,
            girder_count,
            deck_overhang,
            changed_field,
        })
    }
}

fn finite(field: &str, value: Option<f64>) -> DeckResult<f64> {
    let value = value.ok_or_else(|| DeckError::missing_field(field))?;
    if !value.is_finite() {
        return Err(DeckError::invalid_input(
            field,
            value.to_string(),
            "A valid number is required.",
        ));
    }
    Ok(value)
}

fn at_least(field: &str, value: Option<f64>, min: f64) -> DeckResult<f64> {
    let value = finite(field, value)?;
    if value < min {
        return Err(DeckError::invalid_input(
            field,
            value.to_string(),
            format!("Ensure this value is greater than or equal to {}.", min),
        ));
    }
    Ok(value)
}

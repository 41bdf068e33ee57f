//! # Custom Loading Parameters
//!
//! User-supplied environmental loading that overrides the reference values
//! for a location: basic wind speed, seismic zone and factor, and the
//! design temperature range.
//!
//! ## Example
//!
//! ```rust
//! use deck_core::loading::CustomLoadingRequest;
//!
//! let request = CustomLoadingRequest {
//!     wind: Some(45.0),
//!     seismic_zone: Some("III".to_string()),
//!     seismic_factor: Some(0.16),
//!     max_temp: Some(40.0),
//!     min_temp: Some(28.0),
//! };
//! let loading = request.validate().unwrap();
//! assert_eq!(loading.temperature_range(), 12.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{DeckError, DeckResult};
use crate::lenient::optional_f64;

/// Longest seismic zone designation accepted (e.g. "III", "V")
pub const MAX_SEISMIC_ZONE_LEN: usize = 5;

/// Raw custom-loading request; every field is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomLoadingRequest {
    /// Basic wind speed (m/s)
    #[serde(default, deserialize_with = "optional_f64")]
    pub wind: Option<f64>,
    /// Seismic zone designation
    pub seismic_zone: Option<String>,
    /// Seismic zone factor
    #[serde(default, deserialize_with = "optional_f64")]
    pub seismic_factor: Option<f64>,
    /// Maximum shade air temperature (°C)
    #[serde(default, deserialize_with = "optional_f64")]
    pub max_temp: Option<f64>,
    /// Minimum shade air temperature (°C)
    #[serde(default, deserialize_with = "optional_f64")]
    pub min_temp: Option<f64>,
}

/// Validated custom loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomLoading {
    pub wind: f64,
    pub seismic_zone: String,
    pub seismic_factor: f64,
    pub max_temp: f64,
    pub min_temp: f64,
}

impl CustomLoading {
    /// Design temperature range (°C)
    pub fn temperature_range(&self) -> f64 {
        self.max_temp - self.min_temp
    }
}

impl CustomLoadingRequest {
    /// Validate every field and the temperature ordering.
    pub fn validate(&self) -> DeckResult<CustomLoading> {
        let wind = non_negative("wind", self.wind)?;

        let seismic_zone = self
            .seismic_zone
            .as_deref()
            .ok_or_else(|| DeckError::missing_field("seismic_zone"))?
            .trim()
            .to_string();
        if seismic_zone.is_empty() {
            return Err(DeckError::invalid_input(
                "seismic_zone",
                "",
                "This field may not be blank.",
            ));
        }
        if seismic_zone.chars().count() > MAX_SEISMIC_ZONE_LEN {
            return Err(DeckError::invalid_input(
                "seismic_zone",
                seismic_zone,
                format!("Ensure this field has no more than {} characters.", MAX_SEISMIC_ZONE_LEN),
            ));
        }

        let seismic_factor = non_negative("seismic_factor", self.seismic_factor)?;
        let max_temp = number("max_temp", self.max_temp)?;
        let min_temp = number("min_temp", self.min_temp)?;

        if max_temp < min_temp {
            return Err(DeckError::invalid_input(
                "max_temp",
                max_temp.to_string(),
                "Maximum temperature must be greater than minimum temperature.",
            ));
        }

        Ok(CustomLoading {
            wind,
            seismic_zone,
            seismic_factor,
            max_temp,
            min_temp,
        })
    }
}

fn number(field: &str, value: Option<f64>) -> DeckResult<f64> {
    let value = value.ok_or_else(|| DeckError::missing_field(field))?;
    if !value.is_finite() {
        return Err(DeckError::invalid_input(field, value.to_string(), "A valid number is required."));
    }
    Ok(value)
}

fn non_negative(field: &str, value: Option<f64>) -> DeckResult<f64> {
    let value = number(field, value)?;
    if value < 0.0 {
        return Err(DeckError::invalid_input(
            field,
            value.to_string(),
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    Ok(value)
}

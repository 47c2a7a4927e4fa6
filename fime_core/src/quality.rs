//! # Raw Water Quality
//!
//! Snapshot of the raw-water parameters that drive unit selection and sizing.
//! Every field is optional; formulas fall back to the defaults below when a
//! value was not measured.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Turbidity assumed when not measured (NTU)
pub const DEFAULT_TURBIDITY_NTU: f64 = 50.0;

/// pH assumed when not measured
pub const DEFAULT_PH: f64 = 7.0;

/// Water temperature assumed when not measured (°C)
pub const DEFAULT_TEMPERATURE_C: f64 = 20.0;

/// Raw water quality.
///
/// ## JSON Example
///
/// ```json
/// { "turbidity": 30.0, "color": 40.0, "fecal_coliforms": 500.0, "ph": 7.2 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WaterQualitySnapshot {
    /// Turbidity (NTU)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbidity: Option<f64>,

    /// True color (UC, platinum-cobalt units)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<f64>,

    /// Fecal coliforms (CFU/100 mL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecal_coliforms: Option<f64>,

    /// pH
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,

    /// Water temperature (°C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl WaterQualitySnapshot {
    /// Snapshot with only turbidity measured
    pub fn with_turbidity(turbidity: f64) -> Self {
        WaterQualitySnapshot {
            turbidity: Some(turbidity),
            ..Default::default()
        }
    }

    pub fn turbidity_or_default(&self) -> f64 {
        self.turbidity.unwrap_or(DEFAULT_TURBIDITY_NTU)
    }

    pub fn ph_or_default(&self) -> f64 {
        self.ph.unwrap_or(DEFAULT_PH)
    }

    pub fn temperature_or_default(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE_C)
    }

    /// Fill every missing field from `fallback`.
    pub fn or(self, fallback: &WaterQualitySnapshot) -> Self {
        WaterQualitySnapshot {
            turbidity: self.turbidity.or(fallback.turbidity),
            color: self.color.or(fallback.color),
            fecal_coliforms: self.fecal_coliforms.or(fallback.fecal_coliforms),
            ph: self.ph.or(fallback.ph),
            temperature: self.temperature.or(fallback.temperature),
        }
    }

    /// Validate the measured values.
    ///
    /// The engine accepts any snapshot; callers use this to reject obvious
    /// data-entry errors before running a design.
    pub fn validate(&self) -> CalcResult<()> {
        let non_negative = [
            ("turbidity", self.turbidity),
            ("color", self.color),
            ("fecal_coliforms", self.fecal_coliforms),
        ];
        for (field, value) in non_negative {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CalcError::invalid_input(field, v.to_string(), "Cannot be negative"));
                }
            }
        }
        if let Some(ph) = self.ph {
            if !(0.0..=14.0).contains(&ph) {
                return Err(CalcError::invalid_input("ph", ph.to_string(), "pH must be between 0 and 14"));
            }
        }
        if let Some(t) = self.temperature {
            if !(0.0..=40.0).contains(&t) {
                return Err(CalcError::invalid_input(
                    "temperature",
                    t.to_string(),
                    "Water temperature must be between 0 and 40 °C",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_to_missing_values() {
        let q = WaterQualitySnapshot::default();
        assert_eq!(q.turbidity_or_default(), 50.0);
        assert_eq!(q.ph_or_default(), 7.0);
        assert_eq!(q.temperature_or_default(), 20.0);
    }

    #[test]
    fn test_measured_values_win() {
        let q = WaterQualitySnapshot {
            ph: Some(8.2),
            ..WaterQualitySnapshot::with_turbidity(120.0)
        };
        assert_eq!(q.turbidity_or_default(), 120.0);
        assert_eq!(q.ph_or_default(), 8.2);
    }

    #[test]
    fn test_or_fills_gaps_only() {
        let measured = WaterQualitySnapshot::with_turbidity(10.0);
        let fallback = WaterQualitySnapshot {
            turbidity: Some(50.0),
            ph: Some(7.5),
            ..Default::default()
        };
        let merged = measured.or(&fallback);
        assert_eq!(merged.turbidity, Some(10.0));
        assert_eq!(merged.ph, Some(7.5));
        assert_eq!(merged.color, None);
    }

    #[test]
    fn test_validate() {
        assert!(WaterQualitySnapshot::with_turbidity(30.0).validate().is_ok());
        assert!(WaterQualitySnapshot::with_turbidity(-1.0).validate().is_err());
        let bad_ph = WaterQualitySnapshot { ph: Some(15.0), ..Default::default() };
        assert!(bad_ph.validate().is_err());
    }

    #[test]
    fn test_missing_fields_deserialize() {
        let q: WaterQualitySnapshot = serde_json::from_str(r#"{"turbidity": 30.0}"#).unwrap();
        assert_eq!(q.turbidity, Some(30.0));
        assert!(q.ph.is_none());
    }
}

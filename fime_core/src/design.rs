//! # Plant Design
//!
//! Runs every calculation of the FIME train for one design input and bundles
//! the results into a single report.
//!
//! ## Structure
//!
//! ```text
//! DesignInput + DesignSettings
//!   ├── size_prefilter / size_coarse_filter / size_slow_sand_filter (present units)
//!   ├── size_disinfection
//!   ├── total_removal
//!   ├── select_diameter (intake and wash lines)
//!   ├── build_profile / total_head_required
//!   └── generate_valve_schedule
//!         ↓
//! PlantDesignReport
//! ```
//!
//! Missing water-quality fields fall back to the settings snapshot. Missing
//! filter and disinfection parameters fall back to the settings defaults.
//!
//! ## Example
//!
//! ```rust
//! use fime_core::design::{design_plant, DesignInput, DesignSettings};
//!
//! let input = DesignInput::new(1.0, 800);
//! let report = design_plant(&input, &DesignSettings::default());
//!
//! assert!(report.prefilter.is_some());
//! assert_eq!(report.valves.len(), 8);
//! assert_eq!(report.profile.last().unwrap().id, "storage");
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::calculations::{
    size_coarse_filter, size_disinfection, size_prefilter, size_slow_sand_filter, total_removal, ComplianceCheck,
    DisinfectionMemoria, DisinfectionParams, FilterParams, ModuleMemoria, RemovalEstimate,
};
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::hydraulic_profile::{build_profile, total_head_required, HydraulicNode, DEFAULT_START_ELEVATION};
use crate::materials::TreatmentUnit;
use crate::piping::{generate_valve_schedule, select_diameter, PipeCompliance, PipeKind, PipeSpec, ValveSpec, WASH_FLOW_FACTOR};
use crate::quality::{WaterQualitySnapshot, DEFAULT_PH, DEFAULT_TEMPERATURE_C, DEFAULT_TURBIDITY_NTU};
use crate::units::DesignFlow;

/// Raw fecal coliforms assumed when none were measured (CFU/100 mL)
pub const DEFAULT_FECAL_COLIFORMS: f64 = 500.0;

// ============================================================================
// Settings
// ============================================================================

/// Engine defaults applied to every design.
///
/// Every field has a default, so a partial `settings` object is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSettings {
    /// Fills water-quality fields the input leaves empty
    pub fallback_quality: WaterQualitySnapshot,
    pub coarse_filter: FilterParams,
    pub slow_sand_filter: FilterParams,
    pub disinfection: DisinfectionParams,
    /// Water level at the intake (m)
    pub start_elevation: f64,
    /// Intake pipe diameter (in); selected by velocity when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intake_diameter_in: Option<f64>,
}

impl Default for DesignSettings {
    fn default() -> Self {
        DesignSettings {
            fallback_quality: WaterQualitySnapshot {
                turbidity: Some(DEFAULT_TURBIDITY_NTU),
                color: None,
                fecal_coliforms: Some(DEFAULT_FECAL_COLIFORMS),
                ph: Some(DEFAULT_PH),
                temperature: Some(DEFAULT_TEMPERATURE_C),
            },
            coarse_filter: FilterParams {
                vf: 0.6,
                num_units: 2,
                ratio_l_a: 4.0,
            },
            slow_sand_filter: FilterParams {
                vf: 0.15,
                num_units: 2,
                ratio_l_a: 2.0,
            },
            disinfection: DisinfectionParams {
                contact_time: 30.0,
                chlorine_dose: 2.0,
                chlorine_concentration: 65.0,
            },
            start_elevation: DEFAULT_START_ELEVATION,
            intake_diameter_in: None,
        }
    }
}

// ============================================================================
// Input
// ============================================================================

fn default_units() -> Vec<String> {
    TreatmentUnit::ALL.iter().map(|u| u.key().to_string()).collect()
}

/// One plant design request.
///
/// ## JSON Example
///
/// ```json
/// {
///   "flow_lps": 1.0,
///   "population": 800,
///   "quality": { "turbidity": 70.0, "fecal_coliforms": 2000.0 },
///   "units": ["pfd", "fgac", "fla"],
///   "coarse_filter": { "vf": 0.45, "num_units": 3, "ratio_l_a": 3.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignInput {
    /// Design flow (L/s)
    pub flow_lps: f64,

    /// Population served
    #[serde(default)]
    pub population: u32,

    /// Raw water quality as measured
    #[serde(default)]
    pub quality: WaterQualitySnapshot,

    /// Unit keys present in the train; all three filters by default
    #[serde(default = "default_units")]
    pub units: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coarse_filter: Option<FilterParams>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_sand_filter: Option<FilterParams>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disinfection: Option<DisinfectionParams>,
}

impl DesignInput {
    /// Full train with no measurements and default parameters.
    pub fn new(flow_lps: f64, population: u32) -> Self {
        DesignInput {
            flow_lps,
            population,
            quality: WaterQualitySnapshot::default(),
            units: default_units(),
            coarse_filter: None,
            slow_sand_filter: None,
            disinfection: None,
        }
    }

    /// Parse an input record from JSON text.
    ///
    /// Omitted fields take their serde defaults; nothing is validated here.
    pub fn from_json(json: &str) -> CalcResult<Self> {
        serde_json::from_str(json).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid design input: {}", e),
        })
    }

    /// Present units in train order. Unknown keys are dropped.
    pub fn present_units(&self) -> BTreeSet<TreatmentUnit> {
        self.units.iter().filter_map(|k| TreatmentUnit::from_key(k)).collect()
    }

    /// Reject inputs the engine would size into meaningless results.
    ///
    /// [`design_plant`] does not call this; it sizes whatever it is given.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("flow_lps", self.flow_lps)?;
        self.quality.validate()?;
        if let Some(unknown) = self.units.iter().find(|k| TreatmentUnit::from_key(k).is_none()) {
            return Err(CalcError::unknown_unit(unknown.as_str()));
        }
        if let Some(p) = &self.coarse_filter {
            p.validate()?;
        }
        if let Some(p) = &self.slow_sand_filter {
            p.validate()?;
        }
        if let Some(p) = &self.disinfection {
            p.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// Report
// ============================================================================

/// Everything computed for one design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantDesignReport {
    pub flow: DesignFlow,
    /// Water quality after applying the fallback snapshot
    pub quality: WaterQualitySnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefilter: Option<ModuleMemoria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coarse_filter: Option<ModuleMemoria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_sand_filter: Option<ModuleMemoria>,
    pub disinfection: DisinfectionMemoria,
    pub removal: RemovalEstimate,
    pub intake_pipe: PipeSpec,
    pub wash_pipe: PipeSpec,
    pub profile: Vec<HydraulicNode>,
    /// Level drop from the intake to the storage water surface (m)
    pub total_head_m: f64,
    pub valves: Vec<ValveSpec>,
}

impl PlantDesignReport {
    /// Unit memorias in train order, disinfection last.
    pub fn memorias(&self) -> impl Iterator<Item = &ModuleMemoria> {
        [&self.prefilter, &self.coarse_filter, &self.slow_sand_filter]
            .into_iter()
            .flatten()
            .chain(std::iter::once(&self.disinfection.memoria))
    }

    /// Failed checks as (source, check) pairs.
    pub fn alerts(&self) -> Vec<(&str, &ComplianceCheck)> {
        let mut alerts: Vec<(&str, &ComplianceCheck)> = self
            .memorias()
            .flat_map(|m| m.alerts().map(move |c| (m.unit_name.as_str(), c)))
            .collect();
        alerts.extend(
            self.removal
                .compliance
                .iter()
                .filter(|c| !c.passes())
                .map(|c| ("Treated water", c)),
        );
        alerts
    }

    /// Every check passes, treated water is potable and no pipe runs too fast.
    pub fn passes(&self) -> bool {
        self.alerts().is_empty()
            && self.disinfection.ct.compliant
            && self.intake_pipe.compliance_check != PipeCompliance::HighVelocity
            && self.wash_pipe.compliance_check != PipeCompliance::HighVelocity
    }
}

/// Run every calculation of the train.
///
/// # Arguments
///
/// * `input` - Flow, population, measured quality, present units, overrides
/// * `settings` - Fallback quality and default parameters
pub fn design_plant(input: &DesignInput, settings: &DesignSettings) -> PlantDesignReport {
    let flow_lps = input.flow_lps;
    let quality = input.quality.or(&settings.fallback_quality);
    let present = input.present_units();

    let coarse_params = input.coarse_filter.unwrap_or(settings.coarse_filter);
    let slow_params = input.slow_sand_filter.unwrap_or(settings.slow_sand_filter);
    let disinfection_params = input.disinfection.unwrap_or(settings.disinfection);

    let has = |unit: TreatmentUnit| present.contains(&unit);
    let prefilter = has(TreatmentUnit::Prefilter).then(|| size_prefilter(flow_lps, &quality));
    let coarse_filter = has(TreatmentUnit::CoarseFilter).then(|| size_coarse_filter(flow_lps, &quality, &coarse_params));
    let slow_sand_filter = has(TreatmentUnit::SlowSandFilter).then(|| size_slow_sand_filter(flow_lps, &slow_params));
    let disinfection = size_disinfection(flow_lps, input.population, &disinfection_params, Some(&quality));

    let removal = total_removal(
        quality.turbidity_or_default(),
        quality.fecal_coliforms.unwrap_or(DEFAULT_FECAL_COLIFORMS),
        has(TreatmentUnit::Prefilter),
        has(TreatmentUnit::CoarseFilter),
        has(TreatmentUnit::SlowSandFilter),
        quality.color,
    );

    let intake_pipe = select_diameter(flow_lps, PipeKind::GravityFlow);
    let wash_pipe = select_diameter(flow_lps * WASH_FLOW_FACTOR, PipeKind::WashDrain);
    let intake_diameter = settings.intake_diameter_in.unwrap_or(intake_pipe.diameter_in);
    let profile = build_profile(flow_lps, settings.start_elevation, intake_diameter);
    let total_head_m = total_head_required(&profile, settings.start_elevation);
    let valves = generate_valve_schedule(&input.units, flow_lps);

    let report = PlantDesignReport {
        flow: DesignFlow::from_lps(flow_lps),
        quality,
        prefilter,
        coarse_filter,
        slow_sand_filter,
        disinfection,
        removal,
        intake_pipe,
        wash_pipe,
        profile,
        total_head_m,
        valves,
    };
    log::info!(
        "designed {:.2} L/s plant with {} units: {} alerts",
        flow_lps,
        present.len(),
        report.alerts().len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_train_report() {
        let mut input = DesignInput::new(1.0, 800);
        input.quality = WaterQualitySnapshot::with_turbidity(40.0);
        let report = design_plant(&input, &DesignSettings::default());

        assert_eq!(report.memorias().count(), 4);
        assert_eq!(report.valves.len(), 8);
        assert_eq!(report.profile.len(), 5);
        assert_eq!(report.removal.stages.len(), 3);
        // measured turbidity kept, coliforms from the fallback
        assert_eq!(report.quality.turbidity, Some(40.0));
        assert_eq!(report.quality.fecal_coliforms, Some(DEFAULT_FECAL_COLIFORMS));
    }

    #[test]
    fn test_default_design_passes() {
        let mut input = DesignInput::new(1.0, 800);
        input.quality = WaterQualitySnapshot::with_turbidity(40.0);
        let report = design_plant(&input, &DesignSettings::default());
        assert!(report.alerts().is_empty(), "unexpected alerts: {:?}", report.alerts());
        assert!(report.passes());
    }

    #[test]
    fn test_missing_units_are_skipped() {
        let mut input = DesignInput::new(0.5, 300);
        input.units = vec!["fla".to_string(), "aerator".to_string()];
        let report = design_plant(&input, &DesignSettings::default());

        assert!(report.prefilter.is_none());
        assert!(report.coarse_filter.is_none());
        assert!(report.slow_sand_filter.is_some());
        // main inlet + slow sand inlet, outlet, drain
        assert_eq!(report.valves.len(), 4);
        assert_eq!(report.removal.stages.len(), 1);
    }

    #[test]
    fn test_input_overrides_settings() {
        let mut input = DesignInput::new(1.0, 500);
        input.coarse_filter = Some(FilterParams {
            vf: 0.45,
            num_units: 3,
            ratio_l_a: 3.0,
        });
        let report = design_plant(&input, &DesignSettings::default());
        let coarse = report.coarse_filter.unwrap();
        assert_eq!(coarse.param("vf_m_h"), Some(0.45));
        assert_eq!(coarse.result("units"), Some(3.0));
    }

    #[test]
    fn test_intake_diameter_setting_drives_profile() {
        let input = DesignInput::new(2.0, 1000);
        let narrow = DesignSettings {
            intake_diameter_in: Some(1.0),
            ..Default::default()
        };
        let wide = DesignSettings {
            intake_diameter_in: Some(4.0),
            ..Default::default()
        };
        let a = design_plant(&input, &narrow);
        let b = design_plant(&input, &wide);
        assert!(a.profile[0].head_loss > b.profile[0].head_loss);
    }

    #[test]
    fn test_validation() {
        assert!(DesignInput::new(1.0, 100).validate().is_ok());
        assert!(DesignInput::new(0.0, 100).validate().is_err());

        let mut input = DesignInput::new(1.0, 100);
        input.units.push("clarifier".to_string());
        assert!(matches!(input.validate(), Err(CalcError::UnknownUnit { .. })));
    }

    #[test]
    fn test_partial_settings_deserialize() {
        let settings: DesignSettings = serde_json::from_str(r#"{ "start_elevation": 250.0 }"#).unwrap();
        assert_eq!(settings.start_elevation, 250.0);
        assert_eq!(settings.coarse_filter.vf, 0.6);
    }

    #[test]
    fn test_total_head_spans_the_profile() {
        let settings = DesignSettings {
            start_elevation: 250.0,
            ..Default::default()
        };
        let report = design_plant(&DesignInput::new(1.0, 800), &settings);
        let storage = report.profile.last().unwrap();
        assert!((report.total_head_m - (250.0 - storage.water_level)).abs() < 1e-9);
        assert!(report.total_head_m > report.profile[0].head_loss);
    }

    #[test]
    fn test_from_json() {
        let input = DesignInput::from_json(
            r#"{ "flow_lps": 1.5, "population": 900, "quality": { "turbidity": 70.0 }, "units": ["fgac", "fla"] }"#,
        )
        .unwrap();
        assert_eq!(input.flow_lps, 1.5);
        assert_eq!(input.quality.turbidity, Some(70.0));
        assert_eq!(input.present_units().len(), 2);

        let err = DesignInput::from_json("{ \"population\": 10 }").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_input_defaults_to_full_train() {
        let input: DesignInput = serde_json::from_str(r#"{ "flow_lps": 2.0 }"#).unwrap();
        assert_eq!(input.units, ["pfd", "fgac", "fla"]);
        assert_eq!(input.population, 0);
        assert_eq!(input.present_units().len(), 3);
    }
}

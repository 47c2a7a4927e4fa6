//! # Piping and Valve Selection
//!
//! Commercial PVC diameter selection by velocity limits and the valve
//! schedule of the filtration train.
//!
//! ## Velocity Limits
//!
//! | Kind | Min (m/s) | Max (m/s) | Pressure class |
//! |------|-----------|-----------|----------------|
//! | Gravity flow | 0.6 | 2.5 | RDE 41 |
//! | Wash / drain | 1.5 | 5.0 | RDE 32.5 |
//!
//! Selection is a single ascending scan: the first commercial diameter whose
//! velocity does not exceed the maximum wins. A velocity under the minimum is
//! reported, not corrected.
//!
//! ## Example
//!
//! ```rust
//! use fime_core::piping::{generate_valve_schedule, select_diameter, PipeCompliance, PipeKind};
//!
//! let pipe = select_diameter(0.5, PipeKind::GravityFlow);
//! assert_eq!(pipe.diameter_in, 0.75);
//! assert_eq!(pipe.compliance_check, PipeCompliance::Ok);
//!
//! let valves = generate_valve_schedule(&["pfd", "fgac", "fla"], 0.5);
//! assert_eq!(valves.len(), 8);
//! assert_eq!(valves[0].id, "V-01");
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::equations::velocity;
use crate::materials::{CommercialDiameter, TreatmentUnit, COMMERCIAL_DIAMETERS};

/// Pipe material of every selected line
pub const PIPE_MATERIAL: &str = "PVC";

/// Wash and drain lines carry this multiple of the design flow
pub const WASH_FLOW_FACTOR: f64 = 3.0;

/// Service of a pipe line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipeKind {
    /// Gravity conveyance between units
    GravityFlow,
    /// Wash water and bottom drains
    WashDrain,
}

impl PipeKind {
    /// Minimum self-cleaning velocity (m/s)
    pub fn min_velocity(&self) -> f64 {
        match self {
            PipeKind::GravityFlow => 0.6,
            PipeKind::WashDrain => 1.5,
        }
    }

    /// Maximum admissible velocity (m/s)
    pub fn max_velocity(&self) -> f64 {
        match self {
            PipeKind::GravityFlow => 2.5,
            PipeKind::WashDrain => 5.0,
        }
    }

    pub fn pressure_class(&self) -> &'static str {
        match self {
            PipeKind::GravityFlow => "RDE 41",
            PipeKind::WashDrain => "RDE 32.5",
        }
    }
}

/// Velocity verdict of a selected pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipeCompliance {
    Ok,
    LowVelocity,
    HighVelocity,
}

/// A selected pipe line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeSpec {
    /// Flow carried (L/s)
    pub flow_lps: f64,
    /// Nominal diameter (in)
    pub diameter_in: f64,
    pub diameter_label: String,
    pub velocity_m_s: f64,
    pub material: String,
    pub pressure_class: String,
    pub compliance_check: PipeCompliance,
}

/// Select the smallest commercial diameter within the velocity limit.
///
/// Falls back to the largest stocked diameter flagged
/// [`PipeCompliance::HighVelocity`] when no size is large enough.
pub fn select_diameter(flow_lps: f64, kind: PipeKind) -> PipeSpec {
    let spec = |diameter: &CommercialDiameter, v: f64, compliance: PipeCompliance| PipeSpec {
        flow_lps,
        diameter_in: diameter.nominal_in,
        diameter_label: diameter.label.to_string(),
        velocity_m_s: v,
        material: PIPE_MATERIAL.to_string(),
        pressure_class: kind.pressure_class().to_string(),
        compliance_check: compliance,
    };

    for diameter in COMMERCIAL_DIAMETERS.iter() {
        let v = velocity(flow_lps, diameter.nominal_in);
        if v <= kind.max_velocity() {
            let compliance = if v >= kind.min_velocity() {
                PipeCompliance::Ok
            } else {
                PipeCompliance::LowVelocity
            };
            return spec(diameter, v, compliance);
        }
    }

    let largest = &COMMERCIAL_DIAMETERS[COMMERCIAL_DIAMETERS.len() - 1];
    let v = velocity(flow_lps, largest.nominal_in);
    log::warn!(
        "no commercial diameter keeps {:.2} L/s under {:.1} m/s; using {} at {:.2} m/s",
        flow_lps,
        kind.max_velocity(),
        largest.label,
        v
    );
    spec(largest, v, PipeCompliance::HighVelocity)
}

/// Valve type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValveKind {
    Gate,
    Butterfly,
    Check,
    Air,
}

impl fmt::Display for ValveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValveKind::Gate => "gate",
            ValveKind::Butterfly => "butterfly",
            ValveKind::Check => "check",
            ValveKind::Air => "air release",
        };
        write!(f, "{}", name)
    }
}

/// One entry of the valve schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveSpec {
    /// Sequential tag (`V-01`, `V-02`, ...)
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ValveKind,
    /// Nominal diameter (in)
    pub diameter_in: f64,
    pub function: String,
    pub location: String,
}

struct ValveSchedule {
    valves: Vec<ValveSpec>,
}

impl ValveSchedule {
    fn push(&mut self, kind: ValveKind, pipe: &PipeSpec, function: &str, location: &str) {
        self.valves.push(ValveSpec {
            id: format!("V-{:02}", self.valves.len() + 1),
            kind,
            diameter_in: pipe.diameter_in,
            function: function.to_string(),
            location: location.to_string(),
        });
    }
}

/// Valve schedule for the units present in a design.
///
/// Valves are emitted for the main inlet first, then for each present unit in
/// train order regardless of the order of `present_units`. Unknown keys are
/// skipped.
///
/// | Unit | Valves |
/// |------|--------|
/// | Pre-filter | inlet, wash |
/// | Coarse filter | inlet, wash |
/// | Slow sand filter | inlet, outlet, drain |
pub fn generate_valve_schedule<S: AsRef<str>>(present_units: &[S], flow_lps: f64) -> Vec<ValveSpec> {
    let mut present = BTreeSet::new();
    for key in present_units {
        match TreatmentUnit::from_key(key.as_ref()) {
            Some(unit) => {
                present.insert(unit);
            }
            None => log::warn!("valve schedule: ignoring unknown unit key '{}'", key.as_ref()),
        }
    }

    let process = select_diameter(flow_lps, PipeKind::GravityFlow);
    let wash = select_diameter(flow_lps * WASH_FLOW_FACTOR, PipeKind::WashDrain);

    let mut schedule = ValveSchedule { valves: Vec::new() };
    schedule.push(ValveKind::Gate, &process, "Main inlet shut-off", "Plant inlet");

    for unit in TreatmentUnit::ALL.into_iter().filter(|u| present.contains(u)) {
        let location = unit.display_name();
        match unit {
            TreatmentUnit::Prefilter | TreatmentUnit::CoarseFilter => {
                schedule.push(ValveKind::Gate, &process, "Inlet control", location);
                schedule.push(ValveKind::Gate, &wash, "Wash drain", location);
            }
            TreatmentUnit::SlowSandFilter => {
                schedule.push(ValveKind::Gate, &process, "Inlet control", location);
                schedule.push(ValveKind::Gate, &process, "Treated water outlet", location);
                schedule.push(ValveKind::Gate, &wash, "Bottom drain", location);
            }
        }
    }

    log::debug!("valve schedule: {} valves for {} units", schedule.valves.len(), present.len());
    schedule.valves
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_liter_gravity() {
        let pipe = select_diameter(0.5, PipeKind::GravityFlow);
        assert_eq!(pipe.diameter_in, 0.75);
        assert_eq!(pipe.diameter_label, "3/4\"");
        assert!(pipe.velocity_m_s >= 0.6 && pipe.velocity_m_s <= 2.5);
        assert_eq!(pipe.pressure_class, "RDE 41");
        assert_eq!(pipe.material, "PVC");
    }

    #[test]
    fn test_wash_drain_limits() {
        // 1.5 L/s: 3/4" gives 5.26 m/s, 1" gives 2.96 m/s
        let pipe = select_diameter(1.5, PipeKind::WashDrain);
        assert_eq!(pipe.diameter_in, 1.0);
        assert_eq!(pipe.compliance_check, PipeCompliance::Ok);
        assert_eq!(pipe.pressure_class, "RDE 32.5");
    }

    #[test]
    fn test_tiny_flow_is_low_velocity() {
        let pipe = select_diameter(0.01, PipeKind::GravityFlow);
        assert_eq!(pipe.diameter_in, 0.5);
        assert_eq!(pipe.compliance_check, PipeCompliance::LowVelocity);
    }

    #[test]
    fn test_huge_flow_falls_back_to_largest() {
        // 12" at 2.5 m/s carries about 182 L/s
        let pipe = select_diameter(500.0, PipeKind::GravityFlow);
        assert_eq!(pipe.diameter_in, 12.0);
        assert_eq!(pipe.compliance_check, PipeCompliance::HighVelocity);
        assert!(pipe.velocity_m_s > 2.5);
    }

    #[test]
    fn test_compliance_serializes_screaming() {
        let json = serde_json::to_string(&PipeCompliance::HighVelocity).unwrap();
        assert_eq!(json, "\"HIGH_VELOCITY\"");
        let json = serde_json::to_string(&PipeKind::WashDrain).unwrap();
        assert_eq!(json, "\"WASH_DRAIN\"");
    }

    #[test]
    fn test_full_train_schedule() {
        let valves = generate_valve_schedule(&["pfd", "fgac", "fla"], 1.0);
        assert_eq!(valves.len(), 8);
        let ids: Vec<&str> = valves.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["V-01", "V-02", "V-03", "V-04", "V-05", "V-06", "V-07", "V-08"]);
        assert_eq!(valves[0].location, "Plant inlet");
        assert_eq!(valves[7].function, "Bottom drain");
    }

    #[test]
    fn test_schedule_uses_train_order_and_ignores_unknown() {
        let valves = generate_valve_schedule(&["fla", "clarifier", "pfd"], 1.0);
        assert_eq!(valves.len(), 6);
        assert_eq!(valves[1].location, TreatmentUnit::Prefilter.display_name());
        assert_eq!(valves[3].location, TreatmentUnit::SlowSandFilter.display_name());
    }

    #[test]
    fn test_wash_valves_sized_for_triple_flow() {
        let valves = generate_valve_schedule(&["pfd"], 1.5);
        let wash = select_diameter(4.5, PipeKind::WashDrain);
        assert_eq!(valves[2].function, "Wash drain");
        assert_eq!(valves[2].diameter_in, wash.diameter_in);
    }

    #[test]
    fn test_empty_schedule_has_main_inlet() {
        let valves = generate_valve_schedule::<&str>(&[], 1.0);
        assert_eq!(valves.len(), 1);
        assert_eq!(valves[0].kind, ValveKind::Gate);
    }
}

//! # Hydraulic Primitives
//!
//! Stand-alone pipe hydraulics used by the hydraulic profile and the piping
//! selector.
//!
//! ## Notation
//!
//! - `L` = Pipe length (m)
//! - `Q` = Flow (m³/s), converted from L/s
//! - `D` = Internal diameter (m), converted from nominal inches
//! - `C` = Hazen-Williams roughness coefficient
//! - `v` = Mean velocity (m/s)
//! - `K` = Minor-loss coefficient of a fitting
//!
//! ## Domain Guards
//!
//! Every function returns exactly `0.0` when flow, length or diameter is
//! `≤ 0` (the formulas diverge or are undefined there). Callers never see NaN
//! or infinity from these guards.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::units::{lps_to_m3s, Inches, Meters, GRAVITY};

/// Hazen-Williams C assumed when the caller has no better value (PVC, aged)
pub const DEFAULT_C_FACTOR: f64 = 140.0;

// =============================================================================
// VELOCITY
// =============================================================================

/// Mean velocity in a full circular pipe
///
/// # Formula
/// v = Q / (π·(D/2)²)
///
/// Returns 0 when flow or diameter is ≤ 0.
pub fn velocity(flow_lps: f64, diameter_inch: f64) -> f64 {
    if flow_lps <= 0.0 || diameter_inch <= 0.0 {
        return 0.0;
    }
    let d_m = Meters::from(Inches(diameter_inch)).0;
    let area = PI * (d_m / 2.0).powi(2);
    lps_to_m3s(flow_lps) / area
}

// =============================================================================
// FRICTION LOSS
// =============================================================================

/// Pipe friction loss by Hazen-Williams (SI form)
///
/// # Formula
/// ```text
/// hf = 10.67 · L · Q^1.852 / (C^1.852 · D^4.87)
/// ```
///
/// # Arguments
/// * `length_m` - Pipe length (m)
/// * `flow_lps` - Flow (L/s)
/// * `diameter_inch` - Nominal diameter (in)
/// * `c_factor` - Hazen-Williams C (use [`DEFAULT_C_FACTOR`] when unknown)
///
/// # Returns
/// Head loss (m). Exactly 0 when length, flow or diameter is ≤ 0.
pub fn friction_loss(length_m: f64, flow_lps: f64, diameter_inch: f64, c_factor: f64) -> f64 {
    if length_m <= 0.0 || flow_lps <= 0.0 || diameter_inch <= 0.0 {
        return 0.0;
    }
    let q = lps_to_m3s(flow_lps);
    let d = Meters::from(Inches(diameter_inch)).0;
    10.67 * length_m * q.powf(1.852) / (c_factor.powf(1.852) * d.powf(4.87))
}

// =============================================================================
// MINOR LOSSES
// =============================================================================

/// Sum of fitting losses
///
/// # Formula
/// hm = ΣK · v²/(2g)
///
/// Returns 0 when flow or diameter is ≤ 0 or `k_values` is empty.
pub fn minor_losses(flow_lps: f64, diameter_inch: f64, k_values: &[f64]) -> f64 {
    if flow_lps <= 0.0 || diameter_inch <= 0.0 || k_values.is_empty() {
        return 0.0;
    }
    let v = velocity(flow_lps, diameter_inch);
    let k_total: f64 = k_values.iter().sum();
    k_total * v.powi(2) / (2.0 * GRAVITY)
}

/// Pipe fittings and accessories with tabulated K values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fitting {
    Elbow90,
    Elbow45,
    TeeStraight,
    TeeBranch,
    GateValveOpen,
    ButterflyValveOpen,
    EntranceSharp,
    ExitSubmerged,
    ScreenClean,
}

impl Fitting {
    pub const ALL: [Fitting; 9] = [
        Fitting::Elbow90,
        Fitting::Elbow45,
        Fitting::TeeStraight,
        Fitting::TeeBranch,
        Fitting::GateValveOpen,
        Fitting::ButterflyValveOpen,
        Fitting::EntranceSharp,
        Fitting::ExitSubmerged,
        Fitting::ScreenClean,
    ];

    /// Minor-loss coefficient K
    pub fn k(&self) -> f64 {
        match self {
            Fitting::Elbow90 => 0.9,
            Fitting::Elbow45 => 0.4,
            Fitting::TeeStraight => 0.2,
            Fitting::TeeBranch => 2.0,
            Fitting::GateValveOpen => 0.2,
            Fitting::ButterflyValveOpen => 0.3,
            Fitting::EntranceSharp => 0.5,
            Fitting::ExitSubmerged => 1.0,
            Fitting::ScreenClean => 0.1,
        }
    }

    /// Canonical accessory name
    pub fn name(&self) -> &'static str {
        match self {
            Fitting::Elbow90 => "elbow_90",
            Fitting::Elbow45 => "elbow_45",
            Fitting::TeeStraight => "tee_straight",
            Fitting::TeeBranch => "tee_branch",
            Fitting::GateValveOpen => "gate_valve_open",
            Fitting::ButterflyValveOpen => "butterfly_valve_open",
            Fitting::EntranceSharp => "entrance_sharp",
            Fitting::ExitSubmerged => "exit_submerged",
            Fitting::ScreenClean => "screen_clean",
        }
    }

    /// Resolve an accessory name. Spanish trade names are accepted as aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let fitting = match name.trim().to_ascii_lowercase().as_str() {
            "elbow_90" | "codo_90" => Fitting::Elbow90,
            "elbow_45" | "codo_45" => Fitting::Elbow45,
            "tee_straight" | "tee_paso_directo" => Fitting::TeeStraight,
            "tee_branch" | "tee_paso_lateral" => Fitting::TeeBranch,
            "gate_valve_open" | "valvula_compuerta" => Fitting::GateValveOpen,
            "butterfly_valve_open" | "valvula_mariposa" => Fitting::ButterflyValveOpen,
            "entrance_sharp" | "entrada_borda_aguda" => Fitting::EntranceSharp,
            "exit_submerged" | "salida_sumergida" => Fitting::ExitSubmerged,
            "screen_clean" | "rejilla_limpia" => Fitting::ScreenClean,
            _ => return None,
        };
        Some(fitting)
    }
}

/// K value for a named accessory; unknown names resolve to 0.
pub fn k_value(accessory_name: &str) -> f64 {
    Fitting::from_name(accessory_name).map_or(0.0, |f| f.k())
}

// =============================================================================
// PIPE SEGMENTS
// =============================================================================

/// One pipe run with its fittings. Input descriptor, not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeSegment {
    pub length_m: f64,
    /// Nominal diameter (in)
    pub diameter_in: f64,
    pub material: String,
    /// Hazen-Williams C
    pub c_factor: f64,
    pub flow_lps: f64,
    /// Accessory names, resolved through [`k_value`]
    pub fittings: Vec<String>,
}

/// Head losses across one [`PipeSegment`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentLosses {
    /// Mean velocity (m/s)
    pub velocity_m_s: f64,
    /// Friction loss (m)
    pub friction_m: f64,
    /// Fitting losses (m)
    pub minor_m: f64,
}

impl SegmentLosses {
    pub fn total_m(&self) -> f64 {
        self.friction_m + self.minor_m
    }
}

/// Friction plus fitting losses for a pipe run.
pub fn segment_losses(segment: &PipeSegment) -> SegmentLosses {
    let k_values: Vec<f64> = segment.fittings.iter().map(|name| k_value(name)).collect();
    SegmentLosses {
        velocity_m_s: velocity(segment.flow_lps, segment.diameter_in),
        friction_m: friction_loss(segment.length_m, segment.flow_lps, segment.diameter_in, segment.c_factor),
        minor_m: minor_losses(segment.flow_lps, segment.diameter_in, &k_values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_velocity() {
        // 1 L/s in 2": A = π(0.0254)² = 2.0268e-3 m², v = 0.4934 m/s
        assert_relative_eq!(velocity(1.0, 2.0), 0.4934, epsilon = 1e-3);
        assert_eq!(velocity(1.0, 0.0), 0.0);
        assert_eq!(velocity(-1.0, 2.0), 0.0);
    }

    #[test]
    fn test_friction_loss_hand_check() {
        // L = 100 m, Q = 2 L/s, D = 2" (0.0508 m), C = 140
        // hf = 10.67·100·0.002^1.852 / (140^1.852 · 0.0508^4.87) ≈ 2.28 m
        let hf = friction_loss(100.0, 2.0, 2.0, DEFAULT_C_FACTOR);
        assert_relative_eq!(hf, 2.28, epsilon = 0.01);
    }

    #[test]
    fn test_friction_loss_guards() {
        assert_eq!(friction_loss(0.0, 1.0, 2.0, 140.0), 0.0);
        assert_eq!(friction_loss(50.0, 0.0, 2.0, 140.0), 0.0);
        assert_eq!(friction_loss(50.0, 1.0, 0.0, 140.0), 0.0);
        assert_eq!(friction_loss(-5.0, 1.0, 2.0, 140.0), 0.0);
    }

    #[test]
    fn test_smoother_pipe_loses_less() {
        let rough = friction_loss(50.0, 1.0, 2.0, 100.0);
        let smooth = friction_loss(50.0, 1.0, 2.0, 150.0);
        assert!(smooth < rough);
    }

    #[test]
    fn test_minor_losses() {
        let v = velocity(1.0, 2.0);
        let expected = 1.4 * v * v / (2.0 * GRAVITY);
        assert_relative_eq!(minor_losses(1.0, 2.0, &[0.9, 0.5]), expected, epsilon = 1e-12);
        assert_eq!(minor_losses(1.0, 2.0, &[]), 0.0);
        assert_eq!(minor_losses(0.0, 2.0, &[0.9]), 0.0);
    }

    #[test]
    fn test_k_value_table() {
        assert_eq!(k_value("elbow_90"), 0.9);
        assert_eq!(k_value("codo_45"), 0.4);
        assert_eq!(k_value("tee_branch"), 2.0);
        assert_eq!(k_value("entrance_sharp"), 0.5);
        assert_eq!(k_value("exit_submerged"), 1.0);
        assert_eq!(k_value("screen_clean"), 0.1);
        assert_eq!(k_value("mystery_fitting"), 0.0);
    }

    #[test]
    fn test_fitting_names_resolve() {
        for fitting in Fitting::ALL {
            assert_eq!(Fitting::from_name(fitting.name()), Some(fitting));
        }
    }

    #[test]
    fn test_segment_losses_sum_parts() {
        let segment = PipeSegment {
            length_m: 50.0,
            diameter_in: 2.0,
            material: "PVC".to_string(),
            c_factor: 150.0,
            flow_lps: 1.0,
            fittings: vec!["entrance_sharp".into(), "elbow_90".into(), "unknown".into()],
        };
        let losses = segment_losses(&segment);
        assert_relative_eq!(losses.friction_m, friction_loss(50.0, 1.0, 2.0, 150.0));
        assert_relative_eq!(losses.minor_m, minor_losses(1.0, 2.0, &[0.5, 0.9]), epsilon = 1e-12);
        assert_relative_eq!(losses.total_m(), losses.friction_m + losses.minor_m);
    }
}

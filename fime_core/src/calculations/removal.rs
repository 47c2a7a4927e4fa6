//! # Whole-Train Removal Estimate
//!
//! Chained-multiplication estimate of the water leaving the filtration train.
//! Each present stage multiplies the remaining turbidity and color by a fixed
//! factor and adds a fixed log removal of fecal coliforms. The factors are
//! design-guide figures, not a transport model.
//!
//! | Stage | Turbidity × | Color × | Coliforms |
//! |-------|-------------|---------|-----------|
//! | Pre-filter | 0.50 | 0.80 | +0.5 log |
//! | Coarse filter | 0.40 | 0.70 | +1.5 log |
//! | Slow sand filter | 0.05 | 0.70 | +2.0 log |
//!
//! Potability limits: turbidity ≤ 2 NTU, color ≤ 15 UC (when tracked),
//! residual fecal coliforms < 1 CFU/100 mL.

use serde::{Deserialize, Serialize};

use crate::equations::NormReference;
use crate::materials::TreatmentUnit;

use super::ComplianceCheck;

const TURBIDITY_LIMIT_NTU: f64 = 2.0;
const COLOR_LIMIT_UC: f64 = 15.0;
const COLIFORM_LIMIT: f64 = 1.0;

/// (turbidity factor, color factor, log removal) of a stage
fn stage_factors(unit: TreatmentUnit) -> (f64, f64, f64) {
    match unit {
        TreatmentUnit::Prefilter => (0.50, 0.80, 0.5),
        TreatmentUnit::CoarseFilter => (0.40, 0.70, 1.5),
        TreatmentUnit::SlowSandFilter => (0.05, 0.70, 2.0),
    }
}

/// Water leaving one stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageRemoval {
    pub unit: TreatmentUnit,
    pub turbidity_out: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_out: Option<f64>,
    /// Accumulated log removal after this stage
    pub log_removal: f64,
}

/// Estimate for the whole train.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalEstimate {
    /// One entry per present stage, in train order
    pub stages: Vec<StageRemoval>,
    pub turbidity_out: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_out: Option<f64>,
    pub log_removal: f64,
    /// Residual fecal coliforms (CFU/100 mL)
    pub coliforms_out: f64,
    pub compliance: Vec<ComplianceCheck>,
}

impl RemovalEstimate {
    /// Treated water meets every tracked potability limit
    pub fn is_potable(&self) -> bool {
        self.compliance.iter().all(ComplianceCheck::passes)
    }
}

/// Estimate treated-water quality for the stages present in a design.
///
/// # Arguments
///
/// * `turbidity` - Raw turbidity (NTU)
/// * `coliforms` - Raw fecal coliforms (CFU/100 mL)
/// * `has_prefilter`, `has_coarse`, `has_slow` - Stages present
/// * `color` - Raw color (UC); the color limit is checked only when given
pub fn total_removal(
    turbidity: f64,
    coliforms: f64,
    has_prefilter: bool,
    has_coarse: bool,
    has_slow: bool,
    color: Option<f64>,
) -> RemovalEstimate {
    let present = [has_prefilter, has_coarse, has_slow];
    let mut turbidity_out = turbidity;
    let mut color_out = color;
    let mut log_removal = 0.0;
    let mut stages = Vec::new();

    for unit in TreatmentUnit::ALL
        .into_iter()
        .zip(present)
        .filter_map(|(unit, is_present)| is_present.then_some(unit))
    {
        let (turbidity_factor, color_factor, log) = stage_factors(unit);
        turbidity_out *= turbidity_factor;
        color_out = color_out.map(|c| c * color_factor);
        log_removal += log;
        stages.push(StageRemoval {
            unit,
            turbidity_out,
            color_out,
            log_removal,
        });
    }

    let coliforms_out = coliforms / 10f64.powf(log_removal);

    let mut compliance = vec![ComplianceCheck::at_most(
        "Treated turbidity",
        turbidity_out,
        TURBIDITY_LIMIT_NTU,
        "NTU",
        2,
    )
    .cite(NormReference::Res0330 { topic: "drinking water quality" })];
    if let Some(c) = color_out {
        compliance.push(
            ComplianceCheck::at_most("Treated color", c, COLOR_LIMIT_UC, "UC", 1)
                .cite(NormReference::Res0330 { topic: "drinking water quality" }),
        );
    }
    compliance.push(
        ComplianceCheck::below("Residual fecal coliforms", coliforms_out, COLIFORM_LIMIT, "CFU/100 mL", 2)
            .cite(NormReference::Res0330 { topic: "drinking water quality" }),
    );

    let estimate = RemovalEstimate {
        stages,
        turbidity_out,
        color_out,
        log_removal,
        coliforms_out,
        compliance,
    };
    if !estimate.is_potable() {
        log::warn!(
            "filtration train does not reach potability: turbidity {:.2} NTU, coliforms {:.2}",
            estimate.turbidity_out,
            estimate.coliforms_out
        );
    }
    estimate
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_full_train() {
        let r = total_removal(100.0, 1000.0, true, true, true, Some(60.0));
        // 100 × 0.5 × 0.4 × 0.05 = 1.0 NTU
        assert_relative_eq!(r.turbidity_out, 1.0, epsilon = 1e-12);
        // 60 × 0.8 × 0.7 × 0.7 = 23.52 UC
        assert_relative_eq!(r.color_out.unwrap(), 23.52, epsilon = 1e-9);
        assert_relative_eq!(r.log_removal, 4.0, epsilon = 1e-12);
        assert_relative_eq!(r.coliforms_out, 0.1, epsilon = 1e-12);
        assert_eq!(r.stages.len(), 3);
        // color fails, everything else passes
        assert!(!r.is_potable());
        assert_eq!(r.compliance.iter().filter(|c| !c.passes()).count(), 1);
    }

    #[test]
    fn test_color_not_tracked() {
        let r = total_removal(40.0, 500.0, true, true, true, None);
        assert!(r.color_out.is_none());
        assert_eq!(r.compliance.len(), 2);
        assert!(r.is_potable());
    }

    #[test]
    fn test_missing_slow_filter_fails() {
        let r = total_removal(40.0, 500.0, true, true, false, None);
        assert_relative_eq!(r.turbidity_out, 8.0, epsilon = 1e-12);
        assert_relative_eq!(r.log_removal, 2.0, epsilon = 1e-12);
        assert!(!r.is_potable());
    }

    #[test]
    fn test_no_stages_passes_raw_water_through() {
        let r = total_removal(5.0, 10.0, false, false, false, None);
        assert!(r.stages.is_empty());
        assert_eq!(r.turbidity_out, 5.0);
        assert_eq!(r.coliforms_out, 10.0);
    }

    #[test]
    fn test_stage_order_is_train_order() {
        let r = total_removal(50.0, 100.0, true, false, true, None);
        let units: Vec<_> = r.stages.iter().map(|s| s.unit).collect();
        assert_eq!(units, [TreatmentUnit::Prefilter, TreatmentUnit::SlowSandFilter]);
        assert_relative_eq!(r.stages[0].turbidity_out, 25.0, epsilon = 1e-12);
    }
}

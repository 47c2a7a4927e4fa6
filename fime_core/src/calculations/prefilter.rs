//! # Dynamic Pre-Filter (PFD)
//!
//! Sizes the dynamic gravel pre-filter that protects the downstream units
//! from turbidity peaks.
//!
//! ## Assumptions
//!
//! - Filtration velocity chosen from the raw-water turbidity tier
//! - Two units when turbidity exceeds 50 NTU, otherwise one
//! - Plan aspect ratio L:W = 3:1
//! - Bed height from the granulometry catalog, porosity 0.38
//! - Clean-bed head loss = 0.15 m through media + 0.05 m in fittings
//!
//! ## Example
//!
//! ```rust
//! use fime_core::calculations::size_prefilter;
//! use fime_core::quality::WaterQualitySnapshot;
//!
//! let m = size_prefilter(2.0, &WaterQualitySnapshot::with_turbidity(120.0));
//! assert_eq!(m.param("vf_m_h"), Some(3.0));
//! assert_eq!(m.result("units"), Some(2.0));
//! assert!(m.passes());
//! ```

use crate::equations::NormReference;
use crate::materials::{granulometry_for, TreatmentUnit};
use crate::quality::WaterQualitySnapshot;
use crate::units::DesignFlow;

use super::{fmt_num, per_unit, plan_geometry, retention_min, ComplianceCheck, MemoriaBuilder, ModuleMemoria};

/// Plan aspect ratio L:W
const RATIO_L_A: f64 = 3.0;

/// Porosity of the gravel bed
const POROSITY: f64 = 0.38;

/// Clean-bed head loss through the media (m)
const HF_MEDIA_M: f64 = 0.15;

/// Head loss in inlet/outlet fittings (m)
const HF_FITTINGS_M: f64 = 0.05;

/// Admissible filtration velocity range (m/h)
const VF_MIN: f64 = 2.0;
const VF_MAX: f64 = 5.0;

/// Maximum admissible clean-bed head loss (m)
const HF_MAX_M: f64 = 0.30;

/// Filtration velocity for a raw-water turbidity (m/h)
///
/// - turbidity > 100 NTU → 3 m/h
/// - turbidity > 50 NTU → 4 m/h
/// - otherwise → 5 m/h
pub fn filtration_velocity_for(turbidity_ntu: f64) -> f64 {
    if turbidity_ntu > 100.0 {
        3.0
    } else if turbidity_ntu > 50.0 {
        4.0
    } else {
        5.0
    }
}

/// Number of pre-filter units for a raw-water turbidity
pub fn units_for(turbidity_ntu: f64) -> u32 {
    if turbidity_ntu > 50.0 {
        2
    } else {
        1
    }
}

/// Size the dynamic pre-filter.
///
/// # Arguments
///
/// * `flow_lps` - Design flow (L/s)
/// * `quality` - Raw water quality; turbidity defaults to 50 NTU
pub fn size_prefilter(flow_lps: f64, quality: &WaterQualitySnapshot) -> ModuleMemoria {
    let flow = DesignFlow::from_lps(flow_lps);
    let granulometry = granulometry_for(TreatmentUnit::Prefilter);
    let turbidity = quality.turbidity_or_default();

    let vf = filtration_velocity_for(turbidity);
    let n = units_for(turbidity);
    let q_unit = per_unit(flow.flow_m3h, n);
    let geom = plan_geometry(q_unit, vf, RATIO_L_A);
    let bed_height = granulometry.bed_height_m;
    let bed_volume = geom.area_m2 * bed_height;
    let retention = retention_min(bed_volume * POROSITY, q_unit);
    let surface_load = if geom.area_m2 > 0.0 { q_unit / geom.area_m2 * 24.0 } else { 0.0 };
    let interparticle_velocity = vf / POROSITY;
    let head_loss = HF_MEDIA_M + HF_FITTINGS_M;

    let mut b = MemoriaBuilder::new(TreatmentUnit::Prefilter.display_name(), flow);
    b.param("flow_lps", flow_lps, "L/s")
        .param("turbidity_ntu", turbidity, "NTU")
        .param("vf_m_h", vf, "m/h")
        .param("ratio_l_a", RATIO_L_A, "-")
        .param("porosity", POROSITY, "-")
        .param("bed_height_m", bed_height, "m");

    b.step("Q", "Q = Q_lps × 3.6", format!("{} × 3.6", fmt_num(flow_lps, 2)), flow.flow_m3h, 2, "m³/h");
    b.step(
        "T0",
        "Raw water turbidity (50 NTU if not measured)",
        fmt_num(turbidity, 1),
        turbidity,
        1,
        "NTU",
    );
    b.step(
        "Vf",
        "Vf = 3 if T0 > 100; 4 if T0 > 50; else 5",
        format!("T0 = {} NTU", fmt_num(turbidity, 1)),
        vf,
        2,
        "m/h",
    )
    .cite(NormReference::Cinara { topic: "dynamic pre-filter velocities" });
    b.step("N", "N = 2 if T0 > 50; else 1", format!("T0 = {} NTU", fmt_num(turbidity, 1)), n as f64, 0, "units");
    b.step(
        "q",
        "q = Q / N",
        format!("{} / {}", fmt_num(flow.flow_m3h, 2), n),
        q_unit,
        3,
        "m³/h",
    );
    b.step("A", "A = q / Vf", format!("{} / {}", fmt_num(q_unit, 3), fmt_num(vf, 2)), geom.area_m2, 2, "m²");
    b.step(
        "W",
        "W = √(A / 3)",
        format!("√({} / 3)", fmt_num(geom.area_m2, 2)),
        geom.width_m,
        2,
        "m",
    );
    b.step("L", "L = 3 · W", format!("3 × {}", fmt_num(geom.width_m, 2)), geom.length_m, 2, "m");
    b.step(
        "Vbed",
        "Vbed = A · Hbed",
        format!("{} × {}", fmt_num(geom.area_m2, 2), fmt_num(bed_height, 2)),
        bed_volume,
        2,
        "m³",
    );
    b.step(
        "TRH",
        "TRH = Vbed · ε / q · 60",
        format!("{} × {} / {} × 60", fmt_num(bed_volume, 2), fmt_num(POROSITY, 2), fmt_num(q_unit, 3)),
        retention,
        1,
        "min",
    );
    b.step(
        "CHS",
        "CHS = q / A · 24",
        format!("{} / {} × 24", fmt_num(q_unit, 3), fmt_num(geom.area_m2, 2)),
        surface_load,
        1,
        "m³/m²·d",
    );
    b.step(
        "vi",
        "vi = Vf / ε",
        format!("{} / {}", fmt_num(vf, 2), fmt_num(POROSITY, 2)),
        interparticle_velocity,
        2,
        "m/h",
    )
    .cite(NormReference::Hydraulics);
    b.step(
        "hf",
        "hf = hf_media + hf_fittings",
        format!("{} + {}", fmt_num(HF_MEDIA_M, 2), fmt_num(HF_FITTINGS_M, 2)),
        head_loss,
        2,
        "m",
    )
    .cite(NormReference::Cinara { topic: "clean-bed head loss" });

    b.result("units", n as f64, "units")
        .result("unit_flow_m3h", q_unit, "m³/h")
        .result("area_m2", geom.area_m2, "m²")
        .result("width_m", geom.width_m, "m")
        .result("length_m", geom.length_m, "m")
        .result("bed_volume_m3", bed_volume, "m³")
        .result("retention_min", retention, "min")
        .result("surface_load_m3_m2_d", surface_load, "m³/m²·d")
        .result("interparticle_velocity_m_h", interparticle_velocity, "m/h")
        .result("head_loss_m", head_loss, "m")
        .result("structure_height_m", granulometry.total_structure_height_m(), "m");

    b.check(
        ComplianceCheck::range("Filtration velocity", vf, VF_MIN, VF_MAX, "m/h", 2)
            .cite(NormReference::Cinara { topic: "dynamic pre-filter velocities" }),
    )
    .check(
        ComplianceCheck::at_most("Clean-bed head loss", head_loss, HF_MAX_M, "m", 2)
            .cite(NormReference::Cinara { topic: "clean-bed head loss" }),
    );
    b.granulometry(granulometry);

    log::debug!(
        "pre-filter: Q={:.2} L/s T0={:.1} NTU -> {} x {:.2} m² at {:.1} m/h",
        flow_lps,
        turbidity,
        n,
        geom.area_m2,
        vf
    );
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_velocity_tiers() {
        assert_eq!(filtration_velocity_for(150.0), 3.0);
        assert_eq!(filtration_velocity_for(100.0), 4.0);
        assert_eq!(filtration_velocity_for(60.0), 4.0);
        assert_eq!(filtration_velocity_for(50.0), 5.0);
        assert_eq!(filtration_velocity_for(10.0), 5.0);
    }

    #[test]
    fn test_unit_count() {
        assert_eq!(units_for(51.0), 2);
        assert_eq!(units_for(50.0), 1);
    }

    #[test]
    fn test_default_turbidity_is_used() {
        let m = size_prefilter(1.0, &WaterQualitySnapshot::default());
        assert_eq!(m.param("turbidity_ntu"), Some(50.0));
        assert_eq!(m.param("vf_m_h"), Some(5.0));
        assert_eq!(m.result("units"), Some(1.0));
    }

    #[test]
    fn test_geometry() {
        // Q = 1.8 m³/h, one unit at 5 m/h → A = 0.36 m², W = √0.12, L = 3W
        let m = size_prefilter(0.5, &WaterQualitySnapshot::with_turbidity(20.0));
        let area = m.result("area_m2").unwrap();
        let width = m.result("width_m").unwrap();
        let length = m.result("length_m").unwrap();
        assert_relative_eq!(area, 0.36, epsilon = 1e-12);
        assert_relative_eq!(length, 3.0 * width, epsilon = 1e-12);
        assert_relative_eq!(width * length, area, epsilon = 1e-12);
    }

    #[test]
    fn test_retention_and_interparticle_velocity() {
        let m = size_prefilter(0.5, &WaterQualitySnapshot::with_turbidity(20.0));
        // TRH = A·0.60·0.38 / q · 60 = 0.6·0.38/5·60 = 2.736 min (area cancels)
        assert_relative_eq!(m.result("retention_min").unwrap(), 2.736, epsilon = 1e-9);
        assert_relative_eq!(m.result("interparticle_velocity_m_h").unwrap(), 5.0 / 0.38, epsilon = 1e-12);
        assert_relative_eq!(m.result("surface_load_m3_m2_d").unwrap(), 120.0, epsilon = 1e-9);
        assert_eq!(
            m.step("vi").unwrap().reference.as_deref(),
            Some("Fundamental hydraulics")
        );
    }

    #[test]
    fn test_compliance_passes_for_every_tier() {
        for turbidity in [10.0, 75.0, 250.0] {
            let m = size_prefilter(1.5, &WaterQualitySnapshot::with_turbidity(turbidity));
            assert!(m.passes(), "turbidity {}", turbidity);
            assert_eq!(m.compliance_for("Clean-bed head loss").unwrap().value, "0.20");
        }
    }

    #[test]
    fn test_steps_follow_derivation_order() {
        let m = size_prefilter(1.0, &WaterQualitySnapshot::default());
        let order: Vec<&str> = m.steps.iter().map(|s| s.variable.as_str()).collect();
        assert_eq!(
            order,
            ["Q", "T0", "Vf", "N", "q", "A", "W", "L", "Vbed", "TRH", "CHS", "vi", "hf"]
        );
    }

    #[test]
    fn test_granulometry_attached() {
        let m = size_prefilter(1.0, &WaterQualitySnapshot::default());
        let g = m.granulometry.as_ref().unwrap();
        assert_eq!(g.unit, TreatmentUnit::Prefilter);
        assert_eq!(m.param("bed_height_m"), Some(g.bed_height_m));
    }
}

//! # Upflow Coarse Filter in Layers (FGAC)
//!
//! Sizes the upflow gravel filter from caller-chosen velocity, unit count and
//! aspect ratio.
//!
//! ## Assumptions
//!
//! - Bed height and structure height from the granulometry catalog
//! - Porosity 0.36 for retention time
//! - Head loss = 0.30 m through media + 0.10 m in fittings and underdrain
//!
//! ## Example
//!
//! ```rust
//! use fime_core::calculations::{size_coarse_filter, FilterParams};
//! use fime_core::quality::WaterQualitySnapshot;
//!
//! let params = FilterParams { vf: 0.6, num_units: 2, ratio_l_a: 4.0 };
//! let m = size_coarse_filter(0.5, &WaterQualitySnapshot::with_turbidity(30.0), &params);
//!
//! let velocity = m.compliance_for("Filtration velocity").unwrap();
//! assert_eq!(velocity.value, "0.60");
//! assert!(velocity.passes());
//! ```

use crate::equations::NormReference;
use crate::materials::{granulometry_for, TreatmentUnit};
use crate::quality::WaterQualitySnapshot;
use crate::units::DesignFlow;

use super::{
    fmt_num, per_unit, plan_geometry, retention_min, ComplianceCheck, FilterParams, MemoriaBuilder, ModuleMemoria,
};

/// Porosity of the gravel bed
const POROSITY: f64 = 0.36;

/// Head loss through the media (m)
const HF_MEDIA_M: f64 = 0.30;

/// Head loss in fittings and underdrain (m)
const HF_FITTINGS_M: f64 = 0.10;

/// Admissible filtration velocity range (m/h)
const VF_MIN: f64 = 0.3;
const VF_MAX: f64 = 0.6;

/// Maximum plan area per unit (m²)
const AREA_MAX_M2: f64 = 20.0;

/// Minimum number of units (one can be washed while the other runs)
const MIN_UNITS: u32 = 2;

/// Size the upflow coarse filter.
///
/// # Arguments
///
/// * `flow_lps` - Design flow (L/s)
/// * `quality` - Raw water quality (turbidity reported for reference)
/// * `params` - Velocity (m/h), unit count and L:W ratio
pub fn size_coarse_filter(flow_lps: f64, quality: &WaterQualitySnapshot, params: &FilterParams) -> ModuleMemoria {
    let flow = DesignFlow::from_lps(flow_lps);
    let granulometry = granulometry_for(TreatmentUnit::CoarseFilter);
    let turbidity = quality.turbidity_or_default();
    let FilterParams { vf, num_units, ratio_l_a } = *params;

    let q_unit = per_unit(flow.flow_m3h, num_units);
    let geom = plan_geometry(q_unit, vf, ratio_l_a);
    let plan_area = geom.width_m * geom.length_m;
    let real_velocity = if plan_area > 0.0 { q_unit / plan_area } else { 0.0 };
    let bed_height = granulometry.bed_height_m;
    let bed_volume = geom.area_m2 * bed_height;
    let retention = retention_min(bed_volume * POROSITY, q_unit);
    let head_loss = HF_MEDIA_M + HF_FITTINGS_M;
    let structure_height = granulometry.total_structure_height_m();

    let mut b = MemoriaBuilder::new(TreatmentUnit::CoarseFilter.display_name(), flow);
    b.param("flow_lps", flow_lps, "L/s")
        .param("turbidity_ntu", turbidity, "NTU")
        .param("vf_m_h", vf, "m/h")
        .param("num_units", num_units as f64, "units")
        .param("ratio_l_a", ratio_l_a, "-")
        .param("porosity", POROSITY, "-")
        .param("bed_height_m", bed_height, "m");

    b.step("Q", "Q = Q_lps × 3.6", format!("{} × 3.6", fmt_num(flow_lps, 2)), flow.flow_m3h, 2, "m³/h");
    b.step("T0", "Raw water turbidity", fmt_num(turbidity, 1), turbidity, 1, "NTU");
    b.step("Vf", "Design filtration velocity", fmt_num(vf, 2), vf, 2, "m/h")
        .cite(NormReference::Ras2000 { section: "C.7 coarse filtration" });
    b.step("N", "Number of units", num_units.to_string(), num_units as f64, 0, "units");
    b.step(
        "q",
        "q = Q / N",
        format!("{} / {}", fmt_num(flow.flow_m3h, 2), num_units),
        q_unit,
        3,
        "m³/h",
    );
    b.step("A", "A = q / Vf", format!("{} / {}", fmt_num(q_unit, 3), fmt_num(vf, 2)), geom.area_m2, 2, "m²");
    b.step(
        "W",
        "W = √(A / R)",
        format!("√({} / {})", fmt_num(geom.area_m2, 2), fmt_num(ratio_l_a, 1)),
        geom.width_m,
        2,
        "m",
    );
    b.step(
        "L",
        "L = R · W",
        format!("{} × {}", fmt_num(ratio_l_a, 1), fmt_num(geom.width_m, 2)),
        geom.length_m,
        2,
        "m",
    );
    b.step(
        "Vr",
        "Vr = q / (W · L)",
        format!("{} / ({} × {})", fmt_num(q_unit, 3), fmt_num(geom.width_m, 2), fmt_num(geom.length_m, 2)),
        real_velocity,
        2,
        "m/h",
    );
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
        "hf",
        "hf = hf_media + hf_fittings",
        format!("{} + {}", fmt_num(HF_MEDIA_M, 2), fmt_num(HF_FITTINGS_M, 2)),
        head_loss,
        2,
        "m",
    );
    b.step(
        "Ht",
        "Ht = Hbed + Hsup + BL",
        format!(
            "{} + {} + {}",
            fmt_num(bed_height, 2),
            fmt_num(granulometry.supernatant_height_m, 2),
            fmt_num(granulometry.freeboard_m, 2)
        ),
        structure_height,
        2,
        "m",
    );

    b.result("units", num_units as f64, "units")
        .result("unit_flow_m3h", q_unit, "m³/h")
        .result("area_m2", geom.area_m2, "m²")
        .result("width_m", geom.width_m, "m")
        .result("length_m", geom.length_m, "m")
        .result("real_velocity_m_h", real_velocity, "m/h")
        .result("bed_volume_m3", bed_volume, "m³")
        .result("retention_min", retention, "min")
        .result("head_loss_m", head_loss, "m")
        .result("structure_height_m", structure_height, "m");

    b.check(
        ComplianceCheck::range("Filtration velocity", vf, VF_MIN, VF_MAX, "m/h", 2)
            .cite(NormReference::Ras2000 { section: "C.7 coarse filtration" }),
    )
    .check(ComplianceCheck::at_most("Area per unit", geom.area_m2, AREA_MAX_M2, "m²", 2))
    .check(
        ComplianceCheck::at_least("Number of units", num_units as f64, MIN_UNITS as f64, "units", 0)
            .cite(NormReference::Res0330 { topic: "redundancy of filtration units" }),
    );
    b.granulometry(granulometry);

    log::debug!(
        "coarse filter: Q={:.2} L/s -> {} x {:.2} m² at {:.2} m/h",
        flow_lps,
        num_units,
        geom.area_m2,
        vf
    );
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::ComplianceStatus;
    use approx::assert_relative_eq;

    fn params(vf: f64, num_units: u32) -> FilterParams {
        FilterParams { vf, num_units, ratio_l_a: 4.0 }
    }

    #[test]
    fn test_upper_velocity_bound_is_inclusive() {
        for flow in [0.1, 0.5, 2.0, 7.5] {
            let m = size_coarse_filter(flow, &WaterQualitySnapshot::default(), &params(0.6, 2));
            let check = m.compliance_for("Filtration velocity").unwrap();
            assert_eq!(check.status, ComplianceStatus::Ok);
            assert_eq!(check.value, "0.60");
        }
    }

    #[test]
    fn test_end_to_end_half_liter_per_second() {
        let m = size_coarse_filter(0.5, &WaterQualitySnapshot::with_turbidity(30.0), &params(0.6, 2));
        // q = 0.9 m³/h, A = 1.5 m², W = √(1.5/4) = 0.612 m, L = 2.449 m
        assert_relative_eq!(m.result("unit_flow_m3h").unwrap(), 0.9, epsilon = 1e-12);
        assert_relative_eq!(m.result("area_m2").unwrap(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(m.result("width_m").unwrap(), 0.6124, epsilon = 1e-4);
        assert_relative_eq!(m.result("length_m").unwrap(), 2.4495, epsilon = 1e-4);
        assert_relative_eq!(m.result("real_velocity_m_h").unwrap(), 0.6, epsilon = 1e-9);
        assert!(m.passes());
    }

    #[test]
    fn test_velocity_outside_range_alerts() {
        let fast = size_coarse_filter(0.5, &WaterQualitySnapshot::default(), &params(0.8, 2));
        assert_eq!(fast.compliance_for("Filtration velocity").unwrap().status, ComplianceStatus::Alerta);
        let slow = size_coarse_filter(0.5, &WaterQualitySnapshot::default(), &params(0.2, 2));
        assert_eq!(slow.compliance_for("Filtration velocity").unwrap().status, ComplianceStatus::Alerta);
    }

    #[test]
    fn test_single_unit_alerts() {
        let m = size_coarse_filter(0.5, &WaterQualitySnapshot::default(), &params(0.5, 1));
        let check = m.compliance_for("Number of units").unwrap();
        assert_eq!(check.status, ComplianceStatus::Alerta);
        assert_eq!(check.value, "1");
    }

    #[test]
    fn test_large_flow_exceeds_area_limit() {
        // 10 L/s = 36 m³/h over 2 units at 0.5 m/h → 36 m² per unit
        let m = size_coarse_filter(10.0, &WaterQualitySnapshot::default(), &params(0.5, 2));
        assert_eq!(m.compliance_for("Area per unit").unwrap().status, ComplianceStatus::Alerta);
    }

    #[test]
    fn test_head_loss_and_structure_height() {
        let m = size_coarse_filter(1.0, &WaterQualitySnapshot::default(), &params(0.45, 3));
        assert_relative_eq!(m.result("head_loss_m").unwrap(), 0.40, epsilon = 1e-12);
        assert_relative_eq!(m.result("structure_height_m").unwrap(), 1.30, epsilon = 1e-9);
    }

    #[test]
    fn test_steps_follow_derivation_order() {
        let m = size_coarse_filter(1.0, &WaterQualitySnapshot::default(), &params(0.45, 2));
        let order: Vec<&str> = m.steps.iter().map(|s| s.variable.as_str()).collect();
        assert_eq!(order, ["Q", "T0", "Vf", "N", "q", "A", "W", "L", "Vr", "Vbed", "TRH", "hf", "Ht"]);
    }
}

//! # Disinfection and Storage
//!
//! Chlorine contact chamber, CT verification, commercial chlorine
//! consumption and the regulation storage tank.
//!
//! ## Assumptions
//!
//! - Achieved CT = applied dose × contact time (no decay, no baffling factor)
//! - Required CT from the free-chlorine table below, by pH and temperature band
//! - Commercial product strength given as % available chlorine (e.g., 65 for HTH)
//! - Storage tank holds 8 h of design flow, 2.5 m water depth, L:W = 2:1
//! - Free residual in the network between 0.3 and 2.0 mg/L (reported only)
//!
//! ## Example
//!
//! ```rust
//! use fime_core::calculations::{size_disinfection, DisinfectionParams};
//!
//! let params = DisinfectionParams { contact_time: 30.0, chlorine_dose: 2.0, chlorine_concentration: 65.0 };
//! let d = size_disinfection(0.5, 500, &params, None);
//!
//! assert!(d.memoria.compliance_for("Contact time").unwrap().passes());
//! assert!(d.ct.compliant);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::NormReference;
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::quality::WaterQualitySnapshot;
use crate::units::{lps_to_m3min, DesignFlow};

use super::{fmt_num, ComplianceCheck, MemoriaBuilder, ModuleMemoria};

/// Required CT (mg·min/L) by [pH band][temperature band].
///
/// pH bands: ≤7.0, ≤7.5, ≤8.0, >8.0. Temperature bands: ≥20 °C, ≥15 °C, <15 °C.
const CT_TABLE: [[f64; 3]; 4] = [
    [16.0, 24.0, 32.0],
    [22.0, 32.0, 45.0],
    [32.0, 45.0, 64.0],
    [45.0, 64.0, 90.0],
];

/// Minimum contact time (min)
const MIN_CONTACT_TIME_MIN: f64 = 30.0;

/// Regulation volume of the storage tank (h of design flow)
const STORAGE_HOURS: f64 = 8.0;

/// Storage tank water depth (m)
const STORAGE_DEPTH_M: f64 = 2.5;

/// Storage tank plan ratio L:W
const STORAGE_RATIO_L_A: f64 = 2.0;

/// Free chlorine residual band in the network (mg/L)
const RESIDUAL_MIN_MG_L: f64 = 0.3;
const RESIDUAL_MAX_MG_L: f64 = 2.0;

const DAYS_PER_MONTH: f64 = 30.0;

/// Chlorination parameters.
///
/// ## JSON Example
///
/// ```json
/// { "contact_time": 30.0, "chlorine_dose": 2.0, "chlorine_concentration": 65.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisinfectionParams {
    /// Contact time (min)
    pub contact_time: f64,
    /// Applied chlorine dose (mg/L)
    pub chlorine_dose: f64,
    /// Available chlorine in the commercial product (%)
    pub chlorine_concentration: f64,
}

impl DisinfectionParams {
    /// Validate before calling [`size_disinfection`].
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("contact_time", self.contact_time)?;
        require_positive("chlorine_dose", self.chlorine_dose)?;
        if !(self.chlorine_concentration > 0.0 && self.chlorine_concentration <= 100.0) {
            return Err(CalcError::invalid_input(
                "chlorine_concentration",
                self.chlorine_concentration.to_string(),
                "Product strength must be a percentage in (0, 100]",
            ));
        }
        Ok(())
    }
}

/// CT verification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CtCompliance {
    /// Required CT (mg·min/L)
    pub required: f64,
    /// Achieved CT = dose × time (mg·min/L)
    pub provided: f64,
    pub compliant: bool,
}

/// Regulation storage tank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageTankSizing {
    pub volume_m3: f64,
    pub retention_h: f64,
    /// Population served
    pub population: u32,
    pub depth_m: f64,
    pub width_m: f64,
    pub length_m: f64,
}

/// Disinfection memoria with CT and storage results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisinfectionMemoria {
    #[serde(flatten)]
    pub memoria: ModuleMemoria,
    pub ct: CtCompliance,
    pub storage: StorageTankSizing,
}

impl DisinfectionMemoria {
    pub fn passes(&self) -> bool {
        self.memoria.passes()
    }
}

/// Required CT (mg·min/L) for free chlorine at the given pH and temperature.
pub fn ct_required(ph: f64, temperature_c: f64) -> f64 {
    let ph_band = if ph <= 7.0 {
        0
    } else if ph <= 7.5 {
        1
    } else if ph <= 8.0 {
        2
    } else {
        3
    };
    let temp_band = if temperature_c >= 20.0 {
        0
    } else if temperature_c >= 15.0 {
        1
    } else {
        2
    };
    CT_TABLE[ph_band][temp_band]
}

/// Size the chlorine contact chamber and the storage tank.
///
/// # Arguments
///
/// * `flow_lps` - Design flow (L/s)
/// * `population` - Population served (reported with the storage tank)
/// * `params` - Contact time, dose and product strength
/// * `quality` - pH and temperature; defaults 7.0 and 20 °C
pub fn size_disinfection(
    flow_lps: f64,
    population: u32,
    params: &DisinfectionParams,
    quality: Option<&WaterQualitySnapshot>,
) -> DisinfectionMemoria {
    let flow = DesignFlow::from_lps(flow_lps);
    let quality = quality.copied().unwrap_or_default();
    let ph = quality.ph_or_default();
    let temperature = quality.temperature_or_default();
    let DisinfectionParams { contact_time, chlorine_dose, chlorine_concentration } = *params;

    let flow_m3min = lps_to_m3min(flow_lps);
    let contact_volume = flow_m3min * contact_time;
    let required = ct_required(ph, temperature);
    let provided = chlorine_dose * contact_time;
    let pure_kg_d = flow.flow_m3d() * chlorine_dose / 1000.0;
    let product_kg_d = if chlorine_concentration > 0.0 {
        pure_kg_d / (chlorine_concentration / 100.0)
    } else {
        0.0
    };
    let product_kg_month = product_kg_d * DAYS_PER_MONTH;

    let storage_volume = flow.flow_m3h * STORAGE_HOURS;
    let storage_area = storage_volume / STORAGE_DEPTH_M;
    let storage_width = (storage_area / STORAGE_RATIO_L_A).sqrt();
    let storage_length = STORAGE_RATIO_L_A * storage_width;
    let storage_per_capita_l = if population > 0 {
        storage_volume * 1000.0 / population as f64
    } else {
        0.0
    };

    let mut b = MemoriaBuilder::new("Disinfection and storage", flow);
    b.param("flow_lps", flow_lps, "L/s")
        .param("population", population as f64, "inhabitants")
        .param("contact_time_min", contact_time, "min")
        .param("chlorine_dose_mg_l", chlorine_dose, "mg/L")
        .param("chlorine_concentration_pct", chlorine_concentration, "%")
        .param("ph", ph, "-")
        .param("temperature_c", temperature, "°C");

    b.step("Q", "Q = Q_lps × 3.6", format!("{} × 3.6", fmt_num(flow_lps, 2)), flow.flow_m3h, 2, "m³/h");
    b.step("Qm", "Qm = Q_lps × 0.06", format!("{} × 0.06", fmt_num(flow_lps, 2)), flow_m3min, 4, "m³/min");
    b.step("t", "Contact time", fmt_num(contact_time, 0), contact_time, 0, "min");
    b.step(
        "Vc",
        "Vc = Qm · t",
        format!("{} × {}", fmt_num(flow_m3min, 4), fmt_num(contact_time, 0)),
        contact_volume,
        2,
        "m³",
    );
    b.step("pH", "Water pH (7.0 if not measured)", fmt_num(ph, 1), ph, 1, "-");
    b.step("T", "Water temperature (20 °C if not measured)", fmt_num(temperature, 1), temperature, 1, "°C");
    b.step(
        "CTreq",
        "CT table by pH and temperature band",
        format!("pH {}, T {} °C", fmt_num(ph, 1), fmt_num(temperature, 1)),
        required,
        1,
        "mg·min/L",
    )
    .cite(NormReference::EpaSwtr);
    b.step(
        "CTprov",
        "CT = C · t",
        format!("{} × {}", fmt_num(chlorine_dose, 2), fmt_num(contact_time, 0)),
        provided,
        1,
        "mg·min/L",
    );
    b.step(
        "Mcl",
        "Mcl = Q_d · C / 1000",
        format!("{} × {} / 1000", fmt_num(flow.flow_m3d(), 2), fmt_num(chlorine_dose, 2)),
        pure_kg_d,
        3,
        "kg/d",
    );
    b.step(
        "Mp",
        "Mp = Mcl / (% / 100)",
        format!("{} / {}", fmt_num(pure_kg_d, 3), fmt_num(chlorine_concentration / 100.0, 2)),
        product_kg_d,
        3,
        "kg/d",
    );
    b.step(
        "Mp30",
        "Mp30 = Mp · 30",
        format!("{} × 30", fmt_num(product_kg_d, 3)),
        product_kg_month,
        2,
        "kg/month",
    );
    b.step(
        "Vt",
        "Vt = Q · 8 h",
        format!("{} × {}", fmt_num(flow.flow_m3h, 2), fmt_num(STORAGE_HOURS, 0)),
        storage_volume,
        2,
        "m³",
    )
    .cite(NormReference::Res0330 { topic: "storage regulation volume" });
    b.step(
        "At",
        "At = Vt / H",
        format!("{} / {}", fmt_num(storage_volume, 2), fmt_num(STORAGE_DEPTH_M, 2)),
        storage_area,
        2,
        "m²",
    );
    b.step(
        "Wt",
        "Wt = √(At / 2)",
        format!("√({} / 2)", fmt_num(storage_area, 2)),
        storage_width,
        2,
        "m",
    );
    b.step("Lt", "Lt = 2 · Wt", format!("2 × {}", fmt_num(storage_width, 2)), storage_length, 2, "m");
    b.step(
        "Cr",
        "Free residual band in the network",
        format!("{} - {}", fmt_num(RESIDUAL_MIN_MG_L, 1), fmt_num(RESIDUAL_MAX_MG_L, 1)),
        RESIDUAL_MAX_MG_L,
        1,
        "mg/L",
    )
    .cite(NormReference::Res0330 { topic: "free chlorine residual" });

    b.result("contact_volume_m3", contact_volume, "m³")
        .result("ct_required", required, "mg·min/L")
        .result("ct_provided", provided, "mg·min/L")
        .result("chlorine_pure_kg_d", pure_kg_d, "kg/d")
        .result("product_kg_d", product_kg_d, "kg/d")
        .result("product_kg_month", product_kg_month, "kg/month")
        .result("storage_volume_m3", storage_volume, "m³")
        .result("storage_width_m", storage_width, "m")
        .result("storage_length_m", storage_length, "m")
        .result("storage_per_capita_l", storage_per_capita_l, "L/inhabitant")
        .result("residual_min_mg_l", RESIDUAL_MIN_MG_L, "mg/L")
        .result("residual_max_mg_l", RESIDUAL_MAX_MG_L, "mg/L");

    let ct_check = ComplianceCheck::at_least("CT", provided, required, "mg·min/L", 1).cite(NormReference::EpaSwtr);
    let compliant = ct_check.passes();
    b.check(ct_check)
        .check(
            ComplianceCheck::at_least("Contact time", contact_time, MIN_CONTACT_TIME_MIN, "min", 0)
                .cite(NormReference::Res0330 { topic: "chlorine contact time" }),
        );

    let ct = CtCompliance {
        required,
        provided,
        compliant,
    };
    let storage = StorageTankSizing {
        volume_m3: storage_volume,
        retention_h: STORAGE_HOURS,
        population,
        depth_m: STORAGE_DEPTH_M,
        width_m: storage_width,
        length_m: storage_length,
    };

    log::debug!(
        "disinfection: CT {:.1}/{:.1} mg·min/L, storage {:.1} m³",
        provided,
        required,
        storage_volume
    );
    DisinfectionMemoria {
        memoria: b.build(),
        ct,
        storage,
    }
}

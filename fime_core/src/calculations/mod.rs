//! # Unit Sizing Calculations
//!
//! Each treatment unit is sized by a pure function that returns a
//! [`ModuleMemoria`]: the ordered derivation steps, the inputs used, the key
//! results and the compliance verdicts.
//!
//! - `size_*(flow, ...) -> ModuleMemoria` - one function per unit type
//! - Steps come out in derivation order (inputs → intermediate → final);
//!   report renderers display them positionally
//! - Compliance is advisory: `OK` or `ALERTA`, never an error
//!
//! ## Available Calculations
//!
//! - [`prefilter`] - Dynamic pre-filter (PFD)
//! - [`coarse_filter`] - Upflow coarse filter in layers (FGAC)
//! - [`slow_sand_filter`] - Slow sand filter (FLA)
//! - [`disinfection`] - Chlorine contact, CT verification and storage tank
//! - [`removal`] - Whole-train removal estimate

pub mod coarse_filter;
pub mod disinfection;
pub mod prefilter;
pub mod removal;
pub mod slow_sand_filter;

use serde::{Deserialize, Serialize};

use crate::equations::NormReference;
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::materials::ModuleGranulometry;
use crate::units::DesignFlow;

// Re-export commonly used items
pub use coarse_filter::size_coarse_filter;
pub use disinfection::{size_disinfection, CtCompliance, DisinfectionMemoria, DisinfectionParams, StorageTankSizing};
pub use prefilter::size_prefilter;
pub use removal::{total_removal, RemovalEstimate, StageRemoval};
pub use slow_sand_filter::size_slow_sand_filter;

/// Tolerance for limit comparisons so that values computed to sit exactly on
/// a limit are not flagged by floating-point noise.
const LIMIT_EPS: f64 = 1e-9;

/// Format a number with fixed decimals for memoria text.
pub(crate) fn fmt_num(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

// ============================================================================
// Compliance
// ============================================================================

/// Verdict of one compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "OK")]
    Ok,
    /// Outside the normative limit; surfaced to the user, never fatal
    #[serde(rename = "ALERTA")]
    Alerta,
}

impl ComplianceStatus {
    fn from_pass(pass: bool) -> Self {
        if pass {
            ComplianceStatus::Ok
        } else {
            ComplianceStatus::Alerta
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Ok => "OK",
            ComplianceStatus::Alerta => "ALERTA",
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A computed value compared against a normative limit.
///
/// ## JSON Example
///
/// ```json
/// {
///   "check": "Filtration velocity",
///   "value": "0.60",
///   "unit": "m/h",
///   "limit": "0.30 - 0.60",
///   "status": "OK",
///   "reference": "RAS 2000 Title C, C.7"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub check: String,
    /// Checked value, formatted
    pub value: String,
    pub unit: String,
    /// Limit, formatted (e.g., "0.30 - 0.60", "<= 20.00", ">= 2")
    pub limit: String,
    pub status: ComplianceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl ComplianceCheck {
    /// `min <= value <= max`
    pub fn range(check: &str, value: f64, min: f64, max: f64, unit: &str, decimals: usize) -> Self {
        let pass = value >= min - LIMIT_EPS && value <= max + LIMIT_EPS;
        ComplianceCheck {
            check: check.to_string(),
            value: fmt_num(value, decimals),
            unit: unit.to_string(),
            limit: format!("{} - {}", fmt_num(min, decimals), fmt_num(max, decimals)),
            status: ComplianceStatus::from_pass(pass),
            reference: None,
        }
    }

    /// `value <= max`
    pub fn at_most(check: &str, value: f64, max: f64, unit: &str, decimals: usize) -> Self {
        ComplianceCheck {
            check: check.to_string(),
            value: fmt_num(value, decimals),
            unit: unit.to_string(),
            limit: format!("<= {}", fmt_num(max, decimals)),
            status: ComplianceStatus::from_pass(value <= max + LIMIT_EPS),
            reference: None,
        }
    }

    /// `value >= min`
    pub fn at_least(check: &str, value: f64, min: f64, unit: &str, decimals: usize) -> Self {
        ComplianceCheck {
            check: check.to_string(),
            value: fmt_num(value, decimals),
            unit: unit.to_string(),
            limit: format!(">= {}", fmt_num(min, decimals)),
            status: ComplianceStatus::from_pass(value >= min - LIMIT_EPS),
            reference: None,
        }
    }

    /// `value < max` (strict)
    pub fn below(check: &str, value: f64, max: f64, unit: &str, decimals: usize) -> Self {
        ComplianceCheck {
            check: check.to_string(),
            value: fmt_num(value, decimals),
            unit: unit.to_string(),
            limit: format!("< {}", fmt_num(max, decimals)),
            status: ComplianceStatus::from_pass(value < max),
            reference: None,
        }
    }

    pub fn cite(mut self, reference: NormReference) -> Self {
        self.reference = Some(reference.citation());
        self
    }

    pub fn passes(&self) -> bool {
        self.status == ComplianceStatus::Ok
    }
}

// ============================================================================
// Memoria
// ============================================================================

/// One row of a derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    /// Symbol or short name (e.g., "A", "Vf")
    pub variable: String,
    /// Formula description (e.g., "A = q / Vf")
    pub formula: String,
    /// Formula with values substituted
    pub substitution: String,
    /// Numeric result, formatted
    pub result: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A named numeric input or output of a memoria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignValue {
    pub key: String,
    pub value: f64,
    pub unit: String,
}

/// Sizing memorandum of one treatment unit.
///
/// Built fresh by each `size_*` call; never cached or mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleMemoria {
    pub unit_name: String,
    pub flow: DesignFlow,
    /// Derivation steps, in calculation order
    pub steps: Vec<CalculationStep>,
    /// Inputs used by the calculation
    pub design_params: Vec<DesignValue>,
    /// Key outputs
    pub results: Vec<DesignValue>,
    pub compliance: Vec<ComplianceCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granulometry: Option<ModuleGranulometry>,
}

impl ModuleMemoria {
    /// True when every compliance check is `OK`
    pub fn passes(&self) -> bool {
        self.compliance.iter().all(ComplianceCheck::passes)
    }

    /// Checks flagged `ALERTA`
    pub fn alerts(&self) -> impl Iterator<Item = &ComplianceCheck> {
        self.compliance.iter().filter(|c| !c.passes())
    }

    pub fn compliance_for(&self, check: &str) -> Option<&ComplianceCheck> {
        self.compliance.iter().find(|c| c.check == check)
    }

    pub fn result(&self, key: &str) -> Option<f64> {
        self.results.iter().find(|r| r.key == key).map(|r| r.value)
    }

    pub fn param(&self, key: &str) -> Option<f64> {
        self.design_params.iter().find(|p| p.key == key).map(|p| p.value)
    }

    pub fn step(&self, variable: &str) -> Option<&CalculationStep> {
        self.steps.iter().find(|s| s.variable == variable)
    }
}

/// Accumulates a memoria inside one sizing function.
pub(crate) struct MemoriaBuilder {
    memoria: ModuleMemoria,
}

impl MemoriaBuilder {
    pub fn new(unit_name: &str, flow: DesignFlow) -> Self {
        MemoriaBuilder {
            memoria: ModuleMemoria {
                unit_name: unit_name.to_string(),
                flow,
                steps: Vec::new(),
                design_params: Vec::new(),
                results: Vec::new(),
                compliance: Vec::new(),
                granulometry: None,
            },
        }
    }

    pub fn param(&mut self, key: &str, value: f64, unit: &str) -> &mut Self {
        self.memoria.design_params.push(DesignValue {
            key: key.to_string(),
            value,
            unit: unit.to_string(),
        });
        self
    }

    pub fn step(
        &mut self,
        variable: &str,
        formula: &str,
        substitution: String,
        value: f64,
        decimals: usize,
        unit: &str,
    ) -> &mut Self {
        self.memoria.steps.push(CalculationStep {
            variable: variable.to_string(),
            formula: formula.to_string(),
            substitution,
            result: fmt_num(value, decimals),
            unit: unit.to_string(),
            reference: None,
        });
        self
    }

    /// Attach a reference to the most recent step.
    pub fn cite(&mut self, reference: NormReference) -> &mut Self {
        if let Some(last) = self.memoria.steps.last_mut() {
            last.reference = Some(reference.citation());
        }
        self
    }

    pub fn result(&mut self, key: &str, value: f64, unit: &str) -> &mut Self {
        self.memoria.results.push(DesignValue {
            key: key.to_string(),
            value,
            unit: unit.to_string(),
        });
        self
    }

    pub fn check(&mut self, check: ComplianceCheck) -> &mut Self {
        self.memoria.compliance.push(check);
        self
    }

    pub fn granulometry(&mut self, granulometry: &ModuleGranulometry) -> &mut Self {
        self.memoria.granulometry = Some(granulometry.clone());
        self
    }

    pub fn build(self) -> ModuleMemoria {
        self.memoria
    }
}

// ============================================================================
// Shared Filter Parameters
// ============================================================================

/// Caller-chosen parameters for the coarse and slow sand filters.
///
/// ## JSON Example
///
/// ```json
/// { "vf": 0.6, "num_units": 2, "ratio_l_a": 4.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Design filtration velocity (m/h)
    pub vf: f64,
    /// Number of parallel units
    pub num_units: u32,
    /// Plan aspect ratio length : width
    pub ratio_l_a: f64,
}

impl FilterParams {
    /// Validate before calling a sizing function.
    ///
    /// The sizing functions do not call this themselves.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("vf", self.vf)?;
        require_positive("ratio_l_a", self.ratio_l_a)?;
        if self.num_units == 0 {
            return Err(CalcError::invalid_input("num_units", "0", "At least one unit is required"));
        }
        Ok(())
    }
}

/// Plan geometry of one rectangular unit.
pub(crate) struct PlanGeometry {
    pub area_m2: f64,
    pub width_m: f64,
    pub length_m: f64,
}

/// Area from flow and velocity, then width and length at the given L:W ratio.
pub(crate) fn plan_geometry(unit_flow_m3h: f64, velocity_m_h: f64, ratio_l_a: f64) -> PlanGeometry {
    let area_m2 = if velocity_m_h > 0.0 { unit_flow_m3h / velocity_m_h } else { 0.0 };
    let width_m = if ratio_l_a > 0.0 { (area_m2 / ratio_l_a).sqrt() } else { 0.0 };
    PlanGeometry {
        area_m2,
        width_m,
        length_m: ratio_l_a * width_m,
    }
}

/// Flow split evenly across `n` units; zero units carry no flow.
pub(crate) fn per_unit(total: f64, num_units: u32) -> f64 {
    if num_units == 0 {
        0.0
    } else {
        total / num_units as f64
    }
}

/// Hydraulic retention time (min) of the pore volume at the given flow.
pub(crate) fn retention_min(pore_volume_m3: f64, flow_m3h: f64) -> f64 {
    if flow_m3h > 0.0 {
        pore_volume_m3 / flow_m3h * 60.0
    } else {
        0.0
    }
}

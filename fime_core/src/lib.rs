//! # fime_core - Multi-Stage Filtration Calculation Engine
//!
//! `fime_core` sizes small potable-water plants built on the FIME
//! multi-stage filtration train: dynamic pre-filter, upflow coarse filter,
//! slow sand filter and disinfection. All inputs and outputs are
//! JSON-serializable so a configurator front end can drive it directly.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **Advisory**: Regulatory checks report `OK`/`ALERTA`, they never fail a calculation
//! - **Traceable**: Every sizing returns its derivation steps in order
//! - **JSON-First**: All records implement Serialize/Deserialize
//!
//! ## Quick Start
//!
//! ```rust
//! use fime_core::{design_plant, DesignInput, DesignSettings};
//!
//! let input = DesignInput::new(1.0, 800);
//! let report = design_plant(&input, &DesignSettings::default());
//!
//! for (unit, check) in report.alerts() {
//!     println!("{unit}: {} = {} {} (limit {})", check.check, check.value, check.unit, check.limit);
//! }
//! let json = serde_json::to_string_pretty(&report).unwrap();
//! assert!(json.contains("\"valves\""));
//! ```
//!
//! ## Modules
//!
//! - [`materials`] - Filter-media catalog and commercial pipe sizes
//! - [`equations`] - Hazen-Williams, minor losses, normative references
//! - [`calculations`] - Unit sizing memorias and the removal estimate
//! - [`hydraulic_profile`] - Water levels and head losses along the train
//! - [`piping`] - Diameter selection and valve schedule
//! - [`design`] - Whole-plant orchestration and settings
//! - [`quality`] - Raw water quality snapshot
//! - [`units`] - Unit wrappers and flow conversions
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod design;
pub mod equations;
pub mod errors;
pub mod hydraulic_profile;
pub mod materials;
pub mod piping;
pub mod quality;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{ComplianceCheck, ComplianceStatus, FilterParams, ModuleMemoria};
pub use design::{design_plant, DesignInput, DesignSettings, PlantDesignReport};
pub use equations::{friction_loss, k_value, minor_losses, velocity};
pub use errors::{CalcError, CalcResult};
pub use hydraulic_profile::{build_profile, total_head_required, HydraulicNode};
pub use materials::{get_granulometry, total_structure_height, TreatmentUnit};
pub use piping::{generate_valve_schedule, select_diameter, PipeKind, PipeSpec, ValveSpec};
pub use quality::WaterQualitySnapshot;
pub use units::DesignFlow;

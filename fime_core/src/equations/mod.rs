//! # Hydraulic Equations
//!
//! Fundamental formulas shared by the profile simulator and the piping
//! selector, plus the normative references cited by calculation steps.
//!
//! ## Modules
//!
//! - [`hydraulics`] - Hazen-Williams friction, minor losses, velocity, K values
//! - [`references`] - Standards and guides cited in memorias
//!
//! ## References
//!
//! - RAS 2000 Title C / Resolution 0330 of 2017 (Colombia)
//! - CINARA-IRC, Multi-stage filtration (FiME) design guide
//! - US EPA Surface Water Treatment Rule Guidance Manual

pub mod hydraulics;
pub mod references;

pub use hydraulics::{
    friction_loss,
    k_value,
    minor_losses,
    segment_losses,
    velocity,
    Fitting,
    PipeSegment,
    SegmentLosses,
    DEFAULT_C_FACTOR,
};

pub use references::NormReference;

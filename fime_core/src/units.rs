//! # Unit Types
//!
//! Lightweight unit wrappers and conversion helpers for plant design.
//!
//! The engine works in SI with two exceptions inherited from practice in
//! small rural systems: design flow is given in liters per second and pipe
//! diameters are commercial nominal sizes in inches.
//!
//! - Flow: L/s (input), m³/h (unit sizing), m³/s (hydraulics), m³/d (dosing)
//! - Length: m, pipe diameters in inches
//! - Velocity: m/h for filtration rates, m/s for pipes
//!
//! ## Example
//!
//! ```rust
//! use fime_core::units::{DesignFlow, Inches, Meters};
//!
//! let q = DesignFlow::from_lps(0.5);
//! assert!((q.flow_m3h - 1.8).abs() < 1e-12);
//!
//! let d: Meters = Inches(2.0).into();
//! assert!((d.0 - 0.0508).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Meters per inch
pub const M_PER_INCH: f64 = 0.0254;

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in inches (nominal pipe diameters)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Inches> for Meters {
    fn from(inches: Inches) -> Self {
        Meters(inches.0 * M_PER_INCH)
    }
}

impl From<Meters> for Inches {
    fn from(m: Meters) -> Self {
        Inches(m.0 / M_PER_INCH)
    }
}

// ============================================================================
// Flow Conversions
// ============================================================================

/// L/s → m³/s
#[inline]
pub fn lps_to_m3s(flow_lps: f64) -> f64 {
    flow_lps / 1000.0
}

/// L/s → m³/h
#[inline]
pub fn lps_to_m3h(flow_lps: f64) -> f64 {
    flow_lps * 3.6
}

/// L/s → m³/d
#[inline]
pub fn lps_to_m3d(flow_lps: f64) -> f64 {
    flow_lps * 86.4
}

/// L/s → m³/min
#[inline]
pub fn lps_to_m3min(flow_lps: f64) -> f64 {
    flow_lps * 0.06
}

// ============================================================================
// Design Flow
// ============================================================================

/// Design flow in both units used by the memorias.
///
/// Always derived from the L/s value; the m³/h figure is never set on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignFlow {
    /// Design flow (L/s)
    pub flow_lps: f64,
    /// Design flow (m³/h) = L/s × 3.6
    pub flow_m3h: f64,
}

impl DesignFlow {
    pub fn from_lps(flow_lps: f64) -> Self {
        DesignFlow {
            flow_lps,
            flow_m3h: lps_to_m3h(flow_lps),
        }
    }

    /// Daily volume (m³/d)
    pub fn flow_m3d(&self) -> f64 {
        lps_to_m3d(self.flow_lps)
    }
}

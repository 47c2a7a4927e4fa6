//! Commercial Pipe Sizes
//!
//! Nominal PVC pressure-pipe diameters stocked for small water systems,
//! smallest first. Hydraulic checks use the nominal diameter.

use serde::Serialize;

/// One commercial nominal diameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommercialDiameter {
    /// Nominal diameter (in)
    pub nominal_in: f64,
    /// Trade designation (e.g., `1 1/2"`)
    pub label: &'static str,
}

impl CommercialDiameter {
    const fn new(nominal_in: f64, label: &'static str) -> Self {
        CommercialDiameter { nominal_in, label }
    }
}

/// Commercial diameters in ascending order.
pub const COMMERCIAL_DIAMETERS: [CommercialDiameter; 12] = [
    CommercialDiameter::new(0.5, "1/2\""),
    CommercialDiameter::new(0.75, "3/4\""),
    CommercialDiameter::new(1.0, "1\""),
    CommercialDiameter::new(1.5, "1 1/2\""),
    CommercialDiameter::new(2.0, "2\""),
    CommercialDiameter::new(2.5, "2 1/2\""),
    CommercialDiameter::new(3.0, "3\""),
    CommercialDiameter::new(4.0, "4\""),
    CommercialDiameter::new(6.0, "6\""),
    CommercialDiameter::new(8.0, "8\""),
    CommercialDiameter::new(10.0, "10\""),
    CommercialDiameter::new(12.0, "12\""),
];

//! Filter Media Granulometry
//!
//! Layered media specification for each filtration unit, bottom layer first.
//! Values follow the usual FIME design guidance for rural systems: rounded
//! river gravel for the pre-filter and coarse filter, fine sand over a graded
//! gravel support for the slow sand filter.
//!
//! The catalog is a constant table built once on first access. Any code that
//! needs bed or structure heights goes through [`get_granulometry`] rather
//! than repeating the numbers.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::TreatmentUnit;

/// One media layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GravelLayerSpec {
    /// Layer name (e.g., "Bottom gravel")
    pub name: String,
    /// Functional role of the layer
    pub role: String,
    /// Grain size range (mm) as (min, max)
    pub grain_size_mm: (f64, f64),
    /// Layer thickness (m)
    pub thickness_m: f64,
    /// Effective size D10 (mm)
    pub d10_mm: f64,
    /// Uniformity coefficient Cu = D60/D10
    pub uniformity_coefficient: f64,
    /// Porosity (%)
    pub porosity_pct: f64,
}

/// Media specification of one treatment unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleGranulometry {
    pub unit: TreatmentUnit,
    /// Layers ordered bottom → top
    pub layers: Vec<GravelLayerSpec>,
    /// Total media bed height (m)
    pub bed_height_m: f64,
    /// Water layer above the media (m)
    pub supernatant_height_m: f64,
    /// Freeboard above the maximum water level (m)
    pub freeboard_m: f64,
    pub material_notes: String,
    pub preparation_notes: String,
    pub washing_notes: String,
}

impl ModuleGranulometry {
    /// Bed + supernatant + freeboard (m)
    pub fn total_structure_height_m(&self) -> f64 {
        self.bed_height_m + self.supernatant_height_m + self.freeboard_m
    }
}

fn layer(
    name: &str,
    role: &str,
    grain_size_mm: (f64, f64),
    thickness_m: f64,
    d10_mm: f64,
    uniformity_coefficient: f64,
    porosity_pct: f64,
) -> GravelLayerSpec {
    GravelLayerSpec {
        name: name.to_string(),
        role: role.to_string(),
        grain_size_mm,
        thickness_m,
        d10_mm,
        uniformity_coefficient,
        porosity_pct,
    }
}

static PREFILTER: Lazy<ModuleGranulometry> = Lazy::new(|| ModuleGranulometry {
    unit: TreatmentUnit::Prefilter,
    layers: vec![
        layer("Bottom gravel", "Support and underdrain cover", (13.0, 19.0), 0.20, 13.0, 1.3, 42.0),
        layer("Middle gravel", "Transition", (6.0, 13.0), 0.20, 6.0, 1.6, 40.0),
        layer("Top gravel", "Surface retention of solids", (3.0, 6.0), 0.20, 3.0, 1.5, 38.0),
    ],
    bed_height_m: 0.60,
    supernatant_height_m: 0.20,
    freeboard_m: 0.20,
    material_notes: "Rounded river gravel, hard and durable, free of clay, silt and organic matter.".to_string(),
    preparation_notes: "Screen to the specified size ranges and wash until the rinse water runs clear.".to_string(),
    washing_notes: "Rake the top layer with the drain valve open every 1-2 weeks or after turbidity peaks."
        .to_string(),
});

static COARSE_FILTER: Lazy<ModuleGranulometry> = Lazy::new(|| ModuleGranulometry {
    unit: TreatmentUnit::CoarseFilter,
    layers: vec![
        layer("Support gravel", "Support and flow distribution", (19.0, 25.0), 0.30, 19.0, 1.3, 42.0),
        layer("Coarse gravel", "Filtration", (13.0, 19.0), 0.20, 13.0, 1.4, 40.0),
        layer("Medium gravel", "Filtration", (6.0, 13.0), 0.15, 6.0, 1.6, 38.0),
        layer("Fine gravel", "Filtration", (3.0, 6.0), 0.15, 3.0, 1.5, 36.0),
        layer("Very fine gravel", "Polishing", (1.6, 3.0), 0.20, 1.6, 1.5, 35.0),
    ],
    bed_height_m: 1.00,
    supernatant_height_m: 0.10,
    freeboard_m: 0.20,
    material_notes: "Rounded river gravel, hard and durable, free of clay, silt and organic matter.".to_string(),
    preparation_notes: "Screen and wash each fraction separately; place layers by hand without compacting."
        .to_string(),
    washing_notes: "Weekly hydraulic drain through the underdrain with a fast-opening valve; full manual \
                    cleaning every 2-3 years."
        .to_string(),
});

static SLOW_SAND_FILTER: Lazy<ModuleGranulometry> = Lazy::new(|| ModuleGranulometry {
    unit: TreatmentUnit::SlowSandFilter,
    layers: vec![
        layer("Support gravel", "Underdrain cover", (6.0, 13.0), 0.15, 6.0, 1.5, 40.0),
        layer("Transition gravel", "Support", (3.0, 6.0), 0.05, 3.0, 1.5, 38.0),
        layer("Coarse sand", "Keeps filter sand out of the support", (1.6, 3.0), 0.05, 1.6, 1.5, 38.0),
        layer("Filter sand", "Biological filtration (schmutzdecke)", (0.15, 0.35), 0.80, 0.20, 3.0, 40.0),
    ],
    bed_height_m: 1.05,
    supernatant_height_m: 1.00,
    freeboard_m: 0.20,
    material_notes: "Clean quartz sand, D10 0.15-0.30 mm, Cu below 4; graded gravel support.".to_string(),
    preparation_notes: "Wash sand to remove fines; fill the bed from below with clean water to expel air."
        .to_string(),
    washing_notes: "Scrape 1-2 cm of the top sand when head loss reaches 1.0 m; resand when the bed drops \
                    below 0.50 m."
        .to_string(),
});

/// Look up the media specification for a unit key.
///
/// Returns `None` for keys that do not name a filtration unit; that is a
/// normal outcome (e.g., disinfection has no media), not an error.
pub fn get_granulometry(unit_key: &str) -> Option<&'static ModuleGranulometry> {
    TreatmentUnit::from_key(unit_key).map(granulometry_for)
}

/// Media specification for a resolved unit.
pub fn granulometry_for(unit: TreatmentUnit) -> &'static ModuleGranulometry {
    match unit {
        TreatmentUnit::Prefilter => &*PREFILTER,
        TreatmentUnit::CoarseFilter => &*COARSE_FILTER,
        TreatmentUnit::SlowSandFilter => &*SLOW_SAND_FILTER,
    }
}

/// Bed + supernatant + freeboard (m), or 0.0 for an unknown key.
pub fn total_structure_height(unit_key: &str) -> f64 {
    get_granulometry(unit_key)
        .map(ModuleGranulometry::total_structure_height_m)
        .unwrap_or(0.0)
}

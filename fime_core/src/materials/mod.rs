//! # Materials Database
//!
//! Reference data for the treatment train: filter-media specifications per
//! unit type and the commercial PVC pipe sizes used for piping selection.
//!
//! ## Unit Keys
//!
//! Callers identify units by short string keys as they appear in design
//! inputs. Several aliases are accepted per unit:
//!
//! | Unit | Keys |
//! |------|------|
//! | Dynamic pre-filter | `pfd`, `prefiltro`, `filtro_dinamico`, `prefilter` |
//! | Upflow coarse filter | `fgac`, `filtro_grueso`, `coarse_filter` |
//! | Slow sand filter | `fla`, `filtro_lento`, `slow_sand_filter` |
//!
//! ## Example
//!
//! ```rust
//! use fime_core::materials::{get_granulometry, total_structure_height, TreatmentUnit};
//!
//! assert_eq!(TreatmentUnit::from_key("PFD"), Some(TreatmentUnit::Prefilter));
//!
//! let slow = get_granulometry("fla").unwrap();
//! assert_eq!(slow.layers.len(), 4);
//! assert!(get_granulometry("clarifier").is_none());
//! assert_eq!(total_structure_height("clarifier"), 0.0);
//! ```

pub mod granulometry;
pub mod pipe_sizes;

pub use granulometry::{get_granulometry, granulometry_for, total_structure_height, GravelLayerSpec, ModuleGranulometry};
pub use pipe_sizes::{CommercialDiameter, COMMERCIAL_DIAMETERS};

use serde::{Deserialize, Serialize};

/// Filtration units of the FIME train that carry media and valves.
///
/// Serializes to the short keys used in design inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TreatmentUnit {
    /// Dynamic pre-filter (PFD)
    #[serde(rename = "pfd")]
    Prefilter,
    /// Upflow coarse filter in layers (FGAC)
    #[serde(rename = "fgac")]
    CoarseFilter,
    /// Slow sand filter (FLA)
    #[serde(rename = "fla")]
    SlowSandFilter,
}

impl TreatmentUnit {
    /// Train order, upstream first
    pub const ALL: [TreatmentUnit; 3] = [
        TreatmentUnit::Prefilter,
        TreatmentUnit::CoarseFilter,
        TreatmentUnit::SlowSandFilter,
    ];

    /// Resolve any accepted alias (case-insensitive). Unknown keys give `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "pfd" | "prefiltro" | "filtro_dinamico" | "prefilter" => Some(TreatmentUnit::Prefilter),
            "fgac" | "filtro_grueso" | "coarse_filter" => Some(TreatmentUnit::CoarseFilter),
            "fla" | "filtro_lento" | "slow_sand_filter" => Some(TreatmentUnit::SlowSandFilter),
            _ => None,
        }
    }

    /// Canonical short key
    pub fn key(&self) -> &'static str {
        match self {
            TreatmentUnit::Prefilter => "pfd",
            TreatmentUnit::CoarseFilter => "fgac",
            TreatmentUnit::SlowSandFilter => "fla",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TreatmentUnit::Prefilter => "Dynamic pre-filter",
            TreatmentUnit::CoarseFilter => "Upflow coarse filter",
            TreatmentUnit::SlowSandFilter => "Slow sand filter",
        }
    }
}

impl std::fmt::Display for TreatmentUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(TreatmentUnit::from_key("pfd"), Some(TreatmentUnit::Prefilter));
        assert_eq!(TreatmentUnit::from_key("Filtro_Dinamico"), Some(TreatmentUnit::Prefilter));
        assert_eq!(TreatmentUnit::from_key("filtro_grueso"), Some(TreatmentUnit::CoarseFilter));
        assert_eq!(TreatmentUnit::from_key(" fla "), Some(TreatmentUnit::SlowSandFilter));
        assert_eq!(TreatmentUnit::from_key("desarenador"), None);
    }

    #[test]
    fn test_key_round_trips_through_from_key() {
        for unit in TreatmentUnit::ALL {
            assert_eq!(TreatmentUnit::from_key(unit.key()), Some(unit));
        }
    }

    #[test]
    fn test_serializes_as_short_key() {
        let json = serde_json::to_string(&TreatmentUnit::CoarseFilter).unwrap();
        assert_eq!(json, "\"fgac\"");
    }
}

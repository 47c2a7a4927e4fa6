//! # Hydraulic Profile
//!
//! Gravity-flow profile of the fixed FIME train, from the intake pipe to the
//! storage tank.
//!
//! ```text
//!  intake ──pipe──► grit chamber ─► pre-filter ─► coarse filter ─► slow sand ─► storage
//!  (start)           node 1          node 2        node 3           node 4       node 5
//! ```
//!
//! The intake pipe is computed with the hydraulic primitives and its loss is
//! charged to the grit-chamber node. Every later stage drops a fixed
//! geometric step plus a fixed worst-case operating loss (dirtiest media), so
//! the profile always shows the maximum head the train can consume. These
//! constants are not taken from the unit memorias.
//!
//! ## Example
//!
//! ```rust
//! use fime_core::hydraulic_profile::{build_profile, DEFAULT_START_ELEVATION};
//!
//! let nodes = build_profile(1.0, DEFAULT_START_ELEVATION, 2.0);
//! assert_eq!(nodes.first().unwrap().id, "grit_chamber");
//! assert_eq!(nodes.last().unwrap().id, "storage");
//! assert!(nodes.last().unwrap().water_level < DEFAULT_START_ELEVATION);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::{segment_losses, Fitting, PipeSegment};
use crate::materials::{granulometry_for, TreatmentUnit};

/// Water level at the intake when none is given (m)
pub const DEFAULT_START_ELEVATION: f64 = 100.0;

/// Intake pipe length (m)
const INTAKE_LENGTH_M: f64 = 50.0;

/// Hazen-Williams C of the intake pipe (new PVC)
const INTAKE_C_FACTOR: f64 = 150.0;

const INTAKE_FITTINGS: [Fitting; 3] = [Fitting::EntranceSharp, Fitting::Elbow90, Fitting::GateValveOpen];

/// Grit chamber depth (m)
const GRIT_CHAMBER_DEPTH_M: f64 = 1.5;

/// Storage tank depth (m)
const STORAGE_DEPTH_M: f64 = 2.5;

/// Kind of point on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Unit,
    Pipe,
    Valve,
    Drop,
}

/// One point on the hydraulic profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydraulicNode {
    pub id: String,
    pub name: String,
    pub node_type: NodeType,
    /// Floor of the unit (m)
    pub bottom_elevation: f64,
    /// Water surface (m)
    pub water_level: f64,
    /// Head loss charged at this node (m)
    pub head_loss: f64,
    /// Head loss from the intake up to and including this node (m)
    pub accumulated_loss: f64,
}

/// Fixed parameters of one profile stage.
struct ProfileStage {
    id: &'static str,
    name: &'static str,
    /// Level step from the previous stage (m)
    geometric_drop_m: f64,
    /// Worst-case operating loss (m)
    operational_loss_m: f64,
    depth_m: f64,
}

/// Stages after the grit chamber, in flow order.
fn downstream_stages() -> [ProfileStage; 4] {
    [
        ProfileStage {
            id: "prefilter",
            name: TreatmentUnit::Prefilter.display_name(),
            geometric_drop_m: 0.30,
            operational_loss_m: 0.30,
            depth_m: granulometry_for(TreatmentUnit::Prefilter).total_structure_height_m(),
        },
        ProfileStage {
            id: "coarse_filter",
            name: TreatmentUnit::CoarseFilter.display_name(),
            geometric_drop_m: 0.50,
            operational_loss_m: 0.60,
            depth_m: granulometry_for(TreatmentUnit::CoarseFilter).total_structure_height_m(),
        },
        ProfileStage {
            id: "slow_sand_filter",
            name: TreatmentUnit::SlowSandFilter.display_name(),
            geometric_drop_m: 0.30,
            operational_loss_m: 1.00,
            depth_m: granulometry_for(TreatmentUnit::SlowSandFilter).total_structure_height_m(),
        },
        ProfileStage {
            id: "storage",
            name: "Storage tank",
            geometric_drop_m: 0.50,
            operational_loss_m: 0.05,
            depth_m: STORAGE_DEPTH_M,
        },
    ]
}

/// The intake pipe as a segment descriptor.
pub fn intake_segment(flow_lps: f64, pipe_diameter_inch: f64) -> PipeSegment {
    PipeSegment {
        length_m: INTAKE_LENGTH_M,
        diameter_in: pipe_diameter_inch,
        material: "PVC".to_string(),
        c_factor: INTAKE_C_FACTOR,
        flow_lps,
        fittings: INTAKE_FITTINGS.iter().map(|f| f.name().to_string()).collect(),
    }
}

/// Build the hydraulic profile of the train.
///
/// # Arguments
///
/// * `flow_lps` - Design flow (L/s)
/// * `start_elevation` - Water level at the intake (m), usually [`DEFAULT_START_ELEVATION`]
/// * `pipe_diameter_inch` - Intake pipe diameter (in)
///
/// # Returns
///
/// Five nodes, grit chamber first and storage last. Accumulated loss never
/// decreases along the sequence and the water level always falls.
pub fn build_profile(flow_lps: f64, start_elevation: f64, pipe_diameter_inch: f64) -> Vec<HydraulicNode> {
    let intake = segment_losses(&intake_segment(flow_lps, pipe_diameter_inch));
    let intake_loss = intake.total_m();

    let mut nodes = Vec::with_capacity(5);
    let mut water_level = start_elevation - intake_loss;
    let mut accumulated = intake_loss;

    nodes.push(HydraulicNode {
        id: "grit_chamber".to_string(),
        name: "Grit chamber".to_string(),
        node_type: NodeType::Unit,
        bottom_elevation: water_level - GRIT_CHAMBER_DEPTH_M,
        water_level,
        head_loss: intake_loss,
        accumulated_loss: accumulated,
    });

    for stage in downstream_stages() {
        water_level -= stage.geometric_drop_m + stage.operational_loss_m;
        accumulated += stage.operational_loss_m;
        nodes.push(HydraulicNode {
            id: stage.id.to_string(),
            name: stage.name.to_string(),
            node_type: NodeType::Unit,
            bottom_elevation: water_level - stage.depth_m,
            water_level,
            head_loss: stage.operational_loss_m,
            accumulated_loss: accumulated,
        });
    }

    log::debug!(
        "hydraulic profile: intake loss {:.3} m (v = {:.2} m/s), total {:.3} m",
        intake_loss,
        intake.velocity_m_s,
        accumulated
    );
    nodes
}

/// Total level difference between the intake and the storage water surface (m).
pub fn total_head_required(nodes: &[HydraulicNode], start_elevation: f64) -> f64 {
    nodes
        .last()
        .map(|n| start_elevation - n.water_level)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{friction_loss, minor_losses};
    use approx::assert_relative_eq;

    #[test]
    fn test_node_sequence() {
        let nodes = build_profile(1.0, DEFAULT_START_ELEVATION, 2.0);
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["grit_chamber", "prefilter", "coarse_filter", "slow_sand_filter", "storage"]);
    }

    #[test]
    fn test_intake_loss_charged_to_grit_chamber() {
        let nodes = build_profile(1.0, 100.0, 2.0);
        let expected = friction_loss(50.0, 1.0, 2.0, 150.0) + minor_losses(1.0, 2.0, &[0.5, 0.9, 0.2]);
        assert_relative_eq!(nodes[0].head_loss, expected, epsilon = 1e-12);
        assert_relative_eq!(nodes[0].water_level, 100.0 - expected, epsilon = 1e-12);
    }

    #[test]
    fn test_losses_accumulate_and_levels_fall() {
        let nodes = build_profile(2.5, 100.0, 3.0);
        for pair in nodes.windows(2) {
            assert!(pair[1].accumulated_loss >= pair[0].accumulated_loss);
            assert!(pair[1].water_level < pair[0].water_level);
        }
        assert!(nodes.iter().all(|n| n.bottom_elevation < n.water_level));
    }

    #[test]
    fn test_worst_case_constants() {
        let nodes = build_profile(1.0, 100.0, 2.0);
        assert_eq!(nodes[3].head_loss, 1.0);
        // drops 0.3 + 0.5 + 0.3 + 0.5 and losses 0.3 + 0.6 + 1.0 + 0.05
        let downstream = nodes[0].water_level - nodes[4].water_level;
        assert_relative_eq!(downstream, 3.55, epsilon = 1e-9);
        assert_relative_eq!(nodes[4].accumulated_loss - nodes[0].accumulated_loss, 1.95, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_flow_still_falls() {
        let nodes = build_profile(0.0, 100.0, 2.0);
        assert_eq!(nodes[0].accumulated_loss, 0.0);
        assert!(nodes.last().unwrap().water_level < 100.0);
    }

    #[test]
    fn test_total_head_required() {
        let nodes = build_profile(1.0, 100.0, 2.0);
        let total = total_head_required(&nodes, 100.0);
        assert_relative_eq!(total, nodes[0].head_loss + 3.55, epsilon = 1e-9);
        assert_eq!(total_head_required(&[], 100.0), 0.0);
    }
}

//! Inter-cell Load Coordinator
//!
//! Records the load neighbouring cells report over X2 and turns the
//! aggregate into an edge subband width proposal on reconfiguration. Load
//! reports never touch the active RBG maps.

use crate::bandwidth::BandwidthConfig;
use crate::FfrError;
use common::types::CellId;
use interfaces::{CellInformationItem, InterferenceOverloadIndication};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Last load reported by one neighbour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NeighborLoad {
    /// Load score in [0, 1]
    pub load: f64,
    /// Reports received from this neighbour
    pub reports: u64,
}

/// Load score of one cell information item, in [0, 1]
///
/// UL overload indications weigh high as 1 and medium as 0.5; without them
/// the share of PRBs flagged in RNTP is used. High interference indications
/// addressed to `own_cell` raise the score to their PRB share.
pub fn load_score(own_cell: CellId, item: &CellInformationItem) -> f64 {
    let overload = if !item.ul_interference_overload.is_empty() {
        let sum: f64 = item
            .ul_interference_overload
            .iter()
            .map(|indication| match indication {
                InterferenceOverloadIndication::High => 1.0,
                InterferenceOverloadIndication::Medium => 0.5,
                InterferenceOverloadIndication::Low => 0.0,
            })
            .sum();
        sum / item.ul_interference_overload.len() as f64
    } else {
        item.relative_narrowband_tx_band
            .as_ref()
            .map_or(0.0, |rntp| share_set(&rntp.per_prb))
    };

    let targeted = item
        .ul_high_interference
        .iter()
        .filter(|hii| hii.target_cell_id == own_cell)
        .map(|hii| share_set(&hii.indication))
        .fold(0.0, f64::max);

    overload.max(targeted)
}

fn share_set(flags: &[bool]) -> f64 {
    if flags.is_empty() {
        return 0.0;
    }
    flags.iter().filter(|&&f| f).count() as f64 / flags.len() as f64
}

/// Per-neighbour load state
#[derive(Debug, Clone)]
pub struct LoadCoordinator {
    own_cell: CellId,
    neighbors: BTreeMap<CellId, NeighborLoad>,
}

impl LoadCoordinator {
    pub fn new(own_cell: CellId) -> Self {
        Self {
            own_cell,
            neighbors: BTreeMap::new(),
        }
    }

    /// Record the load reported by `neighbor`
    ///
    /// Returns false when the report claims to come from this cell.
    pub fn report(&mut self, neighbor: CellId, item: &CellInformationItem) -> bool {
        if neighbor == self.own_cell {
            warn!("Ignoring load information claiming to come from own cell {}", neighbor);
            return false;
        }

        let load = load_score(self.own_cell, item);
        let entry = self.neighbors.entry(neighbor).or_insert(NeighborLoad { load, reports: 0 });
        entry.load = load;
        entry.reports += 1;

        debug!("Neighbour cell {} load {:.2} ({} reports)", neighbor, load, entry.reports);
        true
    }

    pub fn neighbor(&self, cell: CellId) -> Option<&NeighborLoad> {
        self.neighbors.get(&cell)
    }

    pub fn neighbors(&self) -> impl Iterator<Item = (CellId, &NeighborLoad)> {
        self.neighbors.iter().map(|(&id, load)| (id, load))
    }

    /// Mean load over all neighbours, `None` before any report
    pub fn aggregate_load(&self) -> Option<f64> {
        if self.neighbors.is_empty() {
            return None;
        }
        let sum: f64 = self.neighbors.values().map(|n| n.load).sum();
        Some(sum / self.neighbors.len() as f64)
    }
}

/// Load driven edge subband resizing applied on reconfiguration
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct EdgeAdaptationConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Aggregate load at or above which the edge subband widens
    #[serde(default = "default_high_load")]
    pub high_load: f64,
    /// Aggregate load at or below which the edge subband narrows
    #[serde(default = "default_low_load")]
    pub low_load: f64,
    /// RBs added or removed per reconfiguration
    #[serde(default = "default_step")]
    pub step: u16,
    /// Narrowest edge subband, in RBs
    #[serde(default = "default_min_edge")]
    pub min_edge: u16,
    /// Widest edge subband, in RBs
    #[serde(default = "default_max_edge")]
    pub max_edge: u16,
}

fn default_high_load() -> f64 {
    0.7
}

fn default_low_load() -> f64 {
    0.3
}

fn default_step() -> u16 {
    1
}

fn default_min_edge() -> u16 {
    1
}

fn default_max_edge() -> u16 {
    u16::MAX
}

impl Default for EdgeAdaptationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            high_load: default_high_load(),
            low_load: default_low_load(),
            step: default_step(),
            min_edge: default_min_edge(),
            max_edge: default_max_edge(),
        }
    }
}

impl EdgeAdaptationConfig {
    pub fn validate(&self) -> Result<(), FfrError> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.low_load) || !in_range(self.high_load) || self.low_load > self.high_load {
            return Err(FfrError::InvalidConfiguration(format!(
                "edge adaptation loads must satisfy 0 <= low ({}) <= high ({}) <= 1",
                self.low_load, self.high_load
            )));
        }
        if self.step == 0 || self.min_edge > self.max_edge {
            return Err(FfrError::InvalidConfiguration(format!(
                "edge adaptation needs step > 0 and min_edge ({}) <= max_edge ({})",
                self.min_edge, self.max_edge
            )));
        }
        Ok(())
    }

    /// Partition derived from `base` for the given aggregate load
    ///
    /// `base` and `total` are in allocation units of `unit_rbs` RBs each; the
    /// RB based step and bounds are rounded to whole units (step and minimum
    /// up, maximum down). The edge keeps its offset; widening stops at the
    /// maximum or the end of the band, narrowing stops at the minimum. A width
    /// already outside the bounds is left as is in the direction it would
    /// otherwise move.
    pub fn adapt(&self, base: BandwidthConfig, total: u16, unit_rbs: u16, load: Option<f64>) -> BandwidthConfig {
        let load = match (self.enabled, load) {
            (true, Some(load)) => load,
            _ => return base,
        };

        let unit_rbs = unit_rbs.max(1);
        let step = self.step.div_ceil(unit_rbs).max(1);
        let min_edge = self.min_edge.div_ceil(unit_rbs);
        let max_edge = self.max_edge / unit_rbs;

        let width = base.edge_sub_bandwidth;
        let room = total.saturating_sub(base.edge_sub_band_offset);

        let adapted = if load >= self.high_load {
            let ceiling = max_edge.min(room);
            if width >= ceiling {
                width
            } else {
                width.saturating_add(step).min(ceiling)
            }
        } else if load <= self.low_load {
            if width <= min_edge {
                width
            } else {
                width.saturating_sub(step).max(min_edge)
            }
        } else {
            width
        };

        base.with_edge_sub_bandwidth(adapted)
    }
}

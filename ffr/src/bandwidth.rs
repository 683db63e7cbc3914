//! Bandwidth Partition Model
//!
//! Describes how one direction of the cell band is split into a common
//! subband and a protected edge subband. All quantities are in allocation
//! units of the direction: resource block groups in the downlink, resource
//! blocks in the uplink.

use crate::FfrError;
use common::types::Direction;
use common::utils::{num_rbgs, rbg_size};
use serde::{Deserialize, Serialize};

/// Partition of one direction of the cell band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BandwidthConfig {
    /// Width of the common subband
    pub common_sub_bandwidth: u16,
    /// First unit of the edge subband
    pub edge_sub_band_offset: u16,
    /// Width of the edge subband
    pub edge_sub_bandwidth: u16,
}

impl BandwidthConfig {
    /// Create a new partition
    pub fn new(common_sub_bandwidth: u16, edge_sub_band_offset: u16, edge_sub_bandwidth: u16) -> Self {
        Self {
            common_sub_bandwidth,
            edge_sub_band_offset,
            edge_sub_bandwidth,
        }
    }

    /// Partition with no edge subband
    pub fn unpartitioned(total: u16) -> Self {
        Self::new(total, 0, 0)
    }

    /// One past the last edge unit
    pub fn edge_end(&self) -> u32 {
        self.edge_sub_band_offset as u32 + self.edge_sub_bandwidth as u32
    }

    /// Whether `index` lies inside the edge subband
    pub fn in_edge_region(&self, index: usize) -> bool {
        let index = index as u32;
        index >= self.edge_sub_band_offset as u32 && index < self.edge_end()
    }

    /// Same partition with a different edge width
    pub fn with_edge_sub_bandwidth(self, edge_sub_bandwidth: u16) -> Self {
        Self {
            edge_sub_bandwidth,
            ..self
        }
    }

    /// Check the partition against the direction's total bandwidth
    pub fn validate(&self, direction: Direction, total: u16) -> Result<(), FfrError> {
        if self.common_sub_bandwidth > total {
            return Err(FfrError::InvalidBandwidthConfig {
                direction,
                reason: format!(
                    "common subband {} exceeds cell bandwidth {}",
                    self.common_sub_bandwidth, total
                ),
            });
        }

        if self.edge_end() > total as u32 {
            return Err(FfrError::InvalidBandwidthConfig {
                direction,
                reason: format!(
                    "edge subband offset {} + width {} exceeds cell bandwidth {}",
                    self.edge_sub_band_offset, self.edge_sub_bandwidth, total
                ),
            });
        }

        Ok(())
    }
}

/// Size in RBs of one allocation unit
pub fn unit_size(direction: Direction, bandwidth_rbs: u16) -> u16 {
    match direction {
        Direction::Downlink => rbg_size(bandwidth_rbs),
        Direction::Uplink => 1,
    }
}

/// Number of allocation units in a cell of `bandwidth_rbs`
pub fn total_units(direction: Direction, bandwidth_rbs: u16) -> u16 {
    match direction {
        Direction::Downlink => num_rbgs(bandwidth_rbs),
        Direction::Uplink => bandwidth_rbs,
    }
}

/// Three-cell strict reuse plan for one cell bandwidth, in RBs
struct StrictReusePreset {
    bandwidth_rbs: u16,
    common_sub_bandwidth: u16,
    /// Edge offset past the common subband, per cell type 1..=3
    edge_sub_band_offset: [u16; 3],
    /// Edge width, per cell type 1..=3
    edge_sub_bandwidth: [u16; 3],
}

const STRICT_REUSE_PRESETS: [StrictReusePreset; 5] = [
    StrictReusePreset { bandwidth_rbs: 15, common_sub_bandwidth: 2, edge_sub_band_offset: [0, 4, 8], edge_sub_bandwidth: [4, 4, 4] },
    StrictReusePreset { bandwidth_rbs: 25, common_sub_bandwidth: 6, edge_sub_band_offset: [0, 6, 12], edge_sub_bandwidth: [6, 6, 6] },
    StrictReusePreset { bandwidth_rbs: 50, common_sub_bandwidth: 21, edge_sub_band_offset: [0, 9, 18], edge_sub_bandwidth: [9, 9, 11] },
    StrictReusePreset { bandwidth_rbs: 75, common_sub_bandwidth: 36, edge_sub_band_offset: [0, 12, 24], edge_sub_bandwidth: [12, 12, 15] },
    StrictReusePreset { bandwidth_rbs: 100, common_sub_bandwidth: 28, edge_sub_band_offset: [0, 24, 48], edge_sub_bandwidth: [24, 24, 24] },
];

/// Preset partition for a reuse cell type (1..=3), in allocation units
///
/// The edge subband starts right after the common subband shifted by the
/// cell type's offset, so the three cell types get disjoint edge subbands.
pub fn preset(direction: Direction, cell_type: u8, bandwidth_rbs: u16) -> Result<BandwidthConfig, FfrError> {
    let row = STRICT_REUSE_PRESETS
        .iter()
        .find(|row| row.bandwidth_rbs == bandwidth_rbs);

    let (row, idx) = match (row, cell_type) {
        (Some(row), 1..=3) => (row, cell_type as usize - 1),
        _ => {
            return Err(FfrError::NoPreset {
                cell_type,
                bandwidth_rbs,
            })
        }
    };

    let size = unit_size(direction, bandwidth_rbs);
    let common = row.common_sub_bandwidth / size;

    Ok(BandwidthConfig {
        common_sub_bandwidth: common,
        edge_sub_band_offset: common + row.edge_sub_band_offset[idx] / size,
        edge_sub_bandwidth: row.edge_sub_bandwidth[idx] / size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_band_end() {
        let config = BandwidthConfig::new(0, 20, 5);
        assert!(config.validate(Direction::Downlink, 25).is_ok());
    }

    #[test]
    fn test_validate_rejects_overflowing_edge() {
        let config = BandwidthConfig::new(0, 20, 8);
        let err = config.validate(Direction::Downlink, 25).unwrap_err();
        assert!(matches!(
            err,
            FfrError::InvalidBandwidthConfig { direction: Direction::Downlink, .. }
        ));
    }

    #[test]
    fn test_validate_rejects_wide_common() {
        let config = BandwidthConfig::new(26, 0, 0);
        assert!(config.validate(Direction::Uplink, 25).is_err());
    }

    #[test]
    fn test_validate_no_overflow_on_large_values() {
        let config = BandwidthConfig::new(0, u16::MAX, u16::MAX);
        assert!(config.validate(Direction::Uplink, u16::MAX).is_err());
    }

    #[test]
    fn test_edge_region() {
        let config = BandwidthConfig::new(0, 20, 5);
        assert!(!config.in_edge_region(19));
        assert!(config.in_edge_region(20));
        assert!(config.in_edge_region(24));
        assert!(!config.in_edge_region(25));
    }

    #[test]
    fn test_units() {
        assert_eq!(total_units(Direction::Downlink, 100), 25);
        assert_eq!(total_units(Direction::Uplink, 100), 100);
        assert_eq!(unit_size(Direction::Downlink, 50), 3);
        assert_eq!(unit_size(Direction::Uplink, 50), 1);
    }

    #[test]
    fn test_uplink_presets_are_disjoint() {
        let cells: Vec<_> = (1..=3)
            .map(|t| preset(Direction::Uplink, t, 25).unwrap())
            .collect();

        assert_eq!(cells[0], BandwidthConfig::new(6, 6, 6));
        assert_eq!(cells[1], BandwidthConfig::new(6, 12, 6));
        assert_eq!(cells[2], BandwidthConfig::new(6, 18, 6));

        for pair in cells.windows(2) {
            assert!(pair[0].edge_end() <= pair[1].edge_sub_band_offset as u32);
        }
    }

    #[test]
    fn test_presets_fit_cell_bandwidth() {
        for bw in [15, 25, 50, 75, 100] {
            for cell_type in 1..=3 {
                for direction in Direction::ALL {
                    let config = preset(direction, cell_type, bw).unwrap();
                    assert!(config.validate(direction, total_units(direction, bw)).is_ok());
                }
            }
        }
    }

    #[test]
    fn test_downlink_preset_in_rbgs() {
        // 100 RBs, RBG size 4
        let config = preset(Direction::Downlink, 3, 100).unwrap();
        assert_eq!(config, BandwidthConfig::new(7, 19, 6));
    }

    #[test]
    fn test_missing_preset() {
        assert_eq!(
            preset(Direction::Downlink, 1, 6),
            Err(FfrError::NoPreset { cell_type: 1, bandwidth_rbs: 6 })
        );
        assert!(preset(Direction::Downlink, 4, 25).is_err());
        assert!(preset(Direction::Downlink, 0, 25).is_err());
    }
}

//! RBG Map Builder
//!
//! Derives the per-direction availability maps from a bandwidth partition.
//! Center UEs may use the whole band under strict reuse, so the "all" map is
//! fully set; edge UEs are confined to the "edge" map.

use crate::bandwidth::BandwidthConfig;
use crate::FfrError;
use common::types::Direction;
use interfaces::RbgMap;
use tracing::debug;

/// Availability maps of one direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionMaps {
    direction: Direction,
    total: u16,
    partition: BandwidthConfig,
    all: RbgMap,
    edge: RbgMap,
}

impl DirectionMaps {
    /// Build the maps for `partition` over `total` allocation units
    ///
    /// Fails without side effects when the partition does not fit.
    pub fn build(direction: Direction, total: u16, partition: BandwidthConfig) -> Result<Self, FfrError> {
        partition.validate(direction, total)?;

        let all = RbgMap::filled(total as usize, true);
        let edge: RbgMap = (0..total as usize)
            .map(|i| partition.in_edge_region(i))
            .collect::<Vec<_>>()
            .into();

        debug!(
            "{} maps built: {} units, edge [{}, {})",
            direction,
            total,
            partition.edge_sub_band_offset,
            partition.edge_end()
        );

        Ok(Self {
            direction,
            total,
            partition,
            all,
            edge,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of allocation units
    pub fn total(&self) -> u16 {
        self.total
    }

    pub fn partition(&self) -> BandwidthConfig {
        self.partition
    }

    /// Map of units allocatable to some UE
    pub fn all(&self) -> &RbgMap {
        &self.all
    }

    /// Map of units inside the protected edge subband
    pub fn edge(&self) -> &RbgMap {
        &self.edge
    }

    /// Admission decision for one unit
    pub fn is_available(&self, index: usize, edge_ue: bool) -> bool {
        if edge_ue {
            self.edge.get(index)
        } else {
            self.all.get(index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_maps() {
        let maps = DirectionMaps::build(Direction::Downlink, 25, BandwidthConfig::new(0, 20, 5)).unwrap();

        assert_eq!(maps.all().len(), 25);
        assert_eq!(maps.edge().len(), 25);
        assert_eq!(maps.all().count_available(), 25);
        assert_eq!(maps.edge().available_indices().collect::<Vec<_>>(), vec![20, 21, 22, 23, 24]);
        assert!(maps.edge().is_subset_of(maps.all()));
    }

    #[test]
    fn test_admission() {
        let maps = DirectionMaps::build(Direction::Uplink, 10, BandwidthConfig::new(4, 4, 3)).unwrap();

        assert!(maps.is_available(0, false));
        assert!(!maps.is_available(0, true));
        assert!(maps.is_available(5, true));
        assert!(!maps.is_available(7, true));
        assert!(!maps.is_available(10, false));
    }

    #[test]
    fn test_invalid_partition_rejected() {
        let result = DirectionMaps::build(Direction::Downlink, 25, BandwidthConfig::new(0, 20, 8));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_edge() {
        let maps = DirectionMaps::build(Direction::Downlink, 13, BandwidthConfig::unpartitioned(13)).unwrap();
        assert_eq!(maps.edge().count_available(), 0);
        assert!(maps.edge().is_subset_of(maps.all()));
    }

    #[test]
    fn test_map_properties_for_all_valid_partitions() {
        let total = 12u16;
        for offset in 0..=total {
            for width in 0..=(total - offset) {
                let partition = BandwidthConfig::new(total, offset, width);
                let maps = DirectionMaps::build(Direction::Downlink, total, partition).unwrap();
                assert_eq!(maps.all().len(), total as usize);
                assert_eq!(maps.edge().len(), total as usize);
                assert!(maps.edge().is_subset_of(maps.all()));
                assert_eq!(maps.edge().count_available(), width as usize);
            }
        }
    }
}

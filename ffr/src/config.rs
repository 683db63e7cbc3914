//! Strict Frequency Reuse Configuration
//!
//! Explicit per-cell configuration passed at construction

use crate::bandwidth::BandwidthConfig;
use crate::classifier::EdgeTieBreak;
use crate::load::EdgeAdaptationConfig;
use crate::FfrError;
use common::types::{CellId, Direction};
use interfaces::PaOffset;
use serde::{Deserialize, Serialize};

/// Highest RSRQ range value (TS 36.133)
pub const MAX_RSRQ_RANGE: u8 = 34;

/// Highest TPC command carried in a 2-bit DCI field
pub const MAX_TPC: u8 = 3;

/// Strict reuse algorithm configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrictFrConfig {
    /// Cell served by this algorithm instance
    pub cell_id: CellId,
    /// Reuse cell type 1..=3 selects a preset partition; 0 uses the explicit partitions
    #[serde(default)]
    pub fr_cell_type: u8,
    /// Downlink bandwidth in RBs
    #[serde(default = "default_bandwidth_rbs")]
    pub dl_bandwidth_rbs: u16,
    /// Uplink bandwidth in RBs
    #[serde(default = "default_bandwidth_rbs")]
    pub ul_bandwidth_rbs: u16,
    /// Downlink partition in RBGs, used when `fr_cell_type` is 0
    #[serde(default)]
    pub dl_partition: Option<BandwidthConfig>,
    /// Uplink partition in RBs, used when `fr_cell_type` is 0
    #[serde(default)]
    pub ul_partition: Option<BandwidthConfig>,
    /// RSRQ range value below which a UE is an edge UE
    #[serde(default = "default_edge_threshold")]
    pub edge_subband_threshold: u8,
    /// Area for an RSRQ equal to the threshold
    #[serde(default)]
    pub threshold_tie_break: EdgeTieBreak,
    /// PDSCH power offset for center UEs
    #[serde(default)]
    pub center_area_power_offset: PaOffset,
    /// PDSCH power offset for edge UEs
    #[serde(default)]
    pub edge_area_power_offset: PaOffset,
    /// TPC for center UEs; absolute mode, 1 maps to -1 dB (TS 36.213 Table 5.1.1.1-2)
    #[serde(default = "default_tpc")]
    pub center_area_tpc: u8,
    /// TPC for edge UEs
    #[serde(default = "default_tpc")]
    pub edge_area_tpc: u8,
    /// Restrict uplink allocations as well as downlink
    #[serde(default = "default_enabled_in_uplink")]
    pub enabled_in_uplink: bool,
    /// Report interval requested from the RRC
    #[serde(default = "default_report_interval_ms")]
    pub meas_report_interval_ms: u16,
    #[serde(default)]
    pub edge_adaptation: EdgeAdaptationConfig,
}

fn default_bandwidth_rbs() -> u16 {
    25
}

fn default_edge_threshold() -> u8 {
    20
}

fn default_tpc() -> u8 {
    1
}

fn default_enabled_in_uplink() -> bool {
    true
}

fn default_report_interval_ms() -> u16 {
    120
}

impl StrictFrConfig {
    /// Defaults for `cell_id`: 25 RBs, explicit partitions, no edge subband
    pub fn new(cell_id: CellId) -> Self {
        Self {
            cell_id,
            fr_cell_type: 0,
            dl_bandwidth_rbs: default_bandwidth_rbs(),
            ul_bandwidth_rbs: default_bandwidth_rbs(),
            dl_partition: None,
            ul_partition: None,
            edge_subband_threshold: default_edge_threshold(),
            threshold_tie_break: EdgeTieBreak::default(),
            center_area_power_offset: PaOffset::default(),
            edge_area_power_offset: PaOffset::default(),
            center_area_tpc: default_tpc(),
            edge_area_tpc: default_tpc(),
            enabled_in_uplink: default_enabled_in_uplink(),
            meas_report_interval_ms: default_report_interval_ms(),
            edge_adaptation: EdgeAdaptationConfig::default(),
        }
    }

    /// Cell bandwidth in RBs for `direction`
    pub fn bandwidth_rbs(&self, direction: Direction) -> u16 {
        match direction {
            Direction::Downlink => self.dl_bandwidth_rbs,
            Direction::Uplink => self.ul_bandwidth_rbs,
        }
    }

    /// Explicit partition for `direction`
    pub fn partition(&self, direction: Direction) -> Option<BandwidthConfig> {
        match direction {
            Direction::Downlink => self.dl_partition,
            Direction::Uplink => self.ul_partition,
        }
    }

    /// Whether partitions come from the preset table
    pub fn uses_preset(&self) -> bool {
        self.fr_cell_type != 0
    }

    /// Check scalar settings; partitions are checked when maps are built
    pub fn validate(&self) -> Result<(), FfrError> {
        if self.fr_cell_type > 3 {
            return Err(FfrError::InvalidConfiguration(format!(
                "fr_cell_type must be 0..=3, got {}",
                self.fr_cell_type
            )));
        }
        if self.dl_bandwidth_rbs == 0 || self.ul_bandwidth_rbs == 0 {
            return Err(FfrError::InvalidConfiguration("cell bandwidth must be non-zero".into()));
        }
        if self.edge_subband_threshold > MAX_RSRQ_RANGE {
            return Err(FfrError::InvalidConfiguration(format!(
                "edge_subband_threshold {} exceeds RSRQ range {}",
                self.edge_subband_threshold, MAX_RSRQ_RANGE
            )));
        }
        if self.center_area_tpc > MAX_TPC || self.edge_area_tpc > MAX_TPC {
            return Err(FfrError::InvalidConfiguration(format!(
                "TPC values must be 0..={}, got center {} edge {}",
                MAX_TPC, self.center_area_tpc, self.edge_area_tpc
            )));
        }
        self.edge_adaptation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_defaults() {
        let yaml = "cell_id: 2\nfr_cell_type: 2\ndl_bandwidth_rbs: 50\n";
        let config: StrictFrConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.cell_id, CellId(2));
        assert!(config.uses_preset());
        assert_eq!(config.bandwidth_rbs(Direction::Downlink), 50);
        assert_eq!(config.bandwidth_rbs(Direction::Uplink), 25);
        assert_eq!(config.edge_subband_threshold, 20);
        assert_eq!(config.threshold_tie_break, EdgeTieBreak::Center);
        assert_eq!(config.center_area_power_offset, PaOffset::Db0);
        assert!(config.enabled_in_uplink);
        assert!(!config.edge_adaptation.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_explicit_partition() {
        let yaml = r#"
cell_id: 1
dl_bandwidth_rbs: 100
dl_partition:
  common_sub_bandwidth: 0
  edge_sub_band_offset: 20
  edge_sub_bandwidth: 5
threshold_tie_break: edge
edge_area_power_offset: db_minus3
edge_area_tpc: 3
"#;
        let config: StrictFrConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.partition(Direction::Downlink), Some(BandwidthConfig::new(0, 20, 5)));
        assert_eq!(config.partition(Direction::Uplink), None);
        assert_eq!(config.threshold_tie_break, EdgeTieBreak::Edge);
        assert_eq!(config.edge_area_power_offset, PaOffset::DbMinus3);
        assert_eq!(config.edge_area_tpc, 3);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let mut config = StrictFrConfig::new(CellId(1));
        config.edge_area_tpc = 4;
        assert!(config.validate().is_err());

        let mut config = StrictFrConfig::new(CellId(1));
        config.edge_subband_threshold = 35;
        assert!(config.validate().is_err());

        let mut config = StrictFrConfig::new(CellId(1));
        config.fr_cell_type = 4;
        assert!(config.validate().is_err());
    }
}

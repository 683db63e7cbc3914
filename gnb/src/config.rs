//! Cell Runtime Configuration
//!
//! YAML (or TOML) file describing the cell, the reuse flavour, the run length
//! and the scripted events fed to the cell

use common::types::{Direction, Rnti};
use ffr::{BandwidthConfig, FrAlgorithmKind, StrictFrConfig};
use interfaces::{CellInformationItem, LoadInformation, MeasId, MeasResults};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cell::CellEvent;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CellRuntimeConfig {
    /// Reuse flavour
    #[serde(default)]
    pub algorithm: FrAlgorithmKind,
    /// Frequency reuse configuration of the cell
    pub cell: StrictFrConfig,
    /// Run length and pacing
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Randomly moving UEs
    #[serde(default)]
    pub synthetic_ues: Option<SyntheticUeConfig>,
    /// Scripted events
    #[serde(default)]
    pub events: Vec<ScheduledEvent>,
}

/// Run length and pacing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Number of TTIs to run
    #[serde(default = "default_ttis")]
    pub ttis: u32,
    /// TTI duration in microseconds
    #[serde(default = "default_tti_us")]
    pub tti_us: u64,
    /// Pace TTIs on the wall clock instead of running as fast as possible
    #[serde(default)]
    pub realtime: bool,
    /// TTIs between statistics log lines
    #[serde(default = "default_summary_interval")]
    pub summary_interval_ttis: u32,
}

fn default_ttis() -> u32 {
    1000
}

fn default_tti_us() -> u64 {
    1000
}

fn default_summary_interval() -> u32 {
    200
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ttis: default_ttis(),
            tti_us: default_tti_us(),
            realtime: false,
            summary_interval_ttis: default_summary_interval(),
        }
    }
}

/// Synthetic UEs with a random walk RSRQ
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyntheticUeConfig {
    /// Number of UEs
    pub count: u16,
    /// RNTI of the first UE, the others follow consecutively
    #[serde(default = "default_first_rnti")]
    pub first_rnti: u16,
    /// RNG seed
    #[serde(default)]
    pub seed: u64,
    /// TTIs between two reports of one UE
    #[serde(default = "default_report_interval_ttis")]
    pub report_interval_ttis: u32,
    /// Largest RSRQ change between two reports
    #[serde(default = "default_rsrq_step")]
    pub rsrq_step: u8,
}

fn default_first_rnti() -> u16 {
    100
}

fn default_report_interval_ttis() -> u32 {
    120
}

fn default_rsrq_step() -> u8 {
    3
}

/// Event injected at a given TTI
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduledEvent {
    /// TTI the event is submitted before
    pub at_tti: u32,
    #[serde(flatten)]
    pub event: ScriptedEvent,
}

/// Scripted cell input
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptedEvent {
    /// UE measurement report
    MeasReport {
        rnti: u16,
        rsrq: u8,
        #[serde(default)]
        rsrp: u8,
        /// Defaults to the id the RRC assigned to the FFR report configuration
        #[serde(default)]
        meas_id: Option<u8>,
    },
    /// X2 load information
    LoadInformation {
        cell_information: Vec<CellInformationItem>,
    },
    /// UE leaves the cell
    Detach { rnti: u16 },
    /// Explicit partition
    Configure {
        direction: Direction,
        partition: BandwidthConfig,
    },
    /// Cell bandwidth change
    SetBandwidth {
        direction: Direction,
        bandwidth_rbs: u16,
    },
    /// Operator triggered reconfiguration
    Reconfigure,
}

impl ScriptedEvent {
    /// Cell event for this script entry
    pub fn to_cell_event(&self, ffr_meas_id: MeasId) -> CellEvent {
        match self {
            ScriptedEvent::MeasReport { rnti, rsrq, rsrp, meas_id } => CellEvent::MeasReport {
                rnti: Rnti(*rnti),
                results: MeasResults {
                    meas_id: meas_id.map(MeasId).unwrap_or(ffr_meas_id),
                    rsrp_result: *rsrp,
                    rsrq_result: *rsrq,
                },
            },
            ScriptedEvent::LoadInformation { cell_information } => CellEvent::LoadInformation(LoadInformation {
                cell_information: cell_information.clone(),
            }),
            ScriptedEvent::Detach { rnti } => CellEvent::Detach(Rnti(*rnti)),
            ScriptedEvent::Configure { direction, partition } => CellEvent::Configure {
                direction: *direction,
                partition: *partition,
            },
            ScriptedEvent::SetBandwidth { direction, bandwidth_rbs } => CellEvent::SetBandwidth {
                direction: *direction,
                bandwidth_rbs: *bandwidth_rbs,
            },
            ScriptedEvent::Reconfigure => CellEvent::Reconfigure,
        }
    }
}

impl CellRuntimeConfig {
    /// Load configuration from a YAML or TOML file, chosen by extension
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let config: CellRuntimeConfig = match extension {
            "toml" => toml::from_str(&contents)?,
            "yml" | "yaml" => serde_yaml::from_str(&contents)?,
            other => return Err(anyhow::anyhow!("Unsupported configuration format: {:?}", other)),
        };

        Ok(config)
    }

    /// Scripted events in submission order
    ///
    /// Events sharing a TTI keep their order from the file.
    pub fn ordered_events(&self) -> Vec<ScheduledEvent> {
        let mut events = self.events.clone();
        events.sort_by_key(|event| event.at_tti);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
algorithm: strict
cell:
  cell_id: 1
  dl_bandwidth_rbs: 100
  dl_partition:
    common_sub_bandwidth: 0
    edge_sub_band_offset: 20
    edge_sub_bandwidth: 5
simulation:
  ttis: 50
events:
  - at_tti: 10
    kind: reconfigure
  - at_tti: 0
    kind: meas_report
    rnti: 1
    rsrq: 12
  - at_tti: 10
    kind: detach
    rnti: 1
  - at_tti: 5
    kind: load_information
    cell_information:
      - source_cell_id: 2
        ul_interference_overload: [high, low]
  - at_tti: 7
    kind: configure
    direction: downlink
    partition:
      common_sub_bandwidth: 0
      edge_sub_band_offset: 10
      edge_sub_bandwidth: 8
"#;

    #[test]
    fn test_parse_yaml() {
        let config: CellRuntimeConfig = serde_yaml::from_str(YAML).unwrap();
        assert_eq!(config.algorithm, FrAlgorithmKind::Strict);
        assert_eq!(config.simulation.ttis, 50);
        assert_eq!(config.simulation.tti_us, 1000);
        assert!(config.synthetic_ues.is_none());
        assert_eq!(config.events.len(), 5);
    }

    #[test]
    fn test_event_order_is_stable() {
        let config: CellRuntimeConfig = serde_yaml::from_str(YAML).unwrap();
        let events = config.ordered_events();
        let ttis: Vec<_> = events.iter().map(|e| e.at_tti).collect();
        assert_eq!(ttis, vec![0, 5, 7, 10, 10]);

        // reconfigure was listed before detach at TTI 10
        assert!(matches!(events[3].event, ScriptedEvent::Reconfigure));
        assert!(matches!(events[4].event, ScriptedEvent::Detach { rnti: 1 }));
    }

    #[test]
    fn test_meas_report_uses_ffr_meas_id() {
        let event = ScriptedEvent::MeasReport { rnti: 3, rsrq: 9, rsrp: 0, meas_id: None };
        match event.to_cell_event(MeasId(4)) {
            CellEvent::MeasReport { rnti, results } => {
                assert_eq!(rnti, Rnti(3));
                assert_eq!(results.meas_id, MeasId(4));
                assert_eq!(results.rsrq_result, 9);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_shipped_config_builds_a_cell() {
        let config: CellRuntimeConfig = serde_yaml::from_str(include_str!("../../ffr_cell.yml")).unwrap();
        let algorithm = ffr::FrAlgorithm::new(config.algorithm, config.cell.clone()).unwrap();
        assert_eq!(algorithm.kind(), FrAlgorithmKind::Strict);
        assert_eq!(config.cell.dl_partition, Some(BandwidthConfig::new(0, 18, 5)));
        assert_eq!(config.synthetic_ues.map(|ues| ues.count), Some(6));
    }

    #[test]
    fn test_parse_toml() {
        let toml_config = r#"
algorithm = "none"

[cell]
cell_id = 3
fr_cell_type = 3

[synthetic_ues]
count = 4
seed = 7
"#;
        let config: CellRuntimeConfig = toml::from_str(toml_config).unwrap();
        assert_eq!(config.algorithm, FrAlgorithmKind::None);
        assert_eq!(config.cell.fr_cell_type, 3);
        let ues = config.synthetic_ues.unwrap();
        assert_eq!(ues.count, 4);
        assert_eq!(ues.first_rnti, 100);
        assert_eq!(ues.report_interval_ttis, 120);
    }
}

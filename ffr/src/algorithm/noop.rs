//! No-op Frequency Reuse
//!
//! Every allocation unit is available to every UE.

use crate::bandwidth;
use crate::config::StrictFrConfig;
use crate::{FfrError, FfrStats};
use common::types::{Direction, Rnti};
use interfaces::{DlCqiInfo, FfrRrcInterface, FfrSchedulerInterface, LoadInformation, MeasResults, RbgMap, UlCqiInfo};
use tracing::debug;

/// TPC 1: 0 dB in accumulated mode, -1 dB in absolute mode
pub const NOOP_TPC: u8 = 1;

/// Frequency reuse disabled
#[derive(Debug, Clone)]
pub struct NoOpFrAlgorithm {
    dl: RbgMap,
    ul: RbgMap,
    stats: FfrStats,
}

impl NoOpFrAlgorithm {
    /// Create a new instance covering the configured cell bandwidth
    pub fn new(config: &StrictFrConfig) -> Result<Self, FfrError> {
        config.validate()?;

        Ok(Self {
            dl: Self::full_map(Direction::Downlink, config.dl_bandwidth_rbs),
            ul: Self::full_map(Direction::Uplink, config.ul_bandwidth_rbs),
            stats: FfrStats::default(),
        })
    }

    fn full_map(direction: Direction, bandwidth_rbs: u16) -> RbgMap {
        RbgMap::filled(bandwidth::total_units(direction, bandwidth_rbs) as usize, true)
    }

    /// Change the cell bandwidth of `direction`
    pub fn set_cell_bandwidth(&mut self, direction: Direction, bandwidth_rbs: u16) -> Result<(), FfrError> {
        if bandwidth_rbs == 0 {
            return Err(FfrError::InvalidConfiguration("cell bandwidth must be non-zero".into()));
        }

        let map = Self::full_map(direction, bandwidth_rbs);
        match direction {
            Direction::Downlink => self.dl = map,
            Direction::Uplink => self.ul = map,
        }
        Ok(())
    }

    fn map(&self, direction: Direction) -> &RbgMap {
        match direction {
            Direction::Downlink => &self.dl,
            Direction::Uplink => &self.ul,
        }
    }

    /// Total allocation units of `direction`
    pub fn total(&self, direction: Direction) -> u16 {
        self.map(direction).len() as u16
    }

    pub fn stats(&self) -> FfrStats {
        self.stats
    }
}

impl FfrSchedulerInterface for NoOpFrAlgorithm {
    fn get_available_dl_rbg(&self) -> RbgMap {
        self.dl.clone()
    }

    fn is_dl_rbg_available_for_ue(&self, rbg: usize, _rnti: Rnti) -> bool {
        self.dl.get(rbg)
    }

    fn get_available_ul_rbg(&self) -> RbgMap {
        self.ul.clone()
    }

    fn is_ul_rbg_available_for_ue(&self, rbg: usize, _rnti: Rnti) -> bool {
        self.ul.get(rbg)
    }

    fn report_dl_cqi_info(&mut self, _info: &DlCqiInfo) {
        self.stats.cqi_reports += 1;
    }

    fn report_ul_cqi_info(&mut self, _info: &UlCqiInfo) {
        self.stats.cqi_reports += 1;
    }

    fn get_tpc(&self, _rnti: Rnti) -> u8 {
        NOOP_TPC
    }

    fn get_min_continuous_ul_bandwidth(&self) -> u16 {
        self.ul.len() as u16
    }
}

impl FfrRrcInterface for NoOpFrAlgorithm {
    fn report_ue_meas(&mut self, rnti: Rnti, _results: &MeasResults) {
        self.stats.meas_reports += 1;
        debug!("No-op FR ignores measurement from UE {}", rnti);
    }

    fn recv_load_information(&mut self, params: &LoadInformation) {
        self.stats.load_reports += params.cell_information.len() as u64;
    }

    fn remove_ue(&mut self, _rnti: Rnti) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::CellId;
    use interfaces::MeasId;

    #[test]
    fn test_everything_available() {
        let mut ffr = NoOpFrAlgorithm::new(&StrictFrConfig::new(CellId(1))).unwrap();
        ffr.report_ue_meas(
            Rnti(1),
            &MeasResults { meas_id: MeasId(1), rsrp_result: 10, rsrq_result: 0 },
        );

        assert_eq!(ffr.get_available_dl_rbg().len(), 13);
        assert!((0..13).all(|i| ffr.is_dl_rbg_available_for_ue(i, Rnti(1))));
        assert!((0..25).all(|i| ffr.is_ul_rbg_available_for_ue(i, Rnti(1))));
        assert_eq!(ffr.get_tpc(Rnti(1)), NOOP_TPC);
        assert_eq!(ffr.get_min_continuous_ul_bandwidth(), 25);
    }

    #[test]
    fn test_bandwidth_change() {
        let mut ffr = NoOpFrAlgorithm::new(&StrictFrConfig::new(CellId(1))).unwrap();
        ffr.set_cell_bandwidth(Direction::Downlink, 100).unwrap();
        assert_eq!(ffr.total(Direction::Downlink), 25);
        assert!(ffr.set_cell_bandwidth(Direction::Uplink, 0).is_err());
    }
}

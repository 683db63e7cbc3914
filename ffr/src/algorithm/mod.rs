//! Frequency Reuse Algorithm Selection
//!
//! The reuse flavour is chosen once when the cell is built. Both flavours are
//! driven through the same scheduler and RRC interfaces.

pub mod noop;
pub mod strict;

use crate::bandwidth::BandwidthConfig;
use crate::classifier::UeArea;
use crate::config::StrictFrConfig;
use crate::{FfrError, FfrStats};
use common::types::{Direction, Rnti};
use interfaces::{
    DlCqiInfo, FfrRrcInterface, FfrSchedulerInterface, LoadInformation, MeasResults, RbgMap, RrcFfrInterface,
    UlCqiInfo,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub use noop::NoOpFrAlgorithm;
pub use strict::StrictFrAlgorithm;

/// Reuse flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrAlgorithmKind {
    /// No frequency reuse
    None,
    /// Strict (hard) frequency reuse
    #[default]
    Strict,
}

/// A frequency reuse algorithm instance
pub enum FrAlgorithm {
    NoOp(NoOpFrAlgorithm),
    Strict(StrictFrAlgorithm),
}

impl FrAlgorithm {
    /// Build the algorithm of `kind` for the configured cell
    pub fn new(kind: FrAlgorithmKind, config: StrictFrConfig) -> Result<Self, FfrError> {
        info!("Creating {:?} frequency reuse for cell {}", kind, config.cell_id);

        match kind {
            FrAlgorithmKind::None => Ok(FrAlgorithm::NoOp(NoOpFrAlgorithm::new(&config)?)),
            FrAlgorithmKind::Strict => Ok(FrAlgorithm::Strict(StrictFrAlgorithm::new(config)?)),
        }
    }

    pub fn kind(&self) -> FrAlgorithmKind {
        match self {
            FrAlgorithm::NoOp(_) => FrAlgorithmKind::None,
            FrAlgorithm::Strict(_) => FrAlgorithmKind::Strict,
        }
    }

    /// Set RRC interface
    pub fn set_rrc_interface(&mut self, rrc_interface: Arc<dyn RrcFfrInterface>) {
        if let FrAlgorithm::Strict(alg) = self {
            alg.set_rrc_interface(rrc_interface);
        }
    }

    pub fn initialize(&mut self) -> Result<(), FfrError> {
        match self {
            FrAlgorithm::NoOp(_) => Ok(()),
            FrAlgorithm::Strict(alg) => alg.initialize(),
        }
    }

    /// Apply an explicit partition to `direction`
    ///
    /// The partition is still validated when reuse is disabled.
    pub fn configure(&mut self, direction: Direction, partition: BandwidthConfig) -> Result<(), FfrError> {
        match self {
            FrAlgorithm::NoOp(alg) => {
                partition.validate(direction, alg.total(direction))?;
                debug!("No-op FR ignores {} partition {:?}", direction, partition);
                Ok(())
            }
            FrAlgorithm::Strict(alg) => alg.configure(direction, partition),
        }
    }

    pub fn set_cell_bandwidth(&mut self, direction: Direction, bandwidth_rbs: u16) -> Result<(), FfrError> {
        match self {
            FrAlgorithm::NoOp(alg) => alg.set_cell_bandwidth(direction, bandwidth_rbs),
            FrAlgorithm::Strict(alg) => alg.set_cell_bandwidth(direction, bandwidth_rbs),
        }
    }

    pub fn reconfigure(&mut self) -> Result<(), FfrError> {
        match self {
            FrAlgorithm::NoOp(_) => Ok(()),
            FrAlgorithm::Strict(alg) => alg.reconfigure(),
        }
    }

    /// Current area of `rnti`; always `Unset` without reuse
    pub fn ue_area(&self, rnti: Rnti) -> UeArea {
        match self {
            FrAlgorithm::NoOp(_) => UeArea::Unset,
            FrAlgorithm::Strict(alg) => alg.ue_area(rnti),
        }
    }

    pub fn stats(&self) -> FfrStats {
        match self {
            FrAlgorithm::NoOp(alg) => alg.stats(),
            FrAlgorithm::Strict(alg) => alg.stats(),
        }
    }

    pub fn check_invariants(&self) -> Result<(), FfrError> {
        match self {
            FrAlgorithm::NoOp(_) => Ok(()),
            FrAlgorithm::Strict(alg) => alg.check_invariants(),
        }
    }

    fn scheduler(&self) -> &dyn FfrSchedulerInterface {
        match self {
            FrAlgorithm::NoOp(alg) => alg,
            FrAlgorithm::Strict(alg) => alg,
        }
    }

    fn scheduler_mut(&mut self) -> &mut dyn FfrSchedulerInterface {
        match self {
            FrAlgorithm::NoOp(alg) => alg,
            FrAlgorithm::Strict(alg) => alg,
        }
    }

    fn rrc_mut(&mut self) -> &mut dyn FfrRrcInterface {
        match self {
            FrAlgorithm::NoOp(alg) => alg,
            FrAlgorithm::Strict(alg) => alg,
        }
    }
}

impl FfrSchedulerInterface for FrAlgorithm {
    fn get_available_dl_rbg(&self) -> RbgMap {
        self.scheduler().get_available_dl_rbg()
    }

    fn is_dl_rbg_available_for_ue(&self, rbg: usize, rnti: Rnti) -> bool {
        self.scheduler().is_dl_rbg_available_for_ue(rbg, rnti)
    }

    fn get_available_ul_rbg(&self) -> RbgMap {
        self.scheduler().get_available_ul_rbg()
    }

    fn is_ul_rbg_available_for_ue(&self, rbg: usize, rnti: Rnti) -> bool {
        self.scheduler().is_ul_rbg_available_for_ue(rbg, rnti)
    }

    fn report_dl_cqi_info(&mut self, info: &DlCqiInfo) {
        self.scheduler_mut().report_dl_cqi_info(info)
    }

    fn report_ul_cqi_info(&mut self, info: &UlCqiInfo) {
        self.scheduler_mut().report_ul_cqi_info(info)
    }

    fn get_tpc(&self, rnti: Rnti) -> u8 {
        self.scheduler().get_tpc(rnti)
    }

    fn get_min_continuous_ul_bandwidth(&self) -> u16 {
        self.scheduler().get_min_continuous_ul_bandwidth()
    }
}

impl FfrRrcInterface for FrAlgorithm {
    fn report_ue_meas(&mut self, rnti: Rnti, results: &MeasResults) {
        self.rrc_mut().report_ue_meas(rnti, results)
    }

    fn recv_load_information(&mut self, params: &LoadInformation) {
        self.rrc_mut().recv_load_information(params)
    }

    fn remove_ue(&mut self, rnti: Rnti) {
        self.rrc_mut().remove_ue(rnti)
    }
}

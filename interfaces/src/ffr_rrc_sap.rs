//! FFR-RRC Service Access Point
//!
//! The RRC delivers measurement reports, X2 load information and UE detach
//! events to the FFR algorithm; the algorithm asks the RRC for measurement
//! configuration and pushes per-UE PDSCH power offsets back.

use crate::message_types::{LoadInformation, MeasId, MeasResults, PdschConfigDedicated, ReportConfig};
use common::types::Rnti;

/// Interface offered by the FFR algorithm to the RRC
pub trait FfrRrcInterface: Send + Sync {
    /// Measurement report for `rnti`
    fn report_ue_meas(&mut self, rnti: Rnti, results: &MeasResults);

    /// X2 load information from neighbour cells
    fn recv_load_information(&mut self, params: &LoadInformation);

    /// The UE has left the cell
    fn remove_ue(&mut self, rnti: Rnti);
}

/// Interface offered by the RRC to the FFR algorithm
pub trait RrcFfrInterface: Send + Sync {
    /// Install a report configuration on every UE, returning its measurement id
    fn add_ue_meas_report_config_for_ffr(&self, config: ReportConfig) -> MeasId;

    /// Reconfigure the dedicated PDSCH settings of a UE
    fn set_pdsch_config_dedicated(&self, rnti: Rnti, config: PdschConfigDedicated);
}

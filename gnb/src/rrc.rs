//! Cell RRC
//!
//! Holds the measurement report configurations requested by the frequency
//! reuse algorithm and the dedicated PDSCH configuration of each UE.

use common::types::Rnti;
use interfaces::{MeasId, PdschConfigDedicated, ReportConfig, RrcFfrInterface};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct RrcState {
    /// Report configurations, indexed by measurement id - 1
    report_configs: Vec<ReportConfig>,
    /// Measurement id handed to the FFR algorithm
    ffr_meas_id: Option<MeasId>,
    pdsch_configs: HashMap<Rnti, PdschConfigDedicated>,
    pdsch_updates: u64,
}

/// RRC entity of one cell
#[derive(Debug, Default)]
pub struct CellRrc {
    state: Mutex<RrcState>,
}

impl CellRrc {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RrcState> {
        // state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Measurement id of the FFR report configuration, if registered
    pub fn ffr_meas_id(&self) -> Option<MeasId> {
        self.state().ffr_meas_id
    }

    pub fn report_config(&self, meas_id: MeasId) -> Option<ReportConfig> {
        let index = (meas_id.0 as usize).checked_sub(1)?;
        self.state().report_configs.get(index).cloned()
    }

    /// Dedicated PDSCH configuration last pushed for `rnti`
    pub fn pdsch_config(&self, rnti: Rnti) -> Option<PdschConfigDedicated> {
        self.state().pdsch_configs.get(&rnti).copied()
    }

    pub fn pdsch_updates(&self) -> u64 {
        self.state().pdsch_updates
    }
}

impl RrcFfrInterface for CellRrc {
    fn add_ue_meas_report_config_for_ffr(&self, config: ReportConfig) -> MeasId {
        let mut state = self.state();
        let meas_id = match u8::try_from(state.report_configs.len() + 1) {
            Ok(id) => MeasId(id),
            Err(_) => {
                let fallback = state.ffr_meas_id.unwrap_or(MeasId(u8::MAX));
                warn!(
                    "Measurement ids exhausted, {:?} report config not added, keeping id {}",
                    config.event, fallback.0
                );
                return fallback;
            }
        };
        info!(
            "Added {:?} report config ({:?} threshold {}) as measurement id {}",
            config.event, config.trigger_quantity, config.threshold, meas_id.0
        );

        state.report_configs.push(config);
        state.ffr_meas_id = Some(meas_id);
        meas_id
    }

    fn set_pdsch_config_dedicated(&self, rnti: Rnti, config: PdschConfigDedicated) {
        let mut state = self.state();
        state.pdsch_configs.insert(rnti, config);
        state.pdsch_updates += 1;
        debug!("UE {} PDSCH pa set to {} dB", rnti, config.pa.as_db());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interfaces::{MeasEvent, PaOffset, TriggerQuantity};

    fn report_config(threshold: u8) -> ReportConfig {
        ReportConfig {
            event: MeasEvent::A1,
            trigger_quantity: TriggerQuantity::Rsrq,
            threshold,
            report_interval_ms: 120,
        }
    }

    #[test]
    fn test_meas_ids_start_at_one() {
        let rrc = CellRrc::new();
        assert_eq!(rrc.ffr_meas_id(), None);

        assert_eq!(rrc.add_ue_meas_report_config_for_ffr(report_config(20)), MeasId(1));
        assert_eq!(rrc.add_ue_meas_report_config_for_ffr(report_config(25)), MeasId(2));
        assert_eq!(rrc.ffr_meas_id(), Some(MeasId(2)));
        assert_eq!(rrc.report_config(MeasId(1)).unwrap().threshold, 20);
        assert!(rrc.report_config(MeasId(0)).is_none());
    }

    #[test]
    fn test_meas_ids_exhausted() {
        let rrc = CellRrc::new();
        for threshold in 0..=u8::MAX {
            rrc.add_ue_meas_report_config_for_ffr(report_config(threshold));
        }
        assert_eq!(rrc.ffr_meas_id(), Some(MeasId(255)));

        // no id left: the last one is handed out again and nothing is stored
        assert_eq!(rrc.add_ue_meas_report_config_for_ffr(report_config(7)), MeasId(255));
        assert_eq!(rrc.report_config(MeasId(255)).unwrap().threshold, 254);
        assert_eq!(rrc.state().report_configs.len(), 255);
    }

    #[test]
    fn test_pdsch_config_replaced() {
        let rrc = CellRrc::new();
        rrc.set_pdsch_config_dedicated(Rnti(5), PdschConfigDedicated { pa: PaOffset::Db3 });
        rrc.set_pdsch_config_dedicated(Rnti(5), PdschConfigDedicated { pa: PaOffset::DbMinus3 });

        assert_eq!(rrc.pdsch_config(Rnti(5)).unwrap().pa, PaOffset::DbMinus3);
        assert_eq!(rrc.pdsch_config(Rnti(6)), None);
        assert_eq!(rrc.pdsch_updates(), 2);
    }
}

//! Synthetic UEs
//!
//! UEs whose reported RSRQ follows a bounded random walk, so they drift
//! between the cell center and the cell edge during a run.

use common::types::Rnti;
use ffr::config::MAX_RSRQ_RANGE;
use interfaces::{MeasId, MeasResults};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cell::CellEvent;
use crate::config::SyntheticUeConfig;

#[derive(Debug, Clone)]
struct SyntheticUe {
    rnti: Rnti,
    rsrq: u8,
    rsrp: u8,
    /// TTI offset of the first report
    phase: u32,
}

/// Randomly moving UEs
pub struct SyntheticUes {
    ues: Vec<SyntheticUe>,
    rng: StdRng,
    report_interval_ttis: u32,
    rsrq_step: u8,
}

impl SyntheticUes {
    pub fn new(config: &SyntheticUeConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let report_interval_ttis = config.report_interval_ttis.max(1);

        let ues = (0..config.count)
            .map(|i| SyntheticUe {
                rnti: Rnti(config.first_rnti.wrapping_add(i)),
                rsrq: rng.gen_range(0..=MAX_RSRQ_RANGE),
                rsrp: rng.gen_range(20..=70),
                phase: u32::from(i) % report_interval_ttis,
            })
            .collect();

        Self {
            ues,
            rng,
            report_interval_ttis,
            rsrq_step: config.rsrq_step,
        }
    }

    pub fn rntis(&self) -> Vec<Rnti> {
        self.ues.iter().map(|ue| ue.rnti).collect()
    }

    /// Measurement reports due at `tti`
    ///
    /// Reports of one UE are `report_interval_ttis` apart; UEs are staggered
    /// so they do not all report in the same TTI.
    pub fn reports_at(&mut self, tti: u32, meas_id: MeasId) -> Vec<CellEvent> {
        let step = i16::from(self.rsrq_step);
        let mut events = Vec::new();

        for ue in self.ues.iter_mut() {
            if tti % self.report_interval_ttis != ue.phase {
                continue;
            }

            let delta = self.rng.gen_range(-step..=step);
            ue.rsrq = (i16::from(ue.rsrq) + delta).clamp(0, i16::from(MAX_RSRQ_RANGE)) as u8;

            events.push(CellEvent::MeasReport {
                rnti: ue.rnti,
                results: MeasResults {
                    meas_id,
                    rsrp_result: ue.rsrp,
                    rsrq_result: ue.rsrq,
                },
            });
        }

        events
    }
}

//! Cell Event Loop
//!
//! The cell task is the only owner of the frequency reuse algorithm. RRC
//! deliveries, operator commands and TTI ticks arrive on one ordered queue and
//! each runs to completion before the next is taken.

use common::types::{Direction, Rnti};
use common::utils::bytes_to_hex;
use ffr::{BandwidthConfig, FfrError, FfrStats, FrAlgorithm, UeArea};
use interfaces::{FfrRrcInterface, FfrSchedulerInterface, LoadInformation, MeasResults};
use serde::Serialize;
use std::collections::BTreeSet;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

use crate::scheduler::{DemoScheduler, SchedulerStats};

/// Input of the cell event loop
#[derive(Debug, Clone)]
pub enum CellEvent {
    /// Measurement report relayed by the RRC
    MeasReport { rnti: Rnti, results: MeasResults },
    /// X2 load information relayed by the RRC
    LoadInformation(LoadInformation),
    /// UE detached
    Detach(Rnti),
    /// Explicit partition from the operator
    Configure {
        direction: Direction,
        partition: BandwidthConfig,
    },
    /// Cell bandwidth change from the operator
    SetBandwidth { direction: Direction, bandwidth_rbs: u16 },
    /// Operator triggered reconfiguration
    Reconfigure,
    /// Start of a transmission time interval
    Tti(u32),
}

/// Final state of a cell run
#[derive(Debug, Clone, Serialize)]
pub struct CellReport {
    pub ttis: u32,
    pub ffr: FfrStats,
    pub scheduler: SchedulerStats,
    pub edge_ues: Vec<Rnti>,
    pub center_ues: Vec<Rnti>,
}

/// One cell: the reuse algorithm plus its scheduler consumer
pub struct Cell {
    algorithm: FrAlgorithm,
    scheduler: DemoScheduler,
    attached: BTreeSet<Rnti>,
    ttis: u32,
    summary_interval_ttis: u32,
}

impl Cell {
    /// Create a new cell around an initialized algorithm
    pub fn new(algorithm: FrAlgorithm, summary_interval_ttis: u32) -> Self {
        let dl = algorithm.get_available_dl_rbg();
        info!(
            "Cell ready: {} DL RBGs (bitmap {}), {} UL RBs",
            dl.len(),
            bytes_to_hex(&dl.to_bitmap()),
            algorithm.get_available_ul_rbg().len()
        );

        Self {
            algorithm,
            scheduler: DemoScheduler::new(),
            attached: BTreeSet::new(),
            ttis: 0,
            summary_interval_ttis,
        }
    }

    /// Process one event
    ///
    /// Configuration errors are returned to the caller; the algorithm keeps
    /// its previous configuration.
    pub fn handle(&mut self, event: CellEvent) -> Result<(), FfrError> {
        match event {
            CellEvent::MeasReport { rnti, results } => {
                self.attached.insert(rnti);
                self.algorithm.report_ue_meas(rnti, &results);
            }
            CellEvent::LoadInformation(info) => {
                self.algorithm.recv_load_information(&info);
            }
            CellEvent::Detach(rnti) => {
                self.attached.remove(&rnti);
                self.algorithm.remove_ue(rnti);
            }
            CellEvent::Configure { direction, partition } => {
                self.algorithm.configure(direction, partition)?;
            }
            CellEvent::SetBandwidth { direction, bandwidth_rbs } => {
                self.algorithm.set_cell_bandwidth(direction, bandwidth_rbs)?;
            }
            CellEvent::Reconfigure => {
                self.algorithm.reconfigure()?;
            }
            CellEvent::Tti(tti) => self.run_tti(tti),
        }
        Ok(())
    }

    fn run_tti(&mut self, tti: u32) {
        let ues: Vec<Rnti> = self.attached.iter().copied().collect();
        let allocation = self.scheduler.schedule(tti, &ues, &self.algorithm);
        debug!(
            "TTI {}: {} DL grants, {} UL grants",
            tti,
            allocation.dl.len(),
            allocation.ul.len()
        );
        for grant in &allocation.dl {
            trace!("  DL {} RBGs {:?}", grant.rnti, grant.rbgs);
        }
        for grant in &allocation.ul {
            trace!(
                "  UL {} RBs {}..{} TPC {}",
                grant.rnti,
                grant.start_rb,
                grant.start_rb + grant.num_rbs,
                grant.tpc
            );
        }
        self.ttis += 1;

        if self.summary_interval_ttis > 0 && self.ttis % self.summary_interval_ttis == 0 {
            let stats = self.algorithm.stats();
            info!("Cell statistics at TTI {}:", tti);
            info!("  UEs: {} center, {} edge", stats.center_ues, stats.edge_ues);
            info!(
                "  Reports: {} measurement ({} ignored), {} load",
                stats.meas_reports, stats.ignored_meas_reports, stats.load_reports
            );
            info!(
                "  Allocated: {} DL RBGs, {} UL RBs",
                self.scheduler.stats().dl_units_allocated,
                self.scheduler.stats().ul_units_allocated
            );
        }
    }

    /// Drain the event queue until every sender is gone
    pub async fn run(mut self, mut rx: mpsc::Receiver<CellEvent>) -> Result<CellReport, FfrError> {
        info!("Cell event loop started");

        while let Some(event) = rx.recv().await {
            if let Err(e) = self.handle(event) {
                error!("Cell configuration rejected: {}", e);
                return Err(e);
            }
        }

        info!("Cell event loop finished after {} TTIs", self.ttis);
        Ok(self.report())
    }

    /// Snapshot of the cell state
    pub fn report(&self) -> CellReport {
        let area_of = |area: UeArea| -> Vec<Rnti> {
            self.attached
                .iter()
                .copied()
                .filter(|&rnti| self.algorithm.ue_area(rnti) == area)
                .collect()
        };

        CellReport {
            ttis: self.ttis,
            ffr: self.algorithm.stats(),
            scheduler: self.scheduler.stats().clone(),
            edge_ues: area_of(UeArea::CellEdge),
            center_ues: area_of(UeArea::CellCenter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::CellId;
    use ffr::{FrAlgorithmKind, StrictFrConfig};
    use interfaces::MeasId;

    fn strict_cell() -> Cell {
        let config = StrictFrConfig {
            dl_bandwidth_rbs: 100,
            dl_partition: Some(BandwidthConfig::new(0, 20, 5)),
            ..StrictFrConfig::new(CellId(1))
        };
        let algorithm = FrAlgorithm::new(FrAlgorithmKind::Strict, config).unwrap();
        Cell::new(algorithm, 0)
    }

    fn meas(rnti: u16, rsrq: u8) -> CellEvent {
        CellEvent::MeasReport {
            rnti: Rnti(rnti),
            results: MeasResults { meas_id: MeasId(0), rsrp_result: 40, rsrq_result: rsrq },
        }
    }

    #[test]
    fn test_report_then_query_in_order() {
        let mut cell = strict_cell();
        cell.handle(meas(1, 5)).unwrap();
        cell.handle(CellEvent::Tti(0)).unwrap();

        assert!(!cell.algorithm.is_dl_rbg_available_for_ue(0, Rnti(1)));
        let report = cell.report();
        assert_eq!(report.edge_ues, vec![Rnti(1)]);
        assert_eq!(report.ttis, 1);
        // edge UE alone only gets the 5 edge RBGs
        assert_eq!(report.scheduler.dl_units_allocated, 5);
    }

    #[test]
    fn test_invalid_configure_is_reported() {
        let mut cell = strict_cell();
        let result = cell.handle(CellEvent::Configure {
            direction: Direction::Downlink,
            partition: BandwidthConfig::new(0, 20, 8),
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_event_loop_preserves_submission_order() {
        let cell = strict_cell();
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(cell.run(rx));

        tx.send(meas(1, 30)).await.unwrap();
        tx.send(meas(1, 5)).await.unwrap();
        tx.send(meas(2, 5)).await.unwrap();
        tx.send(CellEvent::Tti(0)).await.unwrap();
        tx.send(CellEvent::Detach(Rnti(2))).await.unwrap();
        tx.send(CellEvent::Tti(1)).await.unwrap();
        drop(tx);

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.ttis, 2);
        assert_eq!(report.edge_ues, vec![Rnti(1)]);
        assert!(report.center_ues.is_empty());
        assert_eq!(report.ffr.area_changes, 3);
    }

    #[tokio::test]
    async fn test_event_loop_stops_on_config_error() {
        let cell = strict_cell();
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(cell.run(rx));

        tx.send(CellEvent::SetBandwidth { direction: Direction::Downlink, bandwidth_rbs: 6 })
            .await
            .unwrap();
        drop(tx);

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(FfrError::InvalidBandwidthConfig { .. })));
    }
}

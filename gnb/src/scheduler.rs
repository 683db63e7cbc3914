//! Round-robin Scheduler
//!
//! Minimal MAC scheduler that consumes the frequency reuse restrictions: every
//! downlink RBG and uplink RB handed out has been checked against the
//! per-UE availability query.

use common::types::Rnti;
use interfaces::FfrSchedulerInterface;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// Downlink grant of one UE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlGrant {
    pub rnti: Rnti,
    /// Allocated RBG indices, ascending
    pub rbgs: Vec<usize>,
}

/// Contiguous uplink grant of one UE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UlGrant {
    pub rnti: Rnti,
    pub start_rb: usize,
    pub num_rbs: usize,
    /// TPC command sent with the grant
    pub tpc: u8,
}

/// Scheduling decision for one TTI
#[derive(Debug, Clone, Default)]
pub struct TtiAllocation {
    pub tti: u32,
    pub dl: Vec<DlGrant>,
    pub ul: Vec<UlGrant>,
}

/// Scheduler statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerStats {
    pub ttis: u64,
    pub dl_grants: u64,
    pub ul_grants: u64,
    pub dl_units_allocated: u64,
    pub ul_units_allocated: u64,
    /// Available DL RBGs no UE was allowed to use
    pub dl_units_unusable: u64,
}

/// Round-robin scheduler over the attached UEs
#[derive(Debug, Default)]
pub struct DemoScheduler {
    dl_start: usize,
    ul_start: usize,
    stats: SchedulerStats,
}

impl DemoScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Schedule one TTI for `ues`
    pub fn schedule(&mut self, tti: u32, ues: &[Rnti], ffr: &dyn FfrSchedulerInterface) -> TtiAllocation {
        self.stats.ttis += 1;
        let mut allocation = TtiAllocation { tti, ..Default::default() };
        if ues.is_empty() {
            return allocation;
        }

        allocation.dl = self.schedule_dl(ues, ffr);
        allocation.ul = self.schedule_ul(ues, ffr);

        self.dl_start = (self.dl_start + 1) % ues.len();
        self.ul_start = (self.ul_start + 1) % ues.len();
        allocation
    }

    /// Hand each available RBG to the next UE in turn that may use it
    fn schedule_dl(&mut self, ues: &[Rnti], ffr: &dyn FfrSchedulerInterface) -> Vec<DlGrant> {
        let map = ffr.get_available_dl_rbg();
        let mut grants: BTreeMap<Rnti, Vec<usize>> = BTreeMap::new();
        let mut turn = self.dl_start % ues.len();

        for rbg in map.available_indices() {
            let candidate = (0..ues.len())
                .map(|k| (turn + k) % ues.len())
                .find(|&i| ffr.is_dl_rbg_available_for_ue(rbg, ues[i]));

            match candidate {
                Some(i) => {
                    grants.entry(ues[i]).or_default().push(rbg);
                    turn = (i + 1) % ues.len();
                    self.stats.dl_units_allocated += 1;
                }
                None => {
                    trace!("DL RBG {} unusable by any UE", rbg);
                    self.stats.dl_units_unusable += 1;
                }
            }
        }

        self.stats.dl_grants += grants.len() as u64;
        grants.into_iter().map(|(rnti, rbgs)| DlGrant { rnti, rbgs }).collect()
    }

    /// Give each UE in turn one contiguous run of at most the minimum
    /// continuous uplink bandwidth
    fn schedule_ul(&mut self, ues: &[Rnti], ffr: &dyn FfrSchedulerInterface) -> Vec<UlGrant> {
        let map = ffr.get_available_ul_rbg();
        let max_rbs = ffr.get_min_continuous_ul_bandwidth().max(1) as usize;
        let mut used = vec![false; map.len()];
        let mut grants = Vec::new();

        for k in 0..ues.len() {
            let rnti = ues[(self.ul_start + k) % ues.len()];
            let usable = |rb: usize| map.get(rb) && !used[rb] && ffr.is_ul_rbg_available_for_ue(rb, rnti);

            let Some(start_rb) = (0..map.len()).find(|&rb| usable(rb)) else {
                continue;
            };
            let num_rbs = (start_rb..map.len())
                .take(max_rbs)
                .take_while(|&rb| usable(rb))
                .count();

            used[start_rb..start_rb + num_rbs].iter_mut().for_each(|u| *u = true);
            grants.push(UlGrant {
                rnti,
                start_rb,
                num_rbs,
                tpc: ffr.get_tpc(rnti),
            });
            self.stats.ul_units_allocated += num_rbs as u64;
        }

        self.stats.ul_grants += grants.len() as u64;
        grants
    }
}

//! Strict Frequency Reuse Algorithm
//!
//! Edge UEs may only be scheduled inside the edge subband, which neighbouring
//! cells keep disjoint; center UEs may use the whole band.

use crate::bandwidth::{self, BandwidthConfig};
use crate::classifier::{UeArea, UeClassifier};
use crate::config::StrictFrConfig;
use crate::load::LoadCoordinator;
use crate::power::PowerControl;
use crate::rbg_map::DirectionMaps;
use crate::{FfrError, FfrStats};
use common::types::{CellId, Direction, Rnti};
use interfaces::{
    CellInformationItem, DlCqiInfo, FfrRrcInterface, FfrSchedulerInterface, LoadInformation, MeasEvent, MeasId,
    MeasResults, RbgMap, ReportConfig, RrcFfrInterface, TriggerQuantity, UlCqiInfo,
};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Strict frequency reuse for one cell
pub struct StrictFrAlgorithm {
    config: StrictFrConfig,
    dl_bandwidth_rbs: u16,
    ul_bandwidth_rbs: u16,
    dl: DirectionMaps,
    ul: DirectionMaps,
    /// Partitions reconfiguration starts from
    dl_baseline: BandwidthConfig,
    ul_baseline: BandwidthConfig,
    /// Whether the baseline came from an explicit partition rather than the
    /// preset table or the unpartitioned default
    dl_explicit: bool,
    ul_explicit: bool,
    classifier: UeClassifier,
    power: PowerControl,
    load: LoadCoordinator,
    rrc_interface: Option<Arc<dyn RrcFfrInterface>>,
    /// Measurement id of the FFR report configuration
    meas_id: Option<MeasId>,
    stats: FfrStats,
}

impl StrictFrAlgorithm {
    /// Create a new strict reuse instance and build its maps
    pub fn new(config: StrictFrConfig) -> Result<Self, FfrError> {
        config.validate()?;

        let dl_baseline = Self::initial_partition(&config, Direction::Downlink)?;
        let ul_baseline = Self::initial_partition(&config, Direction::Uplink)?;

        let dl = DirectionMaps::build(
            Direction::Downlink,
            bandwidth::total_units(Direction::Downlink, config.dl_bandwidth_rbs),
            dl_baseline,
        )?;
        let ul = DirectionMaps::build(
            Direction::Uplink,
            bandwidth::total_units(Direction::Uplink, config.ul_bandwidth_rbs),
            ul_baseline,
        )?;

        info!(
            "Strict FR for cell {}: DL edge {:?}, UL edge {:?}, threshold {}",
            config.cell_id, dl_baseline, ul_baseline, config.edge_subband_threshold
        );

        Ok(Self {
            dl_bandwidth_rbs: config.dl_bandwidth_rbs,
            ul_bandwidth_rbs: config.ul_bandwidth_rbs,
            dl,
            ul,
            dl_baseline,
            ul_baseline,
            dl_explicit: !config.uses_preset() && config.dl_partition.is_some(),
            ul_explicit: !config.uses_preset() && config.ul_partition.is_some(),
            classifier: UeClassifier::new(config.edge_subband_threshold, config.threshold_tie_break),
            power: PowerControl::new(&config),
            load: LoadCoordinator::new(config.cell_id),
            rrc_interface: None,
            meas_id: None,
            stats: FfrStats::default(),
            config,
        })
    }

    fn initial_partition(config: &StrictFrConfig, direction: Direction) -> Result<BandwidthConfig, FfrError> {
        let rbs = config.bandwidth_rbs(direction);
        if config.uses_preset() {
            return bandwidth::preset(direction, config.fr_cell_type, rbs);
        }

        Ok(config.partition(direction).unwrap_or_else(|| {
            let total = bandwidth::total_units(direction, rbs);
            warn!("No {} partition configured, edge subband disabled", direction);
            BandwidthConfig::unpartitioned(total)
        }))
    }

    /// Set RRC interface
    pub fn set_rrc_interface(&mut self, rrc_interface: Arc<dyn RrcFfrInterface>) {
        self.rrc_interface = Some(rrc_interface);
    }

    /// Register the RSRQ report configuration with the RRC
    pub fn initialize(&mut self) -> Result<(), FfrError> {
        let rrc = match &self.rrc_interface {
            Some(rrc) => rrc,
            None => {
                warn!("No RRC interface configured, accepting all measurement reports");
                return Ok(());
            }
        };

        let report_config = ReportConfig {
            event: MeasEvent::A1,
            trigger_quantity: TriggerQuantity::Rsrq,
            threshold: self.config.edge_subband_threshold,
            report_interval_ms: self.config.meas_report_interval_ms,
        };
        let meas_id = rrc.add_ue_meas_report_config_for_ffr(report_config);
        self.meas_id = Some(meas_id);

        info!("Strict FR initialized with measurement id {}", meas_id.0);
        Ok(())
    }

    pub fn cell_id(&self) -> CellId {
        self.config.cell_id
    }

    pub fn config(&self) -> &StrictFrConfig {
        &self.config
    }

    fn maps(&self, direction: Direction) -> &DirectionMaps {
        match direction {
            Direction::Downlink => &self.dl,
            Direction::Uplink => &self.ul,
        }
    }

    fn bandwidth_rbs(&self, direction: Direction) -> u16 {
        match direction {
            Direction::Downlink => self.dl_bandwidth_rbs,
            Direction::Uplink => self.ul_bandwidth_rbs,
        }
    }

    /// Active partition of `direction`
    pub fn partition(&self, direction: Direction) -> BandwidthConfig {
        self.maps(direction).partition()
    }

    /// Edge map of `direction`
    pub fn edge_map(&self, direction: Direction) -> RbgMap {
        self.maps(direction).edge().clone()
    }

    /// Publish new maps for `direction`
    fn install(&mut self, maps: DirectionMaps) {
        match maps.direction() {
            Direction::Downlink => self.dl = maps,
            Direction::Uplink => self.ul = maps,
        }
    }

    /// Apply an explicit partition to `direction`
    ///
    /// On error the active configuration is untouched.
    pub fn configure(&mut self, direction: Direction, partition: BandwidthConfig) -> Result<(), FfrError> {
        let total = self.maps(direction).total();
        let maps = DirectionMaps::build(direction, total, partition)?;
        self.install(maps);

        match direction {
            Direction::Downlink => {
                self.dl_baseline = partition;
                self.dl_explicit = true;
            }
            Direction::Uplink => {
                self.ul_baseline = partition;
                self.ul_explicit = true;
            }
        }

        info!("Cell {} {} partition configured: {:?}", self.config.cell_id, direction, partition);
        Ok(())
    }

    /// Change the cell bandwidth of `direction`
    ///
    /// An explicitly configured partition is kept and must fit the new
    /// bandwidth. Otherwise the partition is re-derived: from the preset
    /// table for preset cells, as an empty edge subband for the rest.
    pub fn set_cell_bandwidth(&mut self, direction: Direction, bandwidth_rbs: u16) -> Result<(), FfrError> {
        if bandwidth_rbs == 0 {
            return Err(FfrError::InvalidConfiguration("cell bandwidth must be non-zero".into()));
        }

        let total = bandwidth::total_units(direction, bandwidth_rbs);
        let partition = if self.is_explicit(direction) {
            self.baseline(direction)
        } else if self.config.uses_preset() {
            bandwidth::preset(direction, self.config.fr_cell_type, bandwidth_rbs)?
        } else {
            BandwidthConfig::unpartitioned(total)
        };

        let maps = DirectionMaps::build(direction, total, partition)?;
        self.install(maps);

        match direction {
            Direction::Downlink => {
                self.dl_bandwidth_rbs = bandwidth_rbs;
                self.dl_baseline = partition;
            }
            Direction::Uplink => {
                self.ul_bandwidth_rbs = bandwidth_rbs;
                self.ul_baseline = partition;
            }
        }

        info!("Cell {} {} bandwidth set to {} RBs ({} units)", self.config.cell_id, direction, bandwidth_rbs, total);
        Ok(())
    }

    fn is_explicit(&self, direction: Direction) -> bool {
        match direction {
            Direction::Downlink => self.dl_explicit,
            Direction::Uplink => self.ul_explicit,
        }
    }

    fn baseline(&self, direction: Direction) -> BandwidthConfig {
        match direction {
            Direction::Downlink => self.dl_baseline,
            Direction::Uplink => self.ul_baseline,
        }
    }

    /// Re-derive both partitions from the baseline and neighbour load
    ///
    /// The baseline is the preset partition, or the last explicit partition
    /// when one was configured. Both directions are built before either is
    /// installed, so a failure leaves the cell unchanged.
    pub fn reconfigure(&mut self) -> Result<(), FfrError> {
        let load = self.load.aggregate_load();
        let mut rebuilt = Vec::with_capacity(2);

        for direction in Direction::ALL {
            let rbs = self.bandwidth_rbs(direction);
            let total = bandwidth::total_units(direction, rbs);
            let unit_rbs = bandwidth::unit_size(direction, rbs);
            let partition = self.config.edge_adaptation.adapt(self.baseline(direction), total, unit_rbs, load);
            rebuilt.push(DirectionMaps::build(direction, total, partition)?);
        }

        for maps in rebuilt {
            let direction = maps.direction();
            debug!("{} partition after reconfiguration: {:?}", direction, maps.partition());
            self.install(maps);
        }

        self.stats.reconfigurations += 1;
        info!(
            "Cell {} reconfigured (neighbour load {:?}): DL edge {:?}, UL edge {:?}",
            self.config.cell_id,
            load,
            self.dl.partition(),
            self.ul.partition()
        );
        Ok(())
    }

    /// Classify `rnti` from a measurement value
    pub fn report_measurement(&mut self, rnti: Rnti, measurement: u8) {
        self.stats.meas_reports += 1;

        if let Some(transition) = self.classifier.report_measurement(rnti, measurement) {
            self.stats.area_changes += 1;
            info!("UE {} is now {:?} (RSRQ {})", rnti, transition.to, measurement);

            if let Some(rrc) = &self.rrc_interface {
                rrc.set_pdsch_config_dedicated(rnti, self.power.pdsch_config(transition.to));
            }
        }
    }

    /// Record the load reported by one neighbour
    pub fn report_neighbor_load(&mut self, neighbor: CellId, item: &CellInformationItem) {
        if self.load.report(neighbor, item) {
            self.stats.load_reports += 1;
        }
    }

    /// Current area of `rnti`
    pub fn ue_area(&self, rnti: Rnti) -> UeArea {
        self.classifier.area(rnti)
    }

    pub fn classifier(&self) -> &UeClassifier {
        &self.classifier
    }

    pub fn load(&self) -> &LoadCoordinator {
        &self.load
    }

    pub fn meas_id(&self) -> Option<MeasId> {
        self.meas_id
    }

    pub fn stats(&self) -> FfrStats {
        FfrStats {
            center_ues: self.classifier.num_center_ues(),
            edge_ues: self.classifier.num_edge_ues(),
            ..self.stats
        }
    }

    /// Full consistency check of classifier and maps
    pub fn check_invariants(&self) -> Result<(), FfrError> {
        self.classifier.check_invariants()?;

        for maps in [&self.dl, &self.ul] {
            let direction = maps.direction();
            if maps.all().len() != maps.total() as usize || maps.edge().len() != maps.total() as usize {
                return Err(FfrError::InvariantViolation(format!(
                    "{} maps do not span {} units",
                    direction,
                    maps.total()
                )));
            }
            if !maps.edge().is_subset_of(maps.all()) {
                return Err(FfrError::InvariantViolation(format!("{} edge map exceeds the all map", direction)));
            }
        }

        Ok(())
    }

    fn is_edge_ue(&self, rnti: Rnti) -> bool {
        self.classifier.area(rnti) == UeArea::CellEdge
    }
}

impl FfrSchedulerInterface for StrictFrAlgorithm {
    fn get_available_dl_rbg(&self) -> RbgMap {
        self.dl.all().clone()
    }

    fn is_dl_rbg_available_for_ue(&self, rbg: usize, rnti: Rnti) -> bool {
        self.dl.is_available(rbg, self.is_edge_ue(rnti))
    }

    fn get_available_ul_rbg(&self) -> RbgMap {
        self.ul.all().clone()
    }

    fn is_ul_rbg_available_for_ue(&self, rbg: usize, rnti: Rnti) -> bool {
        if !self.config.enabled_in_uplink {
            return self.ul.all().get(rbg);
        }
        self.ul.is_available(rbg, self.is_edge_ue(rnti))
    }

    fn report_dl_cqi_info(&mut self, info: &DlCqiInfo) {
        self.stats.cqi_reports += 1;
        trace!("DL CQI for {} UEs not used by strict reuse", info.cqi_list.len());
    }

    fn report_ul_cqi_info(&mut self, info: &UlCqiInfo) {
        self.stats.cqi_reports += 1;
        trace!("UL SINR for {} UEs not used by strict reuse", info.sinr.len());
    }

    fn get_tpc(&self, rnti: Rnti) -> u8 {
        self.power.tpc(self.classifier.area(rnti))
    }

    fn get_min_continuous_ul_bandwidth(&self) -> u16 {
        if !self.config.enabled_in_uplink {
            return self.ul.total();
        }
        self.ul.partition().edge_sub_bandwidth
    }
}

impl FfrRrcInterface for StrictFrAlgorithm {
    fn report_ue_meas(&mut self, rnti: Rnti, results: &MeasResults) {
        if let Some(expected) = self.meas_id {
            if results.meas_id != expected {
                self.stats.ignored_meas_reports += 1;
                debug!(
                    "Ignoring measurement id {} from UE {}, expected {}",
                    results.meas_id.0, rnti, expected.0
                );
                return;
            }
        }

        self.report_measurement(rnti, results.rsrq_result);
    }

    fn recv_load_information(&mut self, params: &LoadInformation) {
        for item in &params.cell_information {
            self.report_neighbor_load(item.source_cell_id, item);
        }
    }

    fn remove_ue(&mut self, rnti: Rnti) {
        if let Some(record) = self.classifier.remove(rnti) {
            info!("UE {} removed from cell {} ({:?})", rnti, self.config.cell_id, record.area);
        }
    }
}

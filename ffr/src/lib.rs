//! Frequency Reuse Algorithms
//!
//! This crate implements strict (hard) frequency reuse for an LTE cell: the
//! cell band is split into a region every UE may use and a protected edge
//! subband coordinated with neighbouring cells. UEs are classified as center
//! or edge from RSRQ reports, and the MAC scheduler is told per TTI which
//! resource block groups each UE may be given.

pub mod algorithm;
pub mod bandwidth;
pub mod classifier;
pub mod config;
pub mod load;
pub mod power;
pub mod rbg_map;

use common::types::Direction;
use serde::Serialize;
use thiserror::Error;

pub use algorithm::{FrAlgorithm, FrAlgorithmKind, NoOpFrAlgorithm, StrictFrAlgorithm};
pub use bandwidth::BandwidthConfig;
pub use classifier::{EdgeTieBreak, UeArea, UeClassifier, UeRecord};
pub use config::StrictFrConfig;
pub use load::{EdgeAdaptationConfig, LoadCoordinator};
pub use power::PowerControl;
pub use rbg_map::DirectionMaps;

/// Errors raised by the frequency reuse algorithms
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FfrError {
    #[error("Invalid {direction} bandwidth configuration: {reason}")]
    InvalidBandwidthConfig {
        direction: Direction,
        reason: String,
    },

    #[error("No strict reuse preset for cell type {cell_type} at {bandwidth_rbs} RBs")]
    NoPreset {
        cell_type: u8,
        bandwidth_rbs: u16,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

/// Counters exposed by an algorithm instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FfrStats {
    /// Measurement reports used for classification
    pub meas_reports: u64,
    /// Measurement reports dropped for an unexpected measurement id
    pub ignored_meas_reports: u64,
    /// Center/edge transitions, first classification included
    pub area_changes: u64,
    /// Neighbour cell load items received
    pub load_reports: u64,
    /// DL and UL CQI report batches received
    pub cqi_reports: u64,
    /// Successful reconfigurations
    pub reconfigurations: u64,
    /// UEs currently in the cell center
    pub center_ues: usize,
    /// UEs currently at the cell edge
    pub edge_ues: usize,
}

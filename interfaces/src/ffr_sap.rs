//! FFR-Scheduler Service Access Point
//!
//! The scheduler polls this interface once per TTI to learn which resource
//! block groups each UE may use, and feeds channel quality reports back.

use bytes::Bytes;
use common::types::Rnti;
use common::utils::pack_bits;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Availability bitmap with one flag per allocation unit
///
/// Cloning shares the underlying buffer. A rebuilt map is a new snapshot;
/// holders of an older clone keep seeing the old contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RbgMap(Arc<[bool]>);

impl RbgMap {
    /// Map of `len` units all set to `value`
    pub fn filled(len: usize, value: bool) -> Self {
        Self(vec![value; len].into())
    }

    /// Number of allocation units
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flag at `index`, `false` past the end of the map
    pub fn get(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Number of set units
    pub fn count_available(&self) -> usize {
        self.0.iter().filter(|&&bit| bit).count()
    }

    /// Indices of set units
    pub fn available_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &bit)| bit.then_some(i))
    }

    /// Packed bitmap, MSB first, as carried in a type 0 resource allocation
    pub fn to_bitmap(&self) -> Bytes {
        pack_bits(&self.0)
    }

    /// True when every set unit of `self` is also set in `other`
    pub fn is_subset_of(&self, other: &RbgMap) -> bool {
        self.len() == other.len()
            && self.0.iter().zip(other.0.iter()).all(|(&a, &b)| !a || b)
    }
}

impl From<Vec<bool>> for RbgMap {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits.into())
    }
}

/// Wideband DL CQI for one UE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlCqiReport {
    pub rnti: Rnti,
    /// Wideband CQI index (0..=15)
    pub wideband_cqi: u8,
}

/// DL CQI reports received by the scheduler in one TTI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlCqiInfo {
    pub cqi_list: Vec<DlCqiReport>,
}

/// UL SINR per RB, in dB, measured on PUSCH/SRS
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UlCqiInfo {
    pub sinr: HashMap<Rnti, Vec<f64>>,
}

/// Interface offered by the FFR algorithm to the MAC scheduler
///
/// Queries run on the scheduling hot path and never block.
pub trait FfrSchedulerInterface: Send + Sync {
    /// Cell-wide DL availability
    fn get_available_dl_rbg(&self) -> RbgMap;

    /// Whether DL RBG `rbg` may be allocated to `rnti`
    fn is_dl_rbg_available_for_ue(&self, rbg: usize, rnti: Rnti) -> bool;

    /// Cell-wide UL availability
    fn get_available_ul_rbg(&self) -> RbgMap;

    /// Whether UL unit `rbg` may be allocated to `rnti`
    fn is_ul_rbg_available_for_ue(&self, rbg: usize, rnti: Rnti) -> bool;

    /// DL CQI reports from the scheduler
    fn report_dl_cqi_info(&mut self, info: &DlCqiInfo);

    /// UL SINR reports from the scheduler
    fn report_ul_cqi_info(&mut self, info: &UlCqiInfo);

    /// TPC command for the UE's next DCI
    fn get_tpc(&self, rnti: Rnti) -> u8;

    /// Minimum contiguous UL bandwidth, in UL allocation units
    fn get_min_continuous_ul_bandwidth(&self) -> u16;
}

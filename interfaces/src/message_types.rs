//! Message Types for RRC and X2 Exchanges
//!
//! Defines the measurement, power configuration and inter-cell load messages
//! consumed and produced by the FFR algorithm

use common::types::CellId;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Measurement identity assigned by the RRC to a report configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasId(pub u8);

/// Serving cell measurement results from a UE measurement report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasResults {
    /// Measurement identity the report belongs to
    pub meas_id: MeasId,
    /// RSRP range (0..=97)
    pub rsrp_result: u8,
    /// RSRQ range (0..=34)
    pub rsrq_result: u8,
}

/// Quantity that triggers a measurement report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerQuantity {
    Rsrp,
    Rsrq,
}

/// Measurement event type (TS 36.331 5.5.4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasEvent {
    /// Serving becomes better than threshold
    A1,
    /// Serving becomes worse than threshold
    A2,
}

/// Report configuration requested by the FFR algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Triggering event
    pub event: MeasEvent,
    /// Quantity compared against the threshold
    pub trigger_quantity: TriggerQuantity,
    /// Threshold in the range of the trigger quantity
    pub threshold: u8,
    /// Periodic report interval in milliseconds
    pub report_interval_ms: u16,
}

/// PDSCH power offset `pa` (TS 36.331 PDSCH-ConfigDedicated)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaOffset {
    /// -6 dB
    DbMinus6 = 0,
    /// -4.77 dB
    DbMinus4Dot77 = 1,
    /// -3 dB
    DbMinus3 = 2,
    /// -1.77 dB
    DbMinus1Dot77 = 3,
    /// 0 dB
    Db0 = 4,
    /// 1 dB
    Db1 = 5,
    /// 2 dB
    Db2 = 6,
    /// 3 dB
    Db3 = 7,
}

impl PaOffset {
    /// Offset value in dB
    pub fn as_db(&self) -> f64 {
        match self {
            PaOffset::DbMinus6 => -6.0,
            PaOffset::DbMinus4Dot77 => -4.77,
            PaOffset::DbMinus3 => -3.0,
            PaOffset::DbMinus1Dot77 => -1.77,
            PaOffset::Db0 => 0.0,
            PaOffset::Db1 => 1.0,
            PaOffset::Db2 => 2.0,
            PaOffset::Db3 => 3.0,
        }
    }
}

impl Default for PaOffset {
    fn default() -> Self {
        PaOffset::Db0
    }
}

/// Dedicated PDSCH configuration pushed to the RRC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdschConfigDedicated {
    /// PDSCH power offset
    pub pa: PaOffset,
}

/// UL interference overload indication (TS 36.423 9.2.17)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterferenceOverloadIndication {
    High = 0,
    Medium = 1,
    Low = 2,
}

/// UL high interference indication targeted at a neighbour cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighInterferenceInformation {
    /// Cell the indication is addressed to
    pub target_cell_id: CellId,
    /// One flag per PRB
    pub indication: Vec<bool>,
}

/// Relative narrowband TX power (RNTP)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeNarrowbandTxPower {
    /// One flag per PRB, set when the TX power exceeds the RNTP threshold
    pub per_prb: Vec<bool>,
}

/// Load information for one neighbour cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellInformationItem {
    /// Reporting cell
    pub source_cell_id: CellId,
    /// Per-PRB UL interference overload
    #[serde(default)]
    pub ul_interference_overload: Vec<InterferenceOverloadIndication>,
    /// UL high interference indications
    #[serde(default)]
    pub ul_high_interference: Vec<HighInterferenceInformation>,
    /// DL relative narrowband TX power
    #[serde(default)]
    pub relative_narrowband_tx_band: Option<RelativeNarrowbandTxPower>,
}

/// X2 LOAD INFORMATION message contents
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadInformation {
    /// One item per reporting cell
    pub cell_information: Vec<CellInformationItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn test_pa_offset_from_index() {
        assert_eq!(PaOffset::from_u8(4), Some(PaOffset::Db0));
        assert_eq!(PaOffset::from_u8(0), Some(PaOffset::DbMinus6));
        assert_eq!(PaOffset::from_u8(8), None);
        assert_eq!(PaOffset::DbMinus3.as_db(), -3.0);
    }

    #[test]
    fn test_load_information_parsing() {
        let json = r#"{
            "cell_information": [
                {
                    "source_cell_id": 2,
                    "ul_interference_overload": ["high", "medium", "low"]
                }
            ]
        }"#;

        let info: LoadInformation = serde_json::from_str(json).unwrap();
        let item = &info.cell_information[0];
        assert_eq!(item.source_cell_id, CellId(2));
        assert_eq!(item.ul_interference_overload.len(), 3);
        assert!(item.ul_high_interference.is_empty());
        assert!(item.relative_narrowband_tx_band.is_none());
    }
}

//! Power-Control Decision Unit
//!
//! Maps a UE's area to the TPC command for its DCIs and to its dedicated
//! PDSCH power offset.

use crate::classifier::UeArea;
use crate::config::StrictFrConfig;
use interfaces::{PaOffset, PdschConfigDedicated};

/// Per-area power settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerControl {
    center_area_tpc: u8,
    edge_area_tpc: u8,
    center_area_power_offset: PaOffset,
    edge_area_power_offset: PaOffset,
}

impl PowerControl {
    pub fn new(config: &StrictFrConfig) -> Self {
        Self {
            center_area_tpc: config.center_area_tpc,
            edge_area_tpc: config.edge_area_tpc,
            center_area_power_offset: config.center_area_power_offset,
            edge_area_power_offset: config.edge_area_power_offset,
        }
    }

    /// TPC command; UEs without a report are treated as center UEs
    pub fn tpc(&self, area: UeArea) -> u8 {
        match area {
            UeArea::CellEdge => self.edge_area_tpc,
            UeArea::Unset | UeArea::CellCenter => self.center_area_tpc,
        }
    }

    /// Dedicated PDSCH configuration for a UE in `area`
    pub fn pdsch_config(&self, area: UeArea) -> PdschConfigDedicated {
        let pa = match area {
            UeArea::CellEdge => self.edge_area_power_offset,
            UeArea::Unset | UeArea::CellCenter => self.center_area_power_offset,
        };
        PdschConfigDedicated { pa }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::CellId;

    fn power() -> PowerControl {
        let config = StrictFrConfig {
            center_area_tpc: 1,
            edge_area_tpc: 3,
            center_area_power_offset: PaOffset::DbMinus3,
            edge_area_power_offset: PaOffset::Db3,
            ..StrictFrConfig::new(CellId(1))
        };
        PowerControl::new(&config)
    }

    #[test]
    fn test_tpc_per_area() {
        let pc = power();
        assert_eq!(pc.tpc(UeArea::Unset), 1);
        assert_eq!(pc.tpc(UeArea::CellCenter), 1);
        assert_eq!(pc.tpc(UeArea::CellEdge), 3);
    }

    #[test]
    fn test_pdsch_offset_per_area() {
        let pc = power();
        assert_eq!(pc.pdsch_config(UeArea::CellCenter).pa, PaOffset::DbMinus3);
        assert_eq!(pc.pdsch_config(UeArea::Unset).pa, PaOffset::DbMinus3);
        assert_eq!(pc.pdsch_config(UeArea::CellEdge).pa, PaOffset::Db3);
    }
}

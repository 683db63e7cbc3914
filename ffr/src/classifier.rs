//! UE Classifier
//!
//! Keeps the center/edge classification of every UE from its latest RSRQ
//! report and the roster of edge UEs.

use crate::FfrError;
use common::types::Rnti;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Area of the cell a UE has been placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UeArea {
    /// No report received yet
    Unset,
    CellCenter,
    CellEdge,
}

/// Area chosen for a measurement exactly equal to the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeTieBreak {
    /// Edge requires strictly worse quality than the threshold
    #[default]
    Center,
    /// Quality at the threshold already counts as edge
    Edge,
}

/// Classification state of one UE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UeRecord {
    pub area: UeArea,
    /// Measurement that produced the current state
    pub last_measurement: u8,
}

/// Area change caused by a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaTransition {
    pub rnti: Rnti,
    pub from: UeArea,
    pub to: UeArea,
}

/// Classifier of UEs into center and edge
#[derive(Debug, Clone)]
pub struct UeClassifier {
    threshold: u8,
    tie_break: EdgeTieBreak,
    ues: HashMap<Rnti, UeRecord>,
    edge_ues: BTreeSet<Rnti>,
}

impl UeClassifier {
    /// Create a classifier with an empty roster
    pub fn new(threshold: u8, tie_break: EdgeTieBreak) -> Self {
        Self {
            threshold,
            tie_break,
            ues: HashMap::new(),
            edge_ues: BTreeSet::new(),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Area for a measurement value; lower values mean worse quality
    pub fn classify(&self, measurement: u8) -> UeArea {
        match measurement.cmp(&self.threshold) {
            std::cmp::Ordering::Less => UeArea::CellEdge,
            std::cmp::Ordering::Greater => UeArea::CellCenter,
            std::cmp::Ordering::Equal => match self.tie_break {
                EdgeTieBreak::Center => UeArea::CellCenter,
                EdgeTieBreak::Edge => UeArea::CellEdge,
            },
        }
    }

    /// Apply a measurement report, returning the area change if any
    pub fn report_measurement(&mut self, rnti: Rnti, measurement: u8) -> Option<AreaTransition> {
        let area = self.classify(measurement);
        let record = self.ues.entry(rnti).or_insert(UeRecord {
            area: UeArea::Unset,
            last_measurement: measurement,
        });

        record.last_measurement = measurement;
        if record.area == area {
            return None;
        }

        let from = record.area;
        record.area = area;

        match area {
            UeArea::CellEdge => {
                self.edge_ues.insert(rnti);
            }
            _ => {
                self.edge_ues.remove(&rnti);
            }
        }

        debug!("UE {} moved {:?} -> {:?} (measurement {})", rnti, from, area, measurement);
        Some(AreaTransition { rnti, from, to: area })
    }

    /// Current area, `Unset` for UEs never reported
    pub fn area(&self, rnti: Rnti) -> UeArea {
        self.ues.get(&rnti).map_or(UeArea::Unset, |record| record.area)
    }

    pub fn record(&self, rnti: Rnti) -> Option<&UeRecord> {
        self.ues.get(&rnti)
    }

    /// Forget a UE
    pub fn remove(&mut self, rnti: Rnti) -> Option<UeRecord> {
        self.edge_ues.remove(&rnti);
        self.ues.remove(&rnti)
    }

    /// Edge UEs in RNTI order
    pub fn edge_ues(&self) -> impl Iterator<Item = Rnti> + '_ {
        self.edge_ues.iter().copied()
    }

    /// All known UEs in RNTI order
    pub fn rntis(&self) -> Vec<Rnti> {
        let mut rntis: Vec<_> = self.ues.keys().copied().collect();
        rntis.sort();
        rntis
    }

    pub fn num_ues(&self) -> usize {
        self.ues.len()
    }

    pub fn num_edge_ues(&self) -> usize {
        self.edge_ues.len()
    }

    pub fn num_center_ues(&self) -> usize {
        self.ues
            .values()
            .filter(|record| record.area == UeArea::CellCenter)
            .count()
    }

    /// Rebuild the edge roster from the records and compare
    pub fn check_invariants(&self) -> Result<(), FfrError> {
        let expected: BTreeSet<Rnti> = self
            .ues
            .iter()
            .filter(|(_, record)| record.area == UeArea::CellEdge)
            .map(|(&rnti, _)| rnti)
            .collect();

        if expected != self.edge_ues {
            return Err(FfrError::InvariantViolation(format!(
                "edge roster {:?} does not match edge records {:?}",
                self.edge_ues, expected
            )));
        }

        if let Some((rnti, record)) = self.ues.iter().find(|(_, r)| r.area == UeArea::Unset) {
            return Err(FfrError::InvariantViolation(format!(
                "UE {} has a record but no area (measurement {})",
                rnti, record.last_measurement
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u8 = 20;

    fn classifier() -> UeClassifier {
        UeClassifier::new(THRESHOLD, EdgeTieBreak::Center)
    }

    #[test]
    fn test_first_report_classifies() {
        let mut c = classifier();

        let t = c.report_measurement(Rnti(1), 10).unwrap();
        assert_eq!(t.from, UeArea::Unset);
        assert_eq!(t.to, UeArea::CellEdge);

        let t = c.report_measurement(Rnti(2), 30).unwrap();
        assert_eq!(t.to, UeArea::CellCenter);

        assert_eq!(c.edge_ues().collect::<Vec<_>>(), vec![Rnti(1)]);
        assert_eq!(c.num_center_ues(), 1);
        c.check_invariants().unwrap();
    }

    #[test]
    fn test_unknown_ue_is_unset() {
        let c = classifier();
        assert_eq!(c.area(Rnti(99)), UeArea::Unset);
        assert!(c.record(Rnti(99)).is_none());
    }

    #[test]
    fn test_threshold_tie_break_default_center() {
        let mut c = classifier();
        c.report_measurement(Rnti(1), THRESHOLD);
        assert_eq!(c.area(Rnti(1)), UeArea::CellCenter);
    }

    #[test]
    fn test_threshold_tie_break_edge() {
        let mut c = UeClassifier::new(THRESHOLD, EdgeTieBreak::Edge);
        c.report_measurement(Rnti(1), THRESHOLD);
        assert_eq!(c.area(Rnti(1)), UeArea::CellEdge);
        assert_eq!(c.classify(THRESHOLD + 1), UeArea::CellCenter);
    }

    #[test]
    fn test_repeated_report_is_idempotent() {
        let mut c = classifier();
        assert!(c.report_measurement(Rnti(1), 5).is_some());
        let after_first = (c.area(Rnti(1)), *c.record(Rnti(1)).unwrap(), c.num_edge_ues());

        assert!(c.report_measurement(Rnti(1), 5).is_none());
        let after_second = (c.area(Rnti(1)), *c.record(Rnti(1)).unwrap(), c.num_edge_ues());

        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_same_area_refreshes_measurement() {
        let mut c = classifier();
        c.report_measurement(Rnti(1), 5);
        assert!(c.report_measurement(Rnti(1), 7).is_none());
        assert_eq!(c.record(Rnti(1)).unwrap().last_measurement, 7);
    }

    #[test]
    fn test_latest_report_wins() {
        let worse = THRESHOLD - 5;
        let better = THRESHOLD + 5;

        let mut c = classifier();
        c.report_measurement(Rnti(1), worse);
        c.report_measurement(Rnti(1), better);
        assert_eq!(c.area(Rnti(1)), UeArea::CellCenter);

        let mut c = classifier();
        c.report_measurement(Rnti(1), better);
        c.report_measurement(Rnti(1), worse);
        assert_eq!(c.area(Rnti(1)), UeArea::CellEdge);
        c.check_invariants().unwrap();
    }

    #[test]
    fn test_roster_tracks_every_transition() {
        let mut c = classifier();
        let sequence = [
            (1, 3), (2, 25), (3, 19), (1, 30), (2, 1), (3, 20), (4, 0), (1, 2), (4, 34),
        ];

        for (rnti, value) in sequence {
            c.report_measurement(Rnti(rnti), value);
            c.check_invariants().unwrap();
            for r in c.rntis() {
                let in_roster = c.edge_ues().any(|e| e == r);
                assert_eq!(in_roster, c.area(r) == UeArea::CellEdge);
            }
        }

        assert_eq!(c.edge_ues().collect::<Vec<_>>(), vec![Rnti(1), Rnti(2)]);
    }

    #[test]
    fn test_remove_ue() {
        let mut c = classifier();
        c.report_measurement(Rnti(1), 1);
        c.report_measurement(Rnti(2), 30);

        let removed = c.remove(Rnti(1)).unwrap();
        assert_eq!(removed.area, UeArea::CellEdge);
        assert_eq!(c.num_edge_ues(), 0);
        assert_eq!(c.area(Rnti(1)), UeArea::Unset);
        assert!(c.remove(Rnti(1)).is_none());
        c.check_invariants().unwrap();
    }
}

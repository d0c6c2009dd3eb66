//! Payout table: read-only display view over the segment table

use serde::Serialize;

use wf_core::SegmentId;

use crate::segments::{SegmentKind, SegmentTable};

/// Segments sharing one payout multiplier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutRow {
    pub payout: f64,
    pub segments: Vec<SegmentId>,
    /// Summed weight of the group
    pub weight: f64,
    /// weight / total weight
    pub probability: f64,
}

impl PayoutRow {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// Odds for a bet on one die face
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceOdds {
    /// Face bet on (1..=6)
    pub face: u8,
    /// Weight of segments showing the face three times
    pub triple: f64,
    /// ... twice
    pub double: f64,
    /// ... once
    pub single: f64,
    /// Spin Again weight (bet pushes)
    pub push: f64,
    /// Everything else (bet lost)
    pub lose: f64,
    /// Table total weight
    pub total: f64,
}

impl FaceOdds {
    fn compute(table: &SegmentTable, face: u8) -> Self {
        let mut odds = Self {
            face,
            triple: 0.0,
            double: 0.0,
            single: 0.0,
            push: 0.0,
            lose: 0.0,
            total: table.total_weight(),
        };
        for segment in table.iter() {
            let slot = match (segment.kind, segment.kind.face_matches(face)) {
                (SegmentKind::SpinAgain, _) => &mut odds.push,
                (_, 3) => &mut odds.triple,
                (_, 2) => &mut odds.double,
                (_, 1) => &mut odds.single,
                _ => &mut odds.lose,
            };
            *slot += segment.weight;
        }
        odds
    }

    /// Chance of any win
    pub fn win_probability(&self) -> f64 {
        (self.triple + self.double + self.single) / self.total
    }

    /// Expected return per unit bet (3:1, 2:1, 1:1, push returns the stake)
    pub fn expected_return(&self) -> f64 {
        (4.0 * self.triple + 3.0 * self.double + 2.0 * self.single + self.push) / self.total
    }
}

/// Payout groups plus per-face odds for dice wheels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutTable {
    /// Highest payout first
    pub rows: Vec<PayoutRow>,
    /// One entry per die face, empty for non-dice wheels
    pub face_odds: Vec<FaceOdds>,
    pub total_weight: f64,
}

impl PayoutTable {
    pub fn from_table(table: &SegmentTable) -> Self {
        let mut rows: Vec<PayoutRow> = Vec::new();
        for segment in table.iter() {
            match rows.iter_mut().find(|row| row.payout == segment.payout) {
                Some(row) => {
                    row.segments.push(segment.id);
                    row.weight += segment.weight;
                }
                None => rows.push(PayoutRow {
                    payout: segment.payout,
                    segments: vec![segment.id],
                    weight: segment.weight,
                    probability: 0.0,
                }),
            }
        }

        let total_weight = table.total_weight();
        for row in &mut rows {
            row.probability = row.weight / total_weight;
        }
        rows.sort_by(|a, b| b.payout.total_cmp(&a.payout));

        let face_odds = if table.has_dice() {
            (1..=6).map(|face| FaceOdds::compute(table, face)).collect()
        } else {
            Vec::new()
        };

        Self {
            rows,
            face_odds,
            total_weight,
        }
    }

    pub fn row(&self, payout: f64) -> Option<&PayoutRow> {
        self.rows.iter().find(|row| row.payout == payout)
    }

    pub fn face(&self, face: u8) -> Option<&FaceOdds> {
        self.face_odds.iter().find(|odds| odds.face == face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::SegmentSpec;

    #[test]
    fn test_groups_by_payout() {
        let table = SegmentTable::new(vec![
            SegmentSpec::new("A", 1.0, 1.0),
            SegmentSpec::new("B", 1.0, 2.0),
            SegmentSpec::new("C", 2.0, 3.0),
            SegmentSpec::new("D", 4.0, 1.0),
        ])
        .unwrap();

        let paytable = PayoutTable::from_table(&table);
        assert_eq!(paytable.rows.len(), 3);
        assert_eq!(paytable.rows[0].payout, 3.0);
        assert_eq!(paytable.rows[2].payout, 1.0);

        let ones = paytable.row(1.0).unwrap();
        assert_eq!(ones.segments, vec![SegmentId(0), SegmentId(3)]);
        assert!((ones.probability - 5.0 / 8.0).abs() < 1e-12);
        assert!(paytable.face_odds.is_empty());

        let total: f64 = paytable.rows.iter().map(|r| r.probability).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_face_odds_cover_wheel() {
        let table = SegmentTable::chuck_a_luck();
        let paytable = PayoutTable::from_table(&table);
        assert_eq!(paytable.face_odds.len(), 6);

        for odds in &paytable.face_odds {
            let sum = odds.triple + odds.double + odds.single + odds.push + odds.lose;
            assert!((sum - 54.0).abs() < 1e-9, "face {}", odds.face);
            assert_eq!(odds.push, 4.0);
            assert!(odds.win_probability() > 0.0);
        }
    }

    #[test]
    fn test_face_odds_counts() {
        let table = SegmentTable::new(vec![
            SegmentSpec::from_kind(SegmentKind::Dice([2, 2, 2])),
            SegmentSpec::from_kind(SegmentKind::Dice([2, 2, 5])),
            SegmentSpec::from_kind(SegmentKind::Dice([1, 2, 3])),
            SegmentSpec::from_kind(SegmentKind::HouseWins),
            SegmentSpec::from_kind(SegmentKind::SpinAgain),
        ])
        .unwrap();

        let odds = PayoutTable::from_table(&table).face(2).cloned().unwrap();
        assert_eq!((odds.triple, odds.double, odds.single), (1.0, 1.0, 1.0));
        assert_eq!((odds.push, odds.lose), (1.0, 1.0));
        assert!((odds.expected_return() - 10.0 / 5.0).abs() < 1e-12);
    }
}

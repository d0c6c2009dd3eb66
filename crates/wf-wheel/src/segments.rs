//! Wheel segments and weighted outcome selection

use rand::Rng;
use serde::{Deserialize, Serialize};

use wf_core::{SegmentId, WfError, WfResult};

/// What a segment shows on the printed wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Generic labeled slot (no dice semantics)
    #[default]
    Plain,
    /// Three dice faces, each 1..=6
    Dice([u8; 3]),
    /// House takes all bets
    HouseWins,
    /// Green slot, bets push
    SpinAgain,
}

/// Dice combination shown by a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combo {
    /// Three different faces
    Single,
    /// Exactly two equal faces
    Double,
    /// All three faces equal
    Triple,
}

impl SegmentKind {
    /// Dice faces, if this is a dice segment
    pub fn faces(&self) -> Option<[u8; 3]> {
        match self {
            Self::Dice(faces) => Some(*faces),
            _ => None,
        }
    }

    /// How many of the three dice show `face`
    pub fn face_matches(&self, face: u8) -> u8 {
        self.faces()
            .map(|faces| faces.iter().filter(|&&f| f == face).count() as u8)
            .unwrap_or(0)
    }

    /// Combination class of a dice segment
    pub fn combo(&self) -> Option<Combo> {
        let [a, b, c] = self.faces()?;
        Some(if a == b && b == c {
            Combo::Triple
        } else if a == b || b == c || a == c {
            Combo::Double
        } else {
            Combo::Single
        })
    }

    /// Default display label
    pub fn default_label(&self) -> String {
        match self {
            Self::Dice([a, b, c]) => format!("{} - {} - {}", a, b, c),
            Self::HouseWins => "House Wins".to_string(),
            Self::SpinAgain => "Spin Again".to_string(),
            Self::Plain => String::new(),
        }
    }

    /// Standard payout multiplier for a matching bet
    pub fn default_payout(&self) -> f64 {
        match self.combo() {
            Some(Combo::Triple) => 3.0,
            Some(Combo::Double) => 2.0,
            Some(Combo::Single) => 1.0,
            None => 0.0,
        }
    }
}

/// Segment as supplied by configuration (id assigned by position)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    /// Display label
    pub label: String,
    /// Relative probability mass
    pub weight: f64,
    /// Payout multiplier
    pub payout: f64,
    /// Segment semantics
    #[serde(default)]
    pub kind: SegmentKind,
}

impl SegmentSpec {
    pub fn new(label: impl Into<String>, weight: f64, payout: f64) -> Self {
        Self {
            label: label.into(),
            weight,
            payout,
            kind: SegmentKind::Plain,
        }
    }

    /// Derived entirely from a segment kind (label and payout follow the kind)
    pub fn from_kind(kind: SegmentKind) -> Self {
        Self {
            label: kind.default_label(),
            weight: 1.0,
            payout: kind.default_payout(),
            kind,
        }
    }

    pub fn with_kind(mut self, kind: SegmentKind) -> Self {
        self.kind = kind;
        self
    }
}

/// One labeled slot on the wheel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub label: String,
    pub weight: f64,
    pub payout: f64,
    pub kind: SegmentKind,
}

/// Ordered, immutable segment table with precomputed cumulative weights
#[derive(Debug, Clone)]
pub struct SegmentTable {
    segments: Vec<Segment>,
    cumulative: Vec<f64>,
    total_weight: f64,
}

impl SegmentTable {
    /// Build and validate a table from configuration specs
    pub fn new(specs: Vec<SegmentSpec>) -> WfResult<Self> {
        if specs.is_empty() {
            return Err(WfError::config("segment table is empty"));
        }
        if specs.len() > u16::MAX as usize {
            return Err(WfError::config(format!(
                "too many segments: {} > {}",
                specs.len(),
                u16::MAX
            )));
        }

        let segments = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| {
                validate_spec(index, &spec)?;
                Ok(Segment {
                    id: SegmentId::from_index(index),
                    label: spec.label,
                    weight: spec.weight,
                    payout: spec.payout,
                    kind: spec.kind,
                })
            })
            .collect::<WfResult<Vec<_>>>()?;
        check_total_weight(&segments)?;

        Ok(Self::from_validated(segments))
    }

    /// The 54-segment Chuck-a-Luck wheel, counter-clockwise from 0°
    pub fn chuck_a_luck() -> Self {
        let segments = chuck_a_luck_specs()
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Segment {
                id: SegmentId::from_index(index),
                label: spec.label,
                weight: spec.weight,
                payout: spec.payout,
                kind: spec.kind,
            })
            .collect();
        Self::from_validated(segments)
    }

    fn from_validated(segments: Vec<Segment>) -> Self {
        let mut running = 0.0;
        let cumulative = segments
            .iter()
            .map(|s| {
                running += s.weight;
                running
            })
            .collect();
        Self {
            segments,
            cumulative,
            total_weight: running,
        }
    }

    /// Draw a segment with probability proportional to its weight
    pub fn weighted_pick<R: Rng + ?Sized>(&self, rng: &mut R) -> SegmentId {
        let x = rng.random::<f64>() * self.total_weight;
        // First interval whose upper bound exceeds x
        let index = self.cumulative.partition_point(|&upper| upper <= x);
        SegmentId::from_index(index.min(self.segments.len() - 1))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    /// Lookup that reports unknown ids as errors
    pub fn segment(&self, id: SegmentId) -> WfResult<&Segment> {
        self.get(id).ok_or(WfError::UnknownSegment(id))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Theoretical probability of a segment
    pub fn probability(&self, id: SegmentId) -> f64 {
        self.get(id)
            .map(|s| s.weight / self.total_weight)
            .unwrap_or(0.0)
    }

    /// Does any segment carry dice faces?
    pub fn has_dice(&self) -> bool {
        self.segments.iter().any(|s| s.kind.faces().is_some())
    }

    /// Segment kinds in table order
    pub fn kinds(&self) -> Vec<SegmentKind> {
        self.segments.iter().map(|s| s.kind).collect()
    }
}

/// Weighted draw over a raw segment slice.
///
/// Validates the slice on every call; prefer [`SegmentTable::weighted_pick`]
/// for repeated draws.
pub fn weighted_pick<R: Rng + ?Sized>(segments: &[Segment], rng: &mut R) -> WfResult<SegmentId> {
    if segments.is_empty() {
        return Err(WfError::config("segment table is empty"));
    }
    if let Some(bad) = segments
        .iter()
        .find(|s| !(s.weight.is_finite() && s.weight > 0.0))
    {
        return Err(WfError::config(format!(
            "segment {} ({}) has non-positive weight {}",
            bad.id, bad.label, bad.weight
        )));
    }

    let total = check_total_weight(segments)?;
    let mut x = rng.random::<f64>() * total;
    for segment in segments {
        if x < segment.weight {
            return Ok(segment.id);
        }
        x -= segment.weight;
    }
    // Float rounding at the upper edge lands on the last segment
    Ok(segments[segments.len() - 1].id)
}

/// Summed weight, rejected when it overflows
fn check_total_weight(segments: &[Segment]) -> WfResult<f64> {
    let total: f64 = segments.iter().map(|s| s.weight).sum();
    if !total.is_finite() {
        return Err(WfError::config(format!(
            "total segment weight overflows ({} segments)",
            segments.len()
        )));
    }
    Ok(total)
}

fn validate_spec(index: usize, spec: &SegmentSpec) -> WfResult<()> {
    if spec.label.trim().is_empty() {
        return Err(WfError::config(format!("segment {} has an empty label", index)));
    }
    if !(spec.weight.is_finite() && spec.weight > 0.0) {
        return Err(WfError::config(format!(
            "segment {} ({}) has non-positive weight {}",
            index, spec.label, spec.weight
        )));
    }
    if !(spec.payout.is_finite() && spec.payout >= 0.0) {
        return Err(WfError::config(format!(
            "segment {} ({}) has invalid payout {}",
            index, spec.label, spec.payout
        )));
    }
    if let Some(faces) = spec.kind.faces() {
        if faces.iter().any(|f| !(1..=6).contains(f)) {
            return Err(WfError::config(format!(
                "segment {} ({}) has dice faces outside 1..=6: {:?}",
                index, spec.label, faces
            )));
        }
    }
    Ok(())
}

/// Configuration specs for the printed Chuck-a-Luck wheel
pub fn chuck_a_luck_specs() -> Vec<SegmentSpec> {
    CHUCK_A_LUCK_WHEEL
        .iter()
        .map(|kind| SegmentSpec::from_kind(*kind))
        .collect()
}

const fn d(a: u8, b: u8, c: u8) -> SegmentKind {
    SegmentKind::Dice([a, b, c])
}

const H: SegmentKind = SegmentKind::HouseWins;
const G: SegmentKind = SegmentKind::SpinAgain;

/// Printed wheel layout (segment 0 starts at 0°)
#[rustfmt::skip]
const CHUCK_A_LUCK_WHEEL: [SegmentKind; 54] = [
    d(4, 5, 6), d(1, 2, 4), d(5, 5, 5), d(3, 6, 6), H,          d(5, 5, 6),
    d(4, 4, 4), d(1, 2, 3), d(3, 3, 4), G,          d(1, 4, 5), d(6, 6, 6),
    d(1, 1, 4), d(1, 2, 6), d(1, 2, 4), d(5, 5, 5), d(3, 6, 6), d(1, 3, 4),
    d(2, 5, 6), d(1, 4, 6), d(1, 2, 3), d(3, 3, 4), d(2, 3, 4), d(1, 4, 5),
    G,          d(1, 1, 2), d(3, 3, 3), d(4, 5, 6), d(1, 2, 2), d(2, 4, 5),
    d(2, 3, 6), H,          d(5, 5, 6), d(1, 4, 6), d(3, 3, 4), d(2, 2, 2),
    d(2, 3, 6), G,          d(1, 1, 2), d(3, 4, 6), d(4, 5, 6), d(1, 2, 2),
    d(5, 5, 5), d(3, 6, 6), d(1, 1, 1), d(5, 5, 6), d(1, 4, 6), d(1, 2, 3),
    d(3, 3, 4), d(2, 2, 2), d(4, 4, 5), G,          d(2, 3, 6), d(1, 3, 5),
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn abc_table() -> SegmentTable {
        SegmentTable::new(vec![
            SegmentSpec::new("A", 1.0, 1.0),
            SegmentSpec::new("B", 1.0, 2.0),
            SegmentSpec::new("C", 2.0, 3.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = SegmentTable::new(vec![]).unwrap_err();
        assert!(matches!(err, WfError::Configuration(_)));
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = SegmentTable::new(vec![
                SegmentSpec::new("A", 1.0, 1.0),
                SegmentSpec::new("B", weight, 1.0),
            ]);
            assert!(
                matches!(result, Err(WfError::Configuration(_))),
                "weight {} should be rejected",
                weight
            );
        }
    }

    #[test]
    fn test_overflowing_total_weight_rejected() {
        let result = SegmentTable::new(vec![
            SegmentSpec::new("A", 1e308, 1.0),
            SegmentSpec::new("B", 1e308, 1.0),
        ]);
        assert!(matches!(result, Err(WfError::Configuration(_))));

        let raw: Vec<Segment> = ["A", "B"]
            .iter()
            .enumerate()
            .map(|(i, label)| Segment {
                id: SegmentId::from_index(i),
                label: label.to_string(),
                weight: 1e308,
                payout: 1.0,
                kind: SegmentKind::Plain,
            })
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(matches!(
            weighted_pick(&raw, &mut rng),
            Err(WfError::Configuration(_))
        ));
    }

    #[test]
    fn test_bad_dice_faces_rejected() {
        let result = SegmentTable::new(vec![
            SegmentSpec::new("bad", 1.0, 1.0).with_kind(SegmentKind::Dice([0, 2, 3])),
        ]);
        assert!(matches!(result, Err(WfError::Configuration(_))));
    }

    #[test]
    fn test_weighted_pick_converges() {
        let table = abc_table();
        let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
        let mut counts = [0u32; 3];
        let draws = 100_000;

        for _ in 0..draws {
            counts[table.weighted_pick(&mut rng).index()] += 1;
        }

        let expected = [0.25, 0.25, 0.5];
        for (i, &count) in counts.iter().enumerate() {
            let observed = count as f64 / draws as f64;
            assert!(
                (observed - expected[i]).abs() < 0.01,
                "segment {}: observed {} expected {}",
                i,
                observed,
                expected[i]
            );
        }
    }

    #[test]
    fn test_free_weighted_pick_matches_contract() {
        let table = abc_table();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut c_hits = 0;
        for _ in 0..20_000 {
            if weighted_pick(table.segments(), &mut rng).unwrap() == SegmentId(2) {
                c_hits += 1;
            }
        }
        assert!((c_hits as f64 / 20_000.0 - 0.5).abs() < 0.02);

        let err = weighted_pick(&[], &mut rng).unwrap_err();
        assert!(matches!(err, WfError::Configuration(_)));
    }

    #[test]
    fn test_chuck_a_luck_layout() {
        let table = SegmentTable::chuck_a_luck();
        assert_eq!(table.len(), 54);
        assert_eq!(table.total_weight(), 54.0);

        let house = table.iter().filter(|s| s.kind == SegmentKind::HouseWins).count();
        let green = table.iter().filter(|s| s.kind == SegmentKind::SpinAgain).count();
        assert_eq!(house, 2);
        assert_eq!(green, 4);

        let first = table.get(SegmentId(0)).unwrap();
        assert_eq!(first.label, "4 - 5 - 6");
        assert_eq!(first.payout, 1.0);
        assert_eq!(table.get(SegmentId(2)).unwrap().payout, 3.0);
        assert_eq!(table.get(SegmentId(4)).unwrap().label, "House Wins");
    }

    #[test]
    fn test_combo_classification() {
        assert_eq!(d(1, 1, 1).combo(), Some(Combo::Triple));
        assert_eq!(d(1, 1, 2).combo(), Some(Combo::Double));
        assert_eq!(d(1, 2, 1).combo(), Some(Combo::Double));
        assert_eq!(d(1, 2, 3).combo(), Some(Combo::Single));
        assert_eq!(H.combo(), None);
        assert_eq!(d(5, 5, 6).face_matches(5), 2);
        assert_eq!(G.face_matches(5), 0);
    }

    #[test]
    fn test_kind_serde_shape() {
        let spec: SegmentSpec =
            serde_json::from_str(r#"{"label":"x","weight":1,"payout":2,"kind":{"dice":[1,2,3]}}"#)
                .unwrap();
        assert_eq!(spec.kind, d(1, 2, 3));

        let spec: SegmentSpec =
            serde_json::from_str(r#"{"label":"y","weight":1,"payout":0}"#).unwrap();
        assert_eq!(spec.kind, SegmentKind::Plain);
    }
}

//! Statistics Store
//!
//! All-time per-segment histogram plus a bounded FIFO window of the most
//! recent results. Readers get an `Arc` snapshot; writers clone-on-write
//! behind a `parking_lot::RwLock`, so a snapshot is always either before or
//! after a `record`, never in between.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use wf_core::{DEFAULT_WINDOW_CAPACITY, SegmentId, WfError, WfResult};

use crate::segments::{Combo, SegmentKind, SegmentTable};
use crate::spin::SpinResult;

// ═══════════════════════════════════════════════════════════════════════════════
// DICE SUMMARY
// ═══════════════════════════════════════════════════════════════════════════════

/// Chuck-a-Luck aggregates over a run of spins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSummary {
    /// Spins counted
    pub spins: u64,
    /// Hits per die face, index 0 is face 1
    pub face_hits: [u64; 6],
    /// Individual dice shown across all dice segments
    pub dice_rolled: u64,
    pub house_wins: u64,
    pub spin_agains: u64,
    pub singles: u64,
    pub doubles: u64,
    pub triples: u64,
}

impl DiceSummary {
    /// Fold one outcome in
    pub fn add(&mut self, kind: &SegmentKind) {
        self.spins += 1;
        match kind {
            SegmentKind::Dice(faces) => {
                for &face in faces {
                    if (1..=6).contains(&face) {
                        self.face_hits[(face - 1) as usize] += 1;
                        self.dice_rolled += 1;
                    }
                }
            }
            SegmentKind::HouseWins => self.house_wins += 1,
            SegmentKind::SpinAgain => self.spin_agains += 1,
            SegmentKind::Plain => {}
        }
        match kind.combo() {
            Some(Combo::Single) => self.singles += 1,
            Some(Combo::Double) => self.doubles += 1,
            Some(Combo::Triple) => self.triples += 1,
            None => {}
        }
    }

    /// Summary over a sequence of segment ids
    pub fn from_ids(kinds: &[SegmentKind], ids: impl IntoIterator<Item = SegmentId>) -> Self {
        let mut summary = Self::default();
        for id in ids {
            if let Some(kind) = kinds.get(id.index()) {
                summary.add(kind);
            }
        }
        summary
    }

    /// Share of dice showing `face` (0.0 - 1.0)
    pub fn face_share(&self, face: u8) -> f64 {
        if !(1..=6).contains(&face) || self.dice_rolled == 0 {
            return 0.0;
        }
        self.face_hits[(face - 1) as usize] as f64 / self.dice_rolled as f64
    }

    /// Share of spins landing on House Wins
    pub fn house_share(&self) -> f64 {
        share(self.house_wins, self.spins)
    }

    /// Share of spins landing on Spin Again
    pub fn spin_again_share(&self) -> f64 {
        share(self.spin_agains, self.spins)
    }

    /// Dice combinations counted
    pub fn combos(&self) -> u64 {
        self.singles + self.doubles + self.triples
    }
}

fn share(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════════════

/// Observed vs expected frequency for one segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentFrequency {
    pub segment: SegmentId,
    pub label: String,
    pub count: u64,
    /// count / total spins
    pub observed: f64,
    /// weight / total weight
    pub expected: f64,
}

impl SegmentFrequency {
    /// observed − expected
    pub fn deviation(&self) -> f64 {
        self.observed - self.expected
    }
}

/// Immutable, internally consistent statistics view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    /// All-time count per segment, indexed by segment id
    pub counts: Vec<u64>,
    /// Oldest first, newest at the back
    pub window: VecDeque<SpinResult>,
    /// Window capacity
    pub capacity: usize,
    /// All-time spins recorded
    pub total_spins: u64,
    /// All-time Chuck-a-Luck aggregates
    pub summary: DiceSummary,
}

impl StatisticsSnapshot {
    pub fn empty(segment_count: usize, capacity: usize) -> Self {
        Self {
            counts: vec![0; segment_count],
            window: VecDeque::with_capacity(capacity),
            capacity,
            total_spins: 0,
            summary: DiceSummary::default(),
        }
    }

    pub fn total_spins(&self) -> u64 {
        self.total_spins
    }

    pub fn count(&self, segment: SegmentId) -> u64 {
        self.counts.get(segment.index()).copied().unwrap_or(0)
    }

    /// Most recent result
    pub fn last(&self) -> Option<&SpinResult> {
        self.window.back()
    }

    /// Up to `n` most recent results, newest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &SpinResult> {
        self.window.iter().rev().take(n)
    }

    /// Per-segment observed vs expected frequency
    pub fn frequencies(&self, table: &SegmentTable) -> Vec<SegmentFrequency> {
        table
            .iter()
            .map(|segment| {
                let count = self.count(segment.id);
                SegmentFrequency {
                    segment: segment.id,
                    label: segment.label.clone(),
                    count,
                    observed: share(count, self.total_spins),
                    expected: table.probability(segment.id),
                }
            })
            .collect()
    }

    /// Per-segment counts within the window
    pub fn window_counts(&self) -> Vec<u64> {
        let mut counts = vec![0; self.counts.len()];
        for result in &self.window {
            if let Some(c) = counts.get_mut(result.segment.index()) {
                *c += 1;
            }
        }
        counts
    }

    /// Chuck-a-Luck aggregates over the `n` most recent results
    pub fn recent_summary(&self, table: &SegmentTable, n: usize) -> DiceSummary {
        let kinds = table.kinds();
        DiceSummary::from_ids(&kinds, self.recent(n).map(|r| r.segment))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared statistics store (clone handles share the same data)
#[derive(Debug, Clone)]
pub struct StatisticsStore {
    current: Arc<RwLock<Arc<StatisticsSnapshot>>>,
    kinds: Arc<[SegmentKind]>,
}

impl StatisticsStore {
    pub fn new(table: &SegmentTable, capacity: usize) -> WfResult<Self> {
        if capacity == 0 {
            return Err(WfError::config("statistics window capacity must be positive"));
        }
        let snapshot = StatisticsSnapshot::empty(table.len(), capacity);
        Ok(Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
            kinds: table.kinds().into(),
        })
    }

    /// Store with the standard 45-spin window
    pub fn with_default_window(table: &SegmentTable) -> WfResult<Self> {
        Self::new(table, DEFAULT_WINDOW_CAPACITY)
    }

    /// Record a completed spin (all-or-nothing)
    pub fn record(&self, result: SpinResult) -> WfResult<()> {
        let index = result.segment.index();
        let Some(kind) = self.kinds.get(index).copied() else {
            log::warn!("[Stats] Rejected result for unknown segment {}", result.segment);
            return Err(WfError::UnknownSegment(result.segment));
        };

        let mut guard = self.current.write();
        let snapshot = Arc::make_mut(&mut *guard);

        snapshot.counts[index] += 1;
        snapshot.total_spins += 1;
        snapshot.summary.add(&kind);
        snapshot.window.push_back(result);
        while snapshot.window.len() > snapshot.capacity {
            snapshot.window.pop_front();
        }

        log::debug!(
            "[Stats] Recorded segment {} ({} total, window {})",
            index,
            snapshot.total_spins,
            snapshot.window.len()
        );
        Ok(())
    }

    /// Current immutable view
    pub fn snapshot(&self) -> Arc<StatisticsSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Clear counts and window
    pub fn reset(&self) {
        let mut guard = self.current.write();
        let capacity = guard.capacity;
        *guard = Arc::new(StatisticsSnapshot::empty(self.kinds.len(), capacity));
        log::info!("[Stats] Statistics reset");
    }

    pub fn capacity(&self) -> usize {
        self.current.read().capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::SegmentSpec;
    use std::time::Duration;

    fn table() -> SegmentTable {
        SegmentTable::new(vec![
            SegmentSpec::from_kind(SegmentKind::Dice([1, 2, 3])),
            SegmentSpec::from_kind(SegmentKind::Dice([4, 4, 5])),
            SegmentSpec::from_kind(SegmentKind::Dice([6, 6, 6])),
            SegmentSpec::from_kind(SegmentKind::HouseWins),
            SegmentSpec::from_kind(SegmentKind::SpinAgain),
        ])
        .unwrap()
    }

    fn result(id: u16) -> SpinResult {
        SpinResult::new(SegmentId(id), Duration::from_secs(30))
    }

    #[test]
    fn test_window_keeps_last_45_in_order() {
        let table = table();
        let store = StatisticsStore::with_default_window(&table).unwrap();
        let ids: Vec<u16> = (0..100).map(|i| (i * 7 % 5) as u16).collect();
        for &id in &ids {
            store.record(result(id)).unwrap();
            assert!(store.snapshot().window.len() <= 45);
        }

        let snap = store.snapshot();
        assert_eq!(snap.window.len(), 45);
        let window: Vec<u16> = snap.window.iter().map(|r| r.segment.0).collect();
        assert_eq!(window, ids[55..].to_vec());
        assert_eq!(snap.recent(1).next().unwrap().segment.0, ids[99]);
    }

    #[test]
    fn test_counts_sum_to_total() {
        let table = table();
        let store = StatisticsStore::new(&table, 10).unwrap();
        for i in 0..37u16 {
            store.record(result(i % 5)).unwrap();
        }
        let snap = store.snapshot();
        assert_eq!(snap.counts.iter().sum::<u64>(), 37);
        assert_eq!(snap.total_spins(), 37);
        assert_eq!(snap.window_counts().iter().sum::<u64>(), 10);

        let freqs = snap.frequencies(&table);
        let observed: f64 = freqs.iter().map(|f| f.observed).sum();
        let expected: f64 = freqs.iter().map(|f| f.expected).sum();
        assert!((observed - 1.0).abs() < 1e-12);
        assert!((expected - 1.0).abs() < 1e-12);
        assert!((freqs[0].expected - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_segment_leaves_store_untouched() {
        let table = table();
        let store = StatisticsStore::new(&table, 45).unwrap();
        store.record(result(1)).unwrap();
        let before = store.snapshot();

        let err = store.record(result(5)).unwrap_err();
        assert!(matches!(err, WfError::UnknownSegment(SegmentId(5))));
        assert_eq!(*store.snapshot(), *before);
    }

    #[test]
    fn test_snapshot_is_immutable() {
        let table = table();
        let store = StatisticsStore::new(&table, 45).unwrap();
        store.record(result(0)).unwrap();
        let held = store.snapshot();

        store.record(result(2)).unwrap();
        assert_eq!(held.total_spins(), 1);
        assert_eq!(store.snapshot().total_spins(), 2);

        store.reset();
        assert_eq!(held.total_spins(), 1);
        assert_eq!(store.snapshot().total_spins(), 0);
        assert!(store.snapshot().window.is_empty());
        assert_eq!(store.capacity(), 45);
    }

    #[test]
    fn test_dice_summary() {
        let table = table();
        let store = StatisticsStore::new(&table, 45).unwrap();
        for id in [0u16, 1, 2, 3, 4, 2] {
            store.record(result(id)).unwrap();
        }
        let summary = store.snapshot().summary.clone();
        assert_eq!(summary.spins, 6);
        assert_eq!(summary.dice_rolled, 12);
        assert_eq!(summary.face_hits, [1, 1, 1, 2, 1, 6]);
        assert_eq!(summary.house_wins, 1);
        assert_eq!(summary.spin_agains, 1);
        assert_eq!((summary.singles, summary.doubles, summary.triples), (1, 1, 2));
        assert!((summary.face_share(6) - 0.5).abs() < 1e-12);

        let last_two = store.snapshot().recent_summary(&table, 2);
        assert_eq!(last_two.spins, 2);
        assert_eq!(last_two.spin_agains, 1);
        assert_eq!(last_two.triples, 1);
    }

    #[test]
    fn test_clone_handles_share_data() {
        let table = table();
        let store = StatisticsStore::new(&table, 45).unwrap();
        let other = store.clone();
        other.record(result(3)).unwrap();
        assert_eq!(store.snapshot().count(SegmentId(3)), 1);
        assert!(StatisticsStore::new(&table, 0).is_err());
    }
}

use std::collections::{HashSet, VecDeque};

use kiddo::{KdTree, SquaredEuclidean};

use crate::{associate::TrackId, error::ConfigError, geometry::Centroid};

pub const DEFAULT_HISTORY_LEN: usize = 10;

/// Identity seeded into every slot before the first frame.
pub const SENTINEL_ID: TrackId = 0;

/// Identities assigned in one frame, in assignment order.
#[derive(Clone, Debug, Default)]
pub struct FrameRecord {
    entries: Vec<(Centroid, TrackId)>,
    tree: Option<KdTree<f64, 2>>,
    // tree item -> index of the first entry at that centroid
    items: Vec<usize>,
}

impl FrameRecord {
    /// The k-d tree holds each distinct centroid once. A kiddo leaf cannot
    /// split more than its bucket size of identical points.
    pub fn new(entries: Vec<(Centroid, TrackId)>) -> Self {
        let mut seen = HashSet::new();
        let items = entries
            .iter()
            .enumerate()
            .filter(|(_, (centroid, _))| seen.insert(*centroid))
            .map(|(index, _)| index)
            .collect::<Vec<usize>>();

        let tree = if items.is_empty() {
            None
        } else {
            let coords = items
                .iter()
                .map(|&index| entries[index].0.as_array())
                .collect::<Vec<[f64; 2]>>();
            Some((&coords).into())
        };
        Self {
            entries,
            tree,
            items,
        }
    }

    pub fn sentinel() -> Self {
        Self::new(vec![(Centroid::new(0, 0), SENTINEL_ID)])
    }

    pub fn entries(&self) -> &[(Centroid, TrackId)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn nearest(&self, centroid: &Centroid) -> Option<(f64, TrackId)> {
        let tree = self.tree.as_ref()?;
        let nearest = tree.nearest_one::<SquaredEuclidean>(&centroid.as_array());
        let index = *self.items.get(nearest.item as usize)?;
        let (_, identity) = self.entries.get(index)?;
        Some((nearest.distance.sqrt(), *identity))
    }
}

/// Closest historical centroid to a query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestMatch {
    pub distance: f64,
    pub identity: TrackId,
    /// 0 is the most recent frame record.
    pub frame_offset: usize,
}

/// Sliding window over the last K frame records.
#[derive(Clone, Debug)]
pub struct DetectionHistory {
    // front = oldest, back = newest
    records: VecDeque<FrameRecord>,
}

impl DetectionHistory {
    /// Window of `len` slots, each seeded with the sentinel record.
    pub fn new(len: usize) -> Result<Self, ConfigError> {
        if len == 0 {
            return Err(ConfigError::InvalidHistoryLength);
        }
        Ok(Self {
            records: (0..len).map(|_| FrameRecord::sentinel()).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records from newest to oldest.
    pub fn records(&self) -> impl Iterator<Item = &FrameRecord> {
        self.records.iter().rev()
    }

    pub fn advance(&mut self, record: FrameRecord) {
        self.records.pop_front();
        self.records.push_back(record);
    }

    /// Closest centroid across every non-empty record. A strictly smaller
    /// distance is required to displace a candidate from a newer record.
    pub fn nearest_match(&self, centroid: &Centroid) -> Option<NearestMatch> {
        let mut best: Option<NearestMatch> = None;

        for (frame_offset, record) in self.records().enumerate() {
            let Some((distance, identity)) = record.nearest(centroid) else {
                continue;
            };
            if best.is_none_or(|best| distance < best.distance) {
                best = Some(NearestMatch {
                    distance,
                    identity,
                    frame_offset,
                });
            }
        }

        best
    }
}

impl Default for DetectionHistory {
    fn default() -> Self {
        Self {
            records: (0..DEFAULT_HISTORY_LEN)
                .map(|_| FrameRecord::sentinel())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: &[((i32, i32), TrackId)]) -> FrameRecord {
        FrameRecord::new(
            entries
                .iter()
                .map(|&((x, y), id)| (Centroid::new(x, y), id))
                .collect(),
        )
    }

    #[test]
    fn test_new_history_is_seeded_with_sentinels() {
        let history = DetectionHistory::new(4).unwrap();

        assert_eq!(history.len(), 4);
        assert!(
            history
                .records()
                .all(|r| r.entries() == [(Centroid::new(0, 0), SENTINEL_ID)])
        );
    }

    #[test]
    fn test_zero_length_history_is_rejected() {
        assert!(DetectionHistory::new(0).is_err());
    }

    #[test]
    fn test_length_is_constant_across_advances() {
        for len in 1..=5 {
            let mut history = DetectionHistory::new(len).unwrap();
            for i in 0..12 {
                history.advance(record(&[((i, i), i as TrackId + 1)]));
                assert_eq!(history.len(), len);
            }
        }
    }

    #[test]
    fn test_advance_evicts_oldest_record() {
        let mut history = DetectionHistory::new(2).unwrap();
        history.advance(record(&[((10, 10), 1)]));
        history.advance(record(&[((20, 20), 2)]));
        history.advance(record(&[((30, 30), 3)]));

        let ids: Vec<TrackId> = history.records().map(|r| r.entries()[0].1).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_nearest_match_is_global_minimum() {
        let mut history = DetectionHistory::new(3).unwrap();
        history.advance(record(&[((100, 100), 1), ((400, 400), 2)]));
        history.advance(record(&[((150, 150), 3)]));
        history.advance(record(&[((300, 300), 4)]));

        let found = history.nearest_match(&Centroid::new(105, 100)).unwrap();
        assert_eq!(found.identity, 1);
        assert_eq!(found.frame_offset, 2);
        assert_eq!(found.distance, 5.0);
    }

    #[test]
    fn test_nearest_match_prefers_most_recent_on_tie() {
        let mut history = DetectionHistory::new(3).unwrap();
        history.advance(record(&[((100, 100), 1)]));
        history.advance(record(&[((100, 110), 2)]));
        history.advance(record(&[((500, 500), 3)]));

        let found = history.nearest_match(&Centroid::new(100, 105)).unwrap();
        assert_eq!(found.identity, 2);
        assert_eq!(found.frame_offset, 1);
    }

    #[test]
    fn test_record_with_many_identical_centroids() {
        let entries = (1..=40)
            .map(|id| (Centroid::new(110, 110), id))
            .collect::<Vec<_>>();
        let mut history = DetectionHistory::new(2).unwrap();
        history.advance(FrameRecord::new(entries));

        let found = history.nearest_match(&Centroid::new(112, 110)).unwrap();
        assert_eq!(found.identity, 1);
        assert_eq!(found.distance, 2.0);
        assert_eq!(history.records().next().unwrap().len(), 40);
    }

    #[test]
    fn test_empty_records_contribute_no_candidate() {
        let mut history = DetectionHistory::new(2).unwrap();
        history.advance(FrameRecord::default());
        history.advance(FrameRecord::default());

        assert_eq!(history.nearest_match(&Centroid::new(0, 0)), None);

        history.advance(record(&[((50, 50), 9)]));
        let found = history.nearest_match(&Centroid::new(0, 0)).unwrap();
        assert_eq!(found.identity, 9);
        assert_eq!(found.frame_offset, 0);
    }
}

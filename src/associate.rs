use std::collections::HashSet;

use log::debug;

use crate::{
    analyzer::Detection,
    error::ConfigError,
    geometry::Centroid,
    history::{DetectionHistory, FrameRecord, SENTINEL_ID},
};

/// Stable handle for a tracked object. Allocated monotonically, never reused.
pub type TrackId = u32;

pub const DEFAULT_VEHICLE_LABELS: [&str; 6] =
    ["bicycle", "car", "motorbike", "bus", "truck", "train"];

/// Outcome of associating one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Association {
    /// Centroid to identity, in detector output order.
    pub assignments: Vec<(Centroid, TrackId)>,
    /// Identities allocated while processing this frame.
    pub new_identities: Vec<TrackId>,
}

/// Nearest-centroid identity tracker over a sliding window of past frames.
#[derive(Clone, Debug)]
pub struct IdentityAssociator {
    history: DetectionHistory,
    vehicle_labels: HashSet<String>,
    next_id: TrackId,
    vehicle_count: u64,
}

impl IdentityAssociator {
    pub fn new<I, S>(history_len: usize, vehicle_labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            history: DetectionHistory::new(history_len)?,
            vehicle_labels: vehicle_labels.into_iter().map(Into::into).collect(),
            next_id: SENTINEL_ID + 1,
            vehicle_count: 0,
        })
    }

    pub fn history(&self) -> &DetectionHistory {
        &self.history
    }

    /// Number of identities allocated since construction.
    pub fn vehicle_count(&self) -> u64 {
        self.vehicle_count
    }

    pub fn is_vehicle(&self, label: &str) -> bool {
        self.vehicle_labels.contains(label)
    }

    /// Assigns an identity to every vehicle-class detection and advances the
    /// history by one frame.
    ///
    /// ## Args
    ///  - detections: The frame's detections, in the order the detector
    ///    emitted them. Non-vehicle labels are skipped.
    ///
    /// Each detection is matched against the history independently. A match
    /// is accepted when the nearest historical centroid lies within half of
    /// the detection's longer side (inclusive). When a matched identity was
    /// already taken by an earlier detection of the same frame, the later
    /// detection receives a fresh identity instead, so order decides which
    /// detection keeps a contested identity.
    pub fn associate(&mut self, detections: &[Detection]) -> Association {
        let mut association = Association::default();
        let mut taken: HashSet<TrackId> = HashSet::new();

        let vehicles: Vec<&Detection> = detections
            .iter()
            .filter(|detection| self.is_vehicle(&detection.label))
            .collect();

        for detection in vehicles {
            let centroid = detection.bbox.centroid();
            let radius = detection.bbox.acceptance_radius();

            let matched = self
                .history
                .nearest_match(&centroid)
                .filter(|nearest| nearest.distance <= radius)
                .map(|nearest| nearest.identity);

            let identity = match matched {
                Some(identity) if !taken.contains(&identity) => identity,
                Some(identity) => {
                    let fresh = self.allocate();
                    debug!(
                        "identity {} already taken at {:?}, reassigned to {}",
                        identity, centroid, fresh
                    );
                    association.new_identities.push(fresh);
                    fresh
                }
                None => {
                    let fresh = self.allocate();
                    debug!("new identity {} at {:?}", fresh, centroid);
                    association.new_identities.push(fresh);
                    fresh
                }
            };

            taken.insert(identity);
            association.assignments.push((centroid, identity));
        }

        self.history
            .advance(FrameRecord::new(association.assignments.clone()));

        association
    }

    fn allocate(&mut self) -> TrackId {
        let identity = self.next_id;
        self.next_id += 1;
        self.vehicle_count += 1;
        identity
    }
}

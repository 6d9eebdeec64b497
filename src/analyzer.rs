use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    associate::{IdentityAssociator, TrackId},
    config::AnalyzerConfig,
    counting_line::LineCounter,
    error::{ConfigError, InputShapeError},
    geometry::{BoxRect, Centroid},
    violation::{ViolationClassifier, ViolationRecord},
    zones::{CameraPose, ZoneTable},
};

/// One raw detector output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoxRect,
    pub label: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BoxRect, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            label: label.into(),
            confidence,
        }
    }

    pub fn validate(&self) -> Result<(), InputShapeError> {
        self.bbox.validate()?;
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(InputShapeError::InvalidConfidence(self.confidence));
        }
        Ok(())
    }
}

/// Everything the analyzer derived from one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame_index: u64,
    /// Active camera viewpoint, `None` outside every configured interval.
    pub pose: Option<CameraPose>,
    /// Centroid to identity for every tracked detection, in detector order.
    pub identities: Vec<(Centroid, TrackId)>,
    pub new_identities: Vec<TrackId>,
    /// Identities allocated since the analyzer was created.
    pub vehicle_count: u64,
    /// Distinct identities that touched the counting line, if one is set.
    pub crossed_count: Option<usize>,
    pub violations: Vec<ViolationRecord>,
}

/// Per-frame pipeline: association, line counting and zone violations.
pub struct FrameAnalyzer {
    associator: IdentityAssociator,
    classifier: ViolationClassifier,
    zones: ZoneTable,
    line_counter: Option<LineCounter>,
    min_confidence: f32,
}

impl FrameAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            associator: IdentityAssociator::new(config.history_len, config.vehicle_labels)?,
            classifier: ViolationClassifier::new(config.violation)?,
            zones: ZoneTable::new(config.zones)?,
            line_counter: config.counting_line.map(LineCounter::new),
            min_confidence: config.min_confidence,
        })
    }

    pub fn associator(&self) -> &IdentityAssociator {
        &self.associator
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn vehicle_count(&self) -> u64 {
        self.associator.vehicle_count()
    }

    /// Processes one frame. Malformed detections are logged and skipped, the
    /// rest of the frame is still analyzed.
    pub fn process_frame(&mut self, frame_index: u64, detections: &[Detection]) -> FrameReport {
        let accepted = detections
            .iter()
            .filter(|detection| match detection.validate() {
                Ok(()) => true,
                Err(err) => {
                    warn!("frame {}: dropping detection {:?}: {}", frame_index, detection, err);
                    false
                }
            })
            .filter(|detection| detection.confidence >= self.min_confidence)
            .cloned()
            .collect::<Vec<Detection>>();

        let association = self.associator.associate(&accepted);

        let crossed_count = self.line_counter.as_mut().map(|counter| {
            counter.update(&association.assignments);
            counter.crossed_count()
        });

        let selection = self.zones.select_zone_set(frame_index);
        let violations = self
            .classifier
            .evaluate(accepted.iter().map(|detection| &detection.bbox), selection.zones);

        debug!(
            "frame {}: {} detections, {} tracked, {} new, {} violations, pose {:?}",
            frame_index,
            accepted.len(),
            association.assignments.len(),
            association.new_identities.len(),
            violations.len(),
            selection.pose
        );

        FrameReport {
            frame_index,
            pose: selection.pose,
            identities: association.assignments,
            new_identities: association.new_identities,
            vehicle_count: self.associator.vehicle_count(),
            crossed_count,
            violations,
        }
    }
}

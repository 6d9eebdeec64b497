use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    geometry::{BoxRect, box_to_polygon, polygon_iou},
    zones::Zone,
};

pub const DEFAULT_MIN_BOX_AREA: i64 = 35_000;
pub const DEFAULT_VIOLATION_LOW: f64 = 0.15;
pub const DEFAULT_VIOLATION_HIGH: f64 = 0.30;

/// How a box relates to a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlap {
    /// Too little overlap to relate the two.
    Unrelated,
    /// Partial occupancy, the object encroaches on the zone.
    Violation,
    /// Enough overlap to count as legitimately parked.
    Occupied,
}

/// An object box that encroaches on a zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub bbox: BoxRect,
    pub zone_id: u32,
    pub iou: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViolationParams {
    /// Boxes smaller than this (px²) are ignored as distant or spurious.
    pub min_box_area: i64,
    /// Inclusive lower bound of the violation band.
    pub low: f64,
    /// Exclusive upper bound of the violation band.
    pub high: f64,
}

impl Default for ViolationParams {
    fn default() -> Self {
        Self {
            min_box_area: DEFAULT_MIN_BOX_AREA,
            low: DEFAULT_VIOLATION_LOW,
            high: DEFAULT_VIOLATION_HIGH,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ViolationClassifier {
    params: ViolationParams,
}

impl ViolationClassifier {
    pub fn new(params: ViolationParams) -> Result<Self, ConfigError> {
        let ViolationParams { low, high, .. } = params;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(ConfigError::InvalidThresholds { low, high });
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &ViolationParams {
        &self.params
    }

    pub fn classify(&self, iou: f64) -> Overlap {
        if iou < self.params.low {
            Overlap::Unrelated
        } else if iou < self.params.high {
            Overlap::Violation
        } else {
            Overlap::Occupied
        }
    }

    pub fn is_relevant(&self, bbox: &BoxRect) -> bool {
        bbox.area() >= self.params.min_box_area
    }

    /// Checks every relevant box against every zone. A box may violate
    /// several adjacent zones at once.
    pub fn evaluate<'a, I>(&self, boxes: I, zones: &[Zone]) -> Vec<ViolationRecord>
    where
        I: IntoIterator<Item = &'a BoxRect>,
    {
        let mut violations = Vec::new();
        if zones.is_empty() {
            return violations;
        }

        for bbox in boxes.into_iter().filter(|bbox| self.is_relevant(bbox)) {
            let polygon = box_to_polygon(bbox);
            for zone in zones {
                let iou = polygon_iou(&polygon, &zone.vertices).unwrap_or(0.0);
                if self.classify(iou) == Overlap::Violation {
                    violations.push(ViolationRecord {
                        bbox: *bbox,
                        zone_id: zone.id,
                        iou,
                    });
                }
            }
        }

        violations
    }
}

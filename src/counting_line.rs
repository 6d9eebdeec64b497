use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{associate::TrackId, geometry::Centroid};

pub const DEFAULT_LINE_TOLERANCE: i32 = 5;

fn default_tolerance() -> i32 {
    DEFAULT_LINE_TOLERANCE
}

/// Axis-aligned counting region spanned by a line segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountingLine {
    pub x_1: i32,
    pub y_1: i32,
    pub x_2: i32,
    pub y_2: i32,
    /// Slack added past the far end of the segment on both axes.
    #[serde(default = "default_tolerance")]
    pub tolerance: i32,
}

impl CountingLine {
    pub fn new(x_1: i32, y_1: i32, x_2: i32, y_2: i32) -> Self {
        Self {
            x_1,
            y_1,
            x_2,
            y_2,
            tolerance: DEFAULT_LINE_TOLERANCE,
        }
    }

    /// Full-width horizontal line at half the frame height.
    pub fn horizontal_midline(frame_width: i32, frame_height: i32) -> Self {
        let y = frame_height / 2;
        Self::new(0, y, frame_width, y)
    }

    pub fn overlaps(&self, centroid: &Centroid) -> bool {
        (self.x_1..=self.x_2 + self.tolerance).contains(&centroid.x)
            && (self.y_1..=self.y_2 + self.tolerance).contains(&centroid.y)
    }
}

/// Distinct identities seen on a counting line.
#[derive(Clone, Debug)]
pub struct LineCounter {
    line: CountingLine,
    crossed: HashSet<TrackId>,
}

impl LineCounter {
    pub fn new(line: CountingLine) -> Self {
        Self {
            line,
            crossed: HashSet::new(),
        }
    }

    pub fn line(&self) -> &CountingLine {
        &self.line
    }

    pub fn crossed_count(&self) -> usize {
        self.crossed.len()
    }

    /// Records the frame's assignments and returns the identities that touch
    /// the line for the first time.
    pub fn update(&mut self, assignments: &[(Centroid, TrackId)]) -> Vec<TrackId> {
        assignments
            .iter()
            .filter(|(centroid, _)| self.line.overlaps(centroid))
            .filter_map(|&(_, identity)| self.crossed.insert(identity).then_some(identity))
            .collect()
    }
}

//! Time-indexed selection of reference zones.
//!
//! The camera cycles through a fixed set of viewpoints. Each viewpoint is
//! active for a half-open range of frame indices and carries the parking-lot
//! polygons drawn for that view. Frames outside every range see no zones.

use itertools::Itertools;
use log::{info, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, InputShapeError};

pub const DEFAULT_FPS: f64 = 30.0;

fn default_fps() -> f64 {
    DEFAULT_FPS
}

/// Discrete camera viewpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraPose {
    pub pose: u32,
    pub angle: u32,
}

/// A polygonal region of interest, typically one parking space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: u32,
    pub vertices: Vec<Point2<f64>>,
}

impl Zone {
    pub fn new(id: u32, vertices: &[(i32, i32)]) -> Self {
        Self {
            id,
            vertices: vertices
                .iter()
                .map(|&(x, y)| Point2::new(x as f64, y as f64))
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), InputShapeError> {
        if self.vertices.len() < 3 {
            return Err(InputShapeError::TooFewVertices {
                zone_id: self.id,
                vertices: self.vertices.len(),
            });
        }
        Ok(())
    }
}

/// One row of the declarative zone table.
///
/// The range is given either in frames (`start`/`end`) or in seconds
/// (`start_secs`/`end_secs`), never both.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoneIntervalSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_secs: Option<f64>,
    #[serde(flatten)]
    pub camera: CameraPose,
    pub zones: Vec<Zone>,
}

impl ZoneIntervalSpec {
    pub fn frames(start: u64, end: u64, camera: CameraPose, zones: Vec<Zone>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            start_secs: None,
            end_secs: None,
            camera,
            zones,
        }
    }

    fn frame_range(&self, fps: f64) -> Result<(u64, u64), ConfigError> {
        match (self.start, self.end, self.start_secs, self.end_secs) {
            (Some(start), Some(end), None, None) => Ok((start, end)),
            (None, None, Some(start_secs), Some(end_secs)) => {
                Ok((secs_to_frame(start_secs, fps)?, secs_to_frame(end_secs, fps)?))
            }
            _ => Err(ConfigError::AmbiguousInterval),
        }
    }
}

fn secs_to_frame(secs: f64, fps: f64) -> Result<u64, ConfigError> {
    let frame = (secs * fps).round();
    // u64::MAX as f64 rounds up to 2^64
    if !(secs.is_finite() && secs >= 0.0 && frame < u64::MAX as f64) {
        return Err(ConfigError::InvalidSeconds(secs));
    }
    Ok(frame as u64)
}

/// Unvalidated zone table, as read from configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoneTableSpec {
    #[serde(default = "default_fps")]
    pub fps: f64,
    pub intervals: Vec<ZoneIntervalSpec>,
}

impl Default for ZoneTableSpec {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ZoneTableSpec {
    /// The four viewpoints of the reference parking-lot recording.
    pub fn builtin() -> Self {
        let intervals = vec![
            ZoneIntervalSpec::frames(
                750,
                900,
                CameraPose { pose: 0, angle: 0 },
                vec![
                    Zone::new(0, &[(313, 303), (500, 303), (250, 425), (55, 415)]),
                    Zone::new(1, &[(766, 270), (992, 257), (1151, 402), (721, 439)]),
                ],
            ),
            ZoneIntervalSpec::frames(
                1110,
                1260,
                CameraPose { pose: 0, angle: 1 },
                vec![Zone::new(
                    0,
                    &[(440, 200), (750, 257), (600, 340), (300, 295)],
                )],
            ),
            ZoneIntervalSpec::frames(
                1920,
                2010,
                CameraPose { pose: 1, angle: 0 },
                vec![
                    Zone::new(0, &[(250, 295), (480, 275), (430, 384), (110, 430)]),
                    Zone::new(1, &[(430, 384), (700, 255), (920, 250), (785, 400)]),
                    Zone::new(2, &[(920, 250), (785, 400), (1185, 410), (1130, 250)]),
                ],
            ),
            ZoneIntervalSpec::frames(
                2220,
                2295,
                CameraPose { pose: 1, angle: 1 },
                vec![
                    Zone::new(0, &[(285, 300), (585, 250), (690, 490), (140, 615)]),
                    Zone::new(1, &[(635, 365), (750, 340), (885, 425), (690, 490)]),
                    Zone::new(2, &[(750, 340), (885, 305), (1040, 370), (885, 425)]),
                    Zone::new(3, &[(885, 305), (980, 275), (1155, 325), (1040, 370)]),
                ],
            ),
        ];

        Self {
            fps: DEFAULT_FPS,
            intervals,
        }
    }
}

#[derive(Clone, Debug)]
struct ZoneInterval {
    start: u64,
    end: u64,
    camera: CameraPose,
    zones: Vec<Zone>,
}

/// Zones active at one frame index.
#[derive(Clone, Copy, Debug)]
pub struct ZoneSelection<'a> {
    pub pose: Option<CameraPose>,
    pub zones: &'a [Zone],
}

/// Validated, non-overlapping zone table.
#[derive(Clone, Debug)]
pub struct ZoneTable {
    fps: f64,
    intervals: Vec<ZoneInterval>,
}

impl ZoneTable {
    /// Validates `spec`. Empty or overlapping ranges are fatal. Zones with
    /// fewer than three vertices are dropped with a warning.
    pub fn new(spec: ZoneTableSpec) -> Result<Self, ConfigError> {
        if !(spec.fps.is_finite() && spec.fps > 0.0) {
            return Err(ConfigError::InvalidFps(spec.fps));
        }

        let mut intervals = Vec::with_capacity(spec.intervals.len());
        for interval in spec.intervals {
            let (start, end) = interval.frame_range(spec.fps)?;
            if start >= end {
                return Err(ConfigError::EmptyInterval { start, end });
            }
            let zones = interval
                .zones
                .into_iter()
                .filter(|zone| match zone.validate() {
                    Ok(()) => true,
                    Err(err) => {
                        warn!("dropping zone for pose {:?}: {}", interval.camera, err);
                        false
                    }
                })
                .collect();
            intervals.push(ZoneInterval {
                start,
                end,
                camera: interval.camera,
                zones,
            });
        }

        intervals.sort_by_key(|interval| interval.start);
        if let Some((first, second)) = intervals
            .iter()
            .tuple_windows()
            .find(|(first, second)| first.end > second.start)
        {
            return Err(ConfigError::OverlappingIntervals {
                first_start: first.start,
                first_end: first.end,
                second_start: second.start,
                second_end: second.end,
            });
        }

        info!(
            "zone table ready: {} intervals at {} fps",
            intervals.len(),
            spec.fps
        );

        Ok(Self {
            fps: spec.fps,
            intervals,
        })
    }

    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(ZoneTableSpec::builtin())
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Looks up the viewpoint and zones active at `frame_index`.
    pub fn select_zone_set(&self, frame_index: u64) -> ZoneSelection<'_> {
        let candidate = self
            .intervals
            .partition_point(|interval| interval.end <= frame_index);

        match self.intervals.get(candidate) {
            Some(interval) if interval.start <= frame_index => ZoneSelection {
                pose: Some(interval.camera),
                zones: &interval.zones,
            },
            _ => ZoneSelection {
                pose: None,
                zones: &[],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_zone(id: u32) -> Zone {
        Zone::new(id, &[(0, 0), (10, 0), (10, 10), (0, 10)])
    }

    #[test]
    fn test_builtin_table_selects_expected_views() {
        let table = ZoneTable::builtin().unwrap();

        let selection = table.select_zone_set(800);
        assert_eq!(selection.pose, Some(CameraPose { pose: 0, angle: 0 }));
        assert_eq!(selection.zones.len(), 2);

        assert_eq!(table.select_zone_set(1200).zones.len(), 1);
        assert_eq!(table.select_zone_set(1950).zones.len(), 3);
        assert_eq!(
            table.select_zone_set(2294).pose,
            Some(CameraPose { pose: 1, angle: 1 })
        );
        assert_eq!(table.select_zone_set(2294).zones.len(), 4);
    }

    #[test]
    fn test_frame_outside_every_interval_selects_nothing() {
        let table = ZoneTable::builtin().unwrap();

        for frame_index in [0, 500, 749, 900, 1000, 5000] {
            let selection = table.select_zone_set(frame_index);
            assert_eq!(selection.pose, None);
            assert!(selection.zones.is_empty());
        }
    }

    #[test]
    fn test_intervals_are_half_open() {
        let table = ZoneTable::builtin().unwrap();

        assert!(table.select_zone_set(750).pose.is_some());
        assert!(table.select_zone_set(899).pose.is_some());
        assert!(table.select_zone_set(900).pose.is_none());
    }

    #[test]
    fn test_overlapping_intervals_are_rejected() {
        let spec = ZoneTableSpec {
            fps: DEFAULT_FPS,
            intervals: vec![
                ZoneIntervalSpec::frames(100, 200, CameraPose { pose: 0, angle: 0 }, vec![]),
                ZoneIntervalSpec::frames(150, 250, CameraPose { pose: 0, angle: 1 }, vec![]),
            ],
        };

        assert!(matches!(
            ZoneTable::new(spec),
            Err(ConfigError::OverlappingIntervals { .. })
        ));
    }

    #[test]
    fn test_adjacent_intervals_are_accepted() {
        let spec = ZoneTableSpec {
            fps: DEFAULT_FPS,
            intervals: vec![
                ZoneIntervalSpec::frames(200, 300, CameraPose { pose: 0, angle: 1 }, vec![]),
                ZoneIntervalSpec::frames(100, 200, CameraPose { pose: 0, angle: 0 }, vec![]),
            ],
        };
        let table = ZoneTable::new(spec).unwrap();

        assert_eq!(
            table.select_zone_set(200).pose,
            Some(CameraPose { pose: 0, angle: 1 })
        );
        assert_eq!(
            table.select_zone_set(199).pose,
            Some(CameraPose { pose: 0, angle: 0 })
        );
    }

    #[test]
    fn test_empty_interval_is_rejected() {
        let spec = ZoneTableSpec {
            fps: DEFAULT_FPS,
            intervals: vec![ZoneIntervalSpec::frames(
                100,
                100,
                CameraPose { pose: 0, angle: 0 },
                vec![square_zone(0)],
            )],
        };

        assert!(matches!(
            ZoneTable::new(spec),
            Err(ConfigError::EmptyInterval { .. })
        ));
    }

    #[test]
    fn test_zone_with_too_few_vertices_is_dropped() {
        let spec = ZoneTableSpec {
            fps: DEFAULT_FPS,
            intervals: vec![ZoneIntervalSpec::frames(
                0,
                10,
                CameraPose { pose: 0, angle: 0 },
                vec![square_zone(0), Zone::new(1, &[(0, 0), (5, 5)])],
            )],
        };
        let table = ZoneTable::new(spec).unwrap();
        let zones = table.select_zone_set(5).zones;

        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].id, 0);
    }

    #[test]
    fn test_intervals_in_seconds_use_fps() {
        let json = r#"{
            "fps": 30.0,
            "intervals": [
                {"start_secs": 25, "end_secs": 30, "pose": 0, "angle": 0,
                 "zones": [{"id": 7, "vertices": [[0, 0], [10, 0], [10, 10]]}]}
            ]
        }"#;
        let spec: ZoneTableSpec = serde_json::from_str(json).unwrap();
        let table = ZoneTable::new(spec).unwrap();

        assert!(table.select_zone_set(749).pose.is_none());
        assert_eq!(table.select_zone_set(750).zones[0].id, 7);
        assert!(table.select_zone_set(900).pose.is_none());
    }

    #[test]
    fn test_negative_or_non_finite_seconds_are_rejected() {
        let interval = |start_secs: f64, end_secs: f64| ZoneTableSpec {
            fps: 30.0,
            intervals: vec![ZoneIntervalSpec {
                start: None,
                end: None,
                start_secs: Some(start_secs),
                end_secs: Some(end_secs),
                camera: CameraPose { pose: 0, angle: 0 },
                zones: vec![Zone::new(0, &[(0, 0), (10, 0), (10, 10)])],
            }],
        };

        for (start_secs, end_secs) in [
            (-5.0, 2.0),
            (f64::NAN, 2.0),
            (0.0, f64::INFINITY),
            (0.0, 1e30),
        ] {
            assert!(matches!(
                ZoneTable::new(interval(start_secs, end_secs)),
                Err(ConfigError::InvalidSeconds(_))
            ));
        }
        assert!(ZoneTable::new(interval(0.0, 2.0)).is_ok());
    }

    #[test]
    fn test_mixed_interval_units_are_rejected() {
        let json = r#"{
            "intervals": [{"start": 0, "end_secs": 2.0, "pose": 0, "angle": 0, "zones": []}]
        }"#;
        let spec: ZoneTableSpec = serde_json::from_str(json).unwrap();

        assert!(matches!(
            ZoneTable::new(spec),
            Err(ConfigError::AmbiguousInterval)
        ));
    }
}

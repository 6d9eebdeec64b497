//! JSON configuration for the frame analyzer.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    associate::DEFAULT_VEHICLE_LABELS,
    counting_line::CountingLine,
    error::ConfigError,
    history::DEFAULT_HISTORY_LEN,
    violation::ViolationParams,
    zones::ZoneTableSpec,
};

pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

fn default_history_len() -> usize {
    DEFAULT_HISTORY_LEN
}

fn default_vehicle_labels() -> Vec<String> {
    DEFAULT_VEHICLE_LABELS.iter().map(|s| s.to_string()).collect()
}

fn default_min_confidence() -> f32 {
    DEFAULT_MIN_CONFIDENCE
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Number of past frames searched for a matching centroid.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// Labels that are tracked and counted.
    #[serde(default = "default_vehicle_labels")]
    pub vehicle_labels: Vec<String>,
    /// Detections below this confidence are ignored.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    #[serde(default)]
    pub violation: ViolationParams,
    #[serde(default)]
    pub counting_line: Option<CountingLine>,
    #[serde(default)]
    pub zones: ZoneTableSpec,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            history_len: DEFAULT_HISTORY_LEN,
            vehicle_labels: default_vehicle_labels(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            violation: ViolationParams::default(),
            counting_line: None,
            zones: ZoneTableSpec::builtin(),
        }
    }
}

impl AnalyzerConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: AnalyzerConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.history_len, 10);
        assert_eq!(config.min_confidence, 0.5);
        assert_eq!(config.violation, ViolationParams::default());
        assert!(config.counting_line.is_none());
        assert_eq!(config.zones.intervals.len(), 4);
        assert!(config.vehicle_labels.iter().any(|l| l == "truck"));
    }

    #[test]
    fn test_config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analyzer.json");
        let config = AnalyzerConfig {
            history_len: 4,
            counting_line: Some(CountingLine::new(0, 360, 1280, 360)),
            ..AnalyzerConfig::default()
        };

        config.write_json(&path).unwrap();
        let loaded = AnalyzerConfig::load_json(&path).unwrap();

        assert_eq!(loaded.history_len, 4);
        assert_eq!(loaded.counting_line, config.counting_line);
        assert_eq!(loaded.zones.intervals.len(), 4);
    }

    #[test]
    fn test_checked_in_zone_table_matches_builtin() {
        let raw = include_str!("../config/zones.json");
        let spec: ZoneTableSpec = serde_json::from_str(raw).unwrap();
        let builtin = ZoneTableSpec::builtin();

        assert_eq!(spec.intervals.len(), builtin.intervals.len());
        for (loaded, expected) in spec.intervals.iter().zip(builtin.intervals.iter()) {
            assert_eq!(loaded.start, expected.start);
            assert_eq!(loaded.end, expected.end);
            assert_eq!(loaded.camera, expected.camera);
            assert_eq!(loaded.zones, expected.zones);
        }
    }
}

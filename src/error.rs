/// Malformed per-frame or per-zone input. The offending entry is dropped and
/// processing continues with the rest.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InputShapeError {
    #[error("box has negative extent (width={width}, height={height})")]
    NegativeExtent { width: i32, height: i32 },
    #[error("confidence {0} is outside [0, 1]")]
    InvalidConfidence(f32),
    #[error("zone {zone_id} has {vertices} vertices, at least 3 are required")]
    TooFewVertices { zone_id: u32, vertices: usize },
    #[error("box at ({x}, {y}) with extent {width}x{height} exceeds the pixel coordinate range")]
    CoordinateOverflow {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// Errors that make an analyzer impossible to construct.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("interval [{start}, {end}) is empty")]
    EmptyInterval { start: u64, end: u64 },
    #[error("interval [{first_start}, {first_end}) overlaps [{second_start}, {second_end})")]
    OverlappingIntervals {
        first_start: u64,
        first_end: u64,
        second_start: u64,
        second_end: u64,
    },
    #[error("interval must be given either in frames or in seconds")]
    AmbiguousInterval,
    #[error("interval bound of {0} seconds is not a frame index")]
    InvalidSeconds(f64),
    #[error("history length must be >= 1")]
    InvalidHistoryLength,
    #[error("fps must be > 0, got {0}")]
    InvalidFps(f64),
    #[error("violation band [{low}, {high}) is not a valid sub-range of [0, 1]")]
    InvalidThresholds { low: f64, high: f64 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

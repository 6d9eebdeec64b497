//! Frame-to-frame vehicle identity tracking and parking-zone violation
//! analytics over per-frame object detections.
//!
//! Feed each frame's detections to [`FrameAnalyzer::process_frame`] in
//! order. Identities are kept stable with a nearest-centroid search over a
//! short window of past frames, and boxes are checked against the zones of
//! the camera viewpoint active at that frame.

mod analyzer;
mod associate;
mod config;
mod counting_line;
mod error;
mod geometry;
mod history;
#[cfg(feature = "python")]
mod python_api;
mod violation;
mod zones;

pub use analyzer::{Detection, FrameAnalyzer, FrameReport};
pub use associate::{Association, DEFAULT_VEHICLE_LABELS, IdentityAssociator, TrackId};
pub use config::AnalyzerConfig;
pub use counting_line::{CountingLine, LineCounter};
pub use error::{ConfigError, InputShapeError};
pub use geometry::{BoxRect, Centroid, Polygon, box_to_polygon, polygon_iou};
pub use history::{DetectionHistory, FrameRecord, NearestMatch, SENTINEL_ID};
pub use violation::{Overlap, ViolationClassifier, ViolationParams, ViolationRecord};
pub use zones::{CameraPose, Zone, ZoneIntervalSpec, ZoneSelection, ZoneTable, ZoneTableSpec};

#[cfg(feature = "python")]
use pyo3::{
    Bound, PyResult, pymodule,
    types::{PyModule, PyModuleMethods},
};

#[cfg(feature = "python")]
use crate::python_api::{PyBoxRect, PyDetection, PyFrameAnalyzer, PyFrameReport, PyViolation};

#[cfg(feature = "python")]
#[pymodule]
fn lot_guard(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyBoxRect>()?;
    m.add_class::<PyDetection>()?;
    m.add_class::<PyFrameAnalyzer>()?;
    m.add_class::<PyFrameReport>()?;
    m.add_class::<PyViolation>()?;

    Ok(())
}

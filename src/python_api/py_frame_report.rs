use pyo3::{pyclass, pymethods};

use crate::{FrameReport, python_api::PyBoxRect};

#[pyclass(name = "Violation")]
#[derive(Clone)]
pub struct PyViolation {
    pub bbox: PyBoxRect,
    #[pyo3(get)]
    pub zone_id: u32,
    #[pyo3(get)]
    pub iou: f64,
}

#[pymethods]
impl PyViolation {
    #[getter]
    fn bbox(&self) -> PyBoxRect {
        self.bbox.clone()
    }
}

#[pyclass(name = "FrameReport")]
pub struct PyFrameReport {
    #[pyo3(get)]
    pub frame_index: u64,
    #[pyo3(get)]
    pub pose: Option<(u32, u32)>,
    #[pyo3(get)]
    pub identities: Vec<((i32, i32), u32)>,
    #[pyo3(get)]
    pub new_identities: Vec<u32>,
    #[pyo3(get)]
    pub vehicle_count: u64,
    #[pyo3(get)]
    pub crossed_count: Option<usize>,
    pub violations: Vec<PyViolation>,
}

#[pymethods]
impl PyFrameReport {
    #[getter]
    fn violations(&self) -> Vec<PyViolation> {
        self.violations.clone()
    }
}

impl From<FrameReport> for PyFrameReport {
    fn from(report: FrameReport) -> Self {
        Self {
            frame_index: report.frame_index,
            pose: report.pose.map(|camera| (camera.pose, camera.angle)),
            identities: report
                .identities
                .iter()
                .map(|(centroid, identity)| ((centroid.x, centroid.y), *identity))
                .collect(),
            new_identities: report.new_identities,
            vehicle_count: report.vehicle_count,
            crossed_count: report.crossed_count,
            violations: report
                .violations
                .into_iter()
                .map(|violation| PyViolation {
                    bbox: PyBoxRect {
                        inner: violation.bbox,
                    },
                    zone_id: violation.zone_id,
                    iou: violation.iou,
                })
                .collect(),
        }
    }
}

use pyo3::{PyRef, PyResult, exceptions::PyValueError, pyclass, pymethods};

use crate::{
    AnalyzerConfig, Detection, FrameAnalyzer,
    python_api::{PyDetection, PyFrameReport},
};

#[pyclass(name = "FrameAnalyzer")]
pub struct PyFrameAnalyzer {
    inner: FrameAnalyzer,
}

#[pymethods]
impl PyFrameAnalyzer {
    /// Builds an analyzer from a JSON config file, or from the defaults.
    #[new]
    #[pyo3(signature = (config_path=None))]
    pub fn new(config_path: Option<&str>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => AnalyzerConfig::load_json(path),
            None => Ok(AnalyzerConfig::default()),
        };
        let inner = config
            .and_then(FrameAnalyzer::new)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;

        Ok(Self { inner })
    }

    #[getter]
    pub fn vehicle_count(&self) -> u64 {
        self.inner.vehicle_count()
    }

    pub fn process_frame(
        &mut self,
        frame_index: u64,
        detections: Vec<PyRef<PyDetection>>,
    ) -> PyFrameReport {
        let inner_detections = detections
            .iter()
            .map(|detection| detection.inner.clone())
            .collect::<Vec<Detection>>();

        self.inner
            .process_frame(frame_index, &inner_detections)
            .into()
    }
}

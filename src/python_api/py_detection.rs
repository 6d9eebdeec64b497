use pyo3::{pyclass, pymethods};

use crate::{Detection, python_api::PyBoxRect};

#[pyclass(name = "Detection")]
pub struct PyDetection {
    pub inner: Detection,
}

#[pymethods]
impl PyDetection {
    #[new]
    pub fn new(bbox: &PyBoxRect, label: String, confidence: f32) -> Self {
        Self {
            inner: Detection::new(bbox.inner, label, confidence),
        }
    }

    #[getter]
    fn bbox(&self) -> PyBoxRect {
        PyBoxRect {
            inner: self.inner.bbox,
        }
    }

    #[getter]
    fn label(&self) -> String {
        self.inner.label.clone()
    }

    #[getter]
    fn confidence(&self) -> f32 {
        self.inner.confidence
    }
}

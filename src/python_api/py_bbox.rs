use pyo3::{pyclass, pymethods};

use crate::BoxRect;

#[pyclass(name = "BoxRect")]
#[derive(Clone)]
pub struct PyBoxRect {
    pub inner: BoxRect,
}

#[pymethods]
impl PyBoxRect {
    #[new]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            inner: BoxRect::new(x, y, width, height),
        }
    }

    #[getter]
    fn x(&self) -> i32 {
        self.inner.x
    }

    #[getter]
    fn y(&self) -> i32 {
        self.inner.y
    }

    #[getter]
    fn width(&self) -> i32 {
        self.inner.width
    }

    #[getter]
    fn height(&self) -> i32 {
        self.inner.height
    }

    fn centroid(&self) -> (i32, i32) {
        let centroid = self.inner.centroid();
        (centroid.x, centroid.y)
    }

    fn __repr__(&self) -> String {
        format!(
            "BoxRect(x={}, y={}, width={}, height={})",
            self.x(),
            self.y(),
            self.width(),
            self.height()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}

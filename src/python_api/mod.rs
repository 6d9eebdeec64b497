mod py_bbox;
mod py_detection;
mod py_frame_analyzer;
mod py_frame_report;

pub use py_bbox::PyBoxRect;
pub use py_detection::PyDetection;
pub use py_frame_analyzer::PyFrameAnalyzer;
pub use py_frame_report::{PyFrameReport, PyViolation};

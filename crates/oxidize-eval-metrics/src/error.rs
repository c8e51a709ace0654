use thiserror::Error;

/// Errors raised by metric updates and configuration.
///
/// Count mismatches between labels and predictions are not errors; they are
/// reported through [`crate::EvalContext`] and the overlap is evaluated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Output count mismatch: {metrics} metrics for {labels} labels and {preds} predictions")]
    OutputCountMismatch {
        metrics: usize,
        labels: usize,
        preds: usize,
    },

    #[error("{metric} does not support prediction shape {shape:?}")]
    UnsupportedShape {
        metric: &'static str,
        shape: Vec<usize>,
    },

    #[error("Class count mismatch: configured for {expected} classes, got {got}")]
    ClassCountMismatch { expected: usize, got: usize },

    #[error("Class index {class} out of range for {nclasses} classes")]
    ClassOutOfRange { class: f64, nclasses: usize },

    #[error("Invalid metric configuration: {0}")]
    InvalidConfig(String),
}

impl MetricError {
    /// True for the errors caused by disagreeing label, prediction or output extents.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            MetricError::ShapeMismatch { .. }
                | MetricError::OutputCountMismatch { .. }
                | MetricError::ClassCountMismatch { .. }
        )
    }
}

pub type MetricResult<T> = Result<T, MetricError>;

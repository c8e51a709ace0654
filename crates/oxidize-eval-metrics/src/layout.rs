use oxidize_eval_core::{Float, Tensor};

use crate::error::{MetricError, MetricResult};

/// How a label/prediction pair is laid out, resolved once per pair.
///
/// Predictions are row-major with the sample axis last. Class-id labels are
/// read as `[samples]` for flat predictions and `[height, width, 1, samples]`
/// for spatial ones, whatever their declared rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Label and prediction share a shape; the label holds full distributions.
    Distribution { len: usize },
    /// `[height, width, classes, samples]` prediction, one class id per pixel.
    Spatial {
        height: usize,
        width: usize,
        classes: usize,
        samples: usize,
    },
    /// `[classes, samples]` prediction, one class id per sample.
    Flat { classes: usize, samples: usize },
}

impl Layout {
    /// Classify a pair. `distribution` enables the equal-shape branch.
    /// An empty class axis is unsupported.
    pub fn resolve<T: Float>(
        metric: &'static str,
        label: &Tensor<T>,
        pred: &Tensor<T>,
        distribution: bool,
    ) -> MetricResult<Layout> {
        if label.samples() != pred.samples() {
            return Err(MetricError::ShapeMismatch {
                expected: pred.shape_vec(),
                got: label.shape_vec(),
            });
        }
        if distribution && label.shape() == pred.shape() {
            return Ok(Layout::Distribution { len: pred.numel() });
        }

        let dims = pred.shape().dims();
        let layout = match *dims {
            [height, width, classes, samples] if classes > 0 => Layout::Spatial {
                height,
                width,
                classes,
                samples,
            },
            [classes, samples] if classes > 0 => Layout::Flat { classes, samples },
            _ => {
                return Err(MetricError::UnsupportedShape {
                    metric,
                    shape: pred.shape_vec(),
                })
            }
        };
        if label.numel() != layout.label_len() {
            return Err(MetricError::ShapeMismatch {
                expected: layout.label_shape(),
                got: label.shape_vec(),
            });
        }
        Ok(layout)
    }

    /// Number of label entries this layout reads.
    pub fn label_len(&self) -> usize {
        match *self {
            Layout::Distribution { len } => len,
            Layout::Spatial {
                height,
                width,
                samples,
                ..
            } => height * width * samples,
            Layout::Flat { samples, .. } => samples,
        }
    }

    fn label_shape(&self) -> Vec<usize> {
        match *self {
            Layout::Distribution { len } => vec![len],
            Layout::Spatial {
                height,
                width,
                samples,
                ..
            } => vec![height, width, 1, samples],
            Layout::Flat { samples, .. } => vec![samples],
        }
    }
}

/// Round a stored class id and check it against the class axis.
pub fn class_index<T: Float>(label: T, nclasses: usize) -> MetricResult<usize> {
    let v = label.to_f64().round();
    if v >= 0.0 && v < nclasses as f64 {
        Ok(v as usize)
    } else {
        Err(MetricError::ClassOutOfRange {
            class: label.to_f64(),
            nclasses,
        })
    }
}

/// Validate every class id in `labels` up front so hot loops can index freely.
pub fn check_classes<T: Float>(labels: &[T], nclasses: usize) -> MetricResult<()> {
    labels
        .iter()
        .try_for_each(|&l| class_index(l, nclasses).map(drop))
}

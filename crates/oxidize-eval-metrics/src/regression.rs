use oxidize_eval_core::{Float, Tensor};
use tracing::debug;

use crate::context::EvalContext;
use crate::error::{MetricError, MetricResult};
use crate::kernel::threaded_sum;
use crate::metric::{Metric, MetricValues};

fn require_same_shape<T: Float>(label: &Tensor<T>, pred: &Tensor<T>) -> MetricResult<()> {
    if label.shape() != pred.shape() {
        return Err(MetricError::ShapeMismatch {
            expected: pred.shape_vec(),
            got: label.shape_vec(),
        });
    }
    Ok(())
}

/// Same sample extent and element count; the ranks may differ, as with `[n]` against `[1, n]`.
fn require_same_extent<T: Float>(label: &Tensor<T>, pred: &Tensor<T>) -> MetricResult<()> {
    if label.samples() != pred.samples() || label.numel() != pred.numel() {
        return Err(MetricError::ShapeMismatch {
            expected: pred.shape_vec(),
            got: label.shape_vec(),
        });
    }
    Ok(())
}

/// Mean squared error per scalar element.
///
/// Squared residuals are summed in `f64` whatever the element type.
#[derive(Debug, Clone, Default)]
pub struct Mse {
    sum: f64,
    count: usize,
}

impl Mse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }
}

impl<T: Float> Metric<T> for Mse {
    fn update(
        &mut self,
        ctx: &mut EvalContext,
        labels: &[Tensor<T>],
        preds: &[Tensor<T>],
    ) -> MetricResult<()> {
        for (label, pred) in ctx.pairs(labels, preds) {
            require_same_shape(label, pred)?;
            let (l, p) = (label.data(), pred.data());
            self.sum += threaded_sum(l.len(), |i| {
                let d = l[i].to_f64() - p[i].to_f64();
                d * d
            });
            self.count += l.len();
            debug!(metric = "MSE", elements = l.len(), total = self.count, "update");
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }

    fn get(&self) -> MetricValues {
        vec![("MSE".to_string(), self.sum / self.count as f64)]
    }

    fn name(&self) -> &'static str {
        "MSE"
    }
}

/// Mean squared error normalized by the target, `((label - pred) / label)^2`.
///
/// A label of exactly zero marks batch padding and adds nothing to the sum,
/// but the count still grows by the full batch size. The count is the label
/// element count, which is the sample count for `[n]` and `[1, n]` targets;
/// wider targets count every element, like [`Mse`].
#[derive(Debug, Clone, Default)]
pub struct Nmse {
    sum: f64,
    count: usize,
}

impl Nmse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }
}

impl<T: Float> Metric<T> for Nmse {
    fn update(
        &mut self,
        ctx: &mut EvalContext,
        labels: &[Tensor<T>],
        preds: &[Tensor<T>],
    ) -> MetricResult<()> {
        for (label, pred) in ctx.pairs(labels, preds) {
            require_same_extent(label, pred)?;
            self.count += label.numel();
            let mut padded = 0usize;
            for (&l, &p) in label.data().iter().zip(pred.data()) {
                if l == T::ZERO {
                    padded += 1;
                    continue;
                }
                let r = (l.to_f64() - p.to_f64()) / l.to_f64();
                self.sum += r * r;
            }
            debug!(metric = "NMSE", elements = label.numel(), padded, total = self.count, "update");
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }

    fn get(&self) -> MetricValues {
        vec![("NMSE".to_string(), self.sum / self.count as f64)]
    }

    fn name(&self) -> &'static str {
        "NMSE"
    }
}

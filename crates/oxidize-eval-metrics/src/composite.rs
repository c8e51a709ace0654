use std::slice;

use oxidize_eval_core::{Float, Tensor};

use crate::context::EvalContext;
use crate::error::{MetricError, MetricResult};
use crate::metric::{Metric, MetricValues};

/// Applies every wrapped metric to every output.
///
/// `get` concatenates the sub-metric results in order; repeated names are kept.
pub struct MultiMetric<T: Float> {
    metrics: Vec<Box<dyn Metric<T>>>,
}

impl<T: Float> MultiMetric<T> {
    pub fn new(metrics: Vec<Box<dyn Metric<T>>>) -> Self {
        MultiMetric { metrics }
    }

    pub fn push(&mut self, metric: Box<dyn Metric<T>>) {
        self.metrics.push(metric);
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl<T: Float> Metric<T> for MultiMetric<T> {
    /// Stops at the first failing sub-metric. Metrics before it have already
    /// folded in the batch and the rest have not, so `reset` before reusing
    /// the results of a failed update.
    fn update(
        &mut self,
        ctx: &mut EvalContext,
        labels: &[Tensor<T>],
        preds: &[Tensor<T>],
    ) -> MetricResult<()> {
        for metric in &mut self.metrics {
            metric.update(ctx, labels, preds)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.metrics.iter_mut().for_each(|m| m.reset());
    }

    fn get(&self) -> MetricValues {
        self.metrics.iter().flat_map(|m| m.get()).collect()
    }

    fn name(&self) -> &'static str {
        "multi"
    }
}

/// Routes the i-th output to the i-th wrapped metric only.
///
/// The number of metrics, labels and predictions must agree on every update.
/// A sub-metric failing mid-update leaves earlier outputs accumulated, as in
/// [`MultiMetric`].
/// Use [`crate::NullMetric`] to leave an output unevaluated.
pub struct SeqMetric<T: Float> {
    metrics: Vec<Box<dyn Metric<T>>>,
}

impl<T: Float> SeqMetric<T> {
    pub fn new(metrics: Vec<Box<dyn Metric<T>>>) -> Self {
        SeqMetric { metrics }
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl<T: Float> Metric<T> for SeqMetric<T> {
    fn update(
        &mut self,
        ctx: &mut EvalContext,
        labels: &[Tensor<T>],
        preds: &[Tensor<T>],
    ) -> MetricResult<()> {
        if labels.len() != self.metrics.len() || preds.len() != self.metrics.len() {
            return Err(MetricError::OutputCountMismatch {
                metrics: self.metrics.len(),
                labels: labels.len(),
                preds: preds.len(),
            });
        }
        for ((metric, label), pred) in self.metrics.iter_mut().zip(labels).zip(preds) {
            metric.update(ctx, slice::from_ref(label), slice::from_ref(pred))?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.metrics.iter_mut().for_each(|m| m.reset());
    }

    fn get(&self) -> MetricValues {
        self.metrics.iter().flat_map(|m| m.get()).collect()
    }

    fn name(&self) -> &'static str {
        "seq"
    }
}

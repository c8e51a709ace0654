use oxidize_eval_core::{Float, Tensor};

use crate::context::EvalContext;
use crate::error::MetricResult;

/// Named values reported by [`Metric::get`], in a stable order.
pub type MetricValues = Vec<(String, f64)>;

/// Streaming accumulator over batches of label/prediction pairs.
///
/// `labels[i]` is paired with `preds[i]`, one pair per model output.
/// `get` divides by the accumulated count without guarding it: a metric that
/// has seen no samples reports NaN.
pub trait Metric<T: Float> {
    /// Fold one batch into the running state.
    fn update(
        &mut self,
        ctx: &mut EvalContext,
        labels: &[Tensor<T>],
        preds: &[Tensor<T>],
    ) -> MetricResult<()>;

    /// Zero every accumulator, keeping configuration.
    fn reset(&mut self);

    /// Current aggregates.
    fn get(&self) -> MetricValues;

    /// Short identifier of the metric kind.
    fn name(&self) -> &'static str;
}

/// Find a value by name in a [`MetricValues`] list.
pub fn lookup(values: &[(String, f64)], name: &str) -> Option<f64> {
    values.iter().find(|(n, _)| n == name).map(|&(_, v)| v)
}

/// Placeholder that evaluates nothing, keeping positions aligned in a [`crate::SeqMetric`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullMetric;

impl<T: Float> Metric<T> for NullMetric {
    fn update(
        &mut self,
        _ctx: &mut EvalContext,
        _labels: &[Tensor<T>],
        _preds: &[Tensor<T>],
    ) -> MetricResult<()> {
        Ok(())
    }

    fn reset(&mut self) {}

    fn get(&self) -> MetricValues {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_metric_reports_nothing() {
        let mut m = NullMetric;
        let mut ctx = EvalContext::new();
        let t = vec![Tensor::from_slice(&[1.0_f64, 2.0])];
        Metric::<f64>::update(&mut m, &mut ctx, &t, &t).unwrap();
        Metric::<f64>::reset(&mut m);
        assert!(Metric::<f64>::get(&m).is_empty());
    }

    #[test]
    fn test_null_metric_ignores_count_mismatch() {
        let mut m = NullMetric;
        let mut ctx = EvalContext::new();
        let t = vec![Tensor::from_slice(&[1.0_f32])];
        Metric::<f32>::update(&mut m, &mut ctx, &t, &[]).unwrap();
        assert!(!ctx.has_warned());
    }

    #[test]
    fn test_lookup() {
        let values = vec![("MSE".to_string(), 0.5), ("ACE".to_string(), 1.5)];
        assert_eq!(lookup(&values, "ACE"), Some(1.5));
        assert_eq!(lookup(&values, "accuracy"), None);
    }
}

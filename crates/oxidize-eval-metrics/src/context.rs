use oxidize_eval_core::{Float, Tensor};
use tracing::warn;

/// Per-session evaluation state owned by the caller.
///
/// Holds the warn-once flag for label/prediction count mismatches so that
/// repeated mismatches across batches log a single warning.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    warned: bool,
    count_mismatches: usize,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip labels with predictions, warning once if their counts differ.
    pub fn pairs<'a, T: Float>(
        &mut self,
        labels: &'a [Tensor<T>],
        preds: &'a [Tensor<T>],
    ) -> impl Iterator<Item = (&'a Tensor<T>, &'a Tensor<T>)> + 'a {
        if labels.len() != preds.len() {
            self.count_mismatches += 1;
            if !self.warned {
                self.warned = true;
                warn!(
                    labels = labels.len(),
                    preds = preds.len(),
                    "label and prediction counts differ; evaluating the overlap only"
                );
            }
        }
        labels.iter().zip(preds.iter())
    }

    /// Number of leaf updates that saw differing label/prediction counts.
    pub fn count_mismatches(&self) -> usize {
        self.count_mismatches
    }

    pub fn has_warned(&self) -> bool {
        self.warned
    }

    /// Allow the count-mismatch warning to fire again.
    pub fn rearm_warnings(&mut self) {
        self.warned = false;
    }
}

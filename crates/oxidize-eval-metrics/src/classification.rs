use oxidize_eval_core::{Float, Tensor};
use tracing::debug;

use crate::context::EvalContext;
use crate::error::{MetricError, MetricResult};
use crate::layout::Layout;
use crate::metric::{Metric, MetricValues};

/// Running classification accuracy.
///
/// The predicted class is the argmax over the class axis. Flat predictions
/// count one sample per column; spatial predictions count every pixel.
#[derive(Debug, Clone, Default)]
pub struct Accuracy {
    correct: f64,
    samples: usize,
}

impl Accuracy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_count(&self) -> usize {
        self.samples
    }

    fn accumulate<T: Float>(&mut self, label: &Tensor<T>, pred: &Tensor<T>) -> MetricResult<()> {
        let layout = Layout::resolve("accuracy", label, pred, false)?;
        let (l, p) = (label.data(), pred.data());
        match layout {
            Layout::Flat { classes, samples } => {
                for s in 0..samples {
                    let best = argmax_strided(p, s, samples, classes);
                    if is_class(l[s], best) {
                        self.correct += 1.0;
                    }
                }
                self.samples += samples;
            }
            Layout::Spatial {
                height,
                width,
                classes,
                samples,
            } => {
                for px in 0..height * width {
                    for s in 0..samples {
                        let best = argmax_strided(p, px * classes * samples + s, samples, classes);
                        if is_class(l[px * samples + s], best) {
                            self.correct += 1.0;
                        }
                    }
                }
                self.samples += height * width * samples;
            }
            Layout::Distribution { .. } => {
                return Err(MetricError::UnsupportedShape {
                    metric: "accuracy",
                    shape: pred.shape_vec(),
                })
            }
        }
        debug!(metric = "accuracy", ?layout, total = self.samples, "update");
        Ok(())
    }
}

/// Index of the first maximum among `len` values spaced `stride` apart.
fn argmax_strided<T: Float>(data: &[T], offset: usize, stride: usize, len: usize) -> usize {
    let mut best = 0;
    let mut best_val = data[offset];
    for c in 1..len {
        let v = data[offset + c * stride];
        if v > best_val {
            best = c;
            best_val = v;
        }
    }
    best
}

fn is_class<T: Float>(label: T, class: usize) -> bool {
    label.to_f64().round() == class as f64
}

impl<T: Float> Metric<T> for Accuracy {
    fn update(
        &mut self,
        ctx: &mut EvalContext,
        labels: &[Tensor<T>],
        preds: &[Tensor<T>],
    ) -> MetricResult<()> {
        for (label, pred) in ctx.pairs(labels, preds) {
            self.accumulate(label, pred)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.correct = 0.0;
        self.samples = 0;
    }

    fn get(&self) -> MetricValues {
        vec![("accuracy".to_string(), self.correct / self.samples as f64)]
    }

    fn name(&self) -> &'static str {
        "accuracy"
    }
}

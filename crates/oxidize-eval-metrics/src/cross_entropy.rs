use oxidize_eval_core::{Float, Tensor};
use tracing::debug;

use crate::context::EvalContext;
use crate::error::{MetricError, MetricResult};
use crate::kernel::threaded_sum;
use crate::layout::{check_classes, Layout};
use crate::metric::{Metric, MetricValues};

/// Default log stabilizer added to every predicted probability.
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Class id stored at an already validated label entry.
#[inline]
fn target<T: Float>(label: T) -> usize {
    label.to_f64().round() as usize
}

/// Averaged cross-entropy.
///
/// Accepts full target distributions (label shaped like the prediction),
/// spatial `[H, W, C, N]` softmax maps with per-pixel class ids, and flat
/// `[C, N]` predictions with per-sample class ids. The running sum holds
/// log-likelihoods, so the reported value is its negated mean.
#[derive(Debug, Clone)]
pub struct Ace {
    sum: f64,
    count: usize,
    epsilon: f64,
}

impl Default for Ace {
    fn default() -> Self {
        Self::new()
    }
}

impl Ace {
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    pub fn with_epsilon(epsilon: f64) -> Self {
        Ace {
            sum: 0.0,
            count: 0,
            epsilon,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }

    fn accumulate<T: Float>(&mut self, label: &Tensor<T>, pred: &Tensor<T>) -> MetricResult<()> {
        let layout = Layout::resolve("ACE", label, pred, true)?;
        let eps = T::from_f64(self.epsilon);
        let (l, p) = (label.data(), pred.data());
        match layout {
            Layout::Distribution { len } => {
                self.sum += threaded_sum(len, |i| (l[i] * (p[i] + eps).ln()).to_f64());
                self.count += len;
            }
            Layout::Spatial {
                height,
                width,
                classes,
                samples,
            } => {
                check_classes(l, classes)?;
                let pixels = height * width;
                for s in 0..samples {
                    self.sum += threaded_sum(pixels, |px| {
                        let c = target(l[px * samples + s]);
                        (p[(px * classes + c) * samples + s] + eps).ln().to_f64()
                    });
                    self.count += pixels;
                }
            }
            Layout::Flat { classes, samples } => {
                check_classes(l, classes)?;
                for s in 0..samples {
                    let c = target(l[s]);
                    self.sum += (p[c * samples + s] + eps).ln().to_f64();
                    self.count += 1;
                }
            }
        }
        debug!(metric = "ACE", ?layout, total = self.count, "update");
        Ok(())
    }
}

impl<T: Float> Metric<T> for Ace {
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
        self.sum = 0.0;
        self.count = 0;
    }

    fn get(&self) -> MetricValues {
        vec![("ACE".to_string(), -self.sum / self.count as f64)]
    }

    fn name(&self) -> &'static str {
        "ACE"
    }
}

/// Averaged cross-entropy kept separately for every class.
///
/// The class axis is second to last and must have `nclasses` entries.
/// With full target distributions each class bucket counts every element it
/// sums; with class-id labels only the target class bucket is touched, once
/// per sample (or pixel).
#[derive(Debug, Clone)]
pub struct MultiAce {
    sums: Vec<f64>,
    counts: Vec<usize>,
    epsilon: f64,
}

impl MultiAce {
    pub fn new(nclasses: usize) -> Self {
        Self::with_epsilon(nclasses, DEFAULT_EPSILON)
    }

    pub fn with_epsilon(nclasses: usize, epsilon: f64) -> Self {
        MultiAce {
            sums: vec![0.0; nclasses],
            counts: vec![0; nclasses],
            epsilon,
        }
    }

    pub fn nclasses(&self) -> usize {
        self.sums.len()
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn class_counts(&self) -> &[usize] {
        &self.counts
    }

    fn check_class_axis(&self, classes: usize) -> MetricResult<()> {
        if classes != self.nclasses() {
            return Err(MetricError::ClassCountMismatch {
                expected: self.nclasses(),
                got: classes,
            });
        }
        Ok(())
    }

    fn accumulate<T: Float>(&mut self, label: &Tensor<T>, pred: &Tensor<T>) -> MetricResult<()> {
        let layout = Layout::resolve("MultiACE", label, pred, true)?;
        let eps = T::from_f64(self.epsilon);
        let (l, p) = (label.data(), pred.data());
        match layout {
            Layout::Distribution { len } => {
                let dims = pred.shape().dims();
                if dims.len() < 2 {
                    return Err(MetricError::UnsupportedShape {
                        metric: "MultiACE",
                        shape: pred.shape_vec(),
                    });
                }
                let classes = dims[dims.len() - 2];
                self.check_class_axis(classes)?;
                let samples = pred.samples();
                let per_class = if classes == 0 { 0 } else { len / classes };
                for k in 0..classes {
                    self.sums[k] += threaded_sum(per_class, |i| {
                        let idx = ((i / samples) * classes + k) * samples + i % samples;
                        (l[idx] * (p[idx] + eps).ln()).to_f64()
                    });
                    self.counts[k] += per_class;
                }
            }
            Layout::Spatial {
                height,
                width,
                classes,
                samples,
            } => {
                self.check_class_axis(classes)?;
                check_classes(l, classes)?;
                for px in 0..height * width {
                    for s in 0..samples {
                        let c = target(l[px * samples + s]);
                        self.sums[c] += (p[(px * classes + c) * samples + s] + eps).ln().to_f64();
                        self.counts[c] += 1;
                    }
                }
            }
            Layout::Flat { classes, samples } => {
                self.check_class_axis(classes)?;
                check_classes(l, classes)?;
                for s in 0..samples {
                    let c = target(l[s]);
                    self.sums[c] += (p[c * samples + s] + eps).ln().to_f64();
                    self.counts[c] += 1;
                }
            }
        }
        debug!(metric = "MultiACE", ?layout, counts = ?self.counts, "update");
        Ok(())
    }
}

impl<T: Float> Metric<T> for MultiAce {
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
        self.sums.iter_mut().for_each(|s| *s = 0.0);
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    fn get(&self) -> MetricValues {
        let mut values: MetricValues = self
            .sums
            .iter()
            .zip(&self.counts)
            .enumerate()
            .map(|(k, (&sum, &count))| (format!("ACE_{}", k + 1), -sum / count as f64))
            .collect();
        let total: f64 = self.sums.iter().sum();
        let count: usize = self.counts.iter().sum();
        values.push(("ACE".to_string(), -total / count as f64));
        values
    }

    fn name(&self) -> &'static str {
        "MultiACE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::lookup;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn ace_of<M: Metric<f64>>(m: &M) -> f64 {
        lookup(&m.get(), "ACE").unwrap()
    }

    /// Random class ids and column-normalized scores for a flat `[classes, samples]` batch.
    fn flat_batch(classes: usize, samples: usize, seed: u64) -> (Tensor<f64>, Tensor<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let labels: Vec<f64> = (0..samples).map(|_| rng.gen_range(0..classes) as f64).collect();
        let raw: Tensor<f64> = Tensor::rand(vec![classes, samples], Some(seed));
        let mut data = raw.into_data();
        for s in 0..samples {
            let total: f64 = (0..classes).map(|c| data[c * samples + s]).sum();
            for c in 0..classes {
                data[c * samples + s] /= total;
            }
        }
        (
            Tensor::from_slice(&labels),
            Tensor::new(data, vec![classes, samples]).unwrap(),
        )
    }

    #[test]
    fn test_flat_single_sample() {
        let mut m = Ace::new();
        let mut ctx = EvalContext::new();
        let labels = vec![Tensor::from_slice(&[0.0])];
        let preds = vec![Tensor::new(vec![0.9, 0.1], vec![2, 1]).unwrap()];
        m.update(&mut ctx, &labels, &preds).unwrap();
        assert_relative_eq!(ace_of(&m), -(0.9_f64 + 1e-8).ln(), max_relative = 1e-12);
        assert_abs_diff_eq!(ace_of(&m), 0.10536, epsilon = 1e-5);
    }

    #[test]
    fn test_distribution_branch() {
        let mut m = Ace::new();
        let mut ctx = EvalContext::new();
        let label = Tensor::new(vec![1.0, 0.0, 0.0, 1.0], vec![2, 2]).unwrap();
        let pred = Tensor::new(vec![0.5, 0.2, 0.5, 0.8], vec![2, 2]).unwrap();
        m.update(&mut ctx, &[label], &[pred]).unwrap();
        assert_eq!(m.sample_count(), 4);
        let expected = -((0.5_f64 + 1e-8).ln() + (0.8_f64 + 1e-8).ln()) / 4.0;
        assert_relative_eq!(ace_of(&m), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_spatial_branch() {
        // [1, 2, 2, 1]: pixel 0 scores (0.7, 0.3), pixel 1 scores (0.4, 0.6)
        let pred = Tensor::new(vec![0.7, 0.3, 0.4, 0.6], vec![1, 2, 2, 1]).unwrap();
        let label = Tensor::new(vec![0.0, 1.0], vec![1, 2, 1]).unwrap();
        let mut m = Ace::new();
        let mut ctx = EvalContext::new();
        m.update(&mut ctx, &[label], &[pred]).unwrap();
        assert_eq!(m.sample_count(), 2);
        let expected = -((0.7_f64 + 1e-8).ln() + (0.6_f64 + 1e-8).ln()) / 2.0;
        assert_relative_eq!(ace_of(&m), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_epsilon_guards_zero_probability() {
        let mut m = Ace::with_epsilon(1e-3);
        let mut ctx = EvalContext::new();
        let preds = vec![Tensor::new(vec![0.0, 1.0], vec![2, 1]).unwrap()];
        m.update(&mut ctx, &[Tensor::from_slice(&[0.0])], &preds).unwrap();
        assert!(ace_of(&m).is_finite());
        assert_relative_eq!(ace_of(&m), -(1e-3_f64).ln(), max_relative = 1e-12);
    }

    #[test]
    fn test_epsilon_cast_to_element_type() {
        let mut m = Ace::new();
        let mut ctx = EvalContext::new();
        let preds = vec![Tensor::new(vec![0.25_f32, 0.75], vec![2, 1]).unwrap()];
        m.update(&mut ctx, &[Tensor::from_slice(&[1.0_f32])], &preds).unwrap();
        let expected = -((0.75_f32 + 1e-8_f32).ln() as f64);
        assert_relative_eq!(lookup(&Metric::<f32>::get(&m), "ACE").unwrap(), expected);
    }

    #[test]
    fn test_unsupported_rank_and_bad_class() {
        let mut m = Ace::new();
        let mut ctx = EvalContext::new();
        let label = Tensor::from_slice(&[0.0, 1.0]);
        let pred: Tensor<f64> = Tensor::zeros(vec![2, 2, 2]);
        assert!(matches!(
            m.update(&mut ctx, &[label], &[pred]),
            Err(MetricError::UnsupportedShape { metric: "ACE", .. })
        ));

        let label = Tensor::from_slice(&[2.0]);
        let pred: Tensor<f64> = Tensor::zeros(vec![2, 1]);
        assert!(matches!(
            m.update(&mut ctx, &[label], &[pred]),
            Err(MetricError::ClassOutOfRange { nclasses: 2, .. })
        ));
    }

    #[test]
    fn test_split_batch_matches_whole() {
        let (labels, preds) = flat_batch(4, 30, 5);
        let mut ctx = EvalContext::new();
        let mut whole = Ace::new();
        whole.update(&mut ctx, &[labels.clone()], &[preds.clone()]).unwrap();

        let mut split = Ace::new();
        for (a, b) in [(0, 13), (13, 30)] {
            let l = labels.slice_samples(a, b).unwrap();
            let p = preds.slice_samples(a, b).unwrap();
            split.update(&mut ctx, &[l], &[p]).unwrap();
        }
        assert_relative_eq!(ace_of(&whole), ace_of(&split), max_relative = 1e-12);
    }

    #[test]
    fn test_reset_matches_fresh() {
        let (labels, preds) = flat_batch(3, 5, 1);
        let mut ctx = EvalContext::new();
        let mut m = Ace::new();
        m.update(&mut ctx, &[labels.clone()], &[preds.clone()]).unwrap();
        Metric::<f64>::reset(&mut m);
        assert_eq!(m.sample_count(), 0);
        assert!(ace_of(&m).is_nan());

        let mut multi = MultiAce::new(3);
        multi.update(&mut ctx, &[labels], &[preds]).unwrap();
        Metric::<f64>::reset(&mut multi);
        assert_eq!(multi.class_counts(), &[0, 0, 0]);
        let fresh = Metric::<f64>::get(&MultiAce::new(3));
        let after = Metric::<f64>::get(&multi);
        assert_eq!(fresh.len(), after.len());
        for ((fa, fv), (aa, av)) in fresh.iter().zip(&after) {
            assert_eq!(fa, aa);
            assert!(fv.is_nan() && av.is_nan());
        }
    }

    #[test]
    fn test_multi_ace_names_and_buckets() {
        let mut m = MultiAce::new(2);
        let mut ctx = EvalContext::new();
        let labels = vec![Tensor::from_slice(&[0.0, 1.0, 1.0])];
        let preds = vec![Tensor::from_vec2d(&[vec![0.9, 0.5, 0.2], vec![0.1, 0.5, 0.8]]).unwrap()];
        m.update(&mut ctx, &labels, &preds).unwrap();
        let values = Metric::<f64>::get(&m);
        let names: Vec<&str> = values.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["ACE_1", "ACE_2", "ACE"]);
        assert_eq!(m.class_counts(), &[1, 2]);
        assert_relative_eq!(values[0].1, -(0.9_f64 + 1e-8).ln(), max_relative = 1e-12);
        let class2 = -((0.5_f64 + 1e-8).ln() + (0.8_f64 + 1e-8).ln()) / 2.0;
        assert_relative_eq!(values[1].1, class2, max_relative = 1e-12);
    }

    #[test]
    fn test_multi_ace_aggregate_matches_ace() {
        let mut ctx = EvalContext::new();
        let mut ace = Ace::new();
        let mut multi = MultiAce::new(5);
        for seed in 0..3 {
            let (labels, preds) = flat_batch(5, 17, seed);
            ace.update(&mut ctx, &[labels.clone()], &[preds.clone()]).unwrap();
            multi.update(&mut ctx, &[labels], &[preds]).unwrap();
        }
        assert_relative_eq!(ace_of(&multi), ace_of(&ace), max_relative = 1e-12);
        assert_eq!(multi.class_counts().iter().sum::<usize>(), ace.sample_count());
    }

    #[test]
    fn test_multi_ace_spatial_matches_ace() {
        let pred: Tensor<f64> = Tensor::rand(vec![3, 2, 4, 2], Some(9));
        let label_data: Vec<f64> = (0..12).map(|i| (i % 4) as f64).collect();
        let label = Tensor::new(label_data, vec![3, 2, 2]).unwrap();
        let mut ctx = EvalContext::new();
        let mut ace = Ace::new();
        let mut multi = MultiAce::new(4);
        ace.update(&mut ctx, &[label.clone()], &[pred.clone()]).unwrap();
        multi.update(&mut ctx, &[label], &[pred]).unwrap();
        assert_eq!(multi.class_counts(), &[3, 3, 3, 3]);
        assert_relative_eq!(ace_of(&multi), ace_of(&ace), max_relative = 1e-12);
    }

    #[test]
    fn test_multi_ace_distribution_counts_elements() {
        // [2 classes, 3 samples]
        let label = Tensor::from_vec2d(&[vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 0.0]]).unwrap();
        let pred = Tensor::from_vec2d(&[vec![0.6, 0.3, 0.9], vec![0.4, 0.7, 0.1]]).unwrap();
        let mut m = MultiAce::new(2);
        let mut ctx = EvalContext::new();
        m.update(&mut ctx, &[label], &[pred]).unwrap();
        assert_eq!(m.class_counts(), &[3, 3]);
        let values = Metric::<f64>::get(&m);
        let class1 = -((0.6_f64 + 1e-8).ln() + (0.9_f64 + 1e-8).ln()) / 3.0;
        let class2 = -(0.7_f64 + 1e-8).ln() / 3.0;
        assert_relative_eq!(values[0].1, class1, max_relative = 1e-12);
        assert_relative_eq!(values[1].1, class2, max_relative = 1e-12);
    }

    #[test]
    fn test_multi_ace_class_count_mismatch() {
        let mut m = MultiAce::new(3);
        let mut ctx = EvalContext::new();
        let labels = vec![Tensor::from_slice(&[0.0])];
        let preds = vec![Tensor::new(vec![0.9, 0.1], vec![2, 1]).unwrap()];
        let err = m.update(&mut ctx, &labels, &preds).unwrap_err();
        assert_eq!(err, MetricError::ClassCountMismatch { expected: 3, got: 2 });
        assert!(err.is_shape_mismatch());
    }
}

//! # OxidizeEval
//!
//! Streaming evaluation metrics for neural-network training loops.
//!
//! ## Modules
//!
//! - **core** — Host arrays handed over by the tensor runtime: `Tensor`, `Shape`, `Float`
//! - **metrics** — Accumulators: accuracy, MSE, NMSE, averaged cross-entropy (global and
//!   per class), plus `MultiMetric`/`SeqMetric` composition and JSON configuration
//!
//! ```
//! use oxidize_eval::prelude::*;
//!
//! let mut ctx = EvalContext::new();
//! let mut metric = Mse::new();
//! let labels = vec![Tensor::from_slice(&[1.0, 2.0, 3.0])];
//! let preds = vec![Tensor::from_slice(&[1.0, 2.0, 4.0])];
//! metric.update(&mut ctx, &labels, &preds).unwrap();
//! let mse = lookup(&Metric::<f64>::get(&metric), "MSE").unwrap();
//! assert!((mse - 1.0 / 3.0).abs() < 1e-12);
//! ```

/// Host arrays and element types.
pub use oxidize_eval_core as core;

/// Streaming metrics.
pub use oxidize_eval_metrics as metrics;

pub mod prelude {
    pub use oxidize_eval_core::{Float, Shape, Tensor};
    pub use oxidize_eval_metrics::{
        lookup, Accuracy, Ace, EvalContext, Metric, MetricConfig, MetricError, MetricResult,
        MetricValues, Mse, MultiAce, MultiMetric, Nmse, NullMetric, SeqMetric,
    };
}

//! Streaming metric accumulators for training and validation loops.
//!
//! Every metric consumes batches of label/prediction pairs through
//! [`Metric::update`], keeps running sums, and reports the current
//! aggregate through [`Metric::get`] without re-scanning earlier batches.

pub mod classification;
pub mod composite;
pub mod config;
pub mod context;
pub mod cross_entropy;
pub mod error;
pub mod kernel;
pub mod layout;
pub mod metric;
pub mod regression;

pub use classification::Accuracy;
pub use composite::{MultiMetric, SeqMetric};
pub use config::MetricConfig;
pub use context::EvalContext;
pub use cross_entropy::{Ace, MultiAce, DEFAULT_EPSILON};
pub use error::{MetricError, MetricResult};
pub use layout::Layout;
pub use metric::{lookup, Metric, MetricValues, NullMetric};
pub use regression::{Mse, Nmse};

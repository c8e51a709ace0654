use oxidize_eval_core::Float;
use serde::{Deserialize, Serialize};

use crate::classification::Accuracy;
use crate::composite::{MultiMetric, SeqMetric};
use crate::cross_entropy::{Ace, MultiAce, DEFAULT_EPSILON};
use crate::error::{MetricError, MetricResult};
use crate::metric::{Metric, NullMetric};
use crate::regression::{Mse, Nmse};

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

/// Serializable description of a metric tree.
///
/// ```json
/// {"type": "seq", "metrics": [{"type": "accuracy"}, {"type": "multi_ace", "nclasses": 3}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricConfig {
    Null,
    Accuracy,
    Mse,
    Nmse,
    Ace {
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
    MultiAce {
        nclasses: usize,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
    Multi { metrics: Vec<MetricConfig> },
    Seq { metrics: Vec<MetricConfig> },
}

impl MetricConfig {
    pub fn from_json(json: &str) -> MetricResult<Self> {
        serde_json::from_str(json).map_err(|e| MetricError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> MetricResult<String> {
        serde_json::to_string(self).map_err(|e| MetricError::InvalidConfig(e.to_string()))
    }

    /// Instantiate the described metric with zeroed accumulators.
    pub fn build<T: Float>(&self) -> MetricResult<Box<dyn Metric<T>>> {
        let metric: Box<dyn Metric<T>> = match self {
            MetricConfig::Null => Box::new(NullMetric),
            MetricConfig::Accuracy => Box::new(Accuracy::new()),
            MetricConfig::Mse => Box::new(Mse::new()),
            MetricConfig::Nmse => Box::new(Nmse::new()),
            MetricConfig::Ace { epsilon } => Box::new(Ace::with_epsilon(check_epsilon(*epsilon)?)),
            MetricConfig::MultiAce { nclasses, epsilon } => {
                if *nclasses == 0 {
                    return Err(MetricError::InvalidConfig(
                        "multi_ace requires nclasses > 0".to_string(),
                    ));
                }
                Box::new(MultiAce::with_epsilon(*nclasses, check_epsilon(*epsilon)?))
            }
            MetricConfig::Multi { metrics } => Box::new(MultiMetric::new(build_all::<T>(metrics)?)),
            MetricConfig::Seq { metrics } => Box::new(SeqMetric::new(build_all::<T>(metrics)?)),
        };
        Ok(metric)
    }
}

fn check_epsilon(epsilon: f64) -> MetricResult<f64> {
    if epsilon.is_finite() && epsilon >= 0.0 {
        Ok(epsilon)
    } else {
        Err(MetricError::InvalidConfig(format!(
            "epsilon must be finite and non-negative, got {epsilon}"
        )))
    }
}

fn build_all<T: Float>(configs: &[MetricConfig]) -> MetricResult<Vec<Box<dyn Metric<T>>>> {
    configs.iter().map(|c| c.build::<T>()).collect()
}

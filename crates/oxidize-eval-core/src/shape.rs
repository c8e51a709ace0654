use serde::{Deserialize, Serialize};

/// Dimensions of a dense array. The last axis is the sample axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Extent of the trailing (sample) axis; 1 for a scalar.
    pub fn samples(&self) -> usize {
        self.dims.last().copied().unwrap_or(1)
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        if self.dims.is_empty() {
            1
        } else {
            self.dims.iter().product()
        }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.dims.clone()
    }

    /// Same dimensions with the sample axis replaced by `samples`.
    pub fn with_samples(&self, samples: usize) -> Shape {
        let mut dims = self.dims.clone();
        match dims.last_mut() {
            Some(last) => *last = samples,
            None => dims.push(samples),
        }
        Shape::new(dims)
    }
}

use crate::dtype::Float;
use crate::error::{TensorError, TensorResult};
use crate::shape::Shape;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Dense host-addressable array handed to the metrics.
///
/// Stores data in a flat contiguous `Vec<T>` with row-major (C-order) layout.
/// The last axis indexes samples, so a batch of class scores is `[classes, samples]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Tensor<T: Float> {
    data: Vec<T>,
    shape: Shape,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Float> Tensor<T> {
    /// Create a tensor from raw data and shape.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> TensorResult<Self> {
        let s = Shape::new(shape);
        if data.len() != s.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: s.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Tensor { data, shape: s })
    }

    /// Create a tensor filled with zeros.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let s = Shape::new(shape);
        Tensor {
            data: vec![T::ZERO; s.numel()],
            shape: s,
        }
    }

    /// Create a 1-D tensor from a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Tensor {
            data: data.to_vec(),
            shape: Shape::new(vec![data.len()]),
        }
    }

    /// Create a 2-D tensor from rows of equal length.
    pub fn from_vec2d(rows: &[Vec<T>]) -> TensorResult<Self> {
        let nrows = rows.len();
        if nrows == 0 {
            return Err(TensorError::EmptyTensor);
        }
        let ncols = rows[0].len();
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(TensorError::DimensionMismatch(format!(
                    "All rows must have the same length: expected {}, got {}",
                    ncols,
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Tensor::new(data, vec![nrows, ncols])
    }

    /// Random tensor with uniform distribution in [0, 1).
    pub fn rand(shape: Vec<usize>, seed: Option<u64>) -> Self {
        let s = Shape::new(shape);
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let data: Vec<T> = (0..s.numel())
            .map(|_| T::from_f64(rand::Rng::gen::<f64>(&mut rng)))
            .collect();
        Tensor { data, shape: s }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_vec(&self) -> Vec<usize> {
        self.shape.to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Extent of the trailing (sample) axis.
    pub fn samples(&self) -> usize {
        self.shape.samples()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    // ─── Shape Manipulation ─────────────────────────────────────────────────

    /// Keep samples `start..end` along the trailing axis.
    pub fn slice_samples(&self, start: usize, end: usize) -> TensorResult<Tensor<T>> {
        let n = self.samples();
        if start > end || end > n {
            return Err(TensorError::IndexOutOfBounds {
                index: end,
                axis: self.ndim().saturating_sub(1),
                size: n,
            });
        }
        let outer = if n == 0 { 0 } else { self.numel() / n };
        let mut data = Vec::with_capacity(outer * (end - start));
        for o in 0..outer {
            data.extend_from_slice(&self.data[o * n + start..o * n + end]);
        }
        Ok(Tensor {
            data,
            shape: self.shape.with_samples(end - start),
        })
    }

    /// Join tensors along the trailing (sample) axis.
    pub fn concat_samples(tensors: &[&Tensor<T>]) -> TensorResult<Tensor<T>> {
        let first = tensors.first().ok_or(TensorError::EmptyTensor)?;
        let lead = &first.shape.dims()[..first.ndim().saturating_sub(1)];
        for t in tensors {
            if t.ndim() != first.ndim() || &t.shape.dims()[..t.ndim().saturating_sub(1)] != lead {
                return Err(TensorError::ShapeMismatch {
                    expected: first.shape_vec(),
                    got: t.shape_vec(),
                });
            }
        }
        let total: usize = tensors.iter().map(|t| t.samples()).sum();
        let outer: usize = lead.iter().product();
        let mut data = Vec::with_capacity(outer * total);
        for o in 0..outer {
            for t in tensors {
                let n = t.samples();
                data.extend_from_slice(&t.data[o * n..(o + 1) * n]);
            }
        }
        Ok(Tensor {
            data,
            shape: first.shape.with_samples(total),
        })
    }
}

impl<T: Float> PartialEq for Tensor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.data == other.data
    }
}

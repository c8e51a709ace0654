//! Fork-join summation over flat index ranges.

use rayon::prelude::*;
use tracing::trace;

/// Smallest range a single chunk is given before the work is split further.
pub const MIN_CHUNK: usize = 4096;

/// Sum `f(i)` for `i` in `0..len` across the rayon pool.
pub fn threaded_sum<F>(len: usize, f: F) -> f64
where
    F: Fn(usize) -> f64 + Sync,
{
    threaded_sum_with(len, MIN_CHUNK, f)
}

/// Sum `f(i)` for `i` in `0..len`, giving every chunk at least `min_chunk` indices.
///
/// The range is cut into at most `rayon::current_num_threads()` contiguous
/// chunks. Each chunk keeps its own partial sum and the partials are combined
/// in chunk order, so the result does not depend on task scheduling.
pub fn threaded_sum_with<F>(len: usize, min_chunk: usize, f: F) -> f64
where
    F: Fn(usize) -> f64 + Sync,
{
    if len == 0 {
        return 0.0;
    }
    let chunks = rayon::current_num_threads()
        .min(len.div_ceil(min_chunk.max(1)))
        .max(1);
    let chunk_len = len.div_ceil(chunks);
    trace!(len, chunks, chunk_len, "threaded sum");

    let partial = |c: usize| {
        let start = c * chunk_len;
        let end = (start + chunk_len).min(len);
        let mut acc = 0.0;
        for i in start..end {
            acc += f(i);
        }
        acc
    };

    if chunks == 1 {
        return partial(0);
    }

    let partials: Vec<f64> = (0..chunks).into_par_iter().map(partial).collect();
    partials.iter().fold(0.0, |acc, p| acc + p)
}

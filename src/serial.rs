//! Bottom-up merge sort with a fixed insertion-sort run length. Used directly
//! as the serial engine and as the per-worker body of the parallel engine.

use std::cmp;

use crate::error::SortError;
use crate::merge::{merge, merge_prefetch, ScratchBuffer};
use crate::run::insertion_sort_run;

/// Default run length. Sized so one run plus its scratch stays inside a
/// typical L1 data cache for 4-byte keys; a tunable, never a correctness
/// parameter.
pub const DEFAULT_RUN_SIZE: usize = 64;

sort_impl!(SortImpl, "serial_run64", |v| serial_sort(v, DEFAULT_RUN_SIZE));

sort_impl!(PrefetchSortImpl, "serial_pf_run64", |v| serial_sort_prefetch(
    v,
    DEFAULT_RUN_SIZE
));

/// Sorts `v` in place. Stable. Fails only if the scratch buffer cannot be
/// allocated, in which case `v` is untouched.
pub fn serial_sort<T: Ord + Copy>(v: &mut [T], run_size: usize) -> Result<(), SortError> {
    assert!(run_size >= 1, "run_size must be at least 1");

    if v.len() <= 1 {
        return Ok(());
    }

    let mut scratch = ScratchBuffer::try_new(v)?;
    sort_range(v, run_size, scratch.as_mut_slice(), merge);
    Ok(())
}

/// [`serial_sort`] with the prefetching merge kernel. Identical output.
pub fn serial_sort_prefetch<T: Ord + Copy>(v: &mut [T], run_size: usize) -> Result<(), SortError> {
    assert!(run_size >= 1, "run_size must be at least 1");

    if v.len() <= 1 {
        return Ok(());
    }

    let mut scratch = ScratchBuffer::try_new(v)?;
    sort_range(v, run_size, scratch.as_mut_slice(), merge_prefetch);
    Ok(())
}

/// The engine body: insertion-sort runs of `run_size`, then merge adjacent
/// runs with doubling stride until the range is one sorted run.
///
/// `scratch` must be at least as long as `v`. The caller owns it so the
/// parallel workers can pass their private block-sized buffers.
pub(crate) fn sort_range<T: Ord + Copy>(
    v: &mut [T],
    run_size: usize,
    scratch: &mut [T],
    merge_fn: fn(&mut [T], usize, &mut [T]),
) {
    debug_assert!(scratch.len() >= v.len());

    for run in v.chunks_mut(run_size) {
        insertion_sort_run(run);
    }

    let mut stride = run_size;
    while stride < v.len() {
        let mut left = 0;
        // A trailing run with no partner at this stride is already sorted and
        // gets picked up by a later round.
        while left + stride < v.len() {
            let right = cmp::min(left + 2 * stride, v.len());
            merge_fn(&mut v[left..right], stride, &mut scratch[left..right]);
            left += 2 * stride;
        }
        stride *= 2;
    }
}

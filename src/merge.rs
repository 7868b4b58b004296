//! Scratch-buffer allocation and the two-run merge kernel shared by the serial
//! engine, the parallel workers and the reduction tree.

use crate::error::SortError;

/// How many elements ahead of each merge cursor `merge_prefetch` requests.
const PREFETCH_DIST: usize = 16;

/// Auxiliary buffer a merge writes into before the result is copied back.
///
/// Every engine owns its buffers explicitly: the serial engine one sized to
/// its range, each parallel worker a private one sized to its block, the
/// reducer one sized to the whole array. Buffers are never shared between
/// workers.
pub struct ScratchBuffer<T> {
    buf: Vec<T>,
}

impl<T: Copy> ScratchBuffer<T> {
    /// Allocates a buffer mirroring `src`. Fails with
    /// [`SortError::AllocFailed`] instead of aborting when memory is
    /// exhausted.
    pub fn try_new(src: &[T]) -> Result<Self, SortError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(src.len())
            .map_err(|_| SortError::alloc_of::<T>(src.len()))?;
        buf.extend_from_slice(src);
        Ok(Self { buf })
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.buf
    }
}

/// Merges the adjacent sorted runs `v[..mid]` and `v[mid..]` into
/// `out[..v.len()]`.
///
/// Ties take the left element first, which is what keeps the surrounding
/// engines stable.
pub fn merge_into<T: Ord + Copy>(v: &[T], mid: usize, out: &mut [T]) {
    debug_assert!(mid <= v.len());
    debug_assert!(out.len() >= v.len());

    let (a, b) = v.split_at(mid);
    let mut i = 0;
    let mut j = 0;
    let mut k = 0;

    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out[k] = a[i];
            i += 1;
        } else {
            out[k] = b[j];
            j += 1;
        }
        k += 1;
    }
    out[k..k + (a.len() - i)].copy_from_slice(&a[i..]);
    k += a.len() - i;
    out[k..k + (b.len() - j)].copy_from_slice(&b[j..]);
}

/// [`merge_into`] followed by copy-back into `v`.
pub fn merge<T: Ord + Copy>(v: &mut [T], mid: usize, scratch: &mut [T]) {
    merge_into(v, mid, scratch);
    v.copy_from_slice(&scratch[..v.len()]);
}

/// Behaviorally identical to [`merge`], but requests the cache lines
/// `PREFETCH_DIST` elements ahead of both cursors before they are read.
/// Performance-only; covered by the same tests as the base merge.
pub fn merge_prefetch<T: Ord + Copy>(v: &mut [T], mid: usize, scratch: &mut [T]) {
    debug_assert!(mid <= v.len());
    debug_assert!(scratch.len() >= v.len());

    {
        let (a, b) = v.split_at(mid);
        let out = &mut scratch[..];
        let mut i = 0;
        let mut j = 0;
        let mut k = 0;

        while i < a.len() && j < b.len() {
            prefetch_read(a, i + PREFETCH_DIST);
            prefetch_read(b, j + PREFETCH_DIST);

            if a[i] <= b[j] {
                out[k] = a[i];
                i += 1;
            } else {
                out[k] = b[j];
                j += 1;
            }
            k += 1;
        }
        out[k..k + (a.len() - i)].copy_from_slice(&a[i..]);
        k += a.len() - i;
        out[k..k + (b.len() - j)].copy_from_slice(&b[j..]);
    }

    v.copy_from_slice(&scratch[..v.len()]);
}

#[inline(always)]
#[allow(unused_variables)]
fn prefetch_read<T>(data: &[T], idx: usize) {
    #[cfg(target_arch = "x86_64")]
    if idx < data.len() {
        // SAFETY: We checked the arch, and idx is in bounds.
        unsafe {
            use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
            _mm_prefetch::<_MM_HINT_T0>(data.as_ptr().add(idx) as *const i8);
        }
    }
}

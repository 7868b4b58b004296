//! LSD radix sort baseline: non-comparison, stable, one counting pass per
//! 8-bit digit. Included to compare the merge engines against a sort whose
//! cost does not depend on input order.

use std::mem;

use crate::error::SortError;
use crate::merge::ScratchBuffer;
use crate::run::insertion_sort_run;

pub const RADIX_BITS: u32 = 8;
pub const RADIX_SIZE: usize = 1 << RADIX_BITS;
const RADIX_MASK: u32 = (RADIX_SIZE - 1) as u32;

/// Below this length the hybrid variant skips the fixed per-pass overhead and
/// insertion-sorts instead.
pub const HYBRID_CUTOFF: usize = 64;

sort_impl!(SortImpl, "radix_lsd", radix_sort);

sort_impl!(HybridSortImpl, "radix_hybrid", radix_sort_hybrid);

/// A key the radix engine can take apart into 8-bit digits, least significant
/// first. Digits beyond the key width are never requested.
pub trait RadixKey: Copy {
    /// Number of digit passes needed to cover the key.
    const PASSES: u32;

    /// The `pass`-th least significant 8-bit digit.
    fn digit(self, pass: u32) -> usize;
}

macro_rules! radix_key_uint {
    ($($t:ty),*) => {
        $(
            impl RadixKey for $t {
                const PASSES: u32 = (mem::size_of::<$t>() as u32 * 8) / RADIX_BITS;

                #[inline]
                fn digit(self, pass: u32) -> usize {
                    ((self >> (pass * RADIX_BITS)) as u32 & RADIX_MASK) as usize
                }
            }
        )*
    };
}

radix_key_uint!(u8, u16, u32, u64);

/// Sorts `v` in place, stable, no comparisons. Fails only if the scratch
/// buffer cannot be allocated; the 256-entry histogram lives on the stack and
/// is reused across passes.
pub fn radix_sort<T: RadixKey>(v: &mut [T]) -> Result<(), SortError> {
    if v.len() <= 1 {
        return Ok(());
    }

    let mut scratch = ScratchBuffer::try_new(v)?;
    radix_sort_with(v, scratch.as_mut_slice());
    Ok(())
}

/// Hybrid variant: ranges up to [`HYBRID_CUTOFF`] elements fall back to the
/// run sorter instead of paying four counting passes.
pub fn radix_sort_hybrid<T: RadixKey + Ord>(v: &mut [T]) -> Result<(), SortError> {
    if v.len() <= HYBRID_CUTOFF {
        insertion_sort_run(v);
        return Ok(());
    }
    radix_sort(v)
}

pub(crate) fn radix_sort_with<T: RadixKey>(v: &mut [T], scratch: &mut [T]) {
    debug_assert!(scratch.len() >= v.len());

    let mut counts = [0usize; RADIX_SIZE];

    for pass in 0..T::PASSES {
        counts.fill(0);
        for &key in v.iter() {
            counts[key.digit(pass)] += 1;
        }

        // Inclusive prefix sums; the scatter below pre-decrements, which
        // together with the reverse walk keeps equal keys in input order.
        for i in 1..RADIX_SIZE {
            counts[i] += counts[i - 1];
        }

        for &key in v.iter().rev() {
            let digit = key.digit(pass);
            counts[digit] -= 1;
            scratch[counts[digit]] = key;
        }

        v.copy_from_slice(&scratch[..v.len()]);
    }
}

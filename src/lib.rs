//! Testbed for a cache-aware, block-parallel run-and-merge sorting engine over
//! fixed-width unsigned integer keys, compared against a serial bottom-up merge
//! sort and an LSD radix baseline.
//!
//! All engines sort in place and report scratch-allocation failure instead of
//! returning a partially sorted array as if it had succeeded.

macro_rules! sort_impl {
    ($impl_name:ident, $name:expr, $sort_fn:expr) => {
        pub struct $impl_name;

        impl crate::Sort for $impl_name {
            fn name() -> String {
                $name.into()
            }

            #[inline]
            fn sort<T>(v: &mut [T]) -> Result<(), crate::SortError>
            where
                T: crate::SortKey,
            {
                $sort_fn(v)
            }
        }
    };
}

pub mod error;
pub mod measure;
pub mod merge;
pub mod parallel;
pub mod patterns;
pub mod radix;
pub mod run;
pub mod rust_std;
pub mod serial;

pub use error::SortError;
pub use merge::ScratchBuffer;
pub use parallel::{parallel_sort, partition, Block, BLOCK_ALIGN};
pub use radix::{radix_sort, radix_sort_hybrid, RadixKey};
pub use serial::{serial_sort, serial_sort_prefetch, DEFAULT_RUN_SIZE};

/// Uniform dispatch for benchmarks and tests. Implemented by one unit struct
/// per engine via `sort_impl!`.
pub trait Sort {
    fn name() -> String;

    fn sort<T>(v: &mut [T]) -> Result<(), SortError>
    where
        T: SortKey;
}

/// The key types every engine can handle. The comparison engines only need
/// `Ord + Copy + Send`; the radix baseline additionally needs digit access.
pub trait SortKey: Ord + Copy + Send + RadixKey {}

impl<T: Ord + Copy + Send + RadixKey> SortKey for T {}

/// Ascending-order check used by the benchmark driver after every timed run.
pub fn is_sorted<T: Ord>(v: &[T]) -> bool {
    v.windows(2).all(|w| w[0] <= w[1])
}

//! Stdlib stable sort, the reference the other engines are measured against.

use crate::error::SortError;

sort_impl!(SortImpl, "rust_std_stable", sort);

pub fn sort<T: Ord>(v: &mut [T]) -> Result<(), SortError> {
    v.sort();
    Ok(())
}

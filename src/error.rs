//! Error type shared by all sorting engines.

use std::error;
use std::fmt;
use std::mem;

/// Errors reported by the top-level sort entry points.
///
/// Out-of-range indices handed to the internal kernels are contract
/// violations checked by debug assertions, not runtime errors, so they do not
/// appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortError {
    /// A scratch buffer or task-bookkeeping structure could not be allocated.
    /// The invocation is aborted; the array is left in whatever state the
    /// failure occurred in, which for this crate is always the unmodified
    /// input because every buffer is claimed before sorting starts.
    AllocFailed { bytes: usize },
}

impl SortError {
    pub(crate) fn alloc_of<T>(elements: usize) -> Self {
        SortError::AllocFailed {
            bytes: elements.saturating_mul(mem::size_of::<T>()),
        }
    }
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortError::AllocFailed { bytes } => {
                write!(f, "failed to allocate {} bytes of scratch memory", bytes)
            }
        }
    }
}

impl error::Error for SortError {}

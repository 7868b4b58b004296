//! Wall-clock and peak-memory helpers for the benchmark driver. Not used by
//! the engines themselves.

use std::time::{Duration, Instant};

/// Measures the time it takes to execute `test_fn`.
#[inline(never)]
pub fn measure_duration(mut test_fn: impl FnMut()) -> Duration {
    let start = Instant::now();
    test_fn();
    start.elapsed()
}

/// Peak resident set size of this process in kilobytes, where the platform
/// exposes it.
pub fn max_rss_kb() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        let line = status.lines().find(|line| line.starts_with("VmHWM:"))?;
        line.split_whitespace().nth(1)?.parse().ok()
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

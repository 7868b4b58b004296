//! CSV benchmark driver: measures every engine across input distributions and
//! reports throughput plus a simple cost-per-volume model. Optionally persists
//! results as a JSON baseline and reports significant deltas on later runs.
//!
//! Usage: `sort_bench [size] [num_runs] [--baseline <path>]`

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use parmerge::{
    is_sorted, measure, parallel_sort, patterns, radix_sort, radix_sort_hybrid, serial_sort,
    serial_sort_prefetch, SortError,
};

/// Example CloudLab-ish instance pricing; adjust for the machine under test.
const HOURLY_COST_USD: f64 = 0.50;

/// By versioning the baseline files, we can catch compatibility issues early.
const BASELINE_VERSION: usize = 1;

/// Per-entry change below this ratio is treated as noise.
const MIN_SIGNIFICANT_SPEEDUP: f64 = 0.05;

struct Algorithm {
    name: &'static str,
    func: fn(&mut [u32]) -> Result<(), SortError>,
}

const ALGORITHMS: &[Algorithm] = &[
    // Serial run-and-merge with different run sizes, probing the L1 sweet spot.
    Algorithm { name: "serial_run32", func: |v| serial_sort(v, 32) },
    Algorithm { name: "serial_run64", func: |v| serial_sort(v, 64) },
    Algorithm { name: "serial_run128", func: |v| serial_sort(v, 128) },
    Algorithm { name: "serial_run256", func: |v| serial_sort(v, 256) },
    Algorithm { name: "serial_run512", func: |v| serial_sort(v, 512) },
    // Prefetching merge kernel.
    Algorithm { name: "serial_pf_run64", func: |v| serial_sort_prefetch(v, 64) },
    Algorithm { name: "serial_pf_run128", func: |v| serial_sort_prefetch(v, 128) },
    Algorithm { name: "serial_pf_run256", func: |v| serial_sort_prefetch(v, 256) },
    // Radix baselines.
    Algorithm { name: "radix_lsd", func: |v| radix_sort(v) },
    Algorithm { name: "radix_hybrid", func: |v| radix_sort_hybrid(v) },
    // Block-parallel engine.
    Algorithm { name: "parallel_t2", func: |v| parallel_sort(v, 2, 64) },
    Algorithm { name: "parallel_t4", func: |v| parallel_sort(v, 4, 64) },
    Algorithm { name: "parallel_t8", func: |v| parallel_sort(v, 8, 64) },
    Algorithm { name: "parallel_t16", func: |v| parallel_sort(v, 16, 64) },
];

const DISTRIBUTIONS: &[(&str, fn(usize) -> Vec<u32>)] = &[
    ("random_uniform", patterns::random),
    ("nearly_sorted", patterns::nearly_sorted),
    ("reverse_sorted", patterns::descending),
    ("few_unique", patterns::few_unique),
];

#[derive(Debug, Serialize, Deserialize)]
struct BaselineFile {
    version: usize,
    // Key is "<algorithm>-<distribution>-<size>", value the mean time in us.
    results: BTreeMap<String, f64>,
}

struct DriverConfig {
    size: usize,
    num_runs: usize,
    baseline_path: Option<PathBuf>,
}

fn parse_args() -> DriverConfig {
    let mut config = DriverConfig {
        // 64M elements, 256MB of keys.
        size: 64 * 1024 * 1024,
        num_runs: 3,
        baseline_path: None,
    };

    let mut positional = 0;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--baseline" {
            let path = args.next().unwrap_or_else(|| {
                eprintln!("--baseline requires a path");
                process::exit(2);
            });
            config.baseline_path = Some(PathBuf::from(path));
            continue;
        }

        let value: usize = arg.parse().unwrap_or_else(|_| {
            eprintln!("usage: sort_bench [size] [num_runs] [--baseline <path>]");
            process::exit(2);
        });
        match positional {
            0 => config.size = value,
            1 => config.num_runs = value.max(1),
            _ => {
                eprintln!("unexpected argument: {arg}");
                process::exit(2);
            }
        }
        positional += 1;
    }

    config
}

fn main() {
    let config = parse_args();

    // Reproducible inputs across runs and machines.
    patterns::set_fixed_seed(42);

    let size_gb = (config.size * std::mem::size_of::<u32>()) as f64 / (1024.0 * 1024.0 * 1024.0);
    eprintln!("=== Sorting Benchmark ===");
    eprintln!("Array size: {} elements ({:.3} GB)", config.size, size_gb);
    eprintln!("Runs per test: {}\n", config.num_runs);

    let mut results = BTreeMap::new();

    println!("algorithm,distribution,size,time_us,time_sec,throughput_MB_s,cost_per_GB");

    for (dist_name, dist_fn) in DISTRIBUTIONS {
        let source = dist_fn(config.size);

        for alg in ALGORITHMS {
            let Some(mean) = time_algorithm(alg, &source, config.num_runs) else {
                continue;
            };

            let time_us = mean.as_secs_f64() * 1e6;
            let time_sec = mean.as_secs_f64();
            let bytes = (config.size * std::mem::size_of::<u32>()) as f64;
            let throughput_mb = (bytes / (1024.0 * 1024.0)) / time_sec;
            let cost_per_gb = (HOURLY_COST_USD / 3600.0) * (time_sec / size_gb);

            println!(
                "{},{},{},{:.2},{:.6},{:.2},{:.8}",
                alg.name, dist_name, config.size, time_us, time_sec, throughput_mb, cost_per_gb
            );

            results.insert(format!("{}-{}-{}", alg.name, dist_name, config.size), time_us);
        }
    }

    if let Some(path) = &config.baseline_path {
        handle_baseline(path, &results);
    }

    if let Some(rss_kb) = measure::max_rss_kb() {
        eprintln!("\nPeak RSS: {} KB", rss_kb);
    }
    eprintln!("=== Benchmark Complete ===");
}

/// One warmup run plus `num_runs` timed runs on fresh copies of `source`.
/// Returns `None` if the engine reported a failure; verification failures
/// abort the whole driver since they indicate a bug, not an environment
/// problem.
fn time_algorithm(alg: &Algorithm, source: &[u32], num_runs: usize) -> Option<Duration> {
    let mut work = source.to_vec();
    if let Err(err) = (alg.func)(&mut work) {
        eprintln!("ERROR in {}: {err}", alg.name);
        return None;
    }

    let mut total = Duration::ZERO;
    for _ in 0..num_runs {
        work.copy_from_slice(source);

        let mut failure = None;
        let duration = measure::measure_duration(|| {
            if let Err(err) = (alg.func)(&mut work) {
                failure = Some(err);
            }
        });
        if let Some(err) = failure {
            eprintln!("ERROR in {}: {err}", alg.name);
            return None;
        }

        if !is_sorted(&work) {
            eprintln!("VERIFICATION FAILED for {}", alg.name);
            process::exit(1);
        }

        total += duration;
    }

    Some(total / num_runs as u32)
}

/// Creates the baseline on first use, compares against it afterwards.
fn handle_baseline(path: &Path, results: &BTreeMap<String, f64>) {
    let new_file = BaselineFile {
        version: BASELINE_VERSION,
        results: results.clone(),
    };

    let existing = fs::read_to_string(path)
        .ok()
        .map(|text| serde_json::from_str::<BaselineFile>(&text).unwrap_or_else(|err| {
            eprintln!("unreadable baseline {}: {err}", path.display());
            process::exit(2);
        }));

    let Some(old_file) = existing else {
        let serialized = serde_json::to_string(&new_file).unwrap();
        if let Err(err) = fs::write(path, serialized) {
            eprintln!("failed to write baseline {}: {err}", path.display());
            process::exit(2);
        }
        eprintln!("\nWrote new baseline to file: {}", path.display());
        return;
    };

    if old_file.version != new_file.version {
        eprintln!(
            "baseline version mismatch, baseline: {} new: {}",
            old_file.version, new_file.version
        );
        process::exit(2);
    }

    eprintln!("\nComparison against baseline {}:", path.display());
    for (key, new_time_us) in results {
        let Some(old_time_us) = old_file.results.get(key) else {
            continue;
        };

        let speedup = old_time_us / new_time_us - 1.0;
        if speedup.abs() >= MIN_SIGNIFICANT_SPEEDUP {
            let direction = if speedup > 0.0 { "faster" } else { "slower" };
            eprintln!("  {key}: {:.1}% {direction}", speedup.abs() * 100.0);
        }
    }
}

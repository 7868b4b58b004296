use std::sync::atomic::{AtomicBool, Ordering};

use rand::prelude::*;

use zipf::ZipfDistribution;

use once_cell::sync::OnceCell;

/// Provides a set of input patterns useful for testing and benchmarking the
/// sorting engines. Values are `u32`, the key type the engines are built
/// around.

// --- Public ---

pub fn random(size: usize) -> Vec<u32> {
    //     .
    // : . : :
    // :.:::.::

    random_vec(size)
}

pub fn random_uniform<R>(size: usize, range: R) -> Vec<u32>
where
    R: Into<rand::distributions::Uniform<u32>>,
{
    // :.:.:.::
    let mut rng = new_rng();

    let dist: rand::distributions::Uniform<u32> = range.into();

    (0..size).map(|_| dist.sample(&mut rng)).collect()
}

pub fn random_zipf(size: usize, exponent: f64) -> Vec<u32> {
    // https://en.wikipedia.org/wiki/Zipf's_law
    let mut rng = new_rng();

    let dist = ZipfDistribution::new(size.max(1), exponent).unwrap();

    (0..size).map(|_| dist.sample(&mut rng) as u32).collect()
}

pub fn all_equal(size: usize) -> Vec<u32> {
    // ......
    // ::::::

    (0..size).map(|_| 66).collect::<Vec<_>>()
}

pub fn ascending(size: usize) -> Vec<u32> {
    //     .:
    //   .:::
    // .:::::

    (0..size as u32).collect::<Vec<_>>()
}

pub fn descending(size: usize) -> Vec<u32> {
    // :.
    // :::.
    // :::::.

    (0..size as u32).rev().collect::<Vec<_>>()
}

pub fn nearly_sorted(size: usize) -> Vec<u32> {
    //   .:  .
    // .:::.::
    // Ascending with ~1% of positions swapped pairwise.

    let mut vals = ascending(size);
    let mut rng = new_rng();

    for _ in 0..size / 100 {
        let a = rng.gen_range(0..size);
        let b = rng.gen_range(0..size);
        vals.swap(a, b);
    }

    vals
}

pub fn few_unique(size: usize) -> Vec<u32> {
    // :.:.:.::
    // 100 distinct values, the low-cardinality shape common in real data.

    random_uniform(size, 0..100)
}

static USE_FIXED_SEED: AtomicBool = AtomicBool::new(true);

static SEED: OnceCell<u64> = OnceCell::new();

pub fn disable_fixed_seed() {
    USE_FIXED_SEED.store(false, Ordering::Release);
}

/// Pins the fixed seed to a specific value. Only effective before the first
/// pattern is generated; the benchmark driver uses this for reproducible CSV
/// runs.
pub fn set_fixed_seed(seed: u64) {
    let _ = SEED.set(seed);
}

pub fn random_init_seed() -> u64 {
    if USE_FIXED_SEED.load(Ordering::Acquire) {
        *SEED.get_or_init(|| thread_rng().gen())
    } else {
        thread_rng().gen()
    }
}

// --- Private ---

fn new_rng() -> StdRng {
    // Random seed, but cached for repeatability.
    rand::SeedableRng::seed_from_u64(random_init_seed())
}

fn random_vec(size: usize) -> Vec<u32> {
    let mut rng = new_rng();

    (0..size).map(|_| rng.gen::<u32>()).collect()
}

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use parmerge::{parallel, patterns, radix, rust_std, serial, Sort};

fn pin_thread_to_core() {
    use std::cell::Cell;
    let pin_core_id: usize = 2;

    thread_local! {static AFFINITY_ALREADY_SET: Cell<bool> = Cell::new(false); }

    // Set affinity only once per thread.
    AFFINITY_ALREADY_SET.with(|affinity_already_set| {
        if !affinity_already_set.get() {
            if let Some(core_id_2) = core_affinity::get_core_ids()
                .as_ref()
                .and_then(|ids| ids.get(pin_core_id))
            {
                core_affinity::set_for_current(*core_id_2);
            }

            affinity_already_set.set(true);
        }
    });
}

#[inline(never)]
fn bench_sort<S: Sort>(
    c: &mut Criterion,
    test_size: usize,
    pattern_name: &str,
    pattern_provider: &fn(usize) -> Vec<u32>,
) {
    // Pin the benchmark to the same core to improve repeatability. Doing it
    // this way allows criterion to do other stuff with other threads, which
    // greatly impacts overall benchmark throughput.
    pin_thread_to_core();

    let batch_size = if test_size > 30 {
        BatchSize::LargeInput
    } else {
        BatchSize::SmallInput
    };

    c.bench_function(
        &format!("{}-hot-u32-{pattern_name}-{test_size}", S::name()),
        |b| {
            b.iter_batched(
                || pattern_provider(test_size),
                |mut test_data| S::sort(black_box(test_data.as_mut_slice())).unwrap(),
                batch_size,
            )
        },
    );
}

#[cfg(feature = "rust_radsort")]
fn bench_radsort(
    c: &mut Criterion,
    test_size: usize,
    pattern_name: &str,
    pattern_provider: &fn(usize) -> Vec<u32>,
) {
    pin_thread_to_core();

    let batch_size = if test_size > 30 {
        BatchSize::LargeInput
    } else {
        BatchSize::SmallInput
    };

    c.bench_function(
        &format!("rust_radsort-hot-u32-{pattern_name}-{test_size}"),
        |b| {
            b.iter_batched(
                || pattern_provider(test_size),
                |mut test_data| radsort::sort(black_box(test_data.as_mut_slice())),
                batch_size,
            )
        },
    );
}

fn bench_patterns(c: &mut Criterion, test_size: usize) {
    let pattern_providers: Vec<(&'static str, fn(usize) -> Vec<u32>)> = vec![
        ("random", patterns::random),
        ("random_z1", |size| patterns::random_zipf(size, 1.0)),
        ("ascending", patterns::ascending),
        ("descending", patterns::descending),
        ("nearly_sorted", patterns::nearly_sorted),
        ("few_unique", patterns::few_unique),
    ];

    for (pattern_name, pattern_provider) in pattern_providers.iter() {
        if test_size < 3 && *pattern_name != "random" {
            continue;
        }

        bench_sort::<serial::SortImpl>(c, test_size, pattern_name, pattern_provider);
        bench_sort::<serial::PrefetchSortImpl>(c, test_size, pattern_name, pattern_provider);
        bench_sort::<parallel::SortImpl>(c, test_size, pattern_name, pattern_provider);
        bench_sort::<radix::SortImpl>(c, test_size, pattern_name, pattern_provider);
        bench_sort::<radix::HybridSortImpl>(c, test_size, pattern_name, pattern_provider);
        bench_sort::<rust_std::SortImpl>(c, test_size, pattern_name, pattern_provider);

        #[cfg(feature = "rust_radsort")]
        bench_radsort(c, test_size, pattern_name, pattern_provider);
    }
}

fn ensure_true_random() {
    // Ensure that random vecs are actually different from call to call.
    let random_vec_a = patterns::random(5);
    let random_vec_b = patterns::random(5);

    assert_ne!(random_vec_a, random_vec_b);
}

fn criterion_benchmark(c: &mut Criterion) {
    let test_sizes = [
        0, 1, 5, 16, 50, 200, 1_000, 2_048, 10_000, 100_000, 1_000_000, 10_000_000,
    ];

    patterns::disable_fixed_seed();
    ensure_true_random();

    for test_size in test_sizes {
        bench_patterns(c, test_size);
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

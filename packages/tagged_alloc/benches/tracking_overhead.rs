//! Benchmarks to measure the compute overhead of `tagged_alloc` bookkeeping itself.
//!
//! Each benchmark allocates and releases one small block. The baseline goes straight to the
//! C runtime heap; the others go through a `Tracker` with different toggles enabled.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use tagged_alloc::{CallSite, Config, SystemAllocator, Tracker, UnderlyingAllocator};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const BLOCK_SIZE: usize = 100;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("tagged_alloc_overhead");

    group.bench_function("baseline_system", |b| {
        let mut allocator = SystemAllocator;
        b.iter(|| {
            let ptr = allocator.allocate(black_box(BLOCK_SIZE)).unwrap();
            // SAFETY: The block is live and came from this allocator.
            unsafe { allocator.release(ptr) };
        });
    });

    for (name, config) in [
        ("tracking_disabled", Config::new().tracking(false)),
        ("tracking_enabled", Config::new()),
        ("tracking_unrounded", Config::new().rounding(false)),
    ] {
        let mut tracker = Tracker::with_parts(SystemAllocator, Vec::<String>::new(), config);

        group.bench_function(name, |b| {
            b.iter(|| {
                let address = tracker
                    .allocate(black_box(BLOCK_SIZE), "bench", CallSite::NONE)
                    .unwrap();
                // SAFETY: The block is live and came from this tracker.
                unsafe { tracker.release(address) };
            });
        });

        tracker.finish().unwrap();
    }

    group.bench_function("grow_tracked", |b| {
        let mut tracker = Tracker::with_parts(SystemAllocator, Vec::<String>::new(), Config::new());

        b.iter(|| {
            let address = tracker.allocate(16, "bench", CallSite::NONE).unwrap();
            // SAFETY: The block is live and came from this tracker.
            let address = unsafe { tracker.grow(address, black_box(64), CallSite::NONE) }.unwrap();
            // SAFETY: The block is live and came from this tracker.
            unsafe { tracker.release(address) };
        });
    });

    group.finish();
}

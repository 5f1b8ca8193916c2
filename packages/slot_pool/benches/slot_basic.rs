//! Basic benchmarks for the `slot_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use new_zealand::nz;
use slot_pool::{FreePolicy, SlotPool, SlotView};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("slot_basic");

    let allocs_op = allocs.operation("build_small");
    group.bench_function("build_small", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(SlotPool::new(nz!(8), Some(nz!(100)))));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("allocate_one");
    group.bench_function("allocate_one", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(|| SlotPool::new(nz!(8), Some(nz!(4))).unwrap())
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for pool in &mut pools {
                _ = black_box(pool.allocate_offset());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("allocate_view");
    group.bench_function("allocate_view", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(|| SlotPool::new(nz!(16), Some(nz!(4))).unwrap())
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for pool in &mut pools {
                let mut view = pool.allocate(SlotView::new).unwrap();
                view.write(0, black_box(1.5_f32));
                _ = black_box(view.offset());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("free_and_reuse");
    group.bench_function("free_and_reuse", |b| {
        b.iter_custom(|iters| {
            let mut pool = SlotPool::new(nz!(8), Some(nz!(1000))).unwrap();
            let offset = pool.allocate_offset().unwrap();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                pool.free(black_box(offset));
                _ = black_box(pool.allocate_offset());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("free_and_reuse_checked");
    group.bench_function("free_and_reuse_checked", |b| {
        b.iter_custom(|iters| {
            let mut pool = SlotPool::builder()
                .item_length(nz!(8))
                .item_count(nz!(1000))
                .free_policy(FreePolicy::Checked)
                .build()
                .unwrap();
            let offset = pool.allocate_offset().unwrap();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                pool.free(black_box(offset));
                _ = black_box(pool.allocate_offset());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("fill_and_drain_1000");
    group.bench_function("fill_and_drain_1000", |b| {
        b.iter_custom(|iters| {
            let mut pool = SlotPool::new(nz!(8), Some(nz!(1000))).unwrap();
            let mut offsets = Vec::with_capacity(1000);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                while let Ok(offset) = pool.allocate_offset() {
                    offsets.push(offset);
                }

                for offset in offsets.drain(..) {
                    pool.free(offset);
                }
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}

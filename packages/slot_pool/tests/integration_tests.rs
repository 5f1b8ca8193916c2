//! Integration tests for the `slot_pool` package.
//!
//! These tests exercise `SlotPool` through its public API only: construction limits,
//! allocation order, LIFO reuse of freed slots and exhaustion.
#![allow(
    clippy::arithmetic_side_effects,
    clippy::integer_division,
    reason = "test code computes offsets and sizes from small, bounded inputs"
)]

use new_zealand::nz;
use slot_pool::{Error, FreePolicy, MAX_POOL_SIZE, SlotPool, SlotView};

#[test]
fn construct_reports_configuration() {
    let pool = SlotPool::new(nz!(10), Some(nz!(10))).unwrap();

    assert_eq!(pool.buffer().len(), 100);
    assert_eq!(pool.item_length(), 10);
    assert_eq!(pool.byte_length(), 100);

    // Omitting the item count fills the maximum pool size.
    let pool = SlotPool::new(nz!(16), None).unwrap();

    assert_eq!(pool.item_length(), 16);
    assert_eq!(pool.byte_length(), 2_097_152);
}

#[test]
fn sequential_allocations_ignore_view_type() {
    let mut pool = SlotPool::new(nz!(8), Some(nz!(1000))).unwrap();

    let view = pool.allocate(SlotView::new).unwrap();
    assert_eq!(view.offset(), 0);
    assert_eq!(view.len(), 8);

    let floats = pool
        .allocate(|buffer, offset, len| {
            let mut view = SlotView::new(buffer, offset, len);
            view.write(0, 1.25_f32);
            (view.offset(), view.element_count::<f32>())
        })
        .unwrap();
    assert_eq!(floats, (8, 2));

    let words = pool
        .allocate(|buffer, offset, len| {
            let view = SlotView::new(buffer, offset, len);
            (view.offset(), view.element_count::<u32>())
        })
        .unwrap();
    assert_eq!(words, (16, 2));
}

#[test]
fn free_then_allocate_reuses_offset() {
    let mut pool = SlotPool::new(nz!(8), Some(nz!(1000))).unwrap();

    let first = pool.allocate_offset().unwrap();
    assert_eq!(first, 0);
    pool.free(first);

    assert_eq!(pool.allocate_offset().unwrap(), 0);

    let f32_slot = pool.allocate_offset().unwrap();
    assert_eq!(f32_slot, 8);
    let i8_slot = pool.allocate_offset().unwrap();
    assert_eq!(i8_slot, 16);

    pool.free(f32_slot);

    // This ends up being the slot the previous allocation used, not a new one at 24.
    assert_eq!(pool.allocate_offset().unwrap(), f32_slot);
}

#[test]
fn lifo_reuse_across_interleavings() {
    let mut pool = SlotPool::new(nz!(4), Some(nz!(16))).unwrap();

    let offsets: Vec<usize> = (0..6).map(|_| pool.allocate_offset().unwrap()).collect();
    assert_eq!(offsets, vec![0, 4, 8, 12, 16, 20]);

    pool.free(4);
    pool.free(16);
    pool.free(0);

    assert_eq!(pool.allocate_offset().unwrap(), 0);

    pool.free(20);
    assert_eq!(pool.allocate_offset().unwrap(), 20);
    assert_eq!(pool.allocate_offset().unwrap(), 16);
    assert_eq!(pool.allocate_offset().unwrap(), 4);

    // Free list is drained, so the bump cursor takes over again.
    assert_eq!(pool.allocate_offset().unwrap(), 24);
}

#[test]
fn exhaustion_after_item_count_allocations() {
    let mut pool = SlotPool::new(nz!(8), Some(nz!(10))).unwrap();

    for expected in (0..80).step_by(8) {
        let view = pool.allocate(SlotView::new).unwrap();
        assert_eq!(view.offset(), expected);
    }

    assert_eq!(
        pool.allocate(SlotView::new).unwrap_err(),
        Error::PoolExhausted { capacity: 10 }
    );
}

#[test]
fn exhausted_pool_recovers_after_free() {
    let mut pool = SlotPool::new(nz!(8), Some(nz!(10))).unwrap();

    for _ in 0..10 {
        _ = pool.allocate_offset().unwrap();
    }
    assert!(pool.is_full());
    assert!(pool.allocate_offset().is_err());

    pool.free(40);
    assert!(!pool.is_full());
    assert_eq!(pool.allocate_offset().unwrap(), 40);
    assert!(pool.allocate_offset().is_err());
}

#[test]
fn maximum_size_boundary() {
    let pool = SlotPool::new(nz!(1), Some(nz!(2_097_152)));
    assert!(pool.is_ok());

    let pool = SlotPool::new(nz!(1), Some(nz!(2_097_153)));
    assert_eq!(
        pool.unwrap_err(),
        Error::CapacityExceeded {
            item_length: 1,
            item_count: 2_097_153,
            max_bytes: MAX_POOL_SIZE.get(),
        }
    );
}

#[test]
fn checked_pool_behaves_like_unchecked_for_valid_use() {
    let mut checked = SlotPool::builder()
        .item_length(nz!(8))
        .item_count(nz!(10))
        .free_policy(FreePolicy::Checked)
        .build()
        .unwrap();
    let mut unchecked = SlotPool::new(nz!(8), Some(nz!(10))).unwrap();

    for pool in [&mut checked, &mut unchecked] {
        let a = pool.allocate_offset().unwrap();
        let b = pool.allocate_offset().unwrap();
        let c = pool.allocate_offset().unwrap();
        pool.free(b);
        pool.free(a);

        assert_eq!(pool.allocate_offset().unwrap(), a);
        assert_eq!(pool.allocate_offset().unwrap(), b);
        assert_eq!(pool.allocate_offset().unwrap(), 24);
        assert_eq!(pool.len(), 4);

        pool.free(c);
        assert_eq!(pool.len(), 3);
    }
}

#[test]
fn try_free_rejects_never_allocated_offset() {
    let mut pool = SlotPool::builder()
        .item_length(nz!(8))
        .item_count(nz!(10))
        .free_policy(FreePolicy::Checked)
        .build()
        .unwrap();

    _ = pool.allocate_offset().unwrap();

    let error = pool.try_free(40).unwrap_err();
    assert_eq!(
        error.to_string(),
        "cannot free offset 40: offset has never been allocated"
    );
    assert_eq!(pool.len(), 1);
}

#[test]
fn views_write_through_to_the_buffer() {
    let mut pool = SlotPool::builder()
        .item_length_of::<[u16; 4]>()
        .item_count(nz!(4))
        .build()
        .unwrap();

    let mut view = pool.allocate(SlotView::new).unwrap();
    for index in 0..4 {
        view.write(index, u16::try_from(index).unwrap() * 100);
    }
    let offset = view.offset();

    let bytes = pool.slot(offset);
    assert_eq!(bytes.len(), 8);
    assert_eq!(bytes.get(2..4).unwrap(), &100_u16.to_ne_bytes());
    assert_eq!(bytes.get(6..8).unwrap(), &300_u16.to_ne_bytes());
}

//! Property tests for pool sizing and slot reuse.
#![allow(
    clippy::arithmetic_side_effects,
    clippy::integer_division,
    reason = "test code computes offsets and sizes from small, bounded inputs"
)]

use std::num::NonZero;

use proptest::prelude::*;
use slot_pool::{Error, FreePolicy, IndexWidth, MAX_POOL_SIZE, SlotPool};

const MAX: usize = MAX_POOL_SIZE.get();

fn non_zero(value: usize) -> NonZero<usize> {
    NonZero::new(value).expect("strategies only produce non-zero values")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn explicit_count_is_exact(item_length in 1_usize..=4096, item_count in 1_usize..=512) {
        prop_assume!(item_length * item_count <= MAX);

        let pool = SlotPool::new(non_zero(item_length), Some(non_zero(item_count))).unwrap();

        prop_assert_eq!(pool.byte_length(), item_length * item_count);
        prop_assert_eq!(pool.capacity(), item_count);
    }

    #[test]
    fn omitted_count_is_largest_multiple(item_length in 1_usize..=MAX) {
        let pool = SlotPool::new(non_zero(item_length), None).unwrap();

        prop_assert_eq!(pool.byte_length(), MAX - MAX % item_length);
        prop_assert!(pool.byte_length() <= MAX);
        prop_assert_eq!(pool.byte_length() % item_length, 0);
    }

    #[test]
    fn oversized_request_fails(item_length in 1_usize..=4096, extra in 1_usize..=4096) {
        // Smallest count that no longer fits, plus some slack.
        let item_count = MAX / item_length + extra;

        let result = SlotPool::new(non_zero(item_length), Some(non_zero(item_count)));

        let is_capacity_exceeded = matches!(result, Err(Error::CapacityExceeded { .. }));
        prop_assert!(is_capacity_exceeded);
    }

    #[test]
    fn fresh_pool_hands_out_increasing_offsets(item_length in 1_usize..=64, item_count in 1_usize..=300) {
        let mut pool = SlotPool::new(non_zero(item_length), Some(non_zero(item_count))).unwrap();

        for slot in 0..item_count {
            prop_assert_eq!(pool.allocate_offset().unwrap(), slot * item_length);
        }

        let is_exhausted = matches!(pool.allocate_offset(), Err(Error::PoolExhausted { .. }));
        prop_assert!(is_exhausted);
    }

    #[test]
    fn index_width_is_narrowest_fit(item_count in 1_usize..=100_000) {
        let pool = SlotPool::new(non_zero(1), Some(non_zero(item_count))).unwrap();

        let expected = if item_count < 1 << 8 {
            IndexWidth::U8
        } else if item_count < 1 << 16 {
            IndexWidth::U16
        } else {
            IndexWidth::U32
        };

        prop_assert_eq!(pool.index_width(), expected);
    }

    /// Runs a random sequence of allocations and frees against a simple model: a vector of
    /// live offsets and a stack of freed offsets. The pool must agree with the model at every step.
    #[test]
    fn matches_stack_model(
        item_length in 1_usize..=32,
        item_count in 1_usize..=40,
        ops in proptest::collection::vec(any::<(bool, prop::sample::Index)>(), 1..200),
        checked in any::<bool>(),
    ) {
        let policy = if checked { FreePolicy::Checked } else { FreePolicy::Unchecked };
        let mut pool = SlotPool::builder()
            .item_length(non_zero(item_length))
            .item_count(non_zero(item_count))
            .free_policy(policy)
            .build()
            .unwrap();

        let mut live: Vec<usize> = Vec::new();
        let mut freed: Vec<usize> = Vec::new();
        let mut next_virgin = 0_usize;

        for (allocate, pick) in ops {
            if allocate || live.is_empty() {
                let expected = if let Some(offset) = freed.pop() {
                    Some(offset)
                } else if next_virgin < item_count * item_length {
                    let offset = next_virgin;
                    next_virgin += item_length;
                    Some(offset)
                } else {
                    None
                };

                match (pool.allocate_offset(), expected) {
                    (Ok(actual), Some(expected)) => {
                        prop_assert_eq!(actual, expected);
                        live.push(actual);
                    }
                    (Err(Error::PoolExhausted { capacity }), None) => {
                        prop_assert_eq!(capacity, item_count);
                    }
                    (actual, expected) => {
                        prop_assert!(false, "pool returned {:?}, model expected {:?}", actual, expected);
                    }
                }
            } else {
                let offset = live.swap_remove(pick.index(live.len()));
                pool.try_free(offset).unwrap();
                freed.push(offset);
            }

            prop_assert_eq!(pool.len(), live.len());
            prop_assert_eq!(pool.is_full(), freed.is_empty() && next_virgin >= item_count * item_length);
        }
    }
}

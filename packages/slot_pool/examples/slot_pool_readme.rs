//! Example that demonstrates the exact usage shown in the README.md file.
//!
//! This shows how to use `SlotPool` to hand out fixed-size slots of one shared buffer.

use new_zealand::nz;
use slot_pool::{Error, SlotPool};

fn main() {
    println!("=== Slot Pool README Example ===");

    // Create a pool of ten 8-byte slots.
    let mut pool = SlotPool::new(nz!(8), Some(nz!(10))).unwrap();

    // Allocate a few slots. Offsets grow by the item length.
    let first = pool.allocate_offset().unwrap();
    let second = pool.allocate_offset().unwrap();
    let third = pool.allocate_offset().unwrap();

    println!("Allocated offsets: {first}, {second}, {third}");
    assert_eq!((first, second, third), (0, 8, 16));

    // Write through the slot and read the bytes back.
    pool.slot_mut(second).copy_from_slice(&42_u64.to_le_bytes());
    let value = u64::from_le_bytes(pool.slot(second).try_into().unwrap());
    println!("Value in slot {second}: {value}");
    assert_eq!(value, 42);

    // A freed slot is the next one handed out.
    pool.free(second);
    let reused = pool.allocate_offset().unwrap();
    println!("Reused offset: {reused}");
    assert_eq!(reused, second);

    // Fill the rest of the pool.
    while pool.allocate_offset().is_ok() {}

    match pool.allocate_offset() {
        Err(Error::PoolExhausted { capacity }) => {
            println!("Pool is full with {capacity} slots in use");
        }
        other => panic!("expected an exhausted pool, got {other:?}"),
    }

    println!("README example completed successfully!");
}

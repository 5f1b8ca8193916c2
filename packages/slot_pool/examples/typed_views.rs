//! Example that shows typed views over pool slots.
//!
//! Each slot holds a small vector of `f32` components, accessed through `SlotView`.

use new_zealand::nz;
use slot_pool::{SlotPool, SlotView};

fn main() {
    println!("=== Typed Views Example ===");

    let mut pool = SlotPool::builder()
        .item_length_of::<[f32; 3]>()
        .item_count(nz!(64))
        .build()
        .unwrap();

    let mut offsets = Vec::new();

    for i in 0..4_u8 {
        let mut position = pool.allocate(SlotView::new).unwrap();
        let base = f32::from(i);

        for component in 0..position.element_count::<f32>() {
            position.write(component, base + 0.5);
        }

        offsets.push(position.offset());
    }

    for offset in &offsets {
        let position = SlotView::new(pool.buffer_mut(), *offset, 12);
        println!(
            "Slot at {offset}: ({}, {}, {})",
            position.read::<f32>(0),
            position.read::<f32>(1),
            position.read::<f32>(2)
        );
    }

    // Freed slots keep their old bytes until written again.
    let released = offsets.swap_remove(1);
    pool.free(released);

    let reused = pool.allocate(SlotView::new).unwrap();
    println!(
        "Reused slot at {} still reads {}",
        reused.offset(),
        reused.read::<f32>(0)
    );

    println!("Typed views example completed successfully!");
}

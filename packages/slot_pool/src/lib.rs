#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A fixed-size slot allocator over a single pre-sized byte buffer.
//!
//! This crate provides [`SlotPool`], which carves one contiguous buffer of at most
//! [`MAX_POOL_SIZE`] bytes into equal-length slots and hands out slot offsets on request.
//! It suits callers that need many same-sized allocations without a heap allocation each,
//! such as numeric arrays or fixed-layout records viewed over shared memory.
//!
//! # Key Features
//!
//! - **One allocation up front**: The buffer and the free list are allocated at construction;
//!   allocating and freeing slots afterwards is O(1) and never touches the global allocator
//! - **LIFO reuse**: The most recently freed slot is always the next one handed out
//! - **Compact bookkeeping**: Freed slots are remembered by index in the narrowest integer
//!   width that fits the pool (see [`IndexWidth`])
//! - **Caller-defined views**: [`SlotPool::allocate()`] passes the raw slot to a materializer
//!   and returns whatever it builds, for example a [`SlotView`]
//! - **Optional validation**: [`FreePolicy::Checked`] and [`SlotPool::try_free()`] catch
//!   double frees and stray offsets
//!
//! The pool does not know or care what is stored in a slot. It never drops, moves or zeroes
//! slot contents after construction, so a reused slot still holds the bytes last written to it.
//!
//! # Examples
//!
//! ## Allocating offsets
//!
//! ```rust
//! use new_zealand::nz;
//! use slot_pool::{Error, SlotPool};
//!
//! // A pool of ten 8-byte slots.
//! let mut pool = SlotPool::new(nz!(8), Some(nz!(10))).unwrap();
//!
//! let offsets: Vec<usize> = (0..10).map(|_| pool.allocate_offset().unwrap()).collect();
//! assert_eq!(offsets, vec![0, 8, 16, 24, 32, 40, 48, 56, 64, 72]);
//!
//! // Every slot is live now.
//! assert!(matches!(
//!     pool.allocate_offset(),
//!     Err(Error::PoolExhausted { .. })
//! ));
//!
//! // Freeing a slot makes it available again.
//! pool.free(24);
//! assert_eq!(pool.allocate_offset().unwrap(), 24);
//! ```
//!
//! ## Typed views over slots
//!
//! ```rust
//! use slot_pool::{SlotPool, SlotView};
//!
//! let mut pool = SlotPool::builder().item_length_of::<[f32; 4]>().build().unwrap();
//!
//! let mut position = pool.allocate(SlotView::new).unwrap();
//! position.write(0, 1.0_f32);
//! position.write(3, -1.0_f32);
//! assert_eq!(position.read::<f32>(3), -1.0);
//!
//! // Keep the offset to release the slot later.
//! let offset = position.offset();
//! pool.free(offset);
//! ```

mod builder;
mod error;
mod free_list;
mod free_policy;
mod live_slots;
mod pool;
mod view;

pub use builder::*;
pub use error::*;
pub use free_list::IndexWidth;
pub(crate) use free_list::FreeList;
pub use free_policy::*;
pub(crate) use live_slots::*;
pub use pool::{MAX_POOL_SIZE, SlotPool};
pub use view::*;

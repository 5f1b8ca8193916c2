use std::fmt::Debug;
use std::num::NonZero;

/// Element width of the free list that a [`SlotPool`][crate::SlotPool] uses to remember
/// released slots.
///
/// The pool picks the narrowest width that can count all of its slots, so a pool of 200
/// slots spends one byte per free-list entry while a pool of 2 million slots spends four.
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use slot_pool::{IndexWidth, SlotPool};
///
/// let pool = SlotPool::new(nz!(64), Some(nz!(100))).unwrap();
/// assert_eq!(pool.index_width(), IndexWidth::U8);
///
/// let pool = SlotPool::new(nz!(1), None).unwrap();
/// assert_eq!(pool.index_width(), IndexWidth::U32);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum IndexWidth {
    /// Slot indices are stored as `u8`. Used when there are fewer than 2^8 slots.
    U8,

    /// Slot indices are stored as `u16`. Used when there are fewer than 2^16 slots.
    U16,

    /// Slot indices are stored as `u32`.
    U32,
}

impl IndexWidth {
    /// Selects the narrowest width for a pool with the given number of slots.
    #[must_use]
    pub(crate) fn for_slot_count(slot_count: NonZero<usize>) -> Self {
        let slot_count = slot_count.get();

        if slot_count < 1 << u8::BITS {
            Self::U8
        } else if slot_count < 1 << u16::BITS {
            Self::U16
        } else {
            Self::U32
        }
    }

    /// Number of bytes each free-list entry occupies.
    #[must_use]
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            Self::U8 => size_of::<u8>(),
            Self::U16 => size_of::<u16>(),
            Self::U32 => size_of::<u32>(),
        }
    }
}

/// Backing array of the free list in whichever width was selected.
#[derive(Debug)]
enum IndexStorage {
    U8(Box<[u8]>),
    U16(Box<[u16]>),
    U32(Box<[u32]>),
}

/// A fixed-capacity LIFO stack of slot indices.
///
/// The stack pointer is the only indication of which entries are present. Popped entries are
/// cleared to zero, which is also a valid slot index, so the stored value itself never signals
/// presence.
#[derive(Debug)]
pub(crate) struct FreeList {
    storage: IndexStorage,

    /// Number of entries currently on the stack. The next push goes to this position.
    top: usize,
}

impl FreeList {
    /// Creates an empty free list able to hold one entry for each of `slot_count` slots.
    #[must_use]
    pub(crate) fn new(slot_count: NonZero<usize>) -> Self {
        let len = slot_count.get();

        let storage = match IndexWidth::for_slot_count(slot_count) {
            IndexWidth::U8 => IndexStorage::U8(vec![0; len].into_boxed_slice()),
            IndexWidth::U16 => IndexStorage::U16(vec![0; len].into_boxed_slice()),
            IndexWidth::U32 => IndexStorage::U32(vec![0; len].into_boxed_slice()),
        };

        Self { storage, top: 0 }
    }

    #[must_use]
    pub(crate) fn width(&self) -> IndexWidth {
        match self.storage {
            IndexStorage::U8(_) => IndexWidth::U8,
            IndexStorage::U16(_) => IndexWidth::U16,
            IndexStorage::U32(_) => IndexWidth::U32,
        }
    }

    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        match &self.storage {
            IndexStorage::U8(entries) => entries.len(),
            IndexStorage::U16(entries) => entries.len(),
            IndexStorage::U32(entries) => entries.len(),
        }
    }

    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Only feeds debug output and occupancy counters.
    pub(crate) fn len(&self) -> usize {
        self.top
    }

    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.top == 0
    }

    #[must_use]
    pub(crate) fn is_full(&self) -> bool {
        self.top >= self.capacity()
    }

    /// Pushes a slot index onto the stack.
    ///
    /// # Panics
    ///
    /// Panics if the stack already holds one entry per slot (only possible after repeated frees
    /// of the same slot) or if `index` is not a valid slot index.
    pub(crate) fn push(&mut self, index: usize) {
        assert!(
            !self.is_full(),
            "free list of capacity {} is already full - a slot has been freed more than once",
            self.capacity()
        );

        assert!(
            index < self.capacity(),
            "slot index {index} out of bounds for free list of capacity {}",
            self.capacity()
        );

        let top = self.top;

        match &mut self.storage {
            IndexStorage::U8(entries) => store(entries, top, index),
            IndexStorage::U16(entries) => store(entries, top, index),
            IndexStorage::U32(entries) => store(entries, top, index),
        }

        // Cannot overflow because we asserted above that top is below capacity.
        self.top = top.wrapping_add(1);
    }

    /// Pops the most recently pushed slot index, clearing the entry it occupied.
    #[must_use]
    pub(crate) fn pop(&mut self) -> Option<usize> {
        let top = self.top.checked_sub(1)?;

        let index = match &mut self.storage {
            IndexStorage::U8(entries) => take(entries, top),
            IndexStorage::U16(entries) => take(entries, top),
            IndexStorage::U32(entries) => take(entries, top),
        };

        self.top = top;

        Some(index)
    }
}

fn store<I>(entries: &mut [I], position: usize, index: usize)
where
    I: TryFrom<usize>,
    I::Error: Debug,
{
    let entry = entries
        .get_mut(position)
        .expect("stack pointer is kept below the free list capacity");

    *entry = I::try_from(index).expect("index width is chosen so that every slot index fits");
}

fn take<I>(entries: &mut [I], position: usize) -> usize
where
    I: Copy + Default + Into<u32>,
{
    let entry = entries
        .get_mut(position)
        .expect("stack pointer is kept below the free list capacity");

    let index: u32 = (*entry).into();
    *entry = I::default();

    usize::try_from(index).expect("slot indices never exceed the address space")
}

use std::any::type_name;
use std::fmt;
use std::num::NonZero;
use std::ops::Range;

use new_zealand::nz;
use tracing::{debug, trace};

use crate::{Error, FreeList, FreePolicy, IndexWidth, LiveSlots, Result, SlotPoolBuilder};

/// The largest buffer a [`SlotPool`] will allocate, in bytes (2 MiB).
pub const MAX_POOL_SIZE: NonZero<usize> = nz!(2_097_152);

/// A fixed-size slot allocator over one contiguous, pre-sized byte buffer.
///
/// The pool splits its buffer into equal-length slots and hands out the byte offset of a
/// vacant slot on every allocation. Released offsets go onto a LIFO free list and are handed
/// out again before any never-used slot, so the most recently freed slot is always reused first.
/// The pool never grows: once every slot is live, allocation fails with
/// [`Error::PoolExhausted`] until something is freed.
///
/// The pool only tracks offsets. What the bytes of a slot mean is up to the caller, who
/// interprets them through the materializer passed to [`allocate()`](Self::allocate), for
/// example by wrapping them in a [`SlotView`][crate::SlotView].
///
/// # Memory overhead
///
/// Besides the buffer itself, the pool keeps one free-list entry per slot. Each entry is as
/// narrow as the slot count allows (see [`IndexWidth`]). Allocating and freeing never touches
/// the global allocator.
///
/// # Examples
///
/// ```rust
/// use new_zealand::nz;
/// use slot_pool::SlotPool;
///
/// let mut pool = SlotPool::new(nz!(8), Some(nz!(1000))).unwrap();
///
/// let a = pool.allocate_offset().unwrap();
/// let b = pool.allocate_offset().unwrap();
/// let c = pool.allocate_offset().unwrap();
/// assert_eq!((a, b, c), (0, 8, 16));
///
/// // The most recently freed slot is the next one handed out.
/// pool.free(b);
/// assert_eq!(pool.allocate_offset().unwrap(), 8);
/// ```
///
/// # Thread safety
///
/// The pool is thread-mobile ([`Send`]) and can be moved between threads. It has no internal
/// synchronization, so sharing it for mutation requires wrapping it in a lock such as
/// [`std::sync::Mutex`], or keeping one pool per thread.
pub struct SlotPool {
    /// Owned backing storage, zero-initialized at construction and never resized.
    buffer: Box<[u8]>,

    /// Length of every slot in bytes.
    item_length: NonZero<usize>,

    /// Number of slots in the buffer. The buffer length is exactly this times the item length.
    slot_count: NonZero<usize>,

    /// Stack of slot indices that were freed and may be handed out again.
    free_list: FreeList,

    /// Byte offset of the first slot that has never been handed out. Everything at or beyond
    /// this offset is untouched by callers.
    bump_cursor: usize,

    free_policy: FreePolicy,

    /// Present only with [`FreePolicy::Checked`].
    live: Option<LiveSlots>,
}

impl SlotPool {
    /// Creates a builder for configuring and constructing a [`SlotPool`].
    ///
    /// You must specify an item length using either `.item_length()` or
    /// `.item_length_of::<T>()` before calling `.build()`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use new_zealand::nz;
    /// use slot_pool::SlotPool;
    ///
    /// let pool = SlotPool::builder()
    ///     .item_length(nz!(32))
    ///     .item_count(nz!(64))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(pool.capacity(), 64);
    /// assert!(pool.is_empty());
    /// ```
    #[inline]
    pub fn builder() -> SlotPoolBuilder {
        SlotPoolBuilder::new()
    }

    /// Creates a pool of `item_count` slots of `item_length` bytes each.
    ///
    /// Without an item count, the pool holds as many slots as fit into [`MAX_POOL_SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if `item_length * item_count` exceeds
    /// [`MAX_POOL_SIZE`], or if no item count is given and a single item is larger than that.
    ///
    /// # Example
    ///
    /// ```rust
    /// use new_zealand::nz;
    /// use slot_pool::{MAX_POOL_SIZE, SlotPool};
    ///
    /// let pool = SlotPool::new(nz!(10), Some(nz!(10))).unwrap();
    /// assert_eq!(pool.byte_length(), 100);
    ///
    /// // 2^21 is not a multiple of 3, so the last partial slot is left out.
    /// let pool = SlotPool::new(nz!(3), None).unwrap();
    /// assert_eq!(pool.byte_length(), MAX_POOL_SIZE.get() - 2);
    /// ```
    pub fn new(item_length: NonZero<usize>, item_count: Option<NonZero<usize>>) -> Result<Self> {
        Self::new_inner(item_length, item_count, FreePolicy::default())
    }

    pub(crate) fn new_inner(
        item_length: NonZero<usize>,
        item_count: Option<NonZero<usize>>,
        free_policy: FreePolicy,
    ) -> Result<Self> {
        let byte_length = match item_count {
            Some(item_count) => exact_byte_length(item_length, item_count)?,
            None => largest_byte_length(item_length),
        };

        // Exact, because byte length is a whole number of items.
        let slot_count = NonZero::new(byte_length / item_length).ok_or(Error::CapacityExceeded {
            item_length: item_length.get(),
            item_count: 1,
            max_bytes: MAX_POOL_SIZE.get(),
        })?;

        let free_list = FreeList::new(slot_count);

        let live = match free_policy {
            FreePolicy::Unchecked => None,
            FreePolicy::Checked => Some(LiveSlots::new(slot_count)),
        };

        debug!(
            item_length = item_length.get(),
            byte_length,
            slot_count = slot_count.get(),
            index_width = ?free_list.width(),
            ?free_policy,
            "slot pool created"
        );

        Ok(Self {
            buffer: vec![0; byte_length].into_boxed_slice(),
            item_length,
            slot_count,
            free_list,
            bump_cursor: 0,
            free_policy,
            live,
        })
    }

    /// Length of every slot, in bytes.
    #[must_use]
    #[inline]
    pub fn item_length(&self) -> usize {
        self.item_length.get()
    }

    /// Total size of the pool buffer, in bytes.
    ///
    /// This is always a multiple of [`item_length()`](Self::item_length) and never more than
    /// [`MAX_POOL_SIZE`].
    #[must_use]
    #[inline]
    pub fn byte_length(&self) -> usize {
        self.buffer.len()
    }

    /// The entire backing buffer of the pool, covering all slots whether live or not.
    #[must_use]
    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The entire backing buffer of the pool, mutably.
    ///
    /// The pool keeps no bookkeeping inside the buffer, so writing anywhere in it is harmless
    /// to the pool itself, though it may clobber data another part of the program placed in a
    /// live slot.
    #[must_use]
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// The total number of slots in the pool.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slot_count.get()
    }

    /// The number of slots that are currently live (allocated and not yet freed).
    ///
    /// If offsets were freed twice under [`FreePolicy::Unchecked`], the count can no longer be
    /// trusted; it saturates at zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use new_zealand::nz;
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new(nz!(4), Some(nz!(4))).unwrap();
    /// assert_eq!(pool.len(), 0);
    ///
    /// let offset = pool.allocate_offset().unwrap();
    /// assert_eq!(pool.len(), 1);
    ///
    /// pool.free(offset);
    /// assert_eq!(pool.len(), 0);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.index_of(self.bump_cursor)
            .saturating_sub(self.free_list.len())
    }

    /// Whether no slots are currently live.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the next allocation would fail with [`Error::PoolExhausted`].
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_list.is_empty() && self.bump_cursor >= self.byte_length()
    }

    /// Element width of the free list, chosen at construction from the slot count.
    #[must_use]
    #[inline]
    pub fn index_width(&self) -> IndexWidth {
        self.free_list.width()
    }

    /// The policy governing validation of freed offsets.
    #[must_use]
    #[inline]
    pub fn free_policy(&self) -> FreePolicy {
        self.free_policy
    }

    /// Allocates a slot and passes it to `materialize`, returning whatever that produces.
    ///
    /// The materializer receives the whole pool buffer, the byte offset of the allocated slot
    /// and the slot length, in that order. Its result may borrow from the buffer, in which
    /// case the pool stays borrowed for as long as the result is alive. The pool does not
    /// remember what the materializer produced, only that the offset is now in use.
    ///
    /// A previously freed slot is reused if there is one (the most recently freed first);
    /// otherwise the next never-used slot is taken. A reused slot still holds whatever bytes
    /// were last written to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolExhausted`] if every slot is live. The materializer is not called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use new_zealand::nz;
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new(nz!(8), Some(nz!(1000))).unwrap();
    ///
    /// // Results that do not borrow the buffer leave the pool free for further use.
    /// let first = pool.allocate(|_, offset, _| offset).unwrap();
    /// assert_eq!(first, 0);
    ///
    /// // Results may also borrow their slot directly.
    /// let slot = pool
    ///     .allocate(|buffer, offset, len| &mut buffer[offset..offset + len])
    ///     .unwrap();
    /// slot.copy_from_slice(&42_u64.to_le_bytes());
    ///
    /// assert_eq!(pool.slot(8), &42_u64.to_le_bytes());
    /// ```
    pub fn allocate<'p, T>(
        &'p mut self,
        materialize: impl FnOnce(&'p mut [u8], usize, usize) -> T,
    ) -> Result<T> {
        let offset = self.take_slot()?;

        Ok(materialize(&mut *self.buffer, offset, self.item_length.get()))
    }

    /// Allocates a slot and returns its byte offset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolExhausted`] if every slot is live.
    #[inline]
    pub fn allocate_offset(&mut self) -> Result<usize> {
        self.allocate(|_, offset, _| offset)
    }

    /// Returns the slot starting at `offset` to the pool for reuse.
    ///
    /// The caller must only pass offsets previously returned by [`allocate()`](Self::allocate)
    /// and not freed since. With the default [`FreePolicy::Unchecked`] this is not verified:
    /// freeing an offset twice puts its slot on the free list twice, after which two
    /// allocations will share it, and an offset that is not slot-aligned frees the slot it
    /// falls into. With [`FreePolicy::Checked`] such mistakes are detected and cause a panic.
    ///
    /// # Panics
    ///
    /// Panics if `offset` lies outside the pool buffer, or if the free list is already full.
    ///
    /// With [`FreePolicy::Checked`], also panics if `offset` is not slot-aligned, has never
    /// been allocated or is already free. See [`try_free()`](Self::try_free) for a variant
    /// that returns an error instead.
    pub fn free(&mut self, offset: usize) {
        let index = match self.free_policy {
            FreePolicy::Unchecked => {
                assert!(
                    offset < self.byte_length(),
                    "offset {offset} out of bounds for pool of {} bytes",
                    self.byte_length()
                );

                self.index_of(offset)
            }
            FreePolicy::Checked => self
                .validate_free(offset)
                .unwrap_or_else(|error| panic!("{error}")),
        };

        self.release(index);
    }

    /// Returns the slot starting at `offset` to the pool for reuse, after validating it.
    ///
    /// The offset must lie within the pool, be slot-aligned and belong to a slot that has been
    /// allocated before. With [`FreePolicy::Checked`] the slot must also be live; with
    /// [`FreePolicy::Unchecked`] a double free is only detected once every allocated slot is
    /// already on the free list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOffset`] if any check fails. The pool is unchanged in that case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use new_zealand::nz;
    /// use slot_pool::{Error, SlotPool};
    ///
    /// let mut pool = SlotPool::new(nz!(8), Some(nz!(10))).unwrap();
    /// let offset = pool.allocate_offset().unwrap();
    ///
    /// assert!(matches!(pool.try_free(3), Err(Error::InvalidOffset { .. })));
    /// assert!(pool.try_free(offset).is_ok());
    /// ```
    pub fn try_free(&mut self, offset: usize) -> Result<()> {
        let index = self.validate_free(offset)?;
        self.release(index);
        Ok(())
    }

    /// The bytes of the slot starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is outside the pool or not slot-aligned.
    #[must_use]
    pub fn slot(&self, offset: usize) -> &[u8] {
        let range = self.slot_range(offset);

        self.buffer
            .get(range)
            .expect("slot_range() only returns ranges inside the buffer")
    }

    /// The bytes of the slot starting at `offset`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is outside the pool or not slot-aligned.
    #[must_use]
    pub fn slot_mut(&mut self, offset: usize) -> &mut [u8] {
        let range = self.slot_range(offset);

        self.buffer
            .get_mut(range)
            .expect("slot_range() only returns ranges inside the buffer")
    }

    fn take_slot(&mut self) -> Result<usize> {
        let offset = match self.free_list.pop() {
            Some(index) => {
                let offset = self.offset_of(index);
                trace!(offset, index, "reusing freed slot");
                offset
            }
            None if self.bump_cursor < self.byte_length() => {
                let offset = self.bump_cursor;

                // Cannot overflow because the cursor stays within the buffer, which is at most
                // MAX_POOL_SIZE bytes long, and the buffer is a whole number of slots.
                self.bump_cursor = offset.wrapping_add(self.item_length.get());

                trace!(offset, "taking never-used slot");
                offset
            }
            None => {
                debug!(capacity = self.slot_count.get(), "slot pool exhausted");

                return Err(Error::PoolExhausted {
                    capacity: self.slot_count.get(),
                });
            }
        };

        let index = self.index_of(offset);
        if let Some(live) = &mut self.live {
            live.mark_live(index);
        }

        Ok(offset)
    }

    fn release(&mut self, index: usize) {
        if let Some(live) = &mut self.live {
            live.mark_free(index);
        }

        self.free_list.push(index);

        trace!(index, free_slots = self.free_list.len(), "slot freed");
    }

    /// Checks that `offset` identifies a slot that can be freed and returns its index.
    fn validate_free(&self, offset: usize) -> Result<usize> {
        let invalid = |problem| Error::InvalidOffset { offset, problem };

        if offset >= self.byte_length() {
            return Err(invalid("offset is outside the pool"));
        }

        if offset.wrapping_rem(self.item_length.get()) != 0 {
            return Err(invalid("offset is not aligned to a slot boundary"));
        }

        if offset >= self.bump_cursor {
            return Err(invalid("offset has never been allocated"));
        }

        let index = self.index_of(offset);

        let already_free = match &self.live {
            Some(live) => !live.is_live(index),
            // Without tracking we only know for sure once every allocated slot is on the list.
            None => self.free_list.len() >= self.index_of(self.bump_cursor),
        };

        if already_free {
            return Err(invalid("slot is already free"));
        }

        Ok(index)
    }

    fn slot_range(&self, offset: usize) -> Range<usize> {
        assert!(
            offset < self.byte_length(),
            "offset {offset} out of bounds for pool of {} bytes",
            self.byte_length()
        );

        assert!(
            offset.wrapping_rem(self.item_length.get()) == 0,
            "offset {offset} is not aligned to the slot length of {} bytes",
            self.item_length
        );

        // Cannot overflow because an aligned in-bounds offset starts a whole slot in the buffer.
        offset..offset.wrapping_add(self.item_length.get())
    }

    fn offset_of(&self, index: usize) -> usize {
        // Cannot overflow because every stored index belongs to a slot inside the buffer.
        index.wrapping_mul(self.item_length.get())
    }

    /// Offsets inside a slot map to the index of that slot.
    fn index_of(&self, offset: usize) -> usize {
        offset / self.item_length
    }
}

impl fmt::Debug for SlotPool {
    #[cfg_attr(test, mutants::skip)] // Debug output is not part of the contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("item_length", &self.item_length)
            .field("byte_length", &self.buffer.len())
            .field("bump_cursor", &self.bump_cursor)
            .field("free_slots", &self.free_list.len())
            .field("index_width", &self.free_list.width())
            .field("free_policy", &self.free_policy)
            .finish_non_exhaustive()
    }
}

fn exact_byte_length(item_length: NonZero<usize>, item_count: NonZero<usize>) -> Result<usize> {
    item_length
        .get()
        .checked_mul(item_count.get())
        .filter(|&byte_length| byte_length <= MAX_POOL_SIZE.get())
        .ok_or(Error::CapacityExceeded {
            item_length: item_length.get(),
            item_count: item_count.get(),
            max_bytes: MAX_POOL_SIZE.get(),
        })
}

fn largest_byte_length(item_length: NonZero<usize>) -> usize {
    let max = MAX_POOL_SIZE.get();

    // Cannot underflow because the remainder is never larger than the dividend.
    max.wrapping_sub(max % item_length)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    reason = "test code slices known-good ranges of small buffers"
)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::SlotView;

    assert_impl_all!(SlotPool: Send, Sync, fmt::Debug);

    #[test]
    fn smoke_test() {
        let mut pool = SlotPool::new(nz!(8), Some(nz!(1000))).unwrap();

        assert_eq!(pool.len(), 0);
        assert!(pool.is_empty());
        assert!(!pool.is_full());

        let a = pool.allocate_offset().unwrap();
        let b = pool.allocate_offset().unwrap();
        let c = pool.allocate_offset().unwrap();

        assert_eq!((a, b, c), (0, 8, 16));
        assert_eq!(pool.len(), 3);
        assert!(!pool.is_empty());

        pool.free(b);
        assert_eq!(pool.len(), 2);

        let d = pool.allocate_offset().unwrap();
        assert_eq!(d, 8);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn max_pool_size_is_two_mebibytes() {
        assert_eq!(MAX_POOL_SIZE.get(), 1 << 21);
    }

    #[test]
    fn accessors_reflect_construction() {
        let pool = SlotPool::new(nz!(10), Some(nz!(10))).unwrap();

        assert_eq!(pool.item_length(), 10);
        assert_eq!(pool.byte_length(), 100);
        assert_eq!(pool.buffer().len(), 100);
        assert_eq!(pool.capacity(), 10);
        assert_eq!(pool.index_width(), IndexWidth::U8);
        assert_eq!(pool.free_policy(), FreePolicy::Unchecked);
    }

    #[test]
    fn buffer_starts_zeroed() {
        let pool = SlotPool::new(nz!(16), Some(nz!(16))).unwrap();

        assert!(pool.buffer().iter().all(|&byte| byte == 0));
    }

    #[test]
    fn omitted_count_uses_largest_multiple() {
        let pool = SlotPool::new(nz!(16), None).unwrap();
        assert_eq!(pool.byte_length(), MAX_POOL_SIZE.get());
        assert_eq!(pool.capacity(), 131_072);

        let pool = SlotPool::new(nz!(1000), None).unwrap();
        assert_eq!(pool.byte_length(), 2_097_000);
        assert_eq!(pool.capacity(), 2_097);
    }

    #[test]
    fn omitted_count_with_item_larger_than_max_fails() {
        let item_length = NonZero::new(MAX_POOL_SIZE.get() + 1).unwrap();

        let result = SlotPool::new(item_length, None);

        assert!(matches!(result, Err(Error::CapacityExceeded { .. })));
    }

    #[test]
    fn single_item_of_max_size_fits() {
        let mut pool = SlotPool::new(MAX_POOL_SIZE, None).unwrap();

        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.allocate_offset().unwrap(), 0);
        assert!(pool.is_full());
    }

    #[test]
    fn overflowing_request_is_capacity_exceeded() {
        let result = SlotPool::new(NonZero::new(usize::MAX).unwrap(), Some(nz!(2)));

        assert_eq!(
            result.unwrap_err(),
            Error::CapacityExceeded {
                item_length: usize::MAX,
                item_count: 2,
                max_bytes: MAX_POOL_SIZE.get(),
            }
        );
    }

    #[test]
    fn materializer_receives_buffer_offset_and_length() {
        let mut pool = SlotPool::new(nz!(4), Some(nz!(4))).unwrap();
        _ = pool.allocate_offset().unwrap();

        let (buffer_len, offset, len) = pool
            .allocate(|buffer, offset, len| (buffer.len(), offset, len))
            .unwrap();

        assert_eq!(buffer_len, 16);
        assert_eq!(offset, 4);
        assert_eq!(len, 4);
    }

    #[test]
    fn materializer_is_not_called_when_exhausted() {
        let mut pool = SlotPool::new(nz!(4), Some(nz!(1))).unwrap();
        _ = pool.allocate_offset().unwrap();

        let mut called = false;
        let result = pool.allocate(|_, offset, _| {
            called = true;
            offset
        });

        assert_eq!(result, Err(Error::PoolExhausted { capacity: 1 }));
        assert!(!called);
    }

    #[test]
    fn writes_through_materialized_slot_are_visible() {
        let mut pool = SlotPool::new(nz!(8), Some(nz!(4))).unwrap();

        let slot = pool
            .allocate(|buffer, offset, len| &mut buffer[offset..offset + len])
            .unwrap();
        slot.fill(0xAA);

        assert_eq!(pool.slot(0), &[0xAA; 8]);
        assert_eq!(pool.slot(8), &[0; 8]);
    }

    #[test]
    fn slot_view_materializer() {
        let mut pool = SlotPool::new(nz!(8), Some(nz!(4))).unwrap();
        _ = pool.allocate_offset().unwrap();

        let mut view = pool.allocate(SlotView::new).unwrap();
        view.write(0, 7_u32);
        view.write(1, 9_u32);
        let offset = view.offset();

        assert_eq!(offset, 8);
        assert_eq!(&pool.slot(offset)[..4], &7_u32.to_ne_bytes());
    }

    #[test]
    fn reused_slot_keeps_previous_bytes() {
        let mut pool = SlotPool::new(nz!(2), Some(nz!(2))).unwrap();

        let offset = pool.allocate_offset().unwrap();
        pool.slot_mut(offset).copy_from_slice(&[1, 2]);
        pool.free(offset);

        let reused = pool.allocate_offset().unwrap();
        assert_eq!(reused, offset);
        assert_eq!(pool.slot(reused), &[1, 2]);
    }

    #[test]
    fn offset_zero_round_trips_through_free_list() {
        let mut pool = SlotPool::new(nz!(8), Some(nz!(3))).unwrap();

        let zero = pool.allocate_offset().unwrap();
        let eight = pool.allocate_offset().unwrap();
        assert_eq!(zero, 0);

        pool.free(zero);
        pool.free(eight);

        assert_eq!(pool.allocate_offset().unwrap(), 8);
        assert_eq!(pool.allocate_offset().unwrap(), 0);
        assert_eq!(pool.allocate_offset().unwrap(), 16);
        assert!(pool.is_full());
    }

    #[test]
    fn single_byte_items_use_every_byte() {
        let mut pool = SlotPool::new(nz!(1), Some(nz!(3))).unwrap();

        assert_eq!(pool.allocate_offset().unwrap(), 0);
        assert_eq!(pool.allocate_offset().unwrap(), 1);
        assert_eq!(pool.allocate_offset().unwrap(), 2);
        assert_eq!(
            pool.allocate_offset(),
            Err(Error::PoolExhausted { capacity: 3 })
        );
    }

    #[test]
    fn is_full_tracks_free_list_and_cursor() {
        let mut pool = SlotPool::new(nz!(4), Some(nz!(2))).unwrap();

        let a = pool.allocate_offset().unwrap();
        assert!(!pool.is_full());
        _ = pool.allocate_offset().unwrap();
        assert!(pool.is_full());

        pool.free(a);
        assert!(!pool.is_full());
    }

    #[test]
    fn unchecked_double_free_aliases_slot() {
        let mut pool = SlotPool::new(nz!(4), Some(nz!(4))).unwrap();

        let offset = pool.allocate_offset().unwrap();
        pool.free(offset);
        pool.free(offset);

        assert_eq!(pool.allocate_offset().unwrap(), offset);
        assert_eq!(pool.allocate_offset().unwrap(), offset);
    }

    #[test]
    fn unchecked_free_of_unaligned_offset_frees_containing_slot() {
        let mut pool = SlotPool::new(nz!(4), Some(nz!(4))).unwrap();

        _ = pool.allocate_offset().unwrap();
        _ = pool.allocate_offset().unwrap();
        pool.free(6);

        assert_eq!(pool.allocate_offset().unwrap(), 4);
    }

    #[test]
    #[should_panic]
    fn unchecked_free_out_of_bounds_panics() {
        let mut pool = SlotPool::new(nz!(4), Some(nz!(4))).unwrap();

        pool.free(16);
    }

    #[test]
    #[should_panic]
    fn unchecked_free_beyond_capacity_panics() {
        let mut pool = SlotPool::new(nz!(4), Some(nz!(2))).unwrap();

        let offset = pool.allocate_offset().unwrap();
        pool.free(offset);
        pool.free(offset);
        pool.free(offset);
    }

    #[test]
    fn try_free_rejects_bad_offsets() {
        let mut pool = SlotPool::new(nz!(8), Some(nz!(4))).unwrap();
        let offset = pool.allocate_offset().unwrap();

        let problem = |result: Result<()>| match result {
            Err(Error::InvalidOffset { problem, .. }) => problem,
            other => panic!("expected InvalidOffset, got {other:?}"),
        };

        assert_eq!(problem(pool.try_free(32)), "offset is outside the pool");
        assert_eq!(problem(pool.try_free(4)), "offset is not aligned to a slot boundary");
        assert_eq!(problem(pool.try_free(8)), "offset has never been allocated");

        pool.try_free(offset).unwrap();
        assert_eq!(problem(pool.try_free(offset)), "slot is already free");
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn checked_free_detects_double_free_with_other_live_slots() {
        let mut pool = SlotPool::builder()
            .item_length(nz!(8))
            .item_count(nz!(4))
            .free_policy(FreePolicy::Checked)
            .build()
            .unwrap();

        let a = pool.allocate_offset().unwrap();
        let _b = pool.allocate_offset().unwrap();

        pool.try_free(a).unwrap();

        assert_eq!(
            pool.try_free(a),
            Err(Error::InvalidOffset {
                offset: a,
                problem: "slot is already free",
            })
        );

        // Reallocating makes it live again.
        assert_eq!(pool.allocate_offset().unwrap(), a);
        pool.try_free(a).unwrap();
    }

    #[test]
    #[should_panic]
    fn checked_free_panics_on_double_free() {
        let mut pool = SlotPool::builder()
            .item_length(nz!(8))
            .item_count(nz!(4))
            .free_policy(FreePolicy::Checked)
            .build()
            .unwrap();

        let a = pool.allocate_offset().unwrap();
        let _b = pool.allocate_offset().unwrap();

        pool.free(a);
        pool.free(a);
    }

    #[test]
    #[should_panic]
    fn checked_free_panics_on_unaligned_offset() {
        let mut pool = SlotPool::builder()
            .item_length(nz!(8))
            .item_count(nz!(4))
            .free_policy(FreePolicy::Checked)
            .build()
            .unwrap();

        _ = pool.allocate_offset().unwrap();
        _ = pool.allocate_offset().unwrap();

        pool.free(12);
    }

    #[test]
    #[should_panic]
    fn slot_with_unaligned_offset_panics() {
        let pool = SlotPool::new(nz!(8), Some(nz!(4))).unwrap();

        _ = pool.slot(3);
    }

    #[test]
    #[should_panic]
    fn slot_out_of_bounds_panics() {
        let pool = SlotPool::new(nz!(8), Some(nz!(4))).unwrap();

        _ = pool.slot(32);
    }

    #[test]
    fn buffer_mut_exposes_all_slots() {
        let mut pool = SlotPool::new(nz!(2), Some(nz!(3))).unwrap();

        pool.buffer_mut().copy_from_slice(&[1, 2, 3, 4, 5, 6]);

        assert_eq!(pool.slot(2), &[3, 4]);
    }

    #[test]
    fn debug_output_summarizes_state() {
        let mut pool = SlotPool::new(nz!(8), Some(nz!(4))).unwrap();
        _ = pool.allocate_offset().unwrap();

        let debug_output = format!("{pool:?}");

        assert!(debug_output.contains("SlotPool"));
        assert!(debug_output.contains("bump_cursor: 8"));
        assert!(debug_output.contains("free_slots: 0"));
    }

    #[test]
    fn multithreaded_via_mutex() {
        let pool = Arc::new(Mutex::new(SlotPool::new(nz!(8), Some(nz!(3))).unwrap()));

        let b;

        {
            let mut pool = pool.lock().unwrap();
            _ = pool.allocate_offset().unwrap();
            b = pool.allocate_offset().unwrap();
            _ = pool.allocate_offset().unwrap();
        }

        let pool_clone = Arc::clone(&pool);
        let handle = thread::spawn(move || {
            let mut pool = pool_clone.lock().unwrap();

            pool.free(b);
            assert_eq!(pool.allocate_offset().unwrap(), b);
        });

        handle.join().unwrap();

        assert!(pool.lock().unwrap().is_full());
    }
}

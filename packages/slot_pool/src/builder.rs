use std::cell::Cell;
use std::marker::PhantomData;
use std::num::NonZero;

use crate::{FreePolicy, Result, SlotPool};

/// Builder for creating an instance of [`SlotPool`].
///
/// [`SlotPool`] requires the slot length to be specified at construction time.
/// Use either `.item_length()` to provide a length in bytes or `.item_length_of::<T>()` to
/// use the size of the provided type.
///
/// The slot length is mandatory, whereas other settings are optional. Without an item count,
/// the pool is made as large as [`MAX_POOL_SIZE`][crate::MAX_POOL_SIZE] allows.
///
/// # Examples
///
/// Using a specific item length and count:
///
/// ```
/// use new_zealand::nz;
/// use slot_pool::SlotPool;
///
/// let pool = SlotPool::builder()
///     .item_length(nz!(16))
///     .item_count(nz!(1000))
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.byte_length(), 16_000);
/// ```
///
/// Using type-based item length:
///
/// ```
/// use slot_pool::SlotPool;
///
/// let pool = SlotPool::builder().item_length_of::<[f32; 4]>().build().unwrap();
///
/// assert_eq!(pool.item_length(), 16);
/// ```
///
/// # Thread safety
///
/// The builder is thread-mobile ([`Send`]) and can be safely transferred between threads,
/// allowing pool configuration to happen on different threads than where the pool is used.
/// However, it is not thread-safe ([`Sync`]) as it contains mutable configuration state.
#[derive(Debug)]
#[must_use]
pub struct SlotPoolBuilder {
    item_length: Option<NonZero<usize>>,
    item_count: Option<NonZero<usize>>,
    free_policy: FreePolicy,

    // Prevents Sync while allowing Send - builders are thread-mobile but not thread-safe
    _not_sync: PhantomData<Cell<()>>,
}

impl SlotPoolBuilder {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            item_length: None,
            item_count: None,
            free_policy: FreePolicy::default(),
            _not_sync: PhantomData,
        }
    }

    /// Sets the length in bytes of each slot in the pool.
    ///
    /// # Examples
    ///
    /// ```
    /// use new_zealand::nz;
    /// use slot_pool::SlotPool;
    ///
    /// let pool = SlotPool::builder().item_length(nz!(12)).build().unwrap();
    ///
    /// assert_eq!(pool.item_length(), 12);
    /// ```
    #[inline]
    pub fn item_length(mut self, item_length: NonZero<usize>) -> Self {
        self.item_length = Some(item_length);
        self
    }

    /// Sets the length of each slot in the pool to the size of `T`.
    ///
    /// This is a convenience method for pools whose slots each hold one value of a known type.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let pool = SlotPool::builder().item_length_of::<u64>().build().unwrap();
    ///
    /// assert_eq!(pool.item_length(), 8);
    /// ```
    #[inline]
    pub fn item_length_of<T>(mut self) -> Self {
        let item_length =
            NonZero::new(size_of::<T>()).expect("SlotPool must have non-zero item length");
        self.item_length = Some(item_length);
        self
    }

    /// Sets the exact number of slots in the pool.
    ///
    /// If not set, the pool holds as many slots as fit into
    /// [`MAX_POOL_SIZE`][crate::MAX_POOL_SIZE] bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use new_zealand::nz;
    /// use slot_pool::SlotPool;
    ///
    /// let pool = SlotPool::builder()
    ///     .item_length(nz!(8))
    ///     .item_count(nz!(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(pool.capacity(), 10);
    /// ```
    #[inline]
    pub fn item_count(mut self, item_count: NonZero<usize>) -> Self {
        self.item_count = Some(item_count);
        self
    }

    /// Sets the [free policy][FreePolicy] for the pool. This governs whether offsets passed
    /// to [`SlotPool::free()`] are validated.
    ///
    /// # Examples
    ///
    /// ```
    /// use new_zealand::nz;
    /// use slot_pool::{FreePolicy, SlotPool};
    ///
    /// let pool = SlotPool::builder()
    ///     .item_length(nz!(4))
    ///     .free_policy(FreePolicy::Checked)
    ///     .build()
    ///     .unwrap();
    /// ```
    #[inline]
    pub fn free_policy(mut self, policy: FreePolicy) -> Self {
        self.free_policy = policy;
        self
    }

    /// Builds the slot pool with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`][crate::Error::CapacityExceeded] if the requested
    /// slots do not fit into [`MAX_POOL_SIZE`][crate::MAX_POOL_SIZE] bytes.
    ///
    /// # Panics
    ///
    /// Panics if no item length has been set using either [`item_length`](Self::item_length)
    /// or [`item_length_of`](Self::item_length_of).
    ///
    /// # Examples
    ///
    /// ```
    /// use new_zealand::nz;
    /// use slot_pool::{Error, SlotPool};
    ///
    /// let result = SlotPool::builder()
    ///     .item_length(nz!(1024))
    ///     .item_count(nz!(4096))
    ///     .build();
    ///
    /// assert!(matches!(result, Err(Error::CapacityExceeded { .. })));
    /// ```
    #[inline]
    pub fn build(self) -> Result<SlotPool> {
        let item_length = self.item_length.expect(
            "Item length must be set using .item_length() or .item_length_of::<T>() before calling .build()",
        );

        SlotPool::new_inner(item_length, self.item_count, self.free_policy)
    }
}

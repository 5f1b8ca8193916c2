/// Determines how much validation [`SlotPool::free()`][crate::SlotPool::free] performs.
///
/// By default, the pool trusts the caller to only free offsets that it previously handed out
/// and has not already taken back.
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use slot_pool::{FreePolicy, SlotPool};
///
/// // The free policy is set at pool creation time.
/// let pool = SlotPool::builder()
///     .item_length(nz!(8))
///     .item_count(nz!(100))
///     .free_policy(FreePolicy::Checked)
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.free_policy(), FreePolicy::Checked);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum FreePolicy {
    /// Freed offsets are pushed onto the free list without checking that they are slot-aligned
    /// or currently live. This is the default.
    ///
    /// Freeing the same offset twice places its slot on the free list twice, after which two
    /// later allocations receive the same slot. Offsets outside the buffer still cause a panic.
    #[default]
    Unchecked,

    /// The pool tracks which slots are live and panics if asked to free an offset that is
    /// out of range, not slot-aligned, never allocated or already free.
    ///
    /// This costs one bit of extra memory per slot.
    Checked,
}

use std::fmt;
use std::ops::Range;

/// A mutable window onto one slot of a [`SlotPool`][crate::SlotPool] buffer.
///
/// [`SlotView::new`] takes exactly the arguments that [`SlotPool::allocate()`] hands to its
/// materializer, so a view can be allocated directly with `pool.allocate(SlotView::new)`.
/// The view reads and writes numeric elements in native byte order, treating the slot as an
/// array of whichever [`Scalar`] type the caller asks for.
///
/// The view borrows the pool's buffer. It stays valid for as long as that borrow lasts, but
/// it says nothing about whether the slot is still allocated: once the slot's offset has been
/// freed, a later allocation may hand the same bytes to someone else.
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use slot_pool::{SlotPool, SlotView};
///
/// let mut pool = SlotPool::new(nz!(8), Some(nz!(100))).unwrap();
///
/// let mut view = pool.allocate(SlotView::new).unwrap();
/// assert_eq!(view.offset(), 0);
/// assert_eq!(view.element_count::<f32>(), 2);
///
/// view.write(1, 2.5_f32);
/// assert_eq!(view.read::<f32>(1), 2.5);
///
/// let offset = view.offset();
/// pool.free(offset);
/// ```
///
/// [`SlotPool::allocate()`]: crate::SlotPool::allocate
pub struct SlotView<'a> {
    offset: usize,
    bytes: &'a mut [u8],
}

impl<'a> SlotView<'a> {
    /// Creates a view of `len` bytes starting at `offset` in `buffer`.
    ///
    /// # Panics
    ///
    /// Panics if the range does not lie within `buffer`.
    #[must_use]
    pub fn new(buffer: &'a mut [u8], offset: usize, len: usize) -> Self {
        let buffer_len = buffer.len();

        let range = offset
            .checked_add(len)
            .map(|end| offset..end)
            .filter(|range| range.end <= buffer_len)
            .unwrap_or_else(|| {
                panic!("slot of {len} bytes at offset {offset} does not fit in a buffer of {buffer_len} bytes")
            });

        let bytes = buffer
            .get_mut(range)
            .expect("range was checked against the buffer length above");

        Self { offset, bytes }
    }

    /// Byte offset of the slot within the pool buffer.
    ///
    /// Pass this to [`SlotPool::free()`][crate::SlotPool::free] to release the slot.
    #[must_use]
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the slot in bytes.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the slot has no bytes. Slots from a pool are never empty.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The raw bytes of the slot.
    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &*self.bytes
    }

    /// The raw bytes of the slot, mutably.
    #[must_use]
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.bytes
    }

    /// Number of whole `T` elements that fit into the slot.
    #[must_use]
    #[inline]
    pub fn element_count<T: Scalar>(&self) -> usize {
        #[expect(
            clippy::integer_division,
            reason = "a trailing partial element is not addressable"
        )]
        let count = self.bytes.len() / size_of::<T>();
        count
    }

    /// Reads the element at `index`, counting in units of `T`.
    ///
    /// # Panics
    ///
    /// Panics if the element does not lie entirely within the slot.
    #[must_use]
    pub fn read<T: Scalar>(&self, index: usize) -> T {
        let range = self.element_range::<T>(index);

        T::from_ne_slice(
            self.bytes
                .get(range)
                .expect("element_range() only returns ranges inside the slot"),
        )
    }

    /// Writes `value` to the element at `index`, counting in units of `T`.
    ///
    /// # Panics
    ///
    /// Panics if the element does not lie entirely within the slot.
    pub fn write<T: Scalar>(&mut self, index: usize, value: T) {
        let range = self.element_range::<T>(index);

        value.write_ne_slice(
            self.bytes
                .get_mut(range)
                .expect("element_range() only returns ranges inside the slot"),
        );
    }

    fn element_range<T: Scalar>(&self, index: usize) -> Range<usize> {
        let count = self.element_count::<T>();

        assert!(
            index < count,
            "element {index} out of bounds for a slot holding {count} elements of {} bytes",
            size_of::<T>()
        );

        // Cannot overflow because the element lies within the slot, as asserted above.
        let start = index.wrapping_mul(size_of::<T>());
        start..start.wrapping_add(size_of::<T>())
    }
}

impl fmt::Debug for SlotView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotView")
            .field("offset", &self.offset)
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

mod sealed {
    #[expect(
        unnameable_types,
        reason = "supertrait of Scalar that must stay unnameable to keep Scalar sealed"
    )]
    pub trait Sealed {}
}

/// A fixed-width numeric type that a [`SlotView`] can read and write.
///
/// Implemented for all primitive integers of fixed width and for `f32` and `f64`.
/// This trait is sealed and cannot be implemented outside this crate.
pub trait Scalar: Copy + sealed::Sealed {
    #[doc(hidden)]
    fn from_ne_slice(bytes: &[u8]) -> Self;

    #[doc(hidden)]
    fn write_ne_slice(self, bytes: &mut [u8]);
}

macro_rules! impl_scalar {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl Scalar for $t {
                #[inline]
                fn from_ne_slice(bytes: &[u8]) -> Self {
                    Self::from_ne_bytes(
                        bytes
                            .try_into()
                            .expect("caller passes exactly size_of::<Self>() bytes"),
                    )
                }

                #[inline]
                fn write_ne_slice(self, bytes: &mut [u8]) {
                    bytes.copy_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

impl_scalar!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::float_cmp,
    clippy::indexing_slicing,
    reason = "test code compares exact bit patterns and slices fixed-size buffers"
)]
mod tests {
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(SlotView<'static>: Send, Sync, fmt::Debug);
    assert_not_impl_any!(SlotView<'static>: Clone);

    #[test]
    fn covers_requested_range() {
        let mut buffer = [0_u8; 32];

        let view = SlotView::new(&mut buffer, 8, 8);

        assert_eq!(view.offset(), 8);
        assert_eq!(view.len(), 8);
        assert!(!view.is_empty());
    }

    #[test]
    fn writes_land_in_the_right_bytes() {
        let mut buffer = [0_u8; 24];

        {
            let mut view = SlotView::new(&mut buffer, 8, 8);
            view.write(0, u32::MAX);
        }

        assert_eq!(&buffer[..8], &[0; 8]);
        assert_eq!(&buffer[8..12], &[0xFF; 4]);
        assert_eq!(&buffer[12..], &[0; 12]);
    }

    #[test]
    fn reads_back_mixed_types() {
        let mut buffer = [0_u8; 16];
        let mut view = SlotView::new(&mut buffer, 0, 16);

        view.write(0, 1.5_f64);
        view.write(2, -7_i32);
        view.write(14, 0xAB_u8);

        assert_eq!(view.read::<f64>(0), 1.5);
        assert_eq!(view.read::<i32>(2), -7);
        assert_eq!(view.read::<u8>(14), 0xAB);
        assert_eq!(view.read::<u8>(15), 0);
    }

    #[test]
    fn element_count_rounds_down() {
        let mut buffer = [0_u8; 10];
        let view = SlotView::new(&mut buffer, 0, 10);

        assert_eq!(view.element_count::<u8>(), 10);
        assert_eq!(view.element_count::<u32>(), 2);
        assert_eq!(view.element_count::<u128>(), 0);
    }

    #[test]
    fn raw_bytes_are_exposed() {
        let mut buffer = [0_u8; 8];
        let mut view = SlotView::new(&mut buffer, 4, 4);

        view.as_bytes_mut().copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(view.as_bytes(), &[1, 2, 3, 4]);
        assert_eq!(buffer, [0, 0, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    #[should_panic]
    fn read_past_end_panics() {
        let mut buffer = [0_u8; 8];
        let view = SlotView::new(&mut buffer, 0, 8);

        _ = view.read::<u32>(2);
    }

    #[test]
    #[should_panic]
    fn range_outside_buffer_panics() {
        let mut buffer = [0_u8; 8];

        _ = SlotView::new(&mut buffer, 4, 8);
    }

    #[test]
    fn debug_shows_location() {
        let mut buffer = [0_u8; 8];
        let view = SlotView::new(&mut buffer, 4, 4);

        let debug_output = format!("{view:?}");
        assert!(debug_output.contains("offset: 4"));
        assert!(debug_output.contains("len: 4"));
    }
}

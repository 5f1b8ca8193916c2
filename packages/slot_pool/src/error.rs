use thiserror::Error;

/// Errors that can occur when constructing a [`SlotPool`][crate::SlotPool] or
/// allocating and releasing its slots.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The requested number of items does not fit into a single pool.
    ///
    /// Returned at construction time. The caller must request fewer or smaller items.
    #[error(
        "requested {item_count} items of {item_length} bytes, which exceeds the maximum pool size of {max_bytes} bytes"
    )]
    CapacityExceeded {
        /// Bytes per slot that were requested.
        item_length: usize,

        /// Number of slots that were requested.
        item_count: usize,

        /// The hard ceiling on the size of a pool, in bytes.
        max_bytes: usize,
    },

    /// Every slot in the pool is live, so there is nothing left to hand out.
    ///
    /// The pool does not grow. Free an existing allocation or use a larger pool.
    #[error("pool is full: all {capacity} slots are in use")]
    PoolExhausted {
        /// Total number of slots in the pool.
        capacity: usize,
    },

    /// An offset passed to a validating release operation does not identify a live slot.
    #[error("cannot free offset {offset}: {problem}")]
    InvalidOffset {
        /// The offset the caller tried to release.
        offset: usize,

        /// A human-readable description of the problem.
        problem: &'static str,
    },
}

/// A specialized `Result` type for slot pool operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Errors that can occur when allocating through a [`Tracker`](crate::Tracker) or preparing one.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying allocator could not satisfy the request, or the requested size could not
    /// be represented after applying the growth factor and rounding.
    ///
    /// The operation that returned this error had no effect.
    #[error("out of memory: unable to obtain a block of {requested} bytes")]
    OutOfMemory {
        /// The number of bytes that was asked of the underlying allocator. Saturates at
        /// `usize::MAX` if the size computation itself overflowed.
        requested: usize,
    },

    /// A configuration option had a value that could not be interpreted.
    #[error("invalid value '{value}' for {option}: {problem}")]
    InvalidConfig {
        /// The name of the option, as it was looked up.
        option: &'static str,

        /// The value that was rejected.
        value: String,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// Teardown found allocations that were never released.
    #[error("{count} tracked allocations totalling {bytes} bytes were never released")]
    Leaked {
        /// Number of live records at teardown.
        count: usize,

        /// Sum of the sizes of the live records at teardown.
        bytes: usize,
    },
}

/// A specialized `Result` type for tracking operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

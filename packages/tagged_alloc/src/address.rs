use std::fmt;
use std::ptr::{self, NonNull};

/// Opaque handle to a block obtained from an underlying allocator.
///
/// The handle is only ever compared, hashed and printed by this package. Ownership of the
/// bytes it points to stays with the underlying allocator and, transitively, with the caller.
///
/// An `Address` may be null, which is how a failed or absent allocation is represented when a
/// handle crosses an FFI boundary. Releasing a null address is a no-op.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Address(*mut u8);

impl Address {
    /// The null address.
    #[must_use]
    #[inline]
    pub const fn null() -> Self {
        Self(ptr::null_mut())
    }

    /// Wraps a raw pointer without inspecting it.
    #[must_use]
    #[inline]
    pub const fn from_ptr(ptr: *mut u8) -> Self {
        Self(ptr)
    }

    /// The raw pointer behind this handle, for the caller to read and write the block.
    #[must_use]
    #[inline]
    pub const fn as_ptr(self) -> *mut u8 {
        self.0
    }

    /// Whether this is the null address.
    #[must_use]
    #[inline]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    #[inline]
    pub(crate) fn as_non_null(self) -> Option<NonNull<u8>> {
        NonNull::new(self.0)
    }
}

impl From<NonNull<u8>> for Address {
    #[inline]
    fn from(value: NonNull<u8>) -> Self {
        Self(value.as_ptr())
    }
}

impl fmt::Pointer for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.0, f)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:p}", self.0)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(Address: Copy, Eq, std::hash::Hash, fmt::Debug);
    assert_not_impl_any!(Address: Send, Sync);

    #[test]
    fn null_is_null() {
        assert!(Address::null().is_null());
        assert!(Address::from_ptr(ptr::null_mut()).is_null());
        assert_eq!(Address::null().as_non_null(), None);
    }

    #[test]
    fn non_null_round_trips_pointer() {
        let mut byte = 0_u8;
        let ptr = NonNull::from(&mut byte);

        let address = Address::from(ptr);

        assert!(!address.is_null());
        assert_eq!(address.as_ptr(), ptr.as_ptr());
        assert_eq!(address.as_non_null(), Some(ptr));
    }

    #[test]
    fn displays_as_pointer() {
        let mut byte = 0_u8;
        let ptr: *mut u8 = &raw mut byte;

        let address = Address::from_ptr(ptr);

        assert_eq!(address.to_string(), format!("{ptr:p}"));
        assert_eq!(format!("{address:p}"), format!("{ptr:p}"));
    }
}

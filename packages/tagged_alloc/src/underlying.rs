//! The real allocation primitives that a [`Tracker`](crate::Tracker) delegates to.

use std::fmt::Debug;
use std::ptr::NonNull;

/// Acquires, resizes and releases blocks of raw memory on behalf of a tracker.
///
/// The tracker never touches the bytes of a block. It only requires that the addresses handed
/// out are unique among live blocks and that the contracts below hold.
pub trait UnderlyingAllocator: Debug {
    /// Obtains a block of at least `size` bytes, or `None` if the request cannot be satisfied.
    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>>;

    /// Resizes the block at `ptr` to at least `new_size` bytes, possibly moving it.
    ///
    /// On success the returned pointer replaces `ptr`, which must no longer be used if the two
    /// differ. On failure returns `None` and the block at `ptr` stays valid and unchanged.
    ///
    /// # Safety
    ///
    /// `ptr` must identify a live block obtained from this allocator.
    unsafe fn resize(&mut self, ptr: NonNull<u8>, new_size: usize) -> Option<NonNull<u8>>;

    /// Returns the block at `ptr` to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must identify a live block obtained from this allocator. The block is dead once
    /// this returns.
    unsafe fn release(&mut self, ptr: NonNull<u8>);
}

/// The C runtime heap: `malloc`, `realloc` and `free`.
///
/// Zero-sized requests are forwarded as one-byte requests so that a successful call always
/// yields a distinct live block and `realloc` is never asked to free.
///
/// # Examples
///
/// ```
/// use tagged_alloc::{CallSite, Config, SystemAllocator, Tracker};
///
/// let mut tracker = Tracker::with_parts(SystemAllocator, Vec::<String>::new(), Config::new());
/// let address = tracker.allocate(24, "node", CallSite::NONE).unwrap();
///
/// // SAFETY: The address was returned by this tracker and has not been released yet.
/// unsafe { tracker.release(address) };
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl UnderlyingAllocator for SystemAllocator {
    #[inline]
    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        // SAFETY: malloc has no preconditions; a null result is mapped to None.
        let ptr = unsafe { libc::malloc(size.max(1)) };
        NonNull::new(ptr.cast::<u8>())
    }

    #[inline]
    unsafe fn resize(&mut self, ptr: NonNull<u8>, new_size: usize) -> Option<NonNull<u8>> {
        // SAFETY: The caller guarantees ptr came from malloc/realloc and is live. A non-zero
        // size means realloc either succeeds or fails leaving the original block intact.
        let new_ptr = unsafe { libc::realloc(ptr.as_ptr().cast(), new_size.max(1)) };
        NonNull::new(new_ptr.cast::<u8>())
    }

    #[inline]
    unsafe fn release(&mut self, ptr: NonNull<u8>) {
        // SAFETY: The caller guarantees ptr came from malloc/realloc and is live.
        unsafe { libc::free(ptr.as_ptr().cast()) }
    }
}

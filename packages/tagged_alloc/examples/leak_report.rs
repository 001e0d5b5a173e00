//! Demonstrates tag attribution, growth and the leak check at teardown.
//!
//! Set `TAGGED_ALLOC_LOGGING=1` to see a line for every call, or
//! `TAGGED_ALLOC_DISABLE_ALIGNING=1` to see the exact requested sizes.

use std::ptr::NonNull;

use tagged_alloc::{CallSite, Config, SystemAllocator, Tracker, UnderlyingAllocator};

fn main() {
    let config = Config::from_env().expect("TAGGED_ALLOC_* variables must be valid");
    let mut tracker = Tracker::new(config);

    let header = tracker
        .allocate(40, "header", CallSite::NONE)
        .expect("the system allocator can satisfy a small request");
    let mut buffer = tracker
        .allocate_here(100, "read buffer")
        .expect("the system allocator can satisfy a small request");

    for requested in [128, 256, 512] {
        // SAFETY: The buffer is live and replaced by the returned address on every iteration.
        buffer = unsafe { tracker.grow_here(buffer, requested) }
            .expect("the system allocator can satisfy a small request");
    }

    println!();
    tracker.dump();
    println!();

    // SAFETY: The buffer is live and came from this tracker.
    unsafe { tracker.release(buffer) };

    // The header is deliberately never released.
    match tracker.finish() {
        Ok(()) => println!("no leaks"),
        Err(e) => println!("leak check failed: {e}"),
    }

    let header = NonNull::new(header.as_ptr()).expect("allocations are never null");

    // SAFETY: finish() does not release blocks, so the header is still live in the C heap.
    unsafe { SystemAllocator.release(header) };
}

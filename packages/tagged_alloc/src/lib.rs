#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Attributes heap allocations to caller-supplied tags for leak detection and usage diagnostics.
//!
//! A [`Tracker`] wraps an underlying allocator (by default the C runtime `malloc` family via
//! [`SystemAllocator`]) and records, for every live block it hands out, the tag the caller
//! supplied and the number of bytes actually requested from the underlying allocator. Requested
//! sizes are rounded up to the next power of two unless rounding is disabled in [`Config`].
//!
//! The core functionality includes:
//! - [`Tracker`] - allocates, grows and releases blocks while keeping the registry current
//! - [`AllocationRegistry`] - the mapping from live [`Address`] to [`AllocationRecord`]
//! - [`Report`] - renders the registry as human-readable text
//! - [`Config`] - the tracking, logging, rounding and expand factor toggles
//!
//! This package is not a general-purpose allocator and is not thread-safe. It is meant as a
//! development aid for programs that manage raw blocks themselves.
//!
//! # Example
//!
//! ```
//! use tagged_alloc::{CallSite, Config, Tracker};
//!
//! let mut tracker = Tracker::with_parts(
//!     tagged_alloc::SystemAllocator,
//!     Vec::<String>::new(),
//!     Config::new().logging(true),
//! );
//!
//! let address = tracker.allocate(100, "parser buffer", CallSite::NONE).unwrap();
//! assert_eq!(tracker.total_bytes(), 128);
//!
//! // SAFETY: The address was returned by this tracker and has not been released yet.
//! let address = unsafe { tracker.grow(address, 100, CallSite::NONE) }.unwrap();
//! assert_eq!(tracker.total_bytes(), 256);
//!
//! tracker.dump();
//!
//! // SAFETY: The address was returned by this tracker and has not been released yet.
//! unsafe { tracker.release(address) };
//!
//! tracker.finish().unwrap();
//! ```
//!
//! # Call sites
//!
//! Every allocating operation takes a [`CallSite`] that controls how the diagnostic line is
//! shaped. The `*_here` variants capture the caller's source location automatically.
//!
//! # Threading
//!
//! All operations take `&mut self` and [`Address`] is a raw pointer wrapper, so a [`Tracker`]
//! cannot be shared across threads without an external mutex supplied by the host program.

mod address;
mod call_site;
mod config;
mod error;
mod registry;
mod report;
mod rounding;
mod sink;
mod tracker;
mod underlying;

pub use address::*;
pub use call_site::*;
pub use config::*;
pub use error::*;
pub use registry::*;
pub use report::Report;
pub use rounding::*;
pub use sink::*;
pub use tracker::*;
pub use underlying::*;

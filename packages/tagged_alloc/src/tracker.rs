//! Allocation wrapper that attributes blocks to tags.

use std::num::NonZero;

use crate::report::Event;
use crate::{
    Address, AllocationRecord, AllocationRegistry, CallSite, Config, DiagnosticSink, Error, Report,
    Result, StdoutSink, SystemAllocator, UnderlyingAllocator,
};

/// Allocates, grows and releases blocks through an underlying allocator while recording which
/// tag each live block belongs to.
///
/// The registry total always equals the sum of the sizes of the live records. Sizes recorded are
/// the sizes actually requested from the underlying allocator, after power-of-two rounding.
///
/// A tracker is an explicit context object: create one at startup, pass it to the code that
/// allocates and call [`finish()`](Self::finish) at teardown to check for leaks. It provides no
/// synchronization and is not `Send`.
///
/// # Examples
///
/// ```
/// use tagged_alloc::{CallSite, Config, SystemAllocator, Tracker};
///
/// let mut tracker = Tracker::with_parts(SystemAllocator, Vec::<String>::new(), Config::new());
///
/// let a = tracker.allocate(10, "a", CallSite::NONE).unwrap();
/// let b = tracker.allocate(20, "b", CallSite::NONE).unwrap();
///
/// // SAFETY: The address was returned by this tracker and has not been released yet.
/// unsafe { tracker.release(a) };
///
/// assert_eq!(tracker.total_bytes(), 32);
/// assert_eq!(tracker.record(b).unwrap().tag(), "b");
///
/// // SAFETY: The address was returned by this tracker and has not been released yet.
/// unsafe { tracker.release(b) };
/// tracker.finish().unwrap();
/// ```
#[derive(Debug)]
pub struct Tracker<A = SystemAllocator, S = StdoutSink> {
    allocator: A,
    sink: S,
    config: Config,
    registry: AllocationRegistry,
}

impl Tracker {
    /// Creates a tracker over the C runtime heap that writes diagnostic lines to stdout.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_parts(SystemAllocator, StdoutSink, config)
    }
}

impl<A: UnderlyingAllocator, S: DiagnosticSink> Tracker<A, S> {
    /// Creates a tracker from its parts.
    #[must_use]
    pub fn with_parts(allocator: A, sink: S, config: Config) -> Self {
        Self {
            allocator,
            sink,
            config,
            registry: AllocationRegistry::new(),
        }
    }

    /// Allocates a block for at least `size` bytes and attributes it to `tag`.
    ///
    /// The size is rounded up to a power of two unless rounding is disabled. With tracking
    /// enabled, a record of the rounded size is added to the registry. With logging enabled,
    /// one diagnostic line shaped by `site` is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the rounded size is not representable or the
    /// underlying allocator cannot satisfy the request. Nothing is recorded in that case.
    pub fn allocate(&mut self, size: usize, tag: &str, site: CallSite<'_>) -> Result<Address> {
        let effective_size = self
            .config
            .effective_size(size)
            .ok_or(Error::OutOfMemory { requested: size })?;

        let Some(ptr) = self.allocator.allocate(effective_size) else {
            log::debug!("underlying allocator refused {effective_size} bytes for '{tag}'");
            return Err(Error::OutOfMemory {
                requested: effective_size,
            });
        };

        let address = Address::from(ptr);

        if self.config.is_tracking_enabled() {
            self.registry.insert(address, tag, effective_size);
        }

        if self.config.is_logging_enabled() {
            emit(&mut self.sink, &Event::Allocated { tag, address, site });
        }

        Ok(address)
    }

    /// Grows the block at `address` to hold `requested_size` times the configured growth
    /// factor, rounded up to a power of two unless rounding is disabled.
    ///
    /// See [`grow_by()`](Self::grow_by) for the details.
    ///
    /// # Errors
    ///
    /// Same as [`grow_by()`](Self::grow_by).
    ///
    /// # Safety
    ///
    /// Same as [`grow_by()`](Self::grow_by).
    pub unsafe fn grow(
        &mut self,
        address: Address,
        requested_size: usize,
        site: CallSite<'_>,
    ) -> Result<Address> {
        let factor = self.config.growth_factor();

        // SAFETY: Forwarding the caller's guarantees.
        unsafe { self.grow_by(address, requested_size, factor, site) }
    }

    /// Resizes the block at `address` to `requested_size * factor` bytes, rounded up to a power
    /// of two unless rounding is disabled. The block may move; the returned address replaces
    /// `address`.
    ///
    /// If a record exists for `address`, its size is replaced by the new size and it moves with
    /// the block, keeping its tag. If there is no record (tracking disabled or the block was not
    /// allocated through this tracker) the bookkeeping is skipped. With logging enabled and a
    /// record present, one diagnostic line shaped by `site` is emitted.
    ///
    /// A null `address` obtains a fresh, untracked block of the computed size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the new size is not representable or the underlying
    /// allocator cannot resize the block. The block at `address` and its record are unchanged
    /// in that case.
    ///
    /// # Safety
    ///
    /// `address` must be null or a live block obtained from this tracker's underlying
    /// allocator. If the block moves, `address` must not be used again.
    pub unsafe fn grow_by(
        &mut self,
        address: Address,
        requested_size: usize,
        factor: NonZero<usize>,
        site: CallSite<'_>,
    ) -> Result<Address> {
        let scaled_size = requested_size
            .checked_mul(factor.get())
            .ok_or(Error::OutOfMemory {
                requested: usize::MAX,
            })?;

        let new_size = self
            .config
            .effective_size(scaled_size)
            .ok_or(Error::OutOfMemory {
                requested: scaled_size,
            })?;

        let new_ptr = match address.as_non_null() {
            // SAFETY: The caller guarantees the block is live and came from this allocator.
            Some(ptr) => unsafe { self.allocator.resize(ptr, new_size) },
            None => self.allocator.allocate(new_size),
        };

        let Some(new_ptr) = new_ptr else {
            log::debug!("underlying allocator could not resize {address} to {new_size} bytes");
            return Err(Error::OutOfMemory {
                requested: new_size,
            });
        };

        let new_address = Address::from(new_ptr);

        if !self.registry.update_on_move(address, new_address, new_size) {
            log::trace!("grow of untracked block {address}; bookkeeping skipped");
            return Ok(new_address);
        }

        if !self.config.is_logging_enabled() {
            return Ok(new_address);
        }

        if let Some(record) = self.registry.get(new_address) {
            emit(
                &mut self.sink,
                &Event::Reallocated {
                    tag: record.tag(),
                    address: new_address,
                    site,
                },
            );
        }

        Ok(new_address)
    }

    /// Returns the block at `address` to the underlying allocator and forgets its record.
    ///
    /// Releasing a null address is a no-op that emits an "attempted to free null" line when
    /// logging is enabled. With logging enabled and a record present, a "freed" line naming
    /// the tag is emitted. This never fails.
    ///
    /// # Safety
    ///
    /// `address` must be null or a live block obtained from this tracker's underlying
    /// allocator. The block is dead once this returns.
    pub unsafe fn release(&mut self, address: Address) {
        let Some(ptr) = address.as_non_null() else {
            if self.config.is_logging_enabled() {
                emit(&mut self.sink, &Event::NullFree);
            }
            return;
        };

        // SAFETY: The caller guarantees the block is live and came from this allocator.
        unsafe { self.allocator.release(ptr) };

        let Some(record) = self.registry.remove(address) else {
            log::trace!("release of untracked block {address}; bookkeeping skipped");
            return;
        };

        if self.config.is_logging_enabled() {
            emit(
                &mut self.sink,
                &Event::Freed {
                    tag: record.tag(),
                    address,
                },
            );
        }
    }

    /// Emits the current registry contents to the diagnostic sink.
    ///
    /// This happens regardless of whether per-call logging is enabled.
    pub fn dump(&mut self) {
        for line in Report::new(&self.registry).lines() {
            self.sink.emit(&line);
        }
    }

    /// Consumes the tracker, checking that every tracked block was released.
    ///
    /// Blocks that are still live are not released; they remain owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Leaked`] if any records remain.
    pub fn finish(self) -> Result<()> {
        if self.registry.is_empty() {
            return Ok(());
        }

        log::debug!(
            "tracker finished with {} live records totalling {} bytes",
            self.registry.len(),
            self.registry.total_bytes()
        );

        Err(Error::Leaked {
            count: self.registry.len(),
            bytes: self.registry.total_bytes(),
        })
    }
}

impl<A, S> Tracker<A, S> {
    /// The running total of tracked bytes.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.registry.total_bytes()
    }

    /// The record for the live block at `address`, if it is tracked.
    #[must_use]
    pub fn record(&self, address: Address) -> Option<&AllocationRecord> {
        self.registry.get(address)
    }

    /// A displayable snapshot of the registry.
    #[must_use]
    pub fn report(&self) -> Report<'_> {
        Report::new(&self.registry)
    }

    /// The registry of live blocks.
    #[must_use]
    pub fn registry(&self) -> &AllocationRegistry {
        &self.registry
    }

    /// The configuration the tracker was created with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The diagnostic sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Splits the tracker into its allocator and sink, discarding the registry.
    #[must_use]
    pub fn into_parts(self) -> (A, S) {
        (self.allocator, self.sink)
    }
}

fn emit(sink: &mut impl DiagnosticSink, event: &Event<'_>) {
    sink.emit(&event.to_string());
}

//! Source location attribution for diagnostic lines.

use std::num::NonZero;
use std::panic::Location;

use crate::{Address, DiagnosticSink, Result, Tracker, UnderlyingAllocator};

/// Where an allocating call was made, as far as the caller cares to say.
///
/// A line of zero means "unknown" and suppresses the file as well. A known line without a file
/// is reported on its own.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CallSite<'a> {
    line: u32,
    file: Option<&'a str>,
}

impl<'a> CallSite<'a> {
    /// No location information.
    pub const NONE: Self = Self {
        line: 0,
        file: None,
    };

    /// A line number without a file.
    #[must_use]
    pub const fn line(line: u32) -> Self {
        Self { line, file: None }
    }

    /// A line number in a named file.
    #[must_use]
    pub const fn new(line: u32, file: &'a str) -> Self {
        Self {
            line,
            file: Some(file),
        }
    }

    /// The line number, zero if unknown.
    #[must_use]
    pub const fn line_number(&self) -> u32 {
        self.line
    }

    /// The file name, if one was given.
    #[must_use]
    pub const fn file(&self) -> Option<&'a str> {
        self.file
    }
}

impl CallSite<'static> {
    /// The location of the code that called the function this is evaluated in, following
    /// `#[track_caller]` frames.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.line(), location.file())
    }
}

impl<A: UnderlyingAllocator, S: DiagnosticSink> Tracker<A, S> {
    /// [`allocate()`](Self::allocate) attributed to the source location of the caller.
    ///
    /// # Errors
    ///
    /// Same as [`allocate()`](Self::allocate).
    #[track_caller]
    pub fn allocate_here(&mut self, size: usize, tag: &str) -> Result<Address> {
        self.allocate(size, tag, CallSite::caller())
    }

    /// [`grow()`](Self::grow) attributed to the source location of the caller.
    ///
    /// # Errors
    ///
    /// Same as [`grow()`](Self::grow).
    ///
    /// # Safety
    ///
    /// Same as [`grow()`](Self::grow).
    #[track_caller]
    pub unsafe fn grow_here(&mut self, address: Address, requested_size: usize) -> Result<Address> {
        // SAFETY: Forwarding the caller's guarantees.
        unsafe { self.grow(address, requested_size, CallSite::caller()) }
    }

    /// [`grow_by()`](Self::grow_by) attributed to the source location of the caller.
    ///
    /// # Errors
    ///
    /// Same as [`grow_by()`](Self::grow_by).
    ///
    /// # Safety
    ///
    /// Same as [`grow_by()`](Self::grow_by).
    #[track_caller]
    pub unsafe fn grow_by_here(
        &mut self,
        address: Address,
        requested_size: usize,
        factor: NonZero<usize>,
    ) -> Result<Address> {
        // SAFETY: Forwarding the caller's guarantees.
        unsafe { self.grow_by(address, requested_size, factor, CallSite::caller()) }
    }
}

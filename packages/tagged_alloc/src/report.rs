//! Human-readable rendering of tracker activity and registry contents.

use std::fmt;
use std::iter;

use crate::{Address, AllocationRecord, AllocationRegistry, CallSite};

const PREFIX: &str = "[memory]";

/// One per-call diagnostic line.
#[derive(Debug)]
pub(crate) enum Event<'a> {
    Allocated {
        tag: &'a str,
        address: Address,
        site: CallSite<'a>,
    },
    Reallocated {
        tag: &'a str,
        address: Address,
        site: CallSite<'a>,
    },
    Freed {
        tag: &'a str,
        address: Address,
    },
    NullFree,
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocated { tag, address, site } => {
                write!(f, "{PREFIX} Allocated '{tag}' ({address})")?;
                write_site(f, *site)
            }
            Self::Reallocated { tag, address, site } => {
                write!(f, "{PREFIX} Reallocated '{tag}' ({address})")?;
                write_site(f, *site)
            }
            Self::Freed { tag, address } => write!(f, "{PREFIX} Freed '{tag}' ({address})"),
            Self::NullFree => write!(f, "{PREFIX} Attempted to free null"),
        }
    }
}

fn write_site(f: &mut fmt::Formatter<'_>, site: CallSite<'_>) -> fmt::Result {
    let line = site.line_number();
    if line == 0 {
        return Ok(());
    }

    write!(f, " at line {line}")?;

    if let Some(file) = site.file() {
        write!(f, " in '{file}'")?;
    }

    Ok(())
}

/// Snapshot view of an [`AllocationRegistry`] for display.
///
/// An empty registry renders as a single "empty" line. Otherwise the output is a header carrying
/// the total tracked bytes followed by one line per live record, in registry order.
///
/// # Examples
///
/// ```
/// use tagged_alloc::{CallSite, Config, SystemAllocator, Tracker};
///
/// let mut tracker = Tracker::with_parts(SystemAllocator, Vec::<String>::new(), Config::new());
/// assert_eq!(tracker.report().to_string(), "[memory] Map: empty");
///
/// let address = tracker.allocate(100, "x", CallSite::NONE).unwrap();
/// let text = tracker.report().to_string();
/// assert!(text.starts_with("[memory] Map (128 bytes):\n"));
/// assert!(text.ends_with(" -> x (128 bytes)"));
///
/// // SAFETY: The address was returned by this tracker and has not been released yet.
/// unsafe { tracker.release(address) };
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    registry: &'a AllocationRegistry,
}

impl<'a> Report<'a> {
    /// Creates a view over `registry`.
    #[must_use]
    pub fn new(registry: &'a AllocationRegistry) -> Self {
        Self { registry }
    }

    /// The running total of tracked bytes.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.registry.total_bytes()
    }

    /// Whether there are no live records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// The rendered lines, header first, without trailing newlines.
    pub fn lines(&self) -> impl Iterator<Item = String> + use<'a> {
        let registry = self.registry;

        let header = if registry.is_empty() {
            format!("{PREFIX} Map: empty")
        } else {
            format!("{PREFIX} Map ({} bytes):", registry.total_bytes())
        };

        iter::once(header).chain(registry.entries().map(render_record))
    }
}

fn render_record(record: &AllocationRecord) -> String {
    format!(
        "{} -> {} ({} bytes)",
        record.address(),
        record.tag(),
        record.size()
    )
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines().enumerate() {
            if index != 0 {
                writeln!(f)?;
            }
            f.write_str(&line)?;
        }

        Ok(())
    }
}

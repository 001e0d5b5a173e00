//! Toggles that control what a [`Tracker`](crate::Tracker) does beyond the real memory operation.

use std::env;
use std::num::NonZero;

use crate::{Error, Result, round_up_power_of_two};

/// Environment variable that turns registry bookkeeping on or off.
pub const ENV_TRACKING: &str = "TAGGED_ALLOC_TRACKING";

/// Environment variable that turns per-call diagnostic lines on or off.
pub const ENV_LOGGING: &str = "TAGGED_ALLOC_LOGGING";

/// Environment variable that disables power-of-two rounding when set to a true value.
pub const ENV_DISABLE_ALIGNING: &str = "TAGGED_ALLOC_DISABLE_ALIGNING";

/// Environment variable that sets the growth factor used by [`Tracker::grow()`](crate::Tracker::grow).
pub const ENV_EXPAND_FACTOR: &str = "TAGGED_ALLOC_EXPAND_FACTOR";

/// Growth factor used when none is configured.
pub const DEFAULT_EXPAND_FACTOR: NonZero<usize> = NonZero::new(2).expect("2 is not zero");

/// Configuration of a [`Tracker`](crate::Tracker), resolved once before the tracker is created.
///
/// When tracking is disabled the tracker still performs every real memory operation but records
/// nothing. When logging is disabled no diagnostic lines are emitted for individual calls;
/// [`Tracker::dump()`](crate::Tracker::dump) is unaffected.
///
/// # Examples
///
/// ```
/// use std::num::NonZero;
///
/// use tagged_alloc::Config;
///
/// let config = Config::new()
///     .logging(true)
///     .rounding(false)
///     .expand_factor(NonZero::new(3).unwrap());
///
/// assert!(config.is_tracking_enabled());
/// assert_eq!(config.effective_size(100), Some(100));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    tracking_enabled: bool,
    logging_enabled: bool,
    rounding_enabled: bool,
    expand_factor: NonZero<usize>,
}

impl Config {
    /// Tracking and rounding on, logging off, growth factor of two.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tracking_enabled: true,
            logging_enabled: false,
            rounding_enabled: true,
            expand_factor: DEFAULT_EXPAND_FACTOR,
        }
    }

    /// Reads the configuration from the `TAGGED_ALLOC_*` environment variables.
    ///
    /// Unset variables keep their [`Config::new()`] default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary lookup function, using the same option
    /// names as [`Config::from_env()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a looked-up value cannot be parsed.
    pub fn from_lookup(mut lookup: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(value) = lookup(ENV_TRACKING) {
            config.tracking_enabled = parse_flag(ENV_TRACKING, &value)?;
        }

        if let Some(value) = lookup(ENV_LOGGING) {
            config.logging_enabled = parse_flag(ENV_LOGGING, &value)?;
        }

        if let Some(value) = lookup(ENV_DISABLE_ALIGNING) {
            config.rounding_enabled = !parse_flag(ENV_DISABLE_ALIGNING, &value)?;
        }

        if let Some(value) = lookup(ENV_EXPAND_FACTOR) {
            config.expand_factor = parse_factor(ENV_EXPAND_FACTOR, &value)?;
        }

        log::debug!("resolved tracker configuration: {config:?}");

        Ok(config)
    }

    /// Turns registry bookkeeping on or off.
    #[must_use]
    pub const fn tracking(mut self, enabled: bool) -> Self {
        self.tracking_enabled = enabled;
        self
    }

    /// Turns per-call diagnostic lines on or off.
    #[must_use]
    pub const fn logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    /// Turns power-of-two rounding of requested sizes on or off.
    #[must_use]
    pub const fn rounding(mut self, enabled: bool) -> Self {
        self.rounding_enabled = enabled;
        self
    }

    /// Sets the multiplier applied to the requested size by [`Tracker::grow()`](crate::Tracker::grow).
    #[must_use]
    pub const fn expand_factor(mut self, factor: NonZero<usize>) -> Self {
        self.expand_factor = factor;
        self
    }

    /// Whether registry bookkeeping is on.
    #[must_use]
    pub const fn is_tracking_enabled(&self) -> bool {
        self.tracking_enabled
    }

    /// Whether per-call diagnostic lines are emitted.
    #[must_use]
    pub const fn is_logging_enabled(&self) -> bool {
        self.logging_enabled
    }

    /// Whether requested sizes are rounded up to a power of two.
    #[must_use]
    pub const fn is_rounding_enabled(&self) -> bool {
        self.rounding_enabled
    }

    /// The configured growth factor.
    #[must_use]
    pub const fn growth_factor(&self) -> NonZero<usize> {
        self.expand_factor
    }

    /// The size that will actually be requested from the underlying allocator for a caller
    /// request of `requested` bytes.
    ///
    /// Returns `None` if rounding is enabled and the rounded size does not fit in `usize`.
    #[must_use]
    pub const fn effective_size(&self, requested: usize) -> Option<usize> {
        if self.rounding_enabled {
            round_up_power_of_two(requested)
        } else {
            Some(requested)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(option: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidConfig {
            option,
            value: value.to_string(),
            problem: "expected one of 1/0, true/false, yes/no, on/off".to_string(),
        }),
    }
}

fn parse_factor(option: &'static str, value: &str) -> Result<NonZero<usize>> {
    value
        .trim()
        .parse::<NonZero<usize>>()
        .map_err(|e| Error::InvalidConfig {
            option,
            value: value.to_string(),
            problem: format!("expected a positive integer: {e}"),
        })
}

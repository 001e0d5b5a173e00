/// Rounds `size` up to the smallest power of two that is greater than or equal to it.
///
/// Returns `None` if that power of two is not representable in `usize`. A `size` of zero
/// rounds to one.
///
/// # Examples
///
/// ```
/// use tagged_alloc::round_up_power_of_two;
///
/// assert_eq!(round_up_power_of_two(100), Some(128));
/// assert_eq!(round_up_power_of_two(128), Some(128));
/// assert_eq!(round_up_power_of_two(usize::MAX), None);
/// ```
#[must_use]
#[inline]
pub const fn round_up_power_of_two(size: usize) -> Option<usize> {
    size.checked_next_power_of_two()
}

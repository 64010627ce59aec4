// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Engine configuration.

use std::time::Duration;

/// Item budget applied by [`MemoizerSettings::default`].
pub const DEFAULT_MAX_ITEMS: usize = 10_000;

/// Maximum entry age applied by [`MemoizerSettings::default`].
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(5 * 60);

/// Configuration for a [`Memoizer`](crate::Memoizer) instance.
///
/// Settings are a plain value object: the engine reads them under its lock
/// on every invocation, and [`Memoizer::set_settings`](crate::Memoizer::set_settings)
/// swaps them as a whole at any time.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use memoir::MemoizerSettings;
///
/// let settings = MemoizerSettings::new(500, Duration::from_secs(30));
/// assert_eq!(settings.max_items, 500);
///
/// // Zero disables the respective eviction entirely.
/// let unbounded = MemoizerSettings::unbounded();
/// assert_eq!(unbounded.max_items, 0);
/// assert!(unbounded.max_age.is_zero());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoizerSettings {
    /// Total number of cached items (summed across entries) the engine may
    /// hold. Inserting beyond the budget evicts entries in the active
    /// [`EvictionOrder`](crate::EvictionOrder). `0` disables size-based
    /// eviction.
    pub max_items: usize,

    /// Maximum entry lifetime, measured from creation. Entries older than
    /// this are removed on the next lookup regardless of access pattern.
    /// [`Duration::ZERO`] disables age-based eviction.
    pub max_age: Duration,
}

impl MemoizerSettings {
    /// Creates settings with the given item budget and maximum age.
    #[must_use]
    pub const fn new(max_items: usize, max_age: Duration) -> Self {
        Self { max_items, max_age }
    }

    /// Creates settings with both eviction mechanisms disabled.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for MemoizerSettings {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEMS, DEFAULT_MAX_AGE)
    }
}

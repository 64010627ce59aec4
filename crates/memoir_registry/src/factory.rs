// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Construction strategies for registry-owned engines.

use memoir::{EvictionOrder, Memoizer, MemoizerSettings};

/// Strategy for constructing the engine instances a
/// [`MemoizerRegistry`](crate::MemoizerRegistry) hands out.
///
/// The registry calls [`create`](Self::create) at most once per result
/// element type and caches the instance for the registry's lifetime.
pub trait MemoizerFactory {
    /// Builds a fresh engine for result element type `T`.
    fn create<T: Send + Sync + 'static>(&self) -> Memoizer<T>;
}

/// The default factory: every engine is built with one shared settings
/// value and eviction ordering.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use memoir::{EvictionOrder, MemoizerSettings};
/// use memoir_registry::{MemoizerRegistry, SettingsFactory};
///
/// let factory = SettingsFactory::new(MemoizerSettings::new(100, Duration::from_secs(30)))
///     .with_eviction_order(EvictionOrder::Fifo);
/// let registry = MemoizerRegistry::with_factory(factory);
/// # let _ = registry;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SettingsFactory {
    settings: MemoizerSettings,
    eviction_order: EvictionOrder,
}

impl SettingsFactory {
    /// Creates a factory applying `settings` to every engine it builds.
    #[must_use]
    pub fn new(settings: MemoizerSettings) -> Self {
        Self {
            settings,
            eviction_order: EvictionOrder::default(),
        }
    }

    /// Sets the eviction ordering applied to every engine.
    #[must_use]
    pub fn with_eviction_order(mut self, order: EvictionOrder) -> Self {
        self.eviction_order = order;
        self
    }

    /// The settings this factory applies.
    #[must_use]
    pub fn settings(&self) -> MemoizerSettings {
        self.settings
    }
}

impl MemoizerFactory for SettingsFactory {
    fn create<T: Send + Sync + 'static>(&self) -> Memoizer<T> {
        let memoizer = Memoizer::with_settings(self.settings);
        memoizer.set_eviction_order(self.eviction_order);
        memoizer
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn created_engines_carry_the_factory_settings() {
        let settings = MemoizerSettings::new(7, Duration::from_secs(9));
        let factory = SettingsFactory::new(settings).with_eviction_order(EvictionOrder::LeastUsed);

        let memoizer: Memoizer<u32> = factory.create();
        assert_eq!(memoizer.settings(), settings);
        assert_eq!(memoizer.eviction_order(), EvictionOrder::LeastUsed);
    }

    #[test]
    fn default_factory_uses_default_settings() {
        let memoizer: Memoizer<String> = SettingsFactory::default().create();
        assert_eq!(memoizer.settings(), MemoizerSettings::default());
        assert_eq!(memoizer.eviction_order(), EvictionOrder::Lru);
    }
}

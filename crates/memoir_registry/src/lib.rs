// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! A per-result-type registry of [`memoir`] engines.
//!
//! A [`Memoizer`](memoir::Memoizer) is parameterized by its result element
//! type, so a program working with many result types needs one engine per
//! type. [`MemoizerRegistry`] keeps that bookkeeping out of application
//! code: it lazily constructs one engine per type through a pluggable
//! [`MemoizerFactory`] and hands out clones of the cached instance, so every
//! call site wrapping a computation of the same result type shares one
//! cache.
//!
//! # Examples
//!
//! ```
//! use memoir_registry::MemoizerRegistry;
//!
//! let registry = MemoizerRegistry::new();
//! let doubled = registry.memoize_with_arg(|n: &u32| vec![n * 2]);
//! assert_eq!(doubled.invoke(&4).to_vec(), vec![8]);
//! ```
//!
//! A process-wide default registry is available through
//! [`MemoizerRegistry::global`] for code that prefers ambient state over an
//! explicitly passed instance.

mod factory;
mod registry;

pub use factory::{MemoizerFactory, SettingsFactory};
pub use registry::MemoizerRegistry;

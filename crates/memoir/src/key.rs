// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Cache key derivation.
//!
//! A wrapped computation is identified by its closure or function-item
//! *type*: the type name carries the declaring module path and item name,
//! and a hash of the [`TypeId`] disambiguates closures that share a path
//! (the type name alone renders every closure in one function identically).
//! Two distinct computations therefore can never produce the same key.

use std::{
    any::TypeId,
    fmt::Display,
    hash::{DefaultHasher, Hash, Hasher},
};

/// Derives the identity prefix for the wrapped computation type `F`.
pub(crate) fn identity_of<F: 'static>() -> String {
    let mut hasher = DefaultHasher::new();
    TypeId::of::<F>().hash(&mut hasher);
    format!("{}#{:016x}", std::any::type_name::<F>(), hasher.finish())
}

/// Appends the argument's string rendering to an identity prefix.
pub(crate) fn keyed(identity: &str, arg: &impl Display) -> String {
    format!("{identity}${arg}")
}

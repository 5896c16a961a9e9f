// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ordered subscriber registry with a key index.
//!
//! The registry has no locking of its own and no way to emit. Signals wrap it
//! and pair it with a [`Dispatcher`](crate::traits::Dispatcher); a bare
//! registry cannot be emitted on:
//!
//! ```compile_fail
//! use signal_dispatch::{EmitContext, Registry};
//!
//! let registry: Registry<u32> = Registry::new();
//! let _ = registry.emit(&EmitContext::background(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::RegistryError;
use crate::listener::Listener;
use crate::traits::Payload;

/// A listener as stored in the registry, with its optional key.
#[derive(Debug, Clone)]
pub struct Subscription<T: Payload> {
    key: Option<String>,
    listener: Listener<T>,
}

impl<T: Payload> Subscription<T> {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn listener(&self) -> &Listener<T> {
        &self.listener
    }
}

/// Registration-ordered subscriptions plus a key -> listener index.
///
/// Every keyed subscription in `subscribers` has exactly one entry in `keyed`
/// and vice versa; unkeyed subscriptions live only in `subscribers`.
#[derive(Debug)]
pub struct Registry<T: Payload> {
    subscribers: Vec<Subscription<T>>,
    keyed: HashMap<String, Listener<T>>,
}

impl<T: Payload> Registry<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            keyed: HashMap::new(),
        }
    }

    /// Append a subscription and return the new subscriber count.
    ///
    /// A key already present is rejected with [`RegistryError::DuplicateKey`]
    /// and nothing changes. Unkeyed adds always succeed.
    pub fn add(&mut self, listener: Listener<T>, key: Option<String>) -> Result<usize, RegistryError> {
        if let Some(key) = &key {
            if self.keyed.contains_key(key) {
                return Err(RegistryError::DuplicateKey { key: key.clone() });
            }
            self.keyed.insert(key.clone(), listener.clone());
        }

        self.subscribers.push(Subscription { key, listener });
        Ok(self.subscribers.len())
    }

    /// Remove the subscription registered under `key` and return the new count.
    pub fn remove(&mut self, key: &str) -> Result<usize, RegistryError> {
        if self.keyed.remove(key).is_none() {
            return Err(RegistryError::KeyNotFound {
                key: key.to_string(),
            });
        }

        // keys are unique, so at most one entry matches
        if let Some(position) = self
            .subscribers
            .iter()
            .position(|sub| sub.key.as_deref() == Some(key))
        {
            self.subscribers.remove(position);
        }

        Ok(self.subscribers.len())
    }

    /// Drop every subscription. Idempotent.
    pub fn reset(&mut self) {
        self.subscribers.clear();
        self.keyed.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keyed.contains_key(key)
    }

    /// Listener registered under `key`
    pub fn get(&self, key: &str) -> Option<&Listener<T>> {
        self.keyed.get(key)
    }

    /// Subscriptions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Subscription<T>> {
        self.subscribers.iter()
    }

    /// Copy of the current subscriptions in registration order.
    ///
    /// Listeners are reference counted, so this clones pointers only.
    pub fn snapshot(&self) -> Vec<Subscription<T>> {
        self.subscribers.clone()
    }
}

impl<T: Payload> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registry shared by a signal and the dispatcher running its
/// emissions.
///
/// Dispatchers take their snapshot through this handle once they are ready to
/// run, so an emission queued behind another sees the registry as it is when
/// it starts.
pub struct SharedRegistry<T: Payload>(Arc<RwLock<Registry<T>>>);

impl<T: Payload> SharedRegistry<T> {
    pub fn new() -> Self {
        Self::from(Registry::new())
    }

    // No listener code runs under the lock, so a poisoned lock still guards
    // a consistent registry.
    pub fn read(&self) -> RwLockReadGuard<'_, Registry<T>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Registry<T>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the subscriptions as of now; the lock is released on return
    pub fn snapshot(&self) -> Vec<Subscription<T>> {
        self.read().snapshot()
    }
}

impl<T: Payload> From<Registry<T>> for SharedRegistry<T> {
    fn from(registry: Registry<T>) -> Self {
        Self(Arc::new(RwLock::new(registry)))
    }
}

impl<T: Payload> Clone for SharedRegistry<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Payload> Default for SharedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Payload> std::fmt::Debug for SharedRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRegistry")
            .field("len", &self.read().len())
            .finish()
    }
}

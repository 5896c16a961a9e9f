// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A named, typed signal: one registry plus one dispatch strategy.

use std::sync::{RwLockReadGuard, RwLockWriteGuard};
use tracing::Instrument;

use crate::config::{SignalConfig, Strategy, DEFAULT_SIGNAL_NAME};
use crate::context::EmitContext;
use crate::engine::{ConcurrentDispatcher, DispatcherFactory, SequentialDispatcher};
use crate::errors::{EmitError, RegistryError};
use crate::listener::Listener;
use crate::observability::messages::dispatch::EmissionStarted;
use crate::observability::messages::registry::{
    DuplicateKeyRejected, ListenerAdded, ListenerKeyNotFound, ListenerRemoved, RegistryReset,
};
use crate::observability::messages::StructuredLog;
use crate::registry::{Registry, SharedRegistry};
use crate::traits::{Dispatcher, Payload};

/// Typed publish/subscribe event.
///
/// Registry mutation takes `&self`, so a signal can be shared behind an `Arc`.
/// Each emission snapshots the subscribers when it starts running (after
/// waiting for admission on a concurrent signal) and releases the registry
/// before any listener runs: listeners added or removed mid-emission are not
/// seen by that emission, and a listener may mutate its own signal.
///
/// # Example
/// ```
/// use signal_dispatch::{EmitContext, Listener, Signal};
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let signal = Signal::<u64>::new_sequential("record_created");
///
/// let count = signal
///     .add_listener(
///         Listener::from_fn(|_ctx, id: u64| async move {
///             println!("created {}", id);
///             Ok(())
///         }),
///         Some("printer"),
///     )
///     .unwrap();
/// assert_eq!(count, 1);
///
/// signal.emit(&EmitContext::background(), 42).await.unwrap();
/// # });
/// ```
pub struct Signal<T: Payload> {
    name: String,
    registry: SharedRegistry<T>,
    dispatcher: Box<dyn Dispatcher<T>>,
}

impl<T: Payload> Signal<T> {
    /// Signal that runs listeners one at a time in registration order
    pub fn new_sequential(name: impl Into<String>) -> Self {
        Self::with_dispatcher(name, Box::new(SequentialDispatcher::new()))
    }

    /// Signal that runs listeners in parallel and serializes its emissions
    pub fn new_concurrent(name: impl Into<String>) -> Self {
        Self::with_dispatcher(name, Box::new(ConcurrentDispatcher::new()))
    }

    pub fn from_config(cfg: &SignalConfig) -> Self {
        Self::with_dispatcher(cfg.name.clone(), DispatcherFactory::from_config(cfg))
    }

    /// Signal driven by a caller-supplied strategy
    pub fn with_dispatcher(name: impl Into<String>, dispatcher: Box<dyn Dispatcher<T>>) -> Self {
        Self {
            name: name.into(),
            registry: SharedRegistry::new(),
            dispatcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> Strategy {
        self.dispatcher.strategy()
    }

    /// Subscribe `listener`, optionally under a unique `key`.
    ///
    /// Returns the new subscriber count, or [`RegistryError::DuplicateKey`]
    /// (no change) when `key` is already subscribed.
    pub fn add_listener(&self, listener: Listener<T>, key: Option<&str>) -> Result<usize, RegistryError> {
        let result = self.write().add(listener, key.map(str::to_string));

        match &result {
            Ok(listener_count) => ListenerAdded {
                signal: &self.name,
                key,
                listener_count: *listener_count,
            }
            .log(),
            Err(RegistryError::DuplicateKey { key }) => DuplicateKeyRejected {
                signal: &self.name,
                key,
            }
            .log(),
            Err(RegistryError::KeyNotFound { .. }) => {}
        }

        result
    }

    /// Unsubscribe the listener registered under `key`.
    ///
    /// Returns the new subscriber count, or [`RegistryError::KeyNotFound`]
    /// (no change) when nothing is subscribed under `key`.
    pub fn remove_listener(&self, key: &str) -> Result<usize, RegistryError> {
        let result = self.write().remove(key);

        match &result {
            Ok(listener_count) => ListenerRemoved {
                signal: &self.name,
                key,
                listener_count: *listener_count,
            }
            .log(),
            Err(_) => ListenerKeyNotFound {
                signal: &self.name,
                key,
            }
            .log(),
        }

        result
    }

    /// Drop every listener
    pub fn reset(&self) {
        let removed_count = {
            let mut registry = self.write();
            let removed_count = registry.len();
            registry.reset();
            removed_count
        };

        RegistryReset {
            signal: &self.name,
            removed_count,
        }
        .log();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Emit `payload` to the listeners subscribed when the emission starts.
    ///
    /// Returns [`EmitError::RolledBack`] when any handler failed; by then the
    /// strategy's rollbacks have all completed. `ctx` reaches every listener
    /// but is not enforced: a listener that ignores it delays the return.
    ///
    /// On a concurrent signal the emission runs to completion even if the
    /// returned future is dropped.
    pub async fn emit(&self, ctx: &EmitContext, payload: T) -> Result<(), EmitError> {
        let started = EmissionStarted {
            signal: &self.name,
            strategy: self.strategy().as_str(),
            listener_count: self.len(),
        };
        started.log();
        let span = started.span("emit");

        self.dispatcher
            .dispatch(&self.name, ctx, payload, &self.registry)
            .instrument(span)
            .await
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry<T>> {
        self.registry.read()
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry<T>> {
        self.registry.write()
    }
}

impl<T: Payload> Default for Signal<T> {
    fn default() -> Self {
        Self::new_concurrent(DEFAULT_SIGNAL_NAME)
    }
}

impl<T: Payload> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("strategy", &self.strategy())
            .field("listener_count", &self.len())
            .finish()
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Listener = handler plus optional compensating rollback.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::context::EmitContext;
use crate::traits::Payload;

/// A callable invoked with the emission context and a copy of the payload.
///
/// Implemented for every `Fn(EmitContext, T) -> impl Future<Output = anyhow::Result<()>>`,
/// so plain async closures can be registered directly.
#[async_trait]
pub trait Handler<T: Payload>: Send + Sync {
    async fn call(&self, ctx: EmitContext, payload: T) -> anyhow::Result<()>;
}

#[async_trait]
impl<T, F, Fut> Handler<T> for F
where
    T: Payload,
    F: Fn(EmitContext, T) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn call(&self, ctx: EmitContext, payload: T) -> anyhow::Result<()> {
        (self)(ctx, payload).await
    }
}

/// A handler/rollback pair registered against a signal.
///
/// The rollback only runs to compensate for a failed emission; its own
/// error is logged and otherwise ignored. A listener without a rollback
/// compensates with a no-op.
pub struct Listener<T: Payload> {
    handler: Arc<dyn Handler<T>>,
    rollback: Option<Arc<dyn Handler<T>>>,
}

impl<T: Payload> Listener<T> {
    /// Listener with no rollback
    pub fn new(handler: impl Handler<T> + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            rollback: None,
        }
    }

    pub fn with_rollback(
        handler: impl Handler<T> + 'static,
        rollback: impl Handler<T> + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            rollback: Some(Arc::new(rollback)),
        }
    }

    /// Listener built from an async closure, with no rollback
    ///
    /// ```
    /// use signal_dispatch::{EmitContext, Listener};
    ///
    /// let listener = Listener::from_fn(|_ctx: EmitContext, id: u64| async move {
    ///     anyhow::ensure!(id != 0, "id must be non-zero");
    ///     Ok(())
    /// });
    /// assert!(!listener.has_rollback());
    /// ```
    pub fn from_fn<F, Fut>(handler: F) -> Self
    where
        F: Fn(EmitContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(handler)
    }

    /// Listener built from a pair of async closures
    pub fn from_fn_with_rollback<F, FutF, R, FutR>(handler: F, rollback: R) -> Self
    where
        F: Fn(EmitContext, T) -> FutF + Send + Sync + 'static,
        FutF: Future<Output = anyhow::Result<()>> + Send + 'static,
        R: Fn(EmitContext, T) -> FutR + Send + Sync + 'static,
        FutR: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::with_rollback(handler, rollback)
    }

    pub fn has_rollback(&self) -> bool {
        self.rollback.is_some()
    }

    pub(crate) async fn handle(&self, ctx: EmitContext, payload: T) -> anyhow::Result<()> {
        self.handler.call(ctx, payload).await
    }

    pub(crate) async fn rollback(&self, ctx: EmitContext, payload: T) -> anyhow::Result<()> {
        match &self.rollback {
            Some(rollback) => rollback.call(ctx, payload).await,
            None => Ok(()),
        }
    }
}

impl<T: Payload> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            rollback: self.rollback.clone(),
        }
    }
}

impl<T: Payload> std::fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("has_rollback", &self.has_rollback())
            .finish()
    }
}

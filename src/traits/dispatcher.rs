// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::config::Strategy;
use crate::context::EmitContext;
use crate::errors::EmitError;
use crate::registry::SharedRegistry;
use crate::traits::Payload;

/// An emission strategy.
///
/// A dispatcher owns no subscribers. The signal hands it the registry; the
/// dispatcher takes one snapshot when the emission actually starts and runs
/// handlers and, on failure, rollbacks over that snapshot according to its
/// policy.
#[async_trait]
pub trait Dispatcher<T: Payload>: Send + Sync {
    /// Emit `payload` to every subscription in `registry`.
    ///
    /// - `signal`: name of the emitting signal, used for logs and the error
    /// - `ctx`: passed through to every handler and rollback, never enforced here
    /// - `registry`: snapshotted once, after any admission wait
    ///
    /// Returns `Err(EmitError::RolledBack)` when any handler failed; rollbacks
    /// have completed by the time it returns.
    async fn dispatch(
        &self,
        signal: &str,
        ctx: &EmitContext,
        payload: T,
        registry: &SharedRegistry<T>,
    ) -> Result<(), EmitError>;

    /// Strategy this dispatcher implements
    fn strategy(&self) -> Strategy;
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sequential dispatch with prefix rollback.
//!
//! Handlers run one after another in registration order on the emitting
//! task. The first failure stops the walk; the listeners that already ran,
//! the failing one included, are then rolled back in that same order.
//!
//! ```text
//! handlers:   L0 ok -> L1 ok -> L2 FAIL    (L3.. never run)
//! rollbacks:  L0 -> L1 -> L2
//! ```

use async_trait::async_trait;
use std::time::Instant;

use crate::config::Strategy;
use crate::context::EmitContext;
use crate::errors::EmitError;
use crate::observability::messages::dispatch::{
    EmissionCompleted, EmissionRolledBack, ListenerFailed, RollbackFailed, RollbackStarted,
};
use crate::observability::messages::StructuredLog;
use crate::registry::{SharedRegistry, Subscription};
use crate::traits::{Dispatcher, Payload};

/// Runs listeners one at a time. Stateless; emissions on the same signal are
/// not serialized against each other.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialDispatcher;

impl SequentialDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Roll back `subscribers[..=failed_at]` in registration order, ignoring
    /// rollback errors.
    async fn roll_back<T: Payload>(
        signal: &str,
        ctx: &EmitContext,
        payload: &T,
        subscribers: &[Subscription<T>],
        failed_at: usize,
    ) {
        for (index, subscription) in subscribers[..=failed_at].iter().enumerate() {
            let result = subscription
                .listener()
                .rollback(ctx.clone(), payload.clone())
                .await;

            if let Err(error) = result {
                RollbackFailed {
                    signal,
                    index,
                    key: subscription.key(),
                    error: &error,
                }
                .log();
            }
        }
    }
}

#[async_trait]
impl<T: Payload> Dispatcher<T> for SequentialDispatcher {
    async fn dispatch(
        &self,
        signal: &str,
        ctx: &EmitContext,
        payload: T,
        registry: &SharedRegistry<T>,
    ) -> Result<(), EmitError> {
        let started = Instant::now();
        let subscribers = registry.snapshot();
        let strategy = Strategy::Sequential.as_str();

        let mut failed_at = None;
        for (index, subscription) in subscribers.iter().enumerate() {
            let result = subscription
                .listener()
                .handle(ctx.clone(), payload.clone())
                .await;

            if let Err(error) = result {
                ListenerFailed {
                    signal,
                    index,
                    key: subscription.key(),
                    error: &error,
                }
                .log();
                failed_at = Some(index);
                break;
            }
        }

        let Some(failed_at) = failed_at else {
            EmissionCompleted {
                signal,
                strategy,
                listener_count: subscribers.len(),
                duration: started.elapsed(),
            }
            .log();
            return Ok(());
        };

        RollbackStarted {
            signal,
            strategy,
            failed_count: 1,
            rollback_count: failed_at + 1,
        }
        .log();

        Self::roll_back(signal, ctx, &payload, &subscribers, failed_at).await;

        EmissionRolledBack {
            signal,
            strategy,
            rollback_count: failed_at + 1,
            duration: started.elapsed(),
        }
        .log();

        Err(EmitError::RolledBack {
            signal: signal.to_string(),
            strategy: Strategy::Sequential,
        })
    }

    fn strategy(&self) -> Strategy {
        Strategy::Sequential
    }
}

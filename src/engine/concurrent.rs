// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Concurrent dispatch with all-listener rollback.
//!
//! ## Execution Strategy
//!
//! 1. **Fan out**: one tokio task per subscription runs its handler
//! 2. **Barrier**: wait for every handler task, recording failures by index
//! 3. **Compensate**: if any handler failed, one task per subscription runs its
//!    rollback, including listeners whose handler succeeded
//! 4. **Barrier**: wait for every rollback task, then report `RolledBack`
//!
//! Because handlers overlap in time there is no "already ran" prefix to
//! compensate, so the policy is to undo everyone. A successful handler's
//! rollback therefore runs whenever a sibling fails.
//!
//! ## Single Flight
//!
//! One dispatcher instance admits one emission at a time: a second `dispatch`
//! waits until the first has finished its rollback phase, then snapshots the
//! registry. Listeners inside a single emission still run in parallel.
//!
//! ## Cancellation
//!
//! The context is only passed through. The whole emission (admission,
//! snapshot, both phases) runs as one spawned task that `dispatch` awaits.
//! Dropping the `dispatch` future detaches from that task without stopping
//! it: the emission still waits for every handler, still rolls back, and
//! keeps the next emission out until it has. A listener that never returns
//! keeps `emit` from returning.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span};

use crate::config::Strategy;
use crate::context::EmitContext;
use crate::errors::EmitError;
use crate::observability::messages::dispatch::{
    EmissionCompleted, EmissionRolledBack, ListenerFailed, ListenerPanicked, RollbackFailed,
    RollbackStarted,
};
use crate::observability::messages::StructuredLog;
use crate::registry::{SharedRegistry, Subscription};
use crate::traits::{Dispatcher, Payload};

/// Handler failures of one emission, one slot per subscription.
///
/// Written concurrently by handler tasks; read once all of them have joined.
struct ErrorList {
    errors: Mutex<Vec<Option<anyhow::Error>>>,
}

impl ErrorList {
    fn new(len: usize) -> Self {
        Self {
            errors: Mutex::new((0..len).map(|_| None).collect()),
        }
    }

    async fn record(&self, index: usize, error: anyhow::Error) {
        let mut errors = self.errors.lock().await;
        errors[index] = Some(error);
    }

    /// Recorded failures in subscription order
    async fn drain(&self) -> Vec<(usize, anyhow::Error)> {
        let mut errors = self.errors.lock().await;
        errors
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.take().map(|error| (index, error)))
            .collect()
    }
}

/// Runs all listeners of an emission in parallel tokio tasks.
///
/// Must be driven from within a tokio runtime.
#[derive(Debug, Default)]
pub struct ConcurrentDispatcher {
    in_flight: Arc<Mutex<()>>,
}

impl ConcurrentDispatcher {
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Both phases of one admitted emission over `subscribers`.
    async fn run_emission<T: Payload>(
        signal: &str,
        ctx: &EmitContext,
        payload: T,
        subscribers: Vec<Subscription<T>>,
    ) -> Result<(), EmitError> {
        let started = Instant::now();
        let strategy = Strategy::Concurrent.as_str();

        let failures = Self::run_handlers(signal, ctx, &payload, &subscribers).await;

        if failures.is_empty() {
            EmissionCompleted {
                signal,
                strategy,
                listener_count: subscribers.len(),
                duration: started.elapsed(),
            }
            .log();
            return Ok(());
        }

        for (index, error) in &failures {
            ListenerFailed {
                signal,
                index: *index,
                key: subscribers[*index].key(),
                error,
            }
            .log();
        }

        RollbackStarted {
            signal,
            strategy,
            failed_count: failures.len(),
            rollback_count: subscribers.len(),
        }
        .log();

        Self::run_rollbacks(signal, ctx, &payload, &subscribers).await;

        EmissionRolledBack {
            signal,
            strategy,
            rollback_count: subscribers.len(),
            duration: started.elapsed(),
        }
        .log();

        Err(EmitError::RolledBack {
            signal: signal.to_string(),
            strategy: Strategy::Concurrent,
        })
    }

    /// Spawn every handler and wait for all of them.
    async fn run_handlers<T: Payload>(
        signal: &str,
        ctx: &EmitContext,
        payload: &T,
        subscribers: &[Subscription<T>],
    ) -> Vec<(usize, anyhow::Error)> {
        let errors = Arc::new(ErrorList::new(subscribers.len()));

        let tasks: Vec<JoinHandle<()>> = subscribers
            .iter()
            .enumerate()
            .map(|(index, subscription)| {
                let listener = subscription.listener().clone();
                let ctx = ctx.clone();
                let payload = payload.clone();
                let errors = errors.clone();

                tokio::spawn(async move {
                    if let Err(error) = listener.handle(ctx, payload).await {
                        errors.record(index, error).await;
                    }
                })
            })
            .collect();

        for (index, task) in tasks.into_iter().enumerate() {
            if let Err(join_error) = task.await {
                let reason = join_error.to_string();
                ListenerPanicked {
                    signal,
                    index,
                    key: subscribers[index].key(),
                    reason: &reason,
                }
                .log();
                errors
                    .record(index, anyhow::anyhow!("handler task failed: {}", reason))
                    .await;
            }
        }

        errors.drain().await
    }

    /// Spawn the rollback of every listener that has one and wait for all of
    /// them. Failures are logged and dropped.
    async fn run_rollbacks<T: Payload>(
        signal: &str,
        ctx: &EmitContext,
        payload: &T,
        subscribers: &[Subscription<T>],
    ) {
        let tasks: Vec<(usize, JoinHandle<anyhow::Result<()>>)> = subscribers
            .iter()
            .enumerate()
            .filter(|(_, subscription)| subscription.listener().has_rollback())
            .map(|(index, subscription)| {
                let listener = subscription.listener().clone();
                let ctx = ctx.clone();
                let payload = payload.clone();

                let task = tokio::spawn(async move { listener.rollback(ctx, payload).await });
                (index, task)
            })
            .collect();

        for (index, task) in tasks {
            let key = subscribers[index].key();
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => RollbackFailed {
                    signal,
                    index,
                    key,
                    error: &error,
                }
                .log(),
                Err(join_error) => RollbackFailed {
                    signal,
                    index,
                    key,
                    error: &join_error,
                }
                .log(),
            }
        }
    }
}

#[async_trait]
impl<T: Payload> Dispatcher<T> for ConcurrentDispatcher {
    async fn dispatch(
        &self,
        signal: &str,
        ctx: &EmitContext,
        payload: T,
        registry: &SharedRegistry<T>,
    ) -> Result<(), EmitError> {
        let in_flight = self.in_flight.clone();
        let registry = registry.clone();
        let ctx = ctx.clone();
        let name = signal.to_string();

        let emission = tokio::spawn(
            async move {
                let _flight = in_flight.lock_owned().await;
                let subscribers = registry.snapshot();
                Self::run_emission(&name, &ctx, payload, subscribers).await
            }
            .instrument(Span::current()),
        );

        match emission.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_panic() => {
                std::panic::resume_unwind(join_error.into_panic())
            }
            // cancelled only when the runtime shuts down mid-emission
            Err(_) => Err(EmitError::RolledBack {
                signal: signal.to_string(),
                strategy: Strategy::Concurrent,
            }),
        }
    }

    fn strategy(&self) -> Strategy {
        Strategy::Concurrent
    }
}

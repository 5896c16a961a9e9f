// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for emission lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Emission start and completion for both strategies
//! * Individual handler failures (which `emit` does not report in detail)
//! * The rollback phase and rollbacks that themselves fail

use super::{listener_label, StructuredLog};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Emission started.
///
/// # Log Level
/// `debug!` - Emitted once per `emit` call
///
/// # Example
/// ```
/// use signal_dispatch::observability::messages::dispatch::EmissionStarted;
///
/// let msg = EmissionStarted {
///     signal: "record_created",
///     strategy: "sequential",
///     listener_count: 2,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Emitting signal 'record_created' with sequential strategy to 2 listeners"
/// );
/// ```
pub struct EmissionStarted<'a> {
    pub signal: &'a str,
    pub strategy: &'a str,
    pub listener_count: usize,
}

impl Display for EmissionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Emitting signal '{}' with {} strategy to {} listeners",
            self.signal, self.strategy, self.listener_count
        )
    }
}

impl StructuredLog for EmissionStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            signal = self.signal,
            strategy = self.strategy,
            listener_count = self.listener_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "emission",
            span_name = name,
            signal = self.signal,
            strategy = self.strategy,
            listener_count = self.listener_count,
        )
    }
}

/// Emission completed with every handler succeeding.
///
/// # Log Level
/// `debug!` - Emitted once per successful `emit` call
pub struct EmissionCompleted<'a> {
    pub signal: &'a str,
    pub strategy: &'a str,
    pub listener_count: usize,
    pub duration: Duration,
}

impl Display for EmissionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signal '{}' emitted with {} strategy: {} listeners in {:?}",
            self.signal, self.strategy, self.listener_count, self.duration
        )
    }
}

impl StructuredLog for EmissionCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            signal = self.signal,
            strategy = self.strategy,
            listener_count = self.listener_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "emission_completed",
            span_name = name,
            signal = self.signal,
            strategy = self.strategy,
            listener_count = self.listener_count,
            duration = ?self.duration,
        )
    }
}

/// A handler returned an error.
///
/// # Log Level
/// `warn!` - The emission will be rolled back
///
/// # Example
/// ```
/// use signal_dispatch::observability::messages::dispatch::ListenerFailed;
///
/// let error = anyhow::anyhow!("constraint violated");
/// let msg = ListenerFailed {
///     signal: "record_updated",
///     index: 0,
///     key: None,
///     error: &error,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Signal 'record_updated': listener #0 failed: constraint violated"
/// );
/// ```
pub struct ListenerFailed<'a> {
    pub signal: &'a str,
    pub index: usize,
    pub key: Option<&'a str>,
    pub error: &'a anyhow::Error,
}

impl Display for ListenerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signal '{}': {} failed: {:#}",
            self.signal,
            listener_label(self.index, self.key),
            self.error
        )
    }
}

impl StructuredLog for ListenerFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            signal = self.signal,
            index = self.index,
            key = ?self.key,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "listener_failed",
            span_name = name,
            signal = self.signal,
            index = self.index,
            key = ?self.key,
            error = %self.error,
        )
    }
}

/// A concurrently dispatched handler task panicked.
///
/// # Log Level
/// `error!` - A bug in listener code; counted as a handler failure
pub struct ListenerPanicked<'a> {
    pub signal: &'a str,
    pub index: usize,
    pub key: Option<&'a str>,
    pub reason: &'a str,
}

impl Display for ListenerPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signal '{}': {} panicked: {}",
            self.signal,
            listener_label(self.index, self.key),
            self.reason
        )
    }
}

impl StructuredLog for ListenerPanicked<'_> {
    fn log(&self) {
        tracing::error!(
            signal = self.signal,
            index = self.index,
            key = ?self.key,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "listener_panicked",
            span_name = name,
            signal = self.signal,
            index = self.index,
            key = ?self.key,
            reason = self.reason,
        )
    }
}

/// Rollback phase started.
///
/// # Log Level
/// `warn!` - Compensation is running
///
/// # Example
/// ```
/// use signal_dispatch::observability::messages::dispatch::RollbackStarted;
///
/// let msg = RollbackStarted {
///     signal: "record_deleted",
///     strategy: "concurrent",
///     failed_count: 1,
///     rollback_count: 3,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Signal 'record_deleted': 1 handler(s) failed, rolling back 3 listener(s) with concurrent strategy"
/// );
/// ```
pub struct RollbackStarted<'a> {
    pub signal: &'a str,
    pub strategy: &'a str,
    pub failed_count: usize,
    pub rollback_count: usize,
}

impl Display for RollbackStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signal '{}': {} handler(s) failed, rolling back {} listener(s) with {} strategy",
            self.signal, self.failed_count, self.rollback_count, self.strategy
        )
    }
}

impl StructuredLog for RollbackStarted<'_> {
    fn log(&self) {
        tracing::warn!(
            signal = self.signal,
            strategy = self.strategy,
            failed_count = self.failed_count,
            rollback_count = self.rollback_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "rollback",
            span_name = name,
            signal = self.signal,
            strategy = self.strategy,
            failed_count = self.failed_count,
            rollback_count = self.rollback_count,
        )
    }
}

/// A rollback returned an error or panicked. The failure is otherwise ignored.
///
/// # Log Level
/// `warn!` - Compensation was incomplete
pub struct RollbackFailed<'a> {
    pub signal: &'a str,
    pub index: usize,
    pub key: Option<&'a str>,
    pub error: &'a dyn Display,
}

impl Display for RollbackFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signal '{}': rollback of {} failed (ignored): {}",
            self.signal,
            listener_label(self.index, self.key),
            self.error
        )
    }
}

impl StructuredLog for RollbackFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            signal = self.signal,
            index = self.index,
            key = ?self.key,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "rollback_failed",
            span_name = name,
            signal = self.signal,
            index = self.index,
            key = ?self.key,
            error = %self.error,
        )
    }
}

/// Emission finished its rollback phase and reports failure to the caller.
///
/// # Log Level
/// `warn!` - The caller receives `EmitError::RolledBack`
pub struct EmissionRolledBack<'a> {
    pub signal: &'a str,
    pub strategy: &'a str,
    pub rollback_count: usize,
    pub duration: Duration,
}

impl Display for EmissionRolledBack<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signal '{}' rolled back with {} strategy: {} rollback(s) in {:?}",
            self.signal, self.strategy, self.rollback_count, self.duration
        )
    }
}

impl StructuredLog for EmissionRolledBack<'_> {
    fn log(&self) {
        tracing::warn!(
            signal = self.signal,
            strategy = self.strategy,
            rollback_count = self.rollback_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "emission_rolled_back",
            span_name = name,
            signal = self.signal,
            strategy = self.strategy,
            rollback_count = self.rollback_count,
            duration = ?self.duration,
        )
    }
}

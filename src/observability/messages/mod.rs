// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `registry` - listener subscription, removal and reset
//! * `dispatch` - emission lifecycle, listener failures and rollbacks
//!
//! # Usage Pattern
//!
//! ```rust
//! use signal_dispatch::observability::messages::dispatch::EmissionStarted;
//! use signal_dispatch::observability::messages::StructuredLog;
//!
//! let msg = EmissionStarted {
//!     signal: "record_created",
//!     strategy: "concurrent",
//!     listener_count: 3,
//! };
//!
//! tracing::info!("{}", msg);
//! let _span = msg.span("emit").entered();
//! ```

use tracing::Span;

pub mod dispatch;
pub mod registry;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit this message as a `tracing` event at the message's level
    fn log(&self);

    /// Build a span carrying this message's fields
    fn span(&self, name: &str) -> Span;
}

/// Human-readable listener label: `listener #2 ('audit')` or `listener #0`.
pub(crate) fn listener_label(index: usize, key: Option<&str>) -> String {
    match key {
        Some(key) => format!("listener #{} ('{}')", index, key),
        None => format!("listener #{}", index),
    }
}

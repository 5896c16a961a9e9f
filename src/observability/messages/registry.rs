// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for listener registration events.

use super::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A listener was subscribed.
///
/// # Log Level
/// `debug!` - Routine registry mutation
///
/// # Example
/// ```
/// use signal_dispatch::observability::messages::registry::ListenerAdded;
///
/// let msg = ListenerAdded {
///     signal: "record_created",
///     key: Some("audit"),
///     listener_count: 3,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Signal 'record_created': added listener 'audit', 3 listener(s) subscribed"
/// );
/// ```
pub struct ListenerAdded<'a> {
    pub signal: &'a str,
    pub key: Option<&'a str>,
    pub listener_count: usize,
}

impl Display for ListenerAdded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.key {
            Some(key) => write!(
                f,
                "Signal '{}': added listener '{}', {} listener(s) subscribed",
                self.signal, key, self.listener_count
            ),
            None => write!(
                f,
                "Signal '{}': added unkeyed listener, {} listener(s) subscribed",
                self.signal, self.listener_count
            ),
        }
    }
}

impl StructuredLog for ListenerAdded<'_> {
    fn log(&self) {
        tracing::debug!(
            signal = self.signal,
            key = ?self.key,
            listener_count = self.listener_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "listener_added",
            span_name = name,
            signal = self.signal,
            key = ?self.key,
            listener_count = self.listener_count,
        )
    }
}

/// A keyed add was rejected because the key is taken.
///
/// # Log Level
/// `debug!` - Callers are expected to handle this inline
pub struct DuplicateKeyRejected<'a> {
    pub signal: &'a str,
    pub key: &'a str,
}

impl Display for DuplicateKeyRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signal '{}': listener key '{}' already subscribed, add ignored",
            self.signal, self.key
        )
    }
}

impl StructuredLog for DuplicateKeyRejected<'_> {
    fn log(&self) {
        tracing::debug!(signal = self.signal, key = self.key, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "duplicate_key_rejected",
            span_name = name,
            signal = self.signal,
            key = self.key,
        )
    }
}

/// A keyed listener was removed.
///
/// # Log Level
/// `debug!` - Routine registry mutation
pub struct ListenerRemoved<'a> {
    pub signal: &'a str,
    pub key: &'a str,
    pub listener_count: usize,
}

impl Display for ListenerRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signal '{}': removed listener '{}', {} listener(s) subscribed",
            self.signal, self.key, self.listener_count
        )
    }
}

impl StructuredLog for ListenerRemoved<'_> {
    fn log(&self) {
        tracing::debug!(
            signal = self.signal,
            key = self.key,
            listener_count = self.listener_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "listener_removed",
            span_name = name,
            signal = self.signal,
            key = self.key,
            listener_count = self.listener_count,
        )
    }
}

/// Removal of an unknown key.
///
/// # Log Level
/// `debug!` - Callers are expected to handle this inline
pub struct ListenerKeyNotFound<'a> {
    pub signal: &'a str,
    pub key: &'a str,
}

impl Display for ListenerKeyNotFound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signal '{}': no listener with key '{}', remove ignored",
            self.signal, self.key
        )
    }
}

impl StructuredLog for ListenerKeyNotFound<'_> {
    fn log(&self) {
        tracing::debug!(signal = self.signal, key = self.key, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "listener_key_not_found",
            span_name = name,
            signal = self.signal,
            key = self.key,
        )
    }
}

/// All listeners were dropped.
///
/// # Log Level
/// `info!` - Changes what every later emission reaches
pub struct RegistryReset<'a> {
    pub signal: &'a str,
    pub removed_count: usize,
}

impl Display for RegistryReset<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signal '{}' reset: {} listener(s) removed",
            self.signal, self.removed_count
        )
    }
}

impl StructuredLog for RegistryReset<'_> {
    fn log(&self) {
        tracing::info!(
            signal = self.signal,
            removed_count = self.removed_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "registry_reset",
            span_name = name,
            signal = self.signal,
            removed_count = self.removed_count,
        )
    }
}

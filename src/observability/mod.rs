// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic output of the crate goes through message types defined in
//! [`messages`]. Each message is a plain struct implementing `Display` for the
//! human-readable line and [`messages::StructuredLog`] for emitting it with
//! structured fields at its fixed level. Listener errors only surface here;
//! `emit` reports a failed emission without them.
//!
//! # Usage
//!
//! ```rust
//! use signal_dispatch::observability::messages::dispatch::ListenerFailed;
//! use signal_dispatch::observability::messages::StructuredLog;
//!
//! let error = anyhow::anyhow!("database unavailable");
//! let msg = ListenerFailed {
//!     signal: "record_created",
//!     index: 1,
//!     key: Some("audit"),
//!     error: &error,
//! };
//!
//! msg.log();
//! ```
//!
//! Subscribers are not installed by this crate; the host application picks
//! its own `tracing` subscriber.

pub mod messages;

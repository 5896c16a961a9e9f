// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed in-process signals with transactional dispatch.
//!
//! A [`Signal`] holds an ordered set of [`Listener`]s and delivers each
//! emitted payload to all of them. A failing handler makes the emission roll
//! back: the sequential strategy compensates the listeners that already ran,
//! the concurrent strategy compensates every listener.

pub mod config;     // signal config + loader
pub mod context;    // cancellation and deadlines
pub mod engine;     // dispatch strategies
pub mod errors;     // error handling
pub mod listener;
pub mod observability;
pub mod registry;
pub mod signal;
pub mod traits;     // unified abstractions

pub use config::{load_config, SignalConfig, Strategy};
pub use context::EmitContext;
pub use engine::{ConcurrentDispatcher, DispatcherFactory, SequentialDispatcher};
pub use errors::{ConfigError, EmitError, RegistryError};
pub use listener::{Handler, Listener};
pub use registry::{Registry, SharedRegistry, Subscription};
pub use signal::Signal;
pub use traits::{Dispatcher, Payload};

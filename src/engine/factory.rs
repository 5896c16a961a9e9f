// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{SignalConfig, Strategy};
use crate::engine::concurrent::ConcurrentDispatcher;
use crate::engine::sequential::SequentialDispatcher;
use crate::traits::{Dispatcher, Payload};

/// Factory for creating dispatchers from configuration
pub struct DispatcherFactory;

impl DispatcherFactory {
    /// Create a dispatcher based on the configuration strategy
    pub fn from_config<T: Payload>(cfg: &SignalConfig) -> Box<dyn Dispatcher<T>> {
        Self::for_strategy(cfg.strategy)
    }

    pub fn for_strategy<T: Payload>(strategy: Strategy) -> Box<dyn Dispatcher<T>> {
        match strategy {
            Strategy::Sequential => Box::new(SequentialDispatcher::new()),
            Strategy::Concurrent => Box::new(ConcurrentDispatcher::new()),
        }
    }
}

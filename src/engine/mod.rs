// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod concurrent;
pub mod factory;
pub mod sequential;
#[cfg(test)]
pub mod integration_tests;
#[cfg(test)]
pub(crate) mod test_support;

pub use concurrent::ConcurrentDispatcher;
pub use factory::DispatcherFactory;
pub use sequential::SequentialDispatcher;

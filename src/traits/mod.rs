// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod dispatcher;
pub mod payload;

pub use dispatcher::Dispatcher;
pub use payload::Payload;

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Anything a signal can carry.
///
/// Each listener receives its own clone, and concurrent dispatch moves
/// those clones onto spawned tasks.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}

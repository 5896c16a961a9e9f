// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Outcomes of registry mutation that callers check inline.

use thiserror::Error;

/// Rejected registry mutations.
///
/// Neither variant changes the registry; the subscriber count is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A listener with this key is already subscribed.
    #[error("listener with key '{key}' is already subscribed")]
    DuplicateKey { key: String },

    /// No listener is subscribed under this key.
    #[error("no listener subscribed with key '{key}'")]
    KeyNotFound { key: String },
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;

pub use loader::{load_config, SignalConfig, Strategy, DEFAULT_SIGNAL_NAME};

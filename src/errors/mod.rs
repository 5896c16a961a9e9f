// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod emit;
mod registry;

pub use config::ConfigError;
pub use emit::EmitError;
pub use registry::RegistryError;

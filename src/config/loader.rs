// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Name given to signals built without an explicit one.
pub const DEFAULT_SIGNAL_NAME: &str = "signal";

/// Configuration for a single signal.
///
/// # Fields
/// * `name` - Label used in logs and in `EmitError` (optional, defaults to "signal")
/// * `strategy` - Dispatch strategy (optional, defaults to concurrent)
///
/// # Example
/// ```yaml
/// name: record_created
/// strategy: sequential
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SignalConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub strategy: Strategy,
}

fn default_name() -> String {
    DEFAULT_SIGNAL_NAME.to_string()
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            strategy: Strategy::default(),
        }
    }
}

impl SignalConfig {
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }
}

/// How a signal runs its listeners.
///
/// # Variants
/// * `Sequential` - One at a time in registration order; on the first failure,
///   roll back the listeners run so far (the failing one included) and stop
/// * `Concurrent` - All at once; if any fails, roll back every listener
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Sequential,
    #[default]
    Concurrent,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Concurrent => "concurrent",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load a signal config from a YAML, JSON or TOML file, chosen by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SignalConfig, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let parse: fn(&str) -> Result<SignalConfig, ConfigError> = match extension.as_deref() {
        Some("yaml") | Some("yml") => |content| Ok(serde_yaml::from_str(content)?),
        Some("json") => |content| Ok(serde_json::from_str(content)?),
        Some("toml") => |content| Ok(toml::from_str(content)?),
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    let content = fs::read_to_string(path)?;
    parse(&content)
}

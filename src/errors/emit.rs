// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Strategy;
use thiserror::Error;

/// The only failure `emit` reports.
///
/// At least one handler failed and the active strategy ran its rollbacks.
/// Which listener failed, and why, is logged but not carried here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error("there was an error emitting signal, rollback was called")]
    RolledBack { signal: String, strategy: Strategy },
}

impl EmitError {
    /// Name of the signal whose emission was rolled back
    pub fn signal(&self) -> &str {
        match self {
            EmitError::RolledBack { signal, .. } => signal,
        }
    }

    /// Strategy that performed the rollback
    pub fn strategy(&self) -> Strategy {
        match self {
            EmitError::RolledBack { strategy, .. } => *strategy,
        }
    }
}

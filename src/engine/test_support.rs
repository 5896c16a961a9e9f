// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Recording listeners shared by the engine tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::context::EmitContext;
use crate::listener::{Handler, Listener};

/// Ordered log of handler and rollback invocations, e.g. `"handle:a:1"`.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Entries for one phase, in the order they were recorded
    pub fn phase(&self, phase: &str) -> Vec<String> {
        let prefix = format!("{}:", phase);
        self.entries()
            .into_iter()
            .filter(|entry| entry.starts_with(&prefix))
            .collect()
    }
}

pub struct Recorder {
    name: String,
    phase: &'static str,
    delay: Duration,
    fail: bool,
    journal: Journal,
}

#[async_trait]
impl Handler<u32> for Recorder {
    async fn call(&self, _ctx: EmitContext, payload: u32) -> anyhow::Result<()> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.journal
            .push(format!("{}:{}:{}", self.phase, self.name, payload));
        if self.fail {
            anyhow::bail!("{} of '{}' failed", self.phase, self.name);
        }
        Ok(())
    }
}

/// Mock listener builder
pub struct MockListener {
    name: String,
    delay: Duration,
    fail_handle: bool,
    fail_rollback: bool,
}

impl MockListener {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            delay: Duration::ZERO,
            fail_handle: false,
            fail_rollback: false,
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_handle = true;
        self
    }

    pub fn failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn build(self, journal: &Journal) -> Listener<u32> {
        Listener::with_rollback(
            Recorder {
                name: self.name.clone(),
                phase: "handle",
                delay: self.delay,
                fail: self.fail_handle,
                journal: journal.clone(),
            },
            Recorder {
                name: self.name,
                phase: "rollback",
                delay: Duration::ZERO,
                fail: self.fail_rollback,
                journal: journal.clone(),
            },
        )
    }
}

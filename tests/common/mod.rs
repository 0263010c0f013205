#![allow(dead_code)]

use pantry::{FetchError, Record};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Route crate logs to the test harness. Controlled by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: &'static str,
}

impl Record for Item {
    type Id = &'static str;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

pub fn items(ids: &[&'static str]) -> Vec<Item> {
    ids.iter().map(|&id| Item { id }).collect()
}

/// Per-call script for a closure source: wait, then answer.
#[derive(Debug, Clone)]
pub struct Scripted {
    pub delay: Duration,
    pub outcome: Result<Vec<Item>, FetchError>,
}

impl Scripted {
    pub fn ok(delay_ms: u64, ids: &[&'static str]) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            outcome: Ok(items(ids)),
        }
    }

    pub fn err(delay_ms: u64, error: FetchError) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            outcome: Err(error),
        }
    }
}

/// Progress reporting
///
/// A run reports a [`ProgressUpdate`] on every stage change to an injected
/// [`ProgressSink`]. Two sinks ship with the crate:
/// - [`ProgressStore`]: keeps every update per run for polling
/// - [`ProgressBus`]: pushes updates to channel subscribers
pub mod bus;
pub mod store;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::pipeline::RunState;

pub use bus::{ProgressBus, SubscriberId};
pub use store::ProgressStore;

/// Identifier of one extraction run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Process-unique id built from the clock and a counter
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("run-{}-{}", millis, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One progress report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub run_id: RunId,
    pub stage: RunState,
    /// 0-100, never decreasing within a run
    pub percentage: u8,
    /// Results available so far (metadata, then the full result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<serde_json::Value>,
    /// Set only on `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressUpdate {
    pub fn new(run_id: RunId, stage: RunState, percentage: u8) -> Self {
        Self {
            run_id,
            stage,
            percentage,
            partial: None,
            error: None,
        }
    }

    pub fn with_partial(mut self, partial: serde_json::Value) -> Self {
        self.partial = Some(partial);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_finished(&self) -> bool {
        self.stage.is_terminal()
    }
}

/// Receiver of progress updates
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

impl<T: ProgressSink + ?Sized> ProgressSink for Arc<T> {
    fn report(&self, update: ProgressUpdate) {
        (**self).report(update)
    }
}

/// Sink that drops every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _update: ProgressUpdate) {}
}

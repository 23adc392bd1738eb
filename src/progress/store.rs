/// Polling progress store
///
/// Keeps every update per run so a caller can look up a run's progress by
/// id while it is still executing. Updates for a run are only ever
/// appended.
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{ProgressSink, ProgressUpdate, RunId};

#[derive(Debug, Clone, Default)]
pub struct ProgressStore {
    runs: Arc<RwLock<HashMap<RunId, Vec<ProgressUpdate>>>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent update for `run_id`
    pub fn latest(&self, run_id: &RunId) -> Option<ProgressUpdate> {
        self.runs
            .read()
            .get(run_id)
            .and_then(|updates| updates.last().cloned())
    }

    /// All updates for `run_id`, oldest first
    pub fn history(&self, run_id: &RunId) -> Vec<ProgressUpdate> {
        self.runs.read().get(run_id).cloned().unwrap_or_default()
    }

    pub fn is_finished(&self, run_id: &RunId) -> bool {
        self.latest(run_id)
            .map(|update| update.is_finished())
            .unwrap_or(false)
    }

    /// Drop a run's history, returning it
    pub fn remove(&self, run_id: &RunId) -> Option<Vec<ProgressUpdate>> {
        self.runs.write().remove(run_id)
    }

    /// Number of tracked runs
    pub fn run_count(&self) -> usize {
        self.runs.read().len()
    }
}

impl ProgressSink for ProgressStore {
    fn report(&self, update: ProgressUpdate) {
        let mut runs = self.runs.write();
        let history = runs.entry(update.run_id.clone()).or_default();

        if let Some(last) = history.last() {
            if update.percentage < last.percentage {
                tracing::warn!(
                    run_id = %update.run_id,
                    "Progress went backwards: {} -> {}",
                    last.percentage,
                    update.percentage
                );
            }
        }

        history.push(update);
    }
}

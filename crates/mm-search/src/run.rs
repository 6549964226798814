//! Run lifecycle tracking for a search coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique search run identifier.
pub type RunId = Uuid;

/// Lifecycle state for a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Where a coordinator's run currently stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub id: RunId,
    pub state: RunState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl RunStatus {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: RunState::Pending,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// The first start time is kept when a run is resumed.
    pub fn mark_running(&mut self) {
        self.state = RunState::Running;
        self.started_at.get_or_insert_with(Utc::now);
        self.finished_at = None;
    }

    pub fn mark_completed(&mut self) {
        self.state = RunState::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, error: String) {
        self.state = RunState::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_lifecycle() {
        let mut status = RunStatus::new();
        assert_eq!(status.state, RunState::Pending);
        assert!(status.started_at.is_none());

        status.mark_running();
        assert_eq!(status.state, RunState::Running);
        let started = status.started_at;
        assert!(started.is_some());
        assert!(status.finished_at.is_none());

        status.mark_completed();
        assert_eq!(status.state, RunState::Completed);
        assert!(status.finished_at.is_some());

        status.mark_running();
        assert_eq!(status.started_at, started);
        assert!(status.finished_at.is_none());
    }

    #[test]
    fn run_failure_keeps_message() {
        let mut status = RunStatus::new();
        status.mark_running();
        status.mark_failed("objective panicked".into());
        assert_eq!(status.state, RunState::Failed);
        assert!(status.finished_at.is_some());
        assert_eq!(status.error.as_deref(), Some("objective panicked"));
    }
}

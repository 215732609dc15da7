// ── Asynchronous task waiter ──
//
// Polls an action status until the manager reports `done`, rejects the
// request at validation, or the polling budget runs out. Elapsed time
// is the sum of the sleeps; an in-flight request is never cancelled.

use std::future::Future;
use std::time::Duration;

use strum::Display;
use tracing::{debug, info, warn};
use vpush_api::{ManagerClient, TaskDevice, TaskStatus};

use crate::config::PollSettings;

/// Status text for a task whose polling budget ran out.
pub const TIMEOUT_STATUS: &str = "Timeout";
/// Status text for a task whose status could not be read.
pub const UNAVAILABLE_STATUS: &str = "Status unavailable";

const DONE: &str = "done";

/// Where task status snapshots come from.
pub trait TaskStatusSource {
    fn task_status(
        &self,
        task_id: &str,
    ) -> impl Future<Output = Result<TaskStatus, vpush_api::Error>>;
}

impl TaskStatusSource for ManagerClient {
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, vpush_api::Error> {
        self.action_status(task_id).await
    }
}

/// Terminal state of a waited-on task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TaskState {
    Done,
    ValidationFailed,
    TimedOut,
    Unavailable,
}

/// What the waiter saw last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub state: TaskState,
    /// `"done"`, `"Validation <detail>"`, `"Timeout"`, or `"Status unavailable"`.
    pub status: String,
    /// Per-device entries from the last fetched snapshot.
    ///
    /// On timeout this may be a non-final snapshot. Empty after a
    /// validation failure or an unreadable status.
    pub devices: Vec<TaskDevice>,
}

/// Fixed-interval poller for a single task.
#[derive(Debug, Clone, Copy)]
pub struct TaskWaiter {
    interval: Duration,
    max_wait: Duration,
}

impl TaskWaiter {
    pub fn new(settings: PollSettings) -> Self {
        Self {
            // A zero interval would never advance the elapsed counter.
            interval: settings.interval.max(Duration::from_millis(1)),
            max_wait: settings.max_wait,
        }
    }

    pub async fn wait<S: TaskStatusSource>(&self, source: &S, task_id: &str) -> TaskResult {
        let mut elapsed = Duration::ZERO;
        let mut last: Vec<TaskDevice> = Vec::new();

        loop {
            if elapsed >= self.max_wait {
                warn!(
                    task_id,
                    waited_secs = elapsed.as_secs(),
                    "task did not finish in time"
                );
                return TaskResult {
                    state: TaskState::TimedOut,
                    status: TIMEOUT_STATUS.into(),
                    devices: last,
                };
            }

            let snapshot = match source.task_status(task_id).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(task_id, error = %e, "task status poll failed");
                    return TaskResult {
                        state: TaskState::Unavailable,
                        status: UNAVAILABLE_STATUS.into(),
                        devices: Vec::new(),
                    };
                }
            };

            // An empty result list means the manager refused the request
            // before creating any per-device work.
            if snapshot.data.is_empty() {
                let detail = snapshot
                    .validation
                    .and_then(|v| v.status)
                    .unwrap_or_else(|| "unknown error".into());
                warn!(task_id, %detail, "task failed validation");
                return TaskResult {
                    state: TaskState::ValidationFailed,
                    status: format!("Validation {detail}"),
                    devices: Vec::new(),
                };
            }

            let status = snapshot
                .summary
                .and_then(|s| s.status)
                .unwrap_or_else(|| "unknown".into());
            last = snapshot.data;

            if status == DONE {
                info!(task_id, devices = last.len(), "task complete");
                return TaskResult {
                    state: TaskState::Done,
                    status,
                    devices: last,
                };
            }

            debug!(
                task_id,
                %status,
                elapsed_secs = elapsed.as_secs(),
                max_secs = self.max_wait.as_secs(),
                "task in progress"
            );
            tokio::time::sleep(self.interval).await;
            elapsed += self.interval;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    /// Replays canned snapshots; the last one repeats forever.
    struct Scripted {
        replies: RefCell<VecDeque<Result<TaskStatus, u16>>>,
        polls: RefCell<usize>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<serde_json::Value, u16>>) -> Self {
            let replies = replies
                .into_iter()
                .map(|r| r.map(|v| serde_json::from_value(v).unwrap()))
                .collect();
            Self {
                replies: RefCell::new(replies),
                polls: RefCell::new(0),
            }
        }

        fn polls(&self) -> usize {
            *self.polls.borrow()
        }
    }

    impl TaskStatusSource for Scripted {
        async fn task_status(&self, _task_id: &str) -> Result<TaskStatus, vpush_api::Error> {
            *self.polls.borrow_mut() += 1;
            let mut replies = self.replies.borrow_mut();
            let reply = if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                replies.front().cloned().unwrap()
            };
            reply.map_err(|status| vpush_api::Error::Http {
                status,
                body: String::new(),
            })
        }
    }

    fn in_progress() -> Result<serde_json::Value, u16> {
        Ok(json!({
            "data": [{ "host-name": "edge-1", "statusId": "in_progress" }],
            "summary": { "status": "in_progress" }
        }))
    }

    fn done() -> Result<serde_json::Value, u16> {
        Ok(json!({
            "data": [
                { "host-name": "edge-1", "statusId": "success" },
                { "host-name": "edge-2", "statusId": "failure" }
            ],
            "summary": { "status": "done" }
        }))
    }

    fn waiter(interval: u64, max_wait: u64) -> TaskWaiter {
        TaskWaiter::new(PollSettings {
            interval: Duration::from_secs(interval),
            max_wait: Duration::from_secs(max_wait),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn returns_done_once_summary_says_done() {
        let source = Scripted::new(vec![in_progress(), in_progress(), done()]);

        let result = waiter(5, 60).wait(&source, "push-1").await;

        assert_eq!(result.state, TaskState::Done);
        assert_eq!(result.status, "done");
        assert_eq!(result.devices.len(), 2);
        assert_eq!(source.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_done() {
        let source = Scripted::new(vec![in_progress()]);

        let result = waiter(5, 60).wait(&source, "push-1").await;

        assert_eq!(result.state, TaskState::TimedOut);
        assert_eq!(result.status, "Timeout");
        // 0s, 5s, ... 55s: twelve polls before the budget is spent.
        assert_eq!(source.polls(), 12);
        // The last in-progress snapshot is what gets reported.
        assert_eq!(
            result.devices[0].status_id.as_deref(),
            Some("in_progress")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_data_is_a_terminal_validation_failure() {
        let source = Scripted::new(vec![Ok(json!({
            "data": [],
            "validation": { "status": "failure" }
        }))]);

        let result = waiter(5, 60).wait(&source, "push-1").await;

        assert_eq!(result.state, TaskState::ValidationFailed);
        assert_eq!(result.status, "Validation failure");
        assert!(result.devices.is_empty());
        assert_eq!(source.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn validation_without_detail_reports_unknown_error() {
        let source = Scripted::new(vec![Ok(json!({ "data": [] }))]);

        let result = waiter(5, 60).wait(&source, "push-1").await;

        assert_eq!(result.status, "Validation unknown error");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_poll_ends_the_wait() {
        let source = Scripted::new(vec![in_progress(), Err(500)]);

        let result = waiter(5, 60).wait(&source, "push-1").await;

        assert_eq!(result.state, TaskState::Unavailable);
        assert_eq!(result.status, UNAVAILABLE_STATUS);
        assert!(result.devices.is_empty());
        assert_eq!(source.polls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_never_polls() {
        let source = Scripted::new(vec![done()]);

        let result = waiter(5, 0).wait(&source, "push-1").await;

        assert_eq!(result.state, TaskState::TimedOut);
        assert_eq!(source.polls(), 0);
    }
}

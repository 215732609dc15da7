// ── Run report ──
//
// Everything a run produced, returned to the caller instead of being
// accumulated in shared state.

use indexmap::IndexMap;
use vpush_api::TaskDevice;

use crate::discover::Discovery;
use crate::model::SkipRecord;
use crate::push::PushOutcome;
use crate::task::TaskState;

const UNKNOWN_STATUS: &str = "UNKNOWN";

/// Task devices bucketed by final status, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcomes {
    buckets: IndexMap<String, Vec<TaskDevice>>,
}

impl Outcomes {
    /// Record a task device under its own `statusId`.
    pub fn record(&mut self, device: TaskDevice) {
        let status = device
            .status_id
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_STATUS.into());
        self.record_as(status, device);
    }

    /// Record a task device under an explicit status.
    pub fn record_as(&mut self, status: impl Into<String>, device: TaskDevice) {
        self.buckets.entry(status.into()).or_default().push(device);
    }

    pub fn get(&self, status: &str) -> Option<&[TaskDevice]> {
        self.buckets.get(status).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TaskDevice])> {
        self.buckets
            .iter()
            .map(|(status, devices)| (status.as_str(), devices.as_slice()))
    }

    /// Number of distinct statuses.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of devices across all statuses.
    pub fn device_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

impl Extend<TaskDevice> for Outcomes {
    fn extend<I: IntoIterator<Item = TaskDevice>>(&mut self, iter: I) {
        for device in iter {
            self.record(device);
        }
    }
}

/// The attach task submitted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTask {
    pub id: String,
    pub state: TaskState,
    pub status: String,
}

/// Result of a complete discover → push → wait run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Devices matched by the patterns, skipped ones included.
    pub total_matched: usize,
    pub outcomes: Outcomes,
    /// Discovery skips first, then push skips.
    pub skipped: Vec<SkipRecord>,
    /// `None` when nothing was eligible for push.
    pub task: Option<SubmittedTask>,
}

impl RunReport {
    pub fn new(discovery: Discovery, pushed: PushOutcome) -> Self {
        let mut skipped = discovery.skipped;
        skipped.extend(pushed.skipped);
        Self {
            total_matched: discovery.matched,
            outcomes: pushed.outcomes,
            skipped,
            task: pushed.task,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn task_device(host: &str, status: Option<&str>) -> TaskDevice {
        TaskDevice {
            host_name: Some(host.into()),
            status_id: status.map(Into::into),
            ..TaskDevice::default()
        }
    }

    #[test]
    fn buckets_by_status_id_in_first_seen_order() {
        let mut outcomes = Outcomes::default();
        outcomes.extend([
            task_device("edge-1", Some("success")),
            task_device("edge-2", Some("failure")),
            task_device("edge-3", Some("success")),
        ]);

        let order: Vec<&str> = outcomes.iter().map(|(status, _)| status).collect();
        assert_eq!(order, vec!["success", "failure"]);
        assert_eq!(outcomes.get("success").map(<[_]>::len), Some(2));
        assert_eq!(outcomes.device_count(), 3);
    }

    #[test]
    fn missing_status_goes_to_unknown() {
        let mut outcomes = Outcomes::default();
        outcomes.record(task_device("edge-1", None));
        outcomes.record(task_device("edge-2", Some("")));

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes.get("UNKNOWN").map(<[_]>::len), Some(2));
    }
}

// ── Template push ──
//
// One variable lookup per template group, one combined attach request
// for the whole run, then a single task to wait on. Groups are handled
// strictly in discovery order.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};
use vpush_api::{AttachRequest, DeviceTemplateData, ManagerClient, VariablesRequest};

use crate::error::CoreError;
use crate::model::{Device, SkipReason, SkipRecord, TemplateGroup};
use crate::report::{Outcomes, SubmittedTask};
use crate::task::{TaskResult, TaskState, TaskWaiter};

/// Column carrying the device uuid in variable rows.
const DEVICE_ID_COLUMN: &str = "csv-deviceId";

/// Progress notifications emitted while pushing.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// About to request variables for a template group.
    Group(&'a TemplateGroup),
    /// The combined attach request was accepted.
    Submitted { task_id: &'a str, devices: usize },
}

/// What the push stage produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOutcome {
    /// Devices dropped because no variable rows came back for them.
    pub skipped: Vec<SkipRecord>,
    pub outcomes: Outcomes,
    pub task: Option<SubmittedTask>,
}

/// Attach entry for one template group, plus who made it in.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEntry {
    pub entry: Option<DeviceTemplateData>,
    pub included: Vec<Device>,
    pub skipped: Vec<SkipRecord>,
}

pub struct TemplatePusher<'a> {
    client: &'a ManagerClient,
    waiter: TaskWaiter,
}

impl<'a> TemplatePusher<'a> {
    pub fn new(client: &'a ManagerClient, waiter: TaskWaiter) -> Self {
        Self { client, waiter }
    }

    /// Re-push every group and wait for the resulting task.
    ///
    /// Only the attach submission itself can fail the run; a failed
    /// variable lookup turns into skip records for that group.
    pub async fn push(
        &self,
        groups: &IndexMap<String, TemplateGroup>,
        mut progress: impl FnMut(Progress<'_>),
    ) -> Result<PushOutcome, CoreError> {
        let mut request = AttachRequest::default();
        let mut submitted: Vec<Device> = Vec::new();
        let mut skipped: Vec<SkipRecord> = Vec::new();

        for group in groups.values() {
            progress(Progress::Group(group));

            let rows = self.fetch_variables(group).await;
            let prepared = prepare_entry(group, rows);

            if let Some(entry) = prepared.entry {
                request.device_template_list.push(entry);
            }
            submitted.extend(prepared.included);
            skipped.extend(prepared.skipped);
        }

        if request.is_empty() {
            info!("no devices eligible for template push");
            return Ok(PushOutcome {
                skipped,
                outcomes: Outcomes::default(),
                task: None,
            });
        }

        let task_id = self.client.attach_feature(&request).await?;
        info!(%task_id, devices = submitted.len(), "template attach submitted");
        progress(Progress::Submitted {
            task_id: &task_id,
            devices: submitted.len(),
        });

        let result = self.waiter.wait(self.client, &task_id).await;
        let (outcomes, state, status) = collect_outcomes(result, &submitted);

        Ok(PushOutcome {
            skipped,
            outcomes,
            task: Some(SubmittedTask {
                id: task_id,
                state,
                status,
            }),
        })
    }

    async fn fetch_variables(&self, group: &TemplateGroup) -> Vec<Value> {
        let device_ids = group.device_ids();
        if device_ids.is_empty() {
            return Vec::new();
        }

        let request = VariablesRequest::new(&group.id, device_ids);
        match self.client.device_config_input(&request).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(template = %group.name, error = %e, "variable lookup failed");
                Vec::new()
            }
        }
    }
}

/// Build the attach entry for a group from its variable rows.
///
/// Devices without a row are skipped with [`SkipReason::NoVariables`].
/// Rows that carry no `csv-deviceId` cannot be attributed, so they are
/// taken to cover the whole group. No entry is built unless at least one
/// device of the group is covered.
pub fn prepare_entry(group: &TemplateGroup, rows: Vec<Value>) -> PreparedEntry {
    let returned: HashSet<String> = rows
        .iter()
        .filter_map(|row| row.get(DEVICE_ID_COLUMN).and_then(Value::as_str))
        .map(str::to_owned)
        .collect();

    let (included, missing): (Vec<Device>, Vec<Device>) =
        group.devices.iter().cloned().partition(|device| {
            !rows.is_empty() && (returned.is_empty() || returned.contains(&device.uuid))
        });

    if !missing.is_empty() {
        debug!(
            template = %group.name,
            missing = missing.len(),
            "devices without variable data"
        );
    }

    let entry = (!included.is_empty()).then(|| DeviceTemplateData::new(&group.id, rows));

    PreparedEntry {
        entry,
        included,
        skipped: missing
            .into_iter()
            .map(|device| SkipRecord::new(device, SkipReason::NoVariables))
            .collect(),
    }
}

/// Bucket the task's per-device results.
///
/// A task that ended without any per-device entries (validation failure,
/// unreadable status) reports every submitted device under its status.
fn collect_outcomes(result: TaskResult, submitted: &[Device]) -> (Outcomes, TaskState, String) {
    let TaskResult {
        state,
        status,
        devices,
    } = result;

    let mut outcomes = Outcomes::default();
    if devices.is_empty() {
        for device in submitted {
            outcomes.record_as(status.clone(), device.as_task_device(&status));
        }
    } else {
        outcomes.extend(devices);
    }
    (outcomes, state, status)
}

// ── Domain model ──
//
// `Device` is the validated form of a manager `EdgeDevice`: only
// configured devices (system IP, hostname, and uuid all present) make it
// this far. Groups and skips are built fresh on every run.

use strum::Display;
use vpush_api::{EdgeDevice, TaskDevice};

/// A device template attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub id: String,
    pub name: String,
}

/// A configured WAN edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub system_ip: String,
    pub host_name: String,
    pub uuid: String,
    pub template: Option<TemplateRef>,
    pub reachable: bool,
}

impl Device {
    /// Validate a manager inventory entry.
    ///
    /// Returns `None` for unconfigured devices: any of system IP,
    /// hostname, or uuid missing or empty.
    pub fn from_edge(edge: EdgeDevice) -> Option<Self> {
        let reachable = edge.is_reachable();
        let system_ip = non_empty(edge.system_ip)?;
        let host_name = non_empty(edge.host_name)?;
        let uuid = non_empty(edge.uuid)?;

        let template = non_empty(edge.template).map(|name| TemplateRef {
            id: edge.template_id.unwrap_or_default(),
            name,
        });

        Some(Self {
            system_ip,
            host_name,
            uuid,
            template,
            reachable,
        })
    }

    /// The device as it would appear in a task result.
    ///
    /// Used to report devices whose task never produced per-device entries.
    pub fn as_task_device(&self, status: &str) -> TaskDevice {
        TaskDevice {
            host_name: Some(self.host_name.clone()),
            system_ip: Some(self.system_ip.clone()),
            uuid: Some(self.uuid.clone()),
            status_id: Some(status.to_owned()),
            status: Some(status.to_owned()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Devices currently attached to one template, among the matched set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateGroup {
    pub id: String,
    pub name: String,
    pub devices: Vec<Device>,
}

impl TemplateGroup {
    pub fn new(template: &TemplateRef) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            devices: Vec::new(),
        }
    }

    /// Device ids to request variables for (non-empty uuids only).
    pub fn device_ids(&self) -> Vec<String> {
        self.devices
            .iter()
            .filter(|d| !d.uuid.is_empty())
            .map(|d| d.uuid.clone())
            .collect()
    }
}

/// Why a matched device was left out of the push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SkipReason {
    #[strum(to_string = "Device is not attached to a device template")]
    NoTemplate,
    #[strum(to_string = "Device is unreachable")]
    Unreachable,
    #[strum(to_string = "No template variable data returned for device")]
    NoVariables,
}

/// A matched device excluded from the push, with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipRecord {
    pub device: Device,
    pub reason: SkipReason,
}

impl SkipRecord {
    pub fn new(device: Device, reason: SkipReason) -> Self {
        Self { device, reason }
    }
}

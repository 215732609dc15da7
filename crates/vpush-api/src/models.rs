// Wire models for the manager's dataservice endpoints.
//
// Field names follow the manager's JSON exactly (a mix of kebab-case
// and camelCase). Everything the manager may omit is an `Option`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{ "data": [...] }` envelope most dataservice endpoints return.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default)]
    pub data: Vec<T>,
}

/// Response of `GET /client/token?json=true`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}

/// Response of an asynchronous action submission.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ActionCreated {
    pub id: String,
}

/// An edge device as listed by `GET /system/device/vedges`.
///
/// Unconfigured devices come back without `system-ip`, `host-name`, or `uuid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDevice {
    #[serde(rename = "system-ip")]
    pub system_ip: Option<String>,
    #[serde(rename = "host-name")]
    pub host_name: Option<String>,
    pub uuid: Option<String>,
    /// Name of the attached device template.
    pub template: Option<String>,
    #[serde(rename = "templateId")]
    pub template_id: Option<String>,
    /// `"reachable"` when the management connection is up.
    pub reachability: Option<String>,
}

impl EdgeDevice {
    pub fn is_reachable(&self) -> bool {
        self.reachability.as_deref() == Some("reachable")
    }
}

/// Body of `POST /template/device/config/input`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesRequest {
    pub template_id: String,
    pub device_ids: Vec<String>,
    pub is_edited: bool,
    pub is_master_edited: bool,
}

impl VariablesRequest {
    pub fn new(template_id: impl Into<String>, device_ids: Vec<String>) -> Self {
        Self {
            template_id: template_id.into(),
            device_ids,
            is_edited: false,
            is_master_edited: false,
        }
    }
}

/// One template entry of an attach request.
///
/// `device` carries the variable rows exactly as the manager returned
/// them from the config-input call; they are passed back untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTemplateData {
    pub template_id: String,
    pub device: Vec<Value>,
    pub is_edited: bool,
    pub is_master_edited: bool,
}

impl DeviceTemplateData {
    pub fn new(template_id: impl Into<String>, device: Vec<Value>) -> Self {
        Self {
            template_id: template_id.into(),
            device,
            is_edited: false,
            is_master_edited: false,
        }
    }
}

/// Body of `POST /template/device/config/attachfeature`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachRequest {
    pub device_template_list: Vec<DeviceTemplateData>,
}

impl AttachRequest {
    pub fn is_empty(&self) -> bool {
        self.device_template_list.is_empty()
    }
}

/// Response of `GET /device/action/status/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub data: Vec<TaskDevice>,
    pub summary: Option<StatusSummary>,
    pub validation: Option<ValidationStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusSummary {
    /// `"in_progress"`, `"done"`, ...
    pub status: Option<String>,
    pub count: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationStatus {
    pub status: Option<String>,
}

/// Per-device entry in a task status result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDevice {
    #[serde(rename = "host-name")]
    pub host_name: Option<String>,
    #[serde(rename = "system-ip")]
    pub system_ip: Option<String>,
    pub uuid: Option<String>,
    /// Machine status: `"success"`, `"failure"`, ...
    #[serde(rename = "statusId")]
    pub status_id: Option<String>,
    /// Human-readable status text.
    pub status: Option<String>,
}

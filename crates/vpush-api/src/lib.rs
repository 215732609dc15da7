// vpush-api: Async client for the SD-WAN Manager (vManage) REST API

pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod templates;
pub mod transport;

pub use client::ManagerClient;
pub use error::Error;
pub use models::{
    AttachRequest, DeviceTemplateData, EdgeDevice, StatusSummary, TaskDevice, TaskStatus,
    ValidationStatus, VariablesRequest,
};
pub use transport::{TlsMode, TransportConfig};

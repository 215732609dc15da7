// Device inventory and action status endpoints

use tracing::debug;

use crate::client::ManagerClient;
use crate::error::Error;
use crate::models::{DataEnvelope, EdgeDevice, TaskStatus};

impl ManagerClient {
    /// List every WAN edge known to the manager.
    ///
    /// `GET /dataservice/system/device/vedges`
    pub async fn list_vedges(&self) -> Result<Vec<EdgeDevice>, Error> {
        debug!("listing edge devices");
        let envelope: DataEnvelope<EdgeDevice> = self.get_json("/system/device/vedges").await?;
        Ok(envelope.data)
    }

    /// Current status of an asynchronous device action.
    ///
    /// `GET /dataservice/device/action/status/{task_id}`
    pub async fn action_status(&self, task_id: &str) -> Result<TaskStatus, Error> {
        self.get_json(&format!("/device/action/status/{task_id}"))
            .await
    }
}

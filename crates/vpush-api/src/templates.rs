// Device template endpoints
//
// Variable lookup and feature-template attach. The attach call is
// asynchronous on the manager side and only hands back a task id;
// progress is read through `action_status`.

use serde_json::Value;
use tracing::debug;

use crate::client::ManagerClient;
use crate::error::Error;
use crate::models::{ActionCreated, AttachRequest, DataEnvelope, VariablesRequest};

impl ManagerClient {
    /// Fetch the current variable rows for devices attached to a template.
    ///
    /// `POST /dataservice/template/device/config/input`
    ///
    /// Each row is an opaque object keyed by variable name, plus `csv-*`
    /// bookkeeping columns such as `csv-deviceId`.
    pub async fn device_config_input(
        &self,
        request: &VariablesRequest,
    ) -> Result<Vec<Value>, Error> {
        debug!(
            template_id = %request.template_id,
            devices = request.device_ids.len(),
            "requesting device variables"
        );
        let envelope: DataEnvelope<Value> = self
            .post_json("/template/device/config/input", request)
            .await?;
        Ok(envelope.data)
    }

    /// Submit a feature-template attach and return the task id.
    ///
    /// `POST /dataservice/template/device/config/attachfeature`
    pub async fn attach_feature(&self, request: &AttachRequest) -> Result<String, Error> {
        debug!(
            templates = request.device_template_list.len(),
            "submitting template attach"
        );
        let created: ActionCreated = self
            .post_json("/template/device/config/attachfeature", request)
            .await?;
        Ok(created.id)
    }
}

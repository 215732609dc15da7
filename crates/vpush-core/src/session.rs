// ── Manager session ──
//
// Owns the single authenticated client for a run: login on connect,
// discover → push → wait in `run`, logout on disconnect.

use tracing::{debug, info};
use vpush_api::{ManagerClient, TlsMode, TransportConfig};

use crate::config::{ManagerConfig, TlsVerification};
use crate::discover::discover;
use crate::error::CoreError;
use crate::matcher::DevicePatterns;
use crate::push::{Progress, TemplatePusher};
use crate::report::RunReport;
use crate::task::TaskWaiter;

/// An authenticated manager session.
pub struct Session {
    client: ManagerClient,
    config: ManagerConfig,
}

impl Session {
    /// Build the HTTP client and log in.
    ///
    /// Login failures are returned before any other request is made.
    pub async fn connect(config: ManagerConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_mode(&config.tls),
            timeout: config.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar();

        let client = ManagerClient::new(config.url.clone(), &transport)?;

        debug!(url = %config.url, user = %config.username, "connecting to manager");
        client
            .login(&config.username, &config.password)
            .await
            .map_err(|e| match CoreError::from(e) {
                CoreError::ConnectionFailed { reason, .. } => CoreError::ConnectionFailed {
                    url: config.url.to_string(),
                    reason,
                },
                other => other,
            })?;
        info!(url = %config.url, "logged in");

        Ok(Self { client, config })
    }

    pub fn client(&self) -> &ManagerClient {
        &self.client
    }

    /// Discover matching devices, push their templates, and wait for the task.
    pub async fn run(
        &self,
        patterns: &DevicePatterns,
        progress: impl FnMut(Progress<'_>),
    ) -> Result<RunReport, CoreError> {
        let discovery = discover(&self.client, patterns).await?;

        let pusher = TemplatePusher::new(&self.client, TaskWaiter::new(self.config.poll));
        let pushed = pusher.push(&discovery.groups, progress).await?;

        Ok(RunReport::new(discovery, pushed))
    }

    /// Log out, consuming the session.
    pub async fn disconnect(self) -> Result<(), CoreError> {
        self.client.logout().await?;
        info!("logged out");
        Ok(())
    }
}

fn tls_mode(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

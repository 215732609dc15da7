// ── Runtime connection configuration ──
//
// These types describe *how* to reach the manager and how long to wait
// on its tasks. They carry credential data but never touch disk; the
// CLI builds a `ManagerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs). Default for on-prem managers.
    #[default]
    DangerAcceptInvalid,
}

/// Task polling cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between two status polls.
    pub interval: Duration,
    /// Give up once this much polling time has accumulated.
    pub max_wait: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(60),
        }
    }
}

/// Configuration for a single manager session.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Manager root URL (e.g., `https://vmanage.example.net:8443`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub poll: PollSettings,
}

impl ManagerConfig {
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
            poll: PollSettings::default(),
        }
    }
}

/// Turn a `host[:port]` manager address into its root URL.
///
/// Bare addresses get `https://`. An explicit `http://` or `https://`
/// prefix is kept as given.
pub fn manager_url(addr: &str) -> Result<Url, CoreError> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Err(CoreError::Config {
            message: "manager address is empty".into(),
        });
    }

    let full = if addr.starts_with("https://") || addr.starts_with("http://") {
        addr.to_owned()
    } else {
        format!("https://{addr}")
    };

    let url = Url::parse(&full).map_err(|e| CoreError::Config {
        message: format!("invalid manager address '{addr}': {e}"),
    })?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(CoreError::Config {
            message: format!("manager address '{addr}' has no host"),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_defaults_to_https() {
        let url = manager_url("vmanage.example.net").unwrap();
        assert_eq!(url.as_str(), "https://vmanage.example.net/");
    }

    #[test]
    fn host_and_port_are_kept() {
        let url = manager_url("10.1.1.1:8443").unwrap();
        assert_eq!(url.host_str(), Some("10.1.1.1"));
        assert_eq!(url.port(), Some(8443));
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn explicit_scheme_is_honoured() {
        let url = manager_url("http://127.0.0.1:9000").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(9000));
    }

    #[test]
    fn empty_address_is_rejected() {
        assert!(matches!(manager_url("  "), Err(CoreError::Config { .. })));
    }

    #[test]
    fn poll_defaults() {
        let poll = PollSettings::default();
        assert_eq!(poll.interval, Duration::from_secs(5));
        assert_eq!(poll.max_wait, Duration::from_secs(60));
    }
}

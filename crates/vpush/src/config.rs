//! Settings resolution: defaults, config file, `MANAGER_*` env, then flags.
//!
//! The result is turned into a `vpush_core::ManagerConfig`; core never
//! reads files or the environment itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use vpush_core::{ManagerConfig, PollSettings, TlsVerification, config::manager_url};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolved settings, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub addr: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Per-request timeout, seconds.
    pub timeout: u64,
    /// Task poll interval, seconds.
    pub interval: u64,
    /// Task polling budget, seconds.
    pub max_wait: u64,
    /// Accept any manager certificate.
    pub insecure: bool,
    pub ca_cert: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: None,
            user: None,
            pass: None,
            timeout: 10,
            interval: 5,
            max_wait: 60,
            insecure: true,
            ca_cert: None,
        }
    }
}

/// `MANAGER_ADDR`, `MANAGER_USER` and `MANAGER_PASS`, read as raw strings.
///
/// These keys are never type-parsed: `MANAGER_PASS=0123` stays `"0123"`.
#[derive(Debug, Default, Serialize)]
struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pass: Option<String>,
}

const CREDENTIAL_KEYS: [&str; 3] = ["addr", "user", "pass"];

impl Credentials {
    fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            addr: var("MANAGER_ADDR"),
            user: var("MANAGER_USER"),
            pass: var("MANAGER_PASS"),
        }
    }
}

/// Flag values that take precedence over every other layer.
#[derive(Debug, Default, Serialize)]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_wait: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ca_cert: Option<PathBuf>,
}

impl From<&GlobalOpts> for Overrides {
    fn from(global: &GlobalOpts) -> Self {
        Self {
            addr: global.manager.clone(),
            user: global.user.clone(),
            timeout: global.timeout,
            interval: global.interval,
            max_wait: global.max_wait,
            insecure: global.strict_tls.then_some(false),
            ca_cert: global.ca_cert.clone(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "vpush", "vpush").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("vpush");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Layer the config file, environment, and flags into `Settings`.
///
/// A missing config file is not an error.
pub fn load_settings(path: &Path, global: &GlobalOpts) -> Result<Settings, CliError> {
    Ok(layered(path, global).extract()?)
}

fn layered(path: &Path, global: &GlobalOpts) -> Figment {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("MANAGER_").ignore(&CREDENTIAL_KEYS))
        .merge(Serialized::defaults(Credentials::from_env()))
        .merge(Serialized::defaults(Overrides::from(global)))
}

/// Validate settings into a session configuration.
///
/// All missing credentials are reported together.
pub fn manager_config(settings: Settings, path: &Path) -> Result<ManagerConfig, CliError> {
    let addr = present(settings.addr);
    let user = present(settings.user);
    let pass = present(settings.pass);

    let missing: Vec<&str> = [
        ("MANAGER_ADDR", addr.is_none()),
        ("MANAGER_USER", user.is_none()),
        ("MANAGER_PASS", pass.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    let (Some(addr), Some(user), Some(pass)) = (addr, user, pass) else {
        return Err(CliError::MissingSettings {
            missing: missing.join(", "),
            path: path.display().to_string(),
        });
    };

    let url = manager_url(&addr)?;

    let tls = if let Some(ca) = settings.ca_cert {
        TlsVerification::CustomCa(ca)
    } else if settings.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ManagerConfig::new(url, user, SecretString::from(pass));
    config.tls = tls;
    config.timeout = Duration::from_secs(settings.timeout);
    config.poll = PollSettings {
        interval: Duration::from_secs(settings.interval),
        max_wait: Duration::from_secs(settings.max_wait),
    };
    Ok(config)
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["vpush"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv).global
    }

    fn load(path: &Path, args: &[&str]) -> Settings {
        layered(path, &global(args)).extract().unwrap()
    }

    #[test]
    fn env_supplies_credentials() {
        Jail::expect_with(|jail| {
            jail.set_env("MANAGER_ADDR", "vmanage.example.net:8443");
            jail.set_env("MANAGER_USER", "admin");
            jail.set_env("MANAGER_PASS", "1234");

            let settings = load(Path::new("missing.toml"), &[]);

            assert_eq!(settings.addr.as_deref(), Some("vmanage.example.net:8443"));
            assert_eq!(settings.pass.as_deref(), Some("1234"));
            assert_eq!(settings.max_wait, 60);
            Ok(())
        });
    }

    #[test]
    fn env_credentials_are_taken_verbatim() {
        Jail::expect_with(|jail| {
            jail.set_env("MANAGER_ADDR", "10.0.0.1");
            jail.set_env("MANAGER_USER", "007");
            jail.set_env("MANAGER_PASS", "0123");

            let settings = load(Path::new("missing.toml"), &[]);
            assert_eq!(settings.addr.as_deref(), Some("10.0.0.1"));
            assert_eq!(settings.user.as_deref(), Some("007"));
            assert_eq!(settings.pass.as_deref(), Some("0123"));

            jail.set_env("MANAGER_PASS", "1.50");
            assert_eq!(load(Path::new("missing.toml"), &[]).pass.as_deref(), Some("1.50"));

            jail.set_env("MANAGER_PASS", "[pw]");
            assert_eq!(load(Path::new("missing.toml"), &[]).pass.as_deref(), Some("[pw]"));

            jail.set_env("MANAGER_PASS", "true");
            assert_eq!(load(Path::new("missing.toml"), &[]).pass.as_deref(), Some("true"));
            Ok(())
        });
    }

    #[test]
    fn env_credentials_still_beat_the_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "pass = \"from-file\"\nuser = \"file-user\"\n")?;
            jail.set_env("MANAGER_PASS", "from-env");

            let settings = load(Path::new("config.toml"), &["--user", "flag-user"]);

            assert_eq!(settings.pass.as_deref(), Some("from-env"));
            assert_eq!(settings.user.as_deref(), Some("flag-user"));
            Ok(())
        });
    }

    #[test]
    fn flags_beat_env_and_env_beats_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    addr = "file.example.net"
                    user = "file-user"
                    interval = 2
                    timeout = 30
                "#,
            )?;
            jail.set_env("MANAGER_USER", "env-user");
            jail.set_env("MANAGER_INTERVAL", "3");

            let settings = load(Path::new("config.toml"), &["--interval", "7", "--strict-tls"]);

            assert_eq!(settings.addr.as_deref(), Some("file.example.net"));
            assert_eq!(settings.user.as_deref(), Some("env-user"));
            assert_eq!(settings.interval, 7);
            assert_eq!(settings.timeout, 30);
            assert!(!settings.insecure);
            Ok(())
        });
    }

    #[test]
    fn missing_credentials_are_listed_together() {
        let settings = Settings {
            user: Some("admin".into()),
            pass: Some(String::new()),
            ..Settings::default()
        };

        let err = manager_config(settings, Path::new("/etc/vpush.toml")).unwrap_err();

        match err {
            CliError::MissingSettings { missing, .. } => {
                assert_eq!(missing, "MANAGER_ADDR, MANAGER_PASS");
            }
            other => panic!("expected MissingSettings, got {other:?}"),
        }
    }

    #[test]
    fn settings_become_a_manager_config() {
        let settings = Settings {
            addr: Some("10.1.1.1:8443".into()),
            user: Some("admin".into()),
            pass: Some("secret".into()),
            interval: 1,
            ..Settings::default()
        };

        let config = manager_config(settings, Path::new("config.toml")).unwrap();

        assert_eq!(config.url.as_str(), "https://10.1.1.1:8443/");
        assert_eq!(config.username, "admin");
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.poll.interval, Duration::from_secs(1));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn ca_cert_selects_custom_verification() {
        let settings = Settings {
            addr: Some("vmanage".into()),
            user: Some("admin".into()),
            pass: Some("secret".into()),
            ca_cert: Some(PathBuf::from("/etc/ssl/manager.pem")),
            ..Settings::default()
        };

        let config = manager_config(settings, Path::new("config.toml")).unwrap();

        assert_eq!(
            config.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/manager.pem"))
        );
    }
}

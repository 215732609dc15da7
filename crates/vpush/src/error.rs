//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use vpush_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing required settings: {missing}")]
    #[diagnostic(
        code(vpush::missing_settings),
        help(
            "Set MANAGER_ADDR, MANAGER_USER and MANAGER_PASS in the environment,\n\
             or add addr, user and pass to {path}"
        )
    )]
    MissingSettings { missing: String, path: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(vpush::invalid_config))]
    InvalidConfig { message: String },

    #[error(transparent)]
    #[diagnostic(code(vpush::config))]
    Config(Box<figment::Error>),

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the manager at {url}")]
    #[diagnostic(
        code(vpush::connection_failed),
        help(
            "Check that MANAGER_ADDR is correct and the manager is reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(vpush::auth_failed),
        help("Verify MANAGER_USER and MANAGER_PASS.")
    )]
    AuthFailed { message: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Manager request timed out")]
    #[diagnostic(
        code(vpush::timeout),
        help("Increase the per-request timeout with --timeout.")
    )]
    Timeout,

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(vpush::api_error))]
    Api { message: String },

    #[error("Internal error: {0}")]
    #[diagnostic(code(vpush::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingSettings { .. } | Self::InvalidConfig { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Api { .. } | Self::Internal(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Api { message, status: _ } => CliError::Api { message },
            CoreError::Config { message } => CliError::InvalidConfig { message },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

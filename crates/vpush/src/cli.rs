//! Clap derive structures for the `vpush` CLI.
//!
//! Kept free of crate-internal imports so `build.rs` can include it to
//! render man pages.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use clap_complete::Shell;

const ENV_HELP: &str = "\
The following environment variables are expected:
  MANAGER_ADDR  address[:port] of the SD-WAN Manager (https:// unless a scheme is given)
  MANAGER_USER  username
  MANAGER_PASS  password

The same settings can be given as addr, user, and pass in the config file.";

/// vpush -- re-push device templates to SD-WAN edges
#[derive(Debug, Parser)]
#[command(
    name = "vpush",
    version,
    about = "Re-attach device template configuration to SD-WAN edges",
    long_about = "Re-attach (re-push) device template configuration to the edges \
        matching the given hostnames or system IPs.\n\n\
        Matching devices are grouped by their attached template, their current \
        variable values are fetched, and a single attach task is submitted and \
        followed until it finishes.",
    after_help = ENV_HELP
)]
pub struct Cli {
    /// Device hostnames or system IPs (`*` and `?` wildcards accepted)
    #[arg(value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,

    #[command(flatten)]
    pub global: GlobalOpts,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Manager address (overrides MANAGER_ADDR)
    #[arg(long, short = 'm', value_name = "ADDR")]
    pub manager: Option<String>,

    /// Username (overrides MANAGER_USER)
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seconds between task status polls
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Give up on the push task after this many seconds
    #[arg(long, value_name = "SECS")]
    pub max_wait: Option<u64>,

    /// Verify the manager certificate against this CA (PEM)
    #[arg(long, value_name = "PATH")]
    pub ca_cert: Option<PathBuf>,

    /// Verify the manager certificate against the system roots
    #[arg(long)]
    pub strict_tls: bool,

    /// When to use color output
    #[arg(long, default_value = "auto")]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

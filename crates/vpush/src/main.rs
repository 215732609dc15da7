mod cli;
mod config;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use vpush_core::{DevicePatterns, Session};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "vpush", &mut std::io::stdout());
        return Ok(());
    }

    // Nothing to match: show usage without touching the manager.
    if cli.patterns.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let patterns = DevicePatterns::new(&cli.patterns)?;

    let path = cli
        .global
        .config
        .clone()
        .unwrap_or_else(config::config_path);
    let settings = config::load_settings(&path, &cli.global)?;
    let manager = config::manager_config(settings, &path)?;
    let color = output::should_color(cli.global.color);

    tracing::debug!(url = %manager.url, patterns = patterns.len(), "starting run");
    let session = Session::connect(manager).await?;

    let result = session
        .run(&patterns, |event| println!("{}", output::render_progress(event)))
        .await;

    // Always end the session, but a run failure outranks a logout failure.
    let logout = session.disconnect().await;
    let report = result?;
    print!("{}", output::render_report(&report, color));
    logout?;

    Ok(())
}

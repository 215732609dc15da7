//! Console rendering for progress lines and the final run report.

use std::fmt::Write as _;
use std::io::{self, IsTerminal};

use owo_colors::OwoColorize;

use vpush_core::{Progress, RunReport, TaskDevice};

use crate::cli::ColorMode;

const UNKNOWN: &str = "unknown";

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// First letter upper case, the rest lower case.
pub fn capitalize(status: &str) -> String {
    let mut chars = status.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn render_progress(event: Progress<'_>) -> String {
    match event {
        Progress::Group(group) => format!(
            "Processing {} devices attached to the '{}' template",
            group.devices.len(),
            group.name
        ),
        Progress::Submitted { task_id, devices } => {
            format!("Submitted task {task_id} for {devices} devices, waiting for completion")
        }
    }
}

/// Render the outcome summary and skip list.
pub fn render_report(report: &RunReport, color: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\nOutcomes:");
    let _ = writeln!(out, "Total devices provided: {}", report.total_matched);

    for (status, devices) in report.outcomes.iter() {
        let label = capitalize(status);
        let hosts = host_list(devices);
        if color {
            let _ = writeln!(out, "{}: {} [{hosts}]", paint(status, &label), devices.len());
        } else {
            let _ = writeln!(out, "{label}: {} [{hosts}]", devices.len());
        }
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "Devices skipped: {}", report.skipped.len());
        for skip in &report.skipped {
            let device = &skip.device;
            let _ = writeln!(
                out,
                " - {} ({}) [{}] - {}",
                device.host_name, device.system_ip, device.uuid, skip.reason
            );
        }
    }

    match &report.task {
        Some(task) => {
            let _ = writeln!(out, "Task {} finished: {}", task.id, task.status);
        }
        None => {
            let _ = writeln!(out, "No devices eligible for template push");
        }
    }

    out
}

fn host_list(devices: &[TaskDevice]) -> String {
    devices
        .iter()
        .map(|d| {
            d.host_name
                .as_deref()
                .or(d.system_ip.as_deref())
                .unwrap_or(UNKNOWN)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn paint(status: &str, label: &str) -> String {
    let status = status.to_ascii_lowercase();
    if status == "success" {
        label.green().to_string()
    } else if matches!(status.as_str(), "failure" | "timeout" | "status unavailable")
        || status.starts_with("validation")
    {
        label.red().to_string()
    } else {
        label.yellow().to_string()
    }
}

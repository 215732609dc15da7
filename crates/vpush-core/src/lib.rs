//! Template re-push workflow between `vpush-api` and the `vpush` CLI.
//!
//! One run flows strictly top to bottom:
//!
//! - **[`discover`]**: Fetches the edge inventory, applies the
//!   [`DevicePatterns`] filter, and partitions matched devices into
//!   per-template [`TemplateGroup`]s and a list of [`SkipRecord`]s.
//!
//! - **[`push`]**: Requests current variable rows for each group, builds a
//!   single combined attach request, and submits it.
//!
//! - **[`task`]**: [`TaskWaiter`] polls the resulting asynchronous task
//!   until it is done, fails validation, or times out.
//!
//! - **[`report`]**: [`RunReport`] is the explicit result object: matched
//!   count, per-status [`Outcomes`], skips, and the submitted task.
//!
//! [`Session`] owns the logged-in client for the duration of a run.

pub mod config;
pub mod discover;
pub mod error;
pub mod matcher;
pub mod model;
pub mod push;
pub mod report;
pub mod session;
pub mod task;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ManagerConfig, PollSettings, TlsVerification};
pub use discover::Discovery;
pub use error::CoreError;
pub use matcher::DevicePatterns;
pub use model::{Device, SkipReason, SkipRecord, TemplateGroup, TemplateRef};
pub use push::{Progress, PushOutcome, TemplatePusher};
pub use report::{Outcomes, RunReport, SubmittedTask};
pub use session::Session;
pub use task::{TaskResult, TaskState, TaskStatusSource, TaskWaiter};

pub use vpush_api::TaskDevice;

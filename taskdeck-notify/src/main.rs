//! # Taskdeck Notifier
//!
//! Headless notification watcher: polls a task query endpoint, diffs
//! snapshots, and surfaces "task assigned" or "task completed" events via
//! the system channel (falling back to toast-style log lines).
//!
//! ## Environment
//!
//! - `NOTIFY_QUERY_URL`: full URL of the query to watch, e.g.
//!   `http://localhost:8080/v1/tasks/mine?user_id=<uuid>` (required)
//! - `NOTIFY_TOKEN`: identity token for the caller (required)
//! - `NOTIFY_MODE`: `assignments` (default) or `completions`
//! - `NOTIFY_PERMISSION`: `granted` enables the system channel; anything
//!   else falls back to toast
//! - `NOTIFY_INTERVAL_SECONDS`: poll interval (default: 15)
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskdeck-notify
//! ```

use std::time::Duration;

use taskdeck_notify::poller::TaskPoller;
use taskdeck_notify::sink::{Notifier, PermissionState, SystemSink, ToastSink};
use taskdeck_notify::watcher::{AssignmentWatcher, CompletionWatcher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_notify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskdeck Notifier v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let url = std::env::var("NOTIFY_QUERY_URL")
        .map_err(|_| anyhow::anyhow!("NOTIFY_QUERY_URL environment variable is required"))?;
    let token = std::env::var("NOTIFY_TOKEN")
        .map_err(|_| anyhow::anyhow!("NOTIFY_TOKEN environment variable is required"))?;
    let mode = std::env::var("NOTIFY_MODE").unwrap_or_else(|_| "assignments".to_string());
    let interval = std::env::var("NOTIFY_INTERVAL_SECONDS")
        .unwrap_or_else(|_| "15".to_string())
        .parse::<u64>()?;

    let permission = match std::env::var("NOTIFY_PERMISSION").as_deref() {
        Ok("granted") => PermissionState::Granted,
        Ok("denied") => PermissionState::Denied,
        _ => PermissionState::Default,
    };

    let poller = TaskPoller::new(url, token, Duration::from_secs(interval))?;
    let notifier = Notifier::new(
        Box::new(SystemSink::new(permission)),
        Box::new(ToastSink::new()),
    );

    match mode.as_str() {
        "completions" => poller.run(CompletionWatcher::new(), notifier).await,
        "assignments" => poller.run(AssignmentWatcher::new(), notifier).await,
        other => anyhow::bail!("Unknown NOTIFY_MODE: {other:?} (expected assignments or completions)"),
    }

    Ok(())
}

/// Polling subscription client
///
/// The backend's reads are live queries: whenever underlying records
/// change, a subscriber should receive a fresh snapshot. Over plain HTTP
/// that becomes a polling loop: re-fetch the query on an interval and
/// hand each snapshot to a watcher, which diffs it against the last one.
///
/// # Polling Strategy
///
/// - Poll interval: configurable (default 15 seconds)
/// - Fetch errors are logged and skipped; the loop keeps polling
/// - No backpressure or batching; snapshots are small at team scale
///
/// # Example
///
/// ```no_run
/// use taskdeck_notify::poller::TaskPoller;
/// use taskdeck_notify::sink::{Notifier, SystemSink, ToastSink, PermissionState};
/// use taskdeck_notify::watcher::AssignmentWatcher;
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let poller = TaskPoller::new(
///     "http://localhost:8080/v1/tasks/mine?user_id=...".to_string(),
///     "<identity token>".to_string(),
///     Duration::from_secs(15),
/// )?;
///
/// let notifier = Notifier::new(
///     Box::new(SystemSink::new(PermissionState::Granted)),
///     Box::new(ToastSink::new()),
/// );
///
/// poller.run(AssignmentWatcher::new(), notifier).await;
/// # Ok(())
/// # }
/// ```
use std::time::Duration;

use crate::sink::Notifier;
use crate::watcher::{SnapshotWatcher, TaskSnapshot};

/// Error type for snapshot fetching
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    /// Request failed or timed out
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server answered {0}")]
    Status(reqwest::StatusCode),
}

/// Polls one task query endpoint and feeds a watcher
pub struct TaskPoller {
    client: reqwest::Client,
    url: String,
    token: String,
    interval: Duration,
}

impl TaskPoller {
    /// Creates a poller for a query URL
    ///
    /// `token` is the caller's identity token, sent as a bearer
    /// credential on every fetch.
    pub fn new(url: String, token: String, interval: Duration) -> Result<Self, PollerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url,
            token,
            interval,
        })
    }

    /// Fetches one snapshot
    pub async fn fetch_snapshot(&self) -> Result<Vec<TaskSnapshot>, PollerError> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PollerError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    /// Runs the subscription loop until the process exits
    ///
    /// Each successful fetch is diffed by `watcher`; the resulting events
    /// go through `notifier`. A failed fetch only skips that tick.
    pub async fn run<W: SnapshotWatcher>(&self, mut watcher: W, notifier: Notifier) {
        tracing::info!(url = %self.url, interval_s = self.interval.as_secs(), "Subscription poller started");

        loop {
            match self.fetch_snapshot().await {
                Ok(snapshot) => {
                    let events = watcher.observe(&snapshot);
                    tracing::debug!(
                        tasks = snapshot.len(),
                        events = events.len(),
                        "Snapshot observed"
                    );

                    for event in &events {
                        notifier.notify(event).await;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Snapshot fetch failed, will retry");
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

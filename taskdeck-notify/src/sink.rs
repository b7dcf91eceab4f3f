/// Notification delivery channels
///
/// Mirrors the browser behavior: a system-level notification channel that
/// only works when the user granted permission, with an in-app toast as
/// the fallback. The dispatcher tries the primary channel first and falls
/// back on any failure; delivery problems never propagate to the watcher,
/// which has already marked the task as handled.
use async_trait::async_trait;
use std::sync::Mutex;

use crate::watcher::NotificationEvent;

/// A formatted notification ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short headline ("New Task Assigned")
    pub title: String,

    /// Body text
    pub body: String,
}

impl Notification {
    /// Formats an event the way the dashboards word them
    pub fn from_event(event: &NotificationEvent) -> Self {
        match event {
            NotificationEvent::TaskAssigned { title, project } => Notification {
                title: "New Task Assigned".to_string(),
                body: match project {
                    Some(project) => format!("{} - {}", title, project),
                    None => format!("You have been assigned: {}", title),
                },
            },
            NotificationEvent::TaskCompleted { title, completer } => Notification {
                title: "Task Completed".to_string(),
                body: format!(
                    "{} completed: {}",
                    completer.as_deref().unwrap_or("An employee"),
                    title
                ),
            },
        }
    }
}

/// Error type for notification delivery
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Channel cannot deliver right now (e.g. permission not granted)
    #[error("Channel unavailable: {0}")]
    Unavailable(String),

    /// Channel tried and failed
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}

/// A notification delivery channel
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Channel name for logging
    fn name(&self) -> &str;

    /// Delivers one notification
    async fn deliver(&self, notification: &Notification) -> Result<(), SinkError>;
}

/// User's answer to the system notification permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// Permission granted, system notifications allowed
    Granted,

    /// Permission denied
    Denied,

    /// Not asked yet
    Default,
}

/// System-level notification channel
///
/// Delivers only when permission was granted; otherwise reports itself
/// unavailable so the dispatcher falls back to the toast.
pub struct SystemSink {
    permission: PermissionState,
}

impl SystemSink {
    /// Creates a system channel with the given permission state
    pub fn new(permission: PermissionState) -> Self {
        Self { permission }
    }
}

#[async_trait]
impl NotificationSink for SystemSink {
    fn name(&self) -> &str {
        "system"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        if self.permission != PermissionState::Granted {
            return Err(SinkError::Unavailable(
                "notification permission not granted".to_string(),
            ));
        }

        tracing::info!(
            target: "taskdeck_notify::system",
            title = %notification.title,
            body = %notification.body,
            "System notification"
        );

        Ok(())
    }
}

/// In-app toast channel, the always-available fallback
#[derive(Debug, Default)]
pub struct ToastSink;

impl ToastSink {
    /// Creates a toast channel
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for ToastSink {
    fn name(&self) -> &str {
        "toast"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        tracing::info!(
            target: "taskdeck_notify::toast",
            title = %notification.title,
            body = %notification.body,
            "Toast notification"
        );

        Ok(())
    }
}

/// Capturing channel for tests
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Notification>>,
    fail: bool,
}

impl MemorySink {
    /// Creates a capturing channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel that rejects every delivery
    pub fn failing() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Everything delivered so far
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::DeliveryFailed("memory sink set to fail".to_string()));
        }

        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Delivers events through a primary channel with a fallback
pub struct Notifier {
    primary: Box<dyn NotificationSink>,
    fallback: Box<dyn NotificationSink>,
}

impl Notifier {
    /// Creates a dispatcher
    pub fn new(primary: Box<dyn NotificationSink>, fallback: Box<dyn NotificationSink>) -> Self {
        Self { primary, fallback }
    }

    /// Formats and delivers one event
    ///
    /// Tries the primary channel first; on any failure the fallback gets a
    /// chance. A fallback failure is logged and swallowed; the watcher
    /// already marked the task handled, so nothing retries.
    pub async fn notify(&self, event: &NotificationEvent) {
        let notification = Notification::from_event(event);

        match self.primary.deliver(&notification).await {
            Ok(()) => {}
            Err(primary_err) => {
                tracing::debug!(
                    channel = self.primary.name(),
                    error = %primary_err,
                    "Primary channel failed, falling back"
                );

                if let Err(fallback_err) = self.fallback.deliver(&notification).await {
                    tracing::warn!(
                        channel = self.fallback.name(),
                        error = %fallback_err,
                        "Notification dropped"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_formatting() {
        let with_project = Notification::from_event(&NotificationEvent::TaskAssigned {
            title: "Write copy".to_string(),
            project: Some("Launch".to_string()),
        });
        assert_eq!(with_project.title, "New Task Assigned");
        assert_eq!(with_project.body, "Write copy - Launch");

        let without_project = Notification::from_event(&NotificationEvent::TaskAssigned {
            title: "Write copy".to_string(),
            project: None,
        });
        assert_eq!(without_project.body, "You have been assigned: Write copy");
    }

    #[test]
    fn test_completion_formatting() {
        let anonymous = Notification::from_event(&NotificationEvent::TaskCompleted {
            title: "Write copy".to_string(),
            completer: None,
        });
        assert_eq!(anonymous.title, "Task Completed");
        assert_eq!(anonymous.body, "An employee completed: Write copy");
    }

    #[tokio::test]
    async fn test_system_sink_requires_permission() {
        let sink = SystemSink::new(PermissionState::Denied);
        let notification = Notification {
            title: "t".to_string(),
            body: "b".to_string(),
        };

        assert!(matches!(
            sink.deliver(&notification).await,
            Err(SinkError::Unavailable(_))
        ));

        let granted = SystemSink::new(PermissionState::Granted);
        assert!(granted.deliver(&notification).await.is_ok());
    }

    #[tokio::test]
    async fn test_notifier_primary_delivery_and_fallback() {
        struct Probe(std::sync::Arc<MemorySink>);

        #[async_trait]
        impl NotificationSink for Probe {
            fn name(&self) -> &str {
                "probe"
            }

            async fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
                self.0.deliver(notification).await
            }
        }

        let primary = std::sync::Arc::new(MemorySink::new());
        let fallback = std::sync::Arc::new(MemorySink::new());
        let notifier = Notifier::new(
            Box::new(Probe(primary.clone())),
            Box::new(Probe(fallback.clone())),
        );

        let event = NotificationEvent::TaskCompleted {
            title: "Write copy".to_string(),
            completer: Some("Ada".to_string()),
        };
        notifier.notify(&event).await;

        assert_eq!(primary.delivered().len(), 1);
        assert!(fallback.delivered().is_empty());

        // Now a failing primary routes through the fallback.
        let failing = Notifier::new(
            Box::new(MemorySink::failing()),
            Box::new(Probe(fallback.clone())),
        );
        failing.notify(&event).await;

        assert_eq!(fallback.delivered().len(), 1);
        assert_eq!(fallback.delivered()[0].body, "Ada completed: Write copy");
    }
}

/// Snapshot-diff notification detectors
///
/// A watcher receives every snapshot a subscribed query delivers and
/// remembers which task ids it has already handled. The first snapshot
/// after (re)subscribing only primes that memory; pre-existing tasks must
/// not flood the user with notifications on page load. From then on:
///
/// - [`AssignmentWatcher`] fires once for every task id it has never seen
///   (an employee's newly assigned work).
/// - [`CompletionWatcher`] tracks a separate known-done set and fires only
///   on true pending→done transitions, not for any done task that happens
///   to appear.
///
/// Ids are marked handled as soon as an event is emitted, regardless of
/// whether delivery later succeeds, so a broken channel cannot cause
/// repeat notifications.
use std::collections::HashSet;

use serde::Deserialize;
use taskdeck_shared::models::task::TaskStatus;
use uuid::Uuid;

/// One task row of a query snapshot, as delivered by the API
///
/// Both the personal and the admin query shapes deserialize into this:
/// fields the endpoint does not carry stay `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSnapshot {
    /// Task id
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Current status
    pub status: TaskStatus,

    /// Owning project, when the query enriches it
    #[serde(default)]
    pub project: Option<ProjectInfo>,

    /// Completer, when the query enriches it
    #[serde(default)]
    pub completed_by_user: Option<UserInfo>,
}

/// Enriched project fields the watcher cares about
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    /// Project name
    pub name: String,
}

/// Enriched user fields the watcher cares about
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// Display name
    pub name: Option<String>,
}

/// An event synthesized from a snapshot diff
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// A task appeared on the watched list for the first time
    TaskAssigned {
        /// Task title
        title: String,

        /// Owning project name, when known
        project: Option<String>,
    },

    /// A watched task transitioned to done
    TaskCompleted {
        /// Task title
        title: String,

        /// Completer's display name, when known
        completer: Option<String>,
    },
}

/// Anything that turns snapshots into notification events
pub trait SnapshotWatcher {
    /// Diffs `snapshot` against remembered state and returns the events to
    /// deliver
    fn observe(&mut self, snapshot: &[TaskSnapshot]) -> Vec<NotificationEvent>;
}

/// Fires when a task id appears that was never seen before
///
/// Used on the employee side against the "my tasks" query: a new id there
/// means new assigned work.
#[derive(Debug, Default)]
pub struct AssignmentWatcher {
    seen: HashSet<Uuid>,
    primed: bool,
}

impl AssignmentWatcher {
    /// Creates a watcher with empty memory
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotWatcher for AssignmentWatcher {
    fn observe(&mut self, snapshot: &[TaskSnapshot]) -> Vec<NotificationEvent> {
        if !self.primed {
            self.seen.extend(snapshot.iter().map(|t| t.id));
            self.primed = true;
            return Vec::new();
        }

        let mut events = Vec::new();
        for task in snapshot {
            if self.seen.insert(task.id) {
                events.push(NotificationEvent::TaskAssigned {
                    title: task.title.clone(),
                    project: task.project.as_ref().map(|p| p.name.clone()),
                });
            }
        }

        events
    }
}

/// Fires when a task transitions to done
///
/// Used on the admin side against the team-wide query. Only the
/// transition fires: tasks already done at subscribe time are primed into
/// the known-done set, and a task stays in that set once completed, so
/// reopening and completing again does not re-notify.
#[derive(Debug, Default)]
pub struct CompletionWatcher {
    known_done: HashSet<Uuid>,
    primed: bool,
}

impl CompletionWatcher {
    /// Creates a watcher with empty memory
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotWatcher for CompletionWatcher {
    fn observe(&mut self, snapshot: &[TaskSnapshot]) -> Vec<NotificationEvent> {
        if !self.primed {
            self.known_done
                .extend(snapshot.iter().filter(|t| t.status == TaskStatus::Done).map(|t| t.id));
            self.primed = true;
            return Vec::new();
        }

        let mut events = Vec::new();
        for task in snapshot {
            if task.status == TaskStatus::Done && self.known_done.insert(task.id) {
                events.push(NotificationEvent::TaskCompleted {
                    title: task.title.clone(),
                    completer: task
                        .completed_by_user
                        .as_ref()
                        .and_then(|u| u.name.clone()),
                });
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: Uuid, title: &str, status: TaskStatus) -> TaskSnapshot {
        TaskSnapshot {
            id,
            title: title.to_string(),
            status,
            project: None,
            completed_by_user: None,
        }
    }

    #[test]
    fn test_first_snapshot_only_primes() {
        let mut watcher = AssignmentWatcher::new();
        let tasks = vec![
            snapshot(Uuid::new_v4(), "Existing A", TaskStatus::Pending),
            snapshot(Uuid::new_v4(), "Existing B", TaskStatus::Pending),
        ];

        assert!(watcher.observe(&tasks).is_empty());
        // Same tasks again: still nothing new.
        assert!(watcher.observe(&tasks).is_empty());
    }

    #[test]
    fn test_new_task_fires_once() {
        let mut watcher = AssignmentWatcher::new();
        let existing = snapshot(Uuid::new_v4(), "Existing", TaskStatus::Pending);
        watcher.observe(std::slice::from_ref(&existing));

        let new_task = TaskSnapshot {
            project: Some(ProjectInfo {
                name: "Launch".to_string(),
            }),
            ..snapshot(Uuid::new_v4(), "Write copy", TaskStatus::Pending)
        };
        let tasks = vec![existing.clone(), new_task.clone()];

        let events = watcher.observe(&tasks);
        assert_eq!(
            events,
            vec![NotificationEvent::TaskAssigned {
                title: "Write copy".to_string(),
                project: Some("Launch".to_string()),
            }]
        );

        // The same snapshot re-delivered fires nothing.
        assert!(watcher.observe(&tasks).is_empty());
    }

    #[test]
    fn test_completion_fires_on_transition_only() {
        let mut watcher = CompletionWatcher::new();

        let done_at_start = snapshot(Uuid::new_v4(), "Old done", TaskStatus::Done);
        let pending = snapshot(Uuid::new_v4(), "Write copy", TaskStatus::Pending);
        watcher.observe(&[done_at_start.clone(), pending.clone()]);

        // A pending task appearing later does not fire.
        let another_pending = snapshot(Uuid::new_v4(), "More work", TaskStatus::Pending);
        assert!(watcher
            .observe(&[done_at_start.clone(), pending.clone(), another_pending.clone()])
            .is_empty());

        // The tracked task transitioning to done fires once.
        let mut completed = pending.clone();
        completed.status = TaskStatus::Done;
        completed.completed_by_user = Some(UserInfo {
            name: Some("Ada".to_string()),
        });

        let events = watcher.observe(&[done_at_start.clone(), completed.clone()]);
        assert_eq!(
            events,
            vec![NotificationEvent::TaskCompleted {
                title: "Write copy".to_string(),
                completer: Some("Ada".to_string()),
            }]
        );

        assert!(watcher.observe(&[done_at_start, completed]).is_empty());
    }

    #[test]
    fn test_reopen_then_complete_does_not_refire() {
        let mut watcher = CompletionWatcher::new();
        let task = snapshot(Uuid::new_v4(), "Write copy", TaskStatus::Pending);
        watcher.observe(std::slice::from_ref(&task));

        let mut done = task.clone();
        done.status = TaskStatus::Done;
        assert_eq!(watcher.observe(std::slice::from_ref(&done)).len(), 1);

        // Reopened...
        assert!(watcher.observe(std::slice::from_ref(&task)).is_empty());
        // ...and completed again: the id is already in the done set.
        assert!(watcher.observe(std::slice::from_ref(&done)).is_empty());
    }

    #[test]
    fn test_snapshot_deserializes_from_api_row() {
        let row = serde_json::json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "title": "Write copy",
            "status": "done",
            "project_id": "550e8400-e29b-41d4-a716-446655440001",
            "assignees": [],
            "notes": [],
            "created_at": "2026-08-07T12:00:00Z",
            "project": { "id": "550e8400-e29b-41d4-a716-446655440001", "name": "Launch" },
            "completed_by_user": { "id": "550e8400-e29b-41d4-a716-446655440002", "name": "Ada" }
        });

        let snapshot: TaskSnapshot = serde_json::from_value(row).unwrap();
        assert_eq!(snapshot.title, "Write copy");
        assert_eq!(snapshot.status, TaskStatus::Done);
        assert_eq!(snapshot.project.unwrap().name, "Launch");
        assert_eq!(snapshot.completed_by_user.unwrap().name.as_deref(), Some("Ada"));
    }
}

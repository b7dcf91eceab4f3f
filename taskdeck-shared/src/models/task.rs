/// Task model and lifecycle operations
///
/// Tasks carry their assignment two ways at once: a legacy single
/// `assigned_to` reference and the current `assignees` list. Both fields
/// are persisted on every write so single-assignee consumers keep working
/// through the migration; the reconciliation helpers below are the only
/// write path for the pair.
///
/// # State Machine
///
/// ```text
/// pending ⇄ done
/// ```
///
/// Both transitions are caller-triggered (`mark_done` / `mark_pending`),
/// tasks start pending, and there is no terminal state.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title TEXT NOT NULL,
///     project_id UUID NOT NULL REFERENCES projects(id),
///     status task_status NOT NULL DEFAULT 'pending',
///     assigned_to UUID REFERENCES users(id),
///     assignees UUID[] NOT NULL DEFAULT '{}',
///     created_by UUID REFERENCES users(id),
///     completed_at TIMESTAMPTZ,
///     completed_by UUID REFERENCES users(id),
///     completion_note TEXT,
///     images TEXT[] NOT NULL DEFAULT '{}',
///     notes JSONB NOT NULL DEFAULT '[]',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::user::User;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Open, waiting to be worked on
    Pending,

    /// Completed (reopenable)
    Done,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }
}

/// Kind tag on a history note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Written when a task was marked done
    Completion,

    /// Written when a done task was reopened
    Reopen,

    /// Free-standing remark
    Comment,
}

/// An entry in a task's append-only history
///
/// History only ever grows; completing or reopening a task appends here
/// while the mutable `completion_note` field is overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNote {
    /// Free-text content
    pub content: String,

    /// Author (attribution is mandatory for audit entries)
    pub user_id: Uuid,

    /// When the note was written
    pub timestamp: DateTime<Utc>,

    /// What kind of event the note records
    pub kind: NoteKind,

    /// Optional image attachments on the note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Owning project
    pub project_id: Uuid,

    /// Current status
    pub status: TaskStatus,

    /// Legacy single assignee (kept in sync with `assignees` on write)
    pub assigned_to: Option<Uuid>,

    /// All assigned users
    pub assignees: Vec<Uuid>,

    /// Who created the task
    pub created_by: Option<Uuid>,

    /// When the task was completed (unset while pending)
    pub completed_at: Option<DateTime<Utc>>,

    /// Who completed the task
    pub completed_by: Option<Uuid>,

    /// Latest completion note (overwritten on each completion)
    pub completion_note: Option<String>,

    /// Opaque storage ids of attached images
    pub images: Vec<String>,

    /// Append-only history
    pub notes: Json<Vec<TaskNote>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Owning project
    pub project_id: Uuid,

    /// Legacy single assignee
    pub assigned_to: Option<Uuid>,

    /// Assignee list (reconciled with `assigned_to` before persisting)
    pub assignees: Option<Vec<Uuid>>,

    /// Creator reference
    pub created_by: Option<Uuid>,

    /// Storage ids of attached images
    pub images: Option<Vec<String>>,
}

/// Error type for task mutations that need authorization
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Caller lacks the admin role required for the operation
    #[error("Only admins can delete tasks")]
    NotAdmin,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Reconciles the assignee list at creation time
///
/// Start from `assignees` (or empty) and append `assigned_to` when it is
/// not already present. The legacy field itself is persisted exactly as
/// supplied.
pub fn reconcile_on_create(assignees: Option<Vec<Uuid>>, assigned_to: Option<Uuid>) -> Vec<Uuid> {
    let mut list = assignees.unwrap_or_default();
    if let Some(user) = assigned_to {
        if !list.contains(&user) {
            list.push(user);
        }
    }
    list
}

/// Reconciles both assignment fields for an assignment update
///
/// Mirrors creation, with one addition: when no legacy `user_id` is given
/// and the list is non-empty, the legacy field becomes the FIRST list
/// element regardless of its prior value (the implicit primary assignee).
pub fn reconcile_on_assign(
    assignees: Option<Vec<Uuid>>,
    user_id: Option<Uuid>,
) -> (Vec<Uuid>, Option<Uuid>) {
    let mut list = assignees.unwrap_or_default();
    let mut primary = user_id;

    if let Some(user) = user_id {
        if !list.contains(&user) {
            list.push(user);
        }
    }

    if primary.is_none() {
        primary = list.first().copied();
    }

    (list, primary)
}

/// Builds an audit note, or nothing when content or author is missing
///
/// Reopening (or completing) with a note but no author silently produces
/// no history entry: attribution is mandatory for audit entries.
fn build_audit_note(content: Option<&str>, author: Option<Uuid>, kind: NoteKind) -> Option<TaskNote> {
    match (content, author) {
        (Some(content), Some(author)) => Some(TaskNote {
            content: content.to_string(),
            user_id: author,
            timestamp: Utc::now(),
            kind,
            images: None,
        }),
        _ => None,
    }
}

impl Task {
    /// Creates a new task in pending state
    ///
    /// The assignee list is reconciled with the legacy field (see
    /// [`reconcile_on_create`]); completion fields start unset.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let assignees = reconcile_on_create(data.assignees, data.assigned_to);

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, project_id, assigned_to, assignees, created_by, images)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, project_id, status, assigned_to, assignees, created_by,
                      completed_at, completed_by, completion_note, images, notes, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.project_id)
        .bind(data.assigned_to)
        .bind(assignees)
        .bind(data.created_by)
        .bind(data.images.unwrap_or_default())
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, project_id, status, assigned_to, assignees, created_by,
                   completed_at, completed_by, completion_note, images, notes, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Updates a task's assignment
    ///
    /// Both assignment fields are rewritten from the reconciled state (see
    /// [`reconcile_on_assign`]). Returns `None` when the task does not
    /// exist.
    pub async fn assign(
        pool: &PgPool,
        id: Uuid,
        assignees: Option<Vec<Uuid>>,
        user_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        if Self::find_by_id(pool, id).await?.is_none() {
            return Ok(None);
        }

        let (assignees, assigned_to) = reconcile_on_assign(assignees, user_id);

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET assignees = $2, assigned_to = $3
            WHERE id = $1
            RETURNING id, title, project_id, status, assigned_to, assignees, created_by,
                      completed_at, completed_by, completion_note, images, notes, created_at
            "#,
        )
        .bind(id)
        .bind(assignees)
        .bind(assigned_to)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Marks a task done
    ///
    /// Sets the completion timestamp and completer, and overwrites the
    /// completion note (latest wins; completing twice replaces it). A
    /// supplied note with a completer is also appended to the history,
    /// which only ever grows. Returns `None` when the task does not exist.
    pub async fn mark_done(
        pool: &PgPool,
        id: Uuid,
        completed_by: Option<Uuid>,
        note: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(task) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let mut notes = task.notes.0;
        if let Some(entry) = build_audit_note(note.as_deref(), completed_by, NoteKind::Completion) {
            notes.push(entry);
        }

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = 'done', completed_at = NOW(), completed_by = $2,
                completion_note = $3, notes = $4
            WHERE id = $1
            RETURNING id, title, project_id, status, assigned_to, assignees, created_by,
                      completed_at, completed_by, completion_note, images, notes, created_at
            "#,
        )
        .bind(id)
        .bind(completed_by)
        .bind(note)
        .bind(Json(notes))
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Reopens a done task
    ///
    /// Clears the completion timestamp, completer, and completion note. A
    /// reopen note is appended to the history only when both the note and
    /// its author are supplied. Returns `None` when the task does not
    /// exist.
    pub async fn mark_pending(
        pool: &PgPool,
        id: Uuid,
        user_id: Option<Uuid>,
        note: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(task) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let mut notes = task.notes.0;
        if let Some(entry) = build_audit_note(note.as_deref(), user_id, NoteKind::Reopen) {
            notes.push(entry);
        }

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = 'pending', completed_at = NULL, completed_by = NULL,
                completion_note = NULL, notes = $2
            WHERE id = $1
            RETURNING id, title, project_id, status, assigned_to, assignees, created_by,
                      completed_at, completed_by, completion_note, images, notes, created_at
            "#,
        )
        .bind(id)
        .bind(Json(notes))
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Hard-deletes a task
    ///
    /// Only admins may delete; tasks are leaf entities so no cascade is
    /// needed. Returns false when no row matched.
    pub async fn delete(pool: &PgPool, caller: &User, id: Uuid) -> Result<bool, TaskError> {
        if !caller.is_admin() {
            return Err(TaskError::NotAdmin);
        }

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Pending.as_str(), "pending");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_create_reconciliation_appends_legacy_assignee() {
        let u = Uuid::new_v4();
        assert_eq!(reconcile_on_create(Some(vec![]), Some(u)), vec![u]);
        assert_eq!(reconcile_on_create(None, Some(u)), vec![u]);
    }

    #[test]
    fn test_create_reconciliation_no_duplicate() {
        let u = Uuid::new_v4();
        let v = Uuid::new_v4();
        assert_eq!(
            reconcile_on_create(Some(vec![u, v]), Some(u)),
            vec![u, v]
        );
    }

    #[test]
    fn test_create_reconciliation_without_legacy() {
        let u = Uuid::new_v4();
        assert_eq!(reconcile_on_create(Some(vec![u]), None), vec![u]);
        assert!(reconcile_on_create(None, None).is_empty());
    }

    #[test]
    fn test_assign_reconciliation_first_element_becomes_primary() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let (list, primary) = reconcile_on_assign(Some(vec![a, b]), None);
        assert_eq!(list, vec![a, b]);
        assert_eq!(primary, Some(a));
    }

    #[test]
    fn test_assign_reconciliation_appends_user_id() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let (list, primary) = reconcile_on_assign(Some(vec![a]), Some(b));
        assert_eq!(list, vec![a, b]);
        assert_eq!(primary, Some(b));
    }

    #[test]
    fn test_assign_reconciliation_user_id_only() {
        let u = Uuid::new_v4();

        let (list, primary) = reconcile_on_assign(None, Some(u));
        assert_eq!(list, vec![u]);
        assert_eq!(primary, Some(u));
    }

    #[test]
    fn test_assign_reconciliation_empty_clears_both() {
        let (list, primary) = reconcile_on_assign(None, None);
        assert!(list.is_empty());
        assert_eq!(primary, None);
    }

    #[test]
    fn test_audit_note_requires_author() {
        let author = Uuid::new_v4();

        let entry = build_audit_note(Some("needs edits"), Some(author), NoteKind::Reopen).unwrap();
        assert_eq!(entry.content, "needs edits");
        assert_eq!(entry.user_id, author);
        assert_eq!(entry.kind, NoteKind::Reopen);

        assert!(build_audit_note(Some("needs edits"), None, NoteKind::Reopen).is_none());
        assert!(build_audit_note(None, Some(author), NoteKind::Completion).is_none());
    }

    #[test]
    fn test_note_kind_serialization() {
        assert_eq!(serde_json::to_string(&NoteKind::Completion).unwrap(), "\"completion\"");
        assert_eq!(serde_json::to_string(&NoteKind::Reopen).unwrap(), "\"reopen\"");
        assert_eq!(serde_json::to_string(&NoteKind::Comment).unwrap(), "\"comment\"");
    }
}

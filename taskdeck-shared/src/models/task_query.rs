/// Task retrieval paths and their enrichment
///
/// Three independent read paths feed the UI:
///
/// 1. **By project**: a project's tasks, each with its legacy single
///    assignee resolved.
/// 2. **"My tasks"**: everything assigned to one user, tolerating rows
///    from before the multi-assignee migration, with optional project,
///    date, and search refinement.
/// 3. **Admin view**: every task under a team, with the full resolved
///    assignee list, creator, completer, and signed attachment URLs.
///
/// Referenced records are always attached by id lookup, batched into one
/// round trip per record type; ids that resolve to nothing are dropped.
/// The in-memory refinement steps are pure functions so the filter
/// semantics are testable without a database.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::project::Project;
use super::task::Task;
use super::user::User;
use crate::storage::UrlSigner;

/// A task with its legacy single assignee resolved
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithAssignee {
    /// The task itself
    #[serde(flatten)]
    pub task: Task,

    /// The legacy assignee's user record (None when unset or missing)
    pub assigned_user: Option<User>,
}

/// A task on someone's personal list, with its owning project attached
#[derive(Debug, Clone, Serialize)]
pub struct MyTask {
    /// The task itself
    #[serde(flatten)]
    pub task: Task,

    /// The owning project (None when it no longer resolves)
    pub project: Option<Project>,
}

/// A task in the team-wide admin view, fully enriched
#[derive(Debug, Clone, Serialize)]
pub struct AdminTask {
    /// The task itself
    #[serde(flatten)]
    pub task: Task,

    /// The owning project
    pub project: Project,

    /// Legacy single assignee, kept for single-assignee consumers
    pub assigned_user: Option<User>,

    /// Resolved assignee records; falls back to a singleton of the legacy
    /// assignee when the stored list is empty
    pub assignees_list: Vec<User>,

    /// Creator record
    pub created_by_user: Option<User>,

    /// Completer record
    pub completed_by_user: Option<User>,

    /// Signed, time-limited download URLs for attachments; ids that fail
    /// to resolve are dropped
    pub image_urls: Vec<String>,
}

/// Refinements for the "my tasks" path, applied in declaration order
#[derive(Debug, Clone, Default)]
pub struct MyTasksFilter {
    /// Exact-match project narrowing
    pub project: Option<Uuid>,

    /// Inclusive creation-time lower bound
    pub date_from: Option<DateTime<Utc>>,

    /// Inclusive creation-time upper bound
    pub date_to: Option<DateTime<Utc>>,

    /// Case-insensitive substring over title or project name (applied
    /// after enrichment)
    pub search: Option<String>,
}

/// Refinements for the admin view, applied in declaration order
#[derive(Debug, Clone, Default)]
pub struct AdminTasksFilter {
    /// Narrow to one project of the team
    pub project: Option<Uuid>,

    /// Tasks assigned to this user (legacy field or list membership)
    pub assigned_to: Option<Uuid>,

    /// Tasks completed by exactly this user
    pub completed_by: Option<Uuid>,

    /// Inclusive creation-time lower bound
    pub date_from: Option<DateTime<Utc>>,

    /// Inclusive creation-time upper bound
    pub date_to: Option<DateTime<Utc>>,
}

/// Whether `user` is assigned to `task`, via either representation
///
/// Checks the legacy field and the list: rows created before the
/// multi-assignee migration may only carry `assigned_to`.
pub fn is_assigned(task: &Task, user: Uuid) -> bool {
    task.assigned_to == Some(user) || task.assignees.contains(&user)
}

/// Applies inclusive creation-time bounds
pub fn within_date_bounds(
    task: &Task,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> bool {
    if let Some(from) = from {
        if task.created_at < from {
            return false;
        }
    }
    if let Some(to) = to {
        if task.created_at > to {
            return false;
        }
    }
    true
}

/// Sorts tasks newest-first by creation time
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Case-insensitive substring search over a title and an optional project
/// name
pub fn search_matches(title: &str, project_name: Option<&str>, query: &str) -> bool {
    let query = query.to_lowercase();
    if title.to_lowercase().contains(&query) {
        return true;
    }
    project_name
        .map(|name| name.to_lowercase().contains(&query))
        .unwrap_or(false)
}

/// Applies the project and date refinements of [`MyTasksFilter`]
///
/// Search is not applied here; it runs after project enrichment so it can
/// match project names too.
pub fn refine_my_tasks(tasks: Vec<Task>, filter: &MyTasksFilter) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|t| filter.project.map_or(true, |p| t.project_id == p))
        .filter(|t| within_date_bounds(t, filter.date_from, filter.date_to))
        .collect()
}

/// Applies the assignee, completer, and date refinements of
/// [`AdminTasksFilter`]
pub fn refine_admin_tasks(tasks: Vec<Task>, filter: &AdminTasksFilter) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|t| filter.assigned_to.map_or(true, |u| is_assigned(t, u)))
        .filter(|t| filter.completed_by.map_or(true, |u| t.completed_by == Some(u)))
        .filter(|t| within_date_bounds(t, filter.date_from, filter.date_to))
        .collect()
}

/// Resolves an admin-view row from prefetched projects and users
///
/// `users` holds every record the id set referenced; anything missing from
/// it is dropped from the enriched row rather than surfaced as an error.
pub fn enrich_admin_task(
    task: Task,
    project: Project,
    users: &HashMap<Uuid, User>,
    signer: &UrlSigner,
) -> AdminTask {
    let assigned_user = task.assigned_to.and_then(|id| users.get(&id)).cloned();

    let assignees_list = if !task.assignees.is_empty() {
        task.assignees
            .iter()
            .filter_map(|id| users.get(id))
            .cloned()
            .collect()
    } else if let Some(user) = assigned_user.clone() {
        vec![user]
    } else {
        Vec::new()
    };

    let created_by_user = task.created_by.and_then(|id| users.get(&id)).cloned();
    let completed_by_user = task.completed_by.and_then(|id| users.get(&id)).cloned();

    let image_urls = task
        .images
        .iter()
        .filter_map(|storage_id| signer.download_url(storage_id).ok())
        .collect();

    AdminTask {
        task,
        project,
        assigned_user,
        assignees_list,
        created_by_user,
        completed_by_user,
        image_urls,
    }
}

/// Collects every user id an admin-view task set references
fn referenced_user_ids(tasks: &[Task]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = Vec::new();

    for task in tasks {
        for id in task
            .assignees
            .iter()
            .copied()
            .chain(task.assigned_to)
            .chain(task.created_by)
            .chain(task.completed_by)
        {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    ids
}

impl TaskWithAssignee {
    /// Lists a project's tasks newest-first, each with its legacy assignee
    /// resolved
    pub async fn for_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, project_id, status, assigned_to, assignees, created_by,
                   completed_at, completed_by, completion_note, images, notes, created_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let assignee_ids: Vec<Uuid> = tasks.iter().filter_map(|t| t.assigned_to).collect();
        let users: HashMap<Uuid, User> = User::find_by_ids(pool, &assignee_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(tasks
            .into_iter()
            .map(|task| {
                let assigned_user = task.assigned_to.and_then(|id| users.get(&id)).cloned();
                TaskWithAssignee { task, assigned_user }
            })
            .collect())
    }
}

impl MyTask {
    /// Lists everything assigned to `user_id`, refined by `filter`
    ///
    /// The fetch unions the legacy field with list membership and
    /// deduplicates, so tasks created before the multi-assignee migration
    /// still show up exactly once. Refinement order: project, date
    /// bounds, project enrichment, then search.
    pub async fn for_user(
        pool: &PgPool,
        user_id: Uuid,
        filter: &MyTasksFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, project_id, status, assigned_to, assignees, created_by,
                   completed_at, completed_by, completion_note, images, notes, created_at
            FROM tasks
            WHERE assigned_to = $1 OR $1 = ANY(assignees)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        tasks = refine_my_tasks(tasks, filter);

        let project_ids: Vec<Uuid> = tasks.iter().map(|t| t.project_id).collect();
        let projects: HashMap<Uuid, Project> = Project::find_by_ids(pool, &project_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let enriched: Vec<MyTask> = tasks
            .into_iter()
            .map(|task| {
                let project = projects.get(&task.project_id).cloned();
                MyTask { task, project }
            })
            .collect();

        if let Some(query) = &filter.search {
            return Ok(enriched
                .into_iter()
                .filter(|t| {
                    search_matches(
                        &t.task.title,
                        t.project.as_ref().map(|p| p.name.as_str()),
                        query,
                    )
                })
                .collect());
        }

        Ok(enriched)
    }
}

impl AdminTask {
    /// Lists every task under a team, refined by `filter` and fully
    /// enriched
    pub async fn for_team(
        pool: &PgPool,
        signer: &UrlSigner,
        team_id: Uuid,
        filter: &AdminTasksFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects: Vec<Project> = Project::list_by_team(pool, team_id)
            .await?
            .into_iter()
            .filter(|p| filter.project.map_or(true, |id| p.id == id))
            .collect();

        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let project_ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let project_map: HashMap<Uuid, Project> =
            projects.into_iter().map(|p| (p.id, p)).collect();

        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, project_id, status, assigned_to, assignees, created_by,
                   completed_at, completed_by, completion_note, images, notes, created_at
            FROM tasks
            WHERE project_id = ANY($1)
            "#,
        )
        .bind(&project_ids)
        .fetch_all(pool)
        .await?;

        let mut tasks = refine_admin_tasks(tasks, filter);
        sort_newest_first(&mut tasks);

        let user_ids = referenced_user_ids(&tasks);
        let users: HashMap<Uuid, User> = User::find_by_ids(pool, &user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(tasks
            .into_iter()
            .filter_map(|task| {
                let project = project_map.get(&task.project_id).cloned()?;
                Some(enrich_admin_task(task, project, &users, signer))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskStatus, TaskNote};
    use chrono::Duration;
    use sqlx::types::Json;

    fn task(created_offset_hours: i64) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Write copy".to_string(),
            project_id: Uuid::new_v4(),
            status: TaskStatus::Pending,
            assigned_to: None,
            assignees: Vec::new(),
            created_by: None,
            completed_at: None,
            completed_by: None,
            completion_note: None,
            images: Vec::new(),
            notes: Json(Vec::<TaskNote>::new()),
            created_at: Utc::now() + Duration::hours(created_offset_hours),
        }
    }

    fn user(id: Uuid) -> User {
        User {
            id,
            subject: format!("idp_{}", id),
            email: format!("{}@example.com", id),
            name: Some("Someone".to_string()),
            role: None,
            team_id: None,
            created_at: Utc::now(),
        }
    }

    fn project(id: Uuid, name: &str) -> Project {
        Project {
            id,
            name: name.to_string(),
            team_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    fn signer() -> UrlSigner {
        UrlSigner::new(
            "https://files.example.com",
            "test-signing-secret-32-bytes-long!!",
            900,
        )
    }

    #[test]
    fn test_is_assigned_checks_both_representations() {
        let u = Uuid::new_v4();

        let mut legacy_only = task(0);
        legacy_only.assigned_to = Some(u);
        assert!(is_assigned(&legacy_only, u));

        let mut list_only = task(0);
        list_only.assignees = vec![u];
        assert!(is_assigned(&list_only, u));

        assert!(!is_assigned(&task(0), u));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let t = task(0);
        let exactly = t.created_at;

        assert!(within_date_bounds(&t, Some(exactly), Some(exactly)));
        assert!(!within_date_bounds(&t, Some(exactly + Duration::seconds(1)), None));
        assert!(!within_date_bounds(&t, None, Some(exactly - Duration::seconds(1))));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut tasks = vec![task(-2), task(0), task(-1)];
        sort_newest_first(&mut tasks);

        assert!(tasks[0].created_at >= tasks[1].created_at);
        assert!(tasks[1].created_at >= tasks[2].created_at);
    }

    #[test]
    fn test_search_matches_title_and_project() {
        assert!(search_matches("Write COPY", None, "copy"));
        assert!(search_matches("Unrelated", Some("Launch Plan"), "launch"));
        assert!(!search_matches("Unrelated", Some("Launch Plan"), "missing"));
        assert!(!search_matches("Unrelated", None, "launch"));
    }

    #[test]
    fn test_refine_admin_tasks_by_completer_ignores_status() {
        let completer = Uuid::new_v4();

        let mut completed = task(0);
        completed.completed_by = Some(completer);

        let other = task(0);

        let filter = AdminTasksFilter {
            completed_by: Some(completer),
            ..Default::default()
        };

        let refined = refine_admin_tasks(vec![completed.clone(), other], &filter);
        assert_eq!(refined.len(), 1);
        assert_eq!(refined[0].id, completed.id);
    }

    #[test]
    fn test_refine_admin_tasks_by_assignee() {
        let u = Uuid::new_v4();

        let mut legacy = task(0);
        legacy.assigned_to = Some(u);

        let mut listed = task(0);
        listed.assignees = vec![Uuid::new_v4(), u];

        let unrelated = task(0);

        let filter = AdminTasksFilter {
            assigned_to: Some(u),
            ..Default::default()
        };

        let refined = refine_admin_tasks(vec![legacy, listed, unrelated], &filter);
        assert_eq!(refined.len(), 2);
    }

    #[test]
    fn test_refine_my_tasks_project_filter() {
        let p = Uuid::new_v4();

        let mut matching = task(0);
        matching.project_id = p;
        let other = task(0);

        let filter = MyTasksFilter {
            project: Some(p),
            ..Default::default()
        };

        let refined = refine_my_tasks(vec![matching, other], &filter);
        assert_eq!(refined.len(), 1);
        assert_eq!(refined[0].project_id, p);
    }

    #[test]
    fn test_enrich_falls_back_to_legacy_assignee() {
        let legacy = Uuid::new_v4();
        let mut t = task(0);
        t.assigned_to = Some(legacy);

        let mut users = HashMap::new();
        users.insert(legacy, user(legacy));

        let enriched = enrich_admin_task(t.clone(), project(t.project_id, "Launch"), &users, &signer());
        assert_eq!(enriched.assignees_list.len(), 1);
        assert_eq!(enriched.assignees_list[0].id, legacy);
        assert_eq!(enriched.assigned_user.as_ref().unwrap().id, legacy);
    }

    #[test]
    fn test_enrich_prefers_stored_list_and_drops_missing() {
        let a = Uuid::new_v4();
        let missing = Uuid::new_v4();

        let mut t = task(0);
        t.assignees = vec![a, missing];
        t.assigned_to = Some(a);

        let mut users = HashMap::new();
        users.insert(a, user(a));

        let enriched = enrich_admin_task(t.clone(), project(t.project_id, "Launch"), &users, &signer());
        assert_eq!(enriched.assignees_list.len(), 1);
        assert_eq!(enriched.assignees_list[0].id, a);
    }

    #[test]
    fn test_enrich_resolves_image_urls() {
        let mut t = task(0);
        t.images = vec!["deadbeef01".to_string(), "".to_string()];

        let enriched = enrich_admin_task(t.clone(), project(t.project_id, "Launch"), &HashMap::new(), &signer());
        // The empty storage id fails to resolve and is dropped.
        assert_eq!(enriched.image_urls.len(), 1);
        assert!(enriched.image_urls[0].contains("deadbeef01"));
    }
}

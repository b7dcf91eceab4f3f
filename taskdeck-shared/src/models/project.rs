/// Project model and database operations
///
/// Projects are named containers of tasks within a team. Names are not
/// unique within a team; deletion cascades to the project's tasks in
/// application code.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     team_id UUID NOT NULL REFERENCES teams(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project display name (no uniqueness constraint within a team)
    pub name: String,

    /// Owning team
    pub team_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Owning team
    pub team_id: Uuid,
}

impl Project {
    /// Creates a new project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, team_id)
            VALUES ($1, $2)
            RETURNING id, name, team_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.team_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, team_id, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists a team's projects, newest first
    pub async fn list_by_team(pool: &PgPool, team_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, team_id, created_at
            FROM projects
            WHERE team_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Batch-fetches projects by id set
    ///
    /// Used by the enrichment paths; ids with no row are simply absent.
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, team_id, created_at
            FROM projects
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Deletes a project and every task in it
    ///
    /// Tasks are deleted first, then the project. The two statements are
    /// intentionally not wrapped in one transaction: a crash between them
    /// leaves a task-less project behind, never orphaned tasks.
    ///
    /// Returns false when the project did not exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let tasks_deleted = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        tracing::info!(
            project_id = %id,
            tasks_deleted,
            "Deleted project and its tasks"
        );

        Ok(result.rows_affected() > 0)
    }
}

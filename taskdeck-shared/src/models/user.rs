/// User model and database operations
///
/// Users are created lazily: on the first authenticated sign-in the API
/// maps the external identity to a row here, and team admins can invite
/// members by email before those members ever sign in (a "pending"
/// placeholder row whose subject encodes the email).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'employee');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     subject TEXT NOT NULL UNIQUE,
///     email TEXT NOT NULL UNIQUE,
///     name TEXT,
///     role user_role,
///     team_id UUID REFERENCES teams(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::user::{CreateUser, User};
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// // Idempotent by subject: a second sign-in returns the same row.
/// let user = User::create_or_get(&pool, CreateUser {
///     subject: "idp_user_42".to_string(),
///     email: "ada@example.com".to_string(),
///     name: Some("Ada".to_string()),
/// }).await?;
/// println!("signed in: {}", user.id);
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Prefix marking placeholder users created by email invite before the
/// real identity ever signed in.
pub const PENDING_SUBJECT_PREFIX: &str = "pending_";

/// User role within their team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Owns a team: manages projects, members, and every task
    Admin,

    /// Works on assigned tasks
    Employee,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Employee => "employee",
        }
    }
}

/// User model
///
/// `subject` is the external identity reference issued by the identity
/// provider; it is the only link between a session and a row here.
/// Role and team are unset until the user picks a role or is invited.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// External identity reference (`pending_<email>` for invited
    /// placeholders that have not signed in yet)
    pub subject: String,

    /// Email address, unique across all users
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// Role, unset until chosen or assigned by invite
    pub role: Option<UserRole>,

    /// Team membership, unset until invited or a team is created
    pub team_id: Option<Uuid>,

    /// When the row was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user from an authenticated identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// External identity reference
    pub subject: String,

    /// Email address
    pub email: String,

    /// Optional display name
    pub name: Option<String>,
}

impl User {
    /// Builds the placeholder subject for an invited email
    pub fn pending_subject(email: &str) -> String {
        format!("{}{}", PENDING_SUBJECT_PREFIX, email)
    }

    /// Whether this row is an invite placeholder that never signed in
    pub fn is_pending(&self) -> bool {
        self.subject.starts_with(PENDING_SUBJECT_PREFIX)
    }

    /// Whether this user holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Some(UserRole::Admin)
    }

    /// Finds or creates the user for an authenticated identity
    ///
    /// Idempotent by subject: if a row already exists it is returned
    /// unchanged (role and team untouched); otherwise a roleless, teamless
    /// row is inserted.
    pub async fn create_or_get(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        if let Some(existing) = Self::find_by_subject(pool, &data.subject).await? {
            return Ok(existing);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (subject, email, name)
            VALUES ($1, $2, $3)
            RETURNING id, subject, email, name, role, team_id, created_at
            "#,
        )
        .bind(data.subject)
        .bind(data.email)
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Sets the user's role, creating their team when becoming an admin
    ///
    /// When `role` is admin and `team_name` is supplied, the team insert
    /// and the role/team update happen in one transaction so a crash can
    /// never leave an admin without their team. Otherwise only the role is
    /// patched and any existing team reference is left untouched.
    ///
    /// Returns `None` when no user exists for `subject`.
    pub async fn update_role(
        pool: &PgPool,
        subject: &str,
        role: UserRole,
        team_name: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(user) = Self::find_by_subject(pool, subject).await? else {
            return Ok(None);
        };

        let updated = match (role, team_name) {
            (UserRole::Admin, Some(team_name)) => {
                let mut tx = pool.begin().await?;

                let (team_id,): (Uuid,) = sqlx::query_as(
                    r#"
                    INSERT INTO teams (name, admin_id)
                    VALUES ($1, $2)
                    RETURNING id
                    "#,
                )
                .bind(team_name)
                .bind(user.id)
                .fetch_one(&mut *tx)
                .await?;

                let updated = sqlx::query_as::<_, User>(
                    r#"
                    UPDATE users
                    SET role = $2, team_id = $3
                    WHERE id = $1
                    RETURNING id, subject, email, name, role, team_id, created_at
                    "#,
                )
                .bind(user.id)
                .bind(role)
                .bind(team_id)
                .fetch_one(&mut *tx)
                .await?;

                tx.commit().await?;
                updated
            }
            _ => {
                sqlx::query_as::<_, User>(
                    r#"
                    UPDATE users
                    SET role = $2
                    WHERE id = $1
                    RETURNING id, subject, email, name, role, team_id, created_at
                    "#,
                )
                .bind(user.id)
                .bind(role)
                .fetch_one(pool)
                .await?
            }
        };

        Ok(Some(updated))
    }

    /// Finds a user by external identity reference
    pub async fn find_by_subject(pool: &PgPool, subject: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, subject, email, name, role, team_id, created_at
            FROM users
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email (case-sensitive exact match on the stored value)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, subject, email, name, role, team_id, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, subject, email, name, role, team_id, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Batch-fetches users by id set
    ///
    /// The enrichment paths collect every referenced user id first and
    /// resolve them in one round trip. Ids with no row are simply absent
    /// from the result.
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, subject, email, name, role, team_id, created_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}

/// Team model and member directory operations
///
/// A team is the tenant boundary: projects, members, and one admin. Teams
/// are created exactly once, when a user picks the admin role (see
/// `User::update_role`), and are never deleted in-app. Membership is a
/// reference on the user row, so removing a member clears that reference
/// and keeps the user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     admin_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::{User, UserRole};

/// Team model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID
    pub id: Uuid,

    /// Team display name
    pub name: String,

    /// The admin who created the team
    pub admin_id: Uuid,

    /// When the team was created
    pub created_at: DateTime<Utc>,
}

/// Error type for member directory operations
#[derive(Debug, thiserror::Error)]
pub enum TeamError {
    /// Caller is not an admin with a team of their own
    #[error("Only team admins can remove members")]
    NotTeamAdmin,

    /// Target user does not exist
    #[error("User not found")]
    UserNotFound,

    /// Target user belongs to a different team
    #[error("User is not in your team")]
    NotInTeam,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Checks that `caller` may remove `target` from their team
///
/// The caller must be an admin and a member of a team, and the target must
/// belong to that same team. Kept as a pure function so the authorization
/// rules are testable without a database.
pub fn check_removal(caller: &User, target: &User) -> Result<(), TeamError> {
    let Some(caller_team) = caller.team_id else {
        return Err(TeamError::NotTeamAdmin);
    };

    if !caller.is_admin() {
        return Err(TeamError::NotTeamAdmin);
    }

    if target.team_id != Some(caller_team) {
        return Err(TeamError::NotInTeam);
    }

    Ok(())
}

impl Team {
    /// Finds a team by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, admin_id, created_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Lists every user whose team reference points at this team
    pub async fn members(pool: &PgPool, team_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        let members = sqlx::query_as::<_, User>(
            r#"
            SELECT id, subject, email, name, role, team_id, created_at
            FROM users
            WHERE team_id = $1
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Adds a member to the team by email, inviting if necessary
    ///
    /// The lookup is a case-sensitive exact match on the stored email. An
    /// existing user joins the team keeping their role (defaulted to
    /// employee only when unset, so an admin is never demoted by an
    /// invite). An unknown email gets a placeholder row with a
    /// `pending_<email>` subject that the real identity will claim through
    /// the invite-time email match.
    ///
    /// Returns the member's user id either way.
    pub async fn add_member_by_email(
        pool: &PgPool,
        email: &str,
        team_id: Uuid,
    ) -> Result<Uuid, sqlx::Error> {
        if let Some(user) = User::find_by_email(pool, email).await? {
            sqlx::query(
                r#"
                UPDATE users
                SET team_id = $2, role = COALESCE(role, 'employee')
                WHERE id = $1
                "#,
            )
            .bind(user.id)
            .bind(team_id)
            .execute(pool)
            .await?;

            return Ok(user.id);
        }

        let (user_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO users (subject, email, role, team_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(User::pending_subject(email))
        .bind(email)
        .bind(UserRole::Employee)
        .bind(team_id)
        .fetch_one(pool)
        .await?;

        Ok(user_id)
    }

    /// Removes a member from the caller's team
    ///
    /// Soft removal: clears the target's team reference, the user row
    /// persists. Fails before any write when the caller lacks authority or
    /// the target is missing or in another team.
    pub async fn remove_member(
        pool: &PgPool,
        caller: &User,
        user_id: Uuid,
    ) -> Result<(), TeamError> {
        let target = User::find_by_id(pool, user_id)
            .await?
            .ok_or(TeamError::UserNotFound)?;

        check_removal(caller, &target)?;

        sqlx::query("UPDATE users SET team_id = NULL WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Option<UserRole>, team_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            subject: "idp_user".to_string(),
            email: "person@example.com".to_string(),
            name: None,
            role,
            team_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_removal_requires_admin() {
        let team = Uuid::new_v4();
        let caller = user(Some(UserRole::Employee), Some(team));
        let target = user(Some(UserRole::Employee), Some(team));

        assert!(matches!(
            check_removal(&caller, &target),
            Err(TeamError::NotTeamAdmin)
        ));
    }

    #[test]
    fn test_removal_requires_caller_team() {
        let caller = user(Some(UserRole::Admin), None);
        let target = user(Some(UserRole::Employee), Some(Uuid::new_v4()));

        assert!(matches!(
            check_removal(&caller, &target),
            Err(TeamError::NotTeamAdmin)
        ));
    }

    #[test]
    fn test_removal_rejects_other_team() {
        let caller = user(Some(UserRole::Admin), Some(Uuid::new_v4()));
        let target = user(Some(UserRole::Employee), Some(Uuid::new_v4()));

        assert!(matches!(
            check_removal(&caller, &target),
            Err(TeamError::NotInTeam)
        ));
    }

    #[test]
    fn test_removal_allows_same_team_admin() {
        let team = Uuid::new_v4();
        let caller = user(Some(UserRole::Admin), Some(team));
        let target = user(Some(UserRole::Employee), Some(team));

        assert!(check_removal(&caller, &target).is_ok());
    }

    #[test]
    fn test_removal_target_without_team_rejected() {
        let caller = user(Some(UserRole::Admin), Some(Uuid::new_v4()));
        let target = user(Some(UserRole::Employee), None);

        assert!(matches!(
            check_removal(&caller, &target),
            Err(TeamError::NotInTeam)
        ));
    }
}

//! Repository for the `invitations` table.

use efference_core::types::DbId;
use sqlx::PgPool;

use crate::models::invitation::{CreateInvitation, Invitation};
use crate::models::status::InvitationStatus;
use crate::models::user::{CreateUser, User};

use super::user_repo::COLUMNS as USER_COLUMNS;

const COLUMNS: &str = "id, code, email, role, status, invited_by_id, expires_at, \
                       created_at, sent_at, used_at";

/// Provides CRUD and redemption operations for invitations.
pub struct InvitationRepo;

impl InvitationRepo {
    /// Insert a new `pending` invitation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateInvitation,
    ) -> Result<Invitation, sqlx::Error> {
        let query = format!(
            "INSERT INTO invitations (code, email, role, invited_by_id, expires_at)
             VALUES ($1, LOWER($2), $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(&input.code)
            .bind(input.email.trim())
            .bind(&input.role)
            .bind(input.invited_by_id)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitations WHERE id = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitations WHERE code = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List invitations, newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<InvitationStatus>,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<Invitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invitations
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(status.map(InvitationStatus::as_str))
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await
    }

    /// Whether a still-redeemable, unexpired invitation exists for `email`.
    pub async fn has_live_invitation(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM invitations
                WHERE email = LOWER($1)
                  AND status IN ('pending', 'sent')
                  AND expires_at > NOW()
             )",
        )
        .bind(email.trim())
        .fetch_one(pool)
        .await
    }

    /// Set the status, stamping `sent_at` / `used_at` when moving into
    /// `sent` / `used`. Returns `None` if the invitation does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: InvitationStatus,
    ) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!(
            "UPDATE invitations SET
                status = $2,
                sent_at = CASE WHEN $2 = 'sent' THEN NOW() ELSE sent_at END,
                used_at = CASE WHEN $2 = 'used' THEN NOW() ELSE used_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Mark a redeemable invitation as expired. Returns `true` if it changed.
    pub async fn mark_expired(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invitations SET status = 'expired'
             WHERE id = $1 AND status IN ('pending', 'sent')",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Redeem an invitation: create the user and mark the invitation `used`
    /// in one transaction.
    ///
    /// Returns `None` (and creates nothing) if the invitation was no longer
    /// redeemable when the transaction ran.
    pub async fn redeem(
        pool: &PgPool,
        invitation_id: DbId,
        user: &CreateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE invitations SET status = 'used', used_at = NOW()
             WHERE id = $1 AND status IN ('pending', 'sent') AND expires_at > NOW()",
        )
        .bind(invitation_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO users (name, email, password_hash, role, is_invited, invitation_used_at)
             VALUES ($1, LOWER($2), $3, $4, TRUE, NOW())
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&query)
            .bind(&user.name)
            .bind(user.email.trim())
            .bind(&user.password_hash)
            .bind(&user.role)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(created))
    }
}

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::errors::AuthError;
use crate::domain::auth::models::RefreshSession;
use crate::domain::auth::models::RefreshSessionId;
use crate::domain::auth::ports::RefreshSessionStore;
use crate::domain::user::models::UserId;

#[derive(sqlx::FromRow)]
struct RefreshSessionRow {
    id: Uuid,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    used: bool,
    created_at: DateTime<Utc>,
}

impl From<RefreshSessionRow> for RefreshSession {
    fn from(row: RefreshSessionRow) -> Self {
        RefreshSession {
            id: RefreshSessionId(row.id),
            user_id: UserId(row.user_id),
            expires_at: row.expires_at,
            used: row.used,
            created_at: row.created_at,
        }
    }
}

/// Refresh sessions in the `refresh_sessions` table.
///
/// Rows are never deleted; expired and used sessions stay as history.
pub struct PostgresRefreshSessionStore {
    pool: PgPool,
}

impl PostgresRefreshSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshSessionStore for PostgresRefreshSessionStore {
    async fn get(&self, id: &RefreshSessionId) -> Result<RefreshSession, AuthError> {
        let row = sqlx::query_as::<_, RefreshSessionRow>(
            r#"
            SELECT id, user_id, expires_at, used, created_at
            FROM refresh_sessions
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        row.map(RefreshSession::from)
            .ok_or(AuthError::RefreshSessionNotFound)
    }

    async fn insert(&self, session: RefreshSession) -> Result<RefreshSession, AuthError> {
        let row = sqlx::query_as::<_, RefreshSessionRow>(
            r#"
            INSERT INTO refresh_sessions (id, user_id, expires_at, used, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, expires_at, used, created_at
            "#,
        )
        .bind(session.id.0)
        .bind(session.user_id.0)
        .bind(session.expires_at)
        .bind(session.used)
        .bind(session.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(row.into())
    }

    async fn update(&self, session: RefreshSession) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET used = $2, expires_at = $3
            WHERE id = $1 AND used = FALSE
            "#,
        )
        .bind(session.id.0)
        .bind(session.used)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing matched: the row is either gone or already used.
        let stored: Option<bool> =
            sqlx::query_scalar("SELECT used FROM refresh_sessions WHERE id = $1")
                .bind(session.id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AuthError::Database(e.to_string()))?;

        match stored {
            Some(_) => Err(AuthError::RefreshTokenUsed),
            None => Err(AuthError::RefreshSessionNotFound),
        }
    }
}

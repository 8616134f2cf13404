use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::db::DbPool;
use crate::users::User;
use crate::StorageError;

const REMEMBER_ME_DAYS: i64 = 30;
const DEFAULT_SESSION_HOURS: i64 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Tokens are random and opaque; only a keyed SHA-256 digest is stored, so a
/// leaked database cannot be replayed as live sessions.
fn token_digest(secret: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_token() -> Result<String, StorageError> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes).map_err(|e| StorageError::TokenGeneration(e.to_string()))?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

pub async fn create_session(
    pool: &DbPool,
    secret: &str,
    user_id: i64,
    remember_me: bool,
) -> Result<Session, StorageError> {
    let token = generate_token()?;
    let expires_at = if remember_me {
        Utc::now() + Duration::days(REMEMBER_ME_DAYS)
    } else {
        Utc::now() + Duration::hours(DEFAULT_SESSION_HOURS)
    };

    sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(token_digest(secret, &token))
        .bind(user_id)
        .bind(expires_at.to_rfc3339())
        .execute(pool)
        .await?;

    Ok(Session { token, expires_at })
}

/// Resolve a presented token to its user, rejecting unknown and expired
/// sessions alike.
pub async fn validate_session(
    pool: &DbPool,
    secret: &str,
    token: &str,
) -> Result<Option<User>, StorageError> {
    let row: Option<(i64, String, String)> = sqlx::query_as(
        r#"
        SELECT u.id, u.username, u.email
        FROM sessions s
        JOIN users u ON s.user_id = u.id
        WHERE s.token_hash = ? AND s.expires_at > ?
        "#,
    )
    .bind(token_digest(secret, token))
    .bind(Utc::now().to_rfc3339())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, username, email)| User {
        id,
        username,
        email,
    }))
}

pub async fn delete_session(pool: &DbPool, secret: &str, token: &str) -> Result<bool, StorageError> {
    let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(token_digest(secret, token))
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn cleanup_expired_sessions(pool: &DbPool) -> Result<u64, StorageError> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await?;
    let deleted = result.rows_affected();
    if deleted > 0 {
        tracing::info!(deleted, "cleaned up expired sessions");
    }
    Ok(deleted)
}

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use serde::Serialize;

use crate::db::DbPool;
use crate::StorageError;

/// Passwords are truncated to this many bytes before hashing, the bcrypt-era
/// limit existing accounts may already depend on.
const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

fn hash_password(password: &str) -> Result<String, StorageError> {
    let bytes = password.as_bytes();
    let truncated = &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)];
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(truncated, &salt)
        .map(|h| h.to_string())
        .map_err(|e| StorageError::Hash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    let bytes = password.as_bytes();
    let truncated = &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)];
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(truncated, &parsed)
        .is_ok()
}

pub async fn create_user(
    pool: &DbPool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, StorageError> {
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = ? OR email = ?")
            .bind(username)
            .bind(email)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(StorageError::DuplicateUser);
    }

    let password_hash = hash_password(password)?;
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    tracing::info!(username, "user created");
    Ok(User {
        id: row.0,
        username: username.to_string(),
        email: email.to_string(),
    })
}

/// Check credentials. `login` may be a username or an email address. Any
/// failure (unknown user, wrong password) yields the same `None` so callers
/// cannot leak which field was wrong.
pub async fn authenticate_user(
    pool: &DbPool,
    login: &str,
    password: &str,
) -> Result<Option<User>, StorageError> {
    let row: Option<(i64, String, String, String)> = sqlx::query_as(
        "SELECT id, username, email, password_hash FROM users WHERE username = ? OR email = ?",
    )
    .bind(login)
    .bind(login)
    .fetch_optional(pool)
    .await?;

    let Some((id, username, email, password_hash)) = row else {
        return Ok(None);
    };
    if !verify_password(password, &password_hash) {
        return Ok(None);
    }

    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(Some(User {
        id,
        username,
        email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_db;

    #[tokio::test]
    async fn create_and_authenticate() {
        let pool = memory_db().await;
        let user = create_user(&pool, "budi", "budi@example.com", "rahasia123")
            .await
            .unwrap();
        assert_eq!(user.username, "budi");

        let found = authenticate_user(&pool, "budi", "rahasia123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn authenticate_by_email() {
        let pool = memory_db().await;
        create_user(&pool, "budi", "budi@example.com", "rahasia123")
            .await
            .unwrap();
        assert!(authenticate_user(&pool, "budi@example.com", "rahasia123")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let pool = memory_db().await;
        create_user(&pool, "budi", "budi@example.com", "rahasia123")
            .await
            .unwrap();

        let wrong_password = authenticate_user(&pool, "budi", "salah").await.unwrap();
        let unknown_user = authenticate_user(&pool, "siti", "rahasia123").await.unwrap();
        assert!(wrong_password.is_none());
        assert!(unknown_user.is_none());
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let pool = memory_db().await;
        create_user(&pool, "budi", "budi@example.com", "pw").await.unwrap();
        let err = create_user(&pool, "budi", "other@example.com", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateUser));
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let pool = memory_db().await;
        create_user(&pool, "budi", "budi@example.com", "pw").await.unwrap();
        let err = create_user(&pool, "siti", "budi@example.com", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateUser));
    }

    #[tokio::test]
    async fn long_passwords_truncate_consistently() {
        let pool = memory_db().await;
        let long = "x".repeat(100);
        create_user(&pool, "budi", "budi@example.com", &long).await.unwrap();
        // Bytes beyond the 72-byte cutoff do not participate.
        let mut variant = "x".repeat(72);
        variant.push_str("yyyy");
        assert!(authenticate_user(&pool, "budi", &variant)
            .await
            .unwrap()
            .is_some());
    }
}

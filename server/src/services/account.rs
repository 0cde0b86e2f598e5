//! Account service: signup, credential checks, and profile updates.
//!
//! DESIGN
//! ======
//! Passwords are stored as Argon2id PHC strings. Hashing runs on the blocking
//! pool so a burst of logins cannot stall the async workers. Emails are
//! trimmed and lowercased before they reach the unique index.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use canvas::error::ErrorCode;
use rand::Rng;
use serde::Deserialize;
use sqlx::{PgPool, Row};
use tracing::{info, warn};

use crate::services::session::SessionUser;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("current password is incorrect")]
    WrongPassword,
    #[error("no account matches that email")]
    UnknownEmail,
    #[error("board title does not match")]
    BoardTitleMismatch,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "E_MISSING_CREDENTIALS",
            Self::EmailTaken => "E_EMAIL_TAKEN",
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::WrongPassword => "E_WRONG_PASSWORD",
            Self::UnknownEmail => "E_UNKNOWN_EMAIL",
            Self::BoardTitleMismatch => "E_BOARD_TITLE_MISMATCH",
            Self::Hash(_) => "E_HASH",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

/// Profile changes. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

// =============================================================================
// PASSWORDS
// =============================================================================

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Hash `password` into a PHC string with a fresh random salt.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Check `password` against a stored PHC string. A malformed hash never matches.
pub(crate) fn verify_password(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?
}

async fn verify_blocking(password: String, stored: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Create an account.
///
/// # Errors
///
/// `MissingCredentials` for a blank email or password, `EmailTaken` when the
/// email is already registered.
pub async fn signup(pool: &PgPool, email: &str, password: &str, name: Option<&str>) -> Result<SessionUser, AuthError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let password_hash = hash_blocking(password.to_owned()).await?;

    let row = sqlx::query(
        "INSERT INTO users (email, password_hash, name) VALUES ($1, $2, $3)
         RETURNING id, email, name, color",
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AuthError::EmailTaken,
        other => AuthError::Database(other),
    })?;

    let user = SessionUser::from_row(&row)?;
    info!(user_id = user.id, "account created");
    Ok(user)
}

/// Check credentials and return the user.
///
/// # Errors
///
/// `InvalidCredentials` for an unknown email or a wrong password.
pub async fn login(pool: &PgPool, email: &str, password: &str) -> Result<SessionUser, AuthError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let row = sqlx::query("SELECT id, email, name, color, password_hash FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let stored: String = row.try_get("password_hash")?;
    if !verify_blocking(password.to_owned(), stored).await? {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(SessionUser::from_row(&row)?)
}

/// Apply a profile update. A password change requires the current password.
///
/// # Errors
///
/// `WrongPassword` when the current password is missing or incorrect,
/// `MissingCredentials` for an empty new password.
pub async fn update_profile(pool: &PgPool, user_id: i64, update: &ProfileUpdate) -> Result<SessionUser, AuthError> {
    let mut new_hash = None;
    if let Some(new_password) = update.new_password.as_deref() {
        if new_password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        let current = update.current_password.clone().ok_or(AuthError::WrongPassword)?;
        let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        if !verify_blocking(current, stored).await? {
            return Err(AuthError::WrongPassword);
        }
        new_hash = Some(hash_blocking(new_password.to_owned()).await?);
    }

    let row = sqlx::query(
        "UPDATE users SET
             name = COALESCE($2, name),
             color = COALESCE($3, color),
             password_hash = COALESCE($4, password_hash)
         WHERE id = $1
         RETURNING id, email, name, color",
    )
    .bind(user_id)
    .bind(update.name.as_deref().map(str::trim))
    .bind(update.color.as_deref())
    .bind(new_hash.as_deref())
    .fetch_one(pool)
    .await?;

    if new_hash.is_some() {
        info!(user_id, "password changed");
    }
    Ok(SessionUser::from_row(&row)?)
}

/// Set a new password for the account at `email`, proven by naming one of
/// its boards exactly. Existing sessions are revoked.
///
/// # Errors
///
/// `MissingCredentials` for a blank field, `UnknownEmail` when no account
/// matches, `BoardTitleMismatch` when the account has no board with that title.
pub async fn reset_password_by_board_title(
    pool: &PgPool,
    email: &str,
    board_title: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    let email = normalize_email(email);
    if email.is_empty() || board_title.is_empty() || new_password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let (user_id, matched): (i64, bool) = sqlx::query_as(
        "SELECT u.id, EXISTS (SELECT 1 FROM boards b WHERE b.user_id = u.id AND b.title = $2)
         FROM users u
         WHERE u.email = $1",
    )
    .bind(&email)
    .bind(board_title)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthError::UnknownEmail)?;
    if !matched {
        warn!(user_id, "password reset refused: board title mismatch");
        return Err(AuthError::BoardTitleMismatch);
    }

    let password_hash = hash_blocking(new_password.to_owned()).await?;
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(user_id)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(user_id, "password reset");
    Ok(())
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;

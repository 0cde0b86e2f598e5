//! Auth routes: signup, password login and reset, logout, and the current profile.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;
use tracing::info;

use crate::error::ApiError;
use crate::services::account::{self, ProfileUpdate};
use crate::services::session::{self, SessionUser};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

pub(crate) fn session_cookie(token: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

fn token_from(jar: &CookieJar) -> Option<&str> {
    jar.get(COOKIE_NAME).map(Cookie::value).filter(|t| !t.is_empty())
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = token_from(&jar).ok_or_else(ApiError::unauthorized)?;

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await?
            .ok_or_else(ApiError::unauthorized)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct SignupBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    board_title: String,
    #[serde(default)]
    new_password: String,
}

/// `POST /api/auth/signup` — create an account.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupBody>,
) -> Result<(StatusCode, Json<SessionUser>), ApiError> {
    let user = account::signup(&state.pool, &body.email, &body.password, body.name.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/auth/login` — check credentials, start a session, set the cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<(CookieJar, Json<SessionUser>), ApiError> {
    let user = account::login(&state.pool, &body.email, &body.password).await?;
    let ttl = state.config.session_ttl_hours;
    let token = session::create_session(&state.pool, user.id, ttl).await?;
    info!(user_id = user.id, "signed in");

    let cookie = session_cookie(token, state.config.cookie_secure, Duration::hours(i64::from(ttl)));
    Ok((jar.add(cookie), Json(user)))
}

/// `POST /api/auth/reset-password` — set a new password by naming one of the
/// account's boards.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<StatusCode, ApiError> {
    account::reset_password_by_board_title(&state.pool, &body.email, &body.board_title, &body.new_password).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/auth/logout` — end the session (if any) and clear the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = token_from(&jar) {
        session::delete_session(&state.pool, token).await?;
    }
    let cookie = session_cookie(String::new(), state.config.cookie_secure, Duration::ZERO);
    Ok((jar.add(cookie), StatusCode::NO_CONTENT))
}

/// `GET /api/auth/me` — the signed-in user.
pub async fn me(auth: AuthUser) -> Json<SessionUser> {
    Json(auth.user)
}

/// `PATCH /api/auth/me` — update name, colour, or password.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<SessionUser>, ApiError> {
    let user = account::update_profile(&state.pool, auth.user.id, &update).await?;
    Ok(Json(user))
}

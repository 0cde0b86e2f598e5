//! JSON-over-HTTP persistence client for the board server.
//!
//! Thin wrapper over `reqwest` with a cookie store, so the session cookie set
//! by `login` rides along on every later request. Status mapping and body
//! parsing are pure functions for testability.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Board, BoardPatch, NewBoard};
use crate::doc::{BoardId, Note, NoteId, NotePatch, PartialNote};
use crate::error::CanvasError;
use crate::persistence::{PersistenceClient, ReorderRequest, SessionProvider, UpdateNotesRequest, UserIdentity};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpPersistenceClient {
    http: reqwest::Client,
    base_url: String,
    user: Mutex<Option<UserIdentity>>,
}

impl HttpPersistenceClient {
    /// Build a client for the server at `base_url` (e.g. `http://localhost:3000`).
    ///
    /// # Errors
    ///
    /// Returns `Network` if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, CanvasError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CanvasError::Network(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url, user: Mutex::new(None) })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn user_slot(&self) -> MutexGuard<'_, Option<UserIdentity>> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sign in and cache the identity.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for bad credentials, `Network` for transport failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserIdentity, CanvasError> {
        let body = LoginRequest { email, password };
        let text = self.send(self.http.post(self.url("/api/auth/login")).json(&body)).await?;
        let user: UserIdentity = parse_body(&text)?;
        info!(user_id = user.id, "signed in");
        *self.user_slot() = Some(user.clone());
        Ok(user)
    }

    /// Sign out. The cached identity is dropped even if the request fails.
    ///
    /// # Errors
    ///
    /// Returns the transport or server error.
    pub async fn logout(&self) -> Result<(), CanvasError> {
        *self.user_slot() = None;
        self.send(self.http.post(self.url("/api/auth/logout"))).await?;
        Ok(())
    }

    /// Ask the server who the session cookie belongs to and cache the answer.
    ///
    /// # Errors
    ///
    /// Returns errors other than `Unauthorized`, which yields `Ok(None)`.
    pub async fn refresh_session(&self) -> Result<Option<UserIdentity>, CanvasError> {
        let user = match self.send(self.http.get(self.url("/api/auth/me"))).await {
            Ok(text) => Some(parse_body::<UserIdentity>(&text)?),
            Err(CanvasError::Unauthorized) => None,
            Err(e) => return Err(e),
        };
        debug!(signed_in = user.is_some(), "session refreshed");
        *self.user_slot() = user.clone();
        Ok(user)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, CanvasError> {
        let response = request.send().await.map_err(|e| CanvasError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| CanvasError::Network(e.to_string()))?;
        if !(200..300).contains(&status) {
            if status == 401 {
                *self.user_slot() = None;
            }
            return Err(status_error(status, &text));
        }
        Ok(text)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CanvasError> {
        let text = self.send(self.http.get(self.url(path))).await?;
        parse_body(&text)
    }
}

impl SessionProvider for HttpPersistenceClient {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user_slot().clone()
    }
}

#[async_trait]
impl PersistenceClient for HttpPersistenceClient {
    async fn load_notes(&self, board_id: BoardId) -> Result<Vec<Note>, CanvasError> {
        self.get_json(&format!("/api/boards/{board_id}/notes")).await
    }

    async fn create_note(&self, board_id: BoardId, fields: &PartialNote) -> Result<Note, CanvasError> {
        let request = self.http.post(self.url(&format!("/api/boards/{board_id}/notes"))).json(fields);
        parse_body(&self.send(request).await?)
    }

    async fn update_notes(&self, board_id: BoardId, patches: &[NotePatch]) -> Result<(), CanvasError> {
        let body = UpdateNotesRequest { notes: patches.to_vec() };
        let request = self.http.put(self.url(&format!("/api/boards/{board_id}/notes"))).json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_note(&self, id: NoteId) -> Result<(), CanvasError> {
        self.send(self.http.delete(self.url(&format!("/api/notes/{id}")))).await?;
        Ok(())
    }

    async fn list_boards(&self) -> Result<Vec<Board>, CanvasError> {
        self.get_json("/api/boards").await
    }

    async fn create_board(&self, board: &NewBoard) -> Result<Board, CanvasError> {
        let request = self.http.post(self.url("/api/boards")).json(board);
        parse_body(&self.send(request).await?)
    }

    async fn update_board(&self, id: BoardId, patch: &BoardPatch) -> Result<Board, CanvasError> {
        let request = self.http.patch(self.url(&format!("/api/boards/{id}"))).json(patch);
        parse_body(&self.send(request).await?)
    }

    async fn delete_board(&self, id: BoardId) -> Result<(), CanvasError> {
        self.send(self.http.delete(self.url(&format!("/api/boards/{id}")))).await?;
        Ok(())
    }

    async fn reorder_boards(&self, ids: &[BoardId]) -> Result<(), CanvasError> {
        let body = ReorderRequest { board_ids: ids.to_vec() };
        self.send(self.http.post(self.url("/api/boards/reorder")).json(&body)).await?;
        Ok(())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Error body rendered by the server: `{ "code": ..., "message": ... }`.
/// Only the message is kept; the status already selects the variant.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// =============================================================================
// PARSING
// =============================================================================

/// Map a non-success status (and its body) to the engine's error taxonomy.
pub(crate) fn status_error(status: u16, body: &str) -> CanvasError {
    let detail = serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| if body.is_empty() { format!("HTTP {status}") } else { body.to_owned() },
        |b| b.message,
    );
    match status {
        401 => CanvasError::Unauthorized,
        403 => CanvasError::Forbidden(detail),
        404 => CanvasError::NotFound(detail),
        400 | 409 | 422 => CanvasError::Validation(detail),
        _ => CanvasError::Network(detail),
    }
}

pub(crate) fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, CanvasError> {
    serde_json::from_str(text).map_err(|e| CanvasError::Network(format!("unexpected response: {e}")))
}

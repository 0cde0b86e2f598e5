//! Board list controller: the user's ordered boards.
//!
//! Boards sort by `(order_index, id)`. A new board takes the next index after
//! the current maximum. Reorder rewrites every index to the board's position
//! in the new sequence; the local list only changes once the collaborator has
//! accepted the whole batch, so a failed reorder leaves the old order intact.

#[cfg(test)]
#[path = "board_test.rs"]
mod board_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::doc::BoardId;
use crate::error::CanvasError;
use crate::persistence::PersistenceClient;

/// A named container of notes owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    /// Background/accent colour.
    pub background: String,
    pub order_index: i32,
}

/// Fields for creating a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBoard {
    pub title: String,
    pub background: String,
}

/// Partial board update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl BoardPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.background.is_none()
    }
}

/// Sort boards by `(order_index asc, id asc)`.
pub fn sort_boards(boards: &mut [Board]) {
    boards.sort_by_key(|b| (b.order_index, b.id));
}

/// Order index for a new board: one past the maximum, or 0 when there are none.
#[must_use]
pub fn next_order_index(boards: &[Board]) -> i32 {
    boards.iter().map(|b| b.order_index).max().map_or(0, |m| m + 1)
}

/// Check that `proposed` names every id in `current` exactly once.
///
/// # Errors
///
/// Returns `Validation` describing the first mismatch.
pub fn validate_permutation(current: &[BoardId], proposed: &[BoardId]) -> Result<(), CanvasError> {
    if current.len() != proposed.len() {
        return Err(CanvasError::validation(format!(
            "reorder names {} boards, expected {}",
            proposed.len(),
            current.len()
        )));
    }
    let known: HashSet<BoardId> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(proposed.len());
    for id in proposed {
        if !known.contains(id) {
            return Err(CanvasError::validation(format!("unknown board {id} in reorder")));
        }
        if !seen.insert(*id) {
            return Err(CanvasError::validation(format!("board {id} appears twice in reorder")));
        }
    }
    Ok(())
}

/// Locally cached, ordered board list.
#[derive(Debug, Default)]
pub struct BoardList {
    boards: Vec<Board>,
}

impl BoardList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Boards in display order.
    #[must_use]
    pub fn list(&self) -> &[Board] {
        &self.boards
    }

    #[must_use]
    pub fn get(&self, id: BoardId) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<BoardId> {
        self.boards.iter().map(|b| b.id).collect()
    }

    /// Replace the cache with the collaborator's list.
    ///
    /// # Errors
    ///
    /// Propagates the collaborator's error; the cache is left unchanged.
    pub async fn refresh(&mut self, client: &dyn PersistenceClient) -> Result<&[Board], CanvasError> {
        let mut boards = client.list_boards().await?;
        sort_boards(&mut boards);
        info!(count = boards.len(), "boards loaded");
        self.boards = boards;
        Ok(&self.boards)
    }

    /// Create a board at the end of the list.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank title, or the collaborator's error.
    pub async fn create(
        &mut self,
        client: &dyn PersistenceClient,
        title: &str,
        background: &str,
    ) -> Result<Board, CanvasError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CanvasError::validation("board title must not be empty"));
        }
        let board = client
            .create_board(&NewBoard { title: title.to_owned(), background: background.to_owned() })
            .await?;
        self.boards.push(board.clone());
        sort_boards(&mut self.boards);
        Ok(board)
    }

    /// Change a board's title.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank title, or the collaborator's error.
    pub async fn rename(&mut self, client: &dyn PersistenceClient, id: BoardId, title: &str) -> Result<Board, CanvasError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CanvasError::validation("board title must not be empty"));
        }
        self.update(client, id, BoardPatch { title: Some(title.to_owned()), background: None }).await
    }

    /// Change a board's background colour.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank colour, or the collaborator's error.
    pub async fn recolor(
        &mut self,
        client: &dyn PersistenceClient,
        id: BoardId,
        background: &str,
    ) -> Result<Board, CanvasError> {
        if background.trim().is_empty() {
            return Err(CanvasError::validation("board background must not be empty"));
        }
        self.update(client, id, BoardPatch { title: None, background: Some(background.to_owned()) }).await
    }

    async fn update(&mut self, client: &dyn PersistenceClient, id: BoardId, patch: BoardPatch) -> Result<Board, CanvasError> {
        let board = client.update_board(id, &patch).await?;
        if let Some(slot) = self.boards.iter_mut().find(|b| b.id == id) {
            *slot = board.clone();
        }
        Ok(board)
    }

    /// Delete a board. Its notes go with it on the collaborator's side.
    ///
    /// # Errors
    ///
    /// Propagates the collaborator's error; the cache is left unchanged.
    pub async fn delete(&mut self, client: &dyn PersistenceClient, id: BoardId) -> Result<(), CanvasError> {
        client.delete_board(id).await?;
        self.boards.retain(|b| b.id != id);
        Ok(())
    }

    /// Reorder to `ids`, which must be a permutation of the current ids.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `ids` is not a permutation, or the
    /// collaborator's error. Either way the local order is unchanged.
    pub async fn reorder(&mut self, client: &dyn PersistenceClient, ids: &[BoardId]) -> Result<(), CanvasError> {
        validate_permutation(&self.ids(), ids)?;
        if let Err(e) = client.reorder_boards(ids).await {
            warn!(error = %e, "board reorder failed; keeping previous order");
            return Err(e);
        }
        self.apply_order(ids);
        Ok(())
    }

    fn apply_order(&mut self, ids: &[BoardId]) {
        for board in &mut self.boards {
            if let Some(pos) = ids.iter().position(|id| *id == board.id) {
                board.order_index = i32::try_from(pos).unwrap_or(i32::MAX);
            }
        }
        sort_boards(&mut self.boards);
    }
}

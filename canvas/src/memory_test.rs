#![allow(clippy::float_cmp)]

use super::*;

const ME: i64 = 1;
const OTHER: i64 = 2;

async fn board(store: &MemoryPersistence, title: &str) -> Board {
    store
        .create_board(&NewBoard { title: title.into(), background: "#fef3c7".into() })
        .await
        .unwrap()
}

#[tokio::test]
async fn boards_get_dense_order_indices() {
    let store = MemoryPersistence::new(ME);
    let a = board(&store, "A").await;
    let b = board(&store, "B").await;
    assert_eq!(a.order_index, 0);
    assert_eq!(b.order_index, 1);
    let ids: Vec<BoardId> = store.list_boards().await.unwrap().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[tokio::test]
async fn foreign_boards_are_hidden_and_forbidden() {
    let store = MemoryPersistence::new(ME);
    let foreign = store.insert_foreign_board(OTHER, "theirs");
    assert!(store.list_boards().await.unwrap().is_empty());
    let err = store.load_notes(foreign).await.unwrap_err();
    assert!(matches!(err, CanvasError::Forbidden(_)));
    let err = store.create_note(foreign, &PartialNote::default()).await.unwrap_err();
    assert!(matches!(err, CanvasError::Forbidden(_)));
}

#[tokio::test]
async fn missing_board_is_not_found() {
    let store = MemoryPersistence::new(ME);
    assert!(matches!(store.load_notes(42).await, Err(CanvasError::NotFound(_))));
}

#[tokio::test]
async fn create_note_applies_defaults_and_fresh_ids() {
    let store = MemoryPersistence::new(ME);
    let b = board(&store, "A").await;
    let first = store.create_note(b.id, &PartialNote::default()).await.unwrap();
    let second = store.create_note(b.id, &PartialNote::position(5.0, 6.0)).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.width, 250.0);
    assert_eq!((second.x, second.y), (5.0, 6.0));
    assert_eq!(store.load_notes(b.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_notes_is_all_or_nothing() {
    let store = MemoryPersistence::new(ME);
    let b = board(&store, "A").await;
    let note = store.create_note(b.id, &PartialNote::default()).await.unwrap();
    let patches = vec![
        NotePatch { id: note.id, fields: PartialNote::position(40.0, 40.0) },
        NotePatch { id: 999, fields: PartialNote::position(1.0, 1.0) },
    ];
    let err = store.update_notes(b.id, &patches).await.unwrap_err();
    assert!(matches!(err, CanvasError::Validation(_)));
    assert_eq!(store.stored_note(note.id).unwrap().x, 0.0);

    store.update_notes(b.id, &patches[..1]).await.unwrap();
    assert_eq!(store.stored_note(note.id).unwrap().x, 40.0);
}

#[tokio::test]
async fn delete_note_checks_board_ownership() {
    let store = MemoryPersistence::new(ME);
    let foreign = store.insert_foreign_board(OTHER, "theirs");
    let theirs = store.seed_note(foreign, Note::new(0, foreign));
    let err = store.delete_note(theirs).await.unwrap_err();
    assert!(matches!(err, CanvasError::Forbidden(_)));
    assert!(store.stored_note(theirs).is_some());
    assert!(matches!(store.delete_note(12345).await, Err(CanvasError::NotFound(_))));
}

#[tokio::test]
async fn deleting_board_cascades_to_notes() {
    let store = MemoryPersistence::new(ME);
    let b = board(&store, "A").await;
    let note = store.create_note(b.id, &PartialNote::default()).await.unwrap();
    store.delete_board(b.id).await.unwrap();
    assert!(store.stored_note(note.id).is_none());
    assert!(store.list_boards().await.unwrap().is_empty());
}

#[tokio::test]
async fn reorder_rewrites_every_index() {
    let store = MemoryPersistence::new(ME);
    let a = board(&store, "A").await;
    let b = board(&store, "B").await;
    let c = board(&store, "C").await;
    store.reorder_boards(&[c.id, a.id, b.id]).await.unwrap();
    let listed = store.list_boards().await.unwrap();
    let pairs: Vec<(BoardId, i32)> = listed.iter().map(|b| (b.id, b.order_index)).collect();
    assert_eq!(pairs, vec![(c.id, 0), (a.id, 1), (b.id, 2)]);
}

#[tokio::test]
async fn reorder_rejects_partial_permutations() {
    let store = MemoryPersistence::new(ME);
    let a = board(&store, "A").await;
    let b = board(&store, "B").await;
    assert!(store.reorder_boards(&[b.id]).await.is_err());
    assert!(store.reorder_boards(&[b.id, b.id]).await.is_err());
    let ids: Vec<BoardId> = store.list_boards().await.unwrap().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[tokio::test]
async fn injected_failure_fires_once_and_counts_calls() {
    let store = MemoryPersistence::new(ME);
    store.fail_next(Op::ListBoards, CanvasError::Network("offline".into()));
    assert!(matches!(store.list_boards().await, Err(CanvasError::Network(_))));
    assert!(store.list_boards().await.is_ok());
    assert_eq!(store.call_count(Op::ListBoards), 2);
    assert_eq!(store.call_count(Op::ReorderBoards), 0);
}

#[tokio::test]
async fn update_board_patches_present_fields() {
    let store = MemoryPersistence::new(ME);
    let b = board(&store, "A").await;
    let patched = store
        .update_board(b.id, &BoardPatch { title: Some("Renamed".into()), background: None })
        .await
        .unwrap();
    assert_eq!(patched.title, "Renamed");
    assert_eq!(patched.background, "#fef3c7");
}

#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::Note;

fn note_at(id: NoteId, x: f64, y: f64) -> Note {
    Note { x, y, ..Note::new(id, 1) }
}

fn setup(notes: Vec<Note>) -> (InteractionController, NoteStore) {
    let mut ctl = InteractionController::default();
    ctl.start();
    let mut store = NoteStore::default();
    store.load_snapshot(1, notes);
    (ctl, store)
}

fn click(ctl: &mut InteractionController, store: &NoteStore, id: NoteId) -> Vec<Action> {
    ctl.on_pointer_down(PointerTarget::Note(id), Point::new(0.0, 0.0), Button::Primary, store, &Settings::default())
}

fn key(name: &str) -> Key {
    Key::new(name)
}

fn snapping() -> Settings {
    Settings { grid_snap: true, ..Settings::default() }
}

// =============================================================
// Lifecycle
// =============================================================

#[test]
fn listeners_use_capture_phase() {
    assert_eq!(InteractionController::default().listener_phase(), ListenerPhase::Capture);
}

#[test]
fn reserved_chords_are_save_and_create() {
    assert!(is_reserved_chord(&key("s"), Modifiers::ctrl()));
    assert!(is_reserved_chord(&key("S"), Modifiers::meta()));
    assert!(is_reserved_chord(&key("n"), Modifiers::alt()));
    assert!(!is_reserved_chord(&key("s"), Modifiers::default()));
    assert!(!is_reserved_chord(&key("ArrowLeft"), Modifiers::ctrl()));
}

#[test]
fn stopped_controller_ignores_events() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 10.0, 10.0)]);
    ctl.stop();
    assert!(click(&mut ctl, &store, 1).is_empty());
    let out = ctl.on_key_down(&key("s"), Modifiers::ctrl(), &mut store, &Settings::default());
    assert!(out.actions.is_empty());
    assert!(!out.prevent_default);
}

// =============================================================
// Selection and z-order
// =============================================================

#[test]
fn pointer_down_on_note_selects_and_bumps() {
    let (mut ctl, store) = setup(vec![note_at(1, 0.0, 0.0), note_at(2, 0.0, 0.0)]);
    let actions = click(&mut ctl, &store, 1);
    assert_eq!(actions, vec![Action::SelectionChanged(Selection::Selected(1)), Action::RenderNeeded]);
    assert_eq!(ctl.selection(), Selection::Selected(1));
    assert_eq!(ctl.z_of(1), 1);
    assert_eq!(ctl.z_of(2), 0);
}

#[test]
fn z_counter_never_reuses_values() {
    let (mut ctl, store) = setup(vec![note_at(1, 0.0, 0.0), note_at(2, 0.0, 0.0)]);
    click(&mut ctl, &store, 1);
    click(&mut ctl, &store, 2);
    click(&mut ctl, &store, 1);
    assert_eq!(ctl.z_of(1), 3);
    assert_eq!(ctl.z_of(2), 2);
    let order: Vec<NoteId> = ctl.ordered(store.notes()).iter().map(|n| n.id).collect();
    assert_eq!(order, vec![2, 1]);
}

#[test]
fn pointer_down_on_canvas_clears_selection() {
    let (mut ctl, store) = setup(vec![note_at(1, 0.0, 0.0)]);
    click(&mut ctl, &store, 1);
    let actions =
        ctl.on_pointer_down(PointerTarget::Canvas, Point::new(500.0, 500.0), Button::Primary, &store, &Settings::default());
    assert_eq!(actions, vec![Action::SelectionChanged(Selection::Unselected)]);
    assert_eq!(ctl.selection(), Selection::Unselected);
}

#[test]
fn secondary_button_is_ignored() {
    let (mut ctl, store) = setup(vec![note_at(1, 0.0, 0.0)]);
    let actions =
        ctl.on_pointer_down(PointerTarget::Note(1), Point::default(), Button::Secondary, &store, &Settings::default());
    assert!(actions.is_empty());
    assert_eq!(ctl.selection(), Selection::Unselected);
}

#[test]
fn opening_modal_forces_unselected() {
    let (mut ctl, store) = setup(vec![note_at(1, 0.0, 0.0)]);
    click(&mut ctl, &store, 1);
    let actions = ctl.open_modal(ModalKind::NoteProperties(1));
    assert_eq!(
        actions,
        vec![Action::SelectionChanged(Selection::Unselected), Action::ModalOpened(ModalKind::NoteProperties(1))]
    );
    assert_eq!(ctl.selection(), Selection::Unselected);
    assert!(click(&mut ctl, &store, 1).is_empty());
}

#[test]
fn reset_clears_board_scoped_state() {
    let (mut ctl, store) = setup(vec![note_at(1, 0.0, 0.0)]);
    click(&mut ctl, &store, 1);
    ctl.open_modal(ModalKind::Settings);
    ctl.reset();
    assert_eq!(ctl.selection(), Selection::Unselected);
    assert!(ctl.modal().is_none());
    assert_eq!(ctl.z_of(1), 0);
}

#[test]
fn deleting_selected_note_unselects() {
    let (mut ctl, store) = setup(vec![note_at(1, 0.0, 0.0), note_at(2, 0.0, 0.0)]);
    click(&mut ctl, &store, 1);
    assert!(ctl.on_note_deleted(2).is_empty());
    assert_eq!(ctl.selection(), Selection::Selected(1));
    assert_eq!(ctl.on_note_deleted(1), vec![Action::SelectionChanged(Selection::Unselected)]);
    assert_eq!(ctl.selection(), Selection::Unselected);
}

// =============================================================
// Keyboard: move
// =============================================================

#[test]
fn grid_snap_move_steps_by_grid_size() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 103.0, 57.0)]);
    click(&mut ctl, &store, 1);
    let out = ctl.on_key_down(&key("ArrowRight"), Modifiers::ctrl(), &mut store, &snapping());
    assert!(out.prevent_default);
    let note = store.get(1).unwrap();
    assert_eq!((note.x, note.y), (123.0, 57.0));
}

#[test]
fn plain_move_steps_by_five() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 103.0, 57.0)]);
    click(&mut ctl, &store, 1);
    let out = ctl.on_key_down(&key("ArrowRight"), Modifiers::meta(), &mut store, &Settings::default());
    assert_eq!(
        out.actions,
        vec![Action::NoteUpdated {
            id: 1,
            fields: PartialNote { x: Some(108.0), y: Some(57.0), width: Some(250.0), height: Some(200.0), ..PartialNote::default() },
        }]
    );
    assert!(store.is_dirty());
}

#[test]
fn move_clamps_at_origin() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 3.0, 2.0)]);
    click(&mut ctl, &store, 1);
    ctl.on_key_down(&key("ArrowLeft"), Modifiers::ctrl(), &mut store, &Settings::default());
    ctl.on_key_down(&key("ArrowUp"), Modifiers::ctrl(), &mut store, &Settings::default());
    let note = store.get(1).unwrap();
    assert_eq!((note.x, note.y), (0.0, 0.0));
}

#[test]
fn move_disabled_is_ignored() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 10.0, 10.0)]);
    click(&mut ctl, &store, 1);
    let settings = Settings { move_enabled: false, ..Settings::default() };
    let out = ctl.on_key_down(&key("ArrowDown"), Modifiers::ctrl(), &mut store, &settings);
    assert!(out.actions.is_empty());
    assert!(!out.prevent_default);
    assert_eq!(store.get(1).unwrap().y, 10.0);
}

#[test]
fn arrows_without_selection_are_ignored() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 10.0, 10.0)]);
    let out = ctl.on_key_down(&key("ArrowDown"), Modifiers::ctrl(), &mut store, &Settings::default());
    assert!(out.actions.is_empty());
    assert!(!store.is_dirty());
}

#[test]
fn stale_selection_is_silent_noop() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 10.0, 10.0)]);
    click(&mut ctl, &store, 1);
    store.remove(1);
    let out = ctl.on_key_down(&key("ArrowDown"), Modifiers::ctrl(), &mut store, &Settings::default());
    assert_eq!(out, KeyOutcome::default());
}

// =============================================================
// Keyboard: resize
// =============================================================

#[test]
fn alt_arrows_resize_by_ten() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 0.0, 0.0)]);
    click(&mut ctl, &store, 1);
    ctl.on_key_down(&key("ArrowRight"), Modifiers::alt(), &mut store, &Settings::default());
    ctl.on_key_down(&key("ArrowDown"), Modifiers::alt(), &mut store, &Settings::default());
    let note = store.get(1).unwrap();
    assert_eq!((note.width, note.height), (260.0, 210.0));
}

#[test]
fn resize_clamps_at_minimums() {
    let (mut ctl, mut store) = setup(vec![Note { width: 105.0, height: 85.0, ..Note::new(1, 1) }]);
    click(&mut ctl, &store, 1);
    ctl.on_key_down(&key("ArrowLeft"), Modifiers::alt(), &mut store, &Settings::default());
    ctl.on_key_down(&key("ArrowUp"), Modifiers::alt(), &mut store, &Settings::default());
    let note = store.get(1).unwrap();
    assert_eq!((note.width, note.height), (100.0, 80.0));
}

#[test]
fn resize_disabled_is_ignored() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 0.0, 0.0)]);
    click(&mut ctl, &store, 1);
    let settings = Settings { resize_enabled: false, ..Settings::default() };
    ctl.on_key_down(&key("ArrowRight"), Modifiers::alt(), &mut store, &settings);
    assert_eq!(store.get(1).unwrap().width, 250.0);
}

// =============================================================
// Keyboard: save, create, escape
// =============================================================

#[test]
fn save_shortcut_fires_without_selection() {
    let (mut ctl, mut store) = setup(vec![]);
    let out = ctl.on_key_down(&key("s"), Modifiers::ctrl(), &mut store, &Settings::default());
    assert_eq!(out.actions, vec![Action::SaveRequested]);
    assert!(out.prevent_default);
}

#[test]
fn save_shortcut_fires_while_modal_open() {
    let (mut ctl, mut store) = setup(vec![]);
    ctl.open_modal(ModalKind::Settings);
    let out = ctl.on_key_down(&key("S"), Modifiers::meta(), &mut store, &Settings::default());
    assert_eq!(out.actions, vec![Action::SaveRequested]);
}

#[test]
fn modal_swallows_other_keys_and_escape_closes_it() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 0.0, 0.0)]);
    ctl.open_modal(ModalKind::NoteProperties(1));
    let out = ctl.on_key_down(&key("n"), Modifiers::alt(), &mut store, &Settings::default());
    assert!(out.actions.is_empty());
    let out = ctl.on_key_down(&key("Escape"), Modifiers::default(), &mut store, &Settings::default());
    assert_eq!(out.actions, vec![Action::ModalClosed]);
    assert!(ctl.modal().is_none());
}

#[test]
fn create_lands_pointer_inside_new_note() {
    let (mut ctl, mut store) = setup(vec![]);
    ctl.on_pointer_move(Point::new(300.0, 200.0), &mut store, &Settings::default());
    let out = ctl.on_key_down(&key("n"), Modifiers::alt(), &mut store, &Settings::default());
    assert_eq!(out.actions, vec![Action::CreateNoteRequested { at: Point::new(280.0, 180.0) }]);
    assert!(out.prevent_default);
}

#[test]
fn create_snaps_and_clamps() {
    let (mut ctl, mut store) = setup(vec![]);
    ctl.on_pointer_move(Point::new(133.0, 5.0), &mut store, &snapping());
    let out = ctl.on_key_down(&key("n"), Modifiers::alt(), &mut store, &snapping());
    assert_eq!(out.actions, vec![Action::CreateNoteRequested { at: Point::new(120.0, 0.0) }]);
}

#[test]
fn escape_clears_selection() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 0.0, 0.0)]);
    click(&mut ctl, &store, 1);
    let out = ctl.on_key_down(&key("Escape"), Modifiers::default(), &mut store, &Settings::default());
    assert_eq!(out.actions, vec![Action::SelectionChanged(Selection::Unselected)]);
}

// =============================================================
// Pointer drag
// =============================================================

#[test]
fn drag_moves_note_through_store() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 100.0, 100.0)]);
    ctl.on_pointer_down(PointerTarget::Note(1), Point::new(110.0, 110.0), Button::Primary, &store, &Settings::default());
    ctl.on_pointer_move(Point::new(140.0, 125.0), &mut store, &Settings::default());
    ctl.on_pointer_up();
    let note = store.get(1).unwrap();
    assert_eq!((note.x, note.y), (130.0, 115.0));
    assert_eq!(ctl.input(), InputState::Idle);
}

#[test]
fn drag_snaps_to_grid() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 100.0, 100.0)]);
    ctl.on_pointer_down(PointerTarget::Note(1), Point::new(110.0, 110.0), Button::Primary, &store, &snapping());
    ctl.on_pointer_move(Point::new(137.0, 119.0), &mut store, &snapping());
    let note = store.get(1).unwrap();
    assert_eq!((note.x, note.y), (120.0, 100.0));
}

#[test]
fn drag_disabled_when_move_disabled() {
    let (mut ctl, mut store) = setup(vec![note_at(1, 100.0, 100.0)]);
    let settings = Settings { move_enabled: false, ..Settings::default() };
    ctl.on_pointer_down(PointerTarget::Note(1), Point::new(110.0, 110.0), Button::Primary, &store, &settings);
    ctl.on_pointer_move(Point::new(200.0, 200.0), &mut store, &settings);
    assert_eq!(store.get(1).unwrap().x, 100.0);
    assert_eq!(ctl.selection(), Selection::Selected(1));
}

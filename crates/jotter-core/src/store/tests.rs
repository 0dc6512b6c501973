use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::gateway::NotePayload;
use crate::testing::{note, Call, ScriptedGateway};

type TestStore = NoteStore<Rc<ScriptedGateway>>;

fn ids(notes: &[Note]) -> Vec<i64> {
    notes.iter().map(|note| note.id.get()).collect()
}

fn seed() -> Vec<Note> {
    vec![
        note(3, "Groceries", "milk, eggs"),
        note(2, "B", "banana"),
        note(1, "A", "apple"),
    ]
}

async fn loaded_store(notes: Vec<Note>) -> (Rc<ScriptedGateway>, TestStore) {
    let gateway = ScriptedGateway::with_notes(notes);
    let store = NoteStore::new(Rc::clone(&gateway));
    store.load().await.unwrap();
    (gateway, store)
}

#[tokio::test(flavor = "current_thread")]
async fn load_moves_to_ready_and_holds_remote_collection() {
    let gateway = ScriptedGateway::with_notes(seed());
    let store = NoteStore::new(Rc::clone(&gateway));
    assert_eq!(store.load_state(), LoadState::Uninitialized);

    assert_eq!(store.load().await.unwrap(), 3);
    assert_eq!(store.load_state(), LoadState::Ready);
    assert_eq!(ids(&store.notes()), vec![3, 2, 1]);
    assert_eq!(store.filtered_notes(), store.notes());
}

#[tokio::test(flavor = "current_thread")]
async fn load_is_in_loading_state_while_waiting() {
    let gateway = ScriptedGateway::with_notes(seed());
    let store = NoteStore::new(Rc::clone(&gateway));
    let gate = gateway.hold_next();

    let (loaded, observed) = tokio::join!(store.load(), async {
        tokio::task::yield_now().await;
        let observed = store.load_state();
        let second = store.load().await;
        gate.notify_one();
        (observed, second)
    });

    assert_eq!(loaded.unwrap(), 3);
    assert_eq!(observed.0, LoadState::Loading);
    assert!(matches!(
        observed.1,
        Err(StoreError::NotReady(LoadState::Loading))
    ));
}

#[tokio::test(flavor = "current_thread")]
async fn reload_replaces_rather_than_merges() {
    let (gateway, store) = loaded_store(seed()).await;
    gateway.remote_delete(NoteId::new(2));

    assert_eq!(store.load().await.unwrap(), 2);
    assert_eq!(ids(&store.notes()), vec![3, 1]);
    assert_eq!(gateway.calls(), vec![Call::List, Call::List]);
}

#[tokio::test(flavor = "current_thread")]
async fn load_drops_duplicate_ids_from_remote() {
    let (_gateway, store) = loaded_store(vec![
        note(1, "first", ""),
        note(2, "second", ""),
        note(1, "duplicate", ""),
    ])
    .await;
    assert_eq!(ids(&store.notes()), vec![1, 2]);
    assert_eq!(store.note(NoteId::new(1)).unwrap().title, "first");
}

#[tokio::test(flavor = "current_thread")]
async fn load_failure_is_terminal() {
    let gateway = ScriptedGateway::with_notes(seed());
    let store = NoteStore::new(Rc::clone(&gateway));
    gateway.fail_next(GatewayError::Network("connection refused".to_string()));

    let error = store.load().await.unwrap_err();
    assert!(matches!(error, StoreError::Gateway(GatewayError::Network(_))));
    assert_eq!(store.load_state(), LoadState::Failed);
    assert!(store.is_empty());

    assert!(matches!(
        store.load().await,
        Err(StoreError::NotReady(LoadState::Failed))
    ));
    assert!(matches!(
        store.create("t", "c").await,
        Err(StoreError::NotReady(LoadState::Failed))
    ));
    assert_eq!(gateway.calls(), vec![Call::List]);
}

#[tokio::test(flavor = "current_thread")]
async fn operations_require_ready_store() {
    let gateway = ScriptedGateway::with_notes(seed());
    let store = NoteStore::new(Rc::clone(&gateway));

    assert!(matches!(
        store.create("t", "c").await,
        Err(StoreError::NotReady(LoadState::Uninitialized))
    ));
    assert!(matches!(
        store.remove(NoteId::new(1)).await,
        Err(StoreError::NotReady(_))
    ));
    assert!(store.set_search_query("x").is_err());
    assert!(store.toggle_favorite(NoteId::new(1)).is_err());
    assert!(store.set_view_mode(ViewMode::List).is_err());
    assert!(gateway.calls().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn search_query_filters_title_or_content() {
    let (gateway, store) = loaded_store(vec![note(1, "A", "apple"), note(2, "B", "banana")]).await;

    store.set_search_query("an").unwrap();
    assert_eq!(ids(&store.filtered_notes()), vec![2]);
    assert_eq!(store.len(), 2);

    store.set_search_query("").unwrap();
    assert_eq!(store.filtered_notes(), store.notes());
    assert_eq!(gateway.calls(), vec![Call::List]);
}

#[tokio::test(flavor = "current_thread")]
async fn create_prepends_server_record() {
    let (gateway, store) = loaded_store(seed()).await;

    let created = store.create("Fresh", "idea").await.unwrap();

    assert_eq!(created.id, NoteId::new(4));
    assert_eq!(store.len(), 4);
    assert_eq!(store.notes()[0], created);
    assert_eq!(ids(&store.notes()), vec![4, 3, 2, 1]);
    assert_eq!(gateway.remote_notes()[0].id, created.id);
}

#[tokio::test(flavor = "current_thread")]
async fn create_trims_input_before_sending() {
    let (gateway, store) = loaded_store(seed()).await;

    store.create(" Hi ", " there ").await.unwrap();

    assert_eq!(
        gateway.calls().last(),
        Some(&Call::Create(NotePayload {
            title: "Hi".to_string(),
            content: "there".to_string(),
        }))
    );
}

#[tokio::test(flavor = "current_thread")]
async fn create_sends_untitled_for_blank_title() {
    let (gateway, store) = loaded_store(Vec::new()).await;

    let created = store.create("   ", "body only").await.unwrap();

    assert_eq!(created.title, "Untitled");
    assert_eq!(
        gateway.calls().last(),
        Some(&Call::Create(NotePayload {
            title: "Untitled".to_string(),
            content: "body only".to_string(),
        }))
    );
}

#[tokio::test(flavor = "current_thread")]
async fn create_with_empty_input_never_calls_gateway() {
    let (gateway, store) = loaded_store(seed()).await;

    assert!(matches!(
        store.create("", "").await,
        Err(StoreError::EmptyNote)
    ));
    assert!(matches!(
        store.create("  ", "\n").await,
        Err(StoreError::EmptyNote)
    ));
    assert_eq!(gateway.calls(), vec![Call::List]);
    assert_eq!(ids(&store.notes()), vec![3, 2, 1]);
}

#[tokio::test(flavor = "current_thread")]
async fn create_failure_leaves_collection_unchanged() {
    let (gateway, store) = loaded_store(seed()).await;
    gateway.fail_next(GatewayError::Validation("Title is too long".to_string()));

    let error = store.create("t", "c").await.unwrap_err();

    assert_eq!(error.to_string(), "Title is too long");
    assert!(!error.is_session_expired());
    assert_eq!(ids(&store.notes()), vec![3, 2, 1]);
}

#[tokio::test(flavor = "current_thread")]
async fn update_replaces_entry_by_id_and_keeps_order() {
    let (_gateway, store) = loaded_store(seed()).await;
    let before = store.notes();
    store.set_search_query("banana").unwrap();

    let updated = store
        .update(NoteId::new(2), "Bananas", "ripe banana")
        .await
        .unwrap();

    let after = store.notes();
    assert_eq!(after.len(), before.len());
    assert_eq!(ids(&after), vec![3, 2, 1]);
    assert_eq!(after[1], updated);
    assert_eq!(after[1].title, "Bananas");
    assert_eq!(after[1].content, "ripe banana");
    assert!(after[1].updated_at > before[1].updated_at);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(ids(&store.filtered_notes()), vec![2]);
}

#[tokio::test(flavor = "current_thread")]
async fn update_not_found_leaves_collection_unchanged() {
    let (gateway, store) = loaded_store(seed()).await;
    gateway.remote_delete(NoteId::new(2));
    let before = store.notes();

    let error = store.update(NoteId::new(2), "t", "c").await.unwrap_err();

    assert!(matches!(
        error,
        StoreError::Gateway(GatewayError::NotFound(_))
    ));
    assert_eq!(store.notes(), before);
}

#[tokio::test(flavor = "current_thread")]
async fn remove_drops_entry_and_prunes_favorite() {
    let (_gateway, store) = loaded_store(seed()).await;
    let id = NoteId::new(2);
    assert!(store.toggle_favorite(id).unwrap());
    assert!(store.toggle_favorite(NoteId::new(1)).unwrap());

    store.remove(id).await.unwrap();

    assert_eq!(ids(&store.notes()), vec![3, 1]);
    assert!(store.note(id).is_none());
    assert!(!store.is_favorite(id));
    assert_eq!(store.favorite_count(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn remove_treats_remote_not_found_as_done() {
    let (gateway, store) = loaded_store(seed()).await;
    let id = NoteId::new(3);
    gateway.remote_delete(id);

    store.remove(id).await.unwrap();
    assert_eq!(ids(&store.notes()), vec![2, 1]);

    // A second delete of the same id is also satisfied.
    store.remove(id).await.unwrap();
    assert_eq!(store.len(), 2);
}

#[tokio::test(flavor = "current_thread")]
async fn remove_failure_leaves_collection_unchanged() {
    let (gateway, store) = loaded_store(seed()).await;
    store.toggle_favorite(NoteId::new(1)).unwrap();
    gateway.fail_next(GatewayError::Unknown {
        status: 500,
        message: "boom".to_string(),
    });

    let error = store.remove(NoteId::new(1)).await.unwrap_err();

    assert_eq!(error.to_string(), "boom");
    assert_eq!(ids(&store.notes()), vec![3, 2, 1]);
    assert!(store.is_favorite(NoteId::new(1)));
}

#[tokio::test(flavor = "current_thread")]
async fn toggle_favorite_twice_restores_marks() {
    let (gateway, store) = loaded_store(seed()).await;
    store.toggle_favorite(NoteId::new(3)).unwrap();
    let original = store.favorites();

    assert!(store.toggle_favorite(NoteId::new(1)).unwrap());
    assert!(!store.toggle_favorite(NoteId::new(1)).unwrap());
    assert_eq!(store.favorites(), original);

    // Unknown ids are tolerated and stay local.
    assert!(store.toggle_favorite(NoteId::new(99)).unwrap());
    assert_eq!(gateway.calls(), vec![Call::List]);
}

#[tokio::test(flavor = "current_thread")]
async fn favorites_are_not_persisted_across_stores() {
    let (gateway, store) = loaded_store(seed()).await;
    store.toggle_favorite(NoteId::new(3)).unwrap();

    let fresh = NoteStore::new(Rc::clone(&gateway));
    fresh.load().await.unwrap();
    assert_eq!(fresh.favorite_count(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn view_mode_is_local_only() {
    let (gateway, store) = loaded_store(seed()).await;
    assert_eq!(store.view_mode(), ViewMode::Grid);

    store.set_view_mode(ViewMode::List).unwrap();
    assert_eq!(store.view_mode(), ViewMode::List);
    assert_eq!(store.toggle_view_mode().unwrap(), ViewMode::Grid);
    assert_eq!(ids(&store.notes()), vec![3, 2, 1]);
    assert_eq!(gateway.calls(), vec![Call::List]);
}

#[tokio::test(flavor = "current_thread")]
async fn auth_failure_marks_session_expired() {
    let (gateway, store) = loaded_store(seed()).await;
    gateway.fail_next(GatewayError::Auth("Missing or invalid token".to_string()));

    let error = store.update(NoteId::new(1), "t", "c").await.unwrap_err();

    assert!(error.is_session_expired());
    assert!(store.session_expired());
    assert_eq!(ids(&store.notes()), vec![3, 2, 1]);
}

#[tokio::test(flavor = "current_thread")]
async fn second_mutation_on_same_id_is_rejected_while_in_flight() {
    let (gateway, store) = loaded_store(seed()).await;
    let id = NoteId::new(2);
    let gate = gateway.hold_next();

    let (first, second) = tokio::join!(store.update(id, "first", "write"), async {
        tokio::task::yield_now().await;
        let second = store.remove(id).await;
        gate.notify_one();
        second
    });

    assert_eq!(first.unwrap().title, "first");
    assert!(matches!(second, Err(StoreError::MutationInFlight(rejected)) if rejected == id));
    assert_eq!(
        gateway
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::Delete(_)))
            .count(),
        0
    );

    // Released once the first response has been applied.
    store.remove(id).await.unwrap();
    assert!(store.note(id).is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn mutations_on_different_ids_may_overlap() {
    let (gateway, store) = loaded_store(seed()).await;
    let gate = gateway.hold_next();

    let (first, second) = tokio::join!(store.update(NoteId::new(3), "x", "y"), async {
        tokio::task::yield_now().await;
        let second = store.remove(NoteId::new(1)).await;
        gate.notify_one();
        second
    });

    first.unwrap();
    second.unwrap();
    assert_eq!(ids(&store.notes()), vec![3, 2]);
}

#[tokio::test(flavor = "current_thread")]
async fn responses_after_close_are_discarded() {
    let (gateway, store) = loaded_store(seed()).await;
    let gate = gateway.hold_next();

    let (created, ()) = tokio::join!(store.create("late", "reply"), async {
        tokio::task::yield_now().await;
        store.close();
        gate.notify_one();
    });

    assert!(matches!(created, Err(StoreError::Closed)));
    assert_eq!(ids(&store.notes()), vec![3, 2, 1]);
    assert!(store.is_closed());
    assert!(matches!(store.load().await, Err(StoreError::Closed)));
}

#[tokio::test(flavor = "current_thread")]
async fn editor_draft_does_not_touch_collection_until_saved() {
    let (_gateway, store) = loaded_store(seed()).await;
    store.open_editor(Some(NoteId::new(2))).unwrap();

    store
        .with_draft(|draft| {
            draft.title = "Banana bread".to_string();
            draft.content.push_str(" bread");
        })
        .unwrap();
    assert_eq!(store.note(NoteId::new(2)).unwrap().title, "B");
    assert!(store.editor_open());

    let saved = store.save_draft().await.unwrap();

    assert_eq!(saved.title, "Banana bread");
    assert_eq!(saved.content, "banana bread");
    assert_eq!(store.note(NoteId::new(2)).unwrap(), saved);
    assert!(!store.editor_open());
}

#[tokio::test(flavor = "current_thread")]
async fn draft_edit_can_read_the_store() {
    let (_gateway, store) = loaded_store(seed()).await;
    store.open_editor(Some(NoteId::new(2))).unwrap();

    let original = store
        .with_draft(|draft| {
            let current = store.note(NoteId::new(3)).unwrap();
            draft.title = format!("{} copy", current.title);
            store.note(NoteId::new(2)).unwrap().title
        })
        .unwrap();

    assert_eq!(original, "B");
    assert_eq!(store.draft().unwrap().title, "Groceries copy");
}

#[tokio::test(flavor = "current_thread")]
async fn new_draft_saves_as_create() {
    let (gateway, store) = loaded_store(seed()).await;
    store.open_editor(None).unwrap();
    store
        .with_draft(|draft| draft.content = "  quick thought ".to_string())
        .unwrap();

    let saved = store.save_draft().await.unwrap();

    assert_eq!(saved.title, "Untitled");
    assert_eq!(store.notes()[0], saved);
    assert!(matches!(gateway.calls().last(), Some(Call::Create(_))));
}

#[tokio::test(flavor = "current_thread")]
async fn failed_save_keeps_editor_open() {
    let (gateway, store) = loaded_store(seed()).await;
    store.open_editor(None).unwrap();
    assert!(matches!(
        store.save_draft().await,
        Err(StoreError::EmptyNote)
    ));

    store
        .with_draft(|draft| draft.title = "Keep me".to_string())
        .unwrap();
    gateway.fail_next(GatewayError::Network("offline".to_string()));
    assert!(store.save_draft().await.is_err());

    assert!(store.editor_open());
    assert_eq!(store.draft().unwrap().title, "Keep me");
    assert_eq!(store.len(), 3);
}

#[tokio::test(flavor = "current_thread")]
async fn editor_requires_known_note_and_open_state() {
    let (_gateway, store) = loaded_store(seed()).await;

    assert!(matches!(
        store.open_editor(Some(NoteId::new(42))),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.with_draft(|_| ()),
        Err(StoreError::EditorClosed)
    ));
    assert!(matches!(
        store.save_draft().await,
        Err(StoreError::EditorClosed)
    ));

    store.open_editor(Some(NoteId::new(1))).unwrap();
    store.close_editor();
    assert!(store.draft().is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn removing_edited_note_closes_editor() {
    let (_gateway, store) = loaded_store(seed()).await;
    store.open_editor(Some(NoteId::new(1))).unwrap();

    store.remove(NoteId::new(1)).await.unwrap();

    assert!(!store.editor_open());
}

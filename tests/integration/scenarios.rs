//! End-to-end author/book scenarios
//!
//! These mirror the reproduction harness: push a document into a reference
//! array, push a bare id, save, and interleave saves with direct atomic
//! pushes from another actor.

use crate::common::*;

// ============================================================================
// Tracked push + persist
// ============================================================================

#[test]
fn tracked_append_persists_single_element() {
    let lib = Library::new();
    let mut isaac = lib.author("Asimov");
    let foundation = lib.book("Foundation");

    isaac.push("books", foundation).unwrap();
    lib.authors.persist(&mut isaac).unwrap();

    assert_eq!(lib.stored_books(&isaac.id()), vec![foundation.to_string()]);
}

#[test]
fn push_full_snapshot_then_push_bare_id() {
    let lib = Library::new();
    let mut isaac = lib.author("Asimov");

    // push() a whole document...
    let foundation = lib.books.create(fields(serde_json::json!({ "title": "Foundation" }))).unwrap();
    isaac.push("books", foundation.fields().clone()).unwrap();
    lib.authors.persist(&mut isaac).unwrap();

    // ...then push() a bare id on a freshly loaded instance
    let robot = lib.book("I, Robot");
    let mut reloaded = lib.authors.load(&isaac.id()).unwrap();
    reloaded.push("books", robot).unwrap();
    lib.authors.persist(&mut reloaded).unwrap();

    assert_eq!(
        lib.stored_books(&isaac.id()),
        vec![foundation.id().to_string(), robot.to_string()]
    );
}

#[test]
fn multiple_local_appends_persist_in_call_order() {
    let lib = Library::new();
    let mut ursula = lib.author("Le Guin");
    let b1 = lib.book("The Dispossessed");
    let b2 = lib.book("The Left Hand of Darkness");

    ursula.push("books", b1).unwrap();
    ursula.push("books", b2).unwrap();
    lib.authors.persist(&mut ursula).unwrap();

    assert_eq!(
        lib.stored_books(&ursula.id()),
        vec![b1.to_string(), b2.to_string()]
    );
}

// ============================================================================
// Save interleaved with direct atomic pushes (the historical defect)
// ============================================================================

#[test]
fn atomic_push_after_tracked_save_keeps_both_elements() {
    // Two callers hold the same author. X appends and persists; Y issues a
    // direct atomic push. Both elements must survive regardless of order.
    let lib = Library::new();
    let isaac = lib.author("Asimov");
    let by_x = lib.book("The Gods Themselves");
    let by_y = lib.book("Nightfall");

    let mut x_view = lib.authors.load(&isaac.id()).unwrap();
    x_view.push("books", by_x).unwrap();
    lib.authors.persist(&mut x_view).unwrap();

    lib.authors.push_atomic(&isaac.id(), "books", by_y).unwrap();

    let stored = lib.stored_books(&isaac.id());
    assert_eq!(stored.len(), 2);
    assert!(stored.contains(&by_x.to_string()));
    assert!(stored.contains(&by_y.to_string()));
}

#[test]
fn tracked_save_after_atomic_push_keeps_both_elements() {
    // Reverse interleaving: the atomic push lands while caller X already
    // holds a stale instance. X's save must push only its own element.
    let lib = Library::new();
    let isaac = lib.author("Asimov");
    let by_x = lib.book("Foundation and Empire");
    let by_y = lib.book("Second Foundation");

    let mut x_view = lib.authors.load(&isaac.id()).unwrap();
    lib.authors.push_atomic(&isaac.id(), "books", by_y).unwrap();

    x_view.push("books", by_x).unwrap();
    lib.authors.persist(&mut x_view).unwrap();

    let stored = lib.stored_books(&isaac.id());
    assert_eq!(stored.len(), 2);
    assert!(stored.contains(&by_x.to_string()));
    assert!(stored.contains(&by_y.to_string()));

    // The persisting instance adopted the merged state, not its stale view
    assert_eq!(x_view.fields()["books"].as_array().unwrap().len(), 2);
}

#[test]
fn atomic_push_of_snapshot_normalizes_like_push_of_id() {
    let lib = Library::new();
    let ursula = lib.author("Le Guin");
    let book = lib
        .books
        .create(fields(serde_json::json!({ "title": "The Word for World Is Forest" })))
        .unwrap();

    lib.authors
        .push_atomic(&ursula.id(), "books", book.fields().clone())
        .unwrap();

    assert_eq!(lib.stored_books(&ursula.id()), vec![book.id().to_string()]);
}

// ============================================================================
// Full replace scoped to untracked fields
// ============================================================================

#[test]
fn unrelated_full_replace_does_not_touch_concurrently_pushed_array() {
    let lib = Library::new();
    let isaac = lib.author("Asimov");
    let b1 = lib.book("Foundation");
    lib.authors.push_atomic(&isaac.id(), "books", b1).unwrap();

    // Caller loads with books=[b1], does not refresh
    let mut stale = lib.authors.load(&isaac.id()).unwrap();

    // Another actor appends b2
    let b2 = lib.book("I, Robot");
    lib.authors.push_atomic(&isaac.id(), "books", b2).unwrap();

    // Caller edits only `name` through the untracked escape hatch
    *stale.field_mut("name").unwrap().unwrap() = FieldValue::from("Isaac Asimov");
    lib.authors.persist(&mut stale).unwrap();

    // The replace was scoped to `name`; both books survived
    assert_eq!(
        lib.stored_books(&isaac.id()),
        vec![b1.to_string(), b2.to_string()]
    );
    let reloaded = lib.authors.load(&isaac.id()).unwrap();
    assert_eq!(reloaded.fields()["name"].as_str(), Some("Isaac Asimov"));
}

// ============================================================================
// Error surfacing
// ============================================================================

#[test]
fn pushing_unpersisted_snapshot_is_invalid_reference() {
    let lib = Library::new();
    let mut isaac = lib.author("Asimov");

    let never_saved = fields(serde_json::json!({ "title": "draft" }));
    let err = isaac.push("books", never_saved).unwrap_err();
    assert!(matches!(err, Error::InvalidReference(_)));
    assert!(!isaac.is_dirty());
}

#[test]
fn persisting_into_deleted_document_is_not_found() {
    let lib = Library::new();
    let mut isaac = lib.author("Asimov");
    let book = lib.book("Foundation");

    isaac.push("books", book).unwrap();
    lib.authors.delete(&isaac.id()).unwrap();

    let err = lib.authors.persist(&mut isaac).unwrap_err();
    assert!(matches!(err, Error::DocumentNotFound(_)));
    // Log intact: the caller may recreate and retry
    assert!(isaac.is_dirty());
}

#[test]
fn pull_then_persist_removes_element_remotely() {
    let lib = Library::new();
    let isaac = lib.author("Asimov");
    let b1 = lib.book("Foundation");
    let b2 = lib.book("I, Robot");
    lib.authors.push_atomic(&isaac.id(), "books", b1).unwrap();
    lib.authors.push_atomic(&isaac.id(), "books", b2).unwrap();

    let mut view = lib.authors.load(&isaac.id()).unwrap();
    view.pull("books", b1).unwrap();
    lib.authors.persist(&mut view).unwrap();

    assert_eq!(lib.stored_books(&isaac.id()), vec![b2.to_string()]);
}

//! Property tests
//!
//! - Append composition: any interleaving of tracked persists and direct
//!   atomic pushes onto the same array loses nothing.
//! - Normalization idempotence: normalizing an identifier (bare or wrapped
//!   in a snapshot) any number of times yields the same identifier.

use crate::common::*;
use docsync::normalize_reference;
use proptest::collection::vec;
use proptest::prelude::*;

proptest! {
    #[test]
    fn appends_from_two_actors_never_lost(
        ops in vec((any::<bool>(), "[a-z]{1,8}"), 1..24)
    ) {
        let lib = Library::new();
        let doc = lib
            .authors
            .create(fields(serde_json::json!({ "name": "a", "tags": [] })))
            .unwrap();
        let id = doc.id();

        // Actor A persists tracked appends; actor B pushes directly.
        for (tracked, value) in &ops {
            if *tracked {
                let mut view = lib.authors.load(&id).unwrap();
                view.push("tags", value.as_str()).unwrap();
                lib.authors.persist(&mut view).unwrap();
            } else {
                lib.authors.push_atomic(&id, "tags", value.as_str()).unwrap();
            }
        }

        let stored = lib.authors.load(&id).unwrap();
        let mut got: Vec<String> = stored.fields()["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        let mut want: Vec<String> = ops.iter().map(|(_, v)| v.clone()).collect();
        got.sort();
        want.sort();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn tracked_appends_batch_into_one_push(
        values in vec("[a-z]{1,8}", 1..16)
    ) {
        let lib = Library::new();
        let mut doc = lib
            .authors
            .create(fields(serde_json::json!({ "name": "a", "tags": [] })))
            .unwrap();

        for value in &values {
            doc.push("tags", value.as_str()).unwrap();
        }
        lib.authors.persist(&mut doc).unwrap();

        let stored = lib.authors.load(&doc.id()).unwrap();
        let got: Vec<String> = stored.fields()["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        // One persist, call order preserved
        prop_assert_eq!(got, values);
    }

    #[test]
    fn normalization_is_idempotent(bytes in any::<[u8; 16]>()) {
        let id = DocumentId::from_bytes(bytes);

        let bare = normalize_reference(&FieldValue::from(id)).unwrap();
        prop_assert_eq!(bare, id);

        let snapshot = fields(serde_json::json!({
            "_id": id.to_string(),
            "title": "anything"
        }));
        let from_snapshot = normalize_reference(&snapshot).unwrap();
        prop_assert_eq!(from_snapshot, id);

        // Normalizing the result again is a fixed point
        let again = normalize_reference(&FieldValue::from(from_snapshot)).unwrap();
        prop_assert_eq!(again, id);
    }
}

//! Versioning and revert behavior.

use quest_model::{ExplorationChange, ExplorationProperty, exploration::Exploration};
use quest_store::{StoreError, VersionStore};
use serde_json::json;

/// A store holding one exploration at version 2: v1 has the default
/// objective, v2 has objective "the objective".
fn store_with_two_versions() -> VersionStore {
    let mut store = VersionStore::new();
    store
        .save_new(
            "editor",
            Exploration::default_exploration("eid", "A title", "A category"),
        )
        .unwrap();
    let v1 = store.get("eid", None).unwrap().clone();
    let v2 = v1
        .apply_change_list(&[ExplorationChange::EditExplorationProperty {
            property_name: ExplorationProperty::Objective,
            new_value: json!("the objective"),
        }])
        .unwrap();
    store.append("editor", v2, "Change objective").unwrap();
    store
}

#[test]
fn get_defaults_to_latest() {
    let store = store_with_two_versions();
    assert_eq!(store.get("eid", None).unwrap().objective, "the objective");
    assert_eq!(store.get("eid", Some(1)).unwrap().objective, "");
    assert_eq!(
        store.get("eid", Some(2)).unwrap().objective,
        "the objective"
    );
}

#[test]
fn get_beyond_history_is_not_found() {
    let store = store_with_two_versions();
    let error = store.get("eid", Some(3)).unwrap_err();
    assert!(matches!(
        error,
        StoreError::NotFound {
            version: Some(3),
            ..
        }
    ));
    assert!(store.get("unknown", None).is_err());
}

#[test]
fn revert_rejects_out_of_range_targets() {
    let mut store = store_with_two_versions();
    for target in [-1, 0, 2, 3, 4] {
        let error = store.revert("editor", "eid", target).unwrap_err();
        assert!(
            error.to_string().contains("Cannot revert to version"),
            "unexpected message for {target}: {error}"
        );
        // Nothing was appended.
        assert_eq!(store.current_version("eid").unwrap(), 2);
    }
}

#[test]
fn revert_copies_the_old_snapshot_forward() {
    let mut store = store_with_two_versions();
    let version = store.revert("editor", "eid", 1).unwrap();
    assert_eq!(version, 3);

    let reverted = store.get("eid", None).unwrap();
    let v1 = store.get("eid", Some(1)).unwrap();
    assert_eq!(reverted.version, 3);
    assert_eq!(reverted.objective, v1.objective);
    assert_eq!(reverted.states, v1.states);

    // Older versions remain retrievable unchanged.
    assert_eq!(
        store.get("eid", Some(2)).unwrap().objective,
        "the objective"
    );

    let history = store.history("eid").unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].commit_message, "Reverted exploration to version 1");
    let versions: Vec<u32> = history.iter().map(|commit| commit.version).collect();
    assert_eq!(versions, vec![1, 2, 3]);
}

#[test]
fn delete_removes_the_whole_history() {
    let mut store = store_with_two_versions();
    store.delete("eid").unwrap();
    assert!(!store.contains("eid"));
    assert!(matches!(
        store.delete("eid").unwrap_err(),
        StoreError::NotFound { .. }
    ));
}

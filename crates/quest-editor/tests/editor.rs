//! End-to-end tests of the editorial service, covering the behavior an
//! HTTP frontend relies on: error statuses, optimistic versioning, rights
//! enforcement, answer resolution and downloads.

use quest_editor::{EditorError, EditorService};
use quest_model::{
    DEFAULT_STATE_NAME, ExplorationChange, ExplorationProperty, StateProperty,
    exploration::Exploration,
};
use quest_rights::{Actor, PlatformConfig, Role};
use serde_json::{Value, json};

const EXP_ID: &str = "eid";

fn actor(name: &str) -> Actor {
    Actor::new(name, name)
}

/// A service with one admin and one stored two-state exploration owned by
/// "owner": states A (initial) and B, at version 1.
fn service_with_exploration() -> EditorService {
    let mut config = PlatformConfig::default();
    config.add_admin("admin");
    let mut service = EditorService::new(config);

    let mut exploration = Exploration::default_exploration(EXP_ID, "A title", "A category");
    exploration.rename_state(DEFAULT_STATE_NAME, "A").unwrap();
    exploration.add_state("B").unwrap();
    service
        .create_exploration(&actor("owner"), exploration)
        .unwrap();
    service
}

fn add_state_change(name: &str) -> Vec<ExplorationChange> {
    vec![ExplorationChange::AddState {
        state_name: name.to_string(),
    }]
}

fn expect_400(result: quest_editor::Result<Exploration>) -> String {
    let error = result.unwrap_err();
    assert_eq!(error.http_status(), 400);
    error.payload()["error"]
        .as_str()
        .expect("error message")
        .to_string()
}

#[test]
fn add_new_state_error_cases() {
    let mut service = service_with_exploration();
    let owner = actor("owner");

    let mut put = |name: &str, version: Option<u32>| {
        expect_400(service.apply_change_list(
            &owner,
            EXP_ID,
            version,
            &add_state_change(name),
            "Add new state",
        ))
    };

    // A request with no version number is invalid.
    assert!(put("New state", None).contains("a version must be specified"));

    // A request with the wrong version number is invalid.
    assert!(put("New state", Some(123)).contains("which is too old"));

    // Empty and overlong state names are invalid.
    assert!(put("", Some(1)).contains("should be between 1 and 50"));
    assert!(put(&"a".repeat(100), Some(1)).contains("should be between 1 and 50"));

    // Disallowed characters are invalid.
    assert!(put("[Bad State Name]", Some(1)).contains("Invalid character ["));

    // The reserved end marker is invalid under any casing.
    assert!(put("END", Some(1)).contains("Invalid state name"));
    assert!(put("eNd", Some(1)).contains("Invalid state name"));

    // Edge whitespace is invalid.
    assert!(put("  aa", Some(1)).contains("start or end with whitespace"));
    assert!(put("aa\t", Some(1)).contains("end with whitespace"));
    assert!(put("\n", Some(1)).contains("end with whitespace"));

    // Adjacent whitespace is invalid.
    assert!(put("The   B", Some(1)).contains("Adjacent whitespace"));
    assert!(put("The\t\tB", Some(1)).contains("Adjacent whitespace"));

    // Nothing was committed along the way.
    assert_eq!(service.store().current_version(EXP_ID).unwrap(), 1);
}

#[test]
fn duplicate_state_and_init_state_deletion_are_rejected() {
    let mut service = service_with_exploration();
    let owner = actor("owner");

    let message = expect_400(service.apply_change_list(
        &owner,
        EXP_ID,
        Some(1),
        &add_state_change("B"),
        "Add B again",
    ));
    assert!(message.contains("already exists"));

    let message = expect_400(service.apply_change_list(
        &owner,
        EXP_ID,
        Some(1),
        &[ExplorationChange::DeleteState {
            state_name: "A".to_string(),
        }],
        "Delete A",
    ));
    assert!(message.contains("Cannot delete initial state"));
}

#[test]
fn racing_editors_both_get_the_stale_version_error() {
    let mut service = service_with_exploration();
    let owner = actor("owner");

    // Move the exploration to version 3.
    for (name, version) in [("C", 1), ("D", 2)] {
        service
            .apply_change_list(&owner, EXP_ID, Some(version), &add_state_change(name), "add")
            .unwrap();
    }

    // Two requests race with the same outdated base version.
    for racer in ["owner", "collab"] {
        service
            .assign_role(&owner, EXP_ID, "collab", Role::Editor)
            .ok();
        let message = expect_400(service.apply_change_list(
            &actor(racer),
            EXP_ID,
            Some(2),
            &add_state_change(&format!("From {racer}")),
            "racing",
        ));
        assert!(message.contains("which is too old"));
    }

    // Neither racer mutated anything.
    assert_eq!(service.store().current_version(EXP_ID).unwrap(), 3);
    assert!(!service.get_exploration(EXP_ID, None).unwrap().has_state("From owner"));
}

#[test]
fn deletion_rights_for_private_exploration() {
    let mut service = service_with_exploration();
    service
        .assign_role(&actor("owner"), EXP_ID, "editor", Role::Editor)
        .unwrap();
    service
        .assign_role(&actor("owner"), EXP_ID, "viewer", Role::Viewer)
        .unwrap();

    for denied in ["editor", "viewer"] {
        let error = service
            .delete_exploration(&actor(denied), EXP_ID)
            .unwrap_err();
        assert_eq!(error.http_status(), 401);
        assert_eq!(error.payload(), json!({ "code": 401 }));
    }

    service.delete_exploration(&actor("owner"), EXP_ID).unwrap();
    assert_eq!(
        service.get_exploration(EXP_ID, None).unwrap_err().http_status(),
        404
    );
}

#[test]
fn deletion_rights_for_published_exploration() {
    let mut service = service_with_exploration();
    let owner = actor("owner");
    service
        .assign_role(&owner, EXP_ID, "editor", Role::Editor)
        .unwrap();
    service.publish_exploration(&owner, EXP_ID).unwrap();

    for denied in ["owner", "editor", "viewer"] {
        let error = service
            .delete_exploration(&actor(denied), EXP_ID)
            .unwrap_err();
        assert_eq!(error.http_status(), 401);
    }

    service.delete_exploration(&actor("admin"), EXP_ID).unwrap();
}

#[test]
fn versions_stay_retrievable_and_missing_versions_are_404() {
    let mut service = service_with_exploration();
    let owner = actor("owner");

    service
        .apply_change_list(
            &owner,
            EXP_ID,
            Some(1),
            &[
                ExplorationChange::EditExplorationProperty {
                    property_name: ExplorationProperty::Objective,
                    new_value: json!("the objective"),
                },
                ExplorationChange::EditStateProperty {
                    state_name: "A".to_string(),
                    property_name: StateProperty::Content,
                    new_value: json!([{"type": "text", "value": "ABC"}]),
                },
            ],
            "Change objective and init state content",
        )
        .unwrap();

    assert_eq!(
        service.get_exploration(EXP_ID, None).unwrap().states["A"].content[0].value,
        "ABC"
    );
    assert_eq!(
        service.get_exploration(EXP_ID, Some(1)).unwrap().states["A"].content[0].value,
        ""
    );
    assert_eq!(
        service.get_exploration(EXP_ID, Some(2)).unwrap().objective,
        "the objective"
    );

    let error = service.get_exploration(EXP_ID, Some(3)).unwrap_err();
    assert_eq!(error.http_status(), 404);
}

#[test]
fn reverting_to_old_versions() {
    let mut service = service_with_exploration();
    let owner = actor("owner");
    service
        .apply_change_list(
            &owner,
            EXP_ID,
            Some(1),
            &[ExplorationChange::EditStateProperty {
                state_name: "A".to_string(),
                property_name: StateProperty::Content,
                new_value: json!([{"type": "text", "value": "ABC"}]),
            }],
            "Change init state content",
        )
        .unwrap();

    // May not revert to any version that's not 1.
    for target in [json!(-1), json!(0), json!(2), json!(3), json!(4)] {
        let error = service
            .revert_exploration(&owner, EXP_ID, 2, &target)
            .unwrap_err();
        assert_eq!(error.http_status(), 400);
        assert!(error.to_string().contains("Cannot revert to version"));
    }
    for target in [json!("1"), json!([1]), json!(1.5)] {
        let error = service
            .revert_exploration(&owner, EXP_ID, 2, &target)
            .unwrap_err();
        assert!(error.to_string().contains("Expected an integer"));
    }

    // Failed attempts left the exploration alone.
    assert_eq!(
        service.get_exploration(EXP_ID, None).unwrap().states["A"].content[0].value,
        "ABC"
    );

    // Revert to version 1.
    let version = service
        .revert_exploration(&owner, EXP_ID, 2, &json!(1))
        .unwrap();
    assert_eq!(version, 3);
    let reverted = service.get_exploration(EXP_ID, None).unwrap();
    assert_eq!(reverted.states["A"].content[0].value, "");
    // The overwritten content is still in history.
    assert_eq!(
        service.get_exploration(EXP_ID, Some(2)).unwrap().states["A"].content[0].value,
        "ABC"
    );
}

#[test]
fn resolved_answers_flow() {
    let mut service = service_with_exploration();
    let owner = actor("owner");

    let submissions = [("blah", 1), ("blah2", 2), ("blah3", 3)];
    for (answer, count) in submissions {
        for _ in 0..count {
            service
                .submit_answer(EXP_ID, "A", "submit", "Default", answer)
                .unwrap();
        }
    }

    let key = quest_stats::RuleKey::new(EXP_ID, "A", "submit", "Default");
    let unresolved = service.stats().unresolved_answers(&key);
    assert_eq!(unresolved["blah"], 1);
    assert_eq!(unresolved["blah2"], 2);
    assert_eq!(unresolved["blah3"], 3);

    // A payload of the wrong shape is rejected.
    for payload in [json!({"something_else": []}), json!("this_is_a_string")] {
        let error = service
            .resolve_answers(&owner, EXP_ID, "A", &payload)
            .unwrap_err();
        assert_eq!(error.http_status(), 400);
        assert!(error.to_string().contains("Expected a list"));
    }

    // Resolving an answer that was never submitted has no effect.
    service
        .resolve_answers(&owner, EXP_ID, "A", &json!(["not_submitted_answer"]))
        .unwrap();
    assert_eq!(service.stats().unresolved_answers(&key).len(), 3);

    // A successful request removes exactly the answer in question.
    service
        .resolve_answers(&owner, EXP_ID, "A", &json!(["blah"]))
        .unwrap();
    let unresolved = service.stats().unresolved_answers(&key);
    assert!(!unresolved.contains_key("blah"));
    assert_eq!(unresolved.len(), 2);

    // Several answers can be resolved at once.
    service
        .resolve_answers(&owner, EXP_ID, "A", &json!(["blah2", "blah3"]))
        .unwrap();
    assert!(service.stats().unresolved_answers(&key).is_empty());
}

#[test]
fn statistics_move_only_after_pending_events_are_processed() {
    let mut service = service_with_exploration();

    let before = service.statistics(EXP_ID).unwrap();
    assert_eq!(before.num_starts, 0);
    assert_eq!(before.num_completions, 0);

    service.record_play_start(EXP_ID).unwrap();
    assert_eq!(service.statistics(EXP_ID).unwrap().num_starts, 0);

    // Ensure all events get propagated.
    service.process_pending_stats();

    let after = service.statistics(EXP_ID).unwrap();
    assert_eq!(after.num_starts, 1);
    assert_eq!(after.num_completions, 0);
}

#[test]
fn collaborators_can_edit_but_not_add_members() {
    let mut service = service_with_exploration();
    let owner = actor("owner");

    service
        .assign_role(&owner, EXP_ID, "collab", Role::Editor)
        .unwrap();
    assert!(service.can_edit(&actor("collab"), EXP_ID).unwrap());

    let next = service
        .apply_change_list(
            &actor("collab"),
            EXP_ID,
            Some(1),
            &add_state_change("State 4"),
            "Added State 4",
        )
        .unwrap();
    assert!(next.has_state("State 4"));

    let error = service
        .assign_role(&actor("collab"), EXP_ID, "collab2", Role::Editor)
        .unwrap_err();
    assert_eq!(error.http_status(), 401);
    assert_eq!(error.payload()["code"], 401);
}

#[test]
fn banned_users_lose_edit_access_only() {
    let mut service = service_with_exploration();
    let owner = actor("owner");
    service
        .assign_role(&owner, EXP_ID, "joe", Role::Editor)
        .unwrap();
    service
        .assign_role(&owner, EXP_ID, "sandra", Role::Editor)
        .unwrap();

    assert!(service.can_edit(&actor("joe"), EXP_ID).unwrap());

    service.config_mut().ban("joe");

    assert!(!service.can_edit(&actor("joe"), EXP_ID).unwrap());
    assert!(service.can_view(&actor("joe"), EXP_ID).unwrap());
    let error = service
        .apply_change_list(&actor("joe"), EXP_ID, Some(1), &add_state_change("X"), "x")
        .unwrap_err();
    assert_eq!(error.http_status(), 401);

    // Sandra is unaffected.
    assert!(service.can_edit(&actor("sandra"), EXP_ID).unwrap());
}

#[test]
fn download_artifacts() {
    let mut service = service_with_exploration();
    service
        .apply_change_list(
            &actor("owner"),
            EXP_ID,
            Some(1),
            &add_state_change("State 4"),
            "add",
        )
        .unwrap();

    let zip = service
        .download(EXP_ID, quest_export::DownloadFormat::Zip)
        .unwrap();
    assert_eq!(zip.filename, "quest-Atitle-v2.zip");
    assert_eq!(zip.content_type, "application/zip");
    assert!(!zip.body.is_empty());

    let json_artifact = service
        .download(EXP_ID, quest_export::DownloadFormat::Json)
        .unwrap();
    let value: Value = serde_json::from_slice(&json_artifact.body).unwrap();
    assert!(value["yaml"].as_str().unwrap().contains("State 4"));
}

#[test]
fn new_state_template_validates_the_name() {
    let service = service_with_exploration();

    let template = service.new_state_template("New valid state name").unwrap();
    assert_eq!(template.content.len(), 1);
    assert!(template.unresolved_answers.is_empty());
    assert_eq!(template.widget.widget_id, "TextInput");

    let error = service.new_state_template("END").unwrap_err();
    assert_eq!(error.http_status(), 400);
}

#[test]
fn workspace_round_trips_through_the_envelope_file() {
    let mut service = service_with_exploration();
    service
        .assign_role(&actor("owner"), EXP_ID, "collab", Role::Editor)
        .unwrap();
    service
        .submit_answer(EXP_ID, "A", "submit", "Default", "blah")
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workspace.json");
    quest_store::save_envelope(
        quest_editor::WORKSPACE_SCHEMA,
        quest_editor::WORKSPACE_SCHEMA_VERSION,
        &service,
        &path,
    )
    .unwrap();

    let loaded: EditorService = quest_store::load_envelope(
        quest_editor::WORKSPACE_SCHEMA,
        quest_editor::WORKSPACE_SCHEMA_VERSION,
        &path,
    )
    .unwrap();
    assert_eq!(loaded.store().current_version(EXP_ID).unwrap(), 1);
    assert!(loaded.can_edit(&actor("collab"), EXP_ID).unwrap());
    let key = quest_stats::RuleKey::new(EXP_ID, "A", "submit", "Default");
    assert_eq!(loaded.stats().unresolved_answers(&key)["blah"], 1);
}

#[test]
fn unauthorized_errors_match_each_operation() {
    let mut service = service_with_exploration();
    let stranger = actor("stranger");

    let error = service
        .apply_change_list(&stranger, EXP_ID, Some(1), &add_state_change("X"), "x")
        .unwrap_err();
    assert!(matches!(error, EditorError::Authorization { .. }));

    let error = service
        .revert_exploration(&stranger, EXP_ID, 1, &json!(1))
        .unwrap_err();
    assert_eq!(error.http_status(), 401);

    let error = service
        .resolve_answers(&stranger, EXP_ID, "A", &json!(["blah"]))
        .unwrap_err();
    assert_eq!(error.http_status(), 401);

    let error = service
        .publish_exploration(&stranger, EXP_ID)
        .unwrap_err();
    assert_eq!(error.http_status(), 401);
}

mod common;

use common::{ctx, CountingStore, TestDb};
use goalgraph_core::{
    CoreError, Expanded, GoalPatch, NewGoal, NewProject, NewTag, SqliteStore, TrackerService,
};

fn service(db: &TestDb) -> TrackerService<CountingStore<SqliteStore>> {
    TrackerService::new(CountingStore::new(db.store.clone()))
}

#[test]
fn malformed_input_is_rejected_before_any_round_trip() {
    let db = TestDb::open();
    let service = service(&db);

    let cases = [
        service.assign_tag(&ctx(), "goal", "abc", "1").map(|_| ()),
        service.assign_tag(&ctx(), "goal", "1", "-2").map(|_| ()),
        service.remove_tag(&ctx(), "Goal", "1", "1"),
        service.tags_for(&ctx(), "task", "0").map(|_| ()),
        service.goal(&ctx(), "1", &["tasks", "owner"]).map(|_| ()),
        service.tag(&ctx(), "x1", &[]).map(|_| ()),
        service
            .update(&ctx(), "1.5", &GoalPatch::default())
            .map(|_| ()),
    ];

    let codes = cases
        .iter()
        .map(|result| result.as_ref().unwrap_err().code())
        .collect::<Vec<_>>();
    assert_eq!(
        codes,
        vec![
            "invalid_identifier",
            "invalid_identifier",
            "unknown_entity_kind",
            "invalid_identifier",
            "unknown_field",
            "invalid_identifier",
            "invalid_identifier",
        ]
    );
    assert!(cases.iter().all(|result| result
        .as_ref()
        .unwrap_err()
        .is_client_error()));
    assert_eq!(service.store().round_trips(), 0);
}

#[test]
fn goal_lookup_expands_selected_fields_only() {
    let db = TestDb::open();
    let service = service(&db);
    let repo = service.repository();
    let project = repo.create_project(&ctx(), &NewProject::new("p")).unwrap();
    let goal = repo
        .create_goal(
            &ctx(),
            &NewGoal {
                project_id: Some(project.id),
                ..NewGoal::new("g")
            },
        )
        .unwrap();
    let tag = repo.create_tag(&ctx(), &NewTag::new("focus")).unwrap();
    let goal_id = goal.id.to_string();
    service
        .assign_tag(&ctx(), "goal", &goal_id, &tag.id.to_string())
        .unwrap();

    let graph = service.goal(&ctx(), &goal_id, &["tags", "flow"]).unwrap();

    assert_eq!(graph.goal, goal);
    assert_eq!(graph.tags, Expanded::Loaded(vec![tag]));
    assert_eq!(graph.context, Expanded::Loaded(None));
    assert_eq!(graph.project, Expanded::NotRequested);
    assert_eq!(graph.tasks, Expanded::NotRequested);
}

#[test]
fn missing_entity_is_not_found() {
    let db = TestDb::open();
    let service = service(&db);

    assert!(matches!(
        service.project(&ctx(), "42", &["goals"]),
        Err(CoreError::NotFound { entity: "project", .. })
    ));
}

#[test]
fn notes_and_updates_round_trip_through_string_ids() {
    let db = TestDb::open();
    let service = service(&db);
    let project = service
        .repository()
        .create_project(&ctx(), &NewProject::new("p"))
        .unwrap();
    let project_id = project.id.to_string();

    service
        .attach_note(&ctx(), "project", &project_id, "kickoff", "agenda")
        .unwrap();
    let patch: GoalPatch = serde_json::from_str(r#"{"status":"done"}"#).unwrap();
    let missing = service.update(&ctx(), "77", &patch).unwrap_err();

    assert_eq!(
        service
            .notes_for(&ctx(), "project", &project_id)
            .unwrap()
            .len(),
        1
    );
    assert!(matches!(missing, CoreError::NotFound { entity: "goal", .. }));
}

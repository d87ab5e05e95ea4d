mod common;

use common::{ctx, id, CountingStore, TestDb};
use goalgraph_core::{
    AssociationResolver, ContextPatch, CoreError, EntityRepository, FieldPatch, Goal, GoalPatch,
    NewContext, NewGoal, NewProject, NewTag, NewWorkspace, NotePatch, TagPatch, UpdateComposer,
};

fn seed_goal(db: &TestDb) -> Goal {
    let repo = EntityRepository::new(&db.store);
    let project = repo.create_project(&ctx(), &NewProject::new("p")).unwrap();
    repo.create_goal(
        &ctx(),
        &NewGoal {
            description: "why".to_string(),
            priority: 2,
            due_date: Some(1_000),
            project_id: Some(project.id),
            ..NewGoal::new("original")
        },
    )
    .unwrap()
}

#[test]
fn status_update_leaves_other_columns_and_advances_updated_at() {
    let db = TestDb::open();
    let goal = seed_goal(&db);
    let composer = UpdateComposer::new(&db.store);

    let updated = composer
        .apply(
            &ctx(),
            goal.id,
            &GoalPatch {
                status: Some("done".to_string()),
                ..GoalPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.status, "done");
    assert!(updated.updated_at > goal.updated_at);
    assert_eq!(
        Goal {
            status: goal.status.clone(),
            updated_at: goal.updated_at,
            ..updated.clone()
        },
        goal
    );

    let retitled = composer
        .apply(
            &ctx(),
            goal.id,
            &GoalPatch {
                title: Some("renamed".to_string()),
                ..GoalPatch::default()
            },
        )
        .unwrap();
    assert_eq!(retitled.title, "renamed");
    assert_eq!(retitled.status, "done");
    assert_eq!(retitled.priority, 2);
}

#[test]
fn updated_at_advances_within_the_same_millisecond() {
    let db = TestDb::open();
    let repo = EntityRepository::new(&db.store);
    let composer = UpdateComposer::new(&db.store);

    for round in 0..50 {
        let created = repo
            .create_goal(&ctx(), &NewGoal::new(format!("g{round}")))
            .unwrap();
        let patch = GoalPatch {
            status: Some("done".to_string()),
            ..GoalPatch::default()
        };

        let first = composer.apply(&ctx(), created.id, &patch).unwrap();
        assert!(
            first.updated_at > created.updated_at,
            "round {round}: {} !> {}",
            first.updated_at,
            created.updated_at
        );
        let second = composer.apply(&ctx(), created.id, &patch).unwrap();
        assert!(second.updated_at > first.updated_at, "round {round}");
    }
}

#[test]
fn explicit_null_clears_and_absent_keeps() {
    let db = TestDb::open();
    let goal = seed_goal(&db);

    let updated = UpdateComposer::new(&db.store)
        .apply(
            &ctx(),
            goal.id,
            &GoalPatch {
                due_date: FieldPatch::Null,
                ..GoalPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.due_date, None);
    assert_eq!(updated.project_id, goal.project_id);
    assert_eq!(updated.description, "why");
}

#[test]
fn json_patch_applies_tri_state_fields() {
    let db = TestDb::open();
    let goal = seed_goal(&db);
    let patch: GoalPatch =
        serde_json::from_str(r#"{"status":"archived","project_id":null,"unknown":1}"#).unwrap();

    let updated = UpdateComposer::new(&db.store)
        .apply(&ctx(), goal.id, &patch)
        .unwrap();

    assert_eq!(updated.status, "archived");
    assert_eq!(updated.project_id, None);
    assert_eq!(updated.due_date, Some(1_000));
    assert_eq!(updated.title, "original");
}

#[test]
fn missing_row_is_not_found() {
    let db = TestDb::open();
    let err = UpdateComposer::new(&db.store)
        .apply(
            &ctx(),
            id(9_999),
            &GoalPatch {
                status: Some("done".to_string()),
                ..GoalPatch::default()
            },
        )
        .unwrap_err();

    match err {
        CoreError::NotFound { entity, id } => {
            assert_eq!(entity, "goal");
            assert_eq!(id, "9999");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn dangling_foreign_key_in_patch_is_a_constraint_violation() {
    let db = TestDb::open();
    let goal = seed_goal(&db);

    let err = UpdateComposer::new(&db.store)
        .apply(
            &ctx(),
            goal.id,
            &GoalPatch {
                project_id: FieldPatch::Value(id(404)),
                ..GoalPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::ConstraintViolation(_)));
}

#[test]
fn empty_tag_patch_is_rejected_before_any_round_trip() {
    let db = TestDb::open();
    let store = CountingStore::new(db.store.clone());
    let tag = EntityRepository::new(&store)
        .create_tag(&ctx(), &NewTag::new("t"))
        .unwrap();
    let composer = UpdateComposer::new(&store);

    store.reset();
    let err = composer
        .apply(&ctx(), tag.id, &TagPatch::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::EmptyUpdate("tag")));
    assert_eq!(store.round_trips(), 0);

    let renamed = composer
        .apply(
            &ctx(),
            tag.id,
            &TagPatch {
                name: Some("renamed".to_string()),
                ..TagPatch::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "renamed");
    assert_eq!(renamed.created_at, tag.created_at);
    assert_eq!(store.round_trips(), 1);
}

#[test]
fn context_and_note_patches_update_their_own_tables() {
    let db = TestDb::open();
    let repo = EntityRepository::new(&db.store);
    let workspace = repo
        .create_workspace(&ctx(), &NewWorkspace::default())
        .unwrap();
    let context = repo
        .create_context(
            &ctx(),
            &NewContext {
                end_date: Some(5),
                ..NewContext::new("sprint", workspace.id)
            },
        )
        .unwrap();
    let note = AssociationResolver::new(&db.store)
        .attach_note(&ctx(), "goal", id(1), "draft", "body")
        .unwrap();
    let composer = UpdateComposer::new(&db.store);

    let context = composer
        .apply(
            &ctx(),
            context.id,
            &ContextPatch {
                color: Some("#0af".to_string()),
                end_date: FieldPatch::Null,
                ..ContextPatch::default()
            },
        )
        .unwrap();
    assert_eq!(context.color, "#0af");
    assert_eq!(context.end_date, None);
    assert_eq!(context.title, "sprint");

    let note = composer
        .apply(
            &ctx(),
            note.id,
            &NotePatch {
                content: Some("final".to_string()),
                ..NotePatch::default()
            },
        )
        .unwrap();
    assert_eq!(note.content, "final");
    assert_eq!(note.title, "draft");
}

use serde_json::json;
use workbook_core::{
    parse_args, CollectionId, CoreError, CreateCollectionArgs, CreateEntryArgs,
    CreateWorkbookArgs, EntityKind, LoadOptions, MutationCoordinator, NoopAccessService,
    ReadLayer, RequestContext, Storage, StorageConfig, UpdateEntityArgs, WorkbookId,
};

fn setup() -> Storage {
    Storage::open_in_memory(&StorageConfig::default()).unwrap()
}

fn ctx(tenant: &str) -> RequestContext {
    RequestContext::new(tenant, "user-1")
}

fn workbook_rows(storage: &Storage) -> i64 {
    storage
        .primary()
        .query_row("SELECT COUNT(*) FROM workbooks;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn sales_scenario_is_case_insensitive_and_tenant_scoped() {
    let storage = setup();
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);

    let created = coordinator
        .create_workbook(&ctx("T1"), CreateWorkbookArgs::new(None, "Sales"))
        .unwrap();
    assert_eq!(created.entity.title, "Sales");
    assert_eq!(created.entity.title_lower, "sales");
    assert_eq!(created.entity.collection_id, None);
    assert!(created.operations.is_empty());

    let err = coordinator
        .create_workbook(&ctx("T1"), CreateWorkbookArgs::new(None, "sales"))
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::AlreadyExists { kind: EntityKind::Workbook, .. }
    ));
    assert_eq!(err.code(), "ALREADY_EXISTS");

    let other_tenant = coordinator
        .create_workbook(&ctx("T2"), CreateWorkbookArgs::new(None, "Sales"))
        .unwrap();
    assert_eq!(other_tenant.entity.tenant_id, "T2");
    assert_ne!(other_tenant.entity.workbook_id, created.entity.workbook_id);
}

#[test]
fn created_workbook_reads_back_with_same_title_and_parent() {
    let storage = setup();
    let ctx = ctx("t1").with_project("p-9");
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);
    let reads = ReadLayer::new(&storage);

    let folder = coordinator
        .create_collection(&ctx, CreateCollectionArgs::new(None, "Finance"))
        .unwrap()
        .entity;
    let created = coordinator
        .create_workbook(
            &ctx,
            parse_args(json!({
                "collectionId": folder.collection_id,
                "title": "  Q3 Forecast ",
                "description": "quarterly",
                "meta": {"theme": "dark"}
            }))
            .unwrap(),
        )
        .unwrap()
        .entity;

    let loaded = reads
        .load_workbook(&ctx, created.workbook_id, LoadOptions::default())
        .unwrap();
    assert_eq!(loaded.title, "Q3 Forecast");
    assert_eq!(loaded.collection_id, Some(folder.collection_id));
    assert_eq!(loaded.description.as_deref(), Some("quarterly"));
    assert_eq!(loaded.project_id.as_deref(), Some("p-9"));
    assert_eq!(loaded.meta, json!({"theme": "dark"}));
    assert_eq!(loaded.created_by, "user-1");
    assert!(!loaded.is_template);
    assert!(loaded.entries.is_none());
}

#[test]
fn same_title_in_different_scope_succeeds() {
    let storage = setup();
    let ctx = ctx("t1");
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);

    let folder = coordinator
        .create_collection(&ctx, CreateCollectionArgs::new(None, "Archive"))
        .unwrap()
        .entity;
    coordinator
        .create_workbook(&ctx, CreateWorkbookArgs::new(None, "Sales"))
        .unwrap();
    let nested = coordinator
        .create_workbook(
            &ctx,
            CreateWorkbookArgs::new(Some(folder.collection_id), "SALES"),
        )
        .unwrap();
    assert_eq!(nested.entity.collection_id, Some(folder.collection_id));

    // Workbooks and collections are checked per kind.
    coordinator
        .create_collection(&ctx, CreateCollectionArgs::new(None, "sales"))
        .unwrap();
}

#[test]
fn missing_or_deleted_parent_fails_without_inserting() {
    let storage = setup();
    let ctx = ctx("t1");
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);

    let err = coordinator
        .create_workbook(&ctx, CreateWorkbookArgs::new(Some(CollectionId(404)), "Orphan"))
        .unwrap_err();
    assert!(matches!(err, CoreError::ParentNotFound(CollectionId(404))));
    assert_eq!(err.code(), "PARENT_NOT_FOUND");

    let folder = coordinator
        .create_collection(&ctx, CreateCollectionArgs::new(None, "Old"))
        .unwrap()
        .entity;
    coordinator
        .delete_collection(&ctx, folder.collection_id)
        .unwrap();

    let err = coordinator
        .create_workbook(
            &ctx,
            CreateWorkbookArgs::new(Some(folder.collection_id), "Orphan"),
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::ParentNotFound(id) if id == folder.collection_id));
    assert_eq!(workbook_rows(&storage), 0);
}

#[test]
fn invalid_input_is_rejected_before_storage() {
    let storage = setup();
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);

    for title in ["", "   ", "tab\tinside"] {
        let err = coordinator
            .create_workbook(&ctx("t1"), CreateWorkbookArgs::new(None, title))
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR", "title {title:?}");
    }

    let mut args = CreateWorkbookArgs::new(None, "Meta");
    args.meta = Some(json!("not an object"));
    let err = coordinator.create_workbook(&ctx("t1"), args).unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let err = coordinator
        .create_workbook(&RequestContext::new("", "user-1"), CreateWorkbookArgs::new(None, "x"))
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    // A missing parent is not reported when the title is already invalid.
    let err = coordinator
        .create_workbook(&ctx("t1"), CreateWorkbookArgs::new(Some(CollectionId(9)), " "))
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    assert_eq!(workbook_rows(&storage), 0);
}

#[test]
fn set_is_template_changes_only_the_flag() {
    let storage = setup();
    let ctx = ctx("t1");
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);
    let reads = ReadLayer::new(&storage);

    let folder = coordinator
        .create_collection(&ctx, CreateCollectionArgs::new(None, "Templates"))
        .unwrap()
        .entity;
    let created = coordinator
        .create_workbook(
            &ctx,
            CreateWorkbookArgs::new(Some(folder.collection_id), "Budget"),
        )
        .unwrap()
        .entity;

    let updated = coordinator
        .set_workbook_is_template(&ctx, created.workbook_id, true)
        .unwrap();
    assert!(updated.is_template);

    let loaded = reads
        .load_workbook(&ctx, created.workbook_id, LoadOptions::default())
        .unwrap();
    assert!(loaded.is_template);
    assert_eq!(loaded.title, created.title);
    assert_eq!(loaded.title_lower, created.title_lower);
    assert_eq!(loaded.collection_id, created.collection_id);

    let err = coordinator
        .set_workbook_is_template(&ctx, WorkbookId(999), true)
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn rename_to_own_title_in_any_case_is_not_a_conflict() {
    let storage = setup();
    let ctx = ctx("t1");
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);

    let created = coordinator
        .create_workbook(&ctx, CreateWorkbookArgs::new(None, "Sales"))
        .unwrap()
        .entity;

    let same = coordinator
        .update_workbook(&ctx, created.workbook_id, UpdateEntityArgs::title("Sales"))
        .unwrap();
    assert_eq!(same.entity.title, "Sales");

    let recased = coordinator
        .update_workbook(&ctx, created.workbook_id, UpdateEntityArgs::title("SALES"))
        .unwrap();
    assert_eq!(recased.entity.title, "SALES");
    assert_eq!(recased.entity.title_lower, "sales");
}

#[test]
fn rename_onto_sibling_title_fails() {
    let storage = setup();
    let ctx = ctx("t1");
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);

    coordinator
        .create_workbook(&ctx, CreateWorkbookArgs::new(None, "Sales"))
        .unwrap();
    let other = coordinator
        .create_workbook(&ctx, CreateWorkbookArgs::new(None, "Costs"))
        .unwrap()
        .entity;

    let err = coordinator
        .update_workbook(&ctx, other.workbook_id, UpdateEntityArgs::title("sALES"))
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists { .. }));

    let loaded = ReadLayer::new(&storage)
        .load_workbook(&ctx, other.workbook_id, LoadOptions::default())
        .unwrap();
    assert_eq!(loaded.title, "Costs");
}

#[test]
fn update_description_and_clear_it() {
    let storage = setup();
    let ctx = ctx("t1");
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);

    let created = coordinator
        .create_workbook(&ctx, CreateWorkbookArgs::new(None, "Notes"))
        .unwrap()
        .entity;

    let described = coordinator
        .update_workbook(
            &ctx,
            created.workbook_id,
            UpdateEntityArgs {
                title: None,
                description: Some("weekly sync".to_string()),
            },
        )
        .unwrap()
        .entity;
    assert_eq!(described.description.as_deref(), Some("weekly sync"));
    assert_eq!(described.title, "Notes");

    let cleared = coordinator
        .update_workbook(
            &ctx,
            created.workbook_id,
            UpdateEntityArgs {
                title: None,
                description: Some("  ".to_string()),
            },
        )
        .unwrap()
        .entity;
    assert_eq!(cleared.description, None);

    let err = coordinator
        .update_workbook(&ctx, created.workbook_id, UpdateEntityArgs::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[test]
fn deleting_a_workbook_frees_its_title() {
    let storage = setup();
    let ctx = ctx("t1");
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);
    let reads = ReadLayer::new(&storage);

    let first = coordinator
        .create_workbook(&ctx, CreateWorkbookArgs::new(None, "Sales"))
        .unwrap()
        .entity;
    let deleted = coordinator.delete_workbook(&ctx, first.workbook_id).unwrap();
    assert!(deleted.deleted_at.is_some());
    assert_eq!(deleted.deleted_by.as_deref(), Some("user-1"));

    let err = reads
        .load_workbook(&ctx, first.workbook_id, LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));

    coordinator
        .create_workbook(&ctx, CreateWorkbookArgs::new(None, "sales"))
        .unwrap();

    let err = coordinator.delete_workbook(&ctx, first.workbook_id).unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn entries_are_loaded_only_on_request() {
    let storage = setup();
    let ctx = ctx("t1");
    let coordinator = MutationCoordinator::new(&storage, NoopAccessService);
    let reads = ReadLayer::new(&storage);

    let created = coordinator
        .create_workbook(&ctx, CreateWorkbookArgs::new(None, "Dashboard"))
        .unwrap()
        .entity;
    let with_entry = coordinator
        .add_workbook_entry(
            &ctx,
            created.workbook_id,
            CreateEntryArgs {
                name: "Revenue".to_string(),
                scope: "widget".to_string(),
            },
        )
        .unwrap()
        .entity;
    let entries = with_entry.entries.expect("entries should be loaded");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Revenue");
    assert_eq!(entries[0].workbook_id, created.workbook_id);

    let shallow = reads
        .load_workbook(&ctx, created.workbook_id, LoadOptions::default())
        .unwrap();
    assert!(shallow.entries.is_none());

    let eager = reads
        .load_workbook(&ctx, created.workbook_id, LoadOptions::with_entries())
        .unwrap();
    assert_eq!(eager.entries.map(|entries| entries.len()), Some(1));

    let err = coordinator
        .add_workbook_entry(
            &ctx,
            WorkbookId(12345),
            CreateEntryArgs {
                name: "Lost".to_string(),
                scope: "widget".to_string(),
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

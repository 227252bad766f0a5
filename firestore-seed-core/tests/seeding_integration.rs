use firestore_seed_core::config::{AppIdConfig, ImportOptions};
use firestore_seed_core::contract::{LoadedSeed, MockDocumentStore, MockSeedLoader, SeedLoader};
use firestore_seed_core::error::SeedError;
use firestore_seed_core::memory::MemoryStore;
use firestore_seed_core::seeding::seed_all;
use serde_json::{json, Value};
use std::path::PathBuf;

fn loaded(name: &str, tree: Value) -> LoadedSeed {
    LoadedSeed {
        name: name.to_string(),
        path: PathBuf::from(format!("seeds/{name}")),
        tree,
    }
}

fn env_app_id(id: &str) -> AppIdConfig {
    AppIdConfig {
        primary: Some(id.to_string()),
        legacy: None,
    }
}

fn demo_tree() -> Value {
    json!({ "demoApps": { "collections": {
        "demoApps": { "APP_ID_GUID": { "name": "Demo", "owner": "APP_ID_GUID" } }
    }}})
}

#[tokio::test]
async fn missing_identifier_aborts_before_any_write() {
    let mut store = MockDocumentStore::new();
    store.expect_set().never();

    let err = seed_all(
        vec![loaded("orphan.json", demo_tree())],
        &store,
        &AppIdConfig::default(),
        ImportOptions::default(),
    )
    .await
    .unwrap_err();

    match err {
        SeedError::MissingIdentifier { source_name } => assert_eq!(source_name, "orphan.json"),
        other => panic!("expected MissingIdentifier, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_configured_values_count_as_unset() {
    let mut store = MockDocumentStore::new();
    store.expect_set().never();
    let app_ids = AppIdConfig {
        primary: Some(String::new()),
        legacy: Some(String::new()),
    };

    let err = seed_all(vec![loaded("empty.json", demo_tree())], &store, &app_ids, ImportOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SeedError::MissingIdentifier { .. }));
}

#[tokio::test]
async fn malformed_seed_performs_no_writes() {
    let mut store = MockDocumentStore::new();
    store.expect_set().never();
    let tree = json!({ "demoApps": { "collections": {
        "users": { "u1": { "ok": true }, "u2": null }
    }}});

    let err = seed_all(vec![loaded("bad.json", tree)], &store, &env_app_id("app-1"), ImportOptions::default())
        .await
        .unwrap_err();
    match err {
        SeedError::MalformedSeed { source_name, location, .. } => {
            assert_eq!(source_name, "bad.json");
            assert_eq!(location, "users/u2");
        }
        other => panic!("expected MalformedSeed, got {other:?}"),
    }
}

#[tokio::test]
async fn embedded_identifier_wins_over_environment() {
    let store = MemoryStore::new();
    let mut tree = demo_tree();
    tree["appId"] = json!("embedded-id");

    let report = seed_all(vec![loaded("app.json", tree)], &store, &env_app_id("env-id"), ImportOptions::default())
        .await
        .expect("seed should succeed");

    assert_eq!(report.sources[0].app_id, "embedded-id");
    let doc = store.get("demoApps/embedded-id").expect("document stored");
    assert_eq!(doc["owner"], json!("embedded-id"));
    assert!(store.get("demoApps/env-id").is_none());
}

#[tokio::test]
async fn empty_embedded_identifier_falls_back_to_environment() {
    let store = MemoryStore::new();
    let mut tree = demo_tree();
    tree["appId"] = json!("");

    let report = seed_all(vec![loaded("app.json", tree)], &store, &env_app_id("env-id"), ImportOptions::default())
        .await
        .expect("seed should succeed");
    assert_eq!(report.sources[0].app_id, "env-id");
}

#[tokio::test]
async fn legacy_alias_is_used_when_primary_is_unset() {
    let store = MemoryStore::new();
    let app_ids = AppIdConfig {
        primary: None,
        legacy: Some("legacy-id".to_string()),
    };

    let report = seed_all(vec![loaded("app.json", demo_tree())], &store, &app_ids, ImportOptions::default())
        .await
        .expect("seed should succeed");
    assert_eq!(report.sources[0].app_id, "legacy-id");
    assert!(store.get("demoApps/legacy-id").is_some());
}

#[tokio::test]
async fn sources_are_imported_in_order_and_later_sources_win() {
    let store = MemoryStore::new();
    let first = json!({ "appId": "shared", "demoApps": { "collections": {
        "settings": { "theme": { "color": "red" } },
        "only_first": { "x": 1 }
    }}});
    let second = json!({ "appId": "shared", "demoApps": { "collections": {
        "settings": { "theme": { "color": "blue" } }
    }}});

    let report = seed_all(
        vec![loaded("a.json", first), loaded("b.json", second)],
        &store,
        &AppIdConfig::default(),
        ImportOptions::default(),
    )
    .await
    .expect("seed should succeed");

    let names: Vec<_> = report.sources.iter().map(|s| s.source_name.as_str()).collect();
    assert_eq!(names, vec!["a.json", "b.json"]);
    assert_eq!(report.documents_written(), 3);
    assert_eq!(
        Value::Object(store.get("settings/theme").expect("stored")),
        json!({ "color": "blue" })
    );
    assert!(store.get("only_first/x").is_some());
}

#[tokio::test]
async fn a_failing_source_stops_the_run_after_earlier_sources_completed() {
    let store = MemoryStore::new();
    let good = json!({ "appId": "one", "demoApps": { "collections": { "c": { "d": {} } } } });
    let bad = json!({ "demoApps": {} });
    let never = json!({ "appId": "three", "demoApps": { "collections": { "c": { "e": {} } } } });

    let err = seed_all(
        vec![loaded("1.json", good), loaded("2.json", bad), loaded("3.json", never)],
        &store,
        &AppIdConfig::default(),
        ImportOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SeedError::MalformedSeed { ref source_name, .. } if source_name == "2.json"));
    assert!(store.get("c/d").is_some());
    assert!(store.get("c/e").is_none());
}

#[tokio::test]
async fn loader_output_feeds_the_pipeline() {
    let mut loader = MockSeedLoader::new();
    loader
        .expect_load_all()
        .times(1)
        .returning(|| Ok(vec![loaded("mock.json", demo_tree())]));

    let store = MemoryStore::new();
    let seeds = loader.load_all().await.expect("loader succeeds");
    let report = seed_all(seeds, &store, &env_app_id("app-9"), ImportOptions { parallel: true })
        .await
        .expect("seed should succeed");

    assert_eq!(report.documents_written(), 1);
    assert_eq!(
        Value::Object(store.get("demoApps/app-9").expect("stored")),
        json!({ "name": "Demo", "owner": "app-9" })
    );
}

#[tokio::test]
async fn embedded_identifier_with_a_slash_is_rejected_before_any_write() {
    let mut store = MockDocumentStore::new();
    store.expect_set().never();
    let mut tree = demo_tree();
    tree["appId"] = json!("x/posts/p1");

    let err = seed_all(vec![loaded("nested.json", tree)], &store, &AppIdConfig::default(), ImportOptions::default())
        .await
        .unwrap_err();
    match err {
        SeedError::MalformedSeed { source_name, location, reason } => {
            assert_eq!(source_name, "nested.json");
            assert_eq!(location, "appId");
            assert!(reason.contains("x/posts/p1"), "unexpected reason: {reason}");
        }
        other => panic!("expected MalformedSeed, got {other:?}"),
    }
}

#[tokio::test]
async fn configured_identifier_with_a_slash_is_rejected_before_any_write() {
    let mut store = MockDocumentStore::new();
    store.expect_set().never();
    let app_ids = AppIdConfig {
        primary: None,
        legacy: Some("a/b".to_string()),
    };

    let err = seed_all(vec![loaded("env.json", demo_tree())], &store, &app_ids, ImportOptions::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, SeedError::MalformedSeed { ref location, .. } if location == "NEXT_APP_ID_GUID"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn shape_errors_under_a_placeholder_key_name_the_effective_path() {
    let mut store = MockDocumentStore::new();
    store.expect_set().never();
    let tree = json!({ "demoApps": { "collections": { "demoApps": {
        "APP_ID_GUID": { "collections": { "users": { "u1": null } } }
    }}}});

    let err = seed_all(vec![loaded("null.json", tree)], &store, &env_app_id("app-1"), ImportOptions::default())
        .await
        .unwrap_err();
    match err {
        SeedError::MalformedSeed { location, reason, .. } => {
            assert_eq!(location, "demoApps/APP_ID_GUID/users/u1");
            assert!(
                reason.contains("effective path demoApps/app-1/users/u1"),
                "unexpected reason: {reason}"
            );
        }
        other => panic!("expected MalformedSeed, got {other:?}"),
    }
}

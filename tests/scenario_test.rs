//! End-to-end reconciliation scenarios against an in-memory runtime and a
//! temporary runtime root.

use serde_json::json;
use volume_core::testing::{FakeRuntime, RegistryState};
use volume_core::{ReconciliationEngine, VolumeOrigin};
use volume_gc_tests::{init_tracing, volume, volumes, Installation};

#[tokio::test]
async fn test_registry_orphans_removed_once_each() {
    init_tracing();
    let install = Installation::new();

    let runtime = FakeRuntime::new(RegistryState::names(&["a", "b", "c"])).with_container_json(json!({
        "Id": "web",
        "Mounts": [{"Type": "volume", "Name": "a", "Destination": "/data"}]
    }));
    let engine = ReconciliationEngine::new(runtime, install.layout.clone());

    let store = engine.open_store().await.unwrap();
    let scan = engine.compute_orphans(&store).await.unwrap();
    assert_eq!(scan.orphans, volumes(&["b", "c"]));
    drop(store);

    let report = engine.run().await.unwrap();
    assert_eq!(report.origin, VolumeOrigin::Registry);
    assert_eq!(report.managed_count, 3);
    assert_eq!(report.in_use_count, 1);
    assert_eq!(report.removed_volumes, vec![volume("b"), volume("c")]);
    assert!(report.removed_paths.is_empty());

    let mut removed = engine.runtime().removed_volumes();
    removed.sort();
    assert_eq!(removed, vec!["b".to_string(), "c".to_string()]);
}

#[tokio::test]
async fn test_directory_fallback_skips_bind_mounts_and_used_volumes() {
    init_tracing();
    let install = Installation::new();
    install.add_volume("x", Some(json!({"IsBindMount": true, "Path": "/srv/x"}))).await;
    install.add_volume("y", None).await;

    let runtime = FakeRuntime::new(RegistryState::Unsupported).with_container_json(json!({
        "Id": "legacy",
        "Volumes": {"/data": install.host_path("volumes/y/_data")}
    }));
    let engine = ReconciliationEngine::new(runtime, install.layout.clone());

    let store = engine.open_store().await.unwrap();
    assert!(!store.supports_registry_api());
    assert_eq!(engine.compute_managed_volume_ids(&store).await.unwrap(), volumes(&["y"]));
    assert_eq!(engine.compute_in_use_volume_ids().await.unwrap(), volumes(&["y"]));
    assert!(engine.compute_orphans(&store).await.unwrap().orphans.is_empty());
    drop(store);

    let report = engine.run().await.unwrap();
    assert!(report.removed_volumes.is_empty());
    assert!(install.exists(&install.layout.volume_dir(&volume("x"))));
    assert!(install.exists(&install.layout.volume_dir(&volume("y"))));
}

#[tokio::test]
async fn test_directory_fallback_removes_both_generations() {
    init_tracing();
    let install = Installation::new();
    install.add_legacy_content("z").await;
    install.add_volume("z", Some(json!({"IsBindMount": false}))).await;
    install.add_volume("new-only", None).await;

    let runtime = FakeRuntime::new(RegistryState::Unsupported);
    let engine = ReconciliationEngine::new(runtime, install.layout.clone());

    let report = engine.run().await.unwrap();
    assert_eq!(report.origin, VolumeOrigin::Directory);
    assert_eq!(report.removed_volumes, vec![volume("new-only"), volume("z")]);
    assert_eq!(
        report.removed_paths,
        vec![
            install.layout.volume_dir(&volume("new-only")),
            install.layout.legacy_content_dir(&volume("z")),
            install.layout.volume_dir(&volume("z")),
        ]
    );
    assert!(!install.exists(&install.layout.legacy_content_dir(&volume("z"))));
    assert!(!install.exists(&install.layout.volume_dir(&volume("z"))));
    assert!(engine.runtime().removed_volumes().is_empty());
}

#[tokio::test]
async fn test_migrated_volume_symlink_is_kept_when_in_use() {
    init_tracing();
    let install = Installation::new();
    install.add_legacy_content("m").await;
    install.add_volume("m", None).await;
    let data = install.layout.volume_dir(&volume("m")).join("_data");
    tokio::fs::remove_dir(&data).await.unwrap();
    std::os::unix::fs::symlink(install.layout.legacy_content_dir(&volume("m")), &data).unwrap();

    let runtime = FakeRuntime::new(RegistryState::Unsupported).with_container_json(json!({
        "Id": "old",
        "Volumes": {"/data": install.host_path("vfs/dir/m")}
    }));
    let engine = ReconciliationEngine::new(runtime, install.layout.clone());

    let report = engine.run().await.unwrap();
    assert_eq!(report.in_use_count, 1);
    assert!(report.removed_volumes.is_empty());
    assert!(install.exists(&data));
}

#[tokio::test]
async fn test_unnamed_mounts_do_not_hide_named_ones() {
    init_tracing();
    let install = Installation::new();

    let runtime = FakeRuntime::new(RegistryState::names(&["named", "orphan"])).with_container_json(json!({
        "Id": "mixed",
        "Mounts": [
            {"Type": "bind", "Source": "/home/user/code", "Destination": "/code"},
            {"Type": "volume", "Name": "named", "Destination": "/data"}
        ]
    }));
    let engine = ReconciliationEngine::new(runtime, install.layout.clone());

    assert_eq!(engine.compute_in_use_volume_ids().await.unwrap(), volumes(&["named"]));

    let report = engine.run().await.unwrap();
    assert_eq!(report.removed_volumes, vec![volume("orphan")]);
    assert_eq!(engine.runtime().removed_volumes(), vec!["orphan".to_string()]);
}

#[tokio::test]
async fn test_registry_with_no_volumes() {
    init_tracing();
    let install = Installation::new();
    install.add_volume("on-disk-only", None).await;

    let runtime = FakeRuntime::new(RegistryState::Absent);
    let engine = ReconciliationEngine::new(runtime, install.layout.clone());

    let report = engine.run().await.unwrap();
    assert_eq!(report.origin, VolumeOrigin::Registry);
    assert_eq!(report.managed_count, 0);
    assert!(install.exists(&install.layout.volume_dir(&volume("on-disk-only"))));
}

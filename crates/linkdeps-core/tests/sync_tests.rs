//! Integration tests for the SyncEngine
//!
//! Each test builds a consumer project plus sibling dependency sources in a
//! temporary workspace and drives full passes through a recording fake
//! package manager.

mod common;

use common::{Call, FakePackageManager, PackMode, archives_in};
use linkdeps_core::{DependencyStatus, Error, FileChange, SyncEngine};
use linkdeps_test_utils::project::TestWorkspace;
use linkdeps_test_utils::tarball::write_tgz;
use pretty_assertions::assert_eq;
use serde_json::json;

fn mylib_workspace() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.dependency("mylib", "mylib", &[("a.js", "module.exports = 'a'"), ("b.js", "module.exports = 'b'")]);
    ws.consumer(json!({
        "name": "app",
        "dependencies": { "mylib": "^1.0.0" },
        "linkDependencies": { "mylib": "../mylib" }
    }));
    ws
}

fn engine(ws: &TestWorkspace, pm: &FakePackageManager) -> SyncEngine {
    SyncEngine::new(&ws.consumer_root(), pm.boxed()).unwrap()
}

#[test]
fn test_first_sync_installs_dependency() {
    let ws = mylib_workspace();
    let pm = FakePackageManager::new();

    let report = engine(&ws, &pm).sync().unwrap();

    assert_eq!(report.reinstalled(), 1);
    match report.status_of("mylib").unwrap() {
        DependencyStatus::Reinstalled { change, build, install } => {
            assert_eq!(change, &None);
            assert!(build.installed_dependencies);
            assert!(!build.built);
            assert!(!install.replaced);
        }
        other => panic!("unexpected status: {:?}", other),
    }

    assert_eq!(ws.read("app/node_modules/mylib/a.js"), "module.exports = 'a'");
    assert_eq!(ws.read("app/node_modules/mylib/b.js"), "module.exports = 'b'");
    ws.assert_file_exists("app/node_modules/mylib/package.json");
    ws.assert_file_exists("app/node_modules/mylib/.link-deps-hash");
}

#[test]
fn test_second_sync_is_noop() {
    let ws = mylib_workspace();
    let pm = FakePackageManager::new();
    let engine = engine(&ws, &pm);

    engine.sync().unwrap();
    let record = ws.read("app/node_modules/mylib/.link-deps-hash");
    let report = engine.sync().unwrap();

    assert!(report.is_noop());
    assert_eq!(report.status_of("mylib"), Some(&DependencyStatus::Unchanged));
    assert_eq!(pm.pack_count(), 1);
    assert_eq!(ws.read("app/node_modules/mylib/.link-deps-hash"), record);
}

#[test]
fn test_changed_file_is_reported_and_reinstalled() {
    let ws = mylib_workspace();
    let pm = FakePackageManager::new();
    let engine = engine(&ws, &pm);
    engine.sync().unwrap();

    ws.write("mylib/b.js", "module.exports = 'B'");
    let report = engine.sync().unwrap();

    match report.status_of("mylib").unwrap() {
        DependencyStatus::Reinstalled { change, install, .. } => {
            assert_eq!(change, &Some(FileChange::Changed("b.js".to_string())));
            assert!(install.replaced);
        }
        other => panic!("unexpected status: {:?}", other),
    }
    assert_eq!(change_message(&report), Some("Changed file: b.js".to_string()));
    assert_eq!(ws.read("app/node_modules/mylib/b.js"), "module.exports = 'B'");
    assert_eq!(pm.pack_count(), 2);
}

fn change_message(report: &linkdeps_core::SyncReport) -> Option<String> {
    match report.status_of("mylib")? {
        DependencyStatus::Reinstalled { change, .. } => change.as_ref().map(ToString::to_string),
        _ => None,
    }
}

#[test]
fn test_record_lists_files_in_sorted_order() {
    let ws = mylib_workspace();
    let pm = FakePackageManager::new();
    engine(&ws, &pm).sync().unwrap();

    let record = ws.read("app/node_modules/mylib/.link-deps-hash");
    let paths: Vec<&str> = record
        .lines()
        .map(|line| line.split_once(' ').unwrap().1)
        .collect();

    assert_eq!(paths, vec!["a.js", "b.js", "package.json"]);
    for line in record.lines() {
        let (hash, _) = line.split_once(' ').unwrap();
        assert_eq!(hash.len(), 64);
    }
}

#[test]
fn test_replacement_drops_stale_files() {
    let ws = mylib_workspace();
    ws.write("app/node_modules/mylib/stale.js", "old");
    let pm = FakePackageManager::new();
    let engine = engine(&ws, &pm);

    engine.sync().unwrap();
    ws.assert_file_not_exists("app/node_modules/mylib/stale.js");

    std::fs::remove_file(ws.root().join("mylib/b.js")).unwrap();
    let report = engine.sync().unwrap();

    assert_eq!(report.reinstalled(), 1);
    ws.assert_file_not_exists("app/node_modules/mylib/b.js");
    ws.assert_file_exists("app/node_modules/mylib/a.js");
}

#[test]
fn test_archive_is_removed_after_install() {
    let ws = mylib_workspace();
    let pm = FakePackageManager::new();

    engine(&ws, &pm).sync().unwrap();

    assert!(archives_in(&ws.root().join("mylib")).is_empty());
}

#[test]
fn test_corrupt_archive_is_cleaned_up_and_not_recorded() {
    let ws = mylib_workspace();
    let pm = FakePackageManager::with_pack_mode(PackMode::Corrupt);

    let err = engine(&ws, &pm).sync().unwrap_err();

    assert!(!err.is_configuration(), "got: {}", err);
    assert!(archives_in(&ws.root().join("mylib")).is_empty());
    ws.assert_file_not_exists("app/node_modules/mylib/.link-deps-hash");
}

#[test]
fn test_missing_archive_is_an_error() {
    let ws = mylib_workspace();
    let pm = FakePackageManager::with_pack_mode(PackMode::Nothing);

    let err = engine(&ws, &pm).sync().unwrap_err();

    assert!(matches!(err, Error::ArchiveNotFound { ref name, .. } if name == "mylib"), "got: {:?}", err);
}

#[test]
fn test_failed_pack_leaves_record_absent_and_stops_pass() {
    let ws = TestWorkspace::new();
    ws.dependency("first", "first", &[("index.js", "1")]);
    ws.dependency("second", "second", &[("index.js", "2")]);
    ws.consumer(json!({
        "dependencies": { "first": "*", "second": "*" },
        "linkDependencies": { "first": "../first", "second": "../second" }
    }));
    let pm = FakePackageManager::failing("pack");

    let err = engine(&ws, &pm).sync().unwrap_err();

    assert!(matches!(err, Error::CommandFailed { .. }), "got: {:?}", err);
    ws.assert_file_not_exists("app/node_modules/first/.link-deps-hash");
    let touched_second = pm.calls().iter().any(|call| match call {
        Call::Install(dir) | Call::Pack(dir) | Call::RunScript(dir, _) => dir.ends_with("second"),
        Call::Add(..) => false,
    });
    assert!(!touched_second, "second dependency must not be processed");
}

#[test]
fn test_missing_source_falls_back_and_continues() {
    let ws = TestWorkspace::new();
    ws.dependency("mylib", "mylib", &[("index.js", "x")]);
    ws.write("app/node_modules/gone/index.js", "registry copy");
    ws.consumer(json!({
        "dependencies": { "gone": "^2.0.0", "mylib": "^1.0.0" },
        "linkDependencies": { "gone": "../gone", "mylib": "../mylib" }
    }));
    let pm = FakePackageManager::new();

    let report = engine(&ws, &pm).sync().unwrap();

    assert_eq!(
        report.status_of("gone"),
        Some(&DependencyStatus::SkippedMissingSource {
            fallback_version: "^2.0.0".to_string()
        })
    );
    assert!(matches!(
        report.status_of("mylib"),
        Some(DependencyStatus::Reinstalled { .. })
    ));
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.contains("using normally installed version ('^2.0.0')"))
    );
    assert_eq!(ws.read("app/node_modules/gone/index.js"), "registry copy");
}

#[test]
fn test_missing_source_without_fallback_is_unresolved() {
    let ws = TestWorkspace::new();
    ws.consumer(json!({
        "linkDependencies": { "gone": "../gone" }
    }));
    let pm = FakePackageManager::new();

    let err = engine(&ws, &pm).sync().unwrap_err();

    assert!(matches!(err, Error::UnresolvedDependency { ref name, .. } if name == "gone"));
    assert!(err.is_configuration());
    assert!(pm.calls().is_empty());
}

#[test]
fn test_name_mismatch_is_fatal() {
    let ws = TestWorkspace::new();
    ws.dependency("mylib", "other-name", &[("index.js", "x")]);
    ws.consumer(json!({
        "dependencies": { "mylib": "*" },
        "linkDependencies": { "mylib": "../mylib" }
    }));
    let pm = FakePackageManager::new();

    let err = engine(&ws, &pm).sync().unwrap_err();

    match err {
        Error::NameMismatch { expected, found } => {
            assert_eq!(expected, "mylib");
            assert_eq!(found, "other-name");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    ws.assert_file_not_exists("app/node_modules/mylib");
    assert_eq!(pm.pack_count(), 0);
}

#[test]
fn test_build_script_runs_before_pack() {
    let ws = TestWorkspace::new();
    ws.write_json(
        "mylib/package.json",
        &json!({ "name": "mylib", "version": "1.0.0", "scripts": { "build": "tsc" } }),
    );
    ws.write("mylib/src/index.ts", "export {}");
    ws.write("mylib/node_modules/.keep", "");
    ws.consumer(json!({
        "devDependencies": { "mylib": "*" },
        "linkDependencies": { "mylib": "../mylib" }
    }));
    let pm = FakePackageManager::new();

    engine(&ws, &pm).sync().unwrap();

    let calls = pm.calls();
    assert_eq!(calls.len(), 2, "calls: {:?}", calls);
    assert!(matches!(&calls[0], Call::RunScript(_, script) if script == "build"));
    assert!(matches!(&calls[1], Call::Pack(_)));
    ws.assert_file_not_exists("app/node_modules/mylib/node_modules");
}

#[test]
fn test_missing_link_section_is_fatal() {
    let ws = TestWorkspace::new();
    ws.consumer(json!({ "name": "app" }));
    let pm = FakePackageManager::new();

    let err = engine(&ws, &pm).sync().unwrap_err();

    assert!(matches!(err, Error::NoLinkSection));
    assert!(err.is_configuration());
}

#[test]
fn test_missing_manifest_is_fatal() {
    let ws = TestWorkspace::new();
    let pm = FakePackageManager::new();

    let err = engine(&ws, &pm).sync().unwrap_err();

    assert!(matches!(err, Error::ManifestNotFound { .. }), "got: {:?}", err);
}

#[test]
fn test_link_without_regular_declaration_warns() {
    let ws = TestWorkspace::new();
    ws.dependency("mylib", "mylib", &[("index.js", "x")]);
    ws.consumer(json!({
        "linkDependencies": { "mylib": "../mylib" }
    }));
    let pm = FakePackageManager::new();

    let report = engine(&ws, &pm).sync().unwrap();

    assert_eq!(report.reinstalled(), 1);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.contains("should also be added as normal- or dev-dependency"))
    );
}

#[test]
fn test_scoped_dependency_installs_nested() {
    let ws = TestWorkspace::new();
    ws.dependency("ui", "@acme/ui", &[("index.js", "ui")]);
    ws.consumer(json!({
        "dependencies": { "@acme/ui": "*" },
        "linkDependencies": { "@acme/ui": "../ui" }
    }));
    let pm = FakePackageManager::new();

    engine(&ws, &pm).sync().unwrap();

    assert_eq!(ws.read("app/node_modules/@acme/ui/index.js"), "ui");
    ws.assert_file_exists("app/node_modules/@acme/ui/.link-deps-hash");
}

#[test]
fn test_manifest_edits_are_picked_up_between_passes() {
    let ws = mylib_workspace();
    ws.dependency("other", "other", &[("index.js", "o")]);
    let pm = FakePackageManager::new();
    let engine = engine(&ws, &pm);
    engine.sync().unwrap();

    ws.consumer(json!({
        "dependencies": { "mylib": "^1.0.0", "other": "*" },
        "linkDependencies": { "mylib": "../mylib", "other": "../other" }
    }));
    let report = engine.sync().unwrap();

    assert_eq!(report.status_of("mylib"), Some(&DependencyStatus::Unchanged));
    assert!(matches!(
        report.status_of("other"),
        Some(DependencyStatus::Reinstalled { .. })
    ));
}

#[test]
fn test_leftover_archive_is_not_installed() {
    let ws = TestWorkspace::new();
    ws.write_json(
        "mylib/package.json",
        &json!({ "name": "mylib", "version": "1.0.1" }),
    );
    ws.write("mylib/index.js", "NEW");
    ws.write("mylib/node_modules/.keep", "");
    write_tgz(
        &ws.root().join("mylib/mylib-1.0.0.tgz"),
        "package",
        &[("index.js", b"OLD".as_slice())],
    );
    ws.consumer(json!({
        "dependencies": { "mylib": "^1.0.0" },
        "linkDependencies": { "mylib": "../mylib" }
    }));
    let pm = FakePackageManager::new();

    engine(&ws, &pm).sync().unwrap();

    assert_eq!(ws.read("app/node_modules/mylib/index.js"), "NEW");
    assert_eq!(archives_in(&ws.root().join("mylib")), vec!["mylib-1.0.0.tgz".to_string()]);
}

#[test]
fn test_failed_pack_removes_partial_archive() {
    let ws = mylib_workspace();
    ws.write("mylib/node_modules/.keep", "");
    let pm = FakePackageManager::with_pack_mode(PackMode::Partial);

    let err = engine(&ws, &pm).sync().unwrap_err();

    assert!(matches!(err, Error::CommandFailed { .. }), "got: {:?}", err);
    assert!(archives_in(&ws.root().join("mylib")).is_empty());
    ws.assert_file_not_exists("app/node_modules/mylib/.link-deps-hash");
}

#[test]
fn test_source_that_is_a_file_is_unresolved() {
    let ws = TestWorkspace::new();
    ws.write("mylib", "not a directory");
    ws.consumer(json!({
        "linkDependencies": { "mylib": "../mylib" }
    }));
    let pm = FakePackageManager::new();

    let err = engine(&ws, &pm).sync().unwrap_err();

    assert!(matches!(err, Error::UnresolvedDependency { ref name, .. } if name == "mylib"), "got: {:?}", err);
    assert!(pm.calls().is_empty());
}

#[test]
fn test_consumer_nested_in_dependency_syncs_once() {
    let ws = TestWorkspace::new();
    ws.dependency("lib", "lib", &[("index.js", "lib"), ("demo/README.md", "demo")]);
    ws.write_json(
        "lib/demo/app/package.json",
        &json!({
            "name": "demo-app",
            "dependencies": { "lib": "*" },
            "linkDependencies": { "lib": "../.." }
        }),
    );
    let consumer_root = ws.root().join("lib/demo/app");
    let pm = FakePackageManager::new();
    let engine = SyncEngine::new(&consumer_root, pm.boxed()).unwrap();

    let first = engine.sync().unwrap();
    let second = engine.sync().unwrap();

    assert_eq!(first.reinstalled(), 1);
    assert_eq!(second.status_of("lib"), Some(&DependencyStatus::Unchanged));
    assert_eq!(pm.pack_count(), 1);
    assert_eq!(ws.read("lib/demo/app/node_modules/lib/index.js"), "lib");
    let record = ws.read("lib/demo/app/node_modules/lib/.link-deps-hash");
    assert!(!record.contains("demo/"), "record: {}", record);
}

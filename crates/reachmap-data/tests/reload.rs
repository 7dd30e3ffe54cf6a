//! Reload behaviour against real files on disk.

use std::fs;
use std::path::Path;

use reachmap_data::{DatasetPaths, DatasetStore};

fn write(path: &Path, json: &str) {
    fs::write(path, json).expect("write dataset file");
}

fn seed(dir: &Path) -> DatasetPaths {
    let paths = DatasetPaths {
        stores: dir.join("stores.json"),
        centers: dir.join("centers.json"),
        aggregates: Some(dir.join("cities.json")),
    };
    write(
        &paths.stores,
        r#"[{"name": "A", "state": "GA", "latitude": 33.7, "longitude": -84.4}]"#,
    );
    write(
        &paths.centers,
        r#"[{"LINAC Name": "Emory", "Latitude": 33.79, "Longitude": -84.32, "Number of LINACs": 4}]"#,
    );
    write(
        paths.aggregates.as_deref().expect("aggregates path"),
        r#"[{"Cities": "Atlanta", "States": "GA", "Latitude": 33.749, "Longtitude": -84.388, "Number of LINAC Centers": 1, "Number of LINACs": 4}]"#,
    );
    paths
}

#[test]
fn open_loads_all_three_collections() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = DatasetStore::open(seed(dir.path())).expect("open");

    let snapshot = store.current();
    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.stores.len(), 1);
    assert_eq!(snapshot.centers.len(), 1);
    assert_eq!(snapshot.aggregates.len(), 1);
    assert_eq!(snapshot.state_codes(), vec!["GA"]);
}

#[test]
fn reload_swaps_in_new_data_without_touching_old_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = seed(dir.path());
    let store = DatasetStore::open(paths.clone()).expect("open");
    let before = store.current();

    write(
        &paths.stores,
        r#"[
            {"name": "A", "state": "GA", "latitude": 33.7, "longitude": -84.4},
            {"name": "B", "state": "SC", "latitude": 34.0, "longitude": -81.0}
        ]"#,
    );
    let after = store.reload().expect("reload");

    assert_eq!(after.version, 2);
    assert_eq!(after.stores.len(), 2);
    assert_eq!(store.current().version, 2);
    // A reader holding the old snapshot still sees the complete old data.
    assert_eq!(before.version, 1);
    assert_eq!(before.stores.len(), 1);
}

#[test]
fn corrupt_file_on_reload_keeps_last_good_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = seed(dir.path());
    let store = DatasetStore::open(paths.clone()).expect("open");

    write(&paths.centers, "[{ truncated");
    assert!(store.reload().is_err());

    let current = store.current();
    assert_eq!(current.version, 1);
    assert_eq!(current.centers.len(), 1);

    write(&paths.centers, "[]");
    let recovered = store.reload().expect("reload after fix");
    assert!(recovered.version > 1);
    assert!(recovered.centers.is_empty());
}

#[test]
fn missing_aggregate_path_yields_empty_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut paths = seed(dir.path());
    paths.aggregates = None;

    let store = DatasetStore::open(paths).expect("open");
    assert!(store.current().aggregates.is_empty());
}

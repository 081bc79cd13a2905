//! Round-trip tests for the exported snapshot file format the CLI
//! consumes.

use std::fs;

use repolens_analyze::DifferentialEngine;
use repolens_core::{ContentId, FileNode, RepoCoordinates, Snapshot};

fn sample(commit: &str, hash: &str) -> Snapshot {
    let coords = RepoCoordinates::new("acme", "app", commit);
    let mut snapshot = Snapshot::pending(&coords);
    snapshot
        .files
        .push(FileNode::new_file(ContentId::new(hash), "a.service.ts", 100));
    snapshot.progress.advance(1, 1, "crawled");
    snapshot.progress.mark_complete("Analyzed 1 files into 0 modules");
    snapshot
}

#[test]
fn test_snapshot_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    let snapshot = sample("abc123", "h1");
    fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

    let data = fs::read_to_string(&path).unwrap();
    let back: Snapshot = serde_json::from_str(&data).unwrap();

    assert_eq!(back.analysis_id, snapshot.analysis_id);
    assert!(back.is_complete());
    assert_eq!(back.total_files(), 1);
    assert_eq!(back.total_size(), 100);
}

#[test]
fn test_diff_of_exported_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let current_path = dir.path().join("current.json");
    let previous_path = dir.path().join("previous.json");

    fs::write(
        &current_path,
        serde_json::to_string(&sample("head", "new")).unwrap(),
    )
    .unwrap();
    fs::write(
        &previous_path,
        serde_json::to_string(&sample("parent", "old")).unwrap(),
    )
    .unwrap();

    let current: Snapshot =
        serde_json::from_str(&fs::read_to_string(&current_path).unwrap()).unwrap();
    let previous: Snapshot =
        serde_json::from_str(&fs::read_to_string(&previous_path).unwrap()).unwrap();

    let diff = DifferentialEngine::diff(&current, &previous);
    assert_eq!(diff.commit_hash, "head");
    assert_eq!(diff.parent_commit, "parent");
    assert_eq!(diff.changes.len(), 1);
    assert_eq!(diff.changes[0].path, "a.service.ts");
    assert_eq!(diff.summary(), "+0 ~1 -0 (0 modules affected)");
}

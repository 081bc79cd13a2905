use repolens_core::{
    AnalysisStatus, AnalyzeError, ContentId, CrawlConfig, FileNode, ModuleId, Progress,
    RepoCoordinates, Snapshot,
};
use std::time::Duration;

#[test]
fn test_coordinates_roundtrip() {
    let coords = RepoCoordinates::new("acme", "web-app", "deadbeef");
    coords.validate().unwrap();

    let id = coords.analysis_id();
    assert_eq!(id.as_str(), "acme/web-app@deadbeef");
    assert_eq!(coords.repository(), "acme/web-app");
}

#[test]
fn test_invalid_coordinates_never_crawl() {
    for (owner, repo, commit) in [
        ("", "app", "abc"),
        ("acme", "", "abc"),
        ("acme", "app", ""),
        ("acme", "a/b", "abc"),
        ("ac me", "app", "abc"),
    ] {
        let coords = RepoCoordinates::new(owner, repo, commit);
        let err = coords.validate().unwrap_err();
        assert!(matches!(err, AnalyzeError::Validation { .. }), "{coords:?}");
    }
}

#[test]
fn test_snapshot_serde_roundtrip() {
    let coords = RepoCoordinates::new("acme", "app", "abc123");
    let mut snapshot = Snapshot::pending(&coords);
    snapshot
        .files
        .push(FileNode::new_file(ContentId::new("h1"), "a.service.ts", 100));
    let mut lib = FileNode::new_directory(ContentId::new("t1"), "lib");
    lib.children
        .push(FileNode::new_file(ContentId::new("h2"), "lib/b.util.ts", 50));
    lib.seal();
    snapshot.files.push(lib);
    snapshot.progress.advance(2, 3, "crawling");

    let json = serde_json::to_string(&snapshot).unwrap();
    let back: Snapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(back.analysis_id, snapshot.analysis_id);
    assert_eq!(back.total_files(), 2);
    assert_eq!(back.total_size(), 150);
    assert_eq!(back.progress.status, AnalysisStatus::Analyzing);
    assert_eq!(back.file_index().len(), 2);
}

#[test]
fn test_module_id_is_stable_across_snapshots() {
    // Same rule name must map to the same module identity in both
    // snapshots of a diff.
    let a = ModuleId::from_rule_name("Services");
    let b = ModuleId::from_rule_name("Services");
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "services");
}

#[test]
fn test_progress_total_can_grow() {
    let mut progress = Progress::pending();
    progress.advance(10, 20, "first batch");
    progress.advance(20, 45, "second batch");
    progress.advance(45, 45, "third batch");
    assert_eq!(progress.current, 45);
    assert_eq!(progress.total, 45);
    assert_eq!(progress.percentage(), 100.0);
}

#[test]
fn test_config_serde_defaults() {
    // Empty JSON object deserializes to full defaults.
    let config: CrawlConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.batch_size, 50);
    assert_eq!(config.chunk_timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
}

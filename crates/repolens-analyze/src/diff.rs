//! Differential engine: structural comparison of two snapshots.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::Utc;
use compact_str::CompactString;
use itertools::Itertools;

use repolens_core::{
    ChangeType, DiffMetrics, DiffResult, FileChange, Module, ModuleChange, Snapshot,
};

/// Computes file- and module-level diffs between two completed
/// snapshots.
///
/// Module policy: a module is Modified when any contained file's
/// content or membership changed; a module present in only one
/// snapshot is Added or Deleted.
pub struct DifferentialEngine;

impl DifferentialEngine {
    /// Compute the structural difference of `current` against
    /// `previous`.
    ///
    /// Both snapshots are read from persistence, so the fetch counters
    /// in the metrics stay zero.
    pub fn diff(current: &Snapshot, previous: &Snapshot) -> DiffResult {
        let started = Instant::now();
        let current_index = current.file_index();
        let previous_index = previous.file_index();

        let mut changes = Vec::new();

        // Paths only in previous: deleted.
        for (path, node) in previous_index.iter().sorted_by_key(|(path, _)| *path) {
            if !current_index.contains_key(*path) {
                changes.push(FileChange {
                    path: (*path).into(),
                    change_type: ChangeType::Deleted,
                    previous_hash: Some(node.id.clone()),
                    current_hash: None,
                    previous_size: Some(node.size),
                    current_size: None,
                    previous_modules: node.module_ids.clone(),
                    current_modules: Vec::new(),
                });
            }
        }

        // Paths in both with differing identity: modified. Paths only
        // in current: added. Identical identity emits nothing.
        for (path, node) in current_index.iter().sorted_by_key(|(path, _)| *path) {
            match previous_index.get(*path) {
                Some(prev) if prev.id == node.id => {}
                Some(prev) => changes.push(FileChange {
                    path: (*path).into(),
                    change_type: ChangeType::Modified,
                    previous_hash: Some(prev.id.clone()),
                    current_hash: Some(node.id.clone()),
                    previous_size: Some(prev.size),
                    current_size: Some(node.size),
                    previous_modules: prev.module_ids.clone(),
                    current_modules: node.module_ids.clone(),
                }),
                None => changes.push(FileChange {
                    path: (*path).into(),
                    change_type: ChangeType::Added,
                    previous_hash: None,
                    current_hash: Some(node.id.clone()),
                    previous_size: None,
                    current_size: Some(node.size),
                    previous_modules: Vec::new(),
                    current_modules: node.module_ids.clone(),
                }),
            }
        }

        let changed_paths: HashSet<&str> = changes.iter().map(|c| c.path.as_str()).collect();
        let module_changes = Self::diff_modules(current, previous, &changed_paths);

        DiffResult {
            commit_hash: current.commit.clone(),
            parent_commit: previous.commit.clone(),
            timestamp: Utc::now(),
            changes,
            module_changes,
            metrics: DiffMetrics {
                diff_duration: started.elapsed(),
                ..DiffMetrics::default()
            },
        }
    }

    fn diff_modules(
        current: &Snapshot,
        previous: &Snapshot,
        changed_paths: &HashSet<&str>,
    ) -> Vec<ModuleChange> {
        let previous_by_id: HashMap<_, &Module> =
            previous.modules.iter().map(|m| (&m.id, m)).collect();
        let mut module_changes = Vec::new();

        for module in &current.modules {
            match previous_by_id.get(&module.id) {
                None => {
                    // New module: every member file is newly grouped.
                    module_changes.push(ModuleChange {
                        module_id: module.id.clone(),
                        name: module.name.clone(),
                        change_type: ChangeType::Added,
                        affected_files: module.file_paths.clone(),
                    });
                }
                Some(prev) => {
                    let affected = Self::affected_files(module, prev, changed_paths);
                    if !affected.is_empty() {
                        module_changes.push(ModuleChange {
                            module_id: module.id.clone(),
                            name: module.name.clone(),
                            change_type: ChangeType::Modified,
                            affected_files: affected,
                        });
                    }
                }
            }
        }

        for module in &previous.modules {
            if current.module(&module.id).is_none() {
                module_changes.push(ModuleChange {
                    module_id: module.id.clone(),
                    name: module.name.clone(),
                    change_type: ChangeType::Deleted,
                    affected_files: module.file_paths.clone(),
                });
            }
        }

        module_changes
    }

    /// Member files that changed content, joined the module, or left it.
    fn affected_files(
        current: &Module,
        previous: &Module,
        changed_paths: &HashSet<&str>,
    ) -> Vec<CompactString> {
        let current_set: HashSet<&str> = current.file_paths.iter().map(|p| p.as_str()).collect();
        let previous_set: HashSet<&str> = previous.file_paths.iter().map(|p| p.as_str()).collect();

        let mut seen = HashSet::new();
        let mut affected = Vec::new();
        let mut push = |path: &str, affected: &mut Vec<CompactString>| {
            if seen.insert(path.to_string()) {
                affected.push(path.into());
            }
        };

        for path in &current.file_paths {
            if changed_paths.contains(path.as_str()) || !previous_set.contains(path.as_str()) {
                push(path, &mut affected);
            }
        }
        for path in &previous.file_paths {
            if !current_set.contains(path.as_str()) {
                push(path, &mut affected);
            }
        }
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolens_core::{ContentId, FileNode, ModuleId, NodeStatus, RepoCoordinates};

    fn snapshot(commit: &str, files: Vec<FileNode>, modules: Vec<Module>) -> Snapshot {
        let coords = RepoCoordinates::new("acme", "app", commit);
        let mut snapshot = Snapshot::pending(&coords);
        snapshot.files = files;
        snapshot.modules = modules;
        snapshot
    }

    fn file(path: &str, hash: &str, size: u64) -> FileNode {
        FileNode::new_file(ContentId::new(hash), path, size)
    }

    fn module(name: &str, paths: &[&str]) -> Module {
        let mut module = Module::new(name);
        module.file_paths = paths.iter().map(|p| (*p).into()).collect();
        module.metrics.file_count = paths.len() as u64;
        module.status = NodeStatus::Complete;
        module
    }

    #[test]
    fn test_diff_self_identity_is_empty() {
        let snapshot = snapshot(
            "abc",
            vec![file("a.rs", "h1", 10), file("b.rs", "h2", 20)],
            vec![module("Services", &["a.rs"])],
        );
        let diff = DifferentialEngine::diff(&snapshot, &snapshot);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_file_change_classification_is_exhaustive() {
        let previous = snapshot(
            "parent",
            vec![
                file("kept.rs", "same", 10),
                file("changed.rs", "old", 20),
                file("removed.rs", "gone", 30),
            ],
            Vec::new(),
        );
        let current = snapshot(
            "head",
            vec![
                file("kept.rs", "same", 10),
                file("changed.rs", "new", 25),
                file("fresh.rs", "born", 5),
            ],
            Vec::new(),
        );

        let diff = DifferentialEngine::diff(&current, &previous);
        assert_eq!(diff.changes.len(), 3);

        let by_path: HashMap<&str, &FileChange> =
            diff.changes.iter().map(|c| (c.path.as_str(), c)).collect();

        let added = by_path["fresh.rs"];
        assert_eq!(added.change_type, ChangeType::Added);
        assert_eq!(added.current_hash, Some(ContentId::new("born")));
        assert!(added.previous_hash.is_none());

        let modified = by_path["changed.rs"];
        assert_eq!(modified.change_type, ChangeType::Modified);
        assert_eq!(modified.previous_hash, Some(ContentId::new("old")));
        assert_eq!(modified.current_hash, Some(ContentId::new("new")));

        let deleted = by_path["removed.rs"];
        assert_eq!(deleted.change_type, ChangeType::Deleted);
        assert_eq!(deleted.previous_hash, Some(ContentId::new("gone")));

        assert!(!by_path.contains_key("kept.rs"));
    }

    #[test]
    fn test_module_modified_on_content_change() {
        let previous = snapshot(
            "parent",
            vec![file("a.service.ts", "old", 10)],
            vec![module("Services", &["a.service.ts"])],
        );
        let current = snapshot(
            "head",
            vec![file("a.service.ts", "new", 12)],
            vec![module("Services", &["a.service.ts"])],
        );

        let diff = DifferentialEngine::diff(&current, &previous);
        assert_eq!(diff.module_changes.len(), 1);
        let change = &diff.module_changes[0];
        assert_eq!(change.change_type, ChangeType::Modified);
        assert_eq!(change.affected_files, vec!["a.service.ts"]);
    }

    #[test]
    fn test_module_modified_on_membership_change_only() {
        // Membership shrinks without any file content changing.
        let previous = snapshot(
            "parent",
            vec![file("a.rs", "h1", 10), file("b.rs", "h2", 20)],
            vec![module("Core", &["a.rs", "b.rs"])],
        );
        let current = snapshot(
            "head",
            vec![file("a.rs", "h1", 10), file("b.rs", "h2", 20)],
            vec![module("Core", &["a.rs"])],
        );

        let diff = DifferentialEngine::diff(&current, &previous);
        assert!(diff.changes.is_empty());
        assert_eq!(diff.module_changes.len(), 1);
        let change = &diff.module_changes[0];
        assert_eq!(change.change_type, ChangeType::Modified);
        assert_eq!(change.affected_files, vec!["b.rs"]);
    }

    #[test]
    fn test_module_added_and_deleted() {
        let previous = snapshot(
            "parent",
            vec![file("old.util.ts", "h1", 10)],
            vec![module("Utilities", &["old.util.ts"])],
        );
        let current = snapshot(
            "head",
            vec![file("a.service.ts", "h2", 20)],
            vec![module("Services", &["a.service.ts"])],
        );

        let diff = DifferentialEngine::diff(&current, &previous);
        assert_eq!(diff.module_changes.len(), 2);

        let added = diff
            .module_changes
            .iter()
            .find(|c| c.module_id == ModuleId::from_rule_name("Services"))
            .unwrap();
        assert_eq!(added.change_type, ChangeType::Added);
        assert_eq!(added.affected_files, vec!["a.service.ts"]);

        let deleted = diff
            .module_changes
            .iter()
            .find(|c| c.module_id == ModuleId::from_rule_name("Utilities"))
            .unwrap();
        assert_eq!(deleted.change_type, ChangeType::Deleted);
        assert_eq!(deleted.affected_files, vec!["old.util.ts"]);
    }

    #[test]
    fn test_unchanged_module_emits_nothing() {
        let shared = vec![file("a.service.ts", "h1", 10)];
        let previous = snapshot("parent", shared.clone(), vec![module("Services", &["a.service.ts"])]);
        let current = snapshot("head", shared, vec![module("Services", &["a.service.ts"])]);

        let diff = DifferentialEngine::diff(&current, &previous);
        assert!(diff.module_changes.is_empty());
    }
}

//! Pattern-based module classification.
//!
//! Membership is a sparse many-to-many relation: a file may satisfy
//! zero, one, or several rules, and a rule with no matches produces no
//! module.

use std::collections::HashMap;

use compact_str::CompactString;
use globset::{Glob, GlobMatcher};

use repolens_core::{AnalyzeError, FileNode, Module, ModuleId, NodeStatus};

/// One ordered classification rule: a glob pattern mapping matching
/// paths into a named module.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    /// Module name this rule feeds.
    pub name: CompactString,
    /// Source glob pattern.
    pub pattern: String,
    matcher: GlobMatcher,
}

impl ClassificationRule {
    /// Create a rule. Invalid glob syntax is a validation error.
    pub fn new(name: impl Into<CompactString>, pattern: impl Into<String>) -> Result<Self, AnalyzeError> {
        let pattern = pattern.into();
        let matcher = Glob::new(&pattern)
            .map_err(|e| {
                AnalyzeError::validation(format!("invalid classification pattern {pattern:?}: {e}"))
            })?
            .compile_matcher();
        Ok(Self {
            name: name.into(),
            pattern,
            matcher,
        })
    }

    /// Check whether a repository-relative path satisfies this rule.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }
}

/// The default rule set, matching common source-layout conventions.
pub fn default_rules() -> Vec<ClassificationRule> {
    [
        ("Services", "*.service.*"),
        ("Controllers", "*.controller.*"),
        ("Models", "*.model.*"),
        ("Utilities", "*.util.*"),
        ("Tests", "*.{test,spec}.*"),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        ClassificationRule::new(name, pattern).expect("default patterns are valid")
    })
    .collect()
}

#[derive(Debug, Default)]
struct Bucket {
    paths: Vec<CompactString>,
    total_size: u64,
}

/// Incremental classifier accumulating module membership across crawl
/// batches.
#[derive(Debug)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
    buckets: HashMap<CompactString, Bucket>,
    membership: HashMap<CompactString, Vec<CompactString>>,
}

impl Classifier {
    /// Create a classifier over an ordered rule list.
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self {
            rules,
            buckets: HashMap::new(),
            membership: HashMap::new(),
        }
    }

    /// Classify one batch of files, stamping `module_ids` on each node
    /// and accumulating per-module membership.
    pub fn classify(&mut self, batch: &mut [FileNode]) {
        for node in batch {
            if !node.is_file() {
                continue;
            }
            for rule in &self.rules {
                if !rule.matches(&node.path) {
                    continue;
                }
                let module_id: CompactString = ModuleId::from_rule_name(&rule.name).0;
                if !node.module_ids.contains(&module_id) {
                    node.module_ids.push(module_id.clone());
                }

                let bucket = self.buckets.entry(rule.name.clone()).or_default();
                if !bucket.paths.contains(&node.path) {
                    bucket.paths.push(node.path.clone());
                    bucket.total_size += node.size;
                    self.membership
                        .entry(node.path.clone())
                        .or_default()
                        .push(module_id);
                }
            }
        }
    }

    /// Stamp accumulated membership onto an assembled tree.
    ///
    /// The crawler yields batches of detached file clones; this carries
    /// the classification over to the owned snapshot tree.
    pub fn apply(&self, roots: &mut [FileNode]) {
        for root in roots {
            root.walk_mut(&mut |node| {
                if let Some(ids) = self.membership.get(&node.path) {
                    node.module_ids = ids.clone();
                }
            });
        }
    }

    /// Emit module records with aggregated metrics, in rule order.
    pub fn finalize(&self) -> Vec<Module> {
        let mut modules = Vec::new();
        for rule in &self.rules {
            let Some(bucket) = self.buckets.get(&rule.name) else {
                continue;
            };
            let mut module = Module::new(rule.name.clone());
            module.file_paths = bucket.paths.clone();
            module.metrics.file_count = bucket.paths.len() as u64;
            module.metrics.total_size = bucket.total_size;
            // Placeholder until dependency-graph scoring lands.
            module.metrics.complexity = bucket.paths.len() as f64;
            module.status = NodeStatus::Complete;
            modules.push(module);
        }
        modules
    }
}

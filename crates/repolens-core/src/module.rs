//! Logical module grouping of classified files.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::node::NodeStatus;

/// Deterministic module identity derived from a classification rule name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId(pub CompactString);

impl ModuleId {
    /// Derive the identity for a rule name: lowercased, with runs of
    /// non-alphanumeric characters collapsed to single dashes.
    pub fn from_rule_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut last_dash = true;
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
                last_dash = false;
            } else if !last_dash {
                slug.push('-');
                last_dash = true;
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        Self(slug.into())
    }

    /// Get the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregated metrics for a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleMetrics {
    /// Number of files in the module.
    pub file_count: u64,
    /// Total size of member files in bytes.
    pub total_size: u64,
    /// Complexity score. Currently a file-count placeholder until
    /// dependency-graph scoring lands.
    pub complexity: f64,
}

/// A named grouping of files matched by a classification rule.
///
/// `file_paths` are weak back-references into the snapshot tree; the
/// tree owns the nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Deterministic identity derived from the rule name.
    pub id: ModuleId,
    /// Human-readable module name (the rule name).
    pub name: CompactString,
    /// Paths of member files, in discovery order.
    pub file_paths: Vec<CompactString>,
    /// Aggregated metrics.
    pub metrics: ModuleMetrics,
    /// Analysis status.
    pub status: NodeStatus,
}

impl Module {
    /// Create an empty module for a rule name.
    pub fn new(name: impl Into<CompactString>) -> Self {
        let name = name.into();
        Self {
            id: ModuleId::from_rule_name(&name),
            name,
            file_paths: Vec::new(),
            metrics: ModuleMetrics::default(),
            status: NodeStatus::Pending,
        }
    }

    /// Number of member files.
    pub fn file_count(&self) -> usize {
        self.file_paths.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_slug() {
        assert_eq!(ModuleId::from_rule_name("Services").as_str(), "services");
        assert_eq!(
            ModuleId::from_rule_name("API Controllers").as_str(),
            "api-controllers"
        );
        assert_eq!(ModuleId::from_rule_name("--Utils--").as_str(), "utils");
    }

    #[test]
    fn test_module_id_deterministic() {
        assert_eq!(
            ModuleId::from_rule_name("Services"),
            ModuleId::from_rule_name("Services")
        );
    }

    #[test]
    fn test_new_module() {
        let module = Module::new("Services");
        assert_eq!(module.id.as_str(), "services");
        assert_eq!(module.file_count(), 0);
        assert_eq!(module.status, NodeStatus::Pending);
    }
}

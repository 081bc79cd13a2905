//! File and directory node types for analyzed repository trees.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Content identity of a node as reported by the remote host
/// (typically a blob or tree hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub CompactString);

impl ContentId {
    /// Create a new ContentId.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    /// Get the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type of repository tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl NodeKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File)
    }
}

/// Analysis status of a node or module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    /// Discovered but not yet processed.
    Pending,
    /// Currently being processed.
    Analyzing,
    /// Fully processed.
    Complete,
    /// Processing failed.
    Error,
}

/// A single file or directory in an analyzed repository tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    /// Content identity from the remote host.
    pub id: ContentId,

    /// Repository-relative path, unique within a snapshot.
    pub path: CompactString,

    /// File/directory name (final path segment).
    pub name: CompactString,

    /// Node type.
    pub kind: NodeKind,

    /// Size in bytes (aggregate for directories).
    pub size: u64,

    /// Names of modules this node belongs to (possibly empty,
    /// possibly several).
    pub module_ids: Vec<CompactString>,

    /// Paths this node depends on.
    pub dependencies: Vec<CompactString>,

    /// Children nodes (directories only), in discovery order.
    pub children: Vec<FileNode>,

    /// Analysis status.
    pub status: NodeStatus,
}

impl FileNode {
    /// Create a new file node, marked complete on discovery.
    pub fn new_file(
        id: ContentId,
        path: impl Into<CompactString>,
        size: u64,
    ) -> Self {
        let path = path.into();
        let name = basename(&path);
        Self {
            id,
            path,
            name,
            kind: NodeKind::File,
            size,
            module_ids: Vec::new(),
            dependencies: Vec::new(),
            children: Vec::new(),
            status: NodeStatus::Complete,
        }
    }

    /// Create a new directory node, pending until its subtree is crawled.
    pub fn new_directory(id: ContentId, path: impl Into<CompactString>) -> Self {
        let path = path.into();
        let name = basename(&path);
        Self {
            id,
            path,
            name,
            kind: NodeKind::Directory,
            size: 0,
            module_ids: Vec::new(),
            dependencies: Vec::new(),
            children: Vec::new(),
            status: NodeStatus::Pending,
        }
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Count leaf files in this subtree (1 for files).
    pub fn file_count(&self) -> u64 {
        match self.kind {
            NodeKind::File => 1,
            NodeKind::Directory => self.children.iter().map(FileNode::file_count).sum(),
        }
    }

    /// Aggregate size of this subtree.
    pub fn total_size(&self) -> u64 {
        match self.kind {
            NodeKind::File => self.size,
            NodeKind::Directory => self.children.iter().map(FileNode::total_size).sum(),
        }
    }

    /// Seal a directory after its children were attached: aggregate
    /// size and mark complete.
    pub fn seal(&mut self) {
        if self.kind.is_dir() {
            self.size = self.children.iter().map(|c| c.size).sum();
            self.status = NodeStatus::Complete;
        }
    }

    /// Visit every node in this subtree depth-first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a FileNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Visit every node in this subtree depth-first, mutably.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut FileNode)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }
}

fn basename(path: &str) -> CompactString {
    path.rsplit('/').next().unwrap_or(path).into()
}

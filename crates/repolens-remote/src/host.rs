//! Remote hosting API collaborator interface.

use std::future::Future;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use repolens_core::{AnalyzeError, ContentId, NodeKind};

/// One directory entry returned by the remote host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Content identity (blob/tree hash).
    pub id: ContentId,
    /// Repository-relative path.
    pub path: CompactString,
    /// Entry type.
    pub kind: NodeKind,
    /// Size in bytes (zero for directories).
    pub size: u64,
}

/// One page of directory entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryPage {
    /// Entries in remote listing order.
    pub entries: Vec<DirectoryEntry>,
    /// Whether further pages exist for this directory.
    pub has_more: bool,
}

/// Repository metadata from the remote host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    /// Default branch name.
    pub default_branch: CompactString,
    /// Head commit of the default branch.
    pub head_commit: CompactString,
    /// Approximate number of tree entries, when the host reports one.
    pub approximate_entries: Option<u64>,
}

/// Remote hosting API used by the crawler.
///
/// Pagination and page size are caller-controlled; `page` is zero-based.
/// Futures are `Send` so crawls can run inside spawned tasks.
pub trait RemoteHost: Send + Sync + 'static {
    /// List one page of a directory's entries.
    fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        page: u32,
        page_size: usize,
    ) -> impl Future<Output = Result<DirectoryPage, AnalyzeError>> + Send;

    /// Fetch repository metadata.
    fn repository_metadata(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<RepositoryMetadata, AnalyzeError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_page_default() {
        let page = DirectoryPage::default();
        assert!(page.entries.is_empty());
        assert!(!page.has_more);
    }
}

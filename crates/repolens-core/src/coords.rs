//! Repository coordinates and analysis identity.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;

/// Identity of one analysis: `owner/repo@commit`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisId(pub CompactString);

impl AnalysisId {
    /// Create a new AnalysisId from its string form.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    /// Get the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coordinates of a remote repository at a specific commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoCoordinates {
    /// Owner or organization name.
    pub owner: CompactString,
    /// Repository name.
    pub repo: CompactString,
    /// Commit identifier to analyze.
    pub commit: CompactString,
}

impl RepoCoordinates {
    /// Create coordinates without validating them.
    pub fn new(
        owner: impl Into<CompactString>,
        repo: impl Into<CompactString>,
        commit: impl Into<CompactString>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            commit: commit.into(),
        }
    }

    /// Validate all segments. Malformed coordinates are fatal before
    /// any crawl is attempted.
    pub fn validate(&self) -> Result<(), AnalyzeError> {
        validate_segment("owner", &self.owner)?;
        validate_segment("repo", &self.repo)?;
        validate_segment("commit", &self.commit)?;
        Ok(())
    }

    /// Repository key without the commit, `owner/repo`.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Derive the analysis identity for these coordinates.
    pub fn analysis_id(&self) -> AnalysisId {
        AnalysisId::new(format!("{}/{}@{}", self.owner, self.repo, self.commit))
    }
}

fn validate_segment(field: &str, value: &str) -> Result<(), AnalyzeError> {
    if value.is_empty() {
        return Err(AnalyzeError::validation(format!("{field} cannot be empty")));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(AnalyzeError::validation(format!(
            "{field} contains illegal characters: {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let coords = RepoCoordinates::new("acme", "app", "abc123");
        assert!(coords.validate().is_ok());
        assert_eq!(coords.repository(), "acme/app");
        assert_eq!(coords.analysis_id().as_str(), "acme/app@abc123");
    }

    #[test]
    fn test_empty_segment_rejected() {
        let coords = RepoCoordinates::new("", "app", "abc123");
        assert!(matches!(
            coords.validate(),
            Err(AnalyzeError::Validation { .. })
        ));
    }

    #[test]
    fn test_illegal_characters_rejected() {
        let coords = RepoCoordinates::new("acme", "app/../etc", "abc123");
        assert!(matches!(
            coords.validate(),
            Err(AnalyzeError::Validation { .. })
        ));
    }
}

//! Git repository wrapper over git2.

use std::path::Path;

use anyhow::{Context, Result};
use git2::{Repository, Status};

use crate::config::ProjectConfig;
use crate::validate::{
    extract_version, latest_changelog_version, ChangeKind, CommitCandidate, StagedFile,
};

/// Git repository wrapper.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open repository at specified path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Not in a git repository")?;

        Ok(Self { repo })
    }

    /// Lists files staged in the index, with their change kinds.
    ///
    /// Only index-side status matters here: unstaged worktree edits are not
    /// part of the commit under validation.
    pub fn staged_files(&self) -> Result<Vec<StagedFile>> {
        let statuses = self
            .repo
            .statuses(None)
            .context("Failed to get repository status")?;

        let mut staged = Vec::new();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            let Some(kind) = staged_change_kind(entry.status()) else {
                continue;
            };
            staged.push(StagedFile {
                path: path.to_string(),
                kind,
            });
        }

        Ok(staged)
    }

    /// Reads the staged (index) content of a file, if present in the index.
    pub fn staged_content(&self, path: &str) -> Result<Option<String>> {
        let index = self.repo.index().context("Failed to read git index")?;
        let Some(entry) = index.get_path(Path::new(path), 0) else {
            return Ok(None);
        };
        let blob = self
            .repo
            .find_blob(entry.id)
            .with_context(|| format!("Failed to read staged blob for {path}"))?;
        Ok(Some(String::from_utf8_lossy(blob.content()).to_string()))
    }

    /// Get current branch name.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head().context("Failed to get HEAD reference")?;

        if let Some(name) = head.shorthand() {
            if name != "HEAD" {
                return Ok(name.to_string());
            }
        }

        anyhow::bail!("Repository is in detached HEAD state")
    }
}

/// Maps index-side status flags to a change kind; worktree-only status
/// yields `None`.
fn staged_change_kind(flags: Status) -> Option<ChangeKind> {
    if flags.contains(Status::INDEX_NEW) {
        Some(ChangeKind::Added)
    } else if flags.contains(Status::INDEX_MODIFIED)
        || flags.contains(Status::INDEX_RENAMED)
        || flags.contains(Status::INDEX_TYPECHANGE)
    {
        Some(ChangeKind::Modified)
    } else if flags.contains(Status::INDEX_DELETED) {
        Some(ChangeKind::Deleted)
    } else {
        None
    }
}

/// Builds the commit candidate for a validation run.
///
/// Staged version and changelog values are pre-extracted here so the checks
/// themselves never touch git.
pub fn build_candidate(repo: &GitRepository, config: &ProjectConfig) -> Result<CommitCandidate> {
    let files = repo.staged_files()?;

    let mut candidate = CommitCandidate {
        files,
        version_file_value: None,
        changelog_version: None,
    };

    if candidate.is_staged(&config.version_file) {
        if let Some(content) = repo.staged_content(&config.version_file)? {
            candidate.version_file_value = extract_version(&content, &config.version_pattern);
        }
    }
    if candidate.is_staged(&config.changelog) {
        if let Some(content) = repo.staged_content(&config.changelog)? {
            candidate.changelog_version = latest_changelog_version(&content);
        }
    }

    Ok(candidate)
}

//! Doc-set discovery.
//!
//! Discovery is a fresh recursive scan of the documentation tree on every
//! invocation; nothing is persisted. A directory qualifies as a doc-set
//! solely by directly containing the mapping document.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::mapping::{parse_map_document, FileMapping};
use super::{DocsError, BUG_PATTERNS_DOC, INVARIANTS_DOC, MAP_DOC};

/// A documentation directory owning a mapping table.
#[derive(Debug, Clone)]
pub struct DocSet {
    /// Absolute directory path.
    pub path: PathBuf,
    /// Directory path relative to the project root, `/`-separated, for
    /// display and deterministic ordering (e.g. `docs/api`).
    pub rel_path: String,
    /// Parsed mapping rows. Empty when the document is missing or malformed.
    pub mappings: Vec<FileMapping>,
}

impl DocSet {
    /// Absolute path of the mapping document.
    pub fn map_doc_path(&self) -> PathBuf {
        self.path.join(MAP_DOC)
    }

    /// Absolute path of the sibling invariants document.
    pub fn invariants_path(&self) -> PathBuf {
        self.path.join(INVARIANTS_DOC)
    }

    /// Absolute path of the sibling bug-patterns document.
    pub fn bug_patterns_path(&self) -> PathBuf {
        self.path.join(BUG_PATTERNS_DOC)
    }

    /// Repo-relative path of a sibling document, for staged-set comparison.
    pub fn sibling_rel(&self, name: &str) -> String {
        if self.rel_path.is_empty() || self.rel_path == "." {
            name.to_string()
        } else {
            format!("{}/{}", self.rel_path, name)
        }
    }

    /// Repo-relative path of the invariants document.
    pub fn invariants_rel(&self) -> String {
        self.sibling_rel(INVARIANTS_DOC)
    }
}

/// Discovers all doc-sets under the documentation root.
///
/// Results are sorted by relative path so downstream precedence is stable
/// across platforms and runs. A legacy root-level mapping document (outside
/// the documentation tree) is still recognized as one additional doc-set
/// rooted at the project root; this layout is deprecated and warns.
pub fn discover(project_root: &Path, docs_root: &Path) -> Result<Vec<DocSet>, DocsError> {
    let mut doc_sets = Vec::new();

    if docs_root.is_dir() {
        walk(project_root, docs_root, &mut doc_sets)?;
    } else {
        debug!("documentation root {} does not exist", docs_root.display());
    }

    let legacy_map = project_root.join(MAP_DOC);
    if legacy_map.is_file() {
        warn!(
            "root-level {MAP_DOC} is deprecated; move it into the documentation tree ({})",
            docs_root.display()
        );
        doc_sets.push(load_doc_set(project_root, project_root)?);
    }

    doc_sets.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(doc_sets)
}

/// Recursively collects doc-sets below `dir`.
fn walk(project_root: &Path, dir: &Path, out: &mut Vec<DocSet>) -> Result<(), DocsError> {
    if dir.join(MAP_DOC).is_file() {
        out.push(load_doc_set(project_root, dir)?);
    }

    let entries = fs::read_dir(dir).map_err(|source| DocsError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| DocsError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk(project_root, &path, out)?;
        }
    }
    Ok(())
}

/// Loads one doc-set, degrading to zero mappings on a malformed document.
fn load_doc_set(project_root: &Path, dir: &Path) -> Result<DocSet, DocsError> {
    let map_path = dir.join(MAP_DOC);
    let content = fs::read_to_string(&map_path).map_err(|source| DocsError::Io {
        path: map_path.clone(),
        source,
    })?;
    let mappings = parse_map_document(&content);
    if mappings.is_empty() {
        debug!("{} contains no parseable mapping rows", map_path.display());
    }

    let rel_path = dir
        .strip_prefix(project_root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| dir.to_string_lossy().to_string());

    Ok(DocSet {
        path: dir.to_path_buf(),
        rel_path,
        mappings,
    })
}

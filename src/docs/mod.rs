//! Documentation sets: discovery, mapping tables, invariants, tier lookup.
//!
//! A doc-set is a directory that directly contains a mapping document
//! ([`MAP_DOC`]). The mapping document's table rows assign enforcement tiers
//! to repo-relative code paths; sibling documents ([`INVARIANTS_DOC`],
//! [`BUG_PATTERNS_DOC`]) are referenced by convention.

use std::path::PathBuf;

pub mod docset;
pub mod invariants;
pub mod mapping;
pub mod tier;

pub use docset::{discover, DocSet};
pub use invariants::parse_invariants_document;
pub use mapping::{parse_map_document, FileMapping, Tier};
pub use tier::{MapClaim, TierIndex, TierLookup, TierResolution};

/// Fixed name of the file-to-tier mapping document.
pub const MAP_DOC: &str = "CODE_DOC_MAP.md";

/// Fixed name of the invariants document, sibling of the mapping document.
pub const INVARIANTS_DOC: &str = "INVARIANTS.md";

/// Fixed name of the bug-patterns document, sibling of the mapping document.
pub const BUG_PATTERNS_DOC: &str = "BUG_PATTERNS.md";

/// Errors from the documentation layer.
///
/// Only genuine I/O failures surface here; missing or malformed documents
/// degrade to empty doc-sets so partially-written documentation never takes
/// the commit gate down.
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// The filesystem could not be read. Fatal for the invocation: failing
    /// open on unreadable state would defeat the gate's purpose.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Normalizes a repo-relative path for lookup.
///
/// Trims whitespace, strips a leading `./`, and converts backslashes so the
/// same file staged on different platforms resolves identically.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().replace('\\', "/");
    trimmed.strip_prefix("./").unwrap_or(&trimmed).to_string()
}

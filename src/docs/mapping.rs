//! Mapping-document parsing.
//!
//! The mapping document is a markdown table whose rows look like:
//!
//! ```text
//! | `src/api/auth.py` | Tier A | Token validation | INV-001, INV-003 |
//! ```
//!
//! The text format is fragile by nature, so this module is the only place
//! that touches it; everything downstream works off typed [`FileMapping`]
//! values. Rows that cannot be parsed contribute no mapping and are reported
//! at debug level, never as errors.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::normalize_path;

/// Enforcement tier assigned to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Critical: changes block the commit unless the owning invariants
    /// document is staged with them.
    A,
    /// Important: advisory enforcement.
    B,
    /// Standard: mapped for context, no enforcement.
    C,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::A => write!(f, "A"),
            Tier::B => write!(f, "B"),
            Tier::C => write!(f, "C"),
        }
    }
}

/// One row of a mapping document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMapping {
    /// Repo-relative path, normalized.
    pub path: String,
    /// Assigned tier. A row with a path but no tier token maps at tier C.
    pub tier: Tier,
    /// Free-text description from the row.
    pub description: String,
    /// Invariant identifiers cited in the row.
    pub invariant_ids: Vec<String>,
}

fn path_cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\|\s*`([^`]+)`\s*\|(.*)$").expect("static regex"))
}

fn tier_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Matches "Tier A", "tier-b", or a lone "C" cell.
    RE.get_or_init(|| {
        Regex::new(r"(?i)\btier[\s_-]*([abc])\b|^\s*([abc])\s*$").expect("static regex")
    })
}

fn invariant_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z][A-Z0-9]*-\d+)\b").expect("static regex"))
}

/// Parses a mapping document into typed file mappings.
///
/// A row only counts when its first cell is a backtick-delimited path; the
/// path must later match the queried file exactly, so loose basename matching
/// never happens here or downstream. Header and separator rows have no
/// backtick cell and fall out naturally.
pub fn parse_map_document(content: &str) -> Vec<FileMapping> {
    let mut mappings = Vec::new();

    for line in content.lines() {
        let Some(caps) = path_cell_re().captures(line) else {
            continue;
        };
        let path = normalize_path(&caps[1]);
        if path.is_empty() {
            continue;
        }
        let rest = &caps[2];
        let cells: Vec<&str> = rest.split('|').map(str::trim).collect();

        let tier = cells
            .iter()
            .find_map(|cell| parse_tier_token(cell))
            .unwrap_or(Tier::C);

        // Description is the first cell that is neither a tier token nor an
        // invariant list.
        let description = cells
            .iter()
            .find(|cell| {
                !cell.is_empty()
                    && parse_tier_token(cell).is_none()
                    && !is_invariant_list(cell)
            })
            .unwrap_or(&"")
            .to_string();

        let invariant_ids = invariant_id_re()
            .captures_iter(rest)
            .map(|c| c[1].to_string())
            .collect();

        mappings.push(FileMapping {
            path,
            tier,
            description,
            invariant_ids,
        });
    }

    mappings
}

/// Parses a tier token from a table cell (case-insensitive).
fn parse_tier_token(cell: &str) -> Option<Tier> {
    let caps = tier_token_re().captures(cell)?;
    let letter = caps.get(1).or_else(|| caps.get(2))?.as_str();
    match letter.to_ascii_lowercase().as_str() {
        "a" => Some(Tier::A),
        "b" => Some(Tier::B),
        "c" => Some(Tier::C),
        _ => None,
    }
}

/// Whether a cell consists solely of invariant identifiers and separators.
fn is_invariant_list(cell: &str) -> bool {
    !cell.is_empty()
        && invariant_id_re().is_match(cell)
        && invariant_id_re().replace_all(cell, "").trim_matches([',', ' ', ';']).is_empty()
}

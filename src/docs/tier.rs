//! Tier resolution over all discovered doc-sets.
//!
//! The mapping tables are folded into a typed in-memory index once per run;
//! lookups never re-read or re-parse documents. Precedence between doc-sets
//! that claim the same file is an explicit policy function, not an artifact
//! of filesystem traversal order.

use std::collections::HashMap;

use serde::Serialize;

use super::docset::DocSet;
use super::mapping::Tier;
use super::normalize_path;

/// One doc-set's claim on a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapClaim {
    /// Claiming doc-set, as a repo-relative directory path.
    pub doc_set: String,
    /// Tier the doc-set assigns.
    pub tier: Tier,
    /// Repo-relative path of the doc-set's invariants document.
    pub invariants_doc: String,
    /// Row description.
    pub description: String,
    /// Invariant identifiers cited in the row.
    pub invariant_ids: Vec<String>,
}

/// Outcome of resolving a file path against the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TierResolution {
    /// No doc-set references the path.
    Unmapped,
    /// Exactly one authoritative claim (after precedence).
    Mapped(MapClaim),
    /// Multiple doc-sets disagree on non-A tiers. Never silently resolved;
    /// the validator surfaces this as a block.
    Conflict(Vec<MapClaim>),
}

/// Resolved-tier lookup, the only seam the commit validator depends on.
pub trait TierLookup {
    /// Resolves a repo-relative path to its tier claim(s).
    fn resolve(&self, path: &str) -> TierResolution;
}

/// In-memory index from normalized path to every doc-set claim on it.
#[derive(Debug, Default)]
pub struct TierIndex {
    entries: HashMap<String, Vec<MapClaim>>,
}

impl TierIndex {
    /// Builds the index from discovered doc-sets.
    ///
    /// Claims preserve the doc-sets' sorted order, which is what the
    /// precedence policy uses to break same-tier ties.
    pub fn build(doc_sets: &[DocSet]) -> Self {
        let mut entries: HashMap<String, Vec<MapClaim>> = HashMap::new();
        for doc_set in doc_sets {
            for mapping in &doc_set.mappings {
                entries
                    .entry(normalize_path(&mapping.path))
                    .or_default()
                    .push(MapClaim {
                        doc_set: doc_set.rel_path.clone(),
                        tier: mapping.tier,
                        invariants_doc: doc_set.invariants_rel(),
                        description: mapping.description.clone(),
                        invariant_ids: mapping.invariant_ids.clone(),
                    });
            }
        }
        Self { entries }
    }

    /// Number of distinct mapped paths.
    pub fn mapped_count(&self) -> usize {
        self.entries.len()
    }
}

impl TierLookup for TierIndex {
    fn resolve(&self, path: &str) -> TierResolution {
        match self.entries.get(&normalize_path(path)) {
            None => TierResolution::Unmapped,
            Some(claims) => apply_precedence(claims),
        }
    }
}

/// The tie-breaking policy for multiple claims on one path.
///
/// - Any tier-A claim wins: enforcement fails toward the stricter tier.
///   Among several A claims the lexicographically-first doc-set path is
///   authoritative.
/// - All claims agreeing on one tier: that tier, lexicographically-first
///   doc-set authoritative.
/// - Differing non-A tiers: a conflict. Which tier should win is genuinely
///   unclear (inconsistent documentation ownership), so it is reported, not
///   resolved.
pub fn apply_precedence(claims: &[MapClaim]) -> TierResolution {
    match claims {
        [] => TierResolution::Unmapped,
        [single] => TierResolution::Mapped(single.clone()),
        _ => {
            if let Some(a_claim) = claims
                .iter()
                .filter(|c| c.tier == Tier::A)
                .min_by(|x, y| x.doc_set.cmp(&y.doc_set))
            {
                return TierResolution::Mapped(a_claim.clone());
            }
            let first_tier = claims[0].tier;
            if claims.iter().all(|c| c.tier == first_tier) {
                let authoritative = claims
                    .iter()
                    .min_by(|x, y| x.doc_set.cmp(&y.doc_set))
                    .expect("claims is non-empty");
                return TierResolution::Mapped(authoritative.clone());
            }
            TierResolution::Conflict(claims.to_vec())
        }
    }
}

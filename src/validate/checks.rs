//! The ordered commit checks.
//!
//! Each check is a free function over a [`CommitCandidate`] and a
//! [`TierLookup`], so every one is independently testable without a git
//! repository. Order affects reported messages only, not correctness.

use crate::config::{CheckPolicies, ProjectConfig};
use crate::docs::{TierLookup, TierResolution};

use super::{CheckLevel, CheckOutcome, CheckResult, CommitCandidate, ValidationReport};

/// Runs the full ordered check list and assembles the report.
pub fn run_checks(
    candidate: &CommitCandidate,
    lookup: &dyn TierLookup,
    config: &ProjectConfig,
) -> ValidationReport {
    let policies = &config.checks;
    ValidationReport::new(vec![
        check_tier_a_citation(candidate, lookup, policies.tier_a_citation),
        check_duplicate_ownership(candidate, lookup, policies.duplicate_ownership),
        check_version_changelog(
            candidate,
            &config.version_file,
            &config.changelog,
            policies.version_mismatch,
            policies.changelog_missing,
        ),
        check_blast_radius(candidate, policies),
    ])
}

/// Tier-A citation: every staged tier-A file requires the owning doc-set's
/// invariants document in the same staged set.
pub fn check_tier_a_citation(
    candidate: &CommitCandidate,
    lookup: &dyn TierLookup,
    level: CheckLevel,
) -> CheckResult {
    const NAME: &str = "tier-a-citation";
    if level == CheckLevel::Off {
        return CheckResult::pass(NAME);
    }

    let mut messages = Vec::new();
    for file in &candidate.files {
        let TierResolution::Mapped(claim) = lookup.resolve(&file.path) else {
            continue;
        };
        if claim.tier != crate::docs::Tier::A {
            continue;
        }
        if !candidate.is_staged(&claim.invariants_doc) {
            messages.push(format!(
                "{} is Tier A (owned by {}): update and stage {} in the same commit",
                file.path,
                display_doc_set(&claim.doc_set),
                claim.invariants_doc,
            ));
        }
    }

    finish(NAME, messages, level)
}

/// Duplicate ownership: a staged file claimed by multiple doc-sets at
/// differing non-A tiers indicates genuinely inconsistent ownership.
pub fn check_duplicate_ownership(
    candidate: &CommitCandidate,
    lookup: &dyn TierLookup,
    level: CheckLevel,
) -> CheckResult {
    const NAME: &str = "duplicate-ownership";
    if level == CheckLevel::Off {
        return CheckResult::pass(NAME);
    }

    let mut messages = Vec::new();
    for file in &candidate.files {
        let TierResolution::Conflict(claims) = lookup.resolve(&file.path) else {
            continue;
        };
        let claimants: Vec<String> = claims
            .iter()
            .map(|c| format!("{} (tier {})", display_doc_set(&c.doc_set), c.tier))
            .collect();
        messages.push(format!(
            "{} has conflicting tier claims: {}; reconcile the CODE_DOC_MAP.md entries so one doc-set owns it",
            file.path,
            claimants.join(" vs "),
        ));
    }

    finish(NAME, messages, level)
}

/// Version/changelog consistency: a staged version file requires a staged
/// changelog whose latest recorded version matches the new value.
pub fn check_version_changelog(
    candidate: &CommitCandidate,
    version_file: &str,
    changelog: &str,
    mismatch_level: CheckLevel,
    missing_level: CheckLevel,
) -> CheckResult {
    const NAME: &str = "version-changelog";
    if mismatch_level == CheckLevel::Off && missing_level == CheckLevel::Off {
        return CheckResult::pass(NAME);
    }
    if !candidate.is_staged(version_file) {
        return CheckResult::pass(NAME);
    }

    if !candidate.is_staged(changelog) {
        let message = format!(
            "{version_file} is staged but {changelog} is not: record the release in {changelog} and stage it",
        );
        return finish(NAME, vec![message], missing_level);
    }

    let message = match (&candidate.version_file_value, &candidate.changelog_version) {
        (Some(version), Some(recorded)) if version == recorded => None,
        (Some(version), Some(recorded)) => Some(format!(
            "{version_file} declares {version} but the latest entry in {changelog} is {recorded}: add a {version} entry to {changelog}",
        )),
        (None, _) => Some(format!(
            "could not extract a version from staged {version_file}: check the configured version pattern",
        )),
        (_, None) => Some(format!(
            "no parseable version heading in staged {changelog}: add an entry like '## [x.y.z]'",
        )),
    };

    match message {
        Some(m) => finish(NAME, vec![m], mismatch_level),
        None => CheckResult::pass(NAME),
    }
}

/// Blast radius: warns when a commit touches more files than the threshold.
/// Purely informational and never blocks, regardless of configuration.
pub fn check_blast_radius(candidate: &CommitCandidate, policies: &CheckPolicies) -> CheckResult {
    const NAME: &str = "blast-radius";
    if policies.blast_radius == CheckLevel::Off {
        return CheckResult::pass(NAME);
    }

    let count = candidate.files.len();
    let threshold = policies.blast_radius_threshold;
    if count <= threshold {
        return CheckResult::pass(NAME);
    }

    CheckResult {
        check: NAME,
        outcome: CheckOutcome::Warn,
        messages: vec![format!(
            "{count} files staged exceeds the blast-radius threshold of {threshold}: consider splitting this commit",
        )],
    }
}

/// Maps collected violations to a result at the configured level.
fn finish(name: &'static str, messages: Vec<String>, level: CheckLevel) -> CheckResult {
    if messages.is_empty() {
        return CheckResult::pass(name);
    }
    CheckResult {
        check: name,
        outcome: level.violation_outcome(),
        messages,
    }
}

/// Renders a doc-set path for messages; the legacy root doc-set has an empty
/// relative path.
fn display_doc_set(rel_path: &str) -> &str {
    if rel_path.is_empty() {
        "the project root"
    } else {
        rel_path
    }
}

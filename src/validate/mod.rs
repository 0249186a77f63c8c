//! Commit-time validation types.
//!
//! The validator runs a fixed ordered list of checks over a
//! [`CommitCandidate`]; each check yields PASS, WARN or BLOCK. All checks
//! always run and report — a BLOCK never short-circuits the others — but any
//! BLOCK halts the commit.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub mod checks;

pub use checks::run_checks;

/// Configured enforcement level for a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckLevel {
    /// Check disabled.
    Off,
    /// Violations warn but never halt the commit.
    Warn,
    /// Violations halt the commit.
    Block,
}

impl CheckLevel {
    /// Maps a violation at this level to an outcome.
    pub fn violation_outcome(self) -> CheckOutcome {
        match self {
            CheckLevel::Off => CheckOutcome::Pass,
            CheckLevel::Warn => CheckOutcome::Warn,
            CheckLevel::Block => CheckOutcome::Block,
        }
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    /// No violation.
    Pass,
    /// Advisory violation; commit proceeds.
    Warn,
    /// Violation halts the commit.
    Block,
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Pass => write!(f, "PASS"),
            CheckOutcome::Warn => write!(f, "WARN"),
            CheckOutcome::Block => write!(f, "BLOCK"),
        }
    }
}

/// Result of one check, with user-facing messages.
///
/// Every message states which file, which rule, and what concrete action
/// resolves it.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Stable check name.
    pub check: &'static str,
    /// Outcome.
    pub outcome: CheckOutcome,
    /// One message per violation; empty on PASS.
    pub messages: Vec<String>,
}

impl CheckResult {
    /// A passing result.
    pub fn pass(check: &'static str) -> Self {
        Self {
            check,
            outcome: CheckOutcome::Pass,
            messages: Vec::new(),
        }
    }
}

/// Summary statistics for a validation report.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    /// Total checks executed.
    pub total_checks: usize,
    /// Checks that passed.
    pub passed: usize,
    /// Checks that warned.
    pub warned: usize,
    /// Checks that blocked.
    pub blocked: usize,
}

impl ValidationSummary {
    /// Tallies a summary from check results.
    pub fn from_results(results: &[CheckResult]) -> Self {
        Self {
            total_checks: results.len(),
            passed: results
                .iter()
                .filter(|r| r.outcome == CheckOutcome::Pass)
                .count(),
            warned: results
                .iter()
                .filter(|r| r.outcome == CheckOutcome::Warn)
                .count(),
            blocked: results
                .iter()
                .filter(|r| r.outcome == CheckOutcome::Block)
                .count(),
        }
    }
}

/// Complete validation report for one commit attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Results in execution order.
    pub results: Vec<CheckResult>,
    /// Summary statistics.
    pub summary: ValidationSummary,
}

impl ValidationReport {
    /// Creates a report from ordered check results.
    pub fn new(results: Vec<CheckResult>) -> Self {
        let summary = ValidationSummary::from_results(&results);
        Self { results, summary }
    }

    /// Whether any check blocked the commit.
    #[must_use]
    pub fn blocked(&self) -> bool {
        self.summary.blocked > 0
    }

    /// Process exit code: 0 allowed, 1 blocked.
    pub fn exit_code(&self) -> i32 {
        if self.blocked() {
            1
        } else {
            0
        }
    }
}

/// How a staged file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Newly added to the index.
    Added,
    /// Modified in the index.
    Modified,
    /// Deleted in the index.
    Deleted,
}

/// One staged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    /// Repo-relative path.
    pub path: String,
    /// Change kind.
    pub kind: ChangeKind,
}

/// The staged change set under validation.
///
/// Constructed fresh per validation run from version-control state. Version
/// values are pre-extracted so every check is testable from this value alone,
/// with no dependency on version-control internals.
#[derive(Debug, Clone, Default)]
pub struct CommitCandidate {
    /// Staged files.
    pub files: Vec<StagedFile>,
    /// Version value extracted from the staged version file, when staged.
    pub version_file_value: Option<String>,
    /// Latest version recorded in the staged changelog, when staged.
    pub changelog_version: Option<String>,
}

impl CommitCandidate {
    /// Whether a repo-relative path is part of the staged set.
    pub fn is_staged(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}

/// Extracts a version value from file content using the configured pattern.
///
/// The pattern must contain one capture group; a pattern that fails to
/// compile is reported and treated as no match.
pub fn extract_version(content: &str, pattern: &str) -> Option<String> {
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("invalid version pattern {pattern:?}: {e}");
            return None;
        }
    };
    re.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn changelog_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"##\s*\[([0-9]+(?:\.[0-9]+)*)\]").expect("static regex"))
}

/// Extracts the latest (first) version heading from changelog content.
pub fn latest_changelog_version(content: &str) -> Option<String> {
    changelog_heading_re()
        .captures(content)
        .map(|c| c[1].to_string())
}

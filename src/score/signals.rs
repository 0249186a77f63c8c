//! Signal collection for the confidence score.
//!
//! Signals are read fresh from the working tree on every run. Missing
//! optional documents contribute zeros; only the mapping documents already
//! parsed into doc-sets are required input. Collection never fails a run:
//! unreadable optional inputs degrade with a warning.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use globset::Glob;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::ProjectConfig;
use crate::docs::{parse_invariants_document, DocSet, Tier};

use super::{DefectCounts, ScoreSignals};

/// Defect tracker document, at the project root.
pub const BUG_TRACKER_DOC: &str = "BUG_TRACKER.md";
/// Architecture-decision log, under the documentation root.
pub const DECISIONS_DOC: &str = "DECISIONS.md";
/// Best-practices log, under the documentation root.
pub const BEST_PRACTICES_DOC: &str = "BEST_PRACTICES.md";

/// Collects all scoring signals for the project.
pub fn collect_signals(config: &ProjectConfig, doc_sets: &[DocSet]) -> ScoreSignals {
    let mut signals = ScoreSignals {
        open_defects: read_defect_counts(&config.project_root.join(BUG_TRACKER_DOC)),
        ..ScoreSignals::default()
    };

    let test_names = test_file_names(config);

    for doc_set in doc_sets {
        let invariants = read_optional(&doc_set.invariants_path());
        let defined: HashSet<String> = parse_invariants_document(&invariants)
            .into_iter()
            .collect();

        for mapping in &doc_set.mappings {
            let covered = mapping
                .invariant_ids
                .iter()
                .any(|id| defined.contains(id));
            if covered {
                signals.invariant_covered_files += 1;
            }
            if mapping.tier == Tier::A {
                if !covered {
                    signals.tier_a_missing_invariants += 1;
                }
                if !has_test_coverage(&mapping.path, &test_names) {
                    signals.tier_a_missing_tests += 1;
                }
            }
        }

        signals.bug_patterns += count_entries(&read_optional(&doc_set.bug_patterns_path()));
    }

    let docs_root = config.docs_root_path();
    signals.decisions = count_entries(&read_optional(&docs_root.join(DECISIONS_DOC)));
    signals.best_practices = count_entries(&read_optional(&docs_root.join(BEST_PRACTICES_DOC)));
    signals.stale_documents = count_stale(config, doc_sets);

    signals
}

fn explicit_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""?(P[0-3])"?\s*:\s*(\d+)"#).expect("static regex"))
}

fn row_severity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\|\s*(P[0-3])\s*\|").expect("static regex"))
}

/// Reads open defect counts from the tracker document.
///
/// Two formats are accepted: an explicit summary (`"P0": 2` or `P0: 2`)
/// which wins when present, and otherwise a markdown table with one row per
/// defect whose severity cell is `P0`..`P3`. Rows marked closed, fixed or
/// resolved are skipped. A missing tracker yields zeros.
pub fn read_defect_counts(path: &Path) -> DefectCounts {
    let content = read_optional(path);
    parse_defect_counts(&content)
}

fn parse_defect_counts(content: &str) -> DefectCounts {
    let mut counts = DefectCounts::default();

    let mut explicit = false;
    for cap in explicit_count_re().captures_iter(content) {
        let n: u32 = cap[2].parse().unwrap_or(0);
        add_severity(&mut counts, &cap[1], n);
        explicit = true;
    }
    if explicit {
        return counts;
    }

    for line in content.lines() {
        if !line.trim_start().starts_with('|') {
            continue;
        }
        let upper = line.to_uppercase();
        if upper.contains("CLOSED") || upper.contains("FIXED") || upper.contains("RESOLVED") {
            continue;
        }
        if let Some(cap) = row_severity_re().captures(line) {
            add_severity(&mut counts, &cap[1], 1);
        }
    }
    counts
}

fn add_severity(counts: &mut DefectCounts, severity: &str, n: u32) {
    match severity {
        "P0" => counts.p0 += n,
        "P1" => counts.p1 += n,
        "P2" => counts.p2 += n,
        _ => counts.p3 += n,
    }
}

fn entry_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#{2,3}\s+\S").expect("static regex"))
}

/// Counts entries in a heading-delimited log document.
fn count_entries(content: &str) -> usize {
    entry_heading_re().find_iter(content).count()
}

/// Whether a mapped code path has a matching test file.
///
/// Matching is by file stem: `src/api/auth.py` is covered by any test file
/// whose name contains `auth` (e.g. `test_auth.py`).
fn has_test_coverage(code_path: &str, test_names: &[String]) -> bool {
    let stem = Path::new(code_path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if stem.is_empty() {
        return false;
    }
    test_names.iter().any(|name| name.contains(&stem))
}

/// Collects the file names of all test files matching the configured glob.
fn test_file_names(config: &ProjectConfig) -> Vec<String> {
    let matcher = match Glob::new(&config.test_pattern) {
        Ok(glob) => glob.compile_matcher(),
        Err(e) => {
            warn!("invalid test pattern {:?}: {e}", config.test_pattern);
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    let mut pending = vec![config.project_root.clone()];
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("skipping unreadable directory {}: {e}", dir.display());
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy().to_string();
            if path.is_dir() {
                if !file_name.starts_with('.') && file_name != "target" && file_name != "node_modules" {
                    pending.push(path);
                }
            } else if matcher.is_match(relative_to_root(config, &path)) {
                names.push(file_name);
            }
        }
    }
    names
}

fn relative_to_root(config: &ProjectConfig, path: &Path) -> PathBuf {
    path.strip_prefix(&config.project_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Counts governed documents older than the staleness threshold.
fn count_stale(config: &ProjectConfig, doc_sets: &[DocSet]) -> usize {
    let now = SystemTime::now();
    let days = config.checks.staleness_days;
    let docs_root = config.docs_root_path();

    let mut candidates: Vec<PathBuf> = Vec::new();
    for doc_set in doc_sets {
        candidates.push(doc_set.map_doc_path());
        candidates.push(doc_set.invariants_path());
        candidates.push(doc_set.bug_patterns_path());
    }
    candidates.push(config.changelog_path());
    candidates.push(docs_root.join(DECISIONS_DOC));
    candidates.push(docs_root.join(BEST_PRACTICES_DOC));

    candidates
        .iter()
        .filter(|path| {
            fs::metadata(path)
                .and_then(|m| m.modified())
                .map(|modified| is_stale(modified, now, days))
                .unwrap_or(false)
        })
        .count()
}

/// Whether a modification time is older than `days` before `now`.
fn is_stale(modified: SystemTime, now: SystemTime, days: u32) -> bool {
    match now.duration_since(modified) {
        Ok(age) => age > Duration::from_secs(u64::from(days) * 86_400),
        // Modified in the future: the clock moved, not the document.
        Err(_) => false,
    }
}

fn read_optional(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            warn!("skipping unreadable document {}: {e}", path.display());
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE;
    use crate::docs::{discover, MAP_DOC};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn explicit_defect_summary_wins_over_table() {
        let counts = parse_defect_counts(
            "# Tracker\n\n\"P0\": 2, \"P1\": 5\n\n| id | P0 | OPEN |\n| id | P2 | OPEN |\n",
        );
        assert_eq!(
            counts,
            DefectCounts {
                p0: 2,
                p1: 5,
                p2: 0,
                p3: 0
            }
        );
    }

    #[test]
    fn table_rows_count_open_defects_only() {
        let counts = parse_defect_counts(
            "| BUG-1 | P0 | OPEN |\n\
             | BUG-2 | P1 | FIXED |\n\
             | BUG-3 | P1 | open |\n\
             | BUG-4 | P3 | investigating |\n",
        );
        assert_eq!(
            counts,
            DefectCounts {
                p0: 1,
                p1: 1,
                p2: 0,
                p3: 1
            }
        );
    }

    #[test]
    fn missing_tracker_yields_zero_defects() {
        let temp = tempdir().unwrap();
        assert_eq!(
            read_defect_counts(&temp.path().join(BUG_TRACKER_DOC)),
            DefectCounts::default()
        );
    }

    #[test]
    fn entry_counting_ignores_title_and_prose() {
        let content = "# Bug Patterns\n\nintro prose\n\n## Pattern one\n\n### detail\n\n## Pattern two\n";
        assert_eq!(count_entries(content), 3);
        assert_eq!(count_entries(""), 0);
    }

    #[test]
    fn staleness_compares_age_to_threshold() {
        let now = SystemTime::now();
        let eight_days_ago = now - Duration::from_secs(8 * 86_400);
        let yesterday = now - Duration::from_secs(86_400);
        assert!(is_stale(eight_days_ago, now, 7));
        assert!(!is_stale(yesterday, now, 7));
        assert!(!is_stale(now + Duration::from_secs(60), now, 7));
    }

    #[test]
    fn collects_coverage_signals_from_doc_sets() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "project:\n  name: demo\n").unwrap();
        let api = temp.path().join("docs").join("api");
        fs::create_dir_all(&api).unwrap();
        fs::write(
            api.join(MAP_DOC),
            "| `src/api/auth.py` | Tier A | auth (INV-001) |\n\
             | `src/api/tokens.py` | Tier A | tokens, no citation |\n\
             | `src/api/util.py` | Tier C | helpers |\n",
        )
        .unwrap();
        fs::write(api.join("INVARIANTS.md"), "## INV-001: validated tokens\n").unwrap();
        fs::write(api.join("BUG_PATTERNS.md"), "# Patterns\n\n## Stale cache\n").unwrap();

        let tests_dir = temp.path().join("tests");
        fs::create_dir_all(&tests_dir).unwrap();
        fs::write(tests_dir.join("test_auth.py"), "def test_ok(): pass\n").unwrap();

        let config = crate::config::ProjectConfig::resolve(None, temp.path()).unwrap();
        let doc_sets = discover(temp.path(), &config.docs_root_path()).unwrap();
        let signals = collect_signals(&config, &doc_sets);

        // auth.py cites a defined invariant; tokens.py does not.
        assert_eq!(signals.invariant_covered_files, 1);
        assert_eq!(signals.tier_a_missing_invariants, 1);
        // auth.py has test_auth.py; tokens.py has no test.
        assert_eq!(signals.tier_a_missing_tests, 1);
        assert_eq!(signals.bug_patterns, 1);
    }
}

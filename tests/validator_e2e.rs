use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use git2::Repository;
use tempfile::TempDir;

use doc_gate::config::ProjectConfig;
use doc_gate::docs::{discover, TierIndex};
use doc_gate::git::{build_candidate, GitRepository};
use doc_gate::score::{collect_signals, score, HistoryEntry, ScoreHistory};
use doc_gate::validate::{run_checks, CheckOutcome, ValidationReport};

/// Test setup that creates a temporary git repository with a config file,
/// a documentation tree, and staged changes.
struct TestRepo {
    _temp_dir: TempDir,
    root: PathBuf,
    repo: Repository,
}

impl TestRepo {
    fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().to_path_buf();

        let repo = Repository::init(&root)?;
        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        fs::write(
            root.join("doc-gate.yaml"),
            "project:\n  name: fixture\n  language: python\n\
             version:\n  file: src/pkg/__init__.py\n",
        )?;

        Ok(TestRepo {
            _temp_dir: temp_dir,
            root,
            repo,
        })
    }

    fn write(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    fn stage(&self, rel: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_path(Path::new(rel))?;
        index.write()?;
        Ok(())
    }

    fn write_and_stage(&self, rel: &str, content: &str) -> Result<()> {
        self.write(rel, content)?;
        self.stage(rel)
    }

    fn config(&self) -> Result<ProjectConfig> {
        ProjectConfig::resolve(None, &self.root)
    }

    /// Runs the full validation pipeline the way the check command does.
    fn validate(&self) -> Result<ValidationReport> {
        let config = self.config()?;
        let repo = GitRepository::open_at(&self.root)?;
        let candidate = build_candidate(&repo, &config)?;
        let doc_sets = discover(&config.project_root, &config.docs_root_path())?;
        let index = TierIndex::build(&doc_sets);
        Ok(run_checks(&candidate, &index, &config))
    }
}

fn outcome(report: &ValidationReport, check: &str) -> CheckOutcome {
    report
        .results
        .iter()
        .find(|r| r.check == check)
        .unwrap_or_else(|| panic!("check {check} missing from report"))
        .outcome
}

#[test]
fn tier_a_change_blocks_until_invariants_are_staged() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write(
        "docs/api/CODE_DOC_MAP.md",
        "| `src/api/auth.py` | Tier A | auth flows | INV-001 |\n",
    )?;
    repo.write("docs/api/INVARIANTS.md", "## INV-001: tokens are validated\n")?;

    repo.write_and_stage("src/api/auth.py", "def login(): pass\n")?;

    let report = repo.validate()?;
    assert_eq!(outcome(&report, "tier-a-citation"), CheckOutcome::Block);
    assert!(report.blocked());
    assert_eq!(report.exit_code(), 1);
    let messages = &report.results[0].messages;
    assert!(messages[0].contains("docs/api/INVARIANTS.md"));

    // Staging the invariants document clears the block.
    repo.write_and_stage("docs/api/INVARIANTS.md", "## INV-001: tokens are validated\n")?;
    let report = repo.validate()?;
    assert_eq!(outcome(&report, "tier-a-citation"), CheckOutcome::Pass);
    assert!(!report.blocked());
    assert_eq!(report.exit_code(), 0);
    Ok(())
}

#[test]
fn conflicting_non_a_claims_block_the_staged_file() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write(
        "docs/api/CODE_DOC_MAP.md",
        "| `src/shared/util.py` | Tier B | shared helpers |\n",
    )?;
    repo.write(
        "docs/legacy/CODE_DOC_MAP.md",
        "| `src/shared/util.py` | Tier C | old helpers |\n",
    )?;

    repo.write_and_stage("src/shared/util.py", "def helper(): pass\n")?;

    let report = repo.validate()?;
    assert_eq!(outcome(&report, "duplicate-ownership"), CheckOutcome::Block);
    let message = &report
        .results
        .iter()
        .find(|r| r.check == "duplicate-ownership")
        .unwrap()
        .messages[0];
    assert!(message.contains("docs/api"));
    assert!(message.contains("docs/legacy"));
    Ok(())
}

#[test]
fn tier_a_beats_lower_tier_claims_on_the_same_file() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write(
        "docs/api/CODE_DOC_MAP.md",
        "| `src/core.py` | Tier B | api view |\n",
    )?;
    repo.write(
        "docs/core/CODE_DOC_MAP.md",
        "| `src/core.py` | Tier A | the core |\n",
    )?;

    repo.write_and_stage("src/core.py", "x = 1\n")?;

    // Not a conflict: the A claim wins and demands its invariants doc.
    let report = repo.validate()?;
    assert_eq!(outcome(&report, "duplicate-ownership"), CheckOutcome::Pass);
    assert_eq!(outcome(&report, "tier-a-citation"), CheckOutcome::Block);
    assert!(report.results[0].messages[0].contains("docs/core/INVARIANTS.md"));
    Ok(())
}

#[test]
fn wide_commit_warns_but_never_blocks() -> Result<()> {
    let repo = TestRepo::new()?;
    for i in 0..7 {
        repo.write_and_stage(&format!("src/f{i}.py"), "pass\n")?;
    }

    let report = repo.validate()?;
    assert_eq!(outcome(&report, "blast-radius"), CheckOutcome::Warn);
    assert!(!report.blocked());
    assert_eq!(report.exit_code(), 0);

    let message = &report
        .results
        .iter()
        .find(|r| r.check == "blast-radius")
        .unwrap()
        .messages[0];
    assert!(message.contains('7'));
    assert!(message.contains('5'));
    Ok(())
}

#[test]
fn version_bump_requires_matching_changelog_entry() -> Result<()> {
    let repo = TestRepo::new()?;

    // Version staged without the changelog: advisory only.
    repo.write_and_stage("src/pkg/__init__.py", "__version__ = \"1.2.0\"\n")?;
    let report = repo.validate()?;
    assert_eq!(outcome(&report, "version-changelog"), CheckOutcome::Warn);
    assert!(!report.blocked());

    // Changelog staged but its latest entry disagrees: block.
    repo.write_and_stage("CHANGELOG.md", "# Changelog\n\n## [1.1.0] - 2026-08-01\n")?;
    let report = repo.validate()?;
    assert_eq!(outcome(&report, "version-changelog"), CheckOutcome::Block);

    // Matching entry clears it.
    repo.write_and_stage(
        "CHANGELOG.md",
        "# Changelog\n\n## [1.2.0] - 2026-08-20\n\n## [1.1.0] - 2026-08-01\n",
    )?;
    let report = repo.validate()?;
    assert_eq!(outcome(&report, "version-changelog"), CheckOutcome::Pass);
    assert!(!report.blocked());
    Ok(())
}

#[test]
fn unmapped_files_pass_every_ownership_check() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write_and_stage("src/brand_new.py", "pass\n")?;

    let report = repo.validate()?;
    assert!(!report.blocked());
    assert_eq!(report.summary.warned, 0);
    Ok(())
}

#[test]
fn score_pipeline_reads_signals_and_records_history() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write(
        "docs/api/CODE_DOC_MAP.md",
        "| `src/api/auth.py` | Tier A | auth flows | INV-001 |\n\
         | `src/api/tokens.py` | Tier A | token store |\n",
    )?;
    repo.write("docs/api/INVARIANTS.md", "## INV-001: tokens are validated\n")?;
    repo.write("BUG_TRACKER.md", "\"P0\": 1, \"P2\": 3\n")?;
    repo.write("tests/test_auth.py", "def test_login(): pass\n")?;

    let config = repo.config()?;
    let doc_sets = discover(&config.project_root, &config.docs_root_path())?;
    let signals = collect_signals(&config, &doc_sets);

    assert_eq!(signals.open_defects.p0, 1);
    assert_eq!(signals.open_defects.p2, 3);
    assert_eq!(signals.invariant_covered_files, 1);
    assert_eq!(signals.tier_a_missing_invariants, 1);
    assert_eq!(signals.tier_a_missing_tests, 1);

    let result = score(&signals, &config.scoring);
    assert!(result.code_health < 100.0);
    assert!(result.overall > 0.0);

    let history = ScoreHistory::new(&config.project_root);
    history.append(&HistoryEntry::from_score(&result))?;
    let last = history.last()?.expect("recorded entry");
    assert!((last.overall - result.overall).abs() < 1e-9);
    Ok(())
}

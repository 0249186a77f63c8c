//! Layered project configuration.
//!
//! Settings are resolved from three layers, strongest first:
//!
//! 1. explicit fields in `doc-gate.yaml`
//! 2. the language profile selected by `project.language`
//! 3. hard-coded global fallbacks
//!
//! Resolution is deliberately tolerant: a missing config file yields pure
//! defaults, and a malformed section is skipped with a warning so the commit
//! gate stays usable with incomplete configuration. Only an unreadable
//! filesystem is fatal.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::score::ScoreWeights;
use crate::validate::CheckLevel;

pub mod profiles;

pub use profiles::{profile_for, LanguageProfile};

/// Name of the project config file, also the upward-search marker.
pub const CONFIG_FILE: &str = "doc-gate.yaml";

/// Fully resolved project settings. Built once per invocation, immutable after.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Absolute path to the project root.
    pub project_root: PathBuf,
    /// Project display name.
    pub name: String,
    /// Language identifier (selects the profile layer).
    pub language: String,
    /// Main branch name.
    pub main_branch: String,
    /// Code root, relative to the project root.
    pub code_root: String,
    /// Code file extensions, without leading dots.
    pub code_extensions: Vec<String>,
    /// Version file path, relative to the project root.
    pub version_file: String,
    /// Regex with one capture group extracting the version value.
    pub version_pattern: String,
    /// Changelog path, relative to the project root.
    pub changelog: String,
    /// Documentation tree root, relative to the project root.
    pub docs_root: String,
    /// Glob matching test files.
    pub test_pattern: String,
    /// Commit-check policies.
    pub checks: CheckPolicies,
    /// Confidence-score tuning.
    pub scoring: ScoreWeights,
}

/// Per-check policy knobs for the commit validator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckPolicies {
    /// Tier-A citation check level.
    pub tier_a_citation: CheckLevel,
    /// Duplicate-ownership check level.
    pub duplicate_ownership: CheckLevel,
    /// Level when the changelog's recorded version disagrees with the version file.
    pub version_mismatch: CheckLevel,
    /// Level when the version file is staged without the changelog.
    pub changelog_missing: CheckLevel,
    /// Blast-radius check level. Block is not honored here: the check is
    /// informational and caps at Warn.
    pub blast_radius: CheckLevel,
    /// Staged-file count above which the blast-radius check warns.
    pub blast_radius_threshold: usize,
    /// Days after which a document counts as stale.
    pub staleness_days: u32,
}

impl Default for CheckPolicies {
    fn default() -> Self {
        Self {
            tier_a_citation: CheckLevel::Block,
            duplicate_ownership: CheckLevel::Block,
            version_mismatch: CheckLevel::Block,
            changelog_missing: CheckLevel::Warn,
            blast_radius: CheckLevel::Warn,
            blast_radius_threshold: 5,
            staleness_days: 7,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::from_layers(PathBuf::from("."), RawConfig::default())
    }
}

/// Finds the project root by searching upward from `start` for [`CONFIG_FILE`].
///
/// Returns `None` when no ancestor directory contains the marker.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

impl ProjectConfig {
    /// Resolves configuration for an invocation.
    ///
    /// An explicit `config_path` wins; otherwise the config file is searched
    /// upward from `start`. When neither is found the defaults are rooted at
    /// `start` and resolution still succeeds.
    pub fn resolve(config_path: Option<&Path>, start: &Path) -> Result<Self> {
        let (root, file) = match config_path {
            Some(path) => {
                let root = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or(Path::new("."))
                    .to_path_buf();
                (root, Some(path.to_path_buf()))
            }
            None => match find_project_root(start) {
                Some(root) => {
                    let file = root.join(CONFIG_FILE);
                    (root, Some(file))
                }
                None => (start.to_path_buf(), None),
            },
        };

        let raw = match file {
            Some(path) if path.is_file() => RawConfig::load(&path)?,
            Some(path) => {
                warn!("config file {} not found, using defaults", path.display());
                RawConfig::default()
            }
            None => RawConfig::default(),
        };

        Ok(Self::from_layers(root, raw))
    }

    /// Merges the three config layers into a resolved value.
    fn from_layers(project_root: PathBuf, raw: RawConfig) -> Self {
        let language = raw
            .project
            .language
            .unwrap_or_else(|| "python".to_string());
        let profile = profile_for(&language);

        let code_extensions = raw.code.extensions.unwrap_or_else(|| {
            profile
                .map(|p| p.extensions.iter().map(|e| e.to_string()).collect())
                .unwrap_or_else(|| vec!["py".to_string()])
        });
        let version_file = raw.version.file.unwrap_or_else(|| {
            profile
                .map(|p| p.version_file.to_string())
                .unwrap_or_else(|| "VERSION".to_string())
        });
        let version_pattern = raw.version.pattern.unwrap_or_else(|| {
            profile
                .map(|p| p.version_pattern.to_string())
                .unwrap_or_else(|| r"([0-9]+\.[0-9]+\.[0-9]+)".to_string())
        });
        let test_pattern = raw.tests.pattern.unwrap_or_else(|| {
            profile
                .map(|p| p.test_pattern.to_string())
                .unwrap_or_else(|| "**/test_*.*".to_string())
        });

        Self {
            project_root,
            name: raw.project.name.unwrap_or_else(|| "project".to_string()),
            language,
            main_branch: raw.project.main_branch.unwrap_or_else(|| "main".to_string()),
            code_root: raw.code.root.unwrap_or_else(|| "src/".to_string()),
            code_extensions,
            version_file,
            version_pattern,
            changelog: raw.docs.changelog.unwrap_or_else(|| "CHANGELOG.md".to_string()),
            docs_root: raw.docs.root.unwrap_or_else(|| "docs".to_string()),
            test_pattern,
            checks: raw.checks,
            scoring: raw.scoring,
        }
    }

    /// Absolute path of the documentation tree root.
    pub fn docs_root_path(&self) -> PathBuf {
        self.project_root.join(&self.docs_root)
    }

    /// Absolute path of the changelog.
    pub fn changelog_path(&self) -> PathBuf {
        self.project_root.join(&self.changelog)
    }

    /// Whether a repo-relative path is a code file per the configured
    /// root and extensions.
    ///
    /// The root comparison is on path components, so with root `src/` a
    /// sibling like `srcutils/a.py` does not qualify.
    pub fn is_code_file(&self, repo_relative: &str) -> bool {
        let root = self.code_root.trim_end_matches('/');
        let under_root = root.is_empty()
            || repo_relative
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with('/'));
        if !under_root {
            return false;
        }
        match repo_relative.rsplit_once('.') {
            Some((_, ext)) => self.code_extensions.iter().any(|e| e == ext),
            None => false,
        }
    }
}

/// Raw per-section config as read from disk, before layering.
///
/// Each section is deserialized independently so one malformed section never
/// poisons the rest.
#[derive(Debug, Default)]
struct RawConfig {
    project: ProjectSection,
    version: VersionSection,
    code: CodeSection,
    tests: TestsSection,
    docs: DocsSection,
    checks: CheckPolicies,
    scoring: ScoreWeights,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectSection {
    name: Option<String>,
    language: Option<String>,
    main_branch: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct VersionSection {
    file: Option<String>,
    pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CodeSection {
    root: Option<String>,
    extensions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct TestsSection {
    pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DocsSection {
    root: Option<String>,
    changelog: Option<String>,
}

impl RawConfig {
    /// Reads and tolerantly parses the config file.
    ///
    /// An unreadable file is fatal; an unparseable file or section degrades
    /// to defaults with a warning.
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let value: serde_yaml::Value = match serde_yaml::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                warn!("Ignoring malformed config {}: {e}", path.display());
                return Ok(Self::default());
            }
        };

        Ok(Self {
            project: section(&value, "project"),
            version: section(&value, "version"),
            code: section(&value, "code"),
            tests: section(&value, "tests"),
            docs: section(&value, "docs"),
            checks: section(&value, "checks"),
            scoring: section(&value, "scoring"),
        })
    }
}

/// Extracts one config section, falling back to defaults with a warning when
/// the section is present but malformed.
fn section<T: for<'de> Deserialize<'de> + Default>(value: &serde_yaml::Value, key: &str) -> T {
    match value.get(key) {
        None => T::default(),
        Some(v) => match serde_yaml::from_value(v.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Ignoring malformed config section '{key}': {e}");
                T::default()
            }
        },
    }
}

//! Built-in per-language default profiles.
//!
//! A profile supplies the middle layer of config precedence: explicit config
//! fields win over the profile, the profile wins over the global fallbacks.

/// Language-specific configuration defaults.
#[derive(Debug, Clone, Copy)]
pub struct LanguageProfile {
    /// Code file extensions (without the leading dot).
    pub extensions: &'static [&'static str],
    /// Conventional version file, relative to the project root.
    pub version_file: &'static str,
    /// Regex with one capture group extracting the version value.
    pub version_pattern: &'static str,
    /// Glob matching test files, relative to the project root.
    pub test_pattern: &'static str,
}

/// Returns the built-in profile for a language identifier, if one exists.
///
/// Lookup is case-insensitive. Unknown languages return `None` and the
/// resolver falls through to the global fallbacks.
pub fn profile_for(language: &str) -> Option<&'static LanguageProfile> {
    match language.to_ascii_lowercase().as_str() {
        "python" => Some(&PYTHON),
        "rust" => Some(&RUST),
        "javascript" | "typescript" => Some(&JAVASCRIPT),
        "go" => Some(&GO),
        _ => None,
    }
}

static PYTHON: LanguageProfile = LanguageProfile {
    extensions: &["py"],
    version_file: "__init__.py",
    version_pattern: r#"__version__\s*=\s*"([0-9.]+)""#,
    test_pattern: "**/test_*.py",
};

static RUST: LanguageProfile = LanguageProfile {
    extensions: &["rs"],
    version_file: "Cargo.toml",
    version_pattern: r#"version\s*=\s*"([0-9.]+)""#,
    test_pattern: "tests/**/*.rs",
};

static JAVASCRIPT: LanguageProfile = LanguageProfile {
    extensions: &["js", "ts"],
    version_file: "package.json",
    version_pattern: r#""version":\s*"([0-9.]+)""#,
    test_pattern: "**/*.test.{js,ts}",
};

static GO: LanguageProfile = LanguageProfile {
    extensions: &["go"],
    version_file: "VERSION",
    version_pattern: r"([0-9]+\.[0-9]+\.[0-9]+)",
    test_pattern: "**/*_test.go",
};

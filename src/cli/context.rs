//! Context command — shows the documentation governing a file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::ProjectConfig;
use crate::docs::{
    discover, parse_invariants_document, DocSet, MapClaim, Tier, TierIndex, TierLookup,
    TierResolution, MAP_DOC,
};

use super::OutputFormat;

/// Context command options - resolves a file's tier and required reading.
#[derive(Parser)]
pub struct ContextCommand {
    /// Repo-relative path of the file to look up.
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Explicit path to the config file (defaults to searching upward
    /// for doc-gate.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format: text (default), json.
    #[arg(long, default_value = "text")]
    pub format: String,
}

impl ContextCommand {
    /// Executes the context command.
    pub fn execute(self) -> Result<()> {
        let format: OutputFormat = self.format.parse()?;

        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let config = ProjectConfig::resolve(self.config.as_deref(), &cwd)?;
        let doc_sets = discover(&config.project_root, &config.docs_root_path())?;
        let index = TierIndex::build(&doc_sets);

        let resolution = index.resolve(&self.path);
        let defined = defined_invariants(&resolution, &doc_sets);
        let is_code = config.is_code_file(&self.path);

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&resolution)
                    .context("Failed to serialize context to JSON")?;
                println!("{json}");
            }
            OutputFormat::Text => {
                print!(
                    "{}",
                    format_context_text(&self.path, &resolution, &defined, is_code)
                );
            }
        }
        Ok(())
    }
}

/// Invariant identifiers defined by the owning doc-set's invariants document,
/// for tier-A files.
fn defined_invariants(resolution: &TierResolution, doc_sets: &[DocSet]) -> Vec<String> {
    let TierResolution::Mapped(claim) = resolution else {
        return Vec::new();
    };
    if claim.tier != Tier::A {
        return Vec::new();
    }
    let Some(doc_set) = doc_sets.iter().find(|d| d.rel_path == claim.doc_set) else {
        return Vec::new();
    };
    match std::fs::read_to_string(doc_set.invariants_path()) {
        Ok(content) => parse_invariants_document(&content),
        Err(_) => Vec::new(),
    }
}

/// Formats the resolution as human-readable context.
fn format_context_text(
    path: &str,
    resolution: &TierResolution,
    defined: &[String],
    is_code: bool,
) -> String {
    match resolution {
        TierResolution::Unmapped => {
            let mut out = format!("{path}\n  Not mapped by any doc-set (treated as Tier C).\n");
            if is_code {
                out.push_str(&format!(
                    "  Add a row to a {MAP_DOC} to assign documentation ownership.\n"
                ));
            }
            out
        }
        TierResolution::Mapped(claim) => {
            let mut out = format!("{path}\n  Tier: {}\n", claim.tier);
            out.push_str(&format!("  Doc-set: {}\n", display_doc_set(&claim.doc_set)));
            if !claim.description.is_empty() {
                out.push_str(&format!("  Description: {}\n", claim.description));
            }
            if !claim.invariant_ids.is_empty() {
                out.push_str(&format!(
                    "  Cited invariants: {}\n",
                    claim.invariant_ids.join(", ")
                ));
            }
            if !defined.is_empty() {
                out.push_str(&format!(
                    "  Defined in {}: {}\n",
                    claim.invariants_doc,
                    defined.join(", ")
                ));
            }
            out.push_str("  Required reading:\n");
            out.push_str(&format!("    {}\n", map_doc_rel(claim)));
            out.push_str(&format!("    {}", claim.invariants_doc));
            if claim.tier == Tier::A {
                out.push_str("  (must be staged with any change to this file)");
            }
            out.push('\n');
            out
        }
        TierResolution::Conflict(claims) => {
            let mut out = format!("{path}\n  Conflicting ownership claims:\n");
            for claim in claims {
                out.push_str(&format!(
                    "    {} assigns tier {}\n",
                    display_doc_set(&claim.doc_set),
                    claim.tier
                ));
            }
            out.push_str("  Resolve by keeping the row in exactly one mapping document.\n");
            out
        }
    }
}

/// Repo-relative path of the claiming doc-set's mapping document.
fn map_doc_rel(claim: &MapClaim) -> String {
    if claim.doc_set.is_empty() {
        MAP_DOC.to_string()
    } else {
        format!("{}/{}", claim.doc_set, MAP_DOC)
    }
}

fn display_doc_set(rel: &str) -> &str {
    if rel.is_empty() {
        "the project root"
    } else {
        rel
    }
}

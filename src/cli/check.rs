//! Check command — validates the staged change set against documentation rules.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::ProjectConfig;
use crate::docs::{discover, TierIndex};
use crate::git::{build_candidate, GitRepository};
use crate::validate::{run_checks, CheckOutcome, ValidationReport, ValidationSummary};

use super::OutputFormat;

/// Check command options - validates the staged change set.
#[derive(Parser)]
pub struct CheckCommand {
    /// Explicit path to the config file (defaults to searching upward
    /// for doc-gate.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format: text (default), json.
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Only shows warnings and blocks, suppresses passing checks.
    #[arg(long)]
    pub quiet: bool,
}

impl CheckCommand {
    /// Executes the check command, exiting non-zero when the commit is blocked.
    pub fn execute(self) -> Result<()> {
        let format: OutputFormat = self.format.parse()?;

        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let config = ProjectConfig::resolve(self.config.as_deref(), &cwd)?;

        let repo = GitRepository::open_at(&config.project_root)?;
        if let Ok(branch) = repo.current_branch() {
            tracing::debug!("validating staged changes on branch {branch}");
        }
        let candidate = build_candidate(&repo, &config)?;
        let doc_sets = discover(&config.project_root, &config.docs_root_path())?;
        let index = TierIndex::build(&doc_sets);
        tracing::debug!(
            "{} doc-sets map {} paths",
            doc_sets.len(),
            index.mapped_count()
        );

        let report = run_checks(&candidate, &index, &config);

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize report to JSON")?;
                println!("{json}");
            }
            OutputFormat::Text => self.output_text_report(&report)?,
        }

        let exit_code = report.exit_code();
        if exit_code != 0 {
            std::process::exit(exit_code);
        }
        Ok(())
    }

    /// Outputs the text format report.
    fn output_text_report(&self, report: &ValidationReport) -> Result<()> {
        let mut stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stderr = StandardStream::stderr(ColorChoice::Auto);
        write_text_report(&mut stdout, &mut stderr, report, self.quiet)?;
        Ok(())
    }
}

/// Writes the text report across both streams: PASS/WARN results and the
/// summary to `out`, BLOCK results and the final notice to `err` so hooks
/// that swallow stdout still get the check name, file and remedy.
fn write_text_report(
    out: &mut impl WriteColor,
    err: &mut impl WriteColor,
    report: &ValidationReport,
    quiet: bool,
) -> std::io::Result<()> {
    for result in &report.results {
        if quiet && result.outcome == CheckOutcome::Pass {
            continue;
        }
        if result.outcome == CheckOutcome::Block {
            write_check_result(err, result)?;
        } else {
            write_check_result(out, result)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", format_summary_text(&report.summary))?;

    if report.blocked() {
        err.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(err, "error:")?;
        err.reset()?;
        writeln!(
            err,
            " commit blocked; fix the BLOCK findings above or adjust check levels in doc-gate.yaml"
        )?;
    }
    Ok(())
}

/// Writes one check result: label, check name, then one line per violation.
fn write_check_result(
    out: &mut impl WriteColor,
    result: &crate::validate::CheckResult,
) -> std::io::Result<()> {
    write_outcome_label(out, result.outcome)?;
    writeln!(out, " {}", result.check)?;
    for message in &result.messages {
        writeln!(out, "   {message}")?;
    }
    Ok(())
}

/// Writes a colored `[PASS]`/`[WARN]`/`[BLOCK]` label.
fn write_outcome_label(out: &mut impl WriteColor, outcome: CheckOutcome) -> std::io::Result<()> {
    out.set_color(
        ColorSpec::new()
            .set_fg(Some(outcome_color(outcome)))
            .set_bold(outcome == CheckOutcome::Block),
    )?;
    write!(out, "[{outcome}]")?;
    out.reset()
}

/// Display color for an outcome.
fn outcome_color(outcome: CheckOutcome) -> Color {
    match outcome {
        CheckOutcome::Pass => Color::Green,
        CheckOutcome::Warn => Color::Yellow,
        CheckOutcome::Block => Color::Red,
    }
}

/// Formats the summary section of a validation report.
fn format_summary_text(summary: &ValidationSummary) -> String {
    format!(
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\
         Summary: {} checks run\n\
         \x20 {} passed, {} warned, {} blocked",
        summary.total_checks, summary.passed, summary.warned, summary.blocked,
    )
}

//! Score command — computes and optionally records the confidence score.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::ProjectConfig;
use crate::docs::discover;
use crate::score::{
    apply_smoothing, collect_signals, score, ConfidenceScore, HistoryEntry, ScoreFactor,
    ScoreHistory,
};

use super::OutputFormat;

/// Score command options - computes the documentation confidence score.
#[derive(Parser)]
pub struct ScoreCommand {
    /// Explicit path to the config file (defaults to searching upward
    /// for doc-gate.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format: text (default), json.
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Appends the computed score to .doc-gate/history.jsonl.
    #[arg(long)]
    pub record: bool,

    /// Skips smoothing against the last recorded score.
    #[arg(long)]
    pub raw: bool,
}

impl ScoreCommand {
    /// Executes the score command.
    pub fn execute(self) -> Result<()> {
        let format: OutputFormat = self.format.parse()?;

        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let config = ProjectConfig::resolve(self.config.as_deref(), &cwd)?;
        let doc_sets = discover(&config.project_root, &config.docs_root_path())?;

        let signals = collect_signals(&config, &doc_sets);
        let mut result = score(&signals, &config.scoring);

        let history = ScoreHistory::new(&config.project_root);
        if !self.raw {
            if let Some(previous) = history.last()? {
                apply_smoothing(&mut result, previous.overall, &config.scoring);
            }
        }
        if self.record {
            history.append(&HistoryEntry::from_score(&result))?;
        }

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&result)
                    .context("Failed to serialize score to JSON")?;
                println!("{json}");
            }
            OutputFormat::Text => self.output_text(&result)?,
        }
        Ok(())
    }

    fn output_text(&self, result: &ConfidenceScore) -> Result<()> {
        let mut stdout = StandardStream::stdout(ColorChoice::Auto);

        stdout.set_color(ColorSpec::new().set_bold(true))?;
        write!(stdout, "Confidence: {:.1}/100", result.overall)?;
        stdout.reset()?;
        writeln!(
            stdout,
            "  (code {:.1}, knowledge {:.1})",
            result.code_health, result.knowledge_health
        )?;
        writeln!(stdout)?;

        writeln!(stdout, "Factors:")?;
        for factor in &result.factors {
            write_factor(&mut stdout, factor)?;
        }

        let focus = focus_guidance(&result.factors, 3);
        if !focus.is_empty() {
            writeln!(stdout)?;
            writeln!(stdout, "Focus next:")?;
            for (i, label) in focus.iter().enumerate() {
                writeln!(stdout, "  {}. {label}", i + 1)?;
            }
        }
        Ok(())
    }
}

fn write_factor(out: &mut impl WriteColor, factor: &ScoreFactor) -> std::io::Result<()> {
    let color = if factor.delta < 0.0 {
        Color::Red
    } else {
        Color::Green
    };
    write!(out, "  ")?;
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(out, "{:>+7.1}", factor.delta)?;
    out.reset()?;
    writeln!(out, "  {}", factor.label)
}

/// The biggest score drains, worst first, as actionable focus guidance.
///
/// Bookkeeping entries (baseline, caps, floors, smoothing) are excluded:
/// they explain arithmetic, not work to do.
fn focus_guidance(factors: &[ScoreFactor], limit: usize) -> Vec<String> {
    let mut negatives: Vec<&ScoreFactor> = factors
        .iter()
        .filter(|f| f.delta < 0.0 && !is_bookkeeping(&f.label))
        .collect();
    negatives.sort_by(|a, b| a.delta.partial_cmp(&b.delta).unwrap_or(std::cmp::Ordering::Equal));
    negatives
        .into_iter()
        .take(limit)
        .map(|f| f.label.clone())
        .collect()
}

fn is_bookkeeping(label: &str) -> bool {
    label.contains("baseline")
        || label.contains("cap")
        || label.contains("floor")
        || label.contains("ceiling")
        || label.contains("smoothed")
}

//! Confidence scoring.
//!
//! Two sub-scores: code health starts at 100 and loses points to open
//! defects and tier-A coverage gaps; knowledge health starts at 0 and earns
//! points for documented invariants, bug patterns and decisions, losing
//! points to stale documents. The overall score is the weighted combination.
//!
//! Every contributing term lands in an ordered factor list, including the
//! cap/floor adjustments, so the factors always sum to the reported
//! sub-scores. The score exists to explain *why* confidence changed, not
//! just to be a number.

use serde::{Deserialize, Serialize};

pub mod history;
pub mod signals;

pub use history::{HistoryEntry, ScoreHistory};
pub use signals::collect_signals;

/// Tuning knobs for the scoring formula.
///
/// These are configuration defaults, not contracts; the `scoring:` config
/// section can override any of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Weight of code health in the overall score.
    pub code_weight: f64,
    /// Weight of knowledge health in the overall score.
    pub knowledge_weight: f64,
    /// Weight of the current score when smoothing against the previous one.
    pub ema_weight: f64,
    /// Maximum penalty from open P0 defects.
    pub p0_max: f64,
    /// Saturation rate for P0 defects (smaller saturates faster).
    pub p0_rate: f64,
    /// Maximum penalty from open P1 defects.
    pub p1_max: f64,
    /// Saturation rate for P1 defects.
    pub p1_rate: f64,
    /// Maximum penalty from open P2 defects.
    pub p2_max: f64,
    /// Saturation rate for P2 defects.
    pub p2_rate: f64,
    /// Maximum penalty from open P3 defects.
    pub p3_max: f64,
    /// Saturation rate for P3 defects.
    pub p3_rate: f64,
    /// Cap on the combined severity penalty.
    pub severity_cap: f64,
    /// Penalty per tier-A file lacking invariant coverage.
    pub invariant_gap_penalty: f64,
    /// Penalty per tier-A file lacking test coverage.
    pub test_gap_penalty: f64,
    /// Bonus per file with invariant coverage.
    pub invariant_bonus: f64,
    /// Bonus per documented bug pattern.
    pub bug_pattern_bonus: f64,
    /// Cap on the combined bug-pattern bonus.
    pub bug_pattern_cap: f64,
    /// Bonus per recorded architecture decision.
    pub decision_bonus: f64,
    /// Bonus per best-practice entry.
    pub best_practice_bonus: f64,
    /// Penalty per stale document.
    pub stale_penalty: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            code_weight: 0.6,
            knowledge_weight: 0.4,
            ema_weight: 0.7,
            p0_max: 15.0,
            p0_rate: 1.0,
            p1_max: 8.0,
            p1_rate: 3.0,
            p2_max: 3.0,
            p2_rate: 6.0,
            p3_max: 1.0,
            p3_rate: 25.0,
            severity_cap: 35.0,
            invariant_gap_penalty: 4.0,
            test_gap_penalty: 3.0,
            invariant_bonus: 3.0,
            bug_pattern_bonus: 2.0,
            bug_pattern_cap: 20.0,
            decision_bonus: 1.0,
            best_practice_bonus: 1.0,
            stale_penalty: 5.0,
        }
    }
}

/// Open defect counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectCounts {
    /// Critical.
    pub p0: u32,
    /// High.
    pub p1: u32,
    /// Medium.
    pub p2: u32,
    /// Low.
    pub p3: u32,
}

/// Input signals for one score computation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreSignals {
    /// Open defects by severity.
    pub open_defects: DefectCounts,
    /// Tier-A files whose mapping cites no defined invariant.
    pub tier_a_missing_invariants: usize,
    /// Tier-A files with no matching test file.
    pub tier_a_missing_tests: usize,
    /// Mapped files citing at least one invariant.
    pub invariant_covered_files: usize,
    /// Documented bug-pattern entries.
    pub bug_patterns: usize,
    /// Recorded architecture decisions.
    pub decisions: usize,
    /// Best-practice entries.
    pub best_practices: usize,
    /// Documents older than the staleness threshold.
    pub stale_documents: usize,
}

/// One contributing factor in the explanation list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFactor {
    /// Human-readable factor label.
    pub label: String,
    /// Signed contribution to the relevant sub-score.
    pub delta: f64,
}

/// A computed confidence score with its full explanation.
#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceScore {
    /// Code-health sub-score in [0, 100].
    pub code_health: f64,
    /// Knowledge-health sub-score in [0, 100].
    pub knowledge_health: f64,
    /// Weighted overall score in [0, 100].
    pub overall: f64,
    /// Ordered contributing factors.
    pub factors: Vec<ScoreFactor>,
}

/// Saturating penalty: approaches `max` as `open` grows, first few count most.
fn saturating_penalty(open: u32, max: f64, rate: f64) -> f64 {
    max * (1.0 - (-f64::from(open) / rate).exp())
}

/// Computes the confidence score from signals.
pub fn score(signals: &ScoreSignals, weights: &ScoreWeights) -> ConfidenceScore {
    let mut factors = Vec::new();
    let push = |factors: &mut Vec<ScoreFactor>, label: String, delta: f64| {
        if delta != 0.0 {
            factors.push(ScoreFactor { label, delta });
        }
    };

    // Code health: start at 100, subtract.
    factors.push(ScoreFactor {
        label: "code: baseline".to_string(),
        delta: 100.0,
    });

    let d = signals.open_defects;
    let severity_terms = [
        ("P0", d.p0, weights.p0_max, weights.p0_rate),
        ("P1", d.p1, weights.p1_max, weights.p1_rate),
        ("P2", d.p2, weights.p2_max, weights.p2_rate),
        ("P3", d.p3, weights.p3_max, weights.p3_rate),
    ];
    let mut severity_sum = 0.0;
    for (label, open, max, rate) in severity_terms {
        let penalty = saturating_penalty(open, max, rate);
        severity_sum += penalty;
        push(
            &mut factors,
            format!("code: open {label} defects ({open})"),
            -penalty,
        );
    }
    if severity_sum > weights.severity_cap {
        // Keep the factor list summing to the sub-score.
        push(
            &mut factors,
            "code: severity penalty cap".to_string(),
            severity_sum - weights.severity_cap,
        );
        severity_sum = weights.severity_cap;
    }

    let invariant_gap = weights.invariant_gap_penalty * signals.tier_a_missing_invariants as f64;
    push(
        &mut factors,
        format!(
            "code: tier-A files without invariant coverage ({})",
            signals.tier_a_missing_invariants
        ),
        -invariant_gap,
    );
    let test_gap = weights.test_gap_penalty * signals.tier_a_missing_tests as f64;
    push(
        &mut factors,
        format!(
            "code: tier-A files without test coverage ({})",
            signals.tier_a_missing_tests
        ),
        -test_gap,
    );

    let raw_code = 100.0 - severity_sum - invariant_gap - test_gap;
    let code_health = raw_code.max(0.0);
    if raw_code < 0.0 {
        push(&mut factors, "code: floor at 0".to_string(), -raw_code);
    }

    // Knowledge health: start at 0, add bounded bonuses, subtract staleness.
    let invariant_bonus = weights.invariant_bonus * signals.invariant_covered_files as f64;
    push(
        &mut factors,
        format!(
            "knowledge: invariant-covered files ({})",
            signals.invariant_covered_files
        ),
        invariant_bonus,
    );
    let pattern_bonus =
        (weights.bug_pattern_bonus * signals.bug_patterns as f64).min(weights.bug_pattern_cap);
    push(
        &mut factors,
        format!("knowledge: documented bug patterns ({})", signals.bug_patterns),
        pattern_bonus,
    );
    let decision_bonus = weights.decision_bonus * signals.decisions as f64;
    push(
        &mut factors,
        format!("knowledge: recorded decisions ({})", signals.decisions),
        decision_bonus,
    );
    let practice_bonus = weights.best_practice_bonus * signals.best_practices as f64;
    push(
        &mut factors,
        format!("knowledge: best-practice entries ({})", signals.best_practices),
        practice_bonus,
    );
    let stale_penalty = weights.stale_penalty * signals.stale_documents as f64;
    push(
        &mut factors,
        format!("knowledge: stale documents ({})", signals.stale_documents),
        -stale_penalty,
    );

    let raw_knowledge =
        invariant_bonus + pattern_bonus + decision_bonus + practice_bonus - stale_penalty;
    let knowledge_health = raw_knowledge.clamp(0.0, 100.0);
    if raw_knowledge > 100.0 {
        push(
            &mut factors,
            "knowledge: ceiling at 100".to_string(),
            100.0 - raw_knowledge,
        );
    } else if raw_knowledge < 0.0 {
        push(&mut factors, "knowledge: floor at 0".to_string(), -raw_knowledge);
    }

    let overall = weights.code_weight * code_health + weights.knowledge_weight * knowledge_health;

    ConfidenceScore {
        code_health,
        knowledge_health,
        overall,
        factors,
    }
}

/// Smooths the overall score toward the previous recorded one.
///
/// Pulls toward history rather than boosting: a sudden collapse or jump is
/// damped, and the adjustment shows up as its own factor.
pub fn apply_smoothing(current: &mut ConfidenceScore, previous: f64, weights: &ScoreWeights) {
    let smoothed = weights.ema_weight * current.overall + (1.0 - weights.ema_weight) * previous;
    let delta = smoothed - current.overall;
    if delta.abs() > f64::EPSILON {
        current.factors.push(ScoreFactor {
            label: format!("overall: smoothed toward previous score {previous:.1}"),
            delta,
        });
    }
    current.overall = smoothed;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> ScoreSignals {
        ScoreSignals::default()
    }

    #[test]
    fn clean_project_scores_full_code_health() {
        let result = score(&signals(), &ScoreWeights::default());
        assert_eq!(result.code_health, 100.0);
        assert_eq!(result.knowledge_health, 0.0);
        assert!((result.overall - 60.0).abs() < 1e-9);
    }

    #[test]
    fn open_p0_defect_costs_more_than_p2() {
        let weights = ScoreWeights::default();
        let mut with_p0 = signals();
        with_p0.open_defects.p0 = 1;
        let mut with_p2 = signals();
        with_p2.open_defects.p2 = 1;
        assert!(score(&with_p0, &weights).code_health < score(&with_p2, &weights).code_health);
    }

    #[test]
    fn severity_penalty_saturates() {
        let weights = ScoreWeights::default();
        let mut few = signals();
        few.open_defects.p1 = 2;
        let mut many = signals();
        many.open_defects.p1 = 200;
        let few_score = score(&few, &weights).code_health;
        let many_score = score(&many, &weights).code_health;
        // More defects never help, but the marginal cost decays.
        assert!(many_score < few_score);
        assert!(many_score >= 100.0 - weights.severity_cap - 1e-9);
    }

    #[test]
    fn knowledge_bonuses_accumulate_and_cap() {
        let weights = ScoreWeights::default();
        let mut s = signals();
        s.invariant_covered_files = 10;
        s.bug_patterns = 100; // bonus capped
        s.decisions = 3;
        let result = score(&s, &weights);
        assert_eq!(result.knowledge_health, 30.0 + 20.0 + 3.0);
    }

    #[test]
    fn stale_documents_reduce_knowledge_health() {
        let weights = ScoreWeights::default();
        let mut s = signals();
        s.invariant_covered_files = 10;
        let base = score(&s, &weights).knowledge_health;
        s.stale_documents = 2;
        assert!(score(&s, &weights).knowledge_health < base);
    }

    #[test]
    fn factors_sum_to_sub_scores() {
        let mut s = signals();
        s.open_defects = DefectCounts {
            p0: 2,
            p1: 5,
            p2: 9,
            p3: 40,
        };
        s.tier_a_missing_invariants = 3;
        s.tier_a_missing_tests = 2;
        s.invariant_covered_files = 4;
        s.bug_patterns = 30;
        s.stale_documents = 1;
        let result = score(&s, &ScoreWeights::default());
        let total: f64 = result.factors.iter().map(|f| f.delta).sum();
        assert!(
            (total - (result.code_health + result.knowledge_health)).abs() < 1e-9,
            "factors {total} vs sub-scores {} + {}",
            result.code_health,
            result.knowledge_health
        );
    }

    #[test]
    fn smoothing_pulls_toward_previous() {
        let weights = ScoreWeights::default();
        let mut result = score(&signals(), &weights); // overall 60
        apply_smoothing(&mut result, 90.0, &weights);
        assert!((result.overall - (0.7 * 60.0 + 0.3 * 90.0)).abs() < 1e-9);
        assert!(result
            .factors
            .last()
            .unwrap()
            .label
            .starts_with("overall: smoothed"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_signals() -> impl Strategy<Value = ScoreSignals> {
            (
                (0u32..200, 0u32..200, 0u32..500, 0u32..1000),
                0usize..50,
                0usize..50,
                0usize..200,
                0usize..200,
                (0usize..100, 0usize..100, 0usize..50),
            )
                .prop_map(
                    |((p0, p1, p2, p3), inv_gap, test_gap, covered, patterns, (dec, bp, stale))| {
                        ScoreSignals {
                            open_defects: DefectCounts { p0, p1, p2, p3 },
                            tier_a_missing_invariants: inv_gap,
                            tier_a_missing_tests: test_gap,
                            invariant_covered_files: covered,
                            bug_patterns: patterns,
                            decisions: dec,
                            best_practices: bp,
                            stale_documents: stale,
                        }
                    },
                )
        }

        proptest! {
            #[test]
            fn sub_scores_stay_bounded(s in arb_signals()) {
                let result = score(&s, &ScoreWeights::default());
                prop_assert!((0.0..=100.0).contains(&result.code_health));
                prop_assert!((0.0..=100.0).contains(&result.knowledge_health));
                prop_assert!((0.0..=100.0).contains(&result.overall));
            }

            #[test]
            fn extra_p1_defect_never_raises_code_health(s in arb_signals()) {
                let weights = ScoreWeights::default();
                let base = score(&s, &weights).code_health;
                let mut more = s.clone();
                more.open_defects.p1 += 1;
                prop_assert!(score(&more, &weights).code_health <= base + 1e-9);
            }

            #[test]
            fn extra_covered_file_never_lowers_knowledge_health(s in arb_signals()) {
                let weights = ScoreWeights::default();
                let base = score(&s, &weights).knowledge_health;
                let mut more = s.clone();
                more.invariant_covered_files += 1;
                prop_assert!(score(&more, &weights).knowledge_health >= base - 1e-9);
            }
        }
    }
}

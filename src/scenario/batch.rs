//! Parallel batch runs and ranking of scenarios
//!
//! Scenarios in a batch are independent, so they are simulated concurrently with
//! rayon. A failed scenario becomes an error entry and never aborts its siblings.

use super::definition::ScenarioDefinition;
use super::simulator::{ScenarioOutcome, ScenarioSimulator};
use crate::error::ScenarioError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Runway credited to the ranking score is capped at this many months
pub const RANKING_RUNWAY_CAP: f64 = 24.0;
/// Score ratio above which the leader "significantly outperforms" the runner-up
pub const OUTPERFORM_RATIO: f64 = 1.2;

/// Result for one scenario of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub name: String,
    pub result: Result<ScenarioOutcome, ScenarioError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedScenario {
    pub rank: usize,
    /// Position of the scenario's entry in the batch
    pub index: usize,
    pub name: String,
    pub score: f64,
    pub risk_factor: f64,
}

/// How the two best scenarios differ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTradeoff {
    pub leader: String,
    pub runner_up: String,
    pub score_gap: f64,
    pub leader_advantages: Vec<String>,
    pub runner_up_advantages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestScenario {
    pub name: String,
    pub score: f64,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub implementation: Vec<String>,
}

/// Best and worst scenario for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricExtremes {
    pub metric: String,
    pub best: String,
    pub best_value: f64,
    pub worst: String,
    pub worst_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighRiskScenario {
    pub name: String,
    pub risk_count: usize,
    pub risk_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub extremes: Vec<MetricExtremes>,
    pub high_risk: Vec<HighRiskScenario>,
    pub high_risk_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per definition, in input order
    pub entries: Vec<BatchEntry>,
    /// Successful scenarios, best first
    pub ranking: Vec<RankedScenario>,
    pub tradeoff: Option<ScenarioTradeoff>,
    pub best: Option<BestScenario>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn from_entries(entries: Vec<BatchEntry>) -> Self {
        let ranking = rank(&entries);
        let outcome = |index: usize| entries.get(index).and_then(|e| e.result.as_ref().ok());

        let top = ranking.first().and_then(|r| outcome(r.index).map(|o| (r, o)));
        let second = ranking.get(1).and_then(|r| outcome(r.index).map(|o| (r, o)));

        let tradeoff = match (top, second) {
            (Some(a), Some(b)) => Some(tradeoff(a, b)),
            _ => None,
        };
        let best = top.map(|leader| best_scenario(leader, second.map(|(r, _)| r.score)));
        let summary = summarize(&entries);

        Self {
            entries,
            ranking,
            tradeoff,
            best,
            summary,
        }
    }

    /// Outcome behind a ranked scenario
    pub fn outcome_for(&self, ranked: &RankedScenario) -> Option<&ScenarioOutcome> {
        self.entries.get(ranked.index).and_then(|e| e.result.as_ref().ok())
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.entries.iter().filter_map(|e| e.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ScenarioError)> {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref().err().map(|err| (e.name.as_str(), err)))
    }
}

impl ScenarioSimulator {
    /// Simulate independent scenarios in parallel and rank the successes
    pub fn run_batch(&self, definitions: &[ScenarioDefinition]) -> BatchReport {
        let entries: Vec<BatchEntry> = definitions
            .par_iter()
            .map(|definition| BatchEntry {
                name: definition.name.clone(),
                result: self.run(definition),
            })
            .collect();

        for entry in &entries {
            if let Err(e) = &entry.result {
                log::warn!("Scenario '{}' failed: {}", entry.name, e);
            }
        }

        let report = BatchReport::from_entries(entries);
        log::info!(
            "Batch of {} scenarios: {} succeeded, {} failed",
            report.summary.total,
            report.summary.successful,
            report.summary.failed
        );
        report
    }
}

/// Weighted score used to rank scenarios
///
/// `(MRR / 10k + profit / 10k + min(runway, 24)) * risk factor`, where the risk
/// factor is 0.5 for high cash risk, 0.9 for medium and 1.0 otherwise.
pub fn score(outcome: &ScenarioOutcome) -> f64 {
    let metrics = &outcome.metrics;
    let points = metrics.ending_mrr / 10_000.0
        + metrics.total_profit / 10_000.0
        + metrics.ending_runway.capped(RANKING_RUNWAY_CAP);
    points * outcome.impact.risks.ranking_factor()
}

/// Rank successful entries by score, best first; ties keep input order
pub fn rank(entries: &[BatchEntry]) -> Vec<RankedScenario> {
    let mut ranked: Vec<RankedScenario> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, e)| e.result.as_ref().ok().map(|outcome| (index, outcome)))
        .map(|(index, outcome)| RankedScenario {
            rank: 0,
            index,
            name: outcome.name.clone(),
            score: score(outcome),
            risk_factor: outcome.impact.risks.ranking_factor(),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (i, r) in ranked.iter_mut().enumerate() {
        r.rank = i + 1;
    }
    ranked
}

fn tradeoff(
    (leader, a): (&RankedScenario, &ScenarioOutcome),
    (runner_up, b): (&RankedScenario, &ScenarioOutcome),
) -> ScenarioTradeoff {
    let checks = [
        ("ending MRR", a.metrics.ending_mrr, b.metrics.ending_mrr),
        ("ending cash", a.metrics.ending_cash, b.metrics.ending_cash),
        ("total profit", a.metrics.total_profit, b.metrics.total_profit),
        (
            "runway",
            a.metrics.ending_runway.months_or_sentinel(),
            b.metrics.ending_runway.months_or_sentinel(),
        ),
    ];

    let mut leader_advantages = Vec::new();
    let mut runner_up_advantages = Vec::new();
    for (label, x, y) in checks {
        if x > y {
            leader_advantages.push(format!("Higher {}", label));
        } else if y > x {
            runner_up_advantages.push(format!("Higher {}", label));
        }
    }

    ScenarioTradeoff {
        leader: leader.name.clone(),
        runner_up: runner_up.name.clone(),
        score_gap: leader.score - runner_up.score,
        leader_advantages,
        runner_up_advantages,
    }
}

fn best_scenario((ranked, outcome): (&RankedScenario, &ScenarioOutcome), second_score: Option<f64>) -> BestScenario {
    let mut strengths = Vec::new();
    if second_score.map_or(false, |s| ranked.score > s * OUTPERFORM_RATIO) {
        strengths.push("Significantly outperforms the other scenarios".to_string());
    }
    if outcome.metrics.breakeven_month.map_or(false, |m| m <= 12) {
        strengths.push("Reaches breakeven within a year".to_string());
    }

    let mut risks = Vec::new();
    if outcome.impact.risks.cash.is_high() {
        risks.push("High cash risk: cash goes negative during the scenario".to_string());
    }
    if outcome.impact.risks.growth.is_high() {
        risks.push("High growth risk: growth is weak or volatile".to_string());
    }

    BestScenario {
        name: ranked.name.clone(),
        score: ranked.score,
        strengths,
        risks,
        implementation: vec![
            "Set monthly checkpoints for MRR, burn and runway".to_string(),
            "Agree on the trigger for falling back to the runner-up scenario".to_string(),
            "Review the changed assumptions with the team before committing budget".to_string(),
        ],
    }
}

fn summarize(entries: &[BatchEntry]) -> BatchSummary {
    let outcomes: Vec<&ScenarioOutcome> = entries.iter().filter_map(|e| e.result.as_ref().ok()).collect();

    let metrics: [(&str, fn(&ScenarioOutcome) -> f64); 5] = [
        ("ending_mrr", |o| o.metrics.ending_mrr),
        ("ending_customers", |o| o.metrics.ending_customers),
        ("ending_cash", |o| o.metrics.ending_cash),
        ("total_profit", |o| o.metrics.total_profit),
        ("ending_runway", |o| o.metrics.ending_runway.months_or_sentinel()),
    ];

    let extremes = metrics
        .iter()
        .filter_map(|&(metric, value)| {
            let scored: Vec<(&ScenarioOutcome, f64)> = outcomes.iter().map(|&o| (o, value(o))).collect();
            let best = scored.iter().max_by(|a, b| a.1.total_cmp(&b.1))?;
            let worst = scored.iter().min_by(|a, b| a.1.total_cmp(&b.1))?;
            Some(MetricExtremes {
                metric: metric.to_string(),
                best: best.0.name.clone(),
                best_value: best.1,
                worst: worst.0.name.clone(),
                worst_value: worst.1,
            })
        })
        .collect();

    let high_risk: Vec<HighRiskScenario> = outcomes
        .iter()
        .filter_map(|o| {
            let types = o.impact.risks.high_risks();
            (!types.is_empty()).then(|| HighRiskScenario {
                name: o.name.clone(),
                risk_count: types.len(),
                risk_types: types.iter().map(|t| t.to_string()).collect(),
            })
        })
        .collect();

    let high_risk_pct = if outcomes.is_empty() {
        0.0
    } else {
        high_risk.len() as f64 / outcomes.len() as f64 * 100.0
    };

    BatchSummary {
        total: entries.len(),
        successful: outcomes.len(),
        failed: entries.len() - outcomes.len(),
        extremes,
        high_risk,
        high_risk_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::definition::ScenarioKind;
    use crate::scenario::test_support::baseline;
    use approx::assert_relative_eq;

    #[test]
    fn test_batch_runs_all_templates() {
        let simulator = ScenarioSimulator::new(baseline());
        let report = simulator.run_batch(&ScenarioDefinition::templates());

        assert_eq!(report.entries.len(), 5);
        assert_eq!(report.summary.successful, 5);
        assert_eq!(report.ranking.len(), 5);
        assert!(report.ranking.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(report.ranking[0].rank, 1);
        assert!(report.tradeoff.is_some());
        assert_eq!(report.best.as_ref().map(|b| &b.name), Some(&report.ranking[0].name));
    }

    #[test]
    fn test_failure_is_isolated() {
        let simulator = ScenarioSimulator::new(baseline());
        let definitions = vec![
            ScenarioDefinition::template(ScenarioKind::CostReduction),
            ScenarioDefinition::custom("too long", vec![], 120),
            ScenarioDefinition::template(ScenarioKind::PricingIncrease),
        ];
        let report = simulator.run_batch(&definitions);

        // entries keep input order
        let names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Cost reduction", "too long", "Pricing increase"]);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.ranking.len(), 2);

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0].1, ScenarioError::InvalidDuration { months: 120, .. }));
    }

    #[test]
    fn test_score_formula() {
        let simulator = ScenarioSimulator::new(baseline());
        let outcome = simulator
            .run(&ScenarioDefinition::template(ScenarioKind::CostReduction))
            .unwrap();
        let m = &outcome.metrics;

        let expected = (m.ending_mrr / 10_000.0 + m.total_profit / 10_000.0 + m.ending_runway.capped(24.0))
            * outcome.impact.risks.ranking_factor();
        assert_relative_eq!(score(&outcome), expected);
    }

    #[test]
    fn test_cash_risk_penalizes_score() {
        let mut tight = baseline();
        tight.cash = 5_000.0;
        let simulator = ScenarioSimulator::new(tight);
        let outcome = simulator.run(&ScenarioDefinition::custom("tight", vec![], 12)).unwrap();

        assert_eq!(outcome.impact.risks.ranking_factor(), 0.5);
        let ranked = rank(&[BatchEntry {
            name: "tight".to_string(),
            result: Ok(outcome),
        }]);
        assert_eq!(ranked[0].risk_factor, 0.5);
    }

    #[test]
    fn test_summary_extremes_and_risk() {
        let simulator = ScenarioSimulator::new(baseline());
        let report = simulator.run_batch(&ScenarioDefinition::templates());

        let cash = report.summary.extremes.iter().find(|e| e.metric == "ending_cash").unwrap();
        assert_eq!(cash.best, "Fundraising round");
        assert!(cash.best_value >= cash.worst_value);
        assert!(report.summary.high_risk_pct >= 0.0 && report.summary.high_risk_pct <= 100.0);
    }

    #[test]
    fn test_duplicate_names_rank_by_entry() {
        let simulator = ScenarioSimulator::new(baseline());
        let short = ScenarioDefinition::template(ScenarioKind::CostReduction).with_duration(3);
        let long = ScenarioDefinition::template(ScenarioKind::CostReduction).with_duration(24);
        let report = simulator.run_batch(&[short, long]);

        assert_eq!(report.ranking.len(), 2);
        assert_ne!(report.ranking[0].index, report.ranking[1].index);
        for ranked in &report.ranking {
            let outcome = report.outcome_for(ranked).unwrap();
            assert_relative_eq!(score(outcome), ranked.score);
        }

        let leader = report.outcome_for(&report.ranking[0]).unwrap();
        let runner_up = report.outcome_for(&report.ranking[1]).unwrap();
        assert_ne!(leader.duration_months, runner_up.duration_months);

        let tradeoff = report.tradeoff.as_ref().unwrap();
        assert!(!tradeoff.leader_advantages.is_empty() || !tradeoff.runner_up_advantages.is_empty());
        assert_relative_eq!(tradeoff.score_gap, report.ranking[0].score - report.ranking[1].score);
    }

    #[test]
    fn test_empty_batch() {
        let report = ScenarioSimulator::new(baseline()).run_batch(&[]);
        assert_eq!(report.summary.total, 0);
        assert!(report.ranking.is_empty());
        assert!(report.best.is_none());
        assert!(report.tradeoff.is_none());
        assert_eq!(report.summary.high_risk_pct, 0.0);
    }
}

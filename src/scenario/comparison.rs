//! Scenario vs baseline comparison

use super::baseline::ScenarioBaseline;
use super::simulator::ScenarioMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative change (in percent) that counts as a key difference
pub const KEY_DIFFERENCE_PCT: f64 = 20.0;
/// Runway change (in months) that counts as a key difference
pub const KEY_RUNWAY_CHANGE_MONTHS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparedMetric {
    Mrr,
    Customers,
    Cash,
    Runway,
    GrowthRate,
}

impl ComparedMetric {
    pub fn label(&self) -> &'static str {
        match self {
            ComparedMetric::Mrr => "MRR",
            ComparedMetric::Customers => "Customers",
            ComparedMetric::Cash => "Cash",
            ComparedMetric::Runway => "Runway",
            ComparedMetric::GrowthRate => "Growth rate",
        }
    }
}

impl fmt::Display for ComparedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: ComparedMetric,
    pub baseline: f64,
    pub scenario: f64,
    pub absolute_change: f64,
    pub percent_change: f64,
}

impl MetricComparison {
    fn new(metric: ComparedMetric, baseline: f64, scenario: f64) -> Self {
        Self {
            metric,
            baseline,
            scenario,
            absolute_change: scenario - baseline,
            percent_change: percent_change(baseline, scenario),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub metrics: Vec<MetricComparison>,
    pub key_differences: Vec<String>,
}

impl ScenarioComparison {
    pub fn get(&self, metric: ComparedMetric) -> Option<&MetricComparison> {
        self.metrics.iter().find(|m| m.metric == metric)
    }

    /// Metrics whose relative change exceeds the key-difference threshold
    pub fn key_drivers(&self) -> Vec<ComparedMetric> {
        self.metrics
            .iter()
            .filter(|m| m.metric != ComparedMetric::Runway && m.percent_change.abs() > KEY_DIFFERENCE_PCT)
            .map(|m| m.metric)
            .collect()
    }
}

/// Percent change from `baseline` to `scenario`
///
/// A zero baseline yields 100 when the scenario is positive and 0 otherwise.
pub fn percent_change(baseline: f64, scenario: f64) -> f64 {
    if baseline != 0.0 {
        (scenario - baseline) / baseline * 100.0
    } else if scenario > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Compare a scenario's ending position with the baseline
///
/// Unlimited runway is compared as 999 months. Growth is compared in percent.
pub fn compare(baseline: &ScenarioBaseline, metrics: &ScenarioMetrics) -> ScenarioComparison {
    let base_growth = baseline.monthly_growth_rate * 100.0;
    let scenario_growth = metrics.avg_monthly_growth * 100.0;
    let growth = MetricComparison {
        percent_change: if base_growth != 0.0 {
            (scenario_growth - base_growth) / base_growth * 100.0
        } else {
            0.0
        },
        ..MetricComparison::new(ComparedMetric::GrowthRate, base_growth, scenario_growth)
    };

    let compared = vec![
        MetricComparison::new(ComparedMetric::Mrr, baseline.mrr, metrics.ending_mrr),
        MetricComparison::new(ComparedMetric::Customers, baseline.customers, metrics.ending_customers),
        MetricComparison::new(ComparedMetric::Cash, baseline.cash, metrics.ending_cash),
        MetricComparison::new(
            ComparedMetric::Runway,
            baseline.runway.months_or_sentinel(),
            metrics.ending_runway.months_or_sentinel(),
        ),
        growth,
    ];

    let mut key_differences = Vec::new();
    for m in &compared {
        match m.metric {
            ComparedMetric::Runway => {
                if let Some(line) = runway_difference(baseline, metrics) {
                    key_differences.push(line);
                }
            }
            ComparedMetric::GrowthRate => {}
            _ if m.percent_change.abs() > KEY_DIFFERENCE_PCT => {
                let direction = if m.percent_change > 0.0 { "higher" } else { "lower" };
                key_differences.push(format!(
                    "{} is {:.1}% {} than baseline",
                    m.metric,
                    m.percent_change.abs(),
                    direction
                ));
            }
            _ => {}
        }
    }

    ScenarioComparison {
        metrics: compared,
        key_differences,
    }
}

fn runway_difference(baseline: &ScenarioBaseline, metrics: &ScenarioMetrics) -> Option<String> {
    match (baseline.runway.finite(), metrics.ending_runway.finite()) {
        (Some(_), None) => Some("Runway becomes unlimited (cash-flow positive)".to_string()),
        (None, Some(months)) => Some(format!("Runway drops from unlimited to {:.1} months", months)),
        (Some(base), Some(scenario)) if (scenario - base).abs() > KEY_RUNWAY_CHANGE_MONTHS => {
            let direction = if scenario > base { "extends" } else { "shortens" };
            Some(format!("Runway {} by {:.1} months", direction, (scenario - base).abs()))
        }
        _ => None,
    }
}

//! Run every scenario template against a baseline and print the ranking
//!
//! Usage: `compare_scenarios [assumptions.json] [--output ranking.csv]`

use anyhow::{Context, Result};
use clap::Parser;
use runway_planner::assumptions::{load_assumptions, DEFAULT_ASSUMPTIONS_PATH};
use runway_planner::scenario::{ScenarioBaseline, ScenarioDefinition, ScenarioSimulator};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "compare_scenarios")]
#[command(about = "Rank every scenario template against a baseline built from plan assumptions")]
struct Args {
    /// Plan assumptions (JSON)
    #[arg(default_value = DEFAULT_ASSUMPTIONS_PATH)]
    assumptions: PathBuf,

    /// Write the ranking to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let assumptions_path = args.assumptions;
    let output = args.output;

    let assumptions = load_assumptions(&assumptions_path)
        .with_context(|| format!("loading assumptions from {}", assumptions_path.display()))?;
    let baseline = ScenarioBaseline::from_assumptions(&assumptions);

    println!("Baseline: MRR ${:.2}, cash ${:.2}, burn ${:.2}/month", baseline.mrr, baseline.cash, baseline.monthly_burn);

    let start = Instant::now();
    let definitions = ScenarioDefinition::templates();
    let report = ScenarioSimulator::new(baseline).run_batch(&definitions);
    println!("Simulated {} scenarios in {:?}\n", definitions.len(), start.elapsed());

    println!(
        "{:>4} {:<22} {:>10} {:>14} {:>14} {:>14} {:>8}",
        "Rank", "Scenario", "Score", "Ending MRR", "Ending Cash", "Profit", "Runway"
    );
    println!("{}", "-".repeat(92));

    for r in &report.ranking {
        let Some(outcome) = report.outcome_for(r) else {
            continue;
        };
        let m = &outcome.metrics;
        println!(
            "{:>4} {:<22} {:>10.2} {:>14.2} {:>14.2} {:>14.2} {:>8}",
            r.rank,
            r.name,
            r.score,
            m.ending_mrr,
            m.ending_cash,
            m.total_profit,
            m.ending_runway
                .finite()
                .map_or("inf".to_string(), |months| format!("{:.1}", months))
        );
    }

    for (name, error) in report.failures() {
        println!("     {:<22} FAILED: {}", name, error);
    }

    if let Some(tradeoff) = &report.tradeoff {
        println!("\n{} vs {} (gap {:.2}):", tradeoff.leader, tradeoff.runner_up, tradeoff.score_gap);
        for a in &tradeoff.leader_advantages {
            println!("  {}: {}", tradeoff.leader, a);
        }
        for a in &tradeoff.runner_up_advantages {
            println!("  {}: {}", tradeoff.runner_up, a);
        }
    }

    let summary = &report.summary;
    println!(
        "\n{} of {} scenarios succeeded; {:.0}% carry high risk",
        summary.successful, summary.total, summary.high_risk_pct
    );

    if let Some(path) = output {
        let mut writer = csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
        for r in &report.ranking {
            writer.serialize(r)?;
        }
        writer.flush()?;
        println!("Ranking written to: {}", path.display());
    }

    Ok(())
}

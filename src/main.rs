//! Runway Planner CLI
//!
//! Usage:
//!   `runway_planner plan --assumptions <json> [--optimize runway,growth] [--stage seed]`
//!   `runway_planner scenario --profile <json> [--kind cost_reduction] [--months 12]`

use anyhow::{Context, Result};
use chrono::Month;
use clap::{Args, Parser, Subcommand};
use runway_planner::{
    assumptions::{load_assumptions, load_capex_items, DEFAULT_ASSUMPTIONS_PATH},
    benchmarks::CompanyStage,
    company::CompanyProfile,
    optimization::OptimizationObjective,
    planner::{FinancialPlan, PlanRequest, PlanningService},
    projection::{MonthlyState, Runway},
    scenario::{ScenarioBaseline, ScenarioDefinition, ScenarioKind, ScenarioOutcome, ScenarioSimulator},
    storage::JsonFilePlanStore,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "runway_planner", version)]
#[command(about = "12-month financial projections, optimization and what-if scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project, optimize and score a 12-month plan
    Plan(PlanArgs),
    /// Simulate what-if scenarios against a baseline
    Scenario(ScenarioArgs),
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Plan assumptions (JSON)
    #[arg(long, default_value = DEFAULT_ASSUMPTIONS_PATH)]
    assumptions: PathBuf,

    /// Optimization objectives, applied in order (runway, growth, profitability)
    #[arg(long, value_delimiter = ',')]
    optimize: Vec<OptimizationObjective>,

    /// One-off CAPEX schedule (CSV: name,purchase_month,cost)
    #[arg(long)]
    capex_items: Option<PathBuf>,

    /// Company stage for benchmark thresholds (pre_seed, seed, series_a)
    #[arg(long)]
    stage: Option<CompanyStage>,

    /// Write the monthly series to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Save the plan as JSON in this directory
    #[arg(long)]
    store: Option<PathBuf>,

    /// Print the full plan as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ScenarioArgs {
    /// Company profile (JSON)
    #[arg(long, conflicts_with = "assumptions")]
    profile: Option<PathBuf>,

    /// Plan assumptions (JSON) to derive the baseline from
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Scenario templates to run; all templates when omitted
    #[arg(long, value_delimiter = ',')]
    kind: Vec<ScenarioKind>,

    /// Override every scenario's duration in months
    #[arg(long)]
    months: Option<u32>,

    /// Print the outcomes as JSON
    #[arg(long)]
    json: bool,
}

/// Flat monthly record for CSV output
#[derive(Debug, Serialize)]
struct MonthRow {
    month: u32,
    label: &'static str,
    customers: f64,
    new_customers: f64,
    mrr: f64,
    total_revenue: f64,
    total_opex: f64,
    total_capex: f64,
    net_cashflow: f64,
    cash_balance: f64,
    burn_rate: f64,
    runway: Runway,
    ltv_cac_ratio: f64,
    cac_payback_months: f64,
}

impl From<&MonthlyState> for MonthRow {
    fn from(m: &MonthlyState) -> Self {
        Self {
            month: m.month,
            label: month_label(m.month),
            customers: m.customers,
            new_customers: m.new_customers,
            mrr: m.mrr,
            total_revenue: m.total_revenue,
            total_opex: m.total_opex,
            total_capex: m.total_capex,
            net_cashflow: m.net_cashflow,
            cash_balance: m.cash_balance,
            burn_rate: m.burn_rate,
            runway: m.runway,
            ltv_cac_ratio: m.ltv_cac_ratio,
            cac_payback_months: m.cac_payback_months,
        }
    }
}

fn month_label(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("")
}

fn format_runway(runway: Runway) -> String {
    match runway {
        Runway::Months(months) => format!("{:.1}", months),
        Runway::Unlimited => "inf".to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Scenario(args) => run_scenarios(args),
    }
}

fn run_plan(args: PlanArgs) -> Result<()> {
    let mut assumptions = load_assumptions(&args.assumptions)
        .with_context(|| format!("loading assumptions from {}", args.assumptions.display()))?;

    if let Some(path) = &args.capex_items {
        let items = load_capex_items(path).with_context(|| format!("loading CAPEX items from {}", path.display()))?;
        assumptions.capex_items.extend(items);
    }

    let mut request = PlanRequest::new(assumptions).with_objectives(args.optimize.clone());
    if let Some(stage) = args.stage {
        request = request.with_stage(stage);
    }

    let mut service = PlanningService::default();
    if let Some(dir) = &args.store {
        service = service.with_store(Box::new(JsonFilePlanStore::new(dir)));
    }
    let plan = service.create_plan(&request).context("building plan")?;

    if let Some(path) = &args.output {
        write_csv(&plan, path).with_context(|| format!("writing {}", path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
        if let Some(path) = &args.output {
            println!("\nMonthly series written to: {}", path.display());
        }
    }
    Ok(())
}

fn write_csv(plan: &FinancialPlan, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for month in &plan.projection.months {
        writer.serialize(MonthRow::from(month))?;
    }
    writer.flush()?;
    Ok(())
}

fn print_plan(plan: &FinancialPlan) {
    println!("{}", plan.plan_name);
    println!("{}\n", "=".repeat(plan.plan_name.len().max(12)));

    println!(
        "{:>5} {:>9} {:>10} {:>12} {:>12} {:>12} {:>14} {:>8}",
        "Month", "", "Customers", "MRR", "Costs", "Net CF", "Cash", "Runway"
    );
    println!("{}", "-".repeat(90));
    for m in &plan.projection.months {
        println!(
            "{:>5} {:>9} {:>10.0} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:>8}",
            m.month,
            month_label(m.month),
            m.customers,
            m.mrr,
            m.total_costs,
            m.net_cashflow,
            m.cash_balance,
            format_runway(m.runway)
        );
    }

    let s = &plan.summary;
    println!("\nSummary:");
    println!("  Total Revenue: ${:.2}", s.total_revenue);
    println!("  Total Costs: ${:.2}", s.total_costs);
    println!("  Total Profit: ${:.2}", s.total_profit);
    println!("  Ending Cash: ${:.2}", s.ending_cash);
    println!("  Avg Monthly Growth: {:.2}%", s.avg_monthly_growth * 100.0);
    println!("  Min Runway: {}", s.min_runway.map_or("none".to_string(), |r| format!("{:.1} months", r)));
    match s.breakeven_month {
        Some(month) => println!("  Breakeven: month {}", month),
        None => println!("  Breakeven: not reached"),
    }

    let f = &plan.feasibility;
    println!("\nFeasibility score: {:.0}/100", f.score);
    for finding in f.findings() {
        println!("  [{:?}] {}", finding.severity, finding.message);
    }
    for line in &f.advice {
        println!("  - {}", line);
    }

    let pending: Vec<_> = plan.pending_recommendations().collect();
    if !pending.is_empty() {
        println!("\nRecommendations awaiting confirmation:");
        for r in pending {
            println!("  Month {:>2}: {} ({})", r.month, r.title, r.suggestion);
        }
    }

    if let Some(id) = &plan.plan_id {
        println!("\nSaved as {}", id);
    }
    if let Some(e) = &plan.storage_error {
        println!("\nPlan was not saved: {}", e);
    }
}

fn load_baseline(args: &ScenarioArgs) -> Result<ScenarioBaseline> {
    if let Some(path) = &args.profile {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let profile: CompanyProfile =
            serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))?;
        return Ok(ScenarioBaseline::from_profile(&profile));
    }

    let path = args
        .assumptions
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSUMPTIONS_PATH));
    let assumptions =
        load_assumptions(&path).with_context(|| format!("loading assumptions from {}", path.display()))?;
    Ok(ScenarioBaseline::from_assumptions(&assumptions))
}

fn run_scenarios(args: ScenarioArgs) -> Result<()> {
    let baseline = load_baseline(&args)?;

    let kinds = if args.kind.is_empty() {
        ScenarioKind::TEMPLATES.to_vec()
    } else {
        args.kind.clone()
    };
    let definitions: Vec<ScenarioDefinition> = kinds
        .into_iter()
        .map(|kind| {
            let definition = ScenarioDefinition::template(kind);
            match args.months {
                Some(months) => definition.with_duration(months),
                None => definition,
            }
        })
        .collect();

    let report = ScenarioSimulator::new(baseline).run_batch(&definitions);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for outcome in report.outcomes() {
        print_outcome(outcome);
    }
    for (name, error) in report.failures() {
        println!("{}: FAILED ({})\n", name, error);
    }

    println!("Ranking:");
    for r in &report.ranking {
        println!("  {}. {:<24} score {:>8.2} (risk factor {:.1})", r.rank, r.name, r.score, r.risk_factor);
    }
    if let Some(best) = &report.best {
        println!("\nRecommended: {}", best.name);
        for s in &best.strengths {
            println!("  + {}", s);
        }
        for r in &best.risks {
            println!("  ! {}", r);
        }
    }
    Ok(())
}

fn print_outcome(outcome: &ScenarioOutcome) {
    let m = &outcome.metrics;
    println!("{} ({} months)", outcome.name, outcome.duration_months);
    println!("  Ending MRR: ${:.2}", m.ending_mrr);
    println!("  Ending Cash: ${:.2}", m.ending_cash);
    println!("  Ending Runway: {}", format_runway(m.ending_runway));
    println!("  Total Profit: ${:.2}", m.total_profit);
    println!("  Runway level: {:?}, cash risk: {:?}", outcome.impact.runway, outcome.impact.risks.cash);
    for d in &outcome.comparison.key_differences {
        println!("  * {}", d);
    }
    for r in &outcome.recommendations {
        println!("  - {}", r);
    }
    println!();
}

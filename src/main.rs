//! Fitness Appraisal CLI
//!
//! Command-line interface for running a plan projection and its valuation

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;

use fitness_appraisal::assumptions::loader::{self, DEFAULT_PLAN_PATH};
use fitness_appraisal::capital::{depreciation_schedule, AssetDepreciation};
use fitness_appraisal::error::ValuationResult;
use fitness_appraisal::projection::{
    default_start_date, AcquisitionPolicy, MonthZero, ProjectionConfig, ProjectionEngine, ProjectionSummary,
    YearSummary,
};
use fitness_appraisal::valuation::{valuation_metrics, ValuationMetrics};
use fitness_appraisal::{MonthlyRecord, PlanInputs};

#[derive(Parser, Debug)]
#[command(name = "fitness-appraisal", version, about = "Monthly projection and investment appraisal for a fitness business")]
struct Args {
    /// Plan directory holding assumptions.json, expenses.csv and investments.csv
    #[arg(long, default_value = DEFAULT_PLAN_PATH)]
    plan_dir: PathBuf,

    /// Assumptions JSON overriding the plan directory's
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Expense CSV overriding the plan directory's
    #[arg(long)]
    expenses: Option<PathBuf>,

    /// Investment CSV overriding the plan directory's
    #[arg(long)]
    investments: Option<PathBuf>,

    /// Where to write every monthly record
    #[arg(short, long, default_value = "projection_output.csv")]
    output: PathBuf,

    /// Print metrics and yearly summary as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Book the capital outlay in the first operating month instead of a month-zero record
    #[arg(long)]
    fold_month_zero: bool,

    /// Reproduce the historical acquisition arithmetic (negative joiners, no capacity cap)
    #[arg(long)]
    allow_negative_acquisition: bool,

    /// Print the per-asset depreciation schedule
    #[arg(long)]
    depreciation: bool,

    /// First operating month (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Number of months printed to the console
    #[arg(long, default_value_t = 24)]
    preview: usize,
}

#[derive(Serialize)]
struct Report<'a> {
    metrics: &'a ValuationMetrics,
    summary: ProjectionSummary,
    yearly: Vec<YearSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depreciation: Option<Vec<AssetDepreciation>>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let plan = load_plan(&args)?;
    plan.validate().context("Plan failed validation")?;

    let config = ProjectionConfig {
        start_date: args.start.unwrap_or_else(default_start_date),
        month_zero: if args.fold_month_zero {
            MonthZero::FoldedIntoFirstMonth
        } else {
            MonthZero::SeparateRecord
        },
        acquisition: if args.allow_negative_acquisition {
            AcquisitionPolicy::HistoricalParity
        } else {
            AcquisitionPolicy::ClampAtZero
        },
    };

    let engine = ProjectionEngine::new(plan.assumptions.clone(), config);
    let result = engine.project(&plan.expenses, &plan.investments);
    let metrics = valuation_metrics(&result.records, &plan.assumptions);
    log::info!("Projected {} records", result.records.len());

    write_records(&args.output, &result.records)?;

    let schedule = args
        .depreciation
        .then(|| depreciation_schedule(&plan.investments, plan.assumptions.project_life));

    if args.json {
        let report = Report {
            metrics: &metrics,
            summary: result.summary(),
            yearly: result.yearly_summary(),
            depreciation: schedule,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Fitness Appraisal v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");

    let a = &plan.assumptions;
    println!("Plan:");
    println!("  Target joiners/month: {}", a.monthly_new_members);
    println!("  Capacity: {}", a.max_capacity);
    println!("  Project life: {} years", a.project_life);
    println!("  Total investment: {:.2}", result.total_investment);
    if result.loan_emi > 0.0 {
        println!("  Loan EMI: {:.2} over {} years", result.loan_emi, a.loan.tenure_years);
    }
    println!();

    println!("Projection ({} records):", result.records.len());
    println!(
        "{:>5} {:>6} {:>5} {:>6} {:>6} {:>6} {:>14} {:>14} {:>8} {:>14} {:>16}",
        "Month", "Label", "New", "Repeat", "Expire", "Total", "Revenue", "Expenses", "GM%", "FCF", "CumDCF"
    );
    println!("{}", "-".repeat(112));

    for row in result.records.iter().take(args.preview) {
        println!(
            "{:>5} {:>6} {:>5} {:>6} {:>6} {:>6} {:>14.2} {:>14.2} {:>8} {:>14.2} {:>16.2}",
            row.month,
            row.label,
            row.new_members,
            row.repeat_members,
            row.expired_members,
            row.total_members,
            row.total_revenue,
            row.expenses,
            fmt_pct(row.gross_margin_pct),
            row.fcf,
            row.cumulative_dcf,
        );
    }

    if result.records.len() > args.preview {
        println!("... ({} more months)", result.records.len() - args.preview);
    }
    println!("\nFull results written to: {}", args.output.display());

    println!("\nYearly:");
    println!("{:>4} {:>16} {:>16} {:>16} {:>16} {:>8}", "Year", "Revenue", "EBITDA", "PAT", "FCF", "Members");
    for year in result.yearly_summary() {
        println!(
            "{:>4} {:>16.2} {:>16.2} {:>16.2} {:>16.2} {:>8}",
            year.year + 1,
            year.revenue,
            year.ebitda,
            year.pat,
            year.fcf,
            year.closing_members
        );
    }

    println!("\nValuation:");
    println!("  NPV: {:.2}", metrics.npv);
    println!("  IRR: {}", fmt_rate(&metrics.irr));
    println!("  MIRR: {}", fmt_rate(&metrics.mirr));
    println!("  Payback: {}", fmt_years(metrics.payback_period));
    println!("  Discounted payback: {}", fmt_years(metrics.discounted_payback_period));
    println!("  Salvage value: {:.2}", metrics.salvage_value);

    if let Some(schedule) = schedule {
        println!("\nDepreciation:");
        for asset in schedule {
            let charges: Vec<String> = asset.years.iter().map(|y| format!("{:.0}", y.depreciation)).collect();
            println!(
                "  {:<24} {:>12.0} @ {:>5.1}%: {}",
                asset.name,
                asset.cost,
                asset.depreciation_rate,
                charges.join(" ")
            );
        }
    }

    Ok(())
}

/// Plan directory first, then per-file overrides
fn load_plan(args: &Args) -> Result<PlanInputs> {
    let mut plan = PlanInputs::load_from(&args.plan_dir)
        .with_context(|| format!("Unable to load plan from {}", args.plan_dir.display()))?;

    if let Some(path) = &args.assumptions {
        plan.assumptions = loader::load_assumptions(path)
            .with_context(|| format!("Unable to read assumptions {}", path.display()))?;
    }
    if let Some(path) = &args.expenses {
        plan.expenses =
            loader::load_expenses(path).with_context(|| format!("Unable to read expenses {}", path.display()))?;
    }
    if let Some(path) = &args.investments {
        plan.investments = loader::load_investments(path)
            .with_context(|| format!("Unable to read investments {}", path.display()))?;
    }

    Ok(plan)
}

fn write_records(path: &Path, records: &[MonthlyRecord]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Unable to create {}", path.display()))?;
    for row in records {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_rate(value: &ValuationResult<f64>) -> String {
    match value {
        Ok(rate) => format!("{:.2}%", rate * 100.0),
        Err(e) => format!("n/a ({e})"),
    }
}

fn fmt_years(value: Option<f64>) -> String {
    value
        .map(|years| format!("{years:.2} years"))
        .unwrap_or_else(|| "not reached".to_string())
}

use clap::Args;
use serde_json::Value;
use tracing::debug;

use deal_metrics_core::aggregate::calculate_deal_totals;
use deal_metrics_core::analysis::{analyze_deal, compare_deals};
use deal_metrics_core::cash_flow::project_cash_flow;
use deal_metrics_core::deal::Deal;
use deal_metrics_core::health::score_deal_health;
use deal_metrics_core::DealMetricsError;

use crate::input;

/// Arguments for any single-deal command
#[derive(Args)]
pub struct DealArgs {
    /// Path to JSON deal file (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for two-scenario comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to the scenario A deal file
    #[arg(long)]
    pub a: String,

    /// Path to the scenario B deal file
    #[arg(long)]
    pub b: String,
}

fn load_deal(args: &DealArgs, command: &str) -> Result<Deal, Box<dyn std::error::Error>> {
    let deal: Deal = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err(format!("--input <deal.json> or stdin required for {command}").into());
    };
    debug!(deal_id = %deal.id, items = deal.line_items.len(), "loaded deal");
    Ok(deal)
}

pub fn run_totals(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal = load_deal(&args, "totals")?;
    Ok(serde_json::to_value(calculate_deal_totals(&deal))?)
}

pub fn run_health(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal = load_deal(&args, "health scoring")?;
    let totals = calculate_deal_totals(&deal);
    Ok(serde_json::to_value(score_deal_health(&deal, &totals))?)
}

pub fn run_cash_flow(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal = load_deal(&args, "cash-flow projection")?;
    let totals = calculate_deal_totals(&deal);
    Ok(serde_json::to_value(project_cash_flow(&totals, deal.billing))?)
}

pub fn run_analyze(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal = load_deal(&args, "analysis")?;
    Ok(serde_json::to_value(analyze_deal(&deal))?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.a == args.b {
        return Err(DealMetricsError::InvalidInput {
            field: "--b".into(),
            reason: "scenario B must be a different file from scenario A".into(),
        }
        .into());
    }
    let a: Deal = input::file::read_json(&args.a)?;
    let b: Deal = input::file::read_json(&args.b)?;
    Ok(serde_json::to_value(compare_deals(&a, &b))?)
}

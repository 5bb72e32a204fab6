mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::deal::{CompareArgs, DealArgs};

/// Deal valuation and unit-economics metrics
#[derive(Parser)]
#[command(
    name = "dealm",
    version,
    about = "Deal valuation and unit-economics metrics",
    long_about = "A CLI for valuing sales contracts with decimal precision. Computes MRR, \
                  ARR, TCV, margin, CAC/LTV, payback, a month-by-month cash-flow \
                  projection, a deal health score, and two-scenario comparisons."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true, env = "DEALM_OUTPUT")]
    output: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Deal-level totals (MRR, TCV, margin, CAC/LTV, payback, discount depth)
    Totals(DealArgs),
    /// Rule-based deal health score
    Health(DealArgs),
    /// Month-by-month cumulative profit net of CAC
    CashFlow(DealArgs),
    /// Totals, line-item breakdown, health and cash flow in one envelope
    Analyze(DealArgs),
    /// Compare two deals as scenario A and scenario B
    Compare(CompareArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Totals(args) => commands::deal::run_totals(args),
        Commands::Health(args) => commands::deal::run_health(args),
        Commands::CashFlow(args) => commands::deal::run_cash_flow(args),
        Commands::Analyze(args) => commands::deal::run_analyze(args),
        Commands::Compare(args) => commands::deal::run_compare(args),
        Commands::Version => {
            println!("dealm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::AmortizationArgs;
use commands::project::ProjectArgs;
use commands::scenarios::ScenariosArgs;
use commands::sensitivity::SensitivityArgs;

/// Project appraisal projections with decimal precision
#[derive(Parser)]
#[command(
    name = "proforma",
    version,
    about = "Project appraisal projections with decimal precision",
    long_about = "A CLI for deterministic investment-project appraisal: pro-forma cash \
                  flow, income statement and balance sheet series, loan amortisation \
                  schedules, profitability indicators (NPV, IRR, MIRR, payback, ROI, \
                  BCR, break-even), one-way sensitivity sweeps and scenario analysis."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full projection: statements, amortisations and indicators
    Project(ProjectArgs),
    /// One-way sensitivity sweep with tornado ranking
    Sensitivity(SensitivityArgs),
    /// Evaluate named what-if scenarios against the base model
    Scenarios(ScenariosArgs),
    /// Print an equal-principal loan amortisation schedule
    Amortization(AmortizationArgs),
    /// Print the version
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Project(args) => commands::project::run_project(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::Amortization(args) => commands::amortization::run_amortization(args),
        Commands::Version => {
            println!("proforma {}", env!("CARGO_PKG_VERSION"));
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

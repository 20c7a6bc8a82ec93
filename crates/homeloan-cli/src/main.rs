mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::financing::{FinancingArgs, RemainingDebtArgs};
use commands::jurisdiction::JurisdictionsArgs;
use output::locale::Locale;

/// Mortgage financing for residential property purchases
#[derive(Parser)]
#[command(
    name = "homeloan",
    version,
    about = "Mortgage financing for residential property purchases",
    long_about = "Computes acquisition costs, loan amount, the monthly annuity split into \
                  interest and repayment, the estimated payoff term, total monthly cost and \
                  remaining debt for a fixed-repayment annuity loan, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Language of the report output
    #[arg(long, default_value = "en", global = true)]
    locale: Locale,

    /// Log debug details to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full financing calculation for a purchase
    Financing(FinancingArgs),
    /// Remaining debt after a number of years, optionally per year
    RemainingDebt(RemainingDebtArgs),
    /// List acquisition cost presets
    Jurisdictions(JurisdictionsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
    Report,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Financing(args) => commands::financing::run_financing(args),
        Commands::RemainingDebt(args) => commands::financing::run_remaining_debt(args),
        Commands::Jurisdictions(args) => commands::jurisdiction::run_jurisdictions(args),
        Commands::Version => {
            println!("homeloan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, cli.locale, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

//! Bet-code Command Line Interface
//!
//! Parses submissions against a config directory and lists its catalogs.
//!
//! # Usage
//!
//! ```bash
//! # Parse a submission from stdin
//! printf 'mb\n23.45.67dd10\n' | betcode_cli parse
//!
//! # Parse a file for a caller limited to two stations, JSON output
//! betcode_cli parse --file bet.txt --accessible 20,21 -o json
//!
//! # List catalogs
//! betcode_cli stations
//! betcode_cli bet-types
//! ```

use betcode::{
    BetCodeAssembler, CatalogLoader, Catalogs, ParseResult, ParsedSubmission, Settings,
};
use betcode_types::PayoutRate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rust_decimal::Decimal;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "betcode_cli")]
#[command(version = "0.1.0")]
#[command(about = "Parse and price bet-code submissions")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json, text, or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,

    /// Config directory (defaults to BETCODE_CONFIG_DIR or ./config)
    #[arg(long, global = true, env = "BETCODE_CONFIG_DIR")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
    Pretty,
}

/// How a command that produced its output ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    /// The failure was already reported on stdout
    Failed,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and price a submission
    Parse {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Accessible station ids, comma separated (all stations if omitted)
        #[arg(long, value_delimiter = ',')]
        accessible: Vec<i64>,

        /// Commission multiplier (overrides settings.yaml)
        #[arg(long)]
        price_rate: Option<Decimal>,
    },

    /// List stations
    Stations,

    /// List bet types with aliases and payout rates
    BetTypes,

    /// List number combinations
    Combinations,
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(dir) => CatalogLoader::new(dir),
        None => CatalogLoader::from_env(),
    };

    let result = match cli.command {
        Commands::Parse {
            file,
            accessible,
            price_rate,
        } => cmd_parse(&loader, file, &accessible, price_rate, cli.format),
        Commands::Stations => cmd_stations(&loader, cli.format),
        Commands::BetTypes => cmd_bet_types(&loader, cli.format),
        Commands::Combinations => cmd_combinations(&loader, cli.format),
    };

    match result {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Failed) => ExitCode::FAILURE,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": e }));
            } else {
                eprintln!("{}: {}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn load(loader: &CatalogLoader) -> Result<(Catalogs, Settings), String> {
    let mut catalogs = loader.load_catalogs().map_err(|e| format!("{:#}", e))?;
    let settings = loader.load_settings().map_err(|e| format!("{:#}", e))?;
    catalogs.apply_payout_overrides(&settings.payout_overrides);
    Ok((catalogs, settings))
}

fn cmd_parse(
    loader: &CatalogLoader,
    file: Option<PathBuf>,
    accessible: &[i64],
    price_rate: Option<Decimal>,
    format: OutputFormat,
) -> Result<Outcome, String> {
    let source = read_input(file)?;
    let (catalogs, settings) = load(loader)?;

    let accessible = catalogs.stations_with_ids(accessible);
    let price_rate = price_rate.unwrap_or(settings.price_rate);

    let assembler = BetCodeAssembler::from_catalogs(&catalogs).with_options(settings.options);
    let submission = assembler.parse_submission(&source, &accessible, price_rate);

    report_submission(format, submission)
}

/// Print a parse result; a rejected submission never ends in success.
fn report_submission(
    format: OutputFormat,
    submission: ParseResult<ParsedSubmission>,
) -> Result<Outcome, String> {
    match (format, submission) {
        (OutputFormat::Json, Ok(parsed)) => print_json(&parsed)?,
        (OutputFormat::Json, Err(err)) => {
            print_json(&serde_json::json!({
                "error": err,
                "kind": err.kind(),
                "message": err.to_string(),
            }))?;
            return Ok(Outcome::Failed);
        }
        (OutputFormat::Text, Ok(parsed)) => println!("{}", parsed.formatted_text),
        (OutputFormat::Pretty, Ok(parsed)) => print_pretty(&parsed),
        (_, Err(err)) => return Err(err.to_string()),
    }

    Ok(Outcome::Success)
}

fn print_pretty(parsed: &ParsedSubmission) {
    println!(
        "{} {}",
        "Stations:".cyan().bold(),
        parsed.station_selection.describe()
    );
    for line in &parsed.lines {
        match &line.error {
            None => println!(
                "  {} {:<24} stake {:>12}  prize {:>14}",
                format!("[{}]", line.line_number).dimmed(),
                line.render(),
                line.stake.normalize(),
                line.potential_prize.normalize()
            ),
            Some(err) => println!(
                "  {} {:<24} {}",
                format!("[{}]", line.line_number).dimmed(),
                line.original_text,
                err.to_string().red()
            ),
        }
    }
    for warning in &parsed.warnings {
        let location = warning
            .line
            .map(|l| format!(" (line {})", l))
            .unwrap_or_default();
        println!("  {}{} {}", "warning".yellow(), location, warning.message);
    }
    println!(
        "{} stake {}  potential prize {}",
        "Total:".green().bold(),
        parsed.total_stake.normalize(),
        parsed.total_potential_prize.normalize()
    );
}

fn cmd_stations(loader: &CatalogLoader, format: OutputFormat) -> Result<Outcome, String> {
    let stations = loader.load_stations().map_err(|e| format!("{:#}", e))?;

    match format {
        OutputFormat::Json => print_json(&stations)?,
        OutputFormat::Text | OutputFormat::Pretty => {
            for station in &stations {
                println!(
                    "{:>4}  {:<20} {:<10} {}",
                    station.id,
                    station.name.bold(),
                    station.region_code().shorthand(),
                    station.aliases.join(", ").dimmed()
                );
            }
        }
    }
    Ok(Outcome::Success)
}

fn cmd_bet_types(loader: &CatalogLoader, format: OutputFormat) -> Result<Outcome, String> {
    let (catalogs, _) = load(loader)?;

    match format {
        OutputFormat::Json => print_json(&catalogs.bet_types)?,
        OutputFormat::Text | OutputFormat::Pretty => {
            for bet_type in &catalogs.bet_types {
                let rate = match (&bet_type.custom_payout_rate, &bet_type.payout_rate) {
                    (Some(custom), _) => format!("{} (custom)", custom),
                    (None, Some(PayoutRate::Flat(rate))) => rate.to_string(),
                    (None, Some(PayoutRate::Table(table))) => table
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect::<Vec<_>>()
                        .join(" "),
                    (None, None) => "-".to_string(),
                };
                println!(
                    "{:>4}  {:<16} {:<12} {}",
                    bet_type.id,
                    bet_type.name.bold(),
                    bet_type.aliases.join(","),
                    rate.dimmed()
                );
            }
        }
    }
    Ok(Outcome::Success)
}

fn cmd_combinations(loader: &CatalogLoader, format: OutputFormat) -> Result<Outcome, String> {
    let combinations = loader.load_combinations().map_err(|e| format!("{:#}", e))?;

    match format {
        OutputFormat::Json => print_json(&combinations)?,
        OutputFormat::Text | OutputFormat::Pretty => {
            for combination in &combinations {
                let count = betcode::numbers::generate(&combination.generator)
                    .map(|n| n.len().to_string())
                    .unwrap_or_else(|| "unsupported".to_string());
                println!(
                    "{:<16} {:<12} {}",
                    combination.name.bold(),
                    combination.aliases.join(","),
                    count.dimmed()
                );
            }
        }
    }
    Ok(Outcome::Success)
}

// =============================================================================
// HELPERS
// =============================================================================

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {}", e))?
    );
    Ok(())
}

fn read_input(file: Option<PathBuf>) -> Result<String, String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e)),
        None => {
            if io::stdin().is_terminal() {
                return Err("No input provided. Use --file or pipe input via stdin.".to_string());
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(buffer)
        }
    }
}

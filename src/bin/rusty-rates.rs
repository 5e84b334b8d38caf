//! rusty-rates CLI - query exchange rates from a local feed file
//!
//! ## Example Usage
//!
//! ```bash
//! # Latest USD -> JPY rate from the ECB history file
//! rusty-rates convert --from USD --to JPY --feed eurofxref-hist.csv
//!
//! # Convert an amount on a given day, as JSON
//! rusty-rates convert --from GBP --to CHF --date 2024-01-02 --amount 250 --feed eurofxref-hist.csv --json
//!
//! # List loaded days
//! rusty-rates days --feed eurofxref-hist.csv
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rust_decimal::Decimal;
use rusty_rates::config::ProviderConfig;
use rusty_rates::currency::CurrencyCode;
use rusty_rates::data::fx::{EcbRateProvider, FeedFormat, FeedLoader, FileFeedLoader, RateProvider};
use rusty_rates::error::{RatesError, Result as RatesResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

/// rusty-rates: exchange rates from single-base daily feeds
#[derive(Parser)]
#[command(name = "rusty-rates")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Exchange rates from single-base daily feeds", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the rate between two currencies
    Convert {
        /// Source currency (ISO 4217)
        #[arg(short = 'f', long)]
        from: String,

        /// Target currency (ISO 4217)
        #[arg(short = 't', long)]
        to: String,

        /// Day (YYYY-MM-DD); defaults to the latest loaded day
        #[arg(short = 'd', long)]
        date: Option<String>,

        /// Amount of the source currency to convert
        #[arg(short = 'a', long)]
        amount: Option<Decimal>,

        /// Feed file to load
        #[arg(long, value_name = "FILE")]
        feed: PathBuf,

        /// Feed layout (overrides the config file)
        #[arg(long, value_parser = parse_format)]
        format: Option<FeedFormat>,

        /// Print the resolved rate as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the days contained in a feed
    Days {
        /// Feed file to load
        #[arg(long, value_name = "FILE")]
        feed: PathBuf,

        /// Feed layout (overrides the config file)
        #[arg(long, value_parser = parse_format)]
        format: Option<FeedFormat>,
    },
}

fn parse_format(s: &str) -> Result<FeedFormat, String> {
    match s {
        "ecb" | "ecb_wide" => Ok(FeedFormat::EcbWide),
        "triples" => Ok(FeedFormat::Triples),
        other => Err(format!("unknown feed format '{}', expected ecb or triples", other)),
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rusty-rates").join("config.toml"))
}

fn load_config(path: Option<&Path>) -> ProviderConfig {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) if path.exists() => path,
        _ => return ProviderConfig::default(),
    };

    match fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} Failed to parse config: {}", "Warning:".yellow(), e);
                ProviderConfig::default()
            }
        },
        Err(e) => {
            eprintln!("{} Failed to read config: {}", "Warning:".yellow(), e);
            ProviderConfig::default()
        }
    }
}

/// Build a provider and load `feed` into it through a file loader
fn load_provider(
    mut config: ProviderConfig,
    feed: &Path,
    format: Option<FeedFormat>,
) -> RatesResult<Arc<EcbRateProvider>> {
    if let Some(format) = format {
        config.feed_format = format;
    }

    let provider = Arc::new(EcbRateProvider::new(config)?);
    let loader = FileFeedLoader::new();
    loader.register(provider.data_id(), feed);
    loader.add_listener(provider.data_id(), provider.clone());
    loader.load_data_blocking(provider.data_id())?;

    if provider.loaded_days().is_empty() {
        return Err(RatesError::DataError(format!(
            "No rates could be loaded from {}",
            feed.display()
        )));
    }
    Ok(provider)
}

fn convert(
    config: ProviderConfig,
    from: &str,
    to: &str,
    date: Option<&str>,
    amount: Option<Decimal>,
    feed: &Path,
    format: Option<FeedFormat>,
    json: bool,
) -> RatesResult<()> {
    let base: CurrencyCode = from.parse()?;
    let term: CurrencyCode = to.parse()?;
    let date = date
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|e| RatesError::ParseError(format!("Invalid date {}: {}", d, e)))
        })
        .transpose()?;

    let provider = load_provider(config, feed, format)?;
    let rate = match provider.get_rate(base, term, date)? {
        Some(rate) => rate,
        None => {
            println!("{} No rate for {}/{}", "Unknown:".yellow(), base, term);
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rate)?);
        return Ok(());
    }

    println!("{}", rate.to_string().green().bold());
    for leg in &rate.chain {
        println!("  via {}", leg.to_string().dimmed());
    }
    if let Some(amount) = amount {
        println!("{} {} = {} {}", amount, base, rate.convert(amount)?, term);
    }
    Ok(())
}

fn list_days(config: ProviderConfig, feed: &Path, format: Option<FeedFormat>) -> RatesResult<()> {
    let provider = load_provider(config, feed, format)?;
    let days = provider.loaded_days();
    for day in &days {
        println!("{}", day);
    }
    println!("{} {} days", "Loaded".cyan(), days.len());
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref());

    if cli.verbose {
        println!(
            "{} v{}",
            "rusty-rates".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Base: {}, variant: {}, zone: {}",
            config.base_currency,
            config.variant.data_id(),
            config.timezone.dimmed()
        );
    }

    let result = match cli.command {
        Commands::Convert {
            from,
            to,
            date,
            amount,
            feed,
            format,
            json,
        } => convert(
            config,
            &from,
            &to,
            date.as_deref(),
            amount,
            &feed,
            format,
            json,
        ),
        Commands::Days { feed, format } => list_days(config, &feed, format),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

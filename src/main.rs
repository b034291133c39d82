use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use home_expense::chart::save_daily_chart;
use home_expense::config::Config;
use home_expense::core::{Category, MonthKey, upsert};
use home_expense::store::{LedgerStore, RetryingStore, spawn_save};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "home-expense", about = "Record daily household expenses")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct MonthArgs {
    #[arg(long)]
    year: i32,
    #[arg(long)]
    month: u32,
}

impl MonthArgs {
    fn key(&self) -> Result<MonthKey, home_expense::core::LedgerError> {
        MonthKey::new(self.year, self.month)
    }
}

/// Amount fields of the entry form. Omitted fields are recorded as zero.
#[derive(Args)]
struct AmountArgs {
    #[arg(long)]
    grocery: Option<String>,
    #[arg(long)]
    hotel: Option<String>,
    #[arg(long)]
    laundry: Option<String>,
    #[arg(long)]
    college: Option<String>,
    #[arg(long)]
    bus: Option<String>,
    #[arg(long)]
    dewa: Option<String>,
    #[arg(long)]
    gas: Option<String>,
    #[arg(long)]
    etisalat: Option<String>,
    #[arg(long)]
    elife: Option<String>,
    #[arg(long)]
    petrol: Option<String>,
    #[arg(long)]
    misc: Option<String>,
}

impl AmountArgs {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        let fields = [
            (Category::Grocery, &self.grocery),
            (Category::Hotel, &self.hotel),
            (Category::Laundry, &self.laundry),
            (Category::College, &self.college),
            (Category::Bus, &self.bus),
            (Category::Dewa, &self.dewa),
            (Category::Gas, &self.gas),
            (Category::Etisalat, &self.etisalat),
            (Category::Elife, &self.elife),
            (Category::Petrol, &self.petrol),
            (Category::Misc, &self.misc),
        ];
        fields
            .into_iter()
            .filter_map(|(c, v)| v.as_deref().map(|v| (c.name(), v)))
            .collect()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the ledger for a month if it does not exist
    Init {
        #[command(flatten)]
        month: MonthArgs,
    },
    /// Record the amounts spent on a day
    Add {
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        amounts: AmountArgs,
    },
    /// Show the amounts recorded for a day
    Show {
        #[arg(long)]
        date: NaiveDate,
    },
    /// List every row of a month
    List {
        #[command(flatten)]
        month: MonthArgs,
        /// Print the ledger as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the monthly total
    Summary {
        #[command(flatten)]
        month: MonthArgs,
    },
    /// Save a bar chart of daily totals as SVG
    Chart {
        #[command(flatten)]
        month: MonthArgs,
        #[arg(long)]
        out: PathBuf,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let cfg = match path {
        Some(path) => Config::load(&path)?,
        None => Config::load_or_default(&PathBuf::from("config.toml"))?,
    };
    Ok(cfg.with_env_overrides())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config)?;
    let (primary, secondary) = cfg.currencies()?;
    let (primary, secondary) = (primary.code(), secondary.code());
    let mut store = RetryingStore::new(cfg.store(), cfg.save_retries, cfg.retry_delay());
    info!(data_dir = %cfg.data_dir.display(), "Using ledger directory");

    match cli.command {
        Commands::Init { month } => {
            let key = month.key()?;
            let ledger = store.ensure(key)?;
            println!("{key}: {} days", ledger.days().len());
        }
        Commands::Add { date, amounts } => {
            let ledger = store.ensure(MonthKey::of(date))?;
            let out = upsert(&ledger, date, amounts.entries())?;
            let pending = spawn_save(store, out.ledger);
            println!(
                "Saved! Total ({primary}): {:.2} | Total ({secondary}): {:.2}",
                out.totals.primary, out.totals.secondary
            );
            pending.wait()?;
        }
        Commands::Show { date } => {
            let ledger = store.ensure(MonthKey::of(date))?;
            if let Some(day) = ledger.day(date) {
                println!("{} ({})", day.date(), day.weekday());
                for (category, amount) in day.categories().iter() {
                    println!("{category}: {amount:.2}");
                }
                println!(
                    "Total ({primary}): {:.2} | Total ({secondary}): {:.2}",
                    day.total_primary(),
                    day.total_secondary()
                );
            } else {
                println!("No entry for {date}");
            }
        }
        Commands::List { month, json } => {
            let ledger = store.ensure(month.key()?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ledger)?);
            } else {
                for row in ledger.rows() {
                    println!("{}", row.join(" | "));
                }
            }
        }
        Commands::Summary { month } => {
            let ledger = store.ensure(month.key()?)?;
            println!(
                "Monthly Expense ({primary}): {:.2} | ({secondary}): {:.2}",
                ledger.monthly_total(),
                ledger.monthly_total_secondary()
            );
        }
        Commands::Chart { month, out } => {
            let ledger = store.ensure(month.key()?)?;
            save_daily_chart(&ledger, primary, &out)?;
            println!("Graph saved to {}", out.display());
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

use songstats::artists::{artist_list, suggest_artists};
use songstats::catalog::build_from_csv;
use songstats::config::Config;
use songstats::popularity::compare_artist_popularity;
use songstats::progress::{format_duration, set_log_only};
use songstats::ranking::top_artists;
use songstats::report::ChartSeries;
use songstats::safety::validate_catalog_path;
use songstats::store::SqliteCatalog;
use songstats::validate::YearInput;
use songstats::yearly::genre_stats_for_year;
use songstats::{settle, StatsError};

const SUGGESTION_LIMIT: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "songstats")]
#[command(about = "Build a normalized song catalog from a CSV table and report statistics over it")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog database (overrides the config file)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Print results as JSON, including chart series
    #[arg(long, global = true)]
    json: bool,

    /// Hide progress bars and log progress lines instead
    #[arg(long, global = true)]
    log_only: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean the raw CSV table and replace the catalog with it
    Build {
        /// Raw song table (CSV with header)
        csv: PathBuf,
    },

    /// List every artist in the catalog
    Artists,

    /// Compare an artist's popularity per genre against the genre average
    Artist {
        /// Exact artist name
        name: String,
    },

    /// Per-genre statistics for one year
    Genres {
        year: String,
    },

    /// Top artists by composite rank value over a year range
    Top {
        start: String,
        end: String,
    },
}

#[derive(Serialize)]
struct ChartedOutput<'a, T: Serialize> {
    result: &'a T,
    chart: ChartSeries,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn emit<T>(json: bool, result: &T, chart: ChartSeries) -> Result<()>
where
    T: Serialize + std::fmt::Display,
{
    if json {
        print_json(&ChartedOutput { result, chart })
    } else {
        print!("{}", result);
        Ok(())
    }
}

fn year_arg(raw: &str) -> songstats::Result<i64> {
    raw.to_year()
        .ok_or_else(|| StatsError::InvalidInput(format!("'{}' is not a year", raw)))
}

fn run_build(cli: &Cli, config: &Config, csv: &Path) -> Result<()> {
    validate_catalog_path(&config.database, &[csv])
        .context("Refusing to replace the catalog")?;

    let store = SqliteCatalog::new(&config.database);
    info!("Reading raw song table: {:?}", csv);
    info!("Writing catalog: {:?}", store.path());
    let summary = build_from_csv(csv, &store, &config.filters)
        .with_context(|| format!("Failed to build catalog from {:?}", csv))?;

    if cli.json {
        return print_json(&summary);
    }

    println!("\n{:=<60}", "");
    println!("Catalog build complete!");
    println!("  Rows read: {}", summary.rows_read);
    println!("  Rows retained: {}", summary.rows_retained);
    println!("  Artists: {}", summary.artists);
    println!("  Genres: {}", summary.genres);
    println!("  Songs: {}", summary.songs);
    println!(
        "  Elapsed: {}",
        format_duration(Duration::from_secs_f64(summary.elapsed_seconds))
    );
    println!("{:=<60}", "");
    Ok(())
}

fn run_artist(cli: &Cli, store: &SqliteCatalog, name: &str) -> Result<()> {
    let result = compare_artist_popularity(store, name);
    let unknown = matches!(result, Err(StatsError::NotFound(_)));

    if let Some(comparison) = settle(result) {
        return emit(cli.json, &comparison, comparison.chart());
    }
    if !unknown {
        return Ok(());
    }

    let names = settle(artist_list(store)).unwrap_or_default();
    let suggestions = suggest_artists(&names, name, SUGGESTION_LIMIT);
    if cli.json {
        print_json(&suggestions)
    } else {
        if !suggestions.is_empty() {
            println!("Did you mean:");
            for suggestion in &suggestions {
                println!("  {}", suggestion);
            }
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    set_log_only(cli.log_only);

    let mut config = Config::load(cli.config.as_deref())
        .with_context(|| format!("Failed to load config: {:?}", cli.config))?;
    if let Some(database) = &cli.database {
        config.database = database.clone();
    }

    let start = Instant::now();
    let store = SqliteCatalog::new(&config.database);

    match &cli.cmd {
        Command::Build { csv } => run_build(&cli, &config, csv)?,
        Command::Artists => {
            if let Some(names) = settle(artist_list(&store)) {
                if cli.json {
                    print_json(&names)?;
                } else {
                    for name in &names {
                        println!("{}", name);
                    }
                }
            }
        }
        Command::Artist { name } => run_artist(&cli, &store, name)?,
        Command::Genres { year } => {
            if let Some(stats) = settle(genre_stats_for_year(&store, &config.years, year.as_str())) {
                emit(cli.json, &stats, stats.chart())?;
            }
        }
        Command::Top { start, end } => {
            let table = year_arg(start).and_then(|s| {
                let e = year_arg(end)?;
                top_artists(&store, &config.years, s, e, &config.ranking)
            });
            if let Some(table) = settle(table) {
                emit(cli.json, &table, table.chart())?;
            }
        }
    }

    info!("Done in {}", format_duration(start.elapsed()));
    Ok(())
}

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use visited_places::api::HttpLocationsApi;
use visited_places::app::{MapClick, RemoveClick, handle_map_click, handle_remove_click};
use visited_places::boundary::Boundaries;
use visited_places::config::Config;
use visited_places::highlight::{CountryHighlighter, HighlightOutcome};
use visited_places::location::LocationKind;
use visited_places::map::HeadlessMap;
use visited_places::presenter::ConsolePresenter;
use visited_places::store::LocationStore;

#[derive(Parser)]
#[command(author, version, about = "Track the places you have visited on a map")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize with a default config file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// Path to config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// List visited locations and counts
    List {
        /// Path to config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Add the place at a coordinate, as if the map was clicked there
    Add {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Which place to record: country, region or city (default: the first found)
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<LocationKind>,

        /// Visit date as YYYY-MM-DD (default: today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Path to config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Remove a visited location by id
    Remove {
        id: i64,

        /// Path to config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show which boundaries a country name highlights
    Highlight {
        country: String,

        /// Path to config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn parse_kind(raw: &str) -> Result<LocationKind, String> {
    match LocationKind::parse(raw) {
        LocationKind::Unknown(other) => Err(format!(
            "unknown location type '{other}', expected country, region or city"
        )),
        kind => Ok(kind),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{raw}', use YYYY-MM-DD"))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force, config } => init_config(&config, force),
        Commands::List { config } => {
            let config_data = load_config(&config)?;
            let mut store = build_store(&config_data, ConsolePresenter::new())?;

            println!("Visited locations from {}:", config_data.api_base_url);
            store.load().await?;

            let highlighted = store.highlighter().highlighted();
            if !highlighted.is_empty() {
                println!("Highlighted countries: {}", highlighted.join(", "));
            }
            Ok(())
        }
        Commands::Add {
            lat,
            lon,
            kind,
            date,
            config,
        } => {
            let config_data = load_config(&config)?;
            let geocoder = config_data.geocoder()?;
            let mut store = build_store(&config_data, ConsolePresenter::with_answers(kind, date))?;
            store.load().await?;

            match handle_map_click(&mut store, &geocoder, MapClick { lat, lon }).await? {
                Some(created) => {
                    println!("Added {} #{}", created.label(), created.id);
                    Ok(())
                }
                None => bail!("No place to add at {lat}, {lon}"),
            }
        }
        Commands::Remove { id, config } => {
            let config_data = load_config(&config)?;
            let mut store = build_store(&config_data, ConsolePresenter::new())?;
            store.load().await?;

            match handle_remove_click(&mut store, RemoveClick { id }).await? {
                Some(removed) => println!("Removed {} #{}", removed.label(), removed.id),
                None => println!("Location #{id} was not in the list"),
            }
            Ok(())
        }
        Commands::Highlight { country, config } => {
            let config_data = load_config(&config)?;
            let map = HeadlessMap::new();
            let highlighter = CountryHighlighter::new(config_data.boundaries()?);

            let outcome = highlighter
                .highlight(&map, &country)
                .await
                .with_context(|| format!("Failed to highlight {country}"))?;

            if let HighlightOutcome::Drawn(overlay) = outcome {
                let names = map
                    .overlays()
                    .into_iter()
                    .flat_map(|drawn| drawn.feature_names)
                    .collect::<Vec<_>>();
                println!("{country} highlights {} feature(s) in {}", names.len(), overlay.color);
                for name in names {
                    println!("  {name}");
                }
                match map.view() {
                    Some(bounds) => println!(
                        "Bounds: {:.2},{:.2} to {:.2},{:.2}",
                        bounds.south, bounds.west, bounds.north, bounds.east
                    ),
                    None => println!("Bounds: none"),
                }
            }
            Ok(())
        }
    }
}

fn build_store(
    config: &Config,
    presenter: ConsolePresenter,
) -> Result<LocationStore<HttpLocationsApi, Boundaries>> {
    let api = HttpLocationsApi::new(&config.api_base_url)?;
    let highlighter = CountryHighlighter::new(config.boundaries()?);

    Ok(LocationStore::new(
        api,
        highlighter,
        Arc::new(HeadlessMap::new()),
        Arc::new(presenter),
    ))
}

fn init_config(config_path_opt: &Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = Config::get_config_path(config_path_opt);

    if config_path.exists() && !force {
        println!("Config file already exists at {}", config_path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config::default();
    config
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!("Created config file at {}", config_path.display());
    Ok(())
}

fn load_config(config_path_opt: &Option<PathBuf>) -> Result<Config> {
    let config_path = Config::get_config_path(config_path_opt);

    if !config_path.exists() {
        bail!(
            "Config file not found at {}. Run 'visited_places init' to create one.",
            config_path.display()
        );
    }

    Config::load_from_file(&config_path)
}

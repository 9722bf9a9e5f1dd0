// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coil_core::config::GeoConfig;
use coil_core::fetch::{Adm1Fetcher, Adm1Origin, Adm1Provider, FetchStatus};
use coil_core::geometry;
use coil_core::{Country, GeoCollection, GeoFeature, GeoRegionService};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding ph_adm1.geojson / id_adm1.geojson
    #[arg(short, long, env = "COIL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long, env = "COIL_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the region matching a name (aliases, then partial match)
    Resolve { country: String, name: String },
    /// Find the region containing a point
    Locate {
        country: String,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
        #[arg(allow_negative_numbers = true)]
        lat: f64,
    },
    /// Print a region's bounding box as [minLng, minLat, maxLng, maxLat]
    Bbox { country: String, name: String },
    /// Print the macro group of an administrative unit
    Group { country: String, name: String },
    /// Print the canonical key of a name
    Canonical { country: String, name: String },
    /// List display groups and their member regions
    Groups { country: String },
    /// Print the features of a group label or region as a FeatureCollection
    Select { country: String, selection: String },
    /// Download ADM1 boundaries into the data directory
    Fetch {
        /// Overwrite existing local files
        #[arg(long)]
        force: bool,
    },
    /// Print the ADM1 document (local override, cache, or remote)
    Adm1 { country: String },
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    // Only fails if a logger is already installed
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn parse_country(code: &str) -> Result<Country> {
    code.parse::<Country>()
        .with_context(|| format!("Expected one of: ph, id (got '{}')", code))
}

fn describe(service: &GeoRegionService, country: Country, feature: &GeoFeature) {
    let name = feature.display_name().unwrap_or_else(|| "(unnamed)".to_string());
    println!("Name:      {}", name);
    println!("Canonical: {}", service.canonicalize(country, &name));
    if let Some(group) = service.group_of(country, &name) {
        println!("Group:     {}", group);
    }
    println!("Geometry:  {}", feature.geometry.type_name());
    match geometry::bbox(&feature.geometry) {
        Some(b) => println!("Bbox:      {:?}", b.to_array()),
        None => println!("Bbox:      (none)"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => GeoConfig::load_from(path),
        None => GeoConfig::load(),
    };
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    log::debug!("Using data_dir={} cache_dir={}", config.data_dir.display(), config.cache_dir.display());

    let service = GeoRegionService::from_config(&config);

    match &cli.command {
        Commands::Resolve { country, name } => {
            let country = parse_country(country)?;
            match service.find_region(country, name) {
                Some(feature) => describe(&service, country, &feature),
                None => println!("No region matching '{}' in {}", name, country.label()),
            }
        }
        Commands::Locate { country, lng, lat } => {
            let country = parse_country(country)?;
            match service.locate(country, *lng, *lat) {
                Some(feature) => describe(&service, country, &feature),
                None => println!("No region in {} contains ({}, {})", country.label(), lng, lat),
            }
        }
        Commands::Bbox { country, name } => {
            let country = parse_country(country)?;
            match service.region_bbox(country, name) {
                Some(b) => println!("{}", serde_json::to_string(&b)?),
                None => println!("null"),
            }
        }
        Commands::Group { country, name } => {
            let country = parse_country(country)?;
            // Ungrouped units stand for themselves
            let group = service.group_of(country, name).unwrap_or_else(|| name.clone());
            println!("{}", group);
        }
        Commands::Canonical { country, name } => {
            let country = parse_country(country)?;
            println!("{}", service.canonicalize(country, name));
        }
        Commands::Groups { country } => {
            let country = parse_country(country)?;
            let groups = service.groups(country);
            if groups.is_empty() {
                println!("No boundary data for {}", country.label());
            }
            for group in groups {
                println!("{} ({})", group.label, group.members.len());
                for member in &group.members {
                    println!("  - {}", member);
                }
            }
        }
        Commands::Select { country, selection } => {
            let country = parse_country(country)?;
            let selected = GeoCollection {
                country,
                features: service.select(country, selection),
            };
            if selected.is_empty() {
                log::warn!("Nothing selected — country={} selection={}", country, selection);
            }
            println!("{}", serde_json::to_string(&selected.to_json())?);
        }
        Commands::Fetch { force } => {
            let fetcher = Adm1Fetcher::new(config.clone())?;
            let report = fetcher.fetch_all(*force)?;
            for (country, status) in &report.entries {
                let code = country.code().to_uppercase();
                match status {
                    FetchStatus::Skipped(path) => println!("{}: exists -> {}", code, path.display()),
                    FetchStatus::Saved { path, url, bytes } => {
                        println!("{}: saved -> {} ({} bytes from {})", code, path.display(), bytes, url)
                    }
                    FetchStatus::Failed => eprintln!("Failed to fetch {} ADM1.", code),
                }
            }
            println!("Done. Downloaded: {}", report.downloaded());
            if report.downloaded() == 0 && !report.is_complete() {
                anyhow::bail!("No ADM1 files available");
            }
        }
        Commands::Adm1 { country } => {
            let country = parse_country(country)?;
            let provider = Adm1Provider::new(config.clone())?;
            let doc = provider
                .resolve(country)
                .with_context(|| format!("Failed to fetch ADM1 GeoJSON for {}", country))?;
            match &doc.origin {
                Adm1Origin::LocalOverride(path) => eprintln!("source: local {}", path.display()),
                Adm1Origin::Cache(path) => eprintln!("source: cache {}", path.display()),
                Adm1Origin::Remote(url) => eprintln!("source: {}", url),
            }
            println!("{}", doc.body);
        }
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if *save {
                match &cli.config {
                    Some(path) => config.save_to(path)?,
                    None => config.save()?,
                }
                let path = cli.config.clone().unwrap_or_else(GeoConfig::default_path);
                eprintln!("Saved {}", path.display());
            }
        }
    }

    Ok(())
}

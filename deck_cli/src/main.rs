//! # Deckwise CLI
//!
//! Loads reference data from CSV exports into the reference store, queries
//! it, and runs one-shot geometry checks.
//!
//! ```text
//! deckwise ingest-locations --truncate
//! deckwise lookup Kerala Idukki
//! deckwise validate --span 30 --carriageway-width 8.5 --girder-spacing 2.2 \
//!     --girder-count 4 --deck-overhang 1.75 --changed-field girder_spacing
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use deck_core::file_io::{load_or_default, save_store, FileLock};
use deck_core::geometry::{GeometryReport, GeometryRequest, Messages};
use deck_core::loading::CustomLoadingRequest;
use deck_core::reference::{read_environment_table, read_materials_csv, LocationRecord, ReferenceData};
use deck_core::{validate_geometry, IngestReport, ReferenceService, ServiceConfig};

#[derive(Parser)]
#[command(name = "deckwise")]
#[command(about = "Girder-deck geometry checks and bridge reference data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (defaults to ./deckwise.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the CSV exports (overrides DECKWISE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Reference store file (overrides DECKWISE_STORE)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a deck layout and print the balanced geometry
    Validate(ValidateArgs),
    /// Load location climate data from an environment table CSV
    #[command(name = "ingest-locations")]
    IngestLocations(IngestArgs),
    /// Load material grades from a materials CSV
    #[command(name = "ingest-materials")]
    IngestMaterials(IngestArgs),
    /// List every location grouped by state
    Locations,
    /// Show the climate data for one location
    Lookup { state: String, district: String },
    /// List material grades by category
    Materials,
    /// Validate a custom loading set
    #[command(name = "custom-loading")]
    CustomLoading(LoadingArgs),
}

#[derive(Args)]
struct ValidateArgs {
    /// Bridge span (m)
    #[arg(long)]
    span: f64,
    /// Clear carriageway width (m)
    #[arg(long)]
    carriageway_width: f64,
    /// Skew angle (degrees)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    skew_angle: f64,
    /// Girder spacing (m)
    #[arg(long)]
    girder_spacing: f64,
    /// Number of girders
    #[arg(long)]
    girder_count: i64,
    /// Deck overhang each side (m)
    #[arg(long)]
    deck_overhang: f64,
    /// Field edited last: girder_spacing, girder_count or deck_overhang
    #[arg(long)]
    changed_field: Option<String>,
    /// Print only the JSON report
    #[arg(long)]
    json: bool,
}

impl ValidateArgs {
    fn to_request(&self) -> GeometryRequest {
        GeometryRequest {
            span: Some(self.span),
            carriageway_width: Some(self.carriageway_width),
            skew_angle: Some(self.skew_angle),
            girder_spacing: Some(self.girder_spacing),
            girder_count: Some(self.girder_count),
            deck_overhang: Some(self.deck_overhang),
            changed_field: self.changed_field.clone(),
        }
    }
}

#[derive(Args)]
struct IngestArgs {
    /// CSV file to read (defaults to the file in the data directory)
    #[arg(long)]
    csv_path: Option<PathBuf>,
    /// Delete existing rows before loading
    #[arg(long)]
    truncate: bool,
}

#[derive(Args)]
struct LoadingArgs {
    /// Basic wind speed (m/s)
    #[arg(long)]
    wind: f64,
    #[arg(long)]
    seismic_zone: String,
    #[arg(long)]
    seismic_factor: f64,
    /// Maximum shade air temperature (°C)
    #[arg(long, allow_negative_numbers = true)]
    max_temp: f64,
    /// Minimum shade air temperature (°C)
    #[arg(long, allow_negative_numbers = true)]
    min_temp: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut config = ServiceConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(store) = cli.store {
        config.store_path = Some(store);
    }
    log::debug!("using reference store {}", config.store_path().display());

    match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::IngestLocations(args) => {
            let csv_path = args.csv_path.unwrap_or_else(|| config.environment_csv());
            let report = with_locked_store(&config.store_path(), "deckwise ingest-locations", |service| {
                let rows = read_environment_table(&csv_path)?;
                Ok(service.ingest_locations(&rows, args.truncate, &csv_path.display().to_string()))
            })?;
            print_ingest(&report);
            Ok(())
        }
        Commands::IngestMaterials(args) => {
            let csv_path = args.csv_path.unwrap_or_else(|| config.materials_csv());
            let report = with_locked_store(&config.store_path(), "deckwise ingest-materials", |service| {
                let rows = read_materials_csv(&csv_path)?;
                Ok(service.ingest_materials(&rows, args.truncate, &csv_path.display().to_string()))
            })?;
            print_ingest(&report);
            Ok(())
        }
        Commands::Locations => {
            let service = open_service(&config.store_path())?;
            let payload = service.list_locations()?;
            println!("{}", serde_json::to_string_pretty(&*payload)?);
            Ok(())
        }
        Commands::Lookup { state, district } => {
            let service = open_service(&config.store_path())?;
            let record = service.get_location(&state, &district)?;
            print!("{}", render_location(&record));
            Ok(())
        }
        Commands::Materials => {
            let service = open_service(&config.store_path())?;
            let listing = service.materials_by_category()?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(())
        }
        Commands::CustomLoading(args) => {
            let request = CustomLoadingRequest {
                wind: Some(args.wind),
                seismic_zone: Some(args.seismic_zone),
                seismic_factor: Some(args.seismic_factor),
                max_temp: Some(args.max_temp),
                min_temp: Some(args.min_temp),
            };
            let loading = request.validate()?;
            println!("Custom loading parameters are valid.");
            println!("{}", serde_json::to_string_pretty(&loading)?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn open_service(store_path: &Path) -> Result<ReferenceService> {
    let store = load_or_default(store_path)
        .with_context(|| format!("failed to load reference store {}", store_path.display()))?;
    Ok(ReferenceService::new(store))
}

/// Run an ingestion step under the store lock and save the result.
fn with_locked_store(
    store_path: &Path,
    holder: &str,
    ingest: impl FnOnce(&ReferenceService) -> deck_core::DeckResult<IngestReport>,
) -> Result<IngestReport> {
    let _lock = FileLock::acquire(store_path, holder)?;
    let service = open_service(store_path)?;
    let report = ingest(&service)?;
    save_store(&service.snapshot(), store_path)
        .with_context(|| format!("failed to save reference store {}", store_path.display()))?;
    Ok(report)
}

fn print_ingest(report: &IngestReport) {
    if report.deleted > 0 {
        println!("Deleted {} existing rows.", report.deleted);
    }
    if report.skipped > 0 {
        println!("Skipped {} unusable rows.", report.skipped);
    }
    println!("{}", report);
}

fn run_validate(args: &ValidateArgs) -> Result<()> {
    let input = args.to_request().validate()?;
    let report = validate_geometry(&input);

    if !args.json {
        print!("{}", render_report(&report));
        println!();
        println!("JSON Output:");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn render_report(report: &GeometryReport) -> String {
    let g = &report.geometry;
    let mut out = String::new();
    out.push_str("═══════════════════════════════════════\n");
    out.push_str("  DECK GEOMETRY CHECK\n");
    out.push_str("═══════════════════════════════════════\n\n");
    out.push_str("Balanced layout:\n");
    out.push_str(&format!("  Overall width:  {:.2} m\n", g.overall_width));
    out.push_str(&format!("  Girders:        {} @ {:.1} m\n", g.girder_count, g.girder_spacing));
    out.push_str(&format!("  Deck overhang:  {:.1} m each side\n", g.deck_overhang));
    push_messages(&mut out, "Errors", &report.errors);
    push_messages(&mut out, "Warnings", &report.warnings);
    out.push_str("\n═══════════════════════════════════════\n");
    out.push_str(&format!(
        "  RESULT: {}\n",
        if report.is_valid { "VALID" } else { "INVALID" }
    ));
    out.push_str("═══════════════════════════════════════\n");
    out
}

fn push_messages(out: &mut String, title: &str, messages: &Messages) {
    if messages.is_empty() {
        return;
    }
    out.push_str(&format!("\n{}:\n", title));
    for (field, message) in messages {
        out.push_str(&format!("  {:<18} {}\n", field.as_str(), message));
    }
}

fn render_location(record: &LocationRecord) -> String {
    let number = |value: Option<f64>, unit: &str| match value {
        Some(v) => format!("{} {}", v, unit),
        None => "-".to_string(),
    };
    let climate = &record.climate;
    let zone = if climate.seismic_zone.is_empty() { "-" } else { climate.seismic_zone.as_str() };

    let mut out = format!("{}\n", record);
    out.push_str(&format!("  Basic wind speed:  {}\n", number(climate.basic_wind_speed, "m/s")));
    out.push_str(&format!("  Seismic zone:      {}\n", zone));
    out.push_str(&format!(
        "  Seismic factor:    {}\n",
        climate.seismic_factor.map_or_else(|| "-".to_string(), |f| f.to_string())
    ));
    out.push_str(&format!("  Max temperature:   {}\n", number(climate.max_temp, "°C")));
    out.push_str(&format!("  Min temperature:   {}\n", number(climate.min_temp, "°C")));
    out
}

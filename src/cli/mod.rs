/*
* InterestWatch Command Line Interface
* ------------------------------------
* @author: virjilakrum
* @project: interest-watch
* @status: it-aint-much-but-its-honest-work 🚜
*
* Welcome to the analyst-facing end of the pipeline! This is where a JSON
* file full of interest values turns into a short list of dates worth
* googling (responsibly, for compliance reasons).
*
* Command Structure:
* ---------------
* interest-watch
* ├── detect [--input --method --sensitivity --monthly]
* │                          // Flags the spikes (the fun part)
* ├── report [--input --name ...]
* │                          // Full screening report for an entity
* └── init                   // Generates config (mkdir -p /etc/good_intentions)
*
* Technical Implementation:
* ----------------------
* - Built on clap (because real devs don't parse --help manually)
* - Colored output (because monochrome is so mainframe)
* - Config overrides flow CLI > env > local.toml > default.toml > defaults
* - Series come in as JSON arrays of {"date", "value"} objects
*
* Usage Examples:
* -------------
* ```bash
* # Flag the ten loudest spikes with the exponential estimator
* interest-watch detect --input acme.json --method ewm
*
* # Full screening report, monthly-smoothed, touchier threshold
* interest-watch report --input acme.json --name "ACME Corp" --sensitivity 0.5 --monthly
* ```
*
* Remember: an anomaly is just a date the internet refused to be normal.
*/

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::{generate_default_config, Settings};
use crate::screening::EntityScreening;
use crate::series::TimeSeries;
use crate::utils::DynResult;

#[derive(Parser)]
#[command(name = "interest-watch")]
#[command(about = "Interest-series anomaly screening CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect anomalous dates in an interest series
    Detect {
        /// JSON series file: [{"date": "YYYY-MM-DD", "value": n}, ...]
        #[arg(short, long)]
        input: PathBuf,
        /// Estimation method: constant, rolling or ewm
        #[arg(short, long)]
        method: Option<String>,
        /// Sensitivity multiplier k on the dispersion term
        #[arg(short, long)]
        sensitivity: Option<f64>,
        /// Collapse the series to monthly means before detection
        #[arg(long)]
        monthly: bool,
    },
    /// Render a full screening report for a named entity
    Report {
        #[arg(short, long)]
        input: PathBuf,
        /// Entity under screening
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        method: Option<String>,
        #[arg(short, long)]
        sensitivity: Option<f64>,
        #[arg(long)]
        monthly: bool,
    },
    /// Generate default configuration
    Init {
        #[arg(short, long)]
        force: bool,
    },
}

// TODO: CSV input support for series exported from spreadsheet tools - @virjilakrum

pub fn run() -> DynResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut settings = match &cli.config {
        Some(path) => Settings::new_from_file(path)?,
        None => Settings::new()?,
    };

    match cli.command {
        Commands::Detect {
            input,
            method,
            sensitivity,
            monthly,
        } => {
            apply_overrides(&mut settings, method, sensitivity, monthly);
            handle_detect_command(&input, &settings)?;
        }
        Commands::Report {
            input,
            name,
            method,
            sensitivity,
            monthly,
        } => {
            apply_overrides(&mut settings, method, sensitivity, monthly);
            handle_report_command(&input, &name, &settings)?;
        }
        Commands::Init { force } => {
            handle_init_command(force)?;
        }
    }

    Ok(())
}

fn apply_overrides(
    settings: &mut Settings,
    method: Option<String>,
    sensitivity: Option<f64>,
    monthly: bool,
) {
    if let Some(method) = method {
        settings.detection.method = method;
    }
    if let Some(k) = sensitivity {
        settings.detection.sensitivity = k;
    }
    if monthly {
        settings.report.monthly_aggregation = true;
    }
}

fn load_series(input: &Path, settings: &Settings) -> DynResult<TimeSeries> {
    let raw = fs::read_to_string(input)?;
    let series = TimeSeries::from_json(&raw)?;
    info!("Loaded {} points from {}", series.len(), input.display());

    if settings.report.monthly_aggregation {
        Ok(series.monthly_mean())
    } else {
        Ok(series)
    }
}

fn handle_detect_command(input: &Path, settings: &Settings) -> DynResult<()> {
    let series = load_series(input, settings)?;
    let detector = settings.detection.detector()?;
    let anomalies = detector.detect(&series)?;

    if anomalies.is_empty() {
        println!("{}", "No anomalous dates detected".yellow());
        return Ok(());
    }

    println!("{}", "Anomalous dates:".bold());
    for date in &anomalies {
        println!("- {}", date);
    }
    println!(
        "{} {} date(s) flagged with method '{}'",
        "✓".green(),
        anomalies.len(),
        settings.detection.method
    );

    Ok(())
}

fn handle_report_command(input: &Path, name: &str, settings: &Settings) -> DynResult<()> {
    let series = load_series(input, settings)?;
    let detector = settings.detection.detector()?;

    let mut screening = EntityScreening::new(name, series);
    screening.detect(&detector)?;
    print!("{}", screening.report()?);

    Ok(())
}

fn handle_init_command(force: bool) -> DynResult<()> {
    let config_dir = PathBuf::from("config");
    if config_dir.exists() && !force {
        error!("Configuration directory already exists. Use --force to overwrite.");
        return Ok(());
    }

    fs::create_dir_all(&config_dir)?;
    let default_config = generate_default_config();
    let config_str = toml::to_string_pretty(&default_config)?;
    fs::write(config_dir.join("default.toml"), config_str)?;

    println!("{} Default configuration generated", "✓".green());
    Ok(())
}

//! Georisk CLI - multi-hazard risk assessment for geographic locations

// Global invariants enforced:
// - Deterministic output ordering
// - No scoring logic here; every number comes from georisk_core

use anyhow::Context;
use clap::{Parser, Subcommand};
use georisk_core::config;
use georisk_core::{render_json, render_text, AssessmentRequest, GeographicPoint, RiskEngine};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "georisk")]
#[command(about = "Multi-hazard geographic risk assessment (seismic, flood, wildfire, storm)")]
#[command(version = env!("GEORISK_VERSION"))]
struct Cli {
    /// Log engine decisions at debug level (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a location described by a JSON request file
    Assess {
        /// Path to the assessment request (JSON)
        request: PathBuf,

        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Composite aggregation method (overrides config and request)
        #[arg(long)]
        method: Option<Method>,
    },
    /// Great-circle distance in kilometres between two points
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running an assessment
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Method {
    #[value(name = "weighted_average")]
    WeightedAverage,
    Max,
    Probabilistic,
}

impl From<Method> for georisk_core::AggregationMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::WeightedAverage => georisk_core::AggregationMethod::WeightedAverage,
            Method::Max => georisk_core::AggregationMethod::Max,
            Method::Probabilistic => georisk_core::AggregationMethod::Probabilistic,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Assess {
            request,
            config: config_path,
            format,
            method,
        } => {
            let project_root = std::env::current_dir()?;
            let resolved = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;

            if let Some(config_path) = &resolved.config_path {
                eprintln!("Using config: {}", config_path.display());
            }

            let mut request = read_request(&request)?;
            tracing::debug!(
                hazards = request.hazards.len(),
                latitude = request.location.latitude(),
                longitude = request.location.longitude(),
                "loaded assessment request"
            );
            // CLI flag overrides request and config
            if let Some(method) = method {
                request.aggregation_method = Some(method.into());
            }

            let engine = RiskEngine::new(resolved.config);
            let assessment = engine
                .assess(&request)
                .context("assessment request rejected")?;

            match format {
                OutputFormat::Text => print!("{}", render_text(&assessment)),
                OutputFormat::Json => println!("{}", render_json(&assessment)?),
            }
        }
        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let a = GeographicPoint::new(lat1, lon1).context("invalid first point")?;
            let b = GeographicPoint::new(lat2, lon2).context("invalid second point")?;
            let engine = RiskEngine::default();
            println!("{:.3} km", engine.distance_km(&a, &b));
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                let c = &resolved.config;
                println!("  Aggregation:   {}", c.aggregation_method());
                println!(
                    "  Thresholds:    moderate={} high={} critical={}",
                    c.thresholds().moderate,
                    c.thresholds().high,
                    c.thresholds().critical
                );
                println!("  Decay years:   {}", c.decay_years());
                println!("  Decay model:   {}", c.decay_model());
                println!(
                    "  Cache:         {} entries, {} decimals",
                    c.proximity_cache_size(),
                    c.cache_precision()
                );
                println!("  Time budget:   {} ms", c.calculation_timeout_ms());
                println!();
                println!("Resolved (JSON):");
                println!("{}", serde_json::to_string_pretty(&c.to_file_config())?);
            }
        },
    }

    Ok(())
}

/// Logs go to stderr so JSON output on stdout stays clean
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_request(path: &Path) -> anyhow::Result<AssessmentRequest> {
    if !path.exists() {
        anyhow::bail!("Request file does not exist: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse request file: {}", path.display()))
}

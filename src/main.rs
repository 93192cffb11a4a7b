use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use freight_eta::location::{Coordinate, LocationError, Resolver};
use freight_eta::logistics::{EstimateRequest, Estimator};
use freight_eta::{server, DataConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Freight ETA: offline location resolution and transit-time estimates
///
/// Resolves free-form place names to coordinates and estimates shipment
/// durations and delivery dates for ocean, air, road and rail.
///
/// Examples:
///   freight-eta resolve "Port of Shanghai"
///   freight-eta duration --mode ocean --origin Rotterdam --destination Mumbai --details
///   freight-eta duration --mode road --distance-km 700
///   freight-eta deliver --mode air --origin Frankfurt --destination "New York" --start-date 2024-01-01
///   freight-eta names --filter port --limit 10
///   freight-eta serve --port 8080
#[derive(Parser)]
#[command(name = "freight-eta", version, about, long_about = None)]
struct Cli {
    /// Reference dataset JSON (countries → states → cities).
    /// Defaults to ~/.freight-eta/dataset.json, then the built-in data.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Manual override JSON (name → [lat, lon]).
    /// Defaults to ~/.freight-eta/overrides.json, then the built-in table.
    #[arg(long, global = true)]
    overrides: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a place name, with fuzzy fallback.
    Resolve { query: String },

    /// Look up a place name by exact key only.
    Exact { query: String },

    /// List known location names.
    Names {
        /// Case-insensitive substring filter.
        #[arg(long)]
        filter: Option<String>,

        /// Maximum number of names.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Estimate transit duration in days.
    Duration {
        #[command(flatten)]
        route: RouteArgs,

        /// Print the full breakdown instead of just the day count.
        #[arg(long)]
        details: bool,
    },

    /// Estimate the delivery date.
    Deliver {
        #[command(flatten)]
        route: RouteArgs,

        /// Start date (YYYY-MM-DD or RFC 3339). Defaults to today (UTC).
        #[arg(long)]
        start_date: Option<String>,
    },

    /// Run the HTTP API.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, short = 'p', default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Args)]
struct RouteArgs {
    /// OCEAN, AIR, ROAD or RAIL (case-insensitive).
    #[arg(long, short = 'm')]
    mode: String,

    #[arg(long, short = 'o')]
    origin: Option<String>,

    #[arg(long, short = 'd')]
    destination: Option<String>,

    /// Known route distance; skips location resolution.
    #[arg(long)]
    distance_km: Option<f64>,
}

impl RouteArgs {
    fn into_request(self) -> EstimateRequest {
        EstimateRequest {
            transportation_mode: Some(self.mode),
            origin: self.origin,
            destination: self.destination,
            distance_km: self.distance_km,
            start_date: None,
        }
    }
}

#[derive(Serialize)]
struct LookupOutput<'a> {
    query: &'a str,
    name: &'a str,
    coords: Coordinate,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = DataConfig::resolve(cli.dataset, cli.overrides);
    let index = config.load_index()?;

    match cli.command {
        Command::Resolve { query } => {
            let entry = Resolver::new(&index)
                .resolve_entry(&query)
                .ok_or_else(|| LocationError::NotFound(query.clone()))?;
            eprintln!("  {} → {} ({})", query, entry.name, entry.coords);
            print_json(&LookupOutput {
                query: &query,
                name: &entry.name,
                coords: entry.coords,
            })
        }
        Command::Exact { query } => {
            let entry = Resolver::new(&index)
                .exact_entry(&query)
                .ok_or_else(|| LocationError::NotFound(query.clone()))?;
            print_json(&LookupOutput {
                query: &query,
                name: &entry.name,
                coords: entry.coords,
            })
        }
        Command::Names { filter, limit } => print_json(&index.search_names(filter.as_deref(), limit)),
        Command::Duration { route, details } => {
            let estimator = Estimator::new(&index);
            let request = route.into_request();
            if details {
                print_json(&estimator.calculate_duration_details(&request)?)
            } else {
                print_json(&estimator.estimate_route_duration(&request)?)
            }
        }
        Command::Deliver { route, start_date } => {
            let request = EstimateRequest {
                start_date,
                ..route.into_request()
            };
            print_json(&Estimator::new(&index).estimate_shipment_delivery(&request)?)
        }
        Command::Serve { host, port } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::start(index, &host, port))?;
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! Headless driver for the production line simulation.
//!
//! Feeds the engine fixed real-time frames, the way a render loop would, and
//! prints a report every few simulated hours.
//!
//! ```bash
//! linesim --hours 500 --speed 1000 --seed 1
//! linesim --config params.json --json
//! ```

use clap::Parser;
use linesim::core::batching::BatchSizePolicy;
use linesim::{Params, ParamsUpdate, SimulationEngine, STATION_COUNT};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "linesim")]
#[command(version, about = "Four-station production line simulation", long_about = None)]
struct Args {
    /// JSON file with (possibly partial) parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u32>,

    /// Simulated seconds per real second
    #[arg(long)]
    speed: Option<f64>,

    /// Batch arrival rate (batches per hour)
    #[arg(long)]
    lambda: Option<f64>,

    /// Service rates of the four stations, comma separated (items per hour)
    #[arg(long, value_delimiter = ',')]
    mu: Option<Vec<f64>>,

    /// Draw batch sizes from a geometric law with mean B instead of the fixed cycle
    #[arg(long)]
    geometric_batches: bool,

    /// Simulated hours to run
    #[arg(long, default_value = "168")]
    hours: f64,

    /// Real seconds per frame
    #[arg(long, default_value = "0.016", value_parser = positive_f64)]
    frame_dt: f64,

    /// Simulated hours between reports
    #[arg(long, default_value = "24", value_parser = positive_f64)]
    report_every: f64,

    /// Print snapshots as JSON lines
    #[arg(long)]
    json: bool,
}

fn positive_f64(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("must be positive and finite, got {}", value))
    }
}

/// First multiple of `every` strictly after `t`
fn next_report_after(t: f64, every: f64) -> f64 {
    ((t / every).floor() + 1.0) * every
}

fn load_params(args: &Args) -> Result<Params, Box<dyn std::error::Error>> {
    let mut params = Params::default();
    if let Some(path) = &args.config {
        let text = std::fs::read_to_string(path)?;
        let update: ParamsUpdate = serde_json::from_str(&text)?;
        params = params.merged(&update);
    }

    let mut overrides = ParamsUpdate {
        seed: args.seed,
        speed: args.speed,
        lambda: args.lambda,
        ..ParamsUpdate::default()
    };
    if let Some(mu) = &args.mu {
        let mu: [f64; STATION_COUNT] = mu.as_slice().try_into().map_err(|_| {
            format!("expected {} service rates, got {}", STATION_COUNT, mu.len())
        })?;
        overrides = overrides.with_mu(mu);
    }
    let params = params.merged(&overrides);
    params.validate()?;
    Ok(params)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    let params = load_params(&args)?;
    let policy = if args.geometric_batches {
        BatchSizePolicy::Geometric
    } else {
        BatchSizePolicy::default()
    };

    info!("Running {} simulated hours with {:?}", args.hours, params);
    let mut engine = SimulationEngine::with_batch_policy(params, policy);

    let mut next_report = args.report_every;

    while engine.current_time() < args.hours {
        let before = engine.current_time();
        engine.step(args.frame_dt);
        if engine.current_time() <= before {
            return Err(format!(
                "frame of {}s no longer advances the clock at t={}h",
                args.frame_dt, before
            )
            .into());
        }
        if engine.current_time() >= next_report || engine.current_time() >= args.hours {
            let snapshot = engine.snapshot();
            if args.json {
                println!("{}", serde_json::to_string(&snapshot)?);
            } else {
                println!("{}", snapshot);
            }
            next_report = next_report_after(engine.current_time(), args.report_every);
        }
    }

    info!(
        "Done: {} items entered, {} left the line, {} still in progress",
        engine.jobs_entered(),
        engine.departures(),
        engine.jobs_in_system()
    );
    Ok(())
}

//! Batch planner: reads a request (plus optional config, reference rows and
//! state snapshot) from disk and writes the plan as JSON.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use collection_planner::model::PlanRequest;
use collection_planner::oracle::{GenerativeClient, OracleConfig};
use collection_planner::reference::{RawReferenceRow, ReferenceTable};
use collection_planner::state::InMemoryStateTracker;
use collection_planner::traits::UrgencySource;
use collection_planner::urgency::{DeterministicUrgency, OracleUrgency};
use collection_planner::{plan, PlanContext, PlannerConfig, Strategy};

#[derive(Debug, Parser)]
#[command(name = "collection-plan", about = "Plan waste collection routes for a fleet")]
struct Args {
    /// JSON planning request (vehicles and points).
    #[arg(long)]
    request: PathBuf,

    /// JSON planner config; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of raw reference rows.
    #[arg(long)]
    reference: Option<PathBuf>,

    /// State snapshot with last-collection timestamps.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Overrides the strategy from the config file.
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Planning instant (RFC 3339); defaults to now.
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Where to write the plan; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Score with the hosted oracle configured through the environment.
    #[arg(long)]
    oracle: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PlannerConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config = config.with_strategy(strategy);
    }

    let request: PlanRequest = read_json(&args.request).context("reading planning request")?;

    let reference = match &args.reference {
        Some(path) => {
            let rows: Vec<RawReferenceRow> = read_json(path).context("reading reference rows")?;
            ReferenceTable::from_rows(&rows)
        }
        None => ReferenceTable::new(),
    };

    let state = match &args.state {
        Some(path) => InMemoryStateTracker::load_file(path)
            .with_context(|| format!("loading state snapshot from {}", path.display()))?,
        None => InMemoryStateTracker::new(),
    };

    info!(
        reference_rows = reference.len(),
        tracked_points = state.len(),
        "inputs loaded"
    );

    let urgency: Box<dyn UrgencySource> = if args.oracle {
        oracle_source(&config)?
    } else {
        Box::new(DeterministicUrgency)
    };

    let ctx = PlanContext {
        now: args.now.unwrap_or_else(Utc::now),
        config: &config,
        state: &state,
        reference: &reference,
        urgency: urgency.as_ref(),
    };
    let response = plan(&request, &ctx)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &response)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &response)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}

/// Endpoint settings come from the config file when present; the API key
/// always comes from the environment.
fn oracle_source(config: &PlannerConfig) -> Result<Box<dyn UrgencySource>> {
    let Some(env_config) = OracleConfig::from_env() else {
        warn!("oracle requested but no API key is set, using deterministic scores");
        return Ok(Box::new(DeterministicUrgency));
    };

    let oracle_config = match &config.oracle {
        Some(file_config) => OracleConfig {
            api_key: env_config.api_key,
            ..file_config.clone()
        },
        None => env_config,
    };

    let client = GenerativeClient::new(oracle_config).context("building oracle HTTP client")?;
    Ok(Box::new(OracleUrgency::new(client)))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

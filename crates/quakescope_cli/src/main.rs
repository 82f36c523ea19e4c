//! Quakescope CLI
//!
//! Loads an earthquake catalogue and drives the linked views headlessly:
//!
//! - `summary`: apply one-off filters and print the resulting dashboard
//! - `replay`: step through a TOML interaction script

mod config;
mod report;
mod session;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use quakescope_charts::HistogramMetric;
use quakescope_core::{load_csv, EventStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::QuakescopeConfig;
use crate::report::Snapshot;
use crate::session::{Script, Session, Step};

#[derive(Parser)]
#[command(name = "quakescope")]
#[command(about = "Linked-brushing explorer for earthquake catalogues", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to ./quakescope.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply filters once and print the dashboard state
    Summary(SummaryArgs),
    /// Replay an interaction script, printing the state after each step
    Replay {
        /// TOML file of [[step]] entries
        script: PathBuf,

        /// Catalogue CSV (defaults to data.path from config)
        input: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SummaryArgs {
    /// Catalogue CSV (defaults to data.path from config)
    input: Option<PathBuf>,

    /// Histogram binning dimension
    #[arg(long)]
    metric: Option<HistogramMetric>,

    /// Map rectangle
    #[arg(
        long,
        value_name = "LAT_MIN,LAT_MAX,LON_MIN,LON_MAX",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    bounds: Option<Vec<f64>>,

    /// Start of the local time range (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// End of the local time range
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Magnitude range, min inclusive, max exclusive
    #[arg(
        long,
        value_name = "MIN,MAX",
        value_delimiter = ',',
        allow_hyphen_values = true,
        conflicts_with = "depth"
    )]
    magnitude: Option<Vec<f64>>,

    /// Depth range in km, min inclusive, max exclusive
    #[arg(long, value_name = "MIN,MAX", value_delimiter = ',', allow_hyphen_values = true)]
    depth: Option<Vec<f64>>,
}

impl SummaryArgs {
    /// Filters as brush steps, one per owning view.
    fn steps(&self) -> Result<Vec<Step>> {
        let mut steps = Vec::new();
        if let Some(b) = self.bounds.as_deref() {
            let [lat_min, lat_max, lon_min, lon_max] = b else {
                anyhow::bail!("--bounds takes 4 values, got {}", b.len());
            };
            steps.push(Step::BrushMap {
                lat_min: *lat_min,
                lat_max: *lat_max,
                lon_min: *lon_min,
                lon_max: *lon_max,
            });
        }
        if let (Some(from), Some(to)) = (&self.from, &self.to) {
            steps.push(Step::BrushTime {
                from: from.clone(),
                to: to.clone(),
            });
        }
        if let Some(r) = self.magnitude.as_deref() {
            let [min, max] = r else {
                anyhow::bail!("--magnitude takes 2 values, got {}", r.len());
            };
            steps.push(Step::BrushMagnitude { min: *min, max: *max });
        }
        if let Some(r) = self.depth.as_deref() {
            let [min, max] = r else {
                anyhow::bail!("--depth takes 2 values, got {}", r.len());
            };
            steps.push(Step::BrushDepth { min: *min, max: *max });
        }
        Ok(steps)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = QuakescopeConfig::load(cli.config.as_deref())?;
    init_logging(cli.verbose, &config.log.level);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Commands::Summary(args) => summary(&config, args, cli.json, &mut out),
        Commands::Replay { script, input } => {
            replay(&config, input.as_deref(), script, cli.json, &mut out)
        }
    }
}

fn init_logging(verbose: u8, configured: &str) {
    let fallback = match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_store(config: &QuakescopeConfig, input: Option<&Path>) -> Result<EventStore> {
    let path = input
        .or(config.data.path.as_deref())
        .context("No input CSV given and data.path is not set in the config")?;

    let zones = config.zone_table();
    let ingested =
        load_csv(path, &zones).with_context(|| format!("Failed to load {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        kept = ingested.records.len(),
        dropped = ingested.dropped,
        "loaded catalogue"
    );
    Ok(EventStore::new(ingested.records))
}

fn summary<W: Write>(
    config: &QuakescopeConfig,
    args: &SummaryArgs,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let store = load_store(config, args.input.as_deref())?;
    let metric = args.metric.unwrap_or(config.histogram.metric);
    let mut session = Session::new(store, metric)?;

    for step in args.steps()? {
        session
            .apply(&step)
            .with_context(|| format!("Failed to apply {}", step.action()))?;
    }

    let snapshot = Snapshot::capture(&session, None);
    if json {
        snapshot.write_json(out, true)?;
    } else {
        snapshot.write_text(out)?;
    }
    Ok(())
}

fn replay<W: Write>(
    config: &QuakescopeConfig,
    input: Option<&Path>,
    script: &Path,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let script = Script::load(script)?;
    let store = load_store(config, input)?;
    let mut session = Session::new(store, config.histogram.metric)?;

    for (i, step) in script.steps.iter().enumerate() {
        session
            .apply(step)
            .with_context(|| format!("Step {} ({}) failed", i + 1, step.action()))?;

        let label = format!("step {}: {}", i + 1, step.action());
        let snapshot = Snapshot::capture(&session, Some(label));
        if json {
            snapshot.write_json(out, false)?;
        } else {
            snapshot.write_text(out)?;
            writeln!(out)?;
        }
    }
    tracing::info!(
        steps = script.steps.len(),
        recombinations = session.coordinator().recombination_count(),
        "replay finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn summary_flags_become_steps() {
        let cli = Cli::try_parse_from([
            "quakescope",
            "summary",
            "feed.csv",
            "--bounds",
            "30,40,130,145",
            "--from",
            "2024-03-01",
            "--to",
            "2024-03-08",
            "--magnitude",
            "4,6",
        ])
        .unwrap();
        let Commands::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        let actions: Vec<_> = args.steps().unwrap().iter().map(Step::action).collect();
        assert_eq!(actions, ["brush_map", "brush_time", "brush_magnitude"]);
        assert_eq!(args.input.as_deref(), Some(Path::new("feed.csv")));
    }

    #[test]
    fn wrong_arity_is_reported() {
        let cli = Cli::try_parse_from(["quakescope", "summary", "--bounds=-40,-30,10"]).unwrap();
        let Commands::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        assert!(args.steps().is_err());
    }

    #[test]
    fn magnitude_and_depth_conflict() {
        let parsed = Cli::try_parse_from([
            "quakescope", "summary", "--magnitude", "4,6", "--depth", "0,100",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["quakescope", "replay", "steps.toml", "-vv", "--json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Replay { input: None, .. }));
    }

    #[test]
    fn replays_demo_session() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let config_path = root.join("demos/quakescope.toml");
        let config = QuakescopeConfig::load(Some(config_path.as_path())).unwrap();
        let mut out = Vec::new();
        replay(
            &config,
            Some(root.join("demos/sample.csv").as_path()),
            &root.join("demos/brush_session.toml"),
            true,
            &mut out,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let states: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(states.len(), 8);
        assert_eq!(states[0]["step"], "step 1: brush_map");
        assert_eq!(states[0]["visible"], 2);
        assert_eq!(states[7]["total"], 7);
        assert_eq!(states[7]["visible"], 7);
    }
}

use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::{
    config::ScoringConfig,
    network::io::{load_bus_lines, load_bus_stops, load_hot_spots, load_parcels},
    output::{write_scores, OutputFormat},
    scorer::{AccessibilityScorer, Execution, RunSummary},
    spatial::{DistanceStrategy, WindowPolicy},
};
mod config;
mod error;
mod logging;
mod network;
mod output;
mod reachability;
mod scorer;
mod spatial;

#[derive(Parser)]
#[command(about = "Score how many nearby hot spots each parcel reaches by walk, bus and walk")]
struct Args {
    /// Bus lines CSV (route_id,direction)
    bus_lines: PathBuf,
    /// Bus stops CSV (system_stop_id,direction,routes,public_name,longitude,latitude)
    bus_stops: PathBuf,
    /// Hot spots CSV (id,latitude,longitude)
    hot_spots: PathBuf,
    /// Parcels CSV (id,latitude,longitude)
    parcels: PathBuf,

    /// Where to write the scores
    #[arg(short, long, default_value = "accessibility.csv")]
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
    /// Write scores as percentages instead of ratios
    #[arg(long)]
    percent: bool,

    /// JSON scoring config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Walking radius in km
    #[arg(long)]
    walk_radius: Option<f64>,
    /// Driving radius in km
    #[arg(long)]
    drive_radius: Option<f64>,
    /// Max stops travelled along a route
    #[arg(long)]
    max_hops: Option<usize>,
    #[arg(long, value_enum)]
    distance: Option<DistanceStrategy>,
    #[arg(long, value_enum)]
    window: Option<WindowPolicy>,

    /// Worker threads (defaults to one per core)
    #[arg(long, conflicts_with = "sequential")]
    threads: Option<usize>,
    /// Score parcels on the main thread
    #[arg(long)]
    sequential: bool,
    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn scoring_config(&self) -> anyhow::Result<ScoringConfig> {
        let mut config = match &self.config {
            Some(path) => ScoringConfig::load_from_file(path)?,
            None => ScoringConfig::default(),
        };

        if let Some(walk_radius) = self.walk_radius {
            config.walk_radius_km = walk_radius;
        }
        if let Some(drive_radius) = self.drive_radius {
            config.drive_radius_km = drive_radius;
        }
        if let Some(max_hops) = self.max_hops {
            config.max_hops = max_hops;
        }
        if let Some(distance) = self.distance {
            config.distance = distance;
        }
        if let Some(window) = self.window {
            config.window = window;
        }

        config.validate()?;
        Ok(config)
    }
}

fn progress_bar(len: usize, quiet: bool) -> anyhow::Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn main() -> anyhow::Result<()> {
    logging::init_logger()?;
    let args = Args::parse();

    info!("Run started at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let config = args.scoring_config()?;
    info!(
        "Walk radius {} km, drive radius {} km, {} hops, {:?} distance, {:?} window",
        config.walk_radius_km, config.drive_radius_km, config.max_hops, config.distance, config.window
    );

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build worker pool")?;
    }

    let now = Instant::now();
    let mut network = load_bus_lines(&args.bus_lines).context("Failed to load bus lines")?;
    let stops = load_bus_stops(&args.bus_stops, &mut network).context("Failed to load bus stops")?;
    let hot_spots = load_hot_spots(&args.hot_spots).context("Failed to load hot spots")?;
    let parcels = load_parcels(&args.parcels).context("Failed to load parcels")?;
    info!("Loaded inputs in {:?}", now.elapsed());

    if network.is_empty() {
        warn!("No bus lines loaded, parcels can only reach stops they walk to");
    }
    if stops.is_empty() {
        warn!("No bus stops loaded, no hot spot is reachable by bus");
    }
    if hot_spots.is_empty() {
        warn!("No hot spots loaded, every score will be undefined");
    }

    let scorer = AccessibilityScorer::new(network, stops, hot_spots, config);
    let execution = if args.sequential {
        Execution::Sequential
    } else {
        Execution::Parallel
    };

    let now = Instant::now();
    let progress = progress_bar(parcels.len(), args.quiet)?;
    let scores = scorer.score_all(&parcels, execution, &progress);
    progress.finish_and_clear();
    info!("Scored {} parcels in {:?}", scores.len(), now.elapsed());

    let summary = RunSummary::from_scores(&scores);
    match summary.mean_score {
        Some(mean) => info!(
            "Mean score {mean:.4}, {} of {} parcels have no drivable hot spots",
            summary.undefined, summary.parcels
        ),
        None => info!("No parcel has a drivable hot spot"),
    }

    write_scores(&args.output, &scores, args.format, args.percent)?;
    info!("Wrote {}", args.output.display());
    info!("Run finished at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const INPUTS: [&str; 5] = [
        "parcel-access",
        "lines.csv",
        "stops.csv",
        "hot_spots.csv",
        "parcels.csv",
    ];

    fn config_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"walk_radius_km": 0.4, "drive_radius_km": 8.0, "max_hops": 4, "window": "monotonic"}}"#
        )
        .unwrap();
        file
    }

    fn parse(extra: &[&str]) -> Args {
        Args::try_parse_from(INPUTS.iter().chain(extra)).unwrap()
    }

    #[test]
    fn test_flags_override_config_file() {
        let file = config_file();
        let path = file.path().to_str().unwrap();

        let args = parse(&["--config", path, "--max-hops", "1", "--distance", "flat-plane"]);
        let config = args.scoring_config().unwrap();

        assert_eq!(config.max_hops, 1);
        assert_eq!(config.distance, DistanceStrategy::FlatPlane);
        assert_eq!(config.walk_radius_km, 0.4);
        assert_eq!(config.drive_radius_km, 8.0);
        assert_eq!(config.window, WindowPolicy::Monotonic);
    }

    #[test]
    fn test_every_flag_overrides() {
        let file = config_file();
        let path = file.path().to_str().unwrap();

        let args = parse(&[
            "--config",
            path,
            "--walk-radius",
            "0.3",
            "--drive-radius",
            "6.5",
            "--max-hops",
            "0",
            "--distance",
            "haversine",
            "--window",
            "binary-bounded",
        ]);
        let config = args.scoring_config().unwrap();

        assert_eq!(
            config,
            ScoringConfig {
                walk_radius_km: 0.3,
                drive_radius_km: 6.5,
                max_hops: 0,
                distance: DistanceStrategy::Haversine,
                window: WindowPolicy::BinaryBounded,
            }
        );
    }

    #[test]
    fn test_defaults_without_config_file() {
        let config = parse(&[]).scoring_config().unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn test_merged_config_is_validated() {
        let file = config_file();
        let path = file.path().to_str().unwrap();

        let args = parse(&["--config", path, "--walk-radius=-0.5"]);
        assert!(args.scoring_config().is_err());
    }

    #[test]
    fn test_threads_conflict_with_sequential() {
        let parsed = Args::try_parse_from(
            INPUTS
                .iter()
                .chain(&["--threads", "2", "--sequential"]),
        );
        assert!(parsed.is_err());
    }
}

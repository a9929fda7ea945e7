mod city;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use glam::Vec3;
use road_common::seeded_rng;
use road_plan::{GridPlanner, PlannerConfig};
use road_scene::{DollyConfig, SceneConfig, Session, WorldConfig};
use road_stream::{StreamBudget, StreamConfig, StreamEvent};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "road-cli", about = "CLI tool for the road engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Plan one grid and print it
    Plan {
        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Reject any plot whose footprint meets an earlier one
        #[arg(long)]
        strict: bool,
        /// Print the grid as JSON instead of a width map
        #[arg(long)]
        json: bool,
        /// Blocks along x and z
        #[arg(long, default_value = "1")]
        blocks: usize,
    },
    /// Ride through a scene and report what streamed
    Simulate {
        /// Scene file (YAML). A built-in demo scene is used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Maximum number of frames
        #[arg(short, long, default_value = "2000")]
        frames: u64,
        /// Frame length in milliseconds
        #[arg(long, default_value = "16")]
        dt_ms: u64,
        /// Override the scene seed
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn demo_scene() -> SceneConfig {
    SceneConfig {
        seed: 42,
        worlds: vec![WorldConfig {
            name: "downtown".into(),
            strategy: "city".into(),
            stream: StreamConfig {
                load_threshold: Some(60.0),
                stop_follow_threshold: -400.0,
                unload_threshold: Some(-450.0),
                show_time_threshold: Some(-40.0),
                budget: StreamBudget {
                    load_cells_per_tick: 3,
                    unload_rows_per_tick: Some(5),
                },
                ..StreamConfig::default()
            },
            planner: PlannerConfig::default(),
        }],
        dolly: Some(DollyConfig {
            speed: 20.0,
            stop: -500.0,
            rise: Some(-300.0),
            ..DollyConfig::default()
        }),
        ..SceneConfig::default()
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("road-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", road_common::crate_info());
            println!("plan: {}", road_plan::crate_info());
            println!("beat: {}", road_beat::crate_info());
            println!("stream: {}", road_stream::crate_info());
            println!("scene: {}", road_scene::crate_info());
        }
        Commands::Plan {
            seed,
            strict,
            json,
            blocks,
        } => {
            let config = PlannerConfig {
                num_blocks_x: blocks,
                num_blocks_z: blocks,
                strict_footprints: strict,
                ..PlannerConfig::default()
            };
            let grid = GridPlanner::new(config)?.plan(&mut seeded_rng(seed));

            if json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
            } else {
                print!("{}", grid.width_map());
                println!(
                    "seed={seed} rows={} cols={} plots={} overlapping_pairs={}",
                    grid.rows(),
                    grid.cols(),
                    grid.occupied_count(),
                    grid.overlapping_pairs().len()
                );
            }
        }
        Commands::Simulate {
            config,
            frames,
            dt_ms,
            seed,
        } => {
            let mut scene = match config {
                Some(path) => SceneConfig::load(path)?,
                None => demo_scene(),
            };
            if let Some(seed) = seed {
                scene.seed = seed;
            }
            if scene.dolly.is_none() {
                scene.dolly = Some(DollyConfig::default());
            }

            let stats = city::CityStats::default();
            let strategies = city::strategies(&stats)?;
            let mut session = Session::new(&scene, &strategies)?;
            session.start();

            let dt = Duration::from_millis(dt_ms);
            let mut pulses = 0usize;
            let mut recycled = 0usize;
            let mut peak_rows = 0usize;
            while session.frame() < frames && !session.streams().is_empty() {
                let report = session.advance(dt);
                pulses += report.pulses.len();
                peak_rows = peak_rows.max(report.live_rows);
                for (world, event) in &report.events {
                    match event {
                        StreamEvent::RowRecycled { .. } => recycled += 1,
                        other => tracing::info!(world = %world, event = ?other, frame = report.frame, "stream event"),
                    }
                }
            }

            let position = session.dolly().map_or(Vec3::ZERO, |d| d.position());
            println!(
                "frames={} z={:.1} pulses={} recycled={} peak_rows={} towers={} flashes={} live_worlds={}",
                session.frame(),
                position.z,
                pulses,
                recycled,
                peak_rows,
                stats.towers.get(),
                stats.flashes.get(),
                session.streams().len()
            );
        }
    }

    Ok(())
}

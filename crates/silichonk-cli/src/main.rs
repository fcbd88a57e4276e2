//! Frame driver for the silicon/diatom automaton.

mod render;
mod telemetry;
mod video;

use anyhow::{Context, Result};
use clap::Parser;
use render::{RenderMode, Renderer};
use silichonk_core::{DriverConfig, RuleVariant, SimulationConfig, WorldConfig};
use silichonk_world::{Simulation, SimulationResult};
use std::future::Future;
use std::path::PathBuf;
use tokio::signal;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};
use video::VideoEncoder;

#[derive(Parser, Debug)]
#[command(
    name = "silichonk",
    about = "Runs the silicon/diatom cellular automaton on a toroidal grid"
)]
struct Args {
    /// Side length of the grid; values below 9 fall back to 100.
    #[arg(long = "grid-size")]
    grid_size: Option<usize>,

    /// Delay between frames in milliseconds.
    #[arg(long)]
    interval: Option<u64>,

    /// Number of frames to compute; 0 runs until interrupted.
    #[arg(long)]
    frames: Option<u64>,

    /// Rule variant: a ("any") or b ("majority").
    #[arg(long)]
    variant: Option<RuleVariant>,

    /// Random seed for the initial grid.
    #[arg(long)]
    seed: Option<u64>,

    /// Compute rows in parallel.
    #[arg(long)]
    parallel: bool,

    /// Stop as soon as a generation repeats.
    #[arg(long)]
    stop_on_cycle: bool,

    /// JSON simulation config; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How frames are printed to stdout.
    #[arg(long, value_enum, default_value_t = RenderMode::Ascii)]
    render: RenderMode,

    /// Also encode every frame into an H.264 movie at this path (needs ffmpeg).
    #[arg(long = "mov-file")]
    mov_file: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    telemetry::init_telemetry(args.log_json)?;

    let driver = driver_config(&args);
    let config = simulation_config(&args, &driver)?;

    info!(
        size = config.world.size,
        variant = %config.world.variant,
        seed = config.seed,
        frames = config.num_frames,
        interval_ms = driver.interval_ms,
        "Starting silichonk"
    );

    let mut simulation = Simulation::new(config).context("Failed to create simulation")?;
    let renderer = Renderer::new(args.render);

    let mut video = match &args.mov_file {
        Some(path) => Some(VideoEncoder::spawn(path, simulation.config().world.size)?),
        None => None,
    };

    let outcome = run_frame_loop(
        &mut simulation,
        &renderer,
        video.as_mut(),
        &driver,
        shutdown_signal(),
    )
    .await;

    // Close the movie even when the loop failed so ffmpeg can finalize it
    if let Some(video) = video {
        video.finish().context("Failed to finish video")?;
    }
    let result = outcome?;

    info!(
        generations = result.generations,
        empty = result.final_population.empty,
        resource = result.final_population.resource,
        consumer = result.final_population.consumer,
        cycle_detected_at = ?result.cycle_detected_at,
        "Run finished"
    );

    Ok(())
}

fn driver_config(args: &Args) -> DriverConfig {
    let mut driver = DriverConfig::default();
    if let Some(interval_ms) = args.interval {
        driver.interval_ms = interval_ms;
    }
    driver
}

/// Merge the optional config file with command-line overrides
fn simulation_config(args: &Args, driver: &DriverConfig) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SimulationConfig {
            world: WorldConfig {
                size: driver.default_grid_size,
                ..Default::default()
            },
            ..Default::default()
        },
    };

    config.world.size = driver.resolve_grid_size(args.grid_size.or(Some(config.world.size)));
    if let Some(frames) = args.frames {
        config.num_frames = frames;
    }
    if let Some(variant) = args.variant {
        config.world.variant = variant;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.parallel |= args.parallel;
    config.stop_on_cycle |= args.stop_on_cycle;

    config.validate().context("Invalid simulation config")?;
    Ok(config)
}

/// Tick the simulation at the driver's cadence, drawing (and optionally
/// recording) every generation until the frame budget is spent, a cycle ends
/// the run, or `shutdown` resolves.
async fn run_frame_loop(
    simulation: &mut Simulation,
    renderer: &Renderer,
    mut video: Option<&mut VideoEncoder>,
    driver: &DriverConfig,
    shutdown: impl Future<Output = ()>,
) -> Result<SimulationResult> {
    let frames = simulation.config().num_frames;
    let stop_on_cycle = simulation.config().stop_on_cycle;
    let shared = simulation.shared_grid();

    {
        let grid = shared.read();
        renderer
            .draw(&grid, simulation.generation())
            .context("Failed to draw frame")?;
        if let Some(video) = video.as_deref_mut() {
            video.write_frame(&grid)?;
        }
    }

    let mut ticker = interval(Duration::from_millis(driver.interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial frame is already drawn.
    ticker.tick().await;

    tokio::pin!(shutdown);

    while frames == 0 || simulation.generation() < frames {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(generation = simulation.generation(), "Frame loop interrupted");
                break;
            }
            _ = ticker.tick() => {
                let report = simulation.tick();
                let grid = shared.read();
                renderer
                    .draw(&grid, report.generation)
                    .context("Failed to draw frame")?;
                if let Some(video) = video.as_deref_mut() {
                    video.write_frame(&grid)?;
                }
                drop(grid);

                if report.cycle.is_some() && stop_on_cycle {
                    info!(generation = report.generation, "Generation repeats, stopping");
                    break;
                }
            }
        }
    }

    Ok(simulation.summary())
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed never
/// fires, so the run is then only bounded by its frame budget.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Ctrl+C will not stop the frame loop");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM will not stop the frame loop");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let source = tokio::select! {
        _ = ctrl_c => "ctrl-c",
        _ = terminate => "sigterm",
    };

    info!(source, "Interrupt received, finishing the current frame");
}

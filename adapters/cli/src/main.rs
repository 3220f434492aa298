#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Path Defence levels headlessly.

mod layout;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use path_defence_core::RunStatus;
use path_defence_levels::LevelCatalog;
use path_defence_rendering::{AsciiBackend, RenderingBackend, Scene};
use path_defence_runtime::{FramePacer, RunStats, SimConfig, Simulation, SimulationLoop};
use serde::Serialize;

use layout::TowerPlacement;

/// Wall-clock time between two rendered frames.
const RENDER_INTERVAL: Duration = Duration::from_secs(1);

/// Runs a Path Defence level in virtual time and prints a run summary.
#[derive(Debug, Parser)]
#[command(name = "path-defence", version, about)]
struct Cli {
    /// Level to play. Defaults to the first level of the catalog.
    #[arg(long, value_name = "ID")]
    level: Option<String>,

    /// JSON level catalog replacing the bundled one.
    #[arg(long, value_name = "FILE")]
    levels: Option<PathBuf>,

    /// TOML simulation configuration.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Speed multiplier applied to the simulation.
    #[arg(long, value_name = "X", default_value_t = 1.0)]
    speed: f32,

    /// Wall-clock seconds to simulate before giving up.
    #[arg(long, value_name = "N", default_value_t = 300)]
    seconds: u64,

    /// Tower built before the first tick, as KIND@COLUMN,ROW. Repeatable.
    #[arg(long = "tower", value_name = "KIND@COL,ROW")]
    towers: Vec<TowerPlacement>,

    /// Print an ASCII frame every second of wall-clock time.
    #[arg(long)]
    render: bool,

    /// Pace frames against the real clock instead of running flat out.
    #[arg(long)]
    realtime: bool,

    /// List the levels of the catalog and exit.
    #[arg(long)]
    list: bool,
}

/// Outcome of a headless run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    level: String,
    status: RunStatus,
    wave: usize,
    wave_count: usize,
    gold: u32,
    lives: i32,
    score: u32,
    simulated_seconds: f32,
    stats: RunStats,
    next_level: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let catalog = load_catalog(&cli)?;
    if cli.list {
        for level in catalog.get_all_levels() {
            println!(
                "{:<12} {:<20} {:?}, {} waves, {} enemies",
                level.id,
                level.name,
                level.difficulty,
                level.wave_count(),
                level.total_enemies()
            );
        }
        return Ok(());
    }

    let config = load_config(&cli)?;
    let summary = run(&cli, catalog, config)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("failed to serialize run summary")?
    );
    Ok(())
}

fn load_catalog(cli: &Cli) -> Result<LevelCatalog> {
    match &cli.levels {
        Some(path) => LevelCatalog::from_path(path)
            .with_context(|| format!("failed to load levels from {}", path.display())),
        None => Ok(LevelCatalog::bundled()),
    }
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    match &cli.config {
        Some(path) => SimConfig::from_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(SimConfig::default()),
    }
}

fn run(cli: &Cli, catalog: LevelCatalog, config: SimConfig) -> Result<RunSummary> {
    let level_id = match &cli.level {
        Some(id) => id.clone(),
        None => match catalog.get_next_level() {
            Some(level) => level.id.clone(),
            None => bail!("the level catalog is empty"),
        },
    };

    let frame_interval = config.frame_interval();
    let mut driver = SimulationLoop::new(Simulation::new(catalog, config));
    driver
        .start(&level_id)
        .with_context(|| format!("failed to start level '{level_id}'"))?;

    let simulation = driver.simulation_mut();
    simulation.set_speed(cli.speed);
    for placement in &cli.towers {
        match simulation.place_tower(placement.kind, placement.cell) {
            Ok(tower) => log::info!("built tower {} as {placement}", tower.get()),
            Err(error) => log::warn!("skipping tower {placement}: {error}"),
        }
    }

    let mut backend = AsciiBackend::new(io::stdout().lock());
    let budget = Duration::from_secs(cli.seconds);
    let mut next_render = Duration::ZERO;
    let mut wave = None;
    let mut pacer = cli.realtime.then(|| FramePacer::new(frame_interval));
    while driver.wall_clock() < budget {
        let elapsed = match pacer.as_mut() {
            Some(pacer) => pacer.wait(),
            None => frame_interval,
        };
        driver.advance(elapsed);
        let Some(frame) = driver.frame() else {
            continue;
        };

        if wave != Some(frame.wave) && frame.status == RunStatus::Playing {
            wave = Some(frame.wave);
            log::info!(
                "wave {}/{} under way: gold {}, lives {}",
                frame.wave + 1,
                frame.wave_count,
                frame.gold,
                frame.lives
            );
        }
        if cli.render && driver.wall_clock() >= next_render {
            next_render = driver.wall_clock() + RENDER_INTERVAL;
            backend
                .present(&Scene::from_frame(frame))
                .context("failed to render frame")?;
        }
        if frame.status.is_terminal() {
            break;
        }
    }
    driver.stop();

    let simulation = driver.simulation();
    let frame = simulation.frame();
    if !frame.status.is_terminal() {
        log::warn!("stopped after {}s without a result", cli.seconds);
    }
    Ok(RunSummary {
        level: level_id,
        status: frame.status,
        wave: frame.wave + 1,
        wave_count: frame.wave_count,
        gold: frame.gold,
        lives: frame.lives,
        score: frame.score,
        simulated_seconds: frame.clock.as_secs_f32(),
        stats: frame.stats,
        next_level: simulation.next_level_id().map(str::to_owned),
    })
}

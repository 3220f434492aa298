//! Facade hosting one world together with its systems and UI hints.

use std::time::Duration;

use glam::Vec2;
use path_defence_core::{
    geometry, CellCoord, Command, EnemyView, Event, PlacementError, ProjectileView,
    RemovalError, RunStatus, TowerId, TowerKind, TowerView, UpgradeError,
};
use path_defence_levels::LevelCatalog;
use path_defence_world::{query, Grid, World};
use thiserror::Error;

use crate::{
    config::SimConfig,
    step::{Pipeline, RunStats},
};

/// Errors raised by run lifecycle requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The catalog holds no level with the requested identifier.
    #[error("unknown level '{0}'")]
    UnknownLevel(String),
    /// A run is already loaded; it must be reset first.
    #[error("a run is already loaded ({0:?}); reset it first")]
    RunInProgress(RunStatus),
}

/// Everything a renderer needs to draw one frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Lifecycle status of the run.
    pub status: RunStatus,
    /// Speed multiplier in effect.
    pub speed: f32,
    /// Gold held by the player.
    pub gold: u32,
    /// Lives remaining.
    pub lives: i32,
    /// Score accumulated in the run.
    pub score: u32,
    /// Zero-based index of the current wave.
    pub wave: usize,
    /// Number of waves in the level.
    pub wave_count: usize,
    /// Simulation clock.
    pub clock: Duration,
    /// Identifier of the level being played.
    pub level_id: Option<String>,
    /// Grid the level path was projected onto.
    pub grid: Grid,
    /// Waypoints of the level path.
    pub path: Vec<Vec2>,
    /// Enemies on the field.
    pub enemies: EnemyView,
    /// Towers built by the player.
    pub towers: TowerView,
    /// Projectiles in flight.
    pub projectiles: ProjectileView,
    /// Cell under the pointer, if any.
    pub hovered_cell: Option<CellCoord>,
    /// Tower currently selected, if any.
    pub selected_tower: Option<TowerId>,
    /// Simulation time at which the next wave begins, when one is armed.
    pub next_wave_at: Option<Duration>,
    /// Totals gathered since the run started.
    pub stats: RunStats,
}

/// Single-player simulation session.
///
/// Every mutation goes through the world's command interface; the facade only
/// translates rejection events into typed errors and keeps UI hints such as
/// the hovered cell and the selected tower.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    catalog: LevelCatalog,
    world: World,
    pipeline: Pipeline,
    hovered_cell: Option<CellCoord>,
    selected_tower: Option<TowerId>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates an idle session over the provided catalog.
    ///
    /// The configuration is used as given; [`SimConfig::validate`] is the
    /// caller's job when the values come from outside.
    #[must_use]
    pub fn new(catalog: LevelCatalog, config: SimConfig) -> Self {
        Self {
            world: World::with_config(config.world.clone()),
            pipeline: Pipeline::new(&config),
            config,
            catalog,
            hovered_cell: None,
            selected_tower: None,
            events: Vec::new(),
        }
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Level catalog backing the session.
    #[must_use]
    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Read-only access to the hosted world for fine-grained queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        query::status(&self.world)
    }

    /// Current speed multiplier.
    #[must_use]
    pub fn speed(&self) -> f32 {
        query::speed(&self.world)
    }

    /// Totals gathered since the run started.
    #[must_use]
    pub fn stats(&self) -> RunStats {
        self.pipeline.stats()
    }

    /// Starts a run on the level with the provided identifier.
    pub fn start(&mut self, level_id: &str) -> Result<(), SessionError> {
        let status = self.status();
        if status != RunStatus::Idle {
            return Err(SessionError::RunInProgress(status));
        }
        let level = self
            .catalog
            .get_level_by_id(level_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownLevel(level_id.to_owned()))?;
        let _ = self.catalog.set_current(level_id);

        self.hovered_cell = None;
        self.selected_tower = None;
        let _ = self.execute(Command::StartRun {
            level,
            run_id: geometry::generate_id("run"),
        });
        Ok(())
    }

    /// Pauses a playing run. Other statuses are left untouched.
    pub fn pause(&mut self) {
        let _ = self.execute(Command::Pause);
    }

    /// Resumes a paused run. Other statuses are left untouched.
    pub fn resume(&mut self) {
        let _ = self.execute(Command::Resume);
    }

    /// Drops the run and returns to idle.
    pub fn reset(&mut self) {
        self.hovered_cell = None;
        self.selected_tower = None;
        let _ = self.execute(Command::Reset);
    }

    /// Requests a new speed multiplier. Invalid values are ignored.
    pub fn set_speed(&mut self, multiplier: f32) {
        let _ = self.execute(Command::SetSpeed { multiplier });
    }

    /// Builds a tower of `kind` in `cell`.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
    ) -> Result<TowerId, PlacementError> {
        let events = self.execute(Command::PlaceTower { kind, cell });
        events
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::InactiveRun))
    }

    /// Sells a tower and returns the refunded gold.
    pub fn remove_tower(&mut self, tower: TowerId) -> Result<u32, RemovalError> {
        let events = self.execute(Command::RemoveTower { tower });
        let outcome = events
            .iter()
            .find_map(|event| match event {
                Event::TowerRemoved { refund, .. } => Some(Ok(*refund)),
                Event::TowerRemovalRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(RemovalError::InactiveRun));
        if outcome.is_ok() && self.selected_tower == Some(tower) {
            self.selected_tower = None;
        }
        outcome
    }

    /// Upgrades a tower and returns the level it reached.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<u32, UpgradeError> {
        let events = self.execute(Command::UpgradeTower { tower });
        events
            .iter()
            .find_map(|event| match event {
                Event::TowerUpgraded { level, .. } => Some(Ok(*level)),
                Event::TowerUpgradeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(UpgradeError::InactiveRun))
    }

    /// Records the cell under the pointer. Cells outside the grid clear it.
    pub fn set_hovered_cell(&mut self, cell: Option<CellCoord>) {
        self.hovered_cell = cell.filter(|cell| query::grid(&self.world).kind(*cell).is_some());
    }

    /// Selects a tower for the inspector. Unknown towers clear the selection.
    pub fn select_tower(&mut self, tower: Option<TowerId>) -> bool {
        self.selected_tower = tower.filter(|tower| {
            query::tower_view(&self.world)
                .iter()
                .any(|snapshot| snapshot.id == *tower)
        });
        self.selected_tower.is_some()
    }

    /// Identifier of the level following the current one.
    #[must_use]
    pub fn next_level_id(&self) -> Option<&str> {
        self.catalog.get_next_level().map(|level| level.id.as_str())
    }

    /// Captures everything a renderer needs for the current state.
    #[must_use]
    pub fn frame(&self) -> Frame {
        let world = &self.world;
        Frame {
            status: query::status(world),
            speed: query::speed(world),
            gold: query::gold(world),
            lives: query::lives(world),
            score: query::score(world),
            wave: query::wave(world),
            wave_count: query::wave_count(world),
            clock: query::clock(world),
            level_id: query::level_id(world).map(str::to_owned),
            grid: query::grid(world).clone(),
            path: query::path_points(world).to_vec(),
            enemies: query::enemy_view(world),
            towers: query::tower_view(world),
            projectiles: query::projectile_view(world),
            hovered_cell: self.hovered_cell,
            selected_tower: self.selected_tower,
            next_wave_at: self.pipeline.spawning().next_wave_at(),
            stats: self.pipeline.stats(),
        }
    }

    /// Advances the simulation by one tick of `dt` simulated time.
    pub fn step(&mut self, dt: Duration) {
        self.events.clear();
        self.pipeline.step(&mut self.world, dt, &mut self.events);
        self.forget_removed_selection();
    }

    /// Releases the wave spawns due at the current simulation clock.
    pub fn poll_spawns(&mut self) {
        self.events.clear();
        self.pipeline.poll_spawns(&mut self.world, &mut self.events);
    }

    /// Events produced by the most recent operation.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    fn execute(&mut self, command: Command) -> &[Event] {
        self.events.clear();
        self.pipeline
            .dispatch(&mut self.world, command, &mut self.events);
        &self.events
    }

    fn forget_removed_selection(&mut self) {
        if let Some(tower) = self.selected_tower {
            if query::tower_view(&self.world)
                .iter()
                .all(|snapshot| snapshot.id != tower)
            {
                self.selected_tower = None;
            }
        }
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative run state management for Path Defence.
//!
//! The world owns every enemy, tower and projectile together with the run's
//! resources and status. It is mutated exclusively through [`apply`], which
//! validates each [`Command`] and reports the outcome as [`Event`] values.

mod enemies;
mod grid;
mod path;
mod projectiles;
mod towers;

use std::time::Duration;

use path_defence_core::{
    geometry, AttackMode, CellCoord, Command, EnemyId, EnemyKind, Event, LevelDefinition,
    PlacementError, ProjectileId, RemovalError, RunStatus, TowerId, TowerKind, UpgradeError,
};
use serde::{Deserialize, Serialize};

use enemies::EnemyState;
use path::PathGeometry;
use projectiles::ProjectileState;
use towers::TowerRegistry;

pub use grid::Grid;

const DEFAULT_GRID_COLUMNS: u32 = 20;
const DEFAULT_GRID_ROWS: u32 = 15;
const DEFAULT_CELL_SIZE: f32 = 40.0;
const DEFAULT_PROJECTION_STEPS: u32 = 100;
const DEFAULT_REFUND_FRACTION: f32 = 0.7;
const DEFAULT_HIT_THRESHOLD: f32 = 8.0;
const DEFAULT_SLOW_DECAY_PER_SECOND: f32 = 0.5;
const DEFAULT_MAX_SPEED: f32 = 8.0;

/// Tunables applied to every run hosted by a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of grid columns the level path is projected onto.
    pub columns: u32,
    /// Number of grid rows the level path is projected onto.
    pub rows: u32,
    /// Side length of a square cell in world units.
    pub cell_size: f32,
    /// Interpolation steps walked along every path segment during projection.
    pub projection_steps: u32,
    /// Share of the invested gold returned when a tower is sold.
    pub refund_fraction: f32,
    /// Distance at which a projectile registers a hit on its target.
    pub hit_threshold: f32,
    /// Slow removed from every enemy per simulated second.
    pub slow_decay_per_second: f32,
    /// Upper bound accepted for the speed multiplier.
    pub max_speed: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: DEFAULT_GRID_COLUMNS,
            rows: DEFAULT_GRID_ROWS,
            cell_size: DEFAULT_CELL_SIZE,
            projection_steps: DEFAULT_PROJECTION_STEPS,
            refund_fraction: DEFAULT_REFUND_FRACTION,
            hit_threshold: DEFAULT_HIT_THRESHOLD,
            slow_decay_per_second: DEFAULT_SLOW_DECAY_PER_SECOND,
            max_speed: DEFAULT_MAX_SPEED,
        }
    }
}

/// Represents the authoritative Path Defence run state.
#[derive(Debug)]
pub struct World {
    config: Config,
    status: RunStatus,
    speed: f32,
    gold: u32,
    lives: i32,
    score: u32,
    wave: usize,
    wave_in_progress: bool,
    clock: Duration,
    run_id: Option<String>,
    level: Option<LevelDefinition>,
    path: PathGeometry,
    grid: Grid,
    enemies: Vec<EnemyState>,
    towers: TowerRegistry,
    projectiles: Vec<ProjectileState>,
    next_enemy_id: u32,
    next_projectile_id: u32,
}

impl World {
    /// Creates an idle world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an idle world using the provided configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            status: RunStatus::Idle,
            speed: 1.0,
            gold: 0,
            lives: 0,
            score: 0,
            wave: 0,
            wave_in_progress: false,
            clock: Duration::ZERO,
            run_id: None,
            level: None,
            path: PathGeometry::default(),
            grid: Grid::default(),
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            next_enemy_id: 0,
            next_projectile_id: 0,
        }
    }

    fn set_status(&mut self, to: RunStatus, out_events: &mut Vec<Event>) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        log::info!("run status changed from {from:?} to {to:?}");
        out_events.push(Event::RunStatusChanged { from, to });
    }

    fn clear_run(&mut self) {
        self.gold = 0;
        self.lives = 0;
        self.score = 0;
        self.wave = 0;
        self.wave_in_progress = false;
        self.clock = Duration::ZERO;
        self.run_id = None;
        self.level = None;
        self.path = PathGeometry::default();
        self.grid = Grid::default();
        self.enemies.clear();
        self.towers = TowerRegistry::new();
        self.projectiles.clear();
        self.next_enemy_id = 0;
        self.next_projectile_id = 0;
    }

    fn start_run(&mut self, level: LevelDefinition, run_id: String, out_events: &mut Vec<Event>) {
        if self.status != RunStatus::Idle {
            log::debug!("ignoring start of '{}' while {:?}", level.id, self.status);
            return;
        }

        self.clear_run();
        self.grid = Grid::project(
            &level.path,
            self.config.columns,
            self.config.rows,
            self.config.cell_size,
            self.config.projection_steps,
            &level.blocked,
        );
        self.path = PathGeometry::new(level.path.clone());
        if !self.path.is_traversable() {
            log::warn!("level '{}' has no traversable path; enemies will stall", level.id);
        }
        self.gold = level.initial_gold;
        self.lives = level.initial_lives;
        self.run_id = Some(run_id.clone());

        log::info!("starting run {run_id} on level '{}'", level.id);
        out_events.push(Event::RunStarted {
            level_id: level.id.clone(),
            run_id,
        });
        self.level = Some(level);
        self.set_status(RunStatus::Playing, out_events);
        self.start_wave(0, out_events);
    }

    fn start_wave(&mut self, wave: usize, out_events: &mut Vec<Event>) {
        if self.status != RunStatus::Playing || self.wave_in_progress {
            return;
        }
        let Some(groups) = self.level.as_ref().and_then(|level| level.wave(wave)) else {
            log::debug!("ignoring start of unknown wave {wave}");
            return;
        };
        let groups = groups.to_vec();

        self.wave = wave;
        self.wave_in_progress = true;
        log::info!("wave {} started", wave + 1);
        out_events.push(Event::WaveStarted {
            wave,
            groups,
            at: self.clock,
        });
    }

    fn complete_wave(&mut self, out_events: &mut Vec<Event>) {
        if self.status != RunStatus::Playing || !self.wave_in_progress || !self.enemies.is_empty() {
            return;
        }

        self.wave_in_progress = false;
        let next = Some(self.wave + 1).filter(|next| *next < self.wave_count());
        log::info!("wave {} cleared", self.wave + 1);
        out_events.push(Event::WaveCleared {
            wave: self.wave,
            next,
            at: self.clock,
        });
        if next.is_none() {
            self.set_status(RunStatus::Win, out_events);
        }
    }

    fn wave_count(&self) -> usize {
        self.level.as_ref().map_or(0, LevelDefinition::wave_count)
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.status != RunStatus::Playing {
            return;
        }

        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt, now: self.clock });

        let seconds = dt.as_secs_f32();
        let decay = self.config.slow_decay_per_second * seconds;
        let mut index = 0;
        while index < self.enemies.len() {
            let enemy = &mut self.enemies[index];

            if !enemy.is_alive() {
                enemy.health = 0.0;
                let (id, stats) = (enemy.id, enemy.kind.stats());
                let _ = self.enemies.remove(index);
                self.gold = self.gold.saturating_add(stats.reward);
                self.score = self.score.saturating_add(stats.score);
                out_events.push(Event::EnemyKilled {
                    enemy: id,
                    reward: stats.reward,
                    score: stats.score,
                });
                continue;
            }

            if self.path.is_traversable() {
                enemy.progress += enemy.effective_speed() * seconds;
                if enemy.progress >= self.path.total_length() {
                    let (id, damage) = (enemy.id, enemy.kind.stats().damage);
                    let _ = self.enemies.remove(index);
                    self.lives = self
                        .lives
                        .saturating_sub(i32::try_from(damage).unwrap_or(i32::MAX));
                    log::debug!("enemy {} leaked for {damage} lives", id.get());
                    out_events.push(Event::EnemyLeaked { enemy: id, damage });
                    continue;
                }
                enemy.position = self.path.position_at(enemy.progress);
            }

            enemy.decay_slow(decay);
            index += 1;
        }

        if self.lives <= 0 {
            self.lives = 0;
            self.set_status(RunStatus::Lose, out_events);
        }
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, out_events: &mut Vec<Event>) {
        if self.status != RunStatus::Playing {
            return;
        }
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);
        self.enemies
            .push(EnemyState::spawn(id, kind, self.path.start()));
        out_events.push(Event::EnemySpawned { enemy: id, kind });
    }

    fn enemy_mut(&mut self, enemy: EnemyId) -> Option<&mut EnemyState> {
        self.enemies.iter_mut().find(|state| state.id == enemy)
    }

    fn living_enemy(&self, enemy: EnemyId) -> Option<&EnemyState> {
        self.enemies
            .iter()
            .find(|state| state.id == enemy && state.is_alive())
    }

    fn fire_projectile(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        if self.status != RunStatus::Playing {
            return;
        }
        let Some(state) = self.towers.get(tower) else {
            log::debug!("ignoring fire request from missing tower {}", tower.get());
            return;
        };
        let Some(enemy) = self.living_enemy(target) else {
            log::debug!("ignoring fire request at missing enemy {}", target.get());
            return;
        };

        let stats = state.stats();
        let in_range = geometry::distance_squared(state.position, enemy.position)
            <= stats.range * stats.range;
        if !in_range || state.ready_in(self.clock) > Duration::ZERO {
            log::debug!("tower {} cannot fire yet", tower.get());
            return;
        }

        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.saturating_add(1);
        self.projectiles.push(ProjectileState {
            id,
            tower,
            target,
            position: state.position,
            speed: stats.projectile_speed,
            damage: stats.damage,
            mode: stats.mode,
        });
        if let Some(state) = self.towers.get_mut(tower) {
            state.last_attack = Some(self.clock);
        }
        out_events.push(Event::ProjectileFired {
            projectile: id,
            tower,
            target,
        });
    }

    fn take_projectile(&mut self, projectile: ProjectileId) -> Option<ProjectileState> {
        let index = self
            .projectiles
            .iter()
            .position(|state| state.id == projectile)?;
        Some(self.projectiles.remove(index))
    }

    fn resolve_hit(&mut self, projectile: ProjectileId, out_events: &mut Vec<Event>) {
        let Some(shot) = self.take_projectile(projectile) else {
            return;
        };
        let Some(center) = self.living_enemy(shot.target).map(|enemy| enemy.position) else {
            log::debug!("discarding stale projectile {}", projectile.get());
            out_events.push(Event::ProjectileDiscarded { projectile });
            return;
        };

        let mut damaged = Vec::new();
        match shot.mode {
            AttackMode::Single => {
                if let Some(enemy) = self.enemy_mut(shot.target) {
                    enemy.health -= shot.damage;
                    damaged.push(enemy.id);
                }
            }
            AttackMode::Area { radius } => {
                let radius_squared = radius * radius;
                for enemy in self.enemies.iter_mut().filter(|enemy| {
                    enemy.is_alive()
                        && geometry::distance_squared(enemy.position, center) <= radius_squared
                }) {
                    enemy.health -= shot.damage;
                    damaged.push(enemy.id);
                }
            }
            AttackMode::Slow { strength } => {
                if let Some(enemy) = self.enemy_mut(shot.target) {
                    enemy.health -= shot.damage;
                    enemy.apply_slow(strength);
                    damaged.push(enemy.id);
                }
            }
        }

        out_events.push(Event::ProjectileHit {
            projectile,
            target: shot.target,
            damaged,
        });
    }

    fn place_tower(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
    ) -> Result<(TowerId, u32), PlacementError> {
        if !self.status.is_active() {
            return Err(PlacementError::InactiveRun);
        }
        if self.grid.kind(cell).is_none() {
            return Err(PlacementError::OutOfBounds);
        }
        if !self.grid.is_buildable(cell) {
            return Err(PlacementError::NotBuildable);
        }
        if self.towers.at(cell).is_some() {
            return Err(PlacementError::Occupied);
        }
        let cost = kind.cost();
        if self.gold < cost {
            return Err(PlacementError::InsufficientGold {
                required: cost,
                available: self.gold,
            });
        }

        self.gold -= cost;
        let position = cell.center(self.grid.cell_size());
        Ok((self.towers.insert(kind, cell, position), cost))
    }

    fn remove_tower(&mut self, tower: TowerId) -> Result<(CellCoord, u32), RemovalError> {
        if !self.status.is_active() {
            return Err(RemovalError::InactiveRun);
        }
        let state = self.towers.remove(tower).ok_or(RemovalError::MissingTower)?;
        // Basis points keep decimal fractions such as 0.7 from flooring one short.
        let basis_points = (self.config.refund_fraction.clamp(0.0, 1.0) * 10_000.0).round() as u64;
        let refund = u32::try_from(u64::from(state.invested) * basis_points / 10_000)
            .unwrap_or(u32::MAX);
        self.gold = self.gold.saturating_add(refund);
        Ok((state.cell, refund))
    }

    fn upgrade_tower(&mut self, tower: TowerId) -> Result<(u32, u32), UpgradeError> {
        if !self.status.is_active() {
            return Err(UpgradeError::InactiveRun);
        }
        let available = self.gold;
        let state = self
            .towers
            .get_mut(tower)
            .ok_or(UpgradeError::MissingTower)?;
        let cost = state
            .kind
            .upgrade_cost(state.level)
            .ok_or(UpgradeError::MaxLevel)?;
        if available < cost {
            return Err(UpgradeError::InsufficientGold {
                required: cost,
                available,
            });
        }

        state.level += 1;
        state.invested = state.invested.saturating_add(cost);
        let level = state.level;
        self.gold -= cost;
        Ok((level, cost))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartRun { level, run_id } => world.start_run(level, run_id, out_events),
        Command::Pause => {
            if world.status == RunStatus::Playing {
                world.set_status(RunStatus::Paused, out_events);
            }
        }
        Command::Resume => {
            if world.status == RunStatus::Paused {
                world.set_status(RunStatus::Playing, out_events);
            }
        }
        Command::Reset => {
            world.clear_run();
            if world.speed != 1.0 {
                world.speed = 1.0;
                out_events.push(Event::SpeedChanged { multiplier: 1.0 });
            }
            world.set_status(RunStatus::Idle, out_events);
        }
        Command::SetSpeed { multiplier } => {
            if !multiplier.is_finite() || multiplier <= 0.0 {
                log::debug!("ignoring invalid speed multiplier {multiplier}");
                return;
            }
            let multiplier = multiplier.min(world.config.max_speed);
            world.speed = multiplier;
            out_events.push(Event::SpeedChanged { multiplier });
        }
        Command::Tick { dt } => world.advance(dt, out_events),
        Command::SpawnEnemy { kind } => world.spawn_enemy(kind, out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::MoveProjectile {
            projectile,
            position,
        } => {
            if let Some(state) = world
                .projectiles
                .iter_mut()
                .find(|state| state.id == projectile)
            {
                state.position = position;
            }
        }
        Command::ResolveHit { projectile } => world.resolve_hit(projectile, out_events),
        Command::DiscardProjectile { projectile } => {
            if world.take_projectile(projectile).is_some() {
                log::debug!("discarding projectile {}", projectile.get());
                out_events.push(Event::ProjectileDiscarded { projectile });
            }
        }
        Command::CompleteWave => world.complete_wave(out_events),
        Command::StartWave { wave } => world.start_wave(wave, out_events),
        Command::PlaceTower { kind, cell } => match world.place_tower(kind, cell) {
            Ok((tower, cost)) => out_events.push(Event::TowerPlaced {
                tower,
                kind,
                cell,
                cost,
            }),
            Err(reason) => {
                log::debug!("rejected {kind:?} tower at {cell:?}: {reason}");
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            }
        },
        Command::RemoveTower { tower } => match world.remove_tower(tower) {
            Ok((cell, refund)) => out_events.push(Event::TowerRemoved {
                tower,
                cell,
                refund,
            }),
            Err(reason) => {
                log::debug!("rejected removal of tower {}: {reason}", tower.get());
                out_events.push(Event::TowerRemovalRejected { tower, reason });
            }
        },
        Command::UpgradeTower { tower } => match world.upgrade_tower(tower) {
            Ok((level, cost)) => out_events.push(Event::TowerUpgraded { tower, level, cost }),
            Err(reason) => {
                log::debug!("rejected upgrade of tower {}: {reason}", tower.get());
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
            }
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use path_defence_core::{
        CellCoord, EnemyView, ProjectileView, RunStatus, TowerCooldownSnapshot,
        TowerCooldownView, TowerId, TowerView,
    };

    use super::{Config, Grid, World};

    /// Current lifecycle status of the run.
    #[must_use]
    pub fn status(world: &World) -> RunStatus {
        world.status
    }

    /// Multiplier applied to wall-clock deltas.
    #[must_use]
    pub fn speed(world: &World) -> f32 {
        world.speed
    }

    /// Gold available to the player.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Lives left before the run is lost.
    #[must_use]
    pub fn lives(world: &World) -> i32 {
        world.lives
    }

    /// Score accumulated from kills.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Zero-based index of the current, or most recently cleared, wave.
    #[must_use]
    pub fn wave(world: &World) -> usize {
        world.wave
    }

    /// Number of waves in the active level.
    #[must_use]
    pub fn wave_count(world: &World) -> usize {
        world.wave_count()
    }

    /// Reports whether a wave has started and not yet been cleared.
    #[must_use]
    pub fn wave_in_progress(world: &World) -> bool {
        world.wave_in_progress
    }

    /// Simulated time elapsed since the run started.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Identifier of the active run, if any.
    #[must_use]
    pub fn run_id(world: &World) -> Option<&str> {
        world.run_id.as_deref()
    }

    /// Identifier of the active level, if any.
    #[must_use]
    pub fn level_id(world: &World) -> Option<&str> {
        world.level.as_ref().map(|level| level.id.as_str())
    }

    /// Occupancy grid projected from the active level path.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Waypoints of the active level path.
    #[must_use]
    pub fn path_points(world: &World) -> &[Vec2] {
        world.path.points()
    }

    /// Arc length of the active level path.
    #[must_use]
    pub fn path_length(world: &World) -> f32 {
        world.path.total_length()
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Captures a read-only view of every enemy, including those awaiting removal.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Number of enemies still on the field, including those awaiting removal.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Number of enemies with health left.
    #[must_use]
    pub fn living_enemy_count(world: &World) -> usize {
        world.enemies.iter().filter(|enemy| enemy.is_alive()).count()
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Tower standing in the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.towers.at(cell)
    }

    /// Captures the remaining cooldown of every tower at the current clock.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| TowerCooldownSnapshot {
                    tower: tower.id,
                    kind: tower.kind,
                    ready_in: tower.ready_in(world.clock),
                })
                .collect(),
        )
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the message surface that connects the driver, the
//! authoritative world, and pure systems. The driver submits [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod geometry;
pub mod level;

pub use level::{Difficulty, LevelDefinition, WaveGroup};

/// Highest level a tower can be upgraded to.
pub const MAX_TOWER_LEVEL: u32 = 3;

/// Lifecycle status of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// No run is active; the world awaits a start command.
    Idle,
    /// The simulation advances on every tick.
    Playing,
    /// The run is suspended; ticks leave the state untouched.
    Paused,
    /// Every wave was cleared.
    Win,
    /// Lives were exhausted.
    Lose,
}

impl RunStatus {
    /// Reports whether the run reached a terminal state that requires a reset.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }

    /// Reports whether a run is loaded, regardless of whether it advances.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Loads a level and begins a fresh run with its first wave.
    StartRun {
        /// Static definition of the level to play.
        level: LevelDefinition,
        /// Opaque identifier assigned to the run.
        run_id: String,
    },
    /// Suspends a playing run.
    Pause,
    /// Resumes a paused run.
    Resume,
    /// Discards the active run and returns the world to idle.
    Reset,
    /// Changes the multiplier applied to wall-clock deltas.
    SetSpeed {
        /// New speed multiplier.
        multiplier: f32,
    },
    /// Advances the simulation clock and moves every enemy along the path.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an enemy of the given archetype enter at the path start.
    SpawnEnemy {
        /// Archetype of the enemy to create.
        kind: EnemyKind,
    },
    /// Requests that a tower launch a projectile at the provided enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the projectile homes toward.
        target: EnemyId,
    },
    /// Relocates an in-flight projectile.
    MoveProjectile {
        /// Projectile to relocate.
        projectile: ProjectileId,
        /// New position of the projectile in world units.
        position: Vec2,
    },
    /// Resolves the damage carried by a projectile that reached its target.
    ResolveHit {
        /// Projectile that registered the hit.
        projectile: ProjectileId,
    },
    /// Drops a projectile whose target vanished.
    DiscardProjectile {
        /// Projectile to drop.
        projectile: ProjectileId,
    },
    /// Marks the wave in progress as cleared.
    CompleteWave,
    /// Begins the wave with the provided index.
    StartWave {
        /// Zero-based index of the wave within the level.
        wave: usize,
    },
    /// Requests construction of a tower in the provided grid cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell the tower should occupy.
        cell: CellCoord,
    },
    /// Requests that a tower be sold.
    RemoveTower {
        /// Identifier of the tower targeted for removal.
        tower: TowerId,
    },
    /// Requests that a tower be upgraded to its next level.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a run began.
    RunStarted {
        /// Identifier of the level being played.
        level_id: String,
        /// Identifier assigned to the run.
        run_id: String,
    },
    /// Announces a transition of the run status.
    RunStatusChanged {
        /// Status before the transition.
        from: RunStatus,
        /// Status after the transition.
        to: RunStatus,
    },
    /// Confirms that the speed multiplier changed.
    SpeedChanged {
        /// Multiplier now in effect.
        multiplier: f32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Simulation clock after the tick.
        now: Duration,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
    },
    /// Reports that an enemy was killed and its bounty paid.
    EnemyKilled {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Gold awarded for the kill.
        reward: u32,
        /// Score awarded for the kill.
        score: u32,
    },
    /// Reports that an enemy reached the exit.
    EnemyLeaked {
        /// Identifier of the enemy that leaked.
        enemy: EnemyId,
        /// Lives deducted by the leak.
        damage: u32,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy targeted by the projectile.
        target: EnemyId,
    },
    /// Reports that a projectile hit and applied its damage.
    ProjectileHit {
        /// Projectile that hit.
        projectile: ProjectileId,
        /// Enemy the projectile was aimed at.
        target: EnemyId,
        /// Every enemy that received damage, in ascending id order.
        damaged: Vec<EnemyId>,
    },
    /// Reports that a projectile was dropped without dealing damage.
    ProjectileDiscarded {
        /// Projectile that was dropped.
        projectile: ProjectileId,
    },
    /// Announces that a wave began and lists its spawn groups.
    WaveStarted {
        /// Zero-based index of the wave.
        wave: usize,
        /// Enemy groups composing the wave.
        groups: Vec<WaveGroup>,
        /// Simulation clock at which the wave began.
        at: Duration,
    },
    /// Announces that a wave was cleared.
    WaveCleared {
        /// Zero-based index of the cleared wave.
        wave: usize,
        /// Index of the wave that follows, if any remain.
        next: Option<usize>,
        /// Simulation clock at which the wave was cleared.
        at: Duration,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Gold spent on the tower.
        cost: u32,
    },
    /// Confirms that a tower was sold.
    TowerRemoved {
        /// Identifier of the tower that was removed.
        tower: TowerId,
        /// Cell freed by the removal.
        cell: CellCoord,
        /// Gold refunded to the player.
        refund: u32,
    },
    /// Confirms that a tower was upgraded.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached by the tower.
        level: u32,
        /// Gold spent on the upgrade.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a tower removal request was rejected.
    TowerRemovalRejected {
        /// Identifier of the tower targeted for removal.
        tower: TowerId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted for the upgrade.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// World-space centre of the cell for the provided cell size.
    #[must_use]
    pub fn center(&self, cell_size: f32) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * cell_size,
            (self.row as f32 + 0.5) * cell_size,
        )
    }
}

/// Classification of a grid cell derived from the level path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// Cell crossed by the enemy route.
    Path,
    /// Free cell that accepts towers.
    Buildable,
    /// Cell containing the first waypoint.
    Spawn,
    /// Cell containing the last waypoint.
    Exit,
    /// Cell the level marks as an obstacle.
    Blocked,
}

/// Enemy archetypes that can appear in waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline infantry.
    Grunt,
    /// Fast and fragile.
    Runner,
    /// Slow and durable.
    Tank,
    /// Wave-ending heavyweight.
    Boss,
}

/// Stat block instantiated for every spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Starting and maximum health.
    pub health: f32,
    /// Base speed in world units per second.
    pub speed: f32,
    /// Gold paid when the enemy is killed.
    pub reward: u32,
    /// Score granted when the enemy is killed.
    pub score: u32,
    /// Lives removed when the enemy leaks.
    pub damage: u32,
    /// Visual radius in world units.
    pub radius: f32,
}

impl EnemyKind {
    /// Every enemy archetype in declaration order.
    pub const ALL: [EnemyKind; 4] = [Self::Grunt, Self::Runner, Self::Tank, Self::Boss];

    /// Returns the stat block for the archetype.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        match self {
            Self::Grunt => EnemyStats {
                health: 20.0,
                speed: 50.0,
                reward: 10,
                score: 10,
                damage: 1,
                radius: 8.0,
            },
            Self::Runner => EnemyStats {
                health: 12.0,
                speed: 80.0,
                reward: 8,
                score: 12,
                damage: 1,
                radius: 6.0,
            },
            Self::Tank => EnemyStats {
                health: 90.0,
                speed: 25.0,
                reward: 25,
                score: 30,
                damage: 2,
                radius: 12.0,
            },
            Self::Boss => EnemyStats {
                health: 400.0,
                speed: 20.0,
                reward: 100,
                score: 150,
                damage: 5,
                radius: 16.0,
            },
        }
    }
}

/// How a projectile applies its damage on impact.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackMode {
    /// Damages the target only.
    Single,
    /// Damages every living enemy around the target.
    Area {
        /// Radius around the target's position that receives damage.
        radius: f32,
    },
    /// Damages the target and slows it.
    Slow {
        /// Fraction of speed removed, in `0.0..=1.0`.
        strength: f32,
    },
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Cheap single-target tower.
    Arrow,
    /// Splash-damage tower.
    Cannon,
    /// Tower that slows its targets.
    Frost,
    /// Long-range, slow-firing single-target tower.
    Sniper,
}

/// Stat block of a tower at a given upgrade level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Damage carried by each projectile.
    pub damage: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Minimum time between two attacks.
    pub attack_interval: Duration,
    /// Damage application mode of the projectiles.
    pub mode: AttackMode,
    /// Projectile speed in world units per second.
    pub projectile_speed: f32,
}

impl TowerKind {
    /// Every tower archetype in declaration order.
    pub const ALL: [TowerKind; 4] = [Self::Arrow, Self::Cannon, Self::Frost, Self::Sniper];

    /// Gold required to construct the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Arrow => 50,
            Self::Cannon => 100,
            Self::Frost => 75,
            Self::Sniper => 125,
        }
    }

    /// Gold required to upgrade a tower currently at `level`.
    ///
    /// Returns `None` once the tower reached [`MAX_TOWER_LEVEL`].
    #[must_use]
    pub const fn upgrade_cost(self, level: u32) -> Option<u32> {
        if level == 0 || level >= MAX_TOWER_LEVEL {
            return None;
        }
        Some(self.cost() * level)
    }

    /// Base stat block of a freshly built tower.
    #[must_use]
    pub const fn base_stats(self) -> TowerStats {
        match self {
            Self::Arrow => TowerStats {
                damage: 10.0,
                range: 100.0,
                attack_interval: Duration::from_millis(1_000),
                mode: AttackMode::Single,
                projectile_speed: 300.0,
            },
            Self::Cannon => TowerStats {
                damage: 18.0,
                range: 110.0,
                attack_interval: Duration::from_millis(1_800),
                mode: AttackMode::Area { radius: 50.0 },
                projectile_speed: 200.0,
            },
            Self::Frost => TowerStats {
                damage: 4.0,
                range: 90.0,
                attack_interval: Duration::from_millis(900),
                mode: AttackMode::Slow { strength: 0.5 },
                projectile_speed: 250.0,
            },
            Self::Sniper => TowerStats {
                damage: 45.0,
                range: 200.0,
                attack_interval: Duration::from_millis(2_500),
                mode: AttackMode::Single,
                projectile_speed: 600.0,
            },
        }
    }

    /// Stat block of the tower at the provided upgrade level.
    ///
    /// Each level above the first adds a quarter of the base damage and a
    /// tenth of the base range. The attack mode and cadence never change.
    #[must_use]
    pub fn stats_at_level(self, level: u32) -> TowerStats {
        let base = self.base_stats();
        let bonus = level.clamp(1, MAX_TOWER_LEVEL).saturating_sub(1) as f32;
        TowerStats {
            damage: base.damage * (1.0 + 0.25 * bonus),
            range: base.range * (1.0 + 0.1 * bonus),
            ..base
        }
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Position in world units.
    pub position: Vec2,
    /// Remaining health. May be transiently negative after a lethal hit.
    pub health: f32,
    /// Health the enemy spawned with.
    pub max_health: f32,
    /// Base speed in world units per second.
    pub speed: f32,
    /// Arc length travelled along the path.
    pub progress: f32,
    /// Current slow fraction.
    pub slow: f32,
    /// Visual radius in world units.
    pub radius: f32,
}

impl EnemySnapshot {
    /// Reports whether the enemy still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Read-only snapshot describing all enemies on the field.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of the provided enemy.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// World-space position of the tower.
    pub position: Vec2,
    /// Current upgrade level, starting at one.
    pub level: u32,
    /// Stats in effect at the current level.
    pub stats: TowerStats,
    /// Simulation time of the last attack, if the tower has fired.
    pub last_attack: Option<Duration>,
}

/// Read-only snapshot describing all towers placed on the field.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Snapshot describing how long a tower must wait before firing again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Kind of tower.
    pub kind: TowerKind,
    /// Remaining cooldown; zero when the tower may fire.
    pub ready_in: Duration,
}

/// Read-only view of tower cooldowns sorted by tower identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured cooldowns in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Enemy the projectile homes toward.
    pub target: EnemyId,
    /// Current position in world units.
    pub position: Vec2,
    /// Flight speed in world units per second.
    pub speed: f32,
    /// Damage applied on impact.
    pub damage: f32,
    /// Damage application mode inherited from the tower.
    pub mode: AttackMode,
}

/// Read-only snapshot of every projectile in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectiles in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Target assignment computed for a single tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected by the tower.
    pub enemy: EnemyId,
    /// World-space position of the tower.
    pub tower_position: Vec2,
    /// World-space position of the enemy when the target was chosen.
    pub enemy_position: Vec2,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// No run is loaded or the run already ended.
    #[error("no run accepts construction right now")]
    InactiveRun,
    /// The requested cell lies beyond the grid bounds.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// The requested cell is part of the path or an obstacle.
    #[error("cell is not buildable")]
    NotBuildable,
    /// Another tower already stands in the cell.
    #[error("cell is already occupied by a tower")]
    Occupied,
    /// The player cannot afford the tower.
    #[error("tower costs {required} gold but only {available} is available")]
    InsufficientGold {
        /// Gold the tower costs.
        required: u32,
        /// Gold the player holds.
        available: u32,
    },
}

/// Reasons a tower removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RemovalError {
    /// No run is loaded or the run already ended.
    #[error("no run accepts selling right now")]
    InactiveRun,
    /// No tower with the provided identifier exists.
    #[error("tower does not exist")]
    MissingTower,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No run is loaded or the run already ended.
    #[error("no run accepts upgrades right now")]
    InactiveRun,
    /// No tower with the provided identifier exists.
    #[error("tower does not exist")]
    MissingTower,
    /// The tower is already at the highest level.
    #[error("tower is already at the maximum level")]
    MaxLevel,
    /// The player cannot afford the upgrade.
    #[error("upgrade costs {required} gold but only {available} is available")]
    InsufficientGold {
        /// Gold the upgrade costs.
        required: u32,
        /// Gold the player holds.
        available: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_center_sits_in_the_middle_of_the_cell() {
        let cell = CellCoord::new(2, 1);
        assert_eq!(cell.center(40.0), Vec2::new(100.0, 60.0));
    }

    #[test]
    fn upgrade_cost_scales_with_level_and_stops_at_max() {
        assert_eq!(TowerKind::Arrow.upgrade_cost(1), Some(50));
        assert_eq!(TowerKind::Arrow.upgrade_cost(2), Some(100));
        assert_eq!(TowerKind::Arrow.upgrade_cost(MAX_TOWER_LEVEL), None);
        assert_eq!(TowerKind::Arrow.upgrade_cost(0), None);
    }

    #[test]
    fn upgraded_stats_raise_damage_and_range_only() {
        let base = TowerKind::Cannon.base_stats();
        let upgraded = TowerKind::Cannon.stats_at_level(3);
        assert!((upgraded.damage - base.damage * 1.5).abs() < 1e-4);
        assert!((upgraded.range - base.range * 1.2).abs() < 1e-4);
        assert_eq!(upgraded.attack_interval, base.attack_interval);
        assert_eq!(upgraded.mode, base.mode);
    }

    #[test]
    fn level_one_stats_match_base_stats() {
        for kind in TowerKind::ALL {
            assert_eq!(kind.stats_at_level(1), kind.base_stats());
        }
    }

    #[test]
    fn terminal_statuses_are_win_and_lose() {
        assert!(RunStatus::Win.is_terminal());
        assert!(RunStatus::Lose.is_terminal());
        assert!(!RunStatus::Paused.is_terminal());
        assert!(RunStatus::Paused.is_active());
        assert!(!RunStatus::Idle.is_active());
    }

    #[test]
    fn enemy_view_lookup_finds_sorted_snapshots() {
        let snapshot = |id: u32| EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Grunt,
            position: Vec2::ZERO,
            health: 1.0,
            max_health: 1.0,
            speed: 1.0,
            progress: 0.0,
            slow: 0.0,
            radius: 1.0,
        };
        let view = EnemyView::from_snapshots(vec![snapshot(7), snapshot(2), snapshot(5)]);
        assert_eq!(view.get(EnemyId::new(5)).map(|s| s.id), Some(EnemyId::new(5)));
        assert!(view.get(EnemyId::new(3)).is_none());
        let ids: Vec<u32> = view.iter().map(|s| s.id.get()).collect();
        assert_eq!(ids, vec![2, 5, 7]);
    }

    #[test]
    fn archetypes_deserialize_from_lowercase_tags() {
        let kind: EnemyKind = serde_json::from_str("\"runner\"").expect("enemy kind");
        assert_eq!(kind, EnemyKind::Runner);
        let tower: TowerKind = serde_json::from_str("\"frost\"").expect("tower kind");
        assert_eq!(tower, TowerKind::Frost);
    }

    #[test]
    fn placement_error_describes_missing_gold() {
        let error = PlacementError::InsufficientGold {
            required: 75,
            available: 20,
        };
        assert_eq!(
            error.to_string(),
            "tower costs 75 gold but only 20 is available"
        );
    }
}

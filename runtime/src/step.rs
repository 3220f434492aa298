//! Ordered per-tick pipeline wiring the pure systems to the world.

use std::time::Duration;

use path_defence_core::{Command, Event, RunStatus, TowerTarget};
use path_defence_system_projectiles::{Config as ProjectilesConfig, Projectiles};
use path_defence_system_spawning::{Config as SpawningConfig, Spawning};
use path_defence_system_tower_combat::TowerCombat;
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_world::{self as world, query, World};
use serde::Serialize;

use crate::config::SimConfig;

/// Running totals gathered from the events of the current run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Enemies that entered the path.
    pub spawned: u32,
    /// Enemies killed by towers.
    pub killed: u32,
    /// Enemies that reached the exit.
    pub leaked: u32,
    /// Projectiles launched by towers.
    pub shots_fired: u32,
    /// Projectiles that hit their target.
    pub hits: u32,
    /// Waves cleared so far.
    pub waves_cleared: u32,
}

impl RunStats {
    fn record(&mut self, event: &Event) {
        match event {
            Event::RunStarted { .. } => *self = Self::default(),
            Event::EnemySpawned { .. } => self.spawned += 1,
            Event::EnemyKilled { .. } => self.killed += 1,
            Event::EnemyLeaked { .. } => self.leaked += 1,
            Event::ProjectileFired { .. } => self.shots_fired += 1,
            Event::ProjectileHit { .. } => self.hits += 1,
            Event::WaveCleared { .. } => self.waves_cleared += 1,
            _ => {}
        }
    }
}

/// Systems and scratch buffers driving one world.
#[derive(Debug)]
pub(crate) struct Pipeline {
    spawning: Spawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    stats: RunStats,
}

impl Pipeline {
    pub(crate) fn new(config: &SimConfig) -> Self {
        Self {
            spawning: Spawning::new(SpawningConfig::new(config.wave_break())),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            projectiles: Projectiles::new(ProjectilesConfig::new(config.world.hit_threshold)),
            targets: Vec::new(),
            commands: Vec::new(),
            stats: RunStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> RunStats {
        self.stats
    }

    pub(crate) fn spawning(&self) -> &Spawning {
        &self.spawning
    }

    /// Applies `command` and lets the event observers see its outcome.
    pub(crate) fn dispatch(
        &mut self,
        world: &mut World,
        command: Command,
        events: &mut Vec<Event>,
    ) {
        let start = events.len();
        world::apply(world, command, events);
        let produced = &events[start..];
        self.spawning.handle(produced);
        for event in produced {
            self.stats.record(event);
        }
    }

    /// Runs one simulation tick lasting `dt`.
    ///
    /// Movement comes first, then tower targeting and firing, then projectile
    /// resolution, then the wave completion check.
    pub(crate) fn step(&mut self, world: &mut World, dt: Duration, events: &mut Vec<Event>) {
        self.dispatch(world, Command::Tick { dt }, events);
        if query::status(world) != RunStatus::Playing {
            return;
        }

        let enemies = query::enemy_view(world);
        self.targeting.handle(
            RunStatus::Playing,
            &query::tower_view(world),
            &enemies,
            &mut self.targets,
        );
        self.combat.handle(
            RunStatus::Playing,
            &query::tower_cooldowns(world),
            &self.targets,
            &mut self.commands,
        );
        self.flush(world, events);

        self.projectiles.handle(
            RunStatus::Playing,
            dt,
            &query::projectile_view(world),
            &query::enemy_view(world),
            &mut self.commands,
        );
        self.flush(world, events);

        if query::wave_in_progress(world)
            && query::enemy_count(world) == 0
            && self.spawning.is_drained()
        {
            self.dispatch(world, Command::CompleteWave, events);
        }
    }

    /// Releases the spawns and wave starts due at the current clock.
    pub(crate) fn poll_spawns(&mut self, world: &mut World, events: &mut Vec<Event>) {
        self.spawning
            .emit(query::clock(world), query::status(world), &mut self.commands);
        self.flush(world, events);
    }

    fn flush(&mut self, world: &mut World, events: &mut Vec<Event>) {
        let mut commands = std::mem::take(&mut self.commands);
        for command in commands.drain(..) {
            self.dispatch(world, command, events);
        }
        self.commands = commands;
    }
}

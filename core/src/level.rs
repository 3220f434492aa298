//! Static level definitions supplied by the level catalog.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{CellCoord, EnemyKind};

/// Difficulty tag shown when selecting a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Introductory levels.
    Easy,
    /// Standard levels.
    Normal,
    /// Demanding levels.
    Hard,
}

/// Group of identical enemies spawned at a fixed cadence within a wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveGroup {
    /// Archetype of every enemy in the group.
    pub kind: EnemyKind,
    /// Number of enemies in the group.
    pub count: u32,
    /// Time between two consecutive spawns of the group.
    pub interval: Duration,
    /// Time between the wave start and the first spawn of the group.
    pub delay: Duration,
}

/// Immutable description of a playable level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDefinition {
    /// Unique identifier of the level.
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Difficulty tag.
    pub difficulty: Difficulty,
    /// Gold available when the run starts.
    pub initial_gold: u32,
    /// Lives available when the run starts.
    pub initial_lives: i32,
    /// Ordered waypoints of the enemy route.
    pub path: Vec<Vec2>,
    /// Ordered waves; each wave is a list of spawn groups.
    pub waves: Vec<Vec<WaveGroup>>,
    /// Cells that reject construction regardless of the path.
    pub blocked: Vec<CellCoord>,
}

impl LevelDefinition {
    /// Number of waves composing the level.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Spawn groups of the wave with the provided index, if it exists.
    #[must_use]
    pub fn wave(&self, index: usize) -> Option<&[WaveGroup]> {
        self.waves.get(index).map(Vec::as_slice)
    }

    /// Total number of enemies across every wave.
    #[must_use]
    pub fn total_enemies(&self) -> u32 {
        self.waves
            .iter()
            .flat_map(|wave| wave.iter())
            .map(|group| group.count)
            .sum()
    }
}

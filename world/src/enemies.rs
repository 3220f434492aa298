//! Enemy state owned by the world.

use glam::Vec2;
use path_defence_core::{EnemyId, EnemyKind, EnemySnapshot};

/// Mutable state of a single enemy walking the path.
#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) speed: f32,
    pub(crate) progress: f32,
    pub(crate) slow: f32,
    pub(crate) radius: f32,
}

impl EnemyState {
    /// Instantiates an enemy with its archetype stats at the path start.
    pub(crate) fn spawn(id: EnemyId, kind: EnemyKind, position: Vec2) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            position,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            progress: 0.0,
            slow: 0.0,
            radius: stats.radius,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Speed after the current slow is applied.
    pub(crate) fn effective_speed(&self) -> f32 {
        self.speed * (1.0 - self.slow.clamp(0.0, 1.0))
    }

    pub(crate) fn apply_slow(&mut self, strength: f32) {
        self.slow = self.slow.max(strength.clamp(0.0, 1.0));
    }

    pub(crate) fn decay_slow(&mut self, amount: f32) {
        self.slow = (self.slow - amount).max(0.0);
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            speed: self.speed,
            progress: self.progress,
            slow: self.slow,
            radius: self.radius,
        }
    }
}

//! Projectiles in flight.

use glam::Vec2;
use path_defence_core::{AttackMode, EnemyId, ProjectileId, ProjectileSnapshot, TowerId};

#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    pub(crate) tower: TowerId,
    pub(crate) target: EnemyId,
    pub(crate) position: Vec2,
    pub(crate) speed: f32,
    pub(crate) damage: f32,
    pub(crate) mode: AttackMode,
}

impl ProjectileState {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.tower,
            target: self.target,
            position: self.position,
            speed: self.speed,
            damage: self.damage,
            mode: self.mode,
        }
    }
}

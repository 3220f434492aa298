#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that flies homing projectiles and detects their hits.
//!
//! Projectiles chase the current position of their target. The system never
//! applies damage itself: it asks the world to move, resolve or discard each
//! projectile and the world re-validates the target when resolving.

use std::time::Duration;

use glam::Vec2;
use path_defence_core::{
    geometry, Command, EnemyView, ProjectileSnapshot, ProjectileView, RunStatus,
};

const DEFAULT_HIT_THRESHOLD: f32 = 8.0;

/// Configuration parameters required to construct the projectile system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    hit_threshold: f32,
}

impl Config {
    /// Creates a configuration that registers hits within `hit_threshold` units.
    #[must_use]
    pub const fn new(hit_threshold: f32) -> Self {
        Self { hit_threshold }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_HIT_THRESHOLD)
    }
}

/// Projectile flight system.
#[derive(Debug)]
pub struct Projectiles {
    hit_threshold: f32,
}

impl Projectiles {
    /// Creates a new projectile system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            hit_threshold: config.hit_threshold.max(0.0),
        }
    }

    /// Emits one command per projectile in flight for a tick lasting `dt`.
    pub fn handle(
        &self,
        status: RunStatus,
        dt: Duration,
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if status != RunStatus::Playing {
            return;
        }

        let seconds = dt.as_secs_f32();
        for projectile in projectiles.iter() {
            let Some(target) = enemies
                .get(projectile.target)
                .filter(|enemy| enemy.is_alive())
            else {
                out.push(Command::DiscardProjectile {
                    projectile: projectile.id,
                });
                continue;
            };

            let position = home(projectile, target.position, projectile.speed * seconds);
            if geometry::distance(position, target.position) <= self.hit_threshold {
                out.push(Command::ResolveHit {
                    projectile: projectile.id,
                });
            } else {
                out.push(Command::MoveProjectile {
                    projectile: projectile.id,
                    position,
                });
            }
        }
    }
}

/// Moves the projectile `step` units toward `target`, snapping onto it when
/// the step would overshoot.
fn home(projectile: &ProjectileSnapshot, target: Vec2, step: f32) -> Vec2 {
    let remaining = geometry::distance(projectile.position, target);
    if remaining <= step {
        return target;
    }
    projectile.position + geometry::direction(projectile.position, target) * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{
        AttackMode, EnemyId, EnemyKind, EnemySnapshot, ProjectileId, TowerId,
    };

    fn projectile(id: u32, target: u32, position: Vec2, speed: f32) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: ProjectileId::new(id),
            tower: TowerId::new(0),
            target: EnemyId::new(target),
            position,
            speed,
            damage: 10.0,
            mode: AttackMode::Single,
        }
    }

    fn enemy(id: u32, position: Vec2, health: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Grunt,
            position,
            health,
            max_health: 20.0,
            speed: 50.0,
            progress: 0.0,
            slow: 0.0,
            radius: 8.0,
        }
    }

    fn run(projectiles: Vec<ProjectileSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<Command> {
        let system = Projectiles::new(Config::default());
        let mut out = Vec::new();
        system.handle(
            RunStatus::Playing,
            Duration::from_millis(100),
            &ProjectileView::from_snapshots(projectiles),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn projectiles_home_toward_the_current_target_position() {
        let out = run(
            vec![projectile(1, 3, Vec2::ZERO, 300.0)],
            vec![enemy(3, Vec2::new(0.0, 100.0), 20.0)],
        );
        assert_eq!(
            out,
            vec![Command::MoveProjectile {
                projectile: ProjectileId::new(1),
                position: Vec2::new(0.0, 30.0),
            }]
        );
    }

    #[test]
    fn overshooting_steps_snap_onto_the_target_and_hit() {
        let out = run(
            vec![projectile(1, 3, Vec2::ZERO, 600.0)],
            vec![enemy(3, Vec2::new(40.0, 0.0), 20.0)],
        );
        assert_eq!(
            out,
            vec![Command::ResolveHit {
                projectile: ProjectileId::new(1),
            }]
        );
    }

    #[test]
    fn hits_register_within_the_threshold() {
        let out = run(
            vec![projectile(1, 3, Vec2::ZERO, 100.0)],
            vec![enemy(3, Vec2::new(17.0, 0.0), 20.0)],
        );
        assert_eq!(
            out,
            vec![Command::ResolveHit {
                projectile: ProjectileId::new(1),
            }],
            "a 10 unit step leaves 7 units, inside the 8 unit threshold"
        );
    }

    #[test]
    fn missing_or_dead_targets_discard_the_projectile() {
        let out = run(
            vec![
                projectile(1, 3, Vec2::ZERO, 100.0),
                projectile(2, 4, Vec2::ZERO, 100.0),
            ],
            vec![enemy(4, Vec2::new(50.0, 0.0), 0.0)],
        );
        assert_eq!(
            out,
            vec![
                Command::DiscardProjectile {
                    projectile: ProjectileId::new(1),
                },
                Command::DiscardProjectile {
                    projectile: ProjectileId::new(2),
                },
            ]
        );
    }

    #[test]
    fn inactive_runs_leave_projectiles_untouched() {
        let system = Projectiles::new(Config::default());
        let mut out = Vec::new();
        system.handle(
            RunStatus::Paused,
            Duration::from_millis(100),
            &ProjectileView::from_snapshots(vec![projectile(1, 3, Vec2::ZERO, 100.0)]),
            &EnemyView::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }
}

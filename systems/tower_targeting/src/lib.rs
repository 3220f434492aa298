#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.
//!
//! Every tower picks the living enemy inside its range that travelled the
//! furthest along the path. Equal progress resolves to the smaller enemy id,
//! so several towers covering the same stretch focus the same enemy.

use glam::Vec2;
use path_defence_core::{geometry, EnemyId, EnemyView, RunStatus, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments, which follow ascending tower identifiers.
    pub fn handle(
        &mut self,
        status: RunStatus,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if status != RunStatus::Playing {
            return;
        }

        if towers.iter().next().is_none() {
            return;
        }

        self.prepare_enemy_workspace(enemies);
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in towers.iter() {
            let range_squared = tower.stats.range * tower.stats.range;
            let mut best: Option<&EnemyCandidate> = None;

            for candidate in &self.enemy_workspace {
                if geometry::distance_squared(tower.position, candidate.position) > range_squared {
                    continue;
                }

                match best {
                    Some(existing) if !candidate.precedes(existing) => {}
                    _ => best = Some(candidate),
                }
            }

            if let Some(best) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best.id,
                    tower_position: tower.position,
                    enemy_position: best.position,
                });
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter().filter(|snapshot| snapshot.is_alive()) {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                progress: snapshot.progress,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
    progress: f32,
}

impl EnemyCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.progress != other.progress {
            return self.progress > other.progress;
        }

        self.id < other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{
        CellCoord, EnemyKind, EnemySnapshot, TowerId, TowerKind, TowerSnapshot,
    };

    fn tower_snapshot(id: u32, position: Vec2) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::Arrow,
            cell: CellCoord::new(0, 0),
            position,
            level: 1,
            stats: TowerKind::Arrow.base_stats(),
            last_attack: None,
        }
    }

    fn enemy_snapshot(id: u32, position: Vec2, progress: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Grunt,
            position,
            health: 20.0,
            max_health: 20.0,
            speed: 50.0,
            progress,
            slow: 0.0,
            radius: 8.0,
        }
    }

    fn targets(towers: Vec<TowerSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<TowerTarget> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            RunStatus::Playing,
            &TowerView::from_snapshots(towers),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn furthest_enemy_in_range_is_chosen() {
        let out = targets(
            vec![tower_snapshot(1, Vec2::new(50.0, 50.0))],
            vec![
                enemy_snapshot(1, Vec2::new(40.0, 20.0), 40.0),
                enemy_snapshot(2, Vec2::new(90.0, 20.0), 90.0),
            ],
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(2));
        assert_eq!(out[0].tower_position, Vec2::new(50.0, 50.0));
        assert_eq!(out[0].enemy_position, Vec2::new(90.0, 20.0));
    }

    #[test]
    fn enemies_outside_range_are_ignored_even_if_further() {
        let out = targets(
            vec![tower_snapshot(1, Vec2::new(0.0, 0.0))],
            vec![
                enemy_snapshot(1, Vec2::new(30.0, 0.0), 30.0),
                enemy_snapshot(2, Vec2::new(300.0, 0.0), 300.0),
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(1));
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let out = targets(
            vec![tower_snapshot(1, Vec2::new(0.0, 0.0))],
            vec![enemy_snapshot(1, Vec2::new(100.0, 0.0), 10.0)],
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn equal_progress_prefers_smaller_enemy_id() {
        let out = targets(
            vec![tower_snapshot(1, Vec2::new(0.0, 0.0))],
            vec![
                enemy_snapshot(9, Vec2::new(10.0, 0.0), 25.0),
                enemy_snapshot(4, Vec2::new(-10.0, 0.0), 25.0),
            ],
        );
        assert_eq!(out[0].enemy, EnemyId::new(4));
    }

    #[test]
    fn dead_enemies_are_not_candidates() {
        let mut dead = enemy_snapshot(1, Vec2::new(10.0, 0.0), 80.0);
        dead.health = -2.0;
        let out = targets(
            vec![tower_snapshot(1, Vec2::new(0.0, 0.0))],
            vec![dead, enemy_snapshot(2, Vec2::new(20.0, 0.0), 20.0)],
        );
        assert_eq!(out[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn every_tower_receives_its_own_assignment() {
        let out = targets(
            vec![
                tower_snapshot(2, Vec2::new(200.0, 0.0)),
                tower_snapshot(1, Vec2::new(0.0, 0.0)),
            ],
            vec![
                enemy_snapshot(1, Vec2::new(20.0, 0.0), 20.0),
                enemy_snapshot(2, Vec2::new(190.0, 0.0), 190.0),
            ],
        );
        let pairs: Vec<(u32, u32)> = out
            .iter()
            .map(|target| (target.tower.get(), target.enemy.get()))
            .collect();
        assert_eq!(pairs, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn inactive_runs_clear_output() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(1, Vec2::ZERO)]);
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(1, Vec2::ZERO, 0.0)]);
        let mut out = vec![TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
            tower_position: Vec2::ZERO,
            enemy_position: Vec2::ZERO,
        }];

        system.handle(RunStatus::Paused, &towers, &enemies, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_collections_produce_no_targets() {
        assert!(targets(Vec::new(), vec![enemy_snapshot(1, Vec2::ZERO, 0.0)]).is_empty());
        assert!(targets(vec![tower_snapshot(1, Vec2::ZERO)], Vec::new()).is_empty());
    }
}

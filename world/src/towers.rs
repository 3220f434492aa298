//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use path_defence_core::{CellCoord, TowerId, TowerKind, TowerSnapshot, TowerStats};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
    /// World-space centre of the occupied cell.
    pub(crate) position: Vec2,
    /// Current upgrade level, starting at one.
    pub(crate) level: u32,
    /// Gold spent on construction and upgrades.
    pub(crate) invested: u32,
    /// Simulation time of the most recent attack.
    pub(crate) last_attack: Option<Duration>,
}

impl TowerState {
    pub(crate) fn stats(&self) -> TowerStats {
        self.kind.stats_at_level(self.level)
    }

    /// Time left before the tower may fire again at simulation time `now`.
    pub(crate) fn ready_in(&self, now: Duration) -> Duration {
        match self.last_attack {
            None => Duration::ZERO,
            Some(last) => {
                let elapsed = now.saturating_sub(last);
                self.stats().attack_interval.saturating_sub(elapsed)
            }
        }
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            level: self.level,
            stats: self.stats(),
            last_attack: self.last_attack,
        }
    }
}

/// Registry that stores towers, their cells, and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    cells: BTreeMap<CellCoord, TowerId>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            cells: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, kind: TowerKind, cell: CellCoord, position: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let state = TowerState {
            id,
            kind,
            cell,
            position,
            level: 1,
            invested: kind.cost(),
            last_attack: None,
        };
        let _ = self.entries.insert(id, state);
        let _ = self.cells.insert(cell, id);
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        let state = self.entries.remove(&id)?;
        let _ = self.cells.remove(&state.cell);
        Some(state)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn at(&self, cell: CellCoord) -> Option<TowerId> {
        self.cells.get(&cell).copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(TowerKind::Arrow, CellCoord::new(1, 1), Vec2::ZERO);
        let second = registry.insert(TowerKind::Frost, CellCoord::new(2, 1), Vec2::ZERO);
        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(registry.at(CellCoord::new(2, 1)), Some(second));
    }

    #[test]
    fn removal_frees_the_cell() {
        let mut registry = TowerRegistry::new();
        let cell = CellCoord::new(4, 2);
        let id = registry.insert(TowerKind::Cannon, cell, Vec2::ZERO);

        let removed = registry.remove(id).expect("tower removed");
        assert_eq!(removed.cell, cell);
        assert!(registry.at(cell).is_none());
        assert!(registry.get(id).is_none());
        assert!(registry.remove(id).is_none());
    }

    #[test]
    fn fresh_tower_is_ready_and_cooldown_counts_down() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Arrow, CellCoord::new(0, 0), Vec2::ZERO);
        let tower = registry.get_mut(id).expect("tower");
        assert_eq!(tower.ready_in(Duration::from_secs(3)), Duration::ZERO);

        tower.last_attack = Some(Duration::from_millis(2_000));
        assert_eq!(
            tower.ready_in(Duration::from_millis(2_400)),
            Duration::from_millis(600)
        );
        assert_eq!(tower.ready_in(Duration::from_millis(3_000)), Duration::ZERO);
    }
}

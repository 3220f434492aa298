#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that gates tower attacks on their cooldowns.

use path_defence_core::{Command, RunStatus, TowerCooldownSnapshot, TowerCooldownView, TowerTarget};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    ready: Vec<TowerCooldownSnapshot>,
}

impl TowerCombat {
    /// Creates a new tower combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for towers ready to fire.
    ///
    /// A tower fires only when it holds a target and its cooldown elapsed.
    /// Towers without a target keep their cooldown untouched, so they fire
    /// the moment an enemy walks into range.
    pub fn handle(
        &mut self,
        status: RunStatus,
        tower_cooldowns: &TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if status != RunStatus::Playing || tower_targets.is_empty() {
            return;
        }

        self.ready.clear();
        self.ready.extend(
            tower_cooldowns
                .iter()
                .filter(|snapshot| snapshot.ready_in.is_zero()),
        );
        if self.ready.is_empty() {
            return;
        }

        for target in tower_targets {
            let is_ready = self
                .ready
                .binary_search_by_key(&target.tower, |snapshot| snapshot.tower)
                .is_ok();
            if is_ready {
                out.push(Command::FireProjectile {
                    tower: target.tower,
                    target: target.enemy,
                });
            }
        }
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave spawning system that turns wave definitions into timed spawn commands.
//!
//! The system owns the spawn queue of the wave in progress. It listens to
//! world events to rebuild the queue whenever a wave starts and to arm the
//! next wave once the current one is cleared, and it is polled from its own
//! timer to release every entry whose scheduled time has passed.

use std::{collections::VecDeque, time::Duration};

use path_defence_core::{Command, EnemyKind, Event, RunStatus, WaveGroup};

const DEFAULT_WAVE_BREAK: Duration = Duration::from_secs(3);

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    wave_break: Duration,
}

impl Config {
    /// Creates a new configuration using the provided pause between waves.
    #[must_use]
    pub const fn new(wave_break: Duration) -> Self {
        Self { wave_break }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_WAVE_BREAK)
    }
}

/// Enemy scheduled to enter the path at an absolute simulation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledSpawn {
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Simulation time at which the enemy is released.
    pub at: Duration,
}

#[derive(Clone, Copy, Debug)]
struct PendingWave {
    wave: usize,
    at: Duration,
}

/// Pure system that releases wave spawns as their scheduled time arrives.
#[derive(Debug)]
pub struct Spawning {
    wave_break: Duration,
    queue: VecDeque<ScheduledSpawn>,
    pending_wave: Option<PendingWave>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            wave_break: config.wave_break,
            queue: VecDeque::new(),
            pending_wave: None,
        }
    }

    /// Consumes world events to keep the queue aligned with the run.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveStarted { groups, at, .. } => {
                    self.queue = schedule(groups, *at);
                    self.pending_wave = None;
                }
                Event::WaveCleared {
                    next: Some(wave),
                    at,
                    ..
                } => {
                    self.pending_wave = Some(PendingWave {
                        wave: *wave,
                        at: at.saturating_add(self.wave_break),
                    });
                }
                Event::RunStarted { .. } => self.clear(),
                Event::RunStatusChanged { to, .. } if !to.is_active() => self.clear(),
                _ => {}
            }
        }
    }

    /// Emits spawn and wave start commands that are due at `now`.
    pub fn emit(&mut self, now: Duration, status: RunStatus, out: &mut Vec<Command>) {
        if status != RunStatus::Playing {
            return;
        }

        while let Some(entry) = self.queue.front().copied() {
            if entry.at > now {
                break;
            }
            let _ = self.queue.pop_front();
            out.push(Command::SpawnEnemy { kind: entry.kind });
        }

        if let Some(pending) = self.pending_wave {
            if pending.at <= now {
                self.pending_wave = None;
                out.push(Command::StartWave {
                    wave: pending.wave,
                });
            }
        }
    }

    /// Reports whether no spawn and no wave start remain scheduled.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.pending_wave.is_none()
    }

    /// Spawns still waiting for their scheduled time, in release order.
    pub fn queued(&self) -> impl Iterator<Item = &ScheduledSpawn> {
        self.queue.iter()
    }

    /// Simulation time at which the next wave begins, if one is armed.
    #[must_use]
    pub fn next_wave_at(&self) -> Option<Duration> {
        self.pending_wave.map(|pending| pending.at)
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.pending_wave = None;
    }
}

/// Expands wave groups into a queue sorted by release time.
///
/// Entries sharing a release time keep their group order.
fn schedule(groups: &[WaveGroup], start: Duration) -> VecDeque<ScheduledSpawn> {
    let mut entries: Vec<ScheduledSpawn> = groups
        .iter()
        .flat_map(|group| {
            (0..group.count).map(move |index| ScheduledSpawn {
                kind: group.kind,
                at: start
                    .saturating_add(group.delay)
                    .saturating_add(group.interval.saturating_mul(index)),
            })
        })
        .collect();
    entries.sort_by_key(|entry| entry.at);
    entries.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(kind: EnemyKind, count: u32, interval: u64, delay: u64) -> WaveGroup {
        WaveGroup {
            kind,
            count,
            interval: Duration::from_millis(interval),
            delay: Duration::from_millis(delay),
        }
    }

    #[test]
    fn schedule_interleaves_groups_by_time() {
        let queue = schedule(
            &[
                group(EnemyKind::Grunt, 3, 1_000, 0),
                group(EnemyKind::Runner, 2, 1_000, 500),
            ],
            Duration::from_secs(10),
        );

        let order: Vec<(EnemyKind, u64)> = queue
            .iter()
            .map(|entry| (entry.kind, entry.at.as_millis() as u64))
            .collect();
        assert_eq!(
            order,
            vec![
                (EnemyKind::Grunt, 10_000),
                (EnemyKind::Runner, 10_500),
                (EnemyKind::Grunt, 11_000),
                (EnemyKind::Runner, 11_500),
                (EnemyKind::Grunt, 12_000),
            ]
        );
    }

    #[test]
    fn equal_times_preserve_group_order() {
        let queue = schedule(
            &[
                group(EnemyKind::Tank, 1, 0, 200),
                group(EnemyKind::Grunt, 1, 0, 200),
            ],
            Duration::ZERO,
        );
        let kinds: Vec<EnemyKind> = queue.iter().map(|entry| entry.kind).collect();
        assert_eq!(kinds, vec![EnemyKind::Tank, EnemyKind::Grunt]);
    }

    #[test]
    fn empty_groups_schedule_nothing() {
        assert!(schedule(&[group(EnemyKind::Boss, 0, 100, 0)], Duration::ZERO).is_empty());
    }
}

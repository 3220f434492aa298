use std::time::Duration;

use glam::Vec2;
use path_defence_core::{
    Command, Difficulty, EnemyKind, Event, LevelDefinition, RunStatus, WaveGroup,
};
use path_defence_system_spawning::{Config, Spawning};
use path_defence_world::{self as world, query, World};

fn level(waves: Vec<Vec<WaveGroup>>) -> LevelDefinition {
    LevelDefinition {
        id: "spawn-test".to_owned(),
        name: "Spawn test".to_owned(),
        difficulty: Difficulty::Normal,
        initial_gold: 100,
        initial_lives: 10,
        path: vec![Vec2::new(0.0, 20.0), Vec2::new(20.0, 20.0)],
        waves,
        blocked: Vec::new(),
    }
}

fn group(kind: EnemyKind, count: u32, interval_ms: u64) -> WaveGroup {
    WaveGroup {
        kind,
        count,
        interval: Duration::from_millis(interval_ms),
        delay: Duration::ZERO,
    }
}

struct Harness {
    world: World,
    spawning: Spawning,
    spawned: Vec<(Duration, EnemyKind)>,
    started_waves: Vec<(Duration, usize)>,
}

impl Harness {
    fn start(waves: Vec<Vec<WaveGroup>>) -> Self {
        let mut harness = Self {
            world: World::new(),
            spawning: Spawning::new(Config::new(Duration::from_secs(3))),
            spawned: Vec::new(),
            started_waves: Vec::new(),
        };
        harness.apply(Command::StartRun {
            level: level(waves),
            run_id: "run-spawn".to_owned(),
        });
        harness
    }

    fn apply(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        for event in &events {
            match event {
                Event::EnemySpawned { kind, .. } => {
                    self.spawned.push((query::clock(&self.world), *kind));
                }
                Event::WaveStarted { wave, at, .. } => self.started_waves.push((*at, *wave)),
                _ => {}
            }
        }
        self.spawning.handle(&events);
    }

    fn advance(&mut self, dt: Duration) {
        self.apply(Command::Tick { dt });
        let mut commands = Vec::new();
        self.spawning.emit(
            query::clock(&self.world),
            query::status(&self.world),
            &mut commands,
        );
        for command in commands {
            self.apply(command);
        }
        if query::wave_in_progress(&self.world)
            && query::enemy_count(&self.world) == 0
            && self.spawning.is_drained()
        {
            self.apply(Command::CompleteWave);
        }
    }
}

#[test]
fn spawns_are_released_when_their_time_arrives() {
    let mut harness = Harness::start(vec![vec![group(EnemyKind::Grunt, 3, 1_000)]]);
    assert_eq!(harness.spawning.queued().count(), 3);

    for _ in 0..25 {
        harness.advance(Duration::from_millis(100));
    }

    let times: Vec<Duration> = harness.spawned.iter().map(|(at, _)| *at).collect();
    assert_eq!(
        times,
        vec![
            Duration::from_millis(100),
            Duration::from_millis(1_000),
            Duration::from_millis(2_000),
        ],
        "each spawn fires on the first poll at or after its scheduled time"
    );
}

#[test]
fn next_wave_waits_for_the_break_after_the_field_clears() {
    let mut harness = Harness::start(vec![
        vec![group(EnemyKind::Runner, 1, 0)],
        vec![group(EnemyKind::Grunt, 2, 500)],
    ]);

    for _ in 0..100 {
        harness.advance(Duration::from_millis(100));
    }

    assert_eq!(harness.started_waves.len(), 2, "second wave must start");
    let (first_start, _) = harness.started_waves[0];
    let (second_start, second_wave) = harness.started_waves[1];
    assert_eq!(first_start, Duration::ZERO);
    assert_eq!(second_wave, 1);
    assert!(
        second_start >= Duration::from_secs(3),
        "wave break must elapse before the next wave, started at {second_start:?}"
    );

    let grunt_spawns: Vec<Duration> = harness
        .spawned
        .iter()
        .filter(|(_, kind)| *kind == EnemyKind::Grunt)
        .map(|(at, _)| *at)
        .collect();
    assert_eq!(grunt_spawns.len(), 2);
    assert!(grunt_spawns[0] >= second_start, "second wave spawns follow its start");
    assert_eq!(query::status(&harness.world), RunStatus::Win);
}

#[test]
fn queue_is_rebuilt_not_appended_when_a_wave_starts() {
    let mut spawning = Spawning::new(Config::default());
    spawning.handle(&[Event::WaveStarted {
        wave: 0,
        groups: vec![group(EnemyKind::Tank, 2, 100)],
        at: Duration::ZERO,
    }]);
    spawning.handle(&[Event::WaveStarted {
        wave: 1,
        groups: vec![group(EnemyKind::Boss, 1, 0)],
        at: Duration::from_secs(5),
    }]);

    let queued: Vec<EnemyKind> = spawning.queued().map(|entry| entry.kind).collect();
    assert_eq!(queued, vec![EnemyKind::Boss]);
}

#[test]
fn nothing_is_released_unless_playing() {
    let mut spawning = Spawning::new(Config::default());
    spawning.handle(&[Event::WaveStarted {
        wave: 0,
        groups: vec![group(EnemyKind::Grunt, 1, 0)],
        at: Duration::ZERO,
    }]);

    let mut commands = Vec::new();
    spawning.emit(Duration::from_secs(1), RunStatus::Paused, &mut commands);
    assert!(commands.is_empty(), "paused runs release nothing");

    spawning.emit(Duration::from_secs(1), RunStatus::Playing, &mut commands);
    assert_eq!(
        commands,
        vec![Command::SpawnEnemy {
            kind: EnemyKind::Grunt
        }]
    );
    assert!(spawning.is_drained());
}

#[test]
fn terminal_and_reset_statuses_clear_pending_work() {
    let mut spawning = Spawning::new(Config::default());
    spawning.handle(&[
        Event::WaveStarted {
            wave: 0,
            groups: vec![group(EnemyKind::Grunt, 4, 100)],
            at: Duration::ZERO,
        },
        Event::WaveCleared {
            wave: 0,
            next: Some(1),
            at: Duration::from_secs(1),
        },
    ]);
    assert!(!spawning.is_drained());
    assert_eq!(spawning.next_wave_at(), Some(Duration::from_secs(4)));

    spawning.handle(&[Event::RunStatusChanged {
        from: RunStatus::Playing,
        to: RunStatus::Lose,
    }]);
    assert!(spawning.is_drained());
    assert!(spawning.next_wave_at().is_none());
}

#[test]
fn replays_are_deterministic() {
    let replay = || {
        let mut harness = Harness::start(vec![
            vec![
                group(EnemyKind::Grunt, 3, 400),
                group(EnemyKind::Runner, 2, 700),
            ],
            vec![group(EnemyKind::Tank, 1, 0)],
        ]);
        for _ in 0..120 {
            harness.advance(Duration::from_millis(100));
        }
        (harness.spawned, harness.started_waves)
    };

    assert_eq!(replay(), replay(), "replay diverged between runs");
}

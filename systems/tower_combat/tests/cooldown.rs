use std::time::Duration;

use glam::Vec2;
use path_defence_core::{
    CellCoord, Command, Difficulty, EnemyKind, Event, LevelDefinition, TowerKind, WaveGroup,
};
use path_defence_system_tower_combat::TowerCombat;
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_world::{self as world, query, World};

struct Harness {
    world: World,
    targeting: TowerTargeting,
    combat: TowerCombat,
    fired_at: Vec<Duration>,
}

impl Harness {
    fn new() -> Self {
        let mut harness = Self {
            world: World::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            fired_at: Vec::new(),
        };
        harness.apply(Command::StartRun {
            level: LevelDefinition {
                id: "combat".to_owned(),
                name: "Combat".to_owned(),
                difficulty: Difficulty::Easy,
                initial_gold: 300,
                initial_lives: 10,
                path: vec![Vec2::new(0.0, 20.0), Vec2::new(780.0, 20.0)],
                waves: vec![vec![WaveGroup {
                    kind: EnemyKind::Tank,
                    count: 1,
                    interval: Duration::ZERO,
                    delay: Duration::ZERO,
                }]],
                blocked: Vec::new(),
            },
            run_id: "run-combat".to_owned(),
        });
        harness.apply(Command::PlaceTower {
            kind: TowerKind::Arrow,
            cell: CellCoord::new(1, 1),
        });
        harness
    }

    fn apply(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        for event in events {
            if let Event::ProjectileFired { .. } = event {
                self.fired_at.push(query::clock(&self.world));
            }
        }
    }

    fn step(&mut self, dt: Duration) {
        self.apply(Command::Tick { dt });

        let mut targets = Vec::new();
        self.targeting.handle(
            query::status(&self.world),
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut targets,
        );
        let mut commands = Vec::new();
        self.combat.handle(
            query::status(&self.world),
            &query::tower_cooldowns(&self.world),
            &targets,
            &mut commands,
        );
        for command in commands {
            self.apply(command);
        }
    }
}

#[test]
fn towers_fire_once_per_attack_interval() {
    let mut harness = Harness::new();
    harness.apply(Command::SpawnEnemy {
        kind: EnemyKind::Tank,
    });

    for _ in 0..30 {
        harness.step(Duration::from_millis(100));
    }

    assert_eq!(
        harness.fired_at,
        vec![
            Duration::from_millis(100),
            Duration::from_millis(1_100),
            Duration::from_millis(2_100),
        ]
    );
}

#[test]
fn idle_towers_keep_their_cooldown_ready() {
    let mut harness = Harness::new();
    for _ in 0..50 {
        harness.step(Duration::from_millis(100));
    }
    assert!(harness.fired_at.is_empty(), "no enemy, no shot");

    harness.apply(Command::SpawnEnemy {
        kind: EnemyKind::Tank,
    });
    harness.step(Duration::from_millis(100));
    assert_eq!(harness.fired_at, vec![Duration::from_millis(5_100)]);
}

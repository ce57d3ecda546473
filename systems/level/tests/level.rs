use std::{io, path::PathBuf, time::Duration};

use glam::Vec3;
use hypercube_core::{Command, EnemyId, Event, LevelingType, MovePhase, RunRecord, SpawnPoint};
use hypercube_system_difficulty::DifficultyResolver;
use hypercube_system_level::{Config, LevelController, LevelRequest};
use hypercube_system_run_history::{MemoryStore, RunHistoryStore, StoreError};
use hypercube_world::{self as world, query, World, WorldConfig};

struct Session {
    world: World,
    controller: LevelController,
    store: MemoryStore,
}

impl Session {
    fn start(map: &str, history: Vec<RunRecord>, enemies: usize) -> Self {
        let mut session = Self {
            world: World::new(WorldConfig::default()),
            controller: LevelController::new(Config::default(), map),
            store: MemoryStore::with_records(history),
        };
        let history = LevelController::load_history(&session.store);
        let mut commands = Vec::new();
        let _ = session
            .controller
            .begin(history, &DifficultyResolver::default(), &mut commands);
        for index in 0..enemies {
            commands.push(Command::SpawnEnemy {
                spawn: SpawnPoint::new(
                    Vec3::new(500.0 + index as f32 * 100.0, 0.0, 0.0),
                    Vec3::X,
                ),
                level: 0,
                leveling: LevelingType::None,
            });
        }
        for command in commands {
            let _ = session.step(command);
        }
        session
    }

    fn step(&mut self, command: Command) -> Vec<Command> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        let mut follow_up = Vec::new();
        self.controller.handle(
            &events,
            &query::player(&self.world),
            &query::enemy_view(&self.world),
            &mut self.store,
            &mut follow_up,
        );
        follow_up
    }

    fn tick(&mut self, secs: u64) -> Vec<Command> {
        self.step(Command::Tick {
            dt: Duration::from_secs(secs),
        })
    }

    fn kill(&mut self, enemy: u32) -> Vec<Command> {
        self.step(Command::DamageEnemy {
            enemy: EnemyId::new(enemy),
            amount: 1_000.0,
            ignore_chain: false,
        })
    }
}

#[test]
fn begin_resolves_neutral_difficulty_for_first_run() {
    let mut controller = LevelController::new(Config::default(), "training");
    let resolver = DifficultyResolver::default();
    let mut commands = Vec::new();

    let tunables = controller.begin(Vec::new(), &resolver, &mut commands);

    assert_eq!(controller.difficulty_parameter(), 0.5);
    assert_eq!(tunables, resolver.tunables(0.5));
    assert_eq!(commands, vec![Command::ApplyTunables { tunables }]);
    assert_eq!(controller.level_index(), 0);
}

#[test]
fn player_death_records_a_loss_and_reloads_the_level() {
    let mut session = Session::start("level_2", Vec::new(), 3);
    let _ = session.step(Command::NoticePlayer {
        enemy: EnemyId::new(0),
    });
    let _ = session.tick(2);
    let _ = session.kill(1);
    let _ = session.step(Command::DamagePlayer { amount: 500.0 });

    let record = session.controller.outcome().expect("attempt ended").clone();
    assert!(!record.won);
    assert_eq!(record.total_enemies, 3);
    assert!((record.enemies_killed_fraction - 1.0 / 3.0).abs() < 1e-6);
    assert_eq!(record.chasers_at_death, 1);
    assert_eq!(record.max_damage_multiplier, 1.5);
    assert_eq!(record.damage_multiplier_at_death, 1.5);
    assert_eq!(record.play_time_secs, 2.0);
    assert_eq!(record.difficulty_parameter, 0.5);
    assert_eq!(record.level_index, 2);
    assert_eq!(session.store.records(), Some(&[record][..]));

    let _ = session.tick(4);
    assert!(session.controller.take_request().is_none(), "delay not over");
    let _ = session.tick(1);
    assert_eq!(
        session.controller.take_request(),
        Some(LevelRequest {
            index: 2,
            name: "level_2".to_owned()
        })
    );
}

#[test]
fn clearing_the_roster_records_a_win_once() {
    let previous = RunRecord {
        won: false,
        score: 40.0,
        enemies_killed_fraction: 0.5,
        total_enemies: 2,
        max_damage_multiplier: 1.5,
        damage_multiplier_at_death: 1.0,
        chasers_at_death: 3,
        play_time_secs: 90.0,
        difficulty_parameter: 0.5,
        level_index: 3,
    };
    let mut session = Session::start("level_3", vec![previous.clone()], 2);
    let _ = session.kill(0);
    let _ = session.kill(1);
    let _ = session.step(Command::DamagePlayer { amount: 500.0 });

    let history = session.store.records().expect("saved");
    assert_eq!(history.len(), 2, "one record per attempt");
    assert_eq!(history[0], previous);
    assert!(history[1].won);
    assert_eq!(history[1].score, 20.0);
    assert_eq!(history[1].enemies_killed_fraction, 1.0);

    let _ = session.tick(5);
    let request = session.controller.take_request().expect("transition");
    assert_eq!(request.index, 0, "wraps to the first level");
    assert_eq!(request.name, "training");
}

#[test]
fn few_enemies_remaining_alerts_idle_enemies() {
    let mut session = Session::start("level_1_upd", Vec::new(), 3);
    let _ = session.step(Command::NoticePlayer {
        enemy: EnemyId::new(2),
    });

    assert!(session.kill(0).is_empty());
    let commands = session.kill(2);

    assert_eq!(
        commands,
        vec![Command::NoticePlayer {
            enemy: EnemyId::new(1)
        }]
    );
    for command in commands {
        let _ = session.step(command);
    }
    assert_eq!(
        query::enemy(&session.world, EnemyId::new(1))
            .expect("alive")
            .move_phase,
        MovePhase::Noticing
    );
}

#[derive(Debug, Default)]
struct FailingStore;

fn disk_full() -> StoreError {
    StoreError::Io {
        path: PathBuf::from("unwritable/RunDataSaveSlot.json"),
        source: io::Error::new(io::ErrorKind::Other, "disk full"),
    }
}

impl RunHistoryStore for FailingStore {
    fn load(&self) -> Result<Option<Vec<RunRecord>>, StoreError> {
        Err(disk_full())
    }

    fn save(&mut self, _records: &[RunRecord]) -> Result<(), StoreError> {
        Err(disk_full())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[test]
fn store_failures_are_not_fatal() {
    let mut store = FailingStore;
    assert!(LevelController::load_history(&store).is_empty());

    let mut world = World::new(WorldConfig::default());
    let mut controller = LevelController::new(Config::default(), "unknown_map");
    let mut commands = Vec::new();
    let _ = controller.begin(Vec::new(), &DifficultyResolver::default(), &mut commands);

    let mut events = Vec::new();
    world::apply(&mut world, Command::DamagePlayer { amount: 500.0 }, &mut events);
    controller.handle(
        &events,
        &query::player(&world),
        &query::enemy_view(&world),
        &mut store,
        &mut commands,
    );

    let record = controller.outcome().expect("attempt ended");
    assert_eq!(record.level_index, -1);
    assert_eq!(record.enemies_killed_fraction, 0.0);
    assert_eq!(controller.history().len(), 1);
}

#[test]
fn config_overrides_from_toml() {
    let config: Config = toml::from_str(
        r#"
        after_level_delay = 2.0
        level_names = ["arena"]
        "#,
    )
    .expect("valid config");

    assert_eq!(config.after_level_delay, Duration::from_secs(2));
    assert_eq!(config.level_names, vec!["arena".to_owned()]);
    assert_eq!(config.level_titles.len(), 4);
}

#[test]
fn events_from_unrelated_batches_are_ignored() {
    let mut controller = LevelController::new(Config::default(), "training");
    let mut store = MemoryStore::new();
    let world = World::new(WorldConfig::default());
    let mut commands = Vec::new();

    controller.handle(
        &[Event::StackStateChanged {
            state: hypercube_core::StackState::SoftStack,
        }],
        &query::player(&world),
        &query::enemy_view(&world),
        &mut store,
        &mut commands,
    );

    assert!(commands.is_empty());
    assert!(controller.outcome().is_none());
    assert!(store.records().is_none());
}

use std::time::Duration;

use glam::Vec3;
use hypercube_core::{
    AttackPhase, Command, DebuffKind, EnemyId, Event, LevelingType, MovePhase, PlayerMovement,
    SpawnPoint, Tunables,
};
use hypercube_world::{self as world, query, World, WorldConfig};

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    run(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
    )
}

fn spawn_at(world: &mut World, x: f32) -> EnemyId {
    let events = run(
        world,
        Command::SpawnEnemy {
            spawn: SpawnPoint::new(Vec3::new(x, 0.0, 0.0), Vec3::NEG_X),
            level: 0,
            leveling: LevelingType::None,
        },
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("spawn emits EnemySpawned")
}

fn damage(world: &mut World, enemy: EnemyId, amount: f32) -> Vec<Event> {
    run(
        world,
        Command::DamageEnemy {
            enemy,
            amount,
            ignore_chain: false,
        },
    )
}

fn health(world: &World, enemy: EnemyId) -> f32 {
    query::enemy(world, enemy).expect("enemy alive").health
}

#[test]
fn noticing_enemy_starts_chasing_after_aggro_time() {
    let mut world = World::new(WorldConfig::default());
    let enemy = spawn_at(&mut world, 1_000.0);

    let events = run(&mut world, Command::NoticePlayer { enemy });
    assert_eq!(
        events,
        vec![
            Event::EnemyNoticed { enemy },
            Event::DamageMultiplierChanged {
                multiplier: 1.5,
                target: 1.5
            },
            Event::ChasingSetChanged { count: 1 },
        ]
    );
    assert!(
        run(&mut world, Command::NoticePlayer { enemy }).is_empty(),
        "noticing twice is ignored"
    );

    let _ = tick(&mut world, 400);
    assert_eq!(
        query::enemy(&world, enemy).expect("alive").move_phase,
        MovePhase::Noticing
    );

    let events = tick(&mut world, 100);
    assert!(
        events.contains(&Event::EnemyStartedChasing { enemy }),
        "chasing begins once aggro time elapsed: {events:?}"
    );
    assert_eq!(
        query::enemy(&world, enemy).expect("alive").move_phase,
        MovePhase::Chasing
    );
}

#[test]
fn enemy_attack_cycles_phases_and_hits_player_once() {
    let mut world = World::new(WorldConfig::default());
    let enemy = spawn_at(&mut world, 100.0);

    let events = run(&mut world, Command::EnemyAttack { enemy });
    assert_eq!(
        events,
        vec![Event::EnemyAttackPhaseChanged {
            enemy,
            phase: AttackPhase::Opener
        }]
    );

    let events = tick(&mut world, 400);
    assert!(events.contains(&Event::EnemyAttackPhaseChanged {
        enemy,
        phase: AttackPhase::Attacking
    }));
    assert!(
        events.contains(&Event::PlayerDamaged {
            amount: 25.0,
            health: 75.0
        }),
        "attacking hitbox reaches the player: {events:?}"
    );

    let events = tick(&mut world, 200);
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::PlayerDamaged { .. })),
        "invincibility blocks repeated hits"
    );

    let events = tick(&mut world, 100);
    assert!(events.contains(&Event::EnemyAttackPhaseChanged {
        enemy,
        phase: AttackPhase::AfterAttack
    }));

    let events = tick(&mut world, 200);
    assert!(events.contains(&Event::EnemyAttackEnded { enemy }));
    assert_eq!(
        query::enemy(&world, enemy).expect("alive").attack_phase,
        AttackPhase::NotAttacking
    );
    assert_eq!(query::player(&world).health, 75.0);
}

#[test]
fn invincibility_expires_and_death_is_final() {
    let mut world = World::new(WorldConfig::default());

    let _ = run(&mut world, Command::DamagePlayer { amount: 10.0 });
    let blocked = run(&mut world, Command::DamagePlayer { amount: 10.0 });
    assert!(blocked.is_empty(), "second hit lands during invincibility");
    assert_eq!(query::player(&world).health, 90.0);

    let _ = tick(&mut world, 1_000);
    let events = run(&mut world, Command::DamagePlayer { amount: 200.0 });
    assert_eq!(
        events,
        vec![
            Event::PlayerDamaged {
                amount: 200.0,
                health: -110.0
            },
            Event::PlayerDied,
        ]
    );
    assert_eq!(query::player(&world).movement, PlayerMovement::Dead);

    let _ = tick(&mut world, 2_000);
    assert!(run(&mut world, Command::DamagePlayer { amount: 5.0 }).is_empty());
    assert!(run(&mut world, Command::PlayerAttack).is_empty());
}

#[test]
fn player_swing_hits_each_enemy_once() {
    let mut world = World::new(WorldConfig::default());
    let near = spawn_at(&mut world, 100.0);
    let far = spawn_at(&mut world, 600.0);

    let events = run(&mut world, Command::PlayerAttack);
    assert_eq!(
        events,
        vec![Event::PlayerAttackPhaseChanged {
            phase: AttackPhase::Opener
        }]
    );
    assert!(run(&mut world, Command::PlayerAttack).is_empty());

    let _ = tick(&mut world, 100);
    assert_eq!(health(&world, near), 75.0);
    assert_eq!(health(&world, far), 100.0, "out of reach");

    let _ = tick(&mut world, 100);
    assert_eq!(health(&world, near), 75.0, "one hit per swing");

    let _ = tick(&mut world, 200);
    let player = query::player(&world);
    assert_eq!(player.attack_phase, AttackPhase::NotAttacking);
    assert_eq!(player.movement, PlayerMovement::Walking);
}

#[test]
fn multiplier_tracks_chaser_levels_and_decays_after_hold() {
    let mut world = World::new(WorldConfig::default());
    let weak = spawn_at(&mut world, 1_000.0);
    let strong = spawn_at(&mut world, 1_200.0);
    let _ = run(&mut world, Command::NoticePlayer { enemy: weak });
    let _ = run(&mut world, Command::NoticePlayer { enemy: strong });
    assert_eq!(query::player(&world).damage_multiplier, 2.0);

    let _ = run(
        &mut world,
        Command::SetEnemyLevel {
            enemy: strong,
            level: 2,
            leveling: LevelingType::Health,
        },
    );
    assert_eq!(query::player(&world).damage_multiplier, 3.0);

    let _ = damage(&mut world, weak, 500.0);
    let player = query::player(&world);
    assert_eq!(player.score, 30.0, "kill scored at the held multiplier");
    assert_eq!(player.damage_multiplier, 3.0);
    assert_eq!(player.target_damage_multiplier, 2.5);

    let _ = tick(&mut world, 4_900);
    assert_eq!(query::player(&world).damage_multiplier, 3.0, "still held");

    let _ = tick(&mut world, 100);
    let falling = query::player(&world).damage_multiplier;
    assert!((falling - 2.9).abs() < 1e-4, "decay started: {falling}");

    let events = tick(&mut world, 1_000);
    assert_eq!(query::player(&world).damage_multiplier, 2.5);
    assert!(events.contains(&Event::DamageMultiplierChanged {
        multiplier: 2.5,
        target: 2.5
    }));
}

#[test]
fn stacking_an_enemy_with_itself_is_ignored() {
    let mut world = World::new(WorldConfig::default());
    let enemy = spawn_at(&mut world, 0.0);

    let events = run(
        &mut world,
        Command::StackEnemies {
            first: enemy,
            second: enemy,
        },
    );

    assert!(events.is_empty());
    assert_eq!(query::enemies_remaining(&world), 1);
    assert_eq!(query::enemy(&world, enemy).expect("alive").level, 0);
}

#[test]
fn stacking_absorbs_lower_level_into_survivor() {
    let mut world = World::new(WorldConfig::default());
    let low = spawn_at(&mut world, 0.0);
    let high = spawn_at(&mut world, 50.0);
    let _ = run(
        &mut world,
        Command::SetEnemyLevel {
            enemy: high,
            level: 1,
            leveling: LevelingType::Speed,
        },
    );
    let _ = damage(&mut world, high, 40.0);

    let events = run(
        &mut world,
        Command::StackEnemies {
            first: low,
            second: high,
        },
    );

    assert!(events.contains(&Event::EnemiesStacked {
        survivor: high,
        absorbed: low
    }));
    let survivor = query::enemy(&world, high).expect("survivor alive");
    assert_eq!(survivor.level, 2);
    assert_eq!(survivor.leveling, LevelingType::Speed);
    assert_eq!(survivor.health, survivor.max_health);
    assert!(query::enemy(&world, low).is_none());
    assert_eq!(query::enemies_removed(&world), 1);
    assert_eq!(query::player(&world).score, 0.0, "absorption is not a kill");
}

#[test]
fn stacking_equal_levels_absorbs_second() {
    let mut world = World::new(WorldConfig::default());
    let first = spawn_at(&mut world, 0.0);
    let second = spawn_at(&mut world, 50.0);

    let events = run(&mut world, Command::StackEnemies { first, second });

    assert!(events.contains(&Event::EnemiesStacked {
        survivor: first,
        absorbed: second
    }));
    assert_eq!(query::enemy(&world, first).expect("alive").level, 1);
}

#[test]
fn increasing_level_of_unleveled_enemy_assigns_a_type() {
    let mut world = World::new(WorldConfig::default());
    let enemy = spawn_at(&mut world, 0.0);
    let base = query::enemy(&world, enemy).expect("alive");

    let events = run(&mut world, Command::IncreaseEnemyLevel { enemy, by: 1 });

    let snapshot = query::enemy(&world, enemy).expect("alive");
    assert_eq!(snapshot.level, 1);
    let leveled = 1.0 + 1.0 * Tunables::default().enemy_leveling_fraction;
    assert_eq!(leveled, 1.5);
    let (speed, damage, health) = match snapshot.leveling {
        LevelingType::Speed => (leveled, 1.0, 1.0),
        LevelingType::Damage => (1.0, leveled, 1.0),
        LevelingType::Health => (1.0, 1.0, leveled),
        LevelingType::None => panic!("unleveled enemy kept no type"),
    };
    assert!((snapshot.walk_speed - base.walk_speed * speed).abs() < 1e-3);
    assert!((snapshot.attack_damage - base.attack_damage * damage).abs() < 1e-3);
    assert!((snapshot.max_health - base.max_health * health).abs() < 1e-3);
    assert!((snapshot.health - base.health * health).abs() < 1e-3);
    assert!(
        LevelingType::ASSIGNABLE.contains(&snapshot.leveling),
        "picked {:?}",
        snapshot.leveling
    );
    assert_eq!(
        events,
        vec![Event::EnemyLevelChanged {
            enemy,
            level: 1,
            leveling: snapshot.leveling
        }]
    );
}

#[test]
fn level_one_scales_only_the_assigned_stat() {
    for leveling in LevelingType::ASSIGNABLE {
        let mut world = World::new(WorldConfig::default());
        let enemy = spawn_at(&mut world, 0.0);
        let base = query::enemy(&world, enemy).expect("alive");

        let _ = run(
            &mut world,
            Command::SetEnemyLevel {
                enemy,
                level: 1,
                leveling,
            },
        );

        let leveled = query::enemy(&world, enemy).expect("alive");
        let ratios = (
            leveled.walk_speed / base.walk_speed,
            leveled.attack_damage / base.attack_damage,
            leveled.max_health / base.max_health,
        );
        let expected = match leveling {
            LevelingType::Speed => (1.5, 1.0, 1.0),
            LevelingType::Damage => (1.0, 1.5, 1.0),
            LevelingType::Health => (1.0, 1.0, 1.5),
            LevelingType::None => unreachable!("not assignable"),
        };
        assert!(
            (ratios.0 - expected.0).abs() < 1e-5
                && (ratios.1 - expected.1).abs() < 1e-5
                && (ratios.2 - expected.2).abs() < 1e-5,
            "{leveling:?} scaled {ratios:?}"
        );
    }
}

#[test]
fn chained_damage_is_shared_with_other_members() {
    let mut world = World::new(WorldConfig::default());
    let a = spawn_at(&mut world, 0.0);
    let b = spawn_at(&mut world, 100.0);
    let c = spawn_at(&mut world, 300.0);
    let duration = Duration::from_secs(3);

    let events = run(&mut world, Command::ChainEnemy { enemy: a, duration });
    assert_eq!(
        events,
        vec![Event::EnemyChained {
            enemy: a,
            linked_to: None
        }]
    );
    let _ = run(&mut world, Command::ChainEnemy { enemy: b, duration });
    let _ = run(&mut world, Command::ChainEnemy { enemy: c, duration });
    assert_eq!(query::chain_members(&world), &[a, b, c]);
    assert_eq!(query::chain_links(&world), &[(b, a), (c, b)]);

    let _ = damage(&mut world, a, 10.0);

    assert_eq!(health(&world, a), 90.0);
    assert_eq!(health(&world, b), 97.5);
    assert_eq!(health(&world, c), 97.5);
}

#[test]
fn chain_expires_unless_refreshed() {
    let mut world = World::new(WorldConfig::default());
    let a = spawn_at(&mut world, 0.0);
    let b = spawn_at(&mut world, 100.0);
    let duration = Duration::from_secs(2);
    let _ = run(&mut world, Command::ChainEnemy { enemy: a, duration });
    let _ = run(&mut world, Command::ChainEnemy { enemy: b, duration });

    let _ = tick(&mut world, 1_000);
    let refreshed = run(&mut world, Command::ChainEnemy { enemy: a, duration });
    assert!(refreshed.is_empty(), "refresh only re-arms the timer");

    let events = tick(&mut world, 1_000);
    assert_eq!(events[1..], [Event::EnemyUnchained { enemy: b }]);
    assert_eq!(query::chain_members(&world), &[a]);

    let events = tick(&mut world, 1_000);
    assert!(events.contains(&Event::EnemyUnchained { enemy: a }));
    assert!(!query::enemy(&world, a).expect("alive").chained);

    let _ = damage(&mut world, a, 10.0);
    assert_eq!(health(&world, b), 100.0, "unchained enemies share nothing");
}

#[test]
fn debuff_refresh_extends_without_stacking() {
    let mut world = World::new(WorldConfig::default());
    let enemy = spawn_at(&mut world, 0.0);
    let slow = |duration| Command::DebuffEnemy {
        enemy,
        kind: DebuffKind::Slow,
        multiplier: 0.5,
        duration,
    };

    let events = run(&mut world, slow(Duration::from_secs(2)));
    assert_eq!(
        events,
        vec![Event::DebuffApplied {
            enemy,
            kind: DebuffKind::Slow
        }]
    );
    assert_eq!(query::enemy(&world, enemy).expect("alive").walk_speed, 300.0);

    let _ = tick(&mut world, 1_000);
    assert!(run(&mut world, slow(Duration::from_secs(2))).is_empty());
    assert_eq!(query::enemy(&world, enemy).expect("alive").walk_speed, 300.0);

    let events = tick(&mut world, 1_500);
    assert!(!events.contains(&Event::DebuffExpired {
        enemy,
        kind: DebuffKind::Slow
    }));

    let events = tick(&mut world, 500);
    assert!(events.contains(&Event::DebuffExpired {
        enemy,
        kind: DebuffKind::Slow
    }));
    assert_eq!(query::enemy(&world, enemy).expect("alive").walk_speed, 600.0);
}

#[test]
fn non_positive_debuff_is_rejected() {
    let mut world = World::new(WorldConfig::default());
    let enemy = spawn_at(&mut world, 0.0);

    let events = run(
        &mut world,
        Command::DebuffEnemy {
            enemy,
            kind: DebuffKind::DamageReduction,
            multiplier: 0.0,
            duration: Duration::from_secs(1),
        },
    );

    assert!(events.is_empty());
    assert_eq!(
        query::enemy(&world, enemy).expect("alive").attack_damage,
        25.0
    );
}

#[test]
fn enemy_heal_is_split_into_bursts() {
    let mut world = World::new(WorldConfig::default());
    let enemy = spawn_at(&mut world, 0.0);
    let _ = damage(&mut world, enemy, 60.0);

    assert!(run(
        &mut world,
        Command::HealEnemy {
            enemy,
            amount: 30.0,
            bursts: 3
        }
    )
    .is_empty());

    let events = tick(&mut world, 500);
    assert!(events.contains(&Event::EnemyHealed {
        enemy,
        amount: 10.0
    }));
    assert_eq!(health(&world, enemy), 50.0);

    let events = tick(&mut world, 1_000);
    assert!(events.contains(&Event::EnemyHealEnded { enemy }));
    assert_eq!(health(&world, enemy), 70.0);
}

#[test]
fn player_heal_is_capped() {
    let mut world = World::new(WorldConfig::default());
    let _ = run(&mut world, Command::DamagePlayer { amount: 50.0 });
    let _ = run(
        &mut world,
        Command::HealPlayer {
            amount: 120.0,
            bursts: 2,
        },
    );

    let events = tick(&mut world, 500);
    assert!(events.contains(&Event::PlayerHealed { amount: 50.0 }));

    let events = tick(&mut world, 500);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PlayerHealed { .. })));
    assert_eq!(query::player(&world).health, 100.0);
}

#[test]
fn speed_buff_divides_back_out() {
    let mut world = World::new(WorldConfig::default());
    let buff = Command::SpeedBuffPlayer {
        multiplier: 1.5,
        duration: Duration::from_secs(1),
    };
    let _ = run(&mut world, buff.clone());
    let _ = run(&mut world, buff);
    assert_eq!(query::player(&world).walk_speed, 900.0, "refresh is idempotent");

    let _ = tick(&mut world, 1_000);
    assert_eq!(query::player(&world).walk_speed, 600.0);
}

#[test]
fn kills_credit_score_heal_and_report_remaining() {
    let mut world = World::new(WorldConfig::default());
    let _ = run(
        &mut world,
        Command::ApplyTunables {
            tunables: Tunables {
                player_vampirism: 0.1,
                ..Tunables::default()
            },
        },
    );
    let first = spawn_at(&mut world, 0.0);
    let second = spawn_at(&mut world, 100.0);
    let _ = run(&mut world, Command::DamagePlayer { amount: 50.0 });

    let events = damage(&mut world, first, 100.0);
    assert_eq!(
        events,
        vec![
            Event::EnemyDamaged {
                enemy: first,
                amount: 100.0,
                health: 0.0
            },
            Event::PlayerHealed { amount: 10.0 },
            Event::EnemyDied { enemy: first },
            Event::FewEnemiesRemaining { remaining: 1 },
        ]
    );

    let events = damage(&mut world, second, 150.0);
    assert!(events.contains(&Event::AllEnemiesDead));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::FewEnemiesRemaining { .. })));

    let player = query::player(&world);
    assert_eq!(player.score, 20.0);
    assert_eq!(player.health, 70.0);
    assert_eq!(query::enemies_removed(&world), 2);
}

#[test]
fn removing_unknown_chaser_is_ignored() {
    let mut world = World::new(WorldConfig::default());
    let enemy = spawn_at(&mut world, 0.0);
    assert!(run(&mut world, Command::RemoveChaser { enemy }).is_empty());

    let _ = run(&mut world, Command::NoticePlayer { enemy });
    let events = run(&mut world, Command::RemoveChaser { enemy });
    assert!(events.contains(&Event::ChasingSetChanged { count: 0 }));
    assert!(query::chaser_view(&world).is_empty());
}

#[test]
fn config_deserializes_with_defaults() {
    let config: WorldConfig = toml::from_str(
        r#"
        chain_damage_multiplier = 0.5

        [enemy]
        max_health = 80.0
        "#,
    )
    .expect("valid config");

    assert_eq!(config.chain_damage_multiplier, 0.5);
    assert_eq!(config.enemy.max_health, 80.0);
    assert_eq!(config.enemy.walk_speed, 600.0);
    assert_eq!(config.few_enemies_fraction, 0.03);
}

//! Headless host standing in for the engine: spawn layout, perception,
//! navigation and a scripted player drive the systems frame by frame.

use std::{f32::consts::TAU, time::Duration};

use anyhow::{ensure, Result};
use glam::Vec3;
use hypercube_core::{
    AttackPhase, Command, DebuffKind, EnemySnapshot, EnemyView, Event, MovePhase, PlayerMovement,
    PlayerSnapshot, RunRecord, SpawnPoint, StackState,
};
use hypercube_system_crowd_control::CrowdControl;
use hypercube_system_difficulty::DifficultyResolver;
use hypercube_system_level::{LevelController, LevelRequest};
use hypercube_system_run_history::RunHistoryStore;
use hypercube_system_spawning::{Config as SpawningConfig, Spawning};
use hypercube_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{HostConfig, SimulationConfig};

/// What happened during one simulated attempt.
#[derive(Debug)]
pub(crate) struct AttemptSummary {
    pub(crate) parameter: f32,
    pub(crate) record: Option<RunRecord>,
    pub(crate) request: Option<LevelRequest>,
    pub(crate) stacks: usize,
    pub(crate) hard_stacks: usize,
}

/// Plays one attempt on `map`, persisting its record through `store`.
pub(crate) fn run_attempt(
    config: &HostConfig,
    map: &str,
    seed: u64,
    store: &mut dyn RunHistoryStore,
) -> Result<AttemptSummary> {
    let frame = config.simulation.frame;
    ensure!(!frame.is_zero(), "simulation frame must be positive");

    let history = LevelController::load_history(&*store);
    let mut host = Host {
        config,
        world: World::new(config.world.clone()),
        crowd: CrowdControl::new(config.crowd_control),
        spawning: Spawning::new(SpawningConfig::new(seed)),
        controller: LevelController::new(config.level.clone(), map),
        spawn_points: spawn_ring(&config.simulation, seed),
        store,
        pilot: Pilot::default(),
        stacks: 0,
        hard_stacks: 0,
    };

    let mut commands = Vec::new();
    let resolver = DifficultyResolver::new(config.difficulty.clone());
    let _ = host.controller.begin(history, &resolver, &mut commands);
    host.dispatch(commands);

    let deadline = config
        .simulation
        .max_attempt_time
        .saturating_add(config.level.after_level_delay)
        .saturating_add(Duration::from_secs(1));
    let mut elapsed = Duration::ZERO;
    let request = loop {
        if let Some(request) = host.controller.take_request() {
            break Some(request);
        }
        if elapsed >= deadline {
            log::warn!("attempt on {map} abandoned after {}s", elapsed.as_secs());
            break None;
        }
        let mut commands = host.pilot(frame);
        commands.push(Command::Tick { dt: frame });
        host.dispatch(commands);
        elapsed = elapsed.saturating_add(frame);
    };

    Ok(AttemptSummary {
        parameter: host.controller.difficulty_parameter(),
        record: host.controller.outcome().cloned(),
        request,
        stacks: host.stacks,
        hard_stacks: host.hard_stacks,
    })
}

/// Spawn points scattered on a ring, each facing the arena centre.
fn spawn_ring(config: &SimulationConfig, seed: u64) -> Vec<SpawnPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let inner = config.spawn_inner_radius.min(config.spawn_outer_radius);
    let outer = config.spawn_inner_radius.max(config.spawn_outer_radius);

    (0..config.spawn_points)
        .map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let radius = rng.gen_range(inner..=outer);
            let position = Vec3::new(angle.cos() * radius, angle.sin() * radius, 0.0);
            SpawnPoint::new(position, -position.normalize_or_zero())
        })
        .collect()
}

fn flat(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, vector.y, 0.0)
}

#[derive(Debug, Default)]
struct Pilot {
    since_chain: Duration,
    since_slow: Duration,
}

struct Host<'a> {
    config: &'a HostConfig,
    world: World,
    crowd: CrowdControl,
    spawning: Spawning,
    controller: LevelController,
    spawn_points: Vec<SpawnPoint>,
    store: &'a mut dyn RunHistoryStore,
    pilot: Pilot,
    stacks: usize,
    hard_stacks: usize,
}

impl Host<'_> {
    /// Applies commands and lets every system answer until no command is left.
    fn dispatch(&mut self, mut commands: Vec<Command>) {
        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            let mut system_events = Vec::new();
            self.crowd.handle(
                &events,
                &query::chaser_view(&self.world),
                &mut system_events,
                &mut commands,
            );
            self.spawning
                .handle(&events, &self.spawn_points, &mut commands);
            self.controller.handle(
                &events,
                &query::player(&self.world),
                &query::enemy_view(&self.world),
                &mut *self.store,
                &mut commands,
            );
            self.observe(&events);
            self.observe(&system_events);
        }
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemiesStacked { .. } => self.stacks += 1,
                Event::StackStateChanged {
                    state: StackState::HardStack,
                } => self.hard_stacks += 1,
                Event::StackStateChanged { state } => log::debug!("stack state {state:?}"),
                Event::PlayerDied => log::info!("player died"),
                _ => {}
            }
        }
    }

    /// Perception and navigation for every actor for one frame.
    fn pilot(&mut self, frame: Duration) -> Vec<Command> {
        let player = query::player(&self.world);
        let enemies = query::enemy_view(&self.world);
        let dt = frame.as_secs_f32();
        let mut commands = Vec::new();
        if player.movement == PlayerMovement::Dead {
            return commands;
        }

        let reach = self.config.world.enemy.attack.length + self.config.world.player.radius;
        for enemy in enemies.iter() {
            let offset = flat(player.position - enemy.position);
            let distance = offset.length();
            match enemy.move_phase {
                MovePhase::None if distance <= enemy.notice_radius => {
                    commands.push(Command::NoticePlayer { enemy: enemy.id });
                }
                MovePhase::Chasing if enemy.attack_phase == AttackPhase::NotAttacking => {
                    if distance <= reach {
                        commands.push(Command::EnemyAttack { enemy: enemy.id });
                        continue;
                    }
                    let step = (enemy.walk_speed * dt).min(distance - reach * 0.5);
                    commands.push(Command::MoveEnemy {
                        enemy: enemy.id,
                        position: enemy.position + offset.normalize_or_zero() * step,
                    });
                }
                _ => {}
            }
        }

        self.pilot_player(&player, &enemies, frame, &mut commands);
        commands
    }

    fn pilot_player(
        &mut self,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        frame: Duration,
        commands: &mut Vec<Command>,
    ) {
        let mut by_distance: Vec<(&EnemySnapshot, f32)> = enemies
            .iter()
            .map(|enemy| (enemy, flat(enemy.position - player.position).length()))
            .collect();
        by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
        let Some(&(nearest, distance)) = by_distance.first() else {
            return;
        };

        let direction = flat(nearest.position - player.position).normalize_or_zero();
        let mut position = player.position;
        if player.chasing == 0 {
            let step = (player.walk_speed * frame.as_secs_f32()).min(distance * 0.5);
            position += direction * step;
        }
        commands.push(Command::MovePlayer {
            position,
            facing: direction,
        });

        let swing_reach =
            self.config.world.player.attack.radius + self.config.world.enemy.radius;
        if distance <= swing_reach && player.movement == PlayerMovement::Walking {
            commands.push(Command::PlayerAttack);
        }

        let chasers: Vec<&EnemySnapshot> = by_distance
            .iter()
            .map(|(enemy, _)| *enemy)
            .filter(|enemy| enemy.move_phase == MovePhase::Chasing)
            .collect();
        self.use_abilities(&chasers, frame, commands);
    }

    fn use_abilities(
        &mut self,
        chasers: &[&EnemySnapshot],
        frame: Duration,
        commands: &mut Vec<Command>,
    ) {
        let simulation = &self.config.simulation;
        self.pilot.since_chain = self.pilot.since_chain.saturating_add(frame);
        self.pilot.since_slow = self.pilot.since_slow.saturating_add(frame);

        if self.pilot.since_chain >= simulation.chain_cooldown && chasers.len() >= 2 {
            self.pilot.since_chain = Duration::ZERO;
            commands.extend(
                chasers
                    .iter()
                    .take(simulation.chain_targets)
                    .map(|enemy| Command::ChainEnemy {
                        enemy: enemy.id,
                        duration: simulation.chain_duration,
                    }),
            );
        }

        if self.pilot.since_slow >= simulation.slow_cooldown {
            if let Some(target) = chasers.first() {
                self.pilot.since_slow = Duration::ZERO;
                commands.push(Command::DebuffEnemy {
                    enemy: target.id,
                    kind: DebuffKind::Slow,
                    multiplier: simulation.slow_multiplier,
                    duration: simulation.slow_duration,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypercube_system_run_history::MemoryStore;

    fn quick_config() -> HostConfig {
        let mut config = HostConfig::default();
        config.simulation.frame = Duration::from_millis(50);
        config.simulation.spawn_points = 6;
        config.simulation.spawn_inner_radius = 400.0;
        config.simulation.spawn_outer_radius = 900.0;
        config.simulation.max_attempt_time = Duration::from_secs(120);
        config
    }

    #[test]
    fn spawn_ring_stays_between_radii() {
        let config = quick_config();
        let points = spawn_ring(&config.simulation, 11);

        assert_eq!(points.len(), 6);
        for point in &points {
            let distance = point.position.length();
            assert!((400.0..=900.0).contains(&distance), "distance {distance}");
            let towards_centre = -point.position.normalize();
            assert!((point.facing - towards_centre).length() < 1e-4);
        }
    }

    #[test]
    fn attempt_records_one_run_and_requests_a_level() {
        let config = quick_config();
        let mut store = MemoryStore::new();

        let summary = run_attempt(&config, "training", 5, &mut store).expect("attempt runs");

        assert_eq!(summary.parameter, 0.5, "first attempt is neutral");
        let record = summary.record.expect("attempt finished");
        assert_eq!(store.records().map(<[RunRecord]>::len), Some(1));
        let request = summary.request.expect("level requested");
        let expected = if record.won { 1 } else { 0 };
        assert_eq!(request.index, expected);
    }

    #[test]
    fn zero_frame_is_rejected() {
        let mut config = quick_config();
        config.simulation.frame = Duration::ZERO;
        let mut store = MemoryStore::new();

        assert!(run_attempt(&config, "training", 1, &mut store).is_err());
        assert!(store.records().is_none());
    }
}

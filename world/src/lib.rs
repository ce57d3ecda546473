#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative combat state for the Hypercube engine.
//!
//! The world owns the player, the enemy roster, the damage-sharing chain and
//! the timer scheduler. Every mutation flows through [`apply`], which executes
//! one [`Command`] and appends the resulting [`Event`] values. Time only moves
//! on [`Command::Tick`]: due timers fire first (with the clock at each timer's
//! due time), then per-frame work runs for the elapsed delta.

mod chain;
mod enemy;
mod overlap;
mod player;
pub mod scheduler;

use std::time::Duration;

use glam::Vec3;
use hypercube_core::{
    AttackPhase, Command, DebuffKind, EnemyId, EnemyStats, Event, LevelingType, MovePhase,
    PlayerMovement, PlayerStats, SpawnPoint, Tunables,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

pub use overlap::{ForwardBoxOverlap, OverlapQuery};

use chain::Chain;
use enemy::{ActiveModifier, Enemy, EnemyRoster, HealBuff};
use player::Player;
use scheduler::{Scheduler, TimerKind};

const DEFAULT_LEVELING_SEED: u64 = 0x6879_7065_7263_7562;

/// Tuning of the combat world.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Base statistics of every spawned enemy.
    pub enemy: EnemyStats,
    /// Base statistics of the player.
    pub player: PlayerStats,
    /// Fraction of a chained hit shared with every other chain member.
    pub chain_damage_multiplier: f32,
    /// Fraction of the spawned enemies at or below which the
    /// few-enemies-remaining event fires.
    pub few_enemies_fraction: f32,
    /// Seed of the generator choosing leveling types for unleveled enemies.
    pub leveling_seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            enemy: EnemyStats::default(),
            player: PlayerStats::default(),
            chain_damage_multiplier: 0.25,
            few_enemies_fraction: 0.03,
            leveling_seed: DEFAULT_LEVELING_SEED,
        }
    }
}

/// Represents the authoritative Hypercube combat state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    scheduler: Scheduler,
    roster: EnemyRoster,
    player: Player,
    chain: Chain,
    tunables: Tunables,
    overlap: Box<dyn OverlapQuery>,
    rng: ChaCha8Rng,
    spawned: usize,
    removed: usize,
    few_enemies_announced: bool,
}

impl World {
    /// Creates a world using the default geometric overlap query.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self::with_overlap(config, Box::new(ForwardBoxOverlap))
    }

    /// Creates a world that resolves hitboxes through the provided query.
    #[must_use]
    pub fn with_overlap(config: WorldConfig, overlap: Box<dyn OverlapQuery>) -> Self {
        Self {
            player: Player::new(config.player),
            rng: ChaCha8Rng::seed_from_u64(config.leveling_seed),
            config,
            scheduler: Scheduler::new(),
            roster: EnemyRoster::new(),
            chain: Chain::default(),
            tunables: Tunables::default(),
            overlap,
            spawned: 0,
            removed: 0,
            few_enemies_announced: false,
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });

        let until = self.scheduler.now().saturating_add(dt);
        while let Some((_, kind)) = self.scheduler.pop_due(until) {
            self.fire(kind, out_events);
        }
        self.scheduler.advance_to(until);

        let dt_secs = dt.as_secs_f32();
        self.tick_enemies(dt_secs, out_events);
        self.tick_player_swing(out_events);
        self.player.decay_multiplier(dt_secs, out_events);
    }

    fn fire(&mut self, kind: TimerKind, out_events: &mut Vec<Event>) {
        match kind {
            TimerKind::Notice(id) => {
                if let Some(enemy) = self.roster.get_mut(id) {
                    if enemy.move_phase == MovePhase::Noticing {
                        enemy.move_phase = MovePhase::Chasing;
                        log::debug!("enemy {} started chasing", id.get());
                        out_events.push(Event::EnemyStartedChasing { enemy: id });
                    }
                }
            }
            TimerKind::EnemyAttackPhase(id) => self.advance_enemy_attack(id, out_events),
            TimerKind::Debuff(id, kind) => {
                if let Some(enemy) = self.roster.get_mut(id) {
                    if enemy.expire_debuff(kind) {
                        out_events.push(Event::DebuffExpired { enemy: id, kind });
                    }
                }
            }
            TimerKind::EnemyHealBurst(id) => self.enemy_heal_burst(id, out_events),
            TimerKind::Chain(id) => self.unchain(id, out_events),
            TimerKind::PlayerAttackPhase => self.advance_player_attack(out_events),
            TimerKind::PlayerInvincibility => self.player.invincible = false,
            TimerKind::MultiplierStays => self.player.start_multiplier_fall(),
            TimerKind::PlayerHealBurst => self.player_heal_burst(out_events),
            TimerKind::PlayerSpeedBuff => {
                if let Some(buff) = self.player.speed_buff.take() {
                    self.player.walk_speed /= buff.multiplier;
                }
            }
        }
    }

    fn tick_enemies(&mut self, dt_secs: f32, out_events: &mut Vec<Event>) {
        let target = self.player.position;
        let target_radius = self.player.stats.radius;

        for id in self.roster.ids() {
            let Some(enemy) = self.roster.get_mut(id) else {
                continue;
            };
            let tracking = enemy.attack_phase != AttackPhase::NotAttacking
                || enemy.move_phase == MovePhase::Noticing;
            if tracking {
                let alpha = dt_secs * enemy.attack.rotation_rate;
                enemy.facing = turn_towards(enemy.facing, enemy.position, target, alpha);
            }
            if enemy.attack_phase != AttackPhase::Attacking {
                continue;
            }

            let forward = overlap::flatten(enemy.facing).normalize_or_zero();
            enemy.position += forward * enemy.attack.move_forward_speed * dt_secs;
            let hitbox = enemy.hitbox();
            let damage = enemy.attack.damage;
            if self.overlap.overlaps(&hitbox, target, target_radius) {
                self.damage_player(damage, out_events);
            }
        }
    }

    fn tick_player_swing(&mut self, out_events: &mut Vec<Event>) {
        if self.player.attack_phase != AttackPhase::Attacking || self.player.is_dead() {
            return;
        }
        let hitbox = self.player.hitbox();
        let damage = self.player.swing_damage();

        for id in self.roster.ids() {
            if self.player.swing_hits.contains(&id) {
                continue;
            }
            let Some(enemy) = self.roster.get(id) else {
                continue;
            };
            if !self.overlap.overlaps(&hitbox, enemy.position, enemy.radius) {
                continue;
            }
            let _ = self.player.swing_hits.insert(id);
            self.damage_enemy(id, damage, false, out_events);
        }
    }

    fn spawn_enemy(
        &mut self,
        spawn: SpawnPoint,
        level: u32,
        leveling: LevelingType,
        out_events: &mut Vec<Event>,
    ) {
        let id = self.roster.allocate();
        let stats = &self.config.enemy;
        let position = spawn.position + Vec3::Z * stats.spawn_height;
        let mut enemy = Enemy::spawn(id, position, spawn.facing, stats, &self.tunables);
        if level > 0 || leveling != LevelingType::None {
            enemy.set_level(level, leveling, self.tunables.enemy_leveling_fraction);
        }
        self.roster.insert(enemy);
        self.spawned += 1;
        out_events.push(Event::EnemySpawned {
            enemy: id,
            position,
        });
    }

    fn notice_player(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.roster.get_mut(id) else {
            log::warn!("notice requested for unknown enemy {}", id.get());
            return;
        };
        if enemy.move_phase != MovePhase::None {
            log::debug!("enemy {} already noticed the player", id.get());
            return;
        }

        enemy.move_phase = MovePhase::Noticing;
        let _ = self
            .scheduler
            .schedule(self.config.enemy.aggro_time, TimerKind::Notice(id));
        out_events.push(Event::EnemyNoticed { enemy: id });

        if self.player.add_chaser(id) {
            self.refresh_multiplier(out_events);
            out_events.push(Event::ChasingSetChanged {
                count: self.player.chasing.len(),
            });
        }
    }

    fn remove_chaser(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        if !self.player.remove_chaser(id) {
            log::warn!("enemy {} is not chasing the player", id.get());
            return;
        }
        self.refresh_multiplier(out_events);
        out_events.push(Event::ChasingSetChanged {
            count: self.player.chasing.len(),
        });
    }

    fn start_enemy_attack(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.roster.get_mut(id) else {
            log::warn!("attack requested for unknown enemy {}", id.get());
            return;
        };
        if enemy.attack_phase != AttackPhase::NotAttacking {
            return;
        }
        enemy.attack_phase = AttackPhase::Opener;
        let _ = self.scheduler.schedule(
            enemy.attack.opener_time,
            TimerKind::EnemyAttackPhase(id),
        );
        out_events.push(Event::EnemyAttackPhaseChanged {
            enemy: id,
            phase: AttackPhase::Opener,
        });
    }

    fn advance_enemy_attack(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.roster.get_mut(id) else {
            return;
        };
        let (phase, delay) = match enemy.attack_phase {
            AttackPhase::Opener => (AttackPhase::Attacking, Some(enemy.attack.attack_time)),
            AttackPhase::Attacking => (
                AttackPhase::AfterAttack,
                Some(enemy.attack.after_attack_time),
            ),
            AttackPhase::AfterAttack => (AttackPhase::NotAttacking, None),
            AttackPhase::NotAttacking => return,
        };

        enemy.attack_phase = phase;
        if let Some(delay) = delay {
            let _ = self
                .scheduler
                .schedule(delay, TimerKind::EnemyAttackPhase(id));
        }
        out_events.push(Event::EnemyAttackPhaseChanged { enemy: id, phase });
        if phase == AttackPhase::NotAttacking {
            out_events.push(Event::EnemyAttackEnded { enemy: id });
        }
    }

    fn start_player_attack(&mut self, out_events: &mut Vec<Event>) {
        if self.player.movement != PlayerMovement::Walking {
            return;
        }
        self.player.movement = PlayerMovement::Attacking;
        let opener = self.player.stats.attack.opener_time;
        self.set_player_attack_phase(AttackPhase::Opener, Some(opener), out_events);
    }

    fn advance_player_attack(&mut self, out_events: &mut Vec<Event>) {
        let attack = self.player.stats.attack;
        match self.player.attack_phase {
            AttackPhase::Opener => {
                self.player.swing_hits.clear();
                self.set_player_attack_phase(
                    AttackPhase::Attacking,
                    Some(attack.attack_time),
                    out_events,
                );
            }
            AttackPhase::Attacking => self.set_player_attack_phase(
                AttackPhase::AfterAttack,
                Some(attack.after_attack_time),
                out_events,
            ),
            AttackPhase::AfterAttack => {
                self.set_player_attack_phase(AttackPhase::NotAttacking, None, out_events);
                if !self.player.is_dead() {
                    self.player.movement = PlayerMovement::Walking;
                }
            }
            AttackPhase::NotAttacking => {}
        }
    }

    fn set_player_attack_phase(
        &mut self,
        phase: AttackPhase,
        delay: Option<Duration>,
        out_events: &mut Vec<Event>,
    ) {
        self.player.attack_phase = phase;
        if let Some(delay) = delay {
            let _ = self.scheduler.schedule(delay, TimerKind::PlayerAttackPhase);
        }
        out_events.push(Event::PlayerAttackPhaseChanged { phase });
    }

    fn damage_player(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        let player = &mut self.player;
        if player.is_dead() || player.invincible {
            return;
        }

        player.health -= amount;
        player.invincible = true;
        out_events.push(Event::PlayerDamaged {
            amount,
            health: player.health,
        });

        if player.health <= 0.0 {
            player.movement = PlayerMovement::Dead;
            log::info!("player died with {} chasers", player.chasing.len());
            out_events.push(Event::PlayerDied);
            return;
        }
        let _ = self.scheduler.schedule(
            player.stats.invincibility_after_damage,
            TimerKind::PlayerInvincibility,
        );
    }

    fn damage_enemy(
        &mut self,
        id: EnemyId,
        amount: f32,
        ignore_chain: bool,
        out_events: &mut Vec<Event>,
    ) {
        let Some(enemy) = self.roster.get_mut(id) else {
            log::warn!("damage requested for unknown enemy {}", id.get());
            return;
        };
        enemy.health -= amount;
        let health = enemy.health;
        let chained = enemy.chained;
        out_events.push(Event::EnemyDamaged {
            enemy: id,
            amount,
            health,
        });

        if chained && !ignore_chain {
            let shared = amount * self.config.chain_damage_multiplier;
            let members = self.chain.members().to_vec();
            for member in members.into_iter().filter(|member| *member != id) {
                self.damage_enemy(member, shared, true, out_events);
            }
        }

        if health <= 0.0 {
            self.kill_enemy(id, out_events);
        }
    }

    fn kill_enemy(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let Some(max_health) = self.roster.get(id).map(|enemy| enemy.max_health) else {
            return;
        };
        self.player.credit_kill(max_health, out_events);
        log::debug!("enemy {} died", id.get());
        out_events.push(Event::EnemyDied { enemy: id });
        self.remove_enemy(id, out_events);
    }

    /// Drops an enemy from the roster, the chain and the chasing set.
    fn remove_enemy(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.roster.remove(id) else {
            log::warn!("enemy {} already left the roster", id.get());
            return;
        };
        let _ = self
            .scheduler
            .cancel_where(|kind| kind.enemy() == Some(id));
        self.removed += 1;

        if enemy.chained && self.chain.leave(id) {
            out_events.push(Event::EnemyUnchained { enemy: id });
        }
        if self.player.remove_chaser(id) {
            self.refresh_multiplier(out_events);
            out_events.push(Event::ChasingSetChanged {
                count: self.player.chasing.len(),
            });
        }

        let remaining = self.roster.len();
        let threshold = (self.config.few_enemies_fraction * self.spawned as f32).ceil() as usize;
        if !self.few_enemies_announced && remaining <= threshold {
            self.few_enemies_announced = true;
            log::info!("few enemies remaining: {remaining}");
            out_events.push(Event::FewEnemiesRemaining { remaining });
        }
        if remaining == 0 {
            log::info!("all enemies dead");
            out_events.push(Event::AllEnemiesDead);
        }
    }

    fn refresh_multiplier(&mut self, out_events: &mut Vec<Event>) {
        let weight: f32 = self
            .player
            .chasing
            .iter()
            .filter_map(|id| self.roster.get(*id))
            .map(|enemy| 1.0 + enemy.level as f32)
            .sum();
        let target = 1.0 + self.player.damage_multiplier_cost * weight;
        self.player
            .retarget_multiplier(target, &mut self.scheduler, out_events);
    }

    fn debuff_enemy(
        &mut self,
        id: EnemyId,
        kind: DebuffKind,
        multiplier: f32,
        duration: Duration,
        out_events: &mut Vec<Event>,
    ) {
        if !(multiplier > 0.0 && multiplier.is_finite()) {
            log::warn!("rejected {kind:?} debuff with multiplier {multiplier}");
            return;
        }
        let Some(enemy) = self.roster.get_mut(id) else {
            log::warn!("debuff requested for unknown enemy {}", id.get());
            return;
        };

        if let Some(active) = enemy.modifier(kind) {
            let _ = self.scheduler.cancel(active.timer);
            let timer = self.scheduler.schedule(duration, TimerKind::Debuff(id, kind));
            enemy.refresh_debuff(kind, timer);
            return;
        }
        let timer = self.scheduler.schedule(duration, TimerKind::Debuff(id, kind));
        enemy.apply_debuff(kind, multiplier, timer);
        out_events.push(Event::DebuffApplied { enemy: id, kind });
    }

    fn heal_enemy(&mut self, id: EnemyId, amount: f32, bursts: u32) {
        let Some(enemy) = self.roster.get_mut(id) else {
            log::warn!("heal requested for unknown enemy {}", id.get());
            return;
        };
        if let Some(previous) = enemy.heal.take() {
            let _ = self.scheduler.cancel(previous.timer);
        }
        let bursts = bursts.max(1);
        let timer = self.scheduler.schedule(
            self.config.enemy.heal_burst_interval,
            TimerKind::EnemyHealBurst(id),
        );
        enemy.heal = Some(HealBuff {
            per_burst: amount / bursts as f32,
            remaining: bursts,
            timer,
        });
    }

    fn enemy_heal_burst(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.roster.get_mut(id) else {
            return;
        };
        let Some(mut buff) = enemy.heal.take() else {
            return;
        };

        let amount = enemy.restore_health(buff.per_burst);
        out_events.push(Event::EnemyHealed { enemy: id, amount });
        buff.remaining = buff.remaining.saturating_sub(1);
        if buff.remaining == 0 {
            out_events.push(Event::EnemyHealEnded { enemy: id });
            return;
        }
        buff.timer = self.scheduler.schedule(
            self.config.enemy.heal_burst_interval,
            TimerKind::EnemyHealBurst(id),
        );
        enemy.heal = Some(buff);
    }

    fn heal_player(&mut self, amount: f32, bursts: u32) {
        let player = &mut self.player;
        if let Some(previous) = player.heal.take() {
            let _ = self.scheduler.cancel(previous.timer);
        }
        let bursts = bursts.max(1);
        let timer = self
            .scheduler
            .schedule(player.stats.heal_burst_interval, TimerKind::PlayerHealBurst);
        player.heal = Some(HealBuff {
            per_burst: amount / bursts as f32,
            remaining: bursts,
            timer,
        });
    }

    fn player_heal_burst(&mut self, out_events: &mut Vec<Event>) {
        let player = &mut self.player;
        let Some(mut buff) = player.heal.take() else {
            return;
        };

        let amount = player.restore_health(buff.per_burst);
        if amount > 0.0 {
            out_events.push(Event::PlayerHealed { amount });
        }
        buff.remaining = buff.remaining.saturating_sub(1);
        if buff.remaining == 0 {
            return;
        }
        buff.timer = self
            .scheduler
            .schedule(player.stats.heal_burst_interval, TimerKind::PlayerHealBurst);
        player.heal = Some(buff);
    }

    fn speed_buff_player(&mut self, multiplier: f32, duration: Duration) {
        if !(multiplier > 0.0 && multiplier.is_finite()) {
            log::warn!("rejected speed buff with multiplier {multiplier}");
            return;
        }
        let player = &mut self.player;
        if let Some(active) = player.speed_buff.as_mut() {
            let _ = self.scheduler.cancel(active.timer);
            active.timer = self
                .scheduler
                .schedule(duration, TimerKind::PlayerSpeedBuff);
            return;
        }
        let timer = self
            .scheduler
            .schedule(duration, TimerKind::PlayerSpeedBuff);
        player.walk_speed *= multiplier;
        player.speed_buff = Some(ActiveModifier { multiplier, timer });
    }

    fn set_enemy_level(
        &mut self,
        id: EnemyId,
        level: u32,
        leveling: LevelingType,
        out_events: &mut Vec<Event>,
    ) {
        let fraction = self.tunables.enemy_leveling_fraction;
        let Some(enemy) = self.roster.get_mut(id) else {
            log::warn!("level change requested for unknown enemy {}", id.get());
            return;
        };
        enemy.set_level(level, leveling, fraction);
        out_events.push(Event::EnemyLevelChanged {
            enemy: id,
            level,
            leveling,
        });
        self.refresh_multiplier(out_events);
    }

    fn increase_enemy_level(&mut self, id: EnemyId, by: u32, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.roster.get(id) else {
            log::warn!("level increase requested for unknown enemy {}", id.get());
            return;
        };
        let level = enemy.level.saturating_add(by);
        let leveling = match enemy.leveling {
            LevelingType::None => {
                let choices = LevelingType::ASSIGNABLE;
                choices[self.rng.gen_range(0..choices.len())]
            }
            assigned => assigned,
        };
        self.set_enemy_level(id, level, leveling, out_events);
    }

    fn stack_enemies(&mut self, first: EnemyId, second: EnemyId, out_events: &mut Vec<Event>) {
        if first == second {
            log::warn!("trying to stack enemy {} with itself", first.get());
            return;
        }
        let (Some(a), Some(b)) = (self.roster.get(first), self.roster.get(second)) else {
            log::warn!(
                "cannot stack enemies {} and {}: not in the roster",
                first.get(),
                second.get()
            );
            return;
        };

        let (absorbed, survivor, absorbed_level) = if a.level < b.level {
            (first, second, a.level)
        } else {
            (second, first, b.level)
        };

        self.increase_enemy_level(survivor, absorbed_level.saturating_add(1), out_events);
        if let Some(enemy) = self.roster.get_mut(survivor) {
            enemy.health = enemy.max_health;
        }
        log::debug!(
            "enemy {} absorbed enemy {}",
            survivor.get(),
            absorbed.get()
        );
        out_events.push(Event::EnemiesStacked { survivor, absorbed });
        self.remove_enemy(absorbed, out_events);
    }

    fn chain_enemy(&mut self, id: EnemyId, duration: Duration, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.roster.get(id) else {
            log::warn!("chain requested for unknown enemy {}", id.get());
            return;
        };
        let position = enemy.position;
        let refreshing = enemy.chained;
        let previous = enemy.chain_timer;

        if let Some(timer) = previous {
            let _ = self.scheduler.cancel(timer);
        }
        let timer = self.scheduler.schedule(duration, TimerKind::Chain(id));
        let linked_to = if refreshing {
            None
        } else {
            self.nearest_chain_member(position)
        };

        if let Some(enemy) = self.roster.get_mut(id) {
            enemy.chained = true;
            enemy.chain_timer = Some(timer);
        }
        if refreshing {
            return;
        }
        let _ = self.chain.join(id, linked_to);
        out_events.push(Event::EnemyChained {
            enemy: id,
            linked_to,
        });
    }

    fn nearest_chain_member(&self, position: Vec3) -> Option<EnemyId> {
        let mut nearest: Option<(EnemyId, f32)> = None;
        for member in self.chain.members() {
            let Some(enemy) = self.roster.get(*member) else {
                continue;
            };
            let distance = enemy.position.distance(position);
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((*member, distance));
            }
        }
        nearest.map(|(id, _)| id)
    }

    fn unchain(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        if let Some(enemy) = self.roster.get_mut(id) {
            enemy.chained = false;
            enemy.chain_timer = None;
        }
        if self.chain.leave(id) {
            out_events.push(Event::EnemyUnchained { enemy: id });
        }
    }
}

/// Turns `facing` towards `target` on the ground plane by interpolation factor `alpha`.
fn turn_towards(facing: Vec3, position: Vec3, target: Vec3, alpha: f32) -> Vec3 {
    let Some(direction) = overlap::flatten(target - position).try_normalize() else {
        return facing;
    };
    facing
        .lerp(direction, alpha.clamp(0.0, 1.0))
        .try_normalize()
        .unwrap_or(direction)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::ApplyTunables { tunables } => {
            world.tunables = tunables;
            world.player.apply_tunables(&tunables);
            log::info!(
                "tunables applied: player speed x{}, enemy speed x{}",
                tunables.player_speed,
                tunables.enemy_speed
            );
            out_events.push(Event::TunablesApplied { tunables });
            world.refresh_multiplier(out_events);
        }
        Command::SpawnEnemy {
            spawn,
            level,
            leveling,
        } => world.spawn_enemy(spawn, level, leveling, out_events),
        Command::MovePlayer { position, facing } => {
            world.player.position = position;
            if let Some(facing) = facing.try_normalize() {
                world.player.facing = facing;
            }
        }
        Command::MoveEnemy { enemy, position } => match world.roster.get_mut(enemy) {
            Some(state) => state.position = position,
            None => log::warn!("move requested for unknown enemy {}", enemy.get()),
        },
        Command::NoticePlayer { enemy } => world.notice_player(enemy, out_events),
        Command::EnemyAttack { enemy } => world.start_enemy_attack(enemy, out_events),
        Command::PlayerAttack => world.start_player_attack(out_events),
        Command::DamageEnemy {
            enemy,
            amount,
            ignore_chain,
        } => world.damage_enemy(enemy, amount, ignore_chain, out_events),
        Command::DamagePlayer { amount } => world.damage_player(amount, out_events),
        Command::DebuffEnemy {
            enemy,
            kind,
            multiplier,
            duration,
        } => world.debuff_enemy(enemy, kind, multiplier, duration, out_events),
        Command::HealEnemy {
            enemy,
            amount,
            bursts,
        } => world.heal_enemy(enemy, amount, bursts),
        Command::HealPlayer { amount, bursts } => world.heal_player(amount, bursts),
        Command::SpeedBuffPlayer {
            multiplier,
            duration,
        } => world.speed_buff_player(multiplier, duration),
        Command::SetEnemyLevel {
            enemy,
            level,
            leveling,
        } => world.set_enemy_level(enemy, level, leveling, out_events),
        Command::IncreaseEnemyLevel { enemy, by } => {
            world.increase_enemy_level(enemy, by, out_events)
        }
        Command::StackEnemies { first, second } => world.stack_enemies(first, second, out_events),
        Command::ChainEnemy { enemy, duration } => world.chain_enemy(enemy, duration, out_events),
        Command::RemoveChaser { enemy } => world.remove_chaser(enemy, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use hypercube_core::{
        ChaserSnapshot, ChaserView, EnemyId, EnemySnapshot, EnemyView, PlayerSnapshot, Tunables,
    };

    use super::{World, WorldConfig};

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures a single enemy's state.
    #[must_use]
    pub fn enemy(world: &World, enemy: EnemyId) -> Option<EnemySnapshot> {
        world.roster.get(enemy).map(|state| state.snapshot())
    }

    /// Captures a read-only view of every enemy in the roster.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.roster.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures the player's chasing set in the order enemies noticed the player.
    #[must_use]
    pub fn chaser_view(world: &World) -> ChaserView {
        let snapshots = world
            .player
            .chasing
            .iter()
            .filter_map(|id| world.roster.get(*id))
            .map(|enemy| ChaserSnapshot {
                id: enemy.id,
                position: enemy.position,
                level: enemy.level,
            })
            .collect();
        ChaserView::from_snapshots(snapshots)
    }

    /// Members of the damage-sharing chain in the order they joined.
    #[must_use]
    pub fn chain_members(world: &World) -> &[EnemyId] {
        world.chain.members()
    }

    /// Visual links between chain members.
    #[must_use]
    pub fn chain_links(world: &World) -> &[(EnemyId, EnemyId)] {
        world.chain.links()
    }

    /// Tunables currently in effect.
    #[must_use]
    pub fn tunables(world: &World) -> Tunables {
        world.tunables
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Number of enemies alive in the roster.
    #[must_use]
    pub fn enemies_remaining(world: &World) -> usize {
        world.roster.len()
    }

    /// Number of enemies spawned since the world was created.
    #[must_use]
    pub fn enemies_spawned(world: &World) -> usize {
        world.spawned
    }

    /// Number of enemies that died or were absorbed.
    #[must_use]
    pub fn enemies_removed(world: &World) -> usize {
        world.removed
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.scheduler.now()
    }

    /// Number of timers still armed.
    #[must_use]
    pub fn pending_timers(world: &World) -> usize {
        world.scheduler.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(world: &mut World, x: f32) -> EnemyId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                spawn: SpawnPoint::new(Vec3::new(x, 0.0, 0.0), Vec3::NEG_X),
                level: 0,
                leveling: LevelingType::None,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::EnemySpawned { enemy, .. }] => *enemy,
            other => panic!("unexpected spawn events: {other:?}"),
        }
    }

    #[test]
    fn spawn_lifts_enemy_above_spawn_point() {
        let mut world = World::new(WorldConfig::default());
        let id = spawn(&mut world, 300.0);

        let enemy = query::enemy(&world, id).expect("enemy spawned");
        assert_eq!(enemy.position, Vec3::new(300.0, 0.0, 96.0));
        assert_eq!(enemy.facing, Vec3::NEG_X);
    }

    #[test]
    fn spawn_applies_enemy_tunables_once() {
        let mut world = World::new(WorldConfig::default());
        let mut events = Vec::new();
        let tunables = Tunables {
            enemy_speed: 1.2,
            enemy_damage: 1.5,
            enemy_notice_radius: 0.5,
            ..Tunables::default()
        };
        apply(&mut world, Command::ApplyTunables { tunables }, &mut events);

        let id = spawn(&mut world, 0.0);
        let enemy = query::enemy(&world, id).expect("enemy spawned");

        assert!((enemy.walk_speed - 720.0).abs() < 1e-3);
        assert!((enemy.attack_damage - 37.5).abs() < 1e-3);
        assert!((enemy.notice_radius - 400.0).abs() < 1e-3);
    }

    #[test]
    fn turning_converges_on_target() {
        let facing = turn_towards(Vec3::X, Vec3::ZERO, Vec3::new(0.0, 10.0, 5.0), 1.0);
        assert!((facing - Vec3::Y).length() < 1e-5);

        let unchanged = turn_towards(Vec3::X, Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0), 0.5);
        assert_eq!(unchanged, Vec3::X);
    }

    #[test]
    fn removal_cancels_enemy_timers() {
        let mut world = World::new(WorldConfig::default());
        let mut events = Vec::new();
        let id = spawn(&mut world, 500.0);

        apply(&mut world, Command::NoticePlayer { enemy: id }, &mut events);
        apply(
            &mut world,
            Command::ChainEnemy {
                enemy: id,
                duration: Duration::from_secs(3),
            },
            &mut events,
        );
        assert_eq!(query::pending_timers(&world), 2);

        apply(
            &mut world,
            Command::DamageEnemy {
                enemy: id,
                amount: 500.0,
                ignore_chain: false,
            },
            &mut events,
        );

        assert_eq!(
            query::pending_timers(&world),
            1,
            "only the multiplier stays timer remains"
        );
        assert!(query::chain_members(&world).is_empty());
    }
}

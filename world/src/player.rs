//! Player state: health, score, attack cycle and the combo damage multiplier.

use std::collections::BTreeSet;

use glam::Vec3;
use hypercube_core::{
    AttackPhase, EnemyId, Event, Hitbox, PlayerMovement, PlayerSnapshot, PlayerStats, Tunables,
};

use crate::{
    enemy::{ActiveModifier, HealBuff},
    scheduler::{Scheduler, TimerId, TimerKind},
};

#[derive(Debug)]
pub(crate) struct Player {
    pub(crate) stats: PlayerStats,
    pub(crate) position: Vec3,
    pub(crate) facing: Vec3,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) score: f32,
    pub(crate) walk_speed: f32,
    pub(crate) vampirism: f32,
    pub(crate) damage_multiplier_cost: f32,
    pub(crate) damage_multiplier: f32,
    pub(crate) target_damage_multiplier: f32,
    multiplier_falling: bool,
    multiplier_stays: Option<TimerId>,
    /// Enemies chasing the player, in the order they noticed.
    pub(crate) chasing: Vec<EnemyId>,
    pub(crate) movement: PlayerMovement,
    pub(crate) attack_phase: AttackPhase,
    /// Enemies already hit by the current swing.
    pub(crate) swing_hits: BTreeSet<EnemyId>,
    pub(crate) invincible: bool,
    pub(crate) speed_buff: Option<ActiveModifier>,
    pub(crate) heal: Option<HealBuff>,
}

impl Player {
    pub(crate) fn new(stats: PlayerStats) -> Self {
        Self {
            stats,
            position: Vec3::ZERO,
            facing: Vec3::X,
            health: stats.max_health,
            max_health: stats.max_health,
            score: 0.0,
            walk_speed: stats.walk_speed,
            vampirism: 0.0,
            damage_multiplier_cost: stats.damage_multiplier_enemy_cost,
            damage_multiplier: 1.0,
            target_damage_multiplier: 1.0,
            multiplier_falling: false,
            multiplier_stays: None,
            chasing: Vec::new(),
            movement: PlayerMovement::Walking,
            attack_phase: AttackPhase::NotAttacking,
            swing_hits: BTreeSet::new(),
            invincible: false,
            speed_buff: None,
            heal: None,
        }
    }

    /// Recomputes tunable-driven stats from base values so repeated
    /// application never compounds.
    pub(crate) fn apply_tunables(&mut self, tunables: &Tunables) {
        let buff = self.speed_buff.map_or(1.0, |buff| buff.multiplier);
        self.walk_speed = self.stats.walk_speed * tunables.player_speed * buff;
        self.damage_multiplier_cost =
            self.stats.damage_multiplier_enemy_cost * tunables.player_damage_multiplier_cost;
        self.vampirism = tunables.player_vampirism;
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.movement == PlayerMovement::Dead
    }

    /// Adds a chaser; returns `false` when it was already registered.
    pub(crate) fn add_chaser(&mut self, enemy: EnemyId) -> bool {
        if self.chasing.contains(&enemy) {
            return false;
        }
        self.chasing.push(enemy);
        true
    }

    /// Removes a chaser; returns `false` when it was not registered.
    pub(crate) fn remove_chaser(&mut self, enemy: EnemyId) -> bool {
        let Some(index) = self.chasing.iter().position(|id| *id == enemy) else {
            return false;
        };
        let _ = self.chasing.remove(index);
        true
    }

    /// Moves the multiplier towards a new target.
    ///
    /// Raising the target snaps the multiplier up immediately. Lowering it
    /// arms the stays timer, after which the multiplier decays in
    /// [`Player::decay_multiplier`].
    pub(crate) fn retarget_multiplier(
        &mut self,
        target: f32,
        scheduler: &mut Scheduler,
        out_events: &mut Vec<Event>,
    ) {
        let previous_target = self.target_damage_multiplier;
        self.target_damage_multiplier = target;

        if target >= self.damage_multiplier {
            if let Some(timer) = self.multiplier_stays.take() {
                let _ = scheduler.cancel(timer);
            }
            self.multiplier_falling = false;
            let changed = target != self.damage_multiplier || target != previous_target;
            self.damage_multiplier = target;
            if changed {
                out_events.push(Event::DamageMultiplierChanged {
                    multiplier: self.damage_multiplier,
                    target,
                });
            }
            return;
        }

        if self.multiplier_stays.is_none() && !self.multiplier_falling {
            self.multiplier_stays = Some(scheduler.schedule(
                self.stats.damage_multiplier_stays_time,
                TimerKind::MultiplierStays,
            ));
        }
    }

    pub(crate) fn start_multiplier_fall(&mut self) {
        self.multiplier_stays = None;
        self.multiplier_falling = true;
    }

    pub(crate) fn decay_multiplier(&mut self, dt_secs: f32, out_events: &mut Vec<Event>) {
        if !self.multiplier_falling || self.damage_multiplier <= self.target_damage_multiplier {
            return;
        }
        self.damage_multiplier -= self.stats.damage_multiplier_decrease_speed * dt_secs;
        if self.damage_multiplier <= self.target_damage_multiplier {
            self.damage_multiplier = self.target_damage_multiplier;
            self.multiplier_falling = false;
            out_events.push(Event::DamageMultiplierChanged {
                multiplier: self.damage_multiplier,
                target: self.target_damage_multiplier,
            });
        }
    }

    /// Credits a kill: score scaled by the multiplier and vampiric healing.
    pub(crate) fn credit_kill(&mut self, enemy_max_health: f32, out_events: &mut Vec<Event>) {
        self.score += self.stats.base_score_for_enemy * self.damage_multiplier;
        let healed = self.restore_health(self.vampirism * enemy_max_health);
        if healed > 0.0 {
            out_events.push(Event::PlayerHealed { amount: healed });
        }
    }

    pub(crate) fn restore_health(&mut self, amount: f32) -> f32 {
        if self.is_dead() {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    pub(crate) fn hitbox(&self) -> Hitbox {
        Hitbox {
            origin: self.position,
            facing: self.facing,
            length: self.stats.attack.radius,
            width: self.stats.attack.width(),
        }
    }

    pub(crate) fn swing_damage(&self) -> f32 {
        self.stats.attack.damage * self.damage_multiplier
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            facing: self.facing,
            health: self.health,
            max_health: self.max_health,
            score: self.score,
            walk_speed: self.walk_speed,
            damage_multiplier: self.damage_multiplier,
            target_damage_multiplier: self.target_damage_multiplier,
            vampirism: self.vampirism,
            chasing: self.chasing.len(),
            movement: self.movement,
            attack_phase: self.attack_phase,
        }
    }
}

//! Enemy state and the roster that owns it.

use std::collections::BTreeMap;

use glam::Vec3;
use hypercube_core::{
    AttackPhase, AttackStats, DebuffKind, EnemyId, EnemySnapshot, EnemyStats, Hitbox,
    LevelingType, MovePhase, Tunables,
};

use crate::scheduler::TimerId;

/// Stat reduction currently applied to an enemy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ActiveModifier {
    pub(crate) multiplier: f32,
    pub(crate) timer: TimerId,
}

/// Heal split into bursts.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HealBuff {
    pub(crate) per_burst: f32,
    pub(crate) remaining: u32,
    pub(crate) timer: TimerId,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) position: Vec3,
    pub(crate) facing: Vec3,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) walk_speed: f32,
    pub(crate) notice_radius: f32,
    pub(crate) radius: f32,
    pub(crate) attack: AttackStats,
    pub(crate) level: u32,
    pub(crate) leveling: LevelingType,
    level_multiplier: f32,
    pub(crate) move_phase: MovePhase,
    pub(crate) attack_phase: AttackPhase,
    pub(crate) chained: bool,
    pub(crate) chain_timer: Option<TimerId>,
    pub(crate) slow: Option<ActiveModifier>,
    pub(crate) weaken: Option<ActiveModifier>,
    pub(crate) heal: Option<HealBuff>,
}

impl Enemy {
    /// Builds an enemy from base stats scaled by the difficulty tunables.
    pub(crate) fn spawn(
        id: EnemyId,
        position: Vec3,
        facing: Vec3,
        stats: &EnemyStats,
        tunables: &Tunables,
    ) -> Self {
        let mut attack = stats.attack;
        attack.damage *= tunables.enemy_damage;

        Self {
            id,
            position,
            facing: facing.try_normalize().unwrap_or(Vec3::X),
            health: stats.max_health,
            max_health: stats.max_health,
            walk_speed: stats.walk_speed * tunables.enemy_speed,
            notice_radius: stats.notice_radius * tunables.enemy_notice_radius,
            radius: stats.radius,
            attack,
            level: 0,
            leveling: LevelingType::None,
            level_multiplier: 1.0,
            move_phase: MovePhase::None,
            attack_phase: AttackPhase::NotAttacking,
            chained: false,
            chain_timer: None,
            slow: None,
            weaken: None,
            heal: None,
        }
    }

    /// Replaces the level, dividing the previous multiplier out of its stat
    /// before scaling the newly chosen stat.
    pub(crate) fn set_level(&mut self, level: u32, leveling: LevelingType, fraction: f32) {
        let previous = self.level_multiplier;
        self.scale_leveled_stat(self.leveling, previous.recip());

        let multiplier = 1.0 + level as f32 * fraction;
        self.level = level;
        self.leveling = leveling;
        self.level_multiplier = multiplier;
        self.scale_leveled_stat(leveling, multiplier);
    }

    fn scale_leveled_stat(&mut self, leveling: LevelingType, factor: f32) {
        match leveling {
            LevelingType::None => {}
            LevelingType::Speed => self.walk_speed *= factor,
            LevelingType::Damage => self.attack.damage *= factor,
            LevelingType::Health => {
                self.max_health *= factor;
                self.health *= factor;
            }
        }
    }

    pub(crate) fn modifier(&self, kind: DebuffKind) -> Option<ActiveModifier> {
        match kind {
            DebuffKind::Slow => self.slow,
            DebuffKind::DamageReduction => self.weaken,
        }
    }

    /// Multiplies the debuffed stat and remembers the timer restoring it.
    pub(crate) fn apply_debuff(&mut self, kind: DebuffKind, multiplier: f32, timer: TimerId) {
        let active = Some(ActiveModifier { multiplier, timer });
        match kind {
            DebuffKind::Slow => {
                self.walk_speed *= multiplier;
                self.slow = active;
            }
            DebuffKind::DamageReduction => {
                self.attack.damage *= multiplier;
                self.weaken = active;
            }
        }
    }

    /// Points an active debuff at a re-armed timer without re-multiplying.
    pub(crate) fn refresh_debuff(&mut self, kind: DebuffKind, timer: TimerId) {
        let slot = match kind {
            DebuffKind::Slow => &mut self.slow,
            DebuffKind::DamageReduction => &mut self.weaken,
        };
        if let Some(active) = slot {
            active.timer = timer;
        }
    }

    /// Divides an expired debuff back out of its stat.
    pub(crate) fn expire_debuff(&mut self, kind: DebuffKind) -> bool {
        let slot = match kind {
            DebuffKind::Slow => self.slow.take(),
            DebuffKind::DamageReduction => self.weaken.take(),
        };
        let Some(active) = slot else {
            return false;
        };
        match kind {
            DebuffKind::Slow => self.walk_speed /= active.multiplier,
            DebuffKind::DamageReduction => self.attack.damage /= active.multiplier,
        }
        true
    }

    /// Restores health capped at the maximum, returning the amount gained.
    pub(crate) fn restore_health(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    pub(crate) fn hitbox(&self) -> Hitbox {
        Hitbox {
            origin: self.position,
            facing: self.facing,
            length: self.attack.length,
            width: self.attack.width,
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            facing: self.facing,
            health: self.health,
            max_health: self.max_health,
            walk_speed: self.walk_speed,
            notice_radius: self.notice_radius,
            attack_damage: self.attack.damage,
            level: self.level,
            leveling: self.leveling,
            move_phase: self.move_phase,
            attack_phase: self.attack_phase,
            chained: self.chained,
        }
    }
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRoster {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRoster {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    pub(crate) fn allocate(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        id
    }

    pub(crate) fn insert(&mut self, enemy: Enemy) {
        let _ = self.entries.insert(enemy.id, enemy);
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn ids(&self) -> Vec<EnemyId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

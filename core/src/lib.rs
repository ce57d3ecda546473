#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hypercube combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub mod format;
pub mod serde_seconds;

/// Unique identifier assigned to an enemy by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Movement awareness of an enemy towards the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovePhase {
    /// The enemy has not detected the player yet.
    #[default]
    None,
    /// The enemy detected the player and is turning towards them.
    Noticing,
    /// The enemy is pursuing the player under external movement control.
    Chasing,
}

/// Timed phases of a single attack activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackPhase {
    /// No attack is in progress.
    #[default]
    NotAttacking,
    /// Wind-up before the hitbox becomes active.
    Opener,
    /// Active frames during which the hitbox deals damage.
    Attacking,
    /// Recovery after the hitbox is switched off.
    AfterAttack,
}

/// Stat that an enemy level multiplies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelingType {
    /// The enemy has never been leveled.
    #[default]
    None,
    /// Levels multiply walk speed.
    Speed,
    /// Levels multiply attack damage.
    Damage,
    /// Levels multiply maximum health.
    Health,
}

impl LevelingType {
    /// Leveling types that may be assigned to a previously unleveled enemy.
    pub const ASSIGNABLE: [LevelingType; 3] = [Self::Speed, Self::Damage, Self::Health];
}

/// Crowd pressure classification of the player's chasing set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackState {
    /// Few enough chasers that no merging is required.
    #[default]
    None,
    /// One pair of chasers is merged per query interval.
    SoftStack,
    /// Every chaser is paired and merged once.
    HardStack,
}

/// Movement state of the player character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerMovement {
    /// Free movement under host control.
    #[default]
    Walking,
    /// Movement is locked while an attack plays out.
    Attacking,
    /// The player died; no further actions are accepted.
    Dead,
}

/// Timed stat reductions that can be applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebuffKind {
    /// Multiplies walk speed.
    Slow,
    /// Multiplies attack damage.
    DamageReduction,
}

/// Timing and geometry of an enemy attack.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackStats {
    /// Damage dealt to the player per overlapping tick while attacking.
    pub damage: f32,
    /// Duration of the wind-up phase.
    #[serde(with = "serde_seconds")]
    pub opener_time: Duration,
    /// Duration of the active phase.
    #[serde(with = "serde_seconds")]
    pub attack_time: Duration,
    /// Duration of the recovery phase.
    #[serde(with = "serde_seconds")]
    pub after_attack_time: Duration,
    /// Rate at which facing turns towards the player.
    pub rotation_rate: f32,
    /// Forward lunge speed during the active phase, in world units per second.
    pub move_forward_speed: f32,
    /// Reach of the hitbox in front of the attacker.
    pub length: f32,
    /// Full width of the hitbox.
    pub width: f32,
}

impl Default for AttackStats {
    fn default() -> Self {
        Self {
            damage: 25.0,
            opener_time: Duration::from_millis(400),
            attack_time: Duration::from_millis(300),
            after_attack_time: Duration::from_millis(200),
            rotation_rate: 7.5,
            move_forward_speed: 150.0,
            length: 75.0,
            width: 70.0,
        }
    }
}

/// Base statistics of a freshly spawned enemy, before difficulty tunables.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    /// Maximum (and initial) health.
    pub max_health: f32,
    /// Maximum walk speed handed to the host movement layer.
    pub walk_speed: f32,
    /// Radius of the detection sphere.
    pub notice_radius: f32,
    /// Delay between noticing the player and starting to chase.
    #[serde(with = "serde_seconds")]
    pub aggro_time: Duration,
    /// Interval between heal bursts while a heal buff is active.
    #[serde(with = "serde_seconds")]
    pub heal_burst_interval: Duration,
    /// Vertical offset applied above a spawn point.
    pub spawn_height: f32,
    /// Collision radius used by overlap queries targeting the enemy.
    pub radius: f32,
    /// Attack timings and geometry.
    pub attack: AttackStats,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            walk_speed: 600.0,
            notice_radius: 800.0,
            aggro_time: Duration::from_millis(500),
            heal_burst_interval: Duration::from_millis(500),
            spawn_height: 96.0,
            radius: 42.0,
            attack: AttackStats::default(),
        }
    }
}

/// Timing and geometry of the player's swing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerAttackStats {
    /// Base damage before the damage multiplier.
    pub damage: f32,
    /// Duration of the wind-up phase.
    #[serde(with = "serde_seconds")]
    pub opener_time: Duration,
    /// Duration of the active phase.
    #[serde(with = "serde_seconds")]
    pub attack_time: Duration,
    /// Duration of the recovery phase.
    #[serde(with = "serde_seconds")]
    pub after_attack_time: Duration,
    /// Reach of the swing.
    pub radius: f32,
    /// Swing arc in degrees.
    pub angle_degrees: f32,
}

impl PlayerAttackStats {
    /// Full width of the box approximating the swing arc.
    #[must_use]
    pub fn width(&self) -> f32 {
        2.0 * self.radius * (self.angle_degrees.to_radians() / 2.0).tan()
    }
}

impl Default for PlayerAttackStats {
    fn default() -> Self {
        Self {
            damage: 25.0,
            opener_time: Duration::from_millis(100),
            attack_time: Duration::from_millis(200),
            after_attack_time: Duration::from_millis(100),
            radius: 150.0,
            angle_degrees: 90.0,
        }
    }
}

/// Base statistics of the player character, before difficulty tunables.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    /// Maximum (and initial) health.
    pub max_health: f32,
    /// Maximum walk speed handed to the host movement layer.
    pub walk_speed: f32,
    /// Invulnerability window after taking a hit.
    #[serde(with = "serde_seconds")]
    pub invincibility_after_damage: Duration,
    /// Score earned per kill before the damage multiplier.
    pub base_score_for_enemy: f32,
    /// Damage multiplier added per chasing enemy (per chaser level step).
    pub damage_multiplier_enemy_cost: f32,
    /// Time the multiplier holds before decaying towards a lower target.
    #[serde(with = "serde_seconds")]
    pub damage_multiplier_stays_time: Duration,
    /// Multiplier decay rate in units per second.
    pub damage_multiplier_decrease_speed: f32,
    /// Interval between heal bursts while a heal buff is active.
    #[serde(with = "serde_seconds")]
    pub heal_burst_interval: Duration,
    /// Collision radius used by overlap queries targeting the player.
    pub radius: f32,
    /// Swing timings and geometry.
    pub attack: PlayerAttackStats,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            walk_speed: 600.0,
            invincibility_after_damage: Duration::from_secs(1),
            base_score_for_enemy: 10.0,
            damage_multiplier_enemy_cost: 0.5,
            damage_multiplier_stays_time: Duration::from_secs(5),
            damage_multiplier_decrease_speed: 1.0,
            heal_burst_interval: Duration::from_millis(500),
            radius: 42.0,
            attack: PlayerAttackStats::default(),
        }
    }
}

/// Location supplied by the host at which one enemy may spawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Ground position of the spawn point.
    pub position: Vec3,
    /// Direction the spawned enemy initially faces.
    pub facing: Vec3,
}

impl SpawnPoint {
    /// Creates a spawn point at the provided position and facing.
    #[must_use]
    pub const fn new(position: Vec3, facing: Vec3) -> Self {
        Self { position, facing }
    }
}

/// Oriented box projected in front of an attacker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    /// Position of the attacker.
    pub origin: Vec3,
    /// Unit direction the attacker faces.
    pub facing: Vec3,
    /// Reach of the box along the facing direction.
    pub length: f32,
    /// Full width of the box across the facing direction.
    pub width: f32,
}

/// Concrete gameplay multipliers derived from the difficulty parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tunables {
    /// Multiplier applied to the player's base walk speed.
    pub player_speed: f32,
    /// Multiplier applied to the player's per-chaser damage multiplier cost.
    pub player_damage_multiplier_cost: f32,
    /// Fraction of a killed enemy's maximum health restored to the player.
    pub player_vampirism: f32,
    /// Multiplier applied to each spawned enemy's walk speed.
    pub enemy_speed: f32,
    /// Multiplier applied to each spawned enemy's attack damage.
    pub enemy_damage: f32,
    /// Multiplier applied to each spawned enemy's notice radius.
    pub enemy_notice_radius: f32,
    /// Fraction of spawn points that produce an enemy.
    pub enemy_count_fraction: f32,
    /// Per-level stat growth applied by enemy leveling.
    pub enemy_leveling_fraction: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            player_speed: 1.0,
            player_damage_multiplier_cost: 1.0,
            player_vampirism: 0.0,
            enemy_speed: 1.0,
            enemy_damage: 1.0,
            enemy_notice_radius: 1.0,
            enemy_count_fraction: 1.0,
            enemy_leveling_fraction: 0.5,
        }
    }
}

/// Outcome of one completed level attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Whether every enemy died before the player.
    pub won: bool,
    /// Score reached during the attempt.
    pub score: f32,
    /// Fraction of the spawned enemies removed from the roster.
    pub enemies_killed_fraction: f32,
    /// Number of enemies spawned at level start.
    pub total_enemies: u32,
    /// Highest damage multiplier reached.
    pub max_damage_multiplier: f32,
    /// Damage multiplier when the attempt ended.
    pub damage_multiplier_at_death: f32,
    /// Size of the chasing set when the attempt ended.
    pub chasers_at_death: u32,
    /// Seconds spent in the level.
    pub play_time_secs: f32,
    /// Difficulty parameter the level was played at.
    pub difficulty_parameter: f32,
    /// Index of the level in the configured level list, `-1` when unknown.
    pub level_index: i32,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Stores difficulty tunables and applies the player's share to base stats.
    ApplyTunables {
        /// Multipliers resolved for the current level.
        tunables: Tunables,
    },
    /// Spawns an enemy at a spawn point.
    SpawnEnemy {
        /// Spawn point producing the enemy.
        spawn: SpawnPoint,
        /// Initial level of the enemy.
        level: u32,
        /// Leveling type assigned with the initial level.
        leveling: LevelingType,
    },
    /// Reports the player's position and facing as resolved by the host.
    MovePlayer {
        /// New player position.
        position: Vec3,
        /// New player facing.
        facing: Vec3,
    },
    /// Reports an enemy's position as resolved by the host movement layer.
    MoveEnemy {
        /// Enemy that moved.
        enemy: EnemyId,
        /// New enemy position.
        position: Vec3,
    },
    /// Notifies an enemy that it detected the player.
    NoticePlayer {
        /// Enemy whose sensor fired.
        enemy: EnemyId,
    },
    /// Starts an enemy attack cycle.
    EnemyAttack {
        /// Enemy that attacks.
        enemy: EnemyId,
    },
    /// Starts the player attack cycle.
    PlayerAttack,
    /// Deals damage to an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: f32,
        /// Skips chain damage sharing when set.
        ignore_chain: bool,
    },
    /// Deals damage to the player.
    DamagePlayer {
        /// Amount of health removed.
        amount: f32,
    },
    /// Applies a timed stat reduction to an enemy.
    DebuffEnemy {
        /// Enemy receiving the debuff.
        enemy: EnemyId,
        /// Stat affected by the debuff.
        kind: DebuffKind,
        /// Multiplier applied to the stat while active.
        multiplier: f32,
        /// Duration of the debuff.
        duration: Duration,
    },
    /// Heals an enemy over several bursts.
    HealEnemy {
        /// Enemy receiving the heal.
        enemy: EnemyId,
        /// Total health restored across all bursts.
        amount: f32,
        /// Number of bursts the heal is split into.
        bursts: u32,
    },
    /// Heals the player over several bursts.
    HealPlayer {
        /// Total health restored across all bursts.
        amount: f32,
        /// Number of bursts the heal is split into.
        bursts: u32,
    },
    /// Temporarily multiplies the player's walk speed.
    SpeedBuffPlayer {
        /// Multiplier applied to walk speed while active.
        multiplier: f32,
        /// Duration of the buff.
        duration: Duration,
    },
    /// Replaces an enemy's level and leveling type.
    SetEnemyLevel {
        /// Enemy being leveled.
        enemy: EnemyId,
        /// New level.
        level: u32,
        /// Stat multiplied by the level.
        leveling: LevelingType,
    },
    /// Raises an enemy's level, assigning a random leveling type when unleveled.
    IncreaseEnemyLevel {
        /// Enemy being leveled.
        enemy: EnemyId,
        /// Number of levels added.
        by: u32,
    },
    /// Merges two enemies, absorbing the lower leveled one.
    StackEnemies {
        /// First enemy of the pair.
        first: EnemyId,
        /// Second enemy of the pair.
        second: EnemyId,
    },
    /// Links an enemy into the damage-sharing chain for a duration.
    ChainEnemy {
        /// Enemy joining the chain.
        enemy: EnemyId,
        /// Time the enemy stays chained.
        duration: Duration,
    },
    /// Removes an enemy from the player's chasing set.
    RemoveChaser {
        /// Enemy no longer chasing.
        enemy: EnemyId,
    },
}

/// Events broadcast by the world (and stateful systems) after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that new tunables were stored.
    TunablesApplied {
        /// Multipliers now in effect.
        tunables: Tunables,
    },
    /// Confirms that an enemy entered the roster.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Position the enemy spawned at.
        position: Vec3,
    },
    /// An enemy detected the player and began turning towards them.
    EnemyNoticed {
        /// Enemy that noticed the player.
        enemy: EnemyId,
    },
    /// An enemy finished noticing and started chasing.
    EnemyStartedChasing {
        /// Enemy now chasing.
        enemy: EnemyId,
    },
    /// An enemy moved to a new attack phase.
    EnemyAttackPhaseChanged {
        /// Attacking enemy.
        enemy: EnemyId,
        /// Phase entered.
        phase: AttackPhase,
    },
    /// An enemy completed an attack cycle.
    EnemyAttackEnded {
        /// Enemy that finished attacking.
        enemy: EnemyId,
    },
    /// An enemy lost health.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage taken.
        amount: f32,
        /// Health remaining after the hit.
        health: f32,
    },
    /// An enemy regained health from a heal burst.
    EnemyHealed {
        /// Enemy that was healed.
        enemy: EnemyId,
        /// Health restored.
        amount: f32,
    },
    /// An enemy's heal buff ran out.
    EnemyHealEnded {
        /// Enemy whose heal ended.
        enemy: EnemyId,
    },
    /// A debuff started on an enemy.
    DebuffApplied {
        /// Enemy that was debuffed.
        enemy: EnemyId,
        /// Stat affected.
        kind: DebuffKind,
    },
    /// A debuff expired on an enemy.
    DebuffExpired {
        /// Enemy whose debuff expired.
        enemy: EnemyId,
        /// Stat restored.
        kind: DebuffKind,
    },
    /// An enemy's level or leveling type changed.
    EnemyLevelChanged {
        /// Enemy that was leveled.
        enemy: EnemyId,
        /// New level.
        level: u32,
        /// Stat multiplied by the level.
        leveling: LevelingType,
    },
    /// An enemy's health dropped to zero.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
    },
    /// Two enemies merged; the absorbed one left the roster.
    EnemiesStacked {
        /// Enemy that survived and grew.
        survivor: EnemyId,
        /// Enemy that was absorbed and destroyed.
        absorbed: EnemyId,
    },
    /// An enemy joined the damage-sharing chain.
    EnemyChained {
        /// Enemy now chained.
        enemy: EnemyId,
        /// Nearest chain member the enemy is visually linked to.
        linked_to: Option<EnemyId>,
    },
    /// An enemy left the damage-sharing chain.
    EnemyUnchained {
        /// Enemy no longer chained.
        enemy: EnemyId,
    },
    /// The number of enemies chasing the player changed.
    ChasingSetChanged {
        /// Current size of the chasing set.
        count: usize,
    },
    /// The player's current damage multiplier changed.
    DamageMultiplierChanged {
        /// Current multiplier.
        multiplier: f32,
        /// Multiplier the current value is converging on.
        target: f32,
    },
    /// The player moved to a new attack phase.
    PlayerAttackPhaseChanged {
        /// Phase entered.
        phase: AttackPhase,
    },
    /// The player lost health.
    PlayerDamaged {
        /// Damage taken.
        amount: f32,
        /// Health remaining after the hit.
        health: f32,
    },
    /// The player regained health from a heal burst or a kill.
    PlayerHealed {
        /// Health restored.
        amount: f32,
    },
    /// The player's health dropped to zero.
    PlayerDied,
    /// The roster dropped to the few-enemies threshold.
    FewEnemiesRemaining {
        /// Enemies still alive.
        remaining: usize,
    },
    /// The last enemy left the roster.
    AllEnemiesDead,
    /// The crowd-control state changed.
    StackStateChanged {
        /// State entered.
        state: StackState,
    },
    /// Crowd pressure fell out of the hard-stack band.
    HardStackDeactivated,
}

/// Immutable representation of a chasing enemy used by crowd control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChaserSnapshot {
    /// Identifier of the chasing enemy.
    pub id: EnemyId,
    /// Current position.
    pub position: Vec3,
    /// Current level.
    pub level: u32,
}

/// Read-only snapshot of the player's chasing set in membership order.
#[derive(Clone, Debug, Default)]
pub struct ChaserView {
    snapshots: Vec<ChaserSnapshot>,
}

impl ChaserView {
    /// Creates a new chaser view preserving the provided membership order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ChaserSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured chasers in membership order.
    pub fn iter(&self) -> impl Iterator<Item = &ChaserSnapshot> {
        self.snapshots.iter()
    }

    /// Number of chasers captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemy is chasing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ChaserSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier assigned to the enemy.
    pub id: EnemyId,
    /// Current position.
    pub position: Vec3,
    /// Current facing.
    pub facing: Vec3,
    /// Remaining health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Live walk speed.
    pub walk_speed: f32,
    /// Live notice radius.
    pub notice_radius: f32,
    /// Live attack damage.
    pub attack_damage: f32,
    /// Current level.
    pub level: u32,
    /// Stat multiplied by the level.
    pub leveling: LevelingType,
    /// Movement awareness.
    pub move_phase: MovePhase,
    /// Attack progress.
    pub attack_phase: AttackPhase,
    /// Whether the enemy shares damage through the chain.
    pub chained: bool,
}

/// Read-only snapshot describing every enemy in the roster.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view sorted by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemies in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific enemy.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the roster was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current position.
    pub position: Vec3,
    /// Current facing.
    pub facing: Vec3,
    /// Remaining health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Accumulated score.
    pub score: f32,
    /// Live walk speed.
    pub walk_speed: f32,
    /// Current damage multiplier.
    pub damage_multiplier: f32,
    /// Damage multiplier the current value converges on.
    pub target_damage_multiplier: f32,
    /// Fraction of a killed enemy's maximum health restored on kill.
    pub vampirism: f32,
    /// Number of enemies chasing.
    pub chasing: usize,
    /// Movement state.
    pub movement: PlayerMovement,
    /// Attack progress.
    pub attack_phase: AttackPhase,
}

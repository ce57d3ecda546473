//! One-shot timers driven by the simulation clock.
//!
//! Timers carry a [`TimerKind`] payload instead of a callback. The world pops
//! due timers while advancing the clock and dispatches on the payload, which
//! keeps every state transition inside `apply`.

use std::{collections::BTreeMap, time::Duration};

use hypercube_core::{DebuffKind, EnemyId};

/// Token identifying an armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Retrieves the numeric representation of the token.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Transition performed when a timer fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// An enemy finishes noticing the player and starts chasing.
    Notice(EnemyId),
    /// An enemy advances to its next attack phase.
    EnemyAttackPhase(EnemyId),
    /// A debuff on an enemy expires.
    Debuff(EnemyId, DebuffKind),
    /// An enemy receives its next heal burst.
    EnemyHealBurst(EnemyId),
    /// An enemy leaves the damage-sharing chain.
    Chain(EnemyId),
    /// The player advances to the next attack phase.
    PlayerAttackPhase,
    /// The player's invulnerability window closes.
    PlayerInvincibility,
    /// The damage multiplier starts decaying towards its target.
    MultiplierStays,
    /// The player receives the next heal burst.
    PlayerHealBurst,
    /// The player's speed buff expires.
    PlayerSpeedBuff,
}

impl TimerKind {
    /// Enemy the timer belongs to, if any.
    #[must_use]
    pub const fn enemy(&self) -> Option<EnemyId> {
        match self {
            Self::Notice(enemy)
            | Self::EnemyAttackPhase(enemy)
            | Self::Debuff(enemy, _)
            | Self::EnemyHealBurst(enemy)
            | Self::Chain(enemy) => Some(*enemy),
            Self::PlayerAttackPhase
            | Self::PlayerInvincibility
            | Self::MultiplierStays
            | Self::PlayerHealBurst
            | Self::PlayerSpeedBuff => None,
        }
    }
}

/// Ordered collection of pending one-shot timers.
///
/// Timers fire in due-time order; timers due at the same instant fire in the
/// order they were armed.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), TimerKind>,
    due_by_id: BTreeMap<TimerId, Duration>,
}

impl Scheduler {
    /// Creates a scheduler with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Reports whether no timer is armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Arms a timer that fires `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        let _ = self.queue.insert((due, id), kind);
        let _ = self.due_by_id.insert(id, due);
        id
    }

    /// Disarms a timer. Returns `false` when it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.due_by_id.remove(&id) {
            Some(due) => self.queue.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Disarms every timer whose payload matches the predicate.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&TimerKind) -> bool) -> usize {
        let doomed: Vec<(Duration, TimerId)> = self
            .queue
            .iter()
            .filter(|(_, kind)| predicate(kind))
            .map(|(key, _)| *key)
            .collect();
        for key in &doomed {
            let _ = self.queue.remove(key);
            let _ = self.due_by_id.remove(&key.1);
        }
        doomed.len()
    }

    /// Reports whether the timer is still armed.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.due_by_id.contains_key(&id)
    }

    /// Removes the earliest timer due at or before `until`, moving the clock
    /// to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, TimerKind)> {
        let (&(due, id), _) = self.queue.first_key_value()?;
        if due > until {
            return None;
        }
        let kind = self.queue.remove(&(due, id))?;
        let _ = self.due_by_id.remove(&id);
        self.now = self.now.max(due);
        Some((id, kind))
    }

    /// Moves the clock forward to `until` once every due timer fired.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

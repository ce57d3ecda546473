#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Crowd-control system that merges chasing enemies when the crowd grows.
//!
//! The system tracks a [`StackState`] derived from the size of the player's
//! chasing set, with separate enter and leave thresholds so the state does
//! not flicker around a single count. On a fixed cadence it samples the
//! chasing set and answers with [`Command::StackEnemies`] pairs: one random
//! pair while soft stacking, and disjoint nearest-neighbour pairs over the
//! whole set the first time the hard band is reached. The first sample runs
//! as soon as time starts moving.

use std::time::Duration;

use glam::Vec3;
use hypercube_core::{ChaserSnapshot, ChaserView, Command, Event, StackState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

/// Thresholds and cadence of the crowd-control system.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chaser count above which soft stacking starts.
    pub soft_begin: usize,
    /// Chaser count below which stacking stops.
    pub soft_end: usize,
    /// Chaser count above which hard stacking starts.
    pub hard_begin: usize,
    /// Chaser count at or below which hard stacking falls back to soft.
    pub hard_end: usize,
    /// Cadence of the chasing-set sample.
    #[serde(with = "hypercube_core::serde_seconds")]
    pub query_interval: Duration,
    /// Seed of the generator choosing soft-stack candidates.
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            soft_begin: 35,
            soft_end: 30,
            hard_begin: 45,
            hard_end: 40,
            query_interval: Duration::from_secs(5),
            rng_seed: 0x5eed_c0de,
        }
    }
}

/// Stateful system that owns the stack state and its hard-stack latch.
#[derive(Debug)]
pub struct CrowdControl {
    config: Config,
    state: StackState,
    hard_stack_applied: bool,
    sampled: bool,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl CrowdControl {
    /// Creates a crowd-control system in the [`StackState::None`] state.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: StackState::None,
            hard_stack_applied: false,
            sampled: false,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Current stack state.
    #[must_use]
    pub const fn state(&self) -> StackState {
        self.state
    }

    /// Reports whether the hard stack already ran in the current hard band.
    #[must_use]
    pub const fn hard_stack_applied(&self) -> bool {
        self.hard_stack_applied
    }

    /// Consumes world events and the chasing set, emitting state events and
    /// stack commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        chasers: &ChaserView,
        out_events: &mut Vec<Event>,
        out_commands: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::ChasingSetChanged { count } => self.update_state(*count, out_events),
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                _ => {}
            }
        }

        if elapsed.is_zero() || self.config.query_interval.is_zero() {
            return;
        }
        let first = !self.sampled;
        self.sampled = true;
        self.accumulator = self.accumulator.saturating_add(elapsed);
        let due = self.accumulator >= self.config.query_interval;
        while self.accumulator >= self.config.query_interval {
            self.accumulator -= self.config.query_interval;
        }
        if first || due {
            self.query(chasers, out_commands);
        }
    }

    fn update_state(&mut self, count: usize, out_events: &mut Vec<Event>) {
        let config = &self.config;
        let next = if count < config.soft_end {
            StackState::None
        } else if (self.state == StackState::None
            && count > config.soft_begin
            && count < config.hard_begin)
            || (self.state == StackState::HardStack && count <= config.hard_end)
        {
            StackState::SoftStack
        } else if count > config.hard_begin {
            StackState::HardStack
        } else {
            self.state
        };

        if next == self.state {
            return;
        }
        let previous = self.state;
        self.state = next;
        log::debug!("stack state {previous:?} -> {next:?} at {count} chasers");
        out_events.push(Event::StackStateChanged { state: next });

        if previous == StackState::HardStack {
            self.hard_stack_applied = false;
            out_events.push(Event::HardStackDeactivated);
        }
    }

    fn query(&mut self, chasers: &ChaserView, out_commands: &mut Vec<Command>) {
        match self.state {
            StackState::None => {}
            StackState::SoftStack => self.soft_stack(chasers, out_commands),
            StackState::HardStack => {
                if self.hard_stack_applied {
                    return;
                }
                hard_stack(chasers, out_commands);
                self.hard_stack_applied = true;
            }
        }
    }

    fn soft_stack(&mut self, chasers: &ChaserView, out_commands: &mut Vec<Command>) {
        let candidates: Vec<ChaserSnapshot> = chasers.iter().copied().collect();
        if candidates.len() < 2 {
            return;
        }
        let picked = candidates[self.rng.gen_range(0..candidates.len())];
        let others = candidates.iter().filter(|other| other.id != picked.id);
        if let Some(nearest) = nearest(picked.position, others) {
            out_commands.push(Command::StackEnemies {
                first: picked.id,
                second: nearest.id,
            });
        }
    }
}

/// Pairs every chaser with its nearest unpaired neighbour, popping from the
/// back, until at most one chaser is left unpaired.
fn hard_stack(chasers: &ChaserView, out_commands: &mut Vec<Command>) {
    let mut remaining: Vec<ChaserSnapshot> = chasers.iter().copied().collect();
    log::info!("hard stacking {} chasers", remaining.len());

    while let Some(last) = remaining.pop() {
        let Some(index) = nearest_index(last.position, &remaining) else {
            break;
        };
        let partner = remaining.remove(index);
        out_commands.push(Command::StackEnemies {
            first: last.id,
            second: partner.id,
        });
    }
}

fn nearest<'a>(
    origin: Vec3,
    candidates: impl Iterator<Item = &'a ChaserSnapshot>,
) -> Option<&'a ChaserSnapshot> {
    let mut best: Option<(&ChaserSnapshot, f32)> = None;
    for candidate in candidates {
        let distance = candidate.position.distance(origin);
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}

fn nearest_index(origin: Vec3, candidates: &[ChaserSnapshot]) -> Option<usize> {
    let found = nearest(origin, candidates.iter())?;
    candidates
        .iter()
        .position(|candidate| candidate.id == found.id)
}

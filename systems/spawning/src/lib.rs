#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for populating a level.

use hypercube_core::{Command, Event, LevelingType, SpawnPoint};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided shuffle seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that fills a level once the difficulty tunables are applied.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the level's spawn points to emit spawn commands.
    ///
    /// Each [`Event::TunablesApplied`] spawns a shuffled subset of the points
    /// sized by the enemy count fraction.
    pub fn handle(
        &mut self,
        events: &[Event],
        spawn_points: &[SpawnPoint],
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::TunablesApplied { tunables } = event {
                self.populate(spawn_points, tunables.enemy_count_fraction, out);
            }
        }
    }

    fn populate(&mut self, spawn_points: &[SpawnPoint], fraction: f32, out: &mut Vec<Command>) {
        let count = spawn_count(spawn_points.len(), fraction);
        let mut shuffled = spawn_points.to_vec();
        shuffled.shuffle(&mut self.rng);
        log::info!(
            "spawning {count} of {} enemies (fraction {fraction})",
            spawn_points.len()
        );

        out.extend(shuffled.into_iter().take(count).map(|spawn| {
            Command::SpawnEnemy {
                spawn,
                level: 0,
                leveling: LevelingType::None,
            }
        }));
    }
}

/// Number of enemies spawned from `available` points: `ceil(available × fraction)`
/// capped at `available`.
#[must_use]
pub fn spawn_count(available: usize, fraction: f32) -> usize {
    if !(fraction > 0.0) {
        return 0;
    }
    let wanted = (available as f32 * fraction).ceil() as usize;
    wanted.min(available)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_rounds_up_and_caps() {
        assert_eq!(spawn_count(10, 0.25), 3);
        assert_eq!(spawn_count(10, 1.0), 10);
        assert_eq!(spawn_count(10, 1.4), 10);
        assert_eq!(spawn_count(7, 0.01), 1);
    }

    #[test]
    fn degenerate_fractions_spawn_nothing() {
        assert_eq!(spawn_count(10, 0.0), 0);
        assert_eq!(spawn_count(10, -0.5), 0);
        assert_eq!(spawn_count(10, f32::NAN), 0);
        assert_eq!(spawn_count(0, 0.5), 0);
    }
}

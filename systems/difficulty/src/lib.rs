#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adaptive difficulty resolver.
//!
//! The resolver condenses the run history into a single difficulty parameter
//! in `[0, 1]` and maps that parameter onto the concrete [`Tunables`] applied
//! to the player and to every spawned enemy. Three metrics of the history feed
//! the parameter: the number of deaths since the last win, the size of the
//! chasing crowd when the last attempt ended, and how long the last attempt
//! lasted. Each metric is scored through an interpolation table and weighted
//! by a cost; the costs are expected to sum to one.

use hypercube_core::{format, RunRecord, Tunables};
use hypercube_system_interpolation::{tunable_from, InterpolationTable, TableError};
use serde::Deserialize;
use thiserror::Error;

/// Parameter used when no run has been recorded yet.
pub const NEUTRAL_PARAMETER: f32 = 0.5;

const COST_SUM_TOLERANCE: f32 = 1e-4;

/// A history metric scored through a table and weighted by a cost.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WeightedMetric<K> {
    /// Table converting the raw metric into a score.
    #[serde(flatten)]
    pub table: InterpolationTable<K, f32>,
    /// Weight of the score in the final parameter.
    pub cost: f32,
}

impl<K> WeightedMetric<K> {
    /// Creates a weighted metric from bounds, scores and a cost.
    #[must_use]
    pub fn new(bounds: Vec<K>, scores: Vec<f32>, cost: f32) -> Self {
        Self {
            table: InterpolationTable::new(bounds, scores),
            cost,
        }
    }
}

/// Tables driving the difficulty resolver.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Deaths since the most recent win.
    pub death_count: WeightedMetric<u32>,
    /// Chasing enemies when the most recent attempt ended.
    pub chasers_at_death: WeightedMetric<u32>,
    /// Seconds the most recent attempt lasted.
    pub play_time: WeightedMetric<f32>,
    /// Ascending difficulty bounds shared by every tunable table.
    pub parameter_bounds: Vec<f32>,
    /// Player walk speed multipliers.
    pub player_speed: Vec<f32>,
    /// Player damage multiplier growth multipliers.
    pub player_damage_multiplier_cost: Vec<f32>,
    /// Fractions of a killed enemy's health restored to the player.
    pub player_vampirism: Vec<f32>,
    /// Enemy walk speed multipliers.
    pub enemy_speed: Vec<f32>,
    /// Enemy attack damage multipliers.
    pub enemy_damage: Vec<f32>,
    /// Enemy notice radius multipliers.
    pub enemy_notice_radius: Vec<f32>,
    /// Fractions of spawn points that produce an enemy.
    pub enemy_count_fraction: Vec<f32>,
    /// Per-level stat growth of enemy leveling.
    pub enemy_leveling_fraction: Vec<f32>,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            death_count: WeightedMetric::new(vec![1, 3, 5, 10], vec![1.0, 0.7, 0.5, 0.3], 0.4),
            chasers_at_death: WeightedMetric::new(
                vec![20, 15, 10, 5],
                vec![1.0, 0.7, 0.5, 0.3],
                0.4,
            ),
            play_time: WeightedMetric::new(vec![600.0, 300.0, 60.0], vec![0.7, 0.5, 0.3], 0.2),
            parameter_bounds: vec![0.0, 0.15, 0.35, 0.5, 0.65, 0.85, 1.0],
            player_speed: vec![1.1, 1.0, 1.0, 1.0, 1.0, 0.9, 0.9],
            player_damage_multiplier_cost: vec![1.5, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5],
            player_vampirism: vec![0.05, 0.02, 0.02, 0.02, 0.0, 0.0, 0.0],
            enemy_speed: vec![0.8, 0.8, 0.8, 1.0, 1.0, 1.0, 1.2],
            enemy_damage: vec![0.5, 1.0, 1.0, 1.0, 1.0, 1.5, 1.5],
            enemy_notice_radius: vec![0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.5],
            enemy_count_fraction: vec![0.3, 0.3, 0.7, 0.7, 1.0, 1.0, 1.0],
            enemy_leveling_fraction: vec![0.35, 0.35, 0.35, 0.5, 0.5, 0.65, 0.65],
        }
    }
}

/// Problems detected in a [`DifficultyConfig`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A table cannot be used for lookups.
    #[error("{name} table is invalid: {source}")]
    Table {
        /// Name of the offending table.
        name: &'static str,
        /// Underlying table problem.
        #[source]
        source: TableError,
    },
    /// The metric costs do not sum to one.
    #[error("sum of input parameter costs must be 1, found {sum}")]
    CostSum {
        /// Actual sum of the three costs.
        sum: f32,
    },
}

impl DifficultyConfig {
    /// Sum of the three metric costs.
    #[must_use]
    pub fn cost_sum(&self) -> f32 {
        self.death_count.cost + self.chasers_at_death.cost + self.play_time.cost
    }

    /// Checks every table and the cost invariant, reporting the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let table = |name, result: Result<(), TableError>| {
            result.map_err(|source| ConfigError::Table { name, source })
        };

        table("death count", self.death_count.table.validate())?;
        table("chasers at death", self.chasers_at_death.table.validate())?;
        table("play time", self.play_time.table.validate())?;

        for (name, values) in self.tunable_tables() {
            let lookup = InterpolationTable::new(self.parameter_bounds.clone(), values.to_vec());
            table(name, lookup.validate_tunable())?;
        }

        let sum = self.cost_sum();
        if (sum - 1.0).abs() > COST_SUM_TOLERANCE {
            return Err(ConfigError::CostSum { sum });
        }
        Ok(())
    }

    fn tunable_tables(&self) -> [(&'static str, &[f32]); 8] {
        [
            ("player speed", self.player_speed.as_slice()),
            ("player damage multiplier cost", self.player_damage_multiplier_cost.as_slice()),
            ("player vampirism", self.player_vampirism.as_slice()),
            ("enemy speed", self.enemy_speed.as_slice()),
            ("enemy damage", self.enemy_damage.as_slice()),
            ("enemy notice radius", self.enemy_notice_radius.as_slice()),
            ("enemy count fraction", self.enemy_count_fraction.as_slice()),
            ("enemy leveling fraction", self.enemy_leveling_fraction.as_slice()),
        ]
    }
}

/// Raw history metrics the parameter is computed from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyInputs {
    /// Attempts recorded after the most recent win.
    pub death_count: u32,
    /// Chasers when the most recent attempt ended.
    pub chasers_at_death: u32,
    /// Seconds the most recent attempt lasted.
    pub play_time_secs: f32,
    /// Whether the most recent attempt was won.
    pub last_won: bool,
}

impl DifficultyInputs {
    /// Extracts the metrics from a history, or `None` when it is empty.
    #[must_use]
    pub fn from_history(history: &[RunRecord]) -> Option<Self> {
        let last = history.last()?;
        let death_count = history
            .iter()
            .rev()
            .take_while(|record| !record.won)
            .count();

        Some(Self {
            death_count: u32::try_from(death_count).unwrap_or(u32::MAX),
            chasers_at_death: last.chasers_at_death,
            play_time_secs: last.play_time_secs,
            last_won: last.won,
        })
    }
}

/// Weighted contribution of each metric to the parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyTerms {
    /// Weighted death count score.
    pub death_count: f32,
    /// Weighted chasers-at-death score.
    pub chasing: f32,
    /// Weighted play time score.
    pub play_time: f32,
}

impl DifficultyTerms {
    /// Difficulty parameter formed by the terms.
    #[must_use]
    pub fn parameter(&self) -> f32 {
        self.death_count + self.chasing + self.play_time
    }
}

/// Converts run history into a difficulty parameter and tunables.
#[derive(Clone, Debug, Default)]
pub struct DifficultyResolver {
    config: DifficultyConfig,
}

impl DifficultyResolver {
    /// Creates a resolver backed by the provided tables.
    #[must_use]
    pub fn new(config: DifficultyConfig) -> Self {
        Self { config }
    }

    /// Tables the resolver uses.
    #[must_use]
    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    /// Scores the inputs, forcing the chasing and play time scores to one
    /// after a win.
    #[must_use]
    pub fn terms(&self, inputs: &DifficultyInputs) -> DifficultyTerms {
        let config = &self.config;
        let death_count = config.death_count.table.score(inputs.death_count);
        let (chasing, play_time) = if inputs.last_won {
            (1.0, 1.0)
        } else {
            (
                config.chasers_at_death.table.score(inputs.chasers_at_death),
                config.play_time.table.score(inputs.play_time_secs),
            )
        };

        DifficultyTerms {
            death_count: death_count * config.death_count.cost,
            chasing: chasing * config.chasers_at_death.cost,
            play_time: play_time * config.play_time.cost,
        }
    }

    /// Computes the difficulty parameter for the next attempt.
    #[must_use]
    pub fn parameter(&self, history: &[RunRecord]) -> f32 {
        let sum = self.config.cost_sum();
        if (sum - 1.0).abs() > COST_SUM_TOLERANCE {
            log::error!("sum of input parameter costs must be equal to 1, found {sum}");
        }

        let Some(inputs) = DifficultyInputs::from_history(history) else {
            return NEUTRAL_PARAMETER;
        };
        let terms = self.terms(&inputs);
        log::debug!(
            "difficulty inputs: deaths {}, chasers {}, play time {:.1}s",
            inputs.death_count,
            inputs.chasers_at_death,
            inputs.play_time_secs
        );
        log::debug!(
            "difficulty terms: {:.3}, {:.3}, {:.3}",
            terms.death_count,
            terms.chasing,
            terms.play_time
        );
        terms.parameter()
    }

    /// Maps a difficulty parameter onto the tunables it selects.
    #[must_use]
    pub fn tunables(&self, parameter: f32) -> Tunables {
        let config = &self.config;
        let lookup = |values: &[f32]| tunable_from(parameter, &config.parameter_bounds, values);

        Tunables {
            player_speed: lookup(&config.player_speed),
            player_damage_multiplier_cost: lookup(&config.player_damage_multiplier_cost),
            player_vampirism: lookup(&config.player_vampirism),
            enemy_speed: lookup(&config.enemy_speed),
            enemy_damage: lookup(&config.enemy_damage),
            enemy_notice_radius: lookup(&config.enemy_notice_radius),
            enemy_count_fraction: lookup(&config.enemy_count_fraction),
            enemy_leveling_fraction: lookup(&config.enemy_leveling_fraction),
        }
    }

    /// Renders a human-readable summary of what the parameter selects.
    #[must_use]
    pub fn brief(&self, parameter: f32) -> String {
        let tunables = self.tunables(parameter);
        let percent = |value: f32| (value * 100.0).round() as i32;

        let mut brief = format!("Difficulty parameter: {}", format::decimal(parameter));
        brief.push_str("\n\n\nPlayer stats:\n\n");
        brief.push_str(&format!("Speed: x{}", format::decimal(tunables.player_speed)));
        brief.push_str(&format!(
            "\nDamage stats growing speed: x{}",
            format::decimal(tunables.player_damage_multiplier_cost)
        ));
        brief.push_str(&format!(
            "\nVampirism: {}%",
            percent(tunables.player_vampirism)
        ));
        brief.push_str("\n\n\nEnemy stats:\n\n");
        brief.push_str(&format!("Speed: x{}", format::decimal(tunables.enemy_speed)));
        brief.push_str(&format!("\nDamage: x{}", format::decimal(tunables.enemy_damage)));
        brief.push_str(&format!(
            "\nNotice radius: x{}",
            format::decimal(tunables.enemy_notice_radius)
        ));
        brief.push_str(&format!(
            "\nEnemy Count: {}%",
            percent(tunables.enemy_count_fraction)
        ));
        brief.push_str(&format!(
            "\nEnemy Leveling: {}%",
            percent(tunables.enemy_leveling_fraction)
        ));
        brief
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_validate() {
        assert_eq!(DifficultyConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validation_flags_cost_sum() {
        let mut config = DifficultyConfig::default();
        config.play_time.cost = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CostSum { .. })
        ));
    }

    #[test]
    fn validation_names_the_broken_table() {
        let mut config = DifficultyConfig::default();
        let _ = config.enemy_damage.pop();
        assert_eq!(
            config.validate(),
            Err(ConfigError::Table {
                name: "enemy damage",
                source: TableError::LengthMismatch {
                    bounds: 7,
                    values: 6
                },
            })
        );
    }

    #[test]
    fn death_count_spans_every_record_without_a_win() {
        let record = |won| RunRecord {
            won,
            score: 0.0,
            enemies_killed_fraction: 0.0,
            total_enemies: 0,
            max_damage_multiplier: 1.0,
            damage_multiplier_at_death: 1.0,
            chasers_at_death: 0,
            play_time_secs: 0.0,
            difficulty_parameter: 0.5,
            level_index: 0,
        };

        let lost = [record(false), record(false), record(false)];
        let inputs = DifficultyInputs::from_history(&lost).expect("history is not empty");
        assert_eq!(inputs.death_count, 3);

        let recovered = [record(false), record(true), record(false)];
        let inputs = DifficultyInputs::from_history(&recovered).expect("history is not empty");
        assert_eq!(inputs.death_count, 1);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level orchestration: difficulty on entry, bookkeeping during play and the
//! run record plus level transition once the attempt ends.

use std::time::Duration;

use hypercube_core::{
    serde_seconds, Command, EnemyView, Event, MovePhase, PlayerSnapshot, RunRecord, Tunables,
};
use hypercube_system_difficulty::DifficultyResolver;
use hypercube_system_run_history::{RunHistoryStore, Scoreboard};
use serde::Deserialize;

/// Level list and transition timing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Delay between the end of an attempt and the level request.
    #[serde(with = "serde_seconds")]
    pub after_level_delay: Duration,
    /// Map names in play order.
    pub level_names: Vec<String>,
    /// Titles shown for each map on the scoreboard.
    pub level_titles: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|name| (*name).to_owned()).collect();
        Self {
            after_level_delay: Duration::from_secs(5),
            level_names: owned(&["training", "level_1_upd", "level_2", "level_3"]),
            level_titles: owned(&["Tutorial", "Level1", "Level2", "Level3"]),
        }
    }
}

/// Level the host should open next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelRequest {
    /// Index into the configured level list.
    pub index: usize,
    /// Map name at that index.
    pub name: String,
}

/// Resolves a map name to its index in the level list, `-1` when unknown.
#[must_use]
pub fn level_index(level_names: &[String], map_name: &str) -> i32 {
    level_names
        .iter()
        .position(|name| name == map_name)
        .and_then(|index| i32::try_from(index).ok())
        .unwrap_or(-1)
}

#[derive(Debug)]
struct Transition {
    remaining: Duration,
    won: bool,
}

/// Drives one level attempt from difficulty resolution to the run record.
#[derive(Debug)]
pub struct LevelController {
    config: Config,
    level_index: i32,
    history: Vec<RunRecord>,
    difficulty_parameter: f32,
    tunables: Tunables,
    play_time: Duration,
    begin_count: u32,
    removed: u32,
    max_damage_multiplier: f32,
    outcome: Option<RunRecord>,
    transition: Option<Transition>,
    request: Option<LevelRequest>,
}

impl LevelController {
    /// Creates a controller for the named map.
    #[must_use]
    pub fn new(config: Config, map_name: &str) -> Self {
        let level_index = level_index(&config.level_names, map_name);
        if level_index < 0 {
            log::error!("invalid map {map_name}");
        }
        Self {
            config,
            level_index,
            history: Vec::new(),
            difficulty_parameter: hypercube_system_difficulty::NEUTRAL_PARAMETER,
            tunables: Tunables::default(),
            play_time: Duration::ZERO,
            begin_count: 0,
            removed: 0,
            max_damage_multiplier: 1.0,
            outcome: None,
            transition: None,
            request: None,
        }
    }

    /// Loads the saved history, treating missing or unreadable slots as a
    /// first run.
    #[must_use]
    pub fn load_history(store: &dyn RunHistoryStore) -> Vec<RunRecord> {
        match store.load() {
            Ok(Some(history)) => history,
            Ok(None) => {
                log::info!("no run history to load");
                Vec::new()
            }
            Err(error) => {
                log::error!("failed to load run history: {error}");
                Vec::new()
            }
        }
    }

    /// Resolves the difficulty from the history and emits the tunables.
    pub fn begin(
        &mut self,
        history: Vec<RunRecord>,
        resolver: &DifficultyResolver,
        out: &mut Vec<Command>,
    ) -> Tunables {
        self.history = history;
        self.difficulty_parameter = resolver.parameter(&self.history);
        self.tunables = resolver.tunables(self.difficulty_parameter);
        log::info!(
            "level {} begins at difficulty {:.3} after {} attempts",
            self.level_index,
            self.difficulty_parameter,
            self.history.len()
        );
        out.push(Command::ApplyTunables {
            tunables: self.tunables,
        });
        self.tunables
    }

    /// Consumes world events, issuing escalation commands and recording the
    /// attempt once it ends.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        store: &mut dyn RunHistoryStore,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.advance(*dt),
                Event::EnemySpawned { .. } if self.outcome.is_none() => self.begin_count += 1,
                Event::EnemyDied { .. } | Event::EnemiesStacked { .. } => self.removed += 1,
                Event::DamageMultiplierChanged { multiplier, .. } => {
                    self.max_damage_multiplier = self.max_damage_multiplier.max(*multiplier);
                }
                Event::FewEnemiesRemaining { remaining } => {
                    log::info!("few enemies remaining: {remaining}");
                    out.extend(
                        enemies
                            .iter()
                            .filter(|enemy| enemy.move_phase == MovePhase::None)
                            .map(|enemy| Command::NoticePlayer { enemy: enemy.id }),
                    );
                }
                Event::PlayerDied => self.finish(false, player, store),
                Event::AllEnemiesDead => self.finish(true, player, store),
                _ => {}
            }
        }
    }

    fn advance(&mut self, dt: Duration) {
        let Some(transition) = self.transition.as_mut() else {
            self.play_time = self.play_time.saturating_add(dt);
            return;
        };
        transition.remaining = transition.remaining.saturating_sub(dt);
        if !transition.remaining.is_zero() {
            return;
        }
        let won = transition.won;
        self.transition = None;
        self.request = self.next_level(won);
    }

    fn finish(&mut self, won: bool, player: &PlayerSnapshot, store: &mut dyn RunHistoryStore) {
        if self.outcome.is_some() {
            return;
        }
        self.max_damage_multiplier = self.max_damage_multiplier.max(player.damage_multiplier);
        let enemies_killed_fraction = if self.begin_count == 0 {
            0.0
        } else {
            self.removed as f32 / self.begin_count as f32
        };
        let record = RunRecord {
            won,
            score: player.score,
            enemies_killed_fraction,
            total_enemies: self.begin_count,
            max_damage_multiplier: self.max_damage_multiplier,
            damage_multiplier_at_death: player.damage_multiplier,
            chasers_at_death: u32::try_from(player.chasing).unwrap_or(u32::MAX),
            play_time_secs: self.play_time.as_secs_f32(),
            difficulty_parameter: self.difficulty_parameter,
            level_index: self.level_index,
        };
        log::info!(
            "level {} {} with score {} after {:.1}s",
            self.level_index,
            if won { "won" } else { "lost" },
            record.score,
            record.play_time_secs
        );

        self.history.push(record.clone());
        if let Err(error) = store.save(&self.history) {
            log::error!("failed to save run history: {error}");
        }
        self.outcome = Some(record);
        self.transition = Some(Transition {
            remaining: self.config.after_level_delay,
            won,
        });
        if self.config.after_level_delay.is_zero() {
            self.advance(Duration::ZERO);
        }
    }

    fn next_level(&self, won: bool) -> Option<LevelRequest> {
        let count = self.config.level_names.len();
        if count == 0 {
            log::error!("no levels configured");
            return None;
        }
        let current = usize::try_from(self.level_index).ok();
        let index = match (won, current) {
            (true, Some(current)) => (current + 1) % count,
            (true, None) | (false, None) => 0,
            (false, Some(current)) => current.min(count - 1),
        };
        Some(LevelRequest {
            index,
            name: self.config.level_names[index].clone(),
        })
    }

    /// Index of the current level, `-1` when the map is unknown.
    #[must_use]
    pub const fn level_index(&self) -> i32 {
        self.level_index
    }

    /// Difficulty parameter resolved on entry.
    #[must_use]
    pub const fn difficulty_parameter(&self) -> f32 {
        self.difficulty_parameter
    }

    /// Tunables resolved on entry.
    #[must_use]
    pub const fn tunables(&self) -> Tunables {
        self.tunables
    }

    /// Run history including the current attempt once it ended.
    #[must_use]
    pub fn history(&self) -> &[RunRecord] {
        &self.history
    }

    /// Time spent playing the current attempt.
    #[must_use]
    pub const fn play_time(&self) -> Duration {
        self.play_time
    }

    /// Record of the current attempt once it ended.
    #[must_use]
    pub fn outcome(&self) -> Option<&RunRecord> {
        self.outcome.as_ref()
    }

    /// Takes the level request raised after the post-level delay.
    pub fn take_request(&mut self) -> Option<LevelRequest> {
        self.request.take()
    }

    /// Scoreboard over the history using the configured level titles.
    #[must_use]
    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard::from_history(&self.history, self.config.level_titles.clone())
    }
}

//! Scoreboard derived from the run history.

use std::fmt::Write as _;

use hypercube_core::{format, RunRecord};

/// Name shown for runs on a level outside the configured list.
pub const UNKNOWN_LEVEL: &str = "????";

const TABLE_HEADER: &str = "Scoreboard:\n\n      Level        Difficulty    Score\n";
const LEVEL_COLUMN_WIDTH: usize = 12;

/// Scoreboard line taken from one scoring run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreEntry {
    /// Score reached.
    pub score: f32,
    /// Difficulty parameter the run was played at.
    pub difficulty: f32,
    /// Index of the level played, `-1` when unknown.
    pub level_index: i32,
}

/// Scoring runs ordered from best to worst.
#[derive(Clone, Debug, Default)]
pub struct Scoreboard {
    entries: Vec<ScoreEntry>,
    level_titles: Vec<String>,
}

impl Scoreboard {
    /// Builds the scoreboard from every run that scored, best first.
    ///
    /// Runs with equal scores keep their history order.
    #[must_use]
    pub fn from_history(records: &[RunRecord], level_titles: Vec<String>) -> Self {
        let mut entries: Vec<ScoreEntry> = records
            .iter()
            .filter(|record| record.score > 0.0)
            .map(|record| ScoreEntry {
                score: record.score,
                difficulty: record.difficulty_parameter,
                level_index: record.level_index,
            })
            .collect();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self {
            entries,
            level_titles,
        }
    }

    /// Entries from best to worst.
    #[must_use]
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Reports whether no run scored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display title of a level index.
    #[must_use]
    pub fn level_title(&self, index: i32) -> &str {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.level_titles.get(index))
            .map_or(UNKNOWN_LEVEL, String::as_str)
    }

    fn top(&self, count: usize) -> &[ScoreEntry] {
        &self.entries[..count.min(self.entries.len())]
    }

    /// Renders the best `count` runs as an aligned text table.
    ///
    /// Returns an empty string when no run scored.
    #[must_use]
    pub fn table(&self, count: usize) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let mut table = String::from(TABLE_HEADER);
        for (rank, entry) in (1..).zip(self.top(count)) {
            let separator = if rank < 10 { ".  " } else { ". " };
            let difficulty = format::decimal(entry.difficulty);
            let gap = if difficulty.len() < 3 { 20 } else { 13 };
            let _ = writeln!(
                table,
                "{rank}{separator}{title:<width$}{difficulty}{spaces}{score}",
                title = self.level_title(entry.level_index),
                width = LEVEL_COLUMN_WIDTH,
                spaces = " ".repeat(gap),
                score = rounded(entry.score),
            );
        }
        table
    }

    /// Rank numbers of the best `count` runs, one per line.
    #[must_use]
    pub fn enumeration(&self, count: usize) -> String {
        let mut column = String::new();
        for rank in 1..=self.top(count).len() {
            let _ = writeln!(column, "{rank}");
        }
        column
    }

    /// Level column of the best `count` runs.
    #[must_use]
    pub fn levels(&self, count: usize) -> String {
        self.column("Level", count, |entry| {
            self.level_title(entry.level_index).to_owned()
        })
    }

    /// Score column of the best `count` runs.
    #[must_use]
    pub fn scores(&self, count: usize) -> String {
        self.column("Score", count, |entry| rounded(entry.score).to_string())
    }

    /// Difficulty column of the best `count` runs.
    #[must_use]
    pub fn difficulties(&self, count: usize) -> String {
        self.column("Difficulty", count, |entry| format::decimal(entry.difficulty))
    }

    fn column(&self, title: &str, count: usize, cell: impl Fn(&ScoreEntry) -> String) -> String {
        let mut column = format!("{title}\n\n");
        for entry in self.top(count) {
            let _ = writeln!(column, "{}", cell(entry));
        }
        column
    }
}

fn rounded(score: f32) -> i64 {
    score.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_levels_use_placeholder() {
        let board = Scoreboard::from_history(&[], vec!["Tutorial".to_owned()]);
        assert_eq!(board.level_title(0), "Tutorial");
        assert_eq!(board.level_title(1), UNKNOWN_LEVEL);
        assert_eq!(board.level_title(-1), UNKNOWN_LEVEL);
    }

    #[test]
    fn scores_round_half_away_from_zero() {
        assert_eq!(rounded(12.5), 13);
        assert_eq!(rounded(12.49), 12);
    }
}

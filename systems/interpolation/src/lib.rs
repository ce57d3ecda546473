#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Piecewise-constant table lookups shared by the difficulty pipeline.
//!
//! Two lookups are provided. [`score_from`] turns a raw historical metric into
//! a normalized sub-score by finding the first bound the metric has not yet
//! crossed. [`tunable_from`] maps the scalar difficulty parameter onto a
//! concrete gameplay value by finding the first bound strictly above it.
//!
//! Malformed tables never panic: the problem is reported through `log::error!`
//! and a neutral fallback is returned.

use serde::Deserialize;
use thiserror::Error;

/// Score returned by [`score_from`] when its tables are malformed.
pub const FALLBACK_SCORE: f32 = 0.5;

/// Direction of a sequence, judged the way table authors write them.
///
/// The direction is fixed by comparing the first and last element; adjacent
/// elements may be equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Monotonicity {
    /// Non-decreasing from first to last element.
    Ascending,
    /// Non-increasing from first to last element.
    Descending,
    /// Neither direction holds.
    NotMonotone,
}

impl Monotonicity {
    /// Classifies the provided sequence. Sequences shorter than two elements
    /// count as ascending.
    #[must_use]
    pub fn of<T: PartialOrd>(values: &[T]) -> Self {
        let (Some(first), Some(last)) = (values.first(), values.last()) else {
            return Self::Ascending;
        };
        if values.len() < 2 {
            return Self::Ascending;
        }

        let ascending = first < last;
        let ordered = values.windows(2).all(|pair| {
            if ascending {
                pair[0] <= pair[1]
            } else {
                pair[0] >= pair[1]
            }
        });

        match (ordered, ascending) {
            (false, _) => Self::NotMonotone,
            (true, true) => Self::Ascending,
            (true, false) => Self::Descending,
        }
    }

    /// Reports whether the sequence is ordered in either direction.
    #[must_use]
    pub const fn is_monotone(self) -> bool {
        !matches!(self, Self::NotMonotone)
    }
}

/// Reasons an interpolation table cannot be used for lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TableError {
    /// The table has no entries.
    #[error("interpolation table is empty")]
    Empty,
    /// Bounds and values differ in length.
    #[error("bounds array has {bounds} entries but values array has {values}")]
    LengthMismatch {
        /// Number of bounds.
        bounds: usize,
        /// Number of values.
        values: usize,
    },
    /// Bounds are not ordered in either direction.
    #[error("bounds array must be monotone")]
    BoundsNotMonotone,
    /// Values are not ordered in either direction.
    #[error("values array must be monotone")]
    ValuesNotMonotone,
    /// Tunable lookups require ascending bounds.
    #[error("bounds array must ascend")]
    BoundsNotAscending,
}

fn check_lengths(bounds: usize, values: usize) -> Result<(), TableError> {
    if bounds != values {
        return Err(TableError::LengthMismatch { bounds, values });
    }
    if bounds == 0 {
        return Err(TableError::Empty);
    }
    Ok(())
}

fn validate_score_table<K: PartialOrd>(bounds: &[K], scores: &[f32]) -> Result<(), TableError> {
    check_lengths(bounds.len(), scores.len())?;
    if !Monotonicity::of(bounds).is_monotone() {
        return Err(TableError::BoundsNotMonotone);
    }
    if !Monotonicity::of(scores).is_monotone() {
        return Err(TableError::ValuesNotMonotone);
    }
    Ok(())
}

fn validate_tunable_table<T>(bounds: &[f32], tunables: &[T]) -> Result<(), TableError> {
    check_lengths(bounds.len(), tunables.len())?;
    if Monotonicity::of(bounds) != Monotonicity::Ascending {
        return Err(TableError::BoundsNotAscending);
    }
    Ok(())
}

/// Converts a raw metric into a normalized score.
///
/// Returns the score paired with the first bound that `value` has not yet
/// crossed in the bounds' direction (`value < bound` for ascending bounds,
/// `value > bound` for descending ones). When every bound was crossed the
/// result is `1.0` for ascending scores and `0.0` otherwise.
///
/// Malformed tables are logged and yield [`FALLBACK_SCORE`].
#[must_use]
pub fn score_from<K: PartialOrd + Copy>(value: K, bounds: &[K], scores: &[f32]) -> f32 {
    if let Err(error) = validate_score_table(bounds, scores) {
        log::error!("adaptive difficulty: {error}");
        return FALLBACK_SCORE;
    }
    if let [single] = scores {
        return *single;
    }

    let bounds_ascending = Monotonicity::of(bounds) == Monotonicity::Ascending;
    for (bound, score) in bounds.iter().zip(scores) {
        let not_crossed = if bounds_ascending {
            value < *bound
        } else {
            value > *bound
        };
        if not_crossed {
            return *score;
        }
    }

    if Monotonicity::of(scores) == Monotonicity::Ascending {
        1.0
    } else {
        0.0
    }
}

/// Maps a difficulty parameter onto a gameplay value.
///
/// Returns `tunables[i - 1]` for the first `i >= 1` with
/// `difficulty < bounds[i]`, or the last tunable when no bound exceeds the
/// difficulty. Bounds must ascend.
///
/// Malformed tables are logged and yield `T::default()`.
#[must_use]
pub fn tunable_from<T: Clone + Default>(difficulty: f32, bounds: &[f32], tunables: &[T]) -> T {
    if let Err(error) = validate_tunable_table(bounds, tunables) {
        log::error!("adaptive difficulty: {error}");
        return T::default();
    }

    bounds
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, bound)| difficulty < **bound)
        .map(|(index, _)| tunables[index - 1].clone())
        .or_else(|| tunables.last().cloned())
        .unwrap_or_default()
}

/// Paired bounds and values loaded from configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InterpolationTable<K, V> {
    bounds: Vec<K>,
    values: Vec<V>,
}

impl<K, V> InterpolationTable<K, V> {
    /// Creates a table from paired sequences without validating them.
    #[must_use]
    pub fn new(bounds: Vec<K>, values: Vec<V>) -> Self {
        Self { bounds, values }
    }

    /// Bounds of the table.
    #[must_use]
    pub fn bounds(&self) -> &[K] {
        &self.bounds
    }

    /// Values of the table.
    #[must_use]
    pub fn values(&self) -> &[V] {
        &self.values
    }
}

impl<K: PartialOrd + Copy> InterpolationTable<K, f32> {
    /// Converts a raw metric into a normalized score using [`score_from`].
    #[must_use]
    pub fn score(&self, value: K) -> f32 {
        score_from(value, &self.bounds, &self.values)
    }

    /// Checks that the table is usable for score lookups.
    pub fn validate(&self) -> Result<(), TableError> {
        validate_score_table(&self.bounds, &self.values)
    }
}

impl<V: Clone + Default> InterpolationTable<f32, V> {
    /// Maps a difficulty parameter onto a value using [`tunable_from`].
    #[must_use]
    pub fn tunable(&self, difficulty: f32) -> V {
        tunable_from(difficulty, &self.bounds, &self.values)
    }

    /// Checks that the table is usable for tunable lookups.
    pub fn validate_tunable(&self) -> Result<(), TableError> {
        validate_tunable_table(&self.bounds, &self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonicity_tolerates_plateaus() {
        assert_eq!(Monotonicity::of(&[1.1, 1.0, 1.0, 0.9]), Monotonicity::Descending);
        assert_eq!(Monotonicity::of(&[0.3, 0.3, 0.7, 1.0]), Monotonicity::Ascending);
        assert_eq!(Monotonicity::of(&[1.5, 1.0, 1.0, 1.5]), Monotonicity::NotMonotone);
    }

    #[test]
    fn short_sequences_count_as_ascending() {
        assert_eq!(Monotonicity::of::<f32>(&[]), Monotonicity::Ascending);
        assert_eq!(Monotonicity::of(&[4]), Monotonicity::Ascending);
    }

    #[test]
    fn flat_sequences_are_monotone() {
        assert_eq!(Monotonicity::of(&[1.0, 1.0, 1.0]), Monotonicity::Descending);
        assert!(Monotonicity::of(&[1.0, 1.0, 1.0]).is_monotone());
    }

    #[test]
    fn validation_reports_length_mismatch_before_emptiness() {
        assert_eq!(
            validate_score_table(&[1, 2], &[0.5]),
            Err(TableError::LengthMismatch {
                bounds: 2,
                values: 1
            })
        );
        assert_eq!(validate_score_table::<u32>(&[], &[]), Err(TableError::Empty));
    }
}

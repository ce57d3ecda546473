//! Serializes [`Duration`] values as fractional seconds.
//!
//! Configuration files express every timing in seconds (`aggro_time = 0.5`),
//! which reads far better in TOML than serde's default `{ secs, nanos }` map.

use std::time::Duration;

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

/// Serializes a duration as a floating point number of seconds.
pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(value.as_secs_f64())
}

/// Deserializes a non-negative floating point number of seconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(seconds).map_err(D::Error::custom)
}

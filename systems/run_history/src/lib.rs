#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistence of completed level attempts and the scoreboard built from them.

mod scoreboard;
mod store;

pub use scoreboard::{ScoreEntry, Scoreboard, UNKNOWN_LEVEL};
pub use store::{JsonFileStore, MemoryStore, RunHistoryStore, StoreError, DEFAULT_SLOT};

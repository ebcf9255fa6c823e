#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Leaderboard collaborators for Defense Arcade.
//!
//! The global leaderboard lives behind a Firebase Realtime Database style
//! REST endpoint. Every submitted score is also kept in a small local JSON
//! cache, and submissions are delivered by a background worker so the
//! frame loop never waits on the network.

mod local;
mod rank;
mod rest;
mod worker;

pub use local::{LocalScoreStore, LocalStoreError};
pub use rank::rank_of;
pub use rest::{RestLeaderboard, DEFAULT_BASE_URL};
pub use worker::{submit_and_rank, SubmissionWorker};

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system responsible for emitting bug spawn commands.

mod catalog;

use defense_arcade_core::{
    rules, Command, Event, LaneGeometry, LaneIndex, SessionSnapshot, SpawnRefusal,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use catalog::{BugCatalog, CATALOG, CATALOG_SIZE};

const LANE_STREAM: u64 = 0x6c61_6e65;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    geometry: LaneGeometry,
}

impl Config {
    /// Creates a new configuration using the provided seed and the fixed lane geometry.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            geometry: rules::GEOMETRY,
        }
    }
}

/// Origin of a spawn request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnTrigger {
    /// Chained spawn after a session began or a bug was resolved.
    Automatic,
    /// Explicit request made by the player.
    Manual,
}

/// Pure system that draws bugs and places them on random lanes.
#[derive(Debug)]
pub struct Spawning {
    catalog: BugCatalog,
    lane_rng: ChaCha8Rng,
    geometry: LaneGeometry,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut lane_rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        lane_rng.set_stream(LANE_STREAM);
        Self {
            catalog: BugCatalog::new(config.rng_seed),
            lane_rng,
            geometry: config.geometry,
        }
    }

    /// Consumes events and the session snapshot to chain automatic spawns.
    pub fn handle(&mut self, events: &[Event], session: &SessionSnapshot, out: &mut Vec<Command>) {
        let wants_spawn = events.iter().any(|event| {
            matches!(
                event,
                Event::SessionBegan | Event::BugIntercepted { .. } | Event::ProductionHit { .. }
            )
        });
        if !wants_spawn {
            return;
        }

        if let Ok(Some(command)) = self.try_spawn(session, SpawnTrigger::Automatic) {
            out.push(command);
        }
    }

    /// Attempts to produce a spawn command for the provided session.
    ///
    /// Returns `Ok(None)` when the session is not running, a bug is already
    /// travelling, or the pool is exhausted on an automatic request. Manual
    /// requests against an exhausted pool are refused so the caller can
    /// surface a notice.
    pub fn try_spawn(
        &mut self,
        session: &SessionSnapshot,
        trigger: SpawnTrigger,
    ) -> Result<Option<Command>, SpawnRefusal> {
        if !session.running || session.current_bug.is_some() {
            return Ok(None);
        }
        if session.remaining_bugs == 0 {
            return match trigger {
                SpawnTrigger::Manual => Err(SpawnRefusal::NoBugsRemaining),
                SpawnTrigger::Automatic => Ok(None),
            };
        }

        let definition = self.catalog.draw();
        let lane = LaneIndex::new(self.lane_rng.gen_range(0..rules::LANE_COUNT));
        let velocity = velocity_for(&self.geometry, lane);
        Ok(Some(Command::SpawnBug {
            definition,
            lane,
            velocity,
        }))
    }
}

/// Speed that carries a bug across `lane` in exactly the fixed travel time.
#[must_use]
pub fn velocity_for(geometry: &LaneGeometry, lane: LaneIndex) -> f32 {
    geometry.travel_distance(lane) / rules::BUG_TRAVEL_TIME.as_secs_f32()
}

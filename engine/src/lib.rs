#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame scheduler that drives the Defense Arcade world and its systems.
//!
//! The engine owns the world together with every pure system. Each entry
//! point turns a player request or a clock reading into commands, applies
//! them, and keeps feeding the resulting events back through the systems
//! until no further commands are produced. A frame therefore completes
//! every chained reaction, including the re-spawn after a resolution,
//! before it returns.

mod clock;
mod summary;

use defense_arcade_core::{
    rules, BugCategory, Command, Event, GateView, LaneIndex, ScoreReporter, ScoreSubmission,
    SessionSnapshot, SpawnRefusal, SubmissionOutcome, READY_BANNER,
};
use defense_arcade_system_movement::Movement;
use defense_arcade_system_session::SessionController;
use defense_arcade_system_spawning::{Config as SpawningConfig, SpawnTrigger, Spawning};
use defense_arcade_world::{self as world, query, World};
use std::time::Duration;
use tracing::{debug, info};

pub use clock::{Clock, ManualClock, SystemClock};
pub use defense_arcade_system_session::{Phase, TransitionError};
pub use summary::{rank_line, Banner, SessionSummary, FLASH_DURATION};

/// Configuration parameters required to construct the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seed shared by the bug draw sequence and lane selection.
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rng_seed: 0x5eed_da7a_0000_0001,
        }
    }
}

/// Drives a single-player session from input and clock readings.
#[derive(Debug)]
pub struct Engine<C, R> {
    world: World,
    controller: SessionController,
    spawning: Spawning,
    movement: Movement,
    clock: C,
    reporter: R,
    last_frame: Option<Duration>,
    banner: Banner,
    summary: Option<SessionSummary>,
    log: Vec<Event>,
}

impl<C, R> Engine<C, R>
where
    C: Clock,
    R: ScoreReporter,
{
    /// Creates an engine with a fresh world.
    pub fn new(config: EngineConfig, clock: C, reporter: R) -> Self {
        Self {
            world: World::new(),
            controller: SessionController::new(),
            spawning: Spawning::new(SpawningConfig::new(config.rng_seed)),
            movement: Movement::new(rules::GEOMETRY),
            clock,
            reporter,
            last_frame: None,
            banner: Banner::ready(),
            summary: None,
            log: Vec::new(),
        }
    }

    /// Binds the player name.
    pub fn set_player(&mut self, name: &str) -> Result<(), TransitionError> {
        let mut commands = Vec::new();
        self.controller.set_player(name, &mut commands)?;
        self.pump(commands);
        Ok(())
    }

    /// Starts the session.
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        let mut commands = Vec::new();
        self.controller.begin(&mut commands)?;
        self.last_frame = None;
        self.pump(commands);
        Ok(())
    }

    /// Abandons the running session. The score is not submitted.
    pub fn abort(&mut self) -> Result<(), TransitionError> {
        let mut commands = Vec::new();
        self.controller.abort(&mut commands)?;
        self.pump(commands);
        Ok(())
    }

    /// Returns an ended session to the ready screen.
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        let mut commands = Vec::new();
        self.controller.reset(&mut commands)?;
        self.pump(commands);
        Ok(())
    }

    /// Drops the player after a session ended.
    pub fn new_player(&mut self) -> Result<(), TransitionError> {
        let mut commands = Vec::new();
        self.controller.new_player(&mut commands)?;
        self.pump(commands);
        Ok(())
    }

    /// Resets an ended session and starts the next one.
    pub fn play_again(&mut self) -> Result<(), TransitionError> {
        let mut commands = Vec::new();
        self.controller.play_again(&mut commands)?;
        self.last_frame = None;
        self.pump(commands);
        Ok(())
    }

    /// Advances the simulation to the current clock reading.
    ///
    /// The first frame after a session begins has a zero delta.
    pub fn frame(&mut self) {
        let now = self.clock.now();
        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_frame = Some(now);
        self.pump(vec![Command::Tick { dt, now }]);
    }

    /// Advances the session countdown by one second.
    pub fn tick_second(&mut self) {
        let mut commands = Vec::new();
        self.controller.tick_second(&mut commands);
        self.pump(commands);
    }

    /// Drops a gate onto a lane. Ignored unless a bug is travelling.
    pub fn place_gate(&mut self, category: BugCategory, lane: LaneIndex, offset: f32) {
        self.pump(vec![Command::PlaceGate {
            category,
            lane,
            offset,
        }]);
    }

    /// Spawns the next bug on request.
    ///
    /// An exhausted pool flashes a notice and leaves the session unchanged.
    pub fn request_spawn(&mut self) -> Result<(), SpawnRefusal> {
        let session = query::session(&self.world);
        match self.spawning.try_spawn(&session, SpawnTrigger::Manual) {
            Ok(Some(command)) => {
                self.pump(vec![command]);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(refusal) => {
                self.banner.flash(refusal.notice(), self.clock.now());
                Err(refusal)
            }
        }
    }

    /// Records the leaderboard rank reported for a submission.
    ///
    /// Returns `false` when the outcome belongs to a session that is no
    /// longer summarised.
    pub fn resolve_submission(&mut self, outcome: &SubmissionOutcome) -> bool {
        let Some(summary) = self.summary.as_mut() else {
            return false;
        };
        if summary.submission.as_ref() != Some(&outcome.submission) {
            return false;
        }
        summary.rank = outcome.rank;
        true
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Snapshot of the session record.
    #[must_use]
    pub fn session(&self) -> SessionSnapshot {
        query::session(&self.world)
    }

    /// Snapshot of the placed gates.
    #[must_use]
    pub fn gates(&self) -> GateView {
        query::gate_view(&self.world)
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn seconds_left(&self) -> u32 {
        self.controller.seconds_left()
    }

    /// Banner text visible right now.
    #[must_use]
    pub fn banner(&self) -> &str {
        self.banner.text_at(self.clock.now())
    }

    /// Summary of the last ended session, cleared on reset.
    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Returns every event observed since the previous call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.log)
    }

    /// Read-only access to the clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Read-only access to the score reporter.
    #[must_use]
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    fn pump(&mut self, commands: Vec<Command>) {
        let mut pending = commands;
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            if events.is_empty() {
                break;
            }

            self.observe(&events);

            let session = query::session(&self.world);
            let gates = query::gate_view(&self.world);
            self.controller.handle(&events, &mut pending);
            self.movement.handle(&events, &session, &gates, &mut pending);
            self.spawning.handle(&events, &session, &mut pending);

            self.log.extend(events);
        }
    }

    fn observe(&mut self, events: &[Event]) {
        let now = self.clock.now();
        for event in events {
            match event {
                Event::SessionReset => {
                    self.banner.set(READY_BANNER);
                    self.summary = None;
                }
                Event::SessionBegan => {
                    info!(player = ?query::player(&self.world), "session began");
                }
                Event::BugSpawned {
                    definition,
                    lane,
                    remaining_bugs,
                    ..
                } => {
                    debug!(
                        bug = %definition.id(),
                        category = %definition.category(),
                        lane = lane.get(),
                        remaining_bugs,
                        "bug spawned"
                    );
                    self.banner.incoming(definition);
                }
                Event::BugIntercepted { combo_bonus, .. } if *combo_bonus > 0 => {
                    self.banner.flash(format!("Combo! +{combo_bonus}"), now);
                }
                Event::SessionEnded {
                    reason,
                    final_score,
                    player,
                } => {
                    info!(?reason, final_score, "session ended");
                    self.banner.set(reason.banner());

                    let submission = match player {
                        Some(name) if reason.submits_score() => Some(ScoreSubmission {
                            name: name.clone(),
                            score: *final_score,
                            timestamp: self.clock.unix_millis(),
                        }),
                        _ => None,
                    };
                    if let Some(submission) = &submission {
                        self.reporter.report(submission.clone());
                    }

                    self.summary = Some(SessionSummary {
                        reason: *reason,
                        final_score: *final_score,
                        submission,
                        rank: None,
                    });
                }
                _ => {}
            }
        }
    }
}

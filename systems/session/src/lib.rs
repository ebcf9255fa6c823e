#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session lifecycle controller and countdown.
//!
//! The controller owns the player-facing phase machine. Requests that make
//! sense in the current phase are translated into world commands; every other
//! request is rejected with a [`TransitionError`] and leaves the phase
//! untouched. The controller also watches resolution events and asks the world
//! to end the session once a terminal condition is reached.

use std::fmt;

use defense_arcade_core::{rules, Command, EndReason, Event};
use defense_arcade_system_scoring::{interception_verdict, production_verdict, Verdict};
use thiserror::Error;

/// Lifecycle phase of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No player is bound.
    Idle,
    /// A player is bound and the session waits to begin.
    Ready,
    /// The session is running.
    Running,
    /// The session ended for the provided reason.
    Ended(EndReason),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Ready => f.write_str("ready"),
            Self::Running => f.write_str("running"),
            Self::Ended(_) => f.write_str("ended"),
        }
    }
}

/// Player requests the controller understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Request {
    /// Bind a player name.
    SetPlayer,
    /// Start the session.
    Begin,
    /// Abandon the running session.
    Abort,
    /// Return an ended session to the ready screen.
    Reset,
    /// Drop the player after a session ended.
    NewPlayer,
    /// Reset and immediately begin again.
    PlayAgain,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SetPlayer => "set the player",
            Self::Begin => "begin",
            Self::Abort => "abort",
            Self::Reset => "reset",
            Self::NewPlayer => "switch players",
            Self::PlayAgain => "play again",
        };
        f.write_str(label)
    }
}

/// Errors raised by rejected session transitions.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The request is not valid in the current phase.
    #[error("cannot {request} while the session is {phase}")]
    NotAllowed {
        /// Rejected request.
        request: Request,
        /// Phase the controller was in.
        phase: Phase,
    },
    /// The supplied player name was empty after trimming.
    #[error("player name must not be blank")]
    BlankName,
}

/// Whole-second session countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    /// Countdown starting at the provided number of seconds.
    #[must_use]
    pub const fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    /// Seconds left before the countdown expires.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Reports whether the countdown reached zero.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Removes one second, never dropping below zero, and returns what is left.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(rules::SESSION_SECONDS)
    }
}

/// Pure system that drives the session lifecycle.
#[derive(Debug)]
pub struct SessionController {
    phase: Phase,
    countdown: Countdown,
}

impl SessionController {
    /// Creates a controller with no player bound.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            countdown: Countdown::default(),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub const fn seconds_left(&self) -> u32 {
        self.countdown.remaining()
    }

    /// Binds a player, moving from idle to ready.
    pub fn set_player(&mut self, name: &str, out: &mut Vec<Command>) -> Result<(), TransitionError> {
        self.expect(Request::SetPlayer, matches!(self.phase, Phase::Idle))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(TransitionError::BlankName);
        }

        out.push(Command::BindPlayer {
            name: name.to_owned(),
        });
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Starts a fresh session with a full countdown.
    pub fn begin(&mut self, out: &mut Vec<Command>) -> Result<(), TransitionError> {
        self.expect(Request::Begin, matches!(self.phase, Phase::Ready))?;
        self.start(out);
        Ok(())
    }

    /// Abandons the running session without submitting its score.
    pub fn abort(&mut self, out: &mut Vec<Command>) -> Result<(), TransitionError> {
        self.expect(Request::Abort, matches!(self.phase, Phase::Running))?;
        out.push(Command::EndSession {
            reason: EndReason::Aborted,
        });
        self.phase = Phase::Ended(EndReason::Aborted);
        Ok(())
    }

    /// Returns an ended session to the ready screen.
    pub fn reset(&mut self, out: &mut Vec<Command>) -> Result<(), TransitionError> {
        self.expect(Request::Reset, matches!(self.phase, Phase::Ended(_)))?;
        out.push(Command::ResetSession);
        self.countdown = Countdown::default();
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Drops the bound player after a session ended.
    pub fn new_player(&mut self, out: &mut Vec<Command>) -> Result<(), TransitionError> {
        self.expect(Request::NewPlayer, matches!(self.phase, Phase::Ended(_)))?;
        out.push(Command::ResetSession);
        out.push(Command::ClearPlayer);
        self.countdown = Countdown::default();
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Resets an ended session and begins the next one straight away.
    pub fn play_again(&mut self, out: &mut Vec<Command>) -> Result<(), TransitionError> {
        self.expect(Request::PlayAgain, matches!(self.phase, Phase::Ended(_)))?;
        out.push(Command::ResetSession);
        self.start(out);
        Ok(())
    }

    /// Advances the countdown by one second while the session runs.
    ///
    /// Requests a time-up ending when the countdown reaches zero. Ticks
    /// delivered outside of a running session are ignored.
    pub fn tick_second(&mut self, out: &mut Vec<Command>) {
        if self.phase != Phase::Running {
            return;
        }

        if self.countdown.tick() == 0 {
            out.push(Command::EndSession {
                reason: EndReason::TimeUp,
            });
        }
    }

    /// Consumes world events and requests an ending on terminal conditions.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let verdict = match event {
                Event::ProductionHit {
                    health,
                    remaining_bugs,
                    ..
                } => production_verdict(*health, *remaining_bugs),
                Event::BugIntercepted { remaining_bugs, .. } => {
                    interception_verdict(*remaining_bugs)
                }
                Event::SessionEnded { reason, .. } => {
                    self.phase = Phase::Ended(*reason);
                    Verdict::Continue
                }
                _ => Verdict::Continue,
            };

            if let Verdict::End(reason) = verdict {
                if self.phase == Phase::Running {
                    out.push(Command::EndSession { reason });
                }
            }
        }
    }

    fn start(&mut self, out: &mut Vec<Command>) {
        out.push(Command::BeginSession);
        self.countdown = Countdown::default();
        self.phase = Phase::Running;
    }

    fn expect(&self, request: Request, allowed: bool) -> Result<(), TransitionError> {
        if allowed {
            Ok(())
        } else {
            Err(TransitionError::NotAllowed {
                request,
                phase: self.phase,
            })
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

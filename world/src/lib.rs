#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Defense Arcade.

mod gates;

use std::time::Duration;

use defense_arcade_core::{
    rules, BugDefinition, BugId, Command, EndReason, Event, GateId, LaneGeometry, LaneIndex,
};
use defense_arcade_system_scoring::{GateOutcome, ScoreTally, Scoring};

use gates::GateRegistry;

/// Represents the authoritative Defense Arcade world state.
#[derive(Debug)]
pub struct World {
    player: Option<String>,
    tally: ScoreTally,
    remaining_bugs: u32,
    spawned_count: u32,
    running: bool,
    current_bug: Option<ActiveBug>,
    gates: GateRegistry,
    next_bug_id: BugId,
    now: Duration,
    scoring: Scoring,
    geometry: LaneGeometry,
}

impl World {
    /// Creates a new world with no player bound and no session running.
    #[must_use]
    pub fn new() -> Self {
        Self {
            player: None,
            tally: ScoreTally::fresh(),
            remaining_bugs: rules::TOTAL_BUGS,
            spawned_count: 0,
            running: false,
            current_bug: None,
            gates: GateRegistry::new(),
            next_bug_id: BugId::new(0),
            now: Duration::ZERO,
            scoring: Scoring::default(),
            geometry: rules::GEOMETRY,
        }
    }

    fn reset_session(&mut self) {
        self.tally = ScoreTally::fresh();
        self.remaining_bugs = rules::TOTAL_BUGS;
        self.spawned_count = 0;
        self.running = false;
        self.current_bug = None;
        self.gates.clear();
        self.next_bug_id = BugId::new(0);
    }

    fn allocate_bug_id(&mut self) -> BugId {
        let id = self.next_bug_id;
        self.next_bug_id = BugId::new(id.get().saturating_add(1));
        id
    }

    fn active_bug_mut(&mut self, bug: BugId) -> Option<&mut ActiveBug> {
        if !self.running {
            return None;
        }
        self.current_bug.as_mut().filter(|active| active.id == bug)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveBug {
    id: BugId,
    definition: BugDefinition,
    lane: LaneIndex,
    position: f32,
    velocity: f32,
    paused_until: Duration,
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::BindPlayer { name } => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return;
            }
            let name = trimmed.to_owned();
            world.player = Some(name.clone());
            out_events.push(Event::PlayerBound { name });
        }
        Command::ClearPlayer => {
            if world.player.take().is_some() {
                out_events.push(Event::PlayerCleared);
            }
        }
        Command::ResetSession => {
            world.reset_session();
            out_events.push(Event::SessionReset);
        }
        Command::BeginSession => {
            world.reset_session();
            world.running = true;
            out_events.push(Event::SessionReset);
            out_events.push(Event::SessionBegan);
        }
        Command::EndSession { reason } => end_session(world, reason, out_events),
        Command::Tick { dt, now } => {
            world.now = world.now.max(now);
            out_events.push(Event::TimeAdvanced { dt, now });

            for gate in world.gates.sweep_expired(world.now) {
                out_events.push(Event::GateRemoved { gate });
            }
        }
        Command::SpawnBug {
            definition,
            lane,
            velocity,
        } => {
            if !world.running
                || world.current_bug.is_some()
                || world.remaining_bugs == 0
                || !lane.is_valid()
            {
                return;
            }

            let bug = world.allocate_bug_id();
            world.remaining_bugs -= 1;
            world.spawned_count = world.spawned_count.saturating_add(1);
            world.current_bug = Some(ActiveBug {
                id: bug,
                definition,
                lane,
                position: 0.0,
                velocity,
                paused_until: Duration::ZERO,
            });
            out_events.push(Event::BugSpawned {
                bug,
                definition,
                lane,
                velocity,
                remaining_bugs: world.remaining_bugs,
                spawned_count: world.spawned_count,
            });
        }
        Command::PlaceGate {
            category,
            lane,
            offset,
        } => {
            if !world.running || world.current_bug.is_none() || !lane.is_valid() {
                return;
            }

            let center = world.geometry.clamp_gate_center(offset);
            let gate = world.gates.insert(category, lane, center);
            out_events.push(Event::GatePlaced {
                gate,
                category,
                lane,
                center,
            });
        }
        Command::AdvanceBug { bug, position } => {
            let Some(active) = world.active_bug_mut(bug) else {
                return;
            };
            if position.is_nan() {
                return;
            }
            active.position = position;
            out_events.push(Event::BugAdvanced { bug, position });
        }
        Command::ResolveGateHit { bug, gate } => resolve_gate_hit(world, bug, gate, out_events),
        Command::ResolveProductionHit { bug } => {
            if world.active_bug_mut(bug).is_none() {
                return;
            }

            let outcome = world.scoring.resolve_production_hit(&mut world.tally);
            world.current_bug = None;
            out_events.push(Event::ProductionHit {
                bug,
                penalty: outcome.penalty,
                health: outcome.health,
                score: world.tally.score,
                remaining_bugs: world.remaining_bugs,
            });
        }
    }
}

fn end_session(world: &mut World, reason: EndReason, out_events: &mut Vec<Event>) {
    if !world.running {
        return;
    }

    world.running = false;
    out_events.push(Event::SessionEnded {
        reason,
        final_score: world.tally.score,
        player: world.player.clone(),
    });
}

fn resolve_gate_hit(
    world: &mut World,
    bug: BugId,
    gate: GateId,
    out_events: &mut Vec<Event>,
) {
    let Some(active) = world.active_bug_mut(bug).copied() else {
        return;
    };
    let now = world.now;
    let Some(state) = world.gates.live_mut(gate) else {
        return;
    };
    if state.lane != active.lane {
        return;
    }

    let outcome = world.scoring.resolve_gate(
        &mut world.tally,
        state.category,
        state.center,
        active.definition.category(),
        now,
    );

    match outcome {
        GateOutcome::Correct {
            reward,
            combo_bonus,
        } => {
            let _ = world.gates.remove(gate);
            world.current_bug = None;
            out_events.push(Event::BugIntercepted {
                bug,
                gate,
                reward,
                combo_bonus,
                score: world.tally.score,
                combo: world.tally.combo,
                remaining_bugs: world.remaining_bugs,
            });
            out_events.push(Event::GateRemoved { gate });
        }
        GateOutcome::Wrong {
            penalty,
            paused_until,
        } => {
            state.consumed = true;
            state.remove_at = Some(now.saturating_add(rules::WRONG_GATE_FADE));
            if let Some(current) = world.current_bug.as_mut() {
                current.paused_until = paused_until;
            }
            out_events.push(Event::WrongGate {
                bug,
                gate,
                penalty,
                score: world.tally.score,
                paused_until,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use defense_arcade_core::{BugSnapshot, GateView, LaneGeometry, SessionSnapshot};

    /// Captures the mutable session record.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            score: world.tally.score,
            combo: world.tally.combo,
            health: world.tally.health,
            remaining_bugs: world.remaining_bugs,
            spawned_count: world.spawned_count,
            running: world.running,
            player: world.player.clone(),
            current_bug: current_bug(world),
        }
    }

    /// Captures the active bug, if one is travelling.
    #[must_use]
    pub fn current_bug(world: &World) -> Option<BugSnapshot> {
        world.current_bug.map(|bug| BugSnapshot {
            id: bug.id,
            definition: bug.definition,
            lane: bug.lane,
            position: bug.position,
            velocity: bug.velocity,
            paused_until: bug.paused_until,
            alive: true,
        })
    }

    /// Captures a read-only view of the placed gates.
    #[must_use]
    pub fn gate_view(world: &World) -> GateView {
        world.gates.view()
    }

    /// Reports whether a session is running.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.running
    }

    /// Name of the bound player, if any.
    #[must_use]
    pub fn player(world: &World) -> Option<&str> {
        world.player.as_deref()
    }

    /// Latest clock instant observed through a tick.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Lane geometry the world validates gates and bugs against.
    #[must_use]
    pub fn geometry(world: &World) -> LaneGeometry {
        world.geometry
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Defense Arcade engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::{cmp::Ordering, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Banner shown while a session is waiting to begin.
pub const READY_BANNER: &str = "Ready";

/// Placeholder shown wherever a value is not available yet.
pub const EMPTY_LABEL: &str = "—";

/// Fixed gameplay constants. None of these are runtime configurable.
pub mod rules {
    use std::time::Duration;

    use super::{LaneGeometry, ScoringRules};

    /// Number of lanes bugs may spawn on.
    pub const LANE_COUNT: u32 = 5;
    /// Number of bugs available to a single session.
    pub const TOTAL_BUGS: u32 = 75;
    /// Wall-clock time every bug needs to cross its lane.
    pub const BUG_TRAVEL_TIME: Duration = Duration::from_secs(15);
    /// Production health at the start of a session.
    pub const MAX_HEALTH: u32 = 100;
    /// Health removed by a single production hit.
    pub const PRODUCTION_DAMAGE: u32 = 20;
    /// Time a bug stays frozen after hitting a wrong gate.
    pub const WRONG_GATE_PAUSE: Duration = Duration::from_millis(500);
    /// Delay before a consumed wrong gate is removed from its lane.
    pub const WRONG_GATE_FADE: Duration = Duration::from_millis(400);
    /// Length of a session countdown in whole seconds.
    pub const SESSION_SECONDS: u32 = 90;
    /// Display-only speed factor increment per spawned bug.
    pub const SPEED_FACTOR_STEP: f32 = 0.12;
    /// Maximum number of scores retained by the local cache.
    pub const LOCAL_SCORE_CAPACITY: usize = 50;
    /// Number of rows fetched from the global leaderboard.
    pub const LEADERBOARD_LIMIT: usize = 20;

    /// Scoring constants applied by the scoring system.
    pub const SCORING: ScoringRules = ScoringRules {
        correct_max: 250,
        correct_min: 50,
        wrong_gate: -100,
        hit_production: -500,
        combo_bonus: 1_000,
        combo_size: 3,
    };

    /// Travel geometry shared by every lane.
    pub const GEOMETRY: LaneGeometry = LaneGeometry::new(750.0, 120.0, 12.0);
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Binds a player identity to the world.
    BindPlayer {
        /// Display name the player entered.
        name: String,
    },
    /// Removes the bound player identity.
    ClearPlayer,
    /// Restores every session field to its initial value and stops the session.
    ResetSession,
    /// Resets the session and marks it as running.
    BeginSession,
    /// Ends the running session. Ignored when no session is running.
    EndSession {
        /// Reason the session ended.
        reason: EndReason,
    },
    /// Advances the simulation clock.
    Tick {
        /// Real time that elapsed since the previous frame.
        dt: Duration,
        /// Clock instant at which the frame was produced.
        now: Duration,
    },
    /// Places a freshly drawn bug on a lane.
    SpawnBug {
        /// Catalog entry describing the bug.
        definition: BugDefinition,
        /// Lane the bug travels along.
        lane: LaneIndex,
        /// Constant travel speed measured in lane units per second.
        velocity: f32,
    },
    /// Drops a gate onto a lane.
    PlaceGate {
        /// Category the gate intercepts.
        category: BugCategory,
        /// Lane the gate was dropped onto.
        lane: LaneIndex,
        /// Offset along the travel axis where the gate was dropped.
        offset: f32,
    },
    /// Moves the active bug to a new leading-edge position.
    AdvanceBug {
        /// Identifier of the active bug.
        bug: BugId,
        /// New leading-edge position along the travel axis.
        position: f32,
    },
    /// Resolves a collision between the active bug and a gate.
    ResolveGateHit {
        /// Identifier of the colliding bug.
        bug: BugId,
        /// Identifier of the first overlapping gate.
        gate: GateId,
    },
    /// Resolves the active bug reaching the production boundary.
    ResolveProductionHit {
        /// Identifier of the bug that reached production.
        bug: BugId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a player identity was bound.
    PlayerBound {
        /// Name of the bound player.
        name: String,
    },
    /// Confirms that the player identity was cleared.
    PlayerCleared,
    /// Confirms that every session field returned to its initial value.
    SessionReset,
    /// Announces that a fresh session is running.
    SessionBegan,
    /// Announces that the running session ended.
    SessionEnded {
        /// Reason the session ended.
        reason: EndReason,
        /// Score at the moment the session ended.
        final_score: i64,
        /// Player bound to the session, if any.
        player: Option<String>,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Real time that elapsed since the previous frame.
        dt: Duration,
        /// Clock instant at which the frame was produced.
        now: Duration,
    },
    /// Confirms that a bug entered a lane.
    BugSpawned {
        /// Identifier assigned to the bug.
        bug: BugId,
        /// Catalog entry describing the bug.
        definition: BugDefinition,
        /// Lane the bug travels along.
        lane: LaneIndex,
        /// Constant travel speed measured in lane units per second.
        velocity: f32,
        /// Bugs left in the pool after this spawn.
        remaining_bugs: u32,
        /// Bugs spawned so far in this session.
        spawned_count: u32,
    },
    /// Confirms that the active bug moved.
    BugAdvanced {
        /// Identifier of the bug that moved.
        bug: BugId,
        /// New leading-edge position along the travel axis.
        position: f32,
    },
    /// Confirms that a gate was placed onto a lane.
    GatePlaced {
        /// Identifier assigned to the gate.
        gate: GateId,
        /// Category the gate intercepts.
        category: BugCategory,
        /// Lane holding the gate.
        lane: LaneIndex,
        /// Clamped centre of the gate along the travel axis.
        center: f32,
    },
    /// Reports that a gate of the matching category caught the active bug.
    BugIntercepted {
        /// Identifier of the caught bug.
        bug: BugId,
        /// Identifier of the consumed gate.
        gate: GateId,
        /// Position-dependent reward that was awarded.
        reward: i64,
        /// Combo bonus awarded on top of the reward, zero when none.
        combo_bonus: i64,
        /// Score after the interception.
        score: i64,
        /// Combo streak after the interception.
        combo: u32,
        /// Bugs left in the pool at the moment of the interception.
        remaining_bugs: u32,
    },
    /// Reports that the active bug hit a gate of the wrong category.
    WrongGate {
        /// Identifier of the frozen bug.
        bug: BugId,
        /// Identifier of the consumed gate.
        gate: GateId,
        /// Penalty applied to the score.
        penalty: i64,
        /// Score after the penalty.
        score: i64,
        /// Clock instant until which the bug stays frozen.
        paused_until: Duration,
    },
    /// Confirms that a gate left its lane.
    GateRemoved {
        /// Identifier of the removed gate.
        gate: GateId,
    },
    /// Reports that the active bug reached production undeflected.
    ProductionHit {
        /// Identifier of the bug that reached production.
        bug: BugId,
        /// Penalty applied to the score.
        penalty: i64,
        /// Production health after the hit.
        health: u32,
        /// Score after the penalty.
        score: i64,
        /// Bugs left in the pool at the moment of the hit.
        remaining_bugs: u32,
    },
}

/// Test category a bug belongs to, matching one gate type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BugCategory {
    /// Defects caught by unit tests.
    Unit,
    /// Defects caught by contract tests.
    Contract,
    /// Defects caught by integration tests.
    Integration,
}

impl BugCategory {
    /// Every category in catalog order.
    pub const ALL: [Self; 3] = [Self::Unit, Self::Contract, Self::Integration];

    /// Lowercase identifier used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Contract => "contract",
            Self::Integration => "integration",
        }
    }

    /// Name of the gate that intercepts this category.
    #[must_use]
    pub const fn gate_name(self) -> &'static str {
        match self {
            Self::Unit => "UNIT TEST",
            Self::Contract => "CONTRACT TEST",
            Self::Integration => "INTEGRATION",
        }
    }
}

impl fmt::Display for BugCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of a catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(u16);

impl DefinitionId {
    /// Creates a catalog identifier from its numeric index.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric index of the catalog entry.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// Immutable catalog entry describing a kind of bug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BugDefinition {
    id: DefinitionId,
    label: &'static str,
    category: BugCategory,
}

impl BugDefinition {
    /// Creates a new catalog entry.
    #[must_use]
    pub const fn new(id: DefinitionId, label: &'static str, category: BugCategory) -> Self {
        Self {
            id,
            label,
            category,
        }
    }

    /// Identifier of the catalog entry.
    #[must_use]
    pub const fn id(&self) -> DefinitionId {
        self.id
    }

    /// Human readable description of the defect.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Category a gate must match to intercept the bug.
    #[must_use]
    pub const fn category(&self) -> BugCategory {
        self.category
    }
}

/// Unique identifier assigned to a spawned bug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BugId(u32);

impl BugId {
    /// Creates a new bug identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a placed gate. Identifiers grow with
/// placement order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GateId(u32);

impl GateId {
    /// Creates a new gate identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the gate identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Zero-based lane index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneIndex(u32);

impl LaneIndex {
    /// Creates a new lane index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying lane index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the index addresses one of the configured lanes.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 < rules::LANE_COUNT
    }
}

/// Scoring constants consumed by the scoring system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoringRules {
    /// Reward for a correct gate placed right at the spawn point.
    pub correct_max: i64,
    /// Reward for a correct gate placed right at the production boundary.
    pub correct_min: i64,
    /// Score change applied by a wrong gate.
    pub wrong_gate: i64,
    /// Score change applied by a production hit.
    pub hit_production: i64,
    /// Flat bonus awarded on every completed combo.
    pub combo_bonus: i64,
    /// Number of consecutive correct hits that complete a combo.
    pub combo_size: u32,
}

/// Travel geometry of a lane measured along its travel axis.
///
/// The spawn point sits at zero and bugs move toward increasing positions.
/// A bug's position is its leading edge; its body trails behind it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneGeometry {
    production_boundary: f32,
    body_length: f32,
    gate_half_width: f32,
}

impl LaneGeometry {
    /// Creates a new lane geometry.
    #[must_use]
    pub const fn new(production_boundary: f32, body_length: f32, gate_half_width: f32) -> Self {
        Self {
            production_boundary,
            body_length,
            gate_half_width,
        }
    }

    /// Position at which a bug's leading edge reaches production.
    #[must_use]
    pub const fn production_boundary(&self) -> f32 {
        self.production_boundary
    }

    /// Length of a bug's body trailing its leading edge.
    #[must_use]
    pub const fn body_length(&self) -> f32 {
        self.body_length
    }

    /// Half of a gate's collision window.
    #[must_use]
    pub const fn gate_half_width(&self) -> f32 {
        self.gate_half_width
    }

    /// Distance a bug spawned on `lane` travels before reaching production.
    ///
    /// Every lane currently shares one geometry, so the distance does not
    /// depend on the lane.
    #[must_use]
    pub fn travel_distance(&self, lane: LaneIndex) -> f32 {
        let _ = lane;
        self.production_boundary
    }

    /// Clamps a dropped gate offset into the lane.
    #[must_use]
    pub fn clamp_gate_center(&self, offset: f32) -> f32 {
        if offset.is_nan() {
            return 0.0;
        }
        offset.clamp(0.0, self.production_boundary)
    }

    /// Fraction of the lane covered before reaching `position`, in `0.0..=1.0`.
    #[must_use]
    pub fn travel_fraction(&self, position: f32) -> f32 {
        let boundary = self.production_boundary.max(1.0);
        (position / boundary).clamp(0.0, 1.0)
    }
}

/// Reasons a session can end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    /// The countdown expired.
    TimeUp,
    /// Production health dropped to zero.
    Meltdown,
    /// Every bug in the pool was resolved.
    AllProcessed,
    /// The player abandoned the session.
    Aborted,
}

impl EndReason {
    /// Reports whether the final score is handed to the leaderboard.
    #[must_use]
    pub const fn submits_score(self) -> bool {
        !matches!(self, Self::Aborted)
    }

    /// Banner text shown as the session ends.
    #[must_use]
    pub const fn banner(self) -> &'static str {
        match self {
            Self::TimeUp => "Time up!",
            Self::Meltdown => "Production meltdown!",
            Self::AllProcessed => "All bugs processed.",
            Self::Aborted => "Game Aborted",
        }
    }

    /// Title of the end-of-session summary.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::TimeUp => "⏰ Time Up!",
            Self::Meltdown => "🔥 Production Meltdown!",
            Self::AllProcessed => "All bugs processed.",
            Self::Aborted => "⛔ Game Aborted",
        }
    }
}

/// Reasons a spawn request may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnRefusal {
    /// Every bug of the session pool has already spawned.
    NoBugsRemaining,
}

impl SpawnRefusal {
    /// Transient notice shown to the player.
    #[must_use]
    pub const fn notice(self) -> &'static str {
        match self {
            Self::NoBugsRemaining => "No bugs remaining",
        }
    }
}

/// Immutable representation of the active bug used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BugSnapshot {
    /// Unique identifier assigned to the bug.
    pub id: BugId,
    /// Catalog entry describing the bug.
    pub definition: BugDefinition,
    /// Lane the bug travels along.
    pub lane: LaneIndex,
    /// Leading-edge position along the travel axis.
    pub position: f32,
    /// Constant travel speed measured in lane units per second.
    pub velocity: f32,
    /// Clock instant until which the bug stays frozen.
    pub paused_until: Duration,
    /// Whether the bug still takes part in the simulation.
    pub alive: bool,
}

/// Immutable representation of a placed gate used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateSnapshot {
    /// Identifier assigned to the gate.
    pub id: GateId,
    /// Category the gate intercepts.
    pub category: BugCategory,
    /// Lane holding the gate.
    pub lane: LaneIndex,
    /// Centre of the gate along the travel axis.
    pub center: f32,
    /// Whether the gate has already been hit.
    pub consumed: bool,
}

/// Read-only snapshot of every placed gate in placement order.
#[derive(Clone, Debug, Default)]
pub struct GateView {
    snapshots: Vec<GateSnapshot>,
}

impl GateView {
    /// Creates a new gate view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<GateSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured gates in placement order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &GateSnapshot> {
        self.snapshots.iter()
    }

    /// Number of gates captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no gates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<GateSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot of the mutable session record.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Current score; may be negative.
    pub score: i64,
    /// Consecutive correct gate hits.
    pub combo: u32,
    /// Production health in `0..=MAX_HEALTH`.
    pub health: u32,
    /// Bugs left in the session pool.
    pub remaining_bugs: u32,
    /// Bugs spawned so far.
    pub spawned_count: u32,
    /// Whether the session is running.
    pub running: bool,
    /// Player bound to the session, if any.
    pub player: Option<String>,
    /// Active bug, if any.
    pub current_bug: Option<BugSnapshot>,
}

impl SessionSnapshot {
    /// Production health expressed as a whole percentage of the maximum.
    #[must_use]
    pub fn health_percent(&self) -> u32 {
        self.health.saturating_mul(100) / rules::MAX_HEALTH
    }

    /// Display-only difficulty multiplier. It never affects bug velocity.
    #[must_use]
    pub fn speed_factor(&self) -> f32 {
        1.0 + self.spawned_count as f32 * rules::SPEED_FACTOR_STEP
    }
}

/// Identifier a leaderboard assigns to a stored score.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps a leaderboard-assigned key.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Final score handed to the leaderboard when a session ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    /// Player that earned the score.
    pub name: String,
    /// Final score.
    pub score: i64,
    /// Milliseconds since the Unix epoch at which the session ended.
    pub timestamp: u64,
}

/// Single row of the global leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Key assigned by the leaderboard.
    pub id: RecordId,
    /// Player name.
    pub name: String,
    /// Recorded score.
    pub score: i64,
    /// Milliseconds since the Unix epoch at which the score was recorded.
    pub timestamp: u64,
}

/// Single row of the local score cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalScore {
    /// Player name.
    pub name: String,
    /// Recorded score.
    pub score: i64,
    /// Milliseconds since the Unix epoch at which the score was recorded.
    pub timestamp: u64,
    /// Key of the matching global leaderboard row, when the upload succeeded.
    #[serde(default)]
    pub remote_id: Option<RecordId>,
}

/// Result of handing a score to the leaderboard collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Submission the outcome belongs to.
    pub submission: ScoreSubmission,
    /// Key assigned by the global leaderboard, if the upload succeeded.
    pub record_id: Option<RecordId>,
    /// One-based leaderboard rank, if it could be determined.
    pub rank: Option<u32>,
}

/// Orders scores best first: higher score wins, earlier timestamp breaks ties.
#[must_use]
pub fn ranking_order(
    (score_a, timestamp_a): (i64, u64),
    (score_b, timestamp_b): (i64, u64),
) -> Ordering {
    score_b
        .cmp(&score_a)
        .then_with(|| timestamp_a.cmp(&timestamp_b))
}

/// Errors reported by leaderboard collaborators.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// The request never produced a response.
    #[error("leaderboard request failed: {0}")]
    Transport(String),
    /// The leaderboard answered with a non-success status code.
    #[error("leaderboard responded with status {0}")]
    Status(u16),
    /// The response body could not be decoded.
    #[error("leaderboard payload could not be decoded: {0}")]
    Payload(String),
}

/// Remote leaderboard capability.
pub trait Leaderboard {
    /// Stores a score and returns the key the leaderboard assigned to it.
    fn submit_score(&self, submission: &ScoreSubmission) -> Result<RecordId, LeaderboardError>;

    /// Fetches up to `limit` rows ranked by [`ranking_order`].
    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    /// Removes every stored score.
    fn clear_all_scores(&self) -> Result<(), LeaderboardError>;
}

/// Hand-off used when a session ends with a score worth recording.
///
/// Implementations must return immediately; delivery happens elsewhere.
pub trait ScoreReporter {
    /// Queues the final score of a finished session.
    fn report(&mut self, submission: ScoreSubmission);
}

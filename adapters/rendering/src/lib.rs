#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Defense Arcade adapters.

mod text;

use anyhow::Result as AnyResult;
use defense_arcade_core::{
    rules, BugCategory, GateView, LaneGeometry, LaneIndex, SessionSnapshot, EMPTY_LABEL,
};
use std::time::Duration;

pub use text::{render_frame, render_leaderboard, status_line, TextBackend};

/// Visual state of the production column, derived from its health.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageTier {
    /// Above 70% health.
    Healthy,
    /// At or below 70% health.
    Damaged,
    /// At or below 30% health.
    Critical,
    /// No health left.
    Broken,
}

impl DamageTier {
    /// Classifies a health percentage.
    #[must_use]
    pub const fn from_health_percent(percent: u32) -> Self {
        match percent {
            0 => Self::Broken,
            1..=30 => Self::Critical,
            31..=70 => Self::Damaged,
            _ => Self::Healthy,
        }
    }

    /// Lower-case name used by text backends.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Damaged => "damaged",
            Self::Critical => "critical",
            Self::Broken => "broken",
        }
    }
}

/// Head-up display values shown alongside the lanes.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    /// Current score.
    pub score: i64,
    /// Consecutive correct hits.
    pub combo: u32,
    /// Bugs left in the pool.
    pub remaining: u32,
    /// Label of the travelling bug, or a dash when the lanes are empty.
    pub upcoming: String,
    /// Production health as a percentage.
    pub health_percent: u32,
    /// Seconds left on the countdown.
    pub seconds_left: u32,
    /// Display-only difficulty multiplier.
    pub speed_factor: f32,
    /// Production column damage.
    pub damage: DamageTier,
}

impl Hud {
    /// Speed factor formatted with two decimals, e.g. `1.12x`.
    #[must_use]
    pub fn speed_label(&self) -> String {
        format!("{:.2}x", self.speed_factor)
    }
}

/// Travelling bug as drawn on its lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BugPresentation {
    /// Catalog label.
    pub label: &'static str,
    /// Bug category.
    pub category: BugCategory,
    /// Fraction of the lane covered by the leading edge.
    pub progress: f32,
    /// Whether a wrong gate is currently holding the bug.
    pub frozen: bool,
}

/// Placed gate as drawn on its lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GatePresentation {
    /// Category the gate intercepts.
    pub category: BugCategory,
    /// Fraction of the lane at which the gate is centred.
    pub progress: f32,
    /// Whether the gate was already hit and is fading out.
    pub consumed: bool,
}

/// Occupancy of a single lane.
#[derive(Clone, Debug, PartialEq)]
pub struct LanePresentation {
    /// Lane index.
    pub lane: LaneIndex,
    /// Bug on the lane, if any.
    pub bug: Option<BugPresentation>,
    /// Gates on the lane in placement order.
    pub gates: Vec<GatePresentation>,
}

/// End-of-session overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryPresentation {
    /// Overlay title naming the end reason.
    pub title: String,
    /// Final score line.
    pub score_line: String,
    /// Leaderboard rank line, once known.
    pub rank_line: Option<String>,
}

/// Readings a frame is captured from.
#[derive(Clone, Copy, Debug)]
pub struct FrameSource<'a> {
    /// Session record.
    pub session: &'a SessionSnapshot,
    /// Placed gates.
    pub gates: &'a GateView,
    /// Lane geometry used to normalise positions.
    pub geometry: LaneGeometry,
    /// Seconds left on the countdown.
    pub seconds_left: u32,
    /// Banner text visible this frame.
    pub banner: &'a str,
    /// Clock reading of the frame.
    pub now: Duration,
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Head-up display values.
    pub hud: Hud,
    /// Banner line above the lanes.
    pub banner: String,
    /// Lane occupancy, one entry per lane.
    pub lanes: Vec<LanePresentation>,
    /// End-of-session overlay, when a session has ended.
    pub summary: Option<SummaryPresentation>,
}

impl Frame {
    /// Builds a frame from world readings.
    #[must_use]
    pub fn capture(source: FrameSource<'_>) -> Self {
        let session = source.session;
        let geometry = source.geometry;
        let health_percent = session.health_percent();

        let hud = Hud {
            score: session.score,
            combo: session.combo,
            remaining: session.remaining_bugs,
            upcoming: session
                .current_bug
                .map_or(EMPTY_LABEL, |bug| bug.definition.label())
                .to_owned(),
            health_percent,
            seconds_left: source.seconds_left,
            speed_factor: session.speed_factor(),
            damage: DamageTier::from_health_percent(health_percent),
        };

        let lanes = (0..rules::LANE_COUNT)
            .map(LaneIndex::new)
            .map(|lane| LanePresentation {
                lane,
                bug: session
                    .current_bug
                    .filter(|bug| bug.lane == lane)
                    .map(|bug| BugPresentation {
                        label: bug.definition.label(),
                        category: bug.definition.category(),
                        progress: geometry.travel_fraction(bug.position),
                        frozen: bug.paused_until > source.now,
                    }),
                gates: source
                    .gates
                    .iter()
                    .filter(|gate| gate.lane == lane)
                    .map(|gate| GatePresentation {
                        category: gate.category,
                        progress: geometry.travel_fraction(gate.center),
                        consumed: gate.consumed,
                    })
                    .collect(),
            })
            .collect();

        Self {
            hud,
            banner: source.banner.to_owned(),
            lanes,
            summary: None,
        }
    }

    /// Attaches the end-of-session overlay.
    #[must_use]
    pub fn with_summary(mut self, summary: Option<SummaryPresentation>) -> Self {
        self.summary = summary;
        self
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    /// Title shown before the first frame.
    pub title: String,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
        }
    }
}

/// Rendering backend capable of presenting Defense Arcade frames.
pub trait RenderingBackend {
    /// Runs the backend until `update_frame` stops producing frames.
    ///
    /// The closure receives the frame delta the backend is pacing at and
    /// returns the frame to draw, or `None` to exit.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration) -> Option<Frame>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use defense_arcade_core::{
        BugDefinition, BugId, BugSnapshot, DefinitionId, GateId, GateSnapshot,
    };

    fn session(health: u32, current_bug: Option<BugSnapshot>) -> SessionSnapshot {
        SessionSnapshot {
            score: 420,
            combo: 2,
            health,
            remaining_bugs: 70,
            spawned_count: 5,
            running: true,
            player: Some("ada".to_owned()),
            current_bug,
        }
    }

    fn bug(lane: u32, position: f32, paused_until: Duration) -> BugSnapshot {
        BugSnapshot {
            id: BugId::new(5),
            definition: BugDefinition::new(
                DefinitionId::new(52),
                "Queue backlog",
                BugCategory::Integration,
            ),
            lane: LaneIndex::new(lane),
            position,
            velocity: 50.0,
            paused_until,
            alive: true,
        }
    }

    #[test]
    fn damage_tiers_follow_health_thresholds() {
        assert_eq!(DamageTier::from_health_percent(100), DamageTier::Healthy);
        assert_eq!(DamageTier::from_health_percent(71), DamageTier::Healthy);
        assert_eq!(DamageTier::from_health_percent(70), DamageTier::Damaged);
        assert_eq!(DamageTier::from_health_percent(31), DamageTier::Damaged);
        assert_eq!(DamageTier::from_health_percent(30), DamageTier::Critical);
        assert_eq!(DamageTier::from_health_percent(1), DamageTier::Critical);
        assert_eq!(DamageTier::from_health_percent(0), DamageTier::Broken);
    }

    #[test]
    fn capture_places_bug_and_gates_on_their_lanes() {
        let snapshot = session(60, Some(bug(2, 375.0, Duration::from_secs(3))));
        let gates = GateView::from_snapshots(vec![
            GateSnapshot {
                id: GateId::new(1),
                category: BugCategory::Unit,
                lane: LaneIndex::new(2),
                center: 600.0,
                consumed: true,
            },
            GateSnapshot {
                id: GateId::new(2),
                category: BugCategory::Contract,
                lane: LaneIndex::new(4),
                center: 0.0,
                consumed: false,
            },
        ]);

        let frame = Frame::capture(FrameSource {
            session: &snapshot,
            gates: &gates,
            geometry: rules::GEOMETRY,
            seconds_left: 42,
            banner: "Incoming: Queue backlog (INTEGRATION)",
            now: Duration::from_secs(2),
        });

        assert_eq!(frame.lanes.len(), 5);
        let lane = &frame.lanes[2];
        let drawn = lane.bug.expect("bug on lane 2");
        assert!((drawn.progress - 0.5).abs() < f32::EPSILON);
        assert!(drawn.frozen);
        assert_eq!(lane.gates.len(), 1);
        assert!(lane.gates[0].consumed);
        assert_eq!(frame.lanes[4].gates[0].category, BugCategory::Contract);
        assert!(frame.lanes[0].bug.is_none());

        assert_eq!(frame.hud.upcoming, "Queue backlog");
        assert_eq!(frame.hud.damage, DamageTier::Damaged);
        assert_eq!(frame.hud.speed_label(), "1.60x");
        assert_eq!(frame.hud.seconds_left, 42);
        assert!(frame.summary.is_none());
    }

    #[test]
    fn empty_lanes_show_a_dash() {
        let snapshot = session(100, None);
        let gates = GateView::default();
        let frame = Frame::capture(FrameSource {
            session: &snapshot,
            gates: &gates,
            geometry: rules::GEOMETRY,
            seconds_left: 90,
            banner: "Ready",
            now: Duration::ZERO,
        });

        assert_eq!(frame.hud.upcoming, EMPTY_LABEL);
        assert_eq!(frame.hud.damage, DamageTier::Healthy);
        assert!(frame.lanes.iter().all(|lane| lane.bug.is_none()));
    }
}

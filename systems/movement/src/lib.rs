#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that advances the active bug and detects what it runs into.

use std::time::Duration;

use defense_arcade_core::{
    rules, BugSnapshot, Command, Event, GateId, GateSnapshot, GateView, LaneGeometry,
    SessionSnapshot,
};

/// What the active bug reached during a single motion step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// The bug overlapped the first live gate on its lane.
    Gate(GateId),
    /// The bug's leading edge crossed the production boundary.
    Production,
}

/// Outcome of advancing the active bug by one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Leading-edge position after the step.
    pub position: f32,
    /// Resolution the world should perform, if any.
    pub contact: Option<Contact>,
}

/// Pure system that reacts to clock events and emits motion commands.
#[derive(Debug)]
pub struct Movement {
    geometry: LaneGeometry,
}

impl Movement {
    /// Creates a movement system for the provided lane geometry.
    #[must_use]
    pub const fn new(geometry: LaneGeometry) -> Self {
        Self { geometry }
    }

    /// Consumes world events and immutable views to emit movement commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        session: &SessionSnapshot,
        gates: &GateView,
        out: &mut Vec<Command>,
    ) {
        if !session.running {
            return;
        }
        let Some(bug) = session.current_bug.as_ref() else {
            return;
        };
        if !bug.alive {
            return;
        }

        let mut frame: Option<(Duration, Duration)> = None;
        for event in events {
            if let Event::TimeAdvanced { dt, now } = event {
                let (total, _) = frame.unwrap_or((Duration::ZERO, *now));
                frame = Some((total.saturating_add(*dt), *now));
            }
        }
        let Some((dt, now)) = frame else {
            return;
        };

        let Some(motion) = advance(&self.geometry, bug, gates, dt, now) else {
            return;
        };

        out.push(Command::AdvanceBug {
            bug: bug.id,
            position: motion.position,
        });
        match motion.contact {
            Some(Contact::Gate(gate)) => out.push(Command::ResolveGateHit { bug: bug.id, gate }),
            Some(Contact::Production) => out.push(Command::ResolveProductionHit { bug: bug.id }),
            None => {}
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(rules::GEOMETRY)
    }
}

/// Advances `bug` by `dt` and reports at most one contact.
///
/// Returns `None` while the bug is frozen by a wrong gate. Gates are tested
/// in placement order and the production boundary is only checked when no
/// gate was hit.
#[must_use]
pub fn advance(
    geometry: &LaneGeometry,
    bug: &BugSnapshot,
    gates: &GateView,
    dt: Duration,
    now: Duration,
) -> Option<Motion> {
    if now < bug.paused_until {
        return None;
    }

    let position = bug.position + bug.velocity * dt.as_secs_f32();
    let contact = gates
        .iter()
        .find(|gate| !gate.consumed && gate.lane == bug.lane && overlaps(geometry, position, gate))
        .map(|gate| Contact::Gate(gate.id))
        .or_else(|| (position >= geometry.production_boundary()).then_some(Contact::Production));

    Some(Motion { position, contact })
}

/// Reports whether a bug whose leading edge sits at `position` touches `gate`.
#[must_use]
pub fn overlaps(geometry: &LaneGeometry, position: f32, gate: &GateSnapshot) -> bool {
    let tail = position - geometry.body_length();
    let left = gate.center - geometry.gate_half_width();
    let right = gate.center + geometry.gate_half_width();
    position >= left && tail <= right
}

#[cfg(test)]
mod tests {
    use super::*;
    use defense_arcade_core::{BugCategory, BugDefinition, BugId, DefinitionId, LaneIndex};

    fn gate(id: u32, lane: u32, center: f32) -> GateSnapshot {
        GateSnapshot {
            id: GateId::new(id),
            category: BugCategory::Unit,
            lane: LaneIndex::new(lane),
            center,
            consumed: false,
        }
    }

    fn bug_at(position: f32) -> BugSnapshot {
        BugSnapshot {
            id: BugId::new(0),
            definition: BugDefinition::new(
                DefinitionId::new(0),
                "Off-by-one error",
                BugCategory::Unit,
            ),
            lane: LaneIndex::new(2),
            position,
            velocity: 50.0,
            paused_until: Duration::ZERO,
            alive: true,
        }
    }

    #[test]
    fn overlap_includes_both_window_edges() {
        let geometry = rules::GEOMETRY;
        let probe = gate(0, 0, 300.0);
        assert!(overlaps(&geometry, 288.0, &probe));
        assert!(!overlaps(&geometry, 287.9, &probe));
        assert!(overlaps(&geometry, 432.0, &probe));
        assert!(!overlaps(&geometry, 432.1, &probe));
    }

    #[test]
    fn frozen_bugs_do_not_move() {
        let mut bug = bug_at(100.0);
        bug.paused_until = Duration::from_millis(900);
        let gates = GateView::default();

        assert_eq!(
            advance(
                &rules::GEOMETRY,
                &bug,
                &gates,
                Duration::from_millis(16),
                Duration::from_millis(899)
            ),
            None
        );
        assert!(advance(
            &rules::GEOMETRY,
            &bug,
            &gates,
            Duration::from_millis(16),
            Duration::from_millis(900)
        )
        .is_some());
    }

    #[test]
    fn first_overlapping_gate_wins() {
        let gates = GateView::from_snapshots(vec![gate(4, 2, 200.0), gate(1, 2, 210.0)]);
        let motion = advance(
            &rules::GEOMETRY,
            &bug_at(215.0),
            &gates,
            Duration::ZERO,
            Duration::ZERO,
        )
        .expect("bug is not frozen");
        assert_eq!(motion.contact, Some(Contact::Gate(GateId::new(1))));
    }

    #[test]
    fn gates_on_other_lanes_are_ignored() {
        let gates = GateView::from_snapshots(vec![gate(0, 1, 200.0)]);
        let motion = advance(
            &rules::GEOMETRY,
            &bug_at(195.0),
            &gates,
            Duration::from_millis(100),
            Duration::ZERO,
        )
        .expect("bug is not frozen");
        assert_eq!(motion.contact, None);
        assert!((motion.position - 200.0).abs() < 1e-4);
    }

    #[test]
    fn gate_hit_suppresses_the_boundary_check() {
        let gates = GateView::from_snapshots(vec![gate(0, 2, 750.0)]);
        let motion = advance(
            &rules::GEOMETRY,
            &bug_at(749.0),
            &gates,
            Duration::from_millis(100),
            Duration::ZERO,
        )
        .expect("bug is not frozen");
        assert_eq!(motion.contact, Some(Contact::Gate(GateId::new(0))));
    }
}

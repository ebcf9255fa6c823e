//! Authoritative gate state management utilities.

use std::time::Duration;

use defense_arcade_core::{BugCategory, GateId, GateSnapshot, GateView, LaneIndex};

/// Gate stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct GateState {
    /// Identifier allocated by the world for the gate.
    pub(crate) id: GateId,
    /// Category the gate intercepts.
    pub(crate) category: BugCategory,
    /// Lane holding the gate.
    pub(crate) lane: LaneIndex,
    /// Centre of the gate along the travel axis.
    pub(crate) center: f32,
    /// Set once a bug has hit the gate.
    pub(crate) consumed: bool,
    /// Clock instant after which a consumed gate leaves its lane.
    pub(crate) remove_at: Option<Duration>,
}

/// Ordered gate list that preserves placement order and allocates identifiers.
#[derive(Debug)]
pub(crate) struct GateRegistry {
    entries: Vec<GateState>,
    next_gate_id: GateId,
}

impl GateRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_gate_id: GateId::new(0),
        }
    }

    /// Removes every gate and restarts identifier allocation.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_gate_id = GateId::new(0);
    }

    /// Appends a gate and returns its identifier.
    pub(crate) fn insert(&mut self, category: BugCategory, lane: LaneIndex, center: f32) -> GateId {
        let id = self.next_gate_id;
        self.next_gate_id = GateId::new(id.get().saturating_add(1));
        self.entries.push(GateState {
            id,
            category,
            lane,
            center,
            consumed: false,
            remove_at: None,
        });
        id
    }

    /// Looks up a gate that can still be hit.
    pub(crate) fn live_mut(&mut self, gate: GateId) -> Option<&mut GateState> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == gate && !entry.consumed)
    }

    /// Removes the gate immediately.
    pub(crate) fn remove(&mut self, gate: GateId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != gate);
        self.entries.len() != before
    }

    /// Removes consumed gates whose fade deadline passed, returning their ids.
    pub(crate) fn sweep_expired(&mut self, now: Duration) -> Vec<GateId> {
        let mut expired = Vec::new();
        self.entries.retain(|entry| match entry.remove_at {
            Some(deadline) if deadline <= now => {
                expired.push(entry.id);
                false
            }
            _ => true,
        });
        expired
    }

    /// Captures a read-only view of every gate.
    pub(crate) fn view(&self) -> GateView {
        GateView::from_snapshots(
            self.entries
                .iter()
                .map(|entry| GateSnapshot {
                    id: entry.id,
                    category: entry.category,
                    lane: entry.lane,
                    center: entry.center,
                    consumed: entry.consumed,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = GateRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_gate_id.get(), 0);
    }

    #[test]
    fn identifiers_follow_placement_order() {
        let mut registry = GateRegistry::new();
        let first = registry.insert(BugCategory::Unit, LaneIndex::new(2), 100.0);
        let second = registry.insert(BugCategory::Contract, LaneIndex::new(2), 90.0);

        let ids: Vec<_> = registry.view().iter().map(|gate| gate.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert!(first < second);
    }

    #[test]
    fn consumed_gates_are_not_live() {
        let mut registry = GateRegistry::new();
        let gate = registry.insert(BugCategory::Unit, LaneIndex::new(0), 10.0);
        registry
            .live_mut(gate)
            .expect("fresh gate is live")
            .consumed = true;

        assert!(registry.live_mut(gate).is_none());
        assert_eq!(registry.view().len(), 1);
    }

    #[test]
    fn sweep_only_removes_expired_gates() {
        let mut registry = GateRegistry::new();
        let fading = registry.insert(BugCategory::Unit, LaneIndex::new(0), 10.0);
        let kept = registry.insert(BugCategory::Unit, LaneIndex::new(1), 10.0);
        if let Some(entry) = registry.live_mut(fading) {
            entry.consumed = true;
            entry.remove_at = Some(Duration::from_millis(400));
        }

        assert!(registry.sweep_expired(Duration::from_millis(399)).is_empty());
        assert_eq!(registry.sweep_expired(Duration::from_millis(400)), vec![fading]);

        let remaining: Vec<_> = registry.view().iter().map(|gate| gate.id).collect();
        assert_eq!(remaining, vec![kept]);
    }

    #[test]
    fn clear_restarts_identifiers() {
        let mut registry = GateRegistry::new();
        let _ = registry.insert(BugCategory::Unit, LaneIndex::new(0), 10.0);
        registry.clear();
        let gate = registry.insert(BugCategory::Unit, LaneIndex::new(0), 10.0);
        assert_eq!(gate.get(), 0);
    }
}

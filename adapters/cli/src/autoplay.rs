//! Seeded bot that places one gate per incoming bug.

use defense_arcade_core::{rules, BugCategory, BugId, LaneIndex, SessionSnapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Closest a gate is dropped ahead of the bug's leading edge.
const LEAD: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct GateOrder {
    pub(crate) category: BugCategory,
    pub(crate) lane: LaneIndex,
    pub(crate) offset: f32,
}

#[derive(Debug)]
pub(crate) struct Autoplay {
    rng: ChaCha8Rng,
    accuracy: f64,
    handled: Option<BugId>,
}

impl Autoplay {
    /// `accuracy` is the chance of picking the matching gate category.
    pub(crate) fn new(seed: u64, accuracy: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            accuracy: accuracy.clamp(0.0, 1.0),
            handled: None,
        }
    }

    pub(crate) fn plan(&mut self, session: &SessionSnapshot) -> Option<GateOrder> {
        let bug = session.current_bug?;
        if !session.running || self.handled == Some(bug.id) {
            return None;
        }
        self.handled = Some(bug.id);

        let matching = bug.definition.category();
        let category = if self.rng.gen_bool(self.accuracy) {
            matching
        } else {
            let wrong: Vec<BugCategory> = BugCategory::ALL
                .into_iter()
                .filter(|category| *category != matching)
                .collect();
            wrong[self.rng.gen_range(0..wrong.len())]
        };

        let boundary = rules::GEOMETRY.production_boundary();
        let nearest = (bug.position + LEAD).min(boundary);
        Some(GateOrder {
            category,
            lane: bug.lane,
            offset: self.rng.gen_range(nearest..=boundary),
        })
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure scoring rules applied when a bug meets a gate or reaches production.
//!
//! Nothing in this crate owns state. The world passes in the mutable part of
//! the session record as a [`ScoreTally`] and receives an outcome describing
//! what changed, so every rule can be exercised without a running session.

use std::time::Duration;

use defense_arcade_core::{rules, BugCategory, EndReason, LaneGeometry, ScoringRules};

/// Mutable subset of the session record touched by scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreTally {
    /// Current score; may be negative.
    pub score: i64,
    /// Consecutive correct gate hits.
    pub combo: u32,
    /// Production health in `0..=MAX_HEALTH`.
    pub health: u32,
}

impl ScoreTally {
    /// Tally at the start of a session.
    #[must_use]
    pub const fn fresh() -> Self {
        Self {
            score: 0,
            combo: 0,
            health: rules::MAX_HEALTH,
        }
    }
}

impl Default for ScoreTally {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Result of resolving a gate collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// The gate matched the bug's category; bug and gate are removed.
    Correct {
        /// Position-dependent reward.
        reward: i64,
        /// Combo bonus awarded on top of the reward, zero when none.
        combo_bonus: i64,
    },
    /// The gate did not match; the bug freezes in place.
    Wrong {
        /// Score change applied by the wrong gate.
        penalty: i64,
        /// Clock instant until which the bug stays frozen.
        paused_until: Duration,
    },
}

/// Result of resolving a production hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProductionOutcome {
    /// Score change applied by the hit.
    pub penalty: i64,
    /// Production health after the hit.
    pub health: u32,
}

/// What the session should do once a bug has been resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Keep running and attempt the next spawn.
    Continue,
    /// End the session for the provided reason.
    End(EndReason),
}

/// Scoring engine parameterised by the fixed rules and lane geometry.
#[derive(Clone, Copy, Debug)]
pub struct Scoring {
    rules: ScoringRules,
    geometry: LaneGeometry,
}

impl Default for Scoring {
    fn default() -> Self {
        Self::new(rules::SCORING, rules::GEOMETRY)
    }
}

impl Scoring {
    /// Creates a scoring engine from explicit rules and geometry.
    #[must_use]
    pub const fn new(rules: ScoringRules, geometry: LaneGeometry) -> Self {
        Self { rules, geometry }
    }

    /// Rules applied by this engine.
    #[must_use]
    pub const fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Reward for a correct gate whose centre sits at `center`.
    ///
    /// Interpolates linearly from `correct_max` at the spawn point down to
    /// `correct_min` at the production boundary.
    #[must_use]
    pub fn correct_reward(&self, center: f32) -> i64 {
        reward_at_fraction(&self.rules, self.geometry.travel_fraction(center))
    }

    /// Applies a gate collision to the tally.
    pub fn resolve_gate(
        &self,
        tally: &mut ScoreTally,
        gate_category: BugCategory,
        gate_center: f32,
        bug_category: BugCategory,
        now: Duration,
    ) -> GateOutcome {
        if gate_category == bug_category {
            let reward = self.correct_reward(gate_center);
            tally.score = tally.score.saturating_add(reward);
            tally.combo = tally.combo.saturating_add(1);

            let combo_bonus = if completes_combo(&self.rules, tally.combo) {
                self.rules.combo_bonus
            } else {
                0
            };
            tally.score = tally.score.saturating_add(combo_bonus);

            GateOutcome::Correct {
                reward,
                combo_bonus,
            }
        } else {
            tally.score = tally.score.saturating_add(self.rules.wrong_gate);
            tally.combo = 0;
            GateOutcome::Wrong {
                penalty: self.rules.wrong_gate,
                paused_until: now.saturating_add(rules::WRONG_GATE_PAUSE),
            }
        }
    }

    /// Applies a production hit to the tally.
    pub fn resolve_production_hit(&self, tally: &mut ScoreTally) -> ProductionOutcome {
        tally.score = tally.score.saturating_add(self.rules.hit_production);
        tally.combo = 0;
        tally.health = tally.health.saturating_sub(rules::PRODUCTION_DAMAGE);
        ProductionOutcome {
            penalty: self.rules.hit_production,
            health: tally.health,
        }
    }
}

/// Interpolated reward for a gate placed after `fraction` of the lane.
#[must_use]
pub fn reward_at_fraction(rules: &ScoringRules, fraction: f32) -> i64 {
    let t = if fraction.is_nan() {
        1.0
    } else {
        f64::from(fraction.clamp(0.0, 1.0))
    };
    let max = rules.correct_max as f64;
    let min = rules.correct_min as f64;
    (max - t * (max - min)).round() as i64
}

/// Reports whether the post-increment `combo` completes a combo.
#[must_use]
pub fn completes_combo(rules: &ScoringRules, combo: u32) -> bool {
    rules.combo_size > 0 && combo > 0 && combo % rules.combo_size == 0
}

/// Terminal check after a production hit, in priority order.
#[must_use]
pub fn production_verdict(health: u32, remaining_bugs: u32) -> Verdict {
    if health == 0 {
        Verdict::End(EndReason::Meltdown)
    } else if remaining_bugs == 0 {
        Verdict::End(EndReason::AllProcessed)
    } else {
        Verdict::Continue
    }
}

/// Terminal check after a correct interception.
#[must_use]
pub fn interception_verdict(remaining_bugs: u32) -> Verdict {
    if remaining_bugs == 0 {
        Verdict::End(EndReason::AllProcessed)
    } else {
        Verdict::Continue
    }
}

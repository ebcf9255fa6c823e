//! Player-facing text derived from world events.

use std::time::Duration;

use defense_arcade_core::{BugDefinition, EndReason, ScoreSubmission, READY_BANNER};

/// How long a flashed banner stays on screen.
pub const FLASH_DURATION: Duration = Duration::from_millis(900);

/// Banner line shown above the lanes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    base: String,
    flash: Option<(String, Duration)>,
}

impl Banner {
    pub(crate) fn ready() -> Self {
        Self {
            base: READY_BANNER.to_owned(),
            flash: None,
        }
    }

    pub(crate) fn set(&mut self, text: impl Into<String>) {
        self.base = text.into();
        self.flash = None;
    }

    pub(crate) fn incoming(&mut self, definition: &BugDefinition) {
        self.base = format!(
            "Incoming: {} ({})",
            definition.label(),
            definition.category().gate_name()
        );
    }

    pub(crate) fn flash(&mut self, text: impl Into<String>, now: Duration) {
        self.flash = Some((text.into(), now.saturating_add(FLASH_DURATION)));
    }

    /// Text visible at `now`: an unexpired flash wins over the base line.
    #[must_use]
    pub fn text_at(&self, now: Duration) -> &str {
        match &self.flash {
            Some((text, until)) if now < *until => text,
            _ => &self.base,
        }
    }
}

/// End-of-session summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Why the session ended.
    pub reason: EndReason,
    /// Score at the end of the session.
    pub final_score: i64,
    /// Score handed to the leaderboard, absent for aborted or anonymous sessions.
    pub submission: Option<ScoreSubmission>,
    /// Leaderboard rank, filled in once the submission worker reports back.
    pub rank: Option<u32>,
}

impl SessionSummary {
    /// Summary title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.reason.title()
    }

    /// Score line.
    #[must_use]
    pub fn score_line(&self) -> String {
        format!("Score: {}", self.final_score)
    }

    /// Rank line, when a rank is known.
    #[must_use]
    pub fn rank_line(&self) -> Option<String> {
        self.rank.map(rank_line)
    }
}

/// Formats a one-based leaderboard rank for the summary.
#[must_use]
pub fn rank_line(rank: u32) -> String {
    if rank == 1 {
        "🏆 New High Score! You're #1".to_owned()
    } else {
        format!("New leaderboard rank: #{rank}")
    }
}

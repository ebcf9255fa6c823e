//! Plain-text backend that prints HUD changes and the final board.

use std::{fmt::Write as _, io::Write, thread, time::Duration};

use anyhow::{Context, Result as AnyResult};
use defense_arcade_core::{BugCategory, LeaderboardEntry};

use crate::{Frame, LanePresentation, Presentation, RenderingBackend};

const TRACK_WIDTH: usize = 50;

/// Backend writing frames to any [`Write`] sink.
///
/// Only frames whose status line changed are printed. The full lane board
/// is drawn once the update closure stops.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
    frame_interval: Duration,
    paced: bool,
}

impl<W> TextBackend<W>
where
    W: Write,
{
    /// Creates a backend that runs frames back to back.
    #[must_use]
    pub fn new(out: W, frame_interval: Duration) -> Self {
        Self {
            out,
            frame_interval,
            paced: false,
        }
    }

    /// Sleeps for the frame interval between frames.
    #[must_use]
    pub fn paced(mut self) -> Self {
        self.paced = true;
        self
    }
}

impl<W> RenderingBackend for TextBackend<W>
where
    W: Write,
{
    fn run<F>(mut self, presentation: Presentation, mut update_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration) -> Option<Frame>,
    {
        writeln!(self.out, "== {} ==", presentation.title).context("writing title")?;

        let mut last_status: Option<String> = None;
        let mut last_frame = None;
        while let Some(frame) = update_frame(self.frame_interval) {
            let status = status_line(&frame);
            if last_status.as_deref() != Some(status.as_str()) {
                writeln!(self.out, "{status}").context("writing status line")?;
                last_status = Some(status);
            }
            last_frame = Some(frame);
            if self.paced {
                thread::sleep(self.frame_interval);
            }
        }

        if let Some(frame) = last_frame {
            write!(self.out, "{}", render_frame(&frame)).context("writing final frame")?;
        }
        self.out.flush().context("flushing output")?;
        Ok(())
    }
}

/// One-line HUD summary followed by the banner.
#[must_use]
pub fn status_line(frame: &Frame) -> String {
    let hud = &frame.hud;
    format!(
        "[{:>2}s] score {} | combo {} | left {} | next {} | prod {}% {} | {} | {}",
        hud.seconds_left,
        hud.score,
        hud.combo,
        hud.remaining,
        hud.upcoming,
        hud.health_percent,
        hud.damage.label(),
        hud.speed_label(),
        frame.banner,
    )
}

/// Multi-line board: status, one track per lane, then the summary if any.
#[must_use]
pub fn render_frame(frame: &Frame) -> String {
    let mut board = status_line(frame);
    board.push('\n');
    for lane in &frame.lanes {
        board.push_str(&render_lane(lane));
        board.push('\n');
    }
    if let Some(summary) = &frame.summary {
        let _ = writeln!(board, "{}", summary.title);
        let _ = writeln!(board, "{}", summary.score_line);
        if let Some(rank) = &summary.rank_line {
            let _ = writeln!(board, "{rank}");
        }
    }
    board
}

/// Numbered leaderboard listing.
#[must_use]
pub fn render_leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "No scores yet\n".to_owned();
    }
    let mut listing = String::new();
    for (index, entry) in entries.iter().enumerate() {
        let _ = writeln!(listing, "{:>2}. {:<20} {:>7}", index + 1, entry.name, entry.score);
    }
    listing
}

fn render_lane(lane: &LanePresentation) -> String {
    let mut track = vec!['.'; TRACK_WIDTH];
    for gate in &lane.gates {
        track[cell(gate.progress)] = if gate.consumed {
            'x'
        } else {
            gate_glyph(gate.category)
        };
    }
    let mut line = String::new();
    if let Some(bug) = &lane.bug {
        track[cell(bug.progress)] = if bug.frozen { '*' } else { '@' };
        let _ = write!(
            line,
            " {} [{}]",
            bug.label,
            bug.category.gate_name()
        );
    }
    let track: String = track.into_iter().collect();
    format!("L{} |{track}|{line}", lane.lane.get() + 1)
}

fn cell(progress: f32) -> usize {
    let last = TRACK_WIDTH - 1;
    ((progress.clamp(0.0, 1.0) * last as f32).round() as usize).min(last)
}

const fn gate_glyph(category: BugCategory) -> char {
    match category {
        BugCategory::Unit => 'U',
        BugCategory::Contract => 'C',
        BugCategory::Integration => 'I',
    }
}

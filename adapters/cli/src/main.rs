#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Defense Arcade headlessly and manages the leaderboard.

mod autoplay;
mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use defense_arcade_core::{
    rules, Leaderboard, LeaderboardEntry, RecordId, ScoreReporter, ScoreSubmission,
    SubmissionOutcome,
};
use defense_arcade_engine::{
    Clock, Engine, EngineConfig, ManualClock, Phase, SessionSummary, SystemClock,
};
use defense_arcade_leaderboard::{LocalScoreStore, RestLeaderboard, SubmissionWorker};
use defense_arcade_rendering::{
    render_leaderboard, Frame, FrameSource, Presentation, RenderingBackend, SummaryPresentation,
    TextBackend,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{autoplay::Autoplay, config::Settings};

const SUBMISSION_WAIT: Duration = Duration::from_secs(10);
const SECOND: Duration = Duration::from_secs(1);

/// Defense Arcade: intercept bugs before they reach production.
#[derive(Debug, Parser)]
#[command(name = "defense-arcade", version, about)]
struct Cli {
    /// Settings file (defaults to `defense-arcade.toml` when present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Leaderboard database base URL.
    #[arg(long)]
    leaderboard_url: Option<String>,

    /// Local score cache file.
    #[arg(long)]
    local_scores: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play one session with the autoplay bot.
    Play {
        /// Player name recorded with the score.
        #[arg(short, long, default_value = "Player")]
        name: String,

        /// Seed for the bug draw and the bot.
        #[arg(long)]
        seed: Option<u64>,

        /// Chance the bot picks the matching gate.
        #[arg(long)]
        accuracy: Option<f64>,

        /// Pace frames against the wall clock instead of fast-forwarding.
        #[arg(long)]
        realtime: bool,

        /// Keep scores locally without contacting the leaderboard.
        #[arg(long)]
        offline: bool,
    },

    /// Print the top scores.
    Leaderboard {
        /// Number of rows to show.
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Show this machine's score history instead of the global board.
        #[arg(long)]
        local: bool,
    },

    /// Remove every score from the global leaderboard.
    ClearLeaderboard {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

/// Entry point for the Defense Arcade command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(url) = cli.leaderboard_url {
        settings.leaderboard_url = url;
    }
    if let Some(path) = cli.local_scores {
        settings.local_scores = path;
    }

    match cli.command {
        Command::Play {
            name,
            seed,
            accuracy,
            realtime,
            offline,
        } => {
            if let Some(accuracy) = accuracy {
                settings.accuracy = accuracy;
            }
            if seed.is_some() {
                settings.seed = seed;
            }
            settings.validate().context("validating settings")?;
            play(&settings, &name, realtime, offline)
        }
        Command::Leaderboard { limit, local } => {
            let limit = limit.unwrap_or(settings.top_scores);
            let entries = if local {
                local_entries(&settings, limit)
            } else {
                RestLeaderboard::new(&settings.leaderboard_url)?
                    .fetch_top_scores(limit)
                    .context("fetching leaderboard")?
            };
            print!("{}", render_leaderboard(&entries));
            Ok(())
        }
        Command::ClearLeaderboard { yes } => {
            if !yes {
                bail!("refusing to clear the leaderboard without --yes");
            }
            RestLeaderboard::new(&settings.leaderboard_url)?
                .clear_all_scores()
                .context("clearing leaderboard")?;
            info!(url = %settings.leaderboard_url, "leaderboard cleared");
            Ok(())
        }
    }
}

fn play(settings: &Settings, name: &str, realtime: bool, offline: bool) -> Result<()> {
    let store = LocalScoreStore::new(settings.local_scores.clone());
    let submissions = if offline {
        Submissions::Offline(store)
    } else {
        let leaderboard = RestLeaderboard::new(&settings.leaderboard_url)?;
        Submissions::Online(
            SubmissionWorker::spawn(leaderboard, Some(store), settings.top_scores)
                .context("starting submission worker")?,
        )
    };

    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(seed, player = name, realtime, offline, "starting session");
    let config = EngineConfig { rng_seed: seed };
    let interval = Duration::from_millis(settings.frame_interval_ms);
    let bot = Autoplay::new(seed.rotate_left(17), settings.accuracy);

    if realtime {
        let engine = Engine::new(config, SystemClock::new(), submissions);
        run_session(engine, bot, name, TextBackend::new(std::io::stdout(), interval).paced())
    } else {
        let clock = ManualClock::new(SystemClock::new().unix_millis());
        let engine = Engine::new(config, clock, submissions);
        run_session(engine, bot, name, TextBackend::new(std::io::stdout(), interval))
    }
}

fn run_session<C, B>(
    mut engine: Engine<C, Submissions>,
    mut bot: Autoplay,
    name: &str,
    backend: B,
) -> Result<()>
where
    C: Pace,
    B: RenderingBackend,
{
    engine.set_player(name).context("binding player")?;
    engine.begin().context("starting session")?;
    let mut next_second = engine.clock().now() + SECOND;
    let mut finished = false;

    backend.run(Presentation::new("Defense Arcade"), |dt| {
        if finished {
            return None;
        }

        engine.clock_mut().step(dt);
        engine.frame();
        while engine.phase() == Phase::Running && engine.clock().now() >= next_second {
            engine.tick_second();
            next_second += SECOND;
        }
        if let Some(order) = bot.plan(&engine.session()) {
            engine.place_gate(order.category, order.lane, order.offset);
        }
        if let Some(outcome) = engine.reporter().poll() {
            let _ = engine.resolve_submission(&outcome);
        }
        let _ = engine.take_events();

        if let Phase::Ended(_) = engine.phase() {
            finished = true;
            let pending = engine
                .summary()
                .is_some_and(|summary| summary.submission.is_some() && summary.rank.is_none());
            if pending {
                if let Some(outcome) = engine.reporter().wait(SUBMISSION_WAIT) {
                    let _ = engine.resolve_submission(&outcome);
                }
            }
        }
        Some(capture(&engine))
    })
}

fn capture<C>(engine: &Engine<C, Submissions>) -> Frame
where
    C: Clock,
{
    let session = engine.session();
    let gates = engine.gates();
    Frame::capture(FrameSource {
        session: &session,
        gates: &gates,
        geometry: rules::GEOMETRY,
        seconds_left: engine.seconds_left(),
        banner: engine.banner(),
        now: engine.clock().now(),
    })
    .with_summary(engine.summary().map(summary_presentation))
}

fn summary_presentation(summary: &SessionSummary) -> SummaryPresentation {
    SummaryPresentation {
        title: summary.title().to_owned(),
        score_line: summary.score_line(),
        rank_line: summary.rank_line(),
    }
}

fn local_entries(settings: &Settings, limit: usize) -> Vec<LeaderboardEntry> {
    LocalScoreStore::new(settings.local_scores.clone())
        .load_local_scores()
        .into_iter()
        .take(limit)
        .map(|score| LeaderboardEntry {
            id: score.remote_id.unwrap_or_else(|| RecordId::new("local")),
            name: score.name,
            score: score.score,
            timestamp: score.timestamp,
        })
        .collect()
}

/// Clocks the session loop can step between frames.
trait Pace: Clock {
    fn step(&mut self, dt: Duration);
}

impl Pace for SystemClock {
    fn step(&mut self, _dt: Duration) {}
}

impl Pace for ManualClock {
    fn step(&mut self, dt: Duration) {
        self.advance(dt);
    }
}

/// Where finished sessions are sent.
#[derive(Debug)]
enum Submissions {
    Online(SubmissionWorker),
    Offline(LocalScoreStore),
}

impl Submissions {
    fn poll(&self) -> Option<SubmissionOutcome> {
        match self {
            Self::Online(worker) => worker.try_outcome(),
            Self::Offline(_) => None,
        }
    }

    fn wait(&self, timeout: Duration) -> Option<SubmissionOutcome> {
        match self {
            Self::Online(worker) => worker.wait_outcome(timeout),
            Self::Offline(_) => None,
        }
    }
}

impl ScoreReporter for Submissions {
    fn report(&mut self, submission: ScoreSubmission) {
        match self {
            Self::Online(worker) => worker.report(submission),
            Self::Offline(store) => {
                if let Err(error) = store.persist_local_score(
                    &submission.name,
                    submission.score,
                    submission.timestamp,
                    None,
                ) {
                    warn!(%error, "local score not saved");
                }
            }
        }
    }
}

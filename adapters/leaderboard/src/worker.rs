use std::{
    io,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use defense_arcade_core::{Leaderboard, ScoreReporter, ScoreSubmission, SubmissionOutcome};
use tracing::{info, warn};

use crate::{rank::rank_of, LocalScoreStore};

const QUEUE_CAPACITY: usize = 16;

/// Uploads a score, looks up its rank and records it locally.
///
/// Leaderboard failures are logged and leave the outcome without a key or
/// rank. The local cache is written regardless.
pub fn submit_and_rank<L>(
    leaderboard: &L,
    store: Option<&LocalScoreStore>,
    submission: ScoreSubmission,
    limit: usize,
) -> SubmissionOutcome
where
    L: Leaderboard + ?Sized,
{
    let record_id = match leaderboard.submit_score(&submission) {
        Ok(id) => Some(id),
        Err(error) => {
            warn!(%error, player = %submission.name, "score upload failed");
            None
        }
    };

    let rank = match leaderboard.fetch_top_scores(limit) {
        Ok(entries) => rank_of(&entries, record_id.as_ref(), &submission),
        Err(error) => {
            warn!(%error, "leaderboard fetch failed");
            None
        }
    };

    if let Some(store) = store {
        if let Err(error) = store.persist_local_score(
            &submission.name,
            submission.score,
            submission.timestamp,
            record_id.clone(),
        ) {
            warn!(%error, path = %store.path().display(), "local score not saved");
        }
    }

    info!(
        player = %submission.name,
        score = submission.score,
        rank = ?rank,
        "score submitted"
    );
    SubmissionOutcome {
        submission,
        record_id,
        rank,
    }
}

/// Background thread that delivers finished sessions to the leaderboard.
///
/// Reporting only enqueues the score; outcomes are polled by the frame
/// loop. Dropping the worker finishes the queued submissions first.
#[derive(Debug)]
pub struct SubmissionWorker {
    submissions: Option<Sender<ScoreSubmission>>,
    outcomes: Receiver<SubmissionOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl SubmissionWorker {
    /// Starts the worker thread.
    pub fn spawn<L>(
        leaderboard: L,
        store: Option<LocalScoreStore>,
        limit: usize,
    ) -> io::Result<Self>
    where
        L: Leaderboard + Send + 'static,
    {
        let (submissions, queue) = bounded::<ScoreSubmission>(QUEUE_CAPACITY);
        let (results, outcomes) = unbounded();
        let handle = thread::Builder::new()
            .name("score-submission".to_owned())
            .spawn(move || {
                for submission in queue.iter() {
                    let outcome = submit_and_rank(&leaderboard, store.as_ref(), submission, limit);
                    if results.send(outcome).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            submissions: Some(submissions),
            outcomes,
            handle: Some(handle),
        })
    }

    /// Returns a finished outcome without waiting.
    #[must_use]
    pub fn try_outcome(&self) -> Option<SubmissionOutcome> {
        self.outcomes.try_recv().ok()
    }

    /// Waits up to `timeout` for the next finished outcome.
    #[must_use]
    pub fn wait_outcome(&self, timeout: Duration) -> Option<SubmissionOutcome> {
        match self.outcomes.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl ScoreReporter for SubmissionWorker {
    fn report(&mut self, submission: ScoreSubmission) {
        let Some(sender) = &self.submissions else {
            return;
        };
        match sender.try_send(submission) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(player = %dropped.name, "submission queue full, score dropped");
            }
            Err(TrySendError::Disconnected(dropped)) => {
                warn!(player = %dropped.name, "submission worker stopped, score dropped");
            }
        }
    }
}

impl Drop for SubmissionWorker {
    fn drop(&mut self) {
        drop(self.submissions.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("submission worker panicked");
            }
        }
    }
}

use std::{fs, path::PathBuf, sync::Mutex, time::Duration};

use defense_arcade_core::{
    ranking_order, Leaderboard, LeaderboardEntry, LeaderboardError, RecordId, ScoreReporter,
    ScoreSubmission,
};
use defense_arcade_leaderboard::{submit_and_rank, LocalScoreStore, SubmissionWorker};

#[derive(Debug, Default)]
struct FakeLeaderboard {
    rows: Mutex<Vec<LeaderboardEntry>>,
    offline: bool,
}

impl FakeLeaderboard {
    fn with_rows(rows: Vec<LeaderboardEntry>) -> Self {
        Self {
            rows: Mutex::new(rows),
            offline: false,
        }
    }

    fn offline() -> Self {
        Self {
            rows: Mutex::default(),
            offline: true,
        }
    }

    fn check_online(&self) -> Result<(), LeaderboardError> {
        if self.offline {
            Err(LeaderboardError::Transport("connection refused".to_owned()))
        } else {
            Ok(())
        }
    }
}

impl Leaderboard for FakeLeaderboard {
    fn submit_score(&self, submission: &ScoreSubmission) -> Result<RecordId, LeaderboardError> {
        self.check_online()?;
        let mut rows = self.rows.lock().expect("rows lock");
        let id = RecordId::new(format!("-k{}", rows.len()));
        rows.push(LeaderboardEntry {
            id: id.clone(),
            name: submission.name.clone(),
            score: submission.score,
            timestamp: submission.timestamp,
        });
        Ok(id)
    }

    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        self.check_online()?;
        let mut rows = self.rows.lock().expect("rows lock").clone();
        rows.sort_by(|a, b| ranking_order((a.score, a.timestamp), (b.score, b.timestamp)));
        rows.truncate(limit);
        Ok(rows)
    }

    fn clear_all_scores(&self) -> Result<(), LeaderboardError> {
        self.check_online()?;
        self.rows.lock().expect("rows lock").clear();
        Ok(())
    }
}

fn scratch_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir()
        .join(format!("defense-arcade-{}", std::process::id()))
        .join(format!("{name}.json"));
    let _ = fs::remove_file(&path);
    path
}

fn submission(name: &str, score: i64, timestamp: u64) -> ScoreSubmission {
    ScoreSubmission {
        name: name.to_owned(),
        score,
        timestamp,
    }
}

#[test]
fn submitted_score_is_ranked_by_its_key_and_cached() {
    let leaderboard = FakeLeaderboard::with_rows(vec![LeaderboardEntry {
        id: RecordId::new("-old"),
        name: "grace".to_owned(),
        score: 1_000,
        timestamp: 1,
    }]);
    let store = LocalScoreStore::new(scratch_file("ranked"));

    let outcome = submit_and_rank(&leaderboard, Some(&store), submission("ada", 500, 9), 20);

    assert_eq!(outcome.record_id, Some(RecordId::new("-k1")));
    assert_eq!(outcome.rank, Some(2));
    let cached = store.load_local_scores();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].name, "ada");
    assert_eq!(cached[0].remote_id, Some(RecordId::new("-k1")));
}

#[test]
fn offline_leaderboard_still_records_locally() {
    let store = LocalScoreStore::new(scratch_file("offline"));

    let outcome = submit_and_rank(
        &FakeLeaderboard::offline(),
        Some(&store),
        submission("ada", 250, 3),
        20,
    );

    assert_eq!(outcome.record_id, None);
    assert_eq!(outcome.rank, None);
    let cached = store.load_local_scores();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].remote_id, None);
}

#[test]
fn scores_outside_the_top_list_have_no_rank() {
    let rows = (0..3)
        .map(|index| LeaderboardEntry {
            id: RecordId::new(format!("-top{index}")),
            name: "grace".to_owned(),
            score: 5_000,
            timestamp: index,
        })
        .collect();
    let leaderboard = FakeLeaderboard::with_rows(rows);

    let outcome = submit_and_rank(&leaderboard, None, submission("ada", -100, 9), 3);

    assert!(outcome.record_id.is_some());
    assert_eq!(outcome.rank, None);
}

#[test]
fn local_cache_keeps_the_best_fifty() {
    let store = LocalScoreStore::new(scratch_file("capped"));

    for index in 0..55u64 {
        let score = i64::try_from(index % 11).expect("small") * 100;
        store
            .persist_local_score("ada", score, index, None)
            .expect("cache writable");
    }

    let cached = store.load_local_scores();
    assert_eq!(cached.len(), 50);
    assert_eq!(cached[0].score, 1_000);
    assert_eq!(cached[0].timestamp, 10);
    assert!(cached
        .windows(2)
        .all(|pair| ranking_order((pair[0].score, pair[0].timestamp), (pair[1].score, pair[1].timestamp))
            .is_le()));
}

#[test]
fn malformed_cache_loads_empty_and_is_replaced() {
    let path = scratch_file("malformed");
    fs::create_dir_all(path.parent().expect("scratch dir")).expect("scratch dir");
    fs::write(&path, "{ not json").expect("seed file");
    let store = LocalScoreStore::new(path);

    assert!(store.load_local_scores().is_empty());
    store
        .persist_local_score("ada", 50, 1, None)
        .expect("cache writable");
    assert_eq!(store.load_local_scores().len(), 1);
}

#[test]
fn blank_names_are_not_cached() {
    let store = LocalScoreStore::new(scratch_file("blank"));
    store
        .persist_local_score("", 50, 1, None)
        .expect("nothing to write");
    assert!(store.load_local_scores().is_empty());
}

#[test]
fn worker_reports_outcomes_in_the_background() {
    let mut worker =
        SubmissionWorker::spawn(FakeLeaderboard::default(), None, 20).expect("worker starts");

    worker.report(submission("ada", 700, 11));

    let outcome = worker
        .wait_outcome(Duration::from_secs(5))
        .expect("outcome delivered");
    assert_eq!(outcome.submission, submission("ada", 700, 11));
    assert_eq!(outcome.rank, Some(1));
    assert!(worker.try_outcome().is_none());
}

#[test]
fn dropping_the_worker_flushes_queued_scores() {
    let path = scratch_file("flushed");
    let mut worker = SubmissionWorker::spawn(
        FakeLeaderboard::offline(),
        Some(LocalScoreStore::new(path.clone())),
        20,
    )
    .expect("worker starts");

    worker.report(submission("ada", 100, 1));
    worker.report(submission("grace", 300, 2));
    drop(worker);

    let cached = LocalScoreStore::new(path).load_local_scores();
    let names: Vec<&str> = cached.iter().map(|score| score.name.as_str()).collect();
    assert_eq!(names, vec!["grace", "ada"]);
}

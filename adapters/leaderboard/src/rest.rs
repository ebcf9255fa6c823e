use std::time::Duration;

use defense_arcade_core::{
    ranking_order, Leaderboard, LeaderboardEntry, LeaderboardError, RecordId, ScoreSubmission,
};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Database the arcade cabinet ships with.
pub const DEFAULT_BASE_URL: &str = "https://roadshowgame-default-rtdb.firebaseio.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const ANONYMOUS: &str = "Anon";

/// Global leaderboard stored under `{base}/scores.json`.
#[derive(Clone, Debug)]
pub struct RestLeaderboard {
    client: Client,
    scores_url: String,
}

impl RestLeaderboard {
    /// Creates a leaderboard client for the database at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, LeaderboardError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| LeaderboardError::Transport(error.to_string()))?;
        Ok(Self {
            client,
            scores_url: format!("{}/scores.json", base_url.trim_end_matches('/')),
        })
    }

    /// Endpoint every request targets.
    #[must_use]
    pub fn scores_url(&self) -> &str {
        &self.scores_url
    }
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl Leaderboard for RestLeaderboard {
    fn submit_score(&self, submission: &ScoreSubmission) -> Result<RecordId, LeaderboardError> {
        debug!(url = %self.scores_url, score = submission.score, "posting score");
        let response = self
            .client
            .post(&self.scores_url)
            .json(submission)
            .send()
            .map_err(transport)?;
        let pushed: PushResponse = checked(response)?
            .json()
            .map_err(|error| LeaderboardError::Payload(error.to_string()))?;
        Ok(RecordId::new(pushed.name))
    }

    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let response = self
            .client
            .get(&self.scores_url)
            .send()
            .map_err(transport)?;
        let body: Value = checked(response)?
            .json()
            .map_err(|error| LeaderboardError::Payload(error.to_string()))?;
        parse_scores(&body, limit)
    }

    fn clear_all_scores(&self) -> Result<(), LeaderboardError> {
        let response = self
            .client
            .delete(&self.scores_url)
            .send()
            .map_err(transport)?;
        let _ = checked(response)?;
        Ok(())
    }
}

fn transport(error: reqwest::Error) -> LeaderboardError {
    LeaderboardError::Transport(error.to_string())
}

fn checked(response: Response) -> Result<Response, LeaderboardError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!(%status, "leaderboard rejected request");
        Err(LeaderboardError::Status(status.as_u16()))
    }
}

/// Decodes the keyed `scores` object into ranked rows.
///
/// An empty database answers `null`. Rows with a missing name are shown as
/// anonymous and scores that are not numbers count as zero.
pub(crate) fn parse_scores(
    body: &Value,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
    let rows = match body {
        Value::Null => return Ok(Vec::new()),
        Value::Object(rows) => rows,
        other => {
            return Err(LeaderboardError::Payload(format!(
                "expected an object of scores, found {other}"
            )))
        }
    };

    let mut entries: Vec<LeaderboardEntry> = rows
        .iter()
        .map(|(id, row)| LeaderboardEntry {
            id: RecordId::new(id.as_str()),
            name: row
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .unwrap_or(ANONYMOUS)
                .to_owned(),
            score: row.get("score").map_or(0, score_value),
            timestamp: row.get("timestamp").and_then(Value::as_u64).unwrap_or(0),
        })
        .collect();

    entries.sort_by(|a, b| ranking_order((a.score, a.timestamp), (b.score, b.timestamp)));
    entries.truncate(limit);
    Ok(entries)
}

fn score_value(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64))
            .unwrap_or(0),
        Value::String(text) => leading_integer(text),
        _ => 0,
    }
}

// Mirrors how the web client reads hand-edited rows: "120pts" counts as 120.
fn leading_integer(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    trimmed[..sign_len + digits].parse().unwrap_or(0)
}

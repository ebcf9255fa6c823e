use defense_arcade_core::{LeaderboardEntry, RecordId, ScoreSubmission};

/// One-based position of a submitted score within a fetched top list.
///
/// The record key wins when present. Otherwise the row is matched on
/// name, score and timestamp. Returns `None` when the score did not make
/// the list.
#[must_use]
pub fn rank_of(
    entries: &[LeaderboardEntry],
    record: Option<&RecordId>,
    submission: &ScoreSubmission,
) -> Option<u32> {
    let by_id = record.and_then(|id| entries.iter().position(|entry| &entry.id == id));
    let index = by_id.or_else(|| {
        entries.iter().position(|entry| {
            entry.name == submission.name
                && entry.score == submission.score
                && entry.timestamp == submission.timestamp
        })
    })?;
    u32::try_from(index + 1).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, score: i64, timestamp: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            id: RecordId::new(id),
            name: name.to_owned(),
            score,
            timestamp,
        }
    }

    fn submission() -> ScoreSubmission {
        ScoreSubmission {
            name: "ada".to_owned(),
            score: 900,
            timestamp: 42,
        }
    }

    #[test]
    fn record_key_decides_the_rank() {
        let entries = vec![
            entry("-a", "grace", 1_200, 1),
            entry("-b", "ada", 900, 42),
            entry("-c", "ada", 900, 42),
        ];
        assert_eq!(
            rank_of(&entries, Some(&RecordId::new("-c")), &submission()),
            Some(3)
        );
    }

    #[test]
    fn falls_back_to_matching_the_row() {
        let entries = vec![entry("-a", "grace", 1_200, 1), entry("-b", "ada", 900, 42)];
        assert_eq!(rank_of(&entries, None, &submission()), Some(2));
        assert_eq!(
            rank_of(&entries, Some(&RecordId::new("-gone")), &submission()),
            Some(2)
        );
    }

    #[test]
    fn scores_outside_the_list_have_no_rank() {
        let entries = vec![entry("-a", "grace", 1_200, 1), entry("-b", "ada", 900, 43)];
        assert_eq!(rank_of(&entries, None, &submission()), None);
        assert_eq!(rank_of(&[], None, &submission()), None);
    }
}

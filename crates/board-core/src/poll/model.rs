//! Poll data models

use crate::types::{PollId, PollOptionId, VoteId, VoterId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single-question community poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    /// At most one poll is active at a time
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One answer of a poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: PollOptionId,
    pub poll_id: PollId,
    pub text: String,
}

/// A voter's choice in a poll; unique per (poll, voter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollVote {
    pub id: VoteId,
    pub poll_id: PollId,
    pub option_id: PollOptionId,
    pub voter_id: VoterId,
    pub created_at: DateTime<Utc>,
}

/// Derived tally of one option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionResult {
    pub option: PollOption,
    pub count: usize,
    /// round(count / total * 100); 0 when nobody voted
    pub percentage: u32,
}

/// Derived results of a poll. Percentages are rounded independently and
/// need not sum to 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResults {
    pub poll_id: PollId,
    pub total: usize,
    pub options: Vec<OptionResult>,
}

/// Percentage of `count` in `total`, rounded half up
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * count + total) / (2 * total)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(1, 200), 1);
        assert_eq!(percentage(1, 201), 0);
    }

    #[test]
    fn test_percentages_may_not_sum_to_100() {
        let total = 3;
        let sum: u32 = [1, 1, 1].iter().map(|c| percentage(*c, total)).sum();
        assert_eq!(sum, 99);
    }
}

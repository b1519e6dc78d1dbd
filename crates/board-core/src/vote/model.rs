//! Vote data models

use crate::types::{SubmissionId, VoteId, VoterId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One voter's upvote of one submission; never updated or deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub submission_id: SubmissionId,
    pub voter_id: VoterId,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(submission_id: SubmissionId, voter_id: VoterId) -> Self {
        Self {
            id: VoteId::new(),
            submission_id,
            voter_id,
            created_at: Utc::now(),
        }
    }
}

/// Result of casting a vote. A repeated vote is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    /// A new vote row was written
    Recorded,
    /// The voter had already voted; nothing was written
    AlreadyVoted,
}

impl VoteOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, VoteOutcome::Recorded)
    }

    /// Apply the outcome to a displayed count
    pub fn apply_to(&self, count: usize) -> usize {
        match self {
            VoteOutcome::Recorded => count + 1,
            VoteOutcome::AlreadyVoted => count,
        }
    }
}

//! Comment data models

use crate::types::{CommentId, SubmissionId, VoterId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on a submission as stored in the `comments` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment identifier
    pub id: CommentId,
    /// Submission the comment belongs to
    pub submission_id: SubmissionId,
    /// Voter id of the author
    pub author_id: VoterId,
    /// Trimmed comment content
    pub content: String,
    /// Show "Anonymous" instead of the author's name
    #[serde(default)]
    pub anonymous: bool,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

/// A comment resolved for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    pub id: CommentId,
    pub content: String,
    /// Author's profile name, "Anonymous", or "Unknown"
    pub display_name: String,
    /// Omitted for anonymous comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<VoterId>,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// The ordered comments of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentThread {
    pub submission_id: SubmissionId,
    /// Oldest first
    pub entries: Vec<CommentEntry>,
}

impl CommentThread {
    /// Number of comments, derived from the fetched entries
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Submission data models

use super::description::Description;
use crate::types::{SubmissionId, VoterId, ANONYMOUS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A workplace pain point as stored in the `submissions` collection.
///
/// This is the raw record and carries the submitter's identity even when
/// `anonymous` is set. Read paths hand out [`SubmissionView`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Unique submission identifier
    pub id: SubmissionId,
    /// Trimmed, non-empty title
    pub title: String,
    /// Description in its stored text form (see [`Description`])
    #[serde(default)]
    pub description: Option<String>,
    /// Voter id of the submitter
    pub submitter_id: VoterId,
    /// Display name of the submitter
    pub submitter_name: String,
    /// Submitter's department
    #[serde(default)]
    pub department: Option<String>,
    /// Hide submitter name and department on every read path
    #[serde(default)]
    pub anonymous: bool,
    /// Moderation status
    pub status: SubmissionStatus,
    /// When the submission was created
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Parse the stored description text
    pub fn parsed_description(&self) -> Description {
        Description::parse(self.description.as_deref())
    }

    /// Redacted projection for display
    pub fn view(&self) -> SubmissionView {
        SubmissionView::from(self)
    }
}

/// Moderation status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Awaiting moderation
    Pending,
    /// Publicly visible, open for votes and comments
    Approved,
    /// Turned down by a moderator
    Rejected,
    /// Hidden from the public listing, restorable
    Archived,
}

impl SubmissionStatus {
    /// All statuses, in admin tab order
    pub const ALL: [SubmissionStatus; 4] = [
        SubmissionStatus::Pending,
        SubmissionStatus::Approved,
        SubmissionStatus::Rejected,
        SubmissionStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Archived => "archived",
        }
    }

    /// Parse from its lowercase name
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(SubmissionStatus::Pending),
            "approved" => Some(SubmissionStatus::Approved),
            "rejected" => Some(SubmissionStatus::Rejected),
            "archived" => Some(SubmissionStatus::Archived),
            _ => None,
        }
    }

    /// Whether the submission is visible to voters and commenters
    pub fn is_public(&self) -> bool {
        matches!(self, SubmissionStatus::Approved)
    }
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        SubmissionStatus::Pending
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-side projection of a submission with anonymity applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionView {
    pub id: SubmissionId,
    pub title: String,
    pub description: Description,
    /// Submitter display name, or "Anonymous"
    pub submitter: String,
    /// Always `None` for anonymous submissions
    pub department: Option<String>,
    pub anonymous: bool,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Submission> for SubmissionView {
    fn from(s: &Submission) -> Self {
        let (submitter, department) = if s.anonymous {
            (ANONYMOUS.to_string(), None)
        } else {
            (s.submitter_name.clone(), s.department.clone())
        };

        Self {
            id: s.id,
            title: s.title.clone(),
            description: s.parsed_description(),
            submitter,
            department,
            anonymous: s.anonymous,
            status: s.status,
            created_at: s.created_at,
        }
    }
}

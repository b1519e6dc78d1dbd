//! Moderation workflow over submission status
//!
//! ```text
//!   pending --approve--> approved --archive--> archived
//!      |                    |   ^                  |
//!      |                    |   +-----restore------+
//!    reject               reject
//!      v                    v
//!   rejected <--------------+
//! ```
//!
//! `rejected` has no outgoing transition.

use crate::error::{BoardError, Result};
use crate::identity::Actor;
use crate::store::BackingStore;
use crate::submission::{SubmissionStatus, SubmissionView};
use crate::types::SubmissionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// An admin action on a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Reject,
    Archive,
    /// Bring an archived submission back; lands on `approved`
    Restore,
}

impl ModerationAction {
    pub const ALL: [ModerationAction; 4] = [
        ModerationAction::Approve,
        ModerationAction::Reject,
        ModerationAction::Archive,
        ModerationAction::Restore,
    ];

    /// Status written by this action
    pub fn target(&self) -> SubmissionStatus {
        match self {
            ModerationAction::Approve | ModerationAction::Restore => SubmissionStatus::Approved,
            ModerationAction::Reject => SubmissionStatus::Rejected,
            ModerationAction::Archive => SubmissionStatus::Archived,
        }
    }

    /// Whether the action is legal from the given status
    pub fn is_allowed_from(&self, from: SubmissionStatus) -> bool {
        use ModerationAction::*;
        use SubmissionStatus::*;

        matches!(
            (from, self),
            (Pending, Approve)
                | (Pending, Reject)
                | (Approved, Reject)
                | (Approved, Archive)
                | (Archived, Restore)
                | (Archived, Approve)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Approve => "approve",
            ModerationAction::Reject => "reject",
            ModerationAction::Archive => "archive",
            ModerationAction::Restore => "restore",
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions a moderator may be offered for a submission in `status`
pub fn allowed_actions(status: SubmissionStatus) -> Vec<ModerationAction> {
    match status {
        SubmissionStatus::Pending => vec![ModerationAction::Approve, ModerationAction::Reject],
        SubmissionStatus::Approved => vec![ModerationAction::Reject, ModerationAction::Archive],
        SubmissionStatus::Archived => vec![ModerationAction::Restore],
        SubmissionStatus::Rejected => vec![],
    }
}

/// Transitions a submission's status
#[derive(Clone)]
pub struct ModerationWorkflow {
    store: Arc<dyn BackingStore>,
    enforce_transitions: bool,
}

impl ModerationWorkflow {
    /// Create a workflow that enforces the state machine
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            enforce_transitions: true,
        }
    }

    /// Toggle state machine enforcement; when off, any action writes its
    /// target status
    pub fn enforce_transitions(mut self, enforce: bool) -> Self {
        self.enforce_transitions = enforce;
        self
    }

    /// Apply an action to a submission
    pub fn transition(&self, id: &SubmissionId, action: ModerationAction) -> Result<SubmissionView> {
        let current = self
            .store
            .get_submission(id)?
            .ok_or_else(|| BoardError::not_found("Submission", id))?;

        if !action.is_allowed_from(current.status) {
            if self.enforce_transitions {
                return Err(BoardError::IllegalTransition {
                    from: current.status,
                    action,
                });
            }
            warn!(
                "Applying {} to submission {} from {} without enforcement",
                action, id, current.status
            );
        }

        let updated = self.store.set_submission_status(id, action.target())?;
        info!(
            "Submission {}: {} -> {} ({})",
            id, current.status, updated.status, action
        );
        Ok(updated.view())
    }

    /// Apply an action on behalf of an actor, who must be an admin
    pub fn transition_as(
        &self,
        actor: &Actor,
        id: &SubmissionId,
        action: ModerationAction,
    ) -> Result<SubmissionView> {
        actor.require_admin()?;
        self.transition(id, action)
    }
}

//! Board facade: the five components over one shared backing store

use crate::comment::CommentLedger;
use crate::config::Config;
use crate::error::Result;
use crate::identity::VoterIdentity;
use crate::interest::InterestRegistry;
use crate::moderation::ModerationWorkflow;
use crate::poll::PollSubsystem;
use crate::store::BackingStore;
use crate::submission::{SubmissionStatus, SubmissionStore, SubmissionView};
use crate::types::SubmissionId;
use crate::vote::{VoteLedger, VoteOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// One row of the public listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub submission: SubmissionView,
    pub vote_count: usize,
    pub comment_count: usize,
    pub has_voted: bool,
}

impl SubmissionSummary {
    /// Fold a vote outcome into the displayed count
    pub fn apply_vote(&mut self, outcome: VoteOutcome) {
        self.vote_count = outcome.apply_to(self.vote_count);
        self.has_voted = true;
    }
}

/// Composition root for the board components
#[derive(Clone)]
pub struct Board {
    store: Arc<dyn BackingStore>,
    submissions: SubmissionStore,
    moderation: ModerationWorkflow,
    votes: VoteLedger,
    comments: CommentLedger,
    polls: PollSubsystem,
    interest: InterestRegistry,
}

impl Board {
    /// Components with default limits
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self::with_config(store, &Config::default())
    }

    /// Components with limits taken from the config
    pub fn with_config(store: Arc<dyn BackingStore>, config: &Config) -> Self {
        Self {
            submissions: SubmissionStore::new(store.clone())
                .with_max_title_length(config.submissions.max_title_length),
            moderation: ModerationWorkflow::new(store.clone())
                .enforce_transitions(config.moderation.enforce_transitions),
            votes: VoteLedger::new(store.clone()),
            comments: CommentLedger::new(store.clone())
                .with_max_length(config.comments.max_length),
            polls: PollSubsystem::new(store.clone())
                .with_min_options(config.polls.min_options),
            interest: InterestRegistry::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }

    pub fn submissions(&self) -> &SubmissionStore {
        &self.submissions
    }

    pub fn moderation(&self) -> &ModerationWorkflow {
        &self.moderation
    }

    pub fn votes(&self) -> &VoteLedger {
        &self.votes
    }

    pub fn comments(&self) -> &CommentLedger {
        &self.comments
    }

    pub fn polls(&self) -> &PollSubsystem {
        &self.polls
    }

    pub fn interest(&self) -> &InterestRegistry {
        &self.interest
    }

    /// The public listing: approved submissions, newest first, with counts.
    ///
    /// A failed aggregate read shows zero counts instead of failing the
    /// listing; a failed submission read is an error.
    pub fn approved(&self, voter: Option<&VoterIdentity>) -> Result<Vec<SubmissionSummary>> {
        let views = self.submissions.list_by_status(SubmissionStatus::Approved)?;

        let vote_counts = self.votes.counts().unwrap_or_else(|e| {
            warn!("Vote counts unavailable, showing 0: {}", e);
            HashMap::new()
        });
        let comment_counts = self.comments.counts().unwrap_or_else(|e| {
            warn!("Comment counts unavailable, showing 0: {}", e);
            HashMap::new()
        });

        Ok(views
            .into_iter()
            .map(|view| {
                let has_voted = voter
                    .map(|v| self.has_voted_or_false(&view.id, v))
                    .unwrap_or(false);
                SubmissionSummary {
                    vote_count: vote_counts.get(&view.id).copied().unwrap_or(0),
                    comment_count: comment_counts.get(&view.id).copied().unwrap_or(0),
                    has_voted,
                    submission: view,
                }
            })
            .collect())
    }

    /// Summary of a single submission in any status
    pub fn summary(
        &self,
        id: &SubmissionId,
        voter: Option<&VoterIdentity>,
    ) -> Result<SubmissionSummary> {
        let submission = self.submissions.get(id)?;
        let vote_count = self.votes.count(id).unwrap_or_else(|e| {
            warn!("Vote count for {} unavailable, showing 0: {}", id, e);
            0
        });
        let comment_count = self.comments.count(id).unwrap_or_else(|e| {
            warn!("Comment count for {} unavailable, showing 0: {}", id, e);
            0
        });
        let has_voted = voter
            .map(|v| self.has_voted_or_false(id, v))
            .unwrap_or(false);

        Ok(SubmissionSummary {
            submission,
            vote_count,
            comment_count,
            has_voted,
        })
    }

    fn has_voted_or_false(&self, id: &SubmissionId, voter: &VoterIdentity) -> bool {
        self.votes.has_voted(id, voter).unwrap_or_else(|e| {
            warn!("Vote state for {} unavailable: {}", id, e);
            voter.remembers_submission(id)
        })
    }
}

//! The single active community poll

use super::model::{percentage, OptionResult, Poll, PollOption, PollResults, PollVote};
use crate::error::{BoardError, Result};
use crate::identity::{Actor, VoterIdentity};
use crate::store::BackingStore;
use crate::types::{PollId, PollOptionId, VoteId};
use crate::validator::TextRule;
use crate::vote::VoteOutcome;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Minimum number of options per poll (default)
pub const MIN_POLL_OPTIONS: usize = 2;

/// Poll voting, structured like the submission vote ledger
#[derive(Clone)]
pub struct PollSubsystem {
    store: Arc<dyn BackingStore>,
    min_options: usize,
}

impl PollSubsystem {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            min_options: MIN_POLL_OPTIONS,
        }
    }

    /// Override the minimum option count for new polls
    pub fn with_min_options(mut self, min_options: usize) -> Self {
        self.min_options = min_options.max(1);
        self
    }

    /// The active poll, if any. Should the store hold several active polls,
    /// the newest wins.
    pub fn active_poll(&self) -> Result<Option<Poll>> {
        Ok(self
            .store
            .list_polls()?
            .into_iter()
            .filter(|p| p.is_active)
            .max_by_key(|p| p.created_at))
    }

    /// Options of a poll, in store order
    pub fn list_options(&self, poll_id: &PollId) -> Result<Vec<PollOption>> {
        self.store.list_poll_options(poll_id)
    }

    /// Whether the voter has voted in a poll (local history first)
    pub fn has_voted(&self, poll_id: &PollId, voter: &VoterIdentity) -> Result<bool> {
        if voter.remembers_poll(poll_id) {
            return Ok(true);
        }

        let voted = self
            .store
            .list_poll_votes(poll_id)?
            .iter()
            .any(|v| &v.voter_id == voter.voter_id());

        if voted {
            remember(voter, poll_id);
        }
        Ok(voted)
    }

    /// Cast a vote for an option; voting again is a successful no-op
    pub fn cast_vote(
        &self,
        poll_id: &PollId,
        option_id: &PollOptionId,
        voter: &VoterIdentity,
    ) -> Result<VoteOutcome> {
        if voter.remembers_poll(poll_id) {
            debug!("Local history already has a vote in poll {}", poll_id);
            return Ok(VoteOutcome::AlreadyVoted);
        }

        let poll = self.poll(poll_id)?;
        if !poll.is_active {
            return Err(BoardError::Validation(format!(
                "Poll {} is no longer active",
                poll_id
            )));
        }
        if !self.list_options(poll_id)?.iter().any(|o| &o.id == option_id) {
            return Err(BoardError::Validation(format!(
                "Option {} does not belong to poll {}",
                option_id, poll_id
            )));
        }

        let vote = PollVote {
            id: VoteId::new(),
            poll_id: *poll_id,
            option_id: *option_id,
            voter_id: voter.voter_id().clone(),
            created_at: Utc::now(),
        };
        match self.store.insert_poll_vote(&vote) {
            Ok(()) => {
                info!("Recorded poll vote by {} in {}", voter.voter_id(), poll_id);
                remember(voter, poll_id);
                Ok(VoteOutcome::Recorded)
            }
            Err(e) if e.is_duplicate_vote() => {
                info!(
                    "Duplicate poll vote by {} in {} treated as already voted",
                    voter.voter_id(),
                    poll_id
                );
                remember(voter, poll_id);
                Ok(VoteOutcome::AlreadyVoted)
            }
            Err(e) => Err(e),
        }
    }

    /// Tally a poll without the voting gate
    pub fn results(&self, poll_id: &PollId) -> Result<PollResults> {
        let options = self.list_options(poll_id)?;
        let known: HashSet<PollOptionId> = options.iter().map(|o| o.id).collect();

        let mut counts: HashMap<PollOptionId, usize> = HashMap::new();
        for vote in self.store.list_poll_votes(poll_id)? {
            if known.contains(&vote.option_id) {
                *counts.entry(vote.option_id).or_insert(0) += 1;
            }
        }

        let total: usize = counts.values().sum();
        let options = options
            .into_iter()
            .map(|option| {
                let count = counts.get(&option.id).copied().unwrap_or(0);
                OptionResult {
                    option,
                    count,
                    percentage: percentage(count, total),
                }
            })
            .collect();

        Ok(PollResults {
            poll_id: *poll_id,
            total,
            options,
        })
    }

    /// Tally a poll for a voter; locked until the voter has voted
    pub fn results_for(&self, poll_id: &PollId, voter: &VoterIdentity) -> Result<PollResults> {
        if !self.has_voted(poll_id, voter)? {
            return Err(BoardError::ResultsLocked);
        }
        self.results(poll_id)
    }

    /// Create and activate a new poll, deactivating the current one
    pub fn create_poll(&self, actor: &Actor, question: &str, options: &[&str]) -> Result<Poll> {
        actor.require_admin()?;
        let question = TextRule::new("Question", 500).check(question)?;

        let option_rule = TextRule::new("Option", 200);
        let mut texts: Vec<&str> = Vec::with_capacity(options.len());
        for option in options {
            let text = option_rule.check(option)?;
            if texts.iter().any(|t| t.eq_ignore_ascii_case(text)) {
                return Err(BoardError::Validation(format!(
                    "Duplicate poll option '{}'",
                    text
                )));
            }
            texts.push(text);
        }
        if texts.len() < self.min_options {
            return Err(BoardError::Validation(format!(
                "A poll needs at least {} options",
                self.min_options
            )));
        }

        let poll = Poll {
            id: PollId::new(),
            question: question.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        let options: Vec<PollOption> = texts
            .into_iter()
            .map(|text| PollOption {
                id: PollOptionId::new(),
                poll_id: poll.id,
                text: text.to_string(),
            })
            .collect();

        for replaced in self.store.insert_poll(&poll, &options)? {
            warn!("Deactivated poll {} in favour of poll {}", replaced, poll.id);
        }
        info!("Created poll {} with {} options", poll.id, options.len());
        Ok(poll)
    }

    fn poll(&self, poll_id: &PollId) -> Result<Poll> {
        self.store
            .list_polls()?
            .into_iter()
            .find(|p| &p.id == poll_id)
            .ok_or_else(|| BoardError::not_found("Poll", poll_id))
    }
}

fn remember(voter: &VoterIdentity, poll_id: &PollId) {
    if let Err(e) = voter.remember_poll(poll_id) {
        warn!("Failed to update local poll history: {}", e);
    }
}

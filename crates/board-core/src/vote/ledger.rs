//! Submission vote ledger

use super::model::{Vote, VoteOutcome};
use crate::error::{BoardError, Result};
use crate::identity::VoterIdentity;
use crate::store::BackingStore;
use crate::types::SubmissionId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Records votes and derives per-submission counts.
///
/// Counts are recomputed from the vote rows on every read; there is no
/// stored counter to drift.
#[derive(Clone)]
pub struct VoteLedger {
    store: Arc<dyn BackingStore>,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self { store }
    }

    /// Whether the voter has voted on a submission.
    ///
    /// Answers from the local history when it knows; otherwise asks the
    /// store and repairs the local history on a hit.
    pub fn has_voted(&self, submission_id: &SubmissionId, voter: &VoterIdentity) -> Result<bool> {
        if voter.remembers_submission(submission_id) {
            return Ok(true);
        }

        let voted = self
            .store
            .votes_for(submission_id)?
            .iter()
            .any(|v| &v.voter_id == voter.voter_id());

        if voted {
            remember(voter, submission_id);
        }
        Ok(voted)
    }

    /// Cast a vote; voting twice is a successful no-op
    pub fn cast_vote(
        &self,
        submission_id: &SubmissionId,
        voter: &VoterIdentity,
    ) -> Result<VoteOutcome> {
        if voter.remembers_submission(submission_id) {
            debug!("Local history already has a vote on {}", submission_id);
            return Ok(VoteOutcome::AlreadyVoted);
        }

        let submission = self
            .store
            .get_submission(submission_id)?
            .ok_or_else(|| BoardError::not_found("Submission", submission_id))?;
        if !submission.status.is_public() {
            return Err(BoardError::Validation(format!(
                "Cannot vote on a {} submission",
                submission.status
            )));
        }

        let vote = Vote::new(*submission_id, voter.voter_id().clone());
        match self.store.insert_vote(&vote) {
            Ok(()) => {
                info!("Recorded vote by {} on {}", voter.voter_id(), submission_id);
                remember(voter, submission_id);
                Ok(VoteOutcome::Recorded)
            }
            Err(e) if e.is_duplicate_vote() => {
                info!(
                    "Duplicate vote by {} on {} treated as already voted",
                    voter.voter_id(),
                    submission_id
                );
                remember(voter, submission_id);
                Ok(VoteOutcome::AlreadyVoted)
            }
            Err(e) => Err(e),
        }
    }

    /// Number of distinct voters on a submission
    pub fn count(&self, submission_id: &SubmissionId) -> Result<usize> {
        let votes = self.store.votes_for(submission_id)?;
        Ok(distinct_voters(&votes))
    }

    /// Vote counts for every submission with at least one vote, from a
    /// single scan of the vote rows
    pub fn counts(&self) -> Result<HashMap<SubmissionId, usize>> {
        let mut voters: HashMap<SubmissionId, HashSet<_>> = HashMap::new();
        for vote in self.store.list_votes()? {
            voters
                .entry(vote.submission_id)
                .or_default()
                .insert(vote.voter_id);
        }
        Ok(voters.into_iter().map(|(id, set)| (id, set.len())).collect())
    }
}

fn distinct_voters(votes: &[Vote]) -> usize {
    votes.iter().map(|v| &v.voter_id).collect::<HashSet<_>>().len()
}

/// Record a vote in the local history. The store already holds the vote, so
/// a failing cache write only costs a round trip later.
fn remember(voter: &VoterIdentity, submission_id: &SubmissionId) {
    if let Err(e) = voter.remember_submission(submission_id) {
        warn!("Failed to update local vote history: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Actor, HistoryKey, VoteHistory};
    use crate::moderation::{ModerationAction, ModerationWorkflow};
    use crate::store::memory::MemoryStore;
    use crate::submission::{NewSubmission, SubmissionStore};

    struct Fixture {
        ledger: VoteLedger,
        backing: Arc<MemoryStore>,
        submission: SubmissionId,
    }

    fn setup() -> Fixture {
        let backing = Arc::new(MemoryStore::new());
        let store: Arc<dyn BackingStore> = backing.clone();
        let submission = SubmissionStore::new(store.clone())
            .create(
                &Actor::new("jane@example.com", "Jane"),
                NewSubmission::new("Printer jams weekly"),
            )
            .unwrap()
            .id;
        ModerationWorkflow::new(store.clone())
            .transition(&submission, ModerationAction::Approve)
            .unwrap();

        Fixture {
            ledger: VoteLedger::new(store),
            backing,
            submission,
        }
    }

    fn voter(email: &str) -> VoterIdentity {
        VoterIdentity::ephemeral(Actor::new(email, email))
    }

    #[test]
    fn test_cast_vote_is_idempotent() {
        let f = setup();
        let a = voter("a@example.com");

        assert_eq!(f.ledger.cast_vote(&f.submission, &a).unwrap(), VoteOutcome::Recorded);
        assert_eq!(f.ledger.count(&f.submission).unwrap(), 1);

        assert_eq!(
            f.ledger.cast_vote(&f.submission, &a).unwrap(),
            VoteOutcome::AlreadyVoted
        );
        assert_eq!(f.ledger.count(&f.submission).unwrap(), 1);

        f.ledger.cast_vote(&f.submission, &voter("b@example.com")).unwrap();
        assert_eq!(f.ledger.count(&f.submission).unwrap(), 2);
    }

    #[test]
    fn test_fast_path_skips_store() {
        let f = setup();
        let a = voter("a@example.com");
        f.ledger.cast_vote(&f.submission, &a).unwrap();

        // With the store down, the local history still answers.
        f.backing
            .set_unavailable(crate::store::Collection::Votes, true);
        f.backing
            .set_unavailable(crate::store::Collection::Submissions, true);
        assert_eq!(
            f.ledger.cast_vote(&f.submission, &a).unwrap(),
            VoteOutcome::AlreadyVoted
        );
        assert!(f.ledger.has_voted(&f.submission, &a).unwrap());
    }

    #[test]
    fn test_second_tab_hits_constraint() {
        let f = setup();
        let actor = Actor::new("a@example.com", "A");
        let tab_one = VoterIdentity::ephemeral(actor.clone());
        let tab_two = VoterIdentity::ephemeral(actor);

        f.ledger.cast_vote(&f.submission, &tab_one).unwrap();
        assert!(!tab_two.remembers_submission(&f.submission));

        let outcome = f.ledger.cast_vote(&f.submission, &tab_two).unwrap();
        assert_eq!(outcome, VoteOutcome::AlreadyVoted);
        assert!(tab_two.remembers_submission(&f.submission));
        assert_eq!(f.ledger.count(&f.submission).unwrap(), 1);
    }

    #[test]
    fn test_concurrent_duplicates_record_once() {
        let f = setup();
        let actor = Actor::new("a@example.com", "A");

        let outcomes: Vec<VoteOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let tab = VoterIdentity::ephemeral(actor.clone());
                    let ledger = f.ledger.clone();
                    let id = f.submission;
                    scope.spawn(move || ledger.cast_vote(&id, &tab).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let recorded = outcomes.iter().filter(|o| o.is_recorded()).count();
        assert_eq!(recorded, 1);
        assert_eq!(f.ledger.count(&f.submission).unwrap(), 1);
    }

    #[test]
    fn test_has_voted_repairs_history() {
        let f = setup();
        let actor = Actor::new("a@example.com", "A");
        f.ledger
            .cast_vote(&f.submission, &VoterIdentity::ephemeral(actor.clone()))
            .unwrap();

        let fresh = VoterIdentity::ephemeral(actor);
        assert!(f.ledger.has_voted(&f.submission, &fresh).unwrap());
        assert!(fresh
            .history()
            .contains(HistoryKey::Submissions, &f.submission.to_string()));
        assert!(!f
            .ledger
            .has_voted(&f.submission, &voter("b@example.com"))
            .unwrap());
    }

    #[test]
    fn test_vote_requires_approved() {
        let f = setup();
        let store: Arc<dyn BackingStore> = f.backing.clone();
        let pending = SubmissionStore::new(store)
            .create(&Actor::new("x@example.com", "X"), NewSubmission::new("Pending"))
            .unwrap();

        let err = f
            .ledger
            .cast_vote(&pending.id, &voter("a@example.com"))
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
        assert_eq!(f.ledger.count(&pending.id).unwrap(), 0);
    }

    #[test]
    fn test_vote_unknown_submission() {
        let f = setup();
        let err = f
            .ledger
            .cast_vote(&SubmissionId::new(), &voter("a@example.com"))
            .unwrap_err();
        assert!(matches!(err, BoardError::NotFound { .. }));
    }

    #[test]
    fn test_backend_failure_leaves_history_untouched() {
        let f = setup();
        let a = voter("a@example.com");
        f.backing
            .set_unavailable(crate::store::Collection::Votes, true);

        let err = f.ledger.cast_vote(&f.submission, &a).unwrap_err();
        assert!(err.is_retryable());
        assert!(!a.remembers_submission(&f.submission));
    }

    #[test]
    fn test_counts_single_scan() {
        let f = setup();
        f.ledger.cast_vote(&f.submission, &voter("a@example.com")).unwrap();
        f.ledger.cast_vote(&f.submission, &voter("b@example.com")).unwrap();

        let counts = f.ledger.counts().unwrap();
        assert_eq!(counts.get(&f.submission), Some(&2));
        assert_eq!(counts.len(), 1);
    }
}

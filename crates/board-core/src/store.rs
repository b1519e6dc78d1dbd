//! Backing store contract
//!
//! The backing store owns every record. Components only layer read/write
//! rules and derived aggregates on top of it. Implementations must make each
//! insert atomic with its uniqueness check: a second vote by the same voter
//! on the same submission (or poll) fails with [`BoardError::DuplicateVote`]
//! no matter how many clients race to insert it.
//!
//! All `list_*` methods return records in insertion order.

use crate::comment::Comment;
use crate::error::{BoardError, Result};
use crate::identity::Profile;
use crate::interest::InterestRegistration;
use crate::poll::{Poll, PollOption, PollVote};
use crate::submission::{Submission, SubmissionStatus};
use crate::types::{PollId, SubmissionId, VoterId};
use crate::vote::Vote;
use std::fmt;

/// Named collections of the backing store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Submissions,
    Votes,
    Comments,
    Profiles,
    Polls,
    PollOptions,
    PollVotes,
    InterestRegistrations,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Submissions,
        Collection::Votes,
        Collection::Comments,
        Collection::Profiles,
        Collection::Polls,
        Collection::PollOptions,
        Collection::PollVotes,
        Collection::InterestRegistrations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Submissions => "submissions",
            Collection::Votes => "votes",
            Collection::Comments => "comments",
            Collection::Profiles => "profiles",
            Collection::Polls => "polls",
            Collection::PollOptions => "poll_options",
            Collection::PollVotes => "poll_votes",
            Collection::InterestRegistrations => "interest_registrations",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for backing store implementations
pub trait BackingStore: Send + Sync {
    /// Insert a new submission
    fn insert_submission(&self, submission: &Submission) -> Result<()>;

    /// Get a submission by ID
    fn get_submission(&self, id: &SubmissionId) -> Result<Option<Submission>>;

    /// List all submissions
    fn list_submissions(&self) -> Result<Vec<Submission>>;

    /// Overwrite a submission's status, returning the updated record
    fn set_submission_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
    ) -> Result<Submission>;

    /// Insert a vote; fails with `DuplicateVote` if the voter already voted
    fn insert_vote(&self, vote: &Vote) -> Result<()>;

    /// List every vote row
    fn list_votes(&self) -> Result<Vec<Vote>>;

    /// List vote rows for one submission
    fn votes_for(&self, submission_id: &SubmissionId) -> Result<Vec<Vote>> {
        Ok(self
            .list_votes()?
            .into_iter()
            .filter(|v| &v.submission_id == submission_id)
            .collect())
    }

    /// Insert a comment
    fn insert_comment(&self, comment: &Comment) -> Result<()>;

    /// List every comment row
    fn list_comments(&self) -> Result<Vec<Comment>>;

    /// List comment rows for one submission
    fn comments_for(&self, submission_id: &SubmissionId) -> Result<Vec<Comment>> {
        Ok(self
            .list_comments()?
            .into_iter()
            .filter(|c| &c.submission_id == submission_id)
            .collect())
    }

    /// Insert or replace a voter's profile
    fn upsert_profile(&self, profile: &Profile) -> Result<()>;

    /// Get a voter's profile
    fn get_profile(&self, voter_id: &VoterId) -> Result<Option<Profile>>;

    /// Insert a poll together with its options.
    ///
    /// When the new poll is active, every other poll is deactivated in the
    /// same write; the ids of the polls that were switched off are returned.
    /// On failure nothing changes.
    fn insert_poll(&self, poll: &Poll, options: &[PollOption]) -> Result<Vec<PollId>>;

    /// List all polls
    fn list_polls(&self) -> Result<Vec<Poll>>;

    /// List the options of a poll
    fn list_poll_options(&self, poll_id: &PollId) -> Result<Vec<PollOption>>;

    /// Insert a poll vote; fails with `DuplicateVote` if the voter already voted
    fn insert_poll_vote(&self, vote: &PollVote) -> Result<()>;

    /// List the votes of a poll
    fn list_poll_votes(&self, poll_id: &PollId) -> Result<Vec<PollVote>>;

    /// Insert an interest registration; one per (voter, registration type)
    fn insert_registration(&self, registration: &InterestRegistration) -> Result<()>;

    /// List all interest registrations
    fn list_registrations(&self) -> Result<Vec<InterestRegistration>>;
}

/// Error for a second registration of the same kind
pub fn duplicate_registration(registration: &InterestRegistration) -> BoardError {
    BoardError::Validation(format!(
        "{} has already registered as a {}",
        registration.email,
        registration.registration_type.label()
    ))
}

/// Switch off every active poll, returning the ids that changed
pub fn deactivate_all(polls: &mut [Poll]) -> Vec<PollId> {
    polls
        .iter_mut()
        .filter(|p| p.is_active)
        .map(|p| {
            p.is_active = false;
            p.id
        })
        .collect()
}

/// In-memory backing store
pub mod memory {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

    #[derive(Debug, Default)]
    struct Tables {
        submissions: Vec<Submission>,
        votes: Vec<Vote>,
        comments: Vec<Comment>,
        profiles: HashMap<VoterId, Profile>,
        polls: Vec<Poll>,
        poll_options: Vec<PollOption>,
        poll_votes: Vec<PollVote>,
        registrations: Vec<InterestRegistration>,
    }

    /// In-memory store; every operation holds one lock for its whole
    /// check-and-insert, which provides the uniqueness constraints.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        tables: RwLock<Tables>,
        unavailable: RwLock<HashSet<Collection>>,
    }

    impl MemoryStore {
        /// Create a new empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Simulate an outage of one collection; every call touching it
        /// fails with `BoardError::Backend` until cleared
        pub fn set_unavailable(&self, collection: Collection, unavailable: bool) {
            if let Ok(mut set) = self.unavailable.write() {
                if unavailable {
                    set.insert(collection);
                } else {
                    set.remove(&collection);
                }
            }
        }

        fn check(&self, collection: Collection) -> Result<()> {
            let down = self
                .unavailable
                .read()
                .map(|set| set.contains(&collection))
                .unwrap_or(false);
            if down {
                Err(BoardError::Backend(format!("{} is unavailable", collection)))
            } else {
                Ok(())
            }
        }

        fn read(&self, collection: Collection) -> Result<RwLockReadGuard<'_, Tables>> {
            self.check(collection)?;
            self.tables
                .read()
                .map_err(|_| BoardError::Backend("memory store lock poisoned".into()))
        }

        fn write(&self, collection: Collection) -> Result<RwLockWriteGuard<'_, Tables>> {
            self.check(collection)?;
            self.tables
                .write()
                .map_err(|_| BoardError::Backend("memory store lock poisoned".into()))
        }
    }

    impl BackingStore for MemoryStore {
        fn insert_submission(&self, submission: &Submission) -> Result<()> {
            let mut tables = self.write(Collection::Submissions)?;
            if tables.submissions.iter().any(|s| s.id == submission.id) {
                return Err(BoardError::Validation(format!(
                    "Submission with ID {} already exists",
                    submission.id
                )));
            }
            tables.submissions.push(submission.clone());
            Ok(())
        }

        fn get_submission(&self, id: &SubmissionId) -> Result<Option<Submission>> {
            let tables = self.read(Collection::Submissions)?;
            Ok(tables.submissions.iter().find(|s| &s.id == id).cloned())
        }

        fn list_submissions(&self) -> Result<Vec<Submission>> {
            Ok(self.read(Collection::Submissions)?.submissions.clone())
        }

        fn set_submission_status(
            &self,
            id: &SubmissionId,
            status: SubmissionStatus,
        ) -> Result<Submission> {
            let mut tables = self.write(Collection::Submissions)?;
            let submission = tables
                .submissions
                .iter_mut()
                .find(|s| &s.id == id)
                .ok_or_else(|| BoardError::not_found("Submission", id))?;
            submission.status = status;
            Ok(submission.clone())
        }

        fn insert_vote(&self, vote: &Vote) -> Result<()> {
            let mut tables = self.write(Collection::Votes)?;
            if tables
                .votes
                .iter()
                .any(|v| v.submission_id == vote.submission_id && v.voter_id == vote.voter_id)
            {
                return Err(BoardError::DuplicateVote {
                    target: vote.submission_id.to_string(),
                    voter: vote.voter_id.to_string(),
                });
            }
            tables.votes.push(vote.clone());
            Ok(())
        }

        fn list_votes(&self) -> Result<Vec<Vote>> {
            Ok(self.read(Collection::Votes)?.votes.clone())
        }

        fn insert_comment(&self, comment: &Comment) -> Result<()> {
            self.write(Collection::Comments)?.comments.push(comment.clone());
            Ok(())
        }

        fn list_comments(&self) -> Result<Vec<Comment>> {
            Ok(self.read(Collection::Comments)?.comments.clone())
        }

        fn upsert_profile(&self, profile: &Profile) -> Result<()> {
            self.write(Collection::Profiles)?
                .profiles
                .insert(profile.voter_id.clone(), profile.clone());
            Ok(())
        }

        fn get_profile(&self, voter_id: &VoterId) -> Result<Option<Profile>> {
            Ok(self.read(Collection::Profiles)?.profiles.get(voter_id).cloned())
        }

        fn insert_poll(&self, poll: &Poll, options: &[PollOption]) -> Result<Vec<PollId>> {
            self.check(Collection::PollOptions)?;
            let mut tables = self.write(Collection::Polls)?;
            let deactivated = if poll.is_active {
                super::deactivate_all(&mut tables.polls)
            } else {
                Vec::new()
            };
            tables.polls.push(poll.clone());
            tables.poll_options.extend(options.iter().cloned());
            Ok(deactivated)
        }

        fn list_polls(&self) -> Result<Vec<Poll>> {
            Ok(self.read(Collection::Polls)?.polls.clone())
        }

        fn list_poll_options(&self, poll_id: &PollId) -> Result<Vec<PollOption>> {
            let tables = self.read(Collection::PollOptions)?;
            Ok(tables
                .poll_options
                .iter()
                .filter(|o| &o.poll_id == poll_id)
                .cloned()
                .collect())
        }

        fn insert_poll_vote(&self, vote: &PollVote) -> Result<()> {
            let mut tables = self.write(Collection::PollVotes)?;
            if tables
                .poll_votes
                .iter()
                .any(|v| v.poll_id == vote.poll_id && v.voter_id == vote.voter_id)
            {
                return Err(BoardError::DuplicateVote {
                    target: vote.poll_id.to_string(),
                    voter: vote.voter_id.to_string(),
                });
            }
            tables.poll_votes.push(vote.clone());
            Ok(())
        }

        fn list_poll_votes(&self, poll_id: &PollId) -> Result<Vec<PollVote>> {
            let tables = self.read(Collection::PollVotes)?;
            Ok(tables
                .poll_votes
                .iter()
                .filter(|v| &v.poll_id == poll_id)
                .cloned()
                .collect())
        }

        fn insert_registration(&self, registration: &InterestRegistration) -> Result<()> {
            let mut tables = self.write(Collection::InterestRegistrations)?;
            if tables.registrations.iter().any(|r| {
                r.voter_id == registration.voter_id
                    && r.registration_type == registration.registration_type
            }) {
                return Err(duplicate_registration(registration));
            }
            tables.registrations.push(registration.clone());
            Ok(())
        }

        fn list_registrations(&self) -> Result<Vec<InterestRegistration>> {
            Ok(self.read(Collection::InterestRegistrations)?.registrations.clone())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::types::VoteId;
        use chrono::Utc;

        fn vote(submission_id: SubmissionId, voter: &str) -> Vote {
            Vote {
                id: VoteId::new(),
                submission_id,
                voter_id: VoterId::from_string(voter),
                created_at: Utc::now(),
            }
        }

        #[test]
        fn test_vote_uniqueness() {
            let store = MemoryStore::new();
            let target = SubmissionId::new();

            store.insert_vote(&vote(target, "v1")).unwrap();
            let err = store.insert_vote(&vote(target, "v1")).unwrap_err();
            assert!(err.is_duplicate_vote());

            store.insert_vote(&vote(target, "v2")).unwrap();
            store.insert_vote(&vote(SubmissionId::new(), "v1")).unwrap();
            assert_eq!(store.list_votes().unwrap().len(), 3);
            assert_eq!(store.votes_for(&target).unwrap().len(), 2);
        }

        #[test]
        fn test_set_status_unknown_id() {
            let store = MemoryStore::new();
            let result = store.set_submission_status(&SubmissionId::new(), SubmissionStatus::Approved);
            assert!(matches!(result, Err(BoardError::NotFound { .. })));
        }

        #[test]
        fn test_insert_active_poll_replaces_active() {
            let store = MemoryStore::new();
            let poll = |question: &str| Poll {
                id: PollId::new(),
                question: question.to_string(),
                is_active: true,
                created_at: Utc::now(),
            };
            let first = poll("First?");
            let second = poll("Second?");

            assert!(store.insert_poll(&first, &[]).unwrap().is_empty());
            assert_eq!(store.insert_poll(&second, &[]).unwrap(), vec![first.id]);

            let active: Vec<_> = store
                .list_polls()
                .unwrap()
                .into_iter()
                .filter(|p| p.is_active)
                .map(|p| p.id)
                .collect();
            assert_eq!(active, vec![second.id]);
        }

        #[test]
        fn test_unavailable_collection() {
            let store = MemoryStore::new();
            store.set_unavailable(Collection::Votes, true);

            let err = store.list_votes().unwrap_err();
            assert!(err.is_retryable());
            assert!(store.list_comments().is_ok());

            store.set_unavailable(Collection::Votes, false);
            assert!(store.list_votes().is_ok());
        }

        #[test]
        fn test_collection_names() {
            assert_eq!(Collection::PollOptions.name(), "poll_options");
            assert_eq!(
                Collection::InterestRegistrations.to_string(),
                "interest_registrations"
            );
        }
    }
}

//! Caller identity and the local vote-history cache
//!
//! A voter is identified twice: by the local history of what this client
//! already voted on (a cache that saves a store round trip), and by the
//! backing store's uniqueness constraint (the authority). Nothing in the
//! crate trusts the local layer alone.

use crate::error::Result;
use crate::types::{PollId, SubmissionId, VoterId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, RwLock};

/// The authenticated caller, as handed over by the auth layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub voter_id: VoterId,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl Actor {
    /// Create a regular (non-admin) actor from an email and display name
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        let email = email.into().trim().to_lowercase();
        Self {
            voter_id: VoterId::from_email(&email),
            display_name: display_name.into(),
            email,
            department: None,
            is_admin: false,
        }
    }

    /// Set the department
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Grant the admin role
    pub fn as_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// Fail unless this actor is an admin
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(crate::BoardError::Forbidden(format!(
                "{} is not an admin",
                self.email
            )))
        }
    }
}

/// A voter's public profile, stored in the `profiles` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub voter_id: VoterId,
    pub display_name: String,
    pub email: String,
}

impl From<&Actor> for Profile {
    fn from(actor: &Actor) -> Self {
        Self {
            voter_id: actor.voter_id.clone(),
            display_name: actor.display_name.clone(),
            email: actor.email.clone(),
        }
    }
}

/// Well-known keys for the two local history lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryKey {
    /// Submission ids already voted on
    #[serde(rename = "voted_pain_points")]
    Submissions,
    /// Poll ids already voted on
    #[serde(rename = "voted_polls")]
    Polls,
}

impl HistoryKey {
    /// The fixed storage key
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKey::Submissions => "voted_pain_points",
            HistoryKey::Polls => "voted_polls",
        }
    }
}

impl fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-held record of what this client already voted on
pub trait VoteHistory: Send + Sync {
    /// Check whether an id is recorded under a key
    fn contains(&self, key: HistoryKey, id: &str) -> bool;

    /// Record an id under a key (recording twice is a no-op)
    fn record(&self, key: HistoryKey, id: &str) -> Result<()>;

    /// All ids recorded under a key
    fn ids(&self, key: HistoryKey) -> Vec<String>;
}

/// Contents of a vote history, keyed the same way on disk and in memory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLists {
    #[serde(default)]
    pub voted_pain_points: BTreeSet<String>,
    #[serde(default)]
    pub voted_polls: BTreeSet<String>,
}

impl HistoryLists {
    pub fn get(&self, key: HistoryKey) -> &BTreeSet<String> {
        match key {
            HistoryKey::Submissions => &self.voted_pain_points,
            HistoryKey::Polls => &self.voted_polls,
        }
    }

    pub fn get_mut(&mut self, key: HistoryKey) -> &mut BTreeSet<String> {
        match key {
            HistoryKey::Submissions => &mut self.voted_pain_points,
            HistoryKey::Polls => &mut self.voted_polls,
        }
    }
}

/// In-memory vote history (one per client "tab")
#[derive(Debug, Default)]
pub struct MemoryVoteHistory {
    lists: RwLock<HistoryLists>,
}

impl MemoryVoteHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VoteHistory for MemoryVoteHistory {
    fn contains(&self, key: HistoryKey, id: &str) -> bool {
        self.lists
            .read()
            .map(|lists| lists.get(key).contains(id))
            .unwrap_or(false)
    }

    fn record(&self, key: HistoryKey, id: &str) -> Result<()> {
        let mut lists = self
            .lists
            .write()
            .map_err(|_| crate::BoardError::Backend("vote history lock poisoned".into()))?;
        lists.get_mut(key).insert(id.to_string());
        Ok(())
    }

    fn ids(&self, key: HistoryKey) -> Vec<String> {
        self.lists
            .read()
            .map(|lists| lists.get(key).iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// A voter together with this client's local history
#[derive(Clone)]
pub struct VoterIdentity {
    actor: Actor,
    history: Arc<dyn VoteHistory>,
}

impl VoterIdentity {
    pub fn new(actor: Actor, history: Arc<dyn VoteHistory>) -> Self {
        Self { actor, history }
    }

    /// Identity with a fresh in-memory history
    pub fn ephemeral(actor: Actor) -> Self {
        Self::new(actor, Arc::new(MemoryVoteHistory::new()))
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn voter_id(&self) -> &VoterId {
        &self.actor.voter_id
    }

    pub fn history(&self) -> &dyn VoteHistory {
        self.history.as_ref()
    }

    /// Fast-path check for a submission vote
    pub fn remembers_submission(&self, id: &SubmissionId) -> bool {
        self.history
            .contains(HistoryKey::Submissions, &id.to_string())
    }

    /// Fast-path check for a poll vote
    pub fn remembers_poll(&self, id: &PollId) -> bool {
        self.history.contains(HistoryKey::Polls, &id.to_string())
    }

    pub fn remember_submission(&self, id: &SubmissionId) -> Result<()> {
        self.history
            .record(HistoryKey::Submissions, &id.to_string())
    }

    pub fn remember_poll(&self, id: &PollId) -> Result<()> {
        self.history.record(HistoryKey::Polls, &id.to_string())
    }
}

impl fmt::Debug for VoterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoterIdentity")
            .field("actor", &self.actor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_voter_id_from_email() {
        let actor = Actor::new("jane@example.com", "Jane");
        assert_eq!(actor.voter_id, VoterId::from_email("jane@example.com"));
        assert!(!actor.is_admin);
        assert!(actor.require_admin().is_err());
        assert!(actor.as_admin().require_admin().is_ok());
    }

    #[test]
    fn test_history_keys() {
        assert_eq!(HistoryKey::Submissions.as_str(), "voted_pain_points");
        assert_eq!(HistoryKey::Polls.as_str(), "voted_polls");
    }

    #[test]
    fn test_memory_history_record() {
        let history = MemoryVoteHistory::new();
        assert!(!history.contains(HistoryKey::Submissions, "a"));

        history.record(HistoryKey::Submissions, "a").unwrap();
        history.record(HistoryKey::Submissions, "a").unwrap();

        assert!(history.contains(HistoryKey::Submissions, "a"));
        assert!(!history.contains(HistoryKey::Polls, "a"));
        assert_eq!(history.ids(HistoryKey::Submissions), vec!["a".to_string()]);
    }

    #[test]
    fn test_history_lists_serialization() {
        let mut lists = HistoryLists::default();
        lists.get_mut(HistoryKey::Polls).insert("p1".into());

        let json = serde_json::to_string(&lists).unwrap();
        assert!(json.contains("\"voted_polls\":[\"p1\"]"));
        assert!(json.contains("\"voted_pain_points\":[]"));
    }
}

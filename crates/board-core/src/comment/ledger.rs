//! Comment ledger: records comments and derives ordered listings

use super::model::{Comment, CommentEntry, CommentThread};
use crate::error::{BoardError, Result};
use crate::identity::{Actor, Profile};
use crate::store::BackingStore;
use crate::types::{CommentId, SubmissionId, VoterId, ANONYMOUS, UNKNOWN_AUTHOR};
use crate::validator::TextRule;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Records comments and derives per-submission listings and counts
#[derive(Clone)]
pub struct CommentLedger {
    store: Arc<dyn BackingStore>,
    content_rule: TextRule,
}

impl CommentLedger {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            content_rule: TextRule::comment(),
        }
    }

    /// Override the maximum comment length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.content_rule = self.content_rule.with_max_length(max_length);
        self
    }

    /// Comments on a submission, oldest first, with display names resolved
    pub fn list(&self, submission_id: &SubmissionId) -> Result<CommentThread> {
        let mut comments = self.store.comments_for(submission_id)?;
        // Stable sort: equal timestamps keep insertion order.
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut names: HashMap<VoterId, String> = HashMap::new();
        let mut entries = Vec::with_capacity(comments.len());
        for comment in comments {
            let entry = if comment.anonymous {
                CommentEntry {
                    id: comment.id,
                    content: comment.content,
                    display_name: ANONYMOUS.to_string(),
                    author_id: None,
                    anonymous: true,
                    created_at: comment.created_at,
                }
            } else {
                let display_name = match names.get(&comment.author_id) {
                    Some(name) => name.clone(),
                    None => {
                        let name = self
                            .store
                            .get_profile(&comment.author_id)?
                            .map(|p| p.display_name)
                            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
                        names.insert(comment.author_id.clone(), name.clone());
                        name
                    }
                };
                CommentEntry {
                    id: comment.id,
                    content: comment.content,
                    display_name,
                    author_id: Some(comment.author_id),
                    anonymous: false,
                    created_at: comment.created_at,
                }
            };
            entries.push(entry);
        }

        debug!("Fetched {} comments for {}", entries.len(), submission_id);
        Ok(CommentThread {
            submission_id: *submission_id,
            entries,
        })
    }

    /// Add a comment, then re-fetch the thread from the store
    pub fn add(
        &self,
        submission_id: &SubmissionId,
        author: Option<&Actor>,
        content: &str,
        anonymous: bool,
    ) -> Result<(Comment, CommentThread)> {
        let author = author.ok_or_else(|| {
            BoardError::Validation("Sign in to post a comment".to_string())
        })?;
        let content = self.content_rule.check(content)?;

        let submission = self
            .store
            .get_submission(submission_id)?
            .ok_or_else(|| BoardError::not_found("Submission", submission_id))?;
        if !submission.status.is_public() {
            return Err(BoardError::Validation(format!(
                "Cannot comment on a {} submission",
                submission.status
            )));
        }

        self.store.upsert_profile(&Profile::from(author))?;

        let comment = Comment {
            id: CommentId::new(),
            submission_id: *submission_id,
            author_id: author.voter_id.clone(),
            content: content.to_string(),
            anonymous,
            created_at: Utc::now(),
        };
        self.store.insert_comment(&comment)?;
        info!("Added comment {} on {}", comment.id, submission_id);

        let thread = self.list(submission_id)?;
        Ok((comment, thread))
    }

    /// Number of comments on a submission
    pub fn count(&self, submission_id: &SubmissionId) -> Result<usize> {
        Ok(self.store.comments_for(submission_id)?.len())
    }

    /// Comment counts for every submission with at least one comment
    pub fn counts(&self) -> Result<HashMap<SubmissionId, usize>> {
        let mut counts = HashMap::new();
        for comment in self.store.list_comments()? {
            *counts.entry(comment.submission_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

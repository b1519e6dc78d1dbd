//! Submission creation and read-filtering

use super::description::Description;
use super::model::{Submission, SubmissionStatus, SubmissionView};
use crate::error::{BoardError, Result};
use crate::identity::Actor;
use crate::store::BackingStore;
use crate::types::SubmissionId;
use crate::validator::TextRule;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum department name length
const MAX_DEPARTMENT_LENGTH: usize = 200;

/// Builder for a new submission
#[derive(Debug, Clone, Default)]
pub struct NewSubmission {
    title: String,
    description: Option<String>,
    anonymous: bool,
    department: Option<String>,
}

impl NewSubmission {
    /// Start a submission with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the description from challenge and impact blocks
    pub fn challenge_and_impact(mut self, challenge: &str, impact: &str) -> Self {
        self.description = if challenge.trim().is_empty() && impact.trim().is_empty() {
            None
        } else {
            Some(Description::compose(challenge, impact))
        };
        self
    }

    /// Set the description as free text
    pub fn description(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.description = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
        self
    }

    /// Hide the submitter's identity on every read path
    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    /// Override the submitter's department
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

/// CRUD and read-filtering over submission records
#[derive(Clone)]
pub struct SubmissionStore {
    store: Arc<dyn BackingStore>,
    title_rule: TextRule,
}

impl SubmissionStore {
    /// Create a submission store over a backing store
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            title_rule: TextRule::title(),
        }
    }

    /// Override the maximum title length
    pub fn with_max_title_length(mut self, max_length: usize) -> Self {
        self.title_rule = self.title_rule.with_max_length(max_length);
        self
    }

    /// Create a new submission; it always starts out pending
    pub fn create(&self, submitter: &Actor, draft: NewSubmission) -> Result<Submission> {
        let title = self.title_rule.check(&draft.title)?;
        let department = TextRule::new("Department", MAX_DEPARTMENT_LENGTH)
            .check_optional(draft.department.as_deref().or(submitter.department.as_deref()))?;

        let submission = Submission {
            id: SubmissionId::new(),
            title: title.to_string(),
            description: draft.description,
            submitter_id: submitter.voter_id.clone(),
            submitter_name: submitter.display_name.clone(),
            department,
            anonymous: draft.anonymous,
            status: SubmissionStatus::Pending,
            created_at: Utc::now(),
        };

        self.store.insert_submission(&submission)?;
        info!(
            "Created submission {} (anonymous: {})",
            submission.id, submission.anonymous
        );
        Ok(submission)
    }

    /// Get the redacted view of a submission
    pub fn get(&self, id: &SubmissionId) -> Result<SubmissionView> {
        self.record(id).map(|s| s.view())
    }

    /// Get the raw record (crate-internal; carries the submitter identity)
    pub(crate) fn record(&self, id: &SubmissionId) -> Result<Submission> {
        self.store
            .get_submission(id)?
            .ok_or_else(|| BoardError::not_found("Submission", id))
    }

    /// List submissions with the given status, newest first
    pub fn list_by_status(&self, status: SubmissionStatus) -> Result<Vec<SubmissionView>> {
        let mut records: Vec<Submission> = self
            .store
            .list_submissions()?
            .into_iter()
            .filter(|s| s.status == status)
            .collect();

        // Reverse first so that ties on created_at keep later inserts first.
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!("Listed {} {} submissions", records.len(), status);
        Ok(records.iter().map(SubmissionView::from).collect())
    }

    /// Count submissions per status (every status is present)
    pub fn counts_by_status(&self) -> Result<BTreeMap<SubmissionStatus, usize>> {
        let mut counts: BTreeMap<SubmissionStatus, usize> =
            SubmissionStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for submission in self.store.list_submissions()? {
            *counts.entry(submission.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use pretty_assertions::assert_eq;

    fn create_store() -> (SubmissionStore, Arc<MemoryStore>) {
        let backing = Arc::new(MemoryStore::new());
        (SubmissionStore::new(backing.clone()), backing)
    }

    fn jane() -> Actor {
        Actor::new("jane@example.com", "Jane Lim").with_department("Finance")
    }

    #[test]
    fn test_create_starts_pending() {
        let (store, _) = create_store();
        let submission = store
            .create(&jane(), NewSubmission::new("  Printer jams weekly  "))
            .unwrap();

        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert_eq!(submission.title, "Printer jams weekly");
        assert_eq!(submission.department.as_deref(), Some("Finance"));
        assert_eq!(store.get(&submission.id).unwrap().title, "Printer jams weekly");
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let (store, backing) = create_store();
        let err = store.create(&jane(), NewSubmission::new("   ")).unwrap_err();

        assert!(matches!(err, BoardError::Validation(_)));
        assert!(backing.list_submissions().unwrap().is_empty());
    }

    #[test]
    fn test_create_rejects_long_title() {
        let (store, _) = create_store();
        let store = store.with_max_title_length(5);
        assert!(store.create(&jane(), NewSubmission::new("Too long")).is_err());
    }

    #[test]
    fn test_create_with_description() {
        let (store, _) = create_store();
        let submission = store
            .create(
                &jane(),
                NewSubmission::new("Claims").challenge_and_impact("Paper forms", "Two days"),
            )
            .unwrap();

        let view = store.get(&submission.id).unwrap();
        assert_eq!(view.description.challenge(), "Paper forms");
        assert_eq!(view.description.impact(), "Two days");
    }

    #[test]
    fn test_department_override() {
        let (store, _) = create_store();
        let submission = store
            .create(&jane(), NewSubmission::new("Parking").department("Operations"))
            .unwrap();
        assert_eq!(submission.department.as_deref(), Some("Operations"));
    }

    #[test]
    fn test_list_by_status_newest_first() {
        let (store, backing) = create_store();
        let first = store.create(&jane(), NewSubmission::new("First")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = store.create(&jane(), NewSubmission::new("Second")).unwrap();
        store.create(&jane(), NewSubmission::new("Still pending")).unwrap();

        backing
            .set_submission_status(&first.id, SubmissionStatus::Approved)
            .unwrap();
        backing
            .set_submission_status(&second.id, SubmissionStatus::Approved)
            .unwrap();

        let approved = store.list_by_status(SubmissionStatus::Approved).unwrap();
        let titles: Vec<_> = approved.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);
        assert_eq!(store.list_by_status(SubmissionStatus::Pending).unwrap().len(), 1);
        assert!(store.list_by_status(SubmissionStatus::Archived).unwrap().is_empty());
    }

    #[test]
    fn test_anonymous_never_listed_with_identity() {
        let (store, _) = create_store();
        store
            .create(&jane(), NewSubmission::new("Secret pain").anonymous(true))
            .unwrap();

        for view in store.list_by_status(SubmissionStatus::Pending).unwrap() {
            assert_eq!(view.submitter, "Anonymous");
            assert_eq!(view.department, None);
        }
    }

    #[test]
    fn test_get_unknown() {
        let (store, _) = create_store();
        let err = store.get(&SubmissionId::new()).unwrap_err();
        assert!(matches!(err, BoardError::NotFound { kind: "Submission", .. }));
    }

    #[test]
    fn test_counts_by_status() {
        let (store, backing) = create_store();
        let s = store.create(&jane(), NewSubmission::new("One")).unwrap();
        store.create(&jane(), NewSubmission::new("Two")).unwrap();
        backing
            .set_submission_status(&s.id, SubmissionStatus::Rejected)
            .unwrap();

        let counts = store.counts_by_status().unwrap();
        assert_eq!(counts[&SubmissionStatus::Pending], 1);
        assert_eq!(counts[&SubmissionStatus::Rejected], 1);
        assert_eq!(counts[&SubmissionStatus::Approved], 0);
        assert_eq!(counts.len(), 4);
    }
}

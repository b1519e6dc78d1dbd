//! Error types for painboard

use crate::submission::SubmissionStatus;
use crate::moderation::ModerationAction;
use thiserror::Error;

/// Main error type for painboard
#[derive(Debug, Error)]
pub enum BoardError {
    /// Required field missing or malformed; nothing was persisted
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness constraint on (target, voter) rejected an insert.
    ///
    /// Ledgers normalize this into an "already voted" outcome; it only
    /// surfaces from the store itself.
    #[error("Duplicate vote: {voter} already voted on {target}")]
    DuplicateVote { target: String, voter: String },

    /// Referenced record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Backing store could not be reached or failed the request
    #[error("Backend unavailable: {0}")]
    Backend(String),

    /// Moderation action not permitted from the current status
    #[error("Cannot {action} a submission that is {from}")]
    IllegalTransition {
        from: SubmissionStatus,
        action: ModerationAction,
    },

    /// Caller lacks the admin role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Poll results requested before the voter cast a vote
    #[error("Poll results are only visible after voting")]
    ResultsLocked,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<BoardError>,
    },
}

impl BoardError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        BoardError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a missing record
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        BoardError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether a manual retry by the caller could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            BoardError::Backend(_) | BoardError::Io(_) => true,
            BoardError::WithContext { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Whether this is (or wraps) a uniqueness-constraint violation
    pub fn is_duplicate_vote(&self) -> bool {
        match self {
            BoardError::DuplicateVote { .. } => true,
            BoardError::WithContext { source, .. } => source.is_duplicate_vote(),
            _ => false,
        }
    }
}

/// Result type alias for painboard
pub type Result<T> = std::result::Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BoardError::not_found("Submission", "abc-123");
        assert_eq!(err.to_string(), "Submission not found: abc-123");
    }

    #[test]
    fn test_illegal_transition_display() {
        let err = BoardError::IllegalTransition {
            from: SubmissionStatus::Rejected,
            action: ModerationAction::Archive,
        };
        assert_eq!(err.to_string(), "Cannot archive a submission that is rejected");
    }

    #[test]
    fn test_error_with_context() {
        let err = BoardError::Validation("title is empty".to_string());
        let err = err.with_context("Failed to create submission");
        assert!(err.to_string().contains("Failed to create submission"));
    }

    #[test]
    fn test_retryable() {
        assert!(BoardError::Backend("timeout".into()).is_retryable());
        assert!(BoardError::Backend("timeout".into())
            .with_context("vote")
            .is_retryable());
        assert!(!BoardError::Validation("x".into()).is_retryable());
    }

    #[test]
    fn test_duplicate_vote_detection() {
        let err = BoardError::DuplicateVote {
            target: "s1".into(),
            voter: "v1".into(),
        };
        assert!(err.is_duplicate_vote());
        assert!(err.with_context("insert").is_duplicate_vote());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BoardError = io_err.into();
        assert!(matches!(err, BoardError::Io(_)));
    }
}

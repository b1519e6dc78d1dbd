//! Core type definitions for painboard

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }

            /// Parse from a UUID string
            pub fn parse(s: &str) -> crate::Result<Self> {
                Uuid::parse_str(s.trim()).map($name).map_err(|e| {
                    crate::BoardError::Validation(format!(
                        "Invalid {} '{}': {}",
                        stringify!($name),
                        s,
                        e
                    ))
                })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::BoardError;

            fn from_str(s: &str) -> crate::Result<Self> {
                Self::parse(s)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a submission
    SubmissionId
);
uuid_id!(
    /// Unique identifier for a vote row
    VoteId
);
uuid_id!(
    /// Unique identifier for a comment
    CommentId
);
uuid_id!(
    /// Unique identifier for a poll
    PollId
);
uuid_id!(
    /// Unique identifier for a poll option
    PollOptionId
);
uuid_id!(
    /// Unique identifier for an interest registration
    RegistrationId
);

/// Durable identifier used to deduplicate a voter's votes and comments.
///
/// Derived from the voter's email so the same person maps to the same id
/// from any device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoterId(pub String);

impl VoterId {
    /// Derive a VoterId from an email address (case and surrounding
    /// whitespace are ignored)
    pub fn from_email(email: &str) -> Self {
        let normalized = email.trim().to_lowercase();
        let hash = blake3::hash(normalized.as_bytes());
        VoterId(format!("v_{}", &hash.to_hex()[..16]))
    }

    /// Create a VoterId from a string
    pub fn from_string(s: impl Into<String>) -> Self {
        VoterId(s.into())
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name shown in place of a hidden identity
pub const ANONYMOUS: &str = "Anonymous";

/// Display name for a comment author without a profile
pub const UNKNOWN_AUTHOR: &str = "Unknown";

//! Validation of user-entered text fields

use crate::error::{BoardError, Result};

/// Maximum title length (default)
pub const MAX_TITLE_LENGTH: usize = 500;

/// Maximum comment length (default)
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// Length rule for a single free-text field
#[derive(Debug, Clone, Copy)]
pub struct TextRule {
    field: &'static str,
    max_length: usize,
}

impl TextRule {
    /// Create a rule for the named field
    pub fn new(field: &'static str, max_length: usize) -> Self {
        Self { field, max_length }
    }

    /// Rule for submission titles
    pub fn title() -> Self {
        Self::new("Title", MAX_TITLE_LENGTH)
    }

    /// Rule for comment content
    pub fn comment() -> Self {
        Self::new("Comment content", MAX_COMMENT_LENGTH)
    }

    /// Override the maximum length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Validate a value and return it trimmed
    pub fn check<'a>(&self, value: &'a str) -> Result<&'a str> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(BoardError::Validation(format!(
                "{} cannot be empty",
                self.field
            )));
        }

        let length = trimmed.chars().count();
        if length > self.max_length {
            return Err(BoardError::Validation(format!(
                "{} exceeds maximum length of {} characters",
                self.field, self.max_length
            )));
        }

        Ok(trimmed)
    }

    /// Validate an optional value; blank becomes `None`
    pub fn check_optional(&self, value: Option<&str>) -> Result<Option<String>> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => self.check(v).map(|v| Some(v.to_string())),
        }
    }
}

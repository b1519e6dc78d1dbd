//! Submission description formats
//!
//! Descriptions are stored as plain text. Three shapes exist in the wild:
//!
//! - structured markers written by the submission form:
//!   `**Workplace Challenge:**\n<challenge>\n\n**Impact:**\n<impact>`
//! - guided prompts (`What's the current challenge? ...`,
//!   `What are the operational/business implications? ...`)
//! - legacy free text with no markers at all
//!
//! [`Description::parse`] is the only place that looks at the text format;
//! everything else works with the parsed variant.

use serde::{Deserialize, Serialize};

const CHALLENGE_HEADING: &str = "**Workplace Challenge:**";
const IMPACT_HEADING: &str = "**Impact:**";

// Lowercase forms used for matching; ASCII lowercasing keeps byte offsets.
const CHALLENGE_MARKER: &str = "**workplace challenge:**";
const IMPACT_MARKER: &str = "**impact:**";
const IMPACT_PARAGRAPH: &str = "**impact:";
const PROMPT_CHALLENGE: &str = "what's the current challenge?";
const PROMPT_AFFECTED: &str = "who does it affect and how?";
const PROMPT_IMPACT: &str = "what are the operational/business implications?";
const PROMPT_SUCCESS: &str = "what would success look like?";

/// A parsed submission description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Description {
    /// No description was given
    Empty,
    /// Written with the structured section markers
    Structured { challenge: String, impact: String },
    /// Written against the guided prompt questions
    Prompted { challenge: String, impact: String },
    /// Free text predating the structured format
    Legacy { text: String },
}

impl Description {
    /// Compose challenge and impact blocks into the stored text form
    pub fn compose(challenge: &str, impact: &str) -> String {
        format!(
            "{}\n{}\n\n{}\n{}",
            CHALLENGE_HEADING,
            challenge.trim(),
            IMPACT_HEADING,
            impact.trim()
        )
    }

    /// Parse stored description text
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Description::Empty;
        };

        let normalized = raw.replace("\r\n", "\n");
        let text = normalized.trim();
        if text.is_empty() {
            return Description::Empty;
        }

        let lower = text.to_ascii_lowercase();

        // Each section falls back to the other shape, then to the whole text.
        let structured = structured_sections(text, &lower);
        let prompted = prompted_sections(text, &lower);
        let challenge = structured
            .challenge
            .or(prompted.challenge)
            .unwrap_or(text)
            .to_string();
        let impact = structured
            .impact
            .or(prompted.impact)
            .unwrap_or("")
            .to_string();

        if structured.found() {
            Description::Structured { challenge, impact }
        } else if prompted.found() {
            Description::Prompted { challenge, impact }
        } else {
            Description::Legacy {
                text: text.to_string(),
            }
        }
    }

    /// The challenge block (whole text for legacy descriptions)
    pub fn challenge(&self) -> &str {
        match self {
            Description::Empty => "",
            Description::Structured { challenge, .. } | Description::Prompted { challenge, .. } => {
                challenge
            }
            Description::Legacy { text } => text,
        }
    }

    /// The impact block (empty for legacy descriptions)
    pub fn impact(&self) -> &str {
        match self {
            Description::Structured { impact, .. } | Description::Prompted { impact, .. } => impact,
            Description::Empty | Description::Legacy { .. } => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.challenge().is_empty() && self.impact().is_empty()
    }
}

impl Default for Description {
    fn default() -> Self {
        Description::Empty
    }
}

/// Byte offset where a section body starts, given the offset right after its
/// heading. The heading must be followed by a line break.
fn section_start(text: &str, after_heading: usize) -> Option<usize> {
    let rest = &text[after_heading..];
    let ws_len = rest.len() - rest.trim_start().len();
    if rest[..ws_len].contains('\n') {
        Some(after_heading + ws_len)
    } else {
        None
    }
}

/// First `marker` heading followed by a line break, as
/// `(end of heading, start of body)`
fn heading_body(text: &str, lower: &str, marker: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    while let Some(i) = lower[offset..].find(marker) {
        let heading_end = offset + i + marker.len();
        if let Some(body) = section_start(text, heading_end) {
            return Some((heading_end, body));
        }
        offset = heading_end;
    }
    None
}

/// Offset of the first `marker` at or after `from` that opens a new
/// paragraph (a blank line sits right before it)
fn paragraph_start(lower: &str, from: usize, marker: &str) -> Option<usize> {
    let mut offset = from;
    while let Some(i) = lower[offset..].find(marker) {
        let at = offset + i;
        let before = &lower[from..at];
        let gap = &before[before.trim_end().len()..];
        if gap.ends_with('\n') && gap.matches('\n').count() >= 2 {
            return Some(at);
        }
        offset = at + marker.len();
    }
    None
}

/// Challenge and impact sections found by one description shape
struct Sections<'a> {
    challenge: Option<&'a str>,
    impact: Option<&'a str>,
}

impl Sections<'_> {
    fn found(&self) -> bool {
        self.challenge.is_some() || self.impact.is_some()
    }
}

fn structured_sections<'a>(text: &'a str, lower: &str) -> Sections<'a> {
    let challenge = heading_body(text, lower, CHALLENGE_MARKER).map(|(heading_end, body)| {
        let end = paragraph_start(lower, heading_end, IMPACT_PARAGRAPH).unwrap_or(text.len());
        text[body.min(end)..end].trim()
    });
    let impact =
        heading_body(text, lower, IMPACT_MARKER).map(|(_, body)| text[body..].trim());

    Sections { challenge, impact }
}

fn prompted_sections<'a>(text: &'a str, lower: &str) -> Sections<'a> {
    let challenge = lower.find(PROMPT_CHALLENGE).map(|at| {
        let start = at + PROMPT_CHALLENGE.len();
        let end = [PROMPT_AFFECTED, PROMPT_IMPACT]
            .iter()
            .filter_map(|prompt| paragraph_start(lower, start, prompt))
            .min()
            .unwrap_or(text.len());
        text[start..end].trim()
    });
    let impact = lower.find(PROMPT_IMPACT).map(|at| {
        let start = at + PROMPT_IMPACT.len();
        let end = paragraph_start(lower, start, PROMPT_SUCCESS).unwrap_or(text.len());
        text[start..end].trim()
    });

    Sections { challenge, impact }
}

//! Freeform-text field extraction
//!
//! Regex heuristics for pulling structured fields out of chat messages,
//! isolated behind a narrow interface so the tracker's transition logic stays
//! testable without them. Every method answers `Option`: `None` means the
//! message carried no recognizable intent.

use crate::error::TrackerError;
use crate::record::Decision;
use regex::Regex;

/// Fields extracted from a proposal-shaped message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalFields {
    /// Present when the message names the sender explicitly
    pub from_user_id: Option<String>,
    pub to_user_id: String,
    /// Text following the directive, may be empty
    pub message: String,
}

pub struct FieldExtractor {
    proposal: Regex,
    accept: Regex,
    decline: Regex,
    pin: Regex,
}

impl FieldExtractor {
    pub fn new() -> Result<Self, TrackerError> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| TrackerError::ConfigError(format!("Invalid extraction pattern: {}", e)))
        };
        Ok(Self {
            proposal: compile(
                r"(?i)\b(?:introduce|connect|match)\s+@?([\w.-]+)\s+(?:to|with|and)\s+@?([\w.-]+)",
            )?,
            decline: compile(r"(?i)\b(?:decline|reject|no thanks|not interested|pass)\b")?,
            accept: compile(r"(?i)\b(?:accept|yes|sure|sounds good|absolutely|ok(?:ay)?)\b")?,
            pin: compile(r"\b(\d{6})\b")?,
        })
    }

    /// Extract the two parties and trailing message from an
    /// "introduce A to B ..." style directive
    pub fn proposal(&self, text: &str) -> Option<ProposalFields> {
        let captures = self.proposal.captures(text)?;
        let whole = captures.get(0)?;
        let message = text[whole.end()..]
            .trim_start_matches([',', ':', '-'])
            .trim()
            .to_string();
        Some(ProposalFields {
            from_user_id: captures.get(1).map(|m| m.as_str().to_string()),
            to_user_id: captures.get(2)?.as_str().to_string(),
            message,
        })
    }

    /// Detect an accept/decline response. Decline phrasing wins when a
    /// message matches both ("no thanks, but yes to coffee").
    pub fn decision(&self, text: &str) -> Option<Decision> {
        if self.decline.is_match(text) {
            return Some(Decision::Decline);
        }
        if self.accept.is_match(text) {
            return Some(Decision::Accept);
        }
        None
    }

    /// Extract a six-digit PIN code
    pub fn pin(&self, text: &str) -> Option<String> {
        self.pin
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

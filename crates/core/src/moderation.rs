//! Video moderation status, transition rules and request validation.
//!
//! Transition rules:
//! - `Pending`  -> `Approved`, `Rejected`
//! - `Approved` -> `Rejected`, `Pending` (revert)
//! - `Rejected` -> `Approved`, `Pending` (revert)
//!
//! A transition to the current status is refused. A rejection must carry a
//! non-blank comment.

use serde::{Deserialize, Serialize};

use crate::codes::Language;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a moderation comment (after trimming).
pub const MAX_COMMENT_LENGTH: usize = 1_000;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Persisted moderation status of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub const ALL: &'static [ModerationStatus] = &[Self::Pending, Self::Approved, Self::Rejected];

    /// Wire value, also used in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Self::Pending, Language::En) => "Pending review",
            (Self::Pending, Language::Fr) => "En attente",
            (Self::Approved, Language::En) => "Approved",
            (Self::Approved, Language::Fr) => "Validée",
            (Self::Rejected, Language::En) => "Rejected",
            (Self::Rejected, Language::Fr) => "Refusée",
        }
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModerationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid moderation status '{s}'. Must be one of: PENDING, APPROVED, REJECTED"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Statuses reachable from `from`.
pub fn valid_transitions(from: ModerationStatus) -> &'static [ModerationStatus] {
    use ModerationStatus::*;
    match from {
        Pending => &[Approved, Rejected],
        Approved => &[Rejected, Pending],
        Rejected => &[Approved, Pending],
    }
}

pub fn can_transition(from: ModerationStatus, to: ModerationStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate that a transition from `from` to `to` is allowed.
pub fn validate_transition(from: ModerationStatus, to: ModerationStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move a video from '{from}' to '{to}'. Allowed transitions: {:?}",
            valid_transitions(from)
        )))
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of a moderation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationRequest {
    pub status: ModerationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Validate a moderation action and build the request to send.
///
/// Checks the transition, requires a non-blank comment for rejections and
/// bounds the comment length. The comment is trimmed; a blank comment on a
/// non-rejecting transition is dropped.
pub fn build_moderation_request(
    from: ModerationStatus,
    to: ModerationStatus,
    comment: Option<&str>,
) -> Result<ModerationRequest, CoreError> {
    validate_transition(from, to)?;

    let comment = comment.map(str::trim).filter(|c| !c.is_empty());

    if to == ModerationStatus::Rejected && comment.is_none() {
        return Err(CoreError::Validation(
            "A rejection must include a comment".to_string(),
        ));
    }

    if let Some(c) = comment {
        let len = c.chars().count();
        if len > MAX_COMMENT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters (got {len})"
            )));
        }
    }

    Ok(ModerationRequest {
        status: to,
        comment: comment.map(str::to_string),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

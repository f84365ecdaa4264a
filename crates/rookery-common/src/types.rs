//! Core types shared across Rookery components.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX_ATTEMPTS;

/// A generated verification challenge: the chosen pattern, the problem
/// statement shown to the user, and the integer the user must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeProblem {
    /// Pattern identifier (names the artwork in the asset store)
    pub pattern_id: String,

    /// Multi-line problem statement rendered onto the challenge image
    pub problem_text: String,

    /// Expected answer (server-side only, never sent to the client)
    #[serde(skip_serializing)]
    pub answer: i64,
}

/// Pending verification state for one user.
///
/// Created when a user starts a challenge; the attempt counter is bumped on
/// each wrong submission; removed on success, lockout, or expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSession {
    /// The expected answer
    pub answer: i64,
    /// Pattern identifier the challenge was built from
    pub pattern_id: String,
    /// Problem statement, kept for audit logging
    pub problem_text: String,
    /// Wrong submissions so far
    pub attempts: u32,
    /// Creation timestamp (Unix epoch seconds)
    pub created_at: i64,
    /// Expiry timestamp
    pub expires_at: i64,
}

impl VerificationSession {
    /// Open a session for a freshly generated problem
    pub fn new(problem: &ChallengeProblem, ttl_secs: u64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            answer: problem.answer,
            pattern_id: problem.pattern_id.clone(),
            problem_text: problem.problem_text.clone(),
            attempts: 0,
            created_at: now,
            expires_at: now + ttl_secs as i64,
        }
    }

    /// Check whether the challenge window has closed
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() > self.expires_at
    }

    /// Attempts left before lockout, under the default limit
    pub fn remaining_attempts(&self) -> u32 {
        DEFAULT_MAX_ATTEMPTS.saturating_sub(self.attempts)
    }
}

/// Outcome of grading one submitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "verdict")]
pub enum Verdict {
    /// Correct answer; session consumed, access may be granted
    Passed,
    /// Wrong answer; session stays open with `remaining` attempts left
    Retry { remaining: u32 },
    /// Wrong answer exhausted the attempt limit; session discarded
    LockedOut,
    /// No session, or the challenge window closed; user must start over
    Expired,
}

impl Verdict {
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Retry { .. })
    }
}

/// Wrap PNG bytes as a base64 data URI for hosts that inline images
pub fn png_data_uri(png: &[u8]) -> String {
    use base64::{Engine, engine::general_purpose::STANDARD};
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

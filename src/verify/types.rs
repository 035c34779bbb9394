use std::fmt;

use crate::smtp::Transport;

/// Appended to every negative result: probing is often blocked, so "no" is
/// never certain.
pub const PROBE_CAVEAT: &str =
    "Note: many mail servers block SMTP probing, so a negative result is not conclusive.";

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    /// `RCPT TO` was accepted.
    Exists,
    /// The server answered and did not accept the recipient.
    Rejected,
    /// The domain has no MX records.
    NoRoute,
    /// Every planned host/port failed at the connection level.
    Unreachable,
    /// DNS failure or a malformed server reply.
    Failed,
    InvalidInput,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists => f.write_str("exists"),
            Self::Rejected => f.write_str("rejected"),
            Self::NoRoute => f.write_str("no MX records"),
            Self::Unreachable => f.write_str("all servers unreachable"),
            Self::Failed => f.write_str("verification failed"),
            Self::InvalidInput => f.write_str("invalid input"),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Accepted,
    Rejected,
    ConnectionFailed { message: String },
    Failed { message: String },
}

/// Record of one session attempt, kept for diagnostics.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    pub host: String,
    pub port: u16,
    pub transport: Transport,
    pub outcome: AttemptOutcome,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub email: String,
    pub exists: bool,
    pub error: Option<String>,
    pub high_false_positive_risk: bool,
    pub status: VerificationStatus,
    pub attempts: Vec<ProbeAttempt>,
}

impl VerificationResult {
    pub(crate) fn exists(
        email: &str,
        high_false_positive_risk: bool,
        attempts: Vec<ProbeAttempt>,
    ) -> Self {
        Self {
            email: email.to_string(),
            exists: true,
            error: None,
            high_false_positive_risk,
            status: VerificationStatus::Exists,
            attempts,
        }
    }

    /// Negative result; `cause` gets the probing caveat appended.
    pub(crate) fn negative(
        email: &str,
        status: VerificationStatus,
        cause: impl fmt::Display,
        attempts: Vec<ProbeAttempt>,
    ) -> Self {
        Self {
            email: email.to_string(),
            exists: false,
            error: Some(format!("{cause}. {PROBE_CAVEAT}")),
            high_false_positive_risk: false,
            status,
            attempts,
        }
    }

    pub(crate) fn with_risk(mut self, high_false_positive_risk: bool) -> Self {
        self.high_false_positive_risk = high_false_positive_risk;
        self
    }

    /// The server gave an answer (accepted or rejected), as opposed to
    /// "could not determine".
    pub fn is_conclusive(&self) -> bool {
        matches!(
            self.status,
            VerificationStatus::Exists | VerificationStatus::Rejected
        )
    }
}

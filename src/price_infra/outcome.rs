use std::fmt;
use thiserror::Error;
use crate::types::observation::Observation;

/// Classified result of a single fetch attempt. Lives for one tick.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    Success(Observation),
    RateLimited,
    ServerError { status: u16 },
    TransportError(String),
    MalformedPayload(PayloadFault),
}

/// Why a response could not be turned into an [`Observation`].
#[derive(Error, Clone, Debug, PartialEq)]
pub enum PayloadFault {
    /// The body is not JSON, or the asset object is absent entirely. The
    /// upstream has changed shape and retrying will not help.
    #[error("unparseable response body: {0}")]
    Unparseable(String),

    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("field `{0}` is not numeric")]
    NonNumeric(String),

    #[error("price is negative or out of range")]
    InvalidPrice,

    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
}

impl PayloadFault {
    pub fn is_fatal(&self) -> bool {
        matches!(self, PayloadFault::Unparseable(_))
    }
}

/// Outcome class used for logging and metric labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    RateLimited,
    ServerError,
    TransportError,
    MalformedPayload,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::RateLimited => "rate_limited",
            OutcomeKind::ServerError => "server_error",
            OutcomeKind::TransportError => "transport_error",
            OutcomeKind::MalformedPayload => "malformed_payload",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PollOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            PollOutcome::Success(_) => OutcomeKind::Success,
            PollOutcome::RateLimited => OutcomeKind::RateLimited,
            PollOutcome::ServerError { .. } => OutcomeKind::ServerError,
            PollOutcome::TransportError(_) => OutcomeKind::TransportError,
            PollOutcome::MalformedPayload(_) => OutcomeKind::MalformedPayload,
        }
    }

    /// Failures paced by the exponential backoff schedule.
    pub fn is_backoff_class(&self) -> bool {
        matches!(
            self,
            PollOutcome::ServerError { .. }
                | PollOutcome::TransportError(_)
                | PollOutcome::MalformedPayload(_)
        )
    }

    pub fn fatal_fault(&self) -> Option<&PayloadFault> {
        match self {
            PollOutcome::MalformedPayload(fault) if fault.is_fatal() => Some(fault),
            _ => None,
        }
    }
}

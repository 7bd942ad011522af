#![allow(dead_code)]

use std::fmt;

/// Why a typed call produced no usable body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The upstream answered with a non-2xx status.
    Status,
    /// The body could not be decoded as the expected type.
    Decode,
}

/// Details of a failed typed exchange. The raw body is kept for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub status: u16,
    pub detail: String,
    pub body: String,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Status => write!(f, "upstream returned status {}", self.status),
            FailureKind::Decode => write!(
                f,
                "could not decode upstream response (status {}): {}",
                self.status, self.detail
            ),
        }
    }
}

/// Outcome of a typed call that reached the upstream.
///
/// A `Failure` never carries a result, a `Success` always does.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure(ApiFailure),
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Envelope::Success(value) => Some(value),
            Envelope::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, ApiFailure> {
        match self {
            Envelope::Success(value) => Ok(value),
            Envelope::Failure(failure) => Err(failure),
        }
    }
}

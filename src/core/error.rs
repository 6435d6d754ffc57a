//! Errors surfaced by rate services

use crate::core::rates::RateRequest;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// No quotation exists for the request after every lookup rule was applied.
    #[error("Unable to find exchange rate for {0}")]
    NotFound(RateRequest),

    /// The remote feed call failed. Carries the underlying message unchanged.
    #[error("{0}")]
    Transport(String),

    /// No service in the chain handles this kind of request.
    #[error("Unsupported request: {0}")]
    Unsupported(RateRequest),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl RateError {
    pub fn transport(message: impl Into<String>) -> Self {
        RateError::Transport(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RateError::NotFound(_))
    }
}

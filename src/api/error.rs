//! Error types for calls to the predictor service.

use thiserror::Error;

/// Errors that can occur while talking to the predictor service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Prediction endpoint answered with a non-2xx status.
    #[error("Gagal mendapatkan prediksi")]
    PredictionRejected(u16),

    /// Chat endpoint answered with a non-2xx status.
    #[error("Chat service returned status {0}")]
    ChatRejected(u16),

    /// Health endpoint answered with a non-2xx status.
    #[error("Health check returned status {0}")]
    Unhealthy(u16),

    /// Network failure or undecodable body.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response decoded but broke a payload invariant.
    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),
}

impl ApiError {
    /// Status code reported by the service, if the call got that far.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::PredictionRejected(code) | Self::ChatRejected(code) | Self::Unhealthy(code) => {
                Some(*code)
            }
            _ => None,
        }
    }
}

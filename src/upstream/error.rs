use thiserror::Error;

/// Failure taxonomy for calls to the Padelyzer domain API.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream returned http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("upstream payload decode error: {0}")]
    Decode(String),
    #[error("not found upstream: {0}")]
    NotFound(String),
    #[error("circuit breaker open for target '{0}'")]
    BreakerOpen(String),
}

impl UpstreamError {
    /// Returns true if the error is transient and worth retrying.
    /// An open breaker is terminal for the current request by design of
    /// the state machine: retrying would defeat the cooldown.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Decode(_) | Self::NotFound(_) | Self::BreakerOpen(_) => false,
        }
    }
}

pub(crate) fn map_reqwest_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(e.to_string())
    }
}

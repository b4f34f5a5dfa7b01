//! Apply error types

use thiserror::Error;

/// Failure of a single HTTP exchange with the appliance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// Reasons an apply did not converge
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("invalid resource identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid desired state: {0}")]
    InvalidBody(String),

    #[error("existence probe failed: {}", status_and_detail(.status, .detail))]
    ProbeFailed { status: Option<u16>, detail: String },

    #[error("appliance rejected the request: {status} {body}")]
    ApplyRejected { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApplyError {
    /// HTTP status the appliance answered with, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApplyError::ProbeFailed { status, .. } => *status,
            ApplyError::ApplyRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn status_and_detail(status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(code) => format!("{} {}", code, detail),
        None => detail.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ApplyError>;

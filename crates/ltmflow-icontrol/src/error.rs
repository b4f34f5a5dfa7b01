//! iControl error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IControlError {
    #[error("Invalid connection configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("iControl returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Transport error: {0}")]
    Transport(#[from] ltmflow_core::TransportError),
}

pub type Result<T> = std::result::Result<T, IControlError>;

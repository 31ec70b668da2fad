//! Cloud provider error types

use thiserror::Error;

/// Errors that can occur while creating cloud instances
#[derive(Debug, Error)]
pub enum CloudError {
    /// Request rejected before it was sent
    #[error("Invalid instance request: {0}")]
    InvalidRequest(String),

    /// The API endpoint could not be reached
    #[error("Could not reach cloud API: {0}")]
    Connection(String),

    /// Request timed out
    #[error("Cloud API request timed out")]
    Timeout,

    /// HTTP request failed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API answered with something other than 202 Accepted
    #[error("Cloud API returned HTTP {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// 202 response whose body could not be understood
    #[error("Invalid response from cloud API: {0}")]
    InvalidResponse(String),
}

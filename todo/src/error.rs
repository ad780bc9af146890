//! Error types for the to-do client

use crate::actions::{ActionKind, Payload};
use thiserror::Error;

/// Failures talking to the remote collection API
///
/// These are expected failures: the reducer folds them into
/// [`TodoState::error`](crate::TodoState::error) instead of failing the
/// dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be sent or no response arrived
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The server answered with a non-success status
    #[error("API error {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The response body was not the expected JSON
    #[error("Failed to parse response: {0}")]
    ResponseParseFailed(String),

    /// The client configuration is unusable (bad URL or header)
    #[error("Invalid API configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised by the todo reducer
#[derive(Error, Debug)]
pub enum TodoError {
    /// The remote API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The payload does not belong to the action kind
    ///
    /// Only hand-built or decoded actions can get here. This is a programming
    /// error and is never folded into state.
    #[error("Unexpected action: {kind:?} with payload {payload:?}")]
    UnexpectedAction {
        /// Kind of the offending action
        kind: ActionKind,
        /// Payload it carried
        payload: Payload,
    },
}

/// Result type for API calls
pub type ApiResult<T> = Result<T, ApiError>;

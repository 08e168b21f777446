//! Error types for the Power BI token provider.
//!
//! Two failure families exist: the identity provider refusing to issue an
//! access token ([`AuthError`]) and the Power BI REST API rejecting a call
//! ([`ApiError`]). Neither is retried internally.

use reqwest::StatusCode;
use thiserror::Error;

/// Description used when the identity provider omits `error_description`.
pub const UNKNOWN_ERROR_DESCRIPTION: &str = "unknown error";

/// Client-credentials exchange against the identity provider failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The response did not contain an `access_token`.
    #[error("Error obtaining access token: {description}")]
    Rejected { description: String },

    /// The identity provider did not answer within the configured timeout.
    #[error("Identity provider request timed out")]
    Timeout,

    /// Connection-level failure (DNS, TLS, connection reset, ...).
    #[error("Failed to reach identity provider: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body was not valid token JSON.
    #[error("Invalid token response from identity provider: {0}")]
    InvalidResponse(#[source] serde_json::Error),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Timeout
        } else {
            AuthError::Transport(err)
        }
    }
}

/// A Power BI REST API call failed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success status. `body` is the raw response text.
    #[error("Power BI API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The API did not answer within the configured timeout.
    #[error("Power BI API request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("Failed to reach Power BI API: {0}")]
    Transport(#[source] reqwest::Error),

    /// A success response whose body could not be decoded.
    #[error("Invalid response from Power BI API: {0}")]
    InvalidResponse(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::InvalidResponse(err)
        } else {
            ApiError::Transport(err)
        }
    }
}

/// Any failure surfaced by [`PowerBiAuth`](super::PowerBiAuth).
#[derive(Debug, Error)]
pub enum PowerBiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl PowerBiError {
    /// True when the failure was a request timeout on either remote.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            PowerBiError::Auth(AuthError::Timeout) | PowerBiError::Api(ApiError::Timeout)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_carries_description() {
        let err = AuthError::Rejected {
            description: "AADSTS7000215: Invalid client secret provided.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error obtaining access token: AADSTS7000215: Invalid client secret provided."
        );
    }

    #[test]
    fn test_status_message_carries_raw_body() {
        let err = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            body: r#"{"error":{"code":"PowerBINotAuthorizedException"}}"#.to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("403"));
        assert!(message.contains(r#"{"error":{"code":"PowerBINotAuthorizedException"}}"#));
    }

    #[test]
    fn test_is_timeout() {
        assert!(PowerBiError::from(AuthError::Timeout).is_timeout());
        assert!(PowerBiError::from(ApiError::Timeout).is_timeout());

        let rejected = PowerBiError::from(AuthError::Rejected {
            description: UNKNOWN_ERROR_DESCRIPTION.to_string(),
        });
        assert!(!rejected.is_timeout());
    }
}

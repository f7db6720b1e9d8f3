use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The login call was rejected or returned no token.
    #[error("could not authenticate with the server")]
    Unauthenticated,

    /// Non-2xx response. `message` comes from the body when it has one.
    #[error("request failed with status {status}: {message}")]
    Http { status: StatusCode, message: String },

    /// A `2xx` answer whose body carries a non-success application code.
    #[error("server answered with code {code}: {message}")]
    Rejected { code: i64, message: String },

    /// The request was cancelled through its abort signal.
    #[error("request aborted")]
    Aborted,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    /// A draft failed client-side checks; nothing was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Aborts are not failures; callers drop them silently.
    pub fn is_abort(&self) -> bool {
        matches!(self, ApiError::Aborted)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Builds an [`ApiError::Http`] from a response body, preferring the
    /// backend's `message` field over the canonical status reason.
    pub(crate) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            message: Option<String>,
        }

        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });
        ApiError::Http { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Decode(error.to_string())
    }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_taken_from_body() {
        let error = ApiError::from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            br#"{"message":"The name field is required."}"#,
        );
        assert_eq!(
            error.to_string(),
            "request failed with status 422 Unprocessable Entity: The name field is required."
        );
    }

    #[test]
    fn falls_back_to_status_reason() {
        let error = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        match error {
            ApiError::Http { message, .. } => assert_eq!(message, "Internal Server Error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn only_aborted_is_abort() {
        assert!(ApiError::Aborted.is_abort());
        assert!(!ApiError::Unauthenticated.is_abort());
    }
}

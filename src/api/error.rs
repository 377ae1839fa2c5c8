use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by the credential gateway.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The service processed the call and reported a failure message.
    #[error("{0}")]
    Service(String),

    /// The service could not be reached or the exchange failed in transit.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The call came back in a shape the client cannot use.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Failure body probe. The service reports human-readable failures in
/// `resultMsg`; some middleboxes use `message` instead.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "resultMsg")]
    result_msg: Option<String>,
    message: Option<String>,
}

impl AuthError {
    /// Truncate a response body to avoid carrying excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut cut = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// Build the error for a non-success HTTP status, preferring the
    /// service-supplied message fields (`resultMsg`, then `message`)
    /// over the raw body.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            let service_msg = parsed
                .result_msg
                .filter(|m| !m.is_empty())
                .or(parsed.message.filter(|m| !m.is_empty()));
            if let Some(msg) = service_msg {
                return AuthError::Service(msg);
            }
        }
        AuthError::Service(format!(
            "Request failed with status {}: {}",
            status,
            Self::truncate_body(body)
        ))
    }
}

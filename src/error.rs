use thiserror::Error;

/// Error types for the ETHYS x402 SDK.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input (address, signature, identity, private key) or a
    /// response the server rejected as invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failure: key/address mismatch or HTTP 401.
    #[error("auth error: {0}")]
    Auth(String),

    #[error("signing error: {0}")]
    Signing(String),

    /// Non-2xx response other than 400/401.
    #[error("{message} (status: {status})")]
    Api {
        status: u16,
        message: String,
        body: serde_json::Value,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Map an HTTP error status and raw response body to an error.
    ///
    /// The `error` field of a JSON body becomes the message; a non-JSON body
    /// is wrapped as `{"error": <text>}`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let body: serde_json::Value = serde_json::from_str(body).unwrap_or_else(|_| {
            let text = if body.is_empty() { "Unknown error" } else { body };
            serde_json::json!({ "error": text })
        });
        let server_message = body
            .get("error")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        match status {
            401 => Error::Auth(server_message.unwrap_or_else(|| "Authentication failed".into())),
            400 => Error::Validation(server_message.unwrap_or_else(|| "Validation error".into())),
            _ => Error::Api {
                status,
                message: server_message.unwrap_or_else(|| format!("API error: {status}")),
                body,
            },
        }
    }

    /// The HTTP status, for errors that came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}

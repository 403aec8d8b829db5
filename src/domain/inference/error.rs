use thiserror::Error;

/// Failures surfaced by the external inference boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("Rate limited by inference provider: {message}")]
    RateLimited { message: String },

    #[error("Inference call timed out")]
    Timeout,

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Inference server error: {message}")]
    Server { message: String },

    #[error("Invalid inference response: {message}")]
    InvalidResponse { message: String },

    #[error("Malformed inference request: {message}")]
    BadRequest { message: String },
}

impl InferenceError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Transient failures are worth retrying; auth and malformed requests never are
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Auth { .. } | Self::BadRequest { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(InferenceError::Timeout.is_transient());
        assert!(InferenceError::rate_limited("slow down").is_transient());
        assert!(InferenceError::server("502").is_transient());
        assert!(InferenceError::invalid_response("no choices").is_transient());
    }

    #[test]
    fn test_permanent_classification() {
        assert!(!InferenceError::auth("invalid key").is_transient());
        assert!(!InferenceError::bad_request("unknown model").is_transient());
    }
}

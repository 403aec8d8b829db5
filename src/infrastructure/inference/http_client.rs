use async_trait::async_trait;

use crate::domain::InferenceError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, InferenceError>;
}

/// Map a non-success HTTP status to the inference error taxonomy
pub fn error_for_status(status: u16, body: &str) -> InferenceError {
    let message = format!("HTTP {}: {}", status, body.trim());

    match status {
        401 | 403 => InferenceError::auth(message),
        400 | 404 | 422 => InferenceError::bad_request(message),
        429 => InferenceError::rate_limited(message),
        408 | 504 => InferenceError::Timeout,
        _ => InferenceError::server(message),
    }
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, InferenceError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout
            } else {
                InferenceError::server(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status.as_u16(), &error_body));
        }

        response.json().await.map_err(|e| {
            InferenceError::invalid_response(format!("Failed to parse response: {}", e))
        })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    #[derive(Debug)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, serde_json::Value>>,
        errors: RwLock<HashMap<String, InferenceError>>,
        requests: RwLock<Vec<serde_json::Value>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self {
                responses: RwLock::new(HashMap::new()),
                errors: RwLock::new(HashMap::new()),
                requests: RwLock::new(Vec::new()),
            }
        }

        pub fn with_response(self, url: impl Into<String>, response: serde_json::Value) -> Self {
            self.responses.write().unwrap().insert(url.into(), response);
            self
        }

        pub fn with_error(self, url: impl Into<String>, error: InferenceError) -> Self {
            self.errors.write().unwrap().insert(url.into(), error);
            self
        }

        /// Bodies of all requests received so far
        pub fn requests(&self) -> Vec<serde_json::Value> {
            self.requests.read().unwrap().clone()
        }
    }

    impl Default for MockHttpClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            _headers: Vec<(&str, &str)>,
            body: &serde_json::Value,
        ) -> Result<serde_json::Value, InferenceError> {
            self.requests.write().unwrap().push(body.clone());

            if let Some(error) = self.errors.read().unwrap().get(url) {
                return Err(error.clone());
            }

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| InferenceError::server(format!("No mock response for {}", url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status_mapping() {
        assert!(matches!(error_for_status(401, ""), InferenceError::Auth { .. }));
        assert!(matches!(error_for_status(403, ""), InferenceError::Auth { .. }));
        assert!(matches!(error_for_status(400, ""), InferenceError::BadRequest { .. }));
        assert!(matches!(error_for_status(404, ""), InferenceError::BadRequest { .. }));
        assert!(matches!(error_for_status(422, ""), InferenceError::BadRequest { .. }));
        assert!(matches!(error_for_status(429, ""), InferenceError::RateLimited { .. }));
        assert_eq!(error_for_status(408, ""), InferenceError::Timeout);
        assert_eq!(error_for_status(504, ""), InferenceError::Timeout);
        assert!(matches!(error_for_status(500, ""), InferenceError::Server { .. }));
        assert!(matches!(error_for_status(503, ""), InferenceError::Server { .. }));
    }

    #[test]
    fn test_error_message_carries_body() {
        let error = error_for_status(429, " slow down \n");
        assert_eq!(
            error.to_string(),
            "Rate limited by inference provider: HTTP 429: slow down"
        );
    }
}

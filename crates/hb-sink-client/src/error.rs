//! Sink client error types.

/// Postgres error code for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Errors from registration sink calls.
#[derive(Debug, thiserror::Error)]
pub enum SinkClientError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The sink returned a non-2xx status.
    #[error("registration sink {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl SinkClientError {
    /// Whether the sink reported a uniqueness violation. Recognised by the
    /// Postgres code in the body, whatever the HTTP status.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::ApiError { body, .. } if body.contains(UNIQUE_VIOLATION))
    }

    /// Whether the request timed out in transport.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http { source, .. } if source.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, body: &str) -> SinkClientError {
        SinkClientError::ApiError {
            endpoint: "POST /rest/v1/regional_registrations".into(),
            status,
            body: body.into(),
        }
    }

    #[test]
    fn unique_violation_detected_by_code() {
        assert!(api_error(409, r#"{"code":"23505","message":"duplicate key"}"#).is_unique_violation());
        assert!(api_error(400, "error 23505").is_unique_violation());
        assert!(!api_error(409, r#"{"code":"23503"}"#).is_unique_violation());
        assert!(!api_error(500, "").is_timeout());
    }

    #[test]
    fn display_includes_status_and_endpoint() {
        let msg = format!("{}", api_error(503, "maintenance"));
        assert!(msg.contains("503"));
        assert!(msg.contains("/rest/v1/regional_registrations"));
        assert!(msg.contains("maintenance"));
    }
}

//! HTTP implementation of the registration sink.
//!
//! One insert is one `POST {base_url}/rest/v1/{table}`. The client never
//! retries: a second write requires a new, user-initiated submit.

use std::time::Duration;

use async_trait::async_trait;
use hb_core::{RegistrationRecord, RegistrationSink, SinkError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::config::{ConfigError, SinkConfig};
use crate::error::SinkClientError;
use crate::row::RegistrationRow;

/// Client for the hosted registration table.
#[derive(Debug, Clone)]
pub struct HttpRegistrationSink {
    http: reqwest::Client,
    insert_url: url::Url,
    endpoint: String,
    timeout: Duration,
}

impl HttpRegistrationSink {
    /// Create a client from configuration.
    pub fn new(config: SinkConfig) -> Result<Self, SinkClientError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers({
                let mut headers = HeaderMap::new();
                let mut key = HeaderValue::from_str(config.api_key.as_str())
                    .map_err(|_| SinkClientError::Config(ConfigError::MissingApiKey))?;
                key.set_sensitive(true);
                let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key.as_str()))
                    .map_err(|_| SinkClientError::Config(ConfigError::MissingApiKey))?;
                bearer.set_sensitive(true);
                headers.insert("apikey", key);
                headers.insert(AUTHORIZATION, bearer);
                headers.insert("Prefer", HeaderValue::from_static("return=minimal"));
                headers
            })
            .build()
            .map_err(|e| SinkClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let insert_url = config.insert_url()?;
        let endpoint = format!("POST {}", insert_url.path());
        Ok(Self {
            http,
            insert_url,
            endpoint,
            timeout,
        })
    }

    /// Write one row.
    ///
    /// Calls `POST {base_url}/rest/v1/{table}` with the snake_case row body.
    pub async fn insert_row(&self, record: &RegistrationRecord) -> Result<(), SinkClientError> {
        let row = RegistrationRow::from(record);
        let resp = self
            .http
            .post(self.insert_url.clone())
            .json(&row)
            .send()
            .await
            .map_err(|e| SinkClientError::Http {
                endpoint: self.endpoint.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SinkClientError::ApiError {
                endpoint: self.endpoint.clone(),
                status,
                body,
            });
        }
        Ok(())
    }

    /// Translate a client failure into the sink outcome the gate acts on.
    fn classify(&self, record: &RegistrationRecord, err: SinkClientError) -> SinkError {
        if err.is_unique_violation() {
            return SinkError::Duplicate {
                email: record.contact.email.as_str().to_string(),
                region: record.region_code.clone(),
            };
        }
        if err.is_timeout() {
            return SinkError::Timeout {
                elapsed_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }
        match err {
            SinkClientError::ApiError { status, body, .. } if status < 500 => {
                SinkError::Rejected { status, body }
            }
            other => SinkError::Unavailable {
                reason: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl RegistrationSink for HttpRegistrationSink {
    async fn insert(&self, record: &RegistrationRecord) -> Result<(), SinkError> {
        match self.insert_row(record).await {
            Ok(()) => {
                tracing::debug!(region = %record.region_code, endpoint = %self.endpoint, "registration row inserted");
                Ok(())
            }
            Err(e) => {
                let mapped = self.classify(record, e);
                tracing::debug!(region = %record.region_code, error = %mapped, "registration row rejected");
                Err(mapped)
            }
        }
    }

    fn sink_name(&self) -> &str {
        "http"
    }
}

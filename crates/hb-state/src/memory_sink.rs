//! In-memory [`RegistrationSink`] used by `--dry-run` and by tests.
//!
//! Enforces the same `(email, region)` uniqueness the hosted table does.
//! Emails compare case-insensitively.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hb_core::{RegistrationRecord, RegistrationSink, SinkError};
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct Inner {
    records: Vec<RegistrationRecord>,
    attempts: usize,
    scripted_failures: VecDeque<SinkError>,
    delay: Option<Duration>,
}

/// Thread-safe in-memory lead store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    inner: Arc<RwLock<Inner>>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next insert fail with `err` instead of writing.
    pub fn fail_next(&self, err: SinkError) {
        self.inner.write().scripted_failures.push_back(err);
    }

    /// Sleep this long before answering each insert.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.inner.write().delay = delay;
    }

    /// Stored records, in insertion order.
    pub fn records(&self) -> Vec<RegistrationRecord> {
        self.inner.read().records.clone()
    }

    /// Number of insert calls received, successful or not.
    pub fn attempts(&self) -> usize {
        self.inner.read().attempts
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RegistrationSink for InMemorySink {
    async fn insert(&self, record: &RegistrationRecord) -> Result<(), SinkError> {
        let delay = {
            let mut inner = self.inner.write();
            inner.attempts += 1;
            inner.delay
        };
        // The lock is never held across this await.
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.write();
        if let Some(err) = inner.scripted_failures.pop_front() {
            return Err(err);
        }
        let email = record.contact.email.as_str();
        let taken = inner.records.iter().any(|r| {
            r.region_code == record.region_code
                && r.contact.email.as_str().eq_ignore_ascii_case(email)
        });
        if taken {
            return Err(SinkError::Duplicate {
                email: email.to_string(),
                region: record.region_code.clone(),
            });
        }
        inner.records.push(record.clone());
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_core::{ContactFields, EmailAddress, RegionCode};

    fn record(email: &str, region: &str) -> RegistrationRecord {
        RegistrationRecord {
            region_code: RegionCode::new(region).unwrap(),
            region_name: region.to_uppercase(),
            contact: ContactFields {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: EmailAddress::new(email).unwrap(),
                phone: None,
            },
            interest_tags: Default::default(),
            how_heard: None,
            consent_marketing: false,
            consent_terms: true,
            language: "en".into(),
            source_context: format!("/preview/{region}"),
        }
    }

    #[tokio::test]
    async fn duplicate_is_per_email_and_region() {
        let sink = InMemorySink::new();
        sink.insert(&record("a@example.com", "gb")).await.unwrap();
        sink.insert(&record("a@example.com", "pt")).await.unwrap();
        let err = sink
            .insert(&record("A@Example.com", "gb"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.attempts(), 3);
    }

    #[tokio::test]
    async fn scripted_failure_is_consumed_once() {
        let sink = InMemorySink::new();
        sink.fail_next(SinkError::Unavailable {
            reason: "down".into(),
        });
        assert!(sink.insert(&record("a@example.com", "gb")).await.is_err());
        assert!(sink.is_empty());
        sink.insert(&record("a@example.com", "gb")).await.unwrap();
        assert_eq!(sink.len(), 1);
    }
}

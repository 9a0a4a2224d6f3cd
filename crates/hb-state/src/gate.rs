//! # Registration Gate
//!
//! Lead capture for regions that are not live. A visitor who has already
//! registered for a region (a marker is present) bypasses the gate.
//!
//! ## States
//!
//! ```text
//! Idle ──submit──▶ Validating ──ok──▶ Submitting ──▶ Success
//!   ▲                  │                   ├──────▶ DuplicateConflict
//!   └──field errors────┘                   └──────▶ SinkError
//!
//! Bypassed (marker present at construction)
//! ```
//!
//! `Success` and `Bypassed` are terminal. `DuplicateConflict` and
//! `SinkError` accept a fresh, user-initiated submit; nothing is retried
//! automatically.
//!
//! ## Concurrency
//!
//! [`RegistrationGate::submit`] takes `&mut self`, so a gate instance can
//! never have two writes in flight. Each submit performs at most one sink
//! write, bounded by [`GateConfig::timeout`]; expiry counts as a sink
//! failure. A submit future dropped while the write is outstanding leaves
//! the gate in `SinkError`, so the visitor can submit again.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use hb_core::{
    ContactFields, EmailAddress, InterestTag, ReferralSource, Region, RegionCode,
    RegistrationRecord, RegistrationSink, SinkError, ValidationError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::marker::{MarkerStoreError, RegistrationMarkerStore};

/// Shown after a successful registration.
pub const MESSAGE_SUCCESS: &str = "Registration successful!";
/// Shown when the email is already registered for the region.
pub const MESSAGE_DUPLICATE: &str = "This email is already registered for this region.";
/// Shown for any other sink failure, including timeout.
pub const MESSAGE_FAILURE: &str = "Something went wrong. Please try again.";
/// Field error for missing terms acceptance.
pub const MESSAGE_TERMS_REQUIRED: &str = "You must accept the Terms of Service and Privacy Policy";

/// Client-side bound on one sink write.
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(8);

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;

// ── Gate State ───────────────────────────────────────────────────────

/// Lifecycle of one gate instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateState {
    /// Form shown, awaiting submit.
    Idle,
    /// Client-side validation running.
    Validating,
    /// One write outstanding at the sink.
    Submitting,
    /// Record stored and marker set. Terminal.
    Success,
    /// Sink reported the `(email, region)` pair already exists.
    DuplicateConflict,
    /// Sink failed or timed out.
    SinkError,
    /// Marker already present; the form is never shown. Terminal.
    Bypassed,
}

impl GateState {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Validating => "VALIDATING",
            Self::Submitting => "SUBMITTING",
            Self::Success => "SUCCESS",
            Self::DuplicateConflict => "DUPLICATE_CONFLICT",
            Self::SinkError => "SINK_ERROR",
            Self::Bypassed => "BYPASSED",
        }
    }

    /// Whether the gate has been passed and will never show the form again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Bypassed)
    }

    /// Whether a user-initiated submit is accepted from this state.
    pub fn accepts_submit(&self) -> bool {
        matches!(self, Self::Idle | Self::DuplicateConflict | Self::SinkError)
    }

    /// User-facing message for outcome states.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Success => Some(MESSAGE_SUCCESS),
            Self::DuplicateConflict => Some(MESSAGE_DUPLICATE),
            Self::SinkError => Some(MESSAGE_FAILURE),
            Self::Idle | Self::Validating | Self::Submitting | Self::Bypassed => None,
        }
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Errors ───────────────────────────────────────────────────────────

/// Misuse of the gate or failure of the marker store.
///
/// Sink outcomes are not errors here: they are gate states.
#[derive(Error, Debug)]
pub enum GateError {
    /// Submit called from a state that does not accept it.
    #[error("cannot submit registration for region {region} from state {from}")]
    InvalidTransition {
        /// Region the gate guards.
        region: RegionCode,
        /// State at the time of the call.
        from: GateState,
    },

    /// The marker store could not be read or written.
    #[error("registration marker store failed: {0}")]
    Marker(#[from] MarkerStoreError),
}

// ── Form ─────────────────────────────────────────────────────────────

/// A form field that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    /// Given name.
    FirstName,
    /// Family name.
    LastName,
    /// Email address.
    Email,
    /// Optional phone number.
    Phone,
    /// Terms of Service and Privacy Policy acceptance.
    ConsentTerms,
}

impl FormField {
    /// Snake-case field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::ConsentTerms => "consent_terms",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-field validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Offending field.
    pub field: FormField,
    /// User-facing message.
    pub message: String,
}

impl FieldError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw input as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address, unvalidated.
    pub email: String,
    /// Phone number. Blank means none.
    #[serde(default)]
    pub phone: String,
    /// Ticked condition checkboxes.
    #[serde(default)]
    pub interest_tags: BTreeSet<InterestTag>,
    /// Referral dropdown.
    #[serde(default)]
    pub how_heard: Option<ReferralSource>,
    /// Marketing opt-in checkbox.
    #[serde(default)]
    pub consent_marketing: bool,
    /// Terms checkbox. Must be ticked to submit.
    #[serde(default)]
    pub consent_terms: bool,
}

impl RegistrationForm {
    /// Flip a condition checkbox. Returns whether it is now selected.
    pub fn toggle_interest(&mut self, tag: InterestTag) -> bool {
        if self.interest_tags.remove(&tag) {
            false
        } else {
            self.interest_tags.insert(tag);
            true
        }
    }

    /// Check every field. Returns the validated contact details, or every
    /// field error found (not only the first).
    pub fn validate(&self) -> Result<ContactFields, Vec<FieldError>> {
        let mut errors = Vec::new();

        let first_name = check_name(&self.first_name, FormField::FirstName, "First name", &mut errors);
        let last_name = check_name(&self.last_name, FormField::LastName, "Last name", &mut errors);

        let email = match EmailAddress::new(&self.email) {
            Ok(email) => Some(email),
            Err(ValidationError::EmailTooLong { .. }) => {
                errors.push(FieldError::new(FormField::Email, "Email is too long"));
                None
            }
            Err(_) => {
                errors.push(FieldError::new(FormField::Email, "Please enter a valid email"));
                None
            }
        };

        if !self.consent_terms {
            errors.push(FieldError::new(FormField::ConsentTerms, MESSAGE_TERMS_REQUIRED));
        }

        let phone = Some(self.phone.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        match (first_name, last_name, email) {
            (Some(first_name), Some(last_name), Some(email)) if errors.is_empty() => {
                Ok(ContactFields {
                    first_name,
                    last_name,
                    email,
                    phone,
                })
            }
            _ => Err(errors),
        }
    }
}

fn check_name(
    raw: &str,
    field: FormField,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < NAME_MIN_CHARS {
        errors.push(FieldError::new(field, format!("{label} is required")));
        None
    } else if len > NAME_MAX_CHARS {
        errors.push(FieldError::new(field, format!("{label} is too long")));
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ── Configuration ────────────────────────────────────────────────────

/// Tunables for a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Bound on one sink write.
    pub timeout: Duration,
    /// UI language recorded with the lead.
    pub language: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SINK_TIMEOUT,
            language: "en".to_string(),
        }
    }
}

impl GateConfig {
    /// Override the sink timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the recorded language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Where a registration for `region` is recorded as coming from.
pub fn source_context(region: &RegionCode) -> String {
    format!("/preview/{}", region.as_str())
}

// ── Gate ─────────────────────────────────────────────────────────────

type CompletionCallback = Box<dyn FnOnce(&RegistrationRecord) + Send>;

/// Lead-capture workflow for one region.
pub struct RegistrationGate {
    region: RegionCode,
    region_name: String,
    state: GateState,
    config: GateConfig,
    sink: Arc<dyn RegistrationSink>,
    markers: Arc<dyn RegistrationMarkerStore>,
    on_complete: Option<CompletionCallback>,
    field_errors: Vec<FieldError>,
    last_sink_error: Option<SinkError>,
    submissions: u32,
}

impl std::fmt::Debug for RegistrationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationGate")
            .field("region", &self.region)
            .field("state", &self.state)
            .field("sink", &self.sink.sink_name())
            .field("field_errors", &self.field_errors)
            .field("last_sink_error", &self.last_sink_error)
            .field("submissions", &self.submissions)
            .finish_non_exhaustive()
    }
}

impl RegistrationGate {
    /// Open a gate for `region`. Starts in `Bypassed` when the marker store
    /// already holds a marker for it, `Idle` otherwise.
    ///
    /// # Errors
    ///
    /// [`GateError::Marker`] if the marker store cannot be read.
    pub fn new(
        region: &Region,
        sink: Arc<dyn RegistrationSink>,
        markers: Arc<dyn RegistrationMarkerStore>,
        config: GateConfig,
    ) -> Result<Self, GateError> {
        let state = if markers.get(&region.code)? {
            tracing::info!(region = %region.code, "registration marker present, gate bypassed");
            GateState::Bypassed
        } else {
            GateState::Idle
        };
        Ok(Self {
            region: region.code.clone(),
            region_name: region.display_name.clone(),
            state,
            config,
            sink,
            markers,
            on_complete: None,
            field_errors: Vec::new(),
            last_sink_error: None,
            submissions: 0,
        })
    }

    /// Register a callback fired once, after a successful registration.
    pub fn on_complete(mut self, callback: impl FnOnce(&RegistrationRecord) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Region this gate guards.
    pub fn region(&self) -> &RegionCode {
        &self.region
    }

    /// Whether the form should be shown.
    pub fn shows_form(&self) -> bool {
        !self.state.is_terminal()
    }

    /// User-facing message for the current state, if any.
    pub fn user_message(&self) -> Option<&'static str> {
        self.state.user_message()
    }

    /// Field errors from the most recent submit.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// Diagnostic detail of the most recent sink failure.
    pub fn last_sink_error(&self) -> Option<&SinkError> {
        self.last_sink_error.as_ref()
    }

    /// Number of sink writes this gate has attempted.
    pub fn submissions(&self) -> u32 {
        self.submissions
    }

    /// Validate the form and, if valid, write it to the sink once.
    ///
    /// Returns the resulting state. Field errors return the gate to `Idle`
    /// without contacting the sink.
    ///
    /// # Errors
    ///
    /// [`GateError::InvalidTransition`] when called from `Success`,
    /// `Bypassed`, or a state with a write already outstanding.
    pub async fn submit(&mut self, form: &RegistrationForm) -> Result<GateState, GateError> {
        if !self.state.accepts_submit() {
            tracing::debug!(region = %self.region, state = %self.state, "submit refused");
            return Err(GateError::InvalidTransition {
                region: self.region.clone(),
                from: self.state,
            });
        }

        self.state = GateState::Validating;
        self.field_errors.clear();
        self.last_sink_error = None;

        let contact = match form.validate() {
            Ok(contact) => contact,
            Err(errors) => {
                tracing::debug!(
                    region = %self.region,
                    fields = ?errors.iter().map(|e| e.field.as_str()).collect::<Vec<_>>(),
                    "registration form rejected"
                );
                self.field_errors = errors;
                self.state = GateState::Idle;
                return Ok(self.state);
            }
        };

        let record = RegistrationRecord {
            region_code: self.region.clone(),
            region_name: self.region_name.clone(),
            contact,
            interest_tags: form.interest_tags.clone(),
            how_heard: form.how_heard,
            consent_marketing: form.consent_marketing,
            consent_terms: true,
            language: self.config.language.clone(),
            source_context: source_context(&self.region),
        };

        self.state = GateState::Submitting;
        self.submissions += 1;
        tracing::info!(
            region = %self.region,
            sink = self.sink.sink_name(),
            attempt = self.submissions,
            "submitting registration"
        );

        let result = {
            let mut in_flight = InFlight {
                state: &mut self.state,
                region: &self.region,
                answered: false,
            };
            let result = match tokio::time::timeout(self.config.timeout, self.sink.insert(&record)).await {
                Ok(result) => result,
                Err(_) => Err(SinkError::Timeout {
                    elapsed_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            };
            in_flight.answered = true;
            result
        };

        match result {
            Ok(()) => self.complete(&record),
            Err(err) if err.is_duplicate() => {
                tracing::info!(region = %self.region, "registration already exists");
                self.state = GateState::DuplicateConflict;
                self.last_sink_error = Some(err);
            }
            Err(err) => {
                tracing::warn!(region = %self.region, error = %err, "registration sink failed");
                self.state = GateState::SinkError;
                self.last_sink_error = Some(err);
            }
        }
        Ok(self.state)
    }

    fn complete(&mut self, record: &RegistrationRecord) {
        // The lead is stored; a marker failure only means the gate may
        // reappear on a later visit.
        if let Err(e) = self.markers.set(&self.region, true) {
            tracing::error!(region = %self.region, error = %e, "failed to persist registration marker");
        }
        self.state = GateState::Success;
        tracing::info!(region = %self.region, "registration stored");
        if let Some(callback) = self.on_complete.take() {
            callback(record);
        }
    }
}

/// Held across the sink write. If the submit future is dropped before the
/// sink answers, moves the gate out of `Submitting`.
struct InFlight<'a> {
    state: &'a mut GateState,
    region: &'a RegionCode,
    answered: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.answered && *self.state == GateState::Submitting {
            tracing::warn!(region = %self.region, "registration submit abandoned before the sink answered");
            *self.state = GateState::SinkError;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hb_core::RegionCatalog;

    use crate::marker::InMemoryMarkerStore;
    use crate::memory_sink::InMemorySink;

    fn region(code: &str) -> Region {
        RegionCatalog::builtin()
            .lookup(code)
            .cloned()
            .unwrap()
    }

    fn valid_form(email: &str) -> RegistrationForm {
        RegistrationForm {
            first_name: "Thandi".into(),
            last_name: "Mokoena".into(),
            email: email.into(),
            consent_terms: true,
            ..Default::default()
        }
    }

    fn gate(sink: &InMemorySink, markers: &InMemoryMarkerStore) -> RegistrationGate {
        RegistrationGate::new(
            &region("gb"),
            Arc::new(sink.clone()),
            Arc::new(markers.clone()),
            GateConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn toggle_interest_keeps_a_set() {
        let mut form = RegistrationForm::default();
        assert!(form.toggle_interest(InterestTag::Anxiety));
        assert!(form.toggle_interest(InterestTag::Ptsd));
        assert!(!form.toggle_interest(InterestTag::Anxiety));
        assert_eq!(form.interest_tags.len(), 1);
        assert!(form.interest_tags.contains(&InterestTag::Ptsd));
    }

    #[test]
    fn validation_collects_every_field_error() {
        let form = RegistrationForm {
            first_name: " A ".into(),
            last_name: "x".repeat(51),
            email: "not-an-email".into(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                FormField::FirstName,
                FormField::LastName,
                FormField::Email,
                FormField::ConsentTerms
            ]
        );
        assert_eq!(errors[0].message, "First name is required");
        assert_eq!(errors[1].message, "Last name is too long");
        assert_eq!(errors[3].message, MESSAGE_TERMS_REQUIRED);
    }

    #[test]
    fn validation_trims_and_drops_blank_phone() {
        let mut form = valid_form("  t@example.co.za ");
        form.first_name = "  Thandi ".into();
        form.phone = "   ".into();
        let contact = form.validate().unwrap();
        assert_eq!(contact.first_name, "Thandi");
        assert_eq!(contact.email.as_str(), "t@example.co.za");
        assert_eq!(contact.phone, None);
    }

    #[test]
    fn overlong_email_has_its_own_message() {
        let form = valid_form(&format!("{}@example.com", "a".repeat(250)));
        let errors = form.validate().unwrap_err();
        assert_eq!(errors, vec![FieldError::new(FormField::Email, "Email is too long")]);
    }

    #[test]
    fn state_messages() {
        assert_eq!(GateState::Success.user_message(), Some(MESSAGE_SUCCESS));
        assert_eq!(GateState::DuplicateConflict.user_message(), Some(MESSAGE_DUPLICATE));
        assert_eq!(GateState::SinkError.user_message(), Some(MESSAGE_FAILURE));
        assert_eq!(GateState::Bypassed.user_message(), None);
        assert!(GateState::Bypassed.is_terminal());
        assert!(!GateState::SinkError.is_terminal());
    }

    #[tokio::test]
    async fn success_writes_once_sets_marker_and_fires_callback() {
        let sink = InMemorySink::new();
        let markers = InMemoryMarkerStore::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let mut g = gate(&sink, &markers).on_complete(move |record| {
            assert_eq!(record.source_context, "/preview/gb");
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut form = valid_form("thandi@example.com");
        form.phone = "+27 21 555 0100".into();
        form.toggle_interest(InterestTag::Insomnia);

        assert_eq!(g.submit(&form).await.unwrap(), GateState::Success);
        assert_eq!(sink.attempts(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(markers.get(&RegionCode::new("gb").unwrap()).unwrap());
        assert_eq!(g.user_message(), Some(MESSAGE_SUCCESS));

        let stored = &sink.records()[0];
        assert!(stored.notification_preferences().sms);
        assert_eq!(stored.language, "en");
        assert_eq!(stored.region_name, "United Kingdom");
    }

    #[tokio::test]
    async fn success_is_terminal() {
        let sink = InMemorySink::new();
        let markers = InMemoryMarkerStore::new();
        let mut g = gate(&sink, &markers);
        g.submit(&valid_form("a@example.com")).await.unwrap();
        let err = g.submit(&valid_form("b@example.com")).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::InvalidTransition { from: GateState::Success, .. }
        ));
        assert_eq!(sink.attempts(), 1);
    }

    #[tokio::test]
    async fn marker_present_bypasses() {
        let sink = InMemorySink::new();
        let markers = InMemoryMarkerStore::new();
        markers.set(&RegionCode::new("gb").unwrap(), true).unwrap();
        let mut g = gate(&sink, &markers);
        assert_eq!(g.state(), GateState::Bypassed);
        assert!(!g.shows_form());
        assert!(g.submit(&valid_form("a@example.com")).await.is_err());
        assert_eq!(sink.attempts(), 0);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_sink() {
        let sink = InMemorySink::new();
        let markers = InMemoryMarkerStore::new();
        let mut g = gate(&sink, &markers);
        let mut form = valid_form("a@example.com");
        form.consent_terms = false;
        assert_eq!(g.submit(&form).await.unwrap(), GateState::Idle);
        assert_eq!(sink.attempts(), 0);
        assert_eq!(g.field_errors().len(), 1);
        assert_eq!(g.field_errors()[0].field, FormField::ConsentTerms);
    }

    #[tokio::test]
    async fn sink_failure_allows_manual_retry() {
        let sink = InMemorySink::new();
        let markers = InMemoryMarkerStore::new();
        sink.fail_next(SinkError::Unavailable {
            reason: "connection refused".into(),
        });
        let mut g = gate(&sink, &markers);
        let form = valid_form("a@example.com");

        assert_eq!(g.submit(&form).await.unwrap(), GateState::SinkError);
        assert_eq!(g.user_message(), Some(MESSAGE_FAILURE));
        assert_eq!(sink.attempts(), 1);
        assert!(!markers.get(g.region()).unwrap());

        assert_eq!(g.submit(&form).await.unwrap(), GateState::Success);
        assert_eq!(sink.attempts(), 2);
        assert_eq!(g.submissions(), 2);
    }

    #[tokio::test]
    async fn duplicate_is_distinct_from_failure() {
        let sink = InMemorySink::new();
        let markers = InMemoryMarkerStore::new();
        let form = valid_form("a@example.com");

        let mut first = gate(&sink, &markers);
        first.submit(&form).await.unwrap();

        // A second browser profile: fresh marker store, same sink.
        let mut second = gate(&sink, &InMemoryMarkerStore::new());
        assert_eq!(second.submit(&form).await.unwrap(), GateState::DuplicateConflict);
        assert_eq!(second.user_message(), Some(MESSAGE_DUPLICATE));
        assert!(second.last_sink_error().is_some_and(SinkError::is_duplicate));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_submit_leaves_gate_open_for_another_attempt() {
        let sink = InMemorySink::new();
        sink.set_delay(Some(Duration::from_millis(500)));
        let markers = InMemoryMarkerStore::new();
        let mut g = gate(&sink, &markers);
        let form = valid_form("a@example.com");

        let dropped = tokio::time::timeout(Duration::from_millis(10), g.submit(&form)).await;
        assert!(dropped.is_err());
        assert_eq!(g.state(), GateState::SinkError);
        assert_eq!(g.user_message(), Some(MESSAGE_FAILURE));
        assert!(!markers.get(g.region()).unwrap());

        sink.set_delay(None);
        assert_eq!(g.submit(&form).await.unwrap(), GateState::Success);
        assert_eq!(sink.attempts(), 2);
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_counts_as_sink_error() {
        let sink = InMemorySink::new();
        sink.set_delay(Some(Duration::from_secs(30)));
        let markers = InMemoryMarkerStore::new();
        let mut g = RegistrationGate::new(
            &region("th"),
            Arc::new(sink.clone()),
            Arc::new(markers.clone()),
            GateConfig::default().with_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        assert_eq!(g.submit(&valid_form("a@example.com")).await.unwrap(), GateState::SinkError);
        assert_eq!(g.last_sink_error(), Some(&SinkError::Timeout { elapsed_ms: 2000 }));
        assert!(sink.is_empty());
        assert!(!markers.get(g.region()).unwrap());
    }
}

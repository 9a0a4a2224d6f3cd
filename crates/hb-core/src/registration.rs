//! # Registration Records and the Sink Port
//!
//! A [`RegistrationRecord`] is built client-side once a lead form passes
//! validation, then written exactly once to a [`RegistrationSink`]. The
//! sink enforces uniqueness on `(email, region)` and reports a collision
//! as [`SinkError::Duplicate`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::identity::{EmailAddress, RegionCode};

/// Condition a visitor is interested in. Fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InterestTag {
    #[serde(rename = "Chronic Pain")]
    ChronicPain,
    #[serde(rename = "Anxiety")]
    Anxiety,
    #[serde(rename = "Insomnia")]
    Insomnia,
    #[serde(rename = "Epilepsy")]
    Epilepsy,
    #[serde(rename = "Multiple Sclerosis")]
    MultipleSclerosis,
    #[serde(rename = "PTSD")]
    Ptsd,
    #[serde(rename = "Arthritis")]
    Arthritis,
    #[serde(rename = "Migraines")]
    Migraines,
    #[serde(rename = "Other")]
    Other,
}

impl InterestTag {
    /// Every tag, in form display order.
    pub const ALL: [InterestTag; 9] = [
        Self::ChronicPain,
        Self::Anxiety,
        Self::Insomnia,
        Self::Epilepsy,
        Self::MultipleSclerosis,
        Self::Ptsd,
        Self::Arthritis,
        Self::Migraines,
        Self::Other,
    ];

    /// Label shown on the checkbox and stored in the sink.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChronicPain => "Chronic Pain",
            Self::Anxiety => "Anxiety",
            Self::Insomnia => "Insomnia",
            Self::Epilepsy => "Epilepsy",
            Self::MultipleSclerosis => "Multiple Sclerosis",
            Self::Ptsd => "PTSD",
            Self::Arthritis => "Arthritis",
            Self::Migraines => "Migraines",
            Self::Other => "Other",
        }
    }

    /// Parse a label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
    }
}

impl std::fmt::Display for InterestTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How the visitor heard about the business. Optional on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferralSource {
    #[serde(rename = "Search Engine")]
    SearchEngine,
    #[serde(rename = "Social Media")]
    SocialMedia,
    #[serde(rename = "Friend or Family")]
    FriendOrFamily,
    #[serde(rename = "Healthcare Provider")]
    HealthcareProvider,
    #[serde(rename = "News Article")]
    NewsArticle,
    #[serde(rename = "Advertisement")]
    Advertisement,
    #[serde(rename = "Other")]
    Other,
}

impl ReferralSource {
    /// Every option, in dropdown order.
    pub const ALL: [ReferralSource; 7] = [
        Self::SearchEngine,
        Self::SocialMedia,
        Self::FriendOrFamily,
        Self::HealthcareProvider,
        Self::NewsArticle,
        Self::Advertisement,
        Self::Other,
    ];

    /// Display label, also the stored value.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SearchEngine => "Search Engine",
            Self::SocialMedia => "Social Media",
            Self::FriendOrFamily => "Friend or Family",
            Self::HealthcareProvider => "Healthcare Provider",
            Self::NewsArticle => "News Article",
            Self::Advertisement => "Advertisement",
            Self::Other => "Other",
        }
    }

    /// Parse a label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(wanted))
    }
}

/// Validated contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    /// Given name, trimmed.
    pub first_name: String,
    /// Family name, trimmed.
    pub last_name: String,
    /// Validated email address.
    pub email: EmailAddress,
    /// Phone number, if one was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Channels the visitor will be notified on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub email: bool,
    pub sms: bool,
}

/// One lead submission, ready for the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    /// Region the visitor registered interest in.
    pub region_code: RegionCode,
    /// Region display name at the time of submission.
    pub region_name: String,
    /// Contact details.
    pub contact: ContactFields,
    /// Selected conditions. A set: order carries no meaning.
    pub interest_tags: BTreeSet<InterestTag>,
    /// Optional referral answer.
    pub how_heard: Option<ReferralSource>,
    /// Opt-in to marketing communications.
    pub consent_marketing: bool,
    /// Terms acceptance. Always `true` on a constructed record.
    pub consent_terms: bool,
    /// Two-letter UI language.
    pub language: String,
    /// Where the registration occurred, e.g. `/preview/gb`.
    pub source_context: String,
}

impl RegistrationRecord {
    /// Email always; SMS only when a phone number was given.
    pub fn notification_preferences(&self) -> NotificationPreferences {
        NotificationPreferences {
            email: true,
            sms: self.contact.phone.is_some(),
        }
    }
}

/// Port to the external lead store.
///
/// Implementations must be `Send + Sync` so a sink can be shared behind an
/// `Arc`. Each call is one write attempt; implementations must not retry.
#[async_trait]
pub trait RegistrationSink: Send + Sync {
    /// Insert a record.
    ///
    /// # Errors
    ///
    /// [`SinkError::Duplicate`] when `(email, region)` already exists;
    /// any other variant for transport or server failures.
    async fn insert(&self, record: &RegistrationRecord) -> Result<(), SinkError>;

    /// Human-readable name of the implementation, for logs.
    fn sink_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(phone: Option<&str>) -> RegistrationRecord {
        RegistrationRecord {
            region_code: RegionCode::new("gb").unwrap(),
            region_name: "United Kingdom".to_string(),
            contact: ContactFields {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: EmailAddress::new("ada@example.com").unwrap(),
                phone: phone.map(str::to_string),
            },
            interest_tags: [InterestTag::Insomnia, InterestTag::ChronicPain].into_iter().collect(),
            how_heard: Some(ReferralSource::NewsArticle),
            consent_marketing: false,
            consent_terms: true,
            language: "en".to_string(),
            source_context: "/preview/gb".to_string(),
        }
    }

    #[test]
    fn notification_preferences_follow_phone() {
        assert_eq!(
            record(None).notification_preferences(),
            NotificationPreferences { email: true, sms: false }
        );
        assert!(record(Some("+44 20 7946 0000")).notification_preferences().sms);
    }

    #[test]
    fn interest_tags_serialize_as_labels() {
        let json = serde_json::to_value(record(None)).unwrap();
        assert_eq!(json["interest_tags"], serde_json::json!(["Chronic Pain", "Insomnia"]));
        assert_eq!(json["how_heard"], "News Article");
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(InterestTag::from_label(" ptsd "), Some(InterestTag::Ptsd));
        assert_eq!(InterestTag::from_label("Multiple Sclerosis"), Some(InterestTag::MultipleSclerosis));
        assert_eq!(InterestTag::from_label("Back Pain"), None);
        assert_eq!(ReferralSource::from_label("friend or family"), Some(ReferralSource::FriendOrFamily));
        assert_eq!(ReferralSource::from_label("Billboard"), None);
    }

    #[test]
    fn every_label_round_trips() {
        for tag in InterestTag::ALL {
            assert_eq!(InterestTag::from_label(tag.label()), Some(tag));
        }
        for src in ReferralSource::ALL {
            assert_eq!(ReferralSource::from_label(src.label()), Some(src));
        }
    }
}

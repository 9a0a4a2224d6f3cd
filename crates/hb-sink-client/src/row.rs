//! Wire shape of one row in the registration table.

use hb_core::{InterestTag, NotificationPreferences, ReferralSource, RegistrationRecord};
use serde::Serialize;

/// A registration as the hosted table stores it. Column names are
/// snake_case; the region code is upper case as displayed on the site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationRow<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub region_code: String,
    pub region_name: &'a str,
    pub interested_conditions: Vec<InterestTag>,
    pub how_heard_about_us: Option<ReferralSource>,
    pub consent_marketing: bool,
    pub consent_terms: bool,
    pub notification_preferences: NotificationPreferences,
    pub language: &'a str,
    pub source_page: &'a str,
}

impl<'a> From<&'a RegistrationRecord> for RegistrationRow<'a> {
    fn from(record: &'a RegistrationRecord) -> Self {
        Self {
            first_name: &record.contact.first_name,
            last_name: &record.contact.last_name,
            email: record.contact.email.as_str(),
            phone: record.contact.phone.as_deref(),
            region_code: record.region_code.to_display_code(),
            region_name: &record.region_name,
            interested_conditions: record.interest_tags.iter().copied().collect(),
            how_heard_about_us: record.how_heard,
            consent_marketing: record.consent_marketing,
            consent_terms: record.consent_terms,
            notification_preferences: record.notification_preferences(),
            language: &record.language,
            source_page: &record.source_context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_core::{ContactFields, EmailAddress, RegionCode};
    use serde_json::json;

    #[test]
    fn row_matches_table_columns() {
        let record = RegistrationRecord {
            region_code: RegionCode::new("gb").unwrap(),
            region_name: "United Kingdom".into(),
            contact: ContactFields {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: EmailAddress::new("ada@example.com").unwrap(),
                phone: None,
            },
            interest_tags: [InterestTag::Migraines, InterestTag::Anxiety].into_iter().collect(),
            how_heard: None,
            consent_marketing: true,
            consent_terms: true,
            language: "en".into(),
            source_context: "/preview/gb".into(),
        };
        let value = serde_json::to_value(RegistrationRow::from(&record)).unwrap();
        assert_eq!(
            value,
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
                "phone": null,
                "region_code": "GB",
                "region_name": "United Kingdom",
                "interested_conditions": ["Anxiety", "Migraines"],
                "how_heard_about_us": null,
                "consent_marketing": true,
                "consent_terms": true,
                "notification_preferences": {"email": true, "sms": false},
                "language": "en",
                "source_page": "/preview/gb"
            })
        );
    }
}

//! # Region Model
//!
//! A [`Region`] is one market the business operates in or plans to. The
//! record is pure data; the only behaviour is the derived
//! [`Region::is_live`] predicate.

use serde::{Deserialize, Serialize};

use crate::identity::RegionCode;

/// Operational display status of a region.
///
/// This drives badges and marker styling only. HQ and PRODUCTION are
/// operationally active but never carry an outbound link in the shipped
/// catalog; NEXT is always gated. Reachability is a separate, derived
/// notion; see [`Region::is_live`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionStatus {
    /// Operating with a public regional site.
    Live,
    /// Global headquarters.
    Hq,
    /// Manufacturing operations.
    Production,
    /// Launching next; lead capture only.
    Next,
}

impl RegionStatus {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::Hq => "HQ",
            Self::Production => "PRODUCTION",
            Self::Next => "NEXT",
        }
    }

    /// Whether the region is operating for display purposes.
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Next)
    }
}

impl std::fmt::Display for RegionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic marker position, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, -90..=90.
    pub lat: f64,
    /// Longitude, -180..=180.
    pub lng: f64,
}

impl Coordinates {
    /// Whether both components are within range and finite.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Local currency shown on regional content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code.
    pub code: String,
    /// Display symbol.
    pub symbol: String,
}

/// What the business does in a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operations {
    /// Short label, e.g. "Medical Clinic Network".
    #[serde(rename = "type")]
    pub kind: String,
    /// One-paragraph description.
    pub description: String,
}

/// One entry of the region catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Unique short identifier.
    pub code: RegionCode,
    /// Human-readable name.
    pub display_name: String,
    /// Flag glyph or icon reference.
    pub flag: String,
    /// Marker position on the map.
    pub coordinates: Coordinates,
    /// Display status.
    pub status: RegionStatus,
    /// Badge subtitle, e.g. "Global Headquarters".
    #[serde(default)]
    pub status_description: String,
    /// Off-site URL. Present only when the visitor may be redirected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    /// Whether the live branch leads with an eligibility check.
    #[serde(default)]
    pub eligibility_first: bool,
    /// Hostnames that resolve to this region.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Regulator name shown on the badge.
    pub regulatory_body: String,
    /// Ordered list of certifications.
    #[serde(default)]
    pub compliance_certifications: Vec<String>,
    /// Legal footnote.
    #[serde(default)]
    pub legal_note: String,
    /// Content language.
    #[serde(default)]
    pub language: String,
    /// Local currency.
    pub currency: Currency,
    /// Operations summary.
    pub operations: Operations,
    /// Services offered.
    #[serde(default)]
    pub services: Vec<String>,
    /// Feature highlights for the detail panel.
    #[serde(default)]
    pub features: Vec<String>,
}

impl Region {
    /// Whether the region has a reachable external site.
    ///
    /// Derived from `external_url` on every call; there is no stored flag.
    pub fn is_live(&self) -> bool {
        self.external_url.is_some()
    }

    /// The outbound URL, if the region is live.
    pub fn external_url(&self) -> Option<&str> {
        self.external_url.as_deref()
    }
}

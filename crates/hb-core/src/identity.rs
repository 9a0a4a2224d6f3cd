//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the identifiers that cross crate
//! boundaries. A [`RegionCode`] cannot be confused with a hostname or an
//! email, and both validate at construction time.
//!
//! ## Validation
//!
//! - [`RegionCode`]: 2-12 ASCII alphanumerics, normalised to lower case
//!   (`"ZA"` and `"za"` are the same region).
//! - [`EmailAddress`]: trimmed, at most 255 characters, a single `@`, a
//!   non-empty local part and a dotted domain without empty labels.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Code reserved for the generic global entry point.
pub const GLOBAL_CODE: &str = "global";

/// Maximum accepted email length, matching the sink column width.
pub const EMAIL_MAX_LEN: usize = 255;

/// Short identifier of a region, e.g. `za`, `pt`, or `global`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode(String);

impl RegionCode {
    /// Create a region code, validating and lower-casing the input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRegionCode`] if the trimmed value
    /// is shorter than 2 or longer than 12 characters, or contains anything
    /// other than ASCII letters and digits.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref().trim();
        let valid = (2..=12).contains(&raw.len()) && raw.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(ValidationError::InvalidRegionCode(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// The code of the generic global entry point.
    pub fn global() -> Self {
        Self(GLOBAL_CODE.to_string())
    }

    /// Build a code from a literal known to be valid. Crate-internal so
    /// that the built-in catalog stays infallible.
    pub(crate) fn known(value: &'static str) -> Self {
        Self(value.to_string())
    }

    /// Whether this is the global entry point rather than a map region.
    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_CODE
    }

    /// Access the lower-case code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-case form used on badges and in sink rows (`ZA`).
    pub fn to_display_code(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RegionCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegionCode> for String {
    fn from(code: RegionCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for RegionCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A syntactically valid email address.
///
/// This is a client-side plausibility check, not deliverability
/// verification. The stored value is the trimmed input with its case
/// preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create an email address, validating format and length.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmailTooLong`] above 255 characters and
    /// [`ValidationError::InvalidEmail`] for malformed input.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let s = value.as_ref().trim();
        let len = s.chars().count();
        if len > EMAIL_MAX_LEN {
            return Err(ValidationError::EmailTooLong {
                len,
                max: EMAIL_MAX_LEN,
            });
        }
        if !Self::is_well_formed(s) {
            return Err(ValidationError::InvalidEmail(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    fn is_well_formed(s: &str) -> bool {
        if s.chars().any(char::is_whitespace) {
            return false;
        }
        let Some((local, domain)) = s.split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.contains('@') {
            return false;
        }
        let labels: Vec<&str> = domain.split('.').collect();
        labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
    }

    /// Access the address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

//! # Error Hierarchy
//!
//! Structured error types for the region portal, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Each variant carries the offending value so that a misconfigured catalog
//! or a rejected registration can be diagnosed from the message alone.

use std::path::PathBuf;

use thiserror::Error;

use crate::identity::RegionCode;

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Region code is empty, too long, or contains non-alphanumeric characters.
    #[error("invalid region code: \"{0}\" (expected 2-12 ASCII letters or digits)")]
    InvalidRegionCode(String),

    /// Email address fails the syntactic check.
    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),

    /// Email address exceeds the storage limit.
    #[error("email address is too long: {len} characters (maximum {max})")]
    EmailTooLong {
        /// Length of the rejected value.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },
}

/// Errors raised while loading or validating a [`crate::RegionCatalog`].
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog defines no regions.
    #[error("catalog defines no regions")]
    Empty,

    /// Two regions share a code.
    #[error("region {0} is defined more than once")]
    DuplicateRegion(RegionCode),

    /// A region uses the code reserved for the global entry point.
    #[error("region code {0} is reserved for the global entry point")]
    ReservedCode(RegionCode),

    /// A NEXT region carries an external URL.
    #[error("region {0} has status NEXT and must not carry an external URL")]
    NextWithExternalUrl(RegionCode),

    /// An external URL does not parse or is not http(s).
    #[error("region {code} has an invalid external URL \"{url}\": {reason}")]
    InvalidExternalUrl {
        /// The region whose URL was rejected.
        code: RegionCode,
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A marker position is out of range or not finite.
    #[error("region {code} has invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates {
        /// The region whose marker was rejected.
        code: RegionCode,
        /// Rejected latitude.
        lat: f64,
        /// Rejected longitude.
        lng: f64,
    },

    /// A domain entry is empty or not lower-case.
    #[error("region {code} lists an invalid domain \"{domain}\" (expected non-empty lower-case hostname)")]
    InvalidDomain {
        /// The region (or `global`) that lists the domain.
        code: RegionCode,
        /// The rejected domain.
        domain: String,
    },

    /// The same domain is claimed by two regions.
    #[error("domain \"{domain}\" is claimed by both {first} and {second}")]
    DuplicateDomain {
        /// The contested domain.
        domain: String,
        /// The first claimant.
        first: RegionCode,
        /// The second claimant.
        second: RegionCode,
    },

    /// The traversal order names a code that is not in the catalog.
    #[error("traversal order references unknown region {0}")]
    TraversalUnknown(RegionCode),

    /// The traversal order names a region twice.
    #[error("traversal order lists region {0} more than once")]
    TraversalDuplicate(RegionCode),

    /// A catalog region is missing from the traversal order.
    #[error("region {0} is missing from the traversal order")]
    TraversalMissing(RegionCode),

    /// A region code in the catalog file failed validation.
    #[error("invalid region code in catalog: {0}")]
    Validation(#[from] ValidationError),

    /// The catalog file is not valid YAML for the catalog schema.
    #[error("catalog YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// The catalog path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Failures reported by a [`crate::RegistrationSink`].
///
/// `Duplicate` is a first-class outcome, not a generic failure: the gate
/// maps it to its own state and message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The `(email, region)` pair is already registered.
    #[error("registration already exists for {email} in region {region}")]
    Duplicate {
        /// The email that collided.
        email: String,
        /// The region of the existing registration.
        region: RegionCode,
    },

    /// The sink did not answer within the client-side timeout.
    #[error("registration sink timed out after {elapsed_ms} ms")]
    Timeout {
        /// The timeout that expired, in milliseconds.
        elapsed_ms: u64,
    },

    /// The sink could not be reached or failed internally.
    #[error("registration sink unavailable: {reason}")]
    Unavailable {
        /// Diagnostic detail (transport error, status line).
        reason: String,
    },

    /// The sink answered with a non-success status that is not a duplicate.
    #[error("registration sink rejected the record with status {status}: {body}")]
    Rejected {
        /// HTTP-equivalent status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },
}

impl SinkError {
    /// Whether this failure is the uniqueness conflict.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

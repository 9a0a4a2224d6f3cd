//! # hb-core: Foundational Types for the Region Portal
//!
//! Every other crate in the workspace depends on `hb-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `RegionCode` and
//!    `EmailAddress` validate at construction. No bare strings for
//!    identifiers that cross a crate boundary.
//!
//! 2. **Display status and reachability are separate.** `RegionStatus`
//!    (LIVE / HQ / PRODUCTION / NEXT) drives badges and marker styling.
//!    Whether a visitor is sent off-site is derived from the presence of
//!    an external URL and nothing else. See [`policy`].
//!
//! 3. **The catalog is immutable and validated once.** `RegionCatalog`
//!    rejects any table that breaks the region invariants at load time,
//!    so downstream code never re-checks them.
//!
//! 4. **The registration sink is a port.** [`registration::RegistrationSink`]
//!    is the only way lead data leaves the process. Transport details live
//!    in `hb-sink-client`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `hb-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod catalog;
pub mod error;
pub mod identity;
pub mod policy;
pub mod region;
pub mod registration;
pub mod resolver;

pub use catalog::RegionCatalog;
pub use error::{CatalogError, SinkError, ValidationError};
pub use identity::{EmailAddress, RegionCode};
pub use policy::RegionStatusPolicy;
pub use region::{Coordinates, Currency, Operations, Region, RegionStatus};
pub use registration::{
    ContactFields, InterestTag, NotificationPreferences, ReferralSource, RegistrationRecord,
    RegistrationSink,
};
pub use resolver::{AccessContext, DomainResolver, MatchKind, Resolution};

//! # hb-portal: Region Portal Coordinator
//!
//! Turns a region selection into what the visitor sees:
//!
//! - [`presenter`]: pure detail-panel view-model (live, eligibility-first,
//!   registered, or registration form).
//! - [`preview`]: `/preview/<code>` deep links, including the global
//!   preview and the "not found" page.
//! - [`session`]: one visit, tying hostname resolution, the map state
//!   machine, and the registration gate together.

pub mod error;
pub mod presenter;
pub mod preview;
pub mod session;

pub use error::SessionError;
pub use presenter::{
    present, ActionKind, DetailAction, DetailBranch, DetailViewModel, RegionDetail, StatusBadge,
};
pub use preview::{resolve_deep_link, DeepLink};
pub use session::{PortalSession, PreviewPage};

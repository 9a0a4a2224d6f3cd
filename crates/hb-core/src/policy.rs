//! # Region Status Policy
//!
//! Decides whether a region is *live* (the visitor is offered an outbound
//! link) or *gated* (lead capture before preview). The decision is keyed on
//! reachability alone: a region is live exactly when its catalog entry
//! carries an external URL.
//!
//! Display status is a different axis. An HQ or PRODUCTION region is
//! operating, but in the shipped catalog neither carries a URL, so both are
//! gated. Callers must not infer one notion from the other.

use crate::catalog::RegionCatalog;
use crate::identity::RegionCode;

/// Live/gated classification over a catalog.
#[derive(Debug, Clone, Copy)]
pub struct RegionStatusPolicy<'a> {
    catalog: &'a RegionCatalog,
}

impl<'a> RegionStatusPolicy<'a> {
    /// Create a policy over the given catalog.
    pub fn new(catalog: &'a RegionCatalog) -> Self {
        Self { catalog }
    }

    /// Whether the region has a reachable external site. Unknown codes and
    /// the global entry point are never live.
    pub fn is_live(&self, code: &RegionCode) -> bool {
        self.external_url(code).is_some()
    }

    /// The outbound URL for a live region, `None` otherwise.
    pub fn external_url(&self, code: &RegionCode) -> Option<&'a str> {
        self.catalog.get(code).and_then(|r| r.external_url())
    }

    /// Whether a visitor must pass lead capture before previewing.
    pub fn is_gated(&self, code: &RegionCode) -> bool {
        self.catalog.contains(code) && !self.is_live(code)
    }
}

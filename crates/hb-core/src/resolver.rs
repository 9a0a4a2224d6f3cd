//! # Domain Resolution
//!
//! Maps the visitor's hostname to a region code. Resolution is total: every
//! input yields a code, falling back to `global`.
//!
//! Matching order:
//!
//! 1. exact match against a configured domain,
//! 2. suffix match (subdomains, and a bare `<domain>` suffix),
//! 3. development/preview hosts → `global`,
//! 4. anything else → `global`.
//!
//! Regions are consulted in catalog declaration order, followed by the
//! global entry point's own domains.

use serde::Serialize;

use crate::catalog::RegionCatalog;
use crate::identity::RegionCode;

/// Substrings that mark a local or preview deployment.
const DEVELOPMENT_MARKERS: &[&str] = &["lovable.app", "127.0.0.1", "preview"];

/// The access context of one visit. Only the hostname matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    hostname: String,
}

impl AccessContext {
    /// Build a context from a raw host string. Trims whitespace, drops a
    /// `:port` suffix and a trailing dot, and lower-cases.
    pub fn new(host: impl AsRef<str>) -> Self {
        let mut h = host.as_ref().trim().to_ascii_lowercase();
        if let Some((name, port)) = h.rsplit_once(':') {
            if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
                h = name.to_string();
            }
        }
        while h.ends_with('.') {
            h.pop();
        }
        Self { hostname: h }
    }

    /// The normalised hostname.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Whether the host is a local, preview, or development deployment.
    pub fn is_development(&self) -> bool {
        self.hostname == "localhost"
            || DEVELOPMENT_MARKERS.iter().any(|m| self.hostname.contains(m))
    }
}

/// Which rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Hostname equals a configured domain.
    Exact,
    /// Hostname ends with a configured domain.
    Suffix,
    /// Development or preview host.
    Development,
    /// Nothing matched.
    Fallback,
}

/// A resolved region code with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The resolved code. Never absent.
    pub code: RegionCode,
    /// The rule that matched.
    pub matched: MatchKind,
}

/// Hostname-to-region resolver over a static domain table.
#[derive(Debug, Clone)]
pub struct DomainResolver {
    table: Vec<(RegionCode, Vec<String>)>,
}

impl DomainResolver {
    /// Build the domain table from a catalog.
    pub fn from_catalog(catalog: &RegionCatalog) -> Self {
        let mut table: Vec<(RegionCode, Vec<String>)> = catalog
            .declared()
            .iter()
            .map(|r| (r.code.clone(), r.domains.clone()))
            .collect();
        table.push((RegionCode::global(), catalog.global_domains().to_vec()));
        Self { table }
    }

    /// Resolve an access context to a region code.
    pub fn resolve(&self, ctx: &AccessContext) -> RegionCode {
        self.resolve_detailed(ctx).code
    }

    /// Convenience wrapper over [`Self::resolve`] for a raw host string.
    pub fn resolve_host(&self, host: &str) -> RegionCode {
        self.resolve(&AccessContext::new(host))
    }

    /// Resolve and report which rule matched.
    pub fn resolve_detailed(&self, ctx: &AccessContext) -> Resolution {
        let host = ctx.hostname();

        if !host.is_empty() {
            for (code, domains) in &self.table {
                if domains.iter().any(|d| d == host) {
                    return Resolution {
                        code: code.clone(),
                        matched: MatchKind::Exact,
                    };
                }
            }
            for (code, domains) in &self.table {
                if domains.iter().any(|d| host.ends_with(d.as_str())) {
                    return Resolution {
                        code: code.clone(),
                        matched: MatchKind::Suffix,
                    };
                }
            }
        }

        let matched = if ctx.is_development() {
            MatchKind::Development
        } else {
            MatchKind::Fallback
        };
        Resolution {
            code: RegionCode::global(),
            matched,
        }
    }
}

//! Deep-link resolution for `/preview/<code>`.
//!
//! An unknown code is a user-visible "not found" page with a link back to
//! the global entry point, never an error.

use hb_core::{RegionCatalog, RegionCode};
use serde::Serialize;

/// Path prefix of preview deep links.
pub const PREVIEW_PREFIX: &str = "/preview/";

/// Where the "not found" page links back to.
pub const GLOBAL_ENTRY_PATH: &str = "/";

/// A resolved deep link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum DeepLink {
    /// The global entry point's own preview.
    Global,
    /// A catalog region.
    Region {
        /// Canonical code.
        code: RegionCode,
    },
    /// Nothing matched.
    NotFound {
        /// What the visitor asked for, verbatim.
        requested: String,
        /// Message for the page body.
        message: String,
        /// Link back to the global entry point.
        back_link: String,
    },
}

/// Extract the code from a `/preview/<code>` path. A bare code is returned
/// as is.
pub fn preview_code(path_or_code: &str) -> &str {
    let trimmed = path_or_code.trim();
    trimmed
        .strip_prefix(PREVIEW_PREFIX)
        .map(|rest| rest.trim_end_matches('/'))
        .unwrap_or(trimmed)
}

/// Resolve a deep-link parameter against the catalog. Case-insensitive.
pub fn resolve_deep_link(catalog: &RegionCatalog, path_or_code: &str) -> DeepLink {
    let requested = preview_code(path_or_code);
    match RegionCode::new(requested) {
        Ok(code) if code.is_global() => DeepLink::Global,
        Ok(code) if catalog.contains(&code) => DeepLink::Region { code },
        _ => {
            tracing::info!(requested, "preview requested for unknown region");
            DeepLink::NotFound {
                requested: requested.to_string(),
                message: format!("The region \"{requested}\" is not available for preview."),
                back_link: GLOBAL_ENTRY_PATH.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(raw: &str) -> DeepLink {
        resolve_deep_link(&RegionCatalog::builtin(), raw)
    }

    #[test]
    fn known_codes_resolve_case_insensitively() {
        assert_eq!(
            resolve("GB"),
            DeepLink::Region {
                code: RegionCode::new("gb").unwrap()
            }
        );
        assert_eq!(
            resolve("/preview/Th/"),
            DeepLink::Region {
                code: RegionCode::new("th").unwrap()
            }
        );
    }

    #[test]
    fn global_renders_global_preview() {
        assert_eq!(resolve("global"), DeepLink::Global);
        assert_eq!(resolve("/preview/GLOBAL"), DeepLink::Global);
    }

    #[test]
    fn unknown_or_malformed_is_not_found() {
        for raw in ["de", "/preview/", "../etc", ""] {
            match resolve(raw) {
                DeepLink::NotFound { back_link, message, .. } => {
                    assert_eq!(back_link, "/");
                    assert!(message.contains("not available for preview"));
                }
                other => panic!("{raw:?} resolved to {other:?}"),
            }
        }
    }

    #[test]
    fn preview_code_strips_prefix() {
        assert_eq!(preview_code("/preview/za"), "za");
        assert_eq!(preview_code(" pt "), "pt");
    }
}

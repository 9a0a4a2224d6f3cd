//! # hb-cli: the `healingbuds` command-line tool
//!
//! Drives the region portal from a terminal. Every subcommand goes
//! through the same library types a page visit uses, so the CLI doubles
//! as an operator tool and a smoke test.
//!
//! ## Subcommands
//!
//! - `healingbuds resolve`: hostname to region code.
//! - `healingbuds regions`: list the catalog, show a detail view-model.
//! - `healingbuds preview`: resolve a `/preview/<code>` deep link.
//! - `healingbuds navigate`: replay keys through the map controller.
//! - `healingbuds register`: submit a lead through the registration gate.
//! - `healingbuds markers`: inspect or clear "already registered" markers.
//!
//! ```bash
//! healingbuds resolve www.healingbuds.co.uk
//! healingbuds navigate --keys ArrowRight,ArrowRight,Enter
//! healingbuds register --region gb --first-name Ada --last-name Lovelace \
//!     --email ada@example.com --accept-terms --dry-run
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | success, or already registered (bypassed) |
//! | 1    | operational error                         |
//! | 2    | form validation failed                    |
//! | 3    | email already registered for the region   |
//! | 4    | the sink could not store the lead         |

pub mod markers;
pub mod navigate;
pub mod regions;
pub mod register;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use hb_core::{AccessContext, RegionCatalog, RegionCode, RegistrationSink};
use hb_portal::PortalSession;
use hb_state::{FileMarkerStore, GateConfig};

/// Default directory for local state.
pub const DEFAULT_STATE_DIR: &str = ".healingbuds";

/// Marker file name inside the state directory.
pub const MARKER_FILE: &str = "markers.json";

/// Success, or already registered.
pub const EXIT_OK: u8 = 0;
/// The form failed validation; nothing was sent.
pub const EXIT_VALIDATION: u8 = 2;
/// The email is already registered for the region.
pub const EXIT_DUPLICATE: u8 = 3;
/// The sink failed or timed out.
pub const EXIT_SINK_FAILURE: u8 = 4;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Workspace {
    catalog: Arc<RegionCatalog>,
    state_dir: PathBuf,
}

impl Workspace {
    /// Load the catalog (built in, or from `catalog_path`) and remember the
    /// state directory. Nothing is written until a command needs it.
    pub fn load(catalog_path: Option<&Path>, state_dir: &Path) -> Result<Self> {
        let catalog = match catalog_path {
            Some(path) => RegionCatalog::from_yaml_file(path)
                .with_context(|| format!("failed to load region catalog from {}", path.display()))?,
            None => RegionCatalog::builtin(),
        };
        tracing::debug!(
            regions = catalog.len(),
            source = catalog_path.map_or("builtin".to_string(), |p| p.display().to_string()),
            "region catalog loaded"
        );
        Ok(Self::with_catalog(catalog, state_dir))
    }

    /// Wrap an already-built catalog.
    pub fn with_catalog(catalog: RegionCatalog, state_dir: &Path) -> Self {
        Self {
            catalog: Arc::new(catalog),
            state_dir: state_dir.to_path_buf(),
        }
    }

    pub fn catalog(&self) -> &Arc<RegionCatalog> {
        &self.catalog
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// The file-backed marker store under the state directory.
    pub fn marker_store(&self) -> FileMarkerStore {
        FileMarkerStore::new(self.state_dir.join(MARKER_FILE))
    }

    /// Start a portal session as if the page were served from `host`,
    /// backed by the file marker store.
    pub fn session(
        &self,
        host: &str,
        sink: Arc<dyn RegistrationSink>,
        config: GateConfig,
    ) -> PortalSession {
        PortalSession::new(
            Arc::clone(&self.catalog),
            &AccessContext::new(host),
            sink,
            Arc::new(self.marker_store()),
            config,
        )
    }

    /// Parse `raw` and require it to name a catalog region.
    pub fn region_code(&self, raw: &str) -> Result<RegionCode> {
        let code = RegionCode::new(raw).with_context(|| format!("invalid region code: {raw:?}"))?;
        if !self.catalog.contains(&code) {
            anyhow::bail!("unknown region: {code}");
        }
        Ok(code)
    }
}

/// Pretty-print any serializable value as JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_workspace_knows_the_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::load(None, dir.path()).unwrap();
        assert_eq!(ws.region_code("GB").unwrap().as_str(), "gb");
        assert!(ws.region_code("de").is_err());
        assert!(ws.region_code("not a code").is_err());
    }

    #[test]
    fn marker_store_lives_in_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::load(None, dir.path()).unwrap();
        assert_eq!(ws.marker_store().path(), dir.path().join("markers.json"));
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Workspace::load(Some(dir.path().join("nope.yaml").as_path()), dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load region catalog"));
    }
}

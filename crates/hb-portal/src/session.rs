//! # Portal Session
//!
//! One page visit. Wires the pieces together in the order a visit flows:
//!
//! ```text
//! hostname ──DomainResolver──▶ entry region
//! pointer / keys / deep link ──MapSelectionController──▶ selected region
//! selected region ──RegionStatusPolicy + marker──▶ present() ──▶ DetailViewModel
//! gated + no marker ──RegistrationGate──▶ Success ──▶ marker set
//! ```
//!
//! The session owns the map controller and at most one open gate. A gate
//! is bound to one region; selecting another region discards it.

use std::sync::Arc;

use hb_core::{
    AccessContext, DomainResolver, RegionCatalog, RegionCode, RegionStatusPolicy,
    RegistrationRecord, RegistrationSink, Resolution,
};
use hb_state::{
    GateConfig, GateState, MapSelectionController, NavOutcome, RegistrationForm,
    RegistrationGate, RegistrationMarkerStore,
};
use serde::Serialize;

use crate::error::SessionError;
use crate::presenter::{present, DetailViewModel};
use crate::preview::{resolve_deep_link, DeepLink};

type CompletionHook = Arc<dyn Fn(&RegistrationRecord) + Send + Sync>;

/// A rendered preview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewPage {
    /// What the link resolved to.
    pub link: DeepLink,
    /// Whether gated content is visible. False while a registration gate
    /// is still in front of it.
    pub content_released: bool,
    /// Panel view-model for region previews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailViewModel>,
}

/// State of one visit.
pub struct PortalSession {
    catalog: Arc<RegionCatalog>,
    entry: Resolution,
    map: MapSelectionController,
    sink: Arc<dyn RegistrationSink>,
    markers: Arc<dyn RegistrationMarkerStore>,
    gate_config: GateConfig,
    gate: Option<RegistrationGate>,
    on_registered: Option<CompletionHook>,
}

impl std::fmt::Debug for PortalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalSession")
            .field("entry", &self.entry)
            .field("map", self.map.state())
            .field("sink", &self.sink.sink_name())
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl PortalSession {
    /// Start a visit from the given access context.
    pub fn new(
        catalog: Arc<RegionCatalog>,
        ctx: &AccessContext,
        sink: Arc<dyn RegistrationSink>,
        markers: Arc<dyn RegistrationMarkerStore>,
        gate_config: GateConfig,
    ) -> Self {
        let entry = DomainResolver::from_catalog(&catalog).resolve_detailed(ctx);
        tracing::info!(host = ctx.hostname(), region = %entry.code, matched = ?entry.matched, "visit started");
        Self {
            map: MapSelectionController::new(Arc::clone(&catalog)),
            catalog,
            entry,
            sink,
            markers,
            gate_config,
            gate: None,
            on_registered: None,
        }
    }

    /// Run `hook` after every successful registration in this visit.
    pub fn on_registered(mut self, hook: impl Fn(&RegistrationRecord) + Send + Sync + 'static) -> Self {
        self.on_registered = Some(Arc::new(hook));
        self
    }

    /// Region the hostname resolved to.
    pub fn entry_region(&self) -> &RegionCode {
        &self.entry.code
    }

    /// Full hostname resolution.
    pub fn entry_resolution(&self) -> &Resolution {
        &self.entry
    }

    /// Read-only view of the map state machine.
    pub fn map(&self) -> &MapSelectionController {
        &self.map
    }

    /// Marker click.
    pub fn select_region(&mut self, code: &RegionCode) -> NavOutcome {
        let out = self.map.pointer_select(code);
        self.sync_gate();
        out
    }

    /// Raw key press on the map.
    pub fn handle_key(&mut self, key: &str) -> NavOutcome {
        let out = self.map.handle_key(key);
        self.sync_gate();
        out
    }

    /// Panel close button.
    pub fn close_panel(&mut self) -> NavOutcome {
        self.map.close_panel()
    }

    /// Whether a text field holds input focus.
    pub fn set_typing(&mut self, typing: bool) {
        self.map.set_input_capture(typing);
    }

    /// Whether this visitor holds a marker for `code`.
    pub fn is_registered(&self, code: &RegionCode) -> Result<bool, SessionError> {
        Ok(self.markers.get(code)?)
    }

    /// Panel view-model for the selected region, if the panel is open.
    pub fn detail(&self) -> Result<Option<DetailViewModel>, SessionError> {
        let state = self.map.state();
        let Some(code) = state.selected().filter(|_| state.is_panel_open()) else {
            return Ok(None);
        };
        let marker = self.markers.get(code)?;
        Ok(Some(present(self.catalog.get(code), marker)))
    }

    /// The gate for the selected region, opening it on first use.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSelection`] with nothing selected,
    /// [`SessionError::NotGated`] for a live region.
    pub fn gate(&mut self) -> Result<&mut RegistrationGate, SessionError> {
        let code = self
            .map
            .state()
            .selected()
            .cloned()
            .ok_or(SessionError::NoSelection)?;
        if RegionStatusPolicy::new(&self.catalog).is_live(&code) {
            return Err(SessionError::NotGated(code));
        }
        let stale = self.gate.as_ref().map_or(true, |g| g.region() != &code);
        if stale {
            let region = self.catalog.get(&code).ok_or(SessionError::NoSelection)?;
            let mut gate = RegistrationGate::new(
                region,
                Arc::clone(&self.sink),
                Arc::clone(&self.markers),
                self.gate_config.clone(),
            )?;
            if let Some(hook) = &self.on_registered {
                let hook = Arc::clone(hook);
                gate = gate.on_complete(move |record| hook(record));
            }
            self.gate = Some(gate);
        }
        self.gate.as_mut().ok_or(SessionError::NoSelection)
    }

    /// Submit the registration form for the selected region.
    pub async fn submit_registration(
        &mut self,
        form: &RegistrationForm,
    ) -> Result<GateState, SessionError> {
        let gate = self.gate()?;
        Ok(gate.submit(form).await?)
    }

    /// Follow a `/preview/<code>` deep link. A region link selects the
    /// region on the map exactly like a marker click.
    pub fn open_preview(&mut self, path_or_code: &str) -> Result<PreviewPage, SessionError> {
        let link = resolve_deep_link(&self.catalog, path_or_code);
        let page = match link {
            DeepLink::Region { code } => {
                self.map.programmatic_select(&code);
                self.sync_gate();
                let marker = self.markers.get(&code)?;
                let live = RegionStatusPolicy::new(&self.catalog).is_live(&code);
                PreviewPage {
                    content_released: live || marker,
                    detail: Some(present(self.catalog.get(&code), marker)),
                    link: DeepLink::Region { code },
                }
            }
            DeepLink::Global => PreviewPage {
                link: DeepLink::Global,
                content_released: true,
                detail: None,
            },
            not_found @ DeepLink::NotFound { .. } => PreviewPage {
                link: not_found,
                content_released: false,
                detail: None,
            },
        };
        Ok(page)
    }

    fn sync_gate(&mut self) {
        let selected = self.map.state().selected();
        if self.gate.as_ref().is_some_and(|g| Some(g.region()) != selected) {
            self.gate = None;
        }
    }
}

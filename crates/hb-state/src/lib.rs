//! # hb-state: Region Portal State Machines
//!
//! - [`map`]: the interactive map's selection, panel, and keyboard focus.
//! - [`gate`]: lead capture for regions that are not live.
//! - [`marker`]: the per-region "already registered" marker port and its
//!   in-memory and file-backed stores.
//! - [`memory_sink`]: an in-memory registration sink.
//!
//! Every transition is checked at runtime. Illegal keyboard input is
//! reported as a suppressed outcome and leaves state untouched; an illegal
//! gate submit is a typed [`gate::GateError`].

pub mod gate;
pub mod map;
pub mod marker;
pub mod memory_sink;

pub use gate::{
    FieldError, FormField, GateConfig, GateError, GateState, RegistrationForm, RegistrationGate,
};
pub use map::{
    FocusTarget, IgnoreReason, KeyCommand, MapMarker, MapSelectionController, NavOutcome,
    RegionSelectionState, SelectionSource, SuppressReason,
};
pub use marker::{
    marker_key, FileMarkerStore, InMemoryMarkerStore, MarkerStoreError, RegistrationMarkerStore,
};
pub use memory_sink::InMemorySink;

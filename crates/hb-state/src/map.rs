//! # Map Selection State Machine
//!
//! Owns the interactive map's selection, panel, and keyboard-focus state.
//! Nothing outside [`MapSelectionController`] can mutate
//! [`RegionSelectionState`]; callers issue commands and read snapshots.
//!
//! ## State
//!
//! - `selected`: at most one region.
//! - `panel_open`: orthogonal bit. Invariant: `panel_open` implies `selected`.
//! - `focused_index`: position in the fixed traversal order. Tracked
//!   separately from `selected` and resynced on every selection.
//!
//! ## Transitions
//!
//! | Command              | Precondition        | Effect                                       |
//! |----------------------|---------------------|----------------------------------------------|
//! | pointer/programmatic | region in catalog   | select, focus, open panel                    |
//! | next / prev          | panel closed        | move focus with wraparound, select, announce |
//! | home / end           | panel closed        | focus first/last, select, announce           |
//! | activate             | selected, closed    | open panel on the selected region            |
//! | escape               | panel open          | close panel, keep selection, focus map       |
//!
//! A keyboard command whose precondition fails leaves the state untouched
//! and reports [`NavOutcome::Suppressed`]. While input capture is on (a text
//! field has focus), every keyboard command is [`NavOutcome::Ignored`].
//!
//! Selecting a code absent from the catalog is a caller bug: it trips a
//! debug assertion, and in release builds is logged and ignored.

use std::sync::Arc;

use hb_core::{Coordinates, RegionCatalog, RegionCode, RegionStatus};
use serde::Serialize;

// ── Commands ─────────────────────────────────────────────────────────

/// Keyboard commands understood by the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCommand {
    /// Focus the next region, wrapping to the first.
    Next,
    /// Focus the previous region, wrapping to the last.
    Prev,
    /// Open the panel for the selected region.
    Activate,
    /// Close the panel.
    Escape,
    /// Focus the first region.
    Home,
    /// Focus the last region.
    End,
}

impl KeyCommand {
    /// Map a DOM-style key name to a command. Unknown keys map to `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "ArrowDown" => Some(Self::Next),
            "ArrowLeft" | "ArrowUp" => Some(Self::Prev),
            "Enter" | " " | "Space" | "Spacebar" => Some(Self::Activate),
            "Escape" | "Esc" => Some(Self::Escape),
            "Home" => Some(Self::Home),
            "End" => Some(Self::End),
            _ => None,
        }
    }

    /// Canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Prev => "prev",
            Self::Activate => "activate",
            Self::Escape => "escape",
            Self::Home => "home",
            Self::End => "end",
        }
    }
}

impl std::fmt::Display for KeyCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// Marker click.
    Pointer,
    /// Deep link or other code-driven request.
    Programmatic,
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// Why a keyboard command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    /// Browsing is disabled while the panel is showing detail.
    PanelOpen,
    /// Escape with nothing to close.
    PanelClosed,
    /// Activate with no region selected.
    NothingSelected,
    /// Selection request for a code the catalog does not contain.
    UnknownRegion,
}

/// Why an input was dropped before reaching the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// A text field holds input focus.
    InputCaptured,
    /// The key has no map binding.
    UnmappedKey,
}

/// Result of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavOutcome {
    /// Keyboard focus moved and the region was highlighted. Panel stays closed.
    Moved {
        /// Newly selected region.
        code: RegionCode,
        /// Zero-based traversal index.
        index: usize,
        /// Screen-reader announcement.
        announcement: String,
    },
    /// The detail panel opened on a region.
    Opened {
        /// Region shown in the panel.
        code: RegionCode,
    },
    /// The detail panel closed. Selection is unchanged.
    Closed {
        /// Region that stays highlighted.
        code: RegionCode,
    },
    /// A precondition failed; state is unchanged.
    Suppressed {
        /// The refused command, if it was a keyboard command.
        command: Option<KeyCommand>,
        /// Which precondition failed.
        reason: SuppressReason,
    },
    /// The input never reached the state machine; state is unchanged.
    Ignored {
        /// Why the input was dropped.
        reason: IgnoreReason,
    },
}

impl NavOutcome {
    /// Whether the command changed state.
    pub fn changed_state(&self) -> bool {
        matches!(
            self,
            Self::Moved { .. } | Self::Opened { .. } | Self::Closed { .. }
        )
    }
}

/// Which surface holds logical focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusTarget {
    /// The map canvas.
    Map,
    /// The detail panel.
    Panel,
}

// ── State ────────────────────────────────────────────────────────────

/// Snapshot of the map's selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSelectionState {
    selected: Option<RegionCode>,
    panel_open: bool,
    focused_index: usize,
    focus: FocusTarget,
}

impl RegionSelectionState {
    /// The selected region, if any.
    pub fn selected(&self) -> Option<&RegionCode> {
        self.selected.as_ref()
    }

    /// Whether the detail panel is visible.
    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    /// Keyboard focus position in traversal order.
    pub fn focused_index(&self) -> usize {
        self.focused_index
    }

    /// Surface holding logical focus.
    pub fn focus(&self) -> FocusTarget {
        self.focus
    }
}

/// One marker as the map renderer needs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    /// Region code.
    pub code: RegionCode,
    /// Display name.
    pub name: String,
    /// Marker position.
    pub coordinates: Coordinates,
    /// Display status, for marker styling.
    pub status: RegionStatus,
    /// Whether this marker is the current selection.
    pub highlighted: bool,
}

// ── Controller ───────────────────────────────────────────────────────

/// The single owner of [`RegionSelectionState`].
#[derive(Debug, Clone)]
pub struct MapSelectionController {
    catalog: Arc<RegionCatalog>,
    state: RegionSelectionState,
    input_captured: bool,
    last_announcement: Option<String>,
}

impl MapSelectionController {
    /// Create a controller with nothing selected and focus on the first
    /// region in traversal order.
    pub fn new(catalog: Arc<RegionCatalog>) -> Self {
        Self {
            catalog,
            state: RegionSelectionState {
                selected: None,
                panel_open: false,
                focused_index: 0,
                focus: FocusTarget::Map,
            },
            input_captured: false,
            last_announcement: None,
        }
    }

    /// Read-only snapshot of the current state.
    pub fn state(&self) -> &RegionSelectionState {
        &self.state
    }

    /// The catalog this controller navigates.
    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// Most recent screen-reader announcement.
    pub fn last_announcement(&self) -> Option<&str> {
        self.last_announcement.as_deref()
    }

    /// Whether keyboard input is currently being captured by a text field.
    pub fn is_input_captured(&self) -> bool {
        self.input_captured
    }

    /// Mark whether a text field holds input focus. While set, keyboard
    /// commands are ignored.
    pub fn set_input_capture(&mut self, captured: bool) {
        self.input_captured = captured;
    }

    /// Marker-click selection. Opens the panel.
    pub fn pointer_select(&mut self, code: &RegionCode) -> NavOutcome {
        self.select(code, SelectionSource::Pointer)
    }

    /// Deep-link selection. Behaves exactly like a marker click.
    pub fn programmatic_select(&mut self, code: &RegionCode) -> NavOutcome {
        self.select(code, SelectionSource::Programmatic)
    }

    /// Select `code`, focus it, and open the panel.
    pub fn select(&mut self, code: &RegionCode, source: SelectionSource) -> NavOutcome {
        let Some(index) = self.catalog.position(code) else {
            debug_assert!(false, "selected region {code} is not in the catalog");
            tracing::warn!(region = %code, ?source, "ignoring selection of unknown region");
            return NavOutcome::Suppressed {
                command: None,
                reason: SuppressReason::UnknownRegion,
            };
        };
        self.state.selected = Some(code.clone());
        self.state.focused_index = index;
        self.state.panel_open = true;
        self.state.focus = FocusTarget::Panel;
        self.check_invariants();
        tracing::debug!(region = %code, ?source, index, "region selected, panel opened");
        NavOutcome::Opened { code: code.clone() }
    }

    /// Close the panel from a close button. Same effect as Escape, but not
    /// subject to input capture.
    pub fn close_panel(&mut self) -> NavOutcome {
        self.escape(None)
    }

    /// Dispatch a raw key name.
    pub fn handle_key(&mut self, key: &str) -> NavOutcome {
        match KeyCommand::from_key(key) {
            Some(cmd) => self.handle_command(cmd),
            None => NavOutcome::Ignored {
                reason: IgnoreReason::UnmappedKey,
            },
        }
    }

    /// Dispatch a keyboard command.
    pub fn handle_command(&mut self, cmd: KeyCommand) -> NavOutcome {
        if self.input_captured {
            tracing::trace!(command = %cmd, "keyboard command ignored during input capture");
            return NavOutcome::Ignored {
                reason: IgnoreReason::InputCaptured,
            };
        }
        match cmd {
            KeyCommand::Next => self.browse(cmd, |i, n| (i + 1) % n),
            KeyCommand::Prev => self.browse(cmd, |i, n| (i + n - 1) % n),
            KeyCommand::Home => self.browse(cmd, |_, _| 0),
            KeyCommand::End => self.browse(cmd, |_, n| n - 1),
            KeyCommand::Activate => self.activate(),
            KeyCommand::Escape => self.escape(Some(cmd)),
        }
    }

    /// Keyboard next.
    pub fn next(&mut self) -> NavOutcome {
        self.handle_command(KeyCommand::Next)
    }

    /// Keyboard previous.
    pub fn prev(&mut self) -> NavOutcome {
        self.handle_command(KeyCommand::Prev)
    }

    /// Keyboard home.
    pub fn home(&mut self) -> NavOutcome {
        self.handle_command(KeyCommand::Home)
    }

    /// Keyboard end.
    pub fn end(&mut self) -> NavOutcome {
        self.handle_command(KeyCommand::End)
    }

    /// Keyboard Enter/Space.
    pub fn activate_key(&mut self) -> NavOutcome {
        self.handle_command(KeyCommand::Activate)
    }

    /// Keyboard Escape.
    pub fn escape_key(&mut self) -> NavOutcome {
        self.handle_command(KeyCommand::Escape)
    }

    /// Markers in traversal order, with the selection highlighted.
    pub fn markers(&self) -> Vec<MapMarker> {
        self.catalog
            .iter()
            .map(|r| MapMarker {
                code: r.code.clone(),
                name: r.display_name.clone(),
                coordinates: r.coordinates,
                status: r.status,
                highlighted: self.state.selected.as_ref() == Some(&r.code),
            })
            .collect()
    }

    fn browse(&mut self, cmd: KeyCommand, step: impl Fn(usize, usize) -> usize) -> NavOutcome {
        if self.state.panel_open {
            return self.suppress(cmd, SuppressReason::PanelOpen);
        }
        let total = self.catalog.traversal_order().len();
        if total == 0 {
            return self.suppress(cmd, SuppressReason::UnknownRegion);
        }
        let index = step(self.state.focused_index.min(total - 1), total);
        let Some(region) = self.catalog.at(index) else {
            return self.suppress(cmd, SuppressReason::UnknownRegion);
        };
        let code = region.code.clone();
        let announcement = format!(
            "{}, {} of {} regions. Press Enter to open details.",
            region.display_name,
            index + 1,
            total
        );
        self.state.focused_index = index;
        self.state.selected = Some(code.clone());
        self.last_announcement = Some(announcement.clone());
        self.check_invariants();
        tracing::debug!(command = %cmd, region = %code, index, "keyboard focus moved");
        NavOutcome::Moved {
            code,
            index,
            announcement,
        }
    }

    fn activate(&mut self) -> NavOutcome {
        if self.state.panel_open {
            return self.suppress(KeyCommand::Activate, SuppressReason::PanelOpen);
        }
        let Some(code) = self.state.selected.clone() else {
            return self.suppress(KeyCommand::Activate, SuppressReason::NothingSelected);
        };
        self.select(&code, SelectionSource::Pointer)
    }

    fn escape(&mut self, cmd: Option<KeyCommand>) -> NavOutcome {
        let selected = match (&self.state.selected, self.state.panel_open) {
            (Some(code), true) => code.clone(),
            _ => {
                tracing::debug!(command = ?cmd, "close suppressed: panel is not open");
                return NavOutcome::Suppressed {
                    command: cmd,
                    reason: SuppressReason::PanelClosed,
                };
            }
        };
        self.state.panel_open = false;
        self.state.focus = FocusTarget::Map;
        self.check_invariants();
        tracing::debug!(region = %selected, "panel closed");
        NavOutcome::Closed { code: selected }
    }

    fn suppress(&self, cmd: KeyCommand, reason: SuppressReason) -> NavOutcome {
        tracing::debug!(command = %cmd, ?reason, "keyboard command suppressed");
        NavOutcome::Suppressed {
            command: Some(cmd),
            reason,
        }
    }

    fn check_invariants(&self) {
        debug_assert!(
            !self.state.panel_open || self.state.selected.is_some(),
            "panel open without a selection"
        );
        debug_assert!(
            self.state.focused_index < self.catalog.traversal_order().len(),
            "focused index out of range"
        );
    }
}

//! # Navigate Subcommand
//!
//! Replays a key sequence through the map controller and prints each
//! outcome plus the final selection state. Useful for checking keyboard
//! traversal against a custom catalog.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use hb_state::{MapMarker, MapSelectionController, NavOutcome, RegionSelectionState};

use crate::{print_json, Workspace, EXIT_OK};

/// Arguments for `healingbuds navigate`.
#[derive(Args, Debug)]
pub struct NavigateArgs {
    /// Comma-separated key names, e.g. `ArrowRight,ArrowRight,Enter`.
    #[arg(long, value_delimiter = ',', required = true)]
    pub keys: Vec<String>,

    /// Click this region before replaying keys.
    #[arg(long)]
    pub select: Option<String>,

    /// Replay with a text field focused; every key is ignored.
    #[arg(long)]
    pub typing: bool,

    /// Include the final marker list in the report.
    #[arg(long)]
    pub markers: bool,
}

#[derive(Debug, Serialize)]
struct Step<'a> {
    key: &'a str,
    #[serde(flatten)]
    outcome: NavOutcome,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    steps: Vec<Step<'a>>,
    state: &'a RegionSelectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    announcement: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    markers: Option<Vec<MapMarker>>,
}

/// Execute `healingbuds navigate`.
pub fn run_navigate(args: &NavigateArgs, ws: &Workspace) -> Result<u8> {
    let (map, steps) = replay(args, ws)?;
    let report = Report {
        steps,
        state: map.state(),
        announcement: map.last_announcement(),
        markers: args.markers.then(|| map.markers()),
    };
    print_json(&report)?;
    Ok(EXIT_OK)
}

fn replay<'a>(
    args: &'a NavigateArgs,
    ws: &Workspace,
) -> Result<(MapSelectionController, Vec<Step<'a>>)> {
    let mut map = MapSelectionController::new(Arc::clone(ws.catalog()));
    if let Some(raw) = &args.select {
        let code = ws.region_code(raw)?;
        map.pointer_select(&code);
    }
    map.set_input_capture(args.typing);

    let steps = args
        .keys
        .iter()
        .map(|key| {
            let key = key.trim();
            let outcome = map.handle_key(key);
            tracing::debug!(key, changed = outcome.changed_state(), "key replayed");
            Step { key, outcome }
        })
        .collect();
    Ok((map, steps))
}

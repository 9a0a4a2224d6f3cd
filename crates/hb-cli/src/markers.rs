//! # Markers Subcommand
//!
//! Inspect and clear the per-region "already registered" markers kept in
//! `<state-dir>/markers.json`.

use anyhow::Result;
use clap::{Args, Subcommand};

use hb_state::{marker_key, RegistrationMarkerStore};

use crate::{Workspace, EXIT_OK};

/// Arguments for `healingbuds markers`.
#[derive(Args, Debug)]
pub struct MarkersArgs {
    #[command(subcommand)]
    pub command: MarkersCommand,
}

#[derive(Subcommand, Debug)]
pub enum MarkersCommand {
    /// List regions this state directory has registered for.
    List,

    /// Forget the registration for one region.
    Clear {
        /// Region code (case-insensitive).
        code: String,
    },
}

/// Execute `healingbuds markers`.
pub fn run_markers(args: &MarkersArgs, ws: &Workspace) -> Result<u8> {
    let store = ws.marker_store();
    match &args.command {
        MarkersCommand::List => {
            let regions = store.registered_regions()?;
            if regions.is_empty() {
                println!("no regions registered ({})", store.path().display());
            }
            for code in regions {
                println!("{code}\t{}", marker_key(&code));
            }
        }
        MarkersCommand::Clear { code } => {
            let code = ws.region_code(code)?;
            if !store.get(&code)? {
                println!("OK: {code} was not registered");
                return Ok(EXIT_OK);
            }
            store.set(&code, false)?;
            tracing::info!(region = %code, "marker cleared");
            println!("OK: cleared registration for {code}");
        }
    }
    Ok(EXIT_OK)
}

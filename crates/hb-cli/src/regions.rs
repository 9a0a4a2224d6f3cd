//! # Catalog Subcommands
//!
//! Read-only views over the region catalog: hostname resolution, the
//! traversal-ordered region list, a region's detail view-model, and
//! preview deep links.

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};

use hb_core::{AccessContext, DomainResolver, RegionStatusPolicy};
use hb_portal::{present, DeepLink};
use hb_state::{GateConfig, InMemorySink, RegistrationMarkerStore};

use crate::{print_json, Workspace, EXIT_OK};

/// Arguments for `healingbuds resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Hostname as the browser reports it (port allowed).
    pub hostname: String,

    /// Print the matching rule as JSON instead of the bare code.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `healingbuds regions`.
#[derive(Args, Debug)]
pub struct RegionsArgs {
    #[command(subcommand)]
    pub command: RegionsCommand,
}

/// Region catalog subcommands.
#[derive(Subcommand, Debug)]
pub enum RegionsCommand {
    /// List regions in keyboard traversal order.
    List,

    /// Print the detail panel view-model for one region.
    Show {
        /// Region code (case-insensitive).
        code: String,
    },
}

/// Arguments for `healingbuds preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Region code or a `/preview/<code>` path.
    pub target: String,
}

/// Execute `healingbuds resolve`.
pub fn run_resolve(args: &ResolveArgs, ws: &Workspace) -> Result<u8> {
    let ctx = AccessContext::new(&args.hostname);
    let resolution = DomainResolver::from_catalog(ws.catalog()).resolve_detailed(&ctx);
    tracing::debug!(host = ctx.hostname(), matched = ?resolution.matched, "hostname resolved");
    if args.json {
        print_json(&resolution)?;
    } else {
        println!("{}", resolution.code);
    }
    Ok(EXIT_OK)
}

/// Execute `healingbuds regions`.
pub fn run_regions(args: &RegionsArgs, ws: &Workspace) -> Result<u8> {
    match &args.command {
        RegionsCommand::List => cmd_list(ws),
        RegionsCommand::Show { code } => cmd_show(ws, code),
    }
}

fn cmd_list(ws: &Workspace) -> Result<u8> {
    let policy = RegionStatusPolicy::new(ws.catalog());
    for (i, region) in ws.catalog().iter().enumerate() {
        let reach = if policy.is_live(&region.code) {
            region.external_url().unwrap_or_default()
        } else {
            "gated"
        };
        println!(
            "{:>2}  {:<6} {:<12} {:<24} {}",
            i + 1,
            region.code.to_display_code(),
            region.status.as_str(),
            region.display_name,
            reach
        );
    }
    Ok(EXIT_OK)
}

fn cmd_show(ws: &Workspace, raw: &str) -> Result<u8> {
    let code = ws.region_code(raw)?;
    let registered = ws.marker_store().get(&code)?;
    print_json(&present(ws.catalog().get(&code), registered))?;
    Ok(EXIT_OK)
}

/// Execute `healingbuds preview`.
///
/// An unknown region renders the "not found" page and still exits 0.
pub fn run_preview(args: &PreviewArgs, ws: &Workspace) -> Result<u8> {
    let mut session = ws.session("", Arc::new(InMemorySink::new()), GateConfig::default());
    let page = session.open_preview(&args.target)?;
    if let DeepLink::NotFound { requested, .. } = &page.link {
        tracing::info!(requested = requested.as_str(), "no preview for region");
    }
    print_json(&page)?;
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::load(None, dir.path()).unwrap();
        (dir, ws)
    }

    #[test]
    fn resolve_never_fails() {
        let (_dir, ws) = ws();
        for host in ["", "healingbuds.co.za", "example.org", "localhost:5173"] {
            let args = ResolveArgs {
                hostname: host.to_string(),
                json: true,
            };
            assert_eq!(run_resolve(&args, &ws).unwrap(), EXIT_OK);
        }
    }

    #[test]
    fn show_rejects_unknown_region() {
        let (_dir, ws) = ws();
        let args = RegionsArgs {
            command: RegionsCommand::Show { code: "de".into() },
        };
        assert!(run_regions(&args, &ws).is_err());
    }

    #[test]
    fn list_and_show_succeed() {
        let (_dir, ws) = ws();
        assert_eq!(
            run_regions(&RegionsArgs { command: RegionsCommand::List }, &ws).unwrap(),
            EXIT_OK
        );
        let show = RegionsArgs {
            command: RegionsCommand::Show { code: "TH".into() },
        };
        assert_eq!(run_regions(&show, &ws).unwrap(), EXIT_OK);
    }

    #[test]
    fn preview_selects_without_touching_markers() {
        let (dir, ws) = ws();
        let args = PreviewArgs {
            target: "/preview/gb".into(),
        };
        assert_eq!(run_preview(&args, &ws).unwrap(), EXIT_OK);
        assert!(!dir.path().join("markers.json").exists());
    }

    #[test]
    fn preview_of_unknown_region_is_not_an_error() {
        let (_dir, ws) = ws();
        let args = PreviewArgs {
            target: "/preview/xx".into(),
        };
        assert_eq!(run_preview(&args, &ws).unwrap(), EXIT_OK);
    }
}

//! # healingbuds CLI entry point
//!
//! Parses arguments, installs the tracing subscriber, loads the region
//! catalog, and dispatches to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hb_cli::markers::{run_markers, MarkersArgs};
use hb_cli::navigate::{run_navigate, NavigateArgs};
use hb_cli::regions::{run_preview, run_regions, run_resolve, PreviewArgs, RegionsArgs, ResolveArgs};
use hb_cli::register::{run_register, RegisterArgs};
use hb_cli::{Workspace, DEFAULT_STATE_DIR};

/// Healing Buds region portal toolchain.
///
/// Resolves hostnames to regions, inspects the region catalog, replays
/// keyboard input through the map, and registers interest in regions that
/// are not live yet.
#[derive(Parser, Debug)]
#[command(name = "healingbuds", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Region catalog YAML file. Defaults to the built-in catalog.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory for local state (registration markers).
    #[arg(long, global = true, default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a hostname to a region code.
    Resolve(ResolveArgs),

    /// List regions or show one region's detail panel.
    Regions(RegionsArgs),

    /// Resolve a `/preview/<code>` deep link.
    Preview(PreviewArgs),

    /// Replay key presses through the map controller.
    Navigate(NavigateArgs),

    /// Register interest in a region.
    Register(RegisterArgs),

    /// Inspect or clear registration markers.
    Markers(MarkersArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let ws = match Workspace::load(cli.catalog.as_deref(), &cli.state_dir) {
        Ok(ws) => ws,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(state_dir = %ws.state_dir().display(), "healingbuds starting");

    let result = match &cli.command {
        Commands::Resolve(args) => run_resolve(args, &ws),
        Commands::Regions(args) => run_regions(args, &ws),
        Commands::Preview(args) => run_preview(args, &ws),
        Commands::Navigate(args) => run_navigate(args, &ws),
        Commands::Register(args) => run_register(args, &ws),
        Commands::Markers(args) => run_markers(args, &ws),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_resolve() {
        let cli = Cli::try_parse_from(["healingbuds", "resolve", "healingbuds.pt"]).unwrap();
        match cli.command {
            Commands::Resolve(args) => assert_eq!(args.hostname, "healingbuds.pt"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(cli.state_dir, PathBuf::from(".healingbuds"));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "healingbuds",
            "regions",
            "list",
            "-vv",
            "--log-json",
            "--state-dir",
            "/tmp/hb",
            "--catalog",
            "regions.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert_eq!(cli.state_dir, PathBuf::from("/tmp/hb"));
        assert_eq!(cli.catalog, Some(PathBuf::from("regions.yaml")));
    }

    #[test]
    fn parse_navigate_key_list() {
        let cli = Cli::try_parse_from([
            "healingbuds",
            "navigate",
            "--keys",
            "ArrowRight,Home,Enter",
            "--select",
            "gb",
            "--typing",
        ])
        .unwrap();
        let Commands::Navigate(args) = cli.command else {
            panic!("expected navigate");
        };
        assert_eq!(args.keys, vec!["ArrowRight", "Home", "Enter"]);
        assert_eq!(args.select.as_deref(), Some("gb"));
        assert!(args.typing);
    }

    #[test]
    fn parse_navigate_requires_keys() {
        assert!(Cli::try_parse_from(["healingbuds", "navigate"]).is_err());
    }

    #[test]
    fn parse_register_full() {
        let cli = Cli::try_parse_from([
            "healingbuds",
            "register",
            "--region",
            "gb",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--email",
            "ada@example.com",
            "--interest",
            "Anxiety",
            "--interest",
            "Other",
            "--heard-via",
            "Social Media",
            "--accept-terms",
            "--dry-run",
        ])
        .unwrap();
        let Commands::Register(args) = cli.command else {
            panic!("expected register");
        };
        assert_eq!(args.interests, vec!["Anxiety", "Other"]);
        assert!(args.accept_terms);
        assert!(!args.consent_marketing);
        assert!(args.dry_run);
        assert_eq!(args.timeout_secs, None);
    }

    #[test]
    fn parse_markers_clear() {
        let cli = Cli::try_parse_from(["healingbuds", "markers", "clear", "PT"]).unwrap();
        assert!(matches!(cli.command, Commands::Markers(_)));
    }
}

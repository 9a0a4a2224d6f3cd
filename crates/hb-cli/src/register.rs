//! # Register Subcommand
//!
//! Submits one lead through the registration gate for a region, exactly
//! as the detail panel's form would. The file marker store is honoured:
//! a region already registered from this state directory is bypassed
//! without contacting the sink.
//!
//! The sink is the hosted table configured by `HB_SINK_*` environment
//! variables, or an in-memory sink with `--dry-run`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;

use hb_core::{InterestTag, ReferralSource, RegistrationSink};
use hb_sink_client::{HttpRegistrationSink, SinkConfig};
use hb_state::gate::DEFAULT_SINK_TIMEOUT;
use hb_state::{GateConfig, GateState, InMemorySink, RegistrationForm};

use crate::{Workspace, EXIT_DUPLICATE, EXIT_OK, EXIT_SINK_FAILURE, EXIT_VALIDATION};

/// Arguments for `healingbuds register`.
#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    /// Region to register interest in.
    #[arg(long)]
    pub region: String,

    /// Given name.
    #[arg(long)]
    pub first_name: String,

    /// Family name.
    #[arg(long)]
    pub last_name: String,

    /// Email address; one registration per email and region.
    #[arg(long)]
    pub email: String,

    /// Optional phone number; enables SMS notifications.
    #[arg(long)]
    pub phone: Option<String>,

    /// Condition of interest, by label (repeatable), e.g. "Chronic Pain".
    #[arg(long = "interest")]
    pub interests: Vec<String>,

    /// How the visitor heard about the service, by label.
    #[arg(long)]
    pub heard_via: Option<String>,

    /// Opt in to marketing communications.
    #[arg(long)]
    pub consent_marketing: bool,

    /// Accept the Terms of Service and Privacy Policy.
    #[arg(long)]
    pub accept_terms: bool,

    /// UI language recorded with the lead.
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Client-side bound on the sink write, in seconds. Defaults to
    /// `HB_SINK_TIMEOUT_SECS`, or 8 with `--dry-run`.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Use an in-memory sink instead of the configured endpoint.
    #[arg(long)]
    pub dry_run: bool,
}

impl RegisterArgs {
    /// Build the form the visitor would have filled in.
    pub fn to_form(&self) -> Result<RegistrationForm> {
        let mut form = RegistrationForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone().unwrap_or_default(),
            consent_marketing: self.consent_marketing,
            consent_terms: self.accept_terms,
            ..Default::default()
        };
        for label in &self.interests {
            let Some(tag) = InterestTag::from_label(label) else {
                bail!(
                    "unknown interest {label:?}; expected one of: {}",
                    labels(InterestTag::ALL.iter().map(InterestTag::label))
                );
            };
            if !form.interest_tags.contains(&tag) {
                form.toggle_interest(tag);
            }
        }
        if let Some(label) = &self.heard_via {
            let Some(source) = ReferralSource::from_label(label) else {
                bail!(
                    "unknown referral source {label:?}; expected one of: {}",
                    labels(ReferralSource::ALL.iter().map(ReferralSource::label))
                );
            };
            form.how_heard = Some(source);
        }
        Ok(form)
    }

    /// Gate settings. `sink_timeout` applies unless `--timeout-secs` was given.
    fn gate_config(&self, sink_timeout: Duration) -> GateConfig {
        let timeout = self
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(sink_timeout);
        GateConfig::default()
            .with_timeout(timeout)
            .with_language(&self.language)
    }
}

fn labels<'a>(all: impl Iterator<Item = &'a str>) -> String {
    all.collect::<Vec<_>>().join(", ")
}

/// The sink to write to and the timeout it was configured with.
fn build_sink(args: &RegisterArgs) -> Result<(Arc<dyn RegistrationSink>, Duration)> {
    if args.dry_run {
        tracing::info!("dry run: using the in-memory sink");
        return Ok((Arc::new(InMemorySink::new()), DEFAULT_SINK_TIMEOUT));
    }
    let mut config = SinkConfig::from_env().context("registration sink is not configured")?;
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = secs;
    }
    tracing::debug!(?config, "sink configured from environment");
    let timeout = Duration::from_secs(config.timeout_secs);
    Ok((Arc::new(HttpRegistrationSink::new(config)?), timeout))
}

/// Execute `healingbuds register`.
pub fn run_register(args: &RegisterArgs, ws: &Workspace) -> Result<u8> {
    let (sink, sink_timeout) = build_sink(args)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(register(args, ws, sink, sink_timeout))
}

/// Drive one registration against `sink`. Split out so tests can supply
/// their own sink and runtime.
pub async fn register(
    args: &RegisterArgs,
    ws: &Workspace,
    sink: Arc<dyn RegistrationSink>,
    sink_timeout: Duration,
) -> Result<u8> {
    let code = ws.region_code(&args.region)?;
    let form = args.to_form()?;

    let mut session = ws
        .session("", sink, args.gate_config(sink_timeout))
        .on_registered(|record| {
            tracing::info!(
                region = %record.region_code,
                source = record.source_context.as_str(),
                "lead stored"
            );
        });
    session.select_region(&code);

    let gate = session.gate()?;
    if gate.state() == GateState::Bypassed {
        println!("OK: already registered for {}", code.to_display_code());
        return Ok(EXIT_OK);
    }

    let state = session.submit_registration(&form).await?;
    let gate = session.gate()?;
    let message = gate.user_message().unwrap_or_default();
    match state {
        GateState::Success => {
            println!("OK: {message}");
            Ok(EXIT_OK)
        }
        GateState::DuplicateConflict => {
            eprintln!("{message}");
            Ok(EXIT_DUPLICATE)
        }
        GateState::SinkError => {
            if let Some(err) = gate.last_sink_error() {
                tracing::warn!(error = %err, "registration failed");
            }
            eprintln!("{message}");
            Ok(EXIT_SINK_FAILURE)
        }
        GateState::Idle => {
            for err in gate.field_errors() {
                eprintln!("{}: {}", err.field, err.message);
            }
            Ok(EXIT_VALIDATION)
        }
        other => bail!("registration gate stopped in unexpected state {other}"),
    }
}

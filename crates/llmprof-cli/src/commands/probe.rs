//! Provider probe CLI commands
//!
//! Handles: llmprof models/test

use anyhow::{bail, Context};
use clap::Args;
use std::future::Future;

use llmprof_core::ProviderType;
use llmprof_providers::{ConnectionProbe, ProbeTarget};

use crate::commands::profile::find_profile;
use crate::config::App;

/// Arguments for `llmprof models`
#[derive(Args)]
pub struct ModelsArgs {
    /// Use the credentials of a stored profile (name or ID)
    #[arg(long)]
    pub profile: Option<String>,

    /// Provider type (openai, anthropic)
    #[arg(long = "type", value_name = "TYPE")]
    pub provider: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key
    #[arg(long, env = "LLMPROF_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn block_on<F: Future>(fut: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    Ok(runtime.block_on(fut))
}

pub fn models(app: &App, args: ModelsArgs) -> anyhow::Result<()> {
    let stored = match &args.profile {
        Some(identifier) => Some(find_profile(&app.store(), identifier)?),
        None => None,
    };

    // Flags override the stored profile's fields
    let provider = match (&args.provider, &stored) {
        (Some(tag), _) => tag.parse::<ProviderType>()?,
        (None, Some(profile)) => profile.provider_type,
        (None, None) => bail!("Pass --profile or --type"),
    };
    let base_url = args
        .base_url
        .or_else(|| stored.as_ref().map(|p| p.base_url.clone()))
        .unwrap_or_else(|| provider.default_base_url().to_string());
    let Some(api_key) = args
        .api_key
        .or_else(|| stored.as_ref().map(|p| p.api_key.clone()))
    else {
        bail!("Pass --profile or --api-key");
    };

    let probe = ConnectionProbe::new(app.settings.timeout)?;
    let models = block_on(probe.list_models(provider, &base_url, &api_key))??;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    if models.is_empty() {
        println!("No models available.");
        return Ok(());
    }
    for model in &models {
        if model.name == model.id {
            println!("{}", model.id);
        } else {
            println!("{}  ({})", model.id, model.name);
        }
    }
    Ok(())
}

pub fn test(app: &App, identifier: &str, as_json: bool) -> anyhow::Result<()> {
    let profile = find_profile(&app.store(), identifier)?;
    let probe = ConnectionProbe::new(app.settings.timeout)?;
    let report = block_on(probe.test_connection(&ProbeTarget::from(&profile)))??;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.success {
        println!("Connection OK: {}", report.message);
    }

    if !report.success {
        bail!("Connection test failed: {}", report.message);
    }
    Ok(())
}

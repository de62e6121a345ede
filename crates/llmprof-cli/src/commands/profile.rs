//! Profile CLI commands
//!
//! Handles: llmprof list/show/add/edit/remove/clone/use/active

use anyhow::{bail, Context};
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use llmprof_core::profile::search;
use llmprof_core::{Profile, ProfileData, ProfilePatch, ProfileStore, ProviderType};

use crate::config::App;

/// Arguments for `llmprof add`
#[derive(Args)]
pub struct AddArgs {
    /// Profile name
    #[arg(long)]
    pub name: String,

    /// Provider type (openai, anthropic)
    #[arg(long = "type", value_name = "TYPE", default_value = "openai")]
    pub provider: String,

    /// API base URL (defaults to the provider's public endpoint)
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key
    #[arg(long, env = "LLMPROF_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Model identifier
    #[arg(long)]
    pub model: String,

    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,

    /// Make the new profile the active one
    #[arg(long)]
    pub activate: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `llmprof edit`
#[derive(Args)]
pub struct EditArgs {
    /// Profile name or ID
    pub profile: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New provider type
    #[arg(long = "type", value_name = "TYPE")]
    pub provider: Option<String>,

    /// New API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// New API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// New model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// New description
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,
}

impl EditArgs {
    fn to_patch(&self) -> ProfilePatch {
        let description = if self.clear_description {
            Some(None)
        } else {
            self.description.clone().map(Some)
        };
        ProfilePatch {
            name: self.name.clone(),
            provider_type: self.provider.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            description,
        }
    }
}

/// Look up a profile by ID or name
pub fn find_profile(store: &ProfileStore<'_>, identifier: &str) -> anyhow::Result<Profile> {
    if let Ok(id) = Uuid::parse_str(identifier) {
        return Ok(store.get(id)?);
    }
    store
        .get_by_name(identifier)?
        .with_context(|| format!("Profile not found: {identifier}"))
}

/// Shorten an API key for display
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Profile as shown to the user, with the key masked
fn profile_json(profile: &Profile, active: bool) -> serde_json::Value {
    json!({
        "id": profile.id,
        "name": profile.name,
        "type": profile.provider_type,
        "baseUrl": profile.base_url,
        "apiKey": mask_key(&profile.api_key),
        "model": profile.model,
        "description": profile.description,
        "active": active,
        "createdAt": profile.created_at,
        "updatedAt": profile.updated_at,
    })
}

pub fn list(app: &App, query: Option<&str>, as_json: bool) -> anyhow::Result<()> {
    let store = app.store();
    let profiles = store.list_all()?;
    let active = store.active_id()?;
    let matches = search(query.unwrap_or_default(), &profiles);

    if as_json {
        let output: Vec<_> = matches
            .iter()
            .map(|p| profile_json(p, Some(p.id) == active))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if matches.is_empty() {
        if profiles.is_empty() {
            println!("No profiles found.");
        } else {
            println!("No profiles match the search.");
        }
        return Ok(());
    }

    println!("Profiles:");
    for profile in matches {
        let marker = if Some(profile.id) == active { '*' } else { ' ' };
        println!(
            "{marker} {} [{}] {} ({})",
            profile.name, profile.provider_type, profile.model, profile.base_url
        );
        if let Some(desc) = &profile.description {
            println!("    {desc}");
        }
    }
    Ok(())
}

pub fn show(app: &App, identifier: &str, reveal: bool, as_json: bool) -> anyhow::Result<()> {
    let store = app.store();
    let profile = find_profile(&store, identifier)?;
    let active = store.active_id()? == Some(profile.id);

    if as_json {
        let mut output = profile_json(&profile, active);
        if reveal {
            output["apiKey"] = json!(profile.api_key);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let key = if reveal {
        profile.api_key.clone()
    } else {
        mask_key(&profile.api_key)
    };
    println!("Profile: {}{}", profile.name, if active { " (active)" } else { "" });
    println!("  ID:       {}", profile.id);
    println!("  Type:     {}", profile.provider_type);
    println!("  Base URL: {}", profile.base_url);
    println!("  API key:  {key}");
    println!("  Model:    {}", profile.model);
    if let Some(desc) = &profile.description {
        println!("  Description: {desc}");
    }
    println!("  Created:  {}", profile.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Updated:  {}", profile.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    Ok(())
}

pub fn add(app: &App, args: AddArgs) -> anyhow::Result<()> {
    // Fall back to the provider's endpoint; an unknown type is left for the validator
    let base_url = args.base_url.unwrap_or_else(|| {
        args.provider
            .parse::<ProviderType>()
            .map(|p| p.default_base_url().to_string())
            .unwrap_or_default()
    });
    let data = ProfileData {
        name: args.name,
        provider_type: args.provider,
        base_url,
        api_key: args.api_key,
        model: args.model,
        description: args.description,
    };

    let store = app.store();
    let profile = store.create(&data)?;
    if args.activate {
        store.set_active(profile.id)?;
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&profile_json(&profile, args.activate))?
        );
    } else {
        println!("Created profile '{}' ({})", profile.name, profile.id);
        if args.activate {
            println!("Active profile: {}", profile.name);
        }
    }
    Ok(())
}

pub fn edit(app: &App, args: &EditArgs) -> anyhow::Result<()> {
    let patch = args.to_patch();
    if patch.is_empty() {
        bail!("Nothing to update. Pass at least one field to change.");
    }

    let store = app.store();
    let profile = find_profile(&store, &args.profile)?;
    let updated = store.update(profile.id, &patch)?;
    println!("Updated profile '{}'", updated.name);
    Ok(())
}

pub fn remove(app: &App, identifier: &str) -> anyhow::Result<()> {
    let store = app.store();
    let profile = find_profile(&store, identifier)?;
    store.delete(profile.id)?;
    println!("Deleted profile '{}'", profile.name);
    Ok(())
}

pub fn clone(app: &App, identifier: &str, name: Option<String>) -> anyhow::Result<()> {
    let store = app.store();
    let source = find_profile(&store, identifier)?;
    let new_name = name.unwrap_or_else(|| format!("{} (copy)", source.name));
    let copy = store.clone_profile(source.id, &new_name)?;
    println!(
        "Cloned '{}' to '{}' ({})",
        source.name, copy.name, copy.id
    );
    Ok(())
}

pub fn activate(app: &App, identifier: &str) -> anyhow::Result<()> {
    let store = app.store();
    let profile = find_profile(&store, identifier)?;
    store.set_active(profile.id)?;
    println!("Active profile: {} ({})", profile.name, profile.id);
    Ok(())
}

pub fn active(app: &App, as_json: bool) -> anyhow::Result<()> {
    let store = app.store();
    let current = store.active()?;

    if as_json {
        let output = current.as_ref().map(|p| profile_json(p, true));
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match current {
        Some(profile) => println!(
            "{} [{}] {} ({})",
            profile.name, profile.provider_type, profile.model, profile.id
        ),
        None => println!("No active profile."),
    }
    Ok(())
}

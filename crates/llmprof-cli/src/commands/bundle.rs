//! Bundle CLI commands
//!
//! Handles: llmprof export/import

use anyhow::bail;
use std::path::Path;

use llmprof_core::profile::export::{export_profiles, export_to_file, import_from_file};
use llmprof_core::profile::ImportOutcome;

use crate::config::App;

/// File name suggested for exports
pub const DEFAULT_EXPORT_FILE: &str = "llm-configs.json";

pub fn export(app: &App, output: Option<&Path>) -> anyhow::Result<()> {
    let profiles = app.store().list_all()?;

    match output {
        Some(path) => {
            export_to_file(&profiles, path)?;
            println!(
                "Exported {} profile(s) to {}",
                profiles.len(),
                path.display()
            );
        }
        None => println!("{}", export_profiles(&profiles)?),
    }
    Ok(())
}

pub fn import(app: &App, file: &Path, as_json: bool) -> anyhow::Result<()> {
    let outcome = import_from_file(&app.store(), file)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    match outcome {
        ImportOutcome::Imported { count } => {
            if !as_json {
                println!("Imported {count} profile(s) from {}", file.display());
            }
            Ok(())
        }
        ImportOutcome::Rejected { message } => bail!("Import failed: {message}"),
    }
}

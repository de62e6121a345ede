//! Profile bundle export/import
//!
//! A bundle is the whole profile collection as portable JSON:
//!
//! ```json
//! { "version": 1, "exportedAt": "...", "configs": [ { "name": "...", "type": "openai", ... } ] }
//! ```
//!
//! Imports are additive. Every record gets a fresh ID and existing profiles are
//! never overwritten. A bundle is merged all-or-nothing: one invalid record
//! rejects the whole bundle.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{ProfileError, ProfileResult};
use crate::profile::{validate, Profile, ProfileData};
use crate::storage::ProfileStore;

/// Version of the bundle format
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Exported bundle (`llm-configs.json`)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBundle<'a> {
    /// Format version for future compatibility
    pub version: u32,
    /// When exported
    pub exported_at: DateTime<Utc>,
    /// Every profile, secrets included
    pub configs: &'a [Profile],
}

/// Bundle as read back; records keep only the caller-editable fields
#[derive(Debug, Clone, Deserialize)]
struct IncomingBundle {
    version: u32,
    configs: Vec<ProfileData>,
}

/// Error type for bundle operations
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Malformed JSON or wrong shape
    #[error("Invalid bundle: {0}")]
    Parse(#[from] serde_json::Error),
    /// Invalid format version
    #[error("Unsupported bundle format version: {0}")]
    UnsupportedVersion(u32),
}

/// Result of an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Every record was added
    Imported { count: usize },
    /// Nothing was added
    Rejected { message: String },
}

impl ImportOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Imported { .. })
    }
}

impl Serialize for ImportOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ImportOutcome", 2)?;
        match self {
            Self::Imported { count } => {
                s.serialize_field("success", &true)?;
                s.serialize_field("count", count)?;
            }
            Self::Rejected { message } => {
                s.serialize_field("success", &false)?;
                s.serialize_field("message", message)?;
            }
        }
        s.end()
    }
}

/// Serialize profiles into a bundle
///
/// # Errors
/// Returns an error if serialization fails
pub fn export_profiles(profiles: &[Profile]) -> Result<String, BundleError> {
    let bundle = ProfileBundle {
        version: BUNDLE_FORMAT_VERSION,
        exported_at: Utc::now(),
        configs: profiles,
    };
    Ok(serde_json::to_string_pretty(&bundle)?)
}

/// Export profiles to a bundle file
///
/// # Errors
/// Returns an error if the file cannot be written
pub fn export_to_file(profiles: &[Profile], output_path: &Path) -> Result<(), BundleError> {
    let json = export_profiles(profiles)?;
    fs::write(output_path, json)?;
    Ok(())
}

/// Parse a bundle into its profile records without storing anything
///
/// # Errors
/// Returns an error if the text is not a bundle this version understands
pub fn parse_bundle(text: &str) -> Result<Vec<ProfileData>, BundleError> {
    let bundle: IncomingBundle = serde_json::from_str(text)?;

    if bundle.version > BUNDLE_FORMAT_VERSION {
        return Err(BundleError::UnsupportedVersion(bundle.version));
    }

    Ok(bundle.configs)
}

/// Import a bundle into the store
///
/// Malformed bundles and invalid records produce `ImportOutcome::Rejected`
/// and leave the store unchanged.
///
/// # Errors
/// Returns an error only if the store itself fails
pub fn import_bundle(store: &ProfileStore<'_>, text: &str) -> ProfileResult<ImportOutcome> {
    let records = match parse_bundle(text) {
        Ok(records) => records,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bundle");
            return Ok(ImportOutcome::Rejected {
                message: e.to_string(),
            });
        }
    };

    for (index, record) in records.iter().enumerate() {
        if let Err(e) = validate(record) {
            let label = if record.name.trim().is_empty() {
                "unnamed".to_string()
            } else {
                format!("'{}'", record.name.trim())
            };
            return Ok(ImportOutcome::Rejected {
                message: format!("Record {} ({label}): {e}", index + 1),
            });
        }
    }

    match store.create_many(&records) {
        Ok(created) => {
            tracing::debug!(count = created.len(), "Imported bundle");
            Ok(ImportOutcome::Imported {
                count: created.len(),
            })
        }
        Err(ProfileError::Validation(e)) => Ok(ImportOutcome::Rejected {
            message: e.to_string(),
        }),
        Err(e) => Err(e),
    }
}

/// Import a bundle file into the store
///
/// An unreadable file is reported as a rejected import.
///
/// # Errors
/// Returns an error only if the store itself fails
pub fn import_from_file(store: &ProfileStore<'_>, path: &Path) -> ProfileResult<ImportOutcome> {
    match fs::read_to_string(path) {
        Ok(text) => import_bundle(store, &text),
        Err(e) => Ok(ImportOutcome::Rejected {
            message: format!("Failed to read {}: {e}", path.display()),
        }),
    }
}

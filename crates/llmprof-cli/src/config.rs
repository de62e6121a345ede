//! CLI settings
//!
//! Each setting resolves as: command-line flag, then environment variable,
//! then built-in default.

use anyhow::Context;
use clap::{Args, ValueEnum};
use llmprof_core::secrets::{InlineSecretStore, KeyringSecretStore, SecretStore};
use llmprof_core::storage::Database;
use llmprof_core::ProfileStore;
use std::path::PathBuf;
use std::time::Duration;

/// Database file name inside the data directory
pub const DATABASE_FILE: &str = "llmprof.db";

/// Where API keys are kept
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SecretBackend {
    /// In the profile database, as plain text
    #[default]
    Inline,
    /// In the operating system keyring
    Keyring,
}

/// Global flags shared by every command
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Directory holding the profile database
    #[arg(long, global = true, env = "LLMPROF_HOME", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Timeout for provider requests, in seconds
    #[arg(
        long,
        global = true,
        env = "LLMPROF_TIMEOUT",
        value_name = "SECS",
        default_value_t = 15
    )]
    pub timeout: u64,

    /// Where API keys are stored
    #[arg(
        long,
        global = true,
        env = "LLMPROF_SECRETS",
        value_enum,
        default_value = "inline"
    )]
    pub secrets: SecretBackend,
}

/// Resolved settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub timeout: Duration,
    pub secrets: SecretBackend,
}

impl Settings {
    /// Resolve settings from parsed flags
    ///
    /// # Errors
    /// Returns an error if no data directory is given and the home directory is unknown
    pub fn resolve(args: &SettingsArgs) -> anyhow::Result<Self> {
        let data_dir = match &args.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .context("Could not determine home directory; pass --data-dir or set LLMPROF_HOME")?
                .join(".llmprof"),
        };

        Ok(Self {
            data_dir,
            timeout: Duration::from_secs(args.timeout.max(1)),
            secrets: args.secrets,
        })
    }

    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

/// Composition root: owns the database and secret backend for one invocation
pub struct App {
    pub settings: Settings,
    db: Database,
    secrets: Box<dyn SecretStore>,
}

impl App {
    /// Open (creating if needed) the profile database
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened
    pub fn open(settings: Settings) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&settings.data_dir).with_context(|| {
            format!(
                "Failed to create data directory {}",
                settings.data_dir.display()
            )
        })?;

        let db_path = settings.database_path();
        let db = Database::open(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;

        let secrets: Box<dyn SecretStore> = match settings.secrets {
            SecretBackend::Inline => Box::new(InlineSecretStore),
            SecretBackend::Keyring => Box::new(KeyringSecretStore::new()),
        };
        tracing::debug!(path = %db_path.display(), secrets = ?settings.secrets, "Opened profile database");

        Ok(Self {
            settings,
            db,
            secrets,
        })
    }

    /// Profile store over this invocation's database
    #[must_use]
    pub fn store(&self) -> ProfileStore<'_> {
        ProfileStore::with_secret_store(self.db.connection(), self.secrets.as_ref())
    }
}

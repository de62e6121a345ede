//! API key storage
//!
//! The profile row always has an `apiKey` slot. What goes into it is decided
//! by a [`SecretStore`]: the key itself ([`InlineSecretStore`], the default
//! and the format older installs used) or a marker pointing at the OS
//! keyring ([`KeyringSecretStore`]).

use thiserror::Error;
use uuid::Uuid;

/// Keyring service name
pub const KEYRING_SERVICE: &str = "llmprof";

/// Value recorded in the profile row when the key lives in the keyring
pub const KEYRING_MARKER: &str = "keyring:";

/// Secret storage errors
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("No stored secret for profile {0}")]
    Missing(Uuid),

    #[error("API key for profile {0} is kept in the OS keyring; use the keyring secret backend")]
    KeyringRequired(Uuid),
}

/// Pluggable storage for profile API keys
pub trait SecretStore: Send + Sync {
    /// Persist `secret` for `profile_id`, returning the value to record in
    /// the profile row
    ///
    /// # Errors
    /// Returns an error if the backend rejects the write
    fn store(&self, profile_id: Uuid, secret: &str) -> Result<String, SecretError>;

    /// Recover the secret from the value recorded in the profile row
    ///
    /// # Errors
    /// Returns an error if the backend has no secret for this profile
    fn resolve(&self, profile_id: Uuid, stored: &str) -> Result<String, SecretError>;

    /// Forget the secret for `profile_id`
    ///
    /// # Errors
    /// Returns an error if the backend rejects the delete
    fn remove(&self, profile_id: Uuid) -> Result<(), SecretError>;
}

/// Keeps the key verbatim in the profile row
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineSecretStore;

impl SecretStore for InlineSecretStore {
    fn store(&self, _profile_id: Uuid, secret: &str) -> Result<String, SecretError> {
        Ok(secret.to_string())
    }

    fn resolve(&self, profile_id: Uuid, stored: &str) -> Result<String, SecretError> {
        // The marker is never a usable key
        if stored == KEYRING_MARKER {
            return Err(SecretError::KeyringRequired(profile_id));
        }
        Ok(stored.to_string())
    }

    fn remove(&self, _profile_id: Uuid) -> Result<(), SecretError> {
        Ok(())
    }
}

/// Keeps the key in the platform credential store
#[derive(Debug, Clone)]
pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    /// Use the default `llmprof` service name
    #[must_use]
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    /// Use a custom service name (one keyring namespace per data directory)
    #[must_use]
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, profile_id: Uuid) -> Result<keyring::Entry, SecretError> {
        Ok(keyring::Entry::new(&self.service, &profile_id.to_string())?)
    }
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringSecretStore {
    fn store(&self, profile_id: Uuid, secret: &str) -> Result<String, SecretError> {
        self.entry(profile_id)?.set_password(secret)?;
        Ok(KEYRING_MARKER.to_string())
    }

    fn resolve(&self, profile_id: Uuid, stored: &str) -> Result<String, SecretError> {
        // Rows written before the keyring backend was enabled hold the key inline
        if stored != KEYRING_MARKER {
            return Ok(stored.to_string());
        }
        match self.entry(profile_id)?.get_password() {
            Ok(secret) => Ok(secret),
            Err(keyring::Error::NoEntry) => Err(SecretError::Missing(profile_id)),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, profile_id: Uuid) -> Result<(), SecretError> {
        match self.entry(profile_id)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

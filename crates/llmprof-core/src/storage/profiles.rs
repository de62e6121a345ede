//! Profile storage operations (CRUD + active pointer)

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{ProfileError, ProfileResult};
use crate::profile::{validate, Profile, ProfileData, ProfilePatch, ValidatedProfile};
use crate::secrets::{InlineSecretStore, SecretStore};
use crate::storage::db::DatabaseError;

/// `app_state` key holding the active profile id
pub const ACTIVE_PROFILE_KEY: &str = "active_profile_id";

static INLINE_SECRETS: InlineSecretStore = InlineSecretStore;

/// Profile storage operations
///
/// Every mutating call runs inside a single SQLite transaction, so it either
/// commits completely or leaves the store untouched.
pub struct ProfileStore<'a> {
    conn: &'a Connection,
    secrets: &'a dyn SecretStore,
}

impl<'a> ProfileStore<'a> {
    /// Create a profile store that keeps API keys inline
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            secrets: &INLINE_SECRETS,
        }
    }

    /// Create a profile store backed by a custom secret store
    pub fn with_secret_store(conn: &'a Connection, secrets: &'a dyn SecretStore) -> Self {
        Self { conn, secrets }
    }

    /// List all profiles in insertion order
    ///
    /// # Errors
    /// Returns an error if the profiles cannot be read
    pub fn list_all(&self) -> ProfileResult<Vec<Profile>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM profiles ORDER BY position")?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut profiles = Vec::new();
        for json in rows {
            profiles.push(self.decode(&json?)?);
        }
        Ok(profiles)
    }

    /// Number of stored profiles
    ///
    /// # Errors
    /// Returns an error if the database query fails
    pub fn count(&self) -> ProfileResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Get a profile by ID
    ///
    /// # Errors
    /// Returns `NotFound` if no profile has this ID
    pub fn get(&self, id: Uuid) -> ProfileResult<Profile> {
        self.find(id)?.ok_or(ProfileError::NotFound { id })
    }

    /// Get the first profile (in insertion order) with exactly this name
    ///
    /// # Errors
    /// Returns an error if the profile cannot be read
    pub fn get_by_name(&self, name: &str) -> ProfileResult<Option<Profile>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM profiles WHERE name = ?1 ORDER BY position LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|j| self.decode(&j)).transpose()
    }

    /// Validate and store a new profile
    ///
    /// # Errors
    /// Returns `Validation` listing every bad field; nothing is written in that case
    pub fn create(&self, data: &ProfileData) -> ProfileResult<Profile> {
        let validated = validate(data)?;
        let profile = new_profile(validated);

        let tx = self.conn.unchecked_transaction()?;
        self.insert(&tx, &profile)?;
        if let Err(e) = tx.commit() {
            self.forget_secret(profile.id);
            return Err(e.into());
        }

        tracing::debug!(profile_id = %profile.id, provider = %profile.provider_type, "Created profile");
        Ok(profile)
    }

    /// Validate and store several profiles at once
    ///
    /// Either every record is stored or none is.
    ///
    /// # Errors
    /// Returns `Validation` for the first bad record; nothing is written in that case
    pub fn create_many(&self, records: &[ProfileData]) -> ProfileResult<Vec<Profile>> {
        let validated = records
            .iter()
            .map(validate)
            .collect::<Result<Vec<_>, _>>()?;
        let profiles: Vec<Profile> = validated.into_iter().map(new_profile).collect();

        let tx = self.conn.unchecked_transaction()?;
        let mut written = Vec::with_capacity(profiles.len());
        for profile in &profiles {
            if let Err(e) = self.insert(&tx, profile) {
                written.into_iter().for_each(|id| self.forget_secret(id));
                return Err(e);
            }
            written.push(profile.id);
        }
        if let Err(e) = tx.commit() {
            written.into_iter().for_each(|id| self.forget_secret(id));
            return Err(e.into());
        }

        tracing::debug!(count = profiles.len(), "Created profiles in batch");
        Ok(profiles)
    }

    /// Merge `patch` over an existing profile
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown ID, or `Validation` if the merged
    /// record is invalid (the stored record is left untouched)
    pub fn update(&self, id: Uuid, patch: &ProfilePatch) -> ProfileResult<Profile> {
        let existing = self.get(id)?;
        let validated = validate(&patch.apply_to(existing.to_data()))?;

        let updated = Profile {
            id,
            name: validated.name,
            provider_type: validated.provider_type,
            base_url: validated.base_url,
            api_key: validated.api_key,
            model: validated.model,
            description: validated.description,
            created_at: existing.created_at,
            updated_at: Utc::now().max(existing.updated_at),
        };

        let key_changed = updated.api_key != existing.api_key;
        let stored_key = self.secrets.store(id, &updated.api_key)?;

        let write = || -> ProfileResult<usize> {
            let json = encode(&updated, stored_key)?;
            Ok(self.conn.execute(
                r"
                UPDATE profiles
                SET name = ?1, data = ?2, updated_at = ?3
                WHERE id = ?4
                ",
                params![
                    updated.name,
                    json,
                    updated.updated_at.to_rfc3339(),
                    id.to_string(),
                ],
            )?)
        };

        match write() {
            Ok(0) => Err(ProfileError::NotFound { id }),
            Ok(_) => {
                tracing::debug!(profile_id = %id, "Updated profile");
                Ok(updated)
            }
            Err(e) => {
                if key_changed {
                    // Put the previous key back so the row and the backend agree
                    if let Err(restore) = self.secrets.store(id, &existing.api_key) {
                        tracing::warn!(profile_id = %id, error = %restore, "Failed to restore previous API key");
                    }
                }
                Err(e)
            }
        }
    }

    /// Delete a profile
    ///
    /// If it was the active profile, the active pointer is cleared.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown ID
    pub fn delete(&self, id: Uuid) -> ProfileResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let deleted = tx.execute("DELETE FROM profiles WHERE id = ?1", params![id.to_string()])?;
        if deleted == 0 {
            return Err(ProfileError::NotFound { id });
        }

        let cleared = tx.execute(
            "DELETE FROM app_state WHERE key = ?1 AND value = ?2",
            params![ACTIVE_PROFILE_KEY, id.to_string()],
        )?;

        tx.commit()?;
        self.forget_secret(id);

        tracing::debug!(profile_id = %id, cleared_active = cleared > 0, "Deleted profile");
        Ok(())
    }

    /// Duplicate a profile under a new name
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown ID, or `Validation` if `new_name` is blank
    pub fn clone_profile(&self, id: Uuid, new_name: &str) -> ProfileResult<Profile> {
        let source = self.get(id)?;
        let mut data = source.to_data();
        data.name = new_name.to_string();

        let copy = self.create(&data)?;
        tracing::debug!(source_id = %id, profile_id = %copy.id, "Cloned profile");
        Ok(copy)
    }

    /// Mark a profile as the active one
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown ID
    pub fn set_active(&self, id: Uuid) -> ProfileResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM profiles WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(ProfileError::NotFound { id });
        }

        tx.execute(
            r"
            INSERT INTO app_state (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
            params![ACTIVE_PROFILE_KEY, id.to_string()],
        )?;
        tx.commit()?;

        tracing::debug!(profile_id = %id, "Set active profile");
        Ok(())
    }

    /// ID of the active profile, if any
    ///
    /// # Errors
    /// Returns an error if the stored pointer cannot be read
    pub fn active_id(&self) -> ProfileResult<Option<Uuid>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![ACTIVE_PROFILE_KEY],
                |row| row.get(0),
            )
            .optional()?;

        value
            .map(|v| {
                Uuid::parse_str(&v).map_err(|e| {
                    ProfileError::Database(DatabaseError::Corrupt(format!(
                        "Invalid active profile id: {e}"
                    )))
                })
            })
            .transpose()
    }

    /// The active profile, if any
    ///
    /// # Errors
    /// Returns an error if the pointer or the profile cannot be read
    pub fn active(&self) -> ProfileResult<Option<Profile>> {
        self.active_id()?.map(|id| self.get(id)).transpose()
    }

    fn find(&self, id: Uuid) -> ProfileResult<Option<Profile>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM profiles WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|j| self.decode(&j)).transpose()
    }

    fn insert(&self, conn: &Connection, profile: &Profile) -> ProfileResult<()> {
        let stored_key = self.secrets.store(profile.id, &profile.api_key)?;

        let result = encode(profile, stored_key).map_err(ProfileError::from).and_then(|json| {
            conn.execute(
                r"
                INSERT INTO profiles (id, position, name, data, created_at, updated_at)
                VALUES (?1, (SELECT COALESCE(MAX(position), 0) + 1 FROM profiles), ?2, ?3, ?4, ?5)
                ",
                params![
                    profile.id.to_string(),
                    profile.name,
                    json,
                    profile.created_at.to_rfc3339(),
                    profile.updated_at.to_rfc3339(),
                ],
            )
            .map_err(ProfileError::from)
        });

        if let Err(e) = result {
            self.forget_secret(profile.id);
            return Err(e);
        }
        Ok(())
    }

    fn decode(&self, json: &str) -> ProfileResult<Profile> {
        let mut profile: Profile = serde_json::from_str(json)
            .map_err(|e| DatabaseError::Corrupt(format!("Failed to parse profile: {e}")))?;
        profile.api_key = self.secrets.resolve(profile.id, &profile.api_key)?;
        Ok(profile)
    }

    fn forget_secret(&self, id: Uuid) {
        if let Err(e) = self.secrets.remove(id) {
            tracing::warn!(profile_id = %id, error = %e, "Failed to remove stored API key");
        }
    }
}

fn new_profile(validated: ValidatedProfile) -> Profile {
    let now = Utc::now();
    Profile {
        id: Uuid::new_v4(),
        name: validated.name,
        provider_type: validated.provider_type,
        base_url: validated.base_url,
        api_key: validated.api_key,
        model: validated.model,
        description: validated.description,
        created_at: now,
        updated_at: now,
    }
}

/// Serialize the row payload with the API key replaced by what the secret store recorded
fn encode(profile: &Profile, stored_key: String) -> Result<String, DatabaseError> {
    let row = Profile {
        api_key: stored_key,
        ..profile.clone()
    };
    serde_json::to_string(&row)
        .map_err(|e| DatabaseError::Corrupt(format!("Failed to serialize profile: {e}")))
}

//! Profile store tests
//!
//! CRUD, active pointer, and secret storage behaviour against an in-memory database.

use std::collections::HashMap;
use std::sync::Mutex;

use llmprof_core::profile::{Field, ProfileData, ProfilePatch, ProviderType};
use llmprof_core::profile::export::export_profiles;
use llmprof_core::secrets::{SecretError, SecretStore, KEYRING_MARKER};
use llmprof_core::storage::db::Database;
use llmprof_core::storage::profiles::ProfileStore;
use llmprof_core::ProfileError;
use uuid::Uuid;

fn prod_data() -> ProfileData {
    ProfileData::for_provider(ProviderType::OpenAi)
        .with_name("Prod")
        .with_base_url("https://api.openai.com/v1")
        .with_api_key("sk-x")
        .with_model("gpt-4")
}

fn claude_data() -> ProfileData {
    ProfileData::for_provider(ProviderType::Anthropic)
        .with_name("Claude")
        .with_api_key("sk-ant-y")
        .with_model("claude-3-5-sonnet-latest")
        .with_description("Anthropic team key")
}

#[test]
fn test_create_and_get_profile() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let data = claude_data();
    let created = store.create(&data).expect("Failed to create profile");

    let retrieved = store.get(created.id).expect("Failed to get profile");
    assert_eq!(retrieved, created);
    assert_eq!(retrieved.to_data(), data);
    assert_eq!(retrieved.provider_type, ProviderType::Anthropic);
    assert_eq!(retrieved.created_at, retrieved.updated_at);
}

#[test]
fn test_create_rejects_missing_fields_without_writing() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    for field in [Field::Name, Field::BaseUrl, Field::ApiKey, Field::Model] {
        let mut data = prod_data();
        match field {
            Field::Name => data.name.clear(),
            Field::BaseUrl => data.base_url.clear(),
            Field::ApiKey => data.api_key.clear(),
            Field::Model => data.model.clear(),
            _ => unreachable!(),
        }

        let err = store.create(&data).unwrap_err();
        match err {
            ProfileError::Validation(v) => assert!(v.has(field)),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    let mut data = prod_data();
    data.provider_type.clear();
    assert!(matches!(
        store.create(&data),
        Err(ProfileError::Validation(_))
    ));

    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn test_list_all_keeps_insertion_order() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    for name in ["zeta", "alpha", "mid"] {
        store.create(&prod_data().with_name(name)).unwrap();
    }

    let names: Vec<_> = store
        .list_all()
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    assert_eq!(store.count().unwrap(), 3);
}

#[test]
fn test_ids_are_unique() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let a = store.create(&prod_data()).unwrap();
    let b = store.create(&prod_data()).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_get_unknown_is_not_found() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let id = Uuid::new_v4();
    match store.get(id) {
        Err(ProfileError::NotFound { id: missing }) => assert_eq!(missing, id),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_get_by_name() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let first = store.create(&prod_data()).unwrap();
    store.create(&prod_data()).unwrap();

    let found = store.get_by_name("Prod").unwrap().expect("Profile not found");
    assert_eq!(found.id, first.id);
    assert!(store.get_by_name("nope").unwrap().is_none());
}

#[test]
fn test_update_merges_and_bumps_timestamp() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let original = store.create(&claude_data()).unwrap();

    let patch = ProfilePatch {
        model: Some("claude-3-opus-latest".to_string()),
        description: Some(None),
        ..ProfilePatch::default()
    };
    let updated = store.update(original.id, &patch).unwrap();

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.name, "Claude");
    assert_eq!(updated.model, "claude-3-opus-latest");
    assert_eq!(updated.description, None);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at >= original.updated_at);

    assert_eq!(store.get(original.id).unwrap(), updated);
}

#[test]
fn test_update_invalid_leaves_record_untouched() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let original = store.create(&prod_data()).unwrap();

    let patch = ProfilePatch {
        api_key: Some(String::new()),
        base_url: Some("not a url".to_string()),
        ..ProfilePatch::default()
    };
    match store.update(original.id, &patch) {
        Err(ProfileError::Validation(v)) => {
            assert!(v.has(Field::ApiKey));
            assert!(v.has(Field::BaseUrl));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    assert_eq!(store.get(original.id).unwrap(), original);
}

#[test]
fn test_unknown_id_operations_leave_store_unchanged() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let existing = store.create(&prod_data()).unwrap();
    store.set_active(existing.id).unwrap();
    let before = store.list_all().unwrap();

    let unknown = Uuid::new_v4();
    let patch = ProfilePatch {
        name: Some("x".to_string()),
        ..ProfilePatch::default()
    };

    assert!(matches!(
        store.update(unknown, &patch),
        Err(ProfileError::NotFound { .. })
    ));
    assert!(matches!(
        store.delete(unknown),
        Err(ProfileError::NotFound { .. })
    ));
    assert!(matches!(
        store.clone_profile(unknown, "x"),
        Err(ProfileError::NotFound { .. })
    ));
    assert!(matches!(
        store.set_active(unknown),
        Err(ProfileError::NotFound { .. })
    ));

    assert_eq!(store.list_all().unwrap(), before);
    assert_eq!(store.active_id().unwrap(), Some(existing.id));
}

#[test]
fn test_delete_removes_profile() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let keep = store.create(&prod_data()).unwrap();
    let gone = store.create(&claude_data()).unwrap();
    store.set_active(keep.id).unwrap();

    store.delete(gone.id).unwrap();

    let ids: Vec<_> = store.list_all().unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![keep.id]);
    // Deleting a non-active profile keeps the pointer
    assert_eq!(store.active_id().unwrap(), Some(keep.id));
}

#[test]
fn test_delete_active_clears_pointer() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let a = store.create(&prod_data()).unwrap();
    store.create(&claude_data()).unwrap();
    store.set_active(a.id).unwrap();

    store.delete(a.id).unwrap();

    assert_eq!(store.active_id().unwrap(), None);
    assert!(store.active().unwrap().is_none());
}

#[test]
fn test_clone_copies_fields_under_new_name() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let source = store.create(&claude_data()).unwrap();
    let copy = store.clone_profile(source.id, "Claude copy").unwrap();

    assert_ne!(copy.id, source.id);
    assert_eq!(copy.name, "Claude copy");
    assert_eq!(copy.provider_type, source.provider_type);
    assert_eq!(copy.base_url, source.base_url);
    assert_eq!(copy.api_key, source.api_key);
    assert_eq!(copy.model, source.model);
    assert_eq!(copy.description, source.description);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_clone_rejects_blank_name() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let source = store.create(&prod_data()).unwrap();
    assert!(matches!(
        store.clone_profile(source.id, "  "),
        Err(ProfileError::Validation(_))
    ));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_active_pointer_starts_unset() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    store.create(&prod_data()).unwrap();
    assert_eq!(store.active_id().unwrap(), None);
    assert!(store.active().unwrap().is_none());
}

#[test]
fn test_set_active_switches_pointer() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let a = store.create(&prod_data()).unwrap();
    let b = store.create(&claude_data()).unwrap();

    store.set_active(a.id).unwrap();
    store.set_active(b.id).unwrap();

    assert_eq!(store.active_id().unwrap(), Some(b.id));
    assert_eq!(store.active().unwrap(), Some(b));
}

#[test]
fn test_prod_lifecycle_scenario() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let a = store.create(&prod_data()).unwrap();
    assert_eq!(store.list_all().unwrap().len(), 1);

    store.set_active(a.id).unwrap();
    assert_eq!(store.active_id().unwrap(), Some(a.id));

    store.clone_profile(a.id, "Prod copy").unwrap();
    let all = store.list_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].model, "gpt-4");
    assert_eq!(all[1].name, "Prod copy");

    store.delete(a.id).unwrap();
    assert_eq!(store.list_all().unwrap().len(), 1);
    assert_eq!(store.active_id().unwrap(), None);
}

#[test]
fn test_create_many_is_all_or_nothing() {
    let db = Database::in_memory().expect("Failed to create database");
    let store = ProfileStore::new(db.connection());

    let bad = prod_data().with_model("");
    let result = store.create_many(&[prod_data(), bad, claude_data()]);
    assert!(matches!(result, Err(ProfileError::Validation(_))));
    assert_eq!(store.count().unwrap(), 0);

    let created = store.create_many(&[prod_data(), claude_data()]).unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("llmprof.db");

    let id = {
        let db = Database::open(&path).expect("Failed to open database");
        let store = ProfileStore::new(db.connection());
        let p = store.create(&prod_data()).unwrap();
        store.set_active(p.id).unwrap();
        p.id
    };

    let db = Database::open(&path).expect("Failed to reopen database");
    let store = ProfileStore::new(db.connection());
    assert_eq!(store.active_id().unwrap(), Some(id));
    assert_eq!(store.get(id).unwrap().api_key, "sk-x");
}

/// Secret store that keeps keys in memory and records only a marker in the row
#[derive(Default)]
struct VaultSecrets {
    keys: Mutex<HashMap<Uuid, String>>,
}

impl SecretStore for VaultSecrets {
    fn store(&self, profile_id: Uuid, secret: &str) -> Result<String, SecretError> {
        self.keys
            .lock()
            .unwrap()
            .insert(profile_id, secret.to_string());
        Ok("vault".to_string())
    }

    fn resolve(&self, profile_id: Uuid, _stored: &str) -> Result<String, SecretError> {
        self.keys
            .lock()
            .unwrap()
            .get(&profile_id)
            .cloned()
            .ok_or(SecretError::Missing(profile_id))
    }

    fn remove(&self, profile_id: Uuid) -> Result<(), SecretError> {
        self.keys.lock().unwrap().remove(&profile_id);
        Ok(())
    }
}

#[test]
fn test_secret_store_keeps_key_out_of_row() {
    let db = Database::in_memory().expect("Failed to create database");
    let vault = VaultSecrets::default();
    let store = ProfileStore::with_secret_store(db.connection(), &vault);

    let p = store.create(&prod_data()).unwrap();
    assert_eq!(store.get(p.id).unwrap().api_key, "sk-x");

    let raw: String = db
        .connection()
        .query_row("SELECT data FROM profiles", [], |row| row.get(0))
        .unwrap();
    assert!(!raw.contains("sk-x"));
    assert!(raw.contains("vault"));

    let patch = ProfilePatch {
        api_key: Some("sk-rotated".to_string()),
        ..ProfilePatch::default()
    };
    store.update(p.id, &patch).unwrap();
    assert_eq!(store.get(p.id).unwrap().api_key, "sk-rotated");

    store.delete(p.id).unwrap();
    assert!(vault.keys.lock().unwrap().is_empty());
}

/// Records the keyring marker in the row, like the OS keyring backend
#[derive(Default)]
struct MarkerSecrets {
    keys: Mutex<HashMap<Uuid, String>>,
}

impl SecretStore for MarkerSecrets {
    fn store(&self, profile_id: Uuid, secret: &str) -> Result<String, SecretError> {
        self.keys
            .lock()
            .unwrap()
            .insert(profile_id, secret.to_string());
        Ok(KEYRING_MARKER.to_string())
    }

    fn resolve(&self, profile_id: Uuid, stored: &str) -> Result<String, SecretError> {
        if stored != KEYRING_MARKER {
            return Ok(stored.to_string());
        }
        self.keys
            .lock()
            .unwrap()
            .get(&profile_id)
            .cloned()
            .ok_or(SecretError::Missing(profile_id))
    }

    fn remove(&self, profile_id: Uuid) -> Result<(), SecretError> {
        self.keys.lock().unwrap().remove(&profile_id);
        Ok(())
    }
}

#[test]
fn test_keyring_rows_are_not_readable_without_keyring() {
    let db = Database::in_memory().expect("Failed to create database");
    let keyring = MarkerSecrets::default();
    let p = ProfileStore::with_secret_store(db.connection(), &keyring)
        .create(&prod_data().with_api_key("sk-real"))
        .unwrap();

    let inline = ProfileStore::new(db.connection());
    match inline.get(p.id) {
        Err(ProfileError::Secret(SecretError::KeyringRequired(id))) => assert_eq!(id, p.id),
        other => panic!("expected keyring error, got {other:?}"),
    }
    assert!(inline.list_all().is_err());

    // The keyring-backed store still sees the real key, and exports it
    let keyed = ProfileStore::with_secret_store(db.connection(), &keyring);
    let profiles = keyed.list_all().unwrap();
    assert_eq!(profiles[0].api_key, "sk-real");
    let bundle = export_profiles(&profiles).unwrap();
    assert!(bundle.contains("sk-real"));
    assert!(!bundle.contains(KEYRING_MARKER));
}

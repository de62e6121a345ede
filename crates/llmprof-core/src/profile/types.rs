//! Profile types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Fields of a profile record that the validator knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    #[serde(rename = "type")]
    ProviderType,
    BaseUrl,
    ApiKey,
    Model,
    Description,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => write!(f, "name"),
            Field::ProviderType => write!(f, "type"),
            Field::BaseUrl => write!(f, "baseUrl"),
            Field::ApiKey => write!(f, "apiKey"),
            Field::Model => write!(f, "model"),
            Field::Description => write!(f, "description"),
        }
    }
}

/// Supported LLM provider APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OpenAI and OpenAI-compatible endpoints
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
}

impl ProviderType {
    /// All known provider types
    pub const ALL: [ProviderType; 2] = [ProviderType::OpenAi, ProviderType::Anthropic];

    /// Fields that must be non-empty for a profile of this type
    #[must_use]
    pub fn required_fields(self) -> &'static [Field] {
        match self {
            ProviderType::OpenAi | ProviderType::Anthropic => &[
                Field::Name,
                Field::ProviderType,
                Field::BaseUrl,
                Field::ApiKey,
                Field::Model,
            ],
        }
    }

    /// Public endpoint used when the caller has no custom base URL
    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderType::OpenAi => "https://api.openai.com/v1",
            ProviderType::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    /// Wire tag
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderType::OpenAi => "openai",
            ProviderType::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a provider tag is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown provider type: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderType {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderType::OpenAi),
            "anthropic" => Ok(ProviderType::Anthropic),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// A stored provider connection profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Provider API flavour
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    /// Endpoint root, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Provider credential
    pub api_key: String,
    /// Selected model identifier
    pub model: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Caller-editable fields of this profile
    #[must_use]
    pub fn to_data(&self) -> ProfileData {
        ProfileData {
            name: self.name.clone(),
            provider_type: self.provider_type.as_str().to_string(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            description: self.description.clone(),
        }
    }
}

/// Caller-supplied profile fields used for create and import
///
/// Missing fields deserialize as empty strings so that the validator can
/// report them all at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileData {
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub description: Option<String>,
}

impl ProfileData {
    /// Start a record for the given provider, pre-filled with its default endpoint
    #[must_use]
    pub fn for_provider(provider: ProviderType) -> Self {
        Self {
            provider_type: provider.as_str().to_string(),
            base_url: provider.default_base_url().to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update applied over an existing profile
///
/// `None` leaves a field unchanged. For `description`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub provider_type: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub description: Option<Option<String>>,
}

impl ProfilePatch {
    /// True if the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.provider_type.is_none()
            && self.base_url.is_none()
            && self.api_key.is_none()
            && self.model.is_none()
            && self.description.is_none()
    }

    /// Merge the provided fields over `base`
    #[must_use]
    pub fn apply_to(&self, mut base: ProfileData) -> ProfileData {
        if let Some(name) = &self.name {
            base.name.clone_from(name);
        }
        if let Some(provider_type) = &self.provider_type {
            base.provider_type.clone_from(provider_type);
        }
        if let Some(base_url) = &self.base_url {
            base.base_url.clone_from(base_url);
        }
        if let Some(api_key) = &self.api_key {
            base.api_key.clone_from(api_key);
        }
        if let Some(model) = &self.model {
            base.model.clone_from(model);
        }
        if let Some(description) = &self.description {
            base.description.clone_from(description);
        }
        base
    }
}

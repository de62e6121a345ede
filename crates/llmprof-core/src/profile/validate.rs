//! Profile schema validation
//!
//! Every profile passes through [`validate`] before it is persisted, whether
//! it comes from `create`, `update`, `clone`, or a bundle import.

use serde::Serialize;
use std::fmt;

use super::types::{Field, ProfileData, ProviderType};

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: Field,
    pub reason: String,
}

/// All problems found in a candidate profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Fields that failed validation, in check order
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.issues.iter().map(|i| i.field)
    }

    /// Whether `field` was rejected
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.fields().any(|f| f == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|i| format!("{} {}", i.field, i.reason))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Profile fields that passed validation, trimmed and typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProfile {
    pub name: String,
    pub provider_type: ProviderType,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub description: Option<String>,
}

/// Validate a candidate profile record
///
/// # Errors
/// Returns every missing or invalid field
pub fn validate(data: &ProfileData) -> Result<ValidatedProfile, ValidationError> {
    let mut issues = Vec::new();

    let provider_type = if data.provider_type.trim().is_empty() {
        None
    } else {
        match data.provider_type.parse::<ProviderType>() {
            Ok(p) => Some(p),
            Err(e) => {
                issues.push(FieldIssue {
                    field: Field::ProviderType,
                    reason: format!("is not supported ({})", e.0),
                });
                None
            }
        }
    };

    // Unknown providers still get the common required-field checks
    let required = provider_type.map_or(ProviderType::OpenAi.required_fields(), |p| {
        p.required_fields()
    });

    for &field in required {
        if let Some(value) = field_value(data, field) {
            if value.trim().is_empty() {
                issues.push(FieldIssue {
                    field,
                    reason: "is required".to_string(),
                });
            }
        }
    }

    let base_url = data.base_url.trim();
    if !base_url.is_empty() && !is_http_url(base_url) {
        issues.push(FieldIssue {
            field: Field::BaseUrl,
            reason: "must be an http:// or https:// URL".to_string(),
        });
    }

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    let Some(provider_type) = provider_type else {
        return Err(ValidationError {
            issues: vec![FieldIssue {
                field: Field::ProviderType,
                reason: "is required".to_string(),
            }],
        });
    };

    Ok(ValidatedProfile {
        name: data.name.trim().to_string(),
        provider_type,
        base_url: base_url.trim_end_matches('/').to_string(),
        api_key: data.api_key.trim().to_string(),
        model: data.model.trim().to_string(),
        description: data
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(ToString::to_string),
    })
}

fn field_value(data: &ProfileData, field: Field) -> Option<&str> {
    match field {
        Field::Name => Some(&data.name),
        Field::ProviderType => Some(&data.provider_type),
        Field::BaseUrl => Some(&data.base_url),
        Field::ApiKey => Some(&data.api_key),
        Field::Model => Some(&data.model),
        Field::Description => data.description.as_deref(),
    }
}

fn is_http_url(s: &str) -> bool {
    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/') && !host.contains(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProfileData {
        ProfileData::for_provider(ProviderType::OpenAi)
            .with_name("Prod")
            .with_api_key("sk-x")
            .with_model("gpt-4")
    }

    #[test]
    fn test_accepts_complete_record() {
        let v = validate(&valid()).unwrap();
        assert_eq!(v.provider_type, ProviderType::OpenAi);
        assert_eq!(v.base_url, "https://api.openai.com/v1");
        assert_eq!(v.description, None);
    }

    #[test]
    fn test_reports_every_missing_field() {
        let err = validate(&ProfileData::default()).unwrap_err();
        for field in [
            Field::Name,
            Field::ProviderType,
            Field::BaseUrl,
            Field::ApiKey,
            Field::Model,
        ] {
            assert!(err.has(field), "expected {field} to be reported");
        }
    }

    #[test]
    fn test_whitespace_only_is_missing() {
        let err = validate(&valid().with_name("   ")).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec![Field::Name]);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut data = valid();
        data.provider_type = "cohere".to_string();
        let err = validate(&data).unwrap_err();
        assert!(err.has(Field::ProviderType));
        assert!(err.to_string().contains("cohere"));
    }

    #[test]
    fn test_provider_tag_is_case_insensitive() {
        let mut data = valid();
        data.provider_type = "Anthropic".to_string();
        assert_eq!(
            validate(&data).unwrap().provider_type,
            ProviderType::Anthropic
        );
    }

    #[test]
    fn test_base_url_must_be_http() {
        let err = validate(&valid().with_base_url("ftp://example.com")).unwrap_err();
        assert!(err.has(Field::BaseUrl));

        let err = validate(&valid().with_base_url("https://")).unwrap_err();
        assert!(err.has(Field::BaseUrl));
    }

    #[test]
    fn test_trims_and_normalises() {
        let v = validate(
            &valid()
                .with_name("  Prod  ")
                .with_base_url("http://localhost:8080/v1/")
                .with_description("  "),
        )
        .unwrap();
        assert_eq!(v.name, "Prod");
        assert_eq!(v.base_url, "http://localhost:8080/v1");
        assert_eq!(v.description, None);
    }
}

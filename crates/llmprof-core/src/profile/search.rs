//! In-memory profile search

use super::types::Profile;

/// Filter profiles by a case-insensitive substring
///
/// Matches against name, description, model, and base URL. Relative order is
/// preserved; an empty or whitespace-only query returns every profile.
#[must_use]
pub fn search<'a>(query: &str, profiles: &'a [Profile]) -> Vec<&'a Profile> {
    if query.trim().is_empty() {
        return profiles.iter().collect();
    }
    let needle = query.to_lowercase();

    profiles
        .iter()
        .filter(|p| matches(p, &needle))
        .collect()
}

fn matches(profile: &Profile, needle: &str) -> bool {
    let haystacks = [
        Some(profile.name.as_str()),
        profile.description.as_deref(),
        Some(profile.model.as_str()),
        Some(profile.base_url.as_str()),
    ];
    haystacks
        .into_iter()
        .flatten()
        .any(|h| h.to_lowercase().contains(needle))
}

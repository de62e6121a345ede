//! llmprof Core - LLM provider profiles, storage, and bundles
//!
//! This crate provides profile validation, the `SQLite` profile store with
//! its active-profile pointer, bundle export/import, and search.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod profile;
pub mod secrets;
pub mod storage;

pub use error::{ProfileError, ProfileResult};
pub use profile::{Profile, ProfileData, ProfilePatch, ProviderType};
pub use storage::{Database, ProfileStore};

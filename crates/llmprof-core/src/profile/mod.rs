//! Profile types and operations

pub mod export;
pub mod search;
mod types;
pub mod validate;

pub use export::{BundleError, ImportOutcome, ProfileBundle};
pub use search::search;
pub use types::*;
pub use validate::{validate, FieldIssue, ValidatedProfile, ValidationError};

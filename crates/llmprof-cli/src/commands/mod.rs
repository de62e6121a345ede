//! CLI command handlers
//!
//! Profile management, bundle transfer, and provider probes each have their
//! own module.

pub mod bundle;
pub mod probe;
pub mod profile;

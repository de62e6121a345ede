//! llmprof Providers - probing LLM provider endpoints
//!
//! Lists the models a set of credentials can use and tests whether a profile
//! can actually talk to its provider. Nothing here reads or writes stored
//! profiles.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod anthropic;
pub mod client;
pub mod error;
pub mod openai;
pub mod probe;
pub mod slot;

pub use client::{ModelInfo, ProbeTarget, ProviderClient};
pub use error::ProbeError;
pub use probe::{ConnectionProbe, ConnectionReport, DEFAULT_TIMEOUT};
pub use slot::ProbeSlot;

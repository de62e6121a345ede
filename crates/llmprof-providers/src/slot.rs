//! Latest-wins probe slot
//!
//! A form that lets the user click "test" or "load models" repeatedly should
//! only ever show the answer to the most recent click. Running each probe
//! through the same [`ProbeSlot`] cancels the previous one, which resolves to
//! [`ProbeError::Superseded`] instead of a stale result.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;

/// Serializes probes so that only the newest one can deliver a result
#[derive(Debug, Default)]
pub struct ProbeSlot {
    current: Mutex<Option<CancellationToken>>,
}

impl ProbeSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut`, cancelling whatever probe was running in this slot
    ///
    /// # Errors
    /// Returns `Superseded` if another probe starts before this one finishes,
    /// otherwise whatever `fut` returns
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ProbeError>
    where
        F: Future<Output = Result<T, ProbeError>>,
    {
        let token = CancellationToken::new();
        {
            let mut guard = self
                .current
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = guard.replace(token.clone()) {
                previous.cancel();
            }
        }

        tokio::select! {
            () = token.cancelled() => Err(ProbeError::Superseded),
            result = fut => result,
        }
    }

    /// Cancel the running probe, if any
    pub fn cancel(&self) {
        let mut guard = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = guard.take() {
            token.cancel();
        }
    }
}

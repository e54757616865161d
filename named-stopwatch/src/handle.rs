// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use named_stopwatch_timesource::TimeSource;

use crate::{StopwatchError, entry::TimerEntry};

/// One holder's claim on a running stopwatch.
///
/// Returned by [`NamedStopwatch::start`](crate::NamedStopwatch::start). The
/// stopwatch keeps running until every handle obtained from it has been
/// released, either explicitly through [`StopHandle::stop`] or by dropping the
/// handle.
///
/// Releasing is idempotent: only the first call has an effect, later calls
/// return `Ok(())`. The handle is `Send + Sync`, so it can be released from a
/// different thread than the one that started the stopwatch.
///
/// # Example
/// ```
/// use named_stopwatch::{NamedStopwatch, StopwatchRegistry};
///
/// let registry = StopwatchRegistry::new();
/// registry.add("request");
///
/// let outer = registry.start("request");
/// let inner = registry.start("request");
/// inner.stop().unwrap();
/// assert!(registry.is_running("request"));
///
/// outer.stop().unwrap();
/// assert!(!registry.is_running("request"));
/// // a second stop is a no-op
/// outer.stop().unwrap();
/// ```
#[must_use = "dropping a StopHandle releases it immediately"]
pub struct StopHandle {
    claim: Option<Claim>,
}

struct Claim {
    entry: Arc<TimerEntry>,
    time_source: TimeSource,
    released: AtomicBool,
}

impl StopHandle {
    pub(crate) fn new(entry: Arc<TimerEntry>, time_source: TimeSource) -> Self {
        Self {
            claim: Some(Claim {
                entry,
                time_source,
                released: AtomicBool::new(false),
            }),
        }
    }

    /// A handle bound to no stopwatch. Stopping it always succeeds.
    ///
    /// This is what the dummy registry hands out, and what
    /// [`StopwatchRegistry`](crate::StopwatchRegistry) returns when asked to
    /// start a name it does not know.
    pub fn inert() -> Self {
        Self { claim: None }
    }

    /// Release this holder's claim.
    ///
    /// When this was the last outstanding holder, the stopwatch stops and the
    /// time since it started is added to its total.
    ///
    /// Fails only if the stopwatch was deleted from its registry while this
    /// handle was outstanding.
    pub fn stop(&self) -> Result<(), StopwatchError> {
        let Some(claim) = &self.claim else {
            return Ok(());
        };
        let stopped = claim.entry.release(&claim.time_source, &claim.released)?;
        tracing::trace!(name = claim.entry.name(), stopped, "released stopwatch");
        Ok(())
    }

    /// Whether this handle no longer holds its stopwatch.
    ///
    /// Inert handles are always released.
    pub fn is_released(&self) -> bool {
        self.claim
            .as_ref()
            .is_none_or(|claim| claim.released.load(Ordering::Acquire))
    }

    /// The name of the stopwatch this handle holds, if any
    pub fn name(&self) -> Option<&str> {
        self.claim.as_ref().map(|claim| claim.entry.name())
    }
}

impl Drop for StopHandle {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::debug!(%err, "ignoring failed release of dropped stop handle");
        }
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("name", &self.name())
            .field("released", &self.is_released())
            .finish()
    }
}

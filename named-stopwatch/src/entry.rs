// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Per-name timer state.
//!
//! An entry accumulates time over the union of its holders' intervals: the
//! run-window opens when the holder count goes 0 → 1 and closes, adding its
//! length to `accumulated`, when it drops back to 0.

use std::{
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use named_stopwatch_timesource::TimeSource;

use crate::StopwatchError;

#[derive(Debug, Default)]
struct EntryState {
    accumulated: Duration,
    // Some iff holders > 0
    run_start: Option<Instant>,
    holders: usize,
    deleted: bool,
}

impl EntryState {
    fn acquire(&mut self, now: Instant) {
        if self.holders == 0 {
            self.run_start = Some(now);
        }
        self.holders += 1;
    }

    /// Returns `true` if this release closed the run-window
    fn release(&mut self, now: Instant) -> bool {
        self.holders = self.holders.saturating_sub(1);
        if self.holders > 0 {
            return false;
        }
        if let Some(start) = self.run_start.take() {
            self.accumulated = self
                .accumulated
                .saturating_add(now.saturating_duration_since(start));
        }
        true
    }

    fn elapsed(&self, now: Instant) -> Duration {
        let in_flight = self
            .run_start
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();
        self.accumulated.saturating_add(in_flight)
    }

    fn reset(&mut self, now: Instant) {
        self.accumulated = Duration::ZERO;
        if self.run_start.is_some() {
            self.run_start = Some(now);
        }
    }
}

/// A named timer shared between the registry and outstanding stop handles
#[derive(Debug)]
pub(crate) struct TimerEntry {
    name: String,
    state: Mutex<EntryState>,
}

impl TimerEntry {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::default(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    // Every critical section leaves the state consistent, so a poisoned lock
    // is safe to keep using.
    fn lock(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register one more holder. Returns `false` if the entry was deleted.
    pub(crate) fn acquire(&self, time_source: &TimeSource) -> bool {
        let mut state = self.lock();
        if state.deleted {
            return false;
        }
        state.acquire(time_source.now());
        true
    }

    /// Release one holder's claim, at most once per `released` flag.
    ///
    /// The flag is flipped while holding the entry lock, so concurrent
    /// releases of the same claim decrement exactly once. Returns whether the
    /// run-window closed.
    pub(crate) fn release(
        &self,
        time_source: &TimeSource,
        released: &AtomicBool,
    ) -> Result<bool, StopwatchError> {
        let mut state = self.lock();
        if released.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        if state.deleted {
            return Err(StopwatchError::Deleted(self.name.clone()));
        }
        Ok(state.release(time_source.now()))
    }

    pub(crate) fn elapsed(&self, time_source: &TimeSource) -> Duration {
        let state = self.lock();
        state.elapsed(time_source.now())
    }

    pub(crate) fn is_running(&self) -> bool {
        self.lock().holders > 0
    }

    pub(crate) fn reset(&self, time_source: &TimeSource) -> Result<(), StopwatchError> {
        let mut state = self.lock();
        if state.deleted {
            return Err(StopwatchError::NotFound(self.name.clone()));
        }
        state.reset(time_source.now());
        Ok(())
    }

    pub(crate) fn add_elapsed(&self, duration: Duration) -> Result<(), StopwatchError> {
        let mut state = self.lock();
        if state.deleted {
            return Err(StopwatchError::NotFound(self.name.clone()));
        }
        state.accumulated = state.accumulated.saturating_add(duration);
        Ok(())
    }

    pub(crate) fn mark_deleted(&self) {
        self.lock().deleted = true;
    }
}

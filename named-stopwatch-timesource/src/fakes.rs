// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use crate::Time;

/// A clock that only moves when told to
///
/// Clones share the same underlying instant, so keep one clone in the test and
/// hand another to [`TimeSource::custom`](crate::TimeSource::custom).
///
/// ```
/// use std::time::Duration;
/// use named_stopwatch_timesource::{TimeSource, fakes::ManualTime};
///
/// let clock = ManualTime::new();
/// let ts = TimeSource::custom(clock.clone());
/// let start = ts.now();
/// assert_eq!(ts.now(), start);
///
/// clock.advance(Duration::from_secs(100));
/// assert_eq!(ts.now() - start, Duration::from_secs(100));
/// ```
#[derive(Debug, Clone)]
pub struct ManualTime(Arc<Mutex<Instant>>);

impl ManualTime {
    /// Create a clock frozen at the real current instant
    pub fn new() -> Self {
        Self::at(Instant::now())
    }

    /// Create a clock frozen at `instant`
    pub fn at(instant: Instant) -> Self {
        Self(Arc::new(Mutex::new(instant)))
    }

    /// Move the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) += by;
    }
}

impl Default for ManualTime {
    fn default() -> Self {
        Self::new()
    }
}

impl Time for ManualTime {
    fn instant(&self) -> Instant {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

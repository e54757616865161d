// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use std::{sync::Arc, time::Duration};

pub mod config;
mod dummy;
mod entry;
mod error;
mod handle;
mod registry;

pub use config::{AnyRegistry, StopwatchConfig};
pub use dummy::DummyRegistry;
pub use error::StopwatchError;
pub use handle::StopHandle;
pub use registry::{StopwatchRegistry, StopwatchRegistryBuilder};

/// Re-export of the clock abstraction used by every registry
pub use named_stopwatch_timesource as timesource;
pub use named_stopwatch_timesource::TimeSource;

/// Operations shared by every stopwatch registry.
///
/// [`StopwatchRegistry`] measures time, [`DummyRegistry`] ignores everything,
/// and [`AnyRegistry`] is whichever of the two configuration picked. Code that
/// records time should take `&impl NamedStopwatch` (or a
/// `dyn NamedStopwatch`) so instrumentation can be switched off without
/// changing it.
///
/// None of these operations panic; lookups of unknown names return zero
/// values.
pub trait NamedStopwatch: Send + Sync {
    /// Register a stopwatch under `name`. Does nothing if it already exists.
    fn add(&self, name: &str);

    /// Register every name in `names`
    fn add_all(&self, names: &[&str]) {
        for name in names {
            self.add(name);
        }
    }

    /// Remove the stopwatch registered under `name`, if any.
    ///
    /// Handles still holding it fail to stop with [`StopwatchError::Deleted`].
    fn delete(&self, name: &str);

    /// Whether a stopwatch is registered under `name`
    fn exists(&self, name: &str) -> bool;

    /// Start (or join) the stopwatch `name`.
    ///
    /// The stopwatch runs until every handle returned by `start` has been
    /// released.
    fn start(&self, name: &str) -> StopHandle;

    /// Total time `name` has been running, including the current run.
    ///
    /// Zero for unknown names.
    fn elapsed(&self, name: &str) -> Duration;

    /// [`elapsed`](Self::elapsed) in seconds
    fn elapsed_secs(&self, name: &str) -> f64 {
        self.elapsed(name).as_secs_f64()
    }

    /// [`elapsed`](Self::elapsed) in milliseconds, keeping sub-millisecond precision
    fn elapsed_millis(&self, name: &str) -> f64 {
        //         milli
        // unit  * ----- = milli
        //         unit
        self.elapsed(name).as_secs_f64() * 1000.0
    }

    /// Zero the total of `name`.
    ///
    /// A running stopwatch keeps running and counts from now; its holders are
    /// untouched.
    fn reset(&self, name: &str) -> Result<(), StopwatchError>;

    /// Whether `name` has at least one outstanding [`StopHandle`]
    fn is_running(&self, name: &str) -> bool;

    /// Add a duration measured elsewhere to the total of `name`
    fn add_elapsed(&self, name: &str, duration: Duration) -> Result<(), StopwatchError>;

    /// Every registered name, sorted
    fn names(&self) -> Vec<String>;

    /// Every registered name with its current elapsed time, sorted by name
    fn snapshot(&self) -> Vec<(String, Duration)>;
}

impl<T: NamedStopwatch + ?Sized> NamedStopwatch for Arc<T> {
    fn add(&self, name: &str) {
        (**self).add(name)
    }

    fn delete(&self, name: &str) {
        (**self).delete(name)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn start(&self, name: &str) -> StopHandle {
        (**self).start(name)
    }

    fn elapsed(&self, name: &str) -> Duration {
        (**self).elapsed(name)
    }

    fn reset(&self, name: &str) -> Result<(), StopwatchError> {
        (**self).reset(name)
    }

    fn is_running(&self, name: &str) -> bool {
        (**self).is_running(name)
    }

    fn add_elapsed(&self, name: &str, duration: Duration) -> Result<(), StopwatchError> {
        (**self).add_elapsed(name, duration)
    }

    fn names(&self) -> Vec<String> {
        (**self).names()
    }

    fn snapshot(&self) -> Vec<(String, Duration)> {
        (**self).snapshot()
    }
}

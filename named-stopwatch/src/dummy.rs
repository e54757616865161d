// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use crate::{NamedStopwatch, StopHandle, StopwatchError};

/// A [`NamedStopwatch`] that records nothing.
///
/// Every mutation is ignored and every query returns the zero value: no name
/// ever exists, elapsed time is always zero and nothing is ever running.
/// [`start`](NamedStopwatch::start) returns an inert [`StopHandle`].
///
/// Use it to switch instrumentation off without touching call sites, usually by
/// setting `enabled = false` in [`StopwatchConfig`](crate::StopwatchConfig).
///
/// ```
/// use std::time::Duration;
/// use named_stopwatch::{DummyRegistry, NamedStopwatch};
///
/// let registry = DummyRegistry::new();
/// registry.add("request");
/// let handle = registry.start("request");
/// assert!(!registry.is_running("request"));
/// assert_eq!(registry.elapsed("request"), Duration::ZERO);
/// handle.stop().unwrap();
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DummyRegistry;

impl DummyRegistry {
    /// Create a dummy registry
    pub fn new() -> Self {
        Self
    }
}

impl NamedStopwatch for DummyRegistry {
    fn add(&self, _name: &str) {}

    fn delete(&self, _name: &str) {}

    fn exists(&self, _name: &str) -> bool {
        false
    }

    fn start(&self, _name: &str) -> StopHandle {
        StopHandle::inert()
    }

    fn elapsed(&self, _name: &str) -> Duration {
        Duration::ZERO
    }

    fn reset(&self, _name: &str) -> Result<(), StopwatchError> {
        Ok(())
    }

    fn is_running(&self, _name: &str) -> bool {
        false
    }

    fn add_elapsed(&self, _name: &str, _duration: Duration) -> Result<(), StopwatchError> {
        Ok(())
    }

    fn names(&self) -> Vec<String> {
        Vec::new()
    }

    fn snapshot(&self) -> Vec<(String, Duration)> {
        Vec::new()
    }
}

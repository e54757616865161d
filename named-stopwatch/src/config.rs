// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Choosing between the real and the dummy registry at startup.

use std::time::Duration;

use named_stopwatch_timesource::TimeSource;

use crate::{DummyRegistry, NamedStopwatch, StopHandle, StopwatchError, StopwatchRegistry};

/// Settings for building a registry
///
/// With the `serde` feature (on by default) this can be read from an
/// application's config file. Missing fields take their default.
///
/// ```
/// use named_stopwatch::{NamedStopwatch, StopwatchConfig};
/// use named_stopwatch_timesource::TimeSource;
///
/// let config: StopwatchConfig =
///     serde_json::from_str(r#"{ "enabled": false, "names": ["db"] }"#).unwrap();
/// let registry = config.build(TimeSource::System);
/// assert!(!registry.is_enabled());
/// assert!(!registry.exists("db"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct StopwatchConfig {
    /// Record time at all. `false` builds a [`DummyRegistry`]. Defaults to `true`.
    pub enabled: bool,
    /// See [`StopwatchRegistryBuilder::create_on_start`](crate::StopwatchRegistryBuilder::create_on_start).
    pub create_on_start: bool,
    /// Names registered up front
    pub names: Vec<String>,
}

impl Default for StopwatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            create_on_start: false,
            names: Vec::new(),
        }
    }
}

impl StopwatchConfig {
    /// Build the registry this config describes
    pub fn build(&self, time_source: TimeSource) -> AnyRegistry {
        if !self.enabled {
            tracing::debug!("stopwatches disabled, using dummy registry");
            return AnyRegistry::Dummy(DummyRegistry);
        }
        let registry = StopwatchRegistry::builder()
            .time_source(time_source)
            .create_on_start(self.create_on_start)
            .names(self.names.iter().cloned())
            .build();
        AnyRegistry::Real(registry)
    }
}

/// Either a [`StopwatchRegistry`] or a [`DummyRegistry`]
///
/// Returned by [`StopwatchConfig::build`] so the choice stays out of call sites.
#[derive(Debug, Clone)]
pub enum AnyRegistry {
    /// Records time
    Real(StopwatchRegistry),
    /// Records nothing
    Dummy(DummyRegistry),
}

impl AnyRegistry {
    /// `false` for the dummy registry
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Real(_))
    }
}

impl Default for AnyRegistry {
    fn default() -> Self {
        StopwatchConfig::default().build(TimeSource::default())
    }
}

impl From<StopwatchRegistry> for AnyRegistry {
    fn from(registry: StopwatchRegistry) -> Self {
        Self::Real(registry)
    }
}

impl From<DummyRegistry> for AnyRegistry {
    fn from(registry: DummyRegistry) -> Self {
        Self::Dummy(registry)
    }
}

macro_rules! dispatch {
    ($self:ident.$method:ident($($arg:expr),*)) => {
        match $self {
            AnyRegistry::Real(registry) => registry.$method($($arg),*),
            AnyRegistry::Dummy(registry) => registry.$method($($arg),*),
        }
    };
}

impl NamedStopwatch for AnyRegistry {
    fn add(&self, name: &str) {
        dispatch!(self.add(name))
    }

    fn delete(&self, name: &str) {
        dispatch!(self.delete(name))
    }

    fn exists(&self, name: &str) -> bool {
        dispatch!(self.exists(name))
    }

    fn start(&self, name: &str) -> StopHandle {
        dispatch!(self.start(name))
    }

    fn elapsed(&self, name: &str) -> Duration {
        dispatch!(self.elapsed(name))
    }

    fn reset(&self, name: &str) -> Result<(), StopwatchError> {
        dispatch!(self.reset(name))
    }

    fn is_running(&self, name: &str) -> bool {
        dispatch!(self.is_running(name))
    }

    fn add_elapsed(&self, name: &str, duration: Duration) -> Result<(), StopwatchError> {
        dispatch!(self.add_elapsed(name, duration))
    }

    fn names(&self) -> Vec<String> {
        dispatch!(self.names())
    }

    fn snapshot(&self) -> Vec<(String, Duration)> {
        dispatch!(self.snapshot())
    }
}

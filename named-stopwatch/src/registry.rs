// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use hashbrown::HashMap;
use named_stopwatch_timesource::TimeSource;

use crate::{NamedStopwatch, StopHandle, StopwatchError, entry::TimerEntry};

type Entries = HashMap<String, Arc<TimerEntry>>;

/// A thread-safe registry of named stopwatches.
///
/// Each name owns an independent stopwatch that may be started any number of
/// times concurrently. Every [`start`](NamedStopwatch::start) returns a
/// [`StopHandle`]; the stopwatch keeps accumulating time until the last
/// outstanding handle is released, so nested or parallel sections sharing one
/// name are counted once.
///
/// The registry is cheap to clone. Clones share the same stopwatches, so create
/// one at startup and pass it to whatever needs to record time.
///
/// Lookup misses never fail the caller: unknown names report zero elapsed
/// time and are never running, `delete` ignores them and `start` hands back an
/// inert handle (or creates the stopwatch, see
/// [`StopwatchRegistryBuilder::create_on_start`]). Only
/// [`reset`](NamedStopwatch::reset) and
/// [`add_elapsed`](NamedStopwatch::add_elapsed) report
/// [`StopwatchError::NotFound`].
///
/// # Example
/// ```
/// use named_stopwatch::{NamedStopwatch, StopwatchRegistry};
///
/// let registry = StopwatchRegistry::new();
/// registry.add_all(&["parse", "render"]);
///
/// let handle = registry.start("parse");
/// assert!(registry.is_running("parse"));
/// handle.stop().unwrap();
///
/// let frozen = registry.elapsed("parse");
/// assert_eq!(registry.elapsed("parse"), frozen);
/// ```
#[derive(Clone, Debug)]
pub struct StopwatchRegistry {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    entries: RwLock<Entries>,
    time_source: TimeSource,
    create_on_start: bool,
}

impl Default for StopwatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StopwatchRegistry {
    /// An empty registry reading the system clock
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// An empty registry reading `time_source`
    ///
    /// ```
    /// use std::time::Duration;
    /// use named_stopwatch::{NamedStopwatch, StopwatchRegistry};
    /// use named_stopwatch_timesource::{TimeSource, fakes::ManualTime};
    ///
    /// let clock = ManualTime::new();
    /// let registry = StopwatchRegistry::with_time_source(TimeSource::custom(clock.clone()));
    /// registry.add("db");
    ///
    /// let handle = registry.start("db");
    /// clock.advance(Duration::from_millis(30));
    /// drop(handle);
    /// assert_eq!(registry.elapsed("db"), Duration::from_millis(30));
    /// ```
    pub fn with_time_source(time_source: TimeSource) -> Self {
        Self::builder().time_source(time_source).build()
    }

    /// Configure a registry
    pub fn builder() -> StopwatchRegistryBuilder {
        StopwatchRegistryBuilder::default()
    }

    /// The clock this registry measures with
    pub fn time_source(&self) -> &TimeSource {
        &self.inner.time_source
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, name: &str) -> Option<Arc<TimerEntry>> {
        self.read().get(name).cloned()
    }

    fn lookup_or_insert(&self, name: &str) -> Arc<TimerEntry> {
        let mut entries = self.write();
        if let Some(entry) = entries.get(name) {
            return entry.clone();
        }
        let entry = Arc::new(TimerEntry::new(name));
        entries.insert(name.to_owned(), entry.clone());
        drop(entries);
        tracing::debug!(name, "created stopwatch on start");
        entry
    }
}

impl NamedStopwatch for StopwatchRegistry {
    fn add(&self, name: &str) {
        {
            let mut entries = self.write();
            // never replace an existing entry, it may be running
            if entries.contains_key(name) {
                return;
            }
            entries.insert(name.to_owned(), Arc::new(TimerEntry::new(name)));
        }
        tracing::debug!(name, "added stopwatch");
    }

    fn delete(&self, name: &str) {
        let Some(entry) = self.write().remove(name) else {
            return;
        };
        entry.mark_deleted();
        tracing::debug!(name, "deleted stopwatch");
    }

    fn exists(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    fn start(&self, name: &str) -> StopHandle {
        let entry = match self.lookup(name) {
            Some(entry) => entry,
            None if self.inner.create_on_start => self.lookup_or_insert(name),
            None => {
                tracing::debug!(name, "ignoring start of unknown stopwatch");
                return StopHandle::inert();
            }
        };
        // lost a race with `delete`
        if !entry.acquire(&self.inner.time_source) {
            tracing::debug!(name, "ignoring start of deleted stopwatch");
            return StopHandle::inert();
        }
        tracing::trace!(name, "started stopwatch");
        StopHandle::new(entry, self.inner.time_source.clone())
    }

    fn elapsed(&self, name: &str) -> Duration {
        self.lookup(name)
            .map(|entry| entry.elapsed(&self.inner.time_source))
            .unwrap_or_default()
    }

    fn reset(&self, name: &str) -> Result<(), StopwatchError> {
        self.lookup(name)
            .ok_or_else(|| StopwatchError::NotFound(name.to_owned()))?
            .reset(&self.inner.time_source)
    }

    fn is_running(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|entry| entry.is_running())
    }

    fn add_elapsed(&self, name: &str, duration: Duration) -> Result<(), StopwatchError> {
        self.lookup(name)
            .ok_or_else(|| StopwatchError::NotFound(name.to_owned()))?
            .add_elapsed(duration)
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn snapshot(&self) -> Vec<(String, Duration)> {
        // don't hold the map lock while taking entry locks
        let entries: Vec<Arc<TimerEntry>> = self.read().values().cloned().collect();
        let mut snapshot: Vec<(String, Duration)> = entries
            .iter()
            .map(|entry| {
                (
                    entry.name().to_owned(),
                    entry.elapsed(&self.inner.time_source),
                )
            })
            .collect();
        snapshot.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        snapshot
    }
}

/// Builder for [`StopwatchRegistry`]
#[derive(Debug, Default)]
pub struct StopwatchRegistryBuilder {
    time_source: TimeSource,
    create_on_start: bool,
    names: Vec<String>,
}

impl StopwatchRegistryBuilder {
    /// Measure with `time_source` instead of the system clock
    pub fn time_source(mut self, time_source: TimeSource) -> Self {
        self.time_source = time_source;
        self
    }

    /// When `true`, starting an unknown name registers it first instead of
    /// returning an inert handle. Defaults to `false`.
    pub fn create_on_start(mut self, create_on_start: bool) -> Self {
        self.create_on_start = create_on_start;
        self
    }

    /// Register `name` when the registry is built
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Register every name in `names` when the registry is built
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Build the registry
    pub fn build(self) -> StopwatchRegistry {
        let entries = self
            .names
            .into_iter()
            .map(|name| {
                let entry = Arc::new(TimerEntry::new(name.as_str()));
                (name, entry)
            })
            .collect();
        StopwatchRegistry {
            inner: Arc::new(Inner {
                entries: RwLock::new(entries),
                time_source: self.time_source,
                create_on_start: self.create_on_start,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use assert2::check;
    use named_stopwatch_timesource::{TimeSource, fakes::ManualTime};

    use super::StopwatchRegistry;
    use crate::{NamedStopwatch, StopwatchError};

    fn registry() -> (StopwatchRegistry, ManualTime) {
        let clock = ManualTime::new();
        let registry = StopwatchRegistry::with_time_source(TimeSource::custom(clock.clone()));
        (registry, clock)
    }

    #[test]
    fn add_is_idempotent_and_keeps_running_entries() {
        let (registry, clock) = registry();
        registry.add("s1");
        let handle = registry.start("s1");
        clock.advance(Duration::from_secs(2));

        registry.add("s1");
        check!(registry.is_running("s1"));
        check!(registry.elapsed("s1") == Duration::from_secs(2));
        handle.stop().unwrap();
        check!(registry.elapsed("s1") == Duration::from_secs(2));
    }

    #[test]
    fn unknown_names_are_harmless() {
        let (registry, _) = registry();
        check!(!registry.exists("nope"));
        check!(registry.elapsed("nope") == Duration::ZERO);
        check!(!registry.is_running("nope"));
        registry.delete("nope");

        let handle = registry.start("nope");
        check!(handle.is_released());
        check!(handle.stop() == Ok(()));
        check!(!registry.exists("nope"));

        check!(registry.reset("nope") == Err(StopwatchError::NotFound("nope".into())));
        check!(
            registry.add_elapsed("nope", Duration::from_secs(1))
                == Err(StopwatchError::NotFound("nope".into()))
        );
    }

    #[test]
    fn create_on_start_registers_unknown_names() {
        let clock = ManualTime::new();
        let registry = StopwatchRegistry::builder()
            .time_source(TimeSource::custom(clock.clone()))
            .create_on_start(true)
            .build();

        let handle = registry.start("lazy");
        check!(registry.exists("lazy"));
        check!(registry.is_running("lazy"));
        clock.advance(Duration::from_millis(5));
        handle.stop().unwrap();
        check!(registry.elapsed("lazy") == Duration::from_millis(5));
    }

    #[test]
    fn builder_preregisters_names() {
        let registry = StopwatchRegistry::builder()
            .name("b")
            .names(["c", "a"])
            .build();
        check!(registry.names() == ["a", "b", "c"]);
        check!(registry.elapsed("a") == Duration::ZERO);
    }

    #[test]
    fn delete_invalidates_outstanding_handles() {
        let (registry, clock) = registry();
        registry.add("s1");
        let stale = registry.start("s1");
        registry.delete("s1");
        check!(!registry.exists("s1"));

        // a fresh entry under the same name is independent of the stale handle
        registry.add("s1");
        check!(!registry.is_running("s1"));
        let fresh = registry.start("s1");
        clock.advance(Duration::from_secs(1));

        check!(stale.stop() == Err(StopwatchError::Deleted("s1".into())));
        check!(stale.stop() == Ok(()));
        check!(registry.is_running("s1"));

        fresh.stop().unwrap();
        check!(!registry.is_running("s1"));
        check!(registry.elapsed("s1") == Duration::from_secs(1));
    }

    #[test]
    fn add_elapsed_adds_to_total() {
        let (registry, clock) = registry();
        registry.add("io");
        registry
            .add_elapsed("io", Duration::from_millis(250))
            .unwrap();
        let handle = registry.start("io");
        clock.advance(Duration::from_millis(750));
        check!(registry.elapsed("io") == Duration::from_secs(1));
        check!(registry.elapsed_secs("io") == 1.0);
        check!(registry.elapsed_millis("io") == 1000.0);
        drop(handle);
    }

    #[test]
    fn snapshot_is_sorted_and_live() {
        let (registry, clock) = registry();
        registry.add_all(&["zeta", "alpha"]);
        let _running = registry.start("zeta");
        clock.advance(Duration::from_secs(3));
        check!(
            registry.snapshot()
                == vec![
                    ("alpha".to_owned(), Duration::ZERO),
                    ("zeta".to_owned(), Duration::from_secs(3)),
                ]
        );
    }

    #[test]
    fn clones_share_entries() {
        let (registry, _) = registry();
        let other = registry.clone();
        registry.add("shared");
        let handle = other.start("shared");
        check!(registry.is_running("shared"));
        drop(handle);
        check!(!registry.is_running("shared"));
    }
}

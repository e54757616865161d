// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

/// Fake clocks for tests
///
/// To enable this module, you must enable the `test-util` feature.
#[cfg(feature = "test-util")]
pub mod fakes;

/// A source of monotonic instants
///
/// Implement this to drive stopwatches from something other than the system clock.
pub trait Time: Send + Sync + Debug {
    /// The current instant according to this clock
    fn instant(&self) -> Instant;
}

/// Clock that follows tokio's (possibly paused) time
///
/// This requires that the `tokio` feature be enabled.
#[cfg(feature = "tokio")]
pub mod tokio {
    use std::time::Instant;

    use tokio::time::Instant as TokioInstant;

    use crate::{Time, TimeSource};

    impl TimeSource {
        /// A time source reading tokio's clock
        ///
        /// Under `tokio::time::pause()` the returned instants only move when
        /// the runtime auto-advances or `tokio::time::advance` is called.
        ///
        /// ```
        /// # #[tokio::main(flavor = "current_thread")]
        /// # async fn main() {
        /// use std::time::Duration;
        /// use named_stopwatch_timesource::TimeSource;
        ///
        /// tokio::time::pause();
        /// let ts = TimeSource::tokio();
        /// let start = ts.now();
        /// tokio::time::advance(Duration::from_secs(5)).await;
        /// assert_eq!(ts.now() - start, Duration::from_secs(5));
        /// # }
        /// ```
        pub fn tokio() -> Self {
            TimeSource::custom(TokioTime)
        }
    }

    /// [`Time`] implementation backed by [`tokio::time::Instant`]
    #[derive(Copy, Clone, Debug, Default)]
    pub struct TokioTime;

    impl Time for TokioTime {
        fn instant(&self) -> Instant {
            TokioInstant::now().into_std()
        }
    }

}

/// Where "now" comes from
///
/// Cloning a `TimeSource` is cheap; clones read the same clock.
#[derive(Clone, Default)]
pub enum TimeSource {
    /// `std::time::Instant::now()`
    #[default]
    System,
    #[cfg(feature = "custom-timesource")]
    /// A user supplied clock
    Custom(std::sync::Arc<dyn Time>),
}

impl Debug for TimeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "TimeSource::System"),
            #[cfg(feature = "custom-timesource")]
            Self::Custom(_) => write!(f, "TimeSource::Custom(...)"),
        }
    }
}

impl TimeSource {
    /// The current instant
    ///
    /// ```
    /// use named_stopwatch_timesource::TimeSource;
    ///
    /// let ts = TimeSource::System;
    /// let a = ts.now();
    /// let b = ts.now();
    /// assert!(b >= a);
    /// ```
    #[inline]
    pub fn now(&self) -> Instant {
        match self {
            Self::System => Instant::now(),
            #[cfg(feature = "custom-timesource")]
            Self::Custom(time) => time.instant(),
        }
    }

    /// Time elapsed between `earlier` and now.
    ///
    /// Saturates to zero if a custom clock reports an instant before `earlier`.
    #[inline]
    pub fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }

    /// Wrap a custom clock
    ///
    /// This method is only available when the `custom-timesource` feature is enabled.
    ///
    /// ```
    /// use std::time::Duration;
    /// use named_stopwatch_timesource::{TimeSource, fakes::ManualTime};
    ///
    /// let clock = ManualTime::new();
    /// let ts = TimeSource::custom(clock.clone());
    /// let start = ts.now();
    /// clock.advance(Duration::from_secs(3));
    /// assert_eq!(ts.elapsed_since(start), Duration::from_secs(3));
    /// ```
    #[cfg(feature = "custom-timesource")]
    pub fn custom(custom: impl Time + 'static) -> TimeSource {
        Self::Custom(std::sync::Arc::new(custom))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{TimeSource, fakes::ManualTime};

    #[test]
    fn default_is_system() {
        match TimeSource::default() {
            TimeSource::System => {}
            _ => panic!("Expected default time source to be System"),
        }
    }

    #[test]
    fn system_clock_does_not_go_backwards() {
        let ts = TimeSource::System;
        let start = ts.now();
        assert!(ts.now() >= start);
    }

    #[test]
    fn custom_clock_is_shared_by_clones() {
        let clock = ManualTime::new();
        let ts = TimeSource::custom(clock.clone());
        let cloned = ts.clone();
        let start = ts.now();
        clock.advance(Duration::from_millis(10));
        assert_eq!(cloned.elapsed_since(start), Duration::from_millis(10));
        assert_eq!(format!("{cloned:?}"), "TimeSource::Custom(...)");
    }

    #[test]
    fn elapsed_since_saturates() {
        let clock = ManualTime::new();
        let ts = TimeSource::custom(clock.clone());
        let later = ts.now() + Duration::from_secs(1);
        assert_eq!(ts.elapsed_since(later), Duration::ZERO);
    }
}

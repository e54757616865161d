// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{sync::Arc, thread, time::Duration};

use assert2::check;
use named_stopwatch::{NamedStopwatch, StopwatchRegistry};
use named_stopwatch_timesource::{TimeSource, fakes::ManualTime};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[test]
fn many_threads_share_one_stopwatch() {
    init_logging();
    let registry = StopwatchRegistry::new();
    registry.add("shared");

    thread::scope(|s| {
        for _ in 0..16 {
            s.spawn(|| {
                for _ in 0..200 {
                    let handle = registry.start("shared");
                    check!(registry.is_running("shared"));
                    handle.stop().unwrap();
                }
            });
        }
    });

    check!(!registry.is_running("shared"));
    let frozen = registry.elapsed("shared");
    check!(registry.elapsed("shared") == frozen);
}

#[test]
fn concurrent_adds_never_wipe_a_running_entry() {
    init_logging();
    let clock = ManualTime::new();
    let registry = StopwatchRegistry::with_time_source(TimeSource::custom(clock.clone()));
    registry.add("db");
    let handle = registry.start("db");
    clock.advance(Duration::from_secs(1));

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..100 {
                    registry.add("db");
                }
            });
        }
    });

    check!(registry.is_running("db"));
    check!(registry.elapsed("db") == Duration::from_secs(1));
    handle.stop().unwrap();
    check!(!registry.is_running("db"));
}

#[test]
fn handles_can_be_released_on_other_threads() {
    init_logging();
    let clock = ManualTime::new();
    let registry = StopwatchRegistry::with_time_source(TimeSource::custom(clock.clone()));
    registry.add("job");

    let handles: Vec<_> = (0..4).map(|_| registry.start("job")).collect();
    clock.advance(Duration::from_millis(100));

    let workers: Vec<_> = handles
        .into_iter()
        .map(|handle| thread::spawn(move || handle.stop()))
        .collect();
    for worker in workers {
        check!(worker.join().unwrap() == Ok(()));
    }

    check!(!registry.is_running("job"));
    check!(registry.elapsed("job") == Duration::from_millis(100));
}

#[test]
fn different_names_are_independent_under_contention() {
    init_logging();
    let registry = Arc::new(StopwatchRegistry::new());
    let names: Vec<String> = (0..8).map(|i| format!("worker-{i}")).collect();
    for name in &names {
        registry.add(name);
    }

    thread::scope(|s| {
        for name in &names {
            let registry = registry.clone();
            s.spawn(move || {
                let outer = registry.start(name);
                for _ in 0..50 {
                    let inner = registry.start(name);
                    registry.reset(name).unwrap();
                    drop(inner);
                    check!(registry.is_running(name));
                }
                drop(outer);
                check!(!registry.is_running(name));
            });
        }
    });

    check!(registry.names() == names);
}

#[tokio::test(start_paused = true)]
async fn tasks_overlap_on_tokio_time() {
    init_logging();
    let registry = StopwatchRegistry::with_time_source(TimeSource::tokio());
    registry.add("fanout");

    let parent = registry.start("fanout");
    let mut tasks = tokio::task::JoinSet::new();
    for delay in [10, 30, 20] {
        let handle = registry.start("fanout");
        tasks.spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            handle.stop()
        });
    }
    parent.stop().unwrap();
    check!(registry.is_running("fanout"));

    while let Some(result) = tasks.join_next().await {
        check!(result.unwrap() == Ok(()));
    }

    check!(!registry.is_running("fanout"));
    check!(registry.elapsed("fanout") == Duration::from_millis(30));
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Time a request pipeline whose stages fan out in parallel.
//!
//! Run with `STOPWATCH_DISABLED=1` to see the same code with instrumentation off.

use std::{sync::Arc, time::Duration};

use named_stopwatch::{AnyRegistry, NamedStopwatch, StopwatchConfig, TimeSource};
use tracing::info;

async fn fetch(registry: Arc<AnyRegistry>, shard: u64) {
    // every shard holds "fetch"; it stops once the slowest shard is done
    let _timer = registry.start("fetch");
    tokio::time::sleep(Duration::from_millis(10 * shard)).await;
}

async fn handle_request(registry: Arc<AnyRegistry>) {
    let request = registry.start("request");

    let mut shards = tokio::task::JoinSet::new();
    for shard in 1..=3 {
        shards.spawn(fetch(registry.clone(), shard));
    }
    while shards.join_next().await.is_some() {}

    let render = registry.start("render");
    tokio::time::sleep(Duration::from_millis(5)).await;
    drop(render);

    if let Err(err) = request.stop() {
        tracing::warn!(%err, "request timer was not stopped");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = StopwatchConfig {
        enabled: std::env::var_os("STOPWATCH_DISABLED").is_none(),
        names: vec!["request".into(), "fetch".into(), "render".into()],
        ..Default::default()
    };
    let registry = Arc::new(config.build(TimeSource::System));

    for _ in 0..3 {
        handle_request(registry.clone()).await;
    }

    for (name, elapsed) in registry.snapshot() {
        info!(name, elapsed_ms = elapsed.as_secs_f64() * 1000.0, "total");
    }
}

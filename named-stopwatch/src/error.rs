// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Errors returned by stopwatch operations.
///
/// Lookup misses on queries are not errors; only operations that would
/// otherwise silently hide mis-wired instrumentation report one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopwatchError {
    /// No stopwatch is registered under this name.
    NotFound(String),
    /// The stopwatch was deleted while a [`StopHandle`](crate::StopHandle) still held it.
    Deleted(String),
}

impl StopwatchError {
    /// The stopwatch name the error refers to
    pub fn name(&self) -> &str {
        match self {
            Self::NotFound(name) | Self::Deleted(name) => name,
        }
    }
}

impl fmt::Display for StopwatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "stopwatch {name:?} is not registered"),
            Self::Deleted(name) => write!(f, "stopwatch {name:?} was deleted while running"),
        }
    }
}

impl std::error::Error for StopwatchError {}

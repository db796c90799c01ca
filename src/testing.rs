// ABOUTME: Recording connection factory used by tests, benches, and the soak harness
// ABOUTME: Counts opens and closes, injects latency and failures, and tracks closed handles
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::pool::ConnectionFactory;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Configuration understood by [`RecordingFactory`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    /// Free-form label copied onto the opened connection
    pub label: String,
    /// Make `open` fail for this config
    pub fail_open: bool,
}

impl MockConfig {
    /// Config that opens successfully
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fail_open: false,
        }
    }

    /// Config whose `open` always fails
    #[must_use]
    pub fn failing(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fail_open: true,
        }
    }
}

/// Fake connection handed out by [`RecordingFactory`]
#[derive(Debug)]
pub struct MockConnection {
    id: u64,
    label: String,
    closed: AtomicBool,
}

impl MockConnection {
    /// Unique, increasing id assigned at open time
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Label of the config this connection was opened with
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the factory has closed this connection
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Errors produced by [`RecordingFactory`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    /// `open` was told to fail
    #[error("connection refused for '{label}'")]
    OpenRefused {
        /// Label of the refused config
        label: String,
    },
    /// `close` was told to fail
    #[error("close failed for connection {id}")]
    CloseFailed {
        /// Id of the connection
        id: u64,
    },
}

#[derive(Debug, Default)]
struct Recorder {
    next_id: AtomicU64,
    open_calls: AtomicU64,
    close_calls: AtomicU64,
    in_flight_opens: AtomicUsize,
    max_in_flight_opens: AtomicUsize,
    fail_next_opens: AtomicUsize,
    fail_closes: AtomicBool,
    closed_ids: Mutex<Vec<u64>>,
}

/// Connection factory that records every call
///
/// Clones share the same recorder, so a test can keep one clone for
/// assertions after handing another to the pool.
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    recorder: Arc<Recorder>,
    open_delay: Duration,
    close_delay: Duration,
}

impl RecordingFactory {
    /// Factory with instant, always-successful opens and closes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `open` sleep for `delay` first
    #[must_use]
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    /// Make every `close` sleep for `delay` before closing the handle
    #[must_use]
    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    /// Make every subsequent `close` report failure
    pub fn fail_closes(&self, fail: bool) {
        self.recorder.fail_closes.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` opens fail regardless of config
    pub fn fail_next_opens(&self, count: usize) {
        self.recorder.fail_next_opens.store(count, Ordering::SeqCst);
    }

    /// Number of `open` calls, successful or not
    #[must_use]
    pub fn open_count(&self) -> u64 {
        self.recorder.open_calls.load(Ordering::SeqCst)
    }

    /// Number of `close` calls, successful or not
    #[must_use]
    pub fn close_count(&self) -> u64 {
        self.recorder.close_calls.load(Ordering::SeqCst)
    }

    /// Number of opens currently running
    #[must_use]
    pub fn in_flight_opens(&self) -> usize {
        self.recorder.in_flight_opens.load(Ordering::SeqCst)
    }

    /// Highest number of opens observed running at the same time
    #[must_use]
    pub fn max_concurrent_opens(&self) -> usize {
        self.recorder.max_in_flight_opens.load(Ordering::SeqCst)
    }

    /// Ids of closed connections, in close order
    #[must_use]
    pub fn closed_ids(&self) -> Vec<u64> {
        self.recorder
            .closed_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn take_forced_failure(&self) -> bool {
        self.recorder
            .fail_next_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Counts one running open until dropped, including when the open is cancelled
struct InFlightOpen<'a>(&'a AtomicUsize);

impl<'a> InFlightOpen<'a> {
    fn enter(in_flight: &'a AtomicUsize, max_seen: &AtomicUsize) -> Self {
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        max_seen.fetch_max(now, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for InFlightOpen<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionFactory for RecordingFactory {
    type Config = MockConfig;
    type Handle = Arc<MockConnection>;
    type Error = MockError;

    fn kind(&self) -> &str {
        "mock"
    }

    async fn open(&self, config: &MockConfig) -> Result<Arc<MockConnection>, MockError> {
        let recorder = &self.recorder;
        recorder.open_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight =
            InFlightOpen::enter(&recorder.in_flight_opens, &recorder.max_in_flight_opens);

        if !self.open_delay.is_zero() {
            sleep(self.open_delay).await;
        }
        drop(in_flight);

        if config.fail_open || self.take_forced_failure() {
            return Err(MockError::OpenRefused {
                label: config.label.clone(),
            });
        }

        Ok(Arc::new(MockConnection {
            id: recorder.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            label: config.label.clone(),
            closed: AtomicBool::new(false),
        }))
    }

    async fn close(&self, handle: Arc<MockConnection>) -> Result<(), MockError> {
        if !self.close_delay.is_zero() {
            sleep(self.close_delay).await;
        }
        let recorder = &self.recorder;
        recorder.close_calls.fetch_add(1, Ordering::SeqCst);
        handle.closed.store(true, Ordering::SeqCst);
        recorder
            .closed_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle.id);

        if recorder.fail_closes.load(Ordering::SeqCst) {
            return Err(MockError::CloseFailed { id: handle.id });
        }
        Ok(())
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Expiring value cell.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::Error;

/// Capability to pull a cell's authoritative value from elsewhere.
///
/// Invoked lazily when a read finds the cached value expired. Implementors
/// are expected to be cheap to call repeatedly; the cell re-arms its TTL
/// after every successful refresh.
pub trait Refresh<T>: Send + Sync {
    /// Fetches a fresh value.
    fn refresh(&self) -> BoxFuture<'_, Result<T, Error>>;
}

/// Capability to push a cell's new value outward after a write.
///
/// Implementations must return promptly: the cell awaits the returned future
/// on every write, so a sink that talks to the network should dispatch the
/// work (see [`Debouncer`](crate::cache::Debouncer)) rather than perform it
/// inline.
pub trait Propagate<T>: Send + Sync {
    /// Hands the written value to the outward path.
    fn propagate(&self, value: T) -> BoxFuture<'_, Result<(), Error>>;
}

/// A cached attribute value with a time-to-live.
///
/// Reads within the TTL return the cached value untouched. An expired read
/// awaits the configured [`Refresh`] source and re-caches on success; on
/// failure (or with no source configured) the stale value is served as-is.
/// Writes update the cache and re-arm the TTL unconditionally, then hand the
/// value to the configured [`Propagate`] sink. The cell never surfaces an
/// error: refresh and propagate failures end in a log line.
///
/// A read racing a write may observe either value; cells are only ever
/// touched from one controller's cooperative task set, so no stronger
/// ordering is needed.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use climabridge::ExpiringCell;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cell = ExpiringCell::new("power", false, Duration::from_secs(30));
/// cell.write(true).await;
/// assert!(cell.read().await);
/// # }
/// ```
pub struct ExpiringCell<T> {
    name: &'static str,
    ttl: Duration,
    state: Mutex<CellState<T>>,
    refresh: Option<Arc<dyn Refresh<T>>>,
    propagate: Option<Arc<dyn Propagate<T>>>,
}

struct CellState<T> {
    value: T,
    expires_at: Instant,
}

impl<T: Clone + Send + Sync> ExpiringCell<T> {
    /// Creates a cell holding `seed`, fresh for one TTL from now.
    #[must_use]
    pub fn new(name: &'static str, seed: T, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            state: Mutex::new(CellState {
                value: seed,
                expires_at: Instant::now() + ttl,
            }),
            refresh: None,
            propagate: None,
        }
    }

    /// Attaches the refresh source consulted on expired reads.
    #[must_use]
    pub fn with_refresh(mut self, source: Arc<dyn Refresh<T>>) -> Self {
        self.refresh = Some(source);
        self
    }

    /// Attaches the propagate sink fired on writes.
    #[must_use]
    pub fn with_propagate(mut self, sink: Arc<dyn Propagate<T>>) -> Self {
        self.propagate = Some(sink);
        self
    }

    /// Returns the cell's name, used in log output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` once the cached value's TTL has elapsed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state.lock().expires_at <= Instant::now()
    }

    /// Returns the cached value without consulting the refresh source.
    #[must_use]
    pub fn peek(&self) -> T {
        self.state.lock().value.clone()
    }

    /// Returns the cached value, refreshing it first if expired.
    ///
    /// A failed refresh serves the stale value; so does an expired read on a
    /// cell with no refresh source.
    pub async fn read(&self) -> T {
        if self.is_expired()
            && let Some(source) = &self.refresh
        {
            match source.refresh().await {
                Ok(value) => {
                    let mut state = self.state.lock();
                    state.value = value.clone();
                    state.expires_at = Instant::now() + self.ttl;
                    tracing::debug!(cell = self.name, "refreshed expired value");
                    return value;
                }
                Err(err) => {
                    tracing::warn!(
                        cell = self.name,
                        error = %err,
                        "refresh failed, serving stale value"
                    );
                }
            }
        }
        self.peek()
    }

    /// Stores `value`, re-arms the TTL, and fires the propagate sink.
    ///
    /// The cache update always wins: a sink failure is logged and the
    /// locally stored value is kept.
    pub async fn write(&self, value: T) {
        {
            let mut state = self.state.lock();
            state.value = value.clone();
            state.expires_at = Instant::now() + self.ttl;
        }
        if let Some(sink) = &self.propagate
            && let Err(err) = sink.propagate(value).await
        {
            tracing::warn!(
                cell = self.name,
                error = %err,
                "propagate failed, keeping local value"
            );
        }
    }
}

impl<T> std::fmt::Debug for ExpiringCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCell")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("has_refresh", &self.refresh.is_some())
            .field("has_propagate", &self.propagate.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::ApiError;

    const TTL: Duration = Duration::from_secs(30);

    struct StaticSource {
        value: i32,
        calls: AtomicU32,
    }

    impl StaticSource {
        fn new(value: i32) -> Arc<Self> {
            Arc::new(Self {
                value,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Refresh<i32> for StaticSource {
        fn refresh(&self) -> BoxFuture<'_, Result<i32, Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let value = self.value;
            Box::pin(async move { Ok(value) })
        }
    }

    struct FailingSource;

    impl Refresh<i32> for FailingSource {
        fn refresh(&self) -> BoxFuture<'_, Result<i32, Error>> {
            Box::pin(async { Err(ApiError::ErrorStatus(500).into()) })
        }
    }

    struct RecordingSink {
        seen: Mutex<Vec<i32>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Propagate<i32> for RecordingSink {
        fn propagate(&self, value: i32) -> BoxFuture<'_, Result<(), Error>> {
            self.seen.lock().push(value);
            Box::pin(async { Ok(()) })
        }
    }

    struct FailingSink;

    impl Propagate<i32> for FailingSink {
        fn propagate(&self, _value: i32) -> BoxFuture<'_, Result<(), Error>> {
            Box::pin(async { Err(ApiError::ErrorStatus(502).into()) })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_read_skips_refresh() {
        let source = StaticSource::new(2);
        let cell = ExpiringCell::new("test", 1, TTL).with_refresh(source.clone());

        assert_eq!(cell.read().await, 1);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_read_refreshes_once_and_rearms() {
        let source = StaticSource::new(2);
        let cell = ExpiringCell::new("test", 1, TTL).with_refresh(source.clone());

        tokio::time::advance(TTL).await;
        assert!(cell.is_expired());
        assert_eq!(cell.read().await, 2);
        assert_eq!(source.calls(), 1);

        // The TTL restarts from the refresh, not from construction.
        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(cell.read().await, 2);
        assert_eq!(source.calls(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cell.read().await, 2);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_serves_stale_value() {
        let cell = ExpiringCell::new("test", 1, TTL).with_refresh(Arc::new(FailingSource));

        tokio::time::advance(TTL).await;
        assert_eq!(cell.read().await, 1);
        // Still expired: a failed refresh does not re-arm the TTL.
        assert!(cell.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_read_without_source_serves_stale_value() {
        let cell: ExpiringCell<i32> = ExpiringCell::new("test", 7, TTL);

        tokio::time::advance(TTL * 10).await;
        assert_eq!(cell.read().await, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn write_rearms_ttl_without_refresh() {
        let source = StaticSource::new(2);
        let cell = ExpiringCell::new("test", 1, TTL).with_refresh(source.clone());

        tokio::time::advance(TTL).await;
        cell.write(5).await;
        assert_eq!(cell.read().await, 5);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn write_then_read_returns_written_value() {
        let cell = ExpiringCell::new("test", 1, TTL);
        cell.write(9).await;
        assert_eq!(cell.read().await, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn write_fires_propagate() {
        let sink = RecordingSink::new();
        let cell = ExpiringCell::new("test", 0, TTL).with_propagate(sink.clone());

        cell.write(3).await;
        cell.write(4).await;
        assert_eq!(*sink.seen.lock(), vec![3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn propagate_failure_keeps_written_value() {
        let cell = ExpiringCell::new("test", 0, TTL).with_propagate(Arc::new(FailingSink));

        cell.write(8).await;
        assert_eq!(cell.read().await, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn read_does_not_fire_propagate() {
        let sink = RecordingSink::new();
        let source = StaticSource::new(2);
        let cell = ExpiringCell::new("test", 1, TTL)
            .with_refresh(source.clone())
            .with_propagate(sink.clone());

        tokio::time::advance(TTL).await;
        assert_eq!(cell.read().await, 2);
        assert!(sink.seen.lock().is_empty());
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Debounced write dispatcher.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::cache::Propagate;
use crate::error::Error;

type Action<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

struct Request<T> {
    value: T,
    done: oneshot::Sender<()>,
}

/// Collapses bursts of calls into one underlying action.
///
/// Every dispatch restarts a quiet window. Once the window elapses with no
/// further call, the action runs exactly once with the value of the *last*
/// call; earlier values in the burst are discarded. Each caller's completion
/// future resolves only after the coalesced action has actually run.
///
/// Dropping the dispatcher while a window is pending drops the queued action
/// silently; there is no flush on teardown.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use climabridge::Debouncer;
/// use futures_util::future::BoxFuture;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let debouncer = Debouncer::new(
///     Duration::from_millis(50),
///     |value: u32| -> BoxFuture<'static, ()> {
///         Box::pin(async move {
///             println!("wrote {value}");
///         })
///     },
/// );
///
/// // Three rapid calls, one underlying write carrying 3.
/// let _ = debouncer.dispatch(1);
/// let _ = debouncer.dispatch(2);
/// debouncer.dispatch(3).await;
/// # }
/// ```
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Request<T>>,
    window: Duration,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Creates a dispatcher around `action` with the given quiet window.
    ///
    /// The action runs on a background task owned by the dispatcher; it ends
    /// when the dispatcher is dropped.
    pub fn new<A>(window: Duration, action: A) -> Self
    where
        A: Fn(T) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, window, Arc::new(action) as Action<T>));
        Self { tx, window }
    }

    /// Returns the configured quiet window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Queues `value` and restarts the quiet window.
    ///
    /// The returned future resolves once the coalesced action has run (with
    /// this value or a later one); it may be dropped by callers that do not
    /// care when the write lands.
    pub fn dispatch(&self, value: T) -> impl Future<Output = ()> + Send + 'static {
        let (done_tx, done_rx) = oneshot::channel();
        // A closed channel means the worker is gone; the write is dropped,
        // which is also what happens to a pending window at teardown.
        let _ = self.tx.send(Request {
            value,
            done: done_tx,
        });
        async move {
            let _ = done_rx.await;
        }
    }
}

async fn run<T>(mut rx: mpsc::UnboundedReceiver<Request<T>>, window: Duration, action: Action<T>) {
    while let Some(first) = rx.recv().await {
        let mut value = first.value;
        let mut waiters = vec![first.done];
        loop {
            match timeout(window, rx.recv()).await {
                // Another call inside the window: keep its value, restart
                // the window, remember the caller.
                Ok(Some(next)) => {
                    value = next.value;
                    waiters.push(next.done);
                }
                // Dispatcher dropped mid-window: the queued action is lost.
                Ok(None) => {
                    tracing::debug!("debouncer dropped with a pending write");
                    return;
                }
                // Quiet window elapsed.
                Err(_) => break,
            }
        }
        action(value).await;
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }
}

/// A debouncer is a valid propagate sink: the cell's write enqueues the
/// value and returns without waiting out the quiet window.
impl<T: Send + 'static> Propagate<T> for Debouncer<T> {
    fn propagate(&self, value: T) -> BoxFuture<'_, Result<(), Error>> {
        drop(self.dispatch(value));
        Box::pin(async { Ok(()) })
    }
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use tokio::task::yield_now;
    use tokio::time::advance;

    use super::*;

    const WINDOW: Duration = Duration::from_millis(1000);

    fn recording() -> (Arc<Mutex<Vec<u32>>>, Debouncer<u32>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer = Debouncer::new(WINDOW, move |value: u32| -> BoxFuture<'static, ()> {
            let sink = sink.clone();
            Box::pin(async move {
                sink.lock().push(value);
            })
        });
        (seen, debouncer)
    }

    #[tokio::test(start_paused = true)]
    async fn single_call_passes_through() {
        let (seen, debouncer) = recording();

        debouncer.dispatch(7).await;
        assert_eq!(*seen.lock(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_coalesces_to_last_value() {
        let (seen, debouncer) = recording();

        let first = debouncer.dispatch(1);
        let second = debouncer.dispatch(2);
        debouncer.dispatch(3).await;

        assert_eq!(*seen.lock(), vec![3]);

        // Every coalesced caller observes the same completion.
        first.await;
        second.await;
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn each_call_restarts_the_window() {
        let (seen, debouncer) = recording();

        let _first = debouncer.dispatch(1);
        yield_now().await;
        advance(Duration::from_millis(600)).await;

        let second = debouncer.dispatch(2);
        yield_now().await;
        advance(Duration::from_millis(600)).await;

        // 1200 ms after the first call, but only 600 ms after the second:
        // nothing has run yet.
        assert!(seen.lock().is_empty());

        advance(Duration::from_millis(400)).await;
        second.await;
        assert_eq!(*seen.lock(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_windows_fire_independently() {
        let (seen, debouncer) = recording();

        debouncer.dispatch(1).await;
        debouncer.dispatch(2).await;
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_mid_window_loses_pending_write() {
        let (seen, debouncer) = recording();

        let pending = debouncer.dispatch(5);
        drop(debouncer);

        // The completion resolves (the worker is gone), but the action
        // never ran.
        pending.await;
        yield_now().await;
        assert!(seen.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn propagate_returns_before_window_elapses() {
        let (seen, debouncer) = recording();

        Propagate::propagate(&debouncer, 9).await.unwrap();
        assert!(seen.lock().is_empty());

        advance(WINDOW + Duration::from_millis(1)).await;
        yield_now().await;
        assert_eq!(*seen.lock(), vec![9]);
    }
}

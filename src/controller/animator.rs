// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature convergence animator.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use crate::cache::ExpiringCell;
use crate::host::{Characteristic, UpdateRegistry};
use crate::types::Temperature;

/// Walks the current temperature toward the target, one step per tick.
///
/// The host expects a physically plausible transition, so instead of
/// snapping the current temperature to a freshly written target, the
/// animator nudges it by 0.1 each period and pushes every intermediate
/// value to the host. Reaching the target reports once more and stops.
///
/// Two states: `Idle` (no task) and `Running` (one ticking task). Starting
/// while running aborts the previous task first, so a controller never has
/// overlapping tick streams.
pub(crate) struct Animator {
    period: Duration,
    current: Arc<ExpiringCell<Temperature>>,
    target: Arc<ExpiringCell<Temperature>>,
    updates: Arc<UpdateRegistry>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Animator {
    pub(crate) fn new(
        period: Duration,
        current: Arc<ExpiringCell<Temperature>>,
        target: Arc<ExpiringCell<Temperature>>,
        updates: Arc<UpdateRegistry>,
    ) -> Self {
        Self {
            period,
            current,
            target,
            updates,
            task: Mutex::new(None),
        }
    }

    /// Starts a convergence run, cancelling any run already ticking.
    pub(crate) fn start(&self) {
        let mut slot = self.task.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = Some(tokio::spawn(converge(
            self.period,
            self.current.clone(),
            self.target.clone(),
            self.updates.clone(),
        )));
        tracing::debug!("temperature animation started");
    }

    /// Cancels the active run, if any.
    pub(crate) fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            tracing::debug!("temperature animation stopped");
        }
    }

    /// Returns `true` while a convergence run is ticking.
    pub(crate) fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

async fn converge(
    period: Duration,
    current: Arc<ExpiringCell<Temperature>>,
    target: Arc<ExpiringCell<Temperature>>,
    updates: Arc<UpdateRegistry>,
) {
    // First tick fires one full period after the start, matching the cadence
    // of the reported values to the period.
    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;

        let target_value = target.read().await;
        let current_value = current.read().await;
        let next = current_value.step_toward(target_value);
        if next != current_value {
            current.write(next).await;
        }

        let reported = current.read().await;
        tracing::debug!(temperature = %reported, "animated current temperature");
        updates.push(Characteristic::CurrentTemperature, reported.into());

        if reported == target.read().await {
            break;
        }
    }
    tracing::debug!("current temperature reached target");
}

#[cfg(test)]
mod tests {
    use tokio::task::yield_now;
    use tokio::time::advance;

    use crate::host::CharacteristicValue;

    use super::*;

    const PERIOD: Duration = Duration::from_millis(999);
    const TTL: Duration = Duration::from_secs(30);

    struct Rig {
        animator: Animator,
        current: Arc<ExpiringCell<Temperature>>,
        reported: Arc<Mutex<Vec<f64>>>,
    }

    fn rig(current: f64, target: f64) -> Rig {
        let current = Arc::new(ExpiringCell::new(
            "current_temperature",
            Temperature::from_celsius(current),
            TTL,
        ));
        let target = Arc::new(ExpiringCell::new(
            "target_temperature",
            Temperature::from_celsius(target),
            TTL,
        ));
        let updates = Arc::new(UpdateRegistry::new());

        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = reported.clone();
        updates.on_update(move |characteristic, value| {
            assert_eq!(characteristic, Characteristic::CurrentTemperature);
            if let CharacteristicValue::Temperature(t) = value {
                sink.lock().push(t.celsius());
            }
        });

        Rig {
            animator: Animator::new(PERIOD, current.clone(), target, updates),
            current,
            reported,
        }
    }

    async fn run_ticks(count: u32) {
        for _ in 0..count {
            advance(PERIOD).await;
            yield_now().await;
            yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn converges_upward_without_overshoot() {
        let rig = rig(22.0, 22.3);
        rig.animator.start();

        run_ticks(3).await;
        assert_eq!(*rig.reported.lock(), vec![22.1, 22.2, 22.3]);
        assert_eq!(rig.current.read().await, Temperature::from_celsius(22.3));
        assert!(!rig.animator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn converges_downward() {
        let rig = rig(22.3, 22.0);
        rig.animator.start();

        run_ticks(3).await;
        assert_eq!(*rig.reported.lock(), vec![22.2, 22.1, 22.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_reaching_target() {
        let rig = rig(22.0, 22.1);
        rig.animator.start();

        run_ticks(5).await;
        assert_eq!(*rig.reported.lock(), vec![22.1]);
    }

    #[tokio::test(start_paused = true)]
    async fn equal_values_report_once_then_stop() {
        let rig = rig(25.0, 25.0);
        rig.animator.start();
        assert!(rig.animator.is_running());

        run_ticks(2).await;
        assert_eq!(*rig.reported.lock(), vec![25.0]);
        assert!(!rig.animator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_previous_run() {
        let rig = rig(22.0, 22.2);
        rig.animator.start();
        rig.animator.start();

        run_ticks(4).await;
        // One tick stream, not two interleaved ones.
        assert_eq!(*rig.reported.lock(), vec![22.1, 22.2]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_mid_run() {
        let rig = rig(22.0, 23.0);
        rig.animator.start();

        run_ticks(2).await;
        rig.animator.stop();
        assert!(!rig.animator.is_running());

        run_ticks(3).await;
        assert_eq!(*rig.reported.lock(), vec![22.1, 22.2]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_idle_is_a_no_op() {
        let rig = rig(22.0, 22.0);
        rig.animator.stop();
        assert!(!rig.animator.is_running());
        assert!(rig.reported.lock().is_empty());
    }
}

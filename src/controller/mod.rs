// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State controller for the climate accessory.
//!
//! The controller owns five attribute cells and reconciles two worlds: the
//! host expects synchronous-looking get/set handlers, the device sits behind
//! a slow and flaky HTTP API. Reads come from the TTL cache and only pull
//! from the device when stale; writes land in the cache immediately and
//! reach the device through a debounced dispatcher, so dragging a slider
//! produces one remote call instead of dozens. The current temperature is
//! never set remotely at all - a periodic animator walks it toward the
//! target so the host sees a physically plausible transition.
//!
//! The state graph is fixed:
//!
//! | cell                | refresh                  | propagate            |
//! |---------------------|--------------------------|----------------------|
//! | power               | -                        | debounced power PUT  |
//! | target temperature  | remote GET               | debounced temp PUT   |
//! | current temperature | mirrors target           | -                    |
//! | target mode         | remote GET               | debounced mode PUT   |
//! | current mode        | mirrors target / aliased | -                    |

mod animator;
mod sources;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;

use crate::cache::{Debouncer, ExpiringCell};
use crate::error::{Result, ValueError};
use crate::host::{Characteristic, CharacteristicValue, SubscriptionId, UpdateRegistry};
use crate::remote::ApiConfig;
use crate::types::{Mode, Temperature};

use animator::Animator;
use sources::{MirrorSource, RemoteModeSource, RemoteTemperatureSource};

/// Time-to-live of every attribute cell.
pub const CACHE_TTL: Duration = Duration::from_secs(30);

/// Quiet window of the debounced remote write paths.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(1000);

/// Tick period of the temperature animator.
pub const ANIMATION_PERIOD: Duration = Duration::from_millis(999);

const SEED_POWER: bool = false;
const SEED_TEMPERATURE: f64 = 22.0;
const SEED_MODE: Mode = Mode::Cool;

/// How the current-mode attribute resolves reads.
///
/// The accessory treats a mode change as instantaneous: once the host sets
/// a target mode, the current mode *is* the target mode, permanently. The
/// aliasing is modelled as an explicit binding state instead of swapping
/// cell references around, so it can be inspected and tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrentModeBinding {
    /// Reads go to the current-mode cell (which mirrors the target lazily).
    Mirror,
    /// Reads go straight to the target-mode cell.
    Target,
}

/// Builder for [`Controller`].
///
/// The timing parameters exist for tests and unusual deployments; the
/// defaults match the accessory's documented behavior.
#[derive(Debug)]
pub struct ControllerBuilder {
    config: ApiConfig,
    cache_ttl: Duration,
    debounce_window: Duration,
    animation_period: Duration,
}

impl ControllerBuilder {
    fn new(config: ApiConfig) -> Self {
        Self {
            config,
            cache_ttl: CACHE_TTL,
            debounce_window: DEBOUNCE_WINDOW,
            animation_period: ANIMATION_PERIOD,
        }
    }

    /// Overrides the cell time-to-live.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Overrides the debounce quiet window.
    #[must_use]
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Overrides the animator tick period.
    #[must_use]
    pub fn with_animation_period(mut self, period: Duration) -> Self {
        self.animation_period = period;
        self
    }

    /// Builds the controller and wires the state graph.
    ///
    /// Must be called within a tokio runtime: the debounced write paths
    /// spawn their worker tasks here.
    ///
    /// # Errors
    ///
    /// Returns error if the device client cannot be built from the
    /// configuration.
    pub fn build(self) -> Result<Controller> {
        let client = Arc::new(self.config.into_client()?);
        let updates = Arc::new(UpdateRegistry::new());

        let power_writes = {
            let client = client.clone();
            Debouncer::new(
                self.debounce_window,
                move |on: bool| -> BoxFuture<'static, ()> {
                    let client = client.clone();
                    Box::pin(async move { client.set_power(on).await })
                },
            )
        };
        let temperature_writes = {
            let client = client.clone();
            Debouncer::new(
                self.debounce_window,
                move |temperature: Temperature| -> BoxFuture<'static, ()> {
                    let client = client.clone();
                    Box::pin(async move { client.set_temperature(temperature).await })
                },
            )
        };
        let mode_writes = {
            let client = client.clone();
            Debouncer::new(
                self.debounce_window,
                move |mode: Mode| -> BoxFuture<'static, ()> {
                    let client = client.clone();
                    Box::pin(async move { client.set_mode(mode).await })
                },
            )
        };

        let power = Arc::new(
            ExpiringCell::new("power", SEED_POWER, self.cache_ttl)
                .with_propagate(Arc::new(power_writes)),
        );
        let target_temperature = Arc::new(
            ExpiringCell::new(
                "target_temperature",
                Temperature::from_celsius(SEED_TEMPERATURE),
                self.cache_ttl,
            )
            .with_refresh(Arc::new(RemoteTemperatureSource {
                client: client.clone(),
            }))
            .with_propagate(Arc::new(temperature_writes)),
        );
        let current_temperature = Arc::new(
            ExpiringCell::new(
                "current_temperature",
                Temperature::from_celsius(SEED_TEMPERATURE),
                self.cache_ttl,
            )
            .with_refresh(Arc::new(MirrorSource {
                target: target_temperature.clone(),
            })),
        );
        let target_mode = Arc::new(
            ExpiringCell::new("target_mode", SEED_MODE, self.cache_ttl)
                .with_refresh(Arc::new(RemoteModeSource {
                    client: client.clone(),
                }))
                .with_propagate(Arc::new(mode_writes)),
        );
        let current_mode = Arc::new(
            ExpiringCell::new("current_mode", SEED_MODE, self.cache_ttl).with_refresh(Arc::new(
                MirrorSource {
                    target: target_mode.clone(),
                },
            )),
        );

        let animator = Animator::new(
            self.animation_period,
            current_temperature.clone(),
            target_temperature.clone(),
            updates.clone(),
        );

        Ok(Controller {
            power,
            current_temperature,
            target_temperature,
            current_mode,
            target_mode,
            current_mode_binding: Mutex::new(CurrentModeBinding::Mirror),
            animator,
            updates,
        })
    }
}

/// Binds the attribute cells to the host's get/set surface.
///
/// One controller instance exists per physical accessory; the cells are
/// private to it and all reconciliation runs on its cooperative task set.
///
/// # Examples
///
/// ```no_run
/// use climabridge::{ApiConfig, Controller, Mode, Temperature};
///
/// #[tokio::main]
/// async fn main() -> climabridge::Result<()> {
///     let config = ApiConfig::new("http://192.168.1.40:8080", "secret-key");
///     let controller = Controller::builder(config).build()?;
///
///     controller.on_update(|characteristic, value| {
///         println!("push {characteristic} -> {value}");
///     });
///
///     controller.set_target_mode(Mode::Cool).await;
///     controller
///         .set_target_temperature(Temperature::from_celsius(23.5))
///         .await;
///     Ok(())
/// }
/// ```
pub struct Controller {
    power: Arc<ExpiringCell<bool>>,
    current_temperature: Arc<ExpiringCell<Temperature>>,
    target_temperature: Arc<ExpiringCell<Temperature>>,
    current_mode: Arc<ExpiringCell<Mode>>,
    target_mode: Arc<ExpiringCell<Mode>>,
    current_mode_binding: Mutex<CurrentModeBinding>,
    animator: Animator,
    updates: Arc<UpdateRegistry>,
}

impl Controller {
    /// Starts building a controller for the device behind `config`.
    #[must_use]
    pub fn builder(config: ApiConfig) -> ControllerBuilder {
        ControllerBuilder::new(config)
    }

    // ========== Host get handlers ==========

    /// Handles a host get of the power characteristic.
    pub async fn power(&self) -> bool {
        tracing::debug!("GET power");
        self.power.read().await
    }

    /// Handles a host get of the current temperature.
    pub async fn current_temperature(&self) -> Temperature {
        tracing::debug!("GET current temperature");
        self.current_temperature.read().await
    }

    /// Handles a host get of the target temperature.
    pub async fn target_temperature(&self) -> Temperature {
        tracing::debug!("GET target temperature");
        self.target_temperature.read().await
    }

    /// Handles a host get of the current mode.
    pub async fn current_mode(&self) -> Mode {
        tracing::debug!("GET current mode");
        let binding = *self.current_mode_binding.lock();
        match binding {
            CurrentModeBinding::Mirror => self.current_mode.read().await,
            CurrentModeBinding::Target => self.target_mode.read().await,
        }
    }

    /// Handles a host get of the target mode.
    pub async fn target_mode(&self) -> Mode {
        tracing::debug!("GET target mode");
        self.target_mode.read().await
    }

    // ========== Host set handlers ==========

    /// Handles a host set of the power characteristic.
    ///
    /// Power writes never start or stop the animator.
    pub async fn set_power(&self, on: bool) {
        tracing::info!(on, "SET power");
        self.power.write(on).await;
    }

    /// Handles a host set of the target temperature.
    ///
    /// The new target is cached immediately and pushed to the device after
    /// the debounce window; the animator restarts unconditionally so the
    /// current temperature starts walking toward the new target.
    pub async fn set_target_temperature(&self, value: Temperature) {
        tracing::info!(%value, "SET target temperature");
        self.target_temperature.write(value).await;

        let confirmed = self.target_temperature.read().await;
        self.updates
            .push(Characteristic::TargetTemperature, confirmed.into());

        self.animator.start();
    }

    /// Handles a host set of the target mode.
    ///
    /// Mode transitions are treated as instantaneous: the current mode is
    /// aliased to the target from here on. OFF forces power off and cancels
    /// a running animation; any other mode forces power on. Both outcomes
    /// are pushed to the host, and the animator is (re)started either way.
    pub async fn set_target_mode(&self, mode: Mode) {
        tracing::info!(%mode, "SET target mode");
        self.target_mode.write(mode).await;
        *self.current_mode_binding.lock() = CurrentModeBinding::Target;

        let confirmed = self.target_mode.read().await;
        self.updates
            .push(Characteristic::TargetMode, confirmed.into());

        if confirmed == Mode::Off {
            self.power.write(false).await;
            self.animator.stop();
        } else {
            self.power.write(true).await;
        }
        self.updates
            .push(Characteristic::Power, self.power.read().await.into());

        self.animator.start();
    }

    // ========== Generic host binding ==========

    /// Reads any characteristic, for host adapters that bind generically.
    pub async fn get(&self, characteristic: Characteristic) -> CharacteristicValue {
        match characteristic {
            Characteristic::Power => self.power().await.into(),
            Characteristic::CurrentTemperature => self.current_temperature().await.into(),
            Characteristic::TargetTemperature => self.target_temperature().await.into(),
            Characteristic::CurrentMode => self.current_mode().await.into(),
            Characteristic::TargetMode => self.target_mode().await.into(),
        }
    }

    /// Writes a settable characteristic, for host adapters that bind
    /// generically.
    ///
    /// # Errors
    ///
    /// Returns error if the characteristic is read-only or the value kind
    /// does not match.
    pub async fn set(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<()> {
        match (characteristic, value) {
            (Characteristic::Power, CharacteristicValue::Power(on)) => {
                self.set_power(on).await;
                Ok(())
            }
            (Characteristic::TargetTemperature, CharacteristicValue::Temperature(t)) => {
                self.set_target_temperature(t).await;
                Ok(())
            }
            (Characteristic::TargetMode, CharacteristicValue::Mode(mode)) => {
                self.set_target_mode(mode).await;
                Ok(())
            }
            (Characteristic::CurrentTemperature | Characteristic::CurrentMode, _) => {
                Err(ValueError::ReadOnly(characteristic.name()).into())
            }
            (characteristic, _) => Err(ValueError::Mismatch {
                characteristic: characteristic.name(),
                expected: characteristic.value_kind(),
            }
            .into()),
        }
    }

    // ========== Out-of-band updates ==========

    /// Registers a callback for values the controller changes out-of-band.
    pub fn on_update<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Characteristic, CharacteristicValue) + Send + Sync + 'static,
    {
        self.updates.on_update(callback)
    }

    /// Unregisters an update callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.updates.unsubscribe(id)
    }

    // ========== Introspection ==========

    /// Returns `true` while the temperature animator is ticking.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    /// Returns `true` once the current mode has been aliased to the target
    /// mode by a host mode write.
    #[must_use]
    pub fn current_mode_is_aliased(&self) -> bool {
        *self.current_mode_binding.lock() == CurrentModeBinding::Target
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("animating", &self.is_animating())
            .field("current_mode_aliased", &self.current_mode_is_aliased())
            .finish_non_exhaustive()
    }
}

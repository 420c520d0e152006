// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `climabridge` - bridge a remote climate-control device to a
//! home-automation host.
//!
//! The host wants five attributes (power, current/target temperature,
//! current/target mode) behind synchronous-looking get/set handlers. The
//! real device sits behind a slow, flaky HTTP API. This library reconciles
//! the two:
//!
//! - **TTL cache**: every attribute lives in an
//!   [`ExpiringCell`] - reads are served from cache and only pull from the
//!   device once the 30 s TTL has elapsed; a failed pull serves the last
//!   known value instead of an error.
//! - **Debounced writes**: host writes land in the cache immediately and
//!   reach the device through a [`Debouncer`], so a user dragging a
//!   temperature slider produces one remote call carrying the final value.
//! - **Derived attributes**: the current temperature and mode never touch
//!   the device; they mirror their target counterparts, and a periodic
//!   animator walks the current temperature toward the target in 0.1 steps
//!   so the host sees a physically plausible transition.
//! - **Fail-soft remote client**: the [`DeviceClient`] substitutes
//!   documented defaults (mode OFF, 16.0) when the device misbehaves;
//!   the host never sees an error, only values.
//!
//! # Quick Start
//!
//! ```no_run
//! use climabridge::{ApiConfig, Controller, Mode, Temperature};
//!
//! #[tokio::main]
//! async fn main() -> climabridge::Result<()> {
//!     let config = ApiConfig::new("http://192.168.1.40:8080", "secret-key");
//!     let controller = Controller::builder(config).build()?;
//!
//!     // Out-of-band pushes: animation ticks, derived power/mode changes.
//!     controller.on_update(|characteristic, value| {
//!         println!("{characteristic} -> {value}");
//!     });
//!
//!     // Host-initiated sets: cached immediately, debounced to the device.
//!     controller.set_target_mode(Mode::Cool).await;
//!     controller
//!         .set_target_temperature(Temperature::from_celsius(23.5))
//!         .await;
//!
//!     // Host-initiated gets: served from cache.
//!     let current = controller.current_temperature().await;
//!     println!("currently {current}");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod controller;
pub mod error;
pub mod host;
pub mod remote;
pub mod types;

pub use cache::{Debouncer, ExpiringCell, Propagate, Refresh};
pub use controller::{Controller, ControllerBuilder};
pub use error::{ApiError, Error, Result, ValueError};
pub use host::{
    Characteristic, CharacteristicProps, CharacteristicValue, SubscriptionId, UpdateRegistry,
};
pub use remote::{ApiConfig, DeviceClient};
pub use types::{Mode, Temperature, TemperatureRange, VendorMode};

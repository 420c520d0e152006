// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Refresh sources wired into the attribute cells.
//!
//! The target cells pull from the remote device; the current cells mirror
//! their target counterpart and never touch the device themselves. The
//! remote pulls go through the client's defaulting getters, so a refresh
//! here cannot fail; the cell's stale-value fallback only engages for
//! sources that can (exercised in the cell's own tests).

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::cache::{ExpiringCell, Refresh};
use crate::error::Error;
use crate::remote::DeviceClient;
use crate::types::{Mode, Temperature};

/// Pulls the target mode from the remote device.
pub(crate) struct RemoteModeSource {
    pub(crate) client: Arc<DeviceClient>,
}

impl Refresh<Mode> for RemoteModeSource {
    fn refresh(&self) -> BoxFuture<'_, Result<Mode, Error>> {
        Box::pin(async move { Ok(self.client.mode().await) })
    }
}

/// Pulls the target temperature from the remote device.
pub(crate) struct RemoteTemperatureSource {
    pub(crate) client: Arc<DeviceClient>,
}

impl Refresh<Temperature> for RemoteTemperatureSource {
    fn refresh(&self) -> BoxFuture<'_, Result<Temperature, Error>> {
        Box::pin(async move { Ok(self.client.temperature().await) })
    }
}

/// Mirrors another cell's value.
///
/// Reading through the mirror may refresh the mirrored cell itself if that
/// one has expired, so a stale current attribute transitively pulls its
/// target from the device.
pub(crate) struct MirrorSource<T> {
    pub(crate) target: Arc<ExpiringCell<T>>,
}

impl<T: Clone + Send + Sync + 'static> Refresh<T> for MirrorSource<T> {
    fn refresh(&self) -> BoxFuture<'_, Result<T, Error>> {
        Box::pin(async move { Ok(self.target.read().await) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn mirror_reads_target_cell() {
        let target = Arc::new(ExpiringCell::new(
            "target",
            Temperature::from_celsius(24.0),
            Duration::from_secs(30),
        ));
        let mirror = MirrorSource {
            target: target.clone(),
        };

        let value = mirror.refresh().await.unwrap();
        assert_eq!(value, Temperature::from_celsius(24.0));

        target.write(Temperature::from_celsius(26.5)).await;
        let value = mirror.refresh().await.unwrap();
        assert_eq!(value, Temperature::from_celsius(26.5));
    }
}

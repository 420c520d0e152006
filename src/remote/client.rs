// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the remote climate device.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ValueError};
use crate::types::{Mode, Temperature};

/// Body shape shared by every endpoint: `{"value": ...}`.
#[derive(Debug, Serialize)]
struct SetPayload<T: Serialize> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct GetPayload {
    value: serde_json::Value,
}

/// Coerces a payload value the way the device actually sends it: some
/// firmware revisions answer with numbers, some with numeric strings.
fn numeric(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Client for the climate device's JSON API.
///
/// Build one from an [`ApiConfig`](crate::remote::ApiConfig). The `try_*`
/// operations surface the real failure; their infallible counterparts are
/// what the cache layer wires in, substituting the documented safe defaults
/// (mode OFF, temperature 16.0) and logging the error. A host watching the
/// accessory therefore sees values quietly revert to defaults during an
/// outage rather than an error.
///
/// Mode ordinals travel over the wire in the host's encoding; see
/// [`VendorMode`](crate::types::VendorMode) for the device's own table.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: String,
}

impl DeviceClient {
    const MODE_PATH: &'static str = "/ac/mode";
    const TEMPERATURE_PATH: &'static str = "/ac/temperature";
    const POWER_PATH: &'static str = "/ac/power";

    pub(crate) fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Returns the base URL of the device API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch_value(&self, path: &str) -> Result<f64, ApiError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "fetching device value");

        let response = self.http.get(&url).send().await.map_err(ApiError::Http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ErrorStatus(status.as_u16()));
        }

        let payload: GetPayload = response.json().await.map_err(ApiError::Http)?;
        numeric(&payload.value).ok_or_else(|| ApiError::UnexpectedPayload(payload.value.to_string()))
    }

    async fn put_value<T: Serialize>(&self, path: &str, value: T) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "writing device value");

        let response = self
            .http
            .put(&url)
            .json(&SetPayload { value })
            .send()
            .await
            .map_err(ApiError::Http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ErrorStatus(status.as_u16()));
        }
        Ok(())
    }

    /// Reads the device's current mode.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status, or an
    /// ordinal outside 0-3.
    pub async fn try_mode(&self) -> Result<Mode, ApiError> {
        let raw = self.fetch_value(Self::MODE_PATH).await?;
        if !(0.0..=3.0).contains(&raw) {
            return Err(ValueError::OutOfRange {
                min: 0.0,
                max: 3.0,
                actual: raw,
            }
            .into());
        }
        // In range, so the cast is lossless for the integral ordinals the
        // device sends.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ordinal = raw as u8;
        Ok(Mode::from_num(ordinal)?)
    }

    /// Reads the device's current mode, substituting OFF on any failure.
    pub async fn mode(&self) -> Mode {
        match self.try_mode().await {
            Ok(mode) => {
                tracing::debug!(%mode, "fetched device mode");
                mode
            }
            Err(err) => {
                tracing::warn!(error = %err, "mode fetch failed, substituting OFF");
                Mode::Off
            }
        }
    }

    /// Writes the target mode.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-success status.
    pub async fn try_set_mode(&self, mode: Mode) -> Result<(), ApiError> {
        self.put_value(Self::MODE_PATH, mode.as_num()).await
    }

    /// Writes the target mode, logging and swallowing any failure.
    pub async fn set_mode(&self, mode: Mode) {
        match self.try_set_mode(mode).await {
            Ok(()) => tracing::info!(%mode, "device mode written"),
            Err(err) => tracing::warn!(%mode, error = %err, "mode write failed"),
        }
    }

    /// Reads the device's target temperature.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status, or a value
    /// outside the device range (16-30).
    pub async fn try_temperature(&self) -> Result<Temperature, ApiError> {
        let raw = self.fetch_value(Self::TEMPERATURE_PATH).await?;
        Temperature::REMOTE_RANGE.check(raw)?;
        Ok(Temperature::from_celsius(raw))
    }

    /// Reads the device's target temperature, substituting 16.0 on any
    /// failure.
    pub async fn temperature(&self) -> Temperature {
        match self.try_temperature().await {
            Ok(temperature) => {
                tracing::debug!(%temperature, "fetched device temperature");
                temperature
            }
            Err(err) => {
                tracing::warn!(error = %err, "temperature fetch failed, substituting 16.0");
                Temperature::REMOTE_DEFAULT
            }
        }
    }

    /// Writes the target temperature.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-success status.
    pub async fn try_set_temperature(&self, temperature: Temperature) -> Result<(), ApiError> {
        self.put_value(Self::TEMPERATURE_PATH, temperature.celsius())
            .await
    }

    /// Writes the target temperature, logging and swallowing any failure.
    pub async fn set_temperature(&self, temperature: Temperature) {
        match self.try_set_temperature(temperature).await {
            Ok(()) => tracing::info!(%temperature, "device temperature written"),
            Err(err) => tracing::warn!(%temperature, error = %err, "temperature write failed"),
        }
    }

    /// Writes the power state, encoded as `"on"` / `"off"`.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-success status.
    pub async fn try_set_power(&self, on: bool) -> Result<(), ApiError> {
        self.put_value(Self::POWER_PATH, if on { "on" } else { "off" })
            .await
    }

    /// Writes the power state, logging and swallowing any failure.
    pub async fn set_power(&self, on: bool) {
        match self.try_set_power(on).await {
            Ok(()) => tracing::info!(on, "device power written"),
            Err(err) => tracing::warn!(on, error = %err, "power write failed"),
        }
    }
}

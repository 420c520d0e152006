// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the remote device API.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use crate::error::ApiError;
use crate::remote::DeviceClient;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

fn default_timeout() -> Duration {
    ApiConfig::DEFAULT_TIMEOUT
}

/// Connection parameters for the remote climate device.
///
/// Deserializes directly from the accessory configuration block, which uses
/// the `baseURLApi` and `apiKey` keys; the request timeout is not part of
/// the configuration surface and defaults to 5 seconds.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use climabridge::ApiConfig;
///
/// let config = ApiConfig::new("http://192.168.1.40:8080", "secret")
///     .with_timeout(Duration::from_secs(2));
/// let client = config.into_client().unwrap();
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(rename = "baseURLApi")]
    base_url: String,
    #[serde(rename = "apiKey")]
    api_key: String,
    #[serde(skip, default = "default_timeout")]
    timeout: Duration,
}

impl ApiConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration for the given base URL and API key.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL of the device API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the API key sent with every request.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates a [`DeviceClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the API key cannot be carried in a header or the
    /// HTTP client cannot be created.
    pub fn into_client(self) -> Result<DeviceClient, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let api_key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            ApiError::InvalidConfiguration("API key is not a valid header value".to_string())
        })?;
        headers.insert(API_KEY_HEADER, api_key);

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(ApiError::Http)?;

        let base_url = self.base_url.trim_end_matches('/').to_string();
        Ok(DeviceClient::new(http, base_url))
    }
}

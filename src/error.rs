// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `climabridge` library.
//!
//! Failures are grouped into value validation ([`ValueError`]) and remote
//! device communication ([`ApiError`]). Neither ever reaches the
//! home-automation host: the accessory contract is that every host-facing
//! get/set succeeds with a cached or default value, so errors terminate in
//! logs at the layer that owns the fallback. The types here exist so that
//! layer has something better than a boolean to log.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the remote device.
    #[error("api error: {0}")]
    Api(#[from] ApiError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
        /// The actual value that was provided.
        actual: f64,
    },

    /// An ordinal that does not map to a climate mode.
    #[error("invalid mode ordinal: {0}")]
    InvalidMode(u8),

    /// A string that does not name a climate mode.
    #[error("invalid mode name: {0}")]
    InvalidModeName(String),

    /// An ordinal that does not map to a vendor mode.
    #[error("invalid vendor mode ordinal: {0}")]
    InvalidVendorMode(u8),

    /// A set was attempted on a characteristic the host may only read.
    #[error("characteristic {0} is read-only")]
    ReadOnly(&'static str),

    /// A characteristic was written with a value of the wrong kind.
    #[error("characteristic {characteristic} expects a {expected} value")]
    Mismatch {
        /// The characteristic that was written.
        characteristic: &'static str,
        /// The value kind the characteristic carries.
        expected: &'static str,
    },
}

/// Errors related to remote device communication.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered with a non-success status code.
    #[error("device returned HTTP {0}")]
    ErrorStatus(u16),

    /// The response body did not carry a usable value.
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),

    /// The response carried a value outside the documented domain.
    #[error("invalid value from device: {0}")]
    Value(#[from] ValueError),

    /// The client configuration cannot be turned into an HTTP client.
    #[error("invalid client configuration: {0}")]
    InvalidConfiguration(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote device communication.
//!
//! The physical climate device sits behind a small JSON-over-HTTP API,
//! authenticated with an `X-Api-Key` header. [`ApiConfig`] holds the
//! connection parameters (usually taken verbatim from the accessory
//! configuration) and [`DeviceClient`] performs the requests.
//!
//! The client has two faces: fallible `try_*` operations for callers that
//! want the real error, and infallible wrappers that substitute documented
//! safe defaults (OFF, 16.0) so the cache layer never has to care whether
//! the device was reachable.

mod client;
mod config;

pub use client::DeviceClient;
pub use config::ApiConfig;

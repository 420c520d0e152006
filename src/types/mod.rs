// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for climate-control attributes.
//!
//! This module provides type-safe representations of the values flowing
//! between the host, the cache layer, and the remote device:
//!
//! - [`Mode`] - The four-value heating/cooling mode the host speaks
//! - [`VendorMode`] - The physical device's own mode enumeration
//! - [`Temperature`] - Decimal Celsius with one-decimal precision
//! - [`TemperatureRange`] - Inclusive range used for validation

mod mode;
mod temperature;

pub use mode::{Mode, VendorMode};
pub use temperature::{Temperature, TemperatureRange};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Caching primitives that hide remote latency behind cheap reads.
//!
//! - [`ExpiringCell`]: one cached attribute with a time-to-live, lazily
//!   refreshed from a [`Refresh`] source and pushed outward through a
//!   [`Propagate`] sink.
//! - [`Debouncer`]: collapses bursts of writes into a single remote call
//!   carrying the last value of the burst.
//!
//! Neither primitive ever raises an error to its caller; failures are logged
//! and absorbed here so the host-facing surface stays infallible.

mod cell;
mod debounce;

pub use cell::{ExpiringCell, Propagate, Refresh};
pub use debounce::Debouncer;

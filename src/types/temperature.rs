// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature type with one-decimal Celsius precision.
//!
//! Two ranges apply to the same attribute: the host-facing characteristics
//! advertise [`Temperature::HOST_RANGE`] (20-30), while the remote device
//! accepts and reports [`Temperature::REMOTE_RANGE`] (16-30). Both are kept
//! literally; nothing in this crate clamps one into the other.

use std::fmt;

use crate::error::ValueError;

/// Temperature in degrees Celsius, stored rounded to one decimal.
///
/// All construction paths round to a tenth of a degree, so equality
/// comparisons between stepped and parsed values behave predictably.
///
/// # Examples
///
/// ```
/// use climabridge::Temperature;
///
/// let t = Temperature::from_celsius(22.04);
/// assert_eq!(t, Temperature::from_celsius(22.0));
/// assert_eq!(t.step_toward(Temperature::from_celsius(22.3)).celsius(), 22.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature(f64);

impl Temperature {
    /// Increment applied per animation tick, in degrees Celsius.
    pub const STEP: f64 = 0.1;

    /// Value substituted when the remote device fails or misbehaves.
    pub const REMOTE_DEFAULT: Self = Self(16.0);

    /// Range advertised to the home-automation host.
    pub const HOST_RANGE: TemperatureRange = TemperatureRange::new(20.0, 30.0);

    /// Range accepted by and validated against the remote device.
    pub const REMOTE_RANGE: TemperatureRange = TemperatureRange::new(16.0, 30.0);

    /// Creates a temperature, rounding to one decimal.
    #[must_use]
    pub fn from_celsius(value: f64) -> Self {
        Self(round_tenth(value))
    }

    /// Returns the value in degrees Celsius.
    #[must_use]
    pub const fn celsius(self) -> f64 {
        self.0
    }

    /// Moves one [`STEP`](Self::STEP) toward `target`.
    ///
    /// Returns `self` unchanged when the two are already equal. The result
    /// is rounded to one decimal, so repeated stepping lands exactly on a
    /// tenth-aligned target instead of drifting past it.
    #[must_use]
    pub fn step_toward(self, target: Self) -> Self {
        if self > target {
            Self(round_tenth(self.0 - Self::STEP))
        } else if self < target {
            Self(round_tenth(self.0 + Self::STEP))
        } else {
            self
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Inclusive temperature range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    min: f64,
    max: f64,
}

impl TemperatureRange {
    /// Creates a range from inclusive bounds.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Lower bound in degrees Celsius.
    #[must_use]
    pub const fn min(self) -> f64 {
        self.min
    }

    /// Upper bound in degrees Celsius.
    #[must_use]
    pub const fn max(self) -> f64 {
        self.max
    }

    /// Returns `true` when `value` lies inside the range.
    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Validates `value` against the range.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` when the value lies outside.
    pub fn check(self, value: f64) -> Result<(), ValueError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(ValueError::OutOfRange {
                min: self.min,
                max: self.max,
                actual: value,
            })
        }
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heating/cooling mode types.
//!
//! Two enumerations exist for the same concept: [`Mode`] is the four-value
//! ordinal the home-automation host speaks, [`VendorMode`] is the physical
//! device's own enumeration. The wire layer currently sends host ordinals
//! untranslated, matching the device firmware's observed tolerance; the
//! conversions below stay available for the day the vendor mapping is
//! confirmed to be required.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Heating/cooling mode as exposed to the home-automation host.
///
/// Ordinal-encoded: OFF=0, HEAT=1, COOL=2, AUTO=3.
///
/// # Examples
///
/// ```
/// use climabridge::Mode;
///
/// assert_eq!(Mode::Cool.as_num(), 2);
/// assert_eq!(Mode::from_num(1).unwrap(), Mode::Heat);
/// assert!(Mode::from_num(4).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The accessory is off.
    Off,
    /// Heating toward the target temperature.
    Heat,
    /// Cooling toward the target temperature.
    Cool,
    /// The device picks heating or cooling itself.
    Auto,
}

impl Mode {
    /// Returns the ordinal used by the host and, today, by the wire layer.
    #[must_use]
    pub const fn as_num(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Heat => 1,
            Self::Cool => 2,
            Self::Auto => 3,
        }
    }

    /// Parses a host ordinal.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidMode` for ordinals outside 0-3.
    pub const fn from_num(value: u8) -> Result<Self, ValueError> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::Heat),
            2 => Ok(Self::Cool),
            3 => Ok(Self::Auto),
            other => Err(ValueError::InvalidMode(other)),
        }
    }

    /// Returns the uppercase name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Heat => "HEAT",
            Self::Cool => "COOL",
            Self::Auto => "AUTO",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<u8> for Mode {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_num(value)
    }
}

impl FromStr for Mode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OFF" | "0" => Ok(Self::Off),
            "HEAT" | "1" => Ok(Self::Heat),
            "COOL" | "2" => Ok(Self::Cool),
            "AUTO" | "3" => Ok(Self::Auto),
            _ => Err(ValueError::InvalidModeName(s.to_string())),
        }
    }
}

/// Mode enumeration as the physical device defines it.
///
/// The ordinals differ from [`Mode`] and include two states the host has no
/// characteristic for (DRY and FAN). Nothing in the request path performs
/// this translation yet; see the module documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorMode {
    /// Device-selected heating or cooling.
    Auto,
    /// Cooling.
    Cool,
    /// Dehumidify.
    Dry,
    /// Heating.
    Heat,
    /// Fan only.
    Fan,
    /// Standby.
    Off,
}

impl VendorMode {
    /// Returns the ordinal from the vendor's protocol documentation.
    #[must_use]
    pub const fn as_num(self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Cool => 1,
            Self::Dry => 2,
            Self::Heat => 3,
            Self::Fan => 4,
            Self::Off => 7,
        }
    }

    /// Parses a vendor ordinal.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidVendorMode` for unknown ordinals.
    pub const fn from_num(value: u8) -> Result<Self, ValueError> {
        match value {
            0 => Ok(Self::Auto),
            1 => Ok(Self::Cool),
            2 => Ok(Self::Dry),
            3 => Ok(Self::Heat),
            4 => Ok(Self::Fan),
            7 => Ok(Self::Off),
            other => Err(ValueError::InvalidVendorMode(other)),
        }
    }

    /// Returns the host-side mode this vendor mode corresponds to.
    ///
    /// DRY and FAN have no host equivalent and map to `None`.
    #[must_use]
    pub const fn host_mode(self) -> Option<Mode> {
        match self {
            Self::Auto => Some(Mode::Auto),
            Self::Cool => Some(Mode::Cool),
            Self::Heat => Some(Mode::Heat),
            Self::Off => Some(Mode::Off),
            Self::Dry | Self::Fan => None,
        }
    }
}

impl From<Mode> for VendorMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Off => Self::Off,
            Mode::Heat => Self::Heat,
            Mode::Cool => Self::Cool,
            Mode::Auto => Self::Auto,
        }
    }
}

impl fmt::Display for VendorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "AUTO",
            Self::Cool => "COOL",
            Self::Dry => "DRY",
            Self::Heat => "HEAT",
            Self::Fan => "FAN",
            Self::Off => "OFF",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_ordinals_round_trip() {
        for ordinal in 0..=3u8 {
            let mode = Mode::from_num(ordinal).unwrap();
            assert_eq!(mode.as_num(), ordinal);
        }
    }

    #[test]
    fn mode_invalid_ordinal() {
        assert_eq!(Mode::from_num(4), Err(ValueError::InvalidMode(4)));
        assert!(Mode::try_from(200u8).is_err());
    }

    #[test]
    fn mode_display() {
        assert_eq!(Mode::Off.to_string(), "OFF");
        assert_eq!(Mode::Auto.to_string(), "AUTO");
    }

    #[test]
    fn mode_from_str() {
        assert_eq!("cool".parse::<Mode>().unwrap(), Mode::Cool);
        assert_eq!("1".parse::<Mode>().unwrap(), Mode::Heat);
        assert!("dry".parse::<Mode>().is_err());
    }

    #[test]
    fn vendor_ordinals_round_trip() {
        for ordinal in [0u8, 1, 2, 3, 4, 7] {
            let mode = VendorMode::from_num(ordinal).unwrap();
            assert_eq!(mode.as_num(), ordinal);
        }
    }

    #[test]
    fn vendor_ordinal_gaps_rejected() {
        assert!(VendorMode::from_num(5).is_err());
        assert!(VendorMode::from_num(6).is_err());
        assert!(VendorMode::from_num(8).is_err());
    }

    #[test]
    fn vendor_mapping_disagrees_with_host_ordinals() {
        // The two enumerations only agree on AUTO-adjacent ordinals by
        // coincidence; OFF in particular is 0 on the host side and 7 on the
        // vendor side.
        assert_eq!(Mode::Off.as_num(), 0);
        assert_eq!(VendorMode::from(Mode::Off).as_num(), 7);
        assert_eq!(Mode::Heat.as_num(), 1);
        assert_eq!(VendorMode::from(Mode::Heat).as_num(), 3);
    }

    #[test]
    fn vendor_host_mode() {
        assert_eq!(VendorMode::Cool.host_mode(), Some(Mode::Cool));
        assert_eq!(VendorMode::Dry.host_mode(), None);
        assert_eq!(VendorMode::Fan.host_mode(), None);
    }
}

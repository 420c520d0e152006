// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-platform binding surface.
//!
//! The home-automation host sees the accessory as five characteristics it
//! can get, partially set, and receive pushes for. This module provides the
//! vocabulary for that surface:
//!
//! - [`Characteristic`] / [`CharacteristicValue`] - the names and values
//!   flowing through get/set handlers
//! - [`CharacteristicProps`] - the numeric constraints a host adapter
//!   registers for the temperature characteristics
//! - [`UpdateRegistry`] - callbacks for values the controller changes
//!   out-of-band (animation ticks, derived power/mode changes)

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::types::{Mode, Temperature};

/// The five attributes exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    /// Whether the accessory is powered.
    Power,
    /// Temperature the accessory currently reports.
    CurrentTemperature,
    /// Temperature the user asked for.
    TargetTemperature,
    /// Mode the accessory currently reports.
    CurrentMode,
    /// Mode the user asked for.
    TargetMode,
}

impl Characteristic {
    /// Returns the characteristic's name as registered with the host.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Power => "Power",
            Self::CurrentTemperature => "CurrentTemperature",
            Self::TargetTemperature => "TargetTemperature",
            Self::CurrentMode => "CurrentMode",
            Self::TargetMode => "TargetMode",
        }
    }

    /// Returns `true` for characteristics the host may set.
    ///
    /// The current pair is derived state; only the controller writes it.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Power | Self::TargetTemperature | Self::TargetMode)
    }

    /// Returns the kind of value this characteristic carries.
    #[must_use]
    pub const fn value_kind(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::CurrentTemperature | Self::TargetTemperature => "temperature",
            Self::CurrentMode | Self::TargetMode => "mode",
        }
    }

    /// Returns the numeric constraints a host adapter should register, if
    /// the characteristic has any.
    ///
    /// The advertised temperature range is narrower than what the remote
    /// device accepts; both are kept deliberately.
    #[must_use]
    pub fn props(self) -> Option<CharacteristicProps> {
        match self {
            Self::CurrentTemperature | Self::TargetTemperature => Some(CharacteristicProps {
                min: Temperature::HOST_RANGE.min(),
                max: Temperature::HOST_RANGE.max(),
                step: Temperature::STEP,
            }),
            Self::Power | Self::CurrentMode | Self::TargetMode => None,
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Numeric constraints for a characteristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacteristicProps {
    /// Minimum accepted value.
    pub min: f64,
    /// Maximum accepted value.
    pub max: f64,
    /// Granularity of accepted values.
    pub step: f64,
}

/// A value carried by a characteristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharacteristicValue {
    /// A power state.
    Power(bool),
    /// A temperature.
    Temperature(Temperature),
    /// A climate mode.
    Mode(Mode),
}

impl CharacteristicValue {
    /// Returns the kind of this value, matching
    /// [`Characteristic::value_kind`].
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Power(_) => "power",
            Self::Temperature(_) => "temperature",
            Self::Mode(_) => "mode",
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        Self::Power(value)
    }
}

impl From<Temperature> for CharacteristicValue {
    fn from(value: Temperature) -> Self {
        Self::Temperature(value)
    }
}

impl From<Mode> for CharacteristicValue {
    fn from(value: Mode) -> Self {
        Self::Mode(value)
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power(on) => write!(f, "{}", if *on { "on" } else { "off" }),
            Self::Temperature(t) => write!(f, "{t}"),
            Self::Mode(m) => write!(f, "{m}"),
        }
    }
}

/// Unique identifier for an update subscription.
///
/// Returned when registering a callback and used to unsubscribe later. IDs
/// are unique within a controller's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type UpdateCallback = Arc<dyn Fn(Characteristic, CharacteristicValue) + Send + Sync>;

/// Registry of host callbacks for out-of-band characteristic updates.
///
/// This is the Rust face of the host's `updateCharacteristic` push: the
/// controller calls [`push`](Self::push) whenever it changes a value the
/// host did not just set itself, and a host adapter forwards those to the
/// platform. Callbacks run synchronously on the pushing task, in arbitrary
/// order.
pub struct UpdateRegistry {
    next_id: AtomicU64,
    callbacks: RwLock<HashMap<SubscriptionId, UpdateCallback>>,
}

impl UpdateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a callback for characteristic updates.
    pub fn on_update<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Characteristic, CharacteristicValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Unregisters a callback.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.write().remove(&id).is_some()
    }

    /// Delivers an update to every registered callback.
    pub fn push(&self, characteristic: Characteristic, value: CharacteristicValue) {
        let callbacks = self.callbacks.read();
        for callback in callbacks.values() {
            callback(characteristic, value);
        }
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for UpdateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UpdateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;

    #[test]
    fn writable_split() {
        assert!(Characteristic::Power.is_writable());
        assert!(Characteristic::TargetTemperature.is_writable());
        assert!(Characteristic::TargetMode.is_writable());
        assert!(!Characteristic::CurrentTemperature.is_writable());
        assert!(!Characteristic::CurrentMode.is_writable());
    }

    #[test]
    fn temperature_props_use_host_range() {
        let props = Characteristic::TargetTemperature.props().unwrap();
        assert_eq!(props.min, 20.0);
        assert_eq!(props.max, 30.0);
        assert_eq!(props.step, 0.1);
        assert!(Characteristic::Power.props().is_none());
    }

    #[test]
    fn value_kinds_line_up() {
        assert_eq!(
            Characteristic::Power.value_kind(),
            CharacteristicValue::Power(true).kind()
        );
        assert_eq!(
            Characteristic::CurrentTemperature.value_kind(),
            CharacteristicValue::Temperature(Temperature::from_celsius(21.0)).kind()
        );
        assert_eq!(
            Characteristic::TargetMode.value_kind(),
            CharacteristicValue::Mode(Mode::Auto).kind()
        );
    }

    #[test]
    fn subscription_id_display() {
        assert_eq!(SubscriptionId::new(42).to_string(), "Sub(42)");
    }

    #[test]
    fn registry_dispatches_updates() {
        let registry = UpdateRegistry::new();
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();

        let id = registry.on_update(move |characteristic, value| {
            assert_eq!(characteristic, Characteristic::Power);
            assert_eq!(value, CharacteristicValue::Power(true));
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(registry.callback_count(), 1);

        registry.push(Characteristic::Power, true.into());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(registry.unsubscribe(id));
        registry.push(Characteristic::Power, true.into());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_multiple_callbacks() {
        let registry = UpdateRegistry::new();
        let count = Arc::new(AtomicU32::new(0));

        for _ in 0..3 {
            let seen = count.clone();
            registry.on_update(move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        registry.push(
            Characteristic::CurrentTemperature,
            Temperature::from_celsius(22.1).into(),
        );
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn registry_unsubscribe_unknown_id() {
        let registry = UpdateRegistry::new();
        assert!(!registry.unsubscribe(SubscriptionId::new(99)));
        assert!(registry.is_empty());
    }
}

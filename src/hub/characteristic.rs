// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Characteristics and their values.

use std::fmt;

use crate::error::{Error, Result};

/// Hub characteristics used by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Characteristic {
    /// Power state of a light or switch.
    On,
    /// Brightness in percent.
    Brightness,
    /// Hue in degrees.
    Hue,
    /// Saturation in percent.
    Saturation,
    /// Service name.
    Name,
    /// User-visible name of a switch.
    ConfiguredName,
    /// Accessory manufacturer.
    Manufacturer,
    /// Accessory model.
    Model,
    /// Firmware revision.
    FirmwareRevision,
    /// Serial number.
    SerialNumber,
}

/// A characteristic value.
#[derive(Debug, Clone, PartialEq)]
pub enum CharacteristicValue {
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl CharacteristicValue {
    /// Returns the boolean value.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidValue` for non-boolean values.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(value) => Ok(*value),
            other => Err(Error::InvalidValue(format!("expected a boolean, got {other}"))),
        }
    }

    /// Returns the numeric value.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidValue` for non-numeric or non-finite values.
    pub fn as_number(&self) -> Result<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Ok(*value),
            other => Err(Error::InvalidValue(format!("expected a number, got {other}"))),
        }
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for CharacteristicValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u8> for CharacteristicValue {
    fn from(value: u8) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for CharacteristicValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CharacteristicValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

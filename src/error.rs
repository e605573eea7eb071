// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Failures fall into four groups: configuration problems detected at
//! startup, communication failures on hub-driven writes while the controller
//! is unreachable, transport errors reported by the device client, and value
//! or payload validation errors. None of them is fatal to the host process;
//! each controller's failures stay inside its own accessory.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The platform or controller configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The device client reported a failure.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// A device payload could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// No connection to the controller is currently established.
    #[error("controller is not connected")]
    NotConnected,

    /// The addressed hub service does not exist on this accessory.
    #[error("service not found: {0}")]
    ServiceNotFound(String),

    /// The characteristic is not handled by the addressed service.
    #[error("characteristic is not supported by this service")]
    UnsupportedCharacteristic,

    /// The characteristic value has the wrong type.
    #[error("invalid characteristic value: {0}")]
    InvalidValue(String),
}

impl Error {
    /// Returns the HAP status the hub should report for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use wled_bridge::{Error, HapStatus};
    ///
    /// assert_eq!(
    ///     Error::NotConnected.hap_status(),
    ///     HapStatus::ServiceCommunicationFailure
    /// );
    /// ```
    #[must_use]
    pub fn hap_status(&self) -> HapStatus {
        match self {
            Self::NotConnected | Self::Client(_) => HapStatus::ServiceCommunicationFailure,
            Self::ServiceNotFound(_) | Self::UnsupportedCharacteristic => {
                HapStatus::ResourceDoesNotExist
            }
            Self::Value(_) | Self::InvalidValue(_) | Self::Parse(_) => {
                HapStatus::InvalidValueInRequest
            }
            Self::Config(_) => HapStatus::ServiceCommunicationFailure,
        }
    }

    /// Returns true if this error signals a missing controller connection.
    #[must_use]
    pub fn is_communication_failure(&self) -> bool {
        self.hap_status() == HapStatus::ServiceCommunicationFailure
    }
}

/// HAP status codes surfaced to the hub on failed characteristic access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum HapStatus {
    /// The accessory could not be reached; the hub shows it as unresponsive.
    ServiceCommunicationFailure = -70402,
    /// The requested resource does not exist.
    ResourceDoesNotExist = -70409,
    /// The written value is not valid for the characteristic.
    InvalidValueInRequest = -70410,
}

impl HapStatus {
    /// Returns the numeric status code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
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

    /// The device reported a light capability this bridge does not know.
    #[error("unknown light capability: {0}")]
    UnknownCapability(u8),

    /// An invalid hex color string was provided.
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),
}

/// Errors in the platform or controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration lists no controllers.
    #[error("no controllers configured")]
    NoControllers,

    /// Two controllers share the same network address.
    #[error("controller {existing} is already configured at address {address}")]
    DuplicateAddress {
        /// The address both controllers use.
        address: String,
        /// Name of the controller that claimed the address first.
        existing: String,
    },

    /// A controller entry is missing a required field.
    #[error("controller entry is missing {0}")]
    MissingField(&'static str),

    /// The configuration JSON could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a device client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The asynchronous initialization of the client failed.
    #[error("initialization failed: {0}")]
    InitFailed(String),

    /// The connection to the controller failed or was dropped.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors related to decoding device payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0.0,
            max: 100.0,
            actual: 150.0,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn error_from_value_error() {
        let err: Error = ValueError::UnknownCapability(7).into();
        assert!(matches!(err, Error::Value(ValueError::UnknownCapability(7))));
    }

    #[test]
    fn duplicate_address_display() {
        let err = ConfigError::DuplicateAddress {
            address: "10.0.0.5".to_string(),
            existing: "Desk".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "controller Desk is already configured at address 10.0.0.5"
        );
    }

    #[test]
    fn not_connected_maps_to_communication_failure() {
        assert!(Error::NotConnected.is_communication_failure());
        assert_eq!(
            Error::Client(ClientError::Transport("reset".into())).hap_status(),
            HapStatus::ServiceCommunicationFailure
        );
        assert_eq!(HapStatus::ServiceCommunicationFailure.code(), -70402);
    }

    #[test]
    fn lookup_errors_map_to_missing_resource() {
        assert_eq!(
            Error::ServiceNotFound("WLED-PRESET-3".into()).hap_status(),
            HapStatus::ResourceDoesNotExist
        );
        assert_eq!(
            Error::UnsupportedCharacteristic.hap_status(),
            HapStatus::ResourceDoesNotExist
        );
    }

    #[test]
    fn value_errors_map_to_invalid_value() {
        let err: Error = ValueError::OutOfRange {
            min: 0.0,
            max: 360.0,
            actual: 400.0,
        }
        .into();
        assert_eq!(err.hap_status(), HapStatus::InvalidValueInRequest);
        assert!(!err.is_communication_failure());
    }
}

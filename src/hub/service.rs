// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service addressing.

use std::fmt;

/// Subtype of the live mode switch.
pub const LIVE_SUBTYPE: &str = "WLED-LIVE";

/// Subtype prefix of preset and playlist switches.
pub const PRESET_SUBTYPE_PREFIX: &str = "WLED-PRESET-";

/// Hub service types used by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceType {
    /// Light with on/off and optional brightness and color.
    Lightbulb,
    /// Stateless toggle.
    Switch,
    /// Manufacturer, model, firmware and serial.
    AccessoryInformation,
}

/// A service of an accessory, identified by type and optional subtype.
///
/// # Examples
///
/// ```
/// use wled_bridge::hub::ServiceKey;
///
/// let key = ServiceKey::preset_switch(12);
/// assert_eq!(key.to_string(), "Switch/WLED-PRESET-12");
/// assert_eq!(key.preset_id(), Some(12));
/// assert_eq!(ServiceKey::live_switch().preset_id(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey {
    service_type: ServiceType,
    subtype: Option<String>,
}

impl ServiceKey {
    /// Creates a key.
    #[must_use]
    pub fn new(service_type: ServiceType, subtype: Option<String>) -> Self {
        Self {
            service_type,
            subtype,
        }
    }

    /// The primary light service.
    #[must_use]
    pub fn primary_light() -> Self {
        Self::new(ServiceType::Lightbulb, None)
    }

    /// The accessory information service.
    #[must_use]
    pub fn information() -> Self {
        Self::new(ServiceType::AccessoryInformation, None)
    }

    /// The live mode switch.
    #[must_use]
    pub fn live_switch() -> Self {
        Self::new(ServiceType::Switch, Some(LIVE_SUBTYPE.to_string()))
    }

    /// The switch bound to a preset or playlist.
    #[must_use]
    pub fn preset_switch(id: i32) -> Self {
        Self::new(
            ServiceType::Switch,
            Some(format!("{PRESET_SUBTYPE_PREFIX}{id}")),
        )
    }

    /// Returns the service type.
    #[must_use]
    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Returns the subtype.
    #[must_use]
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// Returns the preset id if this is a preset switch.
    #[must_use]
    pub fn preset_id(&self) -> Option<i32> {
        if self.service_type != ServiceType::Switch {
            return None;
        }
        self.subtype
            .as_deref()?
            .strip_prefix(PRESET_SUBTYPE_PREFIX)?
            .parse()
            .ok()
    }

    /// Returns true if this is the live mode switch.
    #[must_use]
    pub fn is_live_switch(&self) -> bool {
        self.service_type == ServiceType::Switch && self.subtype() == Some(LIVE_SUBTYPE)
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.service_type)?;
        if let Some(subtype) = &self.subtype {
            write!(f, "/{subtype}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_id_requires_switch_and_prefix() {
        assert_eq!(ServiceKey::preset_switch(0).preset_id(), Some(0));
        assert_eq!(ServiceKey::primary_light().preset_id(), None);
        assert_eq!(
            ServiceKey::new(ServiceType::Lightbulb, Some("WLED-PRESET-3".into())).preset_id(),
            None
        );
        assert_eq!(
            ServiceKey::new(ServiceType::Switch, Some("WLED-PRESET-x".into())).preset_id(),
            None
        );
    }

    #[test]
    fn live_switch_key() {
        assert!(ServiceKey::live_switch().is_live_switch());
        assert!(!ServiceKey::preset_switch(1).is_live_switch());
        assert_eq!(ServiceKey::live_switch().subtype(), Some("WLED-LIVE"));
    }

    #[test]
    fn display() {
        assert_eq!(ServiceKey::primary_light().to_string(), "Lightbulb");
        assert_eq!(ServiceKey::live_switch().to_string(), "Switch/WLED-LIVE");
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stable accessory identifier.

use std::fmt;

use uuid::Uuid;

/// Identifier of the hub accessory representing one controller.
///
/// Derived deterministically from the controller address, so a cached
/// accessory is found again after a restart.
///
/// # Examples
///
/// ```
/// use wled_bridge::event::AccessoryId;
///
/// let a = AccessoryId::from_address("192.168.1.20");
/// let b = AccessoryId::from_address("192.168.1.20");
/// assert_eq!(a, b);
/// assert_ne!(a, AccessoryId::from_address("192.168.1.21"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct AccessoryId(Uuid);

impl AccessoryId {
    /// Derives the identifier for a controller address.
    #[must_use]
    pub fn from_address(address: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_DNS, address.as_bytes()))
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = &self.0.to_string()[..8];
        write!(f, "AccessoryId({short}...)")
    }
}

impl fmt::Display for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AccessoryId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AccessoryId> for Uuid {
    fn from(id: AccessoryId) -> Self {
        id.0
    }
}

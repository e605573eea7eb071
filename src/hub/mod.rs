// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hub boundary.
//!
//! The hub's accessory framework is treated as an opaque service registry.
//! [`AccessoryHandle`] is one cached or newly created accessory with its
//! services; [`PlatformApi`] registers, updates and unregisters accessories.
//! A hub adapter implements both traits and routes characteristic reads and
//! writes to [`WledAccessory::handle_get`](crate::WledAccessory::handle_get)
//! and [`WledAccessory::handle_set`](crate::WledAccessory::handle_set).

mod characteristic;
mod service;

pub use characteristic::{Characteristic, CharacteristicValue};
pub use service::{LIVE_SUBTYPE, PRESET_SUBTYPE_PREFIX, ServiceKey, ServiceType};

use crate::config::ControllerConfig;
use crate::event::AccessoryId;

/// One hub accessory.
///
/// Handles are cheap clones of a shared accessory; every method takes
/// `&self`.
pub trait AccessoryHandle: Clone + Send + Sync + 'static {
    /// Returns the accessory identifier.
    fn uuid(&self) -> AccessoryId;

    /// Returns the display name.
    fn display_name(&self) -> String;

    /// Returns the controller stored in the accessory context.
    fn context(&self) -> Option<ControllerConfig>;

    /// Stores the controller in the accessory context.
    fn set_context(&self, controller: ControllerConfig);

    /// Returns true if the accessory has the service.
    fn has_service(&self, key: &ServiceKey) -> bool;

    /// Adds a service with a display name.
    fn add_service(&self, key: &ServiceKey, name: &str);

    /// Removes a service.
    fn remove_service(&self, key: &ServiceKey);

    /// Returns all services of the accessory.
    fn services(&self) -> Vec<ServiceKey>;

    /// Marks the service as the primary service.
    fn set_primary_service(&self, key: &ServiceKey);

    /// Links `child` under `parent`.
    fn link_service(&self, parent: &ServiceKey, child: &ServiceKey);

    /// Removes the link between `parent` and `child`.
    fn unlink_service(&self, parent: &ServiceKey, child: &ServiceKey);

    /// Routes reads and writes of the characteristic to the accessory.
    fn enable_characteristic(&self, key: &ServiceKey, characteristic: Characteristic);

    /// Stops routing reads and writes of the characteristic and removes it
    /// from the service.
    fn disable_characteristic(&self, key: &ServiceKey, characteristic: Characteristic);

    /// Sets a characteristic value without notifying the hub.
    fn set_characteristic(
        &self,
        key: &ServiceKey,
        characteristic: Characteristic,
        value: CharacteristicValue,
    );

    /// Pushes a changed characteristic value to the hub.
    fn update_characteristic(
        &self,
        key: &ServiceKey,
        characteristic: Characteristic,
        value: CharacteristicValue,
    );
}

/// Accessory registration with the hub.
pub trait PlatformApi: Send + Sync + 'static {
    /// Accessory type of this hub.
    type Accessory: AccessoryHandle;

    /// Creates an accessory that is not registered yet.
    fn create_accessory(&self, name: &str, id: AccessoryId) -> Self::Accessory;

    /// Registers new accessories.
    fn register_accessories(&self, accessories: &[Self::Accessory]);

    /// Persists changes of restored accessories.
    fn update_accessories(&self, accessories: &[Self::Accessory]);

    /// Removes accessories from the hub.
    fn unregister_accessories(&self, accessories: &[Self::Accessory]);
}

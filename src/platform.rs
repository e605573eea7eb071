// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller registry.
//!
//! The [`Platform`] maps configured controller addresses to accessories.
//! On launch it restores cached accessories whose controller is still
//! configured, creates accessories for new controllers and unregisters
//! cached accessories nobody configures anymore.
//!
//! # Examples
//!
//! ```
//! use wled_bridge::Platform;
//! use wled_bridge::config::PlatformConfig;
//! use wled_bridge::testing::{MemoryPlatform, RecordingFactory};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> wled_bridge::Result<()> {
//! let config = PlatformConfig::from_json_str(
//!     r#"{ "platform": "wled-ws", "controllers": [ { "name": "Desk", "address": "10.0.0.5" } ] }"#,
//! )?;
//! let hub = MemoryPlatform::new();
//! let mut platform = Platform::new(hub.clone(), RecordingFactory::new(), config);
//!
//! platform.did_finish_launching()?;
//! assert_eq!(hub.registered().len(), 1);
//!
//! platform.shutdown();
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::accessory::{AccessoryOptions, WledAccessory};
use crate::client::ClientFactory;
use crate::config::{ControllerConfig, PlatformConfig, ReconnectPolicy};
use crate::error::{ConfigError, Result};
use crate::event::AccessoryId;
use crate::hub::{AccessoryHandle, PlatformApi};

/// Registry of configured controllers and their accessories.
pub struct Platform<P: PlatformApi, F: ClientFactory + Clone> {
    api: P,
    factory: F,
    config: PlatformConfig,
    reconnect: ReconnectPolicy,
    /// Configured controllers, keyed by address.
    controllers: BTreeMap<String, ControllerConfig>,
    /// Accessories handed back by the hub cache.
    cached: HashMap<AccessoryId, P::Accessory>,
    /// Live accessories, keyed by their stable identifier.
    accessories: HashMap<AccessoryId, WledAccessory<F, P::Accessory>>,
}

impl<P: PlatformApi, F: ClientFactory + Clone> Platform<P, F> {
    /// Creates a registry for a platform configuration.
    pub fn new(api: P, factory: F, config: PlatformConfig) -> Self {
        Self {
            api,
            factory,
            config,
            reconnect: ReconnectPolicy::default(),
            controllers: BTreeMap::new(),
            cached: HashMap::new(),
            accessories: HashMap::new(),
        }
    }

    /// Overrides the reconnect policy handed to every accessory.
    #[must_use]
    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Returns the platform configuration.
    #[must_use]
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Records an accessory restored from the hub cache.
    ///
    /// Must be called for every cached accessory before
    /// [`did_finish_launching`](Self::did_finish_launching).
    pub fn configure_accessory(&mut self, accessory: P::Accessory) {
        tracing::info!(
            accessory = %accessory.display_name(),
            id = %accessory.uuid(),
            "loading accessory from cache"
        );
        self.cached.insert(accessory.uuid(), accessory);
    }

    /// Creates or restores one accessory per configured controller, starts
    /// connecting them and unregisters cached accessories that are no
    /// longer configured.
    ///
    /// Controllers with blank fields or an address already taken by an
    /// earlier entry are logged and skipped. Must be called from within a
    /// Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoControllers` if the configuration lists no
    /// controllers; nothing is registered or removed in that case.
    pub fn did_finish_launching(&mut self) -> Result<()> {
        if self.config.controllers.is_empty() {
            let error = ConfigError::NoControllers;
            tracing::error!(%error, "no accessories registered");
            return Err(error.into());
        }

        for controller in self.config.controllers.clone() {
            self.discover(controller);
        }
        self.remove_stale();
        Ok(())
    }

    fn discover(&mut self, controller: ControllerConfig) {
        if let Err(error) = controller.validate() {
            tracing::error!(controller = %controller.name, %error, "skipping controller");
            return;
        }
        if let Some(existing) = self.controllers.get(&controller.address) {
            let error = ConfigError::DuplicateAddress {
                address: controller.address.clone(),
                existing: existing.name.clone(),
            };
            tracing::error!(controller = %controller.name, %error, "skipping controller");
            return;
        }

        let id = AccessoryId::from_address(&controller.address);
        self.controllers
            .insert(controller.address.clone(), controller.clone());

        let options = AccessoryOptions {
            logging: self.config.logging,
            reconnect: self.reconnect,
        };
        let (hub_accessory, restored) = match self.cached.get(&id) {
            Some(cached) => (cached.clone(), true),
            None => (self.api.create_accessory(&controller.name, id), false),
        };
        hub_accessory.set_context(controller.clone());

        let accessory = WledAccessory::new(
            controller.clone(),
            self.factory.clone(),
            hub_accessory.clone(),
            options,
        );

        if restored {
            tracing::info!(controller = %controller.name, %id, "restoring existing accessory from cache");
            self.api.update_accessories(std::slice::from_ref(&hub_accessory));
        } else {
            tracing::info!(controller = %controller.name, %id, "adding new accessory");
            self.api.register_accessories(std::slice::from_ref(&hub_accessory));
            self.cached.insert(id, hub_accessory);
        }

        accessory.start();
        self.accessories.insert(id, accessory);
    }

    fn remove_stale(&mut self) {
        let stale: Vec<P::Accessory> = self
            .cached
            .iter()
            .filter(|(id, _)| !self.accessories.contains_key(id))
            .map(|(_, accessory)| accessory.clone())
            .collect();
        if stale.is_empty() {
            return;
        }

        for accessory in &stale {
            tracing::info!(
                accessory = %accessory.display_name(),
                id = %accessory.uuid(),
                "removing accessory no longer configured"
            );
        }
        self.api.unregister_accessories(&stale);
        self.cached.retain(|id, _| self.accessories.contains_key(id));
    }

    /// Disconnects every accessory.
    pub fn shutdown(&self) {
        tracing::info!(accessories = self.accessories.len(), "shutting down");
        for accessory in self.accessories.values() {
            accessory.disconnect();
        }
    }

    /// Returns the accessory with the given identifier.
    #[must_use]
    pub fn accessory(&self, id: &AccessoryId) -> Option<&WledAccessory<F, P::Accessory>> {
        self.accessories.get(id)
    }

    /// Returns the accessory of the controller at `address`.
    #[must_use]
    pub fn accessory_for(&self, address: &str) -> Option<&WledAccessory<F, P::Accessory>> {
        self.accessories.get(&AccessoryId::from_address(address))
    }

    /// Returns the configured controller at `address`.
    #[must_use]
    pub fn controller(&self, address: &str) -> Option<&ControllerConfig> {
        self.controllers.get(address)
    }

    /// Iterates over the live accessories.
    pub fn accessories(&self) -> impl Iterator<Item = &WledAccessory<F, P::Accessory>> {
        self.accessories.values()
    }

    /// Returns the number of live accessories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accessories.len()
    }

    /// Returns true if no accessory is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accessories.is_empty()
    }
}

impl<P: PlatformApi, F: ClientFactory + Clone> std::fmt::Debug for Platform<P, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("controllers", &self.controllers.keys().collect::<Vec<_>>())
            .field("cached", &self.cached.len())
            .field("accessories", &self.accessories.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::{MemoryAccessory, MemoryPlatform, RecordingFactory};

    fn config(controllers: Vec<ControllerConfig>) -> PlatformConfig {
        PlatformConfig {
            platform: crate::PLATFORM_NAME.to_string(),
            controllers,
            ..PlatformConfig::default()
        }
    }

    #[tokio::test]
    async fn empty_configuration_is_rejected() {
        let hub = MemoryPlatform::new();
        let mut platform = Platform::new(hub.clone(), RecordingFactory::new(), config(vec![]));
        platform.configure_accessory(MemoryAccessory::new("Old", AccessoryId::from_address("10.0.0.9")));

        assert!(matches!(
            platform.did_finish_launching(),
            Err(Error::Config(ConfigError::NoControllers))
        ));
        assert!(hub.unregistered().is_empty());
        assert!(platform.is_empty());
    }

    #[tokio::test]
    async fn duplicate_address_keeps_first_controller() {
        let hub = MemoryPlatform::new();
        let mut platform = Platform::new(
            hub.clone(),
            RecordingFactory::new(),
            config(vec![
                ControllerConfig::new("Desk", "10.0.0.5"),
                ControllerConfig::new("Shelf", "10.0.0.5"),
            ]),
        );

        platform.did_finish_launching().unwrap();
        assert_eq!(platform.len(), 1);
        assert_eq!(platform.controller("10.0.0.5").unwrap().name, "Desk");
        assert_eq!(hub.registered().len(), 1);
    }

    #[tokio::test]
    async fn blank_controller_is_skipped() {
        let hub = MemoryPlatform::new();
        let mut platform = Platform::new(
            hub.clone(),
            RecordingFactory::new(),
            config(vec![
                ControllerConfig::new("Desk", ""),
                ControllerConfig::new("Shelf", "10.0.0.6"),
            ]),
        );

        platform.did_finish_launching().unwrap();
        assert!(platform.accessory_for("10.0.0.6").is_some());
        assert!(platform.controller("").is_none());
    }

    #[tokio::test]
    async fn restored_accessory_gets_new_context() {
        let hub = MemoryPlatform::new();
        let id = AccessoryId::from_address("10.0.0.5");
        let cached = MemoryAccessory::new("Desk", id);

        let mut platform = Platform::new(
            hub.clone(),
            RecordingFactory::new(),
            config(vec![ControllerConfig::new("Desk", "10.0.0.5").with_presets("Relax")]),
        );
        platform.configure_accessory(cached.clone());
        platform.did_finish_launching().unwrap();

        assert_eq!(hub.updated(), vec![id]);
        assert!(hub.registered().is_empty());
        assert_eq!(cached.context().unwrap().presets.as_deref(), Some("Relax"));
        assert!(platform.accessory(&id).is_some());
    }
}

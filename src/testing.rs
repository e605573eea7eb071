// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory test doubles for the hub and the device client.
//!
//! [`MemoryAccessory`] and [`MemoryPlatform`] record every hub call.
//! [`RecordingFactory`] creates [`RecordingClient`]s whose commands can be
//! inspected and whose events are injected through a [`ClientProbe`].

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::{ClientFactory, DeviceInfo, WledClient};
use crate::config::ControllerConfig;
use crate::error::ClientError;
use crate::event::{AccessoryId, ClientEvent, EventSink};
use crate::hub::{AccessoryHandle, Characteristic, CharacteristicValue, PlatformApi, ServiceKey};
use crate::types::RgbColor;

// ============================================================================
// Hub
// ============================================================================

#[derive(Debug, Default)]
struct ServiceRecord {
    name: String,
    values: BTreeMap<Characteristic, CharacteristicValue>,
    enabled: BTreeSet<Characteristic>,
    links: BTreeSet<ServiceKey>,
}

#[derive(Debug)]
struct AccessoryRecord {
    id: AccessoryId,
    name: String,
    context: Option<ControllerConfig>,
    primary: Option<ServiceKey>,
    services: BTreeMap<ServiceKey, ServiceRecord>,
    updates: Vec<(ServiceKey, Characteristic, CharacteristicValue)>,
}

/// Accessory that keeps its services in memory.
#[derive(Debug, Clone)]
pub struct MemoryAccessory {
    record: Arc<Mutex<AccessoryRecord>>,
}

impl MemoryAccessory {
    /// Creates an accessory with an information service, like a fresh hub
    /// accessory.
    #[must_use]
    pub fn new(name: &str, id: AccessoryId) -> Self {
        let mut services = BTreeMap::new();
        services.insert(ServiceKey::information(), ServiceRecord::default());
        Self {
            record: Arc::new(Mutex::new(AccessoryRecord {
                id,
                name: name.to_string(),
                context: None,
                primary: None,
                services,
                updates: Vec::new(),
            })),
        }
    }

    /// Returns the last set or updated value of a characteristic.
    #[must_use]
    pub fn value(&self, key: &ServiceKey, characteristic: Characteristic) -> Option<CharacteristicValue> {
        self.record
            .lock()
            .services
            .get(key)?
            .values
            .get(&characteristic)
            .cloned()
    }

    /// Returns the values pushed through `update_characteristic`.
    #[must_use]
    pub fn updates(&self, key: &ServiceKey, characteristic: Characteristic) -> Vec<CharacteristicValue> {
        self.record
            .lock()
            .updates
            .iter()
            .filter(|(k, c, _)| k == key && *c == characteristic)
            .map(|(_, _, v)| v.clone())
            .collect()
    }

    /// Returns the number of `update_characteristic` calls.
    #[must_use]
    pub fn update_count(&self) -> usize {
        self.record.lock().updates.len()
    }

    /// Forgets recorded updates.
    pub fn clear_updates(&self) {
        self.record.lock().updates.clear();
    }

    /// Returns the services linked under `parent`.
    #[must_use]
    pub fn links(&self, parent: &ServiceKey) -> Vec<ServiceKey> {
        self.record
            .lock()
            .services
            .get(parent)
            .map(|s| s.links.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns true if reads and writes of the characteristic are routed.
    #[must_use]
    pub fn is_enabled(&self, key: &ServiceKey, characteristic: Characteristic) -> bool {
        self.record
            .lock()
            .services
            .get(key)
            .is_some_and(|s| s.enabled.contains(&characteristic))
    }

    /// Returns the display name a service was added with.
    #[must_use]
    pub fn service_name(&self, key: &ServiceKey) -> Option<String> {
        self.record.lock().services.get(key).map(|s| s.name.clone())
    }

    /// Returns the primary service.
    #[must_use]
    pub fn primary(&self) -> Option<ServiceKey> {
        self.record.lock().primary.clone()
    }
}

impl AccessoryHandle for MemoryAccessory {
    fn uuid(&self) -> AccessoryId {
        self.record.lock().id
    }

    fn display_name(&self) -> String {
        self.record.lock().name.clone()
    }

    fn context(&self) -> Option<ControllerConfig> {
        self.record.lock().context.clone()
    }

    fn set_context(&self, controller: ControllerConfig) {
        self.record.lock().context = Some(controller);
    }

    fn has_service(&self, key: &ServiceKey) -> bool {
        self.record.lock().services.contains_key(key)
    }

    fn add_service(&self, key: &ServiceKey, name: &str) {
        self.record.lock().services.insert(
            key.clone(),
            ServiceRecord {
                name: name.to_string(),
                ..ServiceRecord::default()
            },
        );
    }

    fn remove_service(&self, key: &ServiceKey) {
        let mut record = self.record.lock();
        record.services.remove(key);
        if record.primary.as_ref() == Some(key) {
            record.primary = None;
        }
    }

    fn services(&self) -> Vec<ServiceKey> {
        self.record.lock().services.keys().cloned().collect()
    }

    fn set_primary_service(&self, key: &ServiceKey) {
        self.record.lock().primary = Some(key.clone());
    }

    fn link_service(&self, parent: &ServiceKey, child: &ServiceKey) {
        if let Some(service) = self.record.lock().services.get_mut(parent) {
            service.links.insert(child.clone());
        }
    }

    fn unlink_service(&self, parent: &ServiceKey, child: &ServiceKey) {
        if let Some(service) = self.record.lock().services.get_mut(parent) {
            service.links.remove(child);
        }
    }

    fn enable_characteristic(&self, key: &ServiceKey, characteristic: Characteristic) {
        if let Some(service) = self.record.lock().services.get_mut(key) {
            service.enabled.insert(characteristic);
        }
    }

    fn disable_characteristic(&self, key: &ServiceKey, characteristic: Characteristic) {
        if let Some(service) = self.record.lock().services.get_mut(key) {
            service.enabled.remove(&characteristic);
        }
    }

    fn set_characteristic(
        &self,
        key: &ServiceKey,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) {
        if let Some(service) = self.record.lock().services.get_mut(key) {
            service.values.insert(characteristic, value);
        }
    }

    fn update_characteristic(
        &self,
        key: &ServiceKey,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) {
        let mut record = self.record.lock();
        if let Some(service) = record.services.get_mut(key) {
            service.values.insert(characteristic, value.clone());
        }
        record.updates.push((key.clone(), characteristic, value));
    }
}

#[derive(Debug, Default)]
struct PlatformRecord {
    registered: Vec<AccessoryId>,
    updated: Vec<AccessoryId>,
    unregistered: Vec<AccessoryId>,
}

/// Hub platform that records registrations.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlatform {
    record: Arc<Mutex<PlatformRecord>>,
}

impl MemoryPlatform {
    /// Creates an empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ids passed to `register_accessories`.
    #[must_use]
    pub fn registered(&self) -> Vec<AccessoryId> {
        self.record.lock().registered.clone()
    }

    /// Returns the ids passed to `update_accessories`.
    #[must_use]
    pub fn updated(&self) -> Vec<AccessoryId> {
        self.record.lock().updated.clone()
    }

    /// Returns the ids passed to `unregister_accessories`.
    #[must_use]
    pub fn unregistered(&self) -> Vec<AccessoryId> {
        self.record.lock().unregistered.clone()
    }
}

impl PlatformApi for MemoryPlatform {
    type Accessory = MemoryAccessory;

    fn create_accessory(&self, name: &str, id: AccessoryId) -> MemoryAccessory {
        MemoryAccessory::new(name, id)
    }

    fn register_accessories(&self, accessories: &[MemoryAccessory]) {
        self.record
            .lock()
            .registered
            .extend(accessories.iter().map(AccessoryHandle::uuid));
    }

    fn update_accessories(&self, accessories: &[MemoryAccessory]) {
        self.record
            .lock()
            .updated
            .extend(accessories.iter().map(AccessoryHandle::uuid));
    }

    fn unregister_accessories(&self, accessories: &[MemoryAccessory]) {
        self.record
            .lock()
            .unregistered
            .extend(accessories.iter().map(AccessoryHandle::uuid));
    }
}

// ============================================================================
// Device Client
// ============================================================================

/// A command received by a [`RecordingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// `init` was awaited.
    Init,
    /// `turn_on`.
    TurnOn,
    /// `turn_off`.
    TurnOff,
    /// `set_brightness` with the device value.
    SetBrightness(u8),
    /// `set_color`.
    SetColor(RgbColor),
    /// `set_preset`.
    SetPreset(i32),
    /// `allow_live_data`.
    AllowLiveData,
    /// `ignore_live_data`.
    IgnoreLiveData {
        /// Whether live data stays ignored until reboot.
        until_reboot: bool,
    },
    /// `refresh_presets`.
    RefreshPresets,
    /// `refresh_effects`.
    RefreshEffects,
    /// `disconnect`.
    Disconnect,
}

#[derive(Debug)]
struct ProbeState {
    address: String,
    sink: EventSink,
    commands: Mutex<Vec<ClientCommand>>,
    info: Mutex<Option<DeviceInfo>>,
    init_error: Option<ClientError>,
}

/// Test-side view of one created client.
#[derive(Debug, Clone)]
pub struct ClientProbe {
    state: Arc<ProbeState>,
}

impl ClientProbe {
    /// Returns the address the client was created for.
    #[must_use]
    pub fn address(&self) -> String {
        self.state.address.clone()
    }

    /// Emits an event as if the client observed it.
    ///
    /// An `Info` event also becomes the client's cached info.
    pub fn emit(&self, event: ClientEvent) {
        if let ClientEvent::Info(info) = &event {
            *self.state.info.lock() = Some(info.clone());
        }
        self.state.sink.emit(event);
    }

    /// Sets the cached info without emitting an event.
    pub fn set_info(&self, info: DeviceInfo) {
        *self.state.info.lock() = Some(info);
    }

    /// Returns every command received so far.
    #[must_use]
    pub fn commands(&self) -> Vec<ClientCommand> {
        self.state.commands.lock().clone()
    }

    /// Returns how often `command` was received.
    #[must_use]
    pub fn count(&self, command: &ClientCommand) -> usize {
        self.state
            .commands
            .lock()
            .iter()
            .filter(|c| *c == command)
            .count()
    }

    /// Returns true if the accessory has dropped this client's events.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.state.sink.is_closed()
    }
}

/// Client that records commands instead of sending them.
#[derive(Debug)]
pub struct RecordingClient {
    probe: ClientProbe,
}

impl RecordingClient {
    fn record(&self, command: ClientCommand) {
        self.probe.state.commands.lock().push(command);
    }
}

impl WledClient for RecordingClient {
    fn init(&self) -> impl Future<Output = Result<(), ClientError>> + Send {
        self.record(ClientCommand::Init);
        let result = match &self.probe.state.init_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        };
        std::future::ready(result)
    }

    fn turn_on(&self) {
        self.record(ClientCommand::TurnOn);
    }

    fn turn_off(&self) {
        self.record(ClientCommand::TurnOff);
    }

    fn set_brightness(&self, value: u8) {
        self.record(ClientCommand::SetBrightness(value));
    }

    fn set_color(&self, color: RgbColor) {
        self.record(ClientCommand::SetColor(color));
    }

    fn set_preset(&self, id: i32) {
        self.record(ClientCommand::SetPreset(id));
    }

    fn allow_live_data(&self) {
        self.record(ClientCommand::AllowLiveData);
    }

    fn ignore_live_data(&self, until_reboot: bool) {
        self.record(ClientCommand::IgnoreLiveData { until_reboot });
    }

    fn refresh_presets(&self) {
        self.record(ClientCommand::RefreshPresets);
    }

    fn refresh_effects(&self) {
        self.record(ClientCommand::RefreshEffects);
    }

    fn disconnect(&self) {
        self.record(ClientCommand::Disconnect);
    }

    fn info(&self) -> Option<DeviceInfo> {
        self.probe.state.info.lock().clone()
    }
}

#[derive(Debug, Default)]
struct FactoryState {
    clients: Mutex<Vec<ClientProbe>>,
    init_error: Mutex<Option<ClientError>>,
}

/// Factory that hands out [`RecordingClient`]s and keeps a probe for each.
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    state: Arc<FactoryState>,
}

impl RecordingFactory {
    /// Creates a factory whose clients initialize successfully.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `init` of subsequently created clients fail.
    pub fn fail_init(&self, error: ClientError) {
        *self.state.init_error.lock() = Some(error);
    }

    /// Returns the number of clients created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.state.clients.lock().len()
    }

    /// Returns the probe of the `index`-th created client.
    #[must_use]
    pub fn client(&self, index: usize) -> Option<ClientProbe> {
        self.state.clients.lock().get(index).cloned()
    }

    /// Returns the probe of the most recently created client.
    #[must_use]
    pub fn latest(&self) -> Option<ClientProbe> {
        self.state.clients.lock().last().cloned()
    }

    /// Returns the probes of all clients created for `address`.
    #[must_use]
    pub fn clients_for(&self, address: &str) -> Vec<ClientProbe> {
        self.state
            .clients
            .lock()
            .iter()
            .filter(|probe| probe.state.address == address)
            .cloned()
            .collect()
    }
}

impl ClientFactory for RecordingFactory {
    type Client = RecordingClient;

    fn create(&self, address: &str, events: EventSink) -> RecordingClient {
        let probe = ClientProbe {
            state: Arc::new(ProbeState {
                address: address.to_string(),
                sink: events,
                commands: Mutex::new(Vec::new()),
                info: Mutex::new(None),
                init_error: self.state.init_error.lock().clone(),
            }),
        };
        self.state.clients.lock().push(probe.clone());
        RecordingClient { probe }
    }
}

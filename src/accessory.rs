// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One controller exposed as a hub accessory.
//!
//! [`WledAccessory`] owns the connection to its controller, mirrors the
//! light state, keeps the preset switches in sync and answers hub reads
//! and writes. Device events are processed one at a time under a single
//! lock; hub writes take the same lock, so the accessory behaves as if it
//! were single-threaded.
//!
//! # Lifecycle
//!
//! 1. [`WledAccessory::new`] wires the primary light, the accessory
//!    information and the optional live switch.
//! 2. [`WledAccessory::start`] spawns the first connection attempt.
//! 3. Each transport error schedules one reconnect after the policy delay,
//!    replacing the client handle.
//! 4. [`WledAccessory::disconnect`] shuts the connection down for good.

use std::future::Future;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;

use crate::capabilities::LightCapability;
use crate::client::{ClientFactory, DeviceInfo, DeviceState, PresetTable, WledClient};
use crate::config::{ControllerConfig, ReconnectPolicy};
use crate::connection::{Connection, ConnectionState};
use crate::error::{ClientError, Error, Result, ValueError};
use crate::event::{self, ClientEvent};
use crate::hub::{AccessoryHandle, Characteristic, CharacteristicValue, ServiceKey};
use crate::preset::{PresetSwitch, PresetSynchronizer};
use crate::state::{LedState, StateChange};
use crate::types::Brightness;
use crate::{PLUGIN_AUTHOR, PLUGIN_NAME};

/// Display name of a newly added live switch.
const LIVE_SERVICE_NAME: &str = "Live Mode";

/// Name shown for the live switch.
const LIVE_SWITCH_NAME: &str = "Ambilight";

/// Accessory information shown until the controller reports its identity.
const NOT_SET: &str = "not set";

/// Per-accessory options taken from the platform configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessoryOptions {
    /// Include received payloads in log lines.
    pub logging: bool,
    /// Reconnect policy after transport errors.
    pub reconnect: ReconnectPolicy,
}

/// A controller exposed as a hub accessory.
///
/// Cloning yields another handle to the same accessory.
pub struct WledAccessory<F: ClientFactory, A: AccessoryHandle> {
    shared: Arc<Shared<F, A>>,
}

struct Shared<F: ClientFactory, A> {
    controller: ControllerConfig,
    factory: F,
    accessory: A,
    options: AccessoryOptions,
    inner: Mutex<Inner<F::Client>>,
}

struct Inner<C> {
    connection: Connection<C>,
    led: LedState,
    presets: PresetSynchronizer,
    info_applied: bool,
}

impl<F: ClientFactory, A: AccessoryHandle> Clone for WledAccessory<F, A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: ClientFactory, A: AccessoryHandle> std::fmt::Debug for WledAccessory<F, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WledAccessory")
            .field("controller", &self.shared.controller.name)
            .field("address", &self.shared.controller.address)
            .field("state", &self.connection_state())
            .finish_non_exhaustive()
    }
}

impl<F: ClientFactory, A: AccessoryHandle> WledAccessory<F, A> {
    /// Creates the accessory and wires its initial services.
    ///
    /// Preset switches already present on a restored accessory are
    /// remembered so they can be reclaimed once the preset table arrives.
    pub fn new(
        controller: ControllerConfig,
        factory: F,
        accessory: A,
        options: AccessoryOptions,
    ) -> Self {
        wire_services(&controller, &accessory);
        let presets = PresetSynchronizer::restore(&accessory);

        Self {
            shared: Arc::new(Shared {
                controller,
                factory,
                accessory,
                options,
                inner: Mutex::new(Inner {
                    connection: Connection::new(),
                    led: LedState::new(),
                    presets,
                    info_applied: false,
                }),
            }),
        }
    }

    /// Returns the controller configuration.
    #[must_use]
    pub fn controller(&self) -> &ControllerConfig {
        &self.shared.controller
    }

    /// Returns the hub accessory.
    #[must_use]
    pub fn accessory(&self) -> &A {
        &self.shared.accessory
    }

    /// Returns the connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.shared.inner.lock().connection.state()
    }

    /// Returns true if hub writes are forwarded to the controller.
    #[must_use]
    pub fn is_established(&self) -> bool {
        self.shared.inner.lock().connection.is_established()
    }

    /// Returns a copy of the mirrored light state.
    #[must_use]
    pub fn led_state(&self) -> LedState {
        self.shared.inner.lock().led.clone()
    }

    /// Returns the preset switches in id order.
    #[must_use]
    pub fn preset_switches(&self) -> Vec<PresetSwitch> {
        self.shared.inner.lock().presets.switches().cloned().collect()
    }

    /// Returns the active preset id.
    #[must_use]
    pub fn active_preset(&self) -> Option<i32> {
        self.shared.inner.lock().presets.active()
    }

    fn name(&self) -> &str {
        &self.shared.controller.name
    }

    // ========== Connection Lifecycle ==========

    /// Spawns the first connection attempt.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        tokio::spawn(self.connect(false));
    }

    /// Creates a fresh client and initializes it.
    ///
    /// Completes once initialization succeeded or failed; the connection
    /// counts as established only after the client reports `Open`. An
    /// initialization failure is logged and not retried here. Does nothing
    /// after [`disconnect`](Self::disconnect).
    pub fn connect(&self, is_reconnect: bool) -> impl Future<Output = ()> + Send + 'static {
        let this = self.clone();
        async move {
            let shared = &this.shared;
            let controller = &shared.controller;
            if shared.inner.lock().connection.is_closed() {
                tracing::debug!(controller = %controller.name, "connection closed, not connecting");
                return;
            }

            tracing::info!(
                controller = %controller.name,
                address = %controller.address,
                "{} to controller",
                if is_reconnect { "reconnecting" } else { "connecting" }
            );

            let (events, mut stream) = event::channel();
            let client = Arc::new(shared.factory.create(&controller.address, events));
            {
                let mut inner = shared.inner.lock();
                let Some(generation) = inner.connection.begin(Arc::clone(&client)) else {
                    return;
                };
                inner.info_applied = false;

                let weak: Weak<Shared<F, A>> = Arc::downgrade(&this.shared);
                let pump = tokio::spawn(async move {
                    while let Some(event) = stream.recv().await {
                        let Some(shared) = weak.upgrade() else {
                            break;
                        };
                        WledAccessory { shared }.handle_event(generation, event);
                    }
                });
                inner.connection.attach_pump(pump);
            }

            if let Err(error) = client.init().await {
                tracing::error!(
                    controller = %controller.name,
                    address = %controller.address,
                    %error,
                    "error connecting controller"
                );
            }
        }
    }

    /// Shuts the connection down.
    ///
    /// Cancels a pending reconnect and tells the client to close. Only the
    /// first call has an effect.
    pub fn disconnect(&self) {
        let client = {
            let mut inner = self.shared.inner.lock();
            if !inner.connection.shutdown() {
                return;
            }
            inner.connection.client()
        };

        tracing::info!(controller = %self.name(), "disconnecting controller");
        if let Some(client) = client {
            client.disconnect();
        }
    }

    fn handle_event(&self, generation: u64, event: ClientEvent) {
        let mut inner = self.shared.inner.lock();
        if !inner.connection.is_current(generation) {
            tracing::debug!(
                controller = %self.name(),
                event = event.name(),
                "dropping event of a replaced connection"
            );
            return;
        }

        match event {
            ClientEvent::Open => {
                inner.connection.on_open();
                tracing::info!(controller = %self.name(), "controller connected");
            }
            ClientEvent::Close => {
                inner.connection.on_close();
                tracing::info!(controller = %self.name(), "controller disconnected");
            }
            ClientEvent::State(state) => self.on_state_received(&mut inner, &state),
            ClientEvent::Presets(table) => self.on_presets_received(&mut inner, &table),
            ClientEvent::Effects(effects) => self.log_payload("effects", &effects),
            ClientEvent::Config(config) => self.log_payload("config", &config),
            ClientEvent::Info(info) => self.on_info_received(&mut inner, &info),
            ClientEvent::Error(error) => self.on_error(&mut inner, &error),
        }
    }

    fn on_error(&self, inner: &mut Inner<F::Client>, error: &ClientError) {
        tracing::error!(controller = %self.name(), %error, "controller communication error");
        if !inner.connection.on_error() {
            return;
        }

        let id = inner.connection.next_timer_id();
        let delay = self.shared.options.reconnect.delay;
        let this = self.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let fire = this.shared.inner.lock().connection.timer_fired(id);
            if fire {
                this.connect(true).await;
            }
        });
        inner.connection.schedule_timer(id, timer);
    }

    // ========== Device Events ==========

    fn log_payload<T: Serialize>(&self, kind: &str, payload: &T) {
        if self.shared.options.logging {
            match serde_json::to_string(payload) {
                Ok(json) => {
                    tracing::info!(controller = %self.name(), payload = %json, "received {kind}");
                }
                Err(error) => {
                    tracing::info!(controller = %self.name(), %error, "received {kind}");
                }
            }
        } else {
            tracing::info!(controller = %self.name(), "received {kind}");
        }
    }

    fn on_state_received(&self, inner: &mut Inner<F::Client>, state: &DeviceState) {
        self.log_payload("state", state);

        if !inner.info_applied
            && let Some(info) = inner.connection.client().and_then(|client| client.info())
        {
            self.apply_information(inner, &info);
        }

        let accessory = &self.shared.accessory;
        let primary = ServiceKey::primary_light();

        for change in inner.led.reconcile(state) {
            match change {
                StateChange::Power(on) => {
                    tracing::info!(controller = %self.name(), on, "controller updated current on state");
                    accessory.update_characteristic(&primary, Characteristic::On, on.into());
                    if !on && let Some(client) = inner.connection.client() {
                        tracing::info!(controller = %self.name(), "requesting presets");
                        client.refresh_presets();
                    }
                }
                StateChange::Live(live) => {
                    tracing::info!(controller = %self.name(), live, "controller updated current live state");
                    if self.shared.controller.show_real_time_mode_button {
                        accessory.update_characteristic(
                            &ServiceKey::live_switch(),
                            Characteristic::On,
                            live.into(),
                        );
                    }
                }
                StateChange::Brightness(brightness) => {
                    tracing::info!(
                        controller = %self.name(),
                        brightness = brightness.value(),
                        "controller updated current brightness"
                    );
                    accessory.update_characteristic(
                        &primary,
                        Characteristic::Brightness,
                        brightness.value().into(),
                    );
                }
                StateChange::Color(hsv) => {
                    tracing::debug!(
                        controller = %self.name(),
                        hue = hsv.hub_hue(),
                        saturation = hsv.hub_saturation(),
                        value = hsv.hub_value(),
                        "controller updated current color"
                    );
                    accessory.update_characteristic(&primary, Characteristic::Hue, inner.led.hue().into());
                    accessory.update_characteristic(
                        &primary,
                        Characteristic::Saturation,
                        inner.led.saturation().into(),
                    );
                }
                StateChange::Preset { previous, current } => {
                    tracing::info!(
                        controller = %self.name(),
                        previous,
                        current,
                        "controller updated current preset"
                    );
                    let on = inner.led.on();
                    inner.presets.activate(current, on, accessory, self.name());
                }
                StateChange::Playlist { current, .. } => {
                    inner.presets.playlist_started(current, accessory, self.name());
                }
            }
        }
    }

    fn on_presets_received(&self, inner: &mut Inner<F::Client>, table: &PresetTable) {
        self.log_payload("presets", table);
        let configured = self.shared.controller.preset_names();
        inner
            .presets
            .sync(table, &configured, &self.shared.accessory, self.name());
    }

    fn on_info_received(&self, inner: &mut Inner<F::Client>, info: &DeviceInfo) {
        let initial = !inner.info_applied;
        tracing::info!(
            controller = %self.name(),
            "received {}info",
            if initial { "initial " } else { "" }
        );
        if initial {
            self.apply_information(inner, info);
        }
    }

    fn apply_information(&self, inner: &mut Inner<F::Client>, info: &DeviceInfo) {
        inner.info_applied = true;
        tracing::info!(
            controller = %self.name(),
            brand = %info.brand,
            product = %info.product,
            version = %info.version,
            mac = %info.mac,
            lc = info.leds.light_capabilities,
            "update accessory info"
        );

        let accessory = &self.shared.accessory;
        let information = ServiceKey::information();
        for (characteristic, value) in [
            (Characteristic::Manufacturer, &info.brand),
            (Characteristic::Model, &info.product),
            (Characteristic::FirmwareRevision, &info.version),
            (Characteristic::SerialNumber, &info.mac),
        ] {
            accessory.set_characteristic(&information, characteristic, value.as_str().into());
        }

        let capability = match LightCapability::try_from(info.leds.light_capabilities) {
            Ok(capability) => {
                tracing::info!(controller = %self.name(), "controller supports {capability} channel");
                capability
            }
            Err(error) => {
                tracing::error!(controller = %self.name(), %error, "unknown light capability, treating as on/off");
                LightCapability::OnOff
            }
        };

        let previous = inner.led.light_capability();
        if capability != previous {
            tracing::debug!(controller = %self.name(), %previous, %capability, "light capability changed");
        }

        // a reconnect may report less than an earlier connection did
        let primary = ServiceKey::primary_light();
        for (characteristic, supported) in [
            (Characteristic::Brightness, capability.supports_brightness()),
            (Characteristic::Hue, capability.supports_color()),
            (Characteristic::Saturation, capability.supports_color()),
        ] {
            if supported {
                accessory.enable_characteristic(&primary, characteristic);
            } else {
                accessory.disable_characteristic(&primary, characteristic);
            }
        }
        inner.led.set_light_capability(capability);
    }

    // ========== Hub Writes ==========

    fn established_client(&self, inner: &Inner<F::Client>) -> Result<Arc<F::Client>> {
        inner.connection.established_client().inspect_err(|_| {
            tracing::error!(controller = %self.name(), "no connection to controller");
        })
    }

    /// Turns the strip on or off.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` if no connection is established.
    pub fn set_on(&self, on: bool) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        let client = self.established_client(&inner)?;

        inner.led.apply(&StateChange::Power(on));
        tracing::info!(controller = %self.name(), on, "set on state");
        if on {
            client.turn_on();
        } else {
            // the mirror is already off, so the confirming push reports no change
            client.turn_off();
            tracing::info!(controller = %self.name(), "requesting presets");
            client.refresh_presets();
        }
        Ok(())
    }

    /// Enters or leaves live data mode.
    ///
    /// Leaving ignores live data until the controller reboots, unless the
    /// controller is configured to reset live mode after the stream.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` if no connection is established.
    pub fn set_live(&self, live: bool) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        let client = self.established_client(&inner)?;

        inner.led.apply(&StateChange::Live(live));
        tracing::info!(controller = %self.name(), live, "set live state");
        if live {
            client.allow_live_data();
        } else {
            let reset = self.shared.controller.reset_real_time_mode_after_stream;
            tracing::info!(controller = %self.name(), reset_after_stream = reset, "leaving live mode");
            client.ignore_live_data(!reset);
        }
        Ok(())
    }

    /// Sets the brightness in percent.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` if no connection is established, or
    /// `Error::Value` if `brightness` exceeds 100.
    pub fn set_brightness(&self, brightness: u8) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        let client = self.established_client(&inner)?;
        let brightness = Brightness::new(brightness)?;

        inner.led.apply(&StateChange::Brightness(brightness));
        tracing::info!(controller = %self.name(), brightness = brightness.value(), "set brightness");
        client.set_brightness(brightness.to_device());
        Ok(())
    }

    /// Sets the hue in degrees and sends the resulting color.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` if no connection is established, or
    /// `Error::Value` if `hue` is outside 0-360.
    pub fn set_hue(&self, hue: f64) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        let client = self.established_client(&inner)?;
        check_range(hue, 360.0)?;

        inner.led.set_hue(hue);
        let color = inner.led.target_color();
        tracing::info!(controller = %self.name(), hue, rgb = %color, "set hue");
        client.set_color(color);
        Ok(())
    }

    /// Sets the saturation in percent and sends the resulting color.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` if no connection is established, or
    /// `Error::Value` if `saturation` is outside 0-100.
    pub fn set_saturation(&self, saturation: f64) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        let client = self.established_client(&inner)?;
        check_range(saturation, 100.0)?;

        inner.led.set_saturation(saturation);
        let color = inner.led.target_color();
        tracing::info!(controller = %self.name(), saturation, rgb = %color, "set saturation");
        client.set_color(color);
        Ok(())
    }

    /// Switches a preset or playlist on, or turns the strip off.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` if no connection is established, or
    /// `Error::ServiceNotFound` if no switch is bound to `id`.
    pub fn set_preset(&self, id: i32, on: bool) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        let client = self.established_client(&inner)?;
        if !inner.presets.set_on(id, on) {
            return Err(Error::ServiceNotFound(
                ServiceKey::preset_switch(id).to_string(),
            ));
        }

        if let Some(switch) = inner.presets.switch(id) {
            tracing::info!(controller = %self.name(), on, "set on state for {}", switch.descriptor);
        }
        if on {
            client.set_preset(id);
        } else {
            client.turn_off();
        }
        Ok(())
    }

    /// Asks the controller to send its preset table again.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` if no connection is established.
    pub fn refresh_presets(&self) -> Result<()> {
        let inner = self.shared.inner.lock();
        let client = self.established_client(&inner)?;
        tracing::info!(controller = %self.name(), "requesting presets");
        client.refresh_presets();
        Ok(())
    }

    /// Asks the controller to send its effect list again.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` if no connection is established.
    pub fn refresh_effects(&self) -> Result<()> {
        let inner = self.shared.inner.lock();
        let client = self.established_client(&inner)?;
        tracing::info!(controller = %self.name(), "requesting effects");
        client.refresh_effects();
        Ok(())
    }

    // ========== Hub Reads ==========

    /// Returns the mirrored on state.
    #[must_use]
    pub fn get_on(&self) -> bool {
        let on = self.shared.inner.lock().led.on();
        tracing::debug!(controller = %self.name(), on, "get on state");
        on
    }

    /// Returns the mirrored live state.
    #[must_use]
    pub fn get_live(&self) -> bool {
        let live = self.shared.inner.lock().led.live();
        tracing::debug!(controller = %self.name(), live, "get live state");
        live
    }

    /// Returns the mirrored brightness in percent.
    #[must_use]
    pub fn get_brightness(&self) -> u8 {
        let brightness = self.shared.inner.lock().led.brightness().value();
        tracing::debug!(controller = %self.name(), brightness, "get brightness");
        brightness
    }

    /// Returns the mirrored hue in degrees.
    #[must_use]
    pub fn get_hue(&self) -> f64 {
        let hue = self.shared.inner.lock().led.hue();
        tracing::debug!(controller = %self.name(), hue, "get hue");
        hue
    }

    /// Returns the mirrored saturation in percent.
    #[must_use]
    pub fn get_saturation(&self) -> f64 {
        let saturation = self.shared.inner.lock().led.saturation();
        tracing::debug!(controller = %self.name(), saturation, "get saturation");
        saturation
    }

    /// Returns the mirrored on flag of a preset switch.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServiceNotFound` if no switch is bound to `id`.
    pub fn get_preset(&self, id: i32) -> Result<bool> {
        let inner = self.shared.inner.lock();
        let switch = inner
            .presets
            .switch(id)
            .ok_or_else(|| Error::ServiceNotFound(ServiceKey::preset_switch(id).to_string()))?;
        tracing::debug!(controller = %self.name(), on = switch.on, "get on state for {}", switch.descriptor);
        Ok(switch.on)
    }

    // ========== Hub Dispatch ==========

    /// Routes a characteristic write from the hub.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServiceNotFound` for services this accessory does
    /// not expose and `Error::NotConnected` for every other write while no
    /// connection is established. Once connected, returns
    /// `Error::UnsupportedCharacteristic` for characteristics the service
    /// does not handle, `Error::InvalidValue` for values of the wrong type,
    /// and the errors of the typed setters.
    pub fn handle_set(
        &self,
        service: &ServiceKey,
        characteristic: Characteristic,
        value: &CharacteristicValue,
    ) -> Result<()> {
        let capability = {
            let inner = self.shared.inner.lock();
            if self.exposes(service) {
                self.established_client(&inner)?;
            }
            inner.led.light_capability()
        };

        if *service == ServiceKey::primary_light() {
            match characteristic {
                Characteristic::On => self.set_on(value.as_bool()?),
                Characteristic::Brightness if capability.supports_brightness() => {
                    self.set_brightness(to_percent(value.as_number()?)?)
                }
                Characteristic::Hue if capability.supports_color() => {
                    self.set_hue(value.as_number()?)
                }
                Characteristic::Saturation if capability.supports_color() => {
                    self.set_saturation(value.as_number()?)
                }
                _ => Err(Error::UnsupportedCharacteristic),
            }
        } else if service.is_live_switch() && self.shared.controller.show_real_time_mode_button {
            match characteristic {
                Characteristic::On => self.set_live(value.as_bool()?),
                _ => Err(Error::UnsupportedCharacteristic),
            }
        } else if let Some(id) = service.preset_id() {
            match characteristic {
                Characteristic::On => self.set_preset(id, value.as_bool()?),
                _ => Err(Error::UnsupportedCharacteristic),
            }
        } else {
            Err(Error::ServiceNotFound(service.to_string()))
        }
    }

    fn exposes(&self, service: &ServiceKey) -> bool {
        *service == ServiceKey::primary_light()
            || (service.is_live_switch() && self.shared.controller.show_real_time_mode_button)
            || service.preset_id().is_some()
    }

    /// Routes a characteristic read from the hub.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServiceNotFound` for services this accessory does
    /// not expose and `Error::UnsupportedCharacteristic` for
    /// characteristics the service does not handle.
    pub fn handle_get(
        &self,
        service: &ServiceKey,
        characteristic: Characteristic,
    ) -> Result<CharacteristicValue> {
        let capability = self.shared.inner.lock().led.light_capability();

        if *service == ServiceKey::primary_light() {
            match characteristic {
                Characteristic::On => Ok(self.get_on().into()),
                Characteristic::Brightness if capability.supports_brightness() => {
                    Ok(self.get_brightness().into())
                }
                Characteristic::Hue if capability.supports_color() => Ok(self.get_hue().into()),
                Characteristic::Saturation if capability.supports_color() => {
                    Ok(self.get_saturation().into())
                }
                _ => Err(Error::UnsupportedCharacteristic),
            }
        } else if service.is_live_switch() && self.shared.controller.show_real_time_mode_button {
            match characteristic {
                Characteristic::On => Ok(self.get_live().into()),
                _ => Err(Error::UnsupportedCharacteristic),
            }
        } else if let Some(id) = service.preset_id() {
            match characteristic {
                Characteristic::On => Ok(self.get_preset(id)?.into()),
                _ => Err(Error::UnsupportedCharacteristic),
            }
        } else {
            Err(Error::ServiceNotFound(service.to_string()))
        }
    }
}

fn wire_services<A: AccessoryHandle>(controller: &ControllerConfig, accessory: &A) {
    let primary = ServiceKey::primary_light();
    if !accessory.has_service(&primary) {
        accessory.add_service(&primary, &controller.name);
    }
    accessory.set_characteristic(&primary, Characteristic::Name, controller.name.as_str().into());
    accessory.set_primary_service(&primary);
    accessory.enable_characteristic(&primary, Characteristic::On);

    let information = ServiceKey::information();
    if !accessory.has_service(&information) {
        accessory.add_service(&information, &controller.name);
    }
    for (characteristic, value) in [
        (Characteristic::Manufacturer, PLUGIN_AUTHOR),
        (Characteristic::Model, PLUGIN_NAME),
        (Characteristic::FirmwareRevision, NOT_SET),
        (Characteristic::SerialNumber, NOT_SET),
    ] {
        accessory.set_characteristic(&information, characteristic, value.into());
    }

    let live = ServiceKey::live_switch();
    if controller.show_real_time_mode_button {
        if !accessory.has_service(&live) {
            accessory.add_service(&live, LIVE_SERVICE_NAME);
        }
        accessory.set_characteristic(&live, Characteristic::Name, LIVE_SWITCH_NAME.into());
        accessory.enable_characteristic(&live, Characteristic::On);
        accessory.link_service(&primary, &live);
    } else if accessory.has_service(&live) {
        tracing::debug!(controller = %controller.name, "removing cached live switch");
        accessory.unlink_service(&primary, &live);
        accessory.remove_service(&live);
    }
}

fn check_range(value: f64, max: f64) -> Result<()> {
    if (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValueError::OutOfRange {
            min: 0.0,
            max,
            actual: value,
        }
        .into())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_percent(value: f64) -> Result<u8> {
    check_range(value, 100.0)?;
    Ok(value.round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LedsInfo, PresetEntry, Segment};
    use crate::event::AccessoryId;
    use crate::testing::{ClientCommand, MemoryAccessory, RecordingFactory};
    use crate::types::RgbColor;

    type TestAccessory = WledAccessory<RecordingFactory, MemoryAccessory>;

    fn controller() -> ControllerConfig {
        ControllerConfig::new("Desk", "10.0.0.5").with_presets("Relax,Party")
    }

    fn build(controller: ControllerConfig) -> (TestAccessory, RecordingFactory, MemoryAccessory) {
        let factory = RecordingFactory::new();
        let hub = MemoryAccessory::new(&controller.name, AccessoryId::from_address(&controller.address));
        let accessory = WledAccessory::new(
            controller,
            factory.clone(),
            hub.clone(),
            AccessoryOptions::default(),
        );
        (accessory, factory, hub)
    }

    fn info(lc: u8) -> DeviceInfo {
        DeviceInfo {
            brand: "WLED".into(),
            product: "FOSS".into(),
            version: "0.14.4".into(),
            mac: "aabbccddeeff".into(),
            leds: LedsInfo {
                light_capabilities: lc,
            },
        }
    }

    fn current_generation(accessory: &TestAccessory) -> u64 {
        accessory.shared.inner.lock().connection.generation()
    }

    fn deliver(accessory: &TestAccessory, event: ClientEvent) {
        accessory.handle_event(current_generation(accessory), event);
    }

    async fn connected(controller: ControllerConfig) -> (TestAccessory, RecordingFactory, MemoryAccessory) {
        let (accessory, factory, hub) = build(controller);
        accessory.connect(false).await;
        deliver(&accessory, ClientEvent::Open);
        (accessory, factory, hub)
    }

    fn text(value: &str) -> Option<CharacteristicValue> {
        Some(CharacteristicValue::from(value))
    }

    #[test]
    fn construction_wires_primary_and_information() {
        let (_accessory, _factory, hub) = build(controller());
        let primary = ServiceKey::primary_light();

        assert_eq!(hub.primary(), Some(primary.clone()));
        assert_eq!(hub.value(&primary, Characteristic::Name), text("Desk"));
        assert!(hub.is_enabled(&primary, Characteristic::On));
        assert!(!hub.is_enabled(&primary, Characteristic::Brightness));
        let information = ServiceKey::information();
        assert_eq!(hub.value(&information, Characteristic::Manufacturer), text("smhex"));
        assert_eq!(hub.value(&information, Characteristic::Model), text("homebridge-wled-ws"));
        assert_eq!(hub.value(&information, Characteristic::SerialNumber), text("not set"));
        assert!(!hub.has_service(&ServiceKey::live_switch()));
    }

    #[test]
    fn live_switch_is_added_and_linked() {
        let (_accessory, _factory, hub) = build(controller().with_live_switch());
        let live = ServiceKey::live_switch();

        assert_eq!(hub.service_name(&live).as_deref(), Some("Live Mode"));
        assert_eq!(hub.value(&live, Characteristic::Name), text("Ambilight"));
        assert!(hub.links(&ServiceKey::primary_light()).contains(&live));
    }

    #[test]
    fn cached_live_switch_is_removed_when_disabled() {
        let hub = MemoryAccessory::new("Desk", AccessoryId::from_address("10.0.0.5"));
        hub.add_service(&ServiceKey::live_switch(), "Live Mode");

        let _accessory = WledAccessory::new(
            controller(),
            RecordingFactory::new(),
            hub.clone(),
            AccessoryOptions::default(),
        );
        assert!(!hub.has_service(&ServiceKey::live_switch()));
    }

    #[tokio::test]
    async fn info_is_applied_once_per_connection() {
        let (accessory, _factory, hub) = connected(controller()).await;
        let information = ServiceKey::information();

        deliver(&accessory, ClientEvent::Info(info(1)));
        assert_eq!(hub.value(&information, Characteristic::Manufacturer), text("WLED"));
        assert_eq!(hub.value(&information, Characteristic::FirmwareRevision), text("0.14.4"));
        assert!(hub.is_enabled(&ServiceKey::primary_light(), Characteristic::Hue));

        let mut later = info(1);
        later.version = "0.15.0".into();
        deliver(&accessory, ClientEvent::Info(later.clone()));
        assert_eq!(hub.value(&information, Characteristic::FirmwareRevision), text("0.14.4"));

        accessory.connect(true).await;
        deliver(&accessory, ClientEvent::Info(later));
        assert_eq!(hub.value(&information, Characteristic::FirmwareRevision), text("0.15.0"));
    }

    #[tokio::test]
    async fn white_capability_enables_brightness_only() {
        let (accessory, _factory, hub) = connected(controller()).await;
        deliver(&accessory, ClientEvent::Info(info(2)));

        let primary = ServiceKey::primary_light();
        assert!(hub.is_enabled(&primary, Characteristic::Brightness));
        assert!(!hub.is_enabled(&primary, Characteristic::Hue));
        assert_eq!(accessory.led_state().light_capability(), LightCapability::White);
    }

    #[tokio::test]
    async fn unknown_capability_keeps_on_off() {
        let (accessory, _factory, hub) = connected(controller()).await;
        deliver(&accessory, ClientEvent::Info(info(9)));

        assert_eq!(accessory.led_state().light_capability(), LightCapability::OnOff);
        assert!(!hub.is_enabled(&ServiceKey::primary_light(), Characteristic::Brightness));
        assert_eq!(
            hub.value(&ServiceKey::information(), Characteristic::Model),
            text("FOSS")
        );
    }

    #[tokio::test]
    async fn lower_capability_after_reconnect_disables_characteristics() {
        let (accessory, _factory, hub) = connected(controller()).await;
        let primary = ServiceKey::primary_light();
        deliver(&accessory, ClientEvent::Info(info(3)));
        assert!(hub.is_enabled(&primary, Characteristic::Saturation));

        accessory.connect(true).await;
        deliver(&accessory, ClientEvent::Info(info(2)));
        assert!(hub.is_enabled(&primary, Characteristic::Brightness));
        assert!(!hub.is_enabled(&primary, Characteristic::Hue));
        assert!(!hub.is_enabled(&primary, Characteristic::Saturation));
        assert!(matches!(
            accessory.handle_get(&primary, Characteristic::Hue),
            Err(Error::UnsupportedCharacteristic)
        ));

        accessory.connect(true).await;
        deliver(&accessory, ClientEvent::Info(info(9)));
        assert!(!hub.is_enabled(&primary, Characteristic::Brightness));
        assert!(hub.is_enabled(&primary, Characteristic::On));
        assert_eq!(accessory.led_state().light_capability(), LightCapability::OnOff);
    }

    #[tokio::test]
    async fn first_state_pulls_cached_info() {
        let (accessory, factory, hub) = connected(controller()).await;
        factory.latest().unwrap().set_info(info(3));

        deliver(&accessory, ClientEvent::State(DeviceState::default()));
        assert_eq!(accessory.led_state().light_capability(), LightCapability::Rgbw);
        assert_eq!(
            hub.value(&ServiceKey::information(), Characteristic::SerialNumber),
            text("aabbccddeeff")
        );
    }

    #[tokio::test]
    async fn state_updates_only_changed_characteristics() {
        let (accessory, _factory, hub) = connected(controller()).await;
        deliver(&accessory, ClientEvent::Info(info(1)));
        let primary = ServiceKey::primary_light();

        let state = DeviceState {
            on: true,
            brightness: 128,
            segments: vec![Segment::with_color(RgbColor::new(255, 0, 0))],
            ..DeviceState::default()
        };
        deliver(&accessory, ClientEvent::State(state.clone()));

        assert_eq!(hub.updates(&primary, Characteristic::On), vec![CharacteristicValue::Bool(true)]);
        assert_eq!(hub.updates(&primary, Characteristic::Brightness), vec![CharacteristicValue::Number(50.0)]);
        assert_eq!(hub.updates(&primary, Characteristic::Saturation), vec![CharacteristicValue::Number(100.0)]);

        hub.clear_updates();
        deliver(&accessory, ClientEvent::State(state));
        assert_eq!(hub.update_count(), 0);
    }

    #[tokio::test]
    async fn turning_off_requests_presets() {
        let (accessory, factory, _hub) = connected(controller()).await;
        deliver(
            &accessory,
            ClientEvent::State(DeviceState {
                on: true,
                ..DeviceState::default()
            }),
        );
        deliver(&accessory, ClientEvent::State(DeviceState::default()));

        let probe = factory.latest().unwrap();
        assert_eq!(probe.count(&ClientCommand::RefreshPresets), 1);
    }

    #[tokio::test]
    async fn live_state_updates_live_switch() {
        let (accessory, _factory, hub) = connected(controller().with_live_switch()).await;
        deliver(
            &accessory,
            ClientEvent::State(DeviceState {
                live_data_override: Some(0),
                ..DeviceState::default()
            }),
        );

        assert_eq!(
            hub.updates(&ServiceKey::live_switch(), Characteristic::On),
            vec![CharacteristicValue::Bool(true)]
        );
        assert!(accessory.get_live());
    }

    #[tokio::test]
    async fn presets_then_state_activate_switch() {
        let (accessory, _factory, hub) = connected(controller()).await;
        let mut table = PresetTable::default();
        table.insert(1, PresetEntry::preset("Relax"));
        table.insert(2, PresetEntry::preset("Party"));
        deliver(&accessory, ClientEvent::Presets(table));

        deliver(
            &accessory,
            ClientEvent::State(DeviceState {
                on: true,
                preset_id: 2,
                ..DeviceState::default()
            }),
        );

        assert_eq!(accessory.active_preset(), Some(2));
        assert!(accessory.get_preset(2).unwrap());
        assert_eq!(
            hub.updates(&ServiceKey::preset_switch(2), Characteristic::On),
            vec![CharacteristicValue::Bool(true)]
        );
    }

    #[tokio::test]
    async fn stale_events_are_dropped() {
        let (accessory, _factory, _hub) = connected(controller()).await;
        let stale = current_generation(&accessory);
        accessory.connect(true).await;

        accessory.handle_event(stale, ClientEvent::Open);
        assert!(!accessory.is_established());
    }

    #[tokio::test]
    async fn setters_translate_to_device_commands() {
        let (accessory, factory, _hub) = connected(controller().with_reset_after_stream(true)).await;
        deliver(&accessory, ClientEvent::Info(info(1)));

        accessory.set_on(true).unwrap();
        accessory.set_brightness(50).unwrap();
        accessory.set_saturation(100.0).unwrap();
        accessory.set_hue(120.0).unwrap();
        accessory.set_live(true).unwrap();
        accessory.set_live(false).unwrap();

        let commands = factory.latest().unwrap().commands();
        assert_eq!(
            commands,
            vec![
                ClientCommand::Init,
                ClientCommand::TurnOn,
                ClientCommand::SetBrightness(128),
                ClientCommand::SetColor(RgbColor::new(128, 0, 0)),
                ClientCommand::SetColor(RgbColor::new(0, 128, 0)),
                ClientCommand::AllowLiveData,
                ClientCommand::IgnoreLiveData {
                    until_reboot: false
                },
            ]
        );
        assert_eq!(accessory.get_brightness(), 50);
        assert!((accessory.get_hue() - 120.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn setters_reject_out_of_range_values() {
        let (accessory, factory, _hub) = connected(controller()).await;

        assert!(matches!(accessory.set_brightness(101), Err(Error::Value(_))));
        assert!(matches!(accessory.set_hue(361.0), Err(Error::Value(_))));
        assert!(matches!(accessory.set_saturation(-1.0), Err(Error::Value(_))));
        assert_eq!(factory.latest().unwrap().commands(), vec![ClientCommand::Init]);
    }

    #[tokio::test]
    async fn preset_switch_writes() {
        let (accessory, factory, _hub) = connected(controller()).await;
        let mut table = PresetTable::default();
        table.insert(4, PresetEntry::playlist("Party"));
        deliver(&accessory, ClientEvent::Presets(table));

        accessory.set_preset(4, true).unwrap();
        accessory.set_preset(4, false).unwrap();
        assert!(matches!(
            accessory.set_preset(5, true),
            Err(Error::ServiceNotFound(_))
        ));

        let probe = factory.latest().unwrap();
        assert_eq!(probe.count(&ClientCommand::SetPreset(4)), 1);
        assert_eq!(probe.count(&ClientCommand::TurnOff), 1);
    }

    #[tokio::test]
    async fn dispatch_routes_by_service() {
        let (accessory, factory, _hub) = connected(controller().with_live_switch()).await;
        deliver(&accessory, ClientEvent::Info(info(2)));
        let primary = ServiceKey::primary_light();

        accessory
            .handle_set(&primary, Characteristic::Brightness, &CharacteristicValue::Number(20.4))
            .unwrap();
        assert_eq!(
            accessory.handle_get(&primary, Characteristic::Brightness).unwrap(),
            CharacteristicValue::from(20u8)
        );
        assert!(matches!(
            accessory.handle_set(&primary, Characteristic::Hue, &CharacteristicValue::Number(10.0)),
            Err(Error::UnsupportedCharacteristic)
        ));
        assert!(matches!(
            accessory.handle_set(&primary, Characteristic::On, &CharacteristicValue::Number(1.0)),
            Err(Error::InvalidValue(_))
        ));
        assert!(matches!(
            accessory.handle_get(&ServiceKey::preset_switch(9), Characteristic::On),
            Err(Error::ServiceNotFound(_))
        ));

        accessory
            .handle_set(&ServiceKey::live_switch(), Characteristic::On, &true.into())
            .unwrap();
        assert_eq!(factory.latest().unwrap().count(&ClientCommand::AllowLiveData), 1);
    }

    #[tokio::test]
    async fn init_failure_is_logged_not_retried() {
        let (accessory, factory, _hub) = build(controller());
        factory.fail_init(ClientError::InitFailed("refused".into()));

        accessory.connect(false).await;
        assert_eq!(factory.created(), 1);
        assert_eq!(accessory.connection_state(), ConnectionState::Connecting);
        assert!(!accessory.shared.inner.lock().connection.has_pending_timer());
    }
}

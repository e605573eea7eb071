// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Preset switch synchronization.

use std::collections::{BTreeMap, BTreeSet};

use crate::client::{NO_PRESET, PresetTable};
use crate::hub::{AccessoryHandle, Characteristic, CharacteristicValue, ServiceKey};

use super::{PresetDescriptor, PresetSwitch};

/// Outcome of one synchronization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Configured names with no matching entry on the controller.
    pub missing: Vec<String>,
    /// Ids of switches that were created.
    pub added: Vec<i32>,
    /// Ids of switches that are bound after the pass.
    pub retained: Vec<i32>,
    /// Ids of switches that were removed.
    pub removed: Vec<i32>,
}

/// Keeps preset switches in line with the controller's preset table.
///
/// The synchronizer records the id of every switch bound on the accessory,
/// including switches restored from the hub cache, and reclaims exactly
/// those that are no longer wanted. At most one preset is active.
#[derive(Debug, Clone, Default)]
pub struct PresetSynchronizer {
    switches: BTreeMap<i32, PresetSwitch>,
    bound: BTreeSet<i32>,
    active: Option<i32>,
}

impl PresetSynchronizer {
    /// Creates a synchronizer with no bound switches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a synchronizer that knows the preset switches already
    /// present on a restored accessory.
    #[must_use]
    pub fn restore<A: AccessoryHandle>(accessory: &A) -> Self {
        let bound = accessory
            .services()
            .iter()
            .filter_map(ServiceKey::preset_id)
            .collect();
        Self {
            bound,
            ..Self::default()
        }
    }

    /// Returns the switch bound to `id`.
    #[must_use]
    pub fn switch(&self, id: i32) -> Option<&PresetSwitch> {
        self.switches.get(&id)
    }

    /// Iterates over the known switches in id order.
    pub fn switches(&self) -> impl Iterator<Item = &PresetSwitch> {
        self.switches.values()
    }

    /// Returns the active preset id.
    #[must_use]
    pub fn active(&self) -> Option<i32> {
        self.active
    }

    /// Stores a hub-written on flag. Returns false for unknown ids.
    pub fn set_on(&mut self, id: i32, on: bool) -> bool {
        match self.switches.get_mut(&id) {
            Some(switch) => {
                switch.on = on;
                true
            }
            None => false,
        }
    }

    /// Creates, keeps and removes switches for a new preset table.
    pub fn sync<A: AccessoryHandle>(
        &mut self,
        table: &PresetTable,
        configured: &[&str],
        accessory: &A,
        controller: &str,
    ) -> SyncReport {
        let available = PresetDescriptor::from_table(table);
        for descriptor in &available {
            tracing::debug!(controller, "got {descriptor} from controller");
        }

        let missing: Vec<String> = configured
            .iter()
            .filter(|name| !available.iter().any(|d| d.name == **name))
            .map(|name| (*name).to_string())
            .collect();
        if !missing.is_empty() {
            tracing::error!(
                controller,
                missing = ?missing,
                "configured presets not supported by controller"
            );
        }

        let primary = ServiceKey::primary_light();
        let mut report = SyncReport {
            missing,
            ..SyncReport::default()
        };
        let mut switches = BTreeMap::new();

        for descriptor in available
            .into_iter()
            .filter(|d| configured.contains(&d.name.as_str()))
        {
            let key = descriptor.service_key();
            if !accessory.has_service(&key) {
                accessory.add_service(&key, &descriptor.name);
                accessory.enable_characteristic(&key, Characteristic::ConfiguredName);
                accessory.set_characteristic(
                    &key,
                    Characteristic::ConfiguredName,
                    CharacteristicValue::from(descriptor.name.as_str()),
                );
                accessory.link_service(&primary, &key);
                report.added.push(descriptor.id);
            }
            accessory.enable_characteristic(&key, Characteristic::On);
            tracing::debug!(controller, "added switch for {descriptor}");

            let on = self.switches.get(&descriptor.id).is_some_and(|s| s.on);
            self.bound.insert(descriptor.id);
            report.retained.push(descriptor.id);
            switches.insert(descriptor.id, PresetSwitch { descriptor, on });
        }

        let orphaned: Vec<i32> = self
            .bound
            .iter()
            .copied()
            .filter(|id| !switches.contains_key(id))
            .collect();
        for id in orphaned {
            let key = ServiceKey::preset_switch(id);
            tracing::debug!(controller, id, "removing cached preset switch");
            accessory.unlink_service(&primary, &key);
            accessory.remove_service(&key);
            self.bound.remove(&id);
            report.removed.push(id);
        }

        if self.active.is_some_and(|id| !switches.contains_key(&id)) {
            self.active = None;
        }
        self.switches = switches;
        report
    }

    /// Moves the active pointer to `current`.
    ///
    /// The previously active switch is forced off. A known `current` switch
    /// takes the top-level `on` state and becomes active; an unknown id
    /// leaves no preset active.
    pub fn activate<A: AccessoryHandle>(
        &mut self,
        current: i32,
        on: bool,
        accessory: &A,
        controller: &str,
    ) {
        match self.active.take() {
            Some(previous) => {
                if let Some(switch) = self.switches.get_mut(&previous) {
                    switch.on = false;
                    tracing::info!(
                        controller,
                        "set last active {} to off",
                        switch.descriptor
                    );
                    accessory.update_characteristic(
                        &switch.descriptor.service_key(),
                        Characteristic::On,
                        CharacteristicValue::Bool(false),
                    );
                }
            }
            None => tracing::debug!(controller, "last active preset not set"),
        }

        if let Some(switch) = self.switches.get_mut(&current) {
            switch.on = on;
            tracing::info!(
                controller,
                on,
                "set new {}",
                switch.descriptor
            );
            accessory.update_characteristic(
                &switch.descriptor.service_key(),
                Characteristic::On,
                CharacteristicValue::Bool(on),
            );
            self.active = Some(current);
        } else if current == NO_PRESET {
            tracing::debug!(controller, "no preset selected by controller");
        } else {
            tracing::debug!(controller, id = current, "preset not configured");
        }
    }

    /// Forces the switch of a newly started playlist off.
    pub fn playlist_started<A: AccessoryHandle>(
        &mut self,
        id: i32,
        accessory: &A,
        controller: &str,
    ) {
        if id == NO_PRESET {
            return;
        }
        tracing::info!(controller, id, "controller updated current playlist");
        if let Some(switch) = self.switches.get_mut(&id) {
            switch.on = false;
            accessory.update_characteristic(
                &switch.descriptor.service_key(),
                Characteristic::On,
                CharacteristicValue::Bool(false),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PresetEntry;
    use crate::event::AccessoryId;
    use crate::testing::MemoryAccessory;

    fn accessory() -> MemoryAccessory {
        let accessory = MemoryAccessory::new("Desk", AccessoryId::from_address("10.0.0.5"));
        accessory.add_service(&ServiceKey::primary_light(), "Desk");
        accessory
    }

    fn table() -> PresetTable {
        let mut table = PresetTable::default();
        table.insert(0, PresetEntry::default());
        table.insert(1, PresetEntry::preset("Relax"));
        table.insert(2, PresetEntry::preset("Party"));
        table.insert(3, PresetEntry::playlist("Cycle"));
        table
    }

    fn on_value(accessory: &MemoryAccessory, id: i32) -> Option<CharacteristicValue> {
        accessory.value(&ServiceKey::preset_switch(id), Characteristic::On)
    }

    #[test]
    fn creates_configured_switches_only() {
        let accessory = accessory();
        let mut sync = PresetSynchronizer::new();

        let report = sync.sync(&table(), &["Relax", "Cycle"], &accessory, "Desk");

        assert_eq!(report.added, vec![1, 3]);
        assert!(report.missing.is_empty());
        assert!(accessory.has_service(&ServiceKey::preset_switch(1)));
        assert!(!accessory.has_service(&ServiceKey::preset_switch(2)));
        assert!(sync.switch(3).unwrap().descriptor.is_playlist);
        assert_eq!(
            accessory.value(&ServiceKey::preset_switch(1), Characteristic::ConfiguredName),
            Some(CharacteristicValue::from("Relax"))
        );
        assert!(
            accessory
                .links(&ServiceKey::primary_light())
                .contains(&ServiceKey::preset_switch(3))
        );
    }

    #[test]
    fn reports_missing_names() {
        let accessory = accessory();
        let mut sync = PresetSynchronizer::new();

        let report = sync.sync(&table(), &["Relax", "Sunrise"], &accessory, "Desk");
        assert_eq!(report.missing, vec!["Sunrise".to_string()]);
    }

    #[test]
    fn second_pass_keeps_services_and_flags() {
        let accessory = accessory();
        let mut sync = PresetSynchronizer::new();
        sync.sync(&table(), &["Relax"], &accessory, "Desk");
        sync.set_on(1, true);

        let report = sync.sync(&table(), &["Relax"], &accessory, "Desk");
        assert!(report.added.is_empty());
        assert_eq!(report.retained, vec![1]);
        assert!(sync.switch(1).unwrap().on);
    }

    #[test]
    fn reclaims_restored_switches_no_longer_configured() {
        let accessory = accessory();
        accessory.add_service(&ServiceKey::preset_switch(2), "Party");
        accessory.add_service(&ServiceKey::preset_switch(400), "Old");

        let mut sync = PresetSynchronizer::restore(&accessory);

        let report = sync.sync(&table(), &["Relax"], &accessory, "Desk");
        assert_eq!(report.added, vec![1]);
        assert_eq!(report.removed, vec![2, 400]);
        assert!(!accessory.has_service(&ServiceKey::preset_switch(2)));
        assert!(!accessory.has_service(&ServiceKey::preset_switch(400)));
        assert!(accessory.has_service(&ServiceKey::preset_switch(1)));
    }

    #[test]
    fn empty_configuration_removes_everything() {
        let accessory = accessory();
        let mut sync = PresetSynchronizer::new();
        sync.sync(&table(), &["Relax", "Party"], &accessory, "Desk");

        let report = sync.sync(&table(), &[], &accessory, "Desk");
        assert_eq!(report.removed, vec![1, 2]);
        assert_eq!(sync.switches().count(), 0);
    }

    #[test]
    fn activation_moves_the_single_pointer() {
        let accessory = accessory();
        let mut sync = PresetSynchronizer::new();
        sync.sync(&table(), &["Relax", "Party"], &accessory, "Desk");

        sync.activate(1, true, &accessory, "Desk");
        assert_eq!(sync.active(), Some(1));
        assert_eq!(on_value(&accessory, 1), Some(CharacteristicValue::Bool(true)));

        sync.activate(2, true, &accessory, "Desk");
        assert_eq!(sync.active(), Some(2));
        assert!(!sync.switch(1).unwrap().on);
        assert_eq!(on_value(&accessory, 1), Some(CharacteristicValue::Bool(false)));
        assert_eq!(on_value(&accessory, 2), Some(CharacteristicValue::Bool(true)));
    }

    #[test]
    fn activation_of_unknown_id_clears_pointer() {
        let accessory = accessory();
        let mut sync = PresetSynchronizer::new();
        sync.sync(&table(), &["Relax"], &accessory, "Desk");
        sync.activate(1, false, &accessory, "Desk");

        sync.activate(NO_PRESET, true, &accessory, "Desk");
        assert_eq!(sync.active(), None);

        sync.activate(42, true, &accessory, "Desk");
        assert_eq!(sync.active(), None);
    }

    #[test]
    fn playlist_start_forces_switch_off() {
        let accessory = accessory();
        let mut sync = PresetSynchronizer::new();
        sync.sync(&table(), &["Cycle"], &accessory, "Desk");
        sync.set_on(3, true);

        sync.playlist_started(3, &accessory, "Desk");
        assert!(!sync.switch(3).unwrap().on);
        assert_eq!(on_value(&accessory, 3), Some(CharacteristicValue::Bool(false)));
    }

    #[test]
    fn removed_active_switch_clears_pointer() {
        let accessory = accessory();
        let mut sync = PresetSynchronizer::new();
        sync.sync(&table(), &["Relax"], &accessory, "Desk");
        sync.activate(1, true, &accessory, "Desk");

        sync.sync(&table(), &[], &accessory, "Desk");
        assert_eq!(sync.active(), None);
    }
}

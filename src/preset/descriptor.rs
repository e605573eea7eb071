// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named presets and their switch state.

use std::fmt;

use crate::client::PresetTable;
use crate::hub::ServiceKey;

/// A named preset or playlist stored on the controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PresetDescriptor {
    /// Preset id on the controller.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// True for playlists, which have no segment data.
    pub is_playlist: bool,
}

impl PresetDescriptor {
    /// Collects every entry of the table that has a name.
    ///
    /// # Examples
    ///
    /// ```
    /// use wled_bridge::client::{PresetEntry, PresetTable};
    /// use wled_bridge::preset::PresetDescriptor;
    ///
    /// let mut table = PresetTable::default();
    /// table.insert(0, PresetEntry::default());
    /// table.insert(1, PresetEntry::preset("Relax"));
    /// table.insert(2, PresetEntry::playlist("Cycle"));
    ///
    /// let named = PresetDescriptor::from_table(&table);
    /// assert_eq!(named.len(), 2);
    /// assert!(named[1].is_playlist);
    /// ```
    #[must_use]
    pub fn from_table(table: &PresetTable) -> Vec<Self> {
        table
            .iter()
            .filter_map(|(id, entry)| {
                entry.name.as_ref().map(|name| Self {
                    id,
                    name: name.clone(),
                    is_playlist: entry.is_playlist(),
                })
            })
            .collect()
    }

    /// Returns `"playlist"` or `"preset"` for log lines.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        if self.is_playlist { "playlist" } else { "preset" }
    }

    /// Returns the key of the switch bound to this entry.
    #[must_use]
    pub fn service_key(&self) -> ServiceKey {
        ServiceKey::preset_switch(self.id)
    }
}

impl fmt::Display for PresetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind(), self.id, self.name)
    }
}

/// A preset switch and its mirrored on flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetSwitch {
    /// The bound preset.
    pub descriptor: PresetDescriptor,
    /// Mirrored on flag.
    pub on: bool,
}

impl PresetSwitch {
    /// Creates a switch that is off.
    #[must_use]
    pub fn new(descriptor: PresetDescriptor) -> Self {
        Self {
            descriptor,
            on: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PresetEntry;

    #[test]
    fn unnamed_entries_are_skipped() {
        let mut table = PresetTable::default();
        table.insert(0, PresetEntry::default());
        assert!(PresetDescriptor::from_table(&table).is_empty());
    }

    #[test]
    fn display_names_kind() {
        let descriptor = PresetDescriptor {
            id: 3,
            name: "Party".into(),
            is_playlist: true,
        };
        assert_eq!(descriptor.to_string(), "playlist 3 (Party)");
        assert_eq!(descriptor.service_key(), ServiceKey::preset_switch(3));
    }
}

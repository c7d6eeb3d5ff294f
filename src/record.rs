//! Registry records.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::status::ReportedState;
use crate::types::PowerState;

/// The registry's view of one bulb.
///
/// The address is the identity key and never changes. The three state
/// fields (`power_state`, `active_scene_id`, `active_scene_name`) are only
/// ever replaced together from a single [`ReportedState`]; a failed query
/// touches `power_state` alone so the last known scene stays visible.
///
/// # Example
///
/// ```
/// use wiz_fleet::{DeviceRecord, PowerState};
///
/// let record = DeviceRecord::new("192.168.1.40");
/// assert_eq!(record.display_name(), "192.168.1.40");
/// assert_eq!(record.power_state(), PowerState::Offline);
/// assert_eq!(record.active_scene_id(), 0);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    address: String,
    display_name: String,
    power_state: PowerState,
    active_scene_id: u16,
    active_scene_name: String,
}

impl DeviceRecord {
    pub fn new(address: &str) -> Self {
        DeviceRecord {
            address: address.to_string(),
            display_name: address.to_string(),
            power_state: PowerState::Offline,
            active_scene_id: 0,
            active_scene_name: String::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn power_state(&self) -> PowerState {
        self.power_state
    }

    pub fn active_scene_id(&self) -> u16 {
        self.active_scene_id
    }

    pub fn active_scene_name(&self) -> &str {
        &self.active_scene_name
    }

    pub fn is_online(&self) -> bool {
        self.power_state.is_online()
    }

    /// True when `key` is this record's address or display name.
    pub fn matches(&self, key: &str) -> bool {
        self.address == key || self.display_name == key
    }

    /// Replace all three state fields with what the bulb reported.
    pub fn apply(&mut self, state: &ReportedState) {
        self.power_state = state.power;
        self.active_scene_id = state.scene_id;
        self.active_scene_name.clone_from(&state.scene_name);
    }

    /// Set the offline sentinel, keeping the last known scene.
    pub fn mark_offline(&mut self) {
        self.power_state = PowerState::Offline;
    }

    pub fn rename(&mut self, name: &str) {
        self.display_name = name.to_string();
    }
}

/// Orders records by display name, breaking ties by address so the result
/// does not depend on the order records were produced in.
pub fn sort_by_display_name(records: &mut [DeviceRecord]) {
    records.sort_by(display_order);
}

pub(crate) fn display_order(a: &DeviceRecord, b: &DeviceRecord) -> Ordering {
    a.display_name
        .cmp(&b.display_name)
        .then_with(|| a.address.cmp(&b.address))
}

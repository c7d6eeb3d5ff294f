//! Power state as tracked by the registry.

use serde::{Deserialize, Serialize};

/// Last known power state of a bulb.
///
/// Stored as an integer: `-1` when the last contact attempt failed, `0` when
/// the bulb reported itself off and `1` when it reported itself on. Any
/// positive value read back is treated as on.
///
/// # Examples
///
/// ```
/// use wiz_fleet::PowerState;
///
/// assert_eq!(PowerState::from(-1), PowerState::Offline);
/// assert_eq!(PowerState::from(7), PowerState::On);
/// assert_eq!(i8::from(PowerState::Off), 0);
/// ```
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(into = "i8", from = "i8")]
pub enum PowerState {
    /// The last query failed or never happened
    #[default]
    Offline,
    /// The bulb reported it is not emitting
    Off,
    /// The bulb reported it is emitting
    On,
}

impl PowerState {
    pub const OFFLINE_SENTINEL: i8 = -1;

    pub fn from_emitting(emitting: bool) -> Self {
        if emitting { PowerState::On } else { PowerState::Off }
    }

    pub fn is_online(&self) -> bool {
        !matches!(self, PowerState::Offline)
    }
}

impl From<PowerState> for i8 {
    fn from(state: PowerState) -> Self {
        match state {
            PowerState::Offline => PowerState::OFFLINE_SENTINEL,
            PowerState::Off => 0,
            PowerState::On => 1,
        }
    }
}

impl From<i8> for PowerState {
    fn from(value: i8) -> Self {
        match value {
            v if v < 0 => PowerState::Offline,
            0 => PowerState::Off,
            _ => PowerState::On,
        }
    }
}

//! Brightness used when powering bulbs on.

use serde::{Deserialize, Serialize};

/// Brightness level from 10 to 100 percent.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new()
    }
}

impl Brightness {
    const MIN: u8 = 10;
    const MAX: u8 = 100;

    /// Full brightness.
    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is outside valid range (10-100).
    pub fn create(value: u8) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Brightness { value })
        } else {
            None
        }
    }
}

impl TryFrom<u8> for Brightness {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Brightness::create(value).ok_or_else(|| {
            format!(
                "brightness {value} outside {}..={}",
                Brightness::MIN,
                Brightness::MAX
            )
        })
    }
}

impl From<Brightness> for u8 {
    fn from(brightness: Brightness) -> Self {
        brightness.value
    }
}

//! `setPilot` parameters.

use serde::{Deserialize, Serialize};

use crate::types::{Brightness, SceneMode};

/// Parameters of a `setPilot` command.
///
/// # Examples
///
/// ```
/// use wiz_fleet::{Payload, SceneMode};
///
/// let payload = Payload::from(&SceneMode::Sunset);
/// assert!(payload.is_valid());
/// assert!(!Payload::new().is_valid());
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Payload {
    pub(crate) state: Option<bool>,
    #[serde(rename = "sceneId")]
    pub(crate) scene: Option<u16>,
    pub(crate) dimming: Option<u8>,
}

impl Payload {
    /// Create a new empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this payload contains at least one attribute.
    pub fn is_valid(&self) -> bool {
        self.state.is_some() || self.scene.is_some() || self.dimming.is_some()
    }

    /// Turn the bulb on at the given brightness.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiz_fleet::{Brightness, Payload};
    ///
    /// let payload = Payload::power_on(&Brightness::new());
    /// assert_eq!(
    ///     serde_json::to_string(&payload).unwrap(),
    ///     r#"{"state":true,"dimming":100}"#
    /// );
    /// ```
    pub fn power_on(brightness: &Brightness) -> Self {
        let mut p = Payload::new();
        p.state(true);
        p.brightness(brightness);
        p
    }

    /// Turn the bulb off.
    pub fn power_off() -> Self {
        let mut p = Payload::new();
        p.state(false);
        p
    }

    pub fn state(&mut self, on: bool) {
        self.state = Some(on);
    }

    pub fn brightness(&mut self, brightness: &Brightness) {
        self.dimming = Some(brightness.value);
    }

    /// Set the scene. Activating a scene also switches the bulb on.
    pub fn scene(&mut self, scene: &SceneMode) {
        self.state = Some(true);
        self.scene = Some(scene.id());
    }
}

impl From<&SceneMode> for Payload {
    fn from(scene: &SceneMode) -> Self {
        let mut p = Payload::new();
        p.scene(scene);
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_payload() {
        let payload = Payload::from(&SceneMode::Focus);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"state": true, "sceneId": 15})
        );
    }

    #[test]
    fn test_power_off_payload() {
        assert_eq!(
            serde_json::to_string(&Payload::power_off()).unwrap(),
            r#"{"state":false}"#
        );
    }
}

//! Live state as reported by a bulb.

use serde::{Deserialize, Serialize};

use crate::types::{PowerState, SceneMode};

/// The three state fields a bulb reports about itself.
///
/// A reconciliation writes all of them together or none of them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ReportedState {
    pub power: PowerState,
    pub scene_id: u16,
    pub scene_name: String,
}

impl ReportedState {
    pub fn new(power: PowerState, scene_id: u16) -> Self {
        ReportedState {
            power,
            scene_id,
            scene_name: SceneMode::name_of(scene_id),
        }
    }
}

impl From<&BulbStatus> for ReportedState {
    fn from(bulb: &BulbStatus) -> Self {
        let res = &bulb.result;
        ReportedState::new(PowerState::from_emitting(res.emitting), res.scene)
    }
}

/// Bulb status as reported by the bulb via getPilot.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct BulbStatus {
    pub result: BulbStatusResult,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct BulbStatusResult {
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(rename = "state")]
    pub emitting: bool,
    #[serde(rename = "sceneId", default)]
    pub scene: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_get_pilot() {
        let reply = json!({
            "method": "getPilot",
            "env": "pro",
            "result": {
                "mac": "a8bb50aabbcc",
                "rssi": -61,
                "state": true,
                "sceneId": 3,
                "speed": 100,
                "dimming": 80
            }
        });
        let status: BulbStatus = serde_json::from_value(reply).unwrap();
        let state = ReportedState::from(&status);

        assert_eq!(state.power, PowerState::On);
        assert_eq!(state.scene_id, 3);
        assert_eq!(state.scene_name, "Sunset");
    }

    #[test]
    fn test_parse_without_scene() {
        let reply = json!({"result": {"state": false, "r": 255, "g": 0, "b": 0}});
        let status: BulbStatus = serde_json::from_value(reply).unwrap();
        let state = ReportedState::from(&status);

        assert_eq!(state.power, PowerState::Off);
        assert_eq!(state.scene_id, 0);
        assert_eq!(state.scene_name, "");
    }

    #[test]
    fn test_missing_state_is_malformed() {
        let reply = json!({"result": {"sceneId": 3}});
        assert!(serde_json::from_value::<BulbStatus>(reply).is_err());
    }
}

/*!
JSON fixtures shaped like the SmartThings v1 REST payloads.

The default lock status reproduces what a Schlage Z-Wave deadbolt reports.
*/

use serde_json::{json, Map, Value};

pub const API_TOKEN: &str = "3f62cab5-0000-4e7b-a43f-e17fa85f8563";
pub const LOCK_DEVICE_ID: &str = "6f4a1e52-8b7c-4a0e-9a51-lock00000001";
pub const LOCK_CODES: &str = r#"{"1":"Code 1","2":"Code 2","3":"Code 3"}"#;

/// One entry of `GET /devices` `items`.
pub fn device(device_id: &str, name: &str, label: Option<&str>) -> Value {
    let mut device = json!({
        "deviceId": device_id,
        "name": name,
        "locationId": "b9c3f0f4-location",
        "components": [{ "id": "main" }],
    });
    if let Some(label) = label {
        device["label"] = json!(label);
    }
    device
}

pub fn lock_device() -> Value {
    device(LOCK_DEVICE_ID, "Schlage Door Lock", Some("Front Door"))
}

/// Builder for `GET /devices/{id}/status` bodies.
#[derive(Debug, Clone, Default)]
pub struct StatusBuilder {
    capabilities: Map<String, Value>,
}

impl StatusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of the reference lock: unlocked, 47% battery, 3 codes of 4 digits, 30 slots.
    pub fn schlage_lock() -> Self {
        Self::new()
            .attribute("healthCheck", "checkInterval", json!(3600), Some("s"))
            .attribute("healthCheck", "healthStatus", Value::Null, None)
            .attribute("lock", "lock", json!("unlocked"), None)
            .attribute("battery", "battery", json!(47), Some("%"))
            .attribute("lockCodes", "codeLength", json!(4), None)
            .attribute("lockCodes", "maxCodes", json!(30), None)
            .attribute("lockCodes", "maxCodeLength", Value::Null, None)
            .attribute("lockCodes", "codeChanged", json!("8 unset"), None)
            .attribute("lockCodes", "minCodeLength", Value::Null, None)
            .attribute("lockCodes", "codeReport", json!([3]), None)
            .attribute("lockCodes", "scanCodes", json!("Complete"), None)
            .attribute("lockCodes", "lockCodes", json!(LOCK_CODES), None)
            .attribute("lockCodes", "lock", Value::Null, None)
    }

    pub fn attribute(mut self, capability: &str, name: &str, value: Value, unit: Option<&str>) -> Self {
        let mut state = json!({ "value": value, "timestamp": "2021-01-02T03:04:05.000Z" });
        if let Some(unit) = unit {
            state["unit"] = json!(unit);
        }
        let entry = self
            .capabilities
            .entry(capability.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        entry[name] = state;
        self
    }

    /// Drops `name` from whichever capability holds it.
    pub fn without(mut self, name: &str) -> Self {
        for attributes in self.capabilities.values_mut() {
            if let Value::Object(map) = attributes {
                map.remove(name);
            }
        }
        self
    }

    pub fn build(self) -> Value {
        json!({ "components": { "main": Value::Object(self.capabilities) } })
    }
}

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Raw attribute value as reported by the cloud API, before any normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    /// Arrays, objects and booleans: kept as-is, never interpreted.
    Structured(Value),
    Null,
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::String(s) => RawValue::Text(s),
            Value::Number(n) => match n.as_f64() {
                Some(f) => RawValue::Number(f),
                None => RawValue::Structured(Value::Number(n)),
            },
            other => RawValue::Structured(other),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => write!(f, "{s:?}"),
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Structured(v) => write!(f, "{v}"),
            RawValue::Null => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub value: RawValue,
    pub unit: Option<String>,
}

/// Attribute name -> attribute, iterated in name order.
pub type AttributeMap = BTreeMap<String, Attribute>;

#[derive(Debug, Clone)]
pub struct Device {
    pub device_id: String,
    pub name: String,
    pub label: Option<String>,
    /// Empty until the device has been refreshed.
    pub attributes: AttributeMap,
}

impl Device {
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

// Wire format of the SmartThings REST API (v1)

#[derive(Debug, Deserialize)]
pub struct DeviceListPage {
    #[serde(default)]
    pub items: Vec<DeviceSummary>,
    #[serde(rename = "_links", default)]
    pub links: Option<PageLinks>,
}

#[derive(Debug, Deserialize)]
pub struct PageLinks {
    pub next: Option<Link>,
}

#[derive(Debug, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    pub device_id: String,
    #[serde(default)]
    pub name: String,
    pub label: Option<String>,
}

impl From<DeviceSummary> for Device {
    fn from(s: DeviceSummary) -> Self {
        Device {
            device_id: s.device_id,
            name: s.name,
            label: s.label,
            attributes: AttributeMap::new(),
        }
    }
}

/// `components -> capability -> attribute -> state`
#[derive(Debug, Deserialize)]
pub struct DeviceStatusResponse {
    #[serde(default)]
    pub components: HashMap<String, BTreeMap<String, BTreeMap<String, AttributeState>>>,
}

#[derive(Debug, Deserialize)]
pub struct AttributeState {
    #[serde(default)]
    pub value: Value,
    pub unit: Option<String>,
}

impl DeviceStatusResponse {
    /// Flattens every capability of `component` into one attribute map.
    ///
    /// Several capabilities may report the same attribute name (`lockCodes`
    /// carries its own `lock`). The capability named after the attribute
    /// wins; otherwise the last capability in name order does.
    pub fn into_attributes(mut self, component: &str) -> AttributeMap {
        let mut out = AttributeMap::new();
        let Some(capabilities) = self.components.remove(component) else {
            return out;
        };
        let mut owned = BTreeSet::new();
        for (capability, attributes) in capabilities {
            for (name, state) in attributes {
                if name == capability {
                    owned.insert(name.clone());
                } else if owned.contains(&name) {
                    continue;
                }
                out.insert(
                    name,
                    Attribute { value: state.value.into(), unit: state.unit },
                );
            }
        }
        out
    }
}

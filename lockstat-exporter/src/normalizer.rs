//! Attribute normalizer: one raw lock attribute in, one gauge reading out.
//!
//! Only the attributes listed in [`TrackedAttribute`] are translated; every
//! other attribute the lock reports is skipped without error. A tracked
//! attribute whose value does not match its expected shape is a hard
//! [`TranslationError`], never a default.

use crate::models::RawValue;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TranslationError {
    #[error("unknown lock state: {0}")]
    UnknownLockState(String),
    #[error("malformed lockCodes registry: {0}")]
    MalformedCodeRegistry(String),
    #[error("non-numeric value for {attribute}: {value}")]
    NonNumeric { attribute: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackedAttribute {
    Battery,
    CodeLength,
    Lock,
    LockCodes,
    MaxCodes,
}

impl TrackedAttribute {
    pub const ALL: [TrackedAttribute; 5] = [
        TrackedAttribute::Battery,
        TrackedAttribute::CodeLength,
        TrackedAttribute::Lock,
        TrackedAttribute::LockCodes,
        TrackedAttribute::MaxCodes,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Attribute name as reported by the API.
    pub fn name(self) -> &'static str {
        match self {
            TrackedAttribute::Battery => "battery",
            TrackedAttribute::CodeLength => "codeLength",
            TrackedAttribute::Lock => "lock",
            TrackedAttribute::LockCodes => "lockCodes",
            TrackedAttribute::MaxCodes => "maxCodes",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            TrackedAttribute::Battery => "Battery Level %",
            TrackedAttribute::CodeLength => "Length of codes",
            TrackedAttribute::Lock => "Is door locked? (boolean)",
            TrackedAttribute::LockCodes => "Number of lock codes set",
            TrackedAttribute::MaxCodes => "Max number of codes lock can handle",
        }
    }
}

impl fmt::Display for TrackedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Locked,
    Unlocked,
}

impl LockState {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "locked" => Some(LockState::Locked),
            "unlocked" => Some(LockState::Unlocked),
            _ => None,
        }
    }
}

/// A translated attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Lock(LockState),
    Numeric(f64),
    CodeCount(usize),
}

impl Reading {
    pub fn value(self) -> f64 {
        match self {
            Reading::Lock(LockState::Locked) => 1.0,
            Reading::Lock(LockState::Unlocked) => 0.0,
            Reading::Numeric(v) => v,
            Reading::CodeCount(n) => n as f64,
        }
    }
}

/// Translates one attribute. `Ok(None)` means the attribute is not tracked.
pub fn normalize(
    name: &str,
    value: &RawValue,
) -> Result<Option<(TrackedAttribute, Reading)>, TranslationError> {
    let Some(attribute) = TrackedAttribute::from_name(name) else {
        return Ok(None);
    };

    let reading = match attribute {
        TrackedAttribute::Lock => Reading::Lock(lock_state(value)?),
        TrackedAttribute::LockCodes => Reading::CodeCount(code_count(value)?),
        TrackedAttribute::Battery | TrackedAttribute::CodeLength | TrackedAttribute::MaxCodes => {
            Reading::Numeric(numeric(attribute, value)?)
        }
    };
    Ok(Some((attribute, reading)))
}

fn lock_state(value: &RawValue) -> Result<LockState, TranslationError> {
    match value {
        RawValue::Text(s) => {
            LockState::parse(s).ok_or_else(|| TranslationError::UnknownLockState(s.clone()))
        }
        other => Err(TranslationError::UnknownLockState(other.to_string())),
    }
}

/// `lockCodes` is a JSON document embedded in a string: `{"<slot>": "<label>", ...}`.
fn code_count(value: &RawValue) -> Result<usize, TranslationError> {
    let RawValue::Text(encoded) = value else {
        return Err(TranslationError::MalformedCodeRegistry(format!(
            "expected JSON-encoded string, got {value}"
        )));
    };
    let codes: HashMap<String, String> = serde_json::from_str(encoded)
        .map_err(|e| TranslationError::MalformedCodeRegistry(e.to_string()))?;
    Ok(codes.len())
}

fn numeric(attribute: TrackedAttribute, value: &RawValue) -> Result<f64, TranslationError> {
    let parsed = match value {
        RawValue::Number(n) => Some(*n),
        RawValue::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).ok_or_else(|| TranslationError::NonNumeric {
        attribute: attribute.name(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    fn value_of(name: &str, raw: RawValue) -> f64 {
        let (_, reading) = normalize(name, &raw).unwrap().unwrap();
        reading.value()
    }

    #[test]
    fn untracked_attributes_are_skipped() {
        let values = [
            text("unlocked"),
            RawValue::Number(3600.0),
            RawValue::Null,
            RawValue::Structured(json!([3])),
            text("8 unset"),
        ];
        for name in ["checkInterval", "healthStatus", "codeReport", "codeChanged", "Lock", ""] {
            for v in &values {
                assert_eq!(normalize(name, v), Ok(None), "{name} should be skipped");
            }
        }
    }

    #[test]
    fn lock_states() {
        assert_eq!(value_of("lock", text("locked")), 1.0);
        assert_eq!(value_of("lock", text("unlocked")), 0.0);
    }

    #[test]
    fn unknown_lock_state_is_an_error() {
        assert_eq!(
            normalize("lock", &text("jammed")),
            Err(TranslationError::UnknownLockState("jammed".into()))
        );
        assert!(normalize("lock", &RawValue::Null).is_err());
        assert!(normalize("lock", &RawValue::Number(1.0)).is_err());
    }

    #[test]
    fn lock_codes_counts_entries() {
        assert_eq!(value_of("lockCodes", text(r#"{"1":"Code 1","2":"Code 2","3":"Code 3"}"#)), 3.0);
        assert_eq!(value_of("lockCodes", text("{}")), 0.0);
    }

    #[test]
    fn malformed_lock_codes_are_rejected() {
        for bad in [
            r#"{"1":"Code 1","#,
            r#"["Code 1"]"#,
            r#"{"1": 1234}"#,
            r#"{'1': 'Code 1'}"#,
            "__import__('os').system('true')",
            "",
        ] {
            assert!(
                matches!(normalize("lockCodes", &text(bad)), Err(TranslationError::MalformedCodeRegistry(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(normalize("lockCodes", &RawValue::Structured(json!({"1": "Code 1"}))).is_err());
        assert!(normalize("lockCodes", &RawValue::Null).is_err());
    }

    #[test]
    fn numeric_attributes() {
        assert_eq!(value_of("battery", RawValue::Number(47.0)), 47.0);
        assert_eq!(value_of("codeLength", RawValue::Number(4.0)), 4.0);
        assert_eq!(value_of("maxCodes", text("30")), 30.0);
    }

    #[test]
    fn non_numeric_is_an_error() {
        assert_eq!(
            normalize("battery", &text("unknown")),
            Err(TranslationError::NonNumeric { attribute: "battery", value: "\"unknown\"".into() })
        );
        assert!(normalize("maxCodes", &RawValue::Null).is_err());
        assert!(normalize("codeLength", &RawValue::Structured(json!(true))).is_err());
        assert!(normalize("battery", &text("NaN")).is_err());
    }

    #[test]
    fn readings_are_tagged_per_attribute() {
        assert_eq!(
            normalize("lock", &text("locked")),
            Ok(Some((TrackedAttribute::Lock, Reading::Lock(LockState::Locked))))
        );
        assert_eq!(
            normalize("lockCodes", &text(r#"{"1":"a"}"#)),
            Ok(Some((TrackedAttribute::LockCodes, Reading::CodeCount(1))))
        );
        assert_eq!(
            normalize("battery", &RawValue::Number(47.0)),
            Ok(Some((TrackedAttribute::Battery, Reading::Numeric(47.0))))
        );
    }

    #[test]
    fn tracked_names_round_trip() {
        for attribute in TrackedAttribute::ALL {
            assert_eq!(TrackedAttribute::from_name(attribute.name()), Some(attribute));
            assert!(!attribute.help().is_empty());
        }
    }
}

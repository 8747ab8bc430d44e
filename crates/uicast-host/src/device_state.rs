//! Shared device state: named typed slots read by GET commands and the
//! runtime, written by SET commands.
//!
//! Every slot carries a declared domain. A write outside the domain (or
//! with the wrong JSON type) fails without mutating anything, which is
//! what makes the `{result:false}` wire contract safe: the runtime only
//! ever observes in-domain values.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::json;
use serde_json::Value;
use thiserror::Error;
use uicast_common::rwlock_read_or_recover;
use uicast_common::rwlock_write_or_recover;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("unknown state slot: {0}")]
    UnknownSlot(String),
    #[error("value out of domain for {slot}: {value}")]
    OutOfDomain { slot: String, value: Value },
}

/// Value domain of one slot.
#[derive(Debug, Clone, Copy)]
pub enum Domain {
    IntRange { lo: i64, hi: i64 },
    FloatRange { lo: f64, hi: f64 },
    Bool,
    Enum(&'static [&'static str]),
}

impl Domain {
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            Domain::IntRange { lo, hi } => match value.as_i64() {
                Some(v) => v >= *lo && v <= *hi,
                None => false,
            },
            Domain::FloatRange { lo, hi } => match value.as_f64() {
                Some(v) => v >= *lo && v <= *hi,
                None => false,
            },
            Domain::Bool => value.is_boolean(),
            Domain::Enum(options) => match value.as_str() {
                Some(v) => options.contains(&v),
                None => false,
            },
        }
    }
}

pub const LANGUAGES: &[&str] = &[
    "en-US", "zh-CN", "de-DE", "es-ES", "fr-FR", "ja-JP", "ko-KR", "ru-RU",
];

/// Slot table: name, domain, default. Wire arg keys use these exact names.
fn slot_table() -> Vec<(&'static str, Domain, Value)> {
    vec![
        ("Brightness", Domain::IntRange { lo: 1, hi: 255 }, json!(170)),
        ("BrightnessMode", Domain::IntRange { lo: 0, hi: 1 }, json!(0)),
        ("Power", Domain::IntRange { lo: 0, hi: 100 }, json!(100)),
        ("ChargeMode", Domain::IntRange { lo: 0, hi: 2 }, json!(0)),
        ("Volume", Domain::IntRange { lo: 0, hi: 100 }, json!(50)),
        ("HeartRate", Domain::IntRange { lo: 0, hi: 255 }, json!(80)),
        (
            "StepCount",
            Domain::IntRange { lo: 0, hi: 1_000_000 },
            json!(0),
        ),
        (
            "Barometer",
            Domain::IntRange { lo: 0, hi: 999_900 },
            json!(101_325),
        ),
        (
            "latitude",
            Domain::FloatRange { lo: -90.0, hi: 90.0 },
            json!(0.0),
        ),
        (
            "longitude",
            Domain::FloatRange {
                lo: -180.0,
                hi: 180.0,
            },
            json!(0.0),
        ),
        ("Language", Domain::Enum(LANGUAGES), json!("en-US")),
        ("KeepScreenOnState", Domain::Bool, json!(false)),
        ("WearingState", Domain::Bool, json!(true)),
        ("ColorMode", Domain::Enum(&["light", "dark"]), json!("light")),
        (
            "Orientation",
            Domain::Enum(&["portrait", "landscape"]),
            json!("portrait"),
        ),
        ("FontSelect", Domain::Bool, json!(true)),
        (
            "originalWidth",
            Domain::IntRange { lo: 1, hi: 7680 },
            json!(1080),
        ),
        (
            "originalHeight",
            Domain::IntRange { lo: 1, hi: 7680 },
            json!(2340),
        ),
        (
            "currentWidth",
            Domain::IntRange { lo: 1, hi: 7680 },
            json!(1080),
        ),
        (
            "currentHeight",
            Domain::IntRange { lo: 1, hi: 7680 },
            json!(2340),
        ),
        (
            "screenDensity",
            Domain::IntRange { lo: 120, hi: 640 },
            json!(480),
        ),
    ]
}

pub struct DeviceState {
    domains: HashMap<&'static str, Domain>,
    values: RwLock<HashMap<&'static str, Value>>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceState {
    pub fn new() -> Self {
        let mut domains = HashMap::new();
        let mut values = HashMap::new();
        for (name, domain, default) in slot_table() {
            domains.insert(name, domain);
            values.insert(name, default);
        }
        Self {
            domains,
            values: RwLock::new(values),
        }
    }

    pub fn domain(&self, key: &str) -> Option<Domain> {
        self.domains.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        rwlock_read_or_recover(&self.values).get(key).cloned()
    }

    pub fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
        let (slot, domain) = self
            .domains
            .get_key_value(key)
            .map(|(k, d)| (*k, *d))
            .ok_or_else(|| StateError::UnknownSlot(key.to_string()))?;
        if !domain.admits(&value) {
            return Err(StateError::OutOfDomain {
                slot: key.to_string(),
                value,
            });
        }
        rwlock_write_or_recover(&self.values).insert(slot, value);
        Ok(())
    }

    /// Validate every pair against its domain, then write all under one
    /// lock. A single bad pair leaves every slot untouched.
    pub fn set_many(&self, pairs: &[(&str, Value)]) -> Result<(), StateError> {
        let mut resolved = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let (slot, domain) = self
                .domains
                .get_key_value(*key)
                .map(|(k, d)| (*k, *d))
                .ok_or_else(|| StateError::UnknownSlot(key.to_string()))?;
            if !domain.admits(value) {
                return Err(StateError::OutOfDomain {
                    slot: key.to_string(),
                    value: value.clone(),
                });
            }
            resolved.push((slot, value.clone()));
        }
        let mut values = rwlock_write_or_recover(&self.values);
        for (slot, value) in resolved {
            values.insert(slot, value);
        }
        Ok(())
    }

    /// Screen bounds for input-coordinate validation.
    pub fn screen_bounds(&self) -> (i64, i64) {
        let values = rwlock_read_or_recover(&self.values);
        let width = values
            .get("currentWidth")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let height = values
            .get("currentHeight")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        (width, height)
    }
}

//! Convenience accessors over `serde_json::Value`.

use serde_json::Value;

/// Defaulting accessors for JSON objects.
///
/// These never fail; absent keys or mismatched types return the supplied
/// default. Validating accessors live with the protocol layer.
pub trait ValueExt {
    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str;
    fn i64_or(&self, key: &str, default: i64) -> i64;
    fn f64_or(&self, key: &str, default: f64) -> f64;
    fn bool_or(&self, key: &str, default: bool) -> bool;
    fn has(&self, key: &str) -> bool;
}

impl ValueExt for Value {
    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

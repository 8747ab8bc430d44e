//! JSON command envelope codec.
//!
//! Every message on the command channel is a single JSON object:
//!
//! ```json
//! { "version": "1.0.1", "command": "Brightness", "type": "set", "args": { ... } }
//! ```
//!
//! Decoding is strict about shape and permissive about everything else:
//! a malformed message yields a [`DecodeError`] and the host drops it
//! without replying. Replies and secondary-channel pushes are built here
//! so the wire shapes live in one place.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Protocol version stamped on every direct reply.
pub const PROTOCOL_VERSION: &str = "1.0.1";

/// Why an incoming message could not be turned into an [`Envelope`].
///
/// None of these produce a reply; the command loop logs and moves on.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("schema violation: {0}")]
    Schema(&'static str),
    #[error("malformed protocol version: {0:?}")]
    Version(String),
}

/// The `type` field of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Set,
    Action,
    /// Anything unrecognized. Never dispatched.
    Invalid,
}

impl Verb {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "get" => Verb::Get,
            "set" => Verb::Set,
            "action" => Verb::Action,
            _ => Verb::Invalid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Set => "set",
            Verb::Action => "action",
            Verb::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded command message.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub version: String,
    pub command: String,
    pub verb: Verb,
    /// Raw `args` object; absent args decode as `Value::Null`.
    pub args: Value,
}

impl Envelope {
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    pub fn arg_bool(&self, key: &str) -> Option<bool> {
        self.args.get(key).and_then(Value::as_bool)
    }

    pub fn arg_i64(&self, key: &str) -> Option<i64> {
        self.args.get(key).and_then(Value::as_i64)
    }

    pub fn arg_f64(&self, key: &str) -> Option<f64> {
        self.args.get(key).and_then(Value::as_f64)
    }

    pub fn arg_i64_or(&self, key: &str, default: i64) -> i64 {
        self.arg_i64(key).unwrap_or(default)
    }
}

fn version_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").unwrap())
}

/// Decode one raw command message.
///
/// Checks run in order: JSON parse, object shape (`version`, `command`,
/// `type` must be strings), then the `version` pattern. The verb is
/// parsed last and an unknown verb is not an error here; it becomes
/// [`Verb::Invalid`] and the dispatch layer refuses it.
pub fn decode_envelope(raw: &str) -> Result<Envelope, DecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    let obj = value
        .as_object()
        .ok_or(DecodeError::Schema("message is not a JSON object"))?;

    let version = obj
        .get("version")
        .and_then(Value::as_str)
        .ok_or(DecodeError::Schema("missing string field 'version'"))?;
    let command = obj
        .get("command")
        .and_then(Value::as_str)
        .ok_or(DecodeError::Schema("missing string field 'command'"))?;
    let verb_raw = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::Schema("missing string field 'type'"))?;

    if !version_pattern().is_match(version) {
        return Err(DecodeError::Version(version.to_string()));
    }

    Ok(Envelope {
        version: version.to_string(),
        command: command.to_string(),
        verb: Verb::parse(verb_raw),
        args: obj.get("args").cloned().unwrap_or(Value::Null),
    })
}

/// Direct reply wire shape. Field order is the wire order.
#[derive(Debug, Serialize)]
struct ResultMessage<'a> {
    version: &'static str,
    command: &'a str,
    result: &'a Value,
}

/// Secondary-channel wire shape. Carries no version field.
#[derive(Debug, Serialize)]
struct NotificationMessage<'a> {
    #[serde(rename = "MessageType")]
    message_type: &'a str,
    args: &'a Value,
}

fn pretty<T: Serialize>(message: &T) -> String {
    serde_json::to_string_pretty(message).unwrap_or_default()
}

/// Build a direct reply: `{version, command, result}`, pretty-printed.
///
/// The version field always carries [`PROTOCOL_VERSION`], never the
/// version echoed from the request.
pub fn encode_result(command: &str, result: &Value) -> String {
    pretty(&ResultMessage {
        version: PROTOCOL_VERSION,
        command,
        result,
    })
}

/// Build a secondary-channel push: `{MessageType, args}`, pretty-printed.
///
/// Pushes carry no version field.
pub fn encode_notification(message_type: &str, args: &Value) -> String {
    pretty(&NotificationMessage {
        message_type,
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_envelope() {
        let raw = r#"{"version":"1.0.1","command":"Brightness","type":"set","args":{"Brightness":170}}"#;
        let env = decode_envelope(raw).unwrap();
        assert_eq!(env.version, "1.0.1");
        assert_eq!(env.command, "Brightness");
        assert_eq!(env.verb, Verb::Set);
        assert_eq!(env.arg_i64("Brightness"), Some(170));
    }

    #[test]
    fn test_decode_missing_args_becomes_null() {
        let raw = r#"{"version":"1.0.1","command":"Resolution","type":"get"}"#;
        let env = decode_envelope(raw).unwrap();
        assert!(env.args.is_null());
        assert_eq!(env.arg_str("anything"), None);
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let err = decode_envelope("{not json").unwrap_err();
        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = decode_envelope(r#"["version","command"]"#).unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        for raw in [
            r#"{"command":"Exit","type":"action"}"#,
            r#"{"version":"1.0.1","type":"action"}"#,
            r#"{"version":"1.0.1","command":"Exit"}"#,
            r#"{"version":1.01,"command":"Exit","type":"action"}"#,
        ] {
            let err = decode_envelope(raw).unwrap_err();
            assert!(matches!(err, DecodeError::Schema(_)), "raw: {raw}");
        }
    }

    #[test]
    fn test_decode_rejects_malformed_version() {
        for version in ["1.0", "v1.0.1", "1.0.1-beta", "1..1", ""] {
            let raw = format!(
                r#"{{"version":"{version}","command":"Exit","type":"action"}}"#
            );
            let err = decode_envelope(&raw).unwrap_err();
            assert!(matches!(err, DecodeError::Version(_)), "version: {version}");
        }
    }

    #[test]
    fn test_unknown_verb_maps_to_invalid() {
        let raw = r#"{"version":"1.0.1","command":"Exit","type":"delete"}"#;
        let env = decode_envelope(raw).unwrap();
        assert_eq!(env.verb, Verb::Invalid);
    }

    #[test]
    fn test_verb_parse_is_case_insensitive() {
        assert_eq!(Verb::parse("GET"), Verb::Get);
        assert_eq!(Verb::parse("Set"), Verb::Set);
        assert_eq!(Verb::parse("ACTION"), Verb::Action);
    }

    #[test]
    fn test_encode_result_carries_host_version() {
        let encoded = encode_result("Brightness", &json!({"Brightness": 170}));
        let parsed: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed["version"], PROTOCOL_VERSION);
        assert_eq!(parsed["command"], "Brightness");
        assert_eq!(parsed["result"]["Brightness"], 170);
    }

    #[test]
    fn test_encode_result_is_pretty_printed() {
        let encoded = encode_result("Exit", &json!(true));
        assert!(encoded.contains('\n'));
    }

    #[test]
    fn test_encode_result_wire_field_order() {
        let encoded = encode_result("DeviceType", &json!("phone"));
        let version_at = encoded.find("\"version\"").unwrap();
        let command_at = encoded.find("\"command\"").unwrap();
        let result_at = encoded.find("\"result\"").unwrap();
        assert!(version_at < command_at);
        assert!(command_at < result_at);
    }

    #[test]
    fn test_encode_notification_has_no_version() {
        let encoded = encode_notification("CurrentRouter", &json!({"router": "pages/Index"}));
        let parsed: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed["MessageType"], "CurrentRouter");
        assert_eq!(parsed["args"]["router"], "pages/Index");
        assert!(parsed.get("version").is_none());
    }

    #[test]
    fn test_arg_accessors_tolerate_type_mismatch() {
        let raw = r#"{"version":"1.0.1","command":"X","type":"set","args":{"n":"five","f":1.5,"b":true}}"#;
        let env = decode_envelope(raw).unwrap();
        assert_eq!(env.arg_i64("n"), None);
        assert_eq!(env.arg_f64("f"), Some(1.5));
        assert_eq!(env.arg_bool("b"), Some(true));
        assert_eq!(env.arg_i64_or("n", 5), 5);
    }
}

//! The command abstraction.
//!
//! Every protocol command is one handler implementing [`Command`],
//! overriding only the validate/run hooks for the verbs it supports.
//! Handlers are stateless; per-message data (args, output slots) lives in
//! the [`CommandCx`] built by the processor for each envelope.

use serde_json::Value;
use uicast_proto::Verb;

use crate::context::HostContext;

/// Per-message execution context.
///
/// Owns the parsed args and the two outgoing payload slots. `direct` is
/// flushed as a `{version, command, result}` reply to the requester;
/// `secondary` as a `{MessageType, args}` push. A slot left empty sends
/// nothing.
pub struct CommandCx<'a> {
    host: &'a HostContext,
    args: Value,
    direct: Option<Value>,
    secondary: Option<Value>,
}

impl<'a> CommandCx<'a> {
    pub fn new(host: &'a HostContext, args: Value) -> Self {
        Self {
            host,
            args,
            direct: None,
            secondary: None,
        }
    }

    pub fn host(&self) -> &HostContext {
        self.host
    }

    pub fn args(&self) -> &Value {
        &self.args
    }

    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    pub fn arg_i64(&self, key: &str) -> Option<i64> {
        self.args.get(key).and_then(Value::as_i64)
    }

    pub fn arg_f64(&self, key: &str) -> Option<f64> {
        self.args.get(key).and_then(Value::as_f64)
    }

    pub fn arg_bool(&self, key: &str) -> Option<bool> {
        self.args.get(key).and_then(Value::as_bool)
    }

    /// Set the direct reply payload.
    pub fn reply(&mut self, result: Value) {
        self.direct = Some(result);
    }

    /// Set the secondary-channel push payload.
    pub fn push(&mut self, args: Value) {
        self.secondary = Some(args);
    }

    pub fn into_outputs(self) -> (Option<Value>, Option<Value>) {
        (self.direct, self.secondary)
    }
}

/// One protocol command.
///
/// Hooks default to accept / no-op; a handler overrides only the verbs it
/// serves. An unserved verb therefore validates, runs as a no-op, and
/// produces no reply, which is the wire contract for unsupported verbs.
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether validation failures answer with `{result:false}`.
    /// Secondary-only commands have no direct path and stay silent.
    fn replies_directly(&self) -> bool {
        true
    }

    fn validate_get(&self, _cx: &CommandCx) -> bool {
        true
    }

    fn validate_set(&self, _cx: &CommandCx) -> bool {
        true
    }

    fn validate_action(&self, _cx: &CommandCx) -> bool {
        true
    }

    fn run_get(&self, _cx: &mut CommandCx) {}

    fn run_set(&self, _cx: &mut CommandCx) {}

    fn run_action(&self, _cx: &mut CommandCx) {}

    fn validate(&self, verb: Verb, cx: &CommandCx) -> bool {
        match verb {
            Verb::Get => self.validate_get(cx),
            Verb::Set => self.validate_set(cx),
            Verb::Action => self.validate_action(cx),
            Verb::Invalid => false,
        }
    }

    fn run(&self, verb: Verb, cx: &mut CommandCx) {
        match verb {
            Verb::Get => self.run_get(cx),
            Verb::Set => self.run_set(cx),
            Verb::Action => self.run_action(cx),
            Verb::Invalid => {}
        }
    }
}

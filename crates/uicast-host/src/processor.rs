//! The dispatch pipeline between the wire and the command handlers.
//!
//! A raw message runs through decode, the static-card gate, registry
//! lookup, validation and execution. Failures upstream of validation are
//! terminal for that message and produce no reply; validation failures
//! answer `{result: false}` on the direct path only. Nothing in here
//! returns an error to the caller, the server loop stays alive no matter
//! what arrives.

use std::sync::Arc;

use serde_json::json;
use serde_json::Value;
use tracing::debug;
use tracing::warn;
use uicast_proto::decode_envelope;
use uicast_proto::encode_notification;
use uicast_proto::encode_result;
use uicast_proto::Verb;

use crate::command::CommandCx;
use crate::context::HostContext;
use crate::registry::CommandRegistry;

/// Where finished replies go. Direct results and secondary notifications
/// share the command socket but are encoded differently, so the sink
/// keeps them distinct.
pub trait ReplySink {
    fn send_direct(&self, payload: &str);
    fn send_secondary(&self, payload: &str);
}

pub struct CommandProcessor {
    host: Arc<HostContext>,
    registry: CommandRegistry,
}

impl CommandProcessor {
    pub fn new(host: Arc<HostContext>) -> Self {
        Self {
            host,
            registry: CommandRegistry::builtin(),
        }
    }

    #[cfg(test)]
    pub fn with_registry(host: Arc<HostContext>, registry: CommandRegistry) -> Self {
        Self { host, registry }
    }

    /// Handle one raw message from the IDE connection.
    pub fn run_incoming(&self, raw: &str, sink: &dyn ReplySink) {
        self.host.metrics.record_request();
        let envelope = match decode_envelope(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.host.metrics.record_dropped();
                debug!(error = %e, "message dropped");
                return;
            }
        };
        if envelope.verb == Verb::Invalid {
            self.host.metrics.record_dropped();
            debug!(command = %envelope.command, "unknown verb, message dropped");
            return;
        }
        if !self.host.policy.admits(&envelope.command) {
            self.host.metrics.record_gated();
            debug!(command = %envelope.command, "discarded in static card mode");
            return;
        }
        self.execute(&envelope.command, envelope.verb, envelope.args, sink);
    }

    /// Re-enter the pipeline for a runtime-initiated command off the tick
    /// queue. The static-card gate only narrows the incoming surface;
    /// internal pushes such as `AvoidAreaChanged` keep flowing.
    pub fn run_internal(&self, name: &str, verb: Verb, args: Value, sink: &dyn ReplySink) {
        self.execute(name, verb, args, sink);
    }

    fn execute(&self, name: &str, verb: Verb, args: Value, sink: &dyn ReplySink) {
        let Some(handler) = self.registry.get(name) else {
            self.host.metrics.record_unsupported();
            warn!(command = name, "unsupported command");
            return;
        };
        let mut cx = CommandCx::new(&self.host, args);
        if !handler.validate(verb, &cx) {
            self.host.metrics.record_validation_failure();
            debug!(command = name, %verb, "validation failed");
            if handler.replies_directly() {
                sink.send_direct(&encode_result(name, &json!(false)));
            }
            return;
        }
        handler.run(verb, &mut cx);
        let (direct, secondary) = cx.into_outputs();
        if let Some(result) = direct {
            sink.send_direct(&encode_result(name, &result));
        }
        if let Some(args) = secondary {
            sink.send_secondary(&encode_notification(name, &args));
        }
    }
}

//! Host startup and lifecycle errors.
//!
//! The wire protocol has no error object; these never cross the codec
//! boundary. They surface through the CLI, which renders the message,
//! context and suggestion.

use serde_json::json;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to bind socket: {0}")]
    Bind(String),
    #[error("another uicast host is already running")]
    AlreadyRunning,
    #[error("failed to acquire lock: {0}")]
    Lock(String),
    #[error("failed to set up signal handler: {0}")]
    SignalSetup(String),
}

impl HostError {
    /// Process exit code the CLI maps this error to.
    pub fn exit_code(&self) -> i32 {
        match self {
            HostError::AlreadyRunning => 2,
            _ => 1,
        }
    }

    /// Structured context about the error for debugging.
    pub fn context(&self) -> Value {
        match self {
            HostError::Bind(reason) => json!({ "operation": "socket_bind", "reason": reason }),
            HostError::AlreadyRunning => {
                json!({ "operation": "startup", "reason": "another instance running" })
            }
            HostError::Lock(reason) => json!({ "operation": "lock", "reason": reason }),
            HostError::SignalSetup(reason) => {
                json!({ "operation": "signal_setup", "reason": reason })
            }
        }
    }

    /// A helpful suggestion for resolving the error.
    pub fn suggestion(&self) -> String {
        match self {
            HostError::Bind(_) => {
                "Check that the socket directory is writable. Try: rm /tmp/uicast.sock".to_string()
            }
            HostError::AlreadyRunning => {
                "Another host owns the socket. Stop it, or point UICAST_SOCKET at a different path."
                    .to_string()
            }
            HostError::Lock(_) => {
                "Lock file issue. Try removing it: rm /tmp/uicast.sock.lock".to_string()
            }
            HostError::SignalSetup(_) => {
                "Signal handler setup failed. Check system signal configuration.".to_string()
            }
        }
    }
}

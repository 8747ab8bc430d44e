#![deny(clippy::all)]

mod command;
mod commands;
mod config;
mod context;
mod device_state;
mod error;
mod metrics;
mod notify;
mod policy;
mod processor;
mod registry;
mod server;
#[cfg(test)]
mod test_support;

pub use command::Command;
pub use command::CommandCx;
pub use config::HostConfig;
pub use context::HostContext;
pub use device_state::DeviceState;
pub use device_state::Domain;
pub use device_state::StateError;
pub use error::HostError;
pub use metrics::HostMetrics;
pub use notify::HostCallbacks;
pub use notify::NotifyState;
pub use notify::TickCommand;
pub use policy::PolicyGate;
pub use policy::STATIC_CARD_ALLOWED;
pub use processor::CommandProcessor;
pub use processor::ReplySink;
pub use registry::CommandRegistry;
pub use server::start_host;
pub use server::SocketReplySink;

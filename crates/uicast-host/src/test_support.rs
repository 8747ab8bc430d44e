//! Shared constructors for in-crate tests.

use std::sync::Arc;

use uicast_runtime::MockEncoder;
use uicast_runtime::MockRuntime;

use crate::config::HostConfig;
use crate::context::HostContext;

pub fn host() -> Arc<HostContext> {
    host_with(MockRuntime::new()).0
}

/// Build a context around the given mock, returning a handle that shares
/// its call records.
pub fn host_with(runtime: MockRuntime) -> (Arc<HostContext>, MockRuntime) {
    let handle = runtime.clone();
    let host = HostContext::new(
        HostConfig::default(),
        Arc::new(runtime),
        Arc::new(MockEncoder::new()),
    );
    (host, handle)
}

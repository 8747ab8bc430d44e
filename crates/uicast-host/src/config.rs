use std::env;
use std::path::PathBuf;
use std::time::Duration;

use uicast_capture::StreamMode;
use uicast_proto::frame_socket_path;
use uicast_proto::socket_path;

const DEFAULT_MAX_REQUEST_BYTES: usize = 1_048_576; // 1MB
const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
const DEFAULT_DEVICE_TYPE: &str = "phone";

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub socket_path: PathBuf,
    pub frame_socket_path: PathBuf,
    pub max_request_bytes: usize,
    /// Read timeout of the command loop; bounds tick-queue latency.
    pub poll_interval: Duration,
    pub stream_mode: StreamMode,
    pub device_type: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self {
            socket_path: socket_path(),
            frame_socket_path: frame_socket_path(),
            max_request_bytes: env::var("UICAST_MAX_REQUEST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_REQUEST_BYTES),
            poll_interval: Duration::from_millis(
                env::var("UICAST_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            stream_mode: env::var("UICAST_STREAM_MODE")
                .ok()
                .and_then(|v| parse_stream_mode(&v))
                .unwrap_or(StreamMode::FullFrame),
            device_type: env::var("UICAST_DEVICE_TYPE")
                .unwrap_or_else(|_| DEFAULT_DEVICE_TYPE.to_string()),
        }
    }

    pub fn with_socket_path(mut self, path: PathBuf) -> Self {
        self.socket_path = path;
        self
    }

    pub fn with_frame_socket_path(mut self, path: PathBuf) -> Self {
        self.frame_socket_path = path;
        self
    }

    pub fn with_max_request_bytes(mut self, max: usize) -> Self {
        self.max_request_bytes = max;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_stream_mode(mut self, mode: StreamMode) -> Self {
        self.stream_mode = mode;
        self
    }

    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }
}

fn parse_stream_mode(raw: &str) -> Option<StreamMode> {
    match raw.to_ascii_lowercase().as_str() {
        "full" => Some(StreamMode::FullFrame),
        "region" => Some(StreamMode::Region),
        _ => None,
    }
}

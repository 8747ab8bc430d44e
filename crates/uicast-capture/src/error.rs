use thiserror::Error;

/// Failures starting or driving a capture session.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to spawn watchdog thread: {0}")]
    WatchdogSpawn(#[from] std::io::Error),
}

/// Failures streaming a finalized frame.
///
/// All of these are terminal for the frame only; the capture session and
/// the watchdog keep running.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("frame channel not ready")]
    ChannelNotReady,
    #[error("frame rejected before encode: {0}")]
    Encode(String),
    #[error("frame channel write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_error_messages() {
        assert_eq!(StreamError::ChannelNotReady.to_string(), "frame channel not ready");
        let e = StreamError::Encode("zero width".to_string());
        assert!(e.to_string().contains("zero width"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let e: StreamError = io.into();
        assert!(matches!(e, StreamError::Io(_)));
    }
}

//! Default socket locations for the two channels.

use std::env;
use std::path::PathBuf;

/// Command channel socket path.
///
/// `UICAST_SOCKET` overrides; otherwise `$TMPDIR/uicast.sock`.
pub fn socket_path() -> PathBuf {
    if let Some(path) = env::var_os("UICAST_SOCKET") {
        return PathBuf::from(path);
    }
    runtime_dir().join("uicast.sock")
}

/// Frame channel socket path.
///
/// `UICAST_FRAME_SOCKET` overrides; otherwise `$TMPDIR/uicast-frame.sock`.
pub fn frame_socket_path() -> PathBuf {
    if let Some(path) = env::var_os("UICAST_FRAME_SOCKET") {
        return PathBuf::from(path);
    }
    runtime_dir().join("uicast-frame.sock")
}

fn runtime_dir() -> PathBuf {
    env::var_os("TMPDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_paths_have_distinct_names() {
        let cmd = socket_path();
        let frame = frame_socket_path();
        assert_ne!(cmd, frame);
    }

    #[test]
    fn test_default_paths_end_with_socket_names() {
        // Only check the file name so an inherited UICAST_* override or
        // TMPDIR cannot break the assertion.
        let frame = frame_socket_path();
        assert!(frame.file_name().is_some());
        let cmd = socket_path();
        assert!(cmd.file_name().is_some());
    }
}

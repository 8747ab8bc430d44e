//! Host startup, socket plumbing and the command loop.
//!
//! Thread layout: the calling thread runs the command loop, a
//! `frame-accept` thread hands frame-channel subscribers to the
//! streamer, a `signal-handler` thread flips the shutdown flag, and the
//! capture pipeline spawns one short-lived watchdog per session. The
//! command loop serves one IDE connection at a time; its read timeout is
//! the tick that keeps runtime-initiated pushes flowing while the
//! connection is quiet.

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::io::Write;
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixListener;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use signal_hook::consts::SIGINT;
use signal_hook::consts::SIGTERM;
use signal_hook::iterator::Signals;
use tracing::debug;
use tracing::info;
use tracing::warn;
use uicast_common::mutex_lock_or_recover;
use uicast_runtime::FrameEncoder;
use uicast_runtime::UiRuntime;
use uuid::Uuid;

use crate::config::HostConfig;
use crate::context::HostContext;
use crate::error::HostError;
use crate::notify::HostCallbacks;
use crate::notify::TickCommand;
use crate::processor::CommandProcessor;
use crate::processor::ReplySink;

const ACCEPT_IDLE: Duration = Duration::from_millis(10);

/// Writes replies and pushes to the current IDE connection. Both share
/// the command socket. With nothing attached the payload is dropped;
/// a push has no one to reach and a direct reply has no requester left.
pub struct SocketReplySink {
    stream: Mutex<Option<UnixStream>>,
}

impl SocketReplySink {
    pub fn new() -> Self {
        Self {
            stream: Mutex::new(None),
        }
    }

    fn set(&self, stream: Option<UnixStream>) {
        *mutex_lock_or_recover(&self.stream) = stream;
    }

    fn send(&self, payload: &str) {
        let mut guard = mutex_lock_or_recover(&self.stream);
        let Some(stream) = guard.as_mut() else {
            debug!("no connection, payload dropped");
            return;
        };
        if let Err(e) = stream.write_all(payload.as_bytes()) {
            warn!(error = %e, "reply write failed, dropping connection");
            *guard = None;
        }
    }
}

impl Default for SocketReplySink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplySink for SocketReplySink {
    fn send_direct(&self, payload: &str) {
        self.send(payload);
    }

    fn send_secondary(&self, payload: &str) {
        self.send(payload);
    }
}

fn acquire_lock(lock_path: &Path) -> Result<File, HostError> {
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| HostError::Lock(format!("failed to open lock file: {}", e)))?;

    let fd = lock_file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result != 0 {
        return Err(HostError::AlreadyRunning);
    }

    lock_file
        .set_len(0)
        .map_err(|e| HostError::Lock(format!("failed to truncate lock file: {}", e)))?;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())
        .map_err(|e| HostError::Lock(format!("failed to write PID to lock file: {}", e)))?;
    Ok(lock_file)
}

fn bind_listener(path: &Path) -> Result<UnixListener, HostError> {
    if path.exists() {
        fs::remove_file(path)
            .map_err(|e| HostError::Bind(format!("failed to remove stale socket: {}", e)))?;
    }
    let listener = UnixListener::bind(path)
        .map_err(|e| HostError::Bind(format!("failed to bind {}: {}", path.display(), e)))?;
    listener
        .set_nonblocking(true)
        .map_err(|e| HostError::Bind(format!("failed to set non-blocking: {}", e)))?;
    Ok(listener)
}

fn connection_id() -> String {
    Uuid::new_v4().to_string()[..8].to_string()
}

/// Run the host until `Exit` or a termination signal. Blocks the caller;
/// this is the process's main loop.
pub fn start_host(
    config: HostConfig,
    runtime: Arc<dyn UiRuntime>,
    encoder: Arc<dyn FrameEncoder>,
) -> Result<(), HostError> {
    let lock_path = config.socket_path.with_extension("lock");
    let _lock_file = acquire_lock(&lock_path)?;

    let command_listener = bind_listener(&config.socket_path)?;
    let frame_listener = bind_listener(&config.frame_socket_path)?;

    eprintln!("uicast host started on {}", config.socket_path.display());
    eprintln!("PID: {}", std::process::id());

    let host = HostContext::new(config, runtime, encoder);

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).map_err(|e| HostError::SignalSetup(e.to_string()))?;
    let shutdown_signal = Arc::clone(&host.shutdown);
    thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                eprintln!("\nReceived signal {}, initiating graceful shutdown...", sig);
                shutdown_signal.store(true, Ordering::SeqCst);
            }
        })
        .map_err(|e| HostError::SignalSetup(format!("failed to spawn signal handler: {}", e)))?;

    let streamer = Arc::clone(&host.streamer);
    let frame_shutdown = Arc::clone(&host.shutdown);
    thread::Builder::new()
        .name("frame-accept".to_string())
        .spawn(move || {
            while !frame_shutdown.load(Ordering::Relaxed) {
                match frame_listener.accept() {
                    Ok((stream, _addr)) => {
                        let _ = stream.set_nonblocking(false);
                        info!("frame subscriber connected");
                        streamer.attach(Box::new(stream));
                    }
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                        thread::sleep(ACCEPT_IDLE);
                    }
                    Err(e) => {
                        if !frame_shutdown.load(Ordering::Relaxed) {
                            warn!(error = %e, "frame accept failed");
                        }
                    }
                }
            }
        })
        .map_err(|e| HostError::Bind(format!("failed to spawn frame thread: {}", e)))?;

    let (tick_tx, tick_rx) = mpsc::channel();
    host.runtime.register_callbacks(Arc::new(HostCallbacks::new(
        Arc::clone(&host.pipeline),
        Arc::clone(&host.notify),
        tick_tx,
    )));

    let processor = CommandProcessor::new(Arc::clone(&host));
    let sink = SocketReplySink::new();
    command_loop(&host, &processor, &sink, &command_listener, &tick_rx);

    eprintln!("Shutting down host...");
    host.pipeline.cancel();
    host.streamer.detach();
    info!(counters = %host.metrics.snapshot(), "final state");

    for path in [&host.config.socket_path, &host.config.frame_socket_path] {
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }
    if lock_path.exists() {
        let _ = fs::remove_file(&lock_path);
    }

    eprintln!("Host shutdown complete.");
    Ok(())
}

fn command_loop(
    host: &HostContext,
    processor: &CommandProcessor,
    sink: &SocketReplySink,
    listener: &UnixListener,
    ticks: &mpsc::Receiver<TickCommand>,
) {
    let mut buf = vec![0u8; host.config.max_request_bytes];
    while !host.shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, _addr)) => {
                serve_connection(host, processor, sink, stream, ticks, &mut buf);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                drain_ticks(processor, sink, ticks);
                thread::sleep(ACCEPT_IDLE);
            }
            Err(e) => {
                if !host.shutdown.load(Ordering::Relaxed) {
                    warn!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Serve one IDE connection until it closes or the host shuts down.
///
/// Framing is whole-message: each `read` call is treated as one complete
/// command, there are no record delimiters on this channel. A read that
/// fills the entire buffer is over the size cap and is discarded without
/// a decode attempt.
fn serve_connection(
    host: &HostContext,
    processor: &CommandProcessor,
    sink: &SocketReplySink,
    stream: UnixStream,
    ticks: &mpsc::Receiver<TickCommand>,
    buf: &mut [u8],
) {
    let id = connection_id();
    let configured = stream
        .set_nonblocking(false)
        .and_then(|_| stream.set_read_timeout(Some(host.config.poll_interval)));
    if let Err(e) = configured {
        warn!(connection = %id, error = %e, "failed to configure connection");
        return;
    }
    let mut reader = match stream.try_clone() {
        Ok(reader) => reader,
        Err(e) => {
            warn!(connection = %id, error = %e, "failed to clone stream");
            return;
        }
    };
    sink.set(Some(stream));
    info!(connection = %id, "client connected");

    while !host.shutdown.load(Ordering::Relaxed) {
        match reader.read(buf) {
            Ok(0) => {
                info!(connection = %id, "client disconnected");
                break;
            }
            Ok(n) if n == buf.len() => {
                host.metrics.record_request();
                host.metrics.record_dropped();
                warn!(connection = %id, max = buf.len(), "oversized message dropped");
            }
            Ok(n) => {
                let raw = String::from_utf8_lossy(&buf[..n]);
                processor.run_incoming(&raw, sink);
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(connection = %id, error = %e, "read failed");
                break;
            }
        }
        drain_ticks(processor, sink, ticks);
    }
    sink.set(None);
}

fn drain_ticks(
    processor: &CommandProcessor,
    sink: &SocketReplySink,
    ticks: &mpsc::Receiver<TickCommand>,
) {
    while let Ok(tick) = ticks.try_recv() {
        processor.run_internal(tick.name, tick.verb, tick.args, sink);
    }
}

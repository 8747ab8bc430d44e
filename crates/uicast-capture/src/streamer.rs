//! Binary frame streamer.
//!
//! Turns a finalized bitmap into one wire record (header + encoded
//! payload), writes it to the attached frame-channel subscriber, and
//! keeps the written bytes around so a subscriber that connects late
//! still gets the current picture.
//!
//! The cache is single-writer (this streamer) and read by replay and by
//! the snapshot command; one mutex covers writer, cache, and stream
//! configuration.

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use tracing::debug;
use tracing::info;
use tracing::warn;
use uicast_common::mutex_lock_or_recover;
use uicast_proto::FrameHeader;
use uicast_runtime::FrameEncoder;
use uicast_runtime::RenderedFrame;

use crate::error::StreamError;
use crate::pipeline::FinalizeSink;

/// Pixel count at and below which frames encode at the standard quality.
pub const QUALITY_PIXEL_THRESHOLD: u64 = 1920 * 1080;
/// Encode quality for frames up to the threshold.
pub const QUALITY_STANDARD: u8 = 85;
/// Encode quality for denser frames; bandwidth over fidelity.
pub const QUALITY_DENSE: u8 = 70;

/// Pick the encode quality tier for a frame's pixel count.
pub fn quality_for(pixel_count: u64) -> u8 {
    if pixel_count > QUALITY_PIXEL_THRESHOLD {
        QUALITY_DENSE
    } else {
        QUALITY_STANDARD
    }
}

/// Header layout variant for outgoing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    FullFrame,
    Region,
}

/// The last successfully written record.
#[derive(Debug, Clone)]
pub struct CachedFrame {
    record: Vec<u8>,
    payload_offset: usize,
    pub width: u32,
    pub height: u32,
}

impl CachedFrame {
    /// Full wire record (header + payload), as written.
    pub fn record(&self) -> &[u8] {
        &self.record
    }

    /// Encoded image bytes without the header.
    pub fn payload(&self) -> &[u8] {
        &self.record[self.payload_offset..]
    }
}

struct StreamerState {
    writer: Option<Box<dyn Write + Send>>,
    cache: Option<CachedFrame>,
    mode: StreamMode,
    original_width: i32,
    original_height: i32,
}

pub struct FrameStreamer {
    state: Mutex<StreamerState>,
    encoder: Arc<dyn FrameEncoder>,
}

impl FrameStreamer {
    pub fn new(encoder: Arc<dyn FrameEncoder>) -> Self {
        Self {
            state: Mutex::new(StreamerState {
                writer: None,
                cache: None,
                mode: StreamMode::FullFrame,
                original_width: 1080,
                original_height: 2340,
            }),
            encoder,
        }
    }

    pub fn set_mode(&self, mode: StreamMode) {
        mutex_lock_or_recover(&self.state).mode = mode;
    }

    pub fn mode(&self) -> StreamMode {
        mutex_lock_or_recover(&self.state).mode
    }

    /// Record the device's original resolution for header fields.
    pub fn set_original_size(&self, width: i32, height: i32) {
        let mut state = mutex_lock_or_recover(&self.state);
        state.original_width = width;
        state.original_height = height;
    }

    pub fn has_subscriber(&self) -> bool {
        mutex_lock_or_recover(&self.state).writer.is_some()
    }

    /// Most recent record, for snapshot reads.
    pub fn last_frame(&self) -> Option<CachedFrame> {
        mutex_lock_or_recover(&self.state).cache.clone()
    }

    /// Install a new subscriber, replacing any previous one, and replay
    /// the cached frame so the late joiner is not blank until the next
    /// finalize.
    pub fn attach(&self, mut writer: Box<dyn Write + Send>) {
        let mut state = mutex_lock_or_recover(&self.state);
        if let Some(cache) = &state.cache {
            if let Err(e) = writer.write_all(cache.record()).and_then(|()| writer.flush()) {
                warn!(error = %e, "replay to new frame subscriber failed");
                state.writer = None;
                return;
            }
            debug!(bytes = cache.record().len(), "replayed cached frame to new subscriber");
        }
        state.writer = Some(writer);
        info!("frame subscriber attached");
    }

    pub fn detach(&self) {
        mutex_lock_or_recover(&self.state).writer = None;
    }

    /// Encode and ship one frame.
    ///
    /// Failures are terminal for this frame only: the caller logs and
    /// waits for the next candidate. A write failure also drops the
    /// subscriber, since a broken pipe will not heal.
    pub fn stream(&self, frame: &RenderedFrame) -> Result<(), StreamError> {
        if !self.has_subscriber() {
            return Err(StreamError::ChannelNotReady);
        }
        if frame.width == 0 || frame.height == 0 {
            return Err(StreamError::Encode(format!(
                "non-positive dimensions {}x{}",
                frame.width, frame.height
            )));
        }
        if frame.pixels.len() != frame.expected_len() {
            return Err(StreamError::Encode(format!(
                "pixel buffer is {} bytes, expected {}",
                frame.pixels.len(),
                frame.expected_len()
            )));
        }

        let quality = quality_for(frame.pixel_count());
        let payload = self
            .encoder
            .encode(&frame.pixels, frame.width, frame.height, quality)
            .map_err(|e| StreamError::Encode(e.to_string()))?;

        let mut state = mutex_lock_or_recover(&self.state);
        let header = build_header(&state, frame);
        let mut record = header.encode();
        let payload_offset = record.len();
        record.extend_from_slice(&payload);

        let writer = state.writer.as_mut().ok_or(StreamError::ChannelNotReady)?;
        if let Err(e) = writer.write_all(&record).and_then(|()| writer.flush()) {
            state.writer = None;
            return Err(StreamError::Io(e));
        }

        debug!(
            bytes = record.len(),
            width = frame.width,
            height = frame.height,
            quality,
            "frame streamed"
        );
        state.cache = Some(CachedFrame {
            record,
            payload_offset,
            width: frame.width,
            height: frame.height,
        });
        Ok(())
    }
}

fn build_header(state: &StreamerState, frame: &RenderedFrame) -> FrameHeader {
    let capture_w = frame.width as i32;
    let capture_h = frame.height as i32;
    match state.mode {
        StreamMode::FullFrame => FrameHeader::full(
            state.original_width,
            state.original_height,
            capture_w,
            capture_h,
        ),
        StreamMode::Region => {
            let (x, y, w, h) = match frame.dirty {
                Some(rect) => (rect.x, rect.y, rect.width, rect.height),
                None => (
                    0,
                    0,
                    clamp_u16(frame.width),
                    clamp_u16(frame.height),
                ),
            };
            FrameHeader::region(
                state.original_width,
                state.original_height,
                capture_w,
                capture_h,
                x,
                y,
                w,
                h,
            )
        }
    }
}

fn clamp_u16(v: u32) -> u16 {
    v.min(u32::from(u16::MAX)) as u16
}

impl FinalizeSink for FrameStreamer {
    fn deliver(&self, frame: &RenderedFrame) {
        if let Err(e) = self.stream(frame) {
            warn!(error = %e, "finalized frame skipped");
        }
    }
}

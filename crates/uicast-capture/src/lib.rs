#![deny(clippy::all)]

mod drop_filter;
mod error;
mod pipeline;
mod sleeper;
mod streamer;

pub use drop_filter::DropFilter;
pub use error::CaptureError;
pub use error::StreamError;
pub use pipeline::CapturePipeline;
pub use pipeline::CaptureTiming;
pub use pipeline::FinalizeSink;
pub use pipeline::SessionPhase;
pub use sleeper::MockSleeper;
pub use sleeper::RealSleeper;
pub use sleeper::Sleeper;
pub use streamer::quality_for;
pub use streamer::CachedFrame;
pub use streamer::FrameStreamer;
pub use streamer::StreamMode;
pub use streamer::QUALITY_DENSE;
pub use streamer::QUALITY_PIXEL_THRESHOLD;
pub use streamer::QUALITY_STANDARD;

#![deny(clippy::all)]

mod envelope;
mod frame;
mod socket;

pub use envelope::DecodeError;
pub use envelope::Envelope;
pub use envelope::PROTOCOL_VERSION;
pub use envelope::Verb;
pub use envelope::decode_envelope;
pub use envelope::encode_notification;
pub use envelope::encode_result;
pub use frame::FRAME_MARKER;
pub use frame::FrameCodecError;
pub use frame::FrameHeader;
pub use frame::FrameMode;
pub use frame::LEGACY_HEADER_LEN;
pub use frame::REGION_HEADER_LEN;
pub use frame::REGION_PROTOCOL_VERSION;
pub use socket::frame_socket_path;
pub use socket::socket_path;

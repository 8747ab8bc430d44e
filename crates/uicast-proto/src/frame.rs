//! Binary frame header codec for the frame channel.
//!
//! Every streamed frame is one transport record: a fixed header followed
//! by the encoded image payload. All integers are network byte order.
//!
//! ```text
//! +--------+-------------+--------------+-------------+--------------+----------------+
//! | "CAST" | orig_w i32  | orig_h i32   | cap_w i32   | cap_h i32    | mode tail      |
//! +--------+-------------+--------------+-------------+--------------+----------------+
//! ```
//!
//! The mode tail distinguishes the two layouts:
//!
//! - full frame: 10 reserved zero bytes (30-byte header total);
//! - region refresh: `version u16` (nonzero), then `x, y, w, h` as u16,
//!   then 10 reserved zero bytes (40-byte header total).
//!
//! A decoder sniffs the u16 at offset 20: zero means the legacy
//! full-frame layout, nonzero is the region header version. The payload
//! runs to the end of the record; there is no length field.

use thiserror::Error;

/// Start marker opening every frame record.
pub const FRAME_MARKER: [u8; 4] = *b"CAST";

/// Header length in full-frame mode.
pub const LEGACY_HEADER_LEN: usize = 30;

/// Header length in region-refresh mode.
pub const REGION_HEADER_LEN: usize = 40;

/// Region header version written by this codec. Must stay nonzero;
/// zero at the version offset means a legacy full-frame header.
pub const REGION_PROTOCOL_VERSION: u16 = 1;

const RESERVED_LEN: usize = 10;
const MODE_OFFSET: usize = 20;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameCodecError {
    #[error("truncated frame header: need {needed} bytes, have {have}")]
    Truncated { needed: usize, have: usize },
    #[error("bad start marker: {found:02X?}")]
    BadMarker { found: [u8; 4] },
    #[error("nonzero reserved bytes in frame header")]
    BadReserved,
}

/// Refresh mode carried by a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    FullFrame,
    Region {
        version: u16,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub original_width: i32,
    pub original_height: i32,
    pub capture_width: i32,
    pub capture_height: i32,
    pub mode: FrameMode,
}

impl FrameHeader {
    /// Header for a full-frame record.
    pub fn full(original_width: i32, original_height: i32, capture_width: i32, capture_height: i32) -> Self {
        Self {
            original_width,
            original_height,
            capture_width,
            capture_height,
            mode: FrameMode::FullFrame,
        }
    }

    /// Header for a region-refresh record covering `(x, y, width, height)`.
    pub fn region(
        original_width: i32,
        original_height: i32,
        capture_width: i32,
        capture_height: i32,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Self {
        Self {
            original_width,
            original_height,
            capture_width,
            capture_height,
            mode: FrameMode::Region {
                version: REGION_PROTOCOL_VERSION,
                x,
                y,
                width,
                height,
            },
        }
    }

    /// Encoded length of this header in bytes.
    pub fn encoded_len(&self) -> usize {
        match self.mode {
            FrameMode::FullFrame => LEGACY_HEADER_LEN,
            FrameMode::Region { .. } => REGION_HEADER_LEN,
        }
    }

    /// Serialize to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&FRAME_MARKER);
        buf.extend_from_slice(&self.original_width.to_be_bytes());
        buf.extend_from_slice(&self.original_height.to_be_bytes());
        buf.extend_from_slice(&self.capture_width.to_be_bytes());
        buf.extend_from_slice(&self.capture_height.to_be_bytes());
        if let FrameMode::Region {
            version,
            x,
            y,
            width,
            height,
        } = self.mode
        {
            buf.extend_from_slice(&version.to_be_bytes());
            buf.extend_from_slice(&x.to_be_bytes());
            buf.extend_from_slice(&y.to_be_bytes());
            buf.extend_from_slice(&width.to_be_bytes());
            buf.extend_from_slice(&height.to_be_bytes());
        }
        buf.extend_from_slice(&[0u8; RESERVED_LEN]);
        buf
    }

    /// Decode a header from the front of `buf`.
    ///
    /// Returns the header and the number of bytes it occupied; the
    /// payload starts right after. Reserved bytes must be zero.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), FrameCodecError> {
        if buf.len() < MODE_OFFSET + 2 {
            return Err(FrameCodecError::Truncated {
                needed: MODE_OFFSET + 2,
                have: buf.len(),
            });
        }
        let mut marker = [0u8; 4];
        marker.copy_from_slice(&buf[0..4]);
        if marker != FRAME_MARKER {
            return Err(FrameCodecError::BadMarker { found: marker });
        }

        let original_width = read_i32(buf, 4);
        let original_height = read_i32(buf, 8);
        let capture_width = read_i32(buf, 12);
        let capture_height = read_i32(buf, 16);

        let mode_word = read_u16(buf, MODE_OFFSET);
        let (mode, len) = if mode_word == 0 {
            (FrameMode::FullFrame, LEGACY_HEADER_LEN)
        } else {
            if buf.len() < REGION_HEADER_LEN {
                return Err(FrameCodecError::Truncated {
                    needed: REGION_HEADER_LEN,
                    have: buf.len(),
                });
            }
            (
                FrameMode::Region {
                    version: mode_word,
                    x: read_u16(buf, 22),
                    y: read_u16(buf, 24),
                    width: read_u16(buf, 26),
                    height: read_u16(buf, 28),
                },
                REGION_HEADER_LEN,
            )
        };

        if buf.len() < len {
            return Err(FrameCodecError::Truncated {
                needed: len,
                have: buf.len(),
            });
        }
        if buf[len - RESERVED_LEN..len].iter().any(|&b| b != 0) {
            return Err(FrameCodecError::BadReserved);
        }

        Ok((
            Self {
                original_width,
                original_height,
                capture_width,
                capture_height,
                mode,
            },
            len,
        ))
    }
}

fn read_i32(buf: &[u8], at: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[at..at + 4]);
    i32::from_be_bytes(bytes)
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    let mut bytes = [0u8; 2];
    bytes.copy_from_slice(&buf[at..at + 2]);
    u16::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_full_frame_exact_bytes() {
        let header = FrameHeader::full(1080, 2340, 540, 1170);
        let bytes = header.encode();
        assert_eq!(bytes.len(), LEGACY_HEADER_LEN);
        #[rustfmt::skip]
        let expected = vec![
            b'C', b'A', b'S', b'T',
            0x00, 0x00, 0x04, 0x38, // 1080
            0x00, 0x00, 0x09, 0x24, // 2340
            0x00, 0x00, 0x02, 0x1C, // 540
            0x00, 0x00, 0x04, 0x92, // 1170
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_region_exact_bytes() {
        let header = FrameHeader::region(1080, 2340, 1080, 2340, 16, 32, 120, 40);
        let bytes = header.encode();
        assert_eq!(bytes.len(), REGION_HEADER_LEN);
        #[rustfmt::skip]
        let expected = vec![
            b'C', b'A', b'S', b'T',
            0x00, 0x00, 0x04, 0x38,
            0x00, 0x00, 0x09, 0x24,
            0x00, 0x00, 0x04, 0x38,
            0x00, 0x00, 0x09, 0x24,
            0x00, 0x01,             // region version 1
            0x00, 0x10,             // x = 16
            0x00, 0x20,             // y = 32
            0x00, 0x78,             // w = 120
            0x00, 0x28,             // h = 40
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_decode_full_frame_roundtrip() {
        let header = FrameHeader::full(480, 960, 480, 960);
        let (decoded, len) = FrameHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(len, LEGACY_HEADER_LEN);
    }

    #[test]
    fn test_decode_region_roundtrip() {
        let header = FrameHeader::region(480, 960, 480, 960, 0, 0, 480, 960);
        let (decoded, len) = FrameHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(len, REGION_HEADER_LEN);
    }

    #[test]
    fn test_decode_mode_sniffing_ignores_payload() {
        let header = FrameHeader::full(100, 200, 100, 200);
        let mut record = header.encode();
        record.extend_from_slice(&[0xAB; 64]); // payload
        let (decoded, len) = FrameHeader::decode(&record).unwrap();
        assert_eq!(decoded.mode, FrameMode::FullFrame);
        assert_eq!(&record[len..], &[0xAB; 64][..]);
    }

    #[test]
    fn test_decode_rejects_bad_marker() {
        let mut bytes = FrameHeader::full(1, 1, 1, 1).encode();
        bytes[0] = b'X';
        let err = FrameHeader::decode(&bytes).unwrap_err();
        assert!(matches!(err, FrameCodecError::BadMarker { .. }));
    }

    #[test]
    fn test_decode_rejects_truncated() {
        let bytes = FrameHeader::full(1, 1, 1, 1).encode();
        let err = FrameHeader::decode(&bytes[..12]).unwrap_err();
        assert!(matches!(err, FrameCodecError::Truncated { .. }));

        let region = FrameHeader::region(1, 1, 1, 1, 0, 0, 1, 1).encode();
        let err = FrameHeader::decode(&region[..REGION_HEADER_LEN - 1]).unwrap_err();
        assert!(matches!(err, FrameCodecError::Truncated { .. }));
    }

    #[test]
    fn test_decode_rejects_dirty_reserved_bytes() {
        let mut bytes = FrameHeader::full(1, 1, 1, 1).encode();
        bytes[LEGACY_HEADER_LEN - 1] = 0x01;
        assert_eq!(
            FrameHeader::decode(&bytes).unwrap_err(),
            FrameCodecError::BadReserved
        );
    }

    #[test]
    fn test_negative_dimensions_survive_roundtrip() {
        // The wire type is signed; the streamer rejects these earlier.
        let header = FrameHeader::full(-1, -1, -1, -1);
        let (decoded, _) = FrameHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded.original_width, -1);
    }

    proptest! {
        #[test]
        fn prop_full_header_roundtrips(
            ow in 0..100_000i32,
            oh in 0..100_000i32,
            cw in 0..100_000i32,
            ch in 0..100_000i32,
        ) {
            let header = FrameHeader::full(ow, oh, cw, ch);
            let (decoded, len) = FrameHeader::decode(&header.encode()).unwrap();
            prop_assert_eq!(decoded, header);
            prop_assert_eq!(len, LEGACY_HEADER_LEN);
        }

        #[test]
        fn prop_region_header_roundtrips(
            ow in 0..100_000i32,
            oh in 0..100_000i32,
            x in 0..u16::MAX,
            y in 0..u16::MAX,
            w in 1..u16::MAX,
            h in 1..u16::MAX,
        ) {
            let header = FrameHeader::region(ow, oh, ow, oh, x, y, w, h);
            let (decoded, len) = FrameHeader::decode(&header.encode()).unwrap();
            prop_assert_eq!(decoded, header);
            prop_assert_eq!(len, REGION_HEADER_LEN);
        }
    }
}

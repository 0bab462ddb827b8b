use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: type tag (1) + length (3) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Bytes reserved ahead of the payload in the encoder's scratch buffer.
///
/// The header is written at offset `ENCODE_SLACK - HEADER_SIZE`, directly in
/// front of the payload, so the frame leaves in a single contiguous write.
pub const ENCODE_SLACK: usize = 8;

/// Largest payload the 24-bit length field can describe.
pub const MAX_PAYLOAD_LEN: usize = 0xFF_FFFF;

/// A raw frame: type tag plus undecoded payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The type tag selecting the decoder target.
    pub tag: u8,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(tag: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Pack a type tag and payload length into a header.
///
/// The length is written as a 32-bit big-endian integer whose most
/// significant byte is then replaced by the tag. `len` must not exceed
/// [`MAX_PAYLOAD_LEN`].
pub fn encode_header(tag: u8, len: usize) -> [u8; HEADER_SIZE] {
    debug_assert!(len <= MAX_PAYLOAD_LEN);
    let mut header = (len as u32).to_be_bytes();
    header[0] = tag;
    header
}

/// Split a header into its type tag and payload length.
pub fn decode_header(mut header: [u8; HEADER_SIZE]) -> (u8, usize) {
    let tag = header[0];
    header[0] = 0;
    (tag, u32::from_be_bytes(header) as usize)
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────────┬──────────────────┐
/// │ Tag (1B) │ Length (3B)  │ Payload          │
/// │          │ big-endian   │ (Length bytes)   │
/// └──────────┴──────────────┴──────────────────┘
/// ```
pub fn encode_frame(tag: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::FrameTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&encode_header(tag, payload.len()));
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&src[..HEADER_SIZE]);
    let (tag, payload_len) = decode_header(header);

    let max = max_payload.min(MAX_PAYLOAD_LEN);
    if payload_len > max {
        return Err(FrameError::FrameTooLarge {
            size: payload_len,
            max,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { tag, payload }))
}

/// Configuration shared by the frame encoder and decoder.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default and ceiling: [`MAX_PAYLOAD_LEN`].
    pub max_payload_size: usize,
}

impl FrameConfig {
    /// The payload limit actually enforced, clamped to the wire format.
    pub fn effective_max_payload(&self) -> usize {
        self.max_payload_size.min(MAX_PAYLOAD_LEN)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_LEN,
        }
    }
}

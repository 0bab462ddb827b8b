//! `tokio_util` codec for raw frames.
//!
//! Lets tokio I/O be wrapped in `FramedRead`/`FramedWrite` and carry
//! [`Frame`] values. Payloads stay undecoded; routing them by tag is left to
//! the caller.
//!
//! A frame declaring more than the configured maximum is reported once as
//! [`FrameError::FrameTooLarge`] and its payload is skipped as it arrives, so
//! a codec driven directly can keep decoding the frames after it. `FramedRead`
//! ends its stream after any decoder error; rebuild it from
//! `FramedRead::into_parts` to continue past one.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, decode_header, encode_frame, Frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Section};

/// Codec producing and consuming [`Frame`] values.
#[derive(Debug, Clone, Default)]
pub struct PacketCodec {
    config: FrameConfig,
    /// Payload bytes of a rejected frame not yet seen.
    skip: usize,
}

impl PacketCodec {
    /// Create a codec with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config, skip: 0 }
    }

    /// Current codec configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn skip_available(&mut self, src: &mut BytesMut) {
        let n = self.skip.min(src.len());
        src.advance(n);
        self.skip -= n;
    }
}

impl Decoder for PacketCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.skip > 0 {
            self.skip_available(src);
            if self.skip > 0 {
                return Ok(None);
            }
        }

        match decode_frame(src, self.config.effective_max_payload()) {
            Err(FrameError::FrameTooLarge { size, max }) => {
                src.advance(HEADER_SIZE);
                self.skip = size;
                self.skip_available(src);
                Err(FrameError::FrameTooLarge { size, max })
            }
            other => other,
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if self.skip > 0 => {
                let missing = std::mem::take(&mut self.skip);
                Err(FrameError::ShortRead {
                    section: Section::Payload,
                    expected: missing,
                    read: 0,
                })
            }
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::ShortRead {
                section: if src.len() < HEADER_SIZE {
                    Section::Header
                } else {
                    Section::Payload
                },
                expected: pending_len(src),
                read: src.len(),
            }),
        }
    }
}

/// Bytes the partial frame at the front of `src` still needs in total.
fn pending_len(src: &BytesMut) -> usize {
    if src.len() < HEADER_SIZE {
        return HEADER_SIZE;
    }
    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&src[..HEADER_SIZE]);
    HEADER_SIZE + decode_header(header).1
}

impl Encoder<Frame> for PacketCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let max = self.config.effective_max_payload();
        if item.payload.len() > max {
            return Err(FrameError::FrameTooLarge {
                size: item.payload.len(),
                max,
            });
        }
        encode_frame(item.tag, &item.payload, dst)
    }
}

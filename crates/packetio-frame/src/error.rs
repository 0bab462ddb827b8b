use std::fmt;

use crate::message::BoxError;

/// The part of a frame being read when the stream ran dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Payload,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Header => f.write_str("header"),
            Section::Payload => f.write_str("payload"),
        }
    }
}

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the 24-bit length field or the configured maximum.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The message failed to encode itself; nothing was written.
    #[error("payload encoding failed: {0}")]
    EncodeFailed(#[source] BoxError),

    /// The stream ended in the middle of a frame.
    #[error("short read in frame {section} ({read} of {expected} bytes)")]
    ShortRead {
        section: Section,
        expected: usize,
        read: usize,
    },

    /// The stream ended cleanly on a frame boundary.
    #[error("end of stream")]
    EndOfStream,

    /// No decoder target is registered for the frame's type tag.
    ///
    /// The payload has already been consumed, so decoding can continue.
    #[error("no decoder registered for type {0}")]
    NoDecoderForType(u8),

    /// The registered decoder target rejected the payload.
    #[error("payload decoding failed for type {tag}: {source}")]
    PayloadDecodeFailed {
        tag: u8,
        #[source]
        source: BoxError,
    },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sink stopped accepting bytes before a complete frame was written.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// True when the stream is still positioned on a frame boundary.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameError::NoDecoderForType(_)
                | FrameError::PayloadDecodeFailed { .. }
                | FrameError::FrameTooLarge { .. }
                | FrameError::EncodeFailed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

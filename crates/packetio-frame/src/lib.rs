//! Typed, length-prefixed message framing over byte streams.
//!
//! Every message is framed with a 4-byte header:
//! - A 1-byte type tag selecting the decoder target on the receiving side
//! - A 3-byte big-endian payload length (at most 16,777,215 bytes)
//!
//! The payload encoding itself is left to the message types, which plug in
//! through the [`Encodable`] and [`Decodable`] traits.

#[cfg(feature = "async")]
pub mod async_codec;
mod buffer;
pub mod codec;
pub mod decoder;
pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod message;

#[cfg(feature = "async")]
pub use async_codec::PacketCodec;
pub use buffer::MIN_SCRATCH_CAPACITY;
pub use codec::{
    decode_frame, decode_header, encode_frame, encode_header, Frame, FrameConfig, ENCODE_SLACK,
    HEADER_SIZE, MAX_PAYLOAD_LEN,
};
pub use decoder::{Decoded, FrameDecoder};
pub use dispatch::DispatchTable;
pub use encoder::FrameEncoder;
pub use error::{FrameError, Result, Section};
pub use message::{BoxError, Decodable, Encodable};

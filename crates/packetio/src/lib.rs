//! Typed, length-prefixed message framing for byte streams.
//!
//! packetio wraps arbitrary messages in a 4-byte header carrying a type tag
//! and a 24-bit payload length, so a stream of heterogeneous messages can be
//! written and split back apart without committing to a payload encoding.
//!
//! # Crate Structure
//!
//! - [`frame`]: wire format, frame encoder/decoder, and dispatch table
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use packetio::frame::{DispatchTable, FrameDecoder, FrameEncoder};
//!
//! let mut encoder = FrameEncoder::new(Vec::<u8>::new());
//! encoder.encode(1, "hello")?;
//! let wire = encoder.into_inner();
//! assert_eq!(wire, b"\x01\x00\x00\x05hello");
//!
//! let table = DispatchTable::new().with_slot(1, String::new());
//! let mut decoder = FrameDecoder::new(Cursor::new(wire), table);
//! let decoded = decoder.decode()?;
//! assert_eq!(decoded.tag, 1);
//! assert_eq!(decoded.target.as_str(), "hello");
//! # Ok::<(), packetio::frame::FrameError>(())
//! ```

/// Re-export frame types.
pub mod frame {
    pub use packetio_frame::*;
}

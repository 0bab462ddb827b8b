//! Payload contracts.
//!
//! The framing layer never looks inside a payload. Messages describe their
//! own size and serialize themselves into the region the encoder hands them;
//! decoder targets repopulate themselves from the exact payload bytes.

use bytes::{Bytes, BytesMut};

/// Boxed error returned by payload encoders and decoders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A message that can serialize itself into a caller-provided region.
pub trait Encodable {
    /// Exact number of bytes [`encode_into`](Encodable::encode_into) will need.
    ///
    /// Must not change between this call and the following `encode_into`.
    fn required_size(&self) -> usize;

    /// Serialize into `buf`, which is at least `required_size()` bytes long.
    ///
    /// Returns the number of bytes actually written.
    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, BoxError>;
}

/// A decoder target that repopulates itself from a payload.
pub trait Decodable {
    /// Replace this value's state with the contents of `payload`.
    fn decode_from(&mut self, payload: &[u8]) -> Result<(), BoxError>;
}

fn copy_into(src: &[u8], buf: &mut [u8]) -> Result<usize, BoxError> {
    let have = buf.len();
    let dst = buf.get_mut(..src.len()).ok_or_else(|| -> BoxError {
        format!("encode region too small ({have} bytes, need {})", src.len()).into()
    })?;
    dst.copy_from_slice(src);
    Ok(src.len())
}

impl Encodable for [u8] {
    fn required_size(&self) -> usize {
        self.len()
    }

    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, BoxError> {
        copy_into(self, buf)
    }
}

impl Encodable for Vec<u8> {
    fn required_size(&self) -> usize {
        self.len()
    }

    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, BoxError> {
        copy_into(self, buf)
    }
}

impl Encodable for str {
    fn required_size(&self) -> usize {
        self.len()
    }

    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, BoxError> {
        copy_into(self.as_bytes(), buf)
    }
}

impl Encodable for String {
    fn required_size(&self) -> usize {
        self.len()
    }

    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, BoxError> {
        copy_into(self.as_bytes(), buf)
    }
}

impl Encodable for Bytes {
    fn required_size(&self) -> usize {
        self.len()
    }

    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, BoxError> {
        copy_into(self, buf)
    }
}

impl<T: Encodable + ?Sized> Encodable for &T {
    fn required_size(&self) -> usize {
        (**self).required_size()
    }

    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, BoxError> {
        (**self).encode_into(buf)
    }
}

impl<T: Encodable + ?Sized> Encodable for Box<T> {
    fn required_size(&self) -> usize {
        (**self).required_size()
    }

    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, BoxError> {
        (**self).encode_into(buf)
    }
}

impl Decodable for Vec<u8> {
    fn decode_from(&mut self, payload: &[u8]) -> Result<(), BoxError> {
        self.clear();
        self.extend_from_slice(payload);
        Ok(())
    }
}

impl Decodable for BytesMut {
    fn decode_from(&mut self, payload: &[u8]) -> Result<(), BoxError> {
        self.clear();
        self.extend_from_slice(payload);
        Ok(())
    }
}

impl Decodable for String {
    fn decode_from(&mut self, payload: &[u8]) -> Result<(), BoxError> {
        let text = std::str::from_utf8(payload)?;
        self.clear();
        self.push_str(text);
        Ok(())
    }
}

impl<T: Decodable + ?Sized> Decodable for Box<T> {
    fn decode_from(&mut self, payload: &[u8]) -> Result<(), BoxError> {
        (**self).decode_from(payload)
    }
}

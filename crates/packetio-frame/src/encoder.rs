use std::io::{ErrorKind, Write};

use crate::buffer::ScratchBuffer;
use crate::codec::{encode_header, FrameConfig, ENCODE_SLACK, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::message::Encodable;

/// Writes typed frames to any `Write` sink.
///
/// Each message is serialized into an internal scratch buffer that is reused
/// across calls, so steady-state encoding does not allocate.
pub struct FrameEncoder<W> {
    inner: W,
    scratch: ScratchBuffer,
    config: FrameConfig,
}

impl<W: Write> FrameEncoder<W> {
    /// Create a new frame encoder with default configuration.
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame encoder with explicit configuration.
    pub fn with_config(inner: W, config: FrameConfig) -> Self {
        Self {
            inner,
            scratch: ScratchBuffer::new(),
            config,
        }
    }

    /// Encode `msg` under `tag` and hand the frame to the sink in one write.
    ///
    /// Returns the byte count the sink reports. A short write is returned
    /// as-is and not retried; use [`encode_all`](Self::encode_all) when the
    /// whole frame must go out. Nothing reaches the sink if encoding fails or
    /// the payload is too large.
    pub fn encode<M: Encodable + ?Sized>(&mut self, tag: u8, msg: &M) -> Result<usize> {
        let max = self.config.effective_max_payload();
        let frame = stage_frame(&mut self.scratch, max, tag, msg)?;

        loop {
            match self.inner.write(frame) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Encode `msg` under `tag`, write the complete frame, then flush.
    pub fn encode_all<M: Encodable + ?Sized>(&mut self, tag: u8, msg: &M) -> Result<()> {
        let max = self.config.effective_max_payload();
        let frame = stage_frame(&mut self.scratch, max, tag, msg)?;

        let mut offset = 0usize;
        while offset < frame.len() {
            match self.inner.write(&frame[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the encoder and return the inner sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Update maximum payload size for subsequent frames.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame encoder configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Serialize `msg` behind a header and return the contiguous frame bytes.
fn stage_frame<'a, M: Encodable + ?Sized>(
    scratch: &'a mut ScratchBuffer,
    max: usize,
    tag: u8,
    msg: &M,
) -> Result<&'a [u8]> {
    let size = msg.required_size();
    if size > max {
        return Err(FrameError::FrameTooLarge { size, max });
    }
    let buf = scratch.ensure(size + ENCODE_SLACK);

    let n = msg
        .encode_into(&mut buf[ENCODE_SLACK..])
        .map_err(FrameError::EncodeFailed)?;
    if n > size {
        return Err(FrameError::EncodeFailed(
            format!("encoder reported {n} bytes written into a {size}-byte region").into(),
        ));
    }
    if n > max {
        return Err(FrameError::FrameTooLarge { size: n, max });
    }

    let start = ENCODE_SLACK - HEADER_SIZE;
    buf[start..ENCODE_SLACK].copy_from_slice(&encode_header(tag, n));
    Ok(&buf[start..ENCODE_SLACK + n])
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use bytes::BytesMut;

    use super::*;
    use crate::codec::{decode_frame, MAX_PAYLOAD_LEN};
    use crate::message::BoxError;

    fn decode_all(wire: &[u8]) -> Vec<(u8, Vec<u8>)> {
        let mut buf = BytesMut::from(wire);
        let mut frames = Vec::new();
        while let Some(frame) = decode_frame(&mut buf, MAX_PAYLOAD_LEN).unwrap() {
            frames.push((frame.tag, frame.payload.to_vec()));
        }
        assert!(buf.is_empty());
        frames
    }

    /// Payload of `len` repeated bytes, produced without holding a copy.
    struct Filler {
        len: usize,
        byte: u8,
    }

    impl Encodable for Filler {
        fn required_size(&self) -> usize {
            self.len
        }

        fn encode_into(&self, buf: &mut [u8]) -> std::result::Result<usize, BoxError> {
            buf[..self.len].fill(self.byte);
            Ok(self.len)
        }
    }

    struct Failing;

    impl Encodable for Failing {
        fn required_size(&self) -> usize {
            4
        }

        fn encode_into(&self, _buf: &mut [u8]) -> std::result::Result<usize, BoxError> {
            Err("refusing to encode".into())
        }
    }

    struct Overreporting;

    impl Encodable for Overreporting {
        fn required_size(&self) -> usize {
            2
        }

        fn encode_into(&self, _buf: &mut [u8]) -> std::result::Result<usize, BoxError> {
            Ok(64)
        }
    }

    struct HugeClaim;

    impl Encodable for HugeClaim {
        fn required_size(&self) -> usize {
            usize::MAX
        }

        fn encode_into(&self, _buf: &mut [u8]) -> std::result::Result<usize, BoxError> {
            panic!("oversized message must be rejected before encoding");
        }
    }

    #[test]
    fn write_single_frame() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));

        let written = encoder.encode(1, "hello").unwrap();

        assert_eq!(written, 9);
        let wire = encoder.into_inner().into_inner();
        assert_eq!(wire, b"\x01\x00\x00\x05hello");
    }

    #[test]
    fn write_multiple_frames() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));

        encoder.encode(1, "one").unwrap();
        encoder.encode(2, b"two".as_slice()).unwrap();
        encoder.encode(255, &String::from("three")).unwrap();

        let frames = decode_all(&encoder.into_inner().into_inner());
        assert_eq!(
            frames,
            vec![
                (1, b"one".to_vec()),
                (2, b"two".to_vec()),
                (255, b"three".to_vec()),
            ]
        );
    }

    #[test]
    fn empty_payload_is_header_only() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));
        assert_eq!(encoder.encode(9, "").unwrap(), HEADER_SIZE);
        assert_eq!(encoder.into_inner().into_inner(), vec![9, 0, 0, 0]);
    }

    #[test]
    fn buffer_reuse_across_sizes() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));

        encoder.encode(1, &Filler { len: 10, byte: 0x11 }).unwrap();
        encoder
            .encode(
                2,
                &Filler {
                    len: 50_000,
                    byte: 0x22,
                },
            )
            .unwrap();
        encoder.encode(3, &Filler { len: 5, byte: 0x33 }).unwrap();

        let frames = decode_all(&encoder.into_inner().into_inner());
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], (1, vec![0x11; 10]));
        assert_eq!(frames[1], (2, vec![0x22; 50_000]));
        assert_eq!(frames[2], (3, vec![0x33; 5]));
    }

    #[test]
    fn largest_payload_is_accepted() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));
        let msg = Filler {
            len: MAX_PAYLOAD_LEN,
            byte: 0x7F,
        };

        let written = encoder.encode(4, &msg).unwrap();

        assert_eq!(written, HEADER_SIZE + MAX_PAYLOAD_LEN);
        let wire = encoder.into_inner().into_inner();
        assert_eq!(&wire[..HEADER_SIZE], &[0x04, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn payload_past_24_bits_rejected_without_writing() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));
        let msg = Filler {
            len: MAX_PAYLOAD_LEN + 1,
            byte: 0,
        };

        let err = encoder.encode(4, &msg).unwrap_err();

        assert!(matches!(err, FrameError::FrameTooLarge { size, .. } if size == 1 << 24));
        assert!(encoder.into_inner().into_inner().is_empty());
    }

    #[test]
    fn configured_max_rejected() {
        let cfg = FrameConfig {
            max_payload_size: 4,
        };
        let mut encoder = FrameEncoder::with_config(Cursor::new(Vec::<u8>::new()), cfg);

        let err = encoder.encode(1, "oversized").unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { size: 9, max: 4 }));

        encoder.set_max_payload_size(64);
        assert_eq!(encoder.config().max_payload_size, 64);
        encoder.encode(1, "oversized").unwrap();
    }

    #[test]
    fn encode_failure_writes_nothing() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));

        let err = encoder.encode(1, &Failing).unwrap_err();

        assert!(matches!(err, FrameError::EncodeFailed(_)));
        assert!(encoder.into_inner().into_inner().is_empty());
    }

    #[test]
    fn overreported_length_is_encode_failure() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));
        let err = encoder.encode(1, &Overreporting).unwrap_err();
        assert!(matches!(err, FrameError::EncodeFailed(_)));
    }

    #[test]
    fn oversized_required_size_rejected_before_allocating() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));

        let err = encoder.encode(1, &HugeClaim).unwrap_err();

        assert!(matches!(
            err,
            FrameError::FrameTooLarge { size: usize::MAX, max: MAX_PAYLOAD_LEN }
        ));
        assert!(encoder.get_ref().get_ref().is_empty());

        let err = encoder.encode_all(1, &HugeClaim).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { .. }));
        assert!(encoder.get_ref().get_ref().is_empty());
    }

    #[test]
    fn partial_write_reported_not_retried() {
        let mut encoder = FrameEncoder::new(ChunkedWriter::new(3));

        let written = encoder.encode(1, "hello").unwrap();

        assert_eq!(written, 3);
        let sink = encoder.into_inner();
        assert_eq!(sink.calls, 1);
        assert_eq!(sink.data, vec![0x01, 0x00, 0x00]);
    }

    #[test]
    fn encode_all_loops_over_partial_writes() {
        let mut encoder = FrameEncoder::new(ChunkedWriter::new(3));

        encoder.encode_all(1, "hello").unwrap();

        let sink = encoder.into_inner();
        assert_eq!(sink.calls, 3);
        assert_eq!(sink.data, b"\x01\x00\x00\x05hello");
    }

    #[test]
    fn sink_error_propagates() {
        let mut encoder = FrameEncoder::new(BrokenWriter);
        let err = encoder.encode(1, "x").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut encoder = FrameEncoder::new(sink);

        encoder.encode_all(1, "x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(encoder.get_ref().data, b"\x01\x00\x00\x01x");
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));

        let _ = encoder.get_ref();
        let _ = encoder.get_mut();
        let _inner = encoder.into_inner();
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        let mut encoder = FrameEncoder::new(writer_impl);
        encoder.encode_all(5, "retry").unwrap();

        let inner = encoder.into_inner();
        assert_eq!(inner.data, b"\x05\x00\x00\x05retry");
    }

    #[test]
    fn single_write_retries_interrupted() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: true,
            data: Vec::new(),
        };

        let mut encoder = FrameEncoder::new(writer_impl);
        assert_eq!(encoder.encode(6, "ok").unwrap(), 6);
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut encoder = FrameEncoder::new(ZeroWriter);
        let err = encoder.encode_all(1, "x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn written_bytes_decode() {
        let mut encoder = FrameEncoder::new(Cursor::new(Vec::<u8>::new()));

        encoder.encode(3, "z").unwrap();

        let wire = encoder.into_inner().into_inner();
        let table = crate::dispatch::DispatchTable::new().with_slot(3, String::new());
        let mut decoder = crate::decoder::FrameDecoder::new(Cursor::new(wire), table);
        let decoded = decoder.decode().unwrap();
        assert_eq!(decoded.tag, 3);
        assert_eq!(decoded.target.as_str(), "z");
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Accepts at most `chunk` bytes per write call.
    struct ChunkedWriter {
        chunk: usize,
        calls: usize,
        data: Vec<u8>,
    }

    impl ChunkedWriter {
        fn new(chunk: usize) -> Self {
            Self {
                chunk,
                calls: 0,
                data: Vec::new(),
            }
        }
    }

    impl Write for ChunkedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.calls += 1;
            let n = buf.len().min(self.chunk);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

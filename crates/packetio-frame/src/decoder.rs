use std::io::{self, BufReader, ErrorKind, Read};

use crate::buffer::ScratchBuffer;
use crate::codec::{decode_header, FrameConfig, HEADER_SIZE};
use crate::dispatch::DispatchTable;
use crate::error::{FrameError, Result, Section};
use crate::message::Decodable;

/// A frame decoded into its dispatch-table target.
///
/// `target` borrows the slot in the decoder's table: the next call to
/// [`FrameDecoder::decode`] overwrites it in place, so copy out anything
/// that must outlive it.
#[derive(Debug)]
pub struct Decoded<'a, D> {
    /// The frame's type tag.
    pub tag: u8,
    /// The table target the payload was decoded into.
    pub target: &'a mut D,
}

/// Reads typed frames from any `Read` source and routes each payload to the
/// target registered for its type tag.
///
/// Unknown tags and payloads rejected by their target leave the stream on a
/// frame boundary, so decoding can continue after those errors. A short read
/// leaves the source wherever it stopped.
pub struct FrameDecoder<R, D> {
    inner: BufReader<R>,
    table: DispatchTable<D>,
    scratch: ScratchBuffer,
    header: [u8; HEADER_SIZE],
    config: FrameConfig,
}

impl<R: Read, D: Decodable> FrameDecoder<R, D> {
    /// Create a new frame decoder with default configuration.
    pub fn new(inner: R, table: DispatchTable<D>) -> Self {
        Self::with_config(inner, table, FrameConfig::default())
    }

    /// Create a new frame decoder with explicit configuration.
    pub fn with_config(inner: R, table: DispatchTable<D>, config: FrameConfig) -> Self {
        Self {
            inner: BufReader::new(inner),
            table,
            scratch: ScratchBuffer::new(),
            header: [0u8; HEADER_SIZE],
            config,
        }
    }

    /// Read the next frame and decode it into its registered target (blocking).
    ///
    /// Returns `Err(FrameError::EndOfStream)` when the source is exhausted on a
    /// frame boundary.
    pub fn decode(&mut self) -> Result<Decoded<'_, D>> {
        let read = read_full(&mut self.inner, &mut self.header)?;
        if read == 0 {
            return Err(FrameError::EndOfStream);
        }
        if read < HEADER_SIZE {
            return Err(FrameError::ShortRead {
                section: Section::Header,
                expected: HEADER_SIZE,
                read,
            });
        }

        let (tag, len) = decode_header(self.header);

        let max = self.config.effective_max_payload();
        if len > max {
            self.discard(len)?;
            return Err(FrameError::FrameTooLarge { size: len, max });
        }

        let payload = self.scratch.ensure(len);
        let read = read_full(&mut self.inner, payload)?;
        if read < len {
            return Err(FrameError::ShortRead {
                section: Section::Payload,
                expected: len,
                read,
            });
        }

        let target = self
            .table
            .get_mut(tag)
            .ok_or(FrameError::NoDecoderForType(tag))?;
        target
            .decode_from(payload)
            .map_err(|source| FrameError::PayloadDecodeFailed { tag, source })?;

        Ok(Decoded { tag, target })
    }

    /// Skip `len` payload bytes without buffering them.
    fn discard(&mut self, len: usize) -> Result<()> {
        let skipped = io::copy(&mut (&mut self.inner).take(len as u64), &mut io::sink())?;
        if (skipped as usize) < len {
            return Err(FrameError::ShortRead {
                section: Section::Payload,
                expected: len,
                read: skipped as usize,
            });
        }
        Ok(())
    }

    /// Borrow the dispatch table.
    pub fn table(&self) -> &DispatchTable<D> {
        &self.table
    }

    /// Mutably borrow the dispatch table.
    pub fn table_mut(&mut self) -> &mut DispatchTable<D> {
        &mut self.table
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Mutably borrow the underlying source.
    ///
    /// Reading from it directly skips any bytes already buffered by the decoder.
    pub fn get_mut(&mut self) -> &mut R {
        self.inner.get_mut()
    }

    /// Consume the decoder and return the inner source.
    ///
    /// Bytes read ahead into the decoder's buffer are lost.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    /// Consume the decoder and return its dispatch table.
    pub fn into_table(self) -> DispatchTable<D> {
        self.table
    }

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame decoder configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(filled)
}

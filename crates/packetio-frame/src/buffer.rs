use bytes::BytesMut;

/// Smallest allocation the scratch buffer makes.
pub const MIN_SCRATCH_CAPACITY: usize = 8 * 1024;

/// Growable byte arena reused across encode/decode calls.
///
/// Grows by replacing its allocation, never shrinks. Contents between calls
/// are unspecified.
#[derive(Debug, Default)]
pub(crate) struct ScratchBuffer {
    buf: BytesMut,
}

impl ScratchBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Borrow exactly `len` bytes, reallocating first if needed.
    pub(crate) fn ensure(&mut self, len: usize) -> &mut [u8] {
        if len > self.buf.len() {
            let size = len.max(MIN_SCRATCH_CAPACITY);
            tracing::trace!(from = self.buf.len(), to = size, "growing scratch buffer");
            self.buf = BytesMut::zeroed(size);
        }
        &mut self.buf[..len]
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }
}

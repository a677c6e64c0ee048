use crate::error::StreamError;
use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Write side of a push stream: the relay writes audio, then closes it.
#[derive(Debug, Clone)]
pub struct PushAudioInputStream {
    inner: Arc<Mutex<StreamInner>>,
}

/// Read side handed to the capability.
#[derive(Debug, Clone)]
pub struct AudioInputStream {
    inner: Arc<Mutex<StreamInner>>,
}

#[derive(Debug)]
struct StreamInner {
    chunks: VecDeque<Bytes>,
    buffered: usize,
    total_written: usize,
    max_buffer_bytes: usize,
    closed: bool,
}

fn lock(inner: &Mutex<StreamInner>) -> MutexGuard<'_, StreamInner> {
    inner
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PushAudioInputStream {
    pub fn create(max_buffer_bytes: usize) -> (Self, AudioInputStream) {
        let inner = Arc::new(Mutex::new(StreamInner {
            chunks: VecDeque::new(),
            buffered: 0,
            total_written: 0,
            max_buffer_bytes,
            closed: false,
        }));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            AudioInputStream { inner },
        )
    }

    pub fn write(&self, chunk: impl Into<Bytes>) -> Result<(), StreamError> {
        let chunk = chunk.into();
        let mut inner = lock(&self.inner);
        if inner.closed {
            return Err(StreamError::Closed);
        }
        let attempted = inner.buffered + chunk.len();
        if attempted > inner.max_buffer_bytes {
            return Err(StreamError::BufferLimitExceeded {
                attempted,
                limit: inner.max_buffer_bytes,
            });
        }
        if chunk.is_empty() {
            return Ok(());
        }
        inner.buffered = attempted;
        inner.total_written += chunk.len();
        inner.chunks.push_back(chunk);
        Ok(())
    }

    pub fn close(&self) {
        let mut inner = lock(&self.inner);
        if !inner.closed {
            log::trace!("push stream closed after {} bytes", inner.total_written);
            inner.closed = true;
        }
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }

    pub fn bytes_written(&self) -> usize {
        lock(&self.inner).total_written
    }
}

impl AudioInputStream {
    /// Next buffered chunk, or `None` when nothing is buffered right now.
    pub fn read(&self) -> Option<Bytes> {
        let mut inner = lock(&self.inner);
        let chunk = inner.chunks.pop_front()?;
        inner.buffered -= chunk.len();
        Some(chunk)
    }

    /// Drains everything buffered so far into one contiguous buffer.
    pub fn read_all(&self) -> Bytes {
        let mut inner = lock(&self.inner);
        let mut out = BytesMut::with_capacity(inner.buffered);
        while let Some(chunk) = inner.chunks.pop_front() {
            out.extend_from_slice(&chunk);
        }
        inner.buffered = 0;
        out.freeze()
    }

    /// True once the writer closed the stream and every chunk was read.
    pub fn is_exhausted(&self) -> bool {
        let inner = lock(&self.inner);
        inner.closed && inner.chunks.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }
}
